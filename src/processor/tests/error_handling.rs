//! Error handling integration tests

use super::{midtown_rows, read_lines, write_excursion};
use crate::config::{CategoryMap, InventoryConfig};
use crate::constants::{INVENTORY_FILE_NAME, SUMMARY_FILE_NAME};
use crate::error::InventoryError;
use crate::models::Category;
use crate::processor::InventoryProcessor;
use std::fs;
use tempfile::TempDir;

#[tokio::test]
async fn test_empty_input_directory() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("empty");
    fs::create_dir_all(&input).unwrap();

    let processor = InventoryProcessor::new(
        vec![input.clone()],
        temp_dir.path().join("out"),
        InventoryConfig::default(),
    )
    .unwrap()
    .with_quiet(true);

    match processor.process().await.unwrap_err() {
        InventoryError::InputNotFound { path } => assert_eq!(path, input),
        other => panic!("Expected InputNotFound error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_no_inputs_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let result =
        InventoryProcessor::new(vec![], temp_dir.path().into(), InventoryConfig::default());
    assert!(matches!(result, Err(InventoryError::Configuration { .. })));
}

#[tokio::test]
async fn test_invalid_configuration_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let categories = CategoryMap::default()
        .with_band(Category::Uplink, vec![])
        .unwrap();
    let config = InventoryConfig::default().with_categories(categories);

    let result =
        InventoryProcessor::new(vec![temp_dir.path().into()], temp_dir.path().into(), config);
    assert!(matches!(result, Err(InventoryError::Configuration { .. })));
}

#[tokio::test]
async fn test_unreadable_file_is_skipped() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("excursions");
    write_excursion(&input, "2025-10-01 C M Midtown.csv", &midtown_rows());
    fs::write(input.join("2025-10-03 G Q Empty.csv"), "").unwrap();
    let output = temp_dir.path().join("out");

    let stats = InventoryProcessor::new(vec![input], output.clone(), InventoryConfig::default())
        .unwrap()
        .with_quiet(true)
        .process()
        .await
        .unwrap();

    assert_eq!(stats.files_discovered, 2);
    assert_eq!(stats.files_processed, 1);
    assert_eq!(stats.files_failed, 1);
    assert_eq!(stats.warnings.len(), 1);
    assert_eq!(stats.warnings[0].file, "2025-10-03 G Q Empty.csv");
    assert!(stats.warnings[0].cause.contains("no columns"));

    let inventory = read_lines(&output.join(INVENTORY_FILE_NAME));
    assert_eq!(inventory.len(), 2);

    // The skipped file contributes no label
    let summary = read_lines(&output.join(SUMMARY_FILE_NAME));
    assert!(!summary.iter().any(|line| line.starts_with("Queens")));
}

#[tokio::test]
async fn test_garbled_name_still_inventoried() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("excursions");
    write_excursion(&input, "garbled name.csv", &midtown_rows());
    let output = temp_dir.path().join("out");

    let stats = InventoryProcessor::new(vec![input], output.clone(), InventoryConfig::default())
        .unwrap()
        .with_quiet(true)
        .process()
        .await
        .unwrap();
    assert_eq!(stats.files_processed, 1);

    let inventory = read_lines(&output.join(INVENTORY_FILE_NAME));
    assert!(inventory[1].starts_with(",,garbled name,,,10:00:00"));

    // Only the global block: header + 6 rows
    let summary = read_lines(&output.join(SUMMARY_FILE_NAME));
    assert_eq!(summary.len(), 7);
    assert!(summary[1].starts_with("Totals,"));
}

#[tokio::test]
async fn test_missing_columns_are_not_fatal() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("excursions");
    fs::create_dir_all(&input).unwrap();
    fs::write(
        input.join("2025-10-04 T SI Ferry Terminal.csv"),
        "Date&Time,Unrelated\n10/04/2025 08:00:00,abc\n10/04/2025 08:00:05,\n",
    )
    .unwrap();
    let output = temp_dir.path().join("out");

    let stats = InventoryProcessor::new(vec![input], output.clone(), InventoryConfig::default())
        .unwrap()
        .with_quiet(true)
        .process()
        .await
        .unwrap();
    assert_eq!(stats.files_failed, 0);
    assert_eq!(stats.total_samples, 2);

    let inventory = read_lines(&output.join(INVENTORY_FILE_NAME));
    let fields: Vec<&str> = inventory[1].split(',').collect();
    assert_eq!(fields[1], "SI");
    assert_eq!(fields[13], "2");
    // Every statistic is blank, never zero
    assert!(fields[14..].iter().all(|field| field.is_empty()));

    // No composites means no pooled label at all
    let summary = read_lines(&output.join(SUMMARY_FILE_NAME));
    assert_eq!(summary.len(), 1);
}

#[tokio::test]
async fn test_non_finite_readings_never_reach_the_tables() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("excursions");
    write_excursion(
        &input,
        "2025-10-01 C M Midtown.csv",
        &[
            "10/01/2025 10:00:00,,40.7,-73.9,0.1,inf,,",
            "10/01/2025 10:00:05,,40.71,-73.95,0.2,-inf,,",
            "10/01/2025 10:00:10,,40.72,-73.96,0.3,1e200,,",
        ],
    );
    let output = temp_dir.path().join("out");

    let stats = InventoryProcessor::new(vec![input], output.clone(), InventoryConfig::default())
        .unwrap()
        .with_quiet(true)
        .process()
        .await
        .unwrap();
    assert_eq!(stats.files_failed, 0);

    let inventory = fs::read_to_string(output.join(INVENTORY_FILE_NAME)).unwrap();
    let summary = fs::read_to_string(output.join(SUMMARY_FILE_NAME)).unwrap();
    for text in [&inventory, &summary] {
        assert!(!text.contains("NaN"));
        assert!(!text.contains("inf"));
    }

    // WLAN holds no usable reading; the overflowing row drops out of Total
    let lines = read_lines(&output.join(SUMMARY_FILE_NAME));
    assert!(lines.contains(&"Totals,WLAN,,,,,,,,,".to_string()));
    assert!(lines.iter().any(|line| line.starts_with("Totals,Total,0.1000,")));
    assert!(lines.iter().any(|line| line.starts_with("Totals,Broadcast,0.1000,")));
}

#[tokio::test]
async fn test_stray_bytes_keep_the_file() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("excursions");
    fs::create_dir_all(&input).unwrap();
    let mut content = format!("{}\n", super::HEADER).into_bytes();
    content.extend_from_slice(b"10/01/2025 10:00:00,\xB5,40.7,-73.9,0.1,,,\n");
    content.extend_from_slice(b"10/01/2025 10:00:05,x,40.71,-73.95,0.2,,,\n");
    fs::write(input.join("2025-10-01 C M Midtown.csv"), content).unwrap();
    let output = temp_dir.path().join("out");

    let stats = InventoryProcessor::new(vec![input], output.clone(), InventoryConfig::default())
        .unwrap()
        .with_quiet(true)
        .process()
        .await
        .unwrap();
    assert_eq!(stats.files_processed, 1);
    assert_eq!(stats.files_failed, 0);
    assert_eq!(stats.total_samples, 2);

    let inventory = read_lines(&output.join(INVENTORY_FILE_NAME));
    let fields: Vec<&str> = inventory[1].split(',').collect();
    // The turn fix still comes from the intact marker
    assert_eq!(fields[9], "40.71");
}
