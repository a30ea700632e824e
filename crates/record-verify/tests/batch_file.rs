//! Validate JSON Lines files of generated records.

use chrono::{TimeDelta, Utc};
use model_core::Context;
use record_generator::RecordGenerator;
use record_verify::{extract_change_log, extract_summary, BatchVerifier, LineFailure, Violation};
use std::fs::File;
use std::io::{BufReader, Write};
use tempfile::NamedTempFile;

fn write_generated(
    file: &mut NamedTempFile,
    record_type: &str,
    variant: &str,
    context: Context,
    count: u64,
) {
    let catalog = record_types::catalog();
    let schema = catalog.effective_schema(record_type, variant).unwrap();
    let mut generator = RecordGenerator::new(42);
    for record in
        generator.generate_many(&schema, Utc::now(), TimeDelta::minutes(5), context, count)
    {
        serde_json::to_writer(&mut *file, &record).unwrap();
        writeln!(file).unwrap();
    }
}

#[test]
fn test_generated_file_validates() {
    let mut file = NamedTempFile::new().unwrap();
    write_generated(&mut file, "basal", "temp", Context::Storage, 100);
    write_generated(&mut file, "bolus", "dual/square", Context::Storage, 100);
    write_generated(&mut file, "cbg", "cbg", Context::Storage, 100);
    file.flush().unwrap();

    let catalog = record_types::catalog();
    let mut verifier = BatchVerifier::new(&catalog, Context::Storage);
    let report = verifier
        .verify_reader(BufReader::new(File::open(file.path()).unwrap()))
        .unwrap();

    assert_eq!(report.total, 300);
    assert!(report.is_success(), "{}", report.summary());
}

#[test]
fn test_storage_records_fail_ingestion_contract() {
    let mut file = NamedTempFile::new().unwrap();
    write_generated(&mut file, "smbg", "smbg", Context::Storage, 10);
    file.flush().unwrap();

    let catalog = record_types::catalog();
    let mut verifier = BatchVerifier::new(&catalog, Context::Ingestion);
    let report = verifier
        .verify_reader(BufReader::new(File::open(file.path()).unwrap()))
        .unwrap();

    assert_eq!(report.invalid(), 10);
    let LineFailure::Invalid { report: first, .. } = &report.failures[0] else {
        panic!("expected a validation failure, got {}", report.failures[0]);
    };
    let not_applicable: Vec<_> = first
        .violations()
        .iter()
        .filter(|v| matches!(v, Violation::NotApplicable { .. }))
        .map(Violation::field)
        .collect();
    assert_eq!(
        not_applicable,
        vec!["_groupId", "_schemaVersion", "createdTime", "guid", "id", "uploadId"]
    );
}

#[test]
fn test_catalog_summary_and_change_log() {
    let schema = record_types::catalog()
        .effective_schema("basal", "temp")
        .unwrap();

    let table = extract_summary(&schema);
    let rate = table.get("suppressed.rate").unwrap();
    assert_eq!(rate.max.as_deref(), Some("20"));
    assert!(table.get("previous").is_some_and(|row| !row.emitted));

    let log = extract_change_log(&schema);
    assert!(log.windows(2).all(|w| w[0].version <= w[1].version));
    assert!(log.iter().any(|e| e.field == "percent"));
}
