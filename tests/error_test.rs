//! Error case tests
//!
//! Error handling across scanning, templates, storage and settings

use irshad_reports::error::IrshadError;
use irshad_reports::settings::SettingsStore;
use irshad_reports::storage::{OptionStore, ReportStore};
use irshad_reports::{scanner, template};
use std::path::Path;
use tempfile::tempdir;

/// Scanning a folder that does not exist
#[test]
fn test_scan_nonexistent_folder() {
    let result = scanner::scan_folder(Path::new("/nonexistent/path/12345"), false);
    assert!(result.is_err());

    let err = result.unwrap_err();
    assert!(matches!(err, IrshadError::FolderNotFound(_)));
}

/// A folder without report files is empty, not an error
#[test]
fn test_scan_folder_no_reports() {
    let dir = tempdir().expect("Failed to create temp dir");
    std::fs::write(dir.path().join("test.txt"), "hello").unwrap();
    std::fs::write(dir.path().join("logo.png"), [0u8; 4]).unwrap();

    let result = scanner::scan_folder(dir.path(), true);
    assert!(result.is_ok());
    assert!(result.unwrap().is_empty());
}

/// Every variant has a message
#[test]
fn test_error_display() {
    let errors = vec![
        IrshadError::Config("إعداد".to_string()),
        IrshadError::MissingTitle,
        IrshadError::FileNotFound("report.json".to_string()),
        IrshadError::FolderNotFound("/path/to/folder".to_string()),
        IrshadError::Asset("logo.png".to_string()),
        IrshadError::Font("Amiri.ttf".to_string()),
        IrshadError::Capture("page 2".to_string()),
        IrshadError::EmptyContent,
        IrshadError::PdfGeneration("save".to_string()),
        IrshadError::Storage("reports.json".to_string()),
        IrshadError::ReportNotFound("abc".to_string()),
    ];

    for err in errors {
        let display = format!("{}", err);
        assert!(!display.is_empty(), "empty message: {:?}", err);
    }
}

/// The missing-title error is what the user sees for an untitled report
#[test]
fn test_missing_title_message() {
    let display = format!("{}", IrshadError::MissingTitle);
    assert!(display.contains("عنوان"));
}

/// Conversion from IO errors
#[test]
fn test_io_error_conversion() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let err: IrshadError = io_err.into();

    assert!(matches!(err, IrshadError::Io(_)));
    assert!(format!("{}", err).contains("file not found"));
}

/// Conversion from JSON errors
#[test]
fn test_json_error_conversion() {
    let json_err = serde_json::from_str::<serde_json::Value>("{ invalid }").unwrap_err();
    let err: IrshadError = json_err.into();

    assert!(matches!(err, IrshadError::JsonParse(_)));
}

/// Common errors pass through unchanged
#[test]
fn test_common_error_transparent() {
    let common_err = irshad_common::Error::Import("ليست قائمة".to_string());
    let err: IrshadError = common_err.into();

    assert!(matches!(err, IrshadError::Common(_)));
    assert_eq!(format!("{}", err), "Import error: ليست قائمة");
}

/// A broken template is a template error
#[test]
fn test_template_parse_error() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("report.xhtml");
    std::fs::write(&path, "<section class=\"page\"><p>نص</section>").unwrap();

    let err = template::load_template(&path).unwrap_err();
    assert!(matches!(err, IrshadError::Common(irshad_common::Error::Template(_))));
}

/// Importing a non-array leaves existing data alone
#[test]
fn test_option_import_error_keeps_data() {
    let dir = tempdir().expect("Failed to create temp dir");
    let store = OptionStore::open(dir.path());
    store.import("activities", r#"["حصة إعلامية"]"#).unwrap();

    assert!(store.import("activities", r#""text""#).is_err());
    assert!(store.import("activities", "not json").is_err());
    assert_eq!(store.load("activities").unwrap().len(), 1);
}

/// Corrupt persisted state falls back to defaults
#[test]
fn test_corrupt_state_falls_back() {
    let dir = tempdir().expect("Failed to create temp dir");
    std::fs::write(dir.path().join("reports.json"), "[{").unwrap();
    std::fs::write(dir.path().join("settings.json"), "]").unwrap();

    assert!(ReportStore::open(dir.path()).list().is_empty());
    assert_eq!(SettingsStore::open(dir.path()).current().timezone, "Africa/Tunis");
}

/// Unknown report id
#[test]
fn test_report_not_found() {
    let dir = tempdir().expect("Failed to create temp dir");
    let err = ReportStore::open(dir.path()).get("missing").unwrap_err();
    assert!(matches!(err, IrshadError::ReportNotFound(_)));
}
