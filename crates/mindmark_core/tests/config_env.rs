use mindmark_core::{AppConfig, ConfigError};
use std::io::Write;

#[test]
fn load_reads_json_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"export_dir":"exports","outline_service":{{"model":"local-model","temperature":0.2}}}}"#
    )
    .unwrap();

    let config = AppConfig::load(file.path()).unwrap();
    assert_eq!(config.export_dir.to_str(), Some("exports"));
    assert_eq!(config.outline_service.model, "local-model");
    assert_eq!(config.outline_service.temperature, 0.2);
    config.validate().unwrap();
}

#[test]
fn load_reports_missing_file() {
    let temp = tempfile::tempdir().unwrap();
    let err = AppConfig::load(temp.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
    assert!(err.to_string().contains("absent.json"));
}
