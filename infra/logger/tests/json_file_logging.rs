use ocrhub_logger::{LevelFilter, Logger};
use std::fs;
use std::time::Duration;
use tempfile::tempdir;

#[test]
fn json_file_logging_writes_structured_fields() -> Result<(), Box<dyn std::error::Error>> {
    let tmp_dir = tempdir()?;
    let log_dir = tmp_dir.path().join("logs");

    let logger = Logger::builder("ocrhub-json")
        .stdout(false)
        .json(true)
        .dir(&log_dir)
        .directives("info,json_file_logging=debug")
        .level(LevelFilter::WARN)
        .init()?;

    let span = tracing::info_span!("recognition", job_id = "Jb7xQ2mN4pRs");
    span.in_scope(|| tracing::debug!(language = "es", pages = 1, "Recognition finished"));

    std::thread::sleep(Duration::from_millis(30));
    drop(logger);

    let log_file = fs::read_dir(&log_dir)?
        .flatten()
        .map(|entry| entry.path())
        .find(|path| path.extension().and_then(|ext| ext.to_str()) == Some("log"))
        .expect("log file should be created");

    let content = fs::read_to_string(log_file)?;
    let line = content.lines().find(|l| l.contains("Recognition finished")).expect("event line");
    assert!(line.starts_with('{'), "expected a JSON object, got: {line}");
    assert!(line.contains("\"language\":\"es\""));
    assert!(line.contains("\"job_id\":\"Jb7xQ2mN4pRs\""), "current span fields missing: {line}");

    Ok(())
}
