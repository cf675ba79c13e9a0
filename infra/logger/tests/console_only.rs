use ocrhub_logger::{LevelFilter, Logger};

#[test]
fn stdout_only_logger_has_no_file_worker() {
    let logger = Logger::builder("ocrhub-stdout-only")
        .level(LevelFilter::INFO)
        .init()
        .expect("logger should initialize");

    assert!(!logger.writes_files(), "stdout-only logger should not spawn a file worker");
}
