// tests/logging_test.rs
// The subscriber is process-global, so everything runs in a single test.
use mc_pricer::logging;
use mc_pricer::PricerError;
use std::fs;

#[test]
fn test_log_file_receives_events() {
    let path = std::env::temp_dir().join(format!("mc_pricer_log_{}.log", std::process::id()));
    fs::remove_file(&path).ok();

    logging::init("info", Some(&path)).expect("first init succeeds");
    tracing::warn!(samples = 42u64, "log file check");

    let contents = fs::read_to_string(&path).expect("log file was created");
    println!("\n{}", contents);
    assert!(contents.contains("log file check"), "missing event: {}", contents);
    assert!(contents.contains("samples=42"));
    assert!(!contents.contains('\u{1b}'), "file output must not carry ANSI codes");

    let again = logging::init("info", None).unwrap_err();
    assert!(matches!(again, PricerError::Config(_)));

    fs::remove_file(&path).ok();
}
