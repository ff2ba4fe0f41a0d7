//! apkscope.toml 통합 설정 테스트
//!
//! - apkscope.toml.example 파싱 테스트
//! - 파일 로딩 + 환경변수 우선순위 테스트
//! - 빈 파일 / 잘못된 형식 에러 테스트

use apkscope_core::config::ApkscopeConfig;
use apkscope_core::error::{ApkscopeError, ConfigError};
use serial_test::serial;

#[test]
fn example_config_parses_successfully() {
    let content = include_str!("../../../apkscope.toml.example");
    let config = ApkscopeConfig::parse(content).expect("example config should parse");

    assert_eq!(config.general.log_level, "info");
    assert_eq!(config.decompiler.program, "jadx");
    assert_eq!(config.decompiler.extra_args, vec!["-v"]);
    assert_eq!(config.artifacts.output_dir, "/tmp/decompiled");
    assert_eq!(config.scan.max_file_size, 64 * 1024 * 1024);
}

#[test]
fn example_config_passes_validation() {
    let content = include_str!("../../../apkscope.toml.example");
    let config = ApkscopeConfig::parse(content).expect("should parse");
    config
        .validate()
        .expect("example config should pass validation");
}

#[tokio::test]
#[serial]
async fn load_applies_env_over_file() {
    let dir = tempfile::tempdir().expect("should create temp dir");
    let path = dir.path().join("apkscope.toml");
    std::fs::write(
        &path,
        "[decompiler]\nprogram = \"/opt/jadx/bin/jadx\"\n[storage]\ndatabase_path = \"file.db\"\n",
    )
    .expect("should write config");

    // SAFETY: serial 테스트로 다른 테스트와 동시에 환경변수를 조작하지 않습니다.
    unsafe { std::env::set_var("APKSCOPE_STORAGE_DATABASE_PATH", "/var/lib/apkscope/env.db") };
    let config = ApkscopeConfig::load(&path).await.expect("should load");
    unsafe { std::env::remove_var("APKSCOPE_STORAGE_DATABASE_PATH") };

    assert_eq!(config.decompiler.program, "/opt/jadx/bin/jadx");
    assert_eq!(config.storage.database_path, "/var/lib/apkscope/env.db");
}

#[tokio::test]
#[serial]
async fn load_rejects_invalid_env_value() {
    let dir = tempfile::tempdir().expect("should create temp dir");
    let path = dir.path().join("apkscope.toml");
    std::fs::write(&path, "").expect("should write config");

    // SAFETY: serial 테스트로 다른 테스트와 동시에 환경변수를 조작하지 않습니다.
    unsafe { std::env::set_var("APKSCOPE_GENERAL_LOG_FORMAT", "xml") };
    let result = ApkscopeConfig::load(&path).await;
    unsafe { std::env::remove_var("APKSCOPE_GENERAL_LOG_FORMAT") };

    let err = result.expect_err("xml log format should be rejected");
    assert!(matches!(
        err,
        ApkscopeError::Config(ConfigError::InvalidValue { .. })
    ));
}

#[tokio::test]
async fn malformed_file_reports_parse_failure() {
    let dir = tempfile::tempdir().expect("should create temp dir");
    let path = dir.path().join("bad.toml");
    std::fs::write(&path, "[general\nlog_level = \"info\"\n").expect("should write config");

    let err = ApkscopeConfig::from_file(&path)
        .await
        .expect_err("malformed TOML should fail");
    assert!(matches!(
        err,
        ApkscopeError::Config(ConfigError::ParseFailed { .. })
    ));
}

#[tokio::test]
async fn empty_file_uses_defaults() {
    let dir = tempfile::tempdir().expect("should create temp dir");
    let path = dir.path().join("empty.toml");
    std::fs::write(&path, "").expect("should write config");

    let config = ApkscopeConfig::from_file(&path).await.expect("should load");
    assert_eq!(config.scan.default_analyzers, vec!["regex", "firebase"]);
}
