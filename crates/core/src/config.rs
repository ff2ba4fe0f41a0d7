//! 설정 관리: apkscope.toml 파싱 및 런타임 설정
//!
//! [`ApkscopeConfig`]는 모든 크레이트의 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`APKSCOPE_DECOMPILER_PROGRAM=/opt/jadx/bin/jadx` 형식)
//! 3. 설정 파일 (`apkscope.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), apkscope_core::error::ApkscopeError> {
//! use apkscope_core::config::ApkscopeConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = ApkscopeConfig::load("apkscope.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = ApkscopeConfig::parse("[general]\nlog_level = \"debug\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ApkscopeError, ConfigError};
use crate::event::DEFAULT_CHANNEL_CAPACITY;

/// 기본 제공 분석기 이름 (실행 순서)
pub const BUILTIN_ANALYZERS: &[&str] = &["regex", "firebase"];

/// 데이터베이스 경로를 지정하는 레거시 환경변수
pub const LEGACY_DB_PATH_ENV: &str = "SQLITE_DB_PATH";

/// apkscope 통합 설정
///
/// `apkscope.toml` 파일의 최상위 구조를 나타냅니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApkscopeConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 외부 디컴파일러 설정
    #[serde(default)]
    pub decompiler: DecompilerConfig,
    /// 발견 항목 저장소 설정
    #[serde(default)]
    pub storage: StorageConfig,
    /// 업로드/출력 디렉토리 설정
    #[serde(default)]
    pub artifacts: ArtifactsConfig,
    /// 스캔 엔진 설정
    #[serde(default)]
    pub scan: ScanConfig,
    /// 이벤트 버스 설정
    #[serde(default)]
    pub events: EventsConfig,
}

impl ApkscopeConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ApkscopeError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// 파일이 없으면 기본값에서 시작하는 [`load`](Self::load)
    pub async fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ApkscopeError> {
        let mut config = match Self::from_file(path).await {
            Ok(config) => config,
            Err(ApkscopeError::Config(ConfigError::FileNotFound { .. })) => Self::default(),
            Err(e) => return Err(e),
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, ApkscopeError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ApkscopeError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                ApkscopeError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, ApkscopeError> {
        toml::from_str(toml_str).map_err(|e| {
            ApkscopeError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `APKSCOPE_{SECTION}_{FIELD}`
    /// `SQLITE_DB_PATH`도 데이터베이스 경로로 인식하며, `APKSCOPE_STORAGE_DATABASE_PATH`가 우선합니다.
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "APKSCOPE_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "APKSCOPE_GENERAL_LOG_FORMAT");

        // Decompiler
        override_string(
            &mut self.decompiler.program,
            "APKSCOPE_DECOMPILER_PROGRAM",
        );
        override_args(
            &mut self.decompiler.extra_args,
            "APKSCOPE_DECOMPILER_EXTRA_ARGS",
        );

        // Storage
        if let Ok(val) = std::env::var(LEGACY_DB_PATH_ENV) {
            self.storage.database_path = strip_sqlite_url(&val).to_owned();
        }
        override_string(
            &mut self.storage.database_path,
            "APKSCOPE_STORAGE_DATABASE_PATH",
        );
        override_u64(
            &mut self.storage.busy_timeout_ms,
            "APKSCOPE_STORAGE_BUSY_TIMEOUT_MS",
        );

        // Artifacts
        override_string(
            &mut self.artifacts.upload_dir,
            "APKSCOPE_ARTIFACTS_UPLOAD_DIR",
        );
        override_string(
            &mut self.artifacts.output_dir,
            "APKSCOPE_ARTIFACTS_OUTPUT_DIR",
        );

        // Scan
        override_csv(
            &mut self.scan.default_analyzers,
            "APKSCOPE_SCAN_DEFAULT_ANALYZERS",
        );
        override_usize(&mut self.scan.max_file_size, "APKSCOPE_SCAN_MAX_FILE_SIZE");

        // Events
        override_usize(
            &mut self.events.channel_capacity,
            "APKSCOPE_EVENTS_CHANNEL_CAPACITY",
        );
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), ApkscopeError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(invalid(
                "general.log_level",
                format!("must be one of: {}", valid_levels.join(", ")),
            ));
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(invalid(
                "general.log_format",
                format!("must be one of: {}", valid_formats.join(", ")),
            ));
        }

        if self.decompiler.program.trim().is_empty() {
            return Err(invalid("decompiler.program", "must not be empty"));
        }

        // -d 와 입력 경로는 러너가 직접 붙입니다
        if self.decompiler.extra_args.iter().any(|a| a == "-d") {
            return Err(invalid(
                "decompiler.extra_args",
                "must not contain '-d' (output directory is set per job)",
            ));
        }

        if self.storage.database_path.is_empty() {
            return Err(invalid("storage.database_path", "must not be empty"));
        }

        if self.artifacts.upload_dir.is_empty() {
            return Err(invalid("artifacts.upload_dir", "must not be empty"));
        }
        if self.artifacts.output_dir.is_empty() {
            return Err(invalid("artifacts.output_dir", "must not be empty"));
        }

        for name in &self.scan.default_analyzers {
            if !BUILTIN_ANALYZERS.contains(&name.as_str()) {
                return Err(invalid(
                    "scan.default_analyzers",
                    format!(
                        "unknown analyzer '{}', expected one of: {}",
                        name,
                        BUILTIN_ANALYZERS.join(", ")
                    ),
                ));
            }
        }

        if self.scan.max_file_size == 0 {
            return Err(invalid("scan.max_file_size", "must be greater than 0"));
        }

        if self.events.channel_capacity == 0 {
            return Err(invalid("events.channel_capacity", "must be greater than 0"));
        }

        Ok(())
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> ApkscopeError {
    ConfigError::InvalidValue {
        field: field.to_owned(),
        reason: reason.into(),
    }
    .into()
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "pretty".to_owned(),
        }
    }
}

/// 외부 디컴파일러 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DecompilerConfig {
    /// 실행 파일 이름 또는 경로 (PATH에서 탐색)
    pub program: String,
    /// `-d <output> <input>` 앞에 붙는 추가 인자 (예: `["-v"]`)
    pub extra_args: Vec<String>,
}

impl Default for DecompilerConfig {
    fn default() -> Self {
        Self {
            program: "jadx".to_owned(),
            extra_args: Vec::new(),
        }
    }
}

/// 발견 항목 저장소 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite 데이터베이스 파일 경로
    pub database_path: String,
    /// 쓰기 잠금 대기 시간 (밀리초)
    pub busy_timeout_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: "api_discovery.db".to_owned(),
            busy_timeout_ms: 5_000,
        }
    }
}

/// 업로드/출력 디렉토리 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactsConfig {
    /// 업로드된 입력 파일 보관 디렉토리
    pub upload_dir: String,
    /// 작업별 디컴파일 출력 루트
    pub output_dir: String,
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            upload_dir: "/tmp/uploads".to_owned(),
            output_dir: "/tmp/decompiled".to_owned(),
        }
    }
}

/// 스캔 엔진 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// 요청에 분석기 목록이 없을 때 사용할 분석기
    pub default_analyzers: Vec<String>,
    /// 이 크기를 넘는 파일은 건너뜁니다 (바이트)
    pub max_file_size: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            default_analyzers: BUILTIN_ANALYZERS.iter().map(|s| (*s).to_owned()).collect(),
            max_file_size: 64 * 1024 * 1024, // 64MB
        }
    }
}

/// 이벤트 버스 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EventsConfig {
    /// broadcast 채널 용량 (느린 구독자는 이보다 오래된 이벤트를 잃음)
    pub channel_capacity: usize,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

/// `sqlite:///relative.db`, `sqlite:////abs/path.db` 형식의 URL에서 파일 경로만 남깁니다.
/// URL 형식이 아니면 그대로 반환합니다.
fn strip_sqlite_url(value: &str) -> &str {
    value
        .strip_prefix("sqlite:///")
        .or_else(|| value.strip_prefix("sqlite://"))
        .unwrap_or(value)
}

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}

fn override_u64(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}

fn override_csv(target: &mut Vec<String>, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val
            .split(',')
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
            .collect();
    }
}

/// 공백으로 구분된 인자 목록
fn override_args(target: &mut Vec<String>, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val.split_whitespace().map(str::to_owned).collect();
    }
}
