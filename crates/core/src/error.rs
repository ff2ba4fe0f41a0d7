//! 에러 타입: 도메인별 에러 정의

/// apkscope 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum ApkscopeError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 파이프라인 처리 에러
    #[error("pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// 디컴파일러 실행 에러
    #[error("decompile error: {0}")]
    Decompile(#[from] DecompileError),

    /// 스캔 엔진 에러
    #[error("scan error: {0}")]
    Scan(#[from] ScanError),

    /// 스토리지 에러
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 파이프라인 처리 에러
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// 작업 태스크 join 실패 (panic 또는 취소)
    #[error("job task failed: {0}")]
    TaskJoin(String),

    /// 프로젝트 생성 실패
    #[error("project creation failed: {0}")]
    ProjectCreation(String),

    /// 입력 파일 경로가 올바르지 않음
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// 외부 디컴파일러 실행 에러
#[derive(Debug, thiserror::Error)]
pub enum DecompileError {
    /// 실행 파일을 찾을 수 없음
    #[error("decompiler not found: {program}")]
    ToolNotFound { program: String },

    /// 프로세스 실행 실패
    #[error("spawn failed: {0}")]
    Spawn(String),

    /// 출력 스트림 읽기 또는 대기 실패
    #[error("stream failed: {0}")]
    Stream(String),
}

/// 스캔 엔진 에러
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// 등록되지 않은 분석기 이름
    #[error("unknown analyzer: {0}")]
    UnknownAnalyzer(String),

    /// 파일 읽기 실패
    #[error("failed to read {path}: {reason}")]
    FileRead { path: String, reason: String },

    /// 결과 저장 실패
    #[error("failed to persist finding: {0}")]
    Persist(String),
}

/// 스토리지 에러
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// 연결 실패
    #[error("connection failed: {0}")]
    Connection(String),

    /// 쿼리 실패
    #[error("query failed: {0}")]
    Query(String),

    /// 대상을 찾을 수 없음
    #[error("not found: {0}")]
    NotFound(String),
}
