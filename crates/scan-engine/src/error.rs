//! 스캔 엔진 에러 타입
//!
//! 파일 단위 에러는 이벤트로만 보고되고 여기까지 올라오지 않습니다.
//! 이 타입은 엔진 구성과 blocking 태스크 실행 실패를 나타냅니다.

use apkscope_core::error::{ApkscopeError, PipelineError, ScanError};

/// 스캔 엔진 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum ScanEngineError {
    /// 분석기 패턴 컴파일 실패
    #[error("invalid pattern for analyzer '{analyzer}': {source}")]
    Pattern {
        analyzer: &'static str,
        source: regex::Error,
    },

    /// 빌더 설정 에러
    #[error("config error: {field}: {reason}")]
    Config { field: String, reason: String },

    /// 같은 이름의 분석기가 두 번 등록됨
    #[error("duplicate analyzer: {0}")]
    DuplicateAnalyzer(String),

    /// blocking 태스크 join 실패
    #[error("scan task failed: {0}")]
    TaskJoin(String),
}

impl From<ScanEngineError> for ApkscopeError {
    fn from(err: ScanEngineError) -> Self {
        match err {
            ScanEngineError::TaskJoin(msg) => ApkscopeError::Pipeline(PipelineError::TaskJoin(msg)),
            other => ApkscopeError::Scan(ScanError::Persist(other.to_string())),
        }
    }
}
