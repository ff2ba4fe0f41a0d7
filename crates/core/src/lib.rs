//! apkscope 공통 크레이트
//!
//! 디컴파일 → 분석 파이프라인의 모든 크레이트가 공유하는 타입을 정의합니다.
//!
//! - [`config`]: `apkscope.toml` 설정 (`ApkscopeConfig`)
//! - [`error`]: 최상위 에러 (`ApkscopeError`)와 도메인별 에러
//! - [`event`]: 진행 이벤트 (`PipelineEvent`), 이벤트 버스 (`EventBus`), `EventSink` trait
//! - [`metrics`]: 메트릭 이름 상수
//! - [`store`]: 발견 항목 저장소 trait (`FindingStore`)
//! - [`types`]: 도메인 타입 (`Project`, `Endpoint`, `FirebaseKey`, `JobPhase` ...)

pub mod config;
pub mod error;
pub mod event;
pub mod metrics;
pub mod store;
pub mod types;

// 에러
pub use error::{
    ApkscopeError, ConfigError, DecompileError, PipelineError, ScanError, StorageError,
};

// 설정
pub use config::ApkscopeConfig;

// 이벤트
pub use event::{
    EventBus, EventEmitter, EventEnvelope, EventMetadata, EventSink, PipelineEvent, RecordingSink,
};

// 저장소 trait
pub use store::FindingStore;

// 도메인 타입
pub use types::{
    AnalysisStatus, ConsoleLevel, DecompileStatus, Endpoint, FindingKind, FirebaseKey, HttpMethod,
    JobOutcome, JobPhase, Project, ProjectId,
};
