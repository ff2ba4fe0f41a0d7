//! apkscope 파이프라인 오케스트레이터
//!
//! 입력 파일 하나를 작업 하나로 받아 디컴파일 → 프로젝트 생성 → 분석 순서로 실행합니다.
//! 각 작업은 자체 tokio 태스크에서 실행되며 제출은 즉시 [`JobHandle`]을 반환합니다.
//! 동시 작업 수 제한이나 큐는 없습니다.
//!
//! # Module Structure
//!
//! - [`job`]: 작업 핸들과 결과 (`JobHandle`, `JobReport`)
//! - [`orchestrator`]: 작업 실행기 (`Orchestrator`, `OrchestratorBuilder`)
//!
//! # 작업 상태 전이
//!
//! ```text
//! queued ──> decompiling ──(exit 0)──> analyzing ──> done
//!                 |
//!                 +──(launch error / exit != 0 / project error)──> failed
//! ```

pub mod job;
pub mod orchestrator;

pub use job::{JobHandle, JobReport};
pub use orchestrator::{Orchestrator, OrchestratorBuilder, PROJECT_NAME_PREFIX};
