//! apkscope 디컴파일러 러너
//!
//! 외부 디컴파일러(`jadx` 기본)를 자식 프로세스로 실행하고,
//! stdout/stderr를 합친 출력의 각 줄을 쓰인 순서대로 콘솔 이벤트로 전달한 뒤
//! 종료 코드로 성공/실패를 판정합니다.
//!
//! # Module Structure
//!
//! - [`error`]: 도메인 에러 (`DecompilerError`)
//! - [`output`]: 줄 단위 출력 스트림 (`OutputLines`)
//! - [`runner`]: 프로세스 실행과 이벤트 발행 (`DecompilerRunner`, `DecompileReport`)
//!
//! # Architecture
//!
//! ```text
//! DecompilerRunner::spawn ──> Child ──┬── stdout ──┐
//!                                     └── stderr ──┴──> pipe ──> reader task ──> mpsc ──> OutputLines
//!                                                                                           |
//!                  DecompilerRunner::run ──> console_output events <────────────────────────┘
//!                                     └────> child.wait() ──> decompile_complete
//! ```

pub mod error;
pub mod output;
pub mod runner;

pub use error::DecompilerError;
pub use output::OutputLines;
pub use runner::{DecompileReport, DecompilerRunner, RunningDecompile};
