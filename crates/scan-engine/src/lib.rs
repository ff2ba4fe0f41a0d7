//! apkscope 스캔 엔진
//!
//! 디컴파일 출력 디렉토리를 재귀적으로 순회하며 분석기별 패턴으로 발견 항목을 추출하고,
//! 프로젝트 단위로 저장한 뒤 발견 이벤트를 발행합니다.
//!
//! # Module Structure
//!
//! - [`error`]: 도메인 에러 (`ScanEngineError`)
//! - [`analyzer`]: 분석기 trait과 기본 분석기 (`Analyzer`, `UrlAnalyzer`, `FirebaseKeyAnalyzer`)
//! - [`walker`]: 파일 순회와 관대한 텍스트 디코딩
//! - [`engine`]: 분석기 선택과 실행 (`ScanEngine`, `ScanEngineBuilder`, `ScanReport`)
//!
//! # Architecture
//!
//! ```text
//! requested names ──> registry lookup ──(unknown)──> console error, skip
//!                            |
//!                       for each analyzer (listed order)
//!                            |
//!          walker::walk_files ──> read_text_lossy ──> Analyzer::find_matches
//!                                                          |
//!                                  FindingStore::add_* ──> finding event
//! ```

pub mod analyzer;
pub mod engine;
pub mod error;
pub mod walker;

pub use analyzer::{Analyzer, FirebaseKeyAnalyzer, UrlAnalyzer};
pub use engine::{AnalyzerReport, ScanEngine, ScanEngineBuilder, ScanReport};
pub use error::ScanEngineError;
