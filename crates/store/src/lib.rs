//! apkscope 저장소
//!
//! # Module Structure
//!
//! - [`error`]: 도메인 에러 (`StoreError`)
//! - [`sqlite`]: SQLite 기반 [`FindingStore`](apkscope_core::FindingStore) 구현 (`SqliteFindingStore`)
//! - [`memory`]: 메모리 기반 구현 (`MemoryFindingStore`), 테스트와 일회성 실행용
//! - [`artifacts`]: 업로드 파일과 디컴파일 출력 디렉토리 관리 (`ArtifactStore`)
//!
//! # Architecture
//!
//! ```text
//! upload ──> ArtifactStore::stage_upload ──> <upload_dir>/<sanitized name>
//!                                                  |
//!                        decompiler ──> <output_dir>/<stem>/...
//!                                                  |
//!            scan engine ──> FindingStore ──> projects / endpoints / firebase_keys
//! ```

pub mod artifacts;
pub mod error;
pub mod memory;
pub mod sqlite;

pub use artifacts::{ArtifactStore, WipeReport, sanitize_filename};
pub use error::StoreError;
pub use memory::MemoryFindingStore;
pub use sqlite::SqliteFindingStore;
