//! 저장소 에러 타입
//!
//! [`StoreError`]는 SQLite 저장소와 아티팩트 디렉토리 관리에서 발생하는 에러입니다.
//! `From<StoreError> for ApkscopeError` 구현으로 `?` 연산자를 통해 상위로 전파됩니다.

use apkscope_core::error::{ApkscopeError, StorageError};

/// 저장소 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// 데이터베이스 열기 실패
    #[error("failed to open database {path}: {reason}")]
    Open {
        /// 데이터베이스 파일 경로
        path: String,
        /// 실패 사유
        reason: String,
    },

    /// SQL 실행 실패
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// 저장된 값을 도메인 타입으로 변환하지 못함
    #[error("corrupt row in {table}: {reason}")]
    CorruptRow {
        /// 테이블 이름
        table: &'static str,
        /// 변환 실패 사유
        reason: String,
    },

    /// 파일명이 정리 후 비어 있음
    #[error("invalid filename: '{0}'")]
    InvalidFilename(String),

    /// 출력 루트 밖을 가리키는 경로
    #[error("path escapes output root: {0}")]
    PathTraversal(String),

    /// 입력이 이미 업로드 디렉토리의 스테이징 위치에 있음
    #[error("input is already staged in the upload directory: {0}")]
    AlreadyStaged(String),

    /// 파일이 존재하지 않거나 일반 파일이 아님
    #[error("file not found: {0}")]
    NotFound(String),

    /// 파일 I/O 에러
    #[error("io error: {path}: {source}")]
    Io {
        /// 관련 경로
        path: String,
        /// 원본 I/O 에러
        source: std::io::Error,
    },
}

impl StoreError {
    pub(crate) fn io(path: impl AsRef<std::path::Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().display().to_string(),
            source,
        }
    }
}

impl From<StoreError> for ApkscopeError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Open { .. } => {
                ApkscopeError::Storage(StorageError::Connection(err.to_string()))
            }
            StoreError::NotFound(path) => ApkscopeError::Storage(StorageError::NotFound(path)),
            StoreError::Io { source, .. } => ApkscopeError::Io(source),
            other => ApkscopeError::Storage(StorageError::Query(other.to_string())),
        }
    }
}
