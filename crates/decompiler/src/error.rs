//! 디컴파일러 에러 타입

use apkscope_core::error::{ApkscopeError, DecompileError};

/// 디컴파일러 실행 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum DecompilerError {
    /// 실행 파일을 찾을 수 없음
    #[error("{program} not found")]
    NotFound {
        /// 실행하려던 프로그램
        program: String,
    },

    /// 프로세스 실행 실패 (권한 등)
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    /// 출력 디렉토리 생성 실패
    #[error("failed to create output directory {path}: {source}")]
    OutputDir {
        path: String,
        source: std::io::Error,
    },

    /// 출력 스트림 읽기 실패
    #[error("failed to read process output: {0}")]
    Stream(std::io::Error),

    /// 프로세스 종료 대기 실패
    #[error("failed to wait for process: {0}")]
    Wait(std::io::Error),

    /// 출력 파이프 생성 실패
    #[error("failed to set up output pipe: {0}")]
    Pipe(std::io::Error),
}

impl From<DecompilerError> for ApkscopeError {
    fn from(err: DecompilerError) -> Self {
        match err {
            DecompilerError::NotFound { program } => {
                ApkscopeError::Decompile(DecompileError::ToolNotFound { program })
            }
            DecompilerError::Spawn { .. }
            | DecompilerError::OutputDir { .. }
            | DecompilerError::Pipe(_) => {
                ApkscopeError::Decompile(DecompileError::Spawn(err.to_string()))
            }
            DecompilerError::Stream(_) | DecompilerError::Wait(_) => {
                ApkscopeError::Decompile(DecompileError::Stream(err.to_string()))
            }
        }
    }
}
