//! 출력 디렉토리 순회와 파일 읽기 (동기 I/O)
//!
//! `tokio::task::spawn_blocking` 안에서 호출되어야 합니다.

use std::fmt;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// 파일 하나를 처리하지 못한 이유
#[derive(Debug)]
pub enum FileFault {
    /// 디렉토리 순회 중 에러 (권한, 깨진 링크 등)
    Walk(walkdir::Error),
    /// 읽기 실패
    Read(std::io::Error),
    /// 설정된 최대 크기 초과
    TooLarge { size: u64, max: usize },
}

impl fmt::Display for FileFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Walk(e) => write!(f, "{e}"),
            Self::Read(e) => write!(f, "{e}"),
            Self::TooLarge { size, max } => {
                write!(f, "file too large ({size} bytes, max {max})")
            }
        }
    }
}

/// 순회 결과 한 건
#[derive(Debug)]
pub enum WalkItem {
    /// 정규 파일 경로
    File(PathBuf),
    /// 경로를 알 수 있으면 경로와 함께 전달되는 순회 에러
    Fault(Option<PathBuf>, FileFault),
}

/// `root` 아래의 모든 정규 파일을 재귀적으로 나열합니다. 확장자로 거르지 않습니다.
///
/// 심볼릭 링크는 따라가지 않습니다. 같은 디렉토리 안에서는 파일명 순서입니다.
pub fn walk_files(root: &Path) -> impl Iterator<Item = WalkItem> {
    WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) if entry.file_type().is_file() => {
                Some(WalkItem::File(entry.into_path()))
            }
            Ok(_) => None,
            Err(e) => {
                let path = e.path().map(Path::to_path_buf);
                Some(WalkItem::Fault(path, FileFault::Walk(e)))
            }
        })
}

/// 파일을 텍스트로 읽습니다. 디코딩할 수 없는 바이트 시퀀스는 U+FFFD로 바꿉니다.
pub fn read_text_lossy(path: &Path, max_file_size: usize) -> Result<String, FileFault> {
    let metadata = std::fs::metadata(path).map_err(FileFault::Read)?;
    let size = metadata.len();
    if usize::try_from(size).unwrap_or(usize::MAX) > max_file_size {
        return Err(FileFault::TooLarge {
            size,
            max: max_file_size,
        });
    }

    let bytes = std::fs::read(path).map_err(FileFault::Read)?;
    Ok(match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    })
}
