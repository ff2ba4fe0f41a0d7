//! 업로드 파일과 디컴파일 출력 디렉토리 관리
//!
//! 입력 파일은 `<upload_dir>/<정리된 파일명>`에 보관되고,
//! 작업별 출력은 `<output_dir>/<입력 파일명 stem>`에 생성됩니다.
//! stem이 같은 두 업로드는 같은 출력 디렉토리를 공유하며, 충돌 검사는 하지 않습니다.

use std::path::{Component, Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use apkscope_core::config::ArtifactsConfig;

use crate::error::StoreError;

/// 업로드 파일명을 안전한 형태로 정리합니다.
///
/// - 경로 구분자와 공백은 `_`로 바뀝니다 (연속된 공백은 하나로)
/// - ASCII 영숫자, `.`, `_`, `-` 외의 문자는 제거됩니다
/// - 앞뒤의 `.`과 `_`는 제거됩니다
///
/// 정리 결과가 비어 있으면 [`StoreError::InvalidFilename`]을 반환합니다.
pub fn sanitize_filename(name: &str) -> Result<String, StoreError> {
    let spaced: String = name
        .chars()
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();
    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");
    let filtered: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();
    let trimmed = filtered.trim_matches(|c| c == '.' || c == '_');

    if trimmed.is_empty() {
        return Err(StoreError::InvalidFilename(name.to_owned()));
    }
    Ok(trimmed.to_owned())
}

/// 출력 디렉토리 정리 결과
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WipeReport {
    /// 삭제된 최상위 디렉토리 이름 (정렬됨)
    pub folders: Vec<String>,
    /// 최상위에서 삭제된 일반 파일 수
    pub files_removed: usize,
}

/// 업로드/출력 디렉토리 관리자
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    upload_dir: PathBuf,
    output_dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(upload_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
            output_dir: output_dir.into(),
        }
    }

    /// `[artifacts]` 설정으로 생성합니다.
    pub fn from_config(config: &ArtifactsConfig) -> Self {
        Self::new(&config.upload_dir, &config.output_dir)
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// 업로드 디렉토리와 출력 루트를 생성합니다.
    pub async fn ensure_dirs(&self) -> Result<(), StoreError> {
        for dir in [&self.upload_dir, &self.output_dir] {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| StoreError::io(dir, e))?;
        }
        Ok(())
    }

    /// 로컬 파일을 업로드 디렉토리로 복사하고 보관 경로를 반환합니다.
    pub async fn stage_upload(&self, src: &Path) -> Result<PathBuf, StoreError> {
        let original = src
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| StoreError::InvalidFilename(src.display().to_string()))?;
        let dest = self.upload_dir.join(sanitize_filename(&original)?);

        tokio::fs::create_dir_all(&self.upload_dir)
            .await
            .map_err(|e| StoreError::io(&self.upload_dir, e))?;
        // 이미 업로드 디렉토리에 있는 파일을 자기 자신 위로 복사하면 내용이 잘립니다.
        if same_file(src, &dest).await {
            return Err(StoreError::AlreadyStaged(src.display().to_string()));
        }
        tokio::fs::copy(src, &dest)
            .await
            .map_err(|e| StoreError::io(src, e))?;

        debug!(src = %src.display(), dest = %dest.display(), "upload staged");
        Ok(dest)
    }

    /// 입력 파일에 대응하는 작업 출력 디렉토리 (`<output_dir>/<stem>`)
    pub fn output_dir_for(&self, input: &Path) -> Result<PathBuf, StoreError> {
        let stem = input
            .file_stem()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| StoreError::InvalidFilename(input.display().to_string()))?;
        Ok(self.output_dir.join(stem))
    }

    /// 처리된 입력 파일을 삭제합니다.
    pub async fn remove_input(&self, input: &Path) -> Result<(), StoreError> {
        tokio::fs::remove_file(input)
            .await
            .map_err(|e| StoreError::io(input, e))?;
        debug!(path = %input.display(), "input removed");
        Ok(())
    }

    /// 출력 루트 아래 모든 일반 파일의 상대 경로를 반환합니다 (정렬됨, `/` 구분).
    ///
    /// 출력 루트가 없으면 빈 목록입니다.
    pub async fn list_outputs(&self) -> Result<Vec<String>, StoreError> {
        let root = self.output_dir.clone();
        tokio::task::spawn_blocking(move || collect_relative_files(&root))
            .await
            .map_err(|e| StoreError::io(&self.output_dir, std::io::Error::other(e.to_string())))?
    }

    /// 출력 루트 기준 상대 경로의 파일 내용을 읽습니다.
    ///
    /// 존재하지 않거나 일반 파일이 아니면 [`StoreError::NotFound`]입니다.
    pub async fn read_output(&self, relative: &str) -> Result<Vec<u8>, StoreError> {
        let full = self.resolve_output(relative)?;
        match tokio::fs::metadata(&full).await {
            Ok(meta) if meta.is_file() => {}
            _ => return Err(StoreError::NotFound(full.display().to_string())),
        }
        tokio::fs::read(&full)
            .await
            .map_err(|e| StoreError::io(&full, e))
    }

    /// 상대 경로를 출력 루트 아래 경로로 변환합니다.
    ///
    /// 절대 경로와 `..` 구성요소는 거부합니다.
    pub fn resolve_output(&self, relative: &str) -> Result<PathBuf, StoreError> {
        let rel = Path::new(relative);
        let escapes = rel.components().any(|c| {
            matches!(
                c,
                Component::ParentDir | Component::RootDir | Component::Prefix(_)
            )
        });
        if escapes || relative.is_empty() {
            return Err(StoreError::PathTraversal(relative.to_owned()));
        }
        Ok(self.output_dir.join(rel))
    }

    /// 출력 루트 아래 모든 항목을 삭제합니다. 루트 자체는 유지됩니다.
    pub async fn wipe_outputs(&self) -> Result<WipeReport, StoreError> {
        let mut report = WipeReport::default();

        let mut entries = match tokio::fs::read_dir(&self.output_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(report),
            Err(e) => return Err(StoreError::io(&self.output_dir, e)),
        };

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StoreError::io(&self.output_dir, e))?
        {
            let path = entry.path();
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| StoreError::io(&path, e))?;

            if file_type.is_dir() {
                tokio::fs::remove_dir_all(&path)
                    .await
                    .map_err(|e| StoreError::io(&path, e))?;
                report
                    .folders
                    .push(entry.file_name().to_string_lossy().into_owned());
            } else {
                tokio::fs::remove_file(&path)
                    .await
                    .map_err(|e| StoreError::io(&path, e))?;
                report.files_removed += 1;
            }
        }

        report.folders.sort();
        info!(
            folders = report.folders.len(),
            files = report.files_removed,
            "decompiled outputs wiped"
        );
        Ok(report)
    }
}

fn collect_relative_files(root: &Path) -> Result<Vec<String>, StoreError> {
    if !root.exists() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "skipping unreadable entry while listing outputs");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        if let Ok(rel) = entry.path().strip_prefix(root) {
            let parts: Vec<String> = rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect();
            files.push(parts.join("/"));
        }
    }
    files.sort();
    Ok(files)
}

/// 두 경로가 같은 파일을 가리키는지 확인합니다. 어느 한쪽이 없으면 `false`.
async fn same_file(a: &Path, b: &Path) -> bool {
    match (
        tokio::fs::canonicalize(a).await,
        tokio::fs::canonicalize(b).await,
    ) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
