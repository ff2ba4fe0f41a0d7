//! `apkscope cat` command handler

use std::io::Write;

use serde::Serialize;

use apkscope_core::config::ApkscopeConfig;
use apkscope_store::ArtifactStore;

use crate::cli::{CatArgs, OutputFormat};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `cat` command.
///
/// Text mode writes the raw bytes. JSON mode wraps a lossy UTF-8 copy.
///
/// # Errors
///
/// Returns `CliError::NotFound` for a missing file and `CliError::Command`
/// for a path that escapes the output root.
pub async fn execute(
    args: CatArgs,
    config: &ApkscopeConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let artifacts = ArtifactStore::from_config(&config.artifacts);
    let bytes = artifacts.read_output(&args.path).await?;

    match writer.format() {
        OutputFormat::Text => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            handle.write_all(&bytes)?;
            handle.flush()?;
        }
        OutputFormat::Json => {
            writer.render(&FileContent {
                path: args.path,
                size: bytes.len(),
                content: String::from_utf8_lossy(&bytes).into_owned(),
            })?;
        }
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct FileContent {
    pub path: String,
    pub size: usize,
    pub content: String,
}

impl Render for FileContent {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        write!(w, "{}", self.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_content_render_is_verbatim() {
        let content = FileContent {
            path: "app/AndroidManifest.xml".to_owned(),
            size: 10,
            content: "<manifest>".to_owned(),
        };
        let mut buffer = Vec::new();
        content
            .render_text(&mut buffer)
            .expect("render should succeed");
        assert_eq!(buffer, b"<manifest>");
    }
}
