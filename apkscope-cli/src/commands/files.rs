//! `apkscope files` command handler

use std::io::Write;

use serde::Serialize;

use apkscope_core::config::ApkscopeConfig;
use apkscope_store::ArtifactStore;

use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `files` command.
pub async fn execute(config: &ApkscopeConfig, writer: &OutputWriter) -> Result<(), CliError> {
    let artifacts = ArtifactStore::from_config(&config.artifacts);
    let files = artifacts.list_outputs().await?;

    writer.render(&FileList {
        root: artifacts.output_dir().display().to_string(),
        files,
    })?;
    Ok(())
}

/// Decompiled output files, relative to `root`.
#[derive(Debug, Serialize)]
pub struct FileList {
    pub root: String,
    pub files: Vec<String>,
}

impl Render for FileList {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        if self.files.is_empty() {
            writeln!(w, "No decompiled files under {}", self.root)?;
            return Ok(());
        }
        for file in &self.files {
            writeln!(w, "{file}")?;
        }
        Ok(())
    }
}
