//! `apkscope wipe` command handler

use std::io::Write;

use serde::Serialize;
use tracing::info;

use apkscope_core::config::ApkscopeConfig;
use apkscope_store::ArtifactStore;

use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `wipe` command.
pub async fn execute(config: &ApkscopeConfig, writer: &OutputWriter) -> Result<(), CliError> {
    let artifacts = ArtifactStore::from_config(&config.artifacts);
    let report = artifacts.wipe_outputs().await?;
    info!(
        root = %artifacts.output_dir().display(),
        folders = report.folders.len(),
        files = report.files_removed,
        "decompiled outputs wiped"
    );

    writer.render(&WipeSummary {
        root: artifacts.output_dir().display().to_string(),
        folders: report.folders,
        files_removed: report.files_removed,
    })?;
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct WipeSummary {
    pub root: String,
    /// Removed top-level folders
    pub folders: Vec<String>,
    /// Removed top-level regular files
    pub files_removed: usize,
}

impl Render for WipeSummary {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        if self.folders.is_empty() && self.files_removed == 0 {
            writeln!(w, "Nothing to wipe under {}", self.root)?;
            return Ok(());
        }

        writeln!(w, "Wiped {}", self.root.bold())?;
        for folder in &self.folders {
            writeln!(w, "  removed {}/", folder)?;
        }
        if self.files_removed > 0 {
            writeln!(w, "  removed {} loose file(s)", self.files_removed)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wipe_summary_render() {
        let summary = WipeSummary {
            root: "/tmp/decompiled".to_owned(),
            folders: vec!["app".to_owned(), "bank".to_owned()],
            files_removed: 1,
        };
        let mut buffer = Vec::new();
        summary
            .render_text(&mut buffer)
            .expect("render should succeed");

        let output = String::from_utf8(buffer).expect("valid UTF-8");
        assert!(output.contains("removed app/"));
        assert!(output.contains("removed bank/"));
        assert!(output.contains("removed 1 loose file(s)"));
    }

    #[test]
    fn test_wipe_summary_render_nothing() {
        let summary = WipeSummary {
            root: "/tmp/decompiled".to_owned(),
            folders: Vec::new(),
            files_removed: 0,
        };
        let mut buffer = Vec::new();
        summary
            .render_text(&mut buffer)
            .expect("render should succeed");

        let output = String::from_utf8(buffer).expect("valid UTF-8");
        assert!(output.contains("Nothing to wipe"));
    }

    #[test]
    fn test_wipe_summary_json() {
        let summary = WipeSummary {
            root: "/tmp/decompiled".to_owned(),
            folders: vec!["app".to_owned()],
            files_removed: 0,
        };
        let json = serde_json::to_value(&summary).expect("should serialize");
        assert_eq!(json["folders"][0], "app");
        assert_eq!(json["files_removed"], 0);
    }
}
