//! `apkscope projects` command handler

use std::io::Write;

use serde::Serialize;

use apkscope_core::config::ApkscopeConfig;
use apkscope_core::store::FindingStore;
use apkscope_core::types::Project;
use apkscope_store::SqliteFindingStore;

use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `projects` command.
pub async fn execute(config: &ApkscopeConfig, writer: &OutputWriter) -> Result<(), CliError> {
    let store = SqliteFindingStore::from_config(&config.storage)?;
    let projects = store.list_projects()?;

    writer.render(&ProjectList { projects })?;
    Ok(())
}

/// Project listing.
#[derive(Debug, Serialize)]
pub struct ProjectList {
    pub projects: Vec<Project>,
}

impl Render for ProjectList {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        if self.projects.is_empty() {
            writeln!(w, "No projects found.")?;
            return Ok(());
        }

        writeln!(
            w,
            "{:<6} {:<40} {:<24} {}",
            "ID".bold(),
            "NAME".bold(),
            "PACKAGE".bold(),
            "CREATED".bold()
        )?;
        for p in &self.projects {
            writeln!(
                w,
                "{:<6} {:<40} {:<24} {}",
                p.id,
                p.name,
                p.package_name,
                p.created_at.format("%Y-%m-%d %H:%M:%S")
            )?;
        }
        writeln!(w)?;
        writeln!(w, "{} project(s)", self.projects.len())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn project(id: i64, file: &str, package: &str) -> Project {
        Project {
            id,
            name: format!("Analysis of {file}"),
            package_name: package.to_owned(),
            created_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_project_list_render_empty() {
        let list = ProjectList {
            projects: Vec::new(),
        };
        let mut buffer = Vec::new();
        list.render_text(&mut buffer).expect("render should succeed");

        let output = String::from_utf8(buffer).expect("valid UTF-8");
        assert_eq!(output.trim(), "No projects found.");
    }

    #[test]
    fn test_project_list_render_rows() {
        let list = ProjectList {
            projects: vec![
                project(1, "app.apk", "app"),
                project(2, "bank.apk", "bank"),
            ],
        };
        let mut buffer = Vec::new();
        list.render_text(&mut buffer).expect("render should succeed");

        let output = String::from_utf8(buffer).expect("valid UTF-8");
        assert!(output.contains("Analysis of app.apk"));
        assert!(output.contains("Analysis of bank.apk"));
        assert!(output.contains("2024-03-01 12:00:00"));
        assert!(output.contains("2 project(s)"));
    }

    #[test]
    fn test_project_list_json() {
        let list = ProjectList {
            projects: vec![project(7, "app.apk", "app")],
        };
        let json = serde_json::to_value(&list).expect("should serialize");
        assert_eq!(json["projects"][0]["id"], 7);
        assert_eq!(json["projects"][0]["package_name"], "app");
    }
}
