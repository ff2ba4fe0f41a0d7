//! `apkscope findings` command handler

use std::io::Write;

use serde::Serialize;

use apkscope_core::config::ApkscopeConfig;
use apkscope_core::store::FindingStore;
use apkscope_core::types::{Endpoint, FirebaseKey, Project};
use apkscope_store::SqliteFindingStore;

use crate::cli::{FindingsArgs, FindingsKind};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `findings` command.
///
/// # Errors
///
/// Returns `CliError::NotFound` if the project does not exist.
pub async fn execute(
    args: FindingsArgs,
    config: &ApkscopeConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let store = SqliteFindingStore::from_config(&config.storage)?;
    let project = store
        .get_project(args.project_id)?
        .ok_or_else(|| CliError::NotFound(format!("project {}", args.project_id)))?;

    let endpoints = match args.kind {
        FindingsKind::Endpoints | FindingsKind::All => Some(store.project_endpoints(project.id)?),
        FindingsKind::Keys => None,
    };
    let firebase_keys = match args.kind {
        FindingsKind::Keys | FindingsKind::All => Some(store.project_firebase_keys(project.id)?),
        FindingsKind::Endpoints => None,
    };

    writer.render(&FindingsReport {
        project,
        endpoints,
        firebase_keys,
    })?;
    Ok(())
}

/// Findings of one project.
///
/// A `None` list was not requested (`--kind`) and is omitted from JSON.
#[derive(Debug, Serialize)]
pub struct FindingsReport {
    pub project: Project,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoints: Option<Vec<Endpoint>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firebase_keys: Option<Vec<FirebaseKey>>,
}

impl Render for FindingsReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "{}", self.project.to_string().bold())?;

        if let Some(ref endpoints) = self.endpoints {
            writeln!(w)?;
            writeln!(w, "Endpoints ({}):", endpoints.len())?;
            for ep in endpoints {
                writeln!(w, "  {:<8} {}  [{}]", ep.method.as_str(), ep.url.green(), ep.source)?;
            }
        }

        if let Some(ref keys) = self.firebase_keys {
            writeln!(w)?;
            writeln!(w, "Firebase keys ({}):", keys.len())?;
            for key in keys {
                writeln!(w, "  {}", key.key.yellow())?;
            }
        }

        Ok(())
    }
}
