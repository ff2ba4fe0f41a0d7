//! Output formatting abstraction for text vs JSON rendering
//!
//! All subcommand output flows through [`OutputWriter`] which handles format switching.
//! Live pipeline events are the exception: they stream as one line per event
//! (see [`OutputWriter::event_line`]).

use std::io::Write;

use serde::Serialize;

use apkscope_core::event::{EventEnvelope, PipelineEvent};
use apkscope_core::types::ConsoleLevel;

use crate::cli::OutputFormat;
use crate::error::CliError;

/// Abstraction for writing CLI output in different formats.
///
/// Subcommand handlers call `writer.render(&payload)` where `payload`
/// implements both `Serialize` (for JSON) and `Render` (for text).
#[derive(Debug, Clone, Copy)]
pub struct OutputWriter {
    format: OutputFormat,
}

impl OutputWriter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Render a payload to stdout.
    pub fn render<T: Render + Serialize>(&self, payload: &T) -> Result<(), CliError> {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        self.render_to(payload, &mut handle)
    }

    /// Render a payload to an arbitrary writer.
    ///
    /// For `Text` format, delegates to `Render::render_text()`.
    /// For `Json` format, serialises via `serde_json`.
    pub fn render_to<T: Render + Serialize>(
        &self,
        payload: &T,
        w: &mut dyn Write,
    ) -> Result<(), CliError> {
        match self.format {
            OutputFormat::Text => {
                payload.render_text(w)?;
            }
            OutputFormat::Json => {
                serde_json::to_writer_pretty(&mut *w, payload)?;
                writeln!(w)?;
            }
        }
        Ok(())
    }

    /// Format one live event as a single output line (no trailing newline).
    ///
    /// JSON mode emits the compact envelope so the stream is valid JSON lines.
    pub fn event_line(&self, envelope: &EventEnvelope) -> Result<String, CliError> {
        match self.format {
            OutputFormat::Json => Ok(envelope.to_json()?),
            OutputFormat::Text => Ok(text_event_line(envelope)),
        }
    }
}

/// Trait for human-readable text rendering.
///
/// Implemented by every CLI output payload alongside `serde::Serialize`.
pub trait Render {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()>;
}

/// Short job tag shown in front of every live text line.
fn job_tag(trace_id: &str) -> &str {
    trace_id.get(..8).unwrap_or(trace_id)
}

fn text_event_line(envelope: &EventEnvelope) -> String {
    use colored::Colorize;

    let tag = format!("[{}]", job_tag(&envelope.metadata.trace_id)).dimmed();
    let body = match &envelope.event {
        PipelineEvent::ConsoleOutput { data, level } => match level {
            ConsoleLevel::Info => data.normal(),
            ConsoleLevel::Warning => data.yellow(),
            ConsoleLevel::Error => data.red(),
        },
        PipelineEvent::Finding { .. } => envelope.event.to_string().green(),
        PipelineEvent::ProjectCreated { .. } | PipelineEvent::AnalysisComplete { .. } => {
            envelope.event.to_string().bold()
        }
        PipelineEvent::DecompileComplete { .. } => envelope.event.to_string().normal(),
    };
    format!("{tag} {body}")
}
