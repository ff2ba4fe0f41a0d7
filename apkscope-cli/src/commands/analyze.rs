//! `apkscope analyze` command handler
//!
//! Stages every input file, submits one job per file and streams pipeline events
//! from the event bus while the jobs run.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{broadcast, oneshot};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use apkscope_core::config::ApkscopeConfig;
use apkscope_core::event::{EventBus, EventEnvelope};
use apkscope_core::types::{JobOutcome, ProjectId};
use apkscope_pipeline::{JobReport, Orchestrator};

use crate::cli::AnalyzeArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `analyze` command.
///
/// # Errors
///
/// Returns `CliError::JobFailed` when any job ended without a project
/// (decompilation or project creation failed).
pub async fn execute(
    args: AnalyzeArgs,
    config: &ApkscopeConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let bus = Arc::new(EventBus::new(config.events.channel_capacity));
    let orchestrator = Orchestrator::from_config(config, bus.clone())?;
    orchestrator.artifacts().ensure_dirs().await?;

    // stage everything first so a bad path fails before any job starts
    let mut staged = Vec::with_capacity(args.files.len());
    for file in &args.files {
        let path = orchestrator.artifacts().stage_upload(file).await?;
        info!(src = %file.display(), staged = %path.display(), "input staged");
        staged.push((file.clone(), path));
    }

    let printer = (!args.quiet).then(|| EventPrinter::spawn(bus.subscribe(), *writer));

    let handles: Vec<_> = staged
        .into_iter()
        .map(|(original, path)| (original, orchestrator.submit(path, args.analyzers.clone())))
        .collect();

    let mut jobs = Vec::with_capacity(handles.len());
    for (original, handle) in handles {
        let report = handle.wait().await?;
        jobs.push(JobSummary::new(original, &report));
    }

    if let Some(printer) = printer {
        printer.finish().await;
    }

    let summary = AnalyzeSummary::new(jobs);
    writer.render(&summary)?;

    if summary.failed > 0 {
        return Err(CliError::JobFailed(format!(
            "{} of {} jobs failed",
            summary.failed,
            summary.jobs.len()
        )));
    }
    Ok(())
}

/// Background task that prints every bus event as one line on stdout.
struct EventPrinter {
    done: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl EventPrinter {
    fn spawn(rx: broadcast::Receiver<EventEnvelope>, writer: OutputWriter) -> Self {
        let (done, done_rx) = oneshot::channel();
        let task = tokio::spawn(print_events(rx, writer, done_rx));
        Self { done, task }
    }

    /// Stop after printing whatever is still buffered.
    async fn finish(self) {
        let _ = self.done.send(());
        if let Err(e) = self.task.await {
            warn!(error = %e, "event printer task failed");
        }
    }
}

async fn print_events(
    mut rx: broadcast::Receiver<EventEnvelope>,
    writer: OutputWriter,
    mut done: oneshot::Receiver<()>,
) {
    loop {
        tokio::select! {
            biased;
            msg = rx.recv() => match msg {
                Ok(envelope) => print_event(&writer, &envelope),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "event printer lagged, events dropped");
                }
                Err(broadcast::error::RecvError::Closed) => return,
            },
            _ = &mut done => break,
        }
    }

    loop {
        match rx.try_recv() {
            Ok(envelope) => print_event(&writer, &envelope),
            Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                warn!(skipped, "event printer lagged, events dropped");
            }
            Err(_) => break,
        }
    }
}

fn print_event(writer: &OutputWriter, envelope: &EventEnvelope) {
    match writer.event_line(envelope) {
        Ok(line) => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            if let Err(e) = writeln!(handle, "{line}") {
                warn!(error = %e, "failed to write event");
            }
        }
        Err(e) => warn!(error = %e, event = envelope.event.name(), "failed to format event"),
    }
}

/// Result of a single job.
#[derive(Debug, Serialize)]
pub struct JobSummary {
    /// File as given on the command line
    pub input: PathBuf,
    pub trace_id: String,
    pub outcome: JobOutcome,
    pub project_id: Option<ProjectId>,
    pub findings: usize,
    pub file_errors: usize,
}

impl JobSummary {
    fn new(input: PathBuf, report: &JobReport) -> Self {
        Self {
            input,
            trace_id: report.trace_id.clone(),
            outcome: report.outcome,
            project_id: report.project_id,
            findings: report.findings(),
            file_errors: report
                .scan
                .as_ref()
                .map_or(0, |scan| scan.total_file_errors()),
        }
    }
}

/// Summary printed after every job has finished.
#[derive(Debug, Serialize)]
pub struct AnalyzeSummary {
    pub jobs: Vec<JobSummary>,
    /// Jobs that ended without a project
    pub failed: usize,
}

impl AnalyzeSummary {
    fn new(jobs: Vec<JobSummary>) -> Self {
        let failed = jobs.iter().filter(|j| !j.outcome.has_project()).count();
        Self { jobs, failed }
    }
}

impl Render for AnalyzeSummary {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w)?;
        writeln!(w, "{}", "Analysis Summary".bold())?;
        for job in &self.jobs {
            let outcome = match job.outcome {
                JobOutcome::Success => job.outcome.to_string().green(),
                JobOutcome::AnalysisPartial => job.outcome.to_string().yellow(),
                JobOutcome::DecompileFailed | JobOutcome::ProjectFailed => {
                    job.outcome.to_string().red()
                }
            };
            let project = job
                .project_id
                .map_or_else(|| "-".to_owned(), |id| format!("#{id}"));
            write!(
                w,
                "  {}  {}  project {}  findings {}",
                job.input.display(),
                outcome,
                project,
                job.findings
            )?;
            if job.file_errors > 0 {
                write!(w, "  file errors {}", job.file_errors)?;
            }
            writeln!(w)?;
        }
        writeln!(
            w,
            "  Total: {} job(s), {} failed",
            self.jobs.len(),
            self.failed
        )?;
        Ok(())
    }
}
