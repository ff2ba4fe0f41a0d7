//! 작업 오케스트레이터 -- 디컴파일러, 저장소, 스캔 엔진 조립과 작업 실행
//!
//! [`Orchestrator`]는 작업마다 tokio 태스크 하나를 띄우고 다음 순서로 진행합니다.
//!
//! 1. `decompiling`: 출력 디렉토리를 정하고 디컴파일러를 실행합니다.
//! 2. 종료 코드가 0이면 프로젝트를 만들고 `project_created`를 발행한 뒤 입력 파일을 지웁니다.
//! 3. `analyzing`: 스캔 엔진을 blocking 스레드에서 실행합니다.
//! 4. `analysis_complete(success)`를 발행하고 `done`이 됩니다.
//!
//! 어느 단계의 실패도 호출 프로세스로 전파되지 않습니다. 실패는 콘솔 이벤트와
//! [`JobReport::outcome`]으로만 드러납니다.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use metrics::counter;
use tokio::sync::watch;
use tracing::{Instrument, error, info, info_span, warn};

use apkscope_core::config::{ApkscopeConfig, ScanConfig};
use apkscope_core::error::{ApkscopeError, ConfigError, PipelineError};
use apkscope_core::event::{
    EventEmitter, EventSink, MODULE_DECOMPILER, MODULE_PIPELINE, MODULE_SCAN_ENGINE,
    PipelineEvent, new_trace_id,
};
use apkscope_core::metrics as m;
use apkscope_core::store::FindingStore;
use apkscope_core::types::{AnalysisStatus, DecompileStatus, JobOutcome, JobPhase, Project};
use apkscope_decompiler::DecompilerRunner;
use apkscope_scan_engine::ScanEngine;
use apkscope_store::{ArtifactStore, SqliteFindingStore};

use crate::job::{JobHandle, JobReport};

/// 프로젝트 이름 접두어 (`"Analysis of " + 파일명`)
pub const PROJECT_NAME_PREFIX: &str = "Analysis of ";

/// 작업 하나의 입력
struct JobSpec {
    trace_id: String,
    input: PathBuf,
    analyzers: Vec<String>,
}

struct Inner {
    runner: DecompilerRunner,
    engine: Arc<ScanEngine>,
    store: Arc<dyn FindingStore>,
    artifacts: ArtifactStore,
    sink: Arc<dyn EventSink>,
}

/// 작업 오케스트레이터
///
/// 복제 비용이 낮으며 복제본은 같은 구성요소를 공유합니다.
#[derive(Clone)]
pub struct Orchestrator {
    inner: Arc<Inner>,
}

impl Orchestrator {
    pub fn builder() -> OrchestratorBuilder {
        OrchestratorBuilder::new()
    }

    /// 설정으로 SQLite 저장소를 열고 모든 구성요소를 조립합니다.
    ///
    /// 설정은 미리 검증되어 있어야 합니다.
    pub fn from_config(
        config: &ApkscopeConfig,
        sink: Arc<dyn EventSink>,
    ) -> Result<Self, ApkscopeError> {
        let store = SqliteFindingStore::from_config(&config.storage)?;
        Self::builder()
            .runner(DecompilerRunner::from_config(&config.decompiler))
            .store(Arc::new(store))
            .artifacts(ArtifactStore::from_config(&config.artifacts))
            .scan_config(config.scan.clone())
            .sink(sink)
            .build()
    }

    pub fn store(&self) -> &Arc<dyn FindingStore> {
        &self.inner.store
    }

    pub fn artifacts(&self) -> &ArtifactStore {
        &self.inner.artifacts
    }

    /// 작업을 제출합니다. 디컴파일 시작 전에 즉시 반환합니다.
    ///
    /// `analyzers`가 비어 있으면 스캔 엔진의 기본 분석기를 사용합니다.
    /// tokio 런타임 안에서 호출해야 합니다.
    pub fn submit(&self, input: impl Into<PathBuf>, analyzers: Vec<String>) -> JobHandle {
        let spec = JobSpec {
            trace_id: new_trace_id(),
            input: input.into(),
            analyzers,
        };
        let (phase_tx, phase_rx) = watch::channel(JobPhase::Queued);
        let trace_id = spec.trace_id.clone();
        let input = spec.input.clone();

        counter!(m::JOBS_STARTED_TOTAL).increment(1);
        let span = info_span!("job", job = %trace_id, input = %input.display());
        let inner = Arc::clone(&self.inner);
        let task = tokio::spawn(async move { inner.execute(spec, phase_tx).await }.instrument(span));

        JobHandle::new(trace_id, input, phase_rx, task)
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("runner", &self.inner.runner)
            .field("engine", &self.inner.engine)
            .field("artifacts", &self.inner.artifacts)
            .finish()
    }
}

impl Inner {
    async fn execute(&self, spec: JobSpec, phase: watch::Sender<JobPhase>) -> JobReport {
        let events = EventEmitter::new(
            Arc::clone(&self.sink),
            MODULE_PIPELINE,
            spec.trace_id.clone(),
        );
        let mut report = JobReport::new(&spec.trace_id, &spec.input);
        advance(&phase, JobPhase::Decompiling);
        info!(analyzers = ?spec.analyzers, "job started");

        let output_dir = match self.artifacts.output_dir_for(&spec.input) {
            Ok(dir) => dir,
            Err(e) => {
                error!(error = %e, "cannot derive output directory");
                events.emit(PipelineEvent::console_error(format!("An error occurred: {e}")));
                events.emit(PipelineEvent::DecompileComplete {
                    status: DecompileStatus::Error,
                });
                return finish(report, JobOutcome::DecompileFailed, &phase);
            }
        };
        report.output_dir = Some(output_dir.clone());

        let decompile = self
            .runner
            .run(&spec.input, &output_dir, &events.for_module(MODULE_DECOMPILER))
            .await;
        let decompiled = decompile.succeeded();
        report.decompile = Some(decompile);
        if !decompiled {
            return finish(report, JobOutcome::DecompileFailed, &phase);
        }

        let project = match self.create_project(&spec.input).await {
            Ok(project) => project,
            Err(e) => {
                error!(error = %e, "project creation failed");
                events.emit(PipelineEvent::console_error(format!(
                    "Failed to create project: {e}"
                )));
                return finish(report, JobOutcome::ProjectFailed, &phase);
            }
        };
        report.project_id = Some(project.id);
        info!(project_id = project.id, name = %project.name, "project created");
        events.emit(PipelineEvent::ProjectCreated {
            project_id: project.id,
        });

        if let Err(e) = self.artifacts.remove_input(&spec.input).await {
            warn!(error = %e, "failed to remove processed input");
            events.emit(PipelineEvent::console_warning(format!(
                "Could not remove processed input: {e}"
            )));
        }

        advance(&phase, JobPhase::Analyzing);
        let scan = Arc::clone(&self.engine)
            .run(
                output_dir,
                project.id,
                spec.analyzers,
                events.for_module(MODULE_SCAN_ENGINE),
            )
            .await;
        let outcome = match scan {
            Ok(scan) => {
                let outcome = if scan.is_partial() {
                    JobOutcome::AnalysisPartial
                } else {
                    JobOutcome::Success
                };
                report.scan = Some(scan);
                outcome
            }
            Err(e) => {
                error!(error = %e, "scan task failed");
                events.emit(PipelineEvent::console_error(format!("An error occurred: {e}")));
                JobOutcome::AnalysisPartial
            }
        };

        events.emit(PipelineEvent::AnalysisComplete {
            status: AnalysisStatus::Success,
        });
        finish(report, outcome, &phase)
    }

    /// 프로젝트 이름은 접두어 + 파일명, 패키지 이름은 확장자를 뺀 파일명입니다.
    async fn create_project(&self, input: &Path) -> Result<Project, ApkscopeError> {
        let (filename, package) = match (input.file_name(), input.file_stem()) {
            (Some(name), Some(stem)) => (
                name.to_string_lossy().into_owned(),
                stem.to_string_lossy().into_owned(),
            ),
            _ => {
                return Err(PipelineError::InvalidInput(input.display().to_string()).into());
            }
        };
        let name = format!("{PROJECT_NAME_PREFIX}{filename}");

        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || store.create_project(&name, &package))
            .await
            .map_err(|e| PipelineError::TaskJoin(e.to_string()))?
            .map_err(|e| PipelineError::ProjectCreation(e.to_string()).into())
    }
}

fn advance(phase: &watch::Sender<JobPhase>, next: JobPhase) {
    let current = *phase.borrow();
    if !current.can_transition_to(next) {
        warn!(from = %current, to = %next, "unexpected job phase transition");
    }
    phase.send_replace(next);
}

fn finish(mut report: JobReport, outcome: JobOutcome, phase: &watch::Sender<JobPhase>) -> JobReport {
    let terminal = if outcome.has_project() {
        JobPhase::Done
    } else {
        JobPhase::Failed
    };
    advance(phase, terminal);
    counter!(m::JOBS_COMPLETED_TOTAL, m::LABEL_RESULT => outcome.to_string()).increment(1);
    info!(
        outcome = %outcome,
        project_id = ?report.project_id,
        findings = report.findings(),
        "job finished"
    );
    report.outcome = outcome;
    report
}

/// 오케스트레이터 빌더
///
/// 저장소와 이벤트 싱크는 필수입니다.
pub struct OrchestratorBuilder {
    runner: DecompilerRunner,
    store: Option<Arc<dyn FindingStore>>,
    artifacts: Option<ArtifactStore>,
    scan_config: ScanConfig,
    sink: Option<Arc<dyn EventSink>>,
}

impl OrchestratorBuilder {
    pub fn new() -> Self {
        Self {
            runner: DecompilerRunner::from_config(&Default::default()),
            store: None,
            artifacts: None,
            scan_config: ScanConfig::default(),
            sink: None,
        }
    }

    pub fn runner(mut self, runner: DecompilerRunner) -> Self {
        self.runner = runner;
        self
    }

    pub fn store(mut self, store: Arc<dyn FindingStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// 지정하지 않으면 기본 경로(`/tmp/uploads`, `/tmp/decompiled`)를 사용합니다.
    pub fn artifacts(mut self, artifacts: ArtifactStore) -> Self {
        self.artifacts = Some(artifacts);
        self
    }

    pub fn scan_config(mut self, config: ScanConfig) -> Self {
        self.scan_config = config;
        self
    }

    pub fn sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn build(self) -> Result<Orchestrator, ApkscopeError> {
        let store = self.store.ok_or_else(|| missing("store"))?;
        let sink = self.sink.ok_or_else(|| missing("sink"))?;
        let artifacts = self
            .artifacts
            .unwrap_or_else(|| ArtifactStore::from_config(&Default::default()));

        let engine = ScanEngine::builder()
            .config(&self.scan_config)
            .store(Arc::clone(&store))
            .build()?;

        Ok(Orchestrator {
            inner: Arc::new(Inner {
                runner: self.runner,
                engine: Arc::new(engine),
                store,
                artifacts,
                sink,
            }),
        })
    }
}

impl Default for OrchestratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn missing(field: &str) -> ApkscopeError {
    ConfigError::InvalidValue {
        field: field.to_owned(),
        reason: "required by orchestrator".to_owned(),
    }
    .into()
}
