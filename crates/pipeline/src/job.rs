//! 작업 핸들과 결과

use std::path::{Path, PathBuf};

use tokio::sync::watch;
use tokio::task::JoinHandle;

use apkscope_core::error::{ApkscopeError, PipelineError};
use apkscope_core::types::{JobOutcome, JobPhase, ProjectId};
use apkscope_decompiler::DecompileReport;
use apkscope_scan_engine::ScanReport;

/// 종료된 작업의 결과
#[derive(Debug, Clone)]
pub struct JobReport {
    /// 작업의 모든 이벤트에 붙는 추적 ID
    pub trace_id: String,
    pub input: PathBuf,
    /// 출력 디렉토리를 정하지 못했으면 `None`
    pub output_dir: Option<PathBuf>,
    pub outcome: JobOutcome,
    pub project_id: Option<ProjectId>,
    pub decompile: Option<DecompileReport>,
    pub scan: Option<ScanReport>,
}

impl JobReport {
    pub(crate) fn new(trace_id: &str, input: &Path) -> Self {
        Self {
            trace_id: trace_id.to_owned(),
            input: input.to_path_buf(),
            output_dir: None,
            outcome: JobOutcome::DecompileFailed,
            project_id: None,
            decompile: None,
            scan: None,
        }
    }

    /// 이 작업이 저장한 발견 항목 수
    pub fn findings(&self) -> usize {
        self.scan.as_ref().map_or(0, ScanReport::total_findings)
    }
}

/// 제출된 작업의 핸들
///
/// 핸들을 drop해도 작업은 계속 실행됩니다.
#[derive(Debug)]
pub struct JobHandle {
    trace_id: String,
    input: PathBuf,
    phase: watch::Receiver<JobPhase>,
    task: JoinHandle<JobReport>,
}

impl JobHandle {
    pub(crate) fn new(
        trace_id: String,
        input: PathBuf,
        phase: watch::Receiver<JobPhase>,
        task: JoinHandle<JobReport>,
    ) -> Self {
        Self {
            trace_id,
            input,
            phase,
            task,
        }
    }

    pub fn trace_id(&self) -> &str {
        &self.trace_id
    }

    pub fn input(&self) -> &Path {
        &self.input
    }

    /// 현재 단계
    pub fn phase(&self) -> JobPhase {
        *self.phase.borrow()
    }

    /// 단계 변경 알림을 받는 receiver
    pub fn watch_phase(&self) -> watch::Receiver<JobPhase> {
        self.phase.clone()
    }

    /// 작업이 끝날 때까지 기다립니다.
    ///
    /// 작업 태스크가 panic한 경우에만 에러를 반환합니다.
    pub async fn wait(self) -> Result<JobReport, ApkscopeError> {
        self.task
            .await
            .map_err(|e| PipelineError::TaskJoin(e.to_string()).into())
    }
}
