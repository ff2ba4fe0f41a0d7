//! 이벤트 시스템: 파이프라인 진행 상황을 구독자에게 전달
//!
//! 모든 진행 상황은 [`PipelineEvent`]로 표현되고, [`EventMetadata`]와 함께
//! [`EventEnvelope`]에 담겨 [`EventSink`]로 발행됩니다.
//!
//! 운영 환경의 싱크는 [`EventBus`] (tokio broadcast 채널)이며,
//! 테스트에서는 [`RecordingSink`]로 발행 순서를 그대로 기록합니다.
//!
//! 전달은 best-effort입니다. 구독자가 없으면 이벤트는 버려지고,
//! 느린 구독자는 가장 오래된 이벤트부터 잃습니다.

use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::trace;

use crate::types::{
    AnalysisStatus, ConsoleLevel, DecompileStatus, FindingKind, ProjectId,
};

// --- 모듈명 상수 ---

/// 디컴파일러 모듈명
pub const MODULE_DECOMPILER: &str = "decompiler";
/// 스캔 엔진 모듈명
pub const MODULE_SCAN_ENGINE: &str = "scan-engine";
/// 파이프라인 오케스트레이터 모듈명
pub const MODULE_PIPELINE: &str = "pipeline";

/// 이벤트 버스 기본 용량
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// 이벤트 메타데이터: 모든 이벤트에 공통으로 포함되는 추적 정보
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMetadata {
    /// 이벤트 발생 시각
    pub timestamp: SystemTime,
    /// 이벤트를 생성한 모듈명 (예: "decompiler", "scan-engine")
    pub source_module: String,
    /// 작업 추적 ID: 같은 작업의 이벤트를 연결합니다
    pub trace_id: String,
}

impl EventMetadata {
    /// 기존 trace_id를 사용하여 새 메타데이터를 생성합니다.
    pub fn new(source_module: impl Into<String>, trace_id: impl Into<String>) -> Self {
        Self {
            timestamp: SystemTime::now(),
            source_module: source_module.into(),
            trace_id: trace_id.into(),
        }
    }

    /// 새로운 UUID v4 trace_id를 생성하여 메타데이터를 만듭니다.
    pub fn with_new_trace(source_module: impl Into<String>) -> Self {
        Self::new(source_module, new_trace_id())
    }
}

impl fmt::Display for EventMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self
            .timestamp
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        write!(
            f,
            "[{}] source={} trace={}",
            secs, self.source_module, self.trace_id,
        )
    }
}

/// 새 작업 추적 ID (UUID v4)
pub fn new_trace_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// 파이프라인 진행 이벤트
///
/// JSON 형식은 `{"event": "<이름>", ...payload}` 입니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PipelineEvent {
    /// 디컴파일러 출력 한 줄 또는 진단 메시지
    ConsoleOutput {
        data: String,
        #[serde(default)]
        level: ConsoleLevel,
    },
    /// 디컴파일러 종료
    DecompileComplete { status: DecompileStatus },
    /// 프로젝트 생성됨
    ProjectCreated { project_id: ProjectId },
    /// 분석기가 발견한 항목 하나
    Finding {
        project_id: ProjectId,
        analyzer: String,
        kind: FindingKind,
        value: String,
    },
    /// 요청된 모든 분석기 종료
    AnalysisComplete { status: AnalysisStatus },
}

impl PipelineEvent {
    /// info 레벨 콘솔 이벤트
    pub fn console(data: impl Into<String>) -> Self {
        Self::ConsoleOutput {
            data: data.into(),
            level: ConsoleLevel::Info,
        }
    }

    /// warning 레벨 콘솔 이벤트
    pub fn console_warning(data: impl Into<String>) -> Self {
        Self::ConsoleOutput {
            data: data.into(),
            level: ConsoleLevel::Warning,
        }
    }

    /// error 레벨 콘솔 이벤트
    pub fn console_error(data: impl Into<String>) -> Self {
        Self::ConsoleOutput {
            data: data.into(),
            level: ConsoleLevel::Error,
        }
    }

    /// 와이어 상의 이벤트 이름
    pub fn name(&self) -> &'static str {
        match self {
            Self::ConsoleOutput { .. } => "console_output",
            Self::DecompileComplete { .. } => "decompile_complete",
            Self::ProjectCreated { .. } => "project_created",
            Self::Finding { .. } => "finding",
            Self::AnalysisComplete { .. } => "analysis_complete",
        }
    }
}

impl fmt::Display for PipelineEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConsoleOutput { data, level } => write!(f, "[{level}] {data}"),
            Self::DecompileComplete { status } => {
                let s = match status {
                    DecompileStatus::Success => "success",
                    DecompileStatus::Error => "error",
                };
                write!(f, "decompile complete: {s}")
            }
            Self::ProjectCreated { project_id } => write!(f, "project created: #{project_id}"),
            Self::Finding {
                project_id,
                analyzer,
                kind,
                value,
            } => write!(f, "finding #{project_id} [{analyzer}] {kind}: {value}"),
            Self::AnalysisComplete { .. } => write!(f, "analysis complete: success"),
        }
    }
}

/// 메타데이터가 붙은 이벤트
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub metadata: EventMetadata,
    #[serde(flatten)]
    pub event: PipelineEvent,
}

impl EventEnvelope {
    pub fn new(metadata: EventMetadata, event: PipelineEvent) -> Self {
        Self { metadata, event }
    }

    /// 한 줄짜리 JSON 문자열로 직렬화합니다.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// 이벤트 발행 대상
///
/// 발행은 fire-and-forget이며 실패를 호출자에게 돌려주지 않습니다.
pub trait EventSink: Send + Sync {
    fn publish(&self, envelope: EventEnvelope);
}

/// tokio broadcast 채널 기반 이벤트 버스
///
/// 모든 구독자가 모든 작업의 이벤트를 받습니다.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<EventEnvelope>,
}

impl EventBus {
    /// 주어진 용량으로 이벤트 버스를 생성합니다.
    ///
    /// 용량이 0이면 기본값을 사용합니다.
    pub fn new(capacity: usize) -> Self {
        let capacity = if capacity == 0 {
            DEFAULT_CHANNEL_CAPACITY
        } else {
            capacity
        };
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// 새 구독자를 등록합니다. 등록 이후 발행된 이벤트만 받습니다.
    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.tx.subscribe()
    }

    /// 현재 구독자 수
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }
}

impl EventSink for EventBus {
    fn publish(&self, envelope: EventEnvelope) {
        // 구독자가 없으면 send는 Err를 반환하지만 정상 상황입니다
        if self.tx.send(envelope).is_err() {
            trace!("event published with no subscribers");
        }
    }
}

/// 발행된 이벤트를 순서대로 기록하는 테스트용 싱크
#[derive(Debug, Default)]
pub struct RecordingSink {
    envelopes: Mutex<Vec<EventEnvelope>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// 기록된 봉투 전체 (발행 순서)
    pub fn envelopes(&self) -> Vec<EventEnvelope> {
        self.envelopes
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// 기록된 이벤트 (발행 순서)
    pub fn events(&self) -> Vec<PipelineEvent> {
        self.envelopes().into_iter().map(|e| e.event).collect()
    }

    /// 콘솔 이벤트의 텍스트만 추출합니다.
    pub fn console_lines(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                PipelineEvent::ConsoleOutput { data, .. } => Some(data),
                _ => None,
            })
            .collect()
    }

    /// 특정 이름의 이벤트 개수
    pub fn count(&self, name: &str) -> usize {
        self.events().iter().filter(|e| e.name() == name).count()
    }
}

impl EventSink for RecordingSink {
    fn publish(&self, envelope: EventEnvelope) {
        self.envelopes
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(envelope);
    }
}

/// 모듈명과 trace_id를 고정한 발행 헬퍼
///
/// 하나의 작업 안에서 같은 추적 ID로 이벤트를 발행할 때 사용합니다.
#[derive(Clone)]
pub struct EventEmitter {
    sink: Arc<dyn EventSink>,
    source_module: &'static str,
    trace_id: String,
}

impl EventEmitter {
    pub fn new(
        sink: Arc<dyn EventSink>,
        source_module: &'static str,
        trace_id: impl Into<String>,
    ) -> Self {
        Self {
            sink,
            source_module,
            trace_id: trace_id.into(),
        }
    }

    /// 같은 싱크와 trace_id로 다른 모듈명의 발행기를 만듭니다.
    pub fn for_module(&self, source_module: &'static str) -> Self {
        Self {
            sink: Arc::clone(&self.sink),
            source_module,
            trace_id: self.trace_id.clone(),
        }
    }

    pub fn trace_id(&self) -> &str {
        &self.trace_id
    }

    pub fn emit(&self, event: PipelineEvent) {
        let metadata = EventMetadata::new(self.source_module, self.trace_id.clone());
        self.sink.publish(EventEnvelope::new(metadata, event));
    }
}

impl fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventEmitter")
            .field("source_module", &self.source_module)
            .field("trace_id", &self.trace_id)
            .finish()
    }
}
