//! 도메인 타입: 시스템 전역에서 사용되는 공통 타입
//!
//! 프로젝트와 발견 항목(엔드포인트, Firebase 키), 작업 상태를 정의합니다.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 프로젝트 식별자 (저장소가 생성 시 할당)
pub type ProjectId = i64;

/// 분석 프로젝트
///
/// 디컴파일이 성공한 입력 파일 하나당 정확히 하나 생성되며, 이후 변경되지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// 프로젝트 ID
    pub id: ProjectId,
    /// 표시 이름 (`"Analysis of <filename>"`)
    pub name: String,
    /// 패키지 식별자 (입력 파일명에서 확장자를 제거한 값)
    pub package_name: String,
    /// 생성 시각 (UTC)
    pub created_at: DateTime<Utc>,
}

impl fmt::Display for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {} ({})", self.id, self.name, self.package_name)
    }
}

/// URL 분석기가 발견한 엔드포인트
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub id: i64,
    pub project_id: ProjectId,
    pub url: String,
    pub method: HttpMethod,
    /// 발견한 분석기 이름 (예: `"regex"`)
    pub source: String,
    pub created_at: DateTime<Utc>,
}

/// 키 분석기가 발견한 Firebase/Google API 키
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirebaseKey {
    pub id: i64,
    pub project_id: ProjectId,
    pub key: String,
    pub created_at: DateTime<Utc>,
}

/// 엔드포인트의 HTTP 메서드
///
/// 정적 URL 추출로는 메서드를 알 수 없으므로 대부분 `Unknown`입니다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
    #[default]
    Unknown,
}

impl HttpMethod {
    /// 저장 및 출력용 대문자 문자열
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = std::convert::Infallible;

    /// 알 수 없는 문자열은 `Unknown`으로 매핑됩니다.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_uppercase().as_str() {
            "GET" => Self::Get,
            "POST" => Self::Post,
            "PUT" => Self::Put,
            "PATCH" => Self::Patch,
            "DELETE" => Self::Delete,
            "HEAD" => Self::Head,
            "OPTIONS" => Self::Options,
            _ => Self::Unknown,
        })
    }
}

/// 콘솔 출력 이벤트의 심각도 태그
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsoleLevel {
    #[default]
    Info,
    Warning,
    Error,
}

impl fmt::Display for ConsoleLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// 발견 항목 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    Endpoint,
    FirebaseKey,
}

impl fmt::Display for FindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Endpoint => write!(f, "endpoint"),
            Self::FirebaseKey => write!(f, "firebase_key"),
        }
    }
}

/// 디컴파일 완료 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecompileStatus {
    Success,
    Error,
}

/// 분석 완료 상태
///
/// 부분 실패는 콘솔 이벤트로만 전달되므로 성공 외의 값은 없습니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisStatus {
    Success,
}

/// 작업 단계
///
/// `Queued → Decompiling → {Analyzing → Done} | Failed`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobPhase {
    #[default]
    Queued,
    Decompiling,
    Analyzing,
    Done,
    Failed,
}

impl JobPhase {
    /// 종료 단계 여부
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// 허용된 상태 전이인지 확인합니다.
    pub fn can_transition_to(&self, next: JobPhase) -> bool {
        matches!(
            (self, next),
            (Self::Queued, Self::Decompiling)
                | (Self::Decompiling, Self::Analyzing)
                | (Self::Decompiling, Self::Failed)
                | (Self::Analyzing, Self::Done)
        )
    }
}

impl fmt::Display for JobPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Queued => write!(f, "queued"),
            Self::Decompiling => write!(f, "decompiling"),
            Self::Analyzing => write!(f, "analyzing"),
            Self::Done => write!(f, "done"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// 작업의 최종 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobOutcome {
    /// 디컴파일과 모든 분석기가 오류 없이 끝남
    Success,
    /// 디컴파일 실패 (프로젝트 없음)
    DecompileFailed,
    /// 디컴파일은 성공했지만 프로젝트를 만들지 못함 (분석 없음)
    ProjectFailed,
    /// 분석은 끝났지만 일부 파일 또는 분석기 이름에서 오류가 있었음
    AnalysisPartial,
}

impl JobOutcome {
    /// 프로젝트가 만들어진 결과인지 여부
    pub fn has_project(&self) -> bool {
        !matches!(self, Self::DecompileFailed | Self::ProjectFailed)
    }
}

impl fmt::Display for JobOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::DecompileFailed => write!(f, "decompile_failed"),
            Self::ProjectFailed => write!(f, "project_failed"),
            Self::AnalysisPartial => write!(f, "analysis_partial"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_method_parses_case_insensitively() {
        assert_eq!("get".parse::<HttpMethod>(), Ok(HttpMethod::Get));
        assert_eq!("UNKNOWN".parse::<HttpMethod>(), Ok(HttpMethod::Unknown));
        assert_eq!("brew".parse::<HttpMethod>(), Ok(HttpMethod::Unknown));
    }

    #[test]
    fn http_method_serializes_uppercase() {
        let json = serde_json::to_string(&HttpMethod::Unknown).unwrap();
        assert_eq!(json, "\"UNKNOWN\"");
    }

    #[test]
    fn console_level_defaults_to_info() {
        assert_eq!(ConsoleLevel::default(), ConsoleLevel::Info);
        assert_eq!(
            serde_json::to_string(&ConsoleLevel::Warning).unwrap(),
            "\"warning\""
        );
    }

    #[test]
    fn job_phase_transitions() {
        assert!(JobPhase::Queued.can_transition_to(JobPhase::Decompiling));
        assert!(JobPhase::Decompiling.can_transition_to(JobPhase::Analyzing));
        assert!(JobPhase::Decompiling.can_transition_to(JobPhase::Failed));
        assert!(JobPhase::Analyzing.can_transition_to(JobPhase::Done));

        assert!(!JobPhase::Queued.can_transition_to(JobPhase::Analyzing));
        assert!(!JobPhase::Analyzing.can_transition_to(JobPhase::Failed));
        assert!(!JobPhase::Done.can_transition_to(JobPhase::Queued));
    }

    #[test]
    fn job_phase_terminal() {
        assert!(JobPhase::Done.is_terminal());
        assert!(JobPhase::Failed.is_terminal());
        assert!(!JobPhase::Analyzing.is_terminal());
    }

    #[test]
    fn job_outcome_project_presence() {
        assert!(JobOutcome::Success.has_project());
        assert!(JobOutcome::AnalysisPartial.has_project());
        assert!(!JobOutcome::DecompileFailed.has_project());
        assert!(!JobOutcome::ProjectFailed.has_project());
    }

    #[test]
    fn project_display() {
        let project = Project {
            id: 7,
            name: "Analysis of app.apk".to_owned(),
            package_name: "app".to_owned(),
            created_at: Utc::now(),
        };
        assert_eq!(project.to_string(), "#7 Analysis of app.apk (app)");
    }
}
