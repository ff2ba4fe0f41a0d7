//! 분석기 -- 디컴파일 결과 텍스트에서 발견 항목 추출
//!
//! [`Analyzer`] trait은 하나의 고정 패턴으로 파일 내용 전체를 검사하고,
//! 매치마다 저장소에 자식 레코드 하나를 추가하는 인터페이스입니다.
//!
//! # 기본 분석기
//!
//! - `regex` -- [`UrlAnalyzer`]: 절대 http/https URL → `Endpoint`
//! - `firebase` -- [`FirebaseKeyAnalyzer`]: `AIzaSy` 로 시작하는 39자 키 → `FirebaseKey`
//!
//! # 확장
//!
//! 새로운 분석기는 `Analyzer` trait을 구현하고
//! `ScanEngineBuilder::analyzer()`로 등록합니다.

pub mod firebase;
pub mod url;

pub use firebase::FirebaseKeyAnalyzer;
pub use url::UrlAnalyzer;

use apkscope_core::error::ApkscopeError;
use apkscope_core::store::FindingStore;
use apkscope_core::types::{FindingKind, ProjectId};

/// 분석기 trait
///
/// `find_matches`는 순수 함수여야 합니다. 파일 I/O와 이벤트 발행은 엔진이 담당합니다.
pub trait Analyzer: Send + Sync {
    /// 요청에서 사용하는 분석기 이름 (예: "regex", "firebase")
    fn name(&self) -> &'static str;

    /// 이 분석기가 만드는 발견 항목 종류
    fn kind(&self) -> FindingKind;

    /// 사람이 읽는 대상 이름 (콘솔 메시지용, 예: "URLs")
    fn target(&self) -> &'static str;

    /// 텍스트 전체에서 매치를 등장 순서대로 반환합니다. 중복을 제거하지 않습니다.
    fn find_matches<'t>(&self, text: &'t str) -> Vec<&'t str>;

    /// 매치 하나를 프로젝트의 자식 레코드로 저장합니다.
    fn persist(
        &self,
        store: &dyn FindingStore,
        project_id: ProjectId,
        value: &str,
    ) -> Result<(), ApkscopeError>;

    /// 분석기 종료 시 콘솔에 보낼 요약 문장
    fn summary(&self, found: usize) -> String {
        format!("{} scan complete: {found} found", self.target())
    }
}

/// 기본 분석기 전체를 등록 순서대로 생성합니다.
pub(crate) fn builtin() -> Result<Vec<Box<dyn Analyzer>>, crate::error::ScanEngineError> {
    Ok(vec![
        Box::new(UrlAnalyzer::new()?),
        Box::new(FirebaseKeyAnalyzer::new()?),
    ])
}
