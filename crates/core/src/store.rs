//! 저장소 trait: 프로젝트와 발견 항목의 영속화 지점

use crate::error::ApkscopeError;
use crate::types::{Endpoint, FirebaseKey, HttpMethod, Project, ProjectId};

/// 프로젝트와 발견 항목을 저장하는 trait
///
/// 모든 쓰기는 단일 행 단위로 커밋되며, 호출 간 트랜잭션은 없습니다.
/// 발견 항목은 append-only이고 중복 제거를 하지 않습니다.
/// 스캔 엔진이 blocking 스레드에서 호출하므로 동기 메서드로 정의합니다.
pub trait FindingStore: Send + Sync {
    /// 프로젝트를 생성하고 할당된 ID가 포함된 레코드를 반환합니다.
    fn create_project(&self, name: &str, package_name: &str) -> Result<Project, ApkscopeError>;

    /// 엔드포인트 한 건을 추가합니다.
    fn add_endpoint(
        &self,
        project_id: ProjectId,
        url: &str,
        method: HttpMethod,
        source: &str,
    ) -> Result<(), ApkscopeError>;

    /// Firebase 키 한 건을 추가합니다.
    fn add_firebase_key(&self, project_id: ProjectId, key: &str) -> Result<(), ApkscopeError>;

    /// 프로젝트의 모든 엔드포인트 (삽입 순서)
    fn project_endpoints(&self, project_id: ProjectId) -> Result<Vec<Endpoint>, ApkscopeError>;

    /// 프로젝트의 모든 Firebase 키 (삽입 순서)
    fn project_firebase_keys(
        &self,
        project_id: ProjectId,
    ) -> Result<Vec<FirebaseKey>, ApkscopeError>;

    /// 모든 프로젝트 (ID 순서)
    fn list_projects(&self) -> Result<Vec<Project>, ApkscopeError>;

    /// 프로젝트 하나를 조회합니다. 없으면 `None`.
    fn get_project(&self, project_id: ProjectId) -> Result<Option<Project>, ApkscopeError>;
}
