//! 메모리 기반 발견 항목 저장소
//!
//! 프로세스 수명 동안만 유지됩니다. 파이프라인 테스트의 저장소 더블로 사용합니다.

use std::sync::Mutex;

use chrono::Utc;

use apkscope_core::error::{ApkscopeError, StorageError};
use apkscope_core::store::FindingStore;
use apkscope_core::types::{Endpoint, FirebaseKey, HttpMethod, Project, ProjectId};

#[derive(Debug, Default)]
struct Tables {
    projects: Vec<Project>,
    endpoints: Vec<Endpoint>,
    firebase_keys: Vec<FirebaseKey>,
}

/// mutex로 보호되는 [`FindingStore`] 구현
#[derive(Debug, Default)]
pub struct MemoryFindingStore {
    tables: Mutex<Tables>,
}

impl MemoryFindingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 저장된 엔드포인트 총 수
    pub fn endpoint_count(&self) -> usize {
        self.lock().endpoints.len()
    }

    /// 저장된 Firebase 키 총 수
    pub fn firebase_key_count(&self) -> usize {
        self.lock().firebase_keys.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Tables> {
        self.tables
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn ensure_project(tables: &Tables, project_id: ProjectId) -> Result<(), ApkscopeError> {
    if tables.projects.iter().any(|p| p.id == project_id) {
        Ok(())
    } else {
        Err(StorageError::NotFound(format!("project {project_id}")).into())
    }
}

impl FindingStore for MemoryFindingStore {
    fn create_project(&self, name: &str, package_name: &str) -> Result<Project, ApkscopeError> {
        let mut tables = self.lock();
        let project = Project {
            id: tables.projects.len() as ProjectId + 1,
            name: name.to_owned(),
            package_name: package_name.to_owned(),
            created_at: Utc::now(),
        };
        tables.projects.push(project.clone());
        Ok(project)
    }

    fn add_endpoint(
        &self,
        project_id: ProjectId,
        url: &str,
        method: HttpMethod,
        source: &str,
    ) -> Result<(), ApkscopeError> {
        let mut tables = self.lock();
        ensure_project(&tables, project_id)?;
        let id = tables.endpoints.len() as i64 + 1;
        tables.endpoints.push(Endpoint {
            id,
            project_id,
            url: url.to_owned(),
            method,
            source: source.to_owned(),
            created_at: Utc::now(),
        });
        Ok(())
    }

    fn add_firebase_key(&self, project_id: ProjectId, key: &str) -> Result<(), ApkscopeError> {
        let mut tables = self.lock();
        ensure_project(&tables, project_id)?;
        let id = tables.firebase_keys.len() as i64 + 1;
        tables.firebase_keys.push(FirebaseKey {
            id,
            project_id,
            key: key.to_owned(),
            created_at: Utc::now(),
        });
        Ok(())
    }

    fn project_endpoints(&self, project_id: ProjectId) -> Result<Vec<Endpoint>, ApkscopeError> {
        Ok(self
            .lock()
            .endpoints
            .iter()
            .filter(|e| e.project_id == project_id)
            .cloned()
            .collect())
    }

    fn project_firebase_keys(
        &self,
        project_id: ProjectId,
    ) -> Result<Vec<FirebaseKey>, ApkscopeError> {
        Ok(self
            .lock()
            .firebase_keys
            .iter()
            .filter(|k| k.project_id == project_id)
            .cloned()
            .collect())
    }

    fn list_projects(&self) -> Result<Vec<Project>, ApkscopeError> {
        Ok(self.lock().projects.clone())
    }

    fn get_project(&self, project_id: ProjectId) -> Result<Option<Project>, ApkscopeError> {
        Ok(self
            .lock()
            .projects
            .iter()
            .find(|p| p.id == project_id)
            .cloned())
    }
}
