//! SQLite 발견 항목 저장소
//!
//! 호출마다 연결을 새로 열고 (open → write → commit → close) 바로 닫습니다.
//! 동시 쓰기는 SQLite 잠금과 busy timeout으로만 직렬화되며,
//! 단일 행 커밋 이상의 트랜잭션 보장은 없습니다.
//!
//! # 스키마
//!
//! - `projects(id, name, package_name, created_at)`
//! - `endpoints(id, project_id, url, method, source, created_at)`
//! - `firebase_keys(id, project_id, key, created_at)`

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use tracing::{debug, info};

use apkscope_core::config::StorageConfig;
use apkscope_core::error::ApkscopeError;
use apkscope_core::store::FindingStore;
use apkscope_core::types::{Endpoint, FirebaseKey, HttpMethod, Project, ProjectId};

use crate::error::StoreError;

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS projects (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    name         TEXT NOT NULL,
    package_name TEXT NOT NULL,
    created_at   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS endpoints (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    project_id INTEGER NOT NULL REFERENCES projects(id),
    url        TEXT NOT NULL,
    method     TEXT,
    source     TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_endpoints_project ON endpoints(project_id);

CREATE TABLE IF NOT EXISTS firebase_keys (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    project_id INTEGER NOT NULL REFERENCES projects(id),
    key        TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_firebase_keys_project ON firebase_keys(project_id);
"#;

/// 기본 busy timeout
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite 기반 [`FindingStore`]
#[derive(Debug, Clone)]
pub struct SqliteFindingStore {
    path: PathBuf,
    busy_timeout: Duration,
}

impl SqliteFindingStore {
    /// 데이터베이스 파일을 열고 스키마를 생성합니다.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        Self::open_with_timeout(path, DEFAULT_BUSY_TIMEOUT)
    }

    /// `[storage]` 설정으로 저장소를 엽니다.
    pub fn from_config(config: &StorageConfig) -> Result<Self, StoreError> {
        Self::open_with_timeout(
            &config.database_path,
            Duration::from_millis(config.busy_timeout_ms),
        )
    }

    pub fn open_with_timeout(
        path: impl Into<PathBuf>,
        busy_timeout: Duration,
    ) -> Result<Self, StoreError> {
        let store = Self {
            path: path.into(),
            busy_timeout,
        };

        let conn = store.connect()?;
        conn.execute_batch("PRAGMA journal_mode = WAL; PRAGMA synchronous = NORMAL;")?;
        conn.execute_batch(SCHEMA_SQL)?;

        info!(path = %store.path.display(), "finding store ready");
        Ok(store)
    }

    /// 데이터베이스 파일 경로
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connect(&self) -> Result<Connection, StoreError> {
        let conn = Connection::open(&self.path).map_err(|e| StoreError::Open {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        })?;
        conn.busy_timeout(self.busy_timeout)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(conn)
    }

    fn insert_project(&self, name: &str, package_name: &str) -> Result<Project, StoreError> {
        let conn = self.connect()?;
        let created_at = Utc::now();
        conn.execute(
            "INSERT INTO projects (name, package_name, created_at) VALUES (?1, ?2, ?3)",
            params![name, package_name, created_at.to_rfc3339()],
        )?;
        let id = conn.last_insert_rowid();
        debug!(project_id = id, name, "project inserted");

        Ok(Project {
            id,
            name: name.to_owned(),
            package_name: package_name.to_owned(),
            created_at,
        })
    }

    fn insert_endpoint(
        &self,
        project_id: ProjectId,
        url: &str,
        method: HttpMethod,
        source: &str,
    ) -> Result<(), StoreError> {
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO endpoints (project_id, url, method, source, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                project_id,
                url,
                method.as_str(),
                source,
                Utc::now().to_rfc3339()
            ],
        )?;
        Ok(())
    }

    fn insert_firebase_key(&self, project_id: ProjectId, key: &str) -> Result<(), StoreError> {
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO firebase_keys (project_id, key, created_at) VALUES (?1, ?2, ?3)",
            params![project_id, key, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    fn select_endpoints(&self, project_id: ProjectId) -> Result<Vec<Endpoint>, StoreError> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT id, project_id, url, method, source, created_at
             FROM endpoints WHERE project_id = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map(params![project_id], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, Option<String>>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
            ))
        })?;

        let mut endpoints = Vec::new();
        for row in rows {
            let (id, project_id, url, method, source, created_at) = row?;
            endpoints.push(Endpoint {
                id,
                project_id,
                url,
                method: method
                    .as_deref()
                    .map(|m| m.parse().unwrap_or_default())
                    .unwrap_or_default(),
                source,
                created_at: parse_timestamp("endpoints", &created_at)?,
            });
        }
        Ok(endpoints)
    }

    fn select_firebase_keys(&self, project_id: ProjectId) -> Result<Vec<FirebaseKey>, StoreError> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT id, project_id, key, created_at
             FROM firebase_keys WHERE project_id = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map(params![project_id], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut keys = Vec::new();
        for row in rows {
            let (id, project_id, key, created_at) = row?;
            keys.push(FirebaseKey {
                id,
                project_id,
                key,
                created_at: parse_timestamp("firebase_keys", &created_at)?,
            });
        }
        Ok(keys)
    }

    fn select_projects(&self) -> Result<Vec<Project>, StoreError> {
        let conn = self.connect()?;
        let mut stmt =
            conn.prepare("SELECT id, name, package_name, created_at FROM projects ORDER BY id")?;
        let rows = stmt.query_map([], project_columns)?;

        let mut projects = Vec::new();
        for row in rows {
            projects.push(row_to_project(row?)?);
        }
        Ok(projects)
    }

    fn select_project(&self, project_id: ProjectId) -> Result<Option<Project>, StoreError> {
        let conn = self.connect()?;
        let row = conn
            .query_row(
                "SELECT id, name, package_name, created_at FROM projects WHERE id = ?1",
                params![project_id],
                project_columns,
            )
            .optional()?;
        row.map(row_to_project).transpose()
    }
}

type ProjectColumns = (i64, String, String, String);

fn project_columns(row: &rusqlite::Row<'_>) -> rusqlite::Result<ProjectColumns> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
}

fn row_to_project((id, name, package_name, created_at): ProjectColumns) -> Result<Project, StoreError> {
    Ok(Project {
        id,
        name,
        package_name,
        created_at: parse_timestamp("projects", &created_at)?,
    })
}

fn parse_timestamp(table: &'static str, raw: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::CorruptRow {
            table,
            reason: format!("created_at '{raw}': {e}"),
        })
}

impl FindingStore for SqliteFindingStore {
    fn create_project(&self, name: &str, package_name: &str) -> Result<Project, ApkscopeError> {
        Ok(self.insert_project(name, package_name)?)
    }

    fn add_endpoint(
        &self,
        project_id: ProjectId,
        url: &str,
        method: HttpMethod,
        source: &str,
    ) -> Result<(), ApkscopeError> {
        Ok(self.insert_endpoint(project_id, url, method, source)?)
    }

    fn add_firebase_key(&self, project_id: ProjectId, key: &str) -> Result<(), ApkscopeError> {
        Ok(self.insert_firebase_key(project_id, key)?)
    }

    fn project_endpoints(&self, project_id: ProjectId) -> Result<Vec<Endpoint>, ApkscopeError> {
        Ok(self.select_endpoints(project_id)?)
    }

    fn project_firebase_keys(
        &self,
        project_id: ProjectId,
    ) -> Result<Vec<FirebaseKey>, ApkscopeError> {
        Ok(self.select_firebase_keys(project_id)?)
    }

    fn list_projects(&self) -> Result<Vec<Project>, ApkscopeError> {
        Ok(self.select_projects()?)
    }

    fn get_project(&self, project_id: ProjectId) -> Result<Option<Project>, ApkscopeError> {
        Ok(self.select_project(project_id)?)
    }
}
