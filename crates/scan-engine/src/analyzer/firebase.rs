//! Firebase/Google API 키 분석기
//!
//! `AIzaSy` + 키 알파벳 33자로 이루어진 정확히 39자 토큰만 인정합니다.
//! 앞뒤로 키 알파벳(`[0-9A-Za-z_-]`)이 붙어 있으면 더 긴 토큰의 일부로 보고 버립니다.
//! `regex` 크레이트는 lookaround를 지원하지 않으므로 경계는 매치 후 직접 확인합니다.

use regex::Regex;

use apkscope_core::error::ApkscopeError;
use apkscope_core::store::FindingStore;
use apkscope_core::types::{FindingKind, ProjectId};

use super::Analyzer;
use crate::error::ScanEngineError;

/// 분석기 이름
pub const FIREBASE_ANALYZER_NAME: &str = "firebase";

/// 키 전체 길이
pub const FIREBASE_KEY_LEN: usize = 39;

const KEY_PATTERN: &str = r"AIzaSy[0-9A-Za-z_-]{33}";

/// API 키 → FirebaseKey 분석기
#[derive(Debug, Clone)]
pub struct FirebaseKeyAnalyzer {
    pattern: Regex,
}

impl FirebaseKeyAnalyzer {
    pub fn new() -> Result<Self, ScanEngineError> {
        let pattern = Regex::new(KEY_PATTERN).map_err(|source| ScanEngineError::Pattern {
            analyzer: FIREBASE_ANALYZER_NAME,
            source,
        })?;
        Ok(Self { pattern })
    }
}

fn is_key_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'-'
}

impl Analyzer for FirebaseKeyAnalyzer {
    fn name(&self) -> &'static str {
        FIREBASE_ANALYZER_NAME
    }

    fn kind(&self) -> FindingKind {
        FindingKind::FirebaseKey
    }

    fn target(&self) -> &'static str {
        "Firebase keys"
    }

    fn find_matches<'t>(&self, text: &'t str) -> Vec<&'t str> {
        let bytes = text.as_bytes();
        self.pattern
            .find_iter(text)
            .filter(|m| {
                let before = m.start().checked_sub(1).map(|i| bytes[i]);
                let after = bytes.get(m.end()).copied();
                !before.is_some_and(is_key_byte) && !after.is_some_and(is_key_byte)
            })
            .map(|m| m.as_str())
            .collect()
    }

    fn persist(
        &self,
        store: &dyn FindingStore,
        project_id: ProjectId,
        value: &str,
    ) -> Result<(), ApkscopeError> {
        store.add_firebase_key(project_id, value)
    }

    fn summary(&self, found: usize) -> String {
        format!("Firebase key scan complete: {found} keys found")
    }
}
