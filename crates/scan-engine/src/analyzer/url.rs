//! URL 분석기
//!
//! 절대 http/https URL을 찾습니다. 퍼센트 인코딩 옥텟과 선택적 쿼리 문자열을 포함하며,
//! 공백, 따옴표, 꺾쇠괄호에서 멈춥니다. 메서드는 항상 `UNKNOWN`입니다.

use regex::Regex;

use apkscope_core::error::ApkscopeError;
use apkscope_core::store::FindingStore;
use apkscope_core::types::{FindingKind, HttpMethod, ProjectId};

use super::Analyzer;
use crate::error::ScanEngineError;

/// 분석기 이름이자 Endpoint의 source 태그
pub const URL_ANALYZER_NAME: &str = "regex";

/// 호스트/경로 문자 집합에는 `?`가 없으므로 쿼리는 뒤쪽 그룹이 받습니다.
const URL_PATTERN: &str =
    r#"https?://(?:[a-zA-Z0-9$\-_@.&+!*(),/:;=~#]|%[0-9a-fA-F]{2})+(?:\?[^\s"'<>]*)?"#;

/// URL → Endpoint 분석기
#[derive(Debug, Clone)]
pub struct UrlAnalyzer {
    pattern: Regex,
}

impl UrlAnalyzer {
    pub fn new() -> Result<Self, ScanEngineError> {
        let pattern = Regex::new(URL_PATTERN).map_err(|source| ScanEngineError::Pattern {
            analyzer: URL_ANALYZER_NAME,
            source,
        })?;
        Ok(Self { pattern })
    }
}

impl Analyzer for UrlAnalyzer {
    fn name(&self) -> &'static str {
        URL_ANALYZER_NAME
    }

    fn kind(&self) -> FindingKind {
        FindingKind::Endpoint
    }

    fn target(&self) -> &'static str {
        "URLs"
    }

    fn find_matches<'t>(&self, text: &'t str) -> Vec<&'t str> {
        self.pattern.find_iter(text).map(|m| m.as_str()).collect()
    }

    fn persist(
        &self,
        store: &dyn FindingStore,
        project_id: ProjectId,
        value: &str,
    ) -> Result<(), ApkscopeError> {
        store.add_endpoint(project_id, value, HttpMethod::Unknown, URL_ANALYZER_NAME)
    }

    fn summary(&self, found: usize) -> String {
        format!("URL scan complete: {found} endpoints found")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matches(text: &str) -> Vec<String> {
        UrlAnalyzer::new()
            .unwrap()
            .find_matches(text)
            .into_iter()
            .map(str::to_owned)
            .collect()
    }

    #[test]
    fn extracts_url_with_query_from_sentence() {
        assert_eq!(
            matches("Visit https://api.example.com/v1/users?id=5 now"),
            vec!["https://api.example.com/v1/users?id=5"]
        );
    }

    #[test]
    fn stops_at_quotes() {
        let java = r#"Uri.parse("http://cdn.example.org/img.png");"#;
        assert_eq!(matches(java), vec!["http://cdn.example.org/img.png"]);

        let single = "url='https://a.example/x'";
        assert_eq!(matches(single), vec!["https://a.example/x"]);
    }

    #[test]
    fn stops_at_angle_brackets() {
        let xml = "<string name=\"base\">https://svc.example.net/api</string>";
        assert_eq!(matches(xml), vec!["https://svc.example.net/api"]);
    }

    #[test]
    fn query_stops_at_whitespace() {
        assert_eq!(
            matches("GET https://h.example/p?a=1&b=two\tnext"),
            vec!["https://h.example/p?a=1&b=two"]
        );
    }

    #[test]
    fn keeps_percent_encoded_octets() {
        assert_eq!(
            matches("https://h.example/search%20term/x"),
            vec!["https://h.example/search%20term/x"]
        );
    }

    #[test]
    fn bare_percent_ends_match() {
        assert_eq!(matches("https://h.example/a%zz"), vec!["https://h.example/a"]);
    }

    #[test]
    fn keeps_port_and_userinfo() {
        assert_eq!(
            matches("http://user@10.0.2.2:8080/login"),
            vec!["http://user@10.0.2.2:8080/login"]
        );
    }

    #[test]
    fn duplicates_are_reported_each_time() {
        let text = "https://a.example https://a.example";
        assert_eq!(matches(text).len(), 2);
    }

    #[test]
    fn ignores_other_schemes_and_bare_prefix() {
        assert!(matches("ftp://files.example/x").is_empty());
        assert!(matches("see http:// alone").is_empty());
        assert!(matches("no links here").is_empty());
    }

    #[test]
    fn summary_mentions_endpoints() {
        let analyzer = UrlAnalyzer::new().unwrap();
        assert_eq!(analyzer.summary(3), "URL scan complete: 3 endpoints found");
    }
}
