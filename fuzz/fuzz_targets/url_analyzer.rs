#![no_main]

use apkscope_scan_engine::{Analyzer, UrlAnalyzer};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);
    let Ok(analyzer) = UrlAnalyzer::new() else {
        return;
    };

    for m in analyzer.find_matches(&text) {
        // 모든 매치는 http(s) 스킴으로 시작하고 공백을 포함하지 않아야 함
        assert!(m.starts_with("http://") || m.starts_with("https://"));
        assert!(!m.chars().any(char::is_whitespace));
    }
});
