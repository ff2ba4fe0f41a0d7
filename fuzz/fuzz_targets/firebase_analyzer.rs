#![no_main]

use apkscope_scan_engine::{Analyzer, FirebaseKeyAnalyzer};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);
    let Ok(analyzer) = FirebaseKeyAnalyzer::new() else {
        return;
    };

    for m in analyzer.find_matches(&text) {
        assert_eq!(m.len(), 39);
        assert!(m.starts_with("AIzaSy"));
    }
});
