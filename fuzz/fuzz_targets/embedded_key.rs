#![no_main]

use arbitrary::Arbitrary;
use apkscope_scan_engine::{Analyzer, FirebaseKeyAnalyzer};
use libfuzzer_sys::fuzz_target;

const KEY_ALPHABET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789_-";

/// 퍼저용 구조적 입력: 구분자로 둘러싼 키 한 개
#[derive(Arbitrary, Debug)]
struct FuzzInput {
    prefix: String,
    /// 키 본문 33자를 고르는 인덱스
    body: [u8; 33],
    separator: FuzzSeparator,
    suffix: String,
}

#[derive(Arbitrary, Debug)]
enum FuzzSeparator {
    Space,
    Quote,
    AngleBracket,
    Newline,
}

impl FuzzSeparator {
    fn as_str(&self) -> &str {
        match self {
            FuzzSeparator::Space => " ",
            FuzzSeparator::Quote => "\"",
            FuzzSeparator::AngleBracket => ">",
            FuzzSeparator::Newline => "\n",
        }
    }
}

fuzz_target!(|input: FuzzInput| {
    let Ok(analyzer) = FirebaseKeyAnalyzer::new() else {
        return;
    };

    let body: String = input
        .body
        .iter()
        .map(|b| KEY_ALPHABET[usize::from(*b) % KEY_ALPHABET.len()] as char)
        .collect();
    let key = format!("AIzaSy{body}");
    let sep = input.separator.as_str();
    let text = format!("{}{sep}{key}{sep}{}", input.prefix, input.suffix);

    // 구분자로 둘러싼 키는 접두/접미 문자열과 무관하게 항상 발견되어야 함
    assert!(
        analyzer.find_matches(&text).contains(&key.as_str()),
        "embedded key not found in {text:?}"
    );
});
