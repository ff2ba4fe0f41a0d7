//! 메트릭 상수 및 설명 등록
//!
//! 모든 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 각 크레이트는 이 상수를 사용하여 `metrics::counter!()` 매크로를 호출합니다.
//! exporter는 설치하지 않으며, 임베딩하는 프로세스가 recorder를 붙일 수 있습니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `apkscope_`
//! - 접미어: `_total` (counter), `_seconds` (histogram)
//!
//! # 사용 예시
//!
//! ```ignore
//! use metrics::counter;
//!
//! counter!(apkscope_core::metrics::FINDINGS_TOTAL, "kind" => "endpoint").increment(1);
//! ```

use metrics::{describe_counter, describe_histogram};

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 결과 레이블 키 (success, decompile_failed, analysis_partial)
pub const LABEL_RESULT: &str = "result";

/// 발견 항목 종류 레이블 키 (endpoint, firebase_key)
pub const LABEL_KIND: &str = "kind";

/// 분석기 레이블 키 (regex, firebase)
pub const LABEL_ANALYZER: &str = "analyzer";

// ─── 파이프라인 메트릭 ─────────────────────────────────────────────

/// 시작된 작업 수 (counter)
pub const JOBS_STARTED_TOTAL: &str = "apkscope_jobs_started_total";

/// 종료된 작업 수 (counter, label: result)
pub const JOBS_COMPLETED_TOTAL: &str = "apkscope_jobs_completed_total";

// ─── 디컴파일러 메트릭 ─────────────────────────────────────────────

/// 디컴파일러 출력 줄 수 (counter)
pub const CONSOLE_LINES_TOTAL: &str = "apkscope_console_lines_total";

/// 디컴파일 소요 시간 (histogram, 초)
pub const DECOMPILE_DURATION_SECONDS: &str = "apkscope_decompile_duration_seconds";

// ─── 스캔 엔진 메트릭 ──────────────────────────────────────────────

/// 발견 항목 수 (counter, label: kind)
pub const FINDINGS_TOTAL: &str = "apkscope_findings_total";

/// 스캔한 파일 수 (counter, label: analyzer)
pub const SCAN_FILES_TOTAL: &str = "apkscope_scan_files_total";

/// 파일 단위 스캔 오류 수 (counter, label: analyzer)
pub const SCAN_FILE_ERRORS_TOTAL: &str = "apkscope_scan_file_errors_total";

/// 모든 메트릭의 설명을 등록합니다.
///
/// recorder가 설치되지 않은 상태에서도 호출할 수 있습니다.
pub fn describe_all() {
    describe_counter!(JOBS_STARTED_TOTAL, "Number of decompile-then-analyze jobs started");
    describe_counter!(
        JOBS_COMPLETED_TOTAL,
        "Number of jobs that reached a terminal outcome"
    );
    describe_counter!(
        CONSOLE_LINES_TOTAL,
        "Lines forwarded from the decompiler's output streams"
    );
    describe_histogram!(
        DECOMPILE_DURATION_SECONDS,
        "Wall-clock duration of the decompiler process"
    );
    describe_counter!(FINDINGS_TOTAL, "Findings persisted by analyzers");
    describe_counter!(SCAN_FILES_TOTAL, "Files visited by analyzers");
    describe_counter!(
        SCAN_FILE_ERRORS_TOTAL,
        "Per-file read or persistence errors during scanning"
    );
}
