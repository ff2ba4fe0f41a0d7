//! 디컴파일러 프로세스 실행
//!
//! [`DecompilerRunner::run`]은 실패를 호출자에게 전파하지 않습니다.
//! 실행 실패, 비정상 종료, 스트림 오류는 모두 콘솔 이벤트와
//! `decompile_complete(error)`로 변환되고 [`DecompileReport`]에 기록됩니다.

use std::ffi::OsString;
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};

use metrics::{counter, histogram};
use tokio::process::{Child, Command};
use tracing::{debug, error, info, instrument, warn};

use apkscope_core::config::DecompilerConfig;
use apkscope_core::event::{EventEmitter, PipelineEvent};
use apkscope_core::metrics as m;
use apkscope_core::types::DecompileStatus;

use crate::error::DecompilerError;
#[cfg(unix)]
use crate::output::CombinedPipe;
use crate::output::OutputLines;

/// 디컴파일 결과 요약
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecompileReport {
    pub status: DecompileStatus,
    /// 프로세스 종료 코드 (시그널 종료나 실행 실패 시 `None`)
    pub exit_code: Option<i32>,
    /// 전달된 출력 줄 수
    pub lines: u64,
    pub elapsed: Duration,
}

impl DecompileReport {
    pub fn succeeded(&self) -> bool {
        self.status == DecompileStatus::Success
    }
}

/// 실행 중인 디컴파일러 프로세스
///
/// 출력 스트림 소비와 종료 대기는 별개의 단계입니다.
#[derive(Debug)]
pub struct RunningDecompile {
    child: Child,
    lines: OutputLines,
}

impl RunningDecompile {
    /// 병합된 출력 줄 스트림
    pub fn lines(&mut self) -> &mut OutputLines {
        &mut self.lines
    }

    /// 프로세스 종료를 기다립니다.
    pub async fn wait(mut self) -> Result<ExitStatus, DecompilerError> {
        self.child.wait().await.map_err(DecompilerError::Wait)
    }

    /// 프로세스를 종료시키고 reader 태스크를 중단합니다.
    pub async fn kill(mut self) {
        self.lines.abort();
        if let Err(e) = self.child.kill().await {
            warn!(error = %e, "failed to kill decompiler process");
        }
    }
}

/// 외부 디컴파일러 실행기
#[derive(Debug, Clone)]
pub struct DecompilerRunner {
    program: String,
    extra_args: Vec<String>,
}

impl DecompilerRunner {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            extra_args: Vec::new(),
        }
    }

    /// `[decompiler]` 설정으로 생성합니다.
    pub fn from_config(config: &DecompilerConfig) -> Self {
        Self {
            program: config.program.clone(),
            extra_args: config.extra_args.clone(),
        }
    }

    /// `-d` 앞에 붙는 추가 인자를 지정합니다.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// 프로세스 인자: `extra_args... -d <output_dir> <input>`
    pub fn command_args(&self, input: &Path, output_dir: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = self.extra_args.iter().map(OsString::from).collect();
        args.push(OsString::from("-d"));
        args.push(output_dir.as_os_str().to_owned());
        args.push(input.as_os_str().to_owned());
        args
    }

    /// 사람이 읽는 도구 이름 (`jadx` → `JADX`)
    pub fn display_name(&self) -> String {
        Path::new(&self.program)
            .file_name()
            .map(|n| n.to_string_lossy().to_uppercase())
            .unwrap_or_else(|| self.program.to_uppercase())
    }

    /// 출력 디렉토리를 만들고 프로세스를 실행합니다.
    pub async fn spawn(
        &self,
        input: &Path,
        output_dir: &Path,
    ) -> Result<RunningDecompile, DecompilerError> {
        tokio::fs::create_dir_all(output_dir)
            .await
            .map_err(|source| DecompilerError::OutputDir {
                path: output_dir.display().to_string(),
                source,
            })?;

        let mut command = Command::new(&self.program);
        command
            .args(self.command_args(input, output_dir))
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let mut lines = OutputLines::new();

        // stdout과 stderr를 하나의 파이프로 합쳐 쓰기 순서를 보존합니다.
        #[cfg(unix)]
        let child = {
            let (stdout, stderr, reader) = CombinedPipe::new()
                .and_then(CombinedPipe::into_stdio)
                .map_err(DecompilerError::Pipe)?;
            command.stdout(stdout).stderr(stderr);
            let child = self.spawn_command(&mut command)?;
            // 부모 쪽 쓰기 끝을 닫아야 자식 종료 후 EOF가 옵니다.
            drop(command);
            lines.attach(reader);
            child
        };

        #[cfg(not(unix))]
        let child = {
            command.stdout(Stdio::piped()).stderr(Stdio::piped());
            let mut child = self.spawn_command(&mut command)?;
            let missing = |name: &str| {
                DecompilerError::Pipe(std::io::Error::other(format!("{name} was not captured")))
            };
            let stdout = child.stdout.take().ok_or_else(|| missing("stdout"))?;
            let stderr = child.stderr.take().ok_or_else(|| missing("stderr"))?;
            lines.attach(stdout);
            lines.attach(stderr);
            child
        };

        let lines = lines.seal();

        debug!(program = %self.program, pid = ?child.id(), "decompiler spawned");
        Ok(RunningDecompile { child, lines })
    }

    fn spawn_command(&self, command: &mut Command) -> Result<Child, DecompilerError> {
        command.spawn().map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                DecompilerError::NotFound {
                    program: self.program.clone(),
                }
            } else {
                DecompilerError::Spawn {
                    program: self.program.clone(),
                    source,
                }
            }
        })
    }

    /// 디컴파일러를 실행하고 모든 진행 상황을 이벤트로 발행합니다.
    ///
    /// 출력 줄은 `console_output`, 종료는 `decompile_complete`로 발행됩니다.
    /// 에러는 반환하지 않습니다.
    #[instrument(skip(self, events), fields(program = %self.program, trace = events.trace_id()))]
    pub async fn run(
        &self,
        input: &Path,
        output_dir: &Path,
        events: &EventEmitter,
    ) -> DecompileReport {
        let started = Instant::now();
        let mut lines = 0u64;

        let result = self
            .run_to_exit(input, output_dir, events, &mut lines)
            .await;

        let (status, exit_code) = match result {
            Ok(exit) if exit.success() => {
                info!(lines, "decompilation succeeded");
                (DecompileStatus::Success, exit.code())
            }
            Ok(exit) => {
                warn!(lines, exit = %exit, "decompiler exited with failure");
                (DecompileStatus::Error, exit.code())
            }
            Err(e) => {
                let message = match &e {
                    DecompilerError::NotFound { .. } => format!(
                        "{} not found. Please ensure it's installed and in the system PATH.",
                        self.display_name()
                    ),
                    other => format!("An error occurred: {other}"),
                };
                error!(error = %e, "{}", message);
                events.emit(PipelineEvent::console_error(message));
                (DecompileStatus::Error, None)
            }
        };

        let elapsed = started.elapsed();
        histogram!(m::DECOMPILE_DURATION_SECONDS).record(elapsed.as_secs_f64());
        events.emit(PipelineEvent::DecompileComplete { status });

        DecompileReport {
            status,
            exit_code,
            lines,
            elapsed,
        }
    }

    async fn run_to_exit(
        &self,
        input: &Path,
        output_dir: &Path,
        events: &EventEmitter,
        lines: &mut u64,
    ) -> Result<ExitStatus, DecompilerError> {
        let mut running = self.spawn(input, output_dir).await?;

        loop {
            let Some(next) = running.lines().next_line().await else {
                break;
            };
            match next {
                Ok(line) => {
                    debug!("{}", line);
                    counter!(m::CONSOLE_LINES_TOTAL).increment(1);
                    *lines += 1;
                    events.emit(PipelineEvent::console(line));
                }
                Err(e) => {
                    running.kill().await;
                    return Err(e);
                }
            }
        }

        running.wait().await
    }
}
