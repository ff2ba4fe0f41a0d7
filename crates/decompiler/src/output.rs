//! 자식 프로세스 출력을 줄 단위로 읽는 스트림
//!
//! Unix에서는 stdout과 stderr가 같은 파이프의 쓰기 끝을 공유하므로
//! reader 태스크 하나가 프로세스가 쓴 순서 그대로 줄을 읽습니다.
//! 그 외 플랫폼은 파이프마다 reader를 두며 두 스트림 사이의 순서는 도착 순서입니다.
//! 모든 reader가 EOF에 도달하면 [`OutputLines::next_line`]이 `None`을 반환합니다.

use std::fmt;
#[cfg(unix)]
use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::DecompilerError;

/// reader 태스크와 소비자 사이 채널 용량
const LINE_CHANNEL_CAPACITY: usize = 256;

type LineResult = Result<String, std::io::Error>;

/// 병합된 출력 줄 스트림
pub struct OutputLines {
    rx: mpsc::Receiver<LineResult>,
    tx: Option<mpsc::Sender<LineResult>>,
    readers: Vec<JoinHandle<()>>,
}

impl OutputLines {
    /// reader가 없는 빈 스트림
    pub(crate) fn new() -> Self {
        let (tx, rx) = mpsc::channel(LINE_CHANNEL_CAPACITY);
        Self {
            rx,
            tx: Some(tx),
            readers: Vec::new(),
        }
    }

    /// 파이프 하나에 reader 태스크를 연결합니다.
    pub(crate) fn attach<R>(&mut self, reader: R)
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        if let Some(tx) = &self.tx {
            self.readers.push(tokio::spawn(read_lines(reader, tx.clone())));
        }
    }

    /// 더 이상 reader를 연결하지 않습니다. 이후 모든 reader가 끝나면 스트림이 닫힙니다.
    pub(crate) fn seal(mut self) -> Self {
        self.tx = None;
        self
    }

    /// 다음 줄을 기다립니다. 모든 스트림이 닫히면 `None`.
    pub async fn next_line(&mut self) -> Option<Result<String, DecompilerError>> {
        self.rx
            .recv()
            .await
            .map(|r| r.map_err(DecompilerError::Stream))
    }

    /// reader 태스크를 중단합니다.
    pub(crate) fn abort(&self) {
        for reader in &self.readers {
            reader.abort();
        }
    }
}

impl fmt::Debug for OutputLines {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputLines")
            .field("readers", &self.readers.len())
            .finish()
    }
}

/// stdout과 stderr가 함께 쓰는 파이프
///
/// `writer`(와 그 복제본)를 `Command`에 넘긴 뒤에는 부모 쪽 쓰기 끝이
/// 남지 않도록 `Command`를 먼저 drop해야 reader가 EOF를 봅니다.
#[cfg(unix)]
pub(crate) struct CombinedPipe {
    pub writer: std::io::PipeWriter,
    pub reader: tokio::net::unix::pipe::Receiver,
}

#[cfg(unix)]
impl CombinedPipe {
    /// 런타임 안에서 호출해야 합니다 (읽기 끝을 reactor에 등록).
    pub(crate) fn new() -> std::io::Result<Self> {
        let (read_end, writer) = std::io::pipe()?;
        let reader = tokio::net::unix::pipe::Receiver::from_file(std::fs::File::from(
            std::os::fd::OwnedFd::from(read_end),
        ))?;
        Ok(Self { writer, reader })
    }

    /// 자식 프로세스의 stdout, stderr로 쓸 쓰기 끝 한 쌍
    pub(crate) fn into_stdio(
        self,
    ) -> std::io::Result<(Stdio, Stdio, tokio::net::unix::pipe::Receiver)> {
        let stderr = Stdio::from(self.writer.try_clone()?);
        Ok((Stdio::from(self.writer), stderr, self.reader))
    }
}

async fn read_lines<R>(reader: R, tx: mpsc::Sender<LineResult>)
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::with_capacity(256);

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                if tx.send(Ok(decode_line(&buf))).await.is_err() {
                    // 소비자가 사라짐
                    break;
                }
            }
            Err(e) => {
                let _ = tx.send(Err(e)).await;
                break;
            }
        }
    }
}

/// 줄 끝의 `\n` / `\r\n`을 제거하고 잘못된 UTF-8은 U+FFFD로 바꿉니다.
pub(crate) fn decode_line(raw: &[u8]) -> String {
    let mut end = raw.len();
    if end > 0 && raw[end - 1] == b'\n' {
        end -= 1;
        if end > 0 && raw[end - 1] == b'\r' {
            end -= 1;
        }
    }
    String::from_utf8_lossy(&raw[..end]).into_owned()
}
