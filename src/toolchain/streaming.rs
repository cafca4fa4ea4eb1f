//! 流式执行与交互式提问应答（cargo generate）
//!
//! 子进程会在任意时刻往 stderr 打印一个问题并阻塞等待 stdin 的一行输入。
//! 这里逐块观察 stderr，判断它是问题还是普通日志，同一个问题只应答一次，
//! 答案由调用方提供的异步回调给出。

use super::error::{Result, RunError};
use super::parser::clean_terminal_output;
use super::types::{ProcessResult, RenderedCommand};
use std::collections::VecDeque;
use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::process::Stdio;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, ChildStdin, Command};
use tokio::sync::{mpsc, oneshot};

pub type AnswerFuture = Pin<Box<dyn Future<Output = Result<String>> + Send>>;

/// 应答回调：收到问题全文，返回要写入 stdin 的答案；返回 Err 表示放弃
pub type AnswerFn = Box<dyn FnMut(String) -> AnswerFuture + Send>;

/// 把普通异步闭包包装成 [`AnswerFn`]
pub fn answer_fn<F, Fut>(mut f: F) -> AnswerFn
where
    F: FnMut(String) -> Fut + Send + 'static,
    Fut: Future<Output = Result<String>> + Send + 'static,
{
    Box::new(move |question| Box::pin(f(question)))
}

/// 这些标签开头的行是编译器 / 工具的诊断输出，不是提问
const DIAGNOSTIC_LABELS: &[&str] = &["error", "warning", "note", "help", "info", "caused by"];

/// 一块 stderr 文本的分类
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkKind {
    Question { key: String },
    /// 与上一个问题相同（重绘、回显），不再应答
    Duplicate,
    Log,
}

/// 单次子进程运行期间的提问状态
#[derive(Debug, Default)]
pub struct PromptTracker {
    /// 已提出但尚未写入答案的问题 key，按提出顺序排列
    outstanding: VecDeque<String>,
    /// 刚应答过的 (问题 key, 答案)，用于吞掉子进程对答案的回显
    echo: Option<(String, String)>,
}

impl PromptTracker {
    pub fn classify(&mut self, chunk: &str) -> ChunkKind {
        let Some((key, rest)) = question_key(chunk) else {
            return ChunkKind::Log;
        };

        if self.outstanding.iter().any(|asked| key.starts_with(asked.as_str())) {
            return ChunkKind::Duplicate;
        }
        if let Some((echo_key, answer)) = self.echo.take() {
            if key == echo_key && rest.trim() == answer {
                return ChunkKind::Duplicate;
            }
        }

        self.outstanding.push_back(key.clone());
        ChunkKind::Question { key }
    }

    /// 最早提出的问题已写入答案：只清掉它的 key，之后同名的新问题会再次被应答。
    /// 排队中的问题仍然保留，它们的重绘继续被忽略。
    pub fn answered(&mut self, answer: &str) {
        if let Some(key) = self.outstanding.pop_front() {
            self.echo = Some((key, answer.trim().to_string()));
        }
    }
}

/// 提取问题 key 及冒号后的内容，日志行返回 None
fn question_key(chunk: &str) -> Option<(String, String)> {
    let cleaned = clean_terminal_output(chunk);
    let line = cleaned.lines().rev().find(|l| !l.trim().is_empty())?;

    if let Some((label, rest)) = line.split_once(':') {
        let key = label.trim();
        if key.is_empty() || is_diagnostic(key) {
            return None;
        }
        return Some((key.to_string(), rest.to_string()));
    }

    let trimmed = line.trim();
    if trimmed.ends_with('?') {
        return Some((trimmed.to_string(), String::new()));
    }
    None
}

fn is_diagnostic(key: &str) -> bool {
    let lower = key.to_ascii_lowercase();
    DIAGNOSTIC_LABELS.iter().any(|label| {
        lower == *label
            || lower
                .strip_prefix(label)
                .is_some_and(|rest| rest.starts_with('['))
    })
}

/// 把字节流切成行，`\r` 刷新的进度行同样视为一行
#[derive(Debug, Default)]
struct LineBuffer {
    partial: String,
}

impl LineBuffer {
    fn push(&mut self, text: &str) -> Vec<String> {
        let mut lines = Vec::new();
        for c in text.chars() {
            match c {
                '\n' | '\r' => {
                    let cleaned = clean_terminal_output(&self.partial);
                    if !cleaned.trim().is_empty() {
                        lines.push(cleaned);
                    }
                    self.partial.clear();
                }
                _ => self.partial.push(c),
            }
        }
        lines
    }

    fn finish(&mut self) -> Option<String> {
        let cleaned = clean_terminal_output(&std::mem::take(&mut self.partial));
        if cleaned.trim().is_empty() {
            None
        } else {
            Some(cleaned)
        }
    }
}

fn forward(tx: &Option<mpsc::UnboundedSender<String>>, line: String) {
    if let Some(tx) = tx {
        let _ = tx.send(line);
    }
}

/// 强制终止子进程（unix 下连同整个进程组）
async fn terminate(child: &mut Child) {
    #[cfg(unix)]
    if let Some(pid) = child.id() {
        unsafe {
            libc::kill(-(pid as i32), libc::SIGKILL);
        }
    }
    if let Err(e) = child.kill().await {
        log::warn!("终止子进程失败: {}", e);
    }
}

async fn write_answer(stdin: &mut Option<ChildStdin>, answer: &str) -> Result<()> {
    let Some(stdin) = stdin.as_mut() else {
        return Err(RunError::Io(std::io::Error::other("子进程 stdin 不可用")));
    };
    let mut line = answer.to_string();
    if !line.ends_with('\n') {
        line.push('\n');
    }
    stdin.write_all(line.as_bytes()).await?;
    stdin.flush().await?;
    Ok(())
}

/// 流式执行命令，遇到提问时调用 `answer` 获取答案写回 stdin。
///
/// - 退出码 0 返回 `Ok`，其余（包括被信号终止）返回 `ProcessFailure`
/// - 回调返回 Err 时先杀掉子进程再把该错误原样返回
/// - 没有回调却遇到提问时，杀掉子进程并返回 `UnansweredPrompt`
///
/// - `cancel` 收到信号（或发送端被丢弃）时杀掉整个进程组并返回 `UserCancelled`
///
/// `output_tx` 收到清理过的 stdout 行、`⚠ ` 前缀的 stderr 日志行和 `? ` 前缀的问题。
pub async fn run_interactive(
    cmd: &RenderedCommand,
    cwd: Option<&Path>,
    mut answer: Option<AnswerFn>,
    output_tx: Option<mpsc::UnboundedSender<String>>,
    mut cancel: Option<oneshot::Receiver<()>>,
) -> Result<ProcessResult> {
    log::info!("启动 '{}'", cmd);

    let mut command = Command::new(&cmd.program);
    command
        .args(&cmd.args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    if let Some(dir) = cwd {
        command.current_dir(dir);
    }
    #[cfg(unix)]
    unsafe {
        // 独立进程组，取消时可以一次杀掉 cargo 及其派生的子进程
        command.pre_exec(|| {
            libc::setpgid(0, 0);
            Ok(())
        });
    }

    let mut child = command.spawn().map_err(|source| RunError::Spawn {
        program: cmd.program.clone(),
        source,
    })?;

    let mut stdin = child.stdin.take();
    let (Some(mut stdout), Some(mut stderr)) = (child.stdout.take(), child.stderr.take()) else {
        terminate(&mut child).await;
        return Err(RunError::Io(std::io::Error::other("子进程输出流不可用")));
    };

    let mut tracker = PromptTracker::default();
    let mut pending: Option<AnswerFuture> = None;
    let mut queued: VecDeque<String> = VecDeque::new();

    let mut out_buf = [0u8; 1024];
    let mut err_buf = [0u8; 1024];
    let mut out_lines = LineBuffer::default();
    let mut stdout_text = String::new();
    let mut stderr_text = String::new();
    let mut stdout_open = true;
    let mut stderr_open = true;
    let mut status = None;

    loop {
        if status.is_some() && !stdout_open && !stderr_open {
            break;
        }

        tokio::select! {
            read = stdout.read(&mut out_buf), if stdout_open => match read {
                Ok(0) => {
                    stdout_open = false;
                    if let Some(line) = out_lines.finish() {
                        forward(&output_tx, line);
                    }
                }
                Ok(n) => {
                    let text = String::from_utf8_lossy(&out_buf[..n]);
                    stdout_text.push_str(&text);
                    for line in out_lines.push(&text) {
                        forward(&output_tx, line);
                    }
                }
                Err(e) => {
                    log::warn!("读取 stdout 失败: {}", e);
                    stdout_open = false;
                }
            },
            read = stderr.read(&mut err_buf), if stderr_open => match read {
                Ok(0) => stderr_open = false,
                Ok(n) => {
                    let chunk = String::from_utf8_lossy(&err_buf[..n]).to_string();
                    stderr_text.push_str(&chunk);
                    match tracker.classify(&chunk) {
                        ChunkKind::Log => {
                            log::debug!("stderr: {}", chunk.trim_end());
                            for line in clean_terminal_output(&chunk).lines() {
                                if !line.trim().is_empty() {
                                    forward(&output_tx, format!("⚠ {}", line));
                                }
                            }
                        }
                        ChunkKind::Duplicate => {
                            log::debug!("忽略重复提问: {}", chunk.trim_end());
                        }
                        ChunkKind::Question { key } => {
                            let question = clean_terminal_output(&chunk).trim().to_string();
                            forward(&output_tx, format!("? {}", question));
                            let Some(answer_fn) = answer.as_mut() else {
                                log::warn!("无人应答的提问: {}", question);
                                terminate(&mut child).await;
                                return Err(RunError::UnansweredPrompt { question: key });
                            };
                            if pending.is_none() {
                                pending = Some(answer_fn(question));
                            } else {
                                queued.push_back(question);
                            }
                        }
                    }
                }
                Err(e) => {
                    log::warn!("读取 stderr 失败: {}", e);
                    stderr_open = false;
                }
            },
            reply = async {
                match pending.as_mut() {
                    Some(fut) => fut.await,
                    None => std::future::pending().await,
                }
            }, if pending.is_some() => {
                pending = None;
                match reply {
                    Ok(text) => {
                        // 子进程已退出时不再写入
                        if status.is_some() {
                            continue;
                        }
                        if let Err(e) = write_answer(&mut stdin, &text).await {
                            terminate(&mut child).await;
                            return Err(e);
                        }
                        tracker.answered(&text);
                        if let (Some(next), Some(answer_fn)) = (queued.pop_front(), answer.as_mut()) {
                            pending = Some(answer_fn(next));
                        }
                    }
                    Err(e) => {
                        log::info!("应答被拒绝，终止子进程: {}", e);
                        terminate(&mut child).await;
                        return Err(e);
                    }
                }
            },
            _ = async {
                match cancel.as_mut() {
                    Some(rx) => {
                        let _ = rx.await;
                    }
                    None => std::future::pending::<()>().await,
                }
            }, if cancel.is_some() => {
                log::info!("收到取消请求，终止 '{}'", cmd.program);
                terminate(&mut child).await;
                return Err(RunError::UserCancelled);
            },
            waited = child.wait(), if status.is_none() => {
                status = Some(waited?);
            }
        }
    }

    let exit_code = status.and_then(|s| s.code());
    log::info!("'{}' 退出 (exit={:?})", cmd.program, exit_code);

    let result = ProcessResult {
        exit_code,
        stdout: stdout_text,
        stderr: stderr_text,
    };
    if result.success() {
        Ok(result)
    } else {
        Err(RunError::ProcessFailure {
            program: cmd.program.clone(),
            code: result.exit_code,
            stderr: result.stderr,
        })
    }
}
