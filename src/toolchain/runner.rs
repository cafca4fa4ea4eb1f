//! 缓冲执行：运行到结束后一次性拿到 stdout / stderr

use super::error::{Result, RunError};
use super::types::{ProcessResult, RenderedCommand};
use std::path::{Path, PathBuf};

/// 退出码为 0 但 stderr 非空时的处理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StderrPolicy {
    /// 只记录日志（cargo 会把 `Updating crates.io index` 之类的进度写到 stderr）
    #[default]
    Log,
    /// 视为失败
    Fail,
}

/// 在阻塞线程池中执行命令，避免卡住事件循环
pub async fn run_buffered(
    cmd: RenderedCommand,
    cwd: Option<PathBuf>,
    policy: StderrPolicy,
) -> Result<ProcessResult> {
    tokio::task::spawn_blocking(move || run_buffered_blocking(&cmd, cwd.as_deref(), policy)).await?
}

pub fn run_buffered_blocking(
    cmd: &RenderedCommand,
    cwd: Option<&Path>,
    policy: StderrPolicy,
) -> Result<ProcessResult> {
    log::info!("执行 '{}'", cmd);

    let mut expr = duct::cmd(cmd.program.as_str(), &cmd.args)
        .stdout_capture()
        .stderr_capture()
        .unchecked();
    if let Some(dir) = cwd {
        expr = expr.dir(dir);
    }

    let output = expr.run().map_err(|source| RunError::Spawn {
        program: cmd.program.clone(),
        source,
    })?;

    let result = ProcessResult {
        exit_code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    };
    check_result(&cmd.program, result, policy)
}

fn check_result(program: &str, result: ProcessResult, policy: StderrPolicy) -> Result<ProcessResult> {
    if !result.success() {
        return Err(RunError::ProcessFailure {
            program: program.to_string(),
            code: result.exit_code,
            stderr: result.stderr,
        });
    }
    if !result.stderr.trim().is_empty() {
        match policy {
            StderrPolicy::Fail => {
                return Err(RunError::StderrOutput {
                    program: program.to_string(),
                    stderr: result.stderr,
                });
            }
            StderrPolicy::Log => {
                log::warn!("{} stderr: {}", program, result.stderr.trim());
            }
        }
    }
    Ok(result)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> RenderedCommand {
        RenderedCommand::new("sh").arg("-c").arg(script)
    }

    #[tokio::test]
    async fn collects_stdout() {
        let result = run_buffered(sh("echo hello"), None, StderrPolicy::Log)
            .await
            .unwrap();
        assert_eq!(result.stdout.trim(), "hello");
        assert_eq!(result.exit_code, Some(0));
    }

    #[tokio::test]
    async fn non_zero_exit_is_process_failure() {
        let err = run_buffered(sh("echo boom >&2; exit 4"), None, StderrPolicy::Log)
            .await
            .unwrap_err();
        match err {
            RunError::ProcessFailure { code, stderr, .. } => {
                assert_eq!(code, Some(4));
                assert_eq!(stderr.trim(), "boom");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn stderr_policy_decides_on_noisy_success() {
        let script = "echo '    Updating crates.io index' >&2; echo ok";
        let ok = run_buffered(sh(script), None, StderrPolicy::Log).await.unwrap();
        assert_eq!(ok.stdout.trim(), "ok");

        let err = run_buffered(sh(script), None, StderrPolicy::Fail)
            .await
            .unwrap_err();
        assert!(matches!(err, RunError::StderrOutput { .. }));
    }

    #[tokio::test]
    async fn runs_in_working_directory() {
        let dir = tempfile::tempdir().unwrap();
        let result = run_buffered(sh("pwd"), Some(dir.path().to_path_buf()), StderrPolicy::Log)
            .await
            .unwrap();
        let reported = std::fs::canonicalize(result.stdout.trim()).unwrap();
        assert_eq!(reported, std::fs::canonicalize(dir.path()).unwrap());
    }

    #[test]
    fn missing_program_is_spawn_error() {
        let cmd = RenderedCommand::new("definitely-not-a-real-binary-rpm");
        let err = run_buffered_blocking(&cmd, None, StderrPolicy::Log).unwrap_err();
        assert!(matches!(err, RunError::Spawn { .. }));
    }
}
