use thiserror::Error;

pub type Result<T> = std::result::Result<T, RunError>;

/// 外部进程执行错误
#[derive(Error, Debug)]
pub enum RunError {
    #[error("无法启动 {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("{program} 执行失败 (exit={}): {}", exit_label(.code), .stderr.trim())]
    ProcessFailure {
        program: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("{program} 输出了错误信息: {}", .stderr.trim())]
    StderrOutput { program: String, stderr: String },

    #[error("用户已取消")]
    UserCancelled,

    #[error("子进程等待输入但没有应答者: {question}")]
    UnansweredPrompt { question: String },

    #[error("进程 IO 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("后台任务异常退出: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl RunError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, RunError::UserCancelled)
    }
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(c) => c.to_string(),
        None => "signal".to_string(),
    }
}
