//! Toolchain 模块：对 cargo / rustc / cargo-generate 的封装

pub mod command;
pub mod error;
pub mod parser;
pub mod runner;
pub mod streaming;
pub mod types;

pub use command::{
    AddCrate, CommandSpec, CrateTemplate, Edition, GenerateProject, NewCrate, PrintOutput,
    RustcPrint, SearchCrates, TemplateSource, VersionControl,
};
pub use error::{Result, RunError};
pub use runner::StderrPolicy;
pub use streaming::{answer_fn, AnswerFn};
pub use types::{CrateListing, PrintResults, ProcessResult, RenderedCommand, ToolchainInfo};

use parser::{parse_print_output, parse_search_output};
use std::path::Path;
use tokio::sync::{mpsc, oneshot};

#[derive(Debug, Clone)]
pub struct Toolchain {
    pub cargo: String,
    pub rustc: String,
    pub policy: StderrPolicy,
}

impl Toolchain {
    pub fn new(cargo: impl Into<String>, rustc: impl Into<String>, policy: StderrPolicy) -> Self {
        Self {
            cargo: cargo.into(),
            rustc: rustc.into(),
            policy,
        }
    }

    /// 版本与宿主信息，缺失的工具显示为“未找到”
    pub fn info(&self) -> ToolchainInfo {
        let rustc_verbose = Self::read_cmd(&self.rustc, &["-vV"]);
        let host = rustc_verbose
            .as_deref()
            .and_then(|out| out.lines().find_map(|l| l.strip_prefix("host: ")))
            .unwrap_or("未知")
            .to_string();

        ToolchainInfo {
            cargo_version: Self::read_cmd(&self.cargo, &["--version"])
                .unwrap_or_else(|| "未找到".to_string()),
            rustc_version: rustc_verbose
                .as_deref()
                .and_then(|out| out.lines().next())
                .unwrap_or("未找到")
                .to_string(),
            host,
            has_generate: Self::read_cmd(&self.cargo, &["generate", "--version"]).is_some(),
        }
    }

    fn read_cmd(program: &str, args: &[&str]) -> Option<String> {
        duct::cmd(program, args)
            .stderr_null()
            .read()
            .ok()
            .map(|s| s.trim().to_string())
    }

    /// 用配置的 cargo 可执行文件渲染命令
    pub fn cargo_command(&self, spec: &impl CommandSpec) -> RenderedCommand {
        spec.render().with_program(self.cargo.as_str())
    }

    // ===== 缓冲执行 =====

    /// `cargo search`，空查询直接返回空列表
    pub async fn search_crates(&self, search: &SearchCrates) -> Result<Vec<CrateListing>> {
        if search.query.trim().is_empty() {
            return Ok(Vec::new());
        }
        let result = runner::run_buffered(self.cargo_command(search), None, self.policy).await?;
        Ok(parse_search_output(&result.stdout))
    }

    pub async fn add_crate(&self, add: &AddCrate, workspace: &Path) -> Result<ProcessResult> {
        runner::run_buffered(
            self.cargo_command(add),
            Some(workspace.to_path_buf()),
            self.policy,
        )
        .await
    }

    pub async fn new_crate(&self, new: &NewCrate, workspace: &Path) -> Result<ProcessResult> {
        runner::run_buffered(
            self.cargo_command(new),
            Some(workspace.to_path_buf()),
            self.policy,
        )
        .await
    }

    pub async fn print(&self, print: &RustcPrint) -> Result<PrintResults> {
        let cmd = print.render().with_program(self.rustc.as_str());
        let result = runner::run_buffered(cmd, None, self.policy).await?;
        Ok(PrintResults {
            output: print.output,
            values: parse_print_output(&result.stdout),
        })
    }

    // ===== 流式执行 =====

    /// `cargo generate`，模板提问交给 `answer` 回答
    pub async fn generate(
        &self,
        generate: &GenerateProject,
        workspace: &Path,
        answer: Option<AnswerFn>,
        output_tx: Option<mpsc::UnboundedSender<String>>,
        cancel: Option<oneshot::Receiver<()>>,
    ) -> Result<ProcessResult> {
        let cmd = self.cargo_command(generate);
        streaming::run_interactive(&cmd, Some(workspace), answer, output_tx, cancel).await
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_search_query_skips_subprocess() {
        let toolchain = Toolchain::new("/nonexistent/cargo", "rustc", StderrPolicy::Log);
        let listings = toolchain
            .search_crates(&SearchCrates::new("   "))
            .await
            .unwrap();
        assert!(listings.is_empty());
    }

    #[tokio::test]
    async fn missing_program_is_a_spawn_error() {
        let toolchain = Toolchain::new("/nonexistent/cargo", "rustc", StderrPolicy::Log);
        let err = toolchain
            .search_crates(&SearchCrates::new("serde"))
            .await
            .unwrap_err();
        assert!(matches!(err, RunError::Spawn { .. }));
    }

    #[tokio::test]
    async fn print_uses_configured_rustc() {
        // `echo` 代替 rustc：输出即为参数本身
        let toolchain = Toolchain::new("cargo", "echo", StderrPolicy::Log);
        let results = toolchain
            .print(&RustcPrint::new(PrintOutput::TargetList))
            .await
            .unwrap();
        assert_eq!(results.values, vec!["--print target-list".to_string()]);
    }
}
