//! Toolchain 相关数据类型定义

use crate::targets::{self, KnownTarget};
use std::fmt;

/// 渲染完成的命令行：程序名 + 参数列表
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl RenderedCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// 追加一个 `--flag value` 对
    pub fn flag_value(self, flag: &str, value: impl Into<String>) -> Self {
        self.arg(flag).arg(value)
    }

    /// 仅在 value 存在时追加 `--flag value`
    pub fn opt_value(self, flag: &str, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(v) => self.flag_value(flag, v),
            None => self,
        }
    }

    /// 仅在 enabled 时追加 `--flag`
    pub fn switch(self, flag: &str, enabled: bool) -> Self {
        if enabled {
            self.arg(flag)
        } else {
            self
        }
    }

    /// 替换程序名（例如配置文件里指定了 cargo 的绝对路径）
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// 程序名在前的全部 token
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.program.as_str()).chain(self.args.iter().map(|s| s.as_str()))
    }
}

/// 用于日志和预览的单行形式，含空格的 token 加双引号
impl fmt::Display for RenderedCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for token in self.tokens() {
            if !first {
                f.write_str(" ")?;
            }
            first = false;
            if token.contains(' ') {
                write!(f, "\"{}\"", token)?;
            } else {
                f.write_str(token)?;
            }
        }
        Ok(())
    }
}

/// 缓冲执行的结果
#[derive(Debug, Clone)]
pub struct ProcessResult {
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessResult {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// `cargo search` 的单条结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrateListing {
    pub name: String,
    pub version: String,
    pub description: String,
}

/// `rustc --print` 的输出行
#[derive(Debug, Clone)]
pub struct PrintResults {
    pub output: super::command::PrintOutput,
    pub values: Vec<String>,
}

impl PrintResults {
    /// 附带已知目标元数据的条目，未知值只保留原始名称
    pub fn enriched(&self) -> Vec<(String, Option<&'static KnownTarget>)> {
        self.values
            .iter()
            .map(|v| (v.clone(), targets::lookup(v)))
            .collect()
    }
}

/// 工具链版本信息（仪表盘显示用）
#[derive(Debug, Clone)]
pub struct ToolchainInfo {
    pub cargo_version: String,
    pub rustc_version: String,
    pub host: String,
    pub has_generate: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_quotes_tokens_with_spaces() {
        let cmd = RenderedCommand::new("cargo")
            .arg("init")
            .arg("/tmp/my crate");
        assert_eq!(cmd.to_string(), "cargo init \"/tmp/my crate\"");
    }

    #[test]
    fn optional_builders_skip_absent_values() {
        let cmd = RenderedCommand::new("cargo")
            .arg("search")
            .opt_value("--limit", None::<String>)
            .switch("--offline", false)
            .opt_value("--registry", Some("local"));
        assert_eq!(cmd.args, vec!["search", "--registry", "local"]);
        assert_eq!(cmd.tokens().next(), Some("cargo"));
    }

    #[test]
    fn enrichment_keeps_unknown_values() {
        let results = PrintResults {
            output: super::super::command::PrintOutput::TargetList,
            values: vec!["x86_64-unknown-none".to_string(), "made-up-triple".to_string()],
        };
        let enriched = results.enriched();
        assert_eq!(enriched[0].1.and_then(|t| t.file_format), Some("ELF"));
        assert_eq!(enriched[1].0, "made-up-triple");
        assert!(enriched[1].1.is_none());
    }
}
