use crate::toolchain::{StderrPolicy, Toolchain};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// cargo 可执行文件
    pub cargo: String,
    /// rustc 可执行文件
    pub rustc: String,
    /// 添加依赖时每次搜索的结果数量
    pub search_limit: u32,
    /// 输入停止多久后才发起搜索（毫秒）
    pub debounce_ms: u64,
    /// 为 true 时，退出码为 0 但 stderr 有内容也视为失败
    pub strict_stderr: bool,
    pub default_vcs: String,
    pub github_token: Option<String>,
    pub github_per_page: u32,
    /// 搜索 cargo-generate 模板时使用的 GitHub topic
    pub template_topic: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cargo: "cargo".to_string(),
            rustc: "rustc".to_string(),
            search_limit: 25,
            debounce_ms: 500,
            strict_stderr: false,
            default_vcs: "git".to_string(),
            github_token: None,
            github_per_page: 30,
            template_topic: "cargo-generate".to_string(),
        }
    }
}

impl Config {
    pub fn path() -> PathBuf {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(".config/rust-project-manager/config.toml")
    }

    pub fn load_or_default() -> Result<Self> {
        let mut config = Self::load_from(&Self::path())?;
        if config.github_token.is_none() {
            config.github_token = std::env::var("GITHUB_TOKEN")
                .ok()
                .filter(|t| !t.trim().is_empty());
        }
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("读取配置文件失败: {}", path.display()))?;
            let config: Config = toml::from_str(&content)
                .with_context(|| format!("配置文件格式错误: {}", path.display()))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn stderr_policy(&self) -> StderrPolicy {
        if self.strict_stderr {
            StderrPolicy::Fail
        } else {
            StderrPolicy::Log
        }
    }

    pub fn toolchain(&self) -> Toolchain {
        Toolchain::new(&self.cargo, &self.rustc, self.stderr_policy())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config.search_limit, 25);
        assert_eq!(config.debounce_ms, 500);
        assert_eq!(config.default_vcs, "git");
        assert_eq!(config.stderr_policy(), StderrPolicy::Log);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "strict_stderr = true\nsearch_limit = 10\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.search_limit, 10);
        assert_eq!(config.stderr_policy(), StderrPolicy::Fail);
        assert_eq!(config.template_topic, "cargo-generate");
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "search_limit = \"many\"").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
