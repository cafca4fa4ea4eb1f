//! 项目级 `.cargo/config.toml` 的读写（目前只关心 `build.target`）

use crate::targets::SYSTEM_TARGET;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use toml::{Table, Value};

#[derive(Debug)]
pub struct CargoConfig {
    path: PathBuf,
    table: Table,
}

impl CargoConfig {
    pub fn path_for(workspace: &Path) -> PathBuf {
        workspace.join(".cargo").join("config.toml")
    }

    /// 只读查询当前的 `build.target`，配置文件不存在时不会创建它
    pub fn current_build_target(workspace: &Path) -> Option<String> {
        if !Self::path_for(workspace).exists() {
            return None;
        }
        Self::open(workspace)
            .ok()
            .and_then(|c| c.build_target().map(str::to_string))
    }

    /// 打开工作区的配置文件，目录和文件不存在时创建空文件
    pub fn open(workspace: &Path) -> Result<Self> {
        let path = Self::path_for(workspace);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("创建目录失败: {}", dir.display()))?;
        }
        if !path.exists() {
            fs::write(&path, "").with_context(|| format!("创建文件失败: {}", path.display()))?;
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("读取失败: {}", path.display()))?;
        let table: Table = content
            .parse()
            .with_context(|| format!("TOML 解析失败: {}", path.display()))?;
        Ok(Self { path, table })
    }

    pub fn build_target(&self) -> Option<&str> {
        self.table
            .get("build")
            .and_then(Value::as_table)
            .and_then(|build| build.get("target"))
            .and_then(Value::as_str)
    }

    /// 设置 `build.target`；`None` 或 `system` 表示删除，空的 `[build]` 一并删除
    pub fn set_build_target(&mut self, target: Option<&str>) -> Result<()> {
        match target.filter(|t| *t != SYSTEM_TARGET) {
            Some(triple) => {
                let build = self
                    .table
                    .entry("build")
                    .or_insert_with(|| Value::Table(Table::new()));
                let Some(build) = build.as_table_mut() else {
                    anyhow::bail!("{} 中的 build 不是表", self.path.display());
                };
                build.insert("target".to_string(), Value::String(triple.to_string()));
            }
            None => {
                let now_empty = match self.table.get_mut("build").and_then(Value::as_table_mut) {
                    Some(build) => {
                        build.remove("target");
                        build.is_empty()
                    }
                    None => false,
                };
                if now_empty {
                    self.table.remove("build");
                }
            }
        }
        Ok(())
    }

    /// 整体重写文件
    pub fn save(&self) -> Result<()> {
        let content = toml::to_string(&self.table).context("TOML 序列化失败")?;
        fs::write(&self.path, content)
            .with_context(|| format!("写入失败: {}", self.path.display()))?;
        log::info!("已写入 {}", self.path.display());
        Ok(())
    }
}

/// 打开、修改、保存一步完成
pub fn write_build_target(workspace: &Path, target: &str) -> Result<PathBuf> {
    let mut config = CargoConfig::open(workspace)?;
    config.set_build_target(Some(target))?;
    config.save()?;
    Ok(config.path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reading_current_target_leaves_workspace_untouched() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(CargoConfig::current_build_target(dir.path()), None);
        assert!(!dir.path().join(".cargo").exists());

        write_build_target(dir.path(), "wasm32-wasip1").unwrap();
        assert_eq!(
            CargoConfig::current_build_target(dir.path()).as_deref(),
            Some("wasm32-wasip1")
        );
    }

    #[test]
    fn creates_missing_file_and_sets_target() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_build_target(dir.path(), "wasm32-unknown-unknown").unwrap();

        let content = fs::read_to_string(path).unwrap();
        let table: Table = content.parse().unwrap();
        assert_eq!(
            table["build"]["target"].as_str(),
            Some("wasm32-unknown-unknown")
        );
    }

    #[test]
    fn system_removes_target_and_empty_build_table() {
        let dir = tempfile::tempdir().unwrap();
        write_build_target(dir.path(), "x86_64-unknown-none").unwrap();
        write_build_target(dir.path(), SYSTEM_TARGET).unwrap();

        let config = CargoConfig::open(dir.path()).unwrap();
        assert_eq!(config.build_target(), None);
        assert!(!config.table.contains_key("build"));
    }

    #[test]
    fn other_settings_survive_rewrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = CargoConfig::path_for(dir.path());
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "[build]\njobs = 4\n\n[net]\noffline = true\n").unwrap();

        write_build_target(dir.path(), "aarch64-linux-android").unwrap();
        write_build_target(dir.path(), SYSTEM_TARGET).unwrap();

        let config = CargoConfig::open(dir.path()).unwrap();
        assert_eq!(config.build_target(), None);
        assert_eq!(config.table["build"]["jobs"].as_integer(), Some(4));
        assert_eq!(config.table["net"]["offline"].as_bool(), Some(true));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = CargoConfig::path_for(dir.path());
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "[build\ntarget = ").unwrap();
        assert!(CargoConfig::open(dir.path()).is_err());
    }
}
