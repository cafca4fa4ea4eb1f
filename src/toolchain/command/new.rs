use super::{CommandSpec, CrateTemplate, Edition, VersionControl};
use crate::toolchain::types::RenderedCommand;
use std::path::{Path, PathBuf};

/// 在 `path` 创建一个新的 cargo 包（`cargo new` / `cargo init`）
#[derive(Debug, Clone)]
pub struct NewCrate {
    pub path: PathBuf,
    pub template: Option<CrateTemplate>,
    pub edition: Option<Edition>,
    pub vcs: Option<VersionControl>,
    pub offline: bool,
    /// true 为 `cargo new`（新建目录），false 为 `cargo init`（使用已有目录）
    pub create_directory: bool,
    /// `--config KEY=VALUE` 覆盖项，保持插入顺序
    pub config: Vec<(String, String)>,
}

impl NewCrate {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            template: None,
            edition: None,
            vcs: None,
            offline: false,
            create_directory: true,
            config: Vec::new(),
        }
    }

    pub fn template(mut self, template: CrateTemplate) -> Self {
        self.template = Some(template);
        self
    }

    pub fn edition(mut self, edition: Edition) -> Self {
        self.edition = Some(edition);
        self
    }

    pub fn vcs(mut self, vcs: Option<VersionControl>) -> Self {
        self.vcs = vcs;
        self
    }

    pub fn offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    pub fn in_place(mut self) -> Self {
        self.create_directory = false;
        self
    }

    pub fn config_override(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.push((key.into(), value.into()));
        self
    }
}

/// 路径最后一段含空格时，cargo 无法把它当作包名，改写为下划线后显式传 `--name`
fn derived_name(path: &Path) -> Option<String> {
    let last = path.file_name()?.to_string_lossy();
    if last.contains(' ') {
        Some(last.replace(' ', "_"))
    } else {
        None
    }
}

impl CommandSpec for NewCrate {
    fn render(&self) -> RenderedCommand {
        let mut cmd = RenderedCommand::new("cargo")
            .arg(if self.create_directory { "new" } else { "init" })
            .opt_value("--edition", self.edition.map(|e| e.as_str()))
            .opt_value("--vcs", self.vcs.map(|v| v.as_str()))
            .switch("--offline", self.offline);
        for (key, value) in &self.config {
            cmd = cmd.flag_value("--config", format!("{}={}", key, value));
        }
        if let Some(template) = self.template {
            cmd = cmd.arg(template.flag());
        }
        cmd.opt_value("--name", derived_name(&self.path))
            .arg(self.path.to_string_lossy())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_in_place_with_template_and_vcs() {
        let cmd = NewCrate::new("/work/demo")
            .in_place()
            .template(CrateTemplate::Lib)
            .vcs(Some(VersionControl::Git))
            .render();
        assert_eq!(cmd.program, "cargo");
        assert_eq!(cmd.args, vec!["init", "--vcs", "git", "--lib", "/work/demo"]);
    }

    #[test]
    fn full_option_order() {
        let cmd = NewCrate::new("/work/demo")
            .edition(Edition::E2021)
            .vcs(Some(VersionControl::None))
            .offline(true)
            .config_override("net.retry", "2")
            .config_override("build.jobs", "4")
            .template(CrateTemplate::Bin)
            .render();
        assert_eq!(
            cmd.args,
            vec![
                "new", "--edition", "2021", "--vcs", "none", "--offline", "--config",
                "net.retry=2", "--config", "build.jobs=4", "--bin", "/work/demo",
            ]
        );
    }

    #[test]
    fn spaces_in_last_segment_become_explicit_name() {
        let cmd = NewCrate::new("/work/My Cool Tool").render();
        assert_eq!(
            cmd.args,
            vec!["new", "--name", "My_Cool_Tool", "/work/My Cool Tool"]
        );
        assert_eq!(cmd.to_string(), "cargo new --name My_Cool_Tool \"/work/My Cool Tool\"");
    }

    #[test]
    fn rendering_is_deterministic() {
        let opts = NewCrate::new("/a b/c d")
            .config_override("k", "v")
            .template(CrateTemplate::Bin);
        assert_eq!(opts.render(), opts.render());
    }
}
