use super::CommandSpec;
use crate::toolchain::types::RenderedCommand;
use std::path::PathBuf;

/// 依赖写入的段落，同时设置多个时按 build > dev > target 取一个
#[derive(Debug, Clone, Default)]
pub struct DependencySection {
    pub build: bool,
    pub dev: bool,
    pub target: Option<String>,
}

/// 向 Cargo.toml 添加依赖（`cargo add`）
///
/// 来源字段 `crate_name` / `path` / `git` 互斥，渲染时按 crate > path > git 的顺序取第一个，
/// 与 cargo 自身的优先级一致。
#[derive(Debug, Clone, Default)]
pub struct AddCrate {
    // 来源
    pub crate_name: Option<String>,
    pub version: Option<String>,
    pub path: Option<PathBuf>,
    pub git: Option<String>,
    pub git_branch: Option<String>,
    pub git_tag: Option<String>,
    pub git_rev: Option<String>,
    pub registry: Option<String>,

    pub section: DependencySection,

    // 依赖选项
    pub dry_run: bool,
    pub rename: Option<String>,
    pub optional: bool,
    pub required: bool,
    pub no_default_features: bool,
    pub default_features: bool,
    pub features: Vec<String>,

    // manifest 选项
    pub manifest_path: Option<PathBuf>,
    pub package: Option<String>,
    pub locked: bool,
    pub offline: bool,
}

impl AddCrate {
    pub fn from_registry(name: impl Into<String>) -> Self {
        Self {
            crate_name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }

    pub fn from_git(url: impl Into<String>) -> Self {
        Self {
            git: Some(url.into()),
            ..Self::default()
        }
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn dev(mut self) -> Self {
        self.section.dev = true;
        self
    }

    pub fn build(mut self) -> Self {
        self.section.build = true;
        self
    }

    pub fn for_target(mut self, target: impl Into<String>) -> Self {
        self.section.target = Some(target.into());
        self
    }

    pub fn feature(mut self, feature: impl Into<String>) -> Self {
        self.features.push(feature.into());
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

impl CommandSpec for AddCrate {
    fn render(&self) -> RenderedCommand {
        let mut cmd = RenderedCommand::new("cargo")
            .arg("add")
            .opt_value("--registry", self.registry.as_deref());

        if self.section.build {
            cmd = cmd.arg("--build");
        } else if self.section.dev {
            cmd = cmd.arg("--dev");
        } else if let Some(target) = &self.section.target {
            cmd = cmd.flag_value("--target", target.as_str());
        }

        cmd = cmd
            .switch("--dry-run", self.dry_run)
            .opt_value("--rename", self.rename.as_deref())
            .switch("--optional", self.optional)
            .switch("--no-optional", self.required)
            .switch("--no-default-features", self.no_default_features)
            .switch("--default-features", self.default_features)
            .opt_value(
                "--manifest-path",
                self.manifest_path.as_ref().map(|p| p.to_string_lossy()),
            )
            .opt_value("--package", self.package.as_deref())
            .switch("--locked", self.locked)
            .switch("--offline", self.offline);

        if let Some(name) = &self.crate_name {
            cmd = match &self.version {
                Some(version) => cmd.arg(format!("{}@{}", name, version)),
                None => cmd.arg(name.as_str()),
            };
        } else if let Some(path) = &self.path {
            cmd = cmd.flag_value("--path", path.to_string_lossy());
        } else if let Some(git) = &self.git {
            cmd = cmd
                .flag_value("--git", git.as_str())
                .opt_value("--branch", self.git_branch.as_deref())
                .opt_value("--tag", self.git_tag.as_deref())
                .opt_value("--rev", self.git_rev.as_deref());
        }

        for feature in &self.features {
            cmd = cmd.flag_value("--features", feature.as_str());
        }
        cmd
    }
}
