use super::{CommandSpec, CrateTemplate, VersionControl};
use crate::toolchain::types::RenderedCommand;
use std::path::PathBuf;

/// cargo-generate 的模板来源，三者只能取其一
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    Git {
        url: String,
        branch: Option<String>,
        tag: Option<String>,
    },
    Path(PathBuf),
    Favorite(String),
}

impl TemplateSource {
    pub fn git(url: impl Into<String>) -> Self {
        TemplateSource::Git {
            url: url.into(),
            branch: None,
            tag: None,
        }
    }
}

/// 从模板生成项目（`cargo generate`）
#[derive(Debug, Clone)]
pub struct GenerateProject {
    pub name: String,
    pub source: Option<TemplateSource>,
    pub force: bool,
    pub template_values_file: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub vcs: Option<VersionControl>,
    pub template: Option<CrateTemplate>,
    /// 在当前目录生成，不新建子目录
    pub init: bool,
    /// `--define KEY=VALUE` 预先回答模板变量
    pub defines: Vec<(String, String)>,
}

impl GenerateProject {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: None,
            force: false,
            template_values_file: None,
            config: None,
            vcs: None,
            template: None,
            init: false,
            defines: Vec::new(),
        }
    }

    pub fn source(mut self, source: TemplateSource) -> Self {
        self.source = Some(source);
        self
    }

    pub fn define(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.defines.push((key.into(), value.into()));
        self
    }
}

impl CommandSpec for GenerateProject {
    fn render(&self) -> RenderedCommand {
        let mut cmd = RenderedCommand::new("cargo")
            .arg("generate")
            .flag_value("--name", self.name.as_str())
            .switch("-f", self.force);

        match &self.source {
            Some(TemplateSource::Git { url, branch, tag }) => {
                cmd = cmd
                    .flag_value("--git", url.as_str())
                    .opt_value("--branch", branch.as_deref())
                    .opt_value("--tag", tag.as_deref());
            }
            Some(TemplateSource::Path(path)) => {
                cmd = cmd.flag_value("--path", path.to_string_lossy());
            }
            Some(TemplateSource::Favorite(favorite)) => {
                cmd = cmd.flag_value("--favorite", favorite.as_str());
            }
            None => {}
        }

        cmd = cmd
            .opt_value(
                "--template-values-file",
                self.template_values_file.as_ref().map(|p| p.to_string_lossy()),
            )
            .opt_value("--config", self.config.as_ref().map(|p| p.to_string_lossy()))
            .opt_value("--vcs", self.vcs.map(|v| v.as_str()));
        if let Some(template) = self.template {
            cmd = cmd.arg(template.flag());
        }
        cmd = cmd.switch("--init", self.init);
        for (key, value) in &self.defines {
            cmd = cmd.flag_value("--define", format!("{}={}", key, value));
        }
        cmd
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn git_template_with_branch() {
        let source = TemplateSource::Git {
            url: "https://github.com/rust-github/template".to_string(),
            branch: Some("main".to_string()),
            tag: None,
        };
        let cmd = GenerateProject::new("demo").source(source).render();
        assert_eq!(
            cmd.args,
            vec![
                "generate", "--name", "demo", "--git",
                "https://github.com/rust-github/template", "--branch", "main",
            ]
        );
    }

    #[test]
    fn trailing_flags_and_defines() {
        let mut opts = GenerateProject::new("demo")
            .source(TemplateSource::Favorite("wasm".to_string()))
            .define("author", "Jane Doe")
            .define("license", "MIT");
        opts.force = true;
        opts.vcs = Some(VersionControl::None);
        opts.template = Some(CrateTemplate::Lib);
        opts.init = true;
        let cmd = opts.render();
        assert_eq!(
            cmd.args,
            vec![
                "generate", "--name", "demo", "-f", "--favorite", "wasm", "--vcs", "none",
                "--lib", "--init", "--define", "author=Jane Doe", "--define", "license=MIT",
            ]
        );
        assert_eq!(opts.render(), cmd);
    }
}
