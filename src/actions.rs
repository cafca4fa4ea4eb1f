//! 命令行与 TUI 共用的动作组装

use crate::config::Config;
use crate::github::{SearchQuery, SearchType};
use crate::targets::SYSTEM_TARGET;
use crate::toolchain::{
    CrateTemplate, Edition, NewCrate, PrintOutput, PrintResults, RustcPrint, SearchCrates, Toolchain,
    VersionControl,
};
use anyhow::{anyhow, Result};
use std::path::Path;

/// 可选的编译目标：`system` 在最前，其后为 `rustc --print target-list` 的顺序
pub async fn target_choices(toolchain: &Toolchain) -> Result<PrintResults> {
    let mut printed = toolchain
        .print(&RustcPrint::new(PrintOutput::TargetList))
        .await?;
    printed.values.retain(|t| t != SYSTEM_TARGET);
    printed.values.insert(0, SYSTEM_TARGET.to_string());
    Ok(printed)
}

/// 配置中的默认版本控制系统
pub fn default_vcs(config: &Config) -> Result<VersionControl> {
    config.default_vcs.parse().map_err(|e: String| anyhow!(e))
}

/// 在工作区原地初始化（`cargo init`）
pub fn init_in_workspace(
    workspace: &Path,
    template: CrateTemplate,
    vcs: VersionControl,
    edition: Option<Edition>,
) -> NewCrate {
    let mut new = NewCrate::new(workspace)
        .in_place()
        .template(template)
        .vcs(Some(vcs));
    if let Some(edition) = edition {
        new = new.edition(edition);
    }
    new
}

pub fn crate_search(config: &Config, query: &str) -> SearchCrates {
    SearchCrates::new(query.trim()).limit(config.search_limit)
}

/// 按 topic 搜索模板仓库，附加的关键字作为自由文本
pub fn template_query(config: &Config, terms: &str) -> SearchQuery {
    let mut query = SearchQuery::new(SearchType::Repositories)
        .topic(config.template_topic.as_str())
        .per_page(config.github_per_page);
    for term in terms.split_whitespace() {
        query = query.term(term);
    }
    query
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toolchain::CommandSpec;

    #[test]
    fn init_in_workspace_renders_cargo_init() {
        let cmd = init_in_workspace(
            Path::new("/work/demo"),
            CrateTemplate::Lib,
            VersionControl::Git,
            None,
        )
        .render();
        assert_eq!(cmd.to_string(), "cargo init --vcs git --lib /work/demo");
    }

    #[test]
    fn template_query_uses_configured_topic() {
        let config = Config::default();
        let query = template_query(&config, "axum  web");
        assert_eq!(
            query.endpoint("https://api.github.com"),
            "https://api.github.com/search/repositories?q=axum+web+topic:cargo-generate&per_page=30"
        );
    }

    #[test]
    fn unknown_default_vcs_is_reported() {
        let config = Config {
            default_vcs: "svn".to_string(),
            ..Config::default()
        };
        assert!(default_vcs(&config).is_err());
        assert_eq!(default_vcs(&Config::default()).unwrap(), VersionControl::Git);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn system_target_comes_first() {
        // `echo` 代替 rustc，输出一行 `--print target-list`
        let toolchain = Toolchain::new("cargo", "echo", crate::toolchain::StderrPolicy::Log);
        let choices = target_choices(&toolchain).await.unwrap();
        assert_eq!(choices.values, vec!["system".to_string(), "--print target-list".to_string()]);
    }
}
