//! 非交互命令行入口

use crate::actions;
use crate::cargo_config::{self, CargoConfig};
use crate::config::Config;
use crate::github::{GitHubClient, GitHubError, Repository, RepositoryFile, SearchQuery, SearchType, User};
use crate::targets;
use crate::toolchain::{
    answer_fn, AddCrate, CrateTemplate, Edition, GenerateProject, RunError, TemplateSource,
    Toolchain, VersionControl,
};
use anyhow::{Context, Result};
use clap::{ArgGroup, Parser, Subcommand};
use serde::de::DeserializeOwned;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;

#[derive(Parser, Debug)]
#[command(name = "rust-project-manager", version, about)]
pub struct Cli {
    /// 工作区目录（默认为当前目录）
    #[arg(long, short = 'w', global = true)]
    pub workspace: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// 在 crates.io 搜索 crate
    Search {
        query: String,
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long)]
        registry: Option<String>,
    },
    /// 向工作区添加依赖
    Add {
        #[arg(value_name = "CRATE")]
        name: String,
        #[arg(long)]
        version: Option<String>,
        #[arg(long, conflicts_with = "build")]
        dev: bool,
        #[arg(long)]
        build: bool,
        #[arg(long = "features", short = 'F')]
        features: Vec<String>,
        #[arg(long)]
        dry_run: bool,
    },
    /// 设置 `.cargo/config.toml` 中的 build.target；不带参数时列出可选目标
    Target { triple: Option<String> },
    /// 在工作区执行 `cargo init`
    #[command(group(ArgGroup::new("kind").required(true).args(["bin", "lib"])))]
    New {
        #[arg(long)]
        bin: bool,
        #[arg(long)]
        lib: bool,
        #[arg(long)]
        vcs: Option<VersionControl>,
        #[arg(long)]
        edition: Option<Edition>,
    },
    /// 用 cargo-generate 从模板生成项目，模板提问在终端中回答
    #[command(group(ArgGroup::new("source").required(true).args(["git", "path", "favorite"])))]
    Generate {
        #[arg(long)]
        git: Option<String>,
        #[arg(long)]
        path: Option<PathBuf>,
        #[arg(long)]
        favorite: Option<String>,
        #[arg(long)]
        name: String,
        #[arg(long, requires = "git")]
        branch: Option<String>,
        /// 预先回答模板变量 KEY=VALUE
        #[arg(long = "define", short = 'd', value_parser = parse_define)]
        defines: Vec<(String, String)>,
    },
    /// GitHub 搜索
    Github {
        #[arg(required = true)]
        terms: Vec<String>,
        #[arg(long, default_value = "repositories")]
        kind: SearchType,
        #[arg(long)]
        topic: Vec<String>,
        #[arg(long)]
        language: Vec<String>,
        #[arg(long)]
        user: Option<String>,
        /// 拉取所有分页
        #[arg(long)]
        all: bool,
    },
}

fn parse_define(s: &str) -> std::result::Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("格式应为 KEY=VALUE: {}", s)),
    }
}

pub async fn run(command: Commands, workspace: &Path, config: &Config) -> Result<()> {
    let toolchain = config.toolchain();

    match command {
        Commands::Search { query, limit, registry } => {
            let mut search = actions::crate_search(config, &query).registry(registry);
            if let Some(limit) = limit {
                search = search.limit(limit);
            }
            let listings = toolchain.search_crates(&search).await?;
            if listings.is_empty() {
                println!("未找到匹配的 crate");
            }
            for listing in listings {
                println!("{} = \"{}\"    # {}", listing.name, listing.version, listing.description);
            }
        }
        Commands::Add { name, version, dev, build, features, dry_run } => {
            let add = add_command(name, version, dev, build, features, dry_run);
            let result = toolchain.add_crate(&add, workspace).await?;
            print_output(&result.stderr);
            print_output(&result.stdout);
        }
        Commands::Target { triple: None } => list_targets(&toolchain, workspace).await?,
        Commands::Target { triple: Some(triple) } => {
            if targets::lookup(&triple).is_none() {
                log::warn!("{} 不在已知目标表中", triple);
            }
            let path = cargo_config::write_build_target(workspace, &triple)?;
            println!("已更新 {}", path.display());
        }
        Commands::New { bin, lib: _, vcs, edition } => {
            let template = if bin { CrateTemplate::Bin } else { CrateTemplate::Lib };
            let vcs = match vcs {
                Some(vcs) => vcs,
                None => actions::default_vcs(config)?,
            };
            let new = actions::init_in_workspace(workspace, template, vcs, edition);
            let result = toolchain.new_crate(&new, workspace).await?;
            print_output(&result.stderr);
        }
        Commands::Generate { git, path, favorite, name, branch, defines } => {
            let source = match (git, path, favorite) {
                (Some(url), _, _) => TemplateSource::Git { url, branch, tag: None },
                (None, Some(path), _) => TemplateSource::Path(path),
                (None, None, Some(favorite)) => TemplateSource::Favorite(favorite),
                (None, None, None) => anyhow::bail!("需要指定模板来源"),
            };
            let mut generate = GenerateProject::new(name).source(source);
            for (key, value) in defines {
                generate = generate.define(key, value);
            }
            run_generate(&toolchain, &generate, workspace).await?;
        }
        Commands::Github { terms, kind, topic, language, user, all } => {
            let mut query = SearchQuery::new(kind).per_page(config.github_per_page);
            query.terms = terms;
            query.topics = topic;
            query.languages = language;
            if let Some(user) = user {
                query = query.user(user);
            }
            github_search(config, &query, all).await?;
        }
    }
    Ok(())
}

fn add_command(
    name: String,
    version: Option<String>,
    dev: bool,
    build: bool,
    features: Vec<String>,
    dry_run: bool,
) -> AddCrate {
    let mut add = AddCrate::from_registry(name).dry_run(dry_run);
    if let Some(version) = version {
        add = add.version(version);
    }
    if dev {
        add = add.dev();
    }
    if build {
        add = add.build();
    }
    for feature in features {
        add = add.feature(feature);
    }
    add
}

fn print_output(text: &str) {
    let text = text.trim();
    if !text.is_empty() {
        println!("{}", text);
    }
}

async fn list_targets(toolchain: &Toolchain, workspace: &Path) -> Result<()> {
    let current = CargoConfig::current_build_target(workspace);

    for (triple, known) in actions::target_choices(toolchain).await?.enriched() {
        let marker = if current.as_deref() == Some(triple.as_str()) { "*" } else { " " };
        match known {
            Some(_) => println!("{} {:<40} {}", marker, triple, targets::summary(&triple)),
            None => println!("{} {}", marker, triple),
        }
    }
    Ok(())
}

/// 从终端读取一行答案，EOF 视为放弃
fn read_answer(question: &str) -> crate::toolchain::Result<String> {
    print!("{} ", question.trim_end());
    io::stdout().flush()?;

    let mut input = String::new();
    if io::stdin().lock().read_line(&mut input)? == 0 {
        return Err(RunError::UserCancelled);
    }
    Ok(input.trim_end_matches(['\r', '\n']).to_string())
}

async fn run_generate(toolchain: &Toolchain, generate: &GenerateProject, workspace: &Path) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    let printer = tokio::spawn(async move {
        while let Some(line) = rx.recv().await {
            // 问题由 read_answer 打印
            if !line.starts_with("? ") {
                println!("{}", line);
            }
        }
    });

    let answer = answer_fn(|question| async move {
        tokio::task::spawn_blocking(move || read_answer(&question)).await?
    });

    let result = toolchain
        .generate(generate, workspace, Some(answer), Some(tx), None)
        .await;
    let _ = printer.await;

    match result {
        Ok(_) => {
            println!("✓ 已生成 {}", generate.name);
            Ok(())
        }
        Err(e) if e.is_cancelled() => {
            println!("已取消");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

async fn fetch<T: DeserializeOwned>(
    client: &GitHubClient,
    query: &SearchQuery,
    all: bool,
) -> std::result::Result<Vec<T>, GitHubError> {
    if all {
        client.search_all(query).await
    } else {
        Ok(client.search(query).await?.items)
    }
}

async fn github_search(config: &Config, query: &SearchQuery, all: bool) -> Result<()> {
    let client = GitHubClient::new(config.github_token.clone());
    match query.kind {
        SearchType::Repositories => {
            for repo in fetch::<Repository>(&client, query, all).await? {
                println!(
                    "{:<40} ★{:<6} {}",
                    repo.full_name,
                    repo.stargazers_count,
                    repo.description_or_empty()
                );
            }
        }
        SearchType::Users => {
            for user in fetch::<User>(&client, query, all).await? {
                println!("{:<24} {}", user.login, user.html_url);
            }
        }
        SearchType::Code => {
            for file in fetch::<RepositoryFile>(&client, query, all).await? {
                println!("{}:{}", file.repository.full_name, file.path);
            }
        }
        _ => {
            for item in fetch::<serde_json::Value>(&client, query, all).await? {
                println!("{}", serde_json::to_string(&item).context("JSON 序列化失败")?);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toolchain::CommandSpec;

    #[test]
    fn no_subcommand_opens_palette() {
        let cli = Cli::try_parse_from(["rust-project-manager"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn add_arguments_build_cargo_add() {
        let cli = Cli::try_parse_from([
            "rust-project-manager", "add", "serde", "--version", "1.0", "--dev", "-F", "derive",
        ])
        .unwrap();
        let Some(Commands::Add { name, version, dev, build, features, dry_run }) = cli.command else {
            panic!("expected add");
        };
        let cmd = add_command(name, version, dev, build, features, dry_run).render();
        assert_eq!(cmd.to_string(), "cargo add --dev serde@1.0 --features derive");
    }

    #[test]
    fn new_requires_a_template() {
        assert!(Cli::try_parse_from(["rust-project-manager", "new"]).is_err());
        assert!(Cli::try_parse_from(["rust-project-manager", "new", "--bin", "--lib"]).is_err());
        let cli = Cli::try_parse_from(["rust-project-manager", "new", "--lib", "--vcs", "none"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::New { lib: true, vcs: Some(VersionControl::None), .. })
        ));
    }

    #[test]
    fn generate_takes_exactly_one_source() {
        assert!(Cli::try_parse_from(["rust-project-manager", "generate", "--name", "x"]).is_err());
        assert!(Cli::try_parse_from([
            "rust-project-manager", "generate", "--name", "x", "--git", "u", "--favorite", "f",
        ])
        .is_err());

        let cli = Cli::try_parse_from([
            "rust-project-manager", "generate", "--name", "demo", "--favorite", "web", "-d", "port=8080",
        ])
        .unwrap();
        let Some(Commands::Generate { defines, .. }) = cli.command else {
            panic!("expected generate");
        };
        assert_eq!(defines, vec![("port".to_string(), "8080".to_string())]);
    }

    #[test]
    fn define_requires_key_and_equals() {
        assert_eq!(parse_define("a=b=c"), Ok(("a".to_string(), "b=c".to_string())));
        assert!(parse_define("novalue").is_err());
        assert!(parse_define("=x").is_err());
    }

    #[test]
    fn github_kind_parses() {
        let cli = Cli::try_parse_from([
            "rust-project-manager", "github", "tokio", "--kind", "code", "--language", "rust",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Github { kind: SearchType::Code, .. })
        ));
    }
}
