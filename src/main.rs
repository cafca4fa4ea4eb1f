mod actions;
mod cargo_config;
mod cli;
mod config;
mod github;
mod targets;
mod toolchain;
mod tui;

use anyhow::{Context, Result};
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = cli::Cli::parse();

    // 加载配置
    let config = config::Config::load_or_default()?;

    let workspace = match cli.workspace {
        Some(dir) => dir,
        None => std::env::current_dir().context("无法获取当前目录")?,
    };
    log::debug!("工作区: {}", workspace.display());

    match cli.command {
        Some(command) => cli::run(command, &workspace, &config).await?,
        None => tui::run(config, workspace).await?,
    }

    Ok(())
}
