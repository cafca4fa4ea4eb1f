mod add_crate;
mod dashboard;
mod generate;
pub mod input;
mod layout;
mod new_crate;
pub mod state;
mod target;
mod theme;

use crate::config::Config;
use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Frame, Terminal};
use state::{App, AppEvent, AppMode, GeneratePhase};
use std::io;
use std::path::PathBuf;
use tokio::sync::mpsc;

pub async fn run(config: Config, workspace: PathBuf) -> Result<()> {
    // 终端初始化
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, App::new(config, workspace)).await;

    // 恢复终端
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    mut app: App,
) -> Result<()> {
    let (tx, mut rx) = mpsc::channel(32);

    // 异步检测工具链版本
    let toolchain = app.toolchain.clone();
    let tx_clone = tx.clone();
    tokio::spawn(async move {
        match tokio::task::spawn_blocking(move || toolchain.info()).await {
            Ok(info) => {
                let _ = tx_clone.send(AppEvent::ToolchainDetected(info)).await;
            }
            Err(e) => {
                let _ = tx_clone
                    .send(AppEvent::Error(format!("检测工具链失败: {}", e)))
                    .await;
            }
        }
    });

    // 主循环
    loop {
        // 生成日志 clamp scroll
        if app.mode == AppMode::Generate
            && matches!(app.generate.phase, GeneratePhase::Running | GeneratePhase::Done)
        {
            let visible = layout::visible_content_height(terminal.size()?.height);
            let max_scroll = app.generate.lines.len().saturating_sub(visible);
            app.generate.scroll = app.generate.scroll.min(max_scroll);
        }

        // 防抖: 输入稳定 debounce_ms 后才真正搜索
        let debounce = app.debounce();
        if let Some(scheduled) = app.add.search_scheduled {
            if scheduled.elapsed() >= debounce {
                app.add.search_scheduled = None;
                add_crate::execute_pending_search(&mut app, &tx);
            }
        }
        if let Some(scheduled) = app.generate.search_scheduled {
            if scheduled.elapsed() >= debounce {
                app.generate.search_scheduled = None;
                generate::execute_pending_search(&mut app, &tx);
            }
        }

        if app.notice.as_ref().is_some_and(|n| n.expired()) {
            app.notice = None;
        }

        terminal.draw(|f| ui(f, &app))?;

        // 处理事件
        if event::poll(std::time::Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    let term_height = terminal.size()?.height;
                    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                        app.should_quit = true;
                    } else {
                        match app.mode {
                            AppMode::Dashboard => dashboard::handle_dashboard_key(key, &mut app, &tx),
                            AppMode::AddCrate => add_crate::handle_add_key(key, &mut app, &tx),
                            AppMode::Target => target::handle_target_key(key, &mut app),
                            AppMode::NewCrate => new_crate::handle_new_crate_key(key, &mut app, &tx),
                            AppMode::Generate => {
                                generate::handle_generate_key(key, &mut app, &tx, term_height)
                            }
                        }
                    }
                }
            }
        }

        // 处理异步事件
        while let Ok(event) = rx.try_recv() {
            handle_app_event(&mut app, event);
        }

        if app.should_quit {
            break;
        }
    }

    // 退出前终止仍在运行的 cargo generate，等它杀掉子进程组
    app.generate.cancel();
    if let Some(task) = app.generate.task.take() {
        let _ = tokio::time::timeout(std::time::Duration::from_secs(2), task).await;
    }
    Ok(())
}

fn handle_app_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::ToolchainDetected(info) => {
            if !info.has_generate {
                log::info!("未检测到 cargo-generate");
            }
            app.info = Some(info);
        }
        AppEvent::CrateSearchResults(results) => {
            app.add.results = results;
            app.add.selected = 0;
            if app.add.search_scheduled.is_none() {
                app.add.searching = false;
            }
        }
        AppEvent::TargetsLoaded(targets) => {
            app.target.targets = targets;
            app.target.selected = 0;
            app.target.loading = false;
        }
        AppEvent::TemplateResults(results) => {
            // 模板已确认后到达的结果不再替换列表
            if app.generate.phase != GeneratePhase::Search {
                log::debug!("丢弃过期的模板搜索结果 ({} 条)", results.len());
                return;
            }
            app.generate.results = results;
            app.generate.selected = 0;
            if app.generate.search_scheduled.is_none() {
                app.generate.searching = false;
            }
        }
        AppEvent::GenerateLine(line) => app.generate.add_line(line),
        AppEvent::Question { text, reply } => generate::receive_question(app, text, reply),
        AppEvent::GenerateFinished { success, message } => {
            app.generate.task = None;
            app.generate.cancel_tx = None;
            app.generate.question = None;
            if app.generate.phase != GeneratePhase::Running {
                log::info!("生成流程外收到结束事件: {}", message);
                return;
            }
            app.generate.add_line(format!("─── {} ───", message));
            app.generate.phase = GeneratePhase::Done;
            if success {
                app.notify(message);
            } else {
                app.fail(message);
            }
        }
        AppEvent::ActionDone(message) => {
            log::info!("{}", message);
            app.add.running = false;
            app.new_crate.running = false;
            if matches!(app.mode, AppMode::AddCrate | AppMode::NewCrate) {
                app.back_to_dashboard();
            }
            app.refresh_build_target();
            app.notify(message);
        }
        AppEvent::Error(msg) => {
            app.add.running = false;
            app.add.searching = false;
            app.new_crate.running = false;
            app.target.loading = false;
            app.generate.searching = false;
            app.fail(msg);
        }
    }
}

fn ui(f: &mut Frame, app: &App) {
    match app.mode {
        AppMode::Dashboard => dashboard::render_dashboard(f, app),
        AppMode::AddCrate => add_crate::render_add(f, app),
        AppMode::Target => target::render_target(f, app),
        AppMode::NewCrate => new_crate::render_new_crate(f, app),
        AppMode::Generate => generate::render_generate(f, app),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::Repository;
    use crate::toolchain::CrateListing;
    use tokio::sync::oneshot;

    fn test_app() -> (App, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let app = App::new(Config::default(), dir.path().to_path_buf());
        (app, dir)
    }

    fn listing(name: &str) -> CrateListing {
        CrateListing {
            name: name.to_string(),
            version: "1.0.0".to_string(),
            description: String::new(),
        }
    }

    #[test]
    fn latest_search_results_win() {
        let (mut app, _dir) = test_app();
        app.add.searching = true;
        handle_app_event(&mut app, AppEvent::CrateSearchResults(vec![listing("serde")]));
        handle_app_event(&mut app, AppEvent::CrateSearchResults(vec![listing("tokio"), listing("tokio-util")]));

        assert_eq!(app.add.results.len(), 2);
        assert_eq!(app.add.results[0].name, "tokio");
        assert!(!app.add.searching);
    }

    #[test]
    fn question_outside_generation_is_refused() {
        let (mut app, _dir) = test_app();
        let (reply, rx) = oneshot::channel();
        handle_app_event(
            &mut app,
            AppEvent::Question {
                text: "Project Name:".to_string(),
                reply,
            },
        );
        assert!(app.generate.question.is_none());
        assert!(rx.blocking_recv().unwrap().unwrap_err().is_cancelled());
    }

    #[test]
    fn question_during_generation_opens_dialog() {
        let (mut app, _dir) = test_app();
        app.mode = AppMode::Generate;
        app.generate.phase = GeneratePhase::Running;
        let (reply, _rx) = oneshot::channel();
        handle_app_event(
            &mut app,
            AppEvent::Question {
                text: "Use Git?".to_string(),
                reply,
            },
        );
        assert_eq!(app.generate.question.as_ref().unwrap().text, "Use Git?");
    }

    #[test]
    fn finished_generation_is_logged_and_noticed() {
        let (mut app, _dir) = test_app();
        app.mode = AppMode::Generate;
        app.generate.phase = GeneratePhase::Running;
        handle_app_event(
            &mut app,
            AppEvent::GenerateFinished {
                success: false,
                message: "生成失败: exit 1".to_string(),
            },
        );
        assert_eq!(app.generate.phase, GeneratePhase::Done);
        assert_eq!(app.generate.lines.last().unwrap(), "─── 生成失败: exit 1 ───");
        assert!(app.notice.as_ref().unwrap().error);
    }

    fn repo(full_name: &str) -> Repository {
        Repository {
            full_name: full_name.to_string(),
            ..Repository::default()
        }
    }

    #[test]
    fn confirmed_template_survives_late_search_results() {
        let (mut app, _dir) = test_app();
        app.mode = AppMode::Generate;
        app.generate.results = vec![repo("o/first"), repo("o/chosen")];
        app.generate.selected = 1;
        app.generate.search_scheduled = Some(std::time::Instant::now());
        assert!(app.generate.choose_selected());
        assert!(app.generate.search_scheduled.is_none());

        handle_app_event(
            &mut app,
            AppEvent::TemplateResults(vec![repo("o/other"), repo("o/x")]),
        );

        assert_eq!(app.generate.phase, GeneratePhase::Name);
        assert_eq!(app.generate.chosen.as_ref().unwrap().full_name, "o/chosen");
        assert_eq!(app.generate.results[1].full_name, "o/chosen");
    }

    #[test]
    fn search_results_still_apply_while_searching() {
        let (mut app, _dir) = test_app();
        app.mode = AppMode::Generate;
        app.generate.searching = true;
        handle_app_event(&mut app, AppEvent::TemplateResults(vec![repo("o/a")]));
        handle_app_event(&mut app, AppEvent::TemplateResults(vec![repo("o/b")]));

        assert_eq!(app.generate.results.len(), 1);
        assert_eq!(app.generate.results[0].full_name, "o/b");
        assert!(!app.generate.searching);
    }

    #[test]
    fn finished_event_outside_a_run_only_logs() {
        let (mut app, _dir) = test_app();
        app.mode = AppMode::Generate;
        app.generate.phase = GeneratePhase::Done;
        app.notify("已取消 cargo generate");
        handle_app_event(
            &mut app,
            AppEvent::GenerateFinished {
                success: false,
                message: "已取消".to_string(),
            },
        );
        let notice = app.notice.as_ref().unwrap();
        assert_eq!(notice.text, "已取消 cargo generate");
        assert!(!notice.error);
    }

    #[test]
    fn esc_while_running_waits_for_the_runner_to_finish() {
        let (mut app, _dir) = test_app();
        let (tx, _rx) = mpsc::channel(1);
        let (cancel_tx, mut cancel_rx) = oneshot::channel();
        app.mode = AppMode::Generate;
        app.generate.phase = GeneratePhase::Running;
        app.generate.cancel_tx = Some(cancel_tx);

        generate::handle_generate_key(KeyCode::Esc.into(), &mut app, &tx, 40);
        assert!(cancel_rx.try_recv().is_ok());
        assert_eq!(app.generate.phase, GeneratePhase::Running);

        handle_app_event(
            &mut app,
            AppEvent::GenerateFinished {
                success: false,
                message: "已取消".to_string(),
            },
        );
        assert_eq!(app.generate.phase, GeneratePhase::Done);
        assert_eq!(app.generate.lines.last().unwrap(), "─── 已取消 ───");
    }

    #[test]
    fn action_done_returns_to_palette() {
        let (mut app, _dir) = test_app();
        app.mode = AppMode::AddCrate;
        app.add.running = true;
        handle_app_event(&mut app, AppEvent::ActionDone("已添加 serde".to_string()));
        assert_eq!(app.mode, AppMode::Dashboard);
        assert!(!app.add.running);
        assert_eq!(app.notice.as_ref().unwrap().text, "已添加 serde");
    }
}
