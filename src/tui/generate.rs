use super::input;
use super::layout::{self, PickItem};
use super::state::{App, AppEvent, GeneratePhase, PendingQuestion};
use crate::actions;
use crate::github::{GitHubClient, Repository};
use crate::toolchain::{answer_fn, GenerateProject, RunError, TemplateSource};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};
use std::time::Instant;
use tokio::sync::{mpsc, oneshot};

pub fn handle_generate_key(
    key: KeyEvent,
    app: &mut App,
    tx: &mpsc::Sender<AppEvent>,
    term_height: u16,
) {
    // 提问弹窗优先
    if app.generate.question.is_some() {
        handle_question_key(key, app);
        return;
    }

    match app.generate.phase {
        GeneratePhase::Search => match key.code {
            KeyCode::Esc => {
                app.reset_generate_state();
                app.back_to_dashboard();
            }
            KeyCode::Up => app.generate.selected = app.generate.selected.saturating_sub(1),
            KeyCode::Down => {
                app.generate.selected =
                    layout::clamp_selection(app.generate.selected + 1, app.generate.results.len());
            }
            KeyCode::Enter => {
                app.generate.choose_selected();
            }
            _ => {
                if app.generate.input.handle_key(&key) {
                    app.generate.searching = true;
                    app.generate.search_scheduled = Some(Instant::now());
                }
            }
        },
        GeneratePhase::Name => match key.code {
            KeyCode::Esc => {
                app.generate.chosen = None;
                app.generate.phase = GeneratePhase::Search;
            }
            KeyCode::Enter => {
                if !app.generate.name.content().trim().is_empty() {
                    spawn_generate_task(app, tx);
                }
            }
            _ => {
                app.generate.name.handle_key(&key);
            }
        },
        GeneratePhase::Running => match key.code {
            // 子进程组被杀掉后任务发回 GenerateFinished，届时进入 Done
            KeyCode::Esc => {
                if app.generate.cancel_tx.is_some() {
                    app.generate.cancel();
                    app.generate.add_line("正在取消...".to_string());
                }
            }
            _ => scroll_log(key, app, term_height),
        },
        GeneratePhase::Done => match key.code {
            KeyCode::Esc | KeyCode::Enter => {
                app.reset_generate_state();
                app.back_to_dashboard();
            }
            _ => scroll_log(key, app, term_height),
        },
    }
}

fn scroll_log(key: KeyEvent, app: &mut App, term_height: u16) {
    let visible = layout::visible_content_height(term_height);
    let max_scroll = app.generate.lines.len().saturating_sub(visible);
    match key.code {
        KeyCode::Up => app.generate.scroll = app.generate.scroll.saturating_sub(1),
        KeyCode::Down => app.generate.scroll = (app.generate.scroll + 1).min(max_scroll),
        KeyCode::PageUp => app.generate.scroll = app.generate.scroll.saturating_sub(10),
        KeyCode::PageDown => app.generate.scroll = (app.generate.scroll + 10).min(max_scroll),
        _ => {}
    }
}

/// 提问弹窗：Enter 提交答案，Esc 拒绝回答并终止 cargo generate
fn handle_question_key(key: KeyEvent, app: &mut App) {
    match key.code {
        KeyCode::Enter => {
            if let Some(question) = app.generate.question.take() {
                app.generate
                    .add_line(format!("  → {}", question.answer.content()));
                question.submit();
            }
        }
        KeyCode::Esc => {
            if let Some(question) = app.generate.question.take() {
                question.cancel();
            }
        }
        _ => {
            if let Some(question) = app.generate.question.as_mut() {
                question.answer.handle_key(&key);
            }
        }
    }
}

/// 收到子进程的提问；不在生成流程中时直接丢弃，等待方按取消处理
pub fn receive_question(
    app: &mut App,
    text: String,
    reply: oneshot::Sender<Result<String, RunError>>,
) {
    if app.generate.phase == GeneratePhase::Running {
        app.generate.question = Some(PendingQuestion::new(text, reply));
    } else {
        let _ = reply.send(Err(RunError::UserCancelled));
    }
}

/// 按配置的 topic 搜索模板仓库（单页）
pub fn execute_pending_search(app: &mut App, tx: &mpsc::Sender<AppEvent>) {
    let query = actions::template_query(&app.config, app.generate.input.content());
    let client = GitHubClient::new(app.config.github_token.clone());
    let tx_clone = tx.clone();
    app.generate.searching = true;
    tokio::spawn(async move {
        let event = match client.search::<Repository>(&query).await {
            Ok(page) => AppEvent::TemplateResults(page.items),
            Err(e) => AppEvent::Error(format!("模板搜索失败: {}", e)),
        };
        let _ = tx_clone.send(event).await;
    });
}

fn template_url(repo: &Repository) -> String {
    if repo.clone_url.is_empty() {
        repo.html_url.clone()
    } else {
        repo.clone_url.clone()
    }
}

fn spawn_generate_task(app: &mut App, tx: &mpsc::Sender<AppEvent>) {
    let Some(repo) = app.generate.chosen.as_ref() else {
        return;
    };
    let name = app.generate.name.content().trim().to_string();
    let generate = GenerateProject::new(name.as_str()).source(TemplateSource::git(template_url(repo)));

    app.generate.lines.clear();
    app.generate.scroll = 0;
    app.generate.add_line(format!("$ {}", app.toolchain.cargo_command(&generate)));
    app.generate.phase = GeneratePhase::Running;

    let toolchain = app.toolchain.clone();
    let workspace = app.workspace.clone();
    let tx_question = tx.clone();
    let tx_event = tx.clone();
    let (cancel_tx, cancel_rx) = oneshot::channel();

    // 提问经由 AppEvent 送到 UI 线程，答案从 oneshot 返回
    let answer = answer_fn(move |question| {
        let tx_question = tx_question.clone();
        async move {
            let (reply_tx, reply_rx) = oneshot::channel();
            tx_question
                .send(AppEvent::Question {
                    text: question,
                    reply: reply_tx,
                })
                .await
                .map_err(|_| RunError::UserCancelled)?;
            reply_rx.await.unwrap_or(Err(RunError::UserCancelled))
        }
    });

    let handle = tokio::spawn(async move {
        let (line_tx, mut line_rx) = mpsc::unbounded_channel();
        let forward = async {
            while let Some(line) = line_rx.recv().await {
                let _ = tx_event.send(AppEvent::GenerateLine(line)).await;
            }
        };
        // generate 返回时 line_tx 被释放，forward 随之结束，保证日志先于结束事件
        let (result, ()) = tokio::join!(
            toolchain.generate(&generate, &workspace, Some(answer), Some(line_tx), Some(cancel_rx)),
            forward
        );

        let event = match result {
            Ok(_) => AppEvent::GenerateFinished {
                success: true,
                message: format!("✓ 已生成 {}", name),
            },
            Err(e) if e.is_cancelled() => AppEvent::GenerateFinished {
                success: false,
                message: "已取消".to_string(),
            },
            Err(e) => AppEvent::GenerateFinished {
                success: false,
                message: format!("生成失败: {}", e),
            },
        };
        let _ = tx_event.send(event).await;
    });
    app.generate.task = Some(handle);
    app.generate.cancel_tx = Some(cancel_tx);
}

pub fn render_generate(f: &mut Frame, app: &App) {
    match app.generate.phase {
        GeneratePhase::Search => render_search(f, app),
        GeneratePhase::Name => render_name(f, app),
        GeneratePhase::Running | GeneratePhase::Done => render_log(f, app),
    }
}

fn render_search(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.area());

    layout::render_header(f, "🧩 从模板生成 (cargo generate)", chunks[0]);
    input::render_input_box(f, &app.generate.input, "关键词:", true, chunks[1]);

    let items: Vec<PickItem> = app
        .generate
        .results
        .iter()
        .map(|repo| {
            let owner = repo.owner.as_ref().map(|o| o.login.as_str()).unwrap_or("");
            PickItem {
                prefix: if owner.is_empty() { String::new() } else { format!("{}/", owner) },
                name: repo.name.clone(),
                badge: format!("★{}", repo.stargazers_count),
                detail: repo.description_or_empty().to_string(),
            }
        })
        .collect();
    let title = format!("GitHub topic:{}", app.config.template_topic);
    layout::render_pick_list(f, &title, &items, app.generate.selected, true, chunks[2]);

    let footer_text = if app.generate.searching {
        "搜索中... | ↑↓ 选择 | Enter 使用模板 | Esc 返回"
    } else {
        "输入关键词过滤模板 | ↑↓ 选择 | Enter 使用模板 | Esc 返回"
    };
    layout::render_footer(f, footer_text, app.notice.as_ref(), chunks[3]);
}

fn render_name(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.area());

    layout::render_header(f, "🧩 从模板生成 (cargo generate)", chunks[0]);

    let template = app
        .generate
        .chosen
        .as_ref()
        .map(|r| r.full_name.clone())
        .unwrap_or_default();
    let info = Paragraph::new(Line::from(vec![
        Span::styled(" 模板: ", Style::default().fg(Color::White).add_modifier(Modifier::BOLD)),
        Span::styled(template, Style::default().fg(super::theme::CARGO_GREEN)),
    ]));
    f.render_widget(info, chunks[1]);

    input::render_input_box(f, &app.generate.name, "项目名:", true, chunks[2]);
    layout::render_footer(
        f,
        "输入项目名 | Enter 开始生成 | Esc 重新选择模板",
        app.notice.as_ref(),
        chunks[4],
    );
}

fn render_log(f: &mut Frame, app: &App) {
    let chunks = layout::main_layout(f.area());
    layout::render_header(f, "🧩 cargo generate", chunks[0]);
    layout::render_scrollable_content(f, "输出", &app.generate.lines, app.generate.scroll, chunks[1]);

    let footer_text = match app.generate.phase {
        GeneratePhase::Running => "生成中... | ↑↓ 滚动 | Esc 取消",
        _ => "↑↓ 滚动 | Enter/Esc 返回",
    };
    layout::render_footer(f, footer_text, app.notice.as_ref(), chunks[2]);

    if let Some(question) = &app.generate.question {
        render_question(f, question, f.area());
    }
}

fn render_question(f: &mut Frame, question: &PendingQuestion, area: Rect) {
    let popup = layout::centered_rect(70, 8, area);
    let inner = layout::render_popup_frame(f, "模板提问", popup);
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(3), Constraint::Length(1)])
        .split(inner);

    let text = Paragraph::new(question.text.clone())
        .style(Style::default().fg(Color::White).add_modifier(Modifier::BOLD))
        .wrap(Wrap { trim: true });
    f.render_widget(text, rows[0]);
    input::render_input_box(f, &question.answer, ">", true, rows[1]);
    f.render_widget(
        Paragraph::new(Span::styled(
            "Enter 提交 | Esc 取消生成",
            Style::default().fg(super::theme::DIM),
        )),
        rows[2],
    );
}
