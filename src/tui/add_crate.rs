use super::input;
use super::layout::{self, PickItem};
use super::state::{App, AppEvent};
use crate::actions;
use crate::toolchain::AddCrate;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    Frame,
};
use std::time::Instant;
use tokio::sync::mpsc;

/// 处理添加依赖模式按键
pub fn handle_add_key(key: KeyEvent, app: &mut App, tx: &mpsc::Sender<AppEvent>) {
    match key.code {
        KeyCode::Esc => {
            app.back_to_dashboard();
            app.reset_add_state();
        }
        KeyCode::Up => app.add.selected = app.add.selected.saturating_sub(1),
        KeyCode::Down => {
            app.add.selected = layout::clamp_selection(app.add.selected + 1, app.add.results.len());
        }
        KeyCode::Enter => spawn_add_task(app, tx),
        _ => {
            if app.add.input.handle_key(&key) {
                schedule_search(app);
            }
        }
    }
}

/// 每次按键只更新时间戳，稳定后由主循环调用 execute_pending_search
fn schedule_search(app: &mut App) {
    if app.add.input.content().trim().is_empty() {
        app.add.results.clear();
        app.add.selected = 0;
        app.add.searching = false;
        app.add.search_scheduled = None;
        return;
    }
    app.add.searching = true;
    app.add.search_scheduled = Some(Instant::now());
}

/// 发起 `cargo search`，结果按到达顺序覆盖
pub fn execute_pending_search(app: &mut App, tx: &mpsc::Sender<AppEvent>) {
    let search = actions::crate_search(&app.config, app.add.input.content());
    if search.query.is_empty() {
        app.add.searching = false;
        return;
    }
    let toolchain = app.toolchain.clone();
    let tx_clone = tx.clone();
    tokio::spawn(async move {
        let event = match toolchain.search_crates(&search).await {
            Ok(results) => AppEvent::CrateSearchResults(results),
            Err(e) => AppEvent::Error(format!("搜索失败: {}", e)),
        };
        let _ = tx_clone.send(event).await;
    });
}

fn spawn_add_task(app: &mut App, tx: &mpsc::Sender<AppEvent>) {
    if app.add.running {
        return;
    }
    let Some(listing) = app.add.results.get(app.add.selected) else {
        return;
    };

    let name = listing.name.clone();
    let add = AddCrate::from_registry(name.as_str());
    let toolchain = app.toolchain.clone();
    let workspace = app.workspace.clone();
    let tx_clone = tx.clone();

    app.add.running = true;
    app.notify(format!("正在添加 {}...", name));

    tokio::spawn(async move {
        let event = match toolchain.add_crate(&add, &workspace).await {
            Ok(_) => AppEvent::ActionDone(format!("已添加 {}", name)),
            Err(e) => AppEvent::Error(format!("添加 {} 失败: {}", name, e)),
        };
        let _ = tx_clone.send(event).await;
    });
}

pub fn render_add(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // header
            Constraint::Length(3), // 输入框
            Constraint::Min(0),    // 结果列表
            Constraint::Length(3), // footer
        ])
        .split(f.area());

    layout::render_header(f, "📦 添加依赖 (cargo add)", chunks[0]);
    input::render_input_box(f, &app.add.input, ">", !app.add.running, chunks[1]);

    let items: Vec<PickItem> = app
        .add
        .results
        .iter()
        .map(|c| PickItem {
            prefix: String::new(),
            name: c.name.clone(),
            badge: c.version.clone(),
            detail: c.description.clone(),
        })
        .collect();
    layout::render_pick_list(f, "crates.io", &items, app.add.selected, true, chunks[2]);

    let footer_text = if app.add.running {
        "cargo add 执行中..."
    } else if app.add.searching {
        "搜索中... | ↑↓ 选择 | Enter 添加 | Esc 返回"
    } else {
        "输入 crate 名称搜索 | ↑↓ 选择 | Enter 添加 | Esc 返回"
    };
    layout::render_footer(f, footer_text, app.notice.as_ref(), chunks[3]);
}
