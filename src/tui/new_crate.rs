use super::layout::{self, PickItem};
use super::state::{App, AppEvent};
use crate::actions;
use crate::toolchain::{CrateTemplate, VersionControl};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    Frame,
};
use tokio::sync::mpsc;

pub fn handle_new_crate_key(key: KeyEvent, app: &mut App, tx: &mpsc::Sender<AppEvent>) {
    if app.new_crate.running {
        return;
    }
    match key.code {
        KeyCode::Esc => app.back_to_dashboard(),
        KeyCode::Up => app.new_crate.selected = app.new_crate.selected.saturating_sub(1),
        KeyCode::Down => {
            app.new_crate.selected =
                layout::clamp_selection(app.new_crate.selected + 1, VersionControl::ALL.len());
        }
        KeyCode::Enter => spawn_init_task(app, tx),
        _ => {}
    }
}

fn template_name(template: CrateTemplate) -> &'static str {
    match template {
        CrateTemplate::Bin => "二进制包",
        CrateTemplate::Lib => "库",
    }
}

fn spawn_init_task(app: &mut App, tx: &mpsc::Sender<AppEvent>) {
    let template = app.new_crate.template;
    let new = actions::init_in_workspace(&app.workspace, template, app.new_crate.vcs(), None);
    let toolchain = app.toolchain.clone();
    let workspace = app.workspace.clone();
    let tx_clone = tx.clone();

    app.new_crate.running = true;
    tokio::spawn(async move {
        let event = match toolchain.new_crate(&new, &workspace).await {
            Ok(_) => AppEvent::ActionDone(format!(
                "已在 {} 初始化{}",
                workspace.display(),
                template_name(template)
            )),
            Err(e) => AppEvent::Error(format!("cargo init 失败: {}", e)),
        };
        let _ = tx_clone.send(event).await;
    });
}

pub fn render_new_crate(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.area());

    let title = format!("🆕 初始化{} (cargo init)", template_name(app.new_crate.template));
    layout::render_header(f, &title, chunks[0]);

    let items: Vec<PickItem> = VersionControl::ALL
        .iter()
        .map(|vcs| PickItem {
            prefix: String::new(),
            name: vcs.to_string(),
            badge: if vcs.as_str() == app.config.default_vcs {
                "(默认)".to_string()
            } else {
                String::new()
            },
            detail: match vcs {
                VersionControl::None => "不初始化版本控制".to_string(),
                other => format!("初始化 {} 仓库", other),
            },
        })
        .collect();
    layout::render_pick_list(f, "版本控制", &items, app.new_crate.selected, true, chunks[1]);

    let footer_text = if app.new_crate.running {
        "cargo init 执行中..."
    } else {
        "↑↓ 选择版本控制 | Enter 初始化 | Esc 返回"
    };
    layout::render_footer(f, footer_text, app.notice.as_ref(), chunks[2]);
}
