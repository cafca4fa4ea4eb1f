use super::input;
use super::layout::{self, PickItem};
use super::state::{App, AppEvent};
use crate::actions;
use crate::cargo_config;
use crate::targets::{self, SYSTEM_TARGET};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    Frame,
};
use tokio::sync::mpsc;

/// 异步读取 `rustc --print target-list`
pub fn load_targets(app: &mut App, tx: &mpsc::Sender<AppEvent>) {
    app.target.loading = true;
    let toolchain = app.toolchain.clone();
    let tx_clone = tx.clone();
    tokio::spawn(async move {
        let event = match actions::target_choices(&toolchain).await {
            Ok(list) => AppEvent::TargetsLoaded(list.values),
            Err(e) => AppEvent::Error(format!("获取目标列表失败: {}", e)),
        };
        let _ = tx_clone.send(event).await;
    });
}

pub fn handle_target_key(key: KeyEvent, app: &mut App) {
    match key.code {
        KeyCode::Esc => {
            app.back_to_dashboard();
            app.reset_target_state();
        }
        KeyCode::Up => app.target.selected = app.target.selected.saturating_sub(1),
        KeyCode::Down => {
            let len = app.target.visible().len();
            app.target.selected = layout::clamp_selection(app.target.selected + 1, len);
        }
        KeyCode::Enter => apply_selected(app),
        _ => {
            if app.target.filter.handle_key(&key) {
                app.target.selected = 0;
            }
        }
    }
}

/// 写入 `.cargo/config.toml`，文件很小，直接在当前线程完成
fn apply_selected(app: &mut App) {
    let Some(triple) = app.target.visible().get(app.target.selected).map(|t| t.to_string()) else {
        return;
    };
    match cargo_config::write_build_target(&app.workspace, &triple) {
        Ok(path) => {
            app.refresh_build_target();
            app.back_to_dashboard();
            app.reset_target_state();
            if triple == SYSTEM_TARGET {
                app.notify(format!("已移除 build.target ({})", path.display()));
            } else {
                app.notify(format!("build.target = {} ({})", triple, path.display()));
            }
        }
        Err(e) => app.fail(format!("写入配置失败: {:#}", e)),
    }
}

pub fn render_target(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.area());

    layout::render_header(f, "🎯 设置编译目标 (build.target)", chunks[0]);
    input::render_input_box(f, &app.target.filter, "过滤:", true, chunks[1]);

    let current = app.build_target.as_deref().unwrap_or(SYSTEM_TARGET);
    let items: Vec<PickItem> = app
        .target
        .visible()
        .into_iter()
        .map(|triple| {
            let known = targets::lookup(triple);
            PickItem {
                prefix: if triple == current { "* ".to_string() } else { String::new() },
                name: triple.to_string(),
                badge: known
                    .and_then(|k| k.tier)
                    .map(|t| t.label().to_string())
                    .unwrap_or_default(),
                detail: known
                    .map(|k| match k.file_format {
                        Some(format) => format!("{} · {}", format, k.description),
                        None => k.description.to_string(),
                    })
                    .unwrap_or_default(),
            }
        })
        .collect();
    layout::render_pick_list(f, "rustc --print target-list", &items, app.target.selected, true, chunks[2]);

    let footer_text = if app.target.loading {
        "加载目标列表..."
    } else {
        "输入过滤 | ↑↓ 选择 | Enter 写入 .cargo/config.toml | Esc 返回"
    };
    layout::render_footer(f, footer_text, app.notice.as_ref(), chunks[3]);
}
