use super::layout;
use super::state::{App, AppEvent, AppMode, PaletteAction};
use super::theme::{CARGO_GREEN, DIM, RUST, SEL_BG};
use super::{generate, target};
use crate::toolchain::CrateTemplate;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use tokio::sync::mpsc;

const ASCII_LOGO: &str = r#"
 ┳━┓┳ ┓┏━┓┏┳┓  ┏━┓┳━┓┏━┓┳┏┓
 ┣┳┛┃ ┃┗━┓ ┃   ┣━┛┣┳┛┃ ┃ ┃
 ┻┗━┗━┛┗━┛ ┻   ┻  ┻┗━┗━┛┗┛"#;

/// 面板按键：快捷字母或 ↑↓ + Enter
pub fn handle_dashboard_key(key: KeyEvent, app: &mut App, tx: &mpsc::Sender<AppEvent>) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Up => app.palette_selected = app.palette_selected.saturating_sub(1),
        KeyCode::Down => {
            if app.palette_selected + 1 < PaletteAction::ALL.len() {
                app.palette_selected += 1;
            }
        }
        KeyCode::Enter => {
            let action = PaletteAction::ALL[app.palette_selected.min(PaletteAction::ALL.len() - 1)];
            open_action(action, app, tx);
        }
        KeyCode::Char(c) => {
            if let Some(action) = PaletteAction::from_key(c) {
                open_action(action, app, tx);
            }
        }
        _ => {}
    }
}

fn open_action(action: PaletteAction, app: &mut App, tx: &mpsc::Sender<AppEvent>) {
    app.notice = None;
    match action {
        PaletteAction::AddCrate => {
            app.reset_add_state();
            app.mode = AppMode::AddCrate;
        }
        PaletteAction::SetTarget => {
            app.reset_target_state();
            app.mode = AppMode::Target;
            target::load_targets(app, tx);
        }
        PaletteAction::NewBin => {
            app.reset_new_crate_state(CrateTemplate::Bin);
            app.mode = AppMode::NewCrate;
        }
        PaletteAction::NewLib => {
            app.reset_new_crate_state(CrateTemplate::Lib);
            app.mode = AppMode::NewCrate;
        }
        PaletteAction::Generate => {
            app.reset_generate_state();
            app.mode = AppMode::Generate;
            // 打开时先列出热门模板
            generate::execute_pending_search(app, tx);
        }
    }
}

pub fn render_dashboard(f: &mut Frame, app: &App) {
    let area = f.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)])
        .split(area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    f.render_widget(block, chunks[0]);

    let mut lines: Vec<Line> = Vec::new();
    lines.push(Line::from(""));

    for logo_line in ASCII_LOGO.lines() {
        lines.push(Line::from(vec![Span::styled(
            logo_line.to_string(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )]));
    }

    lines.push(Line::from(""));
    lines.push(section_title("── 工具链 ──"));
    lines.push(Line::from(""));

    match &app.info {
        Some(info) => {
            lines.push(info_line("cargo  ", &info.cargo_version));
            lines.push(info_line("rustc  ", &info.rustc_version));
            lines.push(info_line("host  ", &info.host));
            lines.push(info_line(
                "cargo-generate  ",
                if info.has_generate { "已安装" } else { "未安装" },
            ));
        }
        None => {
            lines.push(info_line("cargo  ", "检测中..."));
            lines.push(info_line("rustc  ", "检测中..."));
        }
    }
    lines.push(info_line("工作区  ", &app.workspace.display().to_string()));
    lines.push(info_line(
        "build.target  ",
        app.build_target.as_deref().unwrap_or("system"),
    ));

    lines.push(Line::from(""));
    lines.push(section_title("── 命令 ──"));
    lines.push(Line::from(""));

    for (i, action) in PaletteAction::ALL.iter().enumerate() {
        lines.push(action_line(*action, i == app.palette_selected));
    }
    lines.push(shortcut_line("q", " 退出"));

    lines.push(Line::from(""));
    lines.push(Line::from(vec![Span::styled(
        format!("rust-project-manager v{}  ", env!("CARGO_PKG_VERSION")),
        Style::default().fg(Color::DarkGray),
    )]));

    let content_height = lines.len() as u16;
    let paragraph = Paragraph::new(lines).alignment(Alignment::Center);

    // 垂直居中
    let inner = chunks[0].inner(ratatui::layout::Margin {
        horizontal: 1,
        vertical: 1,
    });
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(content_height),
            Constraint::Min(0),
        ])
        .split(inner);
    f.render_widget(paragraph, vertical[1]);

    layout::render_footer(
        f,
        "↑↓ 选择 | Enter 执行 | 字母快捷键 | q 退出",
        app.notice.as_ref(),
        chunks[1],
    );
}

fn section_title(text: &str) -> Line<'_> {
    Line::from(vec![Span::styled(
        text,
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
    )])
}

/// 信息行: "标签: 值"
fn info_line(label: &str, value: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!("{label}: "),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ),
        Span::styled(value.to_string(), Style::default().fg(CARGO_GREEN)),
    ])
}

fn action_line(action: PaletteAction, selected: bool) -> Line<'static> {
    let base = if selected {
        Style::default().bg(SEL_BG)
    } else {
        Style::default()
    };
    Line::from(vec![
        Span::styled(
            format!("{} {}", if selected { "►" } else { " " }, action.key()),
            base.fg(RUST).add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("  {:<32}", action.label()), base.fg(if selected { Color::White } else { DIM })),
    ])
}

/// 快捷键行: "  X  描述"
fn shortcut_line<'a>(key: &'a str, desc: &'a str) -> Line<'a> {
    Line::from(vec![
        Span::styled(
            format!("  {key}"),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("  {:<32}", desc), Style::default().fg(Color::White)),
    ])
}
