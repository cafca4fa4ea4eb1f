use super::state::Notice;
use super::theme::{BRIGHT_WHITE, CARGO_GREEN, DESC_DIM, DIM, RUST, SEL_BG};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Margin, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
    Frame,
};
use unicode_width::UnicodeWidthStr;

/// 标准三段式布局：Header(3) + Content(弹性) + Footer(3)
pub fn main_layout(area: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(area)
        .to_vec()
}

/// 渲染通用 header
pub fn render_header(f: &mut Frame, title: &str, area: Rect) {
    let header = Paragraph::new(title)
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center);
    f.render_widget(header, area);
}

/// 渲染通用 footer，有未过期的提示时优先显示提示
pub fn render_footer(f: &mut Frame, text: &str, notice: Option<&Notice>, area: Rect) {
    let footer = match notice {
        Some(notice) => {
            let color = if notice.error { Color::Red } else { Color::Green };
            Paragraph::new(Line::from(vec![
                Span::styled(
                    format!(" [{}] ", notice.at.format("%H:%M:%S")),
                    Style::default().fg(DIM),
                ),
                Span::styled(notice.text.clone(), Style::default().fg(color)),
            ]))
        }
        None => Paragraph::new(format!(" {}", text)).style(Style::default().fg(Color::Green)),
    };
    f.render_widget(
        footer
            .block(Block::default().borders(Borders::ALL))
            .alignment(Alignment::Left),
        area,
    );
}

/// 渲染带滚动条的内容区域
pub fn render_scrollable_content(
    f: &mut Frame,
    title: &str,
    lines: &[String],
    scroll_offset: usize,
    area: Rect,
) {
    let block = Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    let inner = block.inner(area);
    f.render_widget(block, area);

    // 内部水平边距
    let padded = inner.inner(Margin {
        horizontal: 1,
        vertical: 0,
    });

    let total_lines = lines.len();
    let visible_height = padded.height as usize;
    let max_scroll = total_lines.saturating_sub(visible_height);
    let actual_scroll = scroll_offset.min(max_scroll);

    let visible_content: Vec<Line> = lines
        .iter()
        .skip(actual_scroll)
        .take(visible_height)
        .map(|line| Line::from(line.clone()))
        .collect();

    let paragraph = Paragraph::new(visible_content)
        .wrap(ratatui::widgets::Wrap { trim: false });

    f.render_widget(paragraph, padded);

    // 滚动条
    if total_lines > visible_height {
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("↑"))
            .end_symbol(Some("↓"));

        let mut scrollbar_state = ScrollbarState::new(total_lines).position(actual_scroll);

        f.render_stateful_widget(
            scrollbar,
            area.inner(Margin {
                horizontal: 0,
                vertical: 1,
            }),
            &mut scrollbar_state,
        );
    }
}

/// 估算内容区域可见行数（总高度减去 header/footer/borders）
pub fn visible_content_height(term_height: u16) -> usize {
    term_height.saturating_sub(8) as usize
}

/// 列表中的一项：第一行 名称 + 标记，第二行 描述
#[derive(Debug, Clone, Default)]
pub struct PickItem {
    pub prefix: String,
    pub name: String,
    pub badge: String,
    pub detail: String,
}

/// 按显示宽度截断，超出部分以 `…` 结尾
pub fn truncate_to_width(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    let mut out = String::new();
    let mut width = 0;
    for c in text.chars() {
        let w = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
        if width + w + 1 > max_width {
            break;
        }
        out.push(c);
        width += w;
    }
    out.push('…');
    out
}

/// 渲染两行一项的可选列表，自动滚动保证选中项可见
pub fn render_pick_list(
    f: &mut Frame,
    title: &str,
    items: &[PickItem],
    selected: usize,
    focused: bool,
    area: Rect,
) {
    let border_color = if focused { Color::Yellow } else { Color::DarkGray };
    let block = Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));

    let inner = block.inner(area);
    f.render_widget(block, area);

    let padded = inner.inner(Margin {
        horizontal: 1,
        vertical: 0,
    });

    if items.is_empty() {
        let empty = Paragraph::new(Line::from(Span::styled(
            "无结果",
            Style::default().fg(Color::DarkGray),
        )));
        f.render_widget(empty, padded);
        return;
    }

    let item_height = 2usize;
    let visible_items = ((padded.height as usize) / item_height).max(1);
    let scroll = if selected >= visible_items {
        selected - visible_items + 1
    } else {
        0
    };
    let desc_width = (padded.width as usize).saturating_sub(5);

    let mut lines: Vec<Line> = Vec::new();
    for (i, item) in items.iter().enumerate().skip(scroll).take(visible_items) {
        let is_selected = i == selected && focused;
        let marker = if is_selected { "► " } else { "  " };
        let desc = if item.detail.is_empty() {
            "(无描述)".to_string()
        } else {
            truncate_to_width(&item.detail, desc_width)
        };

        if is_selected {
            let bg = Style::default().bg(SEL_BG);
            lines.push(Line::from(vec![
                Span::styled(marker.to_string(), bg.fg(BRIGHT_WHITE).add_modifier(Modifier::BOLD)),
                Span::styled(item.prefix.clone(), bg.fg(RUST).add_modifier(Modifier::BOLD)),
                Span::styled(item.name.clone(), bg.fg(BRIGHT_WHITE).add_modifier(Modifier::BOLD)),
                Span::styled(format!(" {}", item.badge), bg.fg(CARGO_GREEN)),
            ]));
            lines.push(Line::from(Span::styled(
                format!("    {}", desc),
                Style::default().bg(SEL_BG).fg(DESC_DIM),
            )));
        } else {
            lines.push(Line::from(vec![
                Span::styled(marker.to_string(), Style::default().fg(Color::White)),
                Span::styled(item.prefix.clone(), Style::default().fg(RUST)),
                Span::styled(item.name.clone(), Style::default().fg(CARGO_GREEN)),
                Span::styled(format!(" {}", item.badge), Style::default().fg(DIM)),
            ]));
            lines.push(Line::from(Span::styled(
                format!("    {}", desc),
                Style::default().fg(Color::DarkGray),
            )));
        }
    }

    f.render_widget(Paragraph::new(lines), padded);

    if items.len() > visible_items {
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("↑"))
            .end_symbol(Some("↓"));
        let mut scrollbar_state = ScrollbarState::new(items.len()).position(scroll);
        f.render_stateful_widget(
            scrollbar,
            area.inner(Margin {
                horizontal: 0,
                vertical: 1,
            }),
            &mut scrollbar_state,
        );
    }
}

/// 屏幕中央的矩形区域（弹窗用），宽度按百分比，高度按行数
pub fn centered_rect(percent_x: u16, height: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

/// 清空区域后画一个带标题的弹窗边框，返回内部区域
pub fn render_popup_frame(f: &mut Frame, title: &str, area: Rect) -> Rect {
    f.render_widget(Clear, area);
    let block = Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(RUST));
    let inner = block.inner(area);
    f.render_widget(block, area);
    inner
}

/// 把选中下标约束在 [0, len) 内
pub fn clamp_selection(selected: usize, len: usize) -> usize {
    selected.min(len.saturating_sub(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncation_respects_display_width() {
        assert_eq!(truncate_to_width("short", 10), "short");
        assert_eq!(truncate_to_width("abcdefgh", 5), "abcd…");
        // 中文字符宽度为 2
        assert_eq!(truncate_to_width("序列化框架", 5), "序列…");
    }

    #[test]
    fn selection_is_clamped_to_list() {
        assert_eq!(clamp_selection(5, 3), 2);
        assert_eq!(clamp_selection(1, 3), 1);
        assert_eq!(clamp_selection(4, 0), 0);
    }
}
