//! 任务分区列表组件

use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::model::Task;
use crate::theme::ThemeColors;

use super::truncate;

/// 渲染一个分区（标题 + 任务行；空分区显示占位文字）
#[allow(clippy::too_many_arguments)]
pub fn render(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    tasks: &[&Task],
    state: &mut ListState,
    focused: bool,
    placeholder: &str,
    colors: &ThemeColors,
) {
    let border_color = if focused {
        colors.highlight
    } else {
        colors.border
    };

    let block = Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));

    if tasks.is_empty() {
        let inner = block.inner(area);
        frame.render_widget(block, area);
        render_placeholder(frame, inner, placeholder, colors);
        return;
    }

    let name_width = (area.width as usize).saturating_sub(8).max(8);
    let items: Vec<ListItem> = tasks
        .iter()
        .map(|task| {
            let marker = if task.completed { "✓ " } else { "  " };
            let marker_color = if task.completed {
                colors.success
            } else {
                colors.muted
            };
            let line = Line::from(vec![
                Span::styled(marker, Style::default().fg(marker_color)),
                Span::styled(
                    truncate(&task.name, name_width),
                    Style::default()
                        .fg(colors.text)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("  {}", truncate(&task.detail, name_width)),
                    Style::default().fg(colors.muted),
                ),
            ]);
            ListItem::new(line)
        })
        .collect();

    let list = List::new(items).block(block).highlight_style(
        Style::default()
            .bg(colors.bg_secondary)
            .add_modifier(Modifier::BOLD),
    );

    frame.render_stateful_widget(list, area, state);
}

fn render_placeholder(frame: &mut Frame, area: Rect, placeholder: &str, colors: &ThemeColors) {
    let y_offset = area.height.saturating_sub(1) / 2;
    let centered = Rect {
        x: area.x,
        y: area.y + y_offset,
        width: area.width,
        height: 1.min(area.height),
    };

    let widget = Paragraph::new(Line::from(Span::styled(
        placeholder,
        Style::default().fg(colors.muted),
    )))
    .alignment(Alignment::Center);

    frame.render_widget(widget, centered);
}
