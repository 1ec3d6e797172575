use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::Section;
use crate::theme::ThemeColors;

/// 渲染底部快捷键提示栏
pub fn render(frame: &mut Frame, area: Rect, section: Section, has_items: bool, colors: &ThemeColors) {
    let shortcuts = get_shortcuts(section, has_items);

    let mut spans = Vec::new();
    spans.push(Span::raw("  "));

    for (i, (key, desc)) in shortcuts.iter().enumerate() {
        spans.push(Span::styled(
            *key,
            Style::default()
                .fg(colors.highlight)
                .add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::styled(
            format!(" {}", desc),
            Style::default().fg(colors.muted),
        ));

        if i < shortcuts.len() - 1 {
            spans.push(Span::raw("   "));
        }
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors.border));

    let paragraph = Paragraph::new(Line::from(spans)).block(block);
    frame.render_widget(paragraph, area);
}

fn get_shortcuts(section: Section, has_items: bool) -> Vec<(&'static str, &'static str)> {
    match section {
        // 已完成分区没有 complete 动作
        Section::Complete => {
            if has_items {
                vec![
                    ("a", "add"),
                    ("x", "delete"),
                    ("Tab", "switch"),
                    ("T", "theme"),
                    ("q", "quit"),
                ]
            } else {
                vec![("a", "add"), ("Tab", "switch"), ("q", "quit")]
            }
        }
        Section::Incomplete => {
            if has_items {
                vec![
                    ("a", "add"),
                    ("c", "complete"),
                    ("x", "delete"),
                    ("Tab", "switch"),
                    ("T", "theme"),
                    ("q", "quit"),
                ]
            } else {
                vec![("a", "add"), ("Tab", "switch"), ("q", "quit")]
            }
        }
    }
}
