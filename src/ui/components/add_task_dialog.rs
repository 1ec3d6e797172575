//! Add New Task 弹窗组件

use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::{AddField, AddTaskDialog};
use crate::theme::ThemeColors;

/// 渲染 Add New Task 弹窗
pub fn render(
    frame: &mut Frame,
    dialog: &AddTaskDialog,
    add_in_flight: bool,
    colors: &ThemeColors,
) {
    let area = frame.area();

    // 计算弹窗尺寸
    let popup_width = 60u16.min(area.width.saturating_sub(4));
    let popup_height = 9u16;

    // 居中显示
    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;

    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);

    // 清除背景
    frame.render_widget(Clear, popup_area);

    // 外框
    let block = Block::default()
        .title(" Add New Task ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors.highlight))
        .style(Style::default().bg(colors.bg));

    let inner_area = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    // 内部布局: 空行 + 名称行 + 空行 + 详情行 + 空行 + 提示行
    let [_, name_area, _, detail_area, _, hint_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(inner_area);

    render_input_line(
        frame,
        name_area,
        "  Task Name:   ",
        &dialog.name_input,
        dialog.focused() == AddField::Name,
        colors,
    );
    render_input_line(
        frame,
        detail_area,
        "  Task Detail: ",
        &dialog.detail_input,
        dialog.focused() == AddField::Detail,
        colors,
    );

    // 渲染底部提示（提交中时换成状态文字）
    let hint = if add_in_flight {
        Paragraph::new(Line::from(Span::styled(
            "Adding…",
            Style::default().fg(colors.muted),
        )))
        .alignment(Alignment::Center)
    } else {
        Paragraph::new(Line::from(vec![
            Span::styled("Enter", Style::default().fg(colors.highlight)),
            Span::styled(" ok  ", Style::default().fg(colors.muted)),
            Span::styled("Tab", Style::default().fg(colors.highlight)),
            Span::styled(" field  ", Style::default().fg(colors.muted)),
            Span::styled("Esc", Style::default().fg(colors.highlight)),
            Span::styled(" cancel", Style::default().fg(colors.muted)),
        ]))
        .alignment(Alignment::Center)
    };

    frame.render_widget(hint, hint_area);
}

fn render_input_line(
    frame: &mut Frame,
    area: Rect,
    label: &str,
    input: &str,
    focused: bool,
    colors: &ThemeColors,
) {
    let mut spans = vec![
        Span::styled(label, Style::default().fg(colors.muted)),
        Span::styled(input, Style::default().fg(colors.text)),
    ];
    if focused {
        // 光标
        spans.push(Span::styled(
            "█",
            Style::default()
                .fg(colors.highlight)
                .add_modifier(Modifier::BOLD),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
