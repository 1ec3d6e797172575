//! 主界面渲染

use ratatui::{
    layout::{Constraint, Layout},
    style::Style,
    widgets::{Block, Widget},
    Frame,
};

use crate::app::{App, Section};

use super::components::{add_task_dialog, confirm_dialog, footer, header, task_list, toast};

/// 渲染主界面（header + 两个分区 + footer + 弹窗层）
pub fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.area();
    let colors = app.colors;

    // 填充整个背景
    Block::default()
        .style(Style::default().bg(colors.bg))
        .render(area, frame.buffer_mut());

    let [header_area, incomplete_area, complete_area, footer_area] = Layout::vertical([
        Constraint::Length(header::HEADER_HEIGHT),
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Length(3),
    ])
    .areas(area);

    header::render(frame, header_area, app.sync.tasks().len(), &colors);

    let incomplete: Vec<_> = app.sync.incomplete().into_iter().cloned().collect();
    let complete: Vec<_> = app.sync.complete().into_iter().cloned().collect();

    task_list::render(
        frame,
        incomplete_area,
        "Incomplete Tasks",
        &incomplete.iter().collect::<Vec<_>>(),
        &mut app.list_states[Section::Incomplete.index()],
        app.section == Section::Incomplete,
        "No Task",
        &colors,
    );
    task_list::render(
        frame,
        complete_area,
        "Complete Tasks",
        &complete.iter().collect::<Vec<_>>(),
        &mut app.list_states[Section::Complete.index()],
        app.section == Section::Complete,
        "No Completed Task",
        &colors,
    );

    let has_items = match app.section {
        Section::Incomplete => !incomplete.is_empty(),
        Section::Complete => !complete.is_empty(),
    };
    footer::render(frame, footer_area, app.section, has_items, &colors);

    // 弹窗层
    if let Some(ref dialog) = app.add_dialog {
        add_task_dialog::render(frame, dialog, app.sync.add_in_flight(), &colors);
    }
    if let Some(ref confirm) = app.confirm_delete {
        confirm_dialog::render(frame, confirm, &colors);
    }

    // Toast 永远在最上层
    if let Some(ref t) = app.toast {
        toast::render(frame, t, &colors);
    }
}
