use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::{Toast, ToastKind};
use crate::theme::ThemeColors;

/// 在屏幕底部居中显示 Toast 消息
pub fn render(frame: &mut Frame, toast: &Toast, colors: &ThemeColors) {
    let area = frame.area();

    let toast_height = 3;

    // 终端装不下时直接跳过这帧，不渲染
    if area.width < 5 || area.height < toast_height + 3 {
        return;
    }

    // 计算 Toast 尺寸和位置
    let toast_width = (toast.message.len() + 6).min(area.width.saturating_sub(4) as usize) as u16;
    let toast_x = area.width.saturating_sub(toast_width) / 2;
    let toast_y = area.height - toast_height - 3;

    let toast_area = Rect::new(toast_x, toast_y, toast_width, toast_height);

    let border_color = match toast.kind {
        ToastKind::Success => colors.success,
        ToastKind::Error => colors.error,
    };

    // 清除背景
    frame.render_widget(Clear, toast_area);

    let widget = Paragraph::new(toast.message.as_str())
        .style(
            Style::default()
                .fg(colors.text)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border_color))
                .style(Style::default().bg(colors.bg)),
        );

    frame.render_widget(widget, toast_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::dark_colors;
    use ratatui::{backend::TestBackend, Terminal};
    use std::time::Duration;

    #[test]
    fn test_render_survives_tiny_terminal() {
        let colors = dark_colors();
        let toast = Toast::new("Task added successfully!", ToastKind::Success, Duration::from_secs(2));

        // 3x4 和 2x2 的终端都不应 panic
        for (w, h) in [(3u16, 4u16), (2, 2), (80, 24)] {
            let mut terminal = Terminal::new(TestBackend::new(w, h)).unwrap();
            terminal.draw(|frame| render(frame, &toast, &colors)).unwrap();
        }
    }
}
