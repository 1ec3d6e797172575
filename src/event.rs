use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};

use crate::app::App;

/// 处理事件，返回 true 表示应该继续运行
pub fn handle_events(app: &mut App) -> io::Result<bool> {
    // 收快照、收 outcome、清理过期 Toast
    app.tick();

    // 轮询事件（100ms 超时）
    if event::poll(Duration::from_millis(100))? {
        if let Event::Key(key) = event::read()? {
            // 只处理按下事件
            if key.kind != KeyEventKind::Press {
                return Ok(true);
            }
            handle_key(app, key);
        }
    }

    Ok(!app.should_quit)
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // 优先处理弹窗事件

    // 删除确认弹窗
    if app.confirm_delete.is_some() {
        handle_confirm_delete_key(app, key);
        return;
    }

    // Add Task 弹窗
    if app.add_dialog.is_some() {
        handle_add_dialog_key(app, key);
        return;
    }

    handle_list_key(app, key);
}

/// 主列表的键盘事件
fn handle_list_key(app: &mut App, key: KeyEvent) {
    match key.code {
        // 退出
        KeyCode::Char('q') => app.quit(),

        // 导航 - 下移
        KeyCode::Char('j') | KeyCode::Down => {
            app.select_next();
        }

        // 导航 - 上移
        KeyCode::Char('k') | KeyCode::Up => {
            app.select_previous();
        }

        // Tab - 切换分区
        KeyCode::Tab => {
            app.next_section();
        }

        // 功能按键 - 新增任务
        KeyCode::Char('a') => {
            app.open_add_dialog();
        }

        // 功能按键 - 标记完成（仅未完成分区）
        KeyCode::Char('c') => {
            app.complete_selected();
        }

        // 功能按键 - 删除（先确认）
        KeyCode::Char('x') => {
            app.request_delete_selected();
        }

        // 功能按键 - 切换主题
        KeyCode::Char('T') => {
            app.cycle_theme();
        }

        _ => {}
    }
}

/// Add Task 弹窗的键盘事件
fn handle_add_dialog_key(app: &mut App, key: KeyEvent) {
    match key.code {
        // 提交（在途时被忽略）
        KeyCode::Enter => {
            app.submit_add();
        }

        // 取消
        KeyCode::Esc => {
            app.close_add_dialog();
        }

        // 切换输入字段
        KeyCode::Tab => {
            if let Some(ref mut dialog) = app.add_dialog {
                dialog.toggle_focus();
            }
        }

        // 删除字符
        KeyCode::Backspace => {
            if let Some(ref mut dialog) = app.add_dialog {
                dialog.delete_char();
            }
        }

        // 输入字符
        KeyCode::Char(c) => {
            if let Some(ref mut dialog) = app.add_dialog {
                dialog.input_char(c);
            }
        }

        _ => {}
    }
}

/// 删除确认弹窗的键盘事件（弱确认）
fn handle_confirm_delete_key(app: &mut App, key: KeyEvent) {
    match key.code {
        // 确认
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
            app.confirm_delete_yes();
        }

        // 取消
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            app.confirm_delete_cancel();
        }

        _ => {}
    }
}
