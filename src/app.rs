use std::sync::Arc;
use std::time::{Duration, Instant};

use ratatui::widgets::ListState;

use crate::config;
use crate::store::{StoreOp, StoreOutcome, TaskStore};
use crate::sync::Synchronizer;
use crate::theme::{detect_system_theme, get_theme_colors, Theme, ThemeColors};

/// Toast 类型（决定边框颜色）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

/// Toast 消息
#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
    pub expires_at: Instant,
}

impl Toast {
    pub fn new(message: impl Into<String>, kind: ToastKind, duration: Duration) -> Self {
        Self {
            message: message.into(),
            kind,
            expires_at: Instant::now() + duration,
        }
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// 列表分区
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Incomplete,
    Complete,
}

impl Section {
    pub fn index(&self) -> usize {
        match self {
            Section::Incomplete => 0,
            Section::Complete => 1,
        }
    }

    pub fn next(&self) -> Self {
        match self {
            Section::Incomplete => Section::Complete,
            Section::Complete => Section::Incomplete,
        }
    }
}

/// Add Task 弹窗的焦点字段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddField {
    Name,
    Detail,
}

/// Add Task 弹窗状态
#[derive(Debug, Default)]
pub struct AddTaskDialog {
    pub name_input: String,
    pub detail_input: String,
    pub focus_detail: bool,
}

impl AddTaskDialog {
    pub fn focused(&self) -> AddField {
        if self.focus_detail {
            AddField::Detail
        } else {
            AddField::Name
        }
    }

    pub fn toggle_focus(&mut self) {
        self.focus_detail = !self.focus_detail;
    }

    pub fn input_char(&mut self, c: char) {
        match self.focused() {
            AddField::Name => self.name_input.push(c),
            AddField::Detail => self.detail_input.push(c),
        }
    }

    pub fn delete_char(&mut self) {
        match self.focused() {
            AddField::Name => self.name_input.pop(),
            AddField::Detail => self.detail_input.pop(),
        };
    }
}

/// 删除确认弹窗状态
#[derive(Debug, Clone)]
pub struct DeleteConfirm {
    pub id: String,
    pub name: String,
}

/// 全局应用状态
pub struct App {
    /// 是否应该退出
    pub should_quit: bool,
    /// 任务列表同步器
    pub sync: Synchronizer,
    /// 当前聚焦的分区
    pub section: Section,
    /// 各分区独立的列表选择状态
    pub list_states: [ListState; 2],
    /// Toast 提示
    pub toast: Option<Toast>,
    /// 当前主题
    pub theme: Theme,
    /// 当前颜色方案
    pub colors: ThemeColors,
    /// 上次检测到的系统主题（用于 Auto 模式检测变化）
    last_system_dark: bool,
    /// Add Task 弹窗
    pub add_dialog: Option<AddTaskDialog>,
    /// 删除确认弹窗
    pub confirm_delete: Option<DeleteConfirm>,
}

impl App {
    pub fn new(store: Arc<dyn TaskStore>, theme: Theme) -> Self {
        let last_system_dark = detect_system_theme();
        let colors = get_theme_colors(theme);

        Self {
            should_quit: false,
            sync: Synchronizer::new(store),
            section: Section::Incomplete,
            list_states: [ListState::default(), ListState::default()],
            toast: None,
            theme,
            colors,
            last_system_dark,
            add_dialog: None,
            confirm_delete: None,
        }
    }

    /// 每个事件循环 tick 调用：收快照、收 outcome、清理过期 Toast
    pub fn tick(&mut self) {
        if self.sync.poll_snapshot() {
            self.ensure_selection();
        }
        for outcome in self.sync.drain_outcomes() {
            self.apply_outcome(outcome);
        }
        self.update_toast();
        self.check_system_theme();
    }

    /// 把变更 outcome 转成面向用户的 Toast（add 成功同时收起弹窗）
    fn apply_outcome(&mut self, outcome: StoreOutcome) {
        match (&outcome.op, &outcome.result) {
            (StoreOp::Add { .. }, Ok(())) => {
                self.add_dialog = None;
                self.show_success("Task added successfully!");
            }
            (StoreOp::Add { .. }, Err(e)) => {
                // 弹窗保持打开，输入保留，用户可以修改后重试
                self.show_error(format!("Failed to add task: {}", e.user_message()));
            }
            (StoreOp::Complete { .. }, Ok(())) => {
                self.show_success("Task marked as complete!");
            }
            (StoreOp::Complete { .. }, Err(e)) => {
                self.show_error(format!("Failed to update task: {}", e.user_message()));
            }
            (StoreOp::Delete { .. }, Ok(())) => {
                self.show_success("Task deleted successfully!");
            }
            (StoreOp::Delete { .. }, Err(e)) => {
                self.show_error(format!("Failed to delete task: {}", e.user_message()));
            }
        }
    }

    // ========== 分区与选择 ==========

    fn section_len(&self, section: Section) -> usize {
        match section {
            Section::Incomplete => self.sync.incomplete().len(),
            Section::Complete => self.sync.complete().len(),
        }
    }

    /// 当前聚焦分区内选中的任务 id 和名称
    pub fn selected_task(&self) -> Option<(String, String)> {
        let index = self.list_states[self.section.index()].selected()?;
        let tasks = match self.section {
            Section::Incomplete => self.sync.incomplete(),
            Section::Complete => self.sync.complete(),
        };
        tasks.get(index).map(|t| (t.id.clone(), t.name.clone()))
    }

    /// 快照更新后校正两个分区的选中项
    pub fn ensure_selection(&mut self) {
        for section in [Section::Incomplete, Section::Complete] {
            let len = self.section_len(section);
            let state = &mut self.list_states[section.index()];
            match state.selected() {
                _ if len == 0 => state.select(None),
                None => state.select(Some(0)),
                Some(i) if i >= len => state.select(Some(len - 1)),
                Some(_) => {}
            }
        }
    }

    /// 选中下一项
    pub fn select_next(&mut self) {
        let len = self.section_len(self.section);
        if len == 0 {
            return;
        }
        let state = &mut self.list_states[self.section.index()];
        let current = state.selected().unwrap_or(0);
        state.select(Some((current + 1) % len));
    }

    /// 选中上一项
    pub fn select_previous(&mut self) {
        let len = self.section_len(self.section);
        if len == 0 {
            return;
        }
        let state = &mut self.list_states[self.section.index()];
        let current = state.selected().unwrap_or(0);
        let prev = if current == 0 { len - 1 } else { current - 1 };
        state.select(Some(prev));
    }

    /// 切换聚焦分区
    pub fn next_section(&mut self) {
        self.section = self.section.next();
        self.ensure_selection();
    }

    // ========== Add Task 弹窗 ==========

    pub fn open_add_dialog(&mut self) {
        self.add_dialog = Some(AddTaskDialog::default());
    }

    pub fn close_add_dialog(&mut self) {
        self.add_dialog = None;
    }

    /// 提交 Add Task 弹窗
    ///
    /// 在途时 Enter 被忽略；校验失败以 Toast 提示且弹窗保持打开；
    /// 校验通过后等 outcome 决定收起还是报错。
    pub fn submit_add(&mut self) {
        let Some(ref dialog) = self.add_dialog else {
            return;
        };
        if self.sync.add_in_flight() {
            return;
        }

        let name = dialog.name_input.clone();
        let detail = dialog.detail_input.clone();
        if let Err(e) = self.sync.add_task(&name, &detail) {
            self.show_error(e.user_message());
        }
    }

    // ========== 完成与删除 ==========

    /// 标记当前选中任务为完成（仅未完成分区可用）
    pub fn complete_selected(&mut self) {
        if self.section != Section::Incomplete {
            return;
        }
        if let Some((id, _)) = self.selected_task() {
            self.sync.complete_task(&id);
        }
    }

    /// 打开删除确认弹窗
    pub fn request_delete_selected(&mut self) {
        if let Some((id, name)) = self.selected_task() {
            self.confirm_delete = Some(DeleteConfirm { id, name });
        }
    }

    /// 确认删除
    pub fn confirm_delete_yes(&mut self) {
        if let Some(confirm) = self.confirm_delete.take() {
            self.sync.delete_task(&confirm.id);
        }
    }

    /// 取消删除（不发起任何 store 调用）
    pub fn confirm_delete_cancel(&mut self) {
        self.confirm_delete = None;
    }

    // ========== Toast 与主题 ==========

    pub fn show_success(&mut self, message: impl Into<String>) {
        self.toast = Some(Toast::new(message, ToastKind::Success, Duration::from_secs(2)));
    }

    pub fn show_error(&mut self, message: impl Into<String>) {
        self.toast = Some(Toast::new(message, ToastKind::Error, Duration::from_secs(3)));
    }

    /// 清理过期的 Toast
    pub fn update_toast(&mut self) {
        if let Some(ref toast) = self.toast {
            if toast.is_expired() {
                self.toast = None;
            }
        }
    }

    /// 切换到下一个主题并持久化
    pub fn cycle_theme(&mut self) {
        self.theme = self.theme.next();
        self.colors = get_theme_colors(self.theme);
        self.show_success(format!("Theme: {}", self.theme.label()));

        let mut cfg = config::load_config();
        cfg.theme.name = self.theme.label().to_string();
        let _ = config::save_config(&cfg);
    }

    /// 检查系统主题变化（用于 Auto 模式）
    pub fn check_system_theme(&mut self) {
        if self.theme != Theme::Auto {
            return;
        }
        let current_dark = detect_system_theme();
        if current_dark != self.last_system_dark {
            self.last_system_dark = current_dark;
            self.colors = get_theme_colors(Theme::Auto);
        }
    }

    /// 退出应用
    pub fn quit(&mut self) {
        self.should_quit = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;
    use crate::sync::EMPTY_INPUT_MESSAGE;

    fn app_with(store: &MemoryStore) -> App {
        let mut app = App::new(Arc::new(store.clone()), Theme::Dark);
        app.tick();
        app
    }

    fn type_task(app: &mut App, name: &str, detail: &str) {
        app.open_add_dialog();
        let dialog = app.add_dialog.as_mut().unwrap();
        dialog.name_input = name.to_string();
        dialog.detail_input = detail.to_string();
    }

    #[test]
    fn test_add_flow_closes_dialog_and_toasts() {
        let store = MemoryStore::new();
        let mut app = app_with(&store);

        type_task(&mut app, "Buy milk", "2%");
        app.submit_add();
        app.tick();

        assert!(app.add_dialog.is_none());
        let toast = app.toast.as_ref().unwrap();
        assert_eq!(toast.message, "Task added successfully!");
        assert_eq!(toast.kind, ToastKind::Success);
        assert_eq!(app.sync.incomplete().len(), 1);
        // 新任务出现后选中项自动落在第一行
        assert_eq!(app.list_states[0].selected(), Some(0));
    }

    #[test]
    fn test_blank_add_keeps_dialog_open() {
        let store = MemoryStore::new();
        let mut app = app_with(&store);

        type_task(&mut app, "  ", "detail");
        app.submit_add();
        app.tick();

        assert!(app.add_dialog.is_some());
        let toast = app.toast.as_ref().unwrap();
        assert_eq!(toast.message, EMPTY_INPUT_MESSAGE);
        assert_eq!(toast.kind, ToastKind::Error);
        assert!(app.sync.tasks().is_empty());
    }

    #[test]
    fn test_add_failure_keeps_dialog_and_input() {
        let store = MemoryStore::new();
        let mut app = app_with(&store);

        store.fail_next_operation("permission denied");
        type_task(&mut app, "Buy milk", "2%");
        app.submit_add();
        app.tick();

        let dialog = app.add_dialog.as_ref().unwrap();
        assert_eq!(dialog.name_input, "Buy milk");
        assert_eq!(
            app.toast.as_ref().unwrap().message,
            "Failed to add task: permission denied"
        );
    }

    #[test]
    fn test_complete_only_from_incomplete_section() {
        let store = MemoryStore::new();
        let mut app = app_with(&store);

        type_task(&mut app, "Buy milk", "2%");
        app.submit_add();
        app.tick();

        // 已完成分区聚焦时 c 无效
        app.section = Section::Complete;
        app.complete_selected();
        app.tick();
        assert_eq!(app.sync.complete().len(), 0);

        app.section = Section::Incomplete;
        app.complete_selected();
        app.tick();
        assert_eq!(app.sync.complete().len(), 1);
        assert_eq!(
            app.toast.as_ref().unwrap().message,
            "Task marked as complete!"
        );
    }

    #[test]
    fn test_delete_requires_confirmation() {
        let store = MemoryStore::new();
        let mut app = app_with(&store);

        type_task(&mut app, "Buy milk", "2%");
        app.submit_add();
        app.tick();

        // 取消：不发起删除
        app.request_delete_selected();
        assert_eq!(app.confirm_delete.as_ref().unwrap().name, "Buy milk");
        app.confirm_delete_cancel();
        app.tick();
        assert_eq!(app.sync.tasks().len(), 1);

        // 确认：删除生效
        app.request_delete_selected();
        app.confirm_delete_yes();
        app.tick();
        assert!(app.sync.tasks().is_empty());
        assert_eq!(
            app.toast.as_ref().unwrap().message,
            "Task deleted successfully!"
        );
        // 列表清空后选中项被清掉
        assert_eq!(app.list_states[0].selected(), None);
    }

    #[test]
    fn test_navigation_wraps_within_section() {
        let store = MemoryStore::new();
        let mut app = app_with(&store);

        for name in ["a", "b", "c"] {
            type_task(&mut app, name, "d");
            app.submit_add();
            app.tick();
        }

        assert_eq!(app.list_states[0].selected(), Some(0));
        app.select_next();
        app.select_next();
        assert_eq!(app.list_states[0].selected(), Some(2));
        app.select_next();
        assert_eq!(app.list_states[0].selected(), Some(0));
        app.select_previous();
        assert_eq!(app.list_states[0].selected(), Some(2));
    }

    #[test]
    fn test_dialog_field_focus_and_editing() {
        let mut dialog = AddTaskDialog::default();
        assert_eq!(dialog.focused(), AddField::Name);

        dialog.input_char('h');
        dialog.input_char('i');
        dialog.toggle_focus();
        assert_eq!(dialog.focused(), AddField::Detail);
        dialog.input_char('x');
        dialog.delete_char();

        assert_eq!(dialog.name_input, "hi");
        assert_eq!(dialog.detail_input, "");
    }
}
