//! 任务列表同步器
//!
//! UI 状态与远端 store 之间的视图模型：整份应用收到的每帧快照、
//! 两个分区的派生、变更操作的校验与发起、add 的 in-flight 防抖、
//! 延迟 outcome 的排空都在这里。不做任何乐观更新：变更的可见效果
//! 一律等下一帧快照。

use std::sync::mpsc::{Receiver, TryRecvError};
use std::sync::Arc;

use crate::error::{Result, TaskError};
use crate::model::{generate_task_id, Task, TaskFields};
use crate::store::{OutcomeSender, StoreOp, StoreOutcome, Subscription, TaskStore};

/// 空输入的校验提示（add 弹窗原样展示）
pub const EMPTY_INPUT_MESSAGE: &str = "Task Name and Task Detail cannot be empty.";

pub struct Synchronizer {
    store: Arc<dyn TaskStore>,
    subscription: Subscription,
    tasks: Vec<Task>,
    outcome_tx: OutcomeSender,
    outcome_rx: Receiver<StoreOutcome>,
    /// 提交中的 add 未收到 outcome 前，再次提交被忽略
    add_in_flight: bool,
}

impl Synchronizer {
    /// 订阅集合并建立 outcome 回传通道
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        let subscription = store.subscribe();
        let (outcome_tx, outcome_rx) = std::sync::mpsc::channel();
        Self {
            store,
            subscription,
            tasks: Vec::new(),
            outcome_tx,
            outcome_rx,
            add_in_flight: false,
        }
    }

    /// 排空快照通道，最后一帧整体替换本地列表；返回是否有更新
    pub fn poll_snapshot(&mut self) -> bool {
        let mut latest = None;
        while let Some(snapshot) = self.subscription.try_recv() {
            latest = Some(snapshot);
        }
        match latest {
            Some(snapshot) => {
                self.tasks = snapshot;
                true
            }
            None => false,
        }
    }

    /// 排空已完成的变更 outcome；add 的 outcome 同时解除 in-flight
    pub fn drain_outcomes(&mut self) -> Vec<StoreOutcome> {
        let mut drained = Vec::new();
        loop {
            match self.outcome_rx.try_recv() {
                Ok(outcome) => {
                    if matches!(outcome.op, StoreOp::Add { .. }) {
                        self.add_in_flight = false;
                    }
                    drained.push(outcome);
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        drained
    }

    /// 校验并发起新增
    ///
    /// 两个字段先 trim；任一为空返回 Validation 错误，不触达 store。
    /// 已有 add 在途时提交被静默忽略。不做乐观插入。
    pub fn add_task(&mut self, name: &str, detail: &str) -> Result<()> {
        let name = name.trim();
        let detail = detail.trim();
        if name.is_empty() || detail.is_empty() {
            return Err(TaskError::validation(EMPTY_INPUT_MESSAGE));
        }
        if self.add_in_flight {
            return Ok(());
        }

        let fields = TaskFields {
            name: name.to_string(),
            detail: detail.to_string(),
            completed: false,
        };
        let id = generate_task_id();
        self.add_in_flight = true;
        self.store.create(
            &id,
            &fields,
            StoreOp::Add {
                name: name.to_string(),
            },
            self.outcome_tx.clone(),
        );
        Ok(())
    }

    /// 无条件发起 completed: true 的 partial update
    ///
    /// 不做本地预检：id 不存在由 store 以失败 outcome 报告。
    /// 没有 in-flight 防护，重复触发会重复发起（已知可接受）。
    pub fn complete_task(&self, id: &str) {
        self.store.set_completed(
            id,
            StoreOp::Complete { id: id.to_string() },
            self.outcome_tx.clone(),
        );
    }

    /// 发起删除（调用方负责确认流程，未确认不应走到这里）
    pub fn delete_task(&self, id: &str) {
        self.store.delete(
            id,
            StoreOp::Delete { id: id.to_string() },
            self.outcome_tx.clone(),
        );
    }

    /// 未完成分区（保持快照顺序）
    pub fn incomplete(&self) -> Vec<&Task> {
        self.tasks.iter().filter(|t| !t.completed).collect()
    }

    /// 已完成分区（保持快照顺序）
    pub fn complete(&self) -> Vec<&Task> {
        self.tasks.iter().filter(|t| t.completed).collect()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn add_in_flight(&self) -> bool {
        self.add_in_flight
    }
}
