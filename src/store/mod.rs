//! Store 客户端契约
//!
//! 远端任务 store 是外部协作方：订阅得到全量快照流，变更操作返回
//! 延迟结果（deferred outcome）。本模块定义客户端侧的统一契约，
//! `remote` 为 WebSocket 实现，`memory` 为进程内实现（测试与 --local 模式）。

pub mod memory;
pub mod remote;

use std::sync::mpsc::{Receiver, Sender, TryRecvError};

use crate::error::Result;
use crate::model::{Task, TaskFields};

/// 已发起的变更操作标识（用于把 outcome 映射回用户动作）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOp {
    /// 新增任务
    Add { name: String },
    /// 标记完成
    Complete { id: String },
    /// 删除任务
    Delete { id: String },
}

/// 变更操作的终态结果
#[derive(Debug)]
pub struct StoreOutcome {
    pub op: StoreOp,
    pub result: Result<()>,
}

/// outcome 投递通道（UI 线程在事件循环里非阻塞排空）
pub type OutcomeSender = Sender<StoreOutcome>;

/// 集合订阅句柄
///
/// 持有期间持续收到全量快照（订阅时立即一次，之后每次集合变化一次，
/// 永不结束）。Drop 时解除监听，避免更新泄漏到已销毁的视图。
pub struct Subscription {
    rx: Receiver<Vec<Task>>,
    detach: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(rx: Receiver<Vec<Task>>, detach: Box<dyn FnOnce() + Send>) -> Self {
        Self {
            rx,
            detach: Some(detach),
        }
    }

    /// 非阻塞取下一个快照；通道断开也返回 None
    pub fn try_recv(&self) -> Option<Vec<Task>> {
        match self.rx.try_recv() {
            Ok(snapshot) => Some(snapshot),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// 阻塞等待下一个快照（测试用）
    #[cfg(test)]
    pub fn recv_timeout(&self, timeout: std::time::Duration) -> Option<Vec<Task>> {
        self.rx.recv_timeout(timeout).ok()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

/// 任务 store 的客户端契约
///
/// 三个变更操作都是 fire-and-forget：调用立即返回，终态结果经 `done`
/// 通道送回。没有超时、没有自动重试；连接一直不响应则操作永远挂起。
pub trait TaskStore: Send + Sync {
    /// 订阅整个任务集合
    fn subscribe(&self) -> Subscription;

    /// 在 `id` 下创建任务记录
    fn create(&self, id: &str, fields: &TaskFields, op: StoreOp, done: OutcomeSender);

    /// 部分更新：仅设置 `completed: true`，其余字段不动
    fn set_completed(&self, id: &str, op: StoreOp, done: OutcomeSender);

    /// 删除 `id` 对应的记录
    fn delete(&self, id: &str, op: StoreOp, done: OutcomeSender);
}
