//! 任务数据模型
//!
//! Task 是唯一实体。`id` 在创建时由毫秒时间戳生成，之后不可变；
//! `name`/`detail` 创建后不可变；`completed` 只允许 false → true 单向转换
//! （转换本身由 store 的 partial update 执行，本地不做状态机校验）。

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// 任务在 store 中的字段（不含 key）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFields {
    pub name: String,
    pub detail: String,
    #[serde(default)]
    pub completed: bool,
}

/// 本地视图中的任务（key + 字段）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: String,
    pub name: String,
    pub detail: String,
    pub completed: bool,
}

impl Task {
    pub fn from_fields(id: impl Into<String>, fields: TaskFields) -> Self {
        Self {
            id: id.into(),
            name: fields.name,
            detail: fields.detail,
            completed: fields.completed,
        }
    }
}

/// 上一次生成的 id，保证进程内单调递增
static LAST_ID_MILLIS: AtomicI64 = AtomicI64::new(0);

/// 生成新任务 id（当前 UTC 毫秒时间戳）
///
/// 单用户交互场景下足够唯一；多客户端同毫秒并发写入时可能碰撞，
/// 属于已知弱不变量。进程内通过单调递增兜底，避免同毫秒连续提交。
pub fn generate_task_id() -> String {
    let now = Utc::now().timestamp_millis();
    let id = LAST_ID_MILLIS
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
            Some(now.max(last + 1))
        })
        .map(|last| now.max(last + 1))
        .unwrap_or(now);
    id.to_string()
}

/// 解码 store 推送的全量快照
///
/// 快照是 id → 字段对象 的 JSON object；空集合以 `null` 或 `{}` 表示。
/// 按 key 顺序展开为有序列表（毫秒时间戳 key 等宽时字典序即创建顺序）。
pub fn decode_snapshot(data: serde_json::Value) -> Result<Vec<Task>> {
    if data.is_null() {
        return Ok(Vec::new());
    }

    let map: BTreeMap<String, TaskFields> = serde_json::from_value(data)?;
    Ok(map
        .into_iter()
        .map(|(id, fields)| Task::from_fields(id, fields))
        .collect())
}
