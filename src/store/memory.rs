//! 进程内 store 实现
//!
//! 与 remote 实现同一契约：有序集合 + 每次变更后向所有订阅者广播全量快照。
//! 用于单元测试和 `--local` 演示模式；支持故障注入以测试失败路径。

use std::collections::{BTreeMap, HashMap};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};

use crate::error::TaskError;
use crate::model::{Task, TaskFields};
use crate::store::{OutcomeSender, StoreOp, StoreOutcome, Subscription, TaskStore};

struct Inner {
    /// id → 字段。毫秒时间戳 key 在 BTreeMap 中按创建顺序迭代。
    tasks: BTreeMap<String, TaskFields>,
    /// 订阅者（sub id → 快照发送端）
    subscribers: HashMap<u64, mpsc::Sender<Vec<Task>>>,
    next_sub_id: u64,
    /// 注入的故障：下一次变更操作以该消息失败
    fail_next: Option<String>,
}

impl Inner {
    fn snapshot(&self) -> Vec<Task> {
        self.tasks
            .iter()
            .map(|(id, fields)| Task::from_fields(id.clone(), fields.clone()))
            .collect()
    }
}

/// 进程内任务 store
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                tasks: BTreeMap::new(),
                subscribers: HashMap::new(),
                next_sub_id: 0,
                fail_next: None,
            })),
        }
    }

    /// 注入一次故障：下一个变更操作将以 `message` 失败，不改动集合
    pub fn fail_next_operation(&self, message: impl Into<String>) {
        let mut inner = self.inner.lock().expect("memory store lock poisoned");
        inner.fail_next = Some(message.into());
    }

    fn broadcast(inner: &mut Inner) {
        let snapshot = inner.snapshot();
        inner
            .subscribers
            .retain(|_, tx| tx.send(snapshot.clone()).is_ok());
    }

    fn mutate(
        &self,
        op: StoreOp,
        done: OutcomeSender,
        apply: impl FnOnce(&mut Inner) -> crate::error::Result<()>,
    ) {
        let mut inner = self.inner.lock().expect("memory store lock poisoned");

        if let Some(message) = inner.fail_next.take() {
            let _ = done.send(StoreOutcome {
                op,
                result: Err(TaskError::store(message)),
            });
            return;
        }

        let result = apply(&mut inner);
        if result.is_ok() {
            Self::broadcast(&mut inner);
        }
        let _ = done.send(StoreOutcome { op, result });
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskStore for MemoryStore {
    fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::channel();
        let sub_id;
        {
            let mut inner = self.inner.lock().expect("memory store lock poisoned");
            sub_id = inner.next_sub_id;
            inner.next_sub_id += 1;
            // 订阅时立即投递当前快照
            let _ = tx.send(inner.snapshot());
            inner.subscribers.insert(sub_id, tx);
        }

        let store = self.inner.clone();
        Subscription::new(
            rx,
            Box::new(move || {
                if let Ok(mut inner) = store.lock() {
                    inner.subscribers.remove(&sub_id);
                }
            }),
        )
    }

    fn create(&self, id: &str, fields: &TaskFields, op: StoreOp, done: OutcomeSender) {
        let id = id.to_string();
        let fields = fields.clone();
        self.mutate(op, done, move |inner| {
            // set 语义：同 key 重复写入直接覆盖（last-write-wins）
            inner.tasks.insert(id, fields);
            Ok(())
        });
    }

    fn set_completed(&self, id: &str, op: StoreOp, done: OutcomeSender) {
        let id = id.to_string();
        self.mutate(op, done, move |inner| match inner.tasks.get_mut(&id) {
            Some(fields) => {
                fields.completed = true;
                Ok(())
            }
            None => Err(TaskError::not_found(format!("no task at tasks/{}", id))),
        });
    }

    fn delete(&self, id: &str, op: StoreOp, done: OutcomeSender) {
        let id = id.to_string();
        self.mutate(op, done, move |inner| {
            // 删除不存在的 key 静默成功（与远端 remove 语义一致）
            inner.tasks.remove(&id);
            Ok(())
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn fields(name: &str, detail: &str) -> TaskFields {
        TaskFields {
            name: name.to_string(),
            detail: detail.to_string(),
            completed: false,
        }
    }

    fn outcome_channel() -> (OutcomeSender, mpsc::Receiver<StoreOutcome>) {
        mpsc::channel()
    }

    #[test]
    fn test_subscribe_delivers_initial_snapshot() {
        let store = MemoryStore::new();
        let sub = store.subscribe();

        let snapshot = sub.recv_timeout(Duration::from_secs(1)).unwrap();
        assert!(snapshot.is_empty());
    }

    #[test]
    fn test_create_broadcasts_to_subscribers() {
        let store = MemoryStore::new();
        let sub = store.subscribe();
        let _ = sub.recv_timeout(Duration::from_secs(1)).unwrap();

        let (done, outcomes) = outcome_channel();
        store.create(
            "1700000000001",
            &fields("Buy milk", "2%"),
            StoreOp::Add {
                name: "Buy milk".to_string(),
            },
            done,
        );

        let outcome = outcomes.recv_timeout(Duration::from_secs(1)).unwrap();
        assert!(outcome.result.is_ok());

        let snapshot = sub.recv_timeout(Duration::from_secs(1)).unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].name, "Buy milk");
        assert!(!snapshot[0].completed);
    }

    #[test]
    fn test_set_completed_on_missing_id_fails() {
        let store = MemoryStore::new();
        let (done, outcomes) = outcome_channel();

        store.set_completed(
            "404",
            StoreOp::Complete {
                id: "404".to_string(),
            },
            done,
        );

        let outcome = outcomes.recv_timeout(Duration::from_secs(1)).unwrap();
        let err = outcome.result.unwrap_err();
        assert!(err.user_message().contains("no task at tasks/404"));
    }

    #[test]
    fn test_delete_missing_id_succeeds_silently() {
        let store = MemoryStore::new();
        let (done, outcomes) = outcome_channel();

        store.delete(
            "404",
            StoreOp::Delete {
                id: "404".to_string(),
            },
            done,
        );

        let outcome = outcomes.recv_timeout(Duration::from_secs(1)).unwrap();
        assert!(outcome.result.is_ok());
    }

    #[test]
    fn test_fail_next_operation_leaves_collection_unchanged() {
        let store = MemoryStore::new();
        let sub = store.subscribe();
        let _ = sub.recv_timeout(Duration::from_secs(1)).unwrap();

        store.fail_next_operation("permission denied");

        let (done, outcomes) = outcome_channel();
        store.create(
            "1",
            &fields("x", "y"),
            StoreOp::Add {
                name: "x".to_string(),
            },
            done,
        );

        let outcome = outcomes.recv_timeout(Duration::from_secs(1)).unwrap();
        assert_eq!(
            outcome.result.unwrap_err().user_message(),
            "permission denied"
        );
        // 失败不广播：没有新的快照
        assert!(sub.recv_timeout(Duration::from_millis(100)).is_none());

        // 故障只注入一次，下一个操作恢复正常
        let (done, outcomes) = outcome_channel();
        store.create(
            "1",
            &fields("x", "y"),
            StoreOp::Add {
                name: "x".to_string(),
            },
            done,
        );
        assert!(outcomes
            .recv_timeout(Duration::from_secs(1))
            .unwrap()
            .result
            .is_ok());
    }

    #[test]
    fn test_dropped_subscription_detaches() {
        let store = MemoryStore::new();
        let sub = store.subscribe();
        drop(sub);

        // 解除监听后广播不会 panic，也没有订阅者残留
        let (done, outcomes) = outcome_channel();
        store.create(
            "1",
            &fields("x", "y"),
            StoreOp::Add {
                name: "x".to_string(),
            },
            done,
        );
        assert!(outcomes
            .recv_timeout(Duration::from_secs(1))
            .unwrap()
            .result
            .is_ok());

        let inner = store.inner.lock().unwrap();
        assert!(inner.subscribers.is_empty());
    }
}
