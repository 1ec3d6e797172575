//! 远端 store 的 WebSocket 客户端
//!
//! 连接后立即发送 subscribe，此后后台读循环把服务端推送分发到两类出口：
//! 全量快照 → 订阅者通道；ack/error → 按 seq 匹配挂起的变更操作。
//! 变更调用本身 fire-and-forget，没有超时；连接一直无响应则操作永远挂起，
//! 连接明确关闭时挂起操作以 connection closed 失败。

use std::collections::HashMap;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};

use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use url::Url;

use crate::error::{Result, TaskError};
use crate::model::{decode_snapshot, Task, TaskFields};
use crate::store::{OutcomeSender, StoreOp, StoreOutcome, Subscription, TaskStore};

/// 服务端推送帧
#[derive(Debug, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum ServerFrame {
    Snapshot {
        path: String,
        #[serde(default)]
        data: serde_json::Value,
    },
    Ack {
        seq: u64,
    },
    Error {
        seq: u64,
        message: String,
    },
}

struct Shared {
    /// seq → 挂起的变更操作
    pending: HashMap<u64, (StoreOp, OutcomeSender)>,
    next_seq: u64,
    /// 本地订阅者（sub id → 快照发送端）
    subscribers: HashMap<u64, mpsc::Sender<Vec<Task>>>,
    next_sub_id: u64,
    /// 最近一次收到的快照（新订阅者立即补发）
    last_snapshot: Option<Vec<Task>>,
}

/// WebSocket 任务 store 客户端
///
/// 进程级单例：启动时构造一次，注入 synchronizer，生命周期与应用一致。
pub struct RemoteStore {
    shared: Arc<Mutex<Shared>>,
    frame_tx: UnboundedSender<Message>,
    collection: String,
    /// 后台读写任务所在的 runtime，随 store 存活
    _runtime: tokio::runtime::Runtime,
}

impl RemoteStore {
    /// 连接远端 store 并订阅 `collection` 集合
    pub fn connect(endpoint: &str, collection: &str) -> Result<Self> {
        let url = Url::parse(endpoint)
            .map_err(|e| TaskError::config(format!("invalid endpoint '{}': {}", endpoint, e)))?;

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()?;

        let (ws, _response) = runtime
            .block_on(connect_async(url.as_str()))
            .map_err(|e| TaskError::connection(e.to_string()))?;
        let (mut sink, mut stream) = ws.split();

        let shared = Arc::new(Mutex::new(Shared {
            pending: HashMap::new(),
            next_seq: 0,
            subscribers: HashMap::new(),
            next_sub_id: 0,
            last_snapshot: None,
        }));

        let (frame_tx, mut frame_rx) = unbounded_channel::<Message>();

        // 写循环：把排队的帧送上连接
        runtime.spawn(async move {
            while let Some(frame) = frame_rx.recv().await {
                if sink.send(frame).await.is_err() {
                    break;
                }
            }
        });

        // 读循环：分发快照与 ack/error
        let reader_shared = shared.clone();
        let reader_collection = collection.to_string();
        runtime.spawn(async move {
            while let Some(frame) = stream.next().await {
                let msg = match frame {
                    Ok(msg) => msg,
                    Err(_) => break,
                };
                let text = match msg.into_text() {
                    Ok(text) => text,
                    Err(_) => continue,
                };
                dispatch_frame(&reader_shared, &reader_collection, text.as_str());
            }

            // 连接关闭：所有挂起操作以失败收尾
            let mut shared = match reader_shared.lock() {
                Ok(shared) => shared,
                Err(_) => return,
            };
            for (_, (op, done)) in shared.pending.drain() {
                let _ = done.send(StoreOutcome {
                    op,
                    result: Err(TaskError::connection("connection closed")),
                });
            }
        });

        // 订阅帧只发一次；之后服务端在每次集合变化时推送全量快照
        let subscribe = json!({ "op": "subscribe", "path": collection });
        frame_tx
            .send(Message::text(subscribe.to_string()))
            .map_err(|_| TaskError::connection("connection closed"))?;

        Ok(Self {
            shared,
            frame_tx,
            collection: collection.to_string(),
            _runtime: runtime,
        })
    }

    fn record_path(&self, id: &str) -> String {
        format!("{}/{}", self.collection, id)
    }

    /// 登记挂起操作并发送变更帧；发送失败立即回送 connection closed
    fn send_mutation(&self, frame: serde_json::Value, seq: u64, op: StoreOp, done: OutcomeSender) {
        {
            let mut shared = self.shared.lock().expect("remote store lock poisoned");
            shared.pending.insert(seq, (op.clone(), done.clone()));
        }

        if self
            .frame_tx
            .send(Message::text(frame.to_string()))
            .is_err()
        {
            let mut shared = self.shared.lock().expect("remote store lock poisoned");
            if let Some((op, done)) = shared.pending.remove(&seq) {
                let _ = done.send(StoreOutcome {
                    op,
                    result: Err(TaskError::connection("connection closed")),
                });
            }
        }
    }

    fn next_seq(&self) -> u64 {
        let mut shared = self.shared.lock().expect("remote store lock poisoned");
        let seq = shared.next_seq;
        shared.next_seq += 1;
        seq
    }
}

/// 解析并分发一帧服务端推送
fn dispatch_frame(shared: &Arc<Mutex<Shared>>, collection: &str, text: &str) {
    let frame: ServerFrame = match serde_json::from_str(text) {
        Ok(frame) => frame,
        // 无法识别的帧直接丢弃
        Err(_) => return,
    };

    match frame {
        ServerFrame::Snapshot { path, data } => {
            if path != collection {
                return;
            }
            let snapshot = match decode_snapshot(data) {
                Ok(snapshot) => snapshot,
                Err(_) => return,
            };
            let mut shared = match shared.lock() {
                Ok(shared) => shared,
                Err(_) => return,
            };
            shared.last_snapshot = Some(snapshot.clone());
            shared
                .subscribers
                .retain(|_, tx| tx.send(snapshot.clone()).is_ok());
        }
        ServerFrame::Ack { seq } => {
            resolve_pending(shared, seq, Ok(()));
        }
        ServerFrame::Error { seq, message } => {
            resolve_pending(shared, seq, Err(TaskError::store(message)));
        }
    }
}

fn resolve_pending(shared: &Arc<Mutex<Shared>>, seq: u64, result: Result<()>) {
    let entry = {
        let mut shared = match shared.lock() {
            Ok(shared) => shared,
            Err(_) => return,
        };
        shared.pending.remove(&seq)
    };
    if let Some((op, done)) = entry {
        let _ = done.send(StoreOutcome { op, result });
    }
}

impl TaskStore for RemoteStore {
    fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::channel();
        let sub_id;
        {
            let mut shared = self.shared.lock().expect("remote store lock poisoned");
            sub_id = shared.next_sub_id;
            shared.next_sub_id += 1;
            // 已有缓存快照则立即补发，保证订阅后马上有一帧
            if let Some(ref snapshot) = shared.last_snapshot {
                let _ = tx.send(snapshot.clone());
            }
            shared.subscribers.insert(sub_id, tx);
        }

        let shared = self.shared.clone();
        Subscription::new(
            rx,
            Box::new(move || {
                if let Ok(mut shared) = shared.lock() {
                    shared.subscribers.remove(&sub_id);
                }
            }),
        )
    }

    fn create(&self, id: &str, fields: &TaskFields, op: StoreOp, done: OutcomeSender) {
        let seq = self.next_seq();
        let frame = json!({
            "op": "create",
            "path": self.record_path(id),
            "fields": fields,
            "seq": seq,
        });
        self.send_mutation(frame, seq, op, done);
    }

    fn set_completed(&self, id: &str, op: StoreOp, done: OutcomeSender) {
        let seq = self.next_seq();
        let frame = json!({
            "op": "update",
            "path": self.record_path(id),
            "fields": { "completed": true },
            "seq": seq,
        });
        self.send_mutation(frame, seq, op, done);
    }

    fn delete(&self, id: &str, op: StoreOp, done: OutcomeSender) {
        let seq = self.next_seq();
        let frame = json!({
            "op": "delete",
            "path": self.record_path(id),
            "seq": seq,
        });
        self.send_mutation(frame, seq, op, done);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::net::TcpListener;
    use tokio_tungstenite::accept_async;

    /// 起一个最小协议服务端：subscribe → 推快照；create/delete → ack；
    /// update → error。返回 (runtime, 地址)。runtime 需在测试期间存活。
    fn spawn_test_server() -> (tokio::runtime::Runtime, String) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let listener = rt
            .block_on(TcpListener::bind("127.0.0.1:0"))
            .expect("bind test listener");
        let addr = listener.local_addr().unwrap();

        rt.spawn(async move {
            let (stream, _) = match listener.accept().await {
                Ok(conn) => conn,
                Err(_) => return,
            };
            let ws = match accept_async(stream).await {
                Ok(ws) => ws,
                Err(_) => return,
            };
            let (mut sink, mut stream) = ws.split();

            while let Some(Ok(msg)) = stream.next().await {
                let text = match msg.into_text() {
                    Ok(text) => text,
                    Err(_) => continue,
                };
                let frame: serde_json::Value = match serde_json::from_str(text.as_str()) {
                    Ok(frame) => frame,
                    Err(_) => continue,
                };

                let reply = match frame["op"].as_str() {
                    Some("subscribe") => json!({
                        "event": "snapshot",
                        "path": "tasks",
                        "data": {
                            "1700000000001": {
                                "name": "Buy milk",
                                "detail": "2%",
                                "completed": false,
                            },
                        },
                    }),
                    Some("create") | Some("delete") => {
                        json!({ "event": "ack", "seq": frame["seq"] })
                    }
                    Some("update") => json!({
                        "event": "error",
                        "seq": frame["seq"],
                        "message": "no task at that path",
                    }),
                    _ => continue,
                };

                if sink.send(Message::text(reply.to_string())).await.is_err() {
                    break;
                }
            }
        });

        (rt, format!("ws://{}", addr))
    }

    #[test]
    fn test_connect_rejects_invalid_endpoint() {
        let err = match RemoteStore::connect("not a url", "tasks") {
            Ok(_) => panic!("invalid endpoint must be rejected"),
            Err(err) => err,
        };
        assert!(matches!(err, TaskError::Config(_)));
    }

    #[test]
    fn test_subscribe_receives_server_snapshot() {
        let (_rt, endpoint) = spawn_test_server();
        let store = RemoteStore::connect(&endpoint, "tasks").unwrap();

        let sub = store.subscribe();
        let snapshot = sub
            .recv_timeout(Duration::from_secs(5))
            .expect("snapshot delivered");
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id, "1700000000001");
        assert_eq!(snapshot[0].name, "Buy milk");
    }

    #[test]
    fn test_create_resolves_with_ack() {
        let (_rt, endpoint) = spawn_test_server();
        let store = RemoteStore::connect(&endpoint, "tasks").unwrap();

        let (done, outcomes) = mpsc::channel();
        let fields = TaskFields {
            name: "Buy milk".to_string(),
            detail: "2%".to_string(),
            completed: false,
        };
        store.create(
            "1700000000002",
            &fields,
            StoreOp::Add {
                name: "Buy milk".to_string(),
            },
            done,
        );

        let outcome = outcomes.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(outcome.result.is_ok());
        assert_eq!(
            outcome.op,
            StoreOp::Add {
                name: "Buy milk".to_string()
            }
        );
    }

    #[test]
    fn test_update_error_carries_backend_message() {
        let (_rt, endpoint) = spawn_test_server();
        let store = RemoteStore::connect(&endpoint, "tasks").unwrap();

        let (done, outcomes) = mpsc::channel();
        store.set_completed(
            "404",
            StoreOp::Complete {
                id: "404".to_string(),
            },
            done,
        );

        let outcome = outcomes.recv_timeout(Duration::from_secs(5)).unwrap();
        let err = outcome.result.unwrap_err();
        assert_eq!(err.user_message(), "no task at that path");
    }
}
