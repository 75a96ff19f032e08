//! 活动进度通知
//!
//! 核心服务不依赖通知是否送达；处理器在状态迁移、抽奖、报名变更成功后调用
//! `EventNotifier::notify`，失败（如无订阅者）只记日志。

use crate::entities::EventStatus;
use serde::Serialize;
use tokio::sync::broadcast;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventUpdate {
    StatusChanged {
        status: EventStatus,
    },
    ParticipantRegistered {
        participant_id: i64,
        name: String,
    },
    ParticipantRemoved {
        participant_id: i64,
    },
    WinnerDrawn {
        winner_id: i64,
        participant_id: i64,
        participant_name: String,
        draw_order: i32,
    },
    EventDeleted,
}

/// 发送给某个活动房间的一条消息
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventMessage {
    pub event_id: i64,
    #[serde(flatten)]
    pub update: EventUpdate,
}

pub trait EventNotifier: Send + Sync {
    fn notify(&self, event_id: i64, update: EventUpdate);
}

/// 进程内广播：订阅者各自过滤关心的 event_id
#[derive(Clone)]
pub struct BroadcastNotifier {
    sender: broadcast::Sender<EventMessage>,
}

impl BroadcastNotifier {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EventMessage> {
        self.sender.subscribe()
    }
}

impl Default for BroadcastNotifier {
    fn default() -> Self {
        Self::new(256)
    }
}

impl EventNotifier for BroadcastNotifier {
    fn notify(&self, event_id: i64, update: EventUpdate) {
        let message = EventMessage { event_id, update };
        match self.sender.send(message) {
            Ok(receivers) => {
                log::debug!("Published update for event {event_id} to {receivers} subscriber(s)")
            }
            Err(broadcast::error::SendError(message)) => {
                log::debug!("No subscribers for event {event_id}, dropped {:?}", message.update)
            }
        }
    }
}

/// 将每条更新序列化后写入日志
#[derive(Clone, Default)]
pub struct LogNotifier;

impl EventNotifier for LogNotifier {
    fn notify(&self, event_id: i64, update: EventUpdate) {
        let message = EventMessage { event_id, update };
        match serde_json::to_string(&message) {
            Ok(payload) => log::info!("Event update: {payload}"),
            Err(e) => log::warn!("Failed to serialize update for event {event_id}: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscribers_receive_updates() {
        let notifier = BroadcastNotifier::default();
        let mut rx = notifier.subscribe();

        notifier.notify(
            7,
            EventUpdate::StatusChanged {
                status: EventStatus::Drawing,
            },
        );

        let message = rx.recv().await.unwrap();
        assert_eq!(message.event_id, 7);
        assert_eq!(
            message.update,
            EventUpdate::StatusChanged {
                status: EventStatus::Drawing
            }
        );
    }

    #[test]
    fn test_notify_without_subscribers_does_not_fail() {
        let notifier = BroadcastNotifier::new(4);
        notifier.notify(1, EventUpdate::EventDeleted);
    }

    #[test]
    fn test_log_notifier_accepts_every_update() {
        let notifier: Box<dyn EventNotifier> = Box::new(LogNotifier);
        notifier.notify(2, EventUpdate::ParticipantRemoved { participant_id: 5 });
        notifier.notify(2, EventUpdate::EventDeleted);
    }

    #[test]
    fn test_message_wire_format() {
        let message = EventMessage {
            event_id: 3,
            update: EventUpdate::WinnerDrawn {
                winner_id: 10,
                participant_id: 4,
                participant_name: "Alice".into(),
                draw_order: 2,
            },
        };
        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["event_id"], 3);
        assert_eq!(value["type"], "winner_drawn");
        assert_eq!(value["participant_name"], "Alice");
        assert_eq!(value["draw_order"], 2);
    }
}
