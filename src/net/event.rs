use crate::protocol::ServerFrame;
use std::sync::mpsc;

/// 從 connection handler 傳送到 game loop 的事件
#[derive(Debug)]
pub enum GameEvent {
    /// 新座位連線建立
    Connected {
        seat: u8,
        sender: ClientSender,
    },

    /// 座位連線斷開
    Disconnected { seat: u8 },

    /// 收到該座位的一行原始幀
    Frame { seat: u8, line: String },
}

/// 用於發送幀給特定 client 的 sender
pub type ClientSender = mpsc::Sender<ServerFrame>;

/// 用於接收幀的 receiver (connection handler 持有)
pub type ClientReceiver = mpsc::Receiver<ServerFrame>;

/// 建立 client 的幀通道
pub fn create_client_channel() -> (ClientSender, ClientReceiver) {
    mpsc::channel()
}

/// Game event sender (connection handler 持有，發送事件到 game loop)
pub type EventSender = mpsc::Sender<GameEvent>;

/// Game event receiver (game loop 持有)
pub type EventReceiver = mpsc::Receiver<GameEvent>;

/// 建立 game event 通道
pub fn create_event_channel() -> (EventSender, EventReceiver) {
    mpsc::channel()
}
