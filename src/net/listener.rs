use super::event::EventSender;
use super::handler::{spawn_handler, HANDSHAKE_TIMEOUT};
use crate::protocol::{Codec, ServerFrame};
use log::{error, info, warn};
use socket2::{Domain, Protocol, Socket, Type};
use std::io;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const DEFAULT_BACKLOG: i32 = 128;

/// 讀取輪詢間隔，讓 handler 能穿插送出幀
const READ_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// 使用 socket2 建立 TCP listener，展示 POSIX socket API 對應
pub fn create_tcp_listener(addr: SocketAddr) -> io::Result<TcpListener> {
    // socket() - 建立 socket
    let socket = Socket::new(Domain::IPV4, Type::STREAM, Some(Protocol::TCP))?;

    // setsockopt(SO_REUSEADDR) - 允許重複使用位址
    socket.set_reuse_address(true)?;

    // bind() - 綁定位址
    socket.bind(&addr.into())?;

    // listen() - 開始監聽，設定 backlog
    socket.listen(DEFAULT_BACKLOG)?;

    let listener: TcpListener = socket.into();

    Ok(listener)
}

/// 座位帳本 - 管理 3 個座位的佔用。
/// 多條連線可能同時到達，計數必須在鎖下進出。
pub struct SeatLedger {
    taken: [bool; 3],
}

impl SeatLedger {
    pub fn new() -> Self {
        Self {
            taken: [false; 3],
        }
    }

    /// 按到達順序取得最小的空位 (1..=3)，滿座回傳 None
    pub fn acquire(&mut self) -> Option<u8> {
        for (idx, taken) in self.taken.iter_mut().enumerate() {
            if !*taken {
                *taken = true;
                return Some(idx as u8 + 1);
            }
        }
        None
    }

    /// 釋放座位
    pub fn release(&mut self, seat: u8) {
        if (1..=3).contains(&seat) {
            self.taken[(seat - 1) as usize] = false;
        }
    }

    /// 佔用中的座位數
    pub fn count(&self) -> usize {
        self.taken.iter().filter(|&&t| t).count()
    }
}

impl Default for SeatLedger {
    fn default() -> Self {
        Self::new()
    }
}

/// 執行緒安全的座位帳本
pub type SharedLedger = Arc<Mutex<SeatLedger>>;

/// 建立共享的座位帳本
pub fn create_shared_ledger() -> SharedLedger {
    Arc::new(Mutex::new(SeatLedger::new()))
}

/// Accept 迴圈：入座或以 "f" 拒絕
pub fn accept_loop(listener: TcpListener, ledger: SharedLedger, event_tx: EventSender) {
    for stream in listener.incoming() {
        match stream {
            Ok(stream) => {
                if let Err(e) = admit(stream, &ledger, &event_tx) {
                    warn!("[ACCEPT] Failed to admit connection: {}", e);
                }
            }
            Err(e) => {
                error!("[ACCEPT] Accept error: {}", e);
            }
        }
    }
}

/// 處理單一到達的連線：滿座即拒，否則回報座位並啟動 handler
fn admit(stream: TcpStream, ledger: &SharedLedger, event_tx: &EventSender) -> io::Result<()> {
    stream.set_read_timeout(Some(READ_POLL_INTERVAL))?;
    let mut codec = Codec::new(stream)?;
    let peer_addr = codec
        .peer_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    let seat = {
        let mut ledger = ledger.lock().unwrap();
        ledger.acquire()
    };

    let seat = match seat {
        Some(seat) => seat,
        None => {
            // 滿座：送出 "f" 後立即關閉
            warn!("[ACCEPT] Table full, refusing {}", peer_addr);
            codec.send_frame(&ServerFrame::Full)?;
            return Ok(());
        }
    };

    info!("[ACCEPT] {} admitted as seat {}", peer_addr, seat);
    codec.send_frame(&ServerFrame::Seat(seat))?;

    if let Err(e) = spawn_handler(seat, codec, event_tx.clone(), HANDSHAKE_TIMEOUT) {
        // handler 起不來則歸還座位
        ledger.lock().unwrap().release(seat);
        return Err(e);
    }
    Ok(())
}
