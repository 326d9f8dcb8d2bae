use super::event::{ClientReceiver, ClientSender, EventSender, GameEvent, create_client_channel};
use crate::protocol::Codec;
use log::{info, warn};
use std::io;
use std::sync::mpsc::TryRecvError;
use std::thread;
use std::time::{Duration, Instant};

/// 就緒握手時限：首幀逾時即斷線，桌局不受影響
pub const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection handler - 處理單一座位連線的讀寫
pub struct ConnectionHandler {
    seat: u8,
    codec: Codec,
    event_tx: EventSender,
    client_rx: ClientReceiver,
    handshake_timeout: Duration,
}

impl ConnectionHandler {
    /// 建立新的 connection handler (codec 已完成入座回報)
    pub fn new(
        seat: u8,
        codec: Codec,
        event_tx: EventSender,
        handshake_timeout: Duration,
    ) -> io::Result<(Self, ClientSender)> {
        let (client_tx, client_rx) = create_client_channel();

        let handler = Self {
            seat,
            codec,
            event_tx,
            client_rx,
            handshake_timeout,
        };

        Ok((handler, client_tx))
    }

    /// 執行 handler 主迴圈
    pub fn run(mut self) {
        let connected_at = Instant::now();
        let mut received_any = false;

        loop {
            match self.codec.read_line() {
                Ok(Some(line)) => {
                    received_any = true;

                    // 發送事件到 game loop
                    if self
                        .event_tx
                        .send(GameEvent::Frame {
                            seat: self.seat,
                            line,
                        })
                        .is_err()
                    {
                        warn!("[HANDLER] Seat {} event channel closed", self.seat);
                        break;
                    }
                }
                Ok(None) => {
                    // EOF - 連線關閉
                    info!("[HANDLER] Seat {} EOF", self.seat);
                    break;
                }
                Err(e) => {
                    // 區分 timeout 和其他錯誤
                    if e.kind() == io::ErrorKind::WouldBlock || e.kind() == io::ErrorKind::TimedOut
                    {
                        // 首幀握手逾時則放棄該連線
                        if !received_any && connected_at.elapsed() > self.handshake_timeout {
                            warn!(
                                "[HANDLER] Seat {} handshake timeout, dropping connection",
                                self.seat
                            );
                            break;
                        }
                    } else {
                        warn!("[HANDLER] Seat {} read error: {}", self.seat, e);
                        break;
                    }
                }
            }

            // 檢查是否有要發送給 client 的幀
            loop {
                match self.client_rx.try_recv() {
                    Ok(frame) => {
                        if let Err(e) = self.codec.send_frame(&frame) {
                            warn!("[HANDLER] Seat {} send error: {}", self.seat, e);
                            break;
                        }
                    }
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        // game loop 已放棄該座位，結束連線
                        info!("[HANDLER] Seat {} client channel closed", self.seat);
                        let _ = self.event_tx.send(GameEvent::Disconnected { seat: self.seat });
                        return;
                    }
                }
            }
        }

        // 通知 game loop 連線已斷開
        let _ = self.event_tx.send(GameEvent::Disconnected { seat: self.seat });
    }
}

/// 在新執行緒中啟動 connection handler
pub fn spawn_handler(
    seat: u8,
    codec: Codec,
    event_tx: EventSender,
    handshake_timeout: Duration,
) -> io::Result<ClientSender> {
    let (handler, client_tx) =
        ConnectionHandler::new(seat, codec, event_tx.clone(), handshake_timeout)?;

    // 發送 Connected 事件
    let sender_for_event = client_tx.clone();
    if event_tx
        .send(GameEvent::Connected {
            seat,
            sender: sender_for_event,
        })
        .is_err()
    {
        return Err(io::Error::new(
            io::ErrorKind::BrokenPipe,
            "Event channel closed",
        ));
    }

    // 啟動 handler 執行緒
    thread::spawn(move || {
        handler.run();
    });

    Ok(client_tx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::event::create_event_channel;
    use std::io::Read;
    use std::net::{TcpListener, TcpStream};

    #[test]
    fn test_idle_connection_dropped_at_handshake_deadline() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let client = TcpStream::connect(addr).unwrap();
        let (stream, _) = listener.accept().unwrap();
        stream
            .set_read_timeout(Some(Duration::from_millis(50)))
            .unwrap();
        let codec = Codec::new(stream).unwrap();

        let (event_tx, event_rx) = create_event_channel();
        let started = Instant::now();
        spawn_handler(1, codec, event_tx, Duration::from_millis(200)).unwrap();

        // 入座事件的 sender 要拿著，不能讓通道提前關閉
        let keep_alive = match event_rx.recv_timeout(Duration::from_secs(2)).unwrap() {
            GameEvent::Connected { seat, sender } => {
                assert_eq!(seat, 1);
                sender
            }
            other => panic!("Unexpected event: {:?}", other),
        };

        // client 首幀遲遲不到，時限一到就收到斷線事件
        match event_rx.recv_timeout(Duration::from_secs(2)).unwrap() {
            GameEvent::Disconnected { seat } => assert_eq!(seat, 1),
            other => panic!("Unexpected event: {:?}", other),
        }
        assert!(started.elapsed() >= Duration::from_millis(200));
        drop(keep_alive);

        // 伺服器端已關閉連線，client 讀到 EOF
        let mut client = client;
        client
            .set_read_timeout(Some(Duration::from_secs(2)))
            .unwrap();
        let mut buf = [0u8; 8];
        assert_eq!(client.read(&mut buf).unwrap(), 0);
    }
}
