use crate::game::{Card, PlayOutcome, Session, SessionState};
use crate::net::{ClientSender, EventReceiver, GameEvent, SharedLedger};
use crate::protocol::{ClientFrame, ServerFrame};
use log::{info, warn};
use std::collections::HashMap;

/// 伺服器狀態 - 單桌，game loop 獨佔
pub struct ServerState {
    /// 各座位的 sender
    clients: HashMap<u8, ClientSender>,
    /// 當前牌局
    session: Session,
    /// 座位帳本 (與 accept loop 共享)
    ledger: SharedLedger,
}

impl ServerState {
    fn new(ledger: SharedLedger) -> Self {
        Self {
            clients: HashMap::new(),
            session: Session::new(fresh_seed()),
            ledger,
        }
    }
}

/// 產生隨機 seed
fn fresh_seed() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(12345)
}

/// Game loop - 所有牌局狀態只在這條執行緒上變動
pub fn game_loop(event_rx: EventReceiver, ledger: SharedLedger) {
    let mut state = ServerState::new(ledger);

    info!("[GAME] Game loop started");

    for event in event_rx {
        match event {
            GameEvent::Connected { seat, sender } => {
                info!(
                    "[GAME] Seat {} connected (total: {})",
                    seat,
                    state.clients.len() + 1
                );
                state.clients.insert(seat, sender);
                if let Err(e) = state.session.occupy(seat) {
                    // 帳本只在 Lobby 放人，這裡失敗代表狀態不一致
                    warn!("[GAME] Seat {} could not be occupied: {:?}", seat, e);
                    state.clients.remove(&seat);
                    state.ledger.lock().unwrap().release(seat);
                }
            }

            GameEvent::Disconnected { seat } => {
                if state.clients.remove(&seat).is_none() {
                    continue;
                }
                state.ledger.lock().unwrap().release(seat);
                info!(
                    "[GAME] Seat {} disconnected (total: {})",
                    seat,
                    state.clients.len()
                );

                if state.session.state == SessionState::Lobby {
                    if let Err(e) = state.session.vacate(seat) {
                        warn!("[GAME] Seat {} vacate failed: {:?}", seat, e);
                    }
                } else {
                    // 開局後離線：整桌重置，倖存者保留座位並重新就緒
                    info!("[TABLE] Seat {} left mid-game, resetting table", seat);
                    reset_table(&mut state);
                }
            }

            GameEvent::Frame { seat, line } => {
                let frame = match ClientFrame::parse(&line) {
                    Ok(frame) => frame,
                    Err(e) => {
                        warn!("[GAME] Seat {} sent bad frame {:?}: {}", seat, line, e);
                        continue;
                    }
                };
                handle_frame(seat, frame, &mut state);
            }
        }
    }

    info!("[GAME] Game loop ended");
}

fn handle_frame(seat: u8, frame: ClientFrame, state: &mut ServerState) {
    match frame {
        ClientFrame::Ready { seat: frame_seat } => {
            if frame_seat != seat {
                warn!(
                    "[GAME] Seat {} sent ready for seat {}, ignoring",
                    seat, frame_seat
                );
                return;
            }
            handle_ready(seat, state);
        }
        ClientFrame::Play {
            seat: frame_seat,
            cards,
        } => {
            if frame_seat != seat {
                warn!(
                    "[GAME] Seat {} sent play for seat {}, ignoring",
                    seat, frame_seat
                );
                return;
            }
            handle_play(seat, cards, state);
        }
    }
}

fn handle_ready(seat: u8, state: &mut ServerState) {
    match state.session.mark_ready(seat) {
        Ok(true) => {
            info!("[TABLE] All seats ready, dealing");
            start_round(state);
        }
        Ok(false) => {
            info!("[TABLE] Seat {} ready", seat);
        }
        Err(e) => {
            warn!("[GAME] Seat {} ready rejected: {:?}", seat, e);
        }
    }
}

/// 發牌開局。訊息順序固定：
/// b → 底牌 (廣播) → 地主標記 (各座) → 手牌 (各座)
fn start_round(state: &mut ServerState) {
    if let Err(e) = state.session.deal() {
        warn!("[TABLE] Deal failed: {:?}", e);
        return;
    }

    broadcast(&state.clients, &ServerFrame::Begin);
    broadcast(&state.clients, &ServerFrame::Cards(state.session.hidden.clone()));

    let landlord = match state.session.choose_landlord() {
        Ok(landlord) => landlord,
        Err(e) => {
            warn!("[TABLE] Landlord selection failed: {:?}", e);
            return;
        }
    };
    info!("[TABLE] Seat {} is the landlord", landlord);

    for seat in state.session.occupied_seats() {
        send_to(&state.clients, seat, &ServerFrame::Landlord(seat == landlord));
    }
    for seat in state.session.occupied_seats() {
        if let Some(hand) = state.session.hand(seat) {
            send_to(&state.clients, seat, &ServerFrame::Cards(hand.to_vec()));
        }
    }
}

fn handle_play(seat: u8, cards: Vec<Card>, state: &mut ServerState) {
    match state.session.play(seat, &cards) {
        Ok(outcome) => {
            // 成立的出牌與過牌都原樣回播給三家
            broadcast(
                &state.clients,
                &ServerFrame::Play {
                    seat,
                    cards: cards.clone(),
                },
            );
            match outcome {
                PlayOutcome::Played { pattern, finished } => {
                    info!(
                        "[GAME] Seat {} plays {} as {:?}",
                        seat,
                        describe_cards(&cards),
                        pattern
                    );
                    if finished {
                        info!("[TABLE] Seat {} emptied their hand, round over", seat);
                        reset_table(state);
                    }
                }
                PlayOutcome::Passed { lead_cleared } => {
                    info!(
                        "[GAME] Seat {} passes{}",
                        seat,
                        if lead_cleared { ", lead cleared" } else { "" }
                    );
                }
            }
        }
        Err(e) => {
            // 非法出牌只記錄，不回話；輪次不前進
            warn!("[GAME] Seat {} play rejected: {:?}", seat, e);
        }
    }
}

/// 整桌重置：牌局物件整個換新，連線與座位保留，
/// 倖存者需重新送出就緒訊號。終局與中途離線走同一條路。
fn reset_table(state: &mut ServerState) {
    state.session = Session::new(fresh_seed());
    let mut seats: Vec<u8> = state.clients.keys().copied().collect();
    seats.sort_unstable();
    for seat in seats {
        if let Err(e) = state.session.occupy(seat) {
            warn!("[TABLE] Seat {} re-occupy failed: {:?}", seat, e);
        }
    }
    info!(
        "[TABLE] Table reset with {} seated, waiting for ready",
        state.clients.len()
    );
}

fn describe_cards(cards: &[Card]) -> String {
    cards
        .iter()
        .map(|c| c.label())
        .collect::<Vec<_>>()
        .join(" ")
}

fn send_to(clients: &HashMap<u8, ClientSender>, seat: u8, frame: &ServerFrame) {
    if let Some(sender) = clients.get(&seat) {
        if sender.send(frame.clone()).is_err() {
            warn!("[GAME] Failed to send to seat {}", seat);
        }
    }
}

fn broadcast(clients: &HashMap<u8, ClientSender>, frame: &ServerFrame) {
    let mut seats: Vec<u8> = clients.keys().copied().collect();
    seats.sort_unstable();
    for seat in seats {
        send_to(clients, seat, frame);
    }
}
