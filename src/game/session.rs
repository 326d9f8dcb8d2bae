use super::cards::{Card, Deck, CARDS_PER_SEAT, HIDDEN_CARDS};
use super::identifier::{identify, Pattern};
use super::judger::{compare, Verdict};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// 桌上的座位數
pub const SEAT_COUNT: usize = 3;

/// 牌局生命週期
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// 等待座位坐滿並全員就緒
    Lobby,
    /// 三家就緒，洗牌發牌中
    Dealing,
    /// 選定地主並交付底牌
    LandlordSelection,
    /// 輪流出牌
    Playing,
    /// 有人出完手牌，牌局終止
    Finished,
}

/// 座位上的玩家狀態
#[derive(Debug, Clone)]
pub struct Seat {
    pub id: u8,
    pub hand: Vec<Card>,
    pub is_landlord: bool,
    pub ready: bool,
}

impl Seat {
    fn new(id: u8) -> Self {
        Self {
            id,
            hand: Vec::new(),
            is_landlord: false,
            ready: false,
        }
    }
}

/// 出牌被拒原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayError {
    /// 牌局不在出牌階段
    NotPlaying,
    /// 未輪到該座位
    NotYourTurn,
    /// 出的牌不在手牌中
    NotInHand,
    /// 無法識別的牌型
    IllegalPattern,
    /// 壓不過當前領牌
    CannotBeat,
    /// 自由領牌時不得過牌
    PassNotAllowed,
}

/// 單次出牌的結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayOutcome {
    /// 出牌成立
    Played {
        pattern: Pattern,
        /// 該座位手牌已清空，牌局結束
        finished: bool,
    },
    /// 過牌
    Passed {
        /// 連續兩家過牌，領牌清空
        lead_cleared: bool,
    },
}

/// 座位操作錯誤
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    BadSeat,
    SeatTaken,
    SeatVacant,
    WrongState,
}

/// 單桌牌局。整個程序只有一桌，
/// 重置時整個物件重建，不做部分回收。
pub struct Session {
    pub state: SessionState,
    pub seats: [Option<Seat>; SEAT_COUNT],
    pub hidden: Vec<Card>,
    pub landlord_seat: Option<u8>,
    /// 當前輪到的座位 (1..=3)
    pub turn: u8,
    pub last_lead: Option<Pattern>,
    /// 領牌之後連續過牌的家數
    pub passes: u8,
    pub seed: u64,
}

impl Session {
    pub fn new(seed: u64) -> Self {
        Self {
            state: SessionState::Lobby,
            seats: [None, None, None],
            hidden: Vec::new(),
            landlord_seat: None,
            turn: 1,
            last_lead: None,
            passes: 0,
            seed,
        }
    }

    fn seat_index(seat: u8) -> Result<usize, SessionError> {
        if (1..=SEAT_COUNT as u8).contains(&seat) {
            Ok((seat - 1) as usize)
        } else {
            Err(SessionError::BadSeat)
        }
    }

    /// 座位入座 (僅限 Lobby)
    pub fn occupy(&mut self, seat: u8) -> Result<(), SessionError> {
        if self.state != SessionState::Lobby {
            return Err(SessionError::WrongState);
        }
        let idx = Self::seat_index(seat)?;
        if self.seats[idx].is_some() {
            return Err(SessionError::SeatTaken);
        }
        self.seats[idx] = Some(Seat::new(seat));
        Ok(())
    }

    /// 座位離席 (僅限 Lobby；開局後的離線走整桌重置)
    pub fn vacate(&mut self, seat: u8) -> Result<(), SessionError> {
        if self.state != SessionState::Lobby {
            return Err(SessionError::WrongState);
        }
        let idx = Self::seat_index(seat)?;
        if self.seats[idx].take().is_none() {
            return Err(SessionError::SeatVacant);
        }
        Ok(())
    }

    /// 標記座位就緒；三家全員就緒時進入 Dealing 並回傳 true
    pub fn mark_ready(&mut self, seat: u8) -> Result<bool, SessionError> {
        if self.state != SessionState::Lobby {
            return Err(SessionError::WrongState);
        }
        let idx = Self::seat_index(seat)?;
        match &mut self.seats[idx] {
            Some(s) => s.ready = true,
            None => return Err(SessionError::SeatVacant),
        }
        let all_ready = self
            .seats
            .iter()
            .all(|s| s.as_ref().map(|s| s.ready).unwrap_or(false));
        if all_ready {
            self.state = SessionState::Dealing;
        }
        Ok(all_ready)
    }

    /// 洗牌發牌：三家各 17 張，留 3 張底牌，進入 LandlordSelection
    pub fn deal(&mut self) -> Result<(), SessionError> {
        if self.state != SessionState::Dealing {
            return Err(SessionError::WrongState);
        }
        let mut deck = Deck::new();
        deck.shuffle(self.seed);
        let (hands, hidden) = deck.deal();
        for (idx, hand) in hands.into_iter().enumerate() {
            if let Some(seat) = &mut self.seats[idx] {
                seat.hand = hand;
                seat.hand.sort();
            }
        }
        self.hidden = hidden;
        self.state = SessionState::LandlordSelection;
        Ok(())
    }

    /// 抽選地主並交付底牌，地主先出；進入 Playing
    pub fn choose_landlord(&mut self) -> Result<u8, SessionError> {
        if self.state != SessionState::LandlordSelection {
            return Err(SessionError::WrongState);
        }
        let mut rng = StdRng::seed_from_u64(self.seed);
        let landlord = rng.gen_range(1..=SEAT_COUNT as u8);
        let idx = (landlord - 1) as usize;
        if let Some(seat) = &mut self.seats[idx] {
            seat.is_landlord = true;
            seat.hand.extend_from_slice(&self.hidden);
            seat.hand.sort();
        }
        self.landlord_seat = Some(landlord);
        self.turn = landlord;
        self.state = SessionState::Playing;
        Ok(landlord)
    }

    /// 當前輪到的座位
    pub fn current_seat(&self) -> Option<u8> {
        if self.state == SessionState::Playing {
            Some(self.turn)
        } else {
            None
        }
    }

    pub fn hand(&self, seat: u8) -> Option<&[Card]> {
        let idx = Self::seat_index(seat).ok()?;
        self.seats[idx].as_ref().map(|s| s.hand.as_slice())
    }

    pub fn occupied_seats(&self) -> Vec<u8> {
        self.seats
            .iter()
            .flatten()
            .map(|s| s.id)
            .collect()
    }

    /// 出牌或過牌 (空牌即過牌)。
    /// 出牌成立才更新領牌與手牌，被拒時不碰任何狀態。
    pub fn play(&mut self, seat: u8, cards: &[Card]) -> Result<PlayOutcome, PlayError> {
        if self.state != SessionState::Playing {
            return Err(PlayError::NotPlaying);
        }
        if seat != self.turn {
            return Err(PlayError::NotYourTurn);
        }

        if cards.is_empty() {
            // 自由領牌時必須出牌
            if self.last_lead.is_none() {
                return Err(PlayError::PassNotAllowed);
            }
            self.passes += 1;
            let lead_cleared = self.passes >= (SEAT_COUNT as u8 - 1);
            if lead_cleared {
                self.last_lead = None;
                self.passes = 0;
            }
            self.turn = next_seat(seat);
            return Ok(PlayOutcome::Passed { lead_cleared });
        }

        let idx = (seat - 1) as usize;
        let hand = match &self.seats[idx] {
            Some(s) => &s.hand,
            None => return Err(PlayError::NotPlaying),
        };
        let remaining = remove_cards(hand, cards).ok_or(PlayError::NotInHand)?;

        let pattern = identify(cards);
        if pattern == Pattern::None {
            return Err(PlayError::IllegalPattern);
        }
        if let Some(lead) = self.last_lead {
            if compare(lead, pattern) != Verdict::ChallengerWins {
                return Err(PlayError::CannotBeat);
            }
        }

        let finished = remaining.is_empty();
        if let Some(s) = &mut self.seats[idx] {
            s.hand = remaining;
        }
        self.last_lead = Some(pattern);
        self.passes = 0;
        if finished {
            self.state = SessionState::Finished;
        } else {
            self.turn = next_seat(seat);
        }
        Ok(PlayOutcome::Played { pattern, finished })
    }
}

/// 固定輪轉 1→2→3→1
fn next_seat(seat: u8) -> u8 {
    seat % SEAT_COUNT as u8 + 1
}

/// 以多重集合語意從手牌移除所出的牌；
/// 任何一張不在手牌中則整手拒絕。
fn remove_cards(hand: &[Card], played: &[Card]) -> Option<Vec<Card>> {
    let mut remaining = hand.to_vec();
    for card in played {
        let pos = remaining.iter().position(|c| c == card)?;
        remaining.swap_remove(pos);
    }
    remaining.sort();
    Some(remaining)
}
