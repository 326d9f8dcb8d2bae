use super::wire::{decode_cards, encode_cards};
use crate::game::Card;
use std::fmt;

/// 客戶端到伺服器的幀
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientFrame {
    /// 就緒訊號：座位數字一行
    Ready { seat: u8 },
    /// 出牌：`<seat> <牌列JSON>`，空牌列即過牌
    Play { seat: u8, cards: Vec<Card> },
}

/// 伺服器到客戶端的幀
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerFrame {
    /// 入座回報：座位數字
    Seat(u8),
    /// 滿座拒絕
    Full,
    /// 三家就緒，開始訊號
    Begin,
    /// 牌列 (底牌或手牌)
    Cards(Vec<Card>),
    /// 地主身分標記
    Landlord(bool),
    /// 出牌回播
    Play { seat: u8, cards: Vec<Card> },
}

/// 幀解析錯誤。解析失敗視同非法出牌，不中斷連線。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    Empty,
    BadSeat,
    BadPayload,
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FrameError::Empty => write!(f, "empty frame"),
            FrameError::BadSeat => write!(f, "bad seat digit"),
            FrameError::BadPayload => write!(f, "bad card payload"),
        }
    }
}

fn parse_seat(token: &str) -> Result<u8, FrameError> {
    match token.parse::<u8>() {
        Ok(seat) if (1..=3).contains(&seat) => Ok(seat),
        _ => Err(FrameError::BadSeat),
    }
}

impl ClientFrame {
    /// 解析一行客戶端幀 (不含換行)
    pub fn parse(line: &str) -> Result<ClientFrame, FrameError> {
        let line = line.trim();
        if line.is_empty() {
            return Err(FrameError::Empty);
        }
        match line.split_once(' ') {
            None => Ok(ClientFrame::Ready {
                seat: parse_seat(line)?,
            }),
            Some((seat, payload)) => {
                let seat = parse_seat(seat)?;
                let cards =
                    decode_cards(payload.trim()).map_err(|_| FrameError::BadPayload)?;
                Ok(ClientFrame::Play { seat, cards })
            }
        }
    }
}

impl ServerFrame {
    /// 編碼為單行字串 (不含換行，由 codec 補上)
    pub fn encode(&self) -> String {
        match self {
            ServerFrame::Seat(seat) => seat.to_string(),
            ServerFrame::Full => "f".to_string(),
            ServerFrame::Begin => "b".to_string(),
            ServerFrame::Cards(cards) => encode_cards(cards),
            ServerFrame::Landlord(true) => "1".to_string(),
            ServerFrame::Landlord(false) => "0".to_string(),
            ServerFrame::Play { seat, cards } => format!("{} {}", seat, encode_cards(cards)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Suit;

    #[test]
    fn test_parse_ready() {
        assert_eq!(ClientFrame::parse("2"), Ok(ClientFrame::Ready { seat: 2 }));
        assert_eq!(ClientFrame::parse("3\n"), Ok(ClientFrame::Ready { seat: 3 }));
    }

    #[test]
    fn test_parse_ready_rejects_bad_seat() {
        assert_eq!(ClientFrame::parse("0"), Err(FrameError::BadSeat));
        assert_eq!(ClientFrame::parse("4"), Err(FrameError::BadSeat));
        assert_eq!(ClientFrame::parse("x"), Err(FrameError::BadSeat));
    }

    #[test]
    fn test_parse_play() {
        let frame = ClientFrame::parse("1 [[0,5],[1,5]]").unwrap();
        assert_eq!(
            frame,
            ClientFrame::Play {
                seat: 1,
                cards: vec![Card::new(Suit::Heart, 5), Card::new(Suit::Spade, 5)],
            }
        );
    }

    #[test]
    fn test_parse_pass() {
        let frame = ClientFrame::parse("2 []").unwrap();
        assert_eq!(frame, ClientFrame::Play { seat: 2, cards: vec![] });
    }

    #[test]
    fn test_parse_play_rejects_garbage() {
        assert_eq!(ClientFrame::parse("1 [[0,99]]"), Err(FrameError::BadPayload));
        assert_eq!(ClientFrame::parse("1 hello"), Err(FrameError::BadPayload));
        assert_eq!(ClientFrame::parse(""), Err(FrameError::Empty));
    }

    #[test]
    fn test_server_frame_encoding() {
        assert_eq!(ServerFrame::Seat(1).encode(), "1");
        assert_eq!(ServerFrame::Full.encode(), "f");
        assert_eq!(ServerFrame::Begin.encode(), "b");
        assert_eq!(ServerFrame::Landlord(true).encode(), "1");
        assert_eq!(ServerFrame::Landlord(false).encode(), "0");
        assert_eq!(
            ServerFrame::Play {
                seat: 3,
                cards: vec![Card::new(Suit::Club, 4)]
            }
            .encode(),
            "3 [[2,4]]"
        );
    }

    #[test]
    fn test_play_echo_parses_back() {
        // 回播幀與客戶端出牌幀同形
        let cards = vec![Card::new(Suit::Heart, 8), Card::new(Suit::Spade, 8)];
        let echoed = ServerFrame::Play { seat: 2, cards: cards.clone() }.encode();
        assert_eq!(
            ClientFrame::parse(&echoed),
            Ok(ClientFrame::Play { seat: 2, cards })
        );
    }
}
