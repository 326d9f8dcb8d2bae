use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// 小王的點數序號
pub const RANK_JOKER_SMALL: u8 = 13;
/// 大王的點數序號
pub const RANK_JOKER_BIG: u8 = 14;
/// 「2」的點數序號 (點數 0..=12 對應 3,4,...,10,J,Q,K,A,2)
pub const RANK_TWO: u8 = 12;
/// 順子類牌型允許的最大點數 (A)
pub const MAX_RUN_RANK: u8 = 11;

/// 一副牌的總張數 (13 點 x 4 花色 + 雙王)
pub const DECK_SIZE: usize = 54;
/// 每個座位發到的牌數 (地主另外拿走 3 張底牌)
pub const CARDS_PER_SEAT: usize = 17;
/// 底牌張數
pub const HIDDEN_CARDS: usize = 3;

/// 花色 (王牌沒有真正的花色)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Suit {
    Heart,
    Spade,
    Club,
    Diamond,
    Joker,
}

impl Suit {
    pub fn all() -> [Suit; 4] {
        [Suit::Heart, Suit::Spade, Suit::Club, Suit::Diamond]
    }

    /// 線路編碼用的索引
    pub fn index(&self) -> u8 {
        match self {
            Suit::Heart => 0,
            Suit::Spade => 1,
            Suit::Club => 2,
            Suit::Diamond => 3,
            Suit::Joker => 4,
        }
    }

    pub fn from_index(i: u8) -> Option<Suit> {
        match i {
            0 => Some(Suit::Heart),
            1 => Some(Suit::Spade),
            2 => Some(Suit::Club),
            3 => Some(Suit::Diamond),
            4 => Some(Suit::Joker),
            _ => None,
        }
    }
}

/// 撲克牌。發出後不可變更。
/// 線路格式為 `[suit, rank]` 的二元陣列。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "(u8, u8)", try_from = "(u8, u8)")]
pub struct Card {
    pub suit: Suit,
    pub rank: u8,
}

impl Card {
    pub fn new(suit: Suit, rank: u8) -> Self {
        Self { suit, rank }
    }

    /// 點數符號 (供日誌輸出)
    pub fn label(&self) -> String {
        let rank = match self.rank {
            0..=7 => (self.rank + 3).to_string(),
            8 => "J".to_string(),
            9 => "Q".to_string(),
            10 => "K".to_string(),
            11 => "A".to_string(),
            12 => "2".to_string(),
            13 => return "joker".to_string(),
            _ => return "JOKER".to_string(),
        };
        let suit = match self.suit {
            Suit::Heart => 'H',
            Suit::Spade => 'S',
            Suit::Club => 'C',
            Suit::Diamond => 'D',
            Suit::Joker => '?',
        };
        format!("{}{}", suit, rank)
    }
}

impl From<Card> for (u8, u8) {
    fn from(card: Card) -> (u8, u8) {
        (card.suit.index(), card.rank)
    }
}

impl TryFrom<(u8, u8)> for Card {
    type Error = String;

    fn try_from((suit, rank): (u8, u8)) -> Result<Card, String> {
        let suit = Suit::from_index(suit).ok_or_else(|| format!("invalid suit index: {}", suit))?;
        if rank > RANK_JOKER_BIG {
            return Err(format!("invalid rank: {}", rank));
        }
        // 王牌沒有花色，一般牌點數不得超過 12
        let is_joker_rank = rank >= RANK_JOKER_SMALL;
        if is_joker_rank != (suit == Suit::Joker) {
            return Err(format!("suit/rank mismatch: ({:?}, {})", suit, rank));
        }
        Ok(Card { suit, rank })
    }
}

/// 牌組
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// 建立完整的 54 張牌
    pub fn new() -> Self {
        let mut cards = Vec::with_capacity(DECK_SIZE);
        for suit in Suit::all() {
            for rank in 0..=RANK_TWO {
                cards.push(Card::new(suit, rank));
            }
        }
        cards.push(Card::new(Suit::Joker, RANK_JOKER_SMALL));
        cards.push(Card::new(Suit::Joker, RANK_JOKER_BIG));
        Self { cards }
    }

    /// 使用 seed 洗牌 (確定性，便於重現牌局)
    pub fn shuffle(&mut self, seed: u64) {
        let mut rng = StdRng::seed_from_u64(seed);
        self.cards.shuffle(&mut rng);
    }

    /// 發牌：三家各 17 張，保留 3 張底牌
    pub fn deal(&self) -> ([Vec<Card>; 3], Vec<Card>) {
        let hands = [
            self.cards[0..CARDS_PER_SEAT].to_vec(),
            self.cards[CARDS_PER_SEAT..CARDS_PER_SEAT * 2].to_vec(),
            self.cards[CARDS_PER_SEAT * 2..CARDS_PER_SEAT * 3].to_vec(),
        ];
        let hidden = self.cards[CARDS_PER_SEAT * 3..].to_vec();
        (hands, hidden)
    }

    /// 取得所有牌
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }
}

impl Default for Deck {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_deck_has_54_cards() {
        let deck = Deck::new();
        assert_eq!(deck.cards().len(), DECK_SIZE);
    }

    #[test]
    fn test_deck_unique_cards() {
        let deck = Deck::new();
        let mut seen = HashSet::new();
        for card in deck.cards() {
            assert!(seen.insert(*card));
        }
    }

    #[test]
    fn test_deck_has_both_jokers() {
        let deck = Deck::new();
        assert!(deck
            .cards()
            .iter()
            .any(|c| c.suit == Suit::Joker && c.rank == RANK_JOKER_SMALL));
        assert!(deck
            .cards()
            .iter()
            .any(|c| c.suit == Suit::Joker && c.rank == RANK_JOKER_BIG));
    }

    #[test]
    fn test_deterministic_shuffle() {
        let mut deck1 = Deck::new();
        deck1.shuffle(12345);

        let mut deck2 = Deck::new();
        deck2.shuffle(12345);

        // 相同 seed 應該產生相同順序
        assert_eq!(deck1.cards(), deck2.cards());
    }

    #[test]
    fn test_different_seeds_different_order() {
        let mut deck1 = Deck::new();
        deck1.shuffle(12345);

        let mut deck2 = Deck::new();
        deck2.shuffle(67890);

        assert_ne!(deck1.cards(), deck2.cards());
    }

    #[test]
    fn test_deal_17_each_plus_hidden() {
        let mut deck = Deck::new();
        deck.shuffle(42);

        let (hands, hidden) = deck.deal();
        assert_eq!(hidden.len(), HIDDEN_CARDS);
        for hand in &hands {
            assert_eq!(hand.len(), CARDS_PER_SEAT);
        }

        // 三家手牌加底牌應恰好覆蓋整副牌
        let mut all: Vec<Card> = hands.iter().flatten().copied().collect();
        all.extend_from_slice(&hidden);
        let unique: HashSet<Card> = all.iter().copied().collect();
        assert_eq!(unique.len(), DECK_SIZE);
    }

    #[test]
    fn test_card_wire_tuple_roundtrip() {
        let card = Card::new(Suit::Spade, 5);
        let pair: (u8, u8) = card.into();
        assert_eq!(pair, (1, 5));
        assert_eq!(Card::try_from(pair).unwrap(), card);
    }

    #[test]
    fn test_card_wire_tuple_rejects_bad_values() {
        assert!(Card::try_from((9, 0)).is_err());
        assert!(Card::try_from((0, 15)).is_err());
        // 一般花色不能配王牌點數
        assert!(Card::try_from((0, 13)).is_err());
        // 王牌花色必須配王牌點數
        assert!(Card::try_from((4, 5)).is_err());
    }
}
