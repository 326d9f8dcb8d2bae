use super::cards::{Card, MAX_RUN_RANK, RANK_JOKER_BIG, RANK_JOKER_SMALL, RANK_TWO};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 牌型。level 的形狀由變體完全決定：
/// 單張/對子/炸彈帶一個點數，順子/連對帶 [長度, 最大點數]，
/// 三帶帶 [張數, 三張點數]，飛機帶 [三張組數, 帶牌總數, 最大三張點數]，
/// 王炸與無效牌型不帶 level。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "level", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Pattern {
    None,
    Single(u8),
    Pair(u8),
    Bomb(u8),
    Straight(u8, u8),
    FullHouse(u8, u8),
    PairStraight(u8, u8),
    Airplane(u8, u8, u8),
    Rocket,
}

/// 牌型識別。無法歸類的序列一律回傳 `Pattern::None`，
/// 不向上層拋出任何錯誤。
pub fn identify(cards: &[Card]) -> Pattern {
    let n = cards.len();
    if n == 0 {
        return Pattern::None;
    }

    let mut points: Vec<u8> = cards.iter().map(|c| c.rank).collect();
    points.sort_unstable();

    let mut counts: BTreeMap<u8, usize> = BTreeMap::new();
    for &p in &points {
        *counts.entry(p).or_insert(0) += 1;
    }
    let species = counts.len();

    match n {
        1 => Pattern::Single(points[0]),
        2 => {
            if species == 1 {
                Pattern::Pair(points[0])
            } else if points == [RANK_JOKER_SMALL, RANK_JOKER_BIG] {
                Pattern::Rocket
            } else {
                Pattern::None
            }
        }
        3 => {
            // 光三張，不帶牌
            if species == 1 {
                Pattern::FullHouse(3, points[0])
            } else {
                Pattern::None
            }
        }
        4 => {
            if species == 1 {
                Pattern::Bomb(points[0])
            } else if species == 2 && points[1] == points[2] {
                // 3+1 拆分時中間兩張必屬於三張
                Pattern::FullHouse(4, points[1])
            } else {
                Pattern::None
            }
        }
        5 => {
            // 固定優先序：先驗三帶二，再驗順子
            if species == 2 {
                if points[1] == points[2] && points[2] == points[3] {
                    // 4+1 在五張裡不成牌
                    Pattern::None
                } else {
                    Pattern::FullHouse(5, points[2])
                }
            } else if species == 5 {
                identify_straight(&points)
            } else {
                Pattern::None
            }
        }
        _ => {
            if species == n {
                return identify_straight(&points);
            }
            if counts.values().all(|&v| v == 2) {
                return identify_pair_straight(&counts, n);
            }
            identify_airplane(&counts, n)
        }
    }
}

/// 順子：點數互異且連續，2 與王不得參與
fn identify_straight(points: &[u8]) -> Pattern {
    let top = points[points.len() - 1];
    if top > MAX_RUN_RANK {
        return Pattern::None;
    }
    for w in points.windows(2) {
        if w[1] != w[0] + 1 {
            return Pattern::None;
        }
    }
    Pattern::Straight(points.len() as u8, top)
}

/// 連對：每個點數恰出現兩次，點數連續，2 不得參與
fn identify_pair_straight(counts: &BTreeMap<u8, usize>, n: usize) -> Pattern {
    let mut prev: Option<u8> = None;
    let mut top = 0;
    for &rank in counts.keys() {
        if rank > MAX_RUN_RANK {
            return Pattern::None;
        }
        if let Some(p) = prev {
            if rank != p + 1 {
                return Pattern::None;
            }
        }
        prev = Some(rank);
        top = rank;
    }
    Pattern::PairStraight(n as u8, top)
}

/// 飛機：拆出所有同點三張作為機身，剩餘牌必須為空、
/// 每組帶一張單牌、或每組帶一個對子，其餘形狀不成牌。
fn identify_airplane(counts: &BTreeMap<u8, usize>, n: usize) -> Pattern {
    let mut units = 0usize;
    let mut top = 0u8;
    let mut rest: BTreeMap<u8, usize> = BTreeMap::new();

    for (&rank, &count) in counts {
        if count == 3 {
            // 三張 2 不得作機身
            if rank == RANK_TWO {
                return Pattern::None;
            }
            units += 1;
            if rank > top {
                top = rank;
            }
        } else {
            rest.insert(rank, count);
        }
    }
    if units == 0 {
        return Pattern::None;
    }

    let rest_len = n - units * 3;
    if rest_len == 0 {
        Pattern::Airplane(units as u8, 0, top)
    } else if rest_len == units {
        Pattern::Airplane(units as u8, rest_len as u8, top)
    } else if rest_len == units * 2 {
        if rest.values().all(|&v| v == 2) {
            Pattern::Airplane(units as u8, rest_len as u8, top)
        } else {
            Pattern::None
        }
    } else {
        Pattern::None
    }
}
