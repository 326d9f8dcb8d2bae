use crate::game::{Card, Pattern};

/// 把牌列編成 `[[suit,rank],...]` 的 JSON 字串
pub fn encode_cards(cards: &[Card]) -> String {
    let pairs: Vec<String> = cards
        .iter()
        .map(|c| format!("[{},{}]", c.suit.index(), c.rank))
        .collect();
    format!("[{}]", pairs.join(","))
}

/// 解析 `[[suit,rank],...]` 的 JSON 牌列，非法花色/點數組合直接拒絕
pub fn decode_cards(payload: &str) -> serde_json::Result<Vec<Card>> {
    serde_json::from_str(payload)
}

/// 把牌型編成 `{"kind":...,"level":...}` 的 JSON 字串
pub fn encode_pattern(pattern: &Pattern) -> serde_json::Result<String> {
    serde_json::to_string(pattern)
}

/// 解析牌型 JSON
pub fn decode_pattern(payload: &str) -> serde_json::Result<Pattern> {
    serde_json::from_str(payload)
}
