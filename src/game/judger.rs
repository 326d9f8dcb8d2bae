use super::identifier::Pattern;

/// 牌型比較結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// 牌型不合法或與領牌不可比
    Illegal,
    /// 領牌較大，出牌被壓回
    LeadWins,
    /// 挑戰方較大，可以出牌
    ChallengerWins,
}

/// 比較領牌與挑戰牌型。
/// 王炸壓一切，炸彈壓所有非炸彈牌型；其餘牌型必須同種同長才可比。
/// 點數相同時判挑戰方勝 (挑戰方可平可升)。
pub fn compare(lead: Pattern, challenger: Pattern) -> Verdict {
    use Pattern::*;

    match (lead, challenger) {
        (None, _) | (_, None) => Verdict::Illegal,
        (Rocket, _) => Verdict::LeadWins,
        (_, Rocket) => Verdict::ChallengerWins,
        (Bomb(a), Bomb(b)) => beats(a, b),
        (Bomb(_), _) => Verdict::LeadWins,
        (_, Bomb(_)) => Verdict::ChallengerWins,
        (Single(a), Single(b)) | (Pair(a), Pair(b)) => beats(a, b),
        (Straight(la, ta), Straight(lb, tb))
        | (FullHouse(la, ta), FullHouse(lb, tb))
        | (PairStraight(la, ta), PairStraight(lb, tb)) => {
            if la != lb {
                Verdict::Illegal
            } else {
                beats(ta, tb)
            }
        }
        (Airplane(ua, ka, ta), Airplane(ub, kb, tb)) => {
            if ua != ub || ka != kb {
                Verdict::Illegal
            } else {
                beats(ta, tb)
            }
        }
        _ => Verdict::Illegal,
    }
}

fn beats(lead: u8, challenger: u8) -> Verdict {
    if challenger >= lead {
        Verdict::ChallengerWins
    } else {
        Verdict::LeadWins
    }
}
