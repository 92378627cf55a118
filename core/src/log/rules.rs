//! Named marker rules and the per-line facts derived from them.

use memchr::{memchr, memmem};

use super::zone_line::{ZoneChange, parse_zone_change};
use crate::error::LineError;

/// A named pattern rule. Each marker is a set of needles searched in the
/// upper-cased line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Marker {
    /// A new match is being created.
    NewMatch,
    /// Generic game-type string for the special mode.
    ModeType,
    /// Setup steps that only happen in standard matches.
    StandardMatch,
    /// Game entity reached its final state.
    MatchComplete,
    EndTurn,
    TurnStart,
    Opponent,
    /// Buy, sell, reroll or gold-lock.
    ShopAction,
}

impl Marker {
    pub const ALL: [Marker; 8] = [
        Marker::NewMatch,
        Marker::ModeType,
        Marker::StandardMatch,
        Marker::MatchComplete,
        Marker::EndTurn,
        Marker::TurnStart,
        Marker::Opponent,
        Marker::ShopAction,
    ];

    pub fn needles(self) -> &'static [&'static str] {
        match self {
            Marker::NewMatch => &["CREATE_GAME"],
            Marker::ModeType => &["GT_BATTLEGROUNDS", "GAME_TYPE_BATTLEGROUNDS"],
            Marker::StandardMatch => &["MULLIGAN", "GT_RANKED", "GT_CASUAL"],
            Marker::MatchComplete => &["TAG=STATE VALUE=COMPLETE"],
            Marker::EndTurn => &["END_TURN"],
            Marker::TurnStart => &["ACTION_PHASE", "TURN_START", "MAIN_START"],
            Marker::Opponent => &["OPPONENT"],
            Marker::ShopAction => &["BUY", "SELL", "REFRESH", "REROLL", "FREEZE", "GOLD_LOCK"],
        }
    }

    /// Phase markers ignore entity descriptors: card names such as
    /// "Sellemental" must not read as shop actions.
    fn skips_entity_descriptors(self) -> bool {
        matches!(
            self,
            Marker::EndTurn | Marker::TurnStart | Marker::Opponent | Marker::ShopAction
        )
    }

    fn bit(self) -> u16 {
        1 << (self as u16)
    }

    fn matches(self, text: &str) -> bool {
        self.needles()
            .iter()
            .any(|needle| memmem::find(text.as_bytes(), needle.as_bytes()).is_some())
    }
}

/// Everything the rule table recognizes in one line, computed once and
/// shared by every state machine.
#[derive(Debug)]
pub struct LineFacts {
    markers: u16,
    /// Line carries a special-mode card identifier.
    pub mode_card: bool,
    /// Number of special-mode card identifiers on the line.
    pub mode_card_ids: u32,
    zone_play_tag: bool,
    pub zone_change: Option<Result<ZoneChange, LineError>>,
    pub turn: Option<Result<u32, LineError>>,
}

impl LineFacts {
    pub fn classify(line: &str) -> Self {
        let upper = line.to_ascii_uppercase();
        let outside = strip_entity_descriptors(&upper);

        let markers = Marker::ALL
            .iter()
            .filter(|m| {
                let text = if m.skips_entity_descriptors() { &outside } else { &upper };
                m.matches(text)
            })
            .fold(0u16, |acc, m| acc | m.bit());

        let mode_card_ids = count_mode_cards(&upper);

        Self {
            markers,
            mode_card: mode_card_ids > 0,
            mode_card_ids,
            zone_play_tag: memmem::find(upper.as_bytes(), b"ZONE=PLAY").is_some(),
            zone_change: parse_zone_change(&upper),
            turn: parse_turn(&upper),
        }
    }

    pub fn has(&self, marker: Marker) -> bool {
        self.markers & marker.bit() != 0
    }

    /// No rule recognized anything in this line.
    pub fn is_unrecognized(&self) -> bool {
        self.markers == 0 && !self.mode_card && self.zone_change.is_none() && self.turn.is_none()
    }

    /// An entity on this line is entering (or sitting in) the local play zone.
    pub fn enters_play(&self) -> bool {
        self.zone_play_tag || matches!(&self.zone_change, Some(Ok(change)) if change.enters_play())
    }
}

/// Mode card identifiers: `CARDID=BG<digits>_...` or `CARDID=TB_BACON...`.
fn count_mode_cards(upper: &str) -> u32 {
    let bytes = upper.as_bytes();
    memmem::find_iter(bytes, b"CARDID=")
        .filter(|&pos| {
            let id = &bytes[pos + "CARDID=".len()..];
            if id.starts_with(b"TB_BACON") {
                return true;
            }
            let Some(rest) = id.strip_prefix(b"BG") else {
                return false;
            };
            let digits = rest.iter().take_while(|b| b.is_ascii_digit()).count();
            digits > 0 && rest.get(digits) == Some(&b'_')
        })
        .count() as u32
}

/// `GameEntity tag=TURN value=N`.
fn parse_turn(upper: &str) -> Option<Result<u32, LineError>> {
    const KEY: &str = "TAG=TURN VALUE=";
    let pos = memmem::find(upper.as_bytes(), KEY.as_bytes())?;
    let rest = &upper[pos + KEY.len()..];
    let raw = rest
        .split(|c: char| c.is_whitespace() || c == ']')
        .next()
        .unwrap_or_default();
    Some(raw.parse::<u32>().map_err(|_| LineError::MalformedTagValue {
        tag: "TURN",
        raw: raw.to_string(),
    }))
}

/// Drop every `[...]` segment so free-text markers are only matched
/// outside entity descriptors.
fn strip_entity_descriptors(upper: &str) -> String {
    let bytes = upper.as_bytes();
    let mut out = String::with_capacity(upper.len());
    let mut cursor = 0;

    while let Some(open) = memchr(b'[', &bytes[cursor..]) {
        let open = cursor + open;
        out.push_str(&upper[cursor..open]);
        match memchr(b']', &bytes[open..]) {
            Some(close) => cursor = open + close + 1,
            None => {
                cursor = bytes.len();
                break;
            }
        }
    }
    out.push_str(&upper[cursor..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::LogZone;

    #[test]
    fn test_mode_card_patterns() {
        assert!(LineFacts::classify("... cardId=BG21_013 player=1]").mode_card);
        assert!(LineFacts::classify("... cardId=TB_BaconUps_061 player=2]").mode_card);
        assert!(LineFacts::classify("... CardID=bg5_001").mode_card);
        assert!(!LineFacts::classify("... cardId=BG_CFM_315 player=1]").mode_card);
        assert!(!LineFacts::classify("... cardId=CFM_315 player=2]").mode_card);
        assert!(!LineFacts::classify("... cardId=BG21").mode_card);
    }

    #[test]
    fn test_mode_card_ids_counted() {
        let facts = LineFacts::classify(
            "Entity=[id=3 cardId=BG25_001 player=1] Target=[id=4 cardId=TB_BaconShop_HERO_01 player=1]",
        );
        assert_eq!(facts.mode_card_ids, 2);
        assert_eq!(LineFacts::classify("cardId=CFM_315").mode_card_ids, 0);
    }

    #[test]
    fn test_marker_table() {
        let cases = [
            ("GameState.DebugPrintPower() - CREATE_GAME", Marker::NewMatch),
            ("GameType=GT_BATTLEGROUNDS", Marker::ModeType),
            ("GAME_TYPE_BATTLEGROUNDS", Marker::ModeType),
            ("tag=MULLIGAN_STATE value=INPUT", Marker::StandardMatch),
            ("GameType=GT_RANKED", Marker::StandardMatch),
            ("TAG_CHANGE Entity=GameEntity tag=STATE value=COMPLETE", Marker::MatchComplete),
            ("BLOCK_START SUB_ACTION_END_TURN", Marker::EndTurn),
            ("BLOCK_START ACTION_PHASE player", Marker::TurnStart),
            ("BLOCK_START ACTION_PHASE opponent", Marker::Opponent),
            ("Network.SendChoices() - TavernShopUI REFRESH", Marker::ShopAction),
            ("BUY action detected", Marker::ShopAction),
        ];

        for (line, marker) in cases {
            assert!(LineFacts::classify(line).has(marker), "{line} should match {marker:?}");
        }
    }

    #[test]
    fn test_end_turn_is_not_a_turn_start() {
        let facts = LineFacts::classify("BLOCK_START SUB_ACTION_END_TURN");
        assert!(facts.has(Marker::EndTurn));
        assert!(!facts.has(Marker::TurnStart));
        assert!(!facts.has(Marker::ShopAction));
    }

    #[test]
    fn test_card_names_are_not_shop_actions() {
        let facts = LineFacts::classify(
            "ZONE_CHANGE Entity=[entityName=Sellemental id=12 zone=HAND cardId=BGS_115 player=1] zone from -> FRIENDLY HAND",
        );
        assert!(!facts.has(Marker::ShopAction));
        assert!(facts.zone_change.is_some());
    }

    #[test]
    fn test_enters_play() {
        assert!(LineFacts::classify("FULL_ENTITY [id=4 zone=PLAY cardId=BG21_013]").enters_play());
        assert!(
            LineFacts::classify("ZONE_CHANGE Entity=[id=25 zone=HAND cardId=BG21_013] zone from HAND -> PLAY")
                .enters_play()
        );
        assert!(
            !LineFacts::classify("ZONE_CHANGE Entity=[id=25 zone=SETASIDE cardId=BG21_013] zone from -> HAND")
                .enters_play()
        );
    }

    #[test]
    fn test_turn_parsing() {
        let facts = LineFacts::classify("TAG_CHANGE Entity=GameEntity tag=TURN value=7");
        assert_eq!(facts.turn, Some(Ok(7)));

        let bad = LineFacts::classify("TAG_CHANGE Entity=GameEntity tag=TURN value=seven");
        assert!(matches!(bad.turn, Some(Err(LineError::MalformedTagValue { tag: "TURN", .. }))));
    }

    #[test]
    fn test_unrecognized() {
        assert!(LineFacts::classify("PowerTaskList.DebugDump() - Block End=(null)").is_unrecognized());
        let zone = LineFacts::classify("TAG_CHANGE Entity=[id=3] tag=ZONE value=HAND");
        assert!(!zone.is_unrecognized());
        assert!(matches!(zone.zone_change, Some(Ok(c)) if c.zone == LogZone::Hand));
    }

    #[test]
    fn test_strip_entity_descriptors() {
        assert_eq!(strip_entity_descriptors("A [B] C [D"), "A  C ");
        assert_eq!(strip_entity_descriptors("NO BRACKETS"), "NO BRACKETS");
    }
}
