//! Zone change extraction.
//!
//! Three dialects carry zone moves:
//! - `TAG_CHANGE Entity=[... id=N ...] tag=ZONE value=HAND`
//! - `ZONE_CHANGE Entity=[... id=N ...] zone from FRIENDLY HAND -> FRIENDLY PLAY`
//! - `FULL_ENTITY - Updating [... id=N zone=PLAY ...]`
//!
//! All functions here take the upper-cased line.

use memchr::memmem;
use phf::phf_map;

use crate::error::LineError;

pub type EntityId = u32;

/// Zone name as written in the log, before tracking policy is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogZone {
    Hand,
    Play,
    SetAside,
    Other,
}

/// Which player's zone the destination belongs to, when the dialect says.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Friendly,
    Opposing,
    Unspecified,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneChange {
    pub entity_id: EntityId,
    pub zone: LogZone,
    pub side: Side,
}

impl ZoneChange {
    /// Entity is landing on the local player's board.
    pub fn enters_play(&self) -> bool {
        self.zone == LogZone::Play && self.side != Side::Opposing
    }
}

static ZONE_NAMES: phf::Map<&'static str, LogZone> = phf_map! {
    "HAND" => LogZone::Hand,
    "PLAY" => LogZone::Play,
    "SETASIDE" => LogZone::SetAside,
    "DECK" => LogZone::Other,
    "GRAVEYARD" => LogZone::Other,
    "REMOVEDFROMGAME" => LogZone::Other,
    "SECRET" => LogZone::Other,
    "INVALID" => LogZone::Other,
};

fn lookup_zone(name: &str) -> LogZone {
    ZONE_NAMES.get(name).copied().unwrap_or(LogZone::Other)
}

/// Parse a zone move out of an upper-cased line.
///
/// `None` means the line is not a zone change at all; `Some(Err(_))` means
/// it looked like one but a field could not be read.
pub fn parse_zone_change(upper: &str) -> Option<Result<ZoneChange, LineError>> {
    let bytes = upper.as_bytes();

    if memmem::find(bytes, b"TAG_CHANGE").is_some() {
        let pos = memmem::find(bytes, b"TAG=ZONE VALUE=")?;
        let value = token(&upper[pos + "TAG=ZONE VALUE=".len()..]);
        return Some(entity_id(upper).map(|entity_id| ZoneChange {
            entity_id,
            zone: lookup_zone(value),
            side: Side::Unspecified,
        }));
    }

    if memmem::find(bytes, b"ZONE_CHANGE").is_some() {
        let arrow = memmem::rfind(bytes, b"->")?;
        let (side, zone) = parse_destination(&upper[arrow + 2..]);
        return Some(entity_id(upper).map(|entity_id| ZoneChange {
            entity_id,
            zone,
            side,
        }));
    }

    if memmem::find(bytes, b"FULL_ENTITY").is_some() {
        let zone = field(upper, "ZONE=")?;
        return Some(entity_id(upper).map(|entity_id| ZoneChange {
            entity_id,
            zone: lookup_zone(zone),
            side: Side::Unspecified,
        }));
    }

    None
}

/// Split `FRIENDLY PLAY (HERO)` into side and zone. An empty destination
/// means the entity left every named zone.
fn parse_destination(dest: &str) -> (Side, LogZone) {
    let dest = dest.trim();
    let dest = dest.split('(').next().unwrap_or_default().trim();

    let (side, rest) = if let Some(rest) = strip_side(dest, "FRIENDLY") {
        (Side::Friendly, rest)
    } else if let Some(rest) = strip_side(dest, "OPPOSING") {
        (Side::Opposing, rest)
    } else {
        (Side::Unspecified, dest)
    };

    if rest.is_empty() {
        return (side, LogZone::Other);
    }
    (side, lookup_zone(token(rest)))
}

fn strip_side<'a>(dest: &'a str, side: &str) -> Option<&'a str> {
    let rest = dest.strip_prefix(side)?;
    rest.strip_prefix(' ')
        .or_else(|| rest.strip_prefix('_'))
        .map(str::trim_start)
}

fn entity_id(upper: &str) -> Result<EntityId, LineError> {
    let raw = field(upper, "ID=").ok_or(LineError::MissingEntityId)?;
    raw.parse::<EntityId>()
        .map_err(|_| LineError::MalformedEntityId {
            raw: raw.to_string(),
        })
}

/// Value of a `KEY=value` field whose key starts a word, so `ID=` does not
/// match inside `CARDID=`.
fn field<'a>(upper: &'a str, key: &str) -> Option<&'a str> {
    let bytes = upper.as_bytes();
    memmem::find_iter(bytes, key.as_bytes())
        .find(|&pos| pos == 0 || matches!(bytes[pos - 1], b' ' | b'['))
        .map(|pos| token(&upper[pos + key.len()..]))
}

fn token(s: &str) -> &str {
    let end = s
        .find(|c: char| c.is_whitespace() || c == ']')
        .unwrap_or(s.len());
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Option<Result<ZoneChange, LineError>> {
        parse_zone_change(&line.to_ascii_uppercase())
    }

    #[test]
    fn test_tag_change_dialect() {
        let change = parse(
            "D 10:00:00.0 GameState.DebugPrintPower() - TAG_CHANGE Entity=[entityName=Alleycat id=42 zone=HAND zonePos=1 cardId=BG_CFM_315 player=1] tag=ZONE value=PLAY",
        )
        .unwrap()
        .unwrap();
        assert_eq!(change.entity_id, 42);
        assert_eq!(change.zone, LogZone::Play);
        assert!(change.enters_play());
    }

    #[test]
    fn test_zone_change_dialect_with_side() {
        let change = parse(
            "ZONE_CHANGE Entity=[entityName=Murloc Tidehunter id=3 zone=HAND zonePos=1 cardId=TB_BaconUps_061 player=2] zone from FRIENDLY HAND -> FRIENDLY PLAY",
        )
        .unwrap()
        .unwrap();
        assert_eq!(change.entity_id, 3);
        assert_eq!(change.zone, LogZone::Play);
        assert_eq!(change.side, Side::Friendly);
    }

    #[test]
    fn test_opposing_play_does_not_enter_play() {
        let change = parse(
            "ZONE_CHANGE Entity=[entityName=Scallywag id=77 zone=PLAY player=2] zone from -> OPPOSING PLAY",
        )
        .unwrap()
        .unwrap();
        assert_eq!(change.side, Side::Opposing);
        assert!(!change.enters_play());
    }

    #[test]
    fn test_destination_annotation_and_empty() {
        let change = parse("ZONE_CHANGE Entity=[id=9 zone=DECK] zone from FRIENDLY DECK -> FRIENDLY PLAY (Hero)")
            .unwrap()
            .unwrap();
        assert_eq!(change.zone, LogZone::Play);

        let gone = parse("ZONE_CHANGE Entity=[id=9 zone=PLAY] zone from FRIENDLY PLAY -> ")
            .unwrap()
            .unwrap();
        assert_eq!(gone.zone, LogZone::Other);
    }

    #[test]
    fn test_full_entity_dialect() {
        let change = parse("FULL_ENTITY - Updating [entityName=Tabbycat id=15 zone=SETASIDE zonePos=0 cardId=BG_CFM_315t player=1] CardID=BG_CFM_315t")
            .unwrap()
            .unwrap();
        assert_eq!(change.entity_id, 15);
        assert_eq!(change.zone, LogZone::SetAside);
    }

    #[test]
    fn test_card_id_is_not_entity_id() {
        let change = parse("TAG_CHANGE Entity=[cardId=BG21_013 id=8] tag=ZONE value=HAND")
            .unwrap()
            .unwrap();
        assert_eq!(change.entity_id, 8);
    }

    #[test]
    fn test_malformed_entity_id() {
        let err = parse("TAG_CHANGE Entity=[entityName=Broken id=abc zone=HAND] tag=ZONE value=PLAY")
            .unwrap()
            .unwrap_err();
        assert_eq!(err, LineError::MalformedEntityId { raw: "ABC".to_string() });
    }

    #[test]
    fn test_unrelated_lines() {
        assert!(parse("TAG_CHANGE Entity=GameEntity tag=TURN value=3").is_none());
        assert!(parse("CREATE_GAME").is_none());
        assert!(parse("FULL_ENTITY - Creating ID=89 CardID=BG21_013").is_none());
    }

    #[test]
    fn test_unknown_zone_is_other() {
        let change = parse("TAG_CHANGE Entity=[id=5] tag=ZONE value=LETTUCE_ABILITY")
            .unwrap()
            .unwrap();
        assert_eq!(change.zone, LogZone::Other);
    }
}
