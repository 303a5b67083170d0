//! Template System - Slot Contracts
//!
//! A template is plain text with `{{slot}}` markers. It is parsed once into
//! literal and slot segments so rendering is a single pass that never
//! re-scans substituted values.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::error::{Result, SantaError};

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("slot opened at byte {offset} is never closed")]
    Unterminated { offset: usize },

    #[error("empty slot name at byte {offset}")]
    EmptySlot { offset: usize },
}

/// Every slot a certificate template must provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    Name,
    Message,
    Gift,
    GiftNote,
    TreeImage,
    SealImage,
}

impl Slot {
    pub const ALL: [Slot; 6] = [
        Slot::Name,
        Slot::Message,
        Slot::Gift,
        Slot::GiftNote,
        Slot::TreeImage,
        Slot::SealImage,
    ];

    /// Slots filled from a child record, in the order errors report them.
    pub const TEXT: [Slot; 4] = [Slot::Name, Slot::Message, Slot::Gift, Slot::GiftNote];

    pub fn key(self) -> &'static str {
        match self {
            Slot::Name => "name",
            Slot::Message => "message",
            Slot::Gift => "gift",
            Slot::GiftNote => "gift_note",
            Slot::TreeImage => "tree_image",
            Slot::SealImage => "seal_image",
        }
    }

    pub fn from_key(key: &str) -> Option<Slot> {
        Slot::ALL.into_iter().find(|slot| slot.key() == key)
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Segment {
    Literal(String),
    Known(Slot),
    Unknown(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    pub fn parse(text: &str) -> std::result::Result<Self, TemplateError> {
        let mut segments = vec![];
        let mut rest = text;
        let mut offset = 0;

        while let Some(start) = rest.find(OPEN) {
            if start > 0 {
                segments.push(Segment::Literal(rest[..start].to_string()));
            }
            let after_open = &rest[start + OPEN.len()..];
            let end = after_open
                .find(CLOSE)
                .ok_or(TemplateError::Unterminated { offset: offset + start })?;

            let key = after_open[..end].trim();
            if key.is_empty() {
                return Err(TemplateError::EmptySlot { offset: offset + start });
            }
            segments.push(match Slot::from_key(key) {
                Some(slot) => Segment::Known(slot),
                None => Segment::Unknown(key.to_string()),
            });

            let consumed = start + OPEN.len() + end + CLOSE.len();
            rest = &rest[consumed..];
            offset += consumed;
        }

        if !rest.is_empty() {
            segments.push(Segment::Literal(rest.to_string()));
        }

        Ok(Self { segments })
    }

    pub fn contains(&self, slot: Slot) -> bool {
        self.segments.iter().any(|s| *s == Segment::Known(slot))
    }

    /// Count of occurrences of a slot.
    pub fn occurrences(&self, slot: Slot) -> usize {
        self.segments
            .iter()
            .filter(|s| **s == Segment::Known(slot))
            .count()
    }

    /// Names of unrecognised slots, deduplicated, in order of first appearance.
    pub fn unknown_slots(&self) -> Vec<String> {
        let mut names: Vec<String> = vec![];
        for segment in &self.segments {
            if let Segment::Unknown(name) = segment {
                if !names.contains(name) {
                    names.push(name.clone());
                }
            }
        }
        names
    }

    /// The template must provide every known slot and nothing else.
    pub fn check_contract(&self) -> Result<()> {
        let unknown = self.unknown_slots();
        if !unknown.is_empty() {
            return Err(SantaError::UnknownSlots { slots: unknown });
        }

        let missing: Vec<String> = Slot::ALL
            .into_iter()
            .filter(|slot| !self.contains(*slot))
            .map(|slot| slot.key().to_string())
            .collect();
        if !missing.is_empty() {
            return Err(SantaError::MissingSlots { slots: missing });
        }

        Ok(())
    }

    pub(crate) fn segments(&self) -> &[Segment] {
        &self.segments
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_splits_literals_and_slots() {
        let t = Template::parse("Dear {{name}}, {{ gift }}!").unwrap();
        assert_eq!(
            t.segments(),
            &[
                Segment::Literal("Dear ".into()),
                Segment::Known(Slot::Name),
                Segment::Literal(", ".into()),
                Segment::Known(Slot::Gift),
                Segment::Literal("!".into()),
            ]
        );
    }

    #[test]
    fn test_single_braces_are_literal() {
        let css = "body { margin: 0; } @page { size: A4; }";
        let t = Template::parse(css).unwrap();
        assert_eq!(t.segments(), &[Segment::Literal(css.into())]);
    }

    #[test]
    fn test_unterminated_slot_reports_offset() {
        let err = Template::parse("abc {{name").unwrap_err();
        assert_eq!(err, TemplateError::Unterminated { offset: 4 });
    }

    #[test]
    fn test_empty_slot_rejected() {
        let err = Template::parse("x{{  }}").unwrap_err();
        assert_eq!(err, TemplateError::EmptySlot { offset: 1 });
    }

    #[test]
    fn test_repeated_slot_counted() {
        let t = Template::parse("<title>{{name}}</title><h1>{{name}}</h1>").unwrap();
        assert_eq!(t.occurrences(Slot::Name), 2);
        assert_eq!(t.occurrences(Slot::Gift), 0);
    }

    #[test]
    fn test_contract_names_missing_slots() {
        let t = Template::parse("{{name}} {{message}} {{gift}} {{tree_image}}").unwrap();
        match t.check_contract() {
            Err(SantaError::MissingSlots { slots }) => {
                assert_eq!(slots, vec!["gift_note", "seal_image"]);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_contract_rejects_unknown_slots() {
        let t = Template::parse("{{name}} {{year}} {{nickname}} {{year}}").unwrap();
        match t.check_contract() {
            Err(SantaError::UnknownSlots { slots }) => {
                assert_eq!(slots, vec!["year", "nickname"]);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_slot_keys_round_trip() {
        for slot in Slot::ALL {
            assert_eq!(Slot::from_key(slot.key()), Some(slot));
        }
        assert_eq!(Slot::from_key("Name"), None);
    }
}
