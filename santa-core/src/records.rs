//! Child records and the built-in recipient list.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{Result, SantaError};
use crate::templates::Slot;

/// Personalisation for one certificate.
///
/// Text fields are optional so an incomplete record can be reported by name
/// instead of failing to deserialize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Pre-formatted HTML, inserted verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gift: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gift_note: Option<String>,
    pub filename: String,
}

impl ChildRecord {
    pub fn new(
        name: impl Into<String>,
        message: impl Into<String>,
        gift: impl Into<String>,
        gift_note: impl Into<String>,
        filename: impl Into<String>,
    ) -> Self {
        Self {
            name: Some(name.into()),
            message: Some(message.into()),
            gift: Some(gift.into()),
            gift_note: Some(gift_note.into()),
            filename: filename.into(),
        }
    }

    /// Value for a text slot. Image slots are never supplied by a record.
    pub fn field(&self, slot: Slot) -> Option<&str> {
        match slot {
            Slot::Name => self.name.as_deref(),
            Slot::Message => self.message.as_deref(),
            Slot::Gift => self.gift.as_deref(),
            Slot::GiftNote => self.gift_note.as_deref(),
            Slot::TreeImage | Slot::SealImage => None,
        }
    }

    /// Label used in reports: the name when present, else the filename.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.filename)
    }
}

/// Load a JSON array of records.
pub fn load_records(path: &Path) -> Result<Vec<ChildRecord>> {
    let content = fs::read_to_string(path).map_err(|e| SantaError::io(path, e))?;
    serde_json::from_str(&content).map_err(|source| SantaError::Config {
        path: path.to_path_buf(),
        source,
    })
}

const LIA_MESSAGE: &str = r#"
        <p>My dear <span class="highlight">Lia</span>, what a remarkable young lady you have become!</p>

        <p>I've been watching you this year, and my goodness, you have made me SO proud!
        Your <span class="highlight">amazing school report</span> didn't go unnoticed up here at the North Pole -
        the elves were doing a happy dance when they saw your results!</p>

        <p>Now, I hear you're off to <span class="highlight">Paarl Girls' High</span> next year for Grade 8 -
        what an exciting new adventure awaits you! Starting high school AND living in the hostel...
        my dear, you are becoming such a <span class="highlight">brave and independent young lady</span>.
        Mom and Dad will miss you during the week, but they are bursting with pride!</p>

        <p>You're growing up so beautifully, and I know you'll shine bright at your new school.
        Remember, even when you're at the hostel, you carry your family's love with you always.
        And those weekends home? They'll be extra special!</p>

        <p>This gift is for YOU - to <span class="highlight">spoil yourself</span> and get some wonderful things
        for your exciting new chapter ahead. You deserve every bit of it!</p>
    "#;

const DANIEL_MESSAGE: &str = r#"
        <p>My dear <span class="highlight">Daniel</span>, what an AWESOME young man you are!</p>

        <p>Ho ho ho! I've been keeping a very close eye on you this year, and WOW -
        your <span class="highlight">amazing school report</span> had the reindeer doing backflips!
        Even Rudolph said "That Dan is going places!"</p>

        <p>I know how much you LOVE your sports - whether it's tackling on the
        <span class="highlight">rugby</span> field, smashing sixes in <span class="highlight">cricket</span>,
        or scoring goals in backyard <span class="highlight">soccer</span> - you give it your ALL!
        That's what champions are made of!</p>

        <p>And those <span class="highlight">doggies</span> of yours? They're lucky to have such a
        caring friend who loves them so much. Your big heart for your family and your furry pals
        makes you extra special!</p>

        <p>Now, here's something important: Next year, with Lia at high school, you'll be
        <span class="highlight">the man of the house</span> during the week! I KNOW you're going to
        step up and be amazing - you've got this, champ! Grade 5 is going to be YOUR year!</p>

        <p>Keep being the incredible, sporty, kind-hearted legend that you are!</p>
    "#;

/// The recipients generated when no records file is given.
pub fn builtin_records() -> Vec<ChildRecord> {
    vec![
        ChildRecord::new(
            "Lia du Plessis",
            LIA_MESSAGE,
            "R3,500",
            "Deposited into your account - treat yourself, superstar!",
            "lia_certificate.html",
        ),
        ChildRecord::new(
            "Daniel du Plessis",
            DANIEL_MESSAGE,
            "R2,500",
            "A special stocking stuffer for the amazing DanTheMan!",
            "daniel_certificate.html",
        ),
    ]
}
