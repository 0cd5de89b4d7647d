//! Read-only entity catalogs supplied by the host application.
//!
//! The editing core never fetches or mutates these; they are only consulted
//! to turn a reference id into a label and to populate the entity pickers.

use serde::Deserialize;
use serde::Serialize;

use crate::reference::RefKind;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldSetting {
    pub id: u64,
    #[serde(alias = "title")]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Memo {
    pub id: u64,
    #[serde(alias = "name")]
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    pub id: u64,
    #[serde(alias = "name")]
    pub title: String,
}

/// Kind-agnostic view of one catalog entry, used by pickers and search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitySummary {
    pub id: u64,
    pub name: String,
}

/// The four collections a reference field can point into.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityCatalog {
    pub characters: Vec<Character>,
    #[serde(alias = "worldSettings")]
    pub world_settings: Vec<WorldSetting>,
    pub memos: Vec<Memo>,
    pub chapters: Vec<Chapter>,
}

impl EntityCatalog {
    /// Display name of the entity `id` of `kind`, if present.
    pub fn name_of(&self, kind: RefKind, id: u64) -> Option<&str> {
        match kind {
            RefKind::Character => self
                .characters
                .iter()
                .find(|c| c.id == id)
                .map(|c| c.name.as_str()),
            RefKind::WorldSetting => self
                .world_settings
                .iter()
                .find(|w| w.id == id)
                .map(|w| w.name.as_str()),
            RefKind::Memo => self
                .memos
                .iter()
                .find(|m| m.id == id)
                .map(|m| m.title.as_str()),
            RefKind::Chapter => self
                .chapters
                .iter()
                .find(|c| c.id == id)
                .map(|c| c.title.as_str()),
        }
    }

    /// The slice of the catalog for `kind`, in catalog order.
    pub fn entries(&self, kind: RefKind) -> Vec<EntitySummary> {
        fn summary(id: u64, name: &str) -> EntitySummary {
            EntitySummary {
                id,
                name: name.to_string(),
            }
        }
        match kind {
            RefKind::Character => self
                .characters
                .iter()
                .map(|c| summary(c.id, &c.name))
                .collect(),
            RefKind::WorldSetting => self
                .world_settings
                .iter()
                .map(|w| summary(w.id, &w.name))
                .collect(),
            RefKind::Memo => self
                .memos
                .iter()
                .map(|m| summary(m.id, &m.title))
                .collect(),
            RefKind::Chapter => self
                .chapters
                .iter()
                .map(|c| summary(c.id, &c.title))
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
            && self.world_settings.is_empty()
            && self.memos.is_empty()
            && self.chapters.is_empty()
    }
}
