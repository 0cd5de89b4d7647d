use serde::Deserialize;
use serde::Serialize;
use strum_macros::AsRefStr;
use strum_macros::Display;
use strum_macros::EnumIter;
use strum_macros::EnumString;
use strum_macros::IntoStaticStr;

/// The kind of entity a reference token points at.
///
/// The `Display`/`FromStr` forms are the fixed label tokens used in the
/// placeholder grammar (`{{@::Character::7}}`), so they must never change.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
    IntoStaticStr,
)]
pub enum RefKind {
    Character,
    WorldSetting,
    Memo,
    Chapter,
}

impl RefKind {
    /// Label token as it appears inside a placeholder.
    pub fn token(self) -> &'static str {
        self.into()
    }

    /// Human readable name shown in menus and pickers.
    pub fn display_name(self) -> &'static str {
        match self {
            RefKind::Character => "Character",
            RefKind::WorldSetting => "World setting",
            RefKind::Memo => "Memo",
            RefKind::Chapter => "Chapter",
        }
    }

    pub fn supports_variant(self) -> bool {
        matches!(self, RefKind::Chapter)
    }
}

/// Which rendition of a chapter should later be substituted into a prompt.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
    IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ChapterVariant {
    #[default]
    Full,
    Summary,
}

impl ChapterVariant {
    pub fn token(self) -> &'static str {
        self.into()
    }

    pub fn toggled(self) -> Self {
        match self {
            ChapterVariant::Full => ChapterVariant::Summary,
            ChapterVariant::Summary => ChapterVariant::Full,
        }
    }
}

/// A link to one external entity, as carried by a placeholder token.
///
/// Only chapter references can carry a variant; the constructor drops it for
/// every other kind so any `Reference` value is encodable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawReference")]
pub struct Reference {
    kind: RefKind,
    id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    variant: Option<ChapterVariant>,
}

#[derive(Deserialize)]
struct RawReference {
    kind: RefKind,
    id: u64,
    #[serde(default)]
    variant: Option<ChapterVariant>,
}

impl From<RawReference> for Reference {
    fn from(raw: RawReference) -> Self {
        Reference::new(raw.kind, raw.id, raw.variant)
    }
}

impl Reference {
    pub fn new(kind: RefKind, id: u64, variant: Option<ChapterVariant>) -> Self {
        let variant = match variant {
            Some(v) if !kind.supports_variant() => {
                tracing::warn!("ignoring variant {v} on {kind} reference {id}");
                None
            }
            other => other,
        };
        Self { kind, id, variant }
    }

    pub fn character(id: u64) -> Self {
        Self::new(RefKind::Character, id, None)
    }

    pub fn world_setting(id: u64) -> Self {
        Self::new(RefKind::WorldSetting, id, None)
    }

    pub fn memo(id: u64) -> Self {
        Self::new(RefKind::Memo, id, None)
    }

    pub fn chapter(id: u64, variant: Option<ChapterVariant>) -> Self {
        Self::new(RefKind::Chapter, id, variant)
    }

    pub fn kind(&self) -> RefKind {
        self.kind
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Variant exactly as written in the buffer.
    pub fn variant(&self) -> Option<ChapterVariant> {
        self.variant
    }

    /// Variant to use for substitution. A chapter reference that omits the
    /// variant means the full text.
    pub fn effective_variant(&self) -> Option<ChapterVariant> {
        match self.kind {
            RefKind::Chapter => Some(self.variant.unwrap_or_default()),
            _ => None,
        }
    }
}
