//! Turns a reference into the label shown on its chip.

use quill_protocol::ChapterVariant;
use quill_protocol::EntityCatalog;
use quill_protocol::RefKind;
use quill_protocol::Reference;

/// Display label for one reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLabel {
    pub text: String,
    /// `false` when the id is absent from the catalog and `text` is the
    /// degraded `TYPE#ID` form.
    pub resolved: bool,
}

/// Resolve `reference` against `catalog`.
///
/// Dangling ids never fail: they produce `"<TYPE>#<id>"` (for example
/// `Character#9999`). An entity whose name is blank is treated the same way
/// so a chip never renders empty.
pub fn resolve(catalog: &EntityCatalog, reference: &Reference) -> ResolvedLabel {
    let name = catalog
        .name_of(reference.kind(), reference.id())
        .map(str::trim)
        .filter(|name| !name.is_empty());

    match name {
        Some(name) => ResolvedLabel {
            text: with_variant_suffix(name, reference),
            resolved: true,
        },
        None => {
            tracing::debug!(
                "no {} with id {} in catalog; using degraded label",
                reference.kind().token(),
                reference.id()
            );
            ResolvedLabel {
                text: degraded_label(reference),
                resolved: false,
            }
        }
    }
}

/// Label used when the entity cannot be found.
pub fn degraded_label(reference: &Reference) -> String {
    format!("{}#{}", reference.kind().token(), reference.id())
}

fn with_variant_suffix(name: &str, reference: &Reference) -> String {
    match (reference.kind(), reference.variant()) {
        (RefKind::Chapter, Some(ChapterVariant::Full)) => format!("{name} (full)"),
        (RefKind::Chapter, Some(ChapterVariant::Summary)) => format!("{name} (summary)"),
        _ => name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use quill_protocol::Chapter;
    use quill_protocol::Character;
    use quill_protocol::Memo;
    use quill_protocol::WorldSetting;

    fn catalog() -> EntityCatalog {
        EntityCatalog {
            characters: vec![Character {
                id: 7,
                name: "Ada Reyes".to_string(),
            }],
            world_settings: vec![WorldSetting {
                id: 3,
                name: "Salt Coast".to_string(),
            }],
            memos: vec![Memo {
                id: 1,
                title: "  ".to_string(),
            }],
            chapters: vec![Chapter {
                id: 12,
                title: "The Ferry".to_string(),
            }],
        }
    }

    #[test]
    fn resolves_names_per_kind() {
        let catalog = catalog();
        assert_eq!(
            resolve(&catalog, &Reference::character(7)),
            ResolvedLabel {
                text: "Ada Reyes".to_string(),
                resolved: true,
            }
        );
        assert_eq!(
            resolve(&catalog, &Reference::world_setting(3)).text,
            "Salt Coast"
        );
    }

    #[test]
    fn chapter_labels_carry_explicit_variant() {
        let catalog = catalog();
        assert_eq!(
            resolve(&catalog, &Reference::chapter(12, None)).text,
            "The Ferry"
        );
        assert_eq!(
            resolve(&catalog, &Reference::chapter(12, Some(ChapterVariant::Full))).text,
            "The Ferry (full)"
        );
        assert_eq!(
            resolve(
                &catalog,
                &Reference::chapter(12, Some(ChapterVariant::Summary))
            )
            .text,
            "The Ferry (summary)"
        );
    }

    #[test]
    fn dangling_and_blank_entities_degrade() {
        let catalog = catalog();
        assert_eq!(
            resolve(&EntityCatalog::default(), &Reference::character(9999)),
            ResolvedLabel {
                text: "Character#9999".to_string(),
                resolved: false,
            }
        );
        assert_eq!(
            resolve(&catalog, &Reference::memo(1)),
            ResolvedLabel {
                text: "Memo#1".to_string(),
                resolved: false,
            }
        );
        assert_eq!(
            resolve(&catalog, &Reference::chapter(4, Some(ChapterVariant::Summary))).text,
            "Chapter#4"
        );
    }
}
