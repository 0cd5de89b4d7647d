use pretty_assertions::assert_eq;
use quill_core::ChapterVariant;
use quill_core::RefKind;
use quill_core::Reference;
use quill_core::grammar;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;

fn random_reference(rng: &mut StdRng) -> Reference {
    let kinds = [
        RefKind::Character,
        RefKind::WorldSetting,
        RefKind::Memo,
        RefKind::Chapter,
    ];
    let kind = kinds[rng.random_range(0..kinds.len())];
    let variant = match rng.random_range(0..3) {
        0 => None,
        1 => Some(ChapterVariant::Full),
        _ => Some(ChapterVariant::Summary),
    };
    Reference::new(kind, rng.random_range(0..u64::MAX), variant)
}

#[test]
fn mixed_text_round_trips_references_in_order() {
    let noise = ["", " ", "text ", "{{", "}}", "{{@::", "::", "日本 ", "\n"];
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..200 {
        let mut text = String::new();
        let mut expected = Vec::new();
        for _ in 0..rng.random_range(0..6) {
            text.push_str(noise[rng.random_range(0..noise.len())]);
            let reference = random_reference(&mut rng);
            text.push_str(&grammar::encode(&reference));
            expected.push(reference);
        }
        text.push_str(noise[rng.random_range(0..noise.len())]);

        let tokens = grammar::decode(&text);
        let found: Vec<Reference> = tokens.iter().map(|t| t.reference).collect();
        assert_eq!(found, expected, "decoding {text:?}");
        for pair in tokens.windows(2) {
            assert!(pair[0].end() <= pair[1].start(), "tokens overlap in {text:?}");
        }
        assert_eq!(grammar::normalize(&text), text);
    }
}

#[test]
fn normalize_is_idempotent_on_non_canonical_ids() {
    let text = "{{@::Memo::0001}} and {{@::Chapter::00::summary}}";
    let once = grammar::normalize(text);
    assert_eq!(once, "{{@::Memo::1}} and {{@::Chapter::0::summary}}");
    assert_eq!(grammar::normalize(&once), once);
}
