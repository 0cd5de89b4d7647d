//! Random caret and edit sequences never leave the caret inside a token.

use quill_core::CaretMove;
use quill_core::RefKind;
use quill_core::TokenBuffer;
use quill_core::grammar;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;

const MOTIONS: [CaretMove; 10] = [
    CaretMove::Left,
    CaretMove::Right,
    CaretMove::WordLeft,
    CaretMove::WordRight,
    CaretMove::LineStart,
    CaretMove::LineEnd,
    CaretMove::Up,
    CaretMove::Down,
    CaretMove::BufferStart,
    CaretMove::BufferEnd,
];

fn assert_caret_on_boundary(buffer: &TokenBuffer, step: usize) {
    let caret = buffer.caret();
    assert!(
        buffer.value().is_char_boundary(caret),
        "step {step}: caret {caret} not on a char boundary in {:?}",
        buffer.value()
    );
    assert!(
        grammar::token_containing(buffer.tokens(), caret).is_none(),
        "step {step}: caret {caret} inside a token in {:?}",
        buffer.value()
    );
    if let Some(selection) = buffer.selection() {
        for end in [selection.start, selection.end] {
            assert!(
                grammar::token_containing(buffer.tokens(), end).is_none(),
                "step {step}: selection end {end} inside a token in {:?}",
                buffer.value()
            );
        }
    }
}

#[test]
fn random_operations_preserve_caret_invariant() {
    let fragments = ["a", "é", " ", "\n", "{", "}", "{{@::", "Memo::", "4", "}}", "語"];
    for seed in 0..40u64 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut buffer =
            TokenBuffer::from_value("start {{@::Character::7}} mid\n{{@::Chapter::2::full}} end");
        for step in 0..300 {
            match rng.random_range(0..9) {
                0 => buffer.move_caret(MOTIONS[rng.random_range(0..MOTIONS.len())]),
                1 => buffer.extend_selection(MOTIONS[rng.random_range(0..MOTIONS.len())]),
                2 => {
                    buffer.insert_text(fragments[rng.random_range(0..fragments.len())]);
                }
                3 => {
                    buffer.backspace();
                }
                4 => {
                    buffer.delete_forward();
                }
                5 => {
                    let len = buffer.value().len();
                    buffer.set_caret(rng.random_range(0..=len + 3));
                }
                6 => {
                    let ids: Vec<u64> = (0..rng.random_range(0..3))
                        .map(|_| rng.random_range(0..100))
                        .collect();
                    buffer.insert_reference(RefKind::Memo, &ids, None);
                }
                7 => {
                    buffer.delete_word_backward();
                }
                _ => {
                    let len = buffer.value().len();
                    let a = rng.random_range(0..=len);
                    let b = rng.random_range(0..=len);
                    buffer.replace_range(a.min(b)..a.max(b), "x");
                }
            }
            assert_caret_on_boundary(&buffer, step);
        }
    }
}

#[test]
fn stepping_right_from_start_visits_every_token_boundary_only() {
    let text = "a{{@::Memo::1}}{{@::Character::22}}b";
    let mut buffer = TokenBuffer::from_value(text);
    buffer.set_caret(0);
    let mut stops = vec![buffer.caret()];
    while buffer.caret() < text.len() {
        buffer.move_caret(CaretMove::Right);
        stops.push(buffer.caret());
    }
    assert_eq!(stops, vec![0, 1, 15, 35, 36]);
}
