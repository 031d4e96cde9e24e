//! Domain Services
//!
//! Pure domain logic for CAPTCHA answer generation and matching.

use rand::Rng;

/// Characters used in generated answers. Visually ambiguous glyphs
/// (B/8, I/1, O/0) are excluded.
pub const ANSWER_CHARSET: &[u8] = b"ACDEFGHJKLMNPQRSTUVWXYZ2345679";

/// Generate a random alphanumeric answer of the given length.
pub fn generate_answer(len: usize, rng: &mut impl Rng) -> String {
    (0..len)
        .map(|_| ANSWER_CHARSET[rng.random_range(0..ANSWER_CHARSET.len())] as char)
        .collect()
}

/// Compare a stored answer with user input.
///
/// Comparison is case-insensitive, and whitespace in the input is
/// ignored (transcribing from an image invites stray spaces).
pub fn answers_match(expected: &str, input: &str) -> bool {
    let normalized: String = input
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase();

    !expected.is_empty() && expected.to_uppercase() == normalized
}
