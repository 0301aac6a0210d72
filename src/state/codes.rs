//! Room code generation.

use rand::Rng;

/// Room codes are exactly this many characters.
pub const CODE_LEN: usize = 6;

const CODE_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Generate one random candidate code.
///
/// Candidates carry no uniqueness guarantee; the registry regenerates
/// until the code is absent from the live room map.
pub fn random_code() -> String {
    let mut rng = rand::thread_rng();
    (0..CODE_LEN)
        .map(|_| CODE_CHARS[rng.gen_range(0..CODE_CHARS.len())] as char)
        .collect()
}

/// Check that a client-supplied code has the room code shape.
pub fn is_valid_code(code: &str) -> bool {
    code.len() == CODE_LEN
        && code
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
}
