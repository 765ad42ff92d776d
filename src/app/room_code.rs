use crate::game::constants::ROOM_CODE_LENGTH;
use rand::Rng;

const ROOM_CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

pub fn generate_room_code<R: Rng>(rng: &mut R) -> String {
    (0..ROOM_CODE_LENGTH)
        .map(|_| ROOM_CODE_ALPHABET[rng.gen_range(0..ROOM_CODE_ALPHABET.len())] as char)
        .collect()
}

/// Normalizes a user-typed room code: strips anything outside `[A-Za-z0-9]` and uppercases.
/// Length is left to `is_valid_room_code`.
pub fn normalize_room_code(value: &str) -> String {
    value
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|ch| ch.to_ascii_uppercase())
        .collect()
}

pub fn is_valid_room_code(value: &str) -> bool {
    value.len() == ROOM_CODE_LENGTH
        && value
            .bytes()
            .all(|byte| byte.is_ascii_uppercase() || byte.is_ascii_digit())
}
