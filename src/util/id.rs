//! ID utilities (room codes, connection ULIDs).

use rand::Rng;
use ulid::Ulid;

pub const ROOM_ID_LEN: usize = 6;

// no 0/O or 1/I, codes get read aloud
const ROOM_ID_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Short uppercase room code players can type in.
pub fn new_room_id() -> String {
    let mut rng = rand::thread_rng();
    (0..ROOM_ID_LEN)
        .map(|_| char::from(ROOM_ID_ALPHABET[rng.gen_range(0..ROOM_ID_ALPHABET.len())]))
        .collect()
}

/// Canonical form of a room code typed by a user.
pub fn normalize_room_id(raw: &str) -> String {
    raw.trim().to_ascii_uppercase()
}

/// Identifies one WebSocket connection, so a stale socket cannot detach a
/// newer one registered under the same player name.
pub fn new_connection_id() -> Ulid {
    Ulid::new()
}
