use nanoid::nanoid;

/// Canonical alphabet for entity identifiers (no ambiguous glyphs).
const ENTITY_ID_ALPHABET: &[char] = &[
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'J', 'K', 'L', 'M', 'N', 'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y',
    'Z', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'j', 'm', 'n', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
];
/// Default entity id length.
pub const ENTITY_ID_LENGTH: usize = 20;

/// Generates a new post, comment or reply identifier.
pub fn generate_entity_id() -> String {
    nanoid!(ENTITY_ID_LENGTH, ENTITY_ID_ALPHABET)
}

/// Returns `true` if `candidate` has the shape of an id produced by [`generate_entity_id`].
///
/// User ids are opaque and never checked with this.
pub fn is_entity_id(candidate: &str) -> bool {
    candidate.chars().count() == ENTITY_ID_LENGTH && candidate.chars().all(|c| ENTITY_ID_ALPHABET.contains(&c))
}
