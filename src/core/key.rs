//! Stable translation key derivation.
//!
//! A key is the base-36 rendering of a 31-multiplier rolling hash over the
//! sentence with all whitespace removed, zero-padded to seven characters and
//! prefixed with `k_`. The same algorithm must be used by every producer and
//! consumer of the translation project, so it lives here and nowhere else.

use crate::utils::strip_whitespace;

const KEY_PREFIX: &str = "k_";
const KEY_HASH_WIDTH: usize = 7;

/// Two different sentences produced the same key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCollision {
    pub key: String,
    /// Sentence that first claimed the key. It keeps the registry slot.
    pub first_text: String,
    /// Sentence that collided.
    pub new_text: String,
}

/// Derive the key for a sentence without collision bookkeeping.
pub fn hash_key(text: &str) -> String {
    let normalized = strip_whitespace(text);
    let hash = normalized
        .chars()
        .fold(0u32, |hash, c| hash.wrapping_mul(31).wrapping_add(c as u32));
    format!("{}{:0>width$}", KEY_PREFIX, to_base36(hash), width = KEY_HASH_WIDTH)
}

fn to_base36(mut value: u32) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

/// Strip a plural or numbered-variant suffix, grouping variants of one
/// logical sentence: `k_abc1234_plural` and `k_abc1234_0` both map to
/// `k_abc1234`.
pub fn base_key(key: &str) -> &str {
    if !key.starts_with(KEY_PREFIX) {
        return key;
    }
    let Some(pos) = key.rfind('_') else {
        return key;
    };
    // The stem between the prefix and the suffix must be non-empty.
    if pos <= KEY_PREFIX.len() {
        return key;
    }
    let suffix = &key[pos + 1..];
    let is_variant =
        suffix == "plural" || (suffix.len() == 1 && suffix.as_bytes()[0].is_ascii_digit());
    if is_variant { &key[..pos] } else { key }
}

/// Per-run registry mapping each derived key (plus context suffix, when one
/// was given) to the first sentence that produced it.
///
/// Collisions are reported to the caller rather than printed here, because
/// the file path is usually not known yet at the point the hash is computed.
/// The first sentence always wins; later colliding sentences never overwrite
/// the registry entry.
#[derive(Debug, Default)]
pub struct KeyRegistry {
    seen: std::collections::HashMap<String, String>,
}

impl KeyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive the key for a sentence and record it, reporting a collision
    /// when the key was already claimed by a different sentence.
    pub fn derive(&mut self, text: &str, context: Option<&str>) -> (String, Option<KeyCollision>) {
        let key = hash_key(text);
        let registry_key = match context.filter(|c| !c.is_empty()) {
            Some(context) => format!("{key}_{context}"),
            None => key.clone(),
        };

        match self.seen.get(&registry_key) {
            Some(existing) if existing != text => {
                let collision = KeyCollision {
                    key: key.clone(),
                    first_text: existing.clone(),
                    new_text: text.to_string(),
                };
                (key, Some(collision))
            }
            Some(_) => (key, None),
            None => {
                self.seen.insert(registry_key, text.to_string());
                (key, None)
            }
        }
    }
}
