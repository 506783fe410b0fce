//! Share codes: `CC-<WORD><NN>` names for a fixed pool of session seeds.
//!
//! Each of the 64 × 100 codes names exactly one seed and the mapping runs both
//! ways. Seeds outside the pool have no code and are shown as plain numbers.

const CODE_PREFIX: &str = "CC";
const SUFFIXES: u64 = 100;
/// Number of distinct share codes.
pub const CODE_COUNT: u64 = 6_400;

/// Keeps code seeds away from small hand-typed numbers.
const SEED_DOMAIN: u64 = 0x4343_4841_5345_0000;
/// Odd, so multiplication is a bijection on `u64`.
const SEED_MULTIPLIER: u64 = 0x9E37_79B9_7F4A_7C15;
const SEED_MULTIPLIER_INV: u64 = wrapping_inverse(SEED_MULTIPLIER);

pub const WORD_LIST: [&str; 64] = [
    "SOLAR", "WIND", "TIDAL", "BIOGAS", "COMPOST", "BAMBOO", "HEMP", "WOOL", "COTTON", "CEDAR",
    "FOREST", "MEADOW", "RIVER", "GLACIER", "REEF", "OZONE", "CARBON", "OFFSET", "LEDGER",
    "METHANE", "SMOKE", "FURNACE", "KILN", "OVEN", "DOUGH", "BASIL", "TOMATO", "PIZZA", "SWEATER",
    "EBIKE", "PEDAL", "BATTERY", "LITHIUM", "FRAME", "PHONE", "FREIGHT", "HARBOR", "CARGO", "PAPER",
    "RECYCLE", "REUSE", "REPAIR", "UPCYCLE", "ORGANIC", "LOCAL", "SEASON", "HARVEST", "ORCHARD",
    "BEEHIVE", "POLLEN", "SEEDLING", "SPROUT", "CANOPY", "MOSS", "FERN", "LICHEN", "OTTER",
    "HERON", "BADGER", "FALCON", "TURBINE", "PANEL", "GRID", "BUDGET",
];

/// Multiplicative inverse of an odd `k` modulo 2^64 by Newton iteration.
/// Each round doubles the number of correct low bits, starting from three.
const fn wrapping_inverse(k: u64) -> u64 {
    let mut inv = k;
    let mut round = 0;
    while round < 5 {
        inv = inv.wrapping_mul(2u64.wrapping_sub(k.wrapping_mul(inv)));
        round += 1;
    }
    inv
}

const fn seed_at(index: u64) -> u64 {
    (index ^ SEED_DOMAIN).wrapping_mul(SEED_MULTIPLIER)
}

fn index_of(seed: u64) -> Option<u64> {
    let index = seed.wrapping_mul(SEED_MULTIPLIER_INV) ^ SEED_DOMAIN;
    (index < CODE_COUNT).then_some(index)
}

/// Share code naming `seed`, or `None` when the seed is not in the code pool.
/// Whenever a code is returned, [`decode_share_code`] maps it back to `seed`.
#[must_use]
pub fn encode_share_code(seed: u64) -> Option<String> {
    let index = index_of(seed)?;
    let word = WORD_LIST.get(usize::try_from(index / SUFFIXES).ok()?)?;
    Some(format!("{CODE_PREFIX}-{word}{:02}", index % SUFFIXES))
}

/// Seed named by a share code. Case and surrounding whitespace are ignored.
#[must_use]
pub fn decode_share_code(code: &str) -> Option<u64> {
    let (prefix, rest) = code.trim().split_once('-')?;
    if !prefix.eq_ignore_ascii_case(CODE_PREFIX) {
        return None;
    }
    let (word, digits) = rest.split_at_checked(rest.len().checked_sub(2)?)?;
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let suffix: u64 = digits.parse().ok()?;
    let word_index = WORD_LIST
        .iter()
        .position(|candidate| candidate.eq_ignore_ascii_case(word))?;
    Some(seed_at(u64::try_from(word_index).ok()? * SUFFIXES + suffix))
}

/// Every seed that has a share code, in word-list order.
pub fn share_code_seeds() -> impl Iterator<Item = u64> {
    (0..CODE_COUNT).map(seed_at)
}

/// Share code when the seed has one, the decimal seed otherwise.
#[must_use]
pub fn seed_label(seed: u64) -> String {
    encode_share_code(seed).unwrap_or_else(|| seed.to_string())
}
