//! Certificate identifiers: `IECC-XXXXXXXX-YYYY`.
//!
//! `XXXXXXXX` is four CSPRNG bytes in upper-case hex, `YYYY` the last four
//! digits of the issuing instant in epoch milliseconds. The random part is only
//! 32 bits, so callers must insert through the registry (which rejects
//! duplicates) and regenerate on collision.

use chrono::{DateTime, Utc};
use rand::RngCore;

pub const PREFIX: &str = "IECC";

const RANDOM_BYTES: usize = 4;
const SUFFIX_DIGITS: usize = 4;

/// Issues a fresh identifier for an affirmation created at `now`.
pub fn generate(now: DateTime<Utc>) -> String {
    let mut bytes = [0u8; RANDOM_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    format_id(&bytes, now.timestamp_millis())
}

fn format_id(random: &[u8; RANDOM_BYTES], epoch_millis: i64) -> String {
    format!(
        "{}-{}-{:04}",
        PREFIX,
        hex::encode_upper(random),
        epoch_millis.rem_euclid(10_000)
    )
}

/// True when `s` has exactly the `IECC-[0-9A-F]{8}-[0-9]{4}` shape.
pub fn is_well_formed(s: &str) -> bool {
    let Some(rest) = s.strip_prefix(PREFIX).and_then(|r| r.strip_prefix('-')) else {
        return false;
    };
    let Some((random, suffix)) = rest.split_once('-') else {
        return false;
    };

    random.len() == RANDOM_BYTES * 2
        && random
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'A'..=b'F').contains(&b))
        && suffix.len() == SUFFIX_DIGITS
        && suffix.bytes().all(|b| b.is_ascii_digit())
}
