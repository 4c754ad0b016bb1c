//! Shared utilities.

mod duration;
mod hash;

pub use duration::parse_duration;
pub use hash::{content_hash, fingerprint_hex};
