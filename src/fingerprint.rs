// src/fingerprint.rs
//! Compact digest over a signal set. Two runs that extract the same signals
//! in the same order produce the same fingerprint, regardless of markup
//! noise elsewhere on the page.

use std::fmt::Write as _;

use sha2::{Digest, Sha256};

use crate::extract::SignalSet;

const FINGERPRINT_BYTES: usize = 8;

/// SHA-256 over the signals joined with a NUL separator, truncated to 16 hex
/// chars. NUL cannot appear inside a signal, so adjacent signals can never
/// collide by concatenation.
pub fn fingerprint(signals: &SignalSet) -> String {
    let mut hasher = Sha256::new();
    for (i, signal) in signals.iter().enumerate() {
        if i > 0 {
            hasher.update([0u8]);
        }
        hasher.update(signal.as_bytes());
    }
    let digest = hasher.finalize();
    let mut out = String::with_capacity(FINGERPRINT_BYTES * 2);
    for b in digest.iter().take(FINGERPRINT_BYTES) {
        let _ = write!(&mut out, "{b:02x}");
    }
    out
}
