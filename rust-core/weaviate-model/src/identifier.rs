// SPDX-License-Identifier: PMPL-1.0-or-later
//! Object identifier normalization.
//!
//! Canonical UUID strings pass through unchanged. Any other string is treated
//! as a natural key and content-addressed: the MD5 digest of its UTF-8 bytes
//! becomes the UUID, so the same key always lands on the same object.

use md5::{Digest, Md5};
use uuid::Uuid;

/// Normalize a raw identifier into a UUID.
pub fn normalize_uuid(raw: &str) -> Uuid {
    match Uuid::parse_str(raw) {
        Ok(uuid) => uuid,
        Err(_) => {
            let digest = Md5::digest(raw.as_bytes());
            let mut bytes = [0u8; 16];
            bytes.copy_from_slice(&digest);
            Uuid::from_bytes(bytes)
        }
    }
}
