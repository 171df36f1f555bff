//! Shared fixtures for the in-crate test modules.

use crate::ordering::KeyOf;

/// Orders `(key, payload)` pairs by their first field, leaving the payload
/// free to record insertion order in duplicate-handling tests.
pub(crate) struct ByFirst;

impl KeyOf<(u32, u32)> for ByFirst {
    type Key = u32;

    fn key_of(value: &(u32, u32)) -> &u32 {
        &value.0
    }
}
