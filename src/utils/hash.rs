//! Content hashing using FxHash.
//!
//! Used to skip config reloads when `modkit.toml` was touched but its
//! content did not change.

use rustc_hash::FxHasher;
use std::hash::Hasher;

/// Compute 64-bit hash from byte data.
#[inline]
pub fn compute<T: AsRef<[u8]> + ?Sized>(data: &T) -> u64 {
    let mut hasher = FxHasher::default();
    hasher.write(data.as_ref());
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_is_deterministic() {
        assert_eq!(compute("[serve]\nport = 1"), compute("[serve]\nport = 1"));
        assert_ne!(compute("[serve]\nport = 1"), compute("[serve]\nport = 2"));
    }

    #[test]
    fn test_str_and_bytes_agree() {
        assert_eq!(compute("modkit"), compute(b"modkit".as_slice()));
    }
}
