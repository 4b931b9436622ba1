//! Header integrity digest.
//!
//! A byte-wise unsigned 32-bit sum over the header bytes preceding the
//! checksum field. Diagnostic, not adversarial: strong enough to catch
//! single-bit flips and accidental overwrites, not a cryptographic check.

/// Computes the digest of `bytes`, wrapping on overflow.
///
/// Depends on every byte in `bytes`; callers are expected to pass the
/// encoded header fields that precede the checksum field itself.
#[inline]
pub fn digest(bytes: &[u8]) -> u32 {
  bytes.iter().fold(0u32, |acc, &b| acc.wrapping_add(b as u32))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_digest_is_zero() {
    assert_eq!(digest(&[]), 0);
  }

  #[test]
  fn depends_on_every_byte() {
    let base = digest(&[1, 2, 3, 4]);
    for i in 0..4 {
      let mut bytes = [1u8, 2, 3, 4];
      bytes[i] ^= 0xFF;
      assert_ne!(digest(&bytes), base, "byte {i} flip went undetected");
    }
  }

  #[test]
  fn wraps_instead_of_panicking() {
    let bytes = [255u8; 1024];
    assert_eq!(digest(&bytes), (255u32 * 1024) & 0xFFFF_FFFF);
  }
}
