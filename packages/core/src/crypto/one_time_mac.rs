// Poly1305 one-time MAC
// Самостоятельный примитив, не используется комбинаторами

use ::poly1305::universal_hash::KeyInit;
use ::poly1305::{Key, Poly1305};
use subtle::ConstantTimeEq;

pub const KEY_LEN: usize = 32;
pub const TAG_LEN: usize = 16;

/// Вычислить тег. Ключ (r || s) нельзя использовать повторно.
pub fn compute(key: &[u8; KEY_LEN], data: &[u8]) -> [u8; TAG_LEN] {
    Poly1305::new(Key::from_slice(key))
        .compute_unpadded(data)
        .into()
}

/// Проверить тег за постоянное время
pub fn verify(key: &[u8; KEY_LEN], data: &[u8], tag: &[u8]) -> bool {
    compute(key, data)[..].ct_eq(tag).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rfc8439_key() -> [u8; KEY_LEN] {
        hex::decode("85d6be7857556d337f4452fe42d506a80103808afb0db2fd4abff6af4149f51b")
            .unwrap()
            .try_into()
            .unwrap()
    }

    #[test]
    fn test_rfc8439_vector() {
        let tag = compute(&rfc8439_key(), b"Cryptographic Forum Research Group");
        assert_eq!(hex::encode(tag), "a8061dc1305136c6c22b8baf0c0127a9");
    }

    #[test]
    fn test_verify() {
        let key = rfc8439_key();
        let message = b"Cryptographic Forum Research Group";
        let tag = compute(&key, message);

        assert!(verify(&key, message, &tag));
        assert!(!verify(&key, b"Cryptographic Forum Research Grou", &tag));
        assert!(!verify(&key, message, &tag[..15]));
    }

    #[test]
    fn test_empty_input_yields_s() {
        let key = rfc8439_key();
        assert_eq!(&compute(&key, b"")[..], &key[16..]);
    }
}
