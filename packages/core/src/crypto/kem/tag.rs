//! Tag KEM
//!
//! Привязывает внешний тег (обычно тег DEM) к KEM конверту, чтобы конверт
//! нельзя было склеить с другим шифртекстом.
//!
//! ```text
//! key(R):      (k, ek) = KEM.encap(R)
//!              mac_key = H(k || 0x00), enc_key = H(k || 0x01)
//! encap(tag):  → ek || MAC(mac_key, ek || tag)
//! decap:       split MAC, KEM.decap, recompute, constant-time compare
//! ```

use super::{Encapsulation, Kem};
use crate::crypto::keys::{KeyPair, SecretKey};
use crate::crypto::provider::{CryptoProvider, DIGEST_LEN};
use crate::error::{CryptoError, Rejected};
use std::marker::PhantomData;
use subtle::ConstantTimeEq;
use tracing::debug;

const MAC_KEY_SUFFIX: u8 = 0x00;
const ENC_KEY_SUFFIX: u8 = 0x01;

/// KEM that binds an externally supplied tag into its encapsulation
///
/// The key is released by [`TagKem::key`] before the tag is known, so a
/// sender can encrypt first and bind the resulting DEM tag afterwards.
pub trait TagKem {
    type PublicKey;
    type PrivateKey;
    /// Pending encapsulation between `key` and `encap`.
    type State;

    fn key_gen(&self) -> Result<KeyPair<Self::PublicKey, Self::PrivateKey>, CryptoError>;

    fn key(&self, recipient: &Self::PublicKey) -> Result<(SecretKey, Self::State), CryptoError>;

    fn encap(&self, state: Self::State, tag: &[u8]) -> Result<Encapsulation, CryptoError>;

    fn decap(
        &self,
        private_key: &Self::PrivateKey,
        encapsulated: &[u8],
        tag: &[u8],
    ) -> Result<SecretKey, Rejected>;
}

/// Состояние между `key` и `encap`
pub struct TagKemState {
    mac_key: SecretKey,
    encapsulated_key: Vec<u8>,
}

/// Tag KEM поверх любого [`Kem`] и HMAC провайдера
pub struct MacTagKem<K, P: CryptoProvider> {
    kem: K,
    _provider: PhantomData<P>,
}

impl<K: Kem, P: CryptoProvider> MacTagKem<K, P> {
    pub fn new(kem: K) -> Self {
        Self {
            kem,
            _provider: PhantomData,
        }
    }

    fn derive(key: &SecretKey, suffix: u8) -> SecretKey {
        SecretKey::from_bytes(P::hash(&[key.as_bytes(), &[suffix]]))
    }

    fn binding_mac(
        mac_key: &SecretKey,
        encapsulated_key: &[u8],
        tag: &[u8],
    ) -> Result<[u8; DIGEST_LEN], CryptoError> {
        let mut data = Vec::with_capacity(encapsulated_key.len() + tag.len());
        data.extend_from_slice(encapsulated_key);
        data.extend_from_slice(tag);
        P::mac(mac_key.as_bytes(), &data)
    }
}

impl<K: Kem, P: CryptoProvider> TagKem for MacTagKem<K, P> {
    type PublicKey = K::PublicKey;
    type PrivateKey = K::PrivateKey;
    type State = TagKemState;

    fn key_gen(&self) -> Result<KeyPair<K::PublicKey, K::PrivateKey>, CryptoError> {
        self.kem.key_gen()
    }

    fn key(&self, recipient: &K::PublicKey) -> Result<(SecretKey, TagKemState), CryptoError> {
        let (kem_key, encapsulated_key) = self.kem.encap(recipient)?;
        let state = TagKemState {
            mac_key: Self::derive(&kem_key, MAC_KEY_SUFFIX),
            encapsulated_key,
        };
        Ok((Self::derive(&kem_key, ENC_KEY_SUFFIX), state))
    }

    fn encap(&self, state: TagKemState, tag: &[u8]) -> Result<Encapsulation, CryptoError> {
        let TagKemState {
            mac_key,
            mut encapsulated_key,
        } = state;
        let mac = Self::binding_mac(&mac_key, &encapsulated_key, tag)?;

        encapsulated_key.extend_from_slice(&mac);
        Ok(encapsulated_key)
    }

    fn decap(
        &self,
        private_key: &K::PrivateKey,
        encapsulated: &[u8],
        tag: &[u8],
    ) -> Result<SecretKey, Rejected> {
        if encapsulated.len() < DIGEST_LEN {
            debug!(target: "crypto::tag_kem", len = encapsulated.len(), "Tag decapsulation rejected: too short");
            return Err(Rejected);
        }
        let (encapsulated_key, mac) = encapsulated.split_at(encapsulated.len() - DIGEST_LEN);

        let kem_key = self.kem.decap(private_key, encapsulated_key)?;
        let mac_key = Self::derive(&kem_key, MAC_KEY_SUFFIX);

        let expected = Self::binding_mac(&mac_key, encapsulated_key, tag).map_err(|e| {
            debug!(target: "crypto::tag_kem", error = %e, "Tag decapsulation rejected: MAC failure");
            Rejected
        })?;

        if !bool::from(expected[..].ct_eq(mac)) {
            debug!(target: "crypto::tag_kem", "Tag decapsulation rejected: MAC mismatch");
            return Err(Rejected);
        }

        Ok(Self::derive(&kem_key, ENC_KEY_SUFFIX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::kem::basic::DhKem;
    use crate::crypto::pool::KeyPairPool;
    use crate::crypto::suites::classic::ClassicSuiteProvider;
    use std::sync::Arc;

    type Suite = ClassicSuiteProvider;

    fn tag_kem() -> MacTagKem<DhKem<Suite>, Suite> {
        MacTagKem::new(DhKem::with_pool(Arc::new(
            KeyPairPool::with_capacity(4).unwrap(),
        )))
    }

    #[test]
    fn test_tag_roundtrip() {
        let kem = tag_kem();
        let recipient = kem.key_gen().unwrap();

        let (key, state) = kem.key(&recipient.public_key).unwrap();
        let encapsulated = kem.encap(state, b"dem tag").unwrap();
        assert_eq!(encapsulated.len(), 44 + 32);

        let recovered = kem
            .decap(&recipient.private_key, &encapsulated, b"dem tag")
            .unwrap();
        assert_eq!(key, recovered);
    }

    #[test]
    fn test_wrong_tag_is_rejected() {
        let kem = tag_kem();
        let recipient = kem.key_gen().unwrap();

        let (_, state) = kem.key(&recipient.public_key).unwrap();
        let encapsulated = kem.encap(state, b"tag one").unwrap();
        assert_eq!(
            kem.decap(&recipient.private_key, &encapsulated, b"tag two"),
            Err(Rejected)
        );
        assert_eq!(
            kem.decap(&recipient.private_key, &encapsulated, b""),
            Err(Rejected)
        );
    }

    #[test]
    fn test_delivered_key_is_not_the_mac_key() {
        let kem = tag_kem();
        let recipient = kem.key_gen().unwrap();

        let (key, state) = kem.key(&recipient.public_key).unwrap();
        assert_ne!(&key, &state.mac_key);
    }

    #[test]
    fn test_short_input_is_rejected() {
        let kem = tag_kem();
        let recipient = kem.key_gen().unwrap();
        assert_eq!(
            kem.decap(&recipient.private_key, &[0u8; 31], b"tag"),
            Err(Rejected)
        );
        assert_eq!(kem.decap(&recipient.private_key, &[], b"tag"), Err(Rejected));
    }

    #[test]
    fn test_wrong_recipient_is_rejected() {
        let kem = tag_kem();
        let recipient = kem.key_gen().unwrap();
        let other = kem.key_gen().unwrap();

        let (_, state) = kem.key(&recipient.public_key).unwrap();
        let encapsulated = kem.encap(state, b"tag").unwrap();
        assert_eq!(
            kem.decap(&other.private_key, &encapsulated, b"tag"),
            Err(Rejected)
        );
    }
}
