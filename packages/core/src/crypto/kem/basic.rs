//! Basic ECDH KEM
//!
//! ```text
//! encap(R):  (e, E) ← pool
//!            key = H(DH(e, R) || enc(E))
//!            → (key, enc(E))
//!
//! decap(r, enc(E)):
//!            key = H(DH(r, E) || enc(E))
//! ```

use super::{Encapsulation, Kem};
use crate::config::Config;
use crate::crypto::keys::{KemKeyPair, SecretKey};
use crate::crypto::pool::KeyPairPool;
use crate::crypto::provider::CryptoProvider;
use crate::error::{CryptoError, Rejected};
use std::sync::Arc;
use tracing::{debug, trace};

/// ECDH KEM поверх [`CryptoProvider`]
///
/// Both `key_gen` and the ephemeral pair of every `encap` are drawn from a
/// [`KeyPairPool`]. Clones share the same pool.
pub struct DhKem<P: CryptoProvider> {
    pool: Arc<KeyPairPool<P>>,
}

impl<P: CryptoProvider> DhKem<P> {
    /// Создать KEM со своим пулом (ёмкость из `Config`)
    pub fn new() -> Result<Self, CryptoError> {
        Config::global().validate()?;
        Ok(Self::with_pool(Arc::new(KeyPairPool::new()?)))
    }

    /// Создать KEM поверх общего пула
    pub fn with_pool(pool: Arc<KeyPairPool<P>>) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &Arc<KeyPairPool<P>> {
        &self.pool
    }

    /// Свежая эфемерная пара для одного вызова
    pub(crate) fn ephemeral(&self) -> Result<KemKeyPair<P>, CryptoError> {
        self.pool.key_gen()
    }
}

impl<P: CryptoProvider> Clone for DhKem<P> {
    fn clone(&self) -> Self {
        Self {
            pool: Arc::clone(&self.pool),
        }
    }
}

impl<P: CryptoProvider> Kem for DhKem<P> {
    type PublicKey = P::KemPublicKey;
    type PrivateKey = P::KemPrivateKey;

    fn key_gen(&self) -> Result<KemKeyPair<P>, CryptoError> {
        self.pool.key_gen()
    }

    fn encap(&self, recipient: &P::KemPublicKey) -> Result<(SecretKey, Encapsulation), CryptoError> {
        let ephemeral = self.ephemeral()?;
        let encoded = P::encode_public_key(&ephemeral.public_key);

        let shared_secret = P::diffie_hellman(&ephemeral.private_key, recipient)?;
        let key = SecretKey::from_bytes(P::hash(&[&shared_secret[..], &encoded]));

        trace!(target: "crypto::kem", "Encapsulated key");
        Ok((key, encoded))
    }

    fn decap(&self, private_key: &P::KemPrivateKey, encapsulated: &[u8]) -> Result<SecretKey, Rejected> {
        let ephemeral_public = P::decode_public_key(encapsulated).map_err(|e| {
            debug!(target: "crypto::kem", error = %e, "Decapsulation rejected: bad encoding");
            Rejected
        })?;

        let shared_secret = P::diffie_hellman(private_key, &ephemeral_public).map_err(|e| {
            debug!(target: "crypto::kem", error = %e, "Decapsulation rejected: key agreement");
            Rejected
        })?;

        Ok(SecretKey::from_bytes(P::hash(&[&shared_secret[..], encapsulated])))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::suites::classic::ClassicSuiteProvider;

    fn kem() -> DhKem<ClassicSuiteProvider> {
        DhKem::with_pool(Arc::new(KeyPairPool::with_capacity(4).unwrap()))
    }

    #[test]
    fn test_encap_decap_roundtrip() {
        let kem = kem();
        let recipient = kem.key_gen().unwrap();

        let (key, encapsulated) = kem.encap(&recipient.public_key).unwrap();
        assert_eq!(encapsulated.len(), 44);

        let recovered = kem.decap(&recipient.private_key, &encapsulated).unwrap();
        assert_eq!(key, recovered);
    }

    #[test]
    fn test_every_encap_uses_fresh_ephemeral() {
        let kem = kem();
        let recipient = kem.key_gen().unwrap();

        let (key_a, enc_a) = kem.encap(&recipient.public_key).unwrap();
        let (key_b, enc_b) = kem.encap(&recipient.public_key).unwrap();
        assert_ne!(enc_a, enc_b);
        assert_ne!(key_a, key_b);
    }

    #[test]
    fn test_wrong_private_key_gives_different_key() {
        let kem = kem();
        let recipient = kem.key_gen().unwrap();
        let other = kem.key_gen().unwrap();

        let (key, encapsulated) = kem.encap(&recipient.public_key).unwrap();
        let wrong = kem.decap(&other.private_key, &encapsulated).unwrap();
        assert_ne!(key, wrong);
    }

    #[test]
    fn test_malformed_encapsulation_is_rejected() {
        let kem = kem();
        let recipient = kem.key_gen().unwrap();
        let (_, encapsulated) = kem.encap(&recipient.public_key).unwrap();

        assert_eq!(kem.decap(&recipient.private_key, &[]), Err(Rejected));
        assert_eq!(
            kem.decap(&recipient.private_key, &encapsulated[..40]),
            Err(Rejected)
        );

        let mut bad_prefix = encapsulated.clone();
        bad_prefix[0] ^= 0x01;
        assert_eq!(kem.decap(&recipient.private_key, &bad_prefix), Err(Rejected));
    }

    #[test]
    fn test_low_order_point_is_rejected() {
        let kem = kem();
        let recipient = kem.key_gen().unwrap();
        let identity = x25519_dalek::PublicKey::from([0u8; 32]);
        let encoded = ClassicSuiteProvider::encode_public_key(&identity);
        assert_eq!(kem.decap(&recipient.private_key, &encoded), Err(Rejected));
    }

    #[test]
    fn test_new_from_global_config() {
        let kem = DhKem::<ClassicSuiteProvider>::new().unwrap();
        let recipient = kem.key_gen().unwrap();
        let (key, encapsulated) = kem.encap(&recipient.public_key).unwrap();
        assert_eq!(kem.decap(&recipient.private_key, &encapsulated).unwrap(), key);
    }

    #[test]
    fn test_clones_share_pool() {
        let kem = kem();
        let clone = kem.clone();
        assert!(Arc::ptr_eq(kem.pool(), clone.pool()));
    }
}
