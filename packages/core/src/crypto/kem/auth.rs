//! Authenticated KEM (implicit authentication)
//!
//! ```text
//! auth_encap(s, R):  (e, E) ← pool
//!                    key = H(DH(e, R) || DH(s, R) || enc(E))
//!
//! auth_decap(r, S, enc(E)):
//!                    key = H(DH(r, E) || DH(r, S) || enc(E))
//! ```
//!
//! Нет явной проверки: неверный ключ отправителя даёт неверный ключ, и
//! проверка DEM / MAC дальше по цепочке не проходит.

use super::basic::DhKem;
use super::{Akem, Encapsulation};
use crate::crypto::keys::{KemKeyPair, SecretKey};
use crate::crypto::provider::CryptoProvider;
use crate::error::{CryptoError, Rejected};
use tracing::debug;

pub struct DhAkem<P: CryptoProvider> {
    kem: DhKem<P>,
}

impl<P: CryptoProvider> DhAkem<P> {
    /// Проверяет глобальную конфигурацию (через [`DhKem::new`])
    pub fn new() -> Result<Self, CryptoError> {
        Ok(Self::with_kem(DhKem::new()?))
    }

    pub fn with_kem(kem: DhKem<P>) -> Self {
        Self { kem }
    }
}

impl<P: CryptoProvider> Akem for DhAkem<P> {
    type PublicKey = P::KemPublicKey;
    type PrivateKey = P::KemPrivateKey;

    fn key_gen(&self) -> Result<KemKeyPair<P>, CryptoError> {
        self.kem.ephemeral()
    }

    fn auth_encap(
        &self,
        sender: &P::KemPrivateKey,
        recipient: &P::KemPublicKey,
    ) -> Result<(SecretKey, Encapsulation), CryptoError> {
        let ephemeral = self.kem.ephemeral()?;
        let encoded = P::encode_public_key(&ephemeral.public_key);

        let ephemeral_secret = P::diffie_hellman(&ephemeral.private_key, recipient)?;
        let static_secret = P::diffie_hellman(sender, recipient)?;

        let key = SecretKey::from_bytes(P::hash(&[
            &ephemeral_secret[..],
            &static_secret[..],
            &encoded,
        ]));
        Ok((key, encoded))
    }

    fn auth_decap(
        &self,
        recipient: &P::KemPrivateKey,
        sender: &P::KemPublicKey,
        encapsulated: &[u8],
    ) -> Result<SecretKey, Rejected> {
        let reject = |stage: &str, e: CryptoError| {
            debug!(target: "crypto::akem", stage, error = %e, "Authenticated decapsulation rejected");
            Rejected
        };

        let ephemeral_public =
            P::decode_public_key(encapsulated).map_err(|e| reject("decode", e))?;
        let ephemeral_secret =
            P::diffie_hellman(recipient, &ephemeral_public).map_err(|e| reject("ephemeral", e))?;
        let static_secret = P::diffie_hellman(recipient, sender).map_err(|e| reject("static", e))?;

        Ok(SecretKey::from_bytes(P::hash(&[
            &ephemeral_secret[..],
            &static_secret[..],
            encapsulated,
        ])))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::kem::Kem;
    use crate::crypto::pool::KeyPairPool;
    use crate::crypto::suites::classic::ClassicSuiteProvider;
    use std::sync::Arc;

    fn akem() -> DhAkem<ClassicSuiteProvider> {
        DhAkem::with_kem(DhKem::with_pool(Arc::new(
            KeyPairPool::with_capacity(4).unwrap(),
        )))
    }

    #[test]
    fn test_auth_roundtrip() {
        let akem = akem();
        let alice = akem.key_gen().unwrap();
        let bob = akem.key_gen().unwrap();

        let (key, encapsulated) = akem.auth_encap(&alice.private_key, &bob.public_key).unwrap();
        let recovered = akem
            .auth_decap(&bob.private_key, &alice.public_key, &encapsulated)
            .unwrap();
        assert_eq!(key, recovered);
    }

    #[test]
    fn test_wrong_sender_yields_different_key() {
        let akem = akem();
        let alice = akem.key_gen().unwrap();
        let bob = akem.key_gen().unwrap();
        let mallory = akem.key_gen().unwrap();

        let (key, encapsulated) = akem.auth_encap(&mallory.private_key, &bob.public_key).unwrap();
        let recovered = akem
            .auth_decap(&bob.private_key, &alice.public_key, &encapsulated)
            .unwrap();
        assert_ne!(key, recovered);
    }

    #[test]
    fn test_differs_from_basic_kem_key() {
        let akem = akem();
        let alice = akem.key_gen().unwrap();
        let bob = akem.key_gen().unwrap();

        let (key, encapsulated) = akem.auth_encap(&alice.private_key, &bob.public_key).unwrap();
        let basic = akem.kem.decap(&bob.private_key, &encapsulated).unwrap();
        assert_ne!(key, basic);
    }

    #[test]
    fn test_new_from_global_config() {
        let akem = DhAkem::<ClassicSuiteProvider>::new().unwrap();
        let alice = akem.key_gen().unwrap();
        let bob = akem.key_gen().unwrap();

        let (key, encapsulated) = akem.auth_encap(&alice.private_key, &bob.public_key).unwrap();
        assert_eq!(
            akem.auth_decap(&bob.private_key, &alice.public_key, &encapsulated)
                .unwrap(),
            key
        );
    }

    #[test]
    fn test_garbage_is_rejected() {
        let akem = akem();
        let alice = akem.key_gen().unwrap();
        let bob = akem.key_gen().unwrap();
        assert_eq!(
            akem.auth_decap(&bob.private_key, &alice.public_key, &[0u8; 44]),
            Err(Rejected)
        );
    }
}
