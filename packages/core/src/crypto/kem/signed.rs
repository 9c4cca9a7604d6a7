//! Signed AKEM (explicit authentication)
//!
//! Составной ключ: независимая KEM пара + независимая пара подписи.
//!
//! ```text
//! auth_encap:  (key, ek) = KEM.encap(R.kem)
//!              sig = Sign(S.signing, ek)
//!              → u32_le(len(ek)) || ek || sig
//!
//! auth_decap:  verify(S.verifying, ek, sig)   ← сначала подпись
//!              KEM.decap(R.kem, ek)           ← только после проверки
//! ```

use super::{Akem, Encapsulation, Kem};
use crate::crypto::keys::{
    generate_signature_key_pair, KeyPair, SecretKey, SignedKeyPair, SignedPrivateKey,
    SignedPublicKey,
};
use crate::crypto::provider::CryptoProvider;
use crate::error::{CryptoError, Rejected};
use crate::protocol::wire::{WireReader, WireWriter};
use std::marker::PhantomData;
use tracing::debug;

/// Подписанный AKEM поверх любого KEM с ключами провайдера `P`
pub struct SignedAkem<K, P: CryptoProvider> {
    kem: K,
    _provider: PhantomData<P>,
}

impl<K, P> SignedAkem<K, P>
where
    K: Kem<PublicKey = P::KemPublicKey, PrivateKey = P::KemPrivateKey>,
    P: CryptoProvider,
{
    pub fn new(kem: K) -> Self {
        Self {
            kem,
            _provider: PhantomData,
        }
    }
}

impl<K, P> Akem for SignedAkem<K, P>
where
    K: Kem<PublicKey = P::KemPublicKey, PrivateKey = P::KemPrivateKey>,
    P: CryptoProvider,
{
    type PublicKey = SignedPublicKey<P>;
    type PrivateKey = SignedPrivateKey<P>;

    fn key_gen(&self) -> Result<SignedKeyPair<P>, CryptoError> {
        let kem_pair = self.kem.key_gen()?;
        let signature_pair = generate_signature_key_pair::<P>()?;

        Ok(KeyPair::new(
            SignedPublicKey {
                kem: kem_pair.public_key,
                verifying: signature_pair.public_key,
            },
            SignedPrivateKey {
                kem: kem_pair.private_key,
                signing: signature_pair.private_key,
            },
        ))
    }

    fn auth_encap(
        &self,
        sender: &SignedPrivateKey<P>,
        recipient: &SignedPublicKey<P>,
    ) -> Result<(SecretKey, Encapsulation), CryptoError> {
        let (key, encapsulated) = self.kem.encap(&recipient.kem)?;
        let signature = P::sign(&sender.signing, &encapsulated)?;

        let mut writer = WireWriter::with_capacity(4 + encapsulated.len() + signature.len());
        writer.put_u32_prefixed(&encapsulated)?;
        writer.put_bytes(&signature);
        Ok((key, writer.into_bytes()))
    }

    fn auth_decap(
        &self,
        recipient: &SignedPrivateKey<P>,
        sender: &SignedPublicKey<P>,
        encapsulated: &[u8],
    ) -> Result<SecretKey, Rejected> {
        let mut reader = WireReader::new(encapsulated);
        let inner = reader.get_u32_prefixed().ok_or_else(|| {
            debug!(target: "crypto::signed_akem", "Signed decapsulation rejected: truncated");
            Rejected
        })?;
        let signature = reader.rest();

        if let Err(e) = P::verify(&sender.verifying, inner, signature) {
            debug!(target: "crypto::signed_akem", error = %e, "Signed decapsulation rejected: signature");
            return Err(Rejected);
        }

        self.kem.decap(&recipient.kem, inner)
    }
}
