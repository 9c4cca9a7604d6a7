//! Committing DEM (SIV-style, tag as nonce)
//!
//! ```text
//! mac_key = H(key || "mac"),  enc_key = H(key || "enc")
//! iv      ← random(16)
//! tag     = MAC(MAC(MAC(mac_key, label), iv), message)
//! body    = CTR(enc_key, tag[..16], message)
//! → (iv || body, tag)
//! ```
//!
//! Каскад MAC: выход каждого шага становится ключом следующего, что
//! однозначно связывает упорядоченный кортеж (label, iv, message) без
//! кодирования длин.

use super::{CommittingCiphertext, CommittingDem};
use crate::config::Config;
use crate::crypto::keys::SecretKey;
use crate::crypto::provider::{CryptoProvider, DIGEST_LEN};
use crate::error::{CryptoError, Rejected};
use std::marker::PhantomData;
use subtle::ConstantTimeEq;
use tracing::{debug, trace};
use zeroize::{Zeroize, Zeroizing};

const MAC_LABEL: &[u8] = b"mac";
const ENC_LABEL: &[u8] = b"enc";
const IV_LEN: usize = 16;

pub struct SivDem<P: CryptoProvider> {
    _provider: PhantomData<P>,
}

impl<P: CryptoProvider> SivDem<P> {
    pub fn new() -> Result<Self, CryptoError> {
        Config::global().validate()?;
        Ok(Self {
            _provider: PhantomData,
        })
    }

    fn sub_key(key: &SecretKey, label: &[u8]) -> Zeroizing<[u8; DIGEST_LEN]> {
        Zeroizing::new(P::hash(&[key.as_bytes(), label]))
    }

    fn commit(
        mac_key: &[u8],
        label: &[u8],
        iv: &[u8],
        message: &[u8],
    ) -> Result<[u8; DIGEST_LEN], CryptoError> {
        let label_key = Zeroizing::new(P::mac(mac_key, label)?);
        let iv_key = Zeroizing::new(P::mac(&label_key[..], iv)?);
        P::mac(&iv_key[..], message)
    }
}

impl<P: CryptoProvider> CommittingDem for SivDem<P> {
    fn key_gen(&self) -> Result<SecretKey, CryptoError> {
        let seed = Zeroizing::new(P::random_bytes(DIGEST_LEN)?);
        SecretKey::from_slice(&seed)
            .ok_or_else(|| CryptoError::RandomError("Short read from random source".to_string()))
    }

    fn enc(
        &self,
        key: &SecretKey,
        message: &[u8],
        label: &[u8],
    ) -> Result<CommittingCiphertext, CryptoError> {
        let mac_key = Self::sub_key(key, MAC_LABEL);
        let enc_key = Self::sub_key(key, ENC_LABEL);
        let iv = P::random_bytes(IV_LEN)?;

        let tag = Self::commit(&mac_key[..], label, &iv, message)?;
        let body = P::ctr_keystream(&enc_key[..], &tag[..IV_LEN], message)?;

        let mut ciphertext = Vec::with_capacity(iv.len() + body.len());
        ciphertext.extend_from_slice(&iv);
        ciphertext.extend_from_slice(&body);

        trace!(target: "crypto::dem", len = message.len(), "Message encrypted");
        Ok(CommittingCiphertext {
            ciphertext,
            tag: tag.to_vec(),
        })
    }

    fn dec(
        &self,
        key: &SecretKey,
        ciphertext: &[u8],
        label: &[u8],
        tag: &[u8],
    ) -> Result<Vec<u8>, Rejected> {
        if ciphertext.len() < IV_LEN || tag.len() != DIGEST_LEN {
            debug!(
                target: "crypto::dem",
                ciphertext_len = ciphertext.len(),
                tag_len = tag.len(),
                "Decryption rejected: malformed input"
            );
            return Err(Rejected);
        }
        let (iv, body) = ciphertext.split_at(IV_LEN);

        let mac_key = Self::sub_key(key, MAC_LABEL);
        let enc_key = Self::sub_key(key, ENC_LABEL);

        let mut plaintext = P::ctr_keystream(&enc_key[..], &tag[..IV_LEN], body).map_err(|e| {
            debug!(target: "crypto::dem", error = %e, "Decryption rejected: cipher failure");
            Rejected
        })?;

        let verified = match Self::commit(&mac_key[..], label, iv, &plaintext) {
            Ok(expected) => bool::from(expected[..].ct_eq(tag)),
            Err(e) => {
                debug!(target: "crypto::dem", error = %e, "Decryption rejected: MAC failure");
                false
            }
        };

        if !verified {
            plaintext.zeroize();
            debug!(target: "crypto::dem", "Decryption rejected: tag mismatch");
            return Err(Rejected);
        }

        Ok(plaintext)
    }
}
