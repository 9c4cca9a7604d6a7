use crate::crypto::provider::{CryptoProvider, DIGEST_LEN};
use crate::crypto::SuiteID;
use crate::error::CryptoError;
use aes::cipher::generic_array::GenericArray;
use aes::Aes256;
use aes_kw::Kek;
use ctr::cipher::{KeyIvInit, StreamCipher};
use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey};
use hmac::{Hmac, Mac};
use rand::rngs::OsRng;
use rand_core::RngCore;
use sha2::{Digest, Sha256};
use x25519_dalek::{PublicKey as X25519PublicKey, StaticSecret};
use zeroize::Zeroizing;

type HmacSha256 = Hmac<Sha256>;
type Aes256Ctr = ctr::Ctr128BE<Aes256>;

/// DER prefix of an RFC 8410 SubjectPublicKeyInfo carrying an X25519 key.
const X25519_SPKI_PREFIX: [u8; 12] = [
    0x30, 0x2a, 0x30, 0x05, 0x06, 0x03, 0x2b, 0x65, 0x6e, 0x03, 0x21, 0x00,
];

/// RFC 3394 integrity check value length.
const KEY_WRAP_OVERHEAD: usize = 8;

/// Concrete implementation of `CryptoProvider` for the classic suite.
///
/// - **KEM**: X25519
/// - **Signatures**: Ed25519
/// - **Hash / MAC**: SHA-256 / HMAC-SHA256
/// - **Cipher**: AES-256-CTR
/// - **Key wrap**: AES-256-KW (RFC 3394)
pub struct ClassicSuiteProvider;

impl CryptoProvider for ClassicSuiteProvider {
    type KemPublicKey = X25519PublicKey;
    type KemPrivateKey = StaticSecret;
    type SignaturePublicKey = VerifyingKey;
    type SignaturePrivateKey = SigningKey;

    fn generate_kem_keys() -> Result<(Self::KemPrivateKey, Self::KemPublicKey), CryptoError> {
        let private_key = StaticSecret::random_from_rng(OsRng);
        let public_key = X25519PublicKey::from(&private_key);
        Ok((private_key, public_key))
    }

    fn kem_public_key(private_key: &Self::KemPrivateKey) -> Self::KemPublicKey {
        X25519PublicKey::from(private_key)
    }

    fn encode_public_key(public_key: &Self::KemPublicKey) -> Vec<u8> {
        let mut encoded = Vec::with_capacity(X25519_SPKI_PREFIX.len() + 32);
        encoded.extend_from_slice(&X25519_SPKI_PREFIX);
        encoded.extend_from_slice(public_key.as_bytes());
        encoded
    }

    fn decode_public_key(encoded: &[u8]) -> Result<Self::KemPublicKey, CryptoError> {
        let point = encoded
            .strip_prefix(&X25519_SPKI_PREFIX[..])
            .ok_or_else(|| CryptoError::InvalidInputError("Not an X25519 SPKI encoding".to_string()))?;
        let bytes: [u8; 32] = point
            .try_into()
            .map_err(|_| CryptoError::InvalidInputError("Invalid X25519 public key length".to_string()))?;
        Ok(X25519PublicKey::from(bytes))
    }

    fn private_key_bytes(private_key: &Self::KemPrivateKey) -> Zeroizing<Vec<u8>> {
        Zeroizing::new(private_key.to_bytes().to_vec())
    }

    fn diffie_hellman(
        private_key: &Self::KemPrivateKey,
        public_key: &Self::KemPublicKey,
    ) -> Result<Zeroizing<[u8; DIGEST_LEN]>, CryptoError> {
        let shared_secret = private_key.diffie_hellman(public_key);
        if !shared_secret.was_contributory() {
            return Err(CryptoError::KeyAgreementError(
                "Non-contributory X25519 result".to_string(),
            ));
        }
        Ok(Zeroizing::new(shared_secret.to_bytes()))
    }

    fn generate_signature_keys(
    ) -> Result<(Self::SignaturePrivateKey, Self::SignaturePublicKey), CryptoError> {
        let signing_key = SigningKey::generate(&mut OsRng);
        let verifying_key = signing_key.verifying_key();
        Ok((signing_key, verifying_key))
    }

    fn sign(private_key: &Self::SignaturePrivateKey, message: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let signature = private_key.try_sign(message)?;
        Ok(signature.to_bytes().to_vec())
    }

    fn verify(
        public_key: &Self::SignaturePublicKey,
        message: &[u8],
        signature: &[u8],
    ) -> Result<(), CryptoError> {
        let signature_obj = Signature::from_slice(signature)
            .map_err(|e| CryptoError::SignatureVerificationError(e.to_string()))?;

        public_key
            .verify_strict(message, &signature_obj)
            .map_err(|e| CryptoError::SignatureVerificationError(e.to_string()))
    }

    fn hash(chunks: &[&[u8]]) -> [u8; DIGEST_LEN] {
        let mut hasher = Sha256::new();
        for chunk in chunks {
            hasher.update(chunk);
        }
        hasher.finalize().into()
    }

    fn mac(key: &[u8], data: &[u8]) -> Result<[u8; DIGEST_LEN], CryptoError> {
        let mut mac = HmacSha256::new_from_slice(key)
            .map_err(|e| CryptoError::InvalidInputError(format!("Invalid HMAC key: {}", e)))?;
        mac.update(data);
        Ok(mac.finalize().into_bytes().into())
    }

    fn ctr_keystream(key: &[u8], iv: &[u8], data: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let mut cipher = Aes256Ctr::new_from_slices(key, iv)
            .map_err(|e| CryptoError::CipherError(format!("Invalid AES-CTR key or IV: {}", e)))?;
        let mut output = data.to_vec();
        cipher.apply_keystream(&mut output);
        Ok(output)
    }

    fn wrap_key(kek: &[u8], key: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let kek = Self::key_wrap_cipher(kek)?;
        let mut wrapped = vec![0u8; key.len() + KEY_WRAP_OVERHEAD];
        kek.wrap(key, &mut wrapped)
            .map_err(|e| CryptoError::KeyWrapError(format!("{:?}", e)))?;
        Ok(wrapped)
    }

    fn unwrap_key(kek: &[u8], wrapped: &[u8]) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
        if wrapped.len() < 3 * KEY_WRAP_OVERHEAD || wrapped.len() % KEY_WRAP_OVERHEAD != 0 {
            return Err(CryptoError::KeyWrapError(format!(
                "Invalid wrapped key length: {}",
                wrapped.len()
            )));
        }
        let kek = Self::key_wrap_cipher(kek)?;
        let mut unwrapped = Zeroizing::new(vec![0u8; wrapped.len() - KEY_WRAP_OVERHEAD]);
        kek.unwrap(wrapped, &mut unwrapped)
            .map_err(|e| CryptoError::KeyWrapError(format!("{:?}", e)))?;
        Ok(unwrapped)
    }

    fn random_bytes(len: usize) -> Result<Vec<u8>, CryptoError> {
        let mut bytes = vec![0u8; len];
        OsRng.try_fill_bytes(&mut bytes)?;
        Ok(bytes)
    }

    fn suite_id() -> SuiteID {
        crate::config::Config::global().classic_suite_id
    }
}

impl ClassicSuiteProvider {
    fn key_wrap_cipher(kek: &[u8]) -> Result<Kek<Aes256>, CryptoError> {
        if kek.len() != 32 {
            return Err(CryptoError::KeyWrapError(format!(
                "Invalid KEK length: {}",
                kek.len()
            )));
        }
        Ok(Kek::new(GenericArray::from_slice(kek)))
    }
}
