//! Криптографические наборы (Crypto Suites)
//!
//! Этот модуль содержит реализации CryptoProvider trait.
//!
//! ## Доступные наборы
//!
//! ### Classic Suite
//! - **KEM**: X25519 (ECDH на Curve25519), ключи в SPKI DER (44 байта)
//! - **Signatures**: Ed25519
//! - **Hash / MAC**: SHA-256 / HMAC-SHA256
//! - **Cipher**: AES-256-CTR
//! - **Key wrap**: AES-256-KW (RFC 3394)
//! - **Suite ID**: 1
//!
//! ## Выбор suite
//!
//! ```rust
//! use kemdem_core::crypto::suites::classic::ClassicSuiteProvider;
//! use kemdem_core::crypto::provider::CryptoProvider;
//!
//! // Classic suite для текущего использования
//! type MySuite = ClassicSuiteProvider;
//!
//! // Генерация ключей
//! let (private_key, public_key) = MySuite::generate_kem_keys()?;
//! # Ok::<(), kemdem_core::error::CryptoError>(())
//! ```

pub mod classic;
