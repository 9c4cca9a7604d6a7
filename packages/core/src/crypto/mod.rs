//! Криптографический модуль
//!
//! # Архитектура
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Application                          │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                ┌─────────────┴─────────────┐
//!                ▼                           ▼
//! ┌───────────────────────────┐  ┌──────────────────────────┐
//! │   KEM (ключ + привязка)   │  │   CommittingDem (SIV)    │
//! │  - RatchetKem             │  │  - tag-as-nonce          │
//! │  - TagKem, MultiKem       │  │  - каскад HMAC           │
//! │  - DhAkem, SignedAkem     │  │                          │
//! └───────────────────────────┘  └──────────────────────────┘
//!                │         ▲ tag DEM          │
//!                │         └──────────────────┘
//!                ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  DhKem + KeyPairPool (фоновая генерация пар)                │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │              CryptoProvider (Crypto-Agility)                │
//! │  - X25519, Ed25519                                          │
//! │  - SHA-256, HMAC-SHA256                                     │
//! │  - AES-256-CTR, AES-KW                                      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Отправитель получает ключ от KEM, шифрует DEM, передаёт тег DEM обратно в
//! KEM для привязки и отправляет конкатенацию. Получатель проверяет перед
//! расшифровкой на каждом шаге.
//!
//! ## Модули
//!
//! ### Core Traits
//! - [`provider`]: CryptoProvider trait для crypto-agility
//! - [`kem`]: Kem, Akem, TagKem, MultiKem
//! - [`dem`]: CommittingDem
//! - [`ratchet`]: ReplyableKem
//!
//! ### Implementations
//! - [`suites`]: Реализации CryptoProvider (Classic)
//! - [`pool`]: KeyPairPool
//!
//! ### Utilities
//! - [`keys`]: KeyPair, SecretKey, составные ключи
//! - [`one_time_mac`]: Poly1305

// ============================================================================
// Core Traits
// ============================================================================

/// CryptoProvider trait для crypto-agility
pub mod provider;

/// Key Encapsulation Mechanisms
pub mod kem;

/// Data Encapsulation Mechanisms
pub mod dem;

/// Replyable ratcheting KEM
pub mod ratchet;

// ============================================================================
// Implementations
// ============================================================================

/// Криптографические наборы
pub mod suites;

/// Фоновый пул ключевых пар
pub mod pool;

// ============================================================================
// Utilities
// ============================================================================

pub mod keys;

pub mod one_time_mac;

// ============================================================================
// Re-exports для удобства
// ============================================================================

pub use provider::CryptoProvider;

pub type SuiteID = u16;
