//! Key Pair Pool
//!
//! Фоновая предварительная генерация DH пар ключей, чтобы убрать задержку
//! генерации из интерактивного пути.
//!
//! ## Native
//!
//! Ограниченный `tokio::sync::mpsc` канал (ёмкость из [`Config`]) и один
//! выделенный поток-производитель. `key_gen` блокируется только когда буфер
//! пуст.
//!
//! ```text
//! producer thread ──blocking_send──▶ [ bounded buffer ] ──blocking_recv──▶ key_gen()
//!        ▲                                                                  │
//!        └──────────── shutdown(): cancel flag + close() ◀──────────────────┘
//! ```
//!
//! `blocking_send` / `blocking_recv` must not be called from inside an async
//! runtime; `key_gen` is a synchronous API.
//!
//! ## WASM
//!
//! Нет фоновых потоков: пары генерируются пакетом при создании пула и
//! добавляются по требованию, когда очередь пуста.

use crate::config::Config;
use crate::crypto::keys::{generate_kem_key_pair, KemKeyPair};
use crate::crypto::provider::CryptoProvider;
use crate::error::CryptoError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tracing::{debug, trace, warn};

#[cfg(not(target_arch = "wasm32"))]
use std::sync::Arc;
#[cfg(not(target_arch = "wasm32"))]
use std::thread::{self, JoinHandle};
#[cfg(not(target_arch = "wasm32"))]
use tokio::sync::mpsc;

#[cfg(target_arch = "wasm32")]
use std::collections::VecDeque;

fn check_capacity(capacity: usize) -> Result<(), CryptoError> {
    if capacity == 0 {
        return Err(CryptoError::ConfigurationError(
            "Key pair pool capacity must be positive".to_string(),
        ));
    }
    Ok(())
}

/// Пул заранее сгенерированных DH пар
#[cfg(not(target_arch = "wasm32"))]
pub struct KeyPairPool<P: CryptoProvider> {
    receiver: Mutex<mpsc::Receiver<KemKeyPair<P>>>,
    cancelled: Arc<AtomicBool>,
    producer: Mutex<Option<JoinHandle<()>>>,
}

#[cfg(not(target_arch = "wasm32"))]
impl<P: CryptoProvider> KeyPairPool<P> {
    /// Создать пул с ёмкостью из глобальной конфигурации
    pub fn new() -> Result<Self, CryptoError> {
        Self::with_capacity(Config::global().keypair_pool_capacity)
    }

    /// Создать пул и запустить поток-производитель
    pub fn with_capacity(capacity: usize) -> Result<Self, CryptoError> {
        check_capacity(capacity)?;

        let (sender, receiver) = mpsc::channel(capacity);
        let cancelled = Arc::new(AtomicBool::new(false));
        let producer_flag = Arc::clone(&cancelled);

        let producer = thread::Builder::new()
            .name("kemdem-keypair-pool".to_string())
            .spawn(move || Self::produce(sender, producer_flag))
            .map_err(|e| {
                CryptoError::ConfigurationError(format!("Failed to spawn key pair producer: {}", e))
            })?;

        debug!(target: "crypto::pool", capacity, "Key pair pool started");

        Ok(Self {
            receiver: Mutex::new(receiver),
            cancelled,
            producer: Mutex::new(Some(producer)),
        })
    }

    fn produce(sender: mpsc::Sender<KemKeyPair<P>>, cancelled: Arc<AtomicBool>) {
        debug!(target: "crypto::pool", "Key pair producer running");

        while !cancelled.load(Ordering::Acquire) {
            let pair = match generate_kem_key_pair::<P>() {
                Ok(pair) => pair,
                Err(e) => {
                    warn!(target: "crypto::pool", error = %e, "Key pair generation failed, producer stopping");
                    break;
                }
            };

            // Err означает, что получатель закрыт (shutdown)
            if sender.blocking_send(pair).is_err() {
                break;
            }
        }

        debug!(target: "crypto::pool", "Key pair producer stopped");
    }

    /// Взять пару из пула, блокируясь если буфер пуст
    ///
    /// # Errors
    ///
    /// [`CryptoError::PoolClosed`] после `shutdown` или если производитель
    /// завершился.
    pub fn key_gen(&self) -> Result<KemKeyPair<P>, CryptoError> {
        if self.cancelled.load(Ordering::Acquire) {
            return Err(CryptoError::PoolClosed);
        }

        let mut receiver = self.receiver.lock().map_err(|_| CryptoError::PoolClosed)?;
        let pair = receiver.blocking_recv().ok_or(CryptoError::PoolClosed)?;
        trace!(target: "crypto::pool", "Key pair taken from pool");
        Ok(pair)
    }

    /// Остановить производителя и дождаться его завершения
    ///
    /// Idempotent. Closing the receiver wakes a producer blocked on a full
    /// buffer.
    pub fn shutdown(&self) {
        if self.cancelled.swap(true, Ordering::AcqRel) {
            return;
        }

        match self.receiver.lock() {
            Ok(mut receiver) => receiver.close(),
            Err(poisoned) => poisoned.into_inner().close(),
        }

        let handle = match self.producer.lock() {
            Ok(mut producer) => producer.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };

        if let Some(handle) = handle {
            if handle.join().is_err() {
                warn!(target: "crypto::pool", "Key pair producer panicked");
            }
        }

        debug!(target: "crypto::pool", "Key pair pool shut down");
    }

    pub fn is_closed(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Пул заранее сгенерированных DH пар (кооперативный вариант)
#[cfg(target_arch = "wasm32")]
pub struct KeyPairPool<P: CryptoProvider> {
    queue: Mutex<VecDeque<KemKeyPair<P>>>,
    cancelled: AtomicBool,
}

#[cfg(target_arch = "wasm32")]
impl<P: CryptoProvider> KeyPairPool<P> {
    pub fn new() -> Result<Self, CryptoError> {
        Self::with_capacity(Config::global().keypair_pool_capacity)
    }

    /// Сгенерировать пакет пар сразу
    pub fn with_capacity(capacity: usize) -> Result<Self, CryptoError> {
        check_capacity(capacity)?;

        let mut queue = VecDeque::with_capacity(capacity);
        for _ in 0..capacity {
            queue.push_back(generate_kem_key_pair::<P>()?);
        }

        debug!(target: "crypto::pool", capacity, "Key pair batch generated");

        Ok(Self {
            queue: Mutex::new(queue),
            cancelled: AtomicBool::new(false),
        })
    }

    pub fn key_gen(&self) -> Result<KemKeyPair<P>, CryptoError> {
        if self.cancelled.load(Ordering::Acquire) {
            return Err(CryptoError::PoolClosed);
        }

        let pooled = self
            .queue
            .lock()
            .map_err(|_| CryptoError::PoolClosed)?
            .pop_front();

        match pooled {
            Some(pair) => {
                trace!(target: "crypto::pool", "Key pair taken from pool");
                Ok(pair)
            }
            None => {
                trace!(target: "crypto::pool", "Pool empty, generating on demand");
                generate_kem_key_pair::<P>()
            }
        }
    }

    pub fn shutdown(&self) {
        if self.cancelled.swap(true, Ordering::AcqRel) {
            return;
        }
        match self.queue.lock() {
            Ok(mut queue) => queue.clear(),
            Err(poisoned) => {
                warn!(target: "crypto::pool", "Key pair queue poisoned");
                poisoned.into_inner().clear();
            }
        }
        debug!(target: "crypto::pool", "Key pair pool shut down");
    }

    pub fn is_closed(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl<P: CryptoProvider> Drop for KeyPairPool<P> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::suites::classic::ClassicSuiteProvider;

    type Pool = KeyPairPool<ClassicSuiteProvider>;

    #[test]
    fn test_pool_yields_distinct_pairs() {
        let pool = Pool::with_capacity(4).unwrap();
        let a = pool.key_gen().unwrap();
        let b = pool.key_gen().unwrap();
        assert_ne!(a.public_key, b.public_key);
        assert_eq!(
            ClassicSuiteProvider::kem_public_key(&a.private_key),
            a.public_key
        );
    }

    #[test]
    fn test_pool_survives_draining_past_capacity() {
        let pool = Pool::with_capacity(2).unwrap();
        for _ in 0..10 {
            assert!(pool.key_gen().is_ok());
        }
    }

    #[test]
    fn test_zero_capacity_is_configuration_error() {
        assert!(matches!(
            Pool::with_capacity(0),
            Err(CryptoError::ConfigurationError(_))
        ));
    }

    #[test]
    fn test_key_gen_after_shutdown_fails() {
        let pool = Pool::with_capacity(3).unwrap();
        pool.shutdown();
        assert!(pool.is_closed());
        assert!(matches!(pool.key_gen(), Err(CryptoError::PoolClosed)));
        // повторный shutdown безопасен
        pool.shutdown();
    }

    #[test]
    fn test_shutdown_with_full_buffer_terminates() {
        let pool = Pool::with_capacity(1).unwrap();
        // дать производителю заполнить буфер и заблокироваться
        std::thread::sleep(std::time::Duration::from_millis(50));
        drop(pool);
    }

    #[test]
    fn test_pool_is_shared_across_threads() {
        let pool = std::sync::Arc::new(Pool::with_capacity(8).unwrap());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let pool = std::sync::Arc::clone(&pool);
                std::thread::spawn(move || pool.key_gen().is_ok())
            })
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap());
        }
    }
}
