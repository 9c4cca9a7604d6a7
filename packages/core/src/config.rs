//! Централизованная конфигурация для KEM/DEM Core
//!
//! Все размеры и лимиты определены здесь, чтобы избежать хардкода
//! по всему проекту.

use crate::error::CryptoError;
use std::sync::OnceLock;

/// Глобальная конфигурация (синглтон)
static GLOBAL_CONFIG: OnceLock<Config> = OnceLock::new();

/// Нижняя граница модуля RSA-KEM
pub const MIN_RSA_MODULUS_BITS: usize = 1024;

/// Основная структура конфигурации
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    // ============================================
    // КРИПТОГРАФИЧЕСКИЕ ПАРАМЕТРЫ
    // ============================================

    /// ID классического криптографического набора (Classic Suite)
    pub classic_suite_id: u16,

    /// Размер модуля RSA-KEM (в битах)
    pub rsa_modulus_bits: usize,

    // ============================================
    // ЛИМИТЫ
    // ============================================

    /// Ёмкость фонового пула ключевых пар
    pub keypair_pool_capacity: usize,

    /// Максимальное число получателей в multi-recipient конверте (DoS защита)
    pub multi_kem_max_recipients: usize,

    /// Максимальное число удалённых ключей в состоянии ratchet
    pub ratchet_max_recipients: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            // Криптография
            classic_suite_id: 1,
            rsa_modulus_bits: 3072,

            // Лимиты
            keypair_pool_capacity: 100,
            multi_kem_max_recipients: 100,
            ratchet_max_recipients: u16::MAX as usize,
        }
    }
}

impl Config {
    /// Создать конфигурацию из переменных окружения
    pub fn from_env() -> Self {
        let mut config = Self::default();

        // Переопределяем значения из env, если они заданы
        if let Ok(val) = std::env::var("KEYPAIR_POOL_CAPACITY") {
            if let Ok(parsed) = val.parse() {
                config.keypair_pool_capacity = parsed;
            }
        }

        if let Ok(val) = std::env::var("MULTI_KEM_MAX_RECIPIENTS") {
            if let Ok(parsed) = val.parse() {
                config.multi_kem_max_recipients = parsed;
            }
        }

        if let Ok(val) = std::env::var("RSA_MODULUS_BITS") {
            if let Ok(parsed) = val.parse() {
                config.rsa_modulus_bits = parsed;
            }
        }

        config
    }

    /// Проверить согласованность значений
    ///
    /// Некорректная конфигурация - фатальная ошибка при создании компонента.
    pub fn validate(&self) -> Result<(), CryptoError> {
        if self.keypair_pool_capacity == 0 {
            return Err(CryptoError::ConfigurationError(
                "keypair_pool_capacity must be positive".to_string(),
            ));
        }
        if self.rsa_modulus_bits < MIN_RSA_MODULUS_BITS {
            return Err(CryptoError::ConfigurationError(format!(
                "rsa_modulus_bits must be at least {}",
                MIN_RSA_MODULUS_BITS
            )));
        }
        if self.multi_kem_max_recipients == 0 || self.multi_kem_max_recipients > u16::MAX as usize {
            return Err(CryptoError::ConfigurationError(format!(
                "multi_kem_max_recipients must be within 1..={}",
                u16::MAX
            )));
        }
        if self.ratchet_max_recipients == 0 || self.ratchet_max_recipients > u16::MAX as usize {
            return Err(CryptoError::ConfigurationError(format!(
                "ratchet_max_recipients must be within 1..={}",
                u16::MAX
            )));
        }
        Ok(())
    }

    /// Получить глобальный экземпляр конфигурации
    ///
    /// Автоматически инициализирует конфигурацию со значениями по умолчанию при первом вызове
    pub fn global() -> &'static Config {
        GLOBAL_CONFIG.get_or_init(Config::default)
    }

    /// Инициализировать глобальную конфигурацию со значениями по умолчанию
    ///
    /// # Errors
    ///
    /// Возвращает ошибку, если конфигурация уже была инициализирована
    pub fn init() -> Result<(), &'static str> {
        GLOBAL_CONFIG
            .set(Self::default())
            .map_err(|_| "Config already initialized")
    }

    /// Инициализировать глобальную конфигурацию из переменных окружения
    ///
    /// # Errors
    ///
    /// Возвращает ошибку, если конфигурация уже была инициализирована
    pub fn init_from_env() -> Result<(), &'static str> {
        GLOBAL_CONFIG
            .set(Self::from_env())
            .map_err(|_| "Config already initialized")
    }

    /// Инициализировать глобальную конфигурацию с кастомным экземпляром
    ///
    /// # Errors
    ///
    /// Возвращает ошибку, если конфигурация уже была инициализирована
    pub fn init_with(config: Config) -> Result<(), &'static str> {
        GLOBAL_CONFIG.set(config).map_err(|_| "Config already initialized")
    }

    /// Проверить, инициализирована ли глобальная конфигурация
    pub fn is_initialized() -> bool {
        GLOBAL_CONFIG.get().is_some()
    }
}
