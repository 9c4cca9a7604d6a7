// Логирование ключевого материала

use base64::{engine::general_purpose, Engine as _};
use sha2::{Digest, Sha256};

/// Отпечаток ключа для логов: base64url(SHA-256(bytes)) без паддинга
///
/// Secret material must only ever reach a log line through this function.
pub fn fingerprint(bytes: &[u8]) -> String {
    general_purpose::URL_SAFE_NO_PAD.encode(Sha256::digest(bytes))
}
