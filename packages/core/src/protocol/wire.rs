// Wire format (длины в little-endian)
// Используется для сериализации конвертов KEM

use crate::error::CryptoError;

/// Построитель бинарного конверта
#[derive(Debug, Default)]
pub struct WireWriter {
    buffer: Vec<u8>,
}

impl WireWriter {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
        }
    }

    pub fn put_u16(&mut self, value: u16) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    pub fn put_u32(&mut self, value: u32) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    pub fn put_bytes(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Записать `u16` длину и сами байты
    pub fn put_u16_prefixed(&mut self, bytes: &[u8]) -> Result<(), CryptoError> {
        let len = u16::try_from(bytes.len()).map_err(|_| {
            CryptoError::InvalidInputError(format!(
                "Field of {} bytes does not fit a u16 length prefix",
                bytes.len()
            ))
        })?;
        self.put_u16(len);
        self.put_bytes(bytes);
        Ok(())
    }

    /// Записать `u32` длину и сами байты
    pub fn put_u32_prefixed(&mut self, bytes: &[u8]) -> Result<(), CryptoError> {
        let len = u32::try_from(bytes.len()).map_err(|_| {
            CryptoError::InvalidInputError(format!(
                "Field of {} bytes does not fit a u32 length prefix",
                bytes.len()
            ))
        })?;
        self.put_u32(len);
        self.put_bytes(bytes);
        Ok(())
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }
}

/// Курсор для чтения конверта
///
/// Every read is bounds-checked and returns `None` on truncation, so a
/// malformed envelope can never panic the decoder.
#[derive(Debug, Clone)]
pub struct WireReader<'a> {
    buffer: &'a [u8],
    position: usize,
}

impl<'a> WireReader<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self {
            buffer,
            position: 0,
        }
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len() - self.position
    }

    pub fn take(&mut self, len: usize) -> Option<&'a [u8]> {
        if len > self.remaining() {
            return None;
        }
        let slice = &self.buffer[self.position..self.position + len];
        self.position += len;
        Some(slice)
    }

    pub fn rest(&mut self) -> &'a [u8] {
        let slice = &self.buffer[self.position..];
        self.position = self.buffer.len();
        slice
    }

    pub fn get_u16(&mut self) -> Option<u16> {
        let bytes = self.take(2)?;
        Some(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    pub fn get_u32(&mut self) -> Option<u32> {
        let bytes = self.take(4)?;
        Some(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn get_u16_prefixed(&mut self) -> Option<&'a [u8]> {
        let len = self.get_u16()? as usize;
        self.take(len)
    }

    pub fn get_u32_prefixed(&mut self) -> Option<&'a [u8]> {
        let len = usize::try_from(self.get_u32()?).ok()?;
        self.take(len)
    }
}
