//! Durable byte storage for channel configuration

/// Byte-addressable durable store (EEPROM, flash emulation, ...)
///
/// Writes must be complete when `write` returns. Addresses outside
/// `capacity()` are never produced by this crate once a registry has been
/// constructed.
pub trait ConfigStore {
    /// Number of addressable bytes
    fn capacity(&self) -> usize;

    /// Read `buf.len()` bytes starting at `addr`
    fn read(&mut self, addr: usize, buf: &mut [u8]);

    /// Write `data` starting at `addr`
    fn write(&mut self, addr: usize, data: &[u8]);
}

/// Erased byte value of a fresh store
pub const ERASED: u8 = 0xFF;

/// RAM-backed store
///
/// Starts erased, so the first load behaves like a first boot.
#[derive(Debug, Clone)]
pub struct RamStore<const SIZE: usize> {
    bytes: [u8; SIZE],
}

impl<const SIZE: usize> RamStore<SIZE> {
    pub const fn new() -> Self {
        Self {
            bytes: [ERASED; SIZE],
        }
    }

    /// Raw contents
    pub const fn as_bytes(&self) -> &[u8; SIZE] {
        &self.bytes
    }
}

impl<const SIZE: usize> Default for RamStore<SIZE> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const SIZE: usize> ConfigStore for RamStore<SIZE> {
    fn capacity(&self) -> usize {
        SIZE
    }

    fn read(&mut self, addr: usize, buf: &mut [u8]) {
        match self.bytes.get(addr..addr + buf.len()) {
            Some(src) => buf.copy_from_slice(src),
            None => buf.fill(ERASED),
        }
    }

    fn write(&mut self, addr: usize, data: &[u8]) {
        if let Some(dst) = self.bytes.get_mut(addr..addr + data.len()) {
            dst.copy_from_slice(data);
        }
    }
}
