//! Adler-32 running checksum
//!
//! Both stack checksums are Adler-32 digests fed incrementally from the
//! fields they cover. A single changed byte anywhere in the covered input
//! always changes the digest.

const MOD_ADLER: u32 = 65_521;

/// Incremental Adler-32 state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Adler32 {
    a: u32,
    b: u32,
}

impl Adler32 {
    pub fn new() -> Self {
        Adler32 { a: 1, b: 0 }
    }

    /// Feed raw bytes into the digest
    pub fn update(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.a = (self.a + u32::from(byte)) % MOD_ADLER;
            self.b = (self.b + self.a) % MOD_ADLER;
        }
    }

    pub fn update_u64(&mut self, value: u64) {
        self.update(&value.to_le_bytes());
    }

    pub fn update_usize(&mut self, value: usize) {
        self.update(&value.to_le_bytes());
    }

    pub fn finish(&self) -> u32 {
        (self.b << 16) | self.a
    }
}

impl Default for Adler32 {
    fn default() -> Self {
        Self::new()
    }
}
