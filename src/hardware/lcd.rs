// src/hardware/lcd.rs - LCD_B segment memory

/// Number of LCD memory bytes the watch's glass is wired to.
pub const LCD_MEM_LEN: usize = 13;

/// One bank of LCD segment memory.
///
/// Indices past the end are treated as unwired: reads return 0, tests return
/// false and stores are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LcdBuffer {
    bytes: [u8; LCD_MEM_LEN],
}

impl LcdBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_bytes(bytes: [u8; LCD_MEM_LEN]) -> Self {
        Self { bytes }
    }

    pub fn get(&self, index: usize) -> u8 {
        self.bytes.get(index).copied().unwrap_or(0)
    }

    pub fn set(&mut self, index: usize, value: u8) {
        if let Some(byte) = self.bytes.get_mut(index) {
            *byte = value;
        }
    }

    /// True when any bit of `mask` is set at `index`.
    pub fn test(&self, index: usize, mask: u8) -> bool {
        self.get(index) & mask != 0
    }

    pub fn set_bits(&mut self, index: usize, mask: u8) {
        if let Some(byte) = self.bytes.get_mut(index) {
            *byte |= mask;
        }
    }

    pub fn clear_bits(&mut self, index: usize, mask: u8) {
        if let Some(byte) = self.bytes.get_mut(index) {
            *byte &= !mask;
        }
    }

    pub fn clear(&mut self) {
        self.bytes = [0; LCD_MEM_LEN];
    }

    pub fn as_bytes(&self) -> &[u8; LCD_MEM_LEN] {
        &self.bytes
    }

    pub fn is_blank(&self) -> bool {
        self.bytes.iter().all(|b| *b == 0)
    }
}
