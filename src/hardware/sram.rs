// src/hardware/sram.rs - Firmware RAM where application globals live

pub const SRAM_LEN: usize = 256;

/// Little-endian byte-addressed RAM, as on the MSP430.
///
/// Out-of-range accesses read zero and drop writes, matching the bus's
/// treatment of anything it does not model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sram {
    bytes: [u8; SRAM_LEN],
}

impl Default for Sram {
    fn default() -> Self {
        Self { bytes: [0; SRAM_LEN] }
    }
}

impl Sram {
    pub fn read_u8(&self, addr: usize) -> u8 {
        self.bytes.get(addr).copied().unwrap_or(0)
    }

    pub fn write_u8(&mut self, addr: usize, value: u8) {
        if let Some(byte) = self.bytes.get_mut(addr) {
            *byte = value;
        }
    }

    pub fn read_u16(&self, addr: usize) -> u16 {
        u16::from_le_bytes([self.read_u8(addr), self.read_u8(addr + 1)])
    }

    pub fn write_u16(&mut self, addr: usize, value: u16) {
        for (i, b) in value.to_le_bytes().into_iter().enumerate() {
            self.write_u8(addr + i, b);
        }
    }

    pub fn read_i32(&self, addr: usize) -> i32 {
        let mut raw = [0u8; 4];
        for (i, b) in raw.iter_mut().enumerate() {
            *b = self.read_u8(addr + i);
        }
        i32::from_le_bytes(raw)
    }

    pub fn write_i32(&mut self, addr: usize, value: i32) {
        for (i, b) in value.to_le_bytes().into_iter().enumerate() {
            self.write_u8(addr + i, b);
        }
    }

    pub fn fill(&mut self, addr: usize, len: usize, value: u8) {
        for a in addr..addr.saturating_add(len) {
            self.write_u8(a, value);
        }
    }
}
