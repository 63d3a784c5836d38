//! Simulated LS7366R for driver tests.
//!
//! [`FakeLs7366r`] implements the blocking [`SpiDevice`] trait and interprets
//! the chip's instruction protocol against in-memory register state, so the
//! driver's framing, width handling, and read-modify-write behavior can be
//! asserted without hardware. Register fields are public for direct
//! inspection and seeding from tests.

use embedded_hal::spi::{self, ErrorType, Operation, SpiDevice};

/// Injected bus fault. Maps onto the transport-error path of the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusFault;

impl spi::Error for BusFault {
    fn kind(&self) -> spi::ErrorKind {
        spi::ErrorKind::Other
    }
}

/// In-memory model of the chip's registers plus bookkeeping for assertions.
#[derive(Debug, Default)]
pub struct FakeLs7366r {
    pub mdr0: u8,
    pub mdr1: u8,
    pub dtr: u32,
    pub cntr: u32,
    pub otr: u32,
    pub status: u8,
    /// Number of SPI transactions performed.
    pub transactions: usize,
    /// When set, the next transaction fails with [`BusFault`] and the flag
    /// resets.
    pub fail_next: bool,
}

// Instruction decoding, mirroring the chip's IR layout.
const OP_MASK: u8 = 0xC0;
const OP_CLEAR: u8 = 0x00;
const OP_READ: u8 = 0x40;
const OP_WRITE: u8 = 0x80;
const OP_LOAD: u8 = 0xC0;

const REG_MASK: u8 = 0x38;
const REG_MDR0: u8 = 0x08;
const REG_MDR1: u8 = 0x10;
const REG_DTR: u8 = 0x18;
const REG_CNTR: u8 = 0x20;
const REG_OTR: u8 = 0x28;
const REG_STR: u8 = 0x30;

impl FakeLs7366r {
    /// Power-on state: all registers zero (4-byte width, counting enabled).
    pub fn new() -> Self {
        Self::default()
    }

    /// Run one chip transaction: `mosi[0]` is the instruction, the rest is
    /// payload. Response bytes are written to `miso` when provided.
    fn exchange(&mut self, mosi: &[u8], mut miso: Option<&mut [u8]>) {
        let Some((&instruction, payload)) = mosi.split_first() else {
            return;
        };
        if let Some(out) = miso.as_deref_mut() {
            out[0] = 0;
        }

        let register = instruction & REG_MASK;
        match instruction & OP_MASK {
            OP_CLEAR => match register {
                REG_MDR0 => self.mdr0 = 0,
                REG_MDR1 => self.mdr1 = 0,
                REG_CNTR => self.cntr = 0,
                REG_STR => self.status = 0,
                _ => {}
            },
            OP_LOAD => match register {
                REG_CNTR => self.cntr = self.dtr,
                REG_OTR => self.otr = self.cntr,
                _ => {}
            },
            OP_READ => {
                // A counter read latches CNTR into OTR and outputs OTR.
                if register == REG_CNTR {
                    self.otr = self.cntr;
                }
                let value = match register {
                    REG_MDR0 => u32::from(self.mdr0),
                    REG_MDR1 => u32::from(self.mdr1),
                    REG_CNTR | REG_OTR => self.otr,
                    REG_STR => u32::from(self.status),
                    _ => 0,
                };
                if let Some(out) = miso {
                    let n = payload.len();
                    for (i, byte) in out[1..].iter_mut().take(n).enumerate() {
                        *byte = (value >> (8 * (n - 1 - i))) as u8;
                    }
                }
            }
            OP_WRITE => {
                // Collect the payload MSB-first.
                let mut value = 0u32;
                for &byte in payload {
                    value = (value << 8) | u32::from(byte);
                }
                match register {
                    REG_MDR0 => self.mdr0 = value as u8,
                    REG_MDR1 => self.mdr1 = value as u8,
                    REG_DTR => self.dtr = value,
                    _ => {}
                }
            }
            _ => {}
        }
    }
}

impl ErrorType for FakeLs7366r {
    type Error = BusFault;
}

impl SpiDevice for FakeLs7366r {
    fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), BusFault> {
        if self.fail_next {
            self.fail_next = false;
            return Err(BusFault);
        }
        self.transactions += 1;

        for operation in operations {
            match operation {
                Operation::Write(buf) => self.exchange(buf, None),
                Operation::TransferInPlace(buf) => {
                    let mut mosi = [0u8; 8];
                    let len = buf.len();
                    mosi[..len].copy_from_slice(buf);
                    self.exchange(&mosi[..len], Some(buf));
                }
                Operation::Transfer(read, write) => {
                    let mosi: Vec<u8> = write.to_vec();
                    self.exchange(&mosi, Some(read));
                }
                Operation::Read(buf) => {
                    let mosi = vec![0u8; buf.len()];
                    self.exchange(&mosi, Some(buf));
                }
                Operation::DelayNs(_) => {}
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_then_read_mode_register() {
        let mut chip = FakeLs7366r::new();
        chip.transaction(&mut [Operation::Write(&[0x88, 0x5A])])
            .unwrap();
        assert_eq!(chip.mdr0, 0x5A);

        let mut buf = [0x48, 0x00];
        chip.transaction(&mut [Operation::TransferInPlace(&mut buf)])
            .unwrap();
        assert_eq!(buf[1], 0x5A);
    }

    #[test]
    fn injected_fault_fails_exactly_once() {
        let mut chip = FakeLs7366r::new();
        chip.fail_next = true;
        let mut buf = [0x48, 0x00];
        assert_eq!(
            chip.transaction(&mut [Operation::TransferInPlace(&mut buf)]),
            Err(BusFault)
        );
        assert!(chip
            .transaction(&mut [Operation::TransferInPlace(&mut buf)])
            .is_ok());
    }
}
