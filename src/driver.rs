//! Low-level LS7366R transaction driver.
//!
//! Implements the instruction-byte framing and the width-aware register
//! read/write primitives on top of a blocking SPI device.
//!
//! This module is crate-private — consumers interact with [`Ls7366r`]
//! in `counter.rs` instead.
//!
//! [`Ls7366r`]: crate::Ls7366r

use embedded_hal::spi::SpiDevice;

use crate::error::CounterError;
use crate::registers::{instruction, Field, Opcode, Register, COUNTER_WIDTH};

/// Widest possible transaction: instruction byte plus a 4-byte payload.
const MAX_TRANSACTION: usize = 5;

/// Low-level transaction driver.
///
/// Owns an SPI device and provides register primitives that respect the
/// chip's variable counter width. The width is re-read from MDR1 for every
/// counter-sized transaction; caching it would silently corrupt transfers
/// after a width change.
pub(crate) struct SpiDriver<SPI> {
    pub(crate) spi: SPI,
}

impl<SPI> SpiDriver<SPI>
where
    SPI: SpiDevice,
{
    /// Create a new driver.
    ///
    /// # Arguments
    /// * `spi` — SPI device (takes ownership for exclusive access)
    pub fn new(spi: SPI) -> Self {
        Self { spi }
    }

    /// Consume the driver and return the SPI device.
    pub fn release(self) -> SPI {
        self.spi
    }

    // -----------------------------------------------------------------------
    // Width resolution
    // -----------------------------------------------------------------------

    /// Current counter width in bits, read fresh from MDR1.
    pub fn counter_bits(&mut self) -> Result<u8, CounterError<SPI::Error>> {
        let field = self.read_field(COUNTER_WIDTH)?;
        Ok((4 - field) * 8)
    }

    /// Payload length in bytes for a transaction on `register`.
    ///
    /// Mode and status registers are fixed at one byte; the data, counter,
    /// and output registers follow the counter width configured in MDR1 at
    /// the time of the call.
    fn transaction_len(&mut self, register: Register) -> Result<usize, CounterError<SPI::Error>> {
        match register {
            Register::Mode0 | Register::Mode1 | Register::Status => Ok(1),
            Register::DataTransfer | Register::Counter | Register::OutputCounter => {
                Ok(usize::from(self.counter_bits()? / 8))
            }
        }
    }

    // -----------------------------------------------------------------------
    // Core transaction primitives
    // -----------------------------------------------------------------------

    /// Read a register and assemble its payload bytes MSB-first.
    ///
    /// Sends the read instruction followed by zero filler bytes in one
    /// full-duplex transfer. The first response byte is clocked out while
    /// the instruction shifts in and carries no data, so it is discarded.
    pub fn read_register(&mut self, register: Register) -> Result<u32, CounterError<SPI::Error>> {
        let len = self.transaction_len(register)?;

        let mut buf = [0u8; MAX_TRANSACTION];
        buf[0] = instruction(Opcode::Read, register);
        self.spi.transfer_in_place(&mut buf[..len + 1])?;

        let mut value = 0u32;
        for &byte in &buf[1..len + 1] {
            value = (value << 8) | u32::from(byte);
        }
        Ok(value)
    }

    /// Write a register, serializing the low `len` bytes of `value` MSB-first.
    ///
    /// The payload length follows the counter width configured at call time:
    /// a write issued before a width change transmits at the old width.
    pub fn write_register(
        &mut self,
        register: Register,
        value: u32,
    ) -> Result<(), CounterError<SPI::Error>> {
        let len = self.transaction_len(register)?;

        let mut buf = [0u8; MAX_TRANSACTION];
        buf[0] = instruction(Opcode::Write, register);
        for (i, byte) in buf[1..len + 1].iter_mut().enumerate() {
            *byte = (value >> (8 * (len - 1 - i))) as u8;
        }
        self.spi.write(&buf[..len + 1])?;

        Ok(())
    }

    /// Trigger an in-device parallel transfer into `register`.
    ///
    /// Single-byte transaction, no payload: DTR to CNTR for the counter,
    /// CNTR to OTR for the output register.
    pub fn load(&mut self, register: Register) -> Result<(), CounterError<SPI::Error>> {
        self.spi.write(&[instruction(Opcode::Load, register)])?;
        Ok(())
    }

    /// Reset `register` to its power-on contents.
    pub fn clear(&mut self, register: Register) -> Result<(), CounterError<SPI::Error>> {
        self.spi.write(&[instruction(Opcode::Clear, register)])?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Mode bit fields
    // -----------------------------------------------------------------------

    /// Read one configuration sub-field out of its mode register.
    pub fn read_field(&mut self, field: Field) -> Result<u8, CounterError<SPI::Error>> {
        let byte = self.read_register(field.register)? as u8;
        Ok((byte >> field.shift) & field.mask)
    }

    /// Read-modify-write one configuration sub-field, leaving its sibling
    /// fields untouched.
    ///
    /// Spans two bus transactions with no interlock; callers must serialize
    /// access to the device externally.
    pub fn write_field(&mut self, field: Field, bits: u8) -> Result<(), CounterError<SPI::Error>> {
        debug_assert_eq!(bits & !field.mask, 0, "field value exceeds its mask");

        let byte = self.read_register(field.register)? as u8;
        let merged = (byte & !(field.mask << field.shift)) | ((bits & field.mask) << field.shift);
        self.write_register(field.register, u32::from(merged))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
