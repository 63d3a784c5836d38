//! High-level interface for the LS7366R quadrature counter.
//!
//! [`Ls7366r`] wraps the low-level transaction driver with input validation,
//! the logical-to-physical value maps for the packed mode fields, and signed
//! decoding of the counter at its configured width.

use embedded_hal::spi::SpiDevice;

use crate::driver::SpiDriver;
use crate::error::CounterError;
use crate::registers::{
    Register, COUNTER_WIDTH, COUNT_DISABLE, DEFAULT_MDR0, DEFAULT_MDR1, FILTER_DIVISION,
    FLAG_SOURCES, INDEX_MODE, INDEX_SYNC, QUADRATURE, RUNNING_MODE, STATUS_BORROW, STATUS_CARRY,
    STATUS_COMPARE, STATUS_COUNT_ENABLE, STATUS_DIRECTION, STATUS_INDEX, STATUS_POWER_LOSS,
    STATUS_SIGN,
};

/// Counter running mode (MDR0 bits 3:2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RunningMode {
    /// Count freely over the full range, wrapping on overflow.
    FreeRun,
    /// Count once between zero and the DTR value, then stop.
    SingleCycle,
    /// Confine the count to the range 0..=DTR.
    RangeLimit,
    /// Count modulo DTR + 1.
    ModuloN,
}

/// Index input mode (MDR0 bits 5:4).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IndexMode {
    /// Index input ignored.
    Disabled,
    /// Index pulse transfers DTR into the counter.
    LoadCounter,
    /// Index pulse resets the counter to zero.
    ResetCounter,
    /// Index pulse transfers the counter into the output register.
    LoadOutput,
}

/// Selection of events routed to the FLAG output pins (MDR1 bits 7:4).
///
/// The four sources are independent and may be combined freely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FlagSources {
    /// Flag on index pulse.
    pub index: bool,
    /// Flag on compare (CNTR = DTR).
    pub compare: bool,
    /// Flag on counter underflow.
    pub borrow: bool,
    /// Flag on counter overflow.
    pub carry: bool,
}

/// Snapshot of the read-only status register.
///
/// The latch bits (index, compare, borrow, carry, power loss) stay set until
/// the status register is cleared; the remaining bits echo live state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Status {
    raw: u8,
}

impl Status {
    /// The raw status byte.
    #[inline]
    pub fn raw(&self) -> u8 {
        self.raw
    }

    /// Sign of the count at the last borrow/carry boundary (true = negative).
    #[inline]
    pub fn negative(&self) -> bool {
        self.bit(STATUS_SIGN)
    }

    /// Current count direction (true = counting up).
    #[inline]
    pub fn counting_up(&self) -> bool {
        self.bit(STATUS_DIRECTION)
    }

    /// Power loss latch. Set at power-up until the status register is cleared.
    #[inline]
    pub fn power_lost(&self) -> bool {
        self.bit(STATUS_POWER_LOSS)
    }

    /// Echo of the count-enable state.
    #[inline]
    pub fn count_enabled(&self) -> bool {
        self.bit(STATUS_COUNT_ENABLE)
    }

    /// Index latch.
    #[inline]
    pub fn index_latched(&self) -> bool {
        self.bit(STATUS_INDEX)
    }

    /// Compare latch (CNTR matched DTR).
    #[inline]
    pub fn compare_latched(&self) -> bool {
        self.bit(STATUS_COMPARE)
    }

    /// Borrow latch (counter underflowed).
    #[inline]
    pub fn borrow_latched(&self) -> bool {
        self.bit(STATUS_BORROW)
    }

    /// Carry latch (counter overflowed).
    #[inline]
    pub fn carry_latched(&self) -> bool {
        self.bit(STATUS_CARRY)
    }

    #[inline]
    fn bit(&self, position: u8) -> bool {
        (self.raw >> position) & 1 != 0
    }
}

/// Reinterpret the low `bits` bits of `raw` as a two's-complement value.
///
/// The sign bit is bit `bits - 1` of the configured width, never bit 31 of
/// the container.
fn sign_extend(raw: u32, bits: u8) -> i32 {
    let unused = 32 - u32::from(bits);
    ((raw << unused) as i32) >> unused
}

/// High-level interface for the LS7366R quadrature counter.
///
/// Provides validated accessor pairs for the counter value and for every
/// configuration sub-field of the two mode registers. No register state is
/// cached: each accessor issues fresh bus transactions, and bit-field
/// setters read-modify-write their mode register so sibling fields are
/// never disturbed.
///
/// # Lifecycle
///
/// 1. [`Ls7366r::new()`] — constructs the handle without any bus traffic.
/// 2. [`Ls7366r::init()`] — applies the default configuration and zeroes
///    the counter.
/// 3. Read and reconfigure freely through the accessor pairs.
///
/// # Example
///
/// ```no_run
/// use ls7366r::Ls7366r;
///
/// # fn example(spi: impl embedded_hal::spi::SpiDevice) {
/// let mut counter = Ls7366r::new(spi);
/// counter.init().unwrap();
///
/// counter.set_counts(0).unwrap();
/// let position = counter.counts().unwrap();
/// # }
/// ```
pub struct Ls7366r<SPI> {
    driver: SpiDriver<SPI>,
}

impl<SPI> Ls7366r<SPI>
where
    SPI: SpiDevice,
{
    /// Create a new counter handle.
    ///
    /// Performs no bus traffic; call [`init()`](Self::init) to configure
    /// the chip.
    ///
    /// # Arguments
    /// * `spi` — SPI device (takes ownership for exclusive access)
    pub fn new(spi: SPI) -> Self {
        Self {
            driver: SpiDriver::new(spi),
        }
    }

    /// Consume the handle and return the SPI device.
    pub fn release(self) -> SPI {
        self.driver.release()
    }

    /// Apply the default configuration and zero the counter.
    ///
    /// Defaults: x4 quadrature, free-running, index disabled, filter clock
    /// divided by 2, 4-byte counter width, counting enabled, no flag
    /// sources.
    ///
    /// # Errors
    /// * [`CounterError::Spi`] on communication failure
    pub fn init(&mut self) -> Result<(), CounterError<SPI::Error>> {
        self.driver
            .write_register(Register::Mode0, u32::from(DEFAULT_MDR0))?;
        self.driver
            .write_register(Register::Mode1, u32::from(DEFAULT_MDR1))?;
        self.driver.clear(Register::Counter)
    }

    // -----------------------------------------------------------------------
    // Counter value
    // -----------------------------------------------------------------------

    /// Read the current count.
    ///
    /// Reads the counter register at the configured width and reinterprets
    /// the result as a two's-complement value of that width. As a side
    /// effect of the chip's read protocol, the output register is latched
    /// to the same value.
    ///
    /// # Errors
    /// * [`CounterError::Spi`] on communication failure
    pub fn counts(&mut self) -> Result<i32, CounterError<SPI::Error>> {
        let bits = self.driver.counter_bits()?;
        let raw = self.driver.read_register(Register::Counter)?;
        Ok(sign_extend(raw, bits))
    }

    /// Set the count.
    ///
    /// Writes the low bits of `value` (at the configured width) into the
    /// data transfer register, then commits them into the live counter with
    /// an in-device load. Values outside the configured width's range are
    /// truncated to it by the chip's transfer length.
    ///
    /// # Errors
    /// * [`CounterError::Spi`] on communication failure
    pub fn set_counts(&mut self, value: i32) -> Result<(), CounterError<SPI::Error>> {
        self.driver
            .write_register(Register::DataTransfer, value as u32)?;
        self.driver.load(Register::Counter)
    }

    /// Read the output register as a signed count.
    ///
    /// The output register holds whatever was last latched into it, either
    /// by [`snapshot_counts()`](Self::snapshot_counts), by a counter read,
    /// or by an index pulse in [`IndexMode::LoadOutput`].
    ///
    /// # Errors
    /// * [`CounterError::Spi`] on communication failure
    pub fn output_counts(&mut self) -> Result<i32, CounterError<SPI::Error>> {
        let bits = self.driver.counter_bits()?;
        let raw = self.driver.read_register(Register::OutputCounter)?;
        Ok(sign_extend(raw, bits))
    }

    /// Latch the live counter into the output register, then read it back.
    ///
    /// The latch is a single-instruction in-device transfer, so the value
    /// read is a consistent snapshot of the count at the instant of the
    /// load even while counting continues.
    ///
    /// # Errors
    /// * [`CounterError::Spi`] on communication failure
    pub fn snapshot_counts(&mut self) -> Result<i32, CounterError<SPI::Error>> {
        self.driver.load(Register::OutputCounter)?;
        self.output_counts()
    }

    /// Reset the counter to zero.
    ///
    /// # Errors
    /// * [`CounterError::Spi`] on communication failure
    pub fn clear_counter(&mut self) -> Result<(), CounterError<SPI::Error>> {
        self.driver.clear(Register::Counter)
    }

    // -----------------------------------------------------------------------
    // Counter width
    // -----------------------------------------------------------------------

    /// Read the configured counter width in bits: 8, 16, 24, or 32.
    ///
    /// # Errors
    /// * [`CounterError::Spi`] on communication failure
    pub fn counter_bits(&mut self) -> Result<u8, CounterError<SPI::Error>> {
        self.driver.counter_bits()
    }

    /// Set the counter width in bits.
    ///
    /// All counter-sized transfers issued after this call, including
    /// [`counts()`](Self::counts) and [`set_counts()`](Self::set_counts),
    /// use the new width. The count itself is not rescaled.
    ///
    /// # Arguments
    /// * `bits` — counter width: 8, 16, 24, or 32
    ///
    /// # Errors
    /// * [`CounterError::InvalidCounterWidth`] if `bits` is not one of
    ///   8, 16, 24, 32 (raised before any bus traffic)
    /// * [`CounterError::Spi`] on communication failure
    pub fn set_counter_bits(&mut self, bits: u8) -> Result<(), CounterError<SPI::Error>> {
        let encoding = match bits {
            8 => 0b11,
            16 => 0b10,
            24 => 0b01,
            32 => 0b00,
            other => return Err(CounterError::InvalidCounterWidth(other)),
        };
        self.driver.write_field(COUNTER_WIDTH, encoding)
    }

    // -----------------------------------------------------------------------
    // Quadrature mode
    // -----------------------------------------------------------------------

    /// Read the quadrature multiplier: 0 (non-quadrature), 1, 2, or 4.
    ///
    /// In non-quadrature mode input A is a count clock and input B selects
    /// the direction.
    ///
    /// # Errors
    /// * [`CounterError::Spi`] on communication failure
    pub fn quadrature(&mut self) -> Result<u8, CounterError<SPI::Error>> {
        let encoding = self.driver.read_field(QUADRATURE)?;
        Ok(match encoding {
            0b00 => 0,
            0b01 => 1,
            0b10 => 2,
            _ => 4,
        })
    }

    /// Set the quadrature multiplier.
    ///
    /// # Arguments
    /// * `multiplier` — counts per A/B cycle: 0 (non-quadrature), 1, 2, or 4
    ///
    /// # Errors
    /// * [`CounterError::InvalidQuadratureMode`] if `multiplier` is not one
    ///   of 0, 1, 2, 4 (raised before any bus traffic)
    /// * [`CounterError::Spi`] on communication failure
    pub fn set_quadrature(&mut self, multiplier: u8) -> Result<(), CounterError<SPI::Error>> {
        let encoding = match multiplier {
            0 => 0b00,
            1 => 0b01,
            2 => 0b10,
            4 => 0b11,
            other => return Err(CounterError::InvalidQuadratureMode(other)),
        };
        self.driver.write_field(QUADRATURE, encoding)
    }

    // -----------------------------------------------------------------------
    // Count enable
    // -----------------------------------------------------------------------

    /// Whether counting is enabled.
    ///
    /// # Errors
    /// * [`CounterError::Spi`] on communication failure
    pub fn enabled(&mut self) -> Result<bool, CounterError<SPI::Error>> {
        // The chip stores a count-*disable* bit; invert to the logical sense.
        Ok(self.driver.read_field(COUNT_DISABLE)? == 0)
    }

    /// Enable or disable counting.
    ///
    /// While disabled the counter holds its value and ignores the A/B
    /// inputs.
    ///
    /// # Errors
    /// * [`CounterError::Spi`] on communication failure
    pub fn set_enabled(&mut self, enabled: bool) -> Result<(), CounterError<SPI::Error>> {
        self.driver
            .write_field(COUNT_DISABLE, if enabled { 0 } else { 1 })
    }

    // -----------------------------------------------------------------------
    // Running and index configuration
    // -----------------------------------------------------------------------

    /// Read the counter running mode.
    ///
    /// # Errors
    /// * [`CounterError::Spi`] on communication failure
    pub fn running_mode(&mut self) -> Result<RunningMode, CounterError<SPI::Error>> {
        Ok(match self.driver.read_field(RUNNING_MODE)? {
            0b00 => RunningMode::FreeRun,
            0b01 => RunningMode::SingleCycle,
            0b10 => RunningMode::RangeLimit,
            _ => RunningMode::ModuloN,
        })
    }

    /// Set the counter running mode.
    ///
    /// # Errors
    /// * [`CounterError::Spi`] on communication failure
    pub fn set_running_mode(&mut self, mode: RunningMode) -> Result<(), CounterError<SPI::Error>> {
        let encoding = match mode {
            RunningMode::FreeRun => 0b00,
            RunningMode::SingleCycle => 0b01,
            RunningMode::RangeLimit => 0b10,
            RunningMode::ModuloN => 0b11,
        };
        self.driver.write_field(RUNNING_MODE, encoding)
    }

    /// Read the index input mode.
    ///
    /// # Errors
    /// * [`CounterError::Spi`] on communication failure
    pub fn index_mode(&mut self) -> Result<IndexMode, CounterError<SPI::Error>> {
        Ok(match self.driver.read_field(INDEX_MODE)? {
            0b00 => IndexMode::Disabled,
            0b01 => IndexMode::LoadCounter,
            0b10 => IndexMode::ResetCounter,
            _ => IndexMode::LoadOutput,
        })
    }

    /// Set the index input mode.
    ///
    /// # Errors
    /// * [`CounterError::Spi`] on communication failure
    pub fn set_index_mode(&mut self, mode: IndexMode) -> Result<(), CounterError<SPI::Error>> {
        let encoding = match mode {
            IndexMode::Disabled => 0b00,
            IndexMode::LoadCounter => 0b01,
            IndexMode::ResetCounter => 0b10,
            IndexMode::LoadOutput => 0b11,
        };
        self.driver.write_field(INDEX_MODE, encoding)
    }

    /// Whether the index input is synchronized with the filter clock.
    ///
    /// # Errors
    /// * [`CounterError::Spi`] on communication failure
    pub fn index_synchronous(&mut self) -> Result<bool, CounterError<SPI::Error>> {
        Ok(self.driver.read_field(INDEX_SYNC)? != 0)
    }

    /// Select asynchronous (false) or synchronous (true) index operation.
    ///
    /// # Errors
    /// * [`CounterError::Spi`] on communication failure
    pub fn set_index_synchronous(
        &mut self,
        synchronous: bool,
    ) -> Result<(), CounterError<SPI::Error>> {
        self.driver
            .write_field(INDEX_SYNC, if synchronous { 1 } else { 0 })
    }

    /// Read the filter clock division factor: 1 or 2.
    ///
    /// # Errors
    /// * [`CounterError::Spi`] on communication failure
    pub fn filter_division(&mut self) -> Result<u8, CounterError<SPI::Error>> {
        Ok(self.driver.read_field(FILTER_DIVISION)? + 1)
    }

    /// Set the filter clock division factor.
    ///
    /// # Arguments
    /// * `factor` — input filter clock divider: 1 or 2
    ///
    /// # Errors
    /// * [`CounterError::InvalidFilterDivision`] if `factor` is not 1 or 2
    ///   (raised before any bus traffic)
    /// * [`CounterError::Spi`] on communication failure
    pub fn set_filter_division(&mut self, factor: u8) -> Result<(), CounterError<SPI::Error>> {
        let encoding = match factor {
            1 => 0,
            2 => 1,
            other => return Err(CounterError::InvalidFilterDivision(other)),
        };
        self.driver.write_field(FILTER_DIVISION, encoding)
    }

    // -----------------------------------------------------------------------
    // Flags and status
    // -----------------------------------------------------------------------

    /// Read which events are routed to the FLAG output pins.
    ///
    /// # Errors
    /// * [`CounterError::Spi`] on communication failure
    pub fn flag_sources(&mut self) -> Result<FlagSources, CounterError<SPI::Error>> {
        let bits = self.driver.read_field(FLAG_SOURCES)?;
        Ok(FlagSources {
            index: bits & 0b0001 != 0,
            compare: bits & 0b0010 != 0,
            borrow: bits & 0b0100 != 0,
            carry: bits & 0b1000 != 0,
        })
    }

    /// Select which events are routed to the FLAG output pins.
    ///
    /// # Errors
    /// * [`CounterError::Spi`] on communication failure
    pub fn set_flag_sources(
        &mut self,
        sources: FlagSources,
    ) -> Result<(), CounterError<SPI::Error>> {
        let mut bits = 0u8;
        if sources.index {
            bits |= 0b0001;
        }
        if sources.compare {
            bits |= 0b0010;
        }
        if sources.borrow {
            bits |= 0b0100;
        }
        if sources.carry {
            bits |= 0b1000;
        }
        self.driver.write_field(FLAG_SOURCES, bits)
    }

    /// Read the status register.
    ///
    /// # Errors
    /// * [`CounterError::Spi`] on communication failure
    pub fn status(&mut self) -> Result<Status, CounterError<SPI::Error>> {
        let raw = self.driver.read_register(Register::Status)? as u8;
        Ok(Status { raw })
    }

    /// Clear the status register latches.
    ///
    /// # Errors
    /// * [`CounterError::Spi`] on communication failure
    pub fn clear_status(&mut self) -> Result<(), CounterError<SPI::Error>> {
        self.driver.clear(Register::Status)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
