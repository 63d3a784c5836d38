//! Error types for the counter driver.

use core::fmt;

/// Errors that can occur when communicating with the counter chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterError<E> {
    /// Underlying SPI bus error.
    Spi(E),

    /// Counter width out of the valid domain (must be 8, 16, 24, or 32 bits).
    InvalidCounterWidth(u8),

    /// Quadrature multiplier out of the valid domain (must be 0, 1, 2, or 4).
    InvalidQuadratureMode(u8),

    /// Filter clock division factor out of the valid domain (must be 1 or 2).
    InvalidFilterDivision(u8),
}

// Allow ergonomic `?` propagation from raw SPI errors.
impl<E> From<E> for CounterError<E> {
    fn from(error: E) -> Self {
        CounterError::Spi(error)
    }
}

impl<E: fmt::Debug> fmt::Display for CounterError<E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CounterError::Spi(e) => write!(f, "SPI error: {:?}", e),
            CounterError::InvalidCounterWidth(bits) => {
                write!(f, "Invalid counter width {} (must be 8, 16, 24, or 32)", bits)
            }
            CounterError::InvalidQuadratureMode(mode) => {
                write!(f, "Invalid quadrature multiplier {} (must be 0, 1, 2, or 4)", mode)
            }
            CounterError::InvalidFilterDivision(factor) => {
                write!(f, "Invalid filter division factor {} (must be 1 or 2)", factor)
            }
        }
    }
}

#[cfg(feature = "defmt")]
impl<E: defmt::Format> defmt::Format for CounterError<E> {
    fn format(&self, f: defmt::Formatter) {
        match self {
            CounterError::Spi(e) => defmt::write!(f, "SPI error: {}", e),
            CounterError::InvalidCounterWidth(bits) => {
                defmt::write!(f, "Invalid counter width {}", bits)
            }
            CounterError::InvalidQuadratureMode(mode) => {
                defmt::write!(f, "Invalid quadrature multiplier {}", mode)
            }
            CounterError::InvalidFilterDivision(factor) => {
                defmt::write!(f, "Invalid filter division factor {}", factor)
            }
        }
    }
}
