//! Blocking SPI driver for the LSI/CSI LS7366R quadrature counter.
//!
//! The LS7366R tracks a quadrature encoder in hardware: a 32-bit up/down
//! counter, two packed mode registers, and a status register, all reached
//! through a one-byte instruction protocol over SPI. This crate hides the
//! instruction encoding and the chip's variable-width counter transfers
//! behind typed, validated accessors.
//!
//! # Architecture
//!
//! The crate is split into two layers:
//!
//! - **`driver`** (crate-private) — Low-level transaction primitives that
//!   handle instruction framing, byte order, and the runtime-selectable
//!   counter width.
//! - **[`Ls7366r`]** (public) — Validated, high-level API for the counter
//!   value and every mode-register field.
//!
//! # Quick start
//!
//! ```no_run
//! use ls7366r::Ls7366r;
//!
//! // Construct with any blocking `embedded-hal` SPI device.
//! # fn example(spi: impl embedded_hal::spi::SpiDevice) {
//! let mut counter = Ls7366r::new(spi);
//!
//! // Configure defaults (x4 quadrature, 32-bit counter) and zero the count.
//! counter.init().unwrap();
//!
//! let position = counter.counts().unwrap();
//! # }
//! ```
//!
//! # Features
//!
//! - **`defmt`** — Enable [`defmt::Format`] implementations on error and
//!   status types for embedded logging.

#![cfg_attr(not(test), no_std)]

pub use counter::{FlagSources, IndexMode, Ls7366r, RunningMode, Status};
pub use error::CounterError;

mod counter;
mod driver;
mod error;
mod registers;

#[cfg(test)]
mod test_util;
