//! Simple counter example
//!
//! Demonstrates basic usage of the ls7366r crate on a Raspberry Pi with the
//! counter board on SPI bus 0, chip enable 0. Configures the chip, zeroes
//! the counter, and polls the position.
//!
//! # Wiring
//!
//! | Signal | Pi header pin | Notes                    |
//! |--------|---------------|--------------------------|
//! | SCLK   | 23 (GPIO 11)  |                          |
//! | MOSI   | 19 (GPIO 10)  |                          |
//! | MISO   | 21 (GPIO 9)   |                          |
//! | CS     | 24 (GPIO 8)   | /dev/spidev0.0, SPI mode 0 |

use std::thread;
use std::time::Duration;

use linux_embedded_hal::spidev::{SpiModeFlags, SpidevOptions};
use linux_embedded_hal::SpidevDevice;

use ls7366r::Ls7366r;

fn main() {
    // --- SPI bus (mode 0, 1 MHz) ---
    let mut spi = SpidevDevice::open("/dev/spidev0.0").expect("Failed to open SPI device");
    spi.0
        .configure(
            &SpidevOptions::new()
                .bits_per_word(8)
                .max_speed_hz(1_000_000)
                .mode(SpiModeFlags::SPI_MODE_0)
                .build(),
        )
        .expect("Failed to configure SPI device");

    // --- Counter ---
    let mut counter = Ls7366r::new(spi);
    counter.init().expect("Failed to configure the counter");

    let status = counter.status().expect("Failed to read status");
    if status.power_lost() {
        println!("Power-loss latch was set; clearing status");
        counter.clear_status().expect("Failed to clear status");
    }

    println!("Counter example started — turn the encoder to see the count change");

    // Main loop: poll, log on change, repeat.
    let mut last = 0i32;
    loop {
        match counter.counts() {
            Ok(position) => {
                if position != last {
                    println!("Position: {}", position);
                    last = position;
                }
            }
            Err(e) => eprintln!("Read failed: {}", e),
        }

        thread::sleep(Duration::from_millis(100));
    }
}
