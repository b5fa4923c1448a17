//! SD card on SPI1
//!
//! The card runs in SPI mode on a blocking bus owned exclusively by the
//! storage driver. Pins are board-specific and chosen by the firmware.

use embassy_rp::gpio::{Level, Output, Pin};
use embassy_rp::peripherals::SPI1;
use embassy_rp::spi::{self, Blocking, ClkPin, MisoPin, MosiPin, Spi};
use embassy_rp::Peri;
use embassy_time::Delay;
use embedded_hal_bus::spi::ExclusiveDevice;
use embedded_sdmmc::SdCard;

/// SPI clock during card initialization (the SD spec caps it at 400 kHz)
pub const INIT_FREQUENCY_HZ: u32 = 400_000;

/// Exclusive SPI device for the card
pub type SdSpiDevice = ExclusiveDevice<Spi<'static, SPI1, Blocking>, Output<'static>, Delay>;

/// Block device handed to the storage driver
pub type SdBlockDevice = SdCard<SdSpiDevice, Delay>;

/// Set up SPI1 and chip select for the card
///
/// The bus runs at [`INIT_FREQUENCY_HZ`]; the card negotiates its mode
/// lazily on first access.
pub fn sd_card(
    spi1: Peri<'static, SPI1>,
    clk: Peri<'static, impl ClkPin<SPI1>>,
    mosi: Peri<'static, impl MosiPin<SPI1>>,
    miso: Peri<'static, impl MisoPin<SPI1>>,
    cs: Peri<'static, impl Pin>,
) -> SdBlockDevice {
    let mut config = spi::Config::default();
    config.frequency = INIT_FREQUENCY_HZ;

    let bus = Spi::new_blocking(spi1, clk, mosi, miso, config);
    let cs = Output::new(cs, Level::High);
    // Driving an RP2040 output cannot fail
    let device = match ExclusiveDevice::new(bus, cs, Delay) {
        Ok(device) => device,
        Err(never) => match never {},
    };

    SdCard::new(device, Delay)
}
