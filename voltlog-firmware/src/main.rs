//! Voltlog - Battery Voltage Logger Firmware
//!
//! Main firmware binary for RP2040-based boards. Brings the board up in
//! fixed stages, then samples the battery voltage every ten minutes and
//! appends one CSV record per sample to a file on the SD card.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::adc::{Adc, Channel, Config as AdcConfig, InterruptHandler as AdcInterruptHandler};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::Pull;
use {defmt_rtt as _, panic_probe as _};

use voltlog_drivers::sensor::BatteryDivider;
use voltlog_drivers::storage::{FixedTimeSource, SdStorage};
use voltlog_hal_rp2040::{sd_card, RpAdcReader};

use crate::boot::BoardBoot;

mod boot;
mod channels;
mod config;
mod fault;
mod status;
mod tasks;

bind_interrupts!(struct Irqs {
    ADC_IRQ_FIFO => AdcInterruptHandler;
});

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Voltlog firmware starting...");

    // Initialize RP2040 peripherals
    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = config::load();
    info!(
        "Logging to {} on {}, startup delay {} ms",
        config.storage.file_name.as_str(),
        config.storage.medium,
        config.boot.startup_delay_ms
    );

    // Battery sense on the VSYS/3 divider (GPIO29, ADC3)
    let adc = Adc::new(p.ADC, Irqs, AdcConfig::default());
    let vsys = Channel::new_pin(p.PIN_29, Pull::None);
    let sensor = BatteryDivider::new(RpAdcReader::new(adc, vsys), config.battery);

    // SD card on SPI1: SCK=GPIO10, MOSI=GPIO11, MISO=GPIO12, CS=GPIO13
    let card = sd_card(p.SPI1, p.PIN_10, p.PIN_11, p.PIN_12, p.PIN_13);
    let storage = SdStorage::new(card, FixedTimeSource);

    let board = BoardBoot::new(spawner, &config, sensor, storage);
    spawner
        .spawn(tasks::dispatcher_task(&channels::DISPATCHER, board))
        .unwrap();

    if let Err(e) = voltlog_core::boot::start(Some(&channels::DISPATCHER)) {
        fault::halt(e);
    }
    info!("Bootstrap queued");

    // Main task has nothing else to do - all work happens in spawned tasks
    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}
