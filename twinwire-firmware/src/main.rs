//! Twinwire - bit-banged I2C bring-up firmware
//!
//! Builds the bus described in bus.toml on two RP2040 GPIOs, lists every
//! device that answers, then polls the configured scan window and device
//! register.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_time::{Duration, Timer};
use twinwire_core::busio;
use twinwire_core::config::BusConfig;
use twinwire_core::DriverRegistry;
use twinwire_hal_rp2040::gpio::{self, FlexBus};
use twinwire_hal_rp2040::{pin_bank, PinBank};
use {defmt_rtt as _, panic_probe as _};

/// Settings validated from bus.toml at build time
mod bus_config {
    use twinwire_core::config::PinConfig;

    include!(concat!(env!("OUT_DIR"), "/bus_config.rs"));
}

/// Time between polls
const POLL_INTERVAL: Duration = Duration::from_secs(5);

fn load_config() -> BusConfig {
    let mut config = match BusConfig::new(bus_config::DRIVER, bus_config::SDA, bus_config::SCL) {
        Ok(config) => config,
        Err(e) => {
            warn!("bus.toml rejected ({:?}), using defaults", e);
            return BusConfig::default();
        }
    };
    config.frequency = bus_config::FREQUENCY;
    config.clock_stretching = bus_config::CLOCK_STRETCHING;
    config.settle_ms = bus_config::SETTLE_MS;
    config.scan_start = bus_config::SCAN_START;
    config
}

async fn halt() -> ! {
    loop {
        Timer::after(Duration::from_secs(1)).await;
    }
}

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    info!("Twinwire starting...");

    let p = embassy_rp::init(Default::default());
    let mut bank = pin_bank!(p);

    let config = load_config();
    info!(
        "Bus config: driver={} sda={} scl={} {}Hz stretching={}",
        config.driver.as_str(),
        config.sda.pin,
        config.scl.pin,
        config.frequency,
        config.clock_stretching
    );

    let mut registry: DriverRegistry<PinBank, FlexBus, 4> = DriverRegistry::new();
    if let Err(e) = registry.register("gpio", gpio::build_bus) {
        error!("driver registration failed: {:?}", e);
        halt().await;
    }

    let bus = match registry.build(&mut bank, &config) {
        Ok(bus) => bus,
        Err(e) => {
            error!("bus setup failed: {:?}", e);
            halt().await
        }
    };

    // One full sweep of the 7-bit address space
    let mut i2c = busio::I2c::new(gpio::master(bus, &config));
    if i2c.try_lock() {
        match i2c.scan() {
            Ok(found) if found.is_empty() => warn!("no devices answered"),
            Ok(found) => info!("devices: {=[u8]:#04x}", found.as_slice()),
            Err(e) => warn!("scan failed: {:?}", e),
        }
        i2c.unlock();
    }
    let mut master = i2c.deinit();

    loop {
        match master.scan(config.scan_start) {
            Ok(found) => info!(
                "window {:#04x}: {=[u8]:#04x}",
                config.scan_start,
                found.as_slice()
            ),
            Err(e) => debug!("window {:#04x}: {:?}", config.scan_start, e),
        }

        if let Some((address, register)) = bus_config::DEVICE {
            let value = master.read_register(address, register);
            match master.error() {
                Some(e) => warn!("{=str}", e),
                None => info!("{:#04x}[{:#04x}] = {:#04x}", address, register, value),
            }
        }

        Timer::after(POLL_INTERVAL).await;
    }
}
