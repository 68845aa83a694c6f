// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Lockbox firmware, executes a single wake cycle per boot then enters deep sleep

use esp_idf_svc::{
    eventloop::EspSystemEventLoop,
    hal::{
        gpio::{AnyOutputPin, PinDriver},
        ledc::{config::TimerConfig, LedcDriver, LedcTimerDriver, Resolution},
        prelude::*,
        spi::{config::Config as SpiConfig, SpiDeviceDriver, SpiDriverConfig},
    },
    log::EspLogger,
    nvs::EspDefaultNvsPartition,
    wifi::EspWifi,
};
use log::info;

use lockbox_core::{
    card::{Key, Reader},
    engine::{Config, Engine},
};

mod consts;
use consts::*;

mod platform;
use platform::*;

mod reader;
use reader::Rc522;

mod service;
use service::EspAccessService;

fn main() -> anyhow::Result<()> {
    esp_idf_svc::sys::link_patches();
    EspLogger::initialize_default();

    info!("lockbox v{}", env!("CARGO_PKG_VERSION"));

    let p = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;

    // Pin assignments
    // GPIO3: wake button, GPIO4: peripheral rail MOSFET, GPIO5: servo, GPIO20: buzzer
    // GPIO6/7/2/10: MFRC522 SCK/MOSI/MISO/SS, GPIO1: MFRC522 RST
    let rail = PinDriver::output(AnyOutputPin::from(p.pins.gpio4))?;
    let buzzer = PinDriver::output(AnyOutputPin::from(p.pins.gpio20))?;

    let mut rc522_rst = PinDriver::output(p.pins.gpio1)?;
    rc522_rst.set_high()?;

    let timer = LedcTimerDriver::new(
        p.ledc.timer0,
        &TimerConfig::default()
            .frequency(SERVO_FREQ_HZ.Hz().into())
            .resolution(Resolution::Bits14),
    )?;
    let mut servo = LedcDriver::new(p.ledc.channel0, timer, p.pins.gpio5)?;
    servo.set_duty(0)?;

    let spi = SpiDeviceDriver::new_single(
        p.spi2,
        p.pins.gpio6,
        p.pins.gpio7,
        Some(p.pins.gpio2),
        Some(p.pins.gpio10),
        &SpiDriverConfig::new(),
        &SpiConfig::new().baudrate(RC522_SPI_HZ.Hz().into()),
    )?;

    let wifi = EspWifi::new(p.modem, sysloop, Some(nvs))?;

    let drv = EspDriver::new(servo, rail, buzzer, wifi);
    let reader = Reader::new(Rc522::new(spi), Key::new(DEVICE_KEY));

    let mut engine = Engine::new(
        Config::default(),
        drv,
        reader,
        EspAccessService,
        RtcStore,
    );

    // Does not return, deep sleep resets the device on wake
    let report = engine.run();

    info!("sleep failed, report: {:?}", report);

    Ok(())
}
