// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Lockbox ESP32-C3 Platform Support

use core::sync::atomic::{AtomicBool, Ordering};

use esp_idf_svc::{
    hal::{
        delay::FreeRtos,
        gpio::{AnyOutputPin, Output, PinDriver},
        ledc::LedcDriver,
    },
    sys,
    wifi::{AuthMethod, ClientConfiguration, Configuration, EspWifi},
};
use log::{debug, error, warn};

use lockbox_core::engine::{Driver, Indication, LockStore, Position, WakeCause};

use crate::consts::*;

/// Lock state retained in RTC memory across deep sleep, reset on power loss
#[link_section = ".rtc.data.lockbox"]
static ENGAGED: AtomicBool = AtomicBool::new(false);

/// [LockStore] backed by RTC retained memory
pub struct RtcStore;

impl LockStore for RtcStore {
    fn load(&self) -> bool {
        ENGAGED.load(Ordering::SeqCst)
    }

    fn store(&mut self, engaged: bool) {
        ENGAGED.store(engaged, Ordering::SeqCst)
    }
}

/// ESP32-C3 platform driver
pub struct EspDriver<'d> {
    servo: LedcDriver<'d>,
    rail: PinDriver<'d, AnyOutputPin, Output>,
    buzzer: PinDriver<'d, AnyOutputPin, Output>,
    wifi: EspWifi<'static>,
}

impl<'d> EspDriver<'d> {
    pub fn new(
        servo: LedcDriver<'d>,
        rail: PinDriver<'d, AnyOutputPin, Output>,
        buzzer: PinDriver<'d, AnyOutputPin, Output>,
        wifi: EspWifi<'static>,
    ) -> Self {
        Self {
            servo,
            rail,
            buzzer,
            wifi,
        }
    }

    /// Compute servo duty for the provided angle
    fn servo_duty(&self, deg: u32) -> u32 {
        let period_us = 1_000_000 / SERVO_FREQ_HZ;
        let pulse_us = SERVO_MIN_PULSE_US
            + (SERVO_MAX_PULSE_US - SERVO_MIN_PULSE_US) * deg.min(SERVO_MAX_DEG) / SERVO_MAX_DEG;

        self.servo.get_max_duty() * pulse_us / period_us
    }

    fn beep(&mut self, pattern: &[u32]) {
        for ms in pattern {
            let _ = self.buzzer.set_high();
            FreeRtos::delay_ms(*ms);
            let _ = self.buzzer.set_low();
            FreeRtos::delay_ms(BEEP_SHORT_MS);
        }
    }

    fn start_wifi(&mut self) -> anyhow::Result<()> {
        let auth_method = match WIFI_PASSWORD.is_empty() {
            true => AuthMethod::None,
            false => AuthMethod::WPA2Personal,
        };

        self.wifi
            .set_configuration(&Configuration::Client(ClientConfiguration {
                ssid: WIFI_SSID
                    .try_into()
                    .map_err(|_| anyhow::anyhow!("invalid ssid"))?,
                password: WIFI_PASSWORD
                    .try_into()
                    .map_err(|_| anyhow::anyhow!("invalid password"))?,
                auth_method,
                ..Default::default()
            }))?;

        self.wifi.start()?;
        self.wifi.connect()?;

        Ok(())
    }
}

impl<'d> Driver for EspDriver<'d> {
    fn wake_cause(&self) -> WakeCause {
        #[allow(non_upper_case_globals)]
        match unsafe { sys::esp_sleep_get_wakeup_cause() } {
            sys::esp_sleep_source_t_ESP_SLEEP_WAKEUP_GPIO => WakeCause::Trigger,
            sys::esp_sleep_source_t_ESP_SLEEP_WAKEUP_TIMER => WakeCause::Timer,
            sys::esp_sleep_source_t_ESP_SLEEP_WAKEUP_UNDEFINED => WakeCause::PowerOn,
            _ => WakeCause::Other,
        }
    }

    fn set_peripherals(&mut self, on: bool) {
        if let Err(e) = self.rail.set_level(on.into()) {
            error!("peripheral rail: {:?}", e);
        }
    }

    fn actuate(&mut self, position: Position) {
        let deg = match position {
            Position::Closed => SERVO_CLOSED_DEG,
            Position::UnlockReady => SERVO_UNLOCK_READY_DEG,
            Position::Open => SERVO_OPEN_DEG,
        };

        debug!("servo: {} ({} deg)", position, deg);

        let duty = self.servo_duty(deg);
        if let Err(e) = self.servo.set_duty(duty) {
            error!("servo: {:?}", e);
        }
    }

    fn delay_ms(&mut self, ms: u32) {
        FreeRtos::delay_ms(ms);
    }

    fn link_begin(&mut self) {
        if let Err(e) = self.start_wifi() {
            warn!("wifi start failed: {:?}", e);
        }
    }

    fn link_connected(&mut self) -> bool {
        // Associated with the AP and the interface has an address
        self.wifi.is_up().unwrap_or(false)
    }

    fn link_end(&mut self) {
        let _ = self.wifi.disconnect();
        let _ = self.wifi.stop();
    }

    fn deep_sleep(&mut self) {
        // Release the servo so it does not hold against the latch while asleep
        let _ = self.servo.set_duty(0);

        unsafe {
            sys::esp_deep_sleep_enable_gpio_wakeup(
                1 << BUTTON_GPIO,
                sys::esp_deepsleep_gpio_wake_up_mode_t_ESP_GPIO_WAKEUP_GPIO_HIGH,
            );
            sys::esp_deep_sleep_start();
        }
    }

    fn indicate(&mut self, indication: Indication) {
        match indication {
            Indication::Closed => self.beep(&[BEEP_SHORT_MS]),
            Indication::Enrolled => self.beep(&[BEEP_SHORT_MS, BEEP_SHORT_MS]),
            Indication::Granted => self.beep(&[BEEP_LONG_MS]),
            Indication::Denied => self.beep(&[BEEP_SHORT_MS, BEEP_SHORT_MS, BEEP_SHORT_MS]),
        }
    }
}
