// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Lockbox Firmware Constants

#![allow(unused)]

use const_decoder::Decoder;

use lockbox_core::card::KEY_LEN;

/// Device key for enrolled cards (see build.rs)
pub const DEVICE_KEY: [u8; KEY_LEN] = Decoder::Hex.decode(env!("LOCKBOX_DEVICE_KEY").as_bytes());

/// Wireless network credentials
pub const WIFI_SSID: &str = env!("LOCKBOX_WIFI_SSID");
pub const WIFI_PASSWORD: &str = env!("LOCKBOX_WIFI_PASSWORD");

/// Access service base URL
pub const BASE_URL: &str = env!("LOCKBOX_BASE_URL");

/// Access service authorization header value
pub const BASIC_AUTH: &str = env!("LOCKBOX_BASIC_AUTH");

/// Access service request timeout
pub const HTTP_TIMEOUT_S: u64 = 10;

/// Wake button GPIO (must be a deep-sleep capable pin, GPIO0-5 on the C3)
pub const BUTTON_GPIO: u32 = 3;

/// Servo angles for each lock position
pub const SERVO_CLOSED_DEG: u32 = 89;
pub const SERVO_UNLOCK_READY_DEG: u32 = 89;
pub const SERVO_OPEN_DEG: u32 = 1;

/// Servo PWM frequency and pulse range
pub const SERVO_FREQ_HZ: u32 = 50;
pub const SERVO_MIN_PULSE_US: u32 = 500;
pub const SERVO_MAX_PULSE_US: u32 = 2_400;
pub const SERVO_MAX_DEG: u32 = 180;

/// Buzzer tone lengths
pub const BEEP_SHORT_MS: u32 = 60;
pub const BEEP_LONG_MS: u32 = 400;

/// MFRC522 SPI clock
pub const RC522_SPI_HZ: u32 = 1_000_000;
