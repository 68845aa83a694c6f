use base64::{engine::general_purpose::STANDARD, Engine as _};

/// Build-time configuration, with development defaults
const CONFIG: &[(&str, &str)] = &[
    ("LOCKBOX_DEVICE_KEY", "a0a1a2a3a4a5"),
    ("LOCKBOX_WIFI_SSID", "lockbox"),
    ("LOCKBOX_WIFI_PASSWORD", ""),
    ("LOCKBOX_BASE_URL", "http://192.168.4.2:8080"),
    ("LOCKBOX_USERNAME", "lockbox"),
    ("LOCKBOX_PASSWORD", "lockbox"),
];

fn main() -> anyhow::Result<()> {
    println!("cargo:rerun-if-changed=build.rs");

    // Propagate ESP-IDF build environment
    embuild::espidf::sysenv::output();

    let mut values = vec![];

    for (name, default) in CONFIG {
        println!("cargo:rerun-if-env-changed={name}");

        let v = match std::env::var(name) {
            Ok(v) => v,
            Err(_) => {
                println!("cargo:warning={name} not set, using development default");
                default.to_string()
            }
        };

        println!("cargo:rustc-env={name}={v}");
        values.push(v);
    }

    // Device key must be 6 bytes of hex for compile-time decoding
    let key = &values[0];
    if key.len() != 12 || !key.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(anyhow::anyhow!(
            "LOCKBOX_DEVICE_KEY must be 12 hex characters"
        ));
    }
    if key.eq_ignore_ascii_case("ffffffffffff") {
        return Err(anyhow::anyhow!(
            "LOCKBOX_DEVICE_KEY must differ from the factory key"
        ));
    }

    // Pre-computed basic auth header
    let creds = STANDARD.encode(format!("{}:{}", values[4], values[5]));
    println!("cargo:rustc-env=LOCKBOX_BASIC_AUTH=Basic {creds}");

    Ok(())
}
