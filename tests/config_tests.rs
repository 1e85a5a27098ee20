use pretty_assertions::assert_eq;
use serial_test::serial;
use std::env;

use rosterhub::Config;

const CONFIG_KEYS: &[&str] = &[
    "DATABASE_URL",
    "JWT_SECRET",
    "JWT_EXPIRATION_DAYS",
    "HOST",
    "PORT",
    "ENVIRONMENT",
    "BASE_URL",
    "WITHDRAWAL_COOLOFF_HOURS",
    "RECONCILER_INTERVAL_SECS",
    "TRANSFER_EXPIRY_DAYS",
];

// Process-env mutation is unsafe since edition 2024; tests stay #[serial]
// so no other thread touches the environment concurrently.
fn clear_config_env() {
    for key in CONFIG_KEYS {
        unsafe { env::remove_var(key) };
    }
}

fn set_env(key: &str, value: &str) {
    unsafe { env::set_var(key, value) };
}

#[test]
#[serial]
fn defaults_cover_the_full_lifecycle_tuning() {
    clear_config_env();
    let config = Config::from_env_only().unwrap();

    assert_eq!(config.host, "127.0.0.1");
    assert_eq!(config.port, 8080);
    assert_eq!(config.environment, "development");
    assert_eq!(config.withdrawal_cooloff_hours, 24);
    assert_eq!(config.reconciler_interval_secs, 3600);
    assert_eq!(config.transfer_expiry_days, 7);
    assert!(!config.is_production());
    assert_eq!(config.server_address(), "127.0.0.1:8080");
}

#[test]
#[serial]
fn environment_overrides_are_honored() {
    clear_config_env();
    set_env("PORT", "9090");
    set_env("ENVIRONMENT", "production");
    set_env("WITHDRAWAL_COOLOFF_HOURS", "48");
    set_env("TRANSFER_EXPIRY_DAYS", "14");

    let config = Config::from_env_only().unwrap();
    assert_eq!(config.port, 9090);
    assert!(config.is_production());
    assert_eq!(config.withdrawal_cooloff_hours, 48);
    assert_eq!(config.transfer_expiry_days, 14);

    clear_config_env();
}

#[test]
#[serial]
fn malformed_numbers_fall_back_to_defaults() {
    clear_config_env();
    set_env("PORT", "not-a-port");
    set_env("WITHDRAWAL_COOLOFF_HOURS", "soon");

    let config = Config::from_env_only().unwrap();
    assert_eq!(config.port, 8080);
    assert_eq!(config.withdrawal_cooloff_hours, 24);

    clear_config_env();
}
