//! Build script for twinwire-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates bus.toml at compile time
//! - Generates `bus_config.rs` with the validated settings

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Drivers the firmware registers
const DRIVERS: &[&str] = &["gpio"];

/// RP2040 user GPIO count
const PIN_COUNT: i64 = 30;

fn main() {
    setup_linker();
    let config = load_config();
    let bus = validate_bus(&config);
    let device = validate_device(&config);
    generate_config(&bus, device);
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Bus settings after validation
struct Bus {
    driver: String,
    sda: (i64, bool),
    scl: (i64, bool),
    frequency: i64,
    clock_stretching: bool,
    settle_ms: i64,
    scan_start: i64,
}

fn load_config() -> toml::Value {
    println!("cargo:rerun-if-changed=bus.toml");

    let config_path = Path::new("bus.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: bus.toml not found!                                      ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires a bus.toml configuration file.            ║\n\
            ║  Please create one in the twinwire-firmware directory.           ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read bus.toml                                  ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    match toml::from_str(&content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in bus.toml                          ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                {}\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    }
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn report(section: &str, errors: &[String]) {
    if errors.is_empty() {
        return;
    }
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: Invalid {:<49}║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        section,
        errors
            .iter()
            .map(|e| format!("║  • {:<62} ║", e))
            .collect::<Vec<_>>()
            .join("\n")
    );
}

fn integer(table: &toml::Table, key: &str, default: i64, errors: &mut Vec<String>) -> i64 {
    match table.get(key) {
        None => default,
        Some(toml::Value::Integer(v)) => *v,
        Some(_) => {
            errors.push(format!("[bus] '{}' must be an integer", key));
            default
        }
    }
}

fn boolean(table: &toml::Table, key: &str, default: bool, errors: &mut Vec<String>) -> bool {
    match table.get(key) {
        None => default,
        Some(toml::Value::Boolean(v)) => *v,
        Some(_) => {
            errors.push(format!("[bus] '{}' must be true or false", key));
            default
        }
    }
}

fn pin(table: &toml::Table, key: &str, errors: &mut Vec<String>) -> (i64, bool) {
    let pin = match table.get(key) {
        Some(toml::Value::Integer(n)) => return (*n, true),
        Some(toml::Value::Table(pin)) => pin,
        Some(_) => {
            errors.push(format!("[bus] '{}' must be a pin number or table", key));
            return (0, true);
        }
        None => {
            errors.push(format!("[bus] missing '{}'", key));
            return (0, true);
        }
    };
    let number = match pin.get("pin") {
        Some(toml::Value::Integer(n)) => *n,
        _ => {
            errors.push(format!("[bus] '{}.pin' must be an integer", key));
            0
        }
    };
    let pull_up = match pin.get("pull_up") {
        None => true,
        Some(toml::Value::Boolean(b)) => *b,
        Some(_) => {
            errors.push(format!("[bus] '{}.pull_up' must be true or false", key));
            true
        }
    };
    (number, pull_up)
}

/// Validate the [bus] section
fn validate_bus(config: &toml::Value) -> Bus {
    let table = match config.get("bus") {
        Some(toml::Value::Table(t)) => t,
        _ => {
            report("bus configuration", &["Missing [bus] section".to_string()]);
            unreachable!()
        }
    };

    let mut errors = Vec::new();

    let driver = match table.get("driver") {
        None => "gpio".to_string(),
        Some(toml::Value::String(d)) => d.clone(),
        Some(_) => {
            errors.push("[bus] 'driver' must be a string".to_string());
            String::new()
        }
    };
    if !driver.is_empty() && !DRIVERS.contains(&driver.as_str()) {
        errors.push(format!(
            "[bus] unknown driver '{}' (known: {})",
            driver,
            DRIVERS.join(", ")
        ));
    }

    let sda = pin(table, "sda", &mut errors);
    let scl = pin(table, "scl", &mut errors);
    for (name, (number, _)) in [("sda", sda), ("scl", scl)] {
        if !(0..PIN_COUNT).contains(&number) {
            errors.push(format!("[bus] {} pin must be 0-{}", name, PIN_COUNT - 1));
        }
    }
    if sda.0 == scl.0 {
        errors.push("[bus] sda and scl must be different pins".to_string());
    }

    let frequency = integer(table, "frequency", 100_000, &mut errors);
    if !(0..=1_000_000).contains(&frequency) {
        errors.push("[bus] frequency must be 0-1000000 Hz".to_string());
    }

    let clock_stretching = boolean(table, "clock_stretching", false, &mut errors);

    let settle_ms = integer(table, "settle_ms", 100, &mut errors);
    if !(0..=10_000).contains(&settle_ms) {
        errors.push("[bus] settle_ms must be 0-10000".to_string());
    }

    let scan_start = integer(table, "scan_start", 0, &mut errors);
    if !(0..=0xF0).contains(&scan_start) {
        errors.push("[bus] scan_start must be 0x00-0xF0".to_string());
    }

    report("bus configuration", &errors);

    Bus {
        driver,
        sda,
        scl,
        frequency,
        clock_stretching,
        settle_ms,
        scan_start,
    }
}

/// Validate the optional [device] section
fn validate_device(config: &toml::Value) -> Option<(i64, i64)> {
    let table = match config.get("device") {
        Some(toml::Value::Table(t)) => t,
        Some(_) => {
            report("device configuration", &["[device] must be a table".to_string()]);
            unreachable!()
        }
        None => return None,
    };

    let mut errors = Vec::new();
    let address = integer(table, "address", 0, &mut errors);
    if !(0x08..=0x77).contains(&address) {
        errors.push("[device] address must be 0x08-0x77".to_string());
    }
    let register = integer(table, "register", 0, &mut errors);
    if !(0..=0xFF).contains(&register) {
        errors.push("[device] register must be 0x00-0xFF".to_string());
    }
    report("device configuration", &errors);

    Some((address, register))
}

fn pin_config(pin: (i64, bool)) -> String {
    if pin.1 {
        format!("PinConfig::with_pullup({})", pin.0)
    } else {
        format!("PinConfig::new({})", pin.0)
    }
}

/// Write the validated settings as Rust constants
fn generate_config(bus: &Bus, device: Option<(i64, i64)>) {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let device = match device {
        Some((address, register)) => format!("Some(({:#04x}, {:#04x}))", address, register),
        None => "None".to_string(),
    };

    let generated = format!(
        "// Generated from bus.toml by build.rs\n\
         \n\
         pub const DRIVER: &str = {:?};\n\
         pub const SDA: PinConfig = {};\n\
         pub const SCL: PinConfig = {};\n\
         pub const FREQUENCY: u32 = {};\n\
         pub const CLOCK_STRETCHING: bool = {};\n\
         pub const SETTLE_MS: u32 = {};\n\
         pub const SCAN_START: u8 = {:#04x};\n\
         /// Device address and register to read after the scan\n\
         pub const DEVICE: Option<(u8, u8)> = {};\n",
        bus.driver,
        pin_config(bus.sda),
        pin_config(bus.scl),
        bus.frequency,
        bus.clock_stretching,
        bus.settle_ms,
        bus.scan_start,
        device,
    );

    fs::write(out_dir.join("bus_config.rs"), generated).unwrap();
    println!("cargo:warning=bus.toml validated successfully");
}
