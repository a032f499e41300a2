//! Build script for ringlink-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Loads link.toml and turns it into constants for the firmware

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use ringlink_core::LinkConfig;

fn main() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR is set by cargo"));
    setup_linker(&out_dir);
    generate_link_config(&out_dir);
}

/// Set up linker search paths for memory.x
fn setup_linker(out_dir: &Path) {
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    println!("cargo:rustc-link-search={}", out_dir.display());
    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Parse and validate link.toml, then emit `link_config.rs`
fn generate_link_config(out_dir: &Path) {
    println!("cargo:rerun-if-changed=link.toml");

    let config_path = Path::new("link.toml");
    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => fail("Failed to read link.toml", &e.to_string()),
    };

    let config: LinkConfig = match toml::from_str(&content) {
        Ok(config) => config,
        Err(e) => fail("Invalid link.toml", &e.to_string()),
    };

    if let Err(e) = config.validate() {
        fail("Invalid buffer size in link.toml", &e.to_string());
    }

    let uart = &config.uart;
    let generated = format!(
        "pub const RX_BUFFER_SIZE: usize = {rx};\n\
         pub const TX_BUFFER_SIZE: usize = {tx};\n\
         pub const LINK_CONFIG: ::ringlink_core::LinkConfig = ::ringlink_core::LinkConfig {{\n\
         \x20   uart: ::ringlink_core::UartConfig {{\n\
         \x20       baudrate: ::ringlink_core::Baudrate::{baudrate:?},\n\
         \x20       data_bits: ::ringlink_core::DataBits::{data_bits:?},\n\
         \x20       parity: ::ringlink_core::Parity::{parity:?},\n\
         \x20       stop_bits: ::ringlink_core::StopBits::{stop_bits:?},\n\
         \x20   }},\n\
         \x20   rx_buffer_size: {rx},\n\
         \x20   tx_buffer_size: {tx},\n\
         }};\n",
        rx = config.rx_buffer_size,
        tx = config.tx_buffer_size,
        baudrate = uart.baudrate,
        data_bits = uart.data_bits,
        parity = uart.parity,
        stop_bits = uart.stop_bits,
    );
    fs::write(out_dir.join("link_config.rs"), generated).unwrap();

    println!(
        "cargo:warning=link.toml: {} baud, rx {} bytes, tx {} bytes",
        uart.baudrate.as_u32(),
        config.rx_buffer_size,
        config.tx_buffer_size
    );
}

/// Abort the build with a boxed message
fn fail(title: &str, detail: &str) -> ! {
    let lines = detail
        .lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n");
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<58} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title, lines
    );
}
