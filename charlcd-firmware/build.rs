//! Build script for charlcd-firmware
//!
//! embassy-stm32 provides memory.x (`memory-x` feature); this only adds the
//! linker scripts for cortex-m-rt and defmt.

use std::env;

fn main() {
    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");

    if env::var_os("CARGO_FEATURE_DEFMT").is_some() {
        println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
    }

    println!("cargo:rerun-if-changed=build.rs");
}
