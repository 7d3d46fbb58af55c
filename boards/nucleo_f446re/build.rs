// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Link the firmware with the board's `layout.ld`.
//!
//! Host builds, used to run the unit tests, link normally.

use std::path::Path;

const LINKER_SCRIPT: &str = "layout.ld";

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let target_os = std::env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();
    if target_os != "none" {
        return;
    }

    if !Path::new(LINKER_SCRIPT).exists() {
        panic!("Boards must provide a `layout.ld` link script file");
    }

    // Include the folder where the board's Cargo.toml is in the linker file
    // search path.
    println!("cargo:rustc-link-arg=-L{}", std::env!("CARGO_MANIFEST_DIR"));
    // `-Tlayout.ld`: Use the linker script `layout.ld` all boards must provide.
    println!("cargo:rustc-link-arg=-T{}", LINKER_SCRIPT);
    println!("cargo:rerun-if-changed={}", LINKER_SCRIPT);
}
