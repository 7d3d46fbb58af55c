// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Memory initialization run by the reset handler before any Rust code that
//! touches statics.
//!
//! The linker script places initialized statics in flash and reserves their
//! RAM copy between two symbols; zero-initialized statics get a second RAM
//! range. Both ranges are word aligned.

/// Copy the `.data` image from flash to its RAM range `[ram_start, ram_end)`.
///
/// # Safety
///
/// `flash_src` must be readable for as many words as the RAM range holds, and
/// the RAM range must be writable, word aligned, and not yet in use.
pub unsafe fn init_data(mut flash_src: *const u32, mut ram_start: *mut u32, ram_end: *mut u32) {
    while ram_start < ram_end {
        ram_start.write_volatile(flash_src.read_volatile());
        ram_start = ram_start.add(1);
        flash_src = flash_src.add(1);
    }
}

/// Zero the `.bss` range `[start, end)`.
///
/// # Safety
///
/// The range must be writable, word aligned, and not yet in use.
pub unsafe fn zero_bss(mut start: *mut u32, end: *mut u32) {
    while start < end {
        start.write_volatile(0);
        start = start.add(1);
    }
}
