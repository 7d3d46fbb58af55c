// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Helper functions for the Cortex-M architecture.

/// NOP instruction
#[cfg(all(target_arch = "arm", target_os = "none"))]
#[inline(always)]
pub fn nop() {
    use core::arch::asm;
    // SAFETY: `nop` has no side effects.
    unsafe {
        asm!("nop", options(nomem, nostack, preserves_flags));
    }
}

/// Exception number of the handler currently executing, read from IPSR.
///
/// Zero in thread mode, 1..=15 for core exceptions and 16 + IRQn for
/// peripheral interrupts.
#[cfg(all(target_arch = "arm", target_os = "none"))]
#[inline(always)]
pub fn active_exception() -> u32 {
    use core::arch::asm;
    let ipsr: u32;
    // SAFETY: reading IPSR has no side effects.
    unsafe {
        asm!("mrs {}, ipsr", out(reg) ipsr, options(nomem, nostack, preserves_flags));
    }
    ipsr & 0x1ff
}

// Mock implementations for host builds and unit tests.

/// NOP instruction (mock)
#[cfg(not(all(target_arch = "arm", target_os = "none")))]
pub fn nop() {
    core::hint::spin_loop();
}

/// Exception number (mock). The host is always in thread mode.
#[cfg(not(all(target_arch = "arm", target_os = "none")))]
pub fn active_exception() -> u32 {
    0
}
