// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Chip-level interfaces.

/// Generic operations that clock-like things are expected to support.
pub trait ClockInterface {
    fn is_enabled(&self) -> bool;
    fn enable(&self);
    fn disable(&self);
}

/// Dispatch of vendor interrupts to the peripheral drivers that own them.
///
/// Implemented by a chip's peripheral bundle. Interrupt handlers bound in the
/// vector table call into it with their NVIC number.
pub trait InterruptService {
    /// Service `interrupt`. Returns `false` if no driver owns it.
    ///
    /// # Safety
    ///
    /// Must only be called from the handler of `interrupt`, or with that
    /// interrupt masked.
    unsafe fn service_interrupt(&self, interrupt: u32) -> bool;
}
