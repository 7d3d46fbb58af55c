// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Peripheral drivers for the STM32F446RE.

#![cfg_attr(not(test), no_std)]

pub mod chip;
pub mod exti;
pub mod gpio;
pub mod nvic;
pub mod rcc;
pub mod syscfg;
pub mod usart;
pub mod vectors;

/// Mask and clear every vendor interrupt, leaving the NVIC in a known state
/// before drivers enable the lines they use.
///
/// # Safety
///
/// Writes NVIC registers. Call once, early in reset, with interrupts not yet
/// in use.
pub unsafe fn init() {
    cortexm4::nvic::disable_all();
    cortexm4::nvic::clear_all_pending();
}
