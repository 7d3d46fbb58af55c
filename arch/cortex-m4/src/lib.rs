// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Shared implementations for ARM Cortex-M4 MCUs.

#![cfg_attr(not(test), no_std)]

pub mod nvic;
pub mod startup;
pub mod support;
pub mod systick;
pub mod ticks;
pub mod vectors;
