// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Runtime support shared by the architecture, chip, and board crates.
//!
//! This crate holds the pieces every other layer depends on: the common
//! [`ErrorCode`], compile-time [`config`], the `debug!` output path, the
//! hardware interface traits in [`hil`], and the register utilities that let
//! drivers describe MMIO blocks with typed, volatile accessors.

#![cfg_attr(not(test), no_std)]
#![warn(unreachable_pub)]

pub mod config;
#[macro_use]
pub mod debug;
pub mod errorcode;
pub mod hil;
pub mod platform;
pub mod utilities;

pub use crate::errorcode::ErrorCode;
