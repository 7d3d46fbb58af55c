// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Hardware interface layer (HIL) traits.
//!
//! Application code is written against these traits so it does not depend on
//! a particular chip's register layout.

pub mod gpio;
pub mod uart;
