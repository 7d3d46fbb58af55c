// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Data structure for storing compile-time configuration options.
//!
//! Configuration lives in a `const` object rather than behind `#[cfg]`
//! attributes so that every code path is type-checked even when it is
//! disabled. The compiler folds the constants, so a disabled branch costs
//! nothing in the final image.
//!
//! Values can be changed without editing this crate by enabling the matching
//! Cargo feature from the board crate.

/// Data structure holding compile-time configuration options.
pub struct Config {
    /// Whether the panic path should print the panic message and location
    /// through the debug writer before parking.
    ///
    /// Disabling it removes the formatting machinery from images where code
    /// size matters more than a readable crash report.
    pub debug_panics: bool,
}

/// A unique instance of `Config` where compile-time configuration options are
/// defined.
pub const CONFIG: Config = Config {
    debug_panics: !cfg!(feature = "no_debug_panics"),
};
