// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Interfaces for digital pins.

pub trait Output {
    /// Set the GPIO pin high. If the pin is not an output, the call has no
    /// visible effect.
    fn set(&self);

    /// Set the GPIO pin low. If the pin is not an output, the call has no
    /// visible effect.
    fn clear(&self);

    /// Toggle the GPIO pin. If the pin was high, set it low. If the pin was
    /// low, set it high. Return the new value of the pin.
    fn toggle(&self) -> bool;
}

pub trait Input {
    /// Get the current state of an input GPIO pin.
    fn read(&self) -> bool;
}
