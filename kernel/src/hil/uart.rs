// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Interfaces for byte-oriented serial ports.

/// Blocking transmit path.
pub trait Transmit {
    /// Send every byte of `bytes`, returning once the last one has left the
    /// shift register.
    fn transmit(&self, bytes: &[u8]);
}

/// Receives bytes as they arrive from the interrupt handler.
pub trait ReceiveClient {
    fn received_byte(&self, byte: u8);
}
