// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Free-running tick counter driven by the SysTick exception.
//!
//! The counter is the only state shared between the SysTick handler and the
//! main context. It is a 32-bit atomic: the handler is the sole writer and
//! readers take a single load, which the M4 performs atomically. The count
//! wraps to zero after `u32::MAX` ticks; elapsed-time arithmetic is done
//! modulo 2^32 so a wait that straddles the wrap still measures correctly.

use core::sync::atomic::{AtomicU32, Ordering};

/// A monotonically increasing (modulo 2^32) tick count.
pub struct Ticks {
    count: AtomicU32,
}

impl Ticks {
    pub const fn new() -> Ticks {
        Ticks {
            count: AtomicU32::new(0),
        }
    }

    /// Current tick count.
    pub fn now(&self) -> u32 {
        self.count.load(Ordering::Acquire)
    }

    /// Ticks elapsed since `start`, correct across one wrap of the counter.
    pub fn elapsed_since(&self, start: u32) -> u32 {
        self.now().wrapping_sub(start)
    }

    /// Busy-wait until at least `ticks` ticks have elapsed.
    ///
    /// Requires the SysTick exception to be running, otherwise this never
    /// returns. Waits longer than `u32::MAX` ticks cannot be expressed.
    pub fn delay(&self, ticks: u32) {
        let start = self.now();
        while self.elapsed_since(start) < ticks {
            core::hint::spin_loop();
        }
    }

    fn advance(&self) {
        self.count.fetch_add(1, Ordering::Release);
    }
}

static TICKS: Ticks = Ticks::new();

/// The system tick counter.
pub fn ticks() -> &'static Ticks {
    &TICKS
}

/// Current value of the system tick counter.
pub fn now() -> u32 {
    TICKS.now()
}

/// Busy-wait for `ticks` system ticks.
pub fn delay(ticks: u32) {
    TICKS.delay(ticks);
}

/// SysTick exception handler. Advances the system tick counter by one.
pub unsafe extern "C" fn systick_handler() {
    TICKS.advance();
}
