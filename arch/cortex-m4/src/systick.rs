// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! ARM Cortex-M SysTick peripheral.
//!
//! The timer counts down from the reload value at the core clock and raises
//! the SysTick exception each time it wraps. It is configured once at boot to
//! produce a fixed tick rate; the exception handler in [`crate::ticks`]
//! counts the ticks.

use kernel::utilities::registers::interfaces::{Readable, Writeable};
use kernel::utilities::registers::{register_bitfields, ReadOnly, ReadWrite};
use kernel::utilities::StaticRef;
use kernel::ErrorCode;

#[repr(C)]
struct SystickRegisters {
    syst_csr: ReadWrite<u32, ControlAndStatus::Register>,
    syst_rvr: ReadWrite<u32, ReloadValue::Register>,
    syst_cvr: ReadWrite<u32, CurrentValue::Register>,
    syst_calib: ReadOnly<u32, CalibrationValue::Register>,
}

register_bitfields![u32,
    ControlAndStatus [
        /// Returns 1 if timer counted to 0 since last time this was read.
        COUNTFLAG OFFSET(16) NUMBITS(1),

        /// Clock source is (0) External Clock or (1) Processor Clock.
        CLKSOURCE OFFSET(2) NUMBITS(1),

        /// Set to 1 to enable SysTick exception request.
        TICKINT OFFSET(1) NUMBITS(1),

        /// Enable the counter (1 == Enabled).
        ENABLE OFFSET(0) NUMBITS(1)
    ],

    ReloadValue [
        /// Value loaded to `syst_cvr` when counter is enabled and reaches 0.
        RELOAD          OFFSET(0)  NUMBITS(24)
    ],

    CurrentValue [
        /// Reads current value. Write of any value sets to 0.
        CURRENT         OFFSET(0)  NUMBITS(24)
    ],

    CalibrationValue [
        /// 0 if device provides reference clock to processor.
        NOREF           OFFSET(31) NUMBITS(1),

        /// 0 if TENMS value is exact, 1 if inexact or not given.
        SKEW            OFFSET(30) NUMBITS(1),

        /// Reload value for 10ms ticks, or 0 if no calibration.
        TENMS           OFFSET(0)  NUMBITS(24)
    ]
];

const SYSTICK_BASE: StaticRef<SystickRegisters> =
    unsafe { StaticRef::new(0xE000_E010 as *const SystickRegisters) };

/// Largest value the 24-bit reload register holds.
pub const MAX_RELOAD: u32 = 0x00FF_FFFF;

/// Number of ticks per second.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickRate {
    Seconds = 1,
    Milliseconds = 1_000,
    Microseconds = 1_000_000,
}

impl TickRate {
    pub const fn per_second(self) -> u32 {
        self as u32
    }
}

/// Reload value producing `rate` ticks from a `core_clock_hz` clock.
///
/// The counter period is `reload + 1` cycles, so the value is
/// `core_clock_hz / rate - 1`. Returns `INVAL` if the clock is slower than the
/// tick rate and `SIZE` if the value does not fit the 24-bit register.
pub fn reload_value(core_clock_hz: u32, rate: TickRate) -> Result<u32, ErrorCode> {
    let cycles = core_clock_hz / rate.per_second();
    if cycles == 0 {
        return Err(ErrorCode::INVAL);
    }
    let reload = cycles - 1;
    if reload > MAX_RELOAD {
        return Err(ErrorCode::SIZE);
    }
    Ok(reload)
}

/// The ARM Cortex-M SysTick peripheral
///
/// Documented in the Cortex-M4 Devices Generic User Guide, Chapter 4.4
pub struct SysTick {
    registers: StaticRef<SystickRegisters>,
}

impl SysTick {
    /// Marked unsafe because only one owner may program the timer.
    pub const unsafe fn new() -> SysTick {
        SysTick {
            registers: SYSTICK_BASE,
        }
    }

    /// Start the timer at `rate` ticks per second, with the exception
    /// enabled and the processor clock as source.
    ///
    /// On error the timer registers are not written, so a timer that was
    /// never started stays stopped.
    pub fn init(&self, core_clock_hz: u32, rate: TickRate) -> Result<(), ErrorCode> {
        let reload = reload_value(core_clock_hz, rate)?;

        // n.b.: 4.4.5 'hints and tips' suggests setting reload before value
        self.registers
            .syst_rvr
            .write(ReloadValue::RELOAD.val(reload));
        self.registers.syst_cvr.set(0);
        self.registers.syst_csr.write(
            ControlAndStatus::CLKSOURCE::SET
                + ControlAndStatus::TICKINT::SET
                + ControlAndStatus::ENABLE::SET,
        );
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.registers.syst_csr.is_set(ControlAndStatus::ENABLE)
    }

    /// Reload value currently programmed.
    pub fn reload(&self) -> u32 {
        self.registers.syst_rvr.read(ReloadValue::RELOAD)
    }

    /// Calibrated reload value for a 10 ms period, if the part provides one.
    pub fn calibration_10ms(&self) -> Option<u32> {
        match self.registers.syst_calib.read(CalibrationValue::TENMS) {
            0 => None,
            tenms => Some(tenms),
        }
    }
}
