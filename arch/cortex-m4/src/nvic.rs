// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Cortex-M4 NVIC
//!
//! Each peripheral interrupt owns one bit in each of the set-enable,
//! clear-enable, set-pending and clear-pending banks: bit `n % 32` of
//! register `n / 32`. Writing zero bits has no effect, so every operation on a
//! single interrupt is one plain store.
//!
//! The ICTR reports how many banks of 32 are implemented; the whole-controller
//! helpers only touch those.

use kernel::utilities::registers::interfaces::{Readable, Writeable};
use kernel::utilities::registers::{register_bitfields, register_structs, ReadOnly, ReadWrite};
use kernel::utilities::StaticRef;

register_structs! {
    /// NVIC Registers.
    ///
    /// This layout covers every bank the architecture allows; a given part
    /// implements `ICTR.INTLINESNUM + 1` of them.
    NvicRegisters {
        (0x000 => _reserved0),

        /// Interrupt Controller Type Register
        (0x004 => ictr: ReadOnly<u32, InterruptControllerType::Register>),

        (0x008 => _reserved1),

        /// Interrupt Set-Enable Registers
        (0x100 => iser: [ReadWrite<u32, NvicSetClear::Register>; 32]),

        /// Interrupt Clear-Enable Registers
        (0x180 => icer: [ReadWrite<u32, NvicSetClear::Register>; 32]),

        /// Interrupt Set-Pending Registers
        (0x200 => ispr: [ReadWrite<u32, NvicSetClear::Register>; 32]),

        /// Interrupt Clear-Pending Registers
        (0x280 => icpr: [ReadWrite<u32, NvicSetClear::Register>; 32]),

        /// Interrupt Active Bit Registers
        (0x300 => iabr: [ReadOnly<u32, NvicSetClear::Register>; 32]),

        (0x380 => _reserved2),

        /// Interrupt Priority Registers
        (0x400 => ipr: [ReadWrite<u32>; 252]),

        (0x7f0 => @END),
    }
}

register_bitfields![u32,
    InterruptControllerType [
        /// Total number of interrupt lines in groups of 32, minus one
        INTLINESNUM     OFFSET(0)   NUMBITS(4)
    ],

    NvicSetClear [
        /// Bit m of bank n refers to interrupt m + 32 * n
        BITS            OFFSET(0)   NUMBITS(32)
    ]
];

const NVIC_BASE: StaticRef<NvicRegisters> =
    unsafe { StaticRef::new(0xE000_E000 as *const NvicRegisters) };

/// Number of implemented NVIC banks.
fn number_of_nvic_registers(registers: &NvicRegisters) -> usize {
    (registers.ictr.read(InterruptControllerType::INTLINESNUM) + 1) as usize
}

fn clear_all_pending_in(registers: &NvicRegisters) {
    let banks = number_of_nvic_registers(registers);
    for icpr in registers.icpr.iter().take(banks) {
        icpr.set(!0);
    }
}

fn disable_all_in(registers: &NvicRegisters) {
    let banks = number_of_nvic_registers(registers);
    for icer in registers.icer.iter().take(banks) {
        icer.set(!0);
    }
}

fn next_pending_in(registers: &NvicRegisters) -> Option<u32> {
    let banks = number_of_nvic_registers(registers);
    for (block, ispr) in registers.ispr.iter().take(banks).enumerate() {
        let ispr = ispr.get();

        // trailing_zeros == index of first high bit
        if ispr != 0 {
            return Some(block as u32 * 32 + ispr.trailing_zeros());
        }
    }
    None
}

/// Clear all pending interrupts
pub unsafe fn clear_all_pending() {
    clear_all_pending_in(&NVIC_BASE);
}

/// Disable all interrupts
pub unsafe fn disable_all() {
    disable_all_in(&NVIC_BASE);
}

/// Get the number of the lowest pending interrupt, or `None` if none are
/// pending.
pub unsafe fn next_pending() -> Option<u32> {
    next_pending_in(&NVIC_BASE)
}

/// An opaque wrapper for a single NVIC interrupt.
///
/// Hand these out to low-level drivers to let them control their own
/// interrupts but not others. Core exceptions have no NVIC number and cannot
/// be represented.
pub struct Nvic {
    number: u32,
    registers: StaticRef<NvicRegisters>,
}

impl Nvic {
    /// Creates a new `Nvic` for peripheral interrupt `number`.
    ///
    /// Marked unsafe because only chip/platform configuration code should be
    /// able to create these.
    pub const unsafe fn new(number: u32) -> Nvic {
        Nvic {
            number,
            registers: NVIC_BASE,
        }
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    fn bank(&self) -> usize {
        (self.number / 32) as usize
    }

    fn mask(&self) -> u32 {
        1 << (self.number & 31)
    }

    /// Enable the interrupt
    pub fn enable(&self) {
        self.registers.iser[self.bank()].set(self.mask());
    }

    /// Disable the interrupt
    pub fn disable(&self) {
        self.registers.icer[self.bank()].set(self.mask());
    }

    /// Clear pending state
    pub fn clear_pending(&self) {
        self.registers.icpr[self.bank()].set(self.mask());
    }

    pub fn is_enabled(&self) -> bool {
        self.registers.iser[self.bank()].get() & self.mask() != 0
    }

    pub fn is_pending(&self) -> bool {
        self.registers.ispr[self.bank()].get() & self.mask() != 0
    }
}
