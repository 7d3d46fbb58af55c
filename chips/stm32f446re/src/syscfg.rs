// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! System configuration controller: routing of GPIO ports to EXTI lines.
//!
//! EXTI lines 0..=15 each take their input from pin `n` of exactly one port.
//! The port is chosen by a four-bit selector, four lines per EXTICR register.

use kernel::platform::chip::ClockInterface;
use kernel::utilities::registers::interfaces::{ReadWriteable, Readable};
use kernel::utilities::registers::{register_structs, Field, ReadOnly, ReadWrite};
use kernel::utilities::StaticRef;

use crate::exti::LineId;
use crate::gpio::{PinId, PortId};
use crate::rcc;

register_structs! {
    SyscfgRegisters {
        /// memory remap register
        (0x00 => memrmp: ReadWrite<u32>),
        /// peripheral mode configuration register
        (0x04 => pmc: ReadWrite<u32>),
        /// external interrupt configuration registers 1 to 4
        (0x08 => exticr: [ReadWrite<u32>; 4]),
        (0x18 => _reserved0),
        /// compensation cell control register
        (0x20 => cmpcr: ReadOnly<u32>),
        (0x24 => _reserved1),
        /// configuration register
        (0x2C => cfgr: ReadWrite<u32>),
        (0x30 => @END),
    }
}

const SYSCFG_BASE: StaticRef<SyscfgRegisters> =
    unsafe { StaticRef::new(0x4001_3800 as *const SyscfgRegisters) };

/// Selector field of `line` within its EXTICR register.
fn selector(line: u8) -> (usize, Field<u32, ()>) {
    let index = usize::from(line / 4);
    let shift = usize::from(line % 4) * 4;
    (index, Field::new(0b1111, shift))
}

pub struct Syscfg<'a> {
    registers: StaticRef<SyscfgRegisters>,
    clock: rcc::PeripheralClock<'a>,
}

impl<'a> Syscfg<'a> {
    pub const fn new(rcc: &'a rcc::Rcc) -> Self {
        Self {
            registers: SYSCFG_BASE,
            clock: rcc::PeripheralClock::new(
                rcc::PeripheralClockType::APB2(rcc::PCLK2::SYSCFG),
                rcc,
            ),
        }
    }

    pub fn is_enabled_clock(&self) -> bool {
        self.clock.is_enabled()
    }

    pub fn enable_clock(&self) {
        self.clock.enable();
    }

    pub fn disable_clock(&self) {
        self.clock.disable();
    }

    /// Route `pin` to EXTI line `pin.number()`.
    ///
    /// Only the selector of that line is rewritten. The SYSCFG clock must be
    /// enabled.
    pub fn configure_interrupt(&self, pin: PinId) {
        let (index, field) = selector(pin.number());
        self.registers.exticr[index].modify(field.val(pin.port() as u32));
    }

    /// Port currently routed to a GPIO-sourced line, `None` for lines 16 and
    /// above.
    pub fn routed_port(&self, line: LineId) -> Option<PortId> {
        let number = line as u8;
        if number > 15 {
            return None;
        }
        let (index, field) = selector(number);
        PortId::from_code(self.registers.exticr[index].read(field))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::rcc::tests::fake_rcc;

    pub(crate) fn fake_syscfg() -> (*mut u32, Syscfg<'static>) {
        let words: &'static mut [u32; 0x30 / 4] = Box::leak(Box::new([0; 0x30 / 4]));
        let base = words.as_mut_ptr();
        let registers = unsafe { StaticRef::new(base.cast::<SyscfgRegisters>()) };
        let (_, rcc) = fake_rcc();
        (
            base,
            Syscfg {
                registers,
                clock: rcc::PeripheralClock::new(
                    rcc::PeripheralClockType::APB2(rcc::PCLK2::SYSCFG),
                    rcc,
                ),
            },
        )
    }

    fn word(base: *mut u32, offset: usize) -> u32 {
        unsafe { base.add(offset / 4).read_volatile() }
    }

    #[test]
    fn button_on_pc13_selects_port_c_in_exticr4() {
        let (base, syscfg) = fake_syscfg();
        syscfg.configure_interrupt(PinId::new(PortId::C, 13));

        assert_eq!(word(base, 0x14), 0b0010 << 4);
        for offset in [0x08, 0x0C, 0x10] {
            assert_eq!(word(base, offset), 0);
        }
        assert_eq!(syscfg.routed_port(LineId::Exti13), Some(PortId::C));
        assert_eq!(syscfg.routed_port(LineId::Exti12), Some(PortId::A));
    }

    #[test]
    fn rerouting_replaces_selector() {
        let (base, syscfg) = fake_syscfg();
        syscfg.configure_interrupt(PinId::new(PortId::H, 1));
        syscfg.configure_interrupt(PinId::new(PortId::B, 0));
        assert_eq!(word(base, 0x08), (0b0111 << 4) | 0b0001);

        syscfg.configure_interrupt(PinId::new(PortId::D, 1));
        assert_eq!(word(base, 0x08), (0b0011 << 4) | 0b0001);
        assert_eq!(syscfg.routed_port(LineId::Exti1), Some(PortId::D));
    }

    #[test]
    fn non_gpio_lines_have_no_port() {
        let (_, syscfg) = fake_syscfg();
        assert_eq!(syscfg.routed_port(LineId::Exti16), None);
        assert_eq!(syscfg.routed_port(LineId::Exti22), None);
    }

    #[test]
    fn clock_gate() {
        let (_, syscfg) = fake_syscfg();
        assert!(!syscfg.is_enabled_clock());
        syscfg.enable_clock();
        assert!(syscfg.is_enabled_clock());
        syscfg.disable_clock();
        assert!(!syscfg.is_enabled_clock());
    }
}
