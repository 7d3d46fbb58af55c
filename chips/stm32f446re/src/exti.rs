// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! External interrupt/event controller.
//!
//! The EXTI block has 23 lines going into the NVIC [^1]. Lines 0..=15 are fed
//! from GPIO pins through SYSCFG; the rest are wired to internal sources.
//! There is no one-to-one mapping between lines and NVIC interrupts: lines
//! 5..=9 share `EXTI9_5` and lines 10..=15 share `EXTI15_10`, so a handler
//! must look at the pending register to find which line fired.
//!
//! A pending bit stays set until software writes 1 to it, and keeps the NVIC
//! interrupt asserted until then. The handler clears exactly the bits it
//! read, with a single write, before notifying the client.
//!
//! There is no debouncing. A bouncing button produces several interrupts.
//!
//! [^1]: Section 10.2.5, External interrupt/event line mapping, RM0390

use kernel::utilities::cells::OptionalCell;
use kernel::utilities::registers::interfaces::{ReadWriteable, Readable, Writeable};
use kernel::utilities::registers::{register_structs, Field, ReadWrite};
use kernel::utilities::StaticRef;

use crate::gpio::PinId;
use crate::nvic;

register_structs! {
    ExtiRegisters {
        /// Interrupt mask register
        (0x00 => imr: ReadWrite<u32>),
        /// Event mask register
        (0x04 => emr: ReadWrite<u32>),
        /// Rising trigger selection register
        (0x08 => rtsr: ReadWrite<u32>),
        /// Falling trigger selection register
        (0x0C => ftsr: ReadWrite<u32>),
        /// Software interrupt event register
        (0x10 => swier: ReadWrite<u32>),
        /// Pending register, write 1 to clear
        (0x14 => pr: ReadWrite<u32>),
        (0x18 => @END),
    }
}

const EXTI_BASE: StaticRef<ExtiRegisters> =
    unsafe { StaticRef::new(0x4001_3C00 as *const ExtiRegisters) };

/// Bits [22:0] of every EXTI register are lines; the rest are reserved.
const LINES_MASK: u32 = 0x007F_FFFF;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum LineId {
    Exti0 = 0,
    Exti1 = 1,
    Exti2 = 2,
    Exti3 = 3,
    Exti4 = 4,
    Exti5 = 5,
    Exti6 = 6,
    Exti7 = 7,
    Exti8 = 8,
    Exti9 = 9,
    Exti10 = 10,
    Exti11 = 11,
    Exti12 = 12,
    Exti13 = 13,
    Exti14 = 14,
    Exti15 = 15,
    /// PVD output
    Exti16 = 16,
    /// RTC Alarm event
    Exti17 = 17,
    /// USB OTG FS Wakeup event
    Exti18 = 18,
    /// Not connected on this part
    Exti19 = 19,
    /// USB OTG HS Wakeup event
    Exti20 = 20,
    /// RTC Tamper and TimeStamp events
    Exti21 = 21,
    /// RTC Wakeup event
    Exti22 = 22,
}

impl LineId {
    const ALL: [LineId; 23] = [
        LineId::Exti0,
        LineId::Exti1,
        LineId::Exti2,
        LineId::Exti3,
        LineId::Exti4,
        LineId::Exti5,
        LineId::Exti6,
        LineId::Exti7,
        LineId::Exti8,
        LineId::Exti9,
        LineId::Exti10,
        LineId::Exti11,
        LineId::Exti12,
        LineId::Exti13,
        LineId::Exti14,
        LineId::Exti15,
        LineId::Exti16,
        LineId::Exti17,
        LineId::Exti18,
        LineId::Exti19,
        LineId::Exti20,
        LineId::Exti21,
        LineId::Exti22,
    ];

    pub fn from_number(number: u8) -> Option<LineId> {
        Self::ALL.get(usize::from(number)).copied()
    }

    /// The line a GPIO pin drives when routed through SYSCFG.
    pub fn for_pin(pin: PinId) -> LineId {
        Self::ALL[usize::from(pin.number())]
    }

    pub const fn mask(self) -> u32 {
        1 << self as u8
    }

    /// NVIC interrupt this line raises, `None` where nothing is connected.
    pub const fn irqn(self) -> Option<u32> {
        match self {
            LineId::Exti0 => Some(nvic::EXTI0),
            LineId::Exti1 => Some(nvic::EXTI1),
            LineId::Exti2 => Some(nvic::EXTI2),
            LineId::Exti3 => Some(nvic::EXTI3),
            LineId::Exti4 => Some(nvic::EXTI4),
            LineId::Exti5
            | LineId::Exti6
            | LineId::Exti7
            | LineId::Exti8
            | LineId::Exti9 => Some(nvic::EXTI9_5),
            LineId::Exti10
            | LineId::Exti11
            | LineId::Exti12
            | LineId::Exti13
            | LineId::Exti14
            | LineId::Exti15 => Some(nvic::EXTI15_10),
            LineId::Exti16 => Some(nvic::PVD),
            LineId::Exti17 => Some(nvic::RTC_Alarm),
            LineId::Exti18 => Some(nvic::OTG_FS_WKUP),
            LineId::Exti19 => None,
            LineId::Exti20 => Some(nvic::OTG_HS_WKUP),
            LineId::Exti21 => Some(nvic::TAMP_STAMP),
            LineId::Exti22 => Some(nvic::RTC_WKUP),
        }
    }
}

/// Which transitions of the input set the pending bit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgeTrigger {
    Rising,
    Falling,
    Both,
}

/// Notified from interrupt context for every line serviced.
pub trait ExtiClient {
    fn fired(&self, line: LineId);
}

pub struct Exti<'a> {
    registers: StaticRef<ExtiRegisters>,
    client: OptionalCell<&'a dyn ExtiClient>,
}

impl<'a> Exti<'a> {
    pub const fn new() -> Self {
        Self {
            registers: EXTI_BASE,
            client: OptionalCell::empty(),
        }
    }

    pub fn set_client(&self, client: &'a dyn ExtiClient) {
        self.client.set(client);
    }

    /// Unmask `line` and make it sensitive to exactly the edges in `trigger`.
    pub fn enable_line(&self, line: LineId, trigger: EdgeTrigger) {
        Self::set_bit(&self.registers.imr, line, true);
        let (rising, falling) = match trigger {
            EdgeTrigger::Rising => (true, false),
            EdgeTrigger::Falling => (false, true),
            EdgeTrigger::Both => (true, true),
        };
        Self::set_bit(&self.registers.rtsr, line, rising);
        Self::set_bit(&self.registers.ftsr, line, falling);
    }

    /// Mask `line`. Its trigger selection is kept.
    pub fn mask_line(&self, line: LineId) {
        Self::set_bit(&self.registers.imr, line, false);
    }

    pub fn is_enabled(&self, line: LineId) -> bool {
        self.registers.imr.get() & line.mask() != 0
    }

    pub fn trigger(&self, line: LineId) -> Option<EdgeTrigger> {
        let mask = line.mask();
        let rising = self.registers.rtsr.get() & mask != 0;
        let falling = self.registers.ftsr.get() & mask != 0;
        match (rising, falling) {
            (true, true) => Some(EdgeTrigger::Both),
            (true, false) => Some(EdgeTrigger::Rising),
            (false, true) => Some(EdgeTrigger::Falling),
            (false, false) => None,
        }
    }

    pub fn is_pending(&self, line: LineId) -> bool {
        self.registers.pr.get() & line.mask() != 0
    }

    // Pending clear happens by writing 1
    pub fn clear_pending(&self, line: LineId) {
        self.registers.pr.set(line.mask());
    }

    /// Raise the line from software, as if its edge had occurred.
    pub fn software_trigger(&self, line: LineId) {
        self.registers.swier.set(line.mask());
    }

    /// Service every unmasked pending line.
    ///
    /// The serviced bits are cleared with one write before any client call,
    /// so an edge arriving while the client runs is latched again and not
    /// lost. Returns the serviced mask.
    pub fn handle_interrupt(&self) -> u32 {
        let pending = self.registers.pr.get() & self.registers.imr.get() & LINES_MASK;
        if pending == 0 {
            return 0;
        }
        self.registers.pr.set(pending);

        let mut remaining = pending;
        while remaining != 0 {
            let number = remaining.trailing_zeros() as u8;
            remaining &= remaining - 1;
            if let Some(line) = LineId::from_number(number) {
                self.client.map(|client| client.fired(line));
            }
        }
        pending
    }

    fn set_bit(register: &ReadWrite<u32>, line: LineId, value: bool) {
        let field: Field<u32, ()> = Field::new(1, line as usize);
        register.modify(field.val(u32::from(value)));
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::RefCell;

    pub(crate) fn fake_exti<'a>() -> (*mut u32, Exti<'a>) {
        let words: &'static mut [u32; 6] = Box::leak(Box::new([0; 6]));
        let base = words.as_mut_ptr();
        let registers = unsafe { StaticRef::new(base.cast::<ExtiRegisters>()) };
        (
            base,
            Exti {
                registers,
                client: OptionalCell::empty(),
            },
        )
    }

    fn word(base: *mut u32, offset: usize) -> u32 {
        unsafe { base.add(offset / 4).read_volatile() }
    }

    fn set_word(base: *mut u32, offset: usize, value: u32) {
        unsafe { base.add(offset / 4).write_volatile(value) }
    }

    #[derive(Default)]
    struct Recorder {
        lines: RefCell<Vec<LineId>>,
    }

    impl ExtiClient for Recorder {
        fn fired(&self, line: LineId) {
            self.lines.borrow_mut().push(line);
        }
    }

    #[test]
    fn line_to_interrupt_mapping() {
        assert_eq!(LineId::Exti0.irqn(), Some(6));
        assert_eq!(LineId::Exti4.irqn(), Some(10));
        assert_eq!(LineId::Exti7.irqn(), Some(23));
        assert_eq!(LineId::Exti13.irqn(), Some(40));
        assert_eq!(LineId::Exti16.irqn(), Some(1));
        assert_eq!(LineId::Exti17.irqn(), Some(41));
        assert_eq!(LineId::Exti19.irqn(), None);
        assert_eq!(LineId::Exti22.irqn(), Some(3));
    }

    #[test]
    fn line_numbers() {
        assert_eq!(LineId::from_number(13), Some(LineId::Exti13));
        assert_eq!(LineId::from_number(23), None);
        assert_eq!(
            LineId::for_pin(crate::gpio::PinId::new(crate::gpio::PortId::C, 13)),
            LineId::Exti13
        );
        assert_eq!(LineId::Exti13.mask(), 1 << 13);
    }

    #[test]
    fn falling_edge_on_line_13() {
        let (base, exti) = fake_exti();
        exti.enable_line(LineId::Exti13, EdgeTrigger::Falling);

        assert_eq!(word(base, 0x00), 1 << 13);
        assert_eq!(word(base, 0x08), 0);
        assert_eq!(word(base, 0x0C), 1 << 13);
        assert!(exti.is_enabled(LineId::Exti13));
        assert_eq!(exti.trigger(LineId::Exti13), Some(EdgeTrigger::Falling));
    }

    #[test]
    fn trigger_policy_is_exclusive() {
        let (base, exti) = fake_exti();
        exti.enable_line(LineId::Exti2, EdgeTrigger::Both);
        assert_eq!(exti.trigger(LineId::Exti2), Some(EdgeTrigger::Both));

        exti.enable_line(LineId::Exti2, EdgeTrigger::Rising);
        assert_eq!(word(base, 0x08), 1 << 2);
        assert_eq!(word(base, 0x0C), 0);
        assert_eq!(exti.trigger(LineId::Exti2), Some(EdgeTrigger::Rising));
    }

    #[test]
    fn enabling_keeps_other_lines() {
        let (base, exti) = fake_exti();
        exti.enable_line(LineId::Exti0, EdgeTrigger::Rising);
        exti.enable_line(LineId::Exti13, EdgeTrigger::Falling);
        assert_eq!(word(base, 0x00), (1 << 13) | 1);
        assert_eq!(word(base, 0x08), 1);

        exti.mask_line(LineId::Exti0);
        assert_eq!(word(base, 0x00), 1 << 13);
        assert_eq!(exti.trigger(LineId::Exti0), Some(EdgeTrigger::Rising));
    }

    #[test]
    fn clear_pending_writes_only_its_bit() {
        let (base, exti) = fake_exti();
        set_word(base, 0x14, (1 << 13) | (1 << 3));
        assert!(exti.is_pending(LineId::Exti13));
        exti.clear_pending(LineId::Exti13);
        assert_eq!(word(base, 0x14), 1 << 13);
    }

    #[test]
    fn software_trigger_sets_swier() {
        let (base, exti) = fake_exti();
        exti.software_trigger(LineId::Exti13);
        assert_eq!(word(base, 0x10), 1 << 13);
    }

    #[test]
    fn handler_services_unmasked_lines_once() {
        let recorder = Recorder::default();
        let (base, exti) = fake_exti();
        exti.set_client(&recorder);
        exti.enable_line(LineId::Exti13, EdgeTrigger::Falling);
        exti.enable_line(LineId::Exti10, EdgeTrigger::Rising);

        // Line 3 is pending but masked and must be left alone.
        set_word(base, 0x14, (1 << 13) | (1 << 10) | (1 << 3));
        let serviced = exti.handle_interrupt();

        assert_eq!(serviced, (1 << 13) | (1 << 10));
        assert_eq!(word(base, 0x14), (1 << 13) | (1 << 10));
        assert_eq!(
            *recorder.lines.borrow(),
            vec![LineId::Exti10, LineId::Exti13]
        );
    }

    #[test]
    fn handler_without_pending_lines_does_nothing() {
        let recorder = Recorder::default();
        let (base, exti) = fake_exti();
        exti.set_client(&recorder);
        exti.enable_line(LineId::Exti13, EdgeTrigger::Falling);

        assert_eq!(exti.handle_interrupt(), 0);
        assert_eq!(word(base, 0x14), 0);
        assert!(recorder.lines.borrow().is_empty());
    }

    #[test]
    fn handler_without_client_still_clears_pending() {
        let (base, exti) = fake_exti();
        exti.enable_line(LineId::Exti13, EdgeTrigger::Falling);

        set_word(base, 0x14, 1 << 13);
        assert_eq!(exti.handle_interrupt(), 1 << 13);
        assert_eq!(word(base, 0x14), 1 << 13);
    }

    #[test]
    fn latest_client_is_notified() {
        let first = Recorder::default();
        let second = Recorder::default();
        let (base, exti) = fake_exti();
        exti.set_client(&first);
        exti.set_client(&second);
        exti.enable_line(LineId::Exti0, EdgeTrigger::Rising);

        set_word(base, 0x14, 1);
        exti.handle_interrupt();
        assert!(first.lines.borrow().is_empty());
        assert_eq!(*second.lines.borrow(), vec![LineId::Exti0]);
    }
}
