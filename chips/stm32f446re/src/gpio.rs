// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! General-purpose I/O ports.
//!
//! Each port is a block of ten registers at `0x4002_0000 + 0x400 * port`.
//! Per-pin configuration fields are two bits wide (mode, speed, pull) or four
//! bits wide (alternate function) and are updated with a read-modify-write
//! that leaves the other pins' fields alone. Output level changes go through
//! the write-only BSRR, so they are a single store and never race with an
//! interrupt handler driving another pin of the same port.

use kernel::hil;
use kernel::platform::chip::ClockInterface;
use kernel::utilities::registers::interfaces::{ReadWriteable, Readable, Writeable};
use kernel::utilities::registers::{register_structs, Field, ReadOnly, ReadWrite, WriteOnly};
use kernel::utilities::StaticRef;
use kernel::ErrorCode;

use crate::rcc;

register_structs! {
    GpioRegisters {
        /// GPIO port mode register
        (0x00 => moder: ReadWrite<u32>),
        /// GPIO port output type register
        (0x04 => otyper: ReadWrite<u32>),
        /// GPIO port output speed register
        (0x08 => ospeedr: ReadWrite<u32>),
        /// GPIO port pull-up/pull-down register
        (0x0C => pupdr: ReadWrite<u32>),
        /// GPIO port input data register
        (0x10 => idr: ReadOnly<u32>),
        /// GPIO port output data register
        (0x14 => odr: ReadWrite<u32>),
        /// GPIO port bit set/reset register
        (0x18 => bsrr: WriteOnly<u32>),
        /// GPIO port configuration lock register
        (0x1C => lckr: ReadWrite<u32>),
        /// GPIO alternate function low register
        (0x20 => afrl: ReadWrite<u32>),
        /// GPIO alternate function high register
        (0x24 => afrh: ReadWrite<u32>),
        (0x28 => @END),
    }
}

const GPIO_BASE: usize = 0x4002_0000;
const GPIO_PORT_STRIDE: usize = 0x400;

/// Number of pins in a port.
pub const NUM_PINS: u8 = 16;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum PortId {
    A = 0,
    B = 1,
    C = 2,
    D = 3,
    E = 4,
    F = 5,
    G = 6,
    H = 7,
}

impl PortId {
    /// Port for a SYSCFG EXTICR selector code.
    pub fn from_code(code: u32) -> Option<PortId> {
        match code {
            0 => Some(PortId::A),
            1 => Some(PortId::B),
            2 => Some(PortId::C),
            3 => Some(PortId::D),
            4 => Some(PortId::E),
            5 => Some(PortId::F),
            6 => Some(PortId::G),
            7 => Some(PortId::H),
            _ => None,
        }
    }

    const fn clock(self) -> rcc::HCLK1 {
        match self {
            PortId::A => rcc::HCLK1::GPIOA,
            PortId::B => rcc::HCLK1::GPIOB,
            PortId::C => rcc::HCLK1::GPIOC,
            PortId::D => rcc::HCLK1::GPIOD,
            PortId::E => rcc::HCLK1::GPIOE,
            PortId::F => rcc::HCLK1::GPIOF,
            PortId::G => rcc::HCLK1::GPIOG,
            PortId::H => rcc::HCLK1::GPIOH,
        }
    }

    const fn base_address(self) -> usize {
        GPIO_BASE + GPIO_PORT_STRIDE * self as usize
    }

    const fn registers(self) -> StaticRef<GpioRegisters> {
        unsafe { StaticRef::new(self.base_address() as *const GpioRegisters) }
    }
}

/// One pin of one port.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PinId {
    port: PortId,
    number: u8,
}

impl PinId {
    /// Panics if `number` is not a pin of the port. Evaluate in a `const` to
    /// turn that into a build error.
    pub const fn new(port: PortId, number: u8) -> PinId {
        assert!(number < NUM_PINS, "GPIO pin number out of range");
        PinId { port, number }
    }

    /// Pin selected by a one-hot mask, as used by the vendor headers.
    ///
    /// Masks with zero or several bits set are rejected with `INVAL`.
    pub fn from_mask(port: PortId, mask: u16) -> Result<PinId, ErrorCode> {
        if mask.count_ones() != 1 {
            return Err(ErrorCode::INVAL);
        }
        Ok(PinId {
            port,
            number: mask.trailing_zeros() as u8,
        })
    }

    pub fn port(&self) -> PortId {
        self.port
    }

    pub fn number(&self) -> u8 {
        self.number
    }

    pub fn mask(&self) -> u16 {
        1 << self.number
    }
}

/// GPIO pin mode [^1]
///
/// [^1]: Section 7.1.4, page 187 of reference manual
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum Mode {
    Input = 0b00,
    Output = 0b01,
    AlternateFunction = 0b10,
    Analog = 0b11,
}

/// Alternate functions that may be assigned to a `Pin`.
///
/// GPIO pins on the STM32F446RE may serve multiple functions. In addition to
/// the default functionality, each pin can be assigned up to sixteen different
/// alternate functions. The various functions for each pin are described in
/// "Alternate Function" section of the STM32F446RE datasheet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum AlternateFunction {
    AF0 = 0b0000,
    AF1 = 0b0001,
    AF2 = 0b0010,
    AF3 = 0b0011,
    AF4 = 0b0100,
    AF5 = 0b0101,
    AF6 = 0b0110,
    AF7 = 0b0111,
    AF8 = 0b1000,
    AF9 = 0b1001,
    AF10 = 0b1010,
    AF11 = 0b1011,
    AF12 = 0b1100,
    AF13 = 0b1101,
    AF14 = 0b1110,
    AF15 = 0b1111,
}

/// GPIO pin internal pull-up and pull-down [^1]
///
/// [^1]: Section 7.4.4, page 189 of reference manual
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum PullUpPullDown {
    NoPullUpPullDown = 0b00,
    PullUp = 0b01,
    PullDown = 0b10,
}

/// Clock gate of one GPIO port.
pub struct Port<'a> {
    port: PortId,
    clock: rcc::PeripheralClock<'a>,
}

impl<'a> Port<'a> {
    pub const fn new(port: PortId, rcc: &'a rcc::Rcc) -> Self {
        Self {
            port,
            clock: rcc::PeripheralClock::new(
                rcc::PeripheralClockType::AHB1(port.clock()),
                rcc,
            ),
        }
    }

    pub fn id(&self) -> PortId {
        self.port
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
}

pub struct Pin {
    pinid: PinId,
    registers: StaticRef<GpioRegisters>,
}

impl Pin {
    pub const fn new(pinid: PinId) -> Self {
        Self {
            pinid,
            registers: pinid.port.registers(),
        }
    }

    pub fn id(&self) -> PinId {
        self.pinid
    }

    fn shift(&self, width: usize) -> usize {
        self.pinid.number as usize * width
    }

    /// Two-bit field of this pin in MODER, OSPEEDR or PUPDR.
    fn pair(&self) -> Field<u32, ()> {
        Field::new(0b11, self.shift(2))
    }

    fn bit(&self) -> u32 {
        1 << self.pinid.number
    }

    pub fn set_mode(&self, mode: Mode) {
        self.registers.moder.modify(self.pair().val(mode as u32));
    }

    pub fn get_mode(&self) -> Mode {
        match self.registers.moder.read(self.pair()) {
            0b00 => Mode::Input,
            0b01 => Mode::Output,
            0b10 => Mode::AlternateFunction,
            _ => Mode::Analog,
        }
    }

    /// Select the peripheral routed to the pin in alternate function mode.
    pub fn set_alternate_function(&self, af: AlternateFunction) {
        let number = self.pinid.number as usize;
        if number < 8 {
            let field: Field<u32, ()> = Field::new(0b1111, number * 4);
            self.registers.afrl.modify(field.val(af as u32));
        } else {
            let field: Field<u32, ()> = Field::new(0b1111, (number - 8) * 4);
            self.registers.afrh.modify(field.val(af as u32));
        }
    }

    pub fn set_floating_state(&self, state: PullUpPullDown) {
        self.registers.pupdr.modify(self.pair().val(state as u32));
    }

    /// Drive the pin high or low with a single BSRR store.
    pub fn write(&self, high: bool) {
        if high {
            self.registers.bsrr.set(self.bit());
        } else {
            self.registers.bsrr.set(self.bit() << 16);
        }
    }

    /// Level the output latch is driving.
    pub fn is_output_high(&self) -> bool {
        self.registers.odr.get() & self.bit() != 0
    }

    /// Level sampled on the pin.
    pub fn read_input(&self) -> bool {
        self.registers.idr.get() & self.bit() != 0
    }

    /// Invert the output latch. Returns the new level.
    pub fn toggle_output(&self) -> bool {
        let high = !self.is_output_high();
        self.write(high);
        high
    }
}

impl hil::gpio::Output for Pin {
    fn set(&self) {
        self.write(true);
    }

    fn clear(&self) {
        self.write(false);
    }

    fn toggle(&self) -> bool {
        self.toggle_output()
    }
}

impl hil::gpio::Input for Pin {
    fn read(&self) -> bool {
        self.read_input()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use kernel::hil::gpio::{Input, Output};

    pub(crate) fn fake_pin(port: PortId, number: u8) -> (*mut u32, Pin) {
        let words: &'static mut [u32; 10] = Box::leak(Box::new([0; 10]));
        let base = words.as_mut_ptr();
        let registers = unsafe { StaticRef::new(base.cast::<GpioRegisters>()) };
        (
            base,
            Pin {
                pinid: PinId::new(port, number),
                registers,
            },
        )
    }

    fn word(base: *mut u32, offset: usize) -> u32 {
        unsafe { base.add(offset / 4).read_volatile() }
    }

    fn set_word(base: *mut u32, offset: usize, value: u32) {
        unsafe { base.add(offset / 4).write_volatile(value) }
    }

    #[test]
    fn port_addresses() {
        assert_eq!(PortId::A.base_address(), 0x4002_0000);
        assert_eq!(PortId::C.base_address(), 0x4002_0800);
        assert_eq!(PortId::H.base_address(), 0x4002_1C00);
    }

    #[test]
    fn from_mask_accepts_exactly_one_bit() {
        assert_eq!(
            PinId::from_mask(PortId::C, 1 << 13),
            Ok(PinId::new(PortId::C, 13))
        );
        assert_eq!(PinId::from_mask(PortId::A, 0x0020).map(|p| p.number()), Ok(5));
        assert_eq!(PinId::from_mask(PortId::A, 0), Err(ErrorCode::INVAL));
        assert_eq!(PinId::from_mask(PortId::A, 0b1100), Err(ErrorCode::INVAL));
        assert_eq!(PinId::from_mask(PortId::A, 0xFFFF), Err(ErrorCode::INVAL));
    }

    #[test]
    #[should_panic]
    fn pin_number_out_of_range() {
        let _ = PinId::new(PortId::A, 16);
    }

    #[test]
    fn set_mode_only_changes_own_field() {
        let (base, pin) = fake_pin(PortId::A, 5);
        set_word(base, 0x00, 0xA800_0000);

        pin.set_mode(Mode::Output);
        assert_eq!(word(base, 0x00), 0xA800_0000 | (0b01 << 10));
        assert_eq!(pin.get_mode(), Mode::Output);

        pin.set_mode(Mode::Analog);
        assert_eq!(word(base, 0x00), 0xA800_0000 | (0b11 << 10));

        pin.set_mode(Mode::Input);
        assert_eq!(word(base, 0x00), 0xA800_0000);
        assert_eq!(pin.get_mode(), Mode::Input);
    }

    #[test]
    fn mode_of_highest_pin() {
        let (base, pin) = fake_pin(PortId::C, 15);
        pin.set_mode(Mode::AlternateFunction);
        assert_eq!(word(base, 0x00), 0b10 << 30);
        assert_eq!(pin.get_mode(), Mode::AlternateFunction);
    }

    #[test]
    fn alternate_function_low_register() {
        let (base, pin) = fake_pin(PortId::A, 2);
        pin.set_alternate_function(AlternateFunction::AF7);
        assert_eq!(word(base, 0x20), 0x0000_0700);
        assert_eq!(word(base, 0x24), 0);
    }

    #[test]
    fn alternate_function_high_register_uses_pin_offset() {
        let (base, pin) = fake_pin(PortId::A, 10);
        set_word(base, 0x24, 0x0000_000F);
        pin.set_alternate_function(AlternateFunction::AF7);
        // Pin 10 is the third field of AFRH.
        assert_eq!(word(base, 0x24), 0x0000_070F);
        assert_eq!(word(base, 0x20), 0);

        let (base, pin) = fake_pin(PortId::A, 15);
        pin.set_alternate_function(AlternateFunction::AF15);
        assert_eq!(word(base, 0x24), 0xF000_0000);
    }

    #[test]
    fn write_is_a_single_bsrr_store() {
        let (base, pin) = fake_pin(PortId::A, 5);

        pin.set();
        assert_eq!(word(base, 0x18), 1 << 5);
        pin.set();
        assert_eq!(word(base, 0x18), 1 << 5);

        pin.clear();
        assert_eq!(word(base, 0x18), 1 << 21);
        // The output latch is never written directly.
        assert_eq!(word(base, 0x14), 0);
    }

    #[test]
    fn toggle_issues_the_opposite_write() {
        let (base, pin) = fake_pin(PortId::A, 5);

        // Latch low: toggle drives high.
        assert!(pin.toggle());
        assert_eq!(word(base, 0x18), 1 << 5);

        // Hardware would now show the latch high.
        set_word(base, 0x14, 1 << 5);
        assert!(!pin.toggle());
        assert_eq!(word(base, 0x18), 1 << 21);

        set_word(base, 0x14, 0);
        assert!(pin.toggle());
        assert_eq!(word(base, 0x18), 1 << 5);
    }

    #[test]
    fn read_samples_idr() {
        let (base, pin) = fake_pin(PortId::C, 13);
        assert!(!pin.read());
        set_word(base, 0x10, 1 << 13);
        assert!(pin.read());
        set_word(base, 0x10, !(1 << 13));
        assert!(!pin.read());
    }

    #[test]
    fn pull_configuration() {
        let (base, pin) = fake_pin(PortId::C, 13);
        pin.set_floating_state(PullUpPullDown::PullUp);
        assert_eq!(word(base, 0x0C), 0b01 << 26);
    }

    #[test]
    fn port_clock_gate() {
        let (rcc_base, rcc) = crate::rcc::tests::fake_rcc();
        let port = Port::new(PortId::C, rcc);
        assert_eq!(port.id(), PortId::C);
        assert!(!port.is_enabled_clock());
        port.enable_clock();
        assert!(port.is_enabled_clock());
        assert_eq!(crate::rcc::tests::word(rcc_base, 0x30), 1 << 2);
        port.disable_clock();
        assert_eq!(crate::rcc::tests::word(rcc_base, 0x30), 0);
    }
}
