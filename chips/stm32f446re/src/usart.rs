// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Universal synchronous/asynchronous receiver transmitter.
//!
//! Transmission is blocking: each byte is written to the data register and
//! the driver spins until the transmission-complete flag is set. Reception is
//! interrupt driven: with `RXNEIE` set, every received byte raises the
//! instance's NVIC interrupt, and [`Usart::handle_interrupt`] hands the byte
//! to the registered [`ReceiveClient`].

use kernel::hil::uart::{ReceiveClient, Transmit};
use kernel::platform::chip::ClockInterface;
use kernel::utilities::cells::OptionalCell;
use kernel::utilities::registers::interfaces::{ReadWriteable, Readable, Writeable};
use kernel::utilities::registers::{register_bitfields, register_structs, ReadWrite};
use kernel::utilities::StaticRef;
use kernel::ErrorCode;

use crate::nvic;
use crate::rcc;

register_structs! {
    UsartRegisters {
        /// Status register
        (0x00 => sr: ReadWrite<u32, SR::Register>),
        /// Data register
        (0x04 => dr: ReadWrite<u32>),
        /// Baud rate register
        (0x08 => brr: ReadWrite<u32, BRR::Register>),
        /// Control register 1
        (0x0C => cr1: ReadWrite<u32, CR1::Register>),
        /// Control register 2
        (0x10 => cr2: ReadWrite<u32>),
        /// Control register 3
        (0x14 => cr3: ReadWrite<u32>),
        /// Guard time and prescaler register
        (0x18 => gtpr: ReadWrite<u32>),
        (0x1C => @END),
    }
}

register_bitfields![u32,
    SR [
        /// CTS flag
        CTS OFFSET(9) NUMBITS(1) [],
        /// LIN break detection flag
        LBD OFFSET(8) NUMBITS(1) [],
        /// Transmit data register empty
        TXE OFFSET(7) NUMBITS(1) [],
        /// Transmission complete
        TC OFFSET(6) NUMBITS(1) [],
        /// Read data register not empty
        RXNE OFFSET(5) NUMBITS(1) [],
        /// IDLE line detected
        IDLE OFFSET(4) NUMBITS(1) [],
        /// Overrun error
        ORE OFFSET(3) NUMBITS(1) [],
        /// Noise detected flag
        NF OFFSET(2) NUMBITS(1) [],
        /// Framing error
        FE OFFSET(1) NUMBITS(1) [],
        /// Parity error
        PE OFFSET(0) NUMBITS(1) []
    ],
    BRR [
        /// mantissa of USARTDIV
        DIV_Mantissa OFFSET(4) NUMBITS(12) [],
        /// fraction of USARTDIV
        DIV_Fraction OFFSET(0) NUMBITS(4) []
    ],
    CR1 [
        /// Oversampling mode
        OVER8 OFFSET(15) NUMBITS(1) [],
        /// USART enable
        UE OFFSET(13) NUMBITS(1) [],
        /// Word length
        M OFFSET(12) NUMBITS(1) [],
        /// Parity control enable
        PCE OFFSET(10) NUMBITS(1) [],
        /// TXE interrupt enable
        TXEIE OFFSET(7) NUMBITS(1) [],
        /// Transmission complete interrupt enable
        TCIE OFFSET(6) NUMBITS(1) [],
        /// RXNE interrupt enable
        RXNEIE OFFSET(5) NUMBITS(1) [],
        /// Transmitter enable
        TE OFFSET(3) NUMBITS(1) [],
        /// Receiver enable
        RE OFFSET(2) NUMBITS(1) []
    ]
];

const USART1_BASE: StaticRef<UsartRegisters> =
    unsafe { StaticRef::new(0x4001_1000 as *const UsartRegisters) };
const USART2_BASE: StaticRef<UsartRegisters> =
    unsafe { StaticRef::new(0x4000_4400 as *const UsartRegisters) };
const USART3_BASE: StaticRef<UsartRegisters> =
    unsafe { StaticRef::new(0x4000_4800 as *const UsartRegisters) };
const UART4_BASE: StaticRef<UsartRegisters> =
    unsafe { StaticRef::new(0x4000_4C00 as *const UsartRegisters) };
const UART5_BASE: StaticRef<UsartRegisters> =
    unsafe { StaticRef::new(0x4000_5000 as *const UsartRegisters) };
const USART6_BASE: StaticRef<UsartRegisters> =
    unsafe { StaticRef::new(0x4001_1400 as *const UsartRegisters) };

/// USARTDIV split the way BRR stores it, for 16x oversampling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BaudRateDivisor {
    mantissa: u32,
    fraction: u32,
}

impl BaudRateDivisor {
    /// Divisor for `baud_rate` from a `pclk_hz` peripheral clock.
    ///
    /// USARTDIV is computed in hundredths, `pclk * 25 / (4 * baud)`, and its
    /// fractional part rounded to sixteenths. A fraction that rounds up to 16
    /// carries into the mantissa when the register value is assembled.
    pub fn compute(pclk_hz: u32, baud_rate: u32) -> Result<Self, ErrorCode> {
        if baud_rate == 0 {
            return Err(ErrorCode::INVAL);
        }
        let div = u64::from(pclk_hz) * 25 / (4 * u64::from(baud_rate));
        let mantissa = div / 100;
        let fraction = ((div - mantissa * 100) * 16 + 50) / 100;
        let divisor = Self {
            mantissa: mantissa as u32,
            fraction: fraction as u32,
        };
        // USARTDIV must be at least 1 and fit in 16 bits.
        if mantissa == 0 || mantissa > 0xFFF || divisor.register_value() > 0xFFFF {
            return Err(ErrorCode::INVAL);
        }
        Ok(divisor)
    }

    pub fn mantissa(&self) -> u32 {
        self.mantissa
    }

    pub fn fraction(&self) -> u32 {
        self.fraction
    }

    /// Value to write to BRR.
    pub fn register_value(&self) -> u32 {
        (self.mantissa << 4) + (self.fraction & 0xF0) + (self.fraction & 0x0F)
    }
}

pub struct Usart<'a> {
    registers: StaticRef<UsartRegisters>,
    clock: rcc::PeripheralClock<'a>,
    irqn: u32,
    rx_client: OptionalCell<&'a dyn ReceiveClient>,
}

impl<'a> Usart<'a> {
    const fn new(
        registers: StaticRef<UsartRegisters>,
        clock: rcc::PeripheralClockType,
        irqn: u32,
        rcc: &'a rcc::Rcc,
    ) -> Self {
        Self {
            registers,
            clock: rcc::PeripheralClock::new(clock, rcc),
            irqn,
            rx_client: OptionalCell::empty(),
        }
    }

    pub const fn new_usart1(rcc: &'a rcc::Rcc) -> Self {
        Self::new(
            USART1_BASE,
            rcc::PeripheralClockType::APB2(rcc::PCLK2::USART1),
            nvic::USART1,
            rcc,
        )
    }

    pub const fn new_usart2(rcc: &'a rcc::Rcc) -> Self {
        Self::new(
            USART2_BASE,
            rcc::PeripheralClockType::APB1(rcc::PCLK1::USART2),
            nvic::USART2,
            rcc,
        )
    }

    pub const fn new_usart3(rcc: &'a rcc::Rcc) -> Self {
        Self::new(
            USART3_BASE,
            rcc::PeripheralClockType::APB1(rcc::PCLK1::USART3),
            nvic::USART3,
            rcc,
        )
    }

    pub const fn new_uart4(rcc: &'a rcc::Rcc) -> Self {
        Self::new(
            UART4_BASE,
            rcc::PeripheralClockType::APB1(rcc::PCLK1::UART4),
            nvic::UART4,
            rcc,
        )
    }

    pub const fn new_uart5(rcc: &'a rcc::Rcc) -> Self {
        Self::new(
            UART5_BASE,
            rcc::PeripheralClockType::APB1(rcc::PCLK1::UART5),
            nvic::UART5,
            rcc,
        )
    }

    pub const fn new_usart6(rcc: &'a rcc::Rcc) -> Self {
        Self::new(
            USART6_BASE,
            rcc::PeripheralClockType::APB2(rcc::PCLK2::USART6),
            nvic::USART6,
            rcc,
        )
    }

    /// NVIC interrupt of this instance.
    pub fn irqn(&self) -> u32 {
        self.irqn
    }

    pub fn clock(&self) -> &rcc::PeripheralClock<'a> {
        &self.clock
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

    pub fn set_receive_client(&self, client: &'a dyn ReceiveClient) {
        self.rx_client.set(client);
    }

    /// Reset the control registers, enable the receiver, transmitter and
    /// receive interrupt, and program the baud rate. Frames are 8N1.
    ///
    /// A rejected baud rate leaves the peripheral untouched.
    pub fn configure(&self, pclk_hz: u32, baud_rate: u32) -> Result<(), ErrorCode> {
        let divisor = BaudRateDivisor::compute(pclk_hz, baud_rate)?;

        self.registers.cr1.set(0);
        self.registers.cr2.set(0);
        self.registers.cr3.set(0);
        self.registers
            .cr1
            .modify(CR1::RE::SET + CR1::TE::SET + CR1::UE::SET);
        self.registers.cr1.modify(CR1::RXNEIE::SET);
        self.registers.brr.set(divisor.register_value());
        Ok(())
    }

    /// Send one byte and wait until it has left the shift register.
    pub fn transmit_byte(&self, byte: u8) {
        self.registers.dr.set(u32::from(byte));
        while !self.registers.sr.is_set(SR::TC) {
            core::hint::spin_loop();
        }
    }

    /// Take the received byte if there is one. Never blocks.
    pub fn receive_byte(&self) -> Option<u8> {
        if self.registers.sr.is_set(SR::RXNE) {
            Some((self.registers.dr.get() & 0xFF) as u8)
        } else {
            None
        }
    }

    /// Receive interrupt: pass the pending byte, if any, to the client.
    pub fn handle_interrupt(&self) {
        if let Some(byte) = self.receive_byte() {
            self.rx_client.map(|client| client.received_byte(byte));
        }
    }
}

impl Transmit for Usart<'_> {
    fn transmit(&self, bytes: &[u8]) {
        for &byte in bytes {
            self.transmit_byte(byte);
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::rcc::tests::fake_rcc;
    use std::cell::RefCell;

    pub(crate) fn fake_usart<'a>(status: u32) -> (*mut u32, Usart<'a>) {
        let words: &'static mut [u32; 7] = Box::leak(Box::new([0; 7]));
        let base = words.as_mut_ptr();
        unsafe { base.write_volatile(status) };
        let registers = unsafe { StaticRef::new(base.cast::<UsartRegisters>()) };
        let (_, rcc) = fake_rcc();
        (
            base,
            Usart::new(
                registers,
                rcc::PeripheralClockType::APB1(rcc::PCLK1::USART2),
                nvic::USART2,
                rcc,
            ),
        )
    }

    fn word(base: *mut u32, offset: usize) -> u32 {
        unsafe { base.add(offset / 4).read_volatile() }
    }

    fn set_word(base: *mut u32, offset: usize, value: u32) {
        unsafe { base.add(offset / 4).write_volatile(value) }
    }

    pub(crate) const TC: u32 = 1 << 6;
    pub(crate) const RXNE: u32 = 1 << 5;

    #[test]
    fn divisor_for_9600_at_16mhz() {
        let divisor = BaudRateDivisor::compute(16_000_000, 9600).unwrap();
        assert_eq!(divisor.mantissa(), 104);
        assert_eq!(divisor.fraction(), 3);
        assert_eq!(divisor.register_value(), 0x683);
    }

    #[test]
    fn divisor_for_115200_at_16mhz() {
        let divisor = BaudRateDivisor::compute(16_000_000, 115_200).unwrap();
        assert_eq!(divisor.mantissa(), 8);
        assert_eq!(divisor.fraction(), 11);
        assert_eq!(divisor.register_value(), 0x8B);
    }

    #[test]
    fn fraction_rounding_carries_into_mantissa() {
        // USARTDIV = 1.98: the fraction rounds to 16/16.
        let divisor = BaudRateDivisor::compute(127, 4).unwrap();
        assert_eq!(divisor.mantissa(), 1);
        assert_eq!(divisor.fraction(), 16);
        assert_eq!(divisor.register_value(), 2 << 4);
    }

    #[test]
    fn divisor_rejects_impossible_rates() {
        assert_eq!(BaudRateDivisor::compute(16_000_000, 0), Err(ErrorCode::INVAL));
        // Faster than pclk / 16.
        assert_eq!(
            BaudRateDivisor::compute(16_000_000, 2_000_000),
            Err(ErrorCode::INVAL)
        );
        // Mantissa wider than 12 bits.
        assert_eq!(BaudRateDivisor::compute(180_000_000, 100), Err(ErrorCode::INVAL));
    }

    #[test]
    fn configure_enables_rx_tx_and_receive_interrupt() {
        let (base, usart) = fake_usart(0);
        set_word(base, 0x0C, 0xFFFF);
        set_word(base, 0x10, 0x3000);
        set_word(base, 0x14, 0x0001);

        assert_eq!(usart.configure(16_000_000, 9600), Ok(()));
        assert_eq!(word(base, 0x0C), (1 << 13) | (1 << 5) | (1 << 3) | (1 << 2));
        assert_eq!(word(base, 0x10), 0);
        assert_eq!(word(base, 0x14), 0);
        assert_eq!(word(base, 0x08), 0x683);
    }

    #[test]
    fn rejected_configuration_writes_nothing() {
        let (base, usart) = fake_usart(0);
        set_word(base, 0x0C, 0x1234);
        assert_eq!(usart.configure(16_000_000, 0), Err(ErrorCode::INVAL));
        assert_eq!(word(base, 0x0C), 0x1234);
        assert_eq!(word(base, 0x08), 0);
    }

    #[test]
    fn transmit_writes_data_register() {
        let (base, usart) = fake_usart(TC);
        usart.transmit(b"led toggled\r\n");
        assert_eq!(word(base, 0x04), u32::from(b'\n'));
        usart.transmit_byte(b'x');
        assert_eq!(word(base, 0x04), u32::from(b'x'));
    }

    #[test]
    fn receive_is_a_non_blocking_poll() {
        let (base, usart) = fake_usart(0);
        assert_eq!(usart.receive_byte(), None);

        set_word(base, 0x04, 0x100 | u32::from(b't'));
        assert_eq!(usart.receive_byte(), None);

        set_word(base, 0x00, RXNE);
        assert_eq!(usart.receive_byte(), Some(b't'));
    }

    struct Received(RefCell<Vec<u8>>);

    impl ReceiveClient for Received {
        fn received_byte(&self, byte: u8) {
            self.0.borrow_mut().push(byte);
        }
    }

    #[test]
    fn interrupt_delivers_byte_to_client() {
        let received = Received(RefCell::new(Vec::new()));
        let (base, usart) = fake_usart(0);
        usart.set_receive_client(&received);

        usart.handle_interrupt();
        assert!(received.0.borrow().is_empty());

        set_word(base, 0x04, u32::from(b'a'));
        set_word(base, 0x00, RXNE | TC);
        usart.handle_interrupt();
        assert_eq!(*received.0.borrow(), b"a");
    }

    #[test]
    fn instances() {
        let (rcc_base, rcc) = fake_rcc();
        assert_eq!(Usart::new_usart1(rcc).irqn(), 37);
        assert_eq!(Usart::new_usart3(rcc).irqn(), 39);
        assert_eq!(Usart::new_uart4(rcc).irqn(), 52);
        assert_eq!(Usart::new_uart5(rcc).irqn(), 53);
        assert_eq!(Usart::new_usart6(rcc).irqn(), 71);

        let usart2 = Usart::new_usart2(rcc);
        assert_eq!(usart2.irqn(), 38);
        assert!(!usart2.clock().is_enabled());
        usart2.enable_clock();
        assert!(usart2.is_enabled_clock());
        assert!(usart2.clock().is_enabled());
        assert_eq!(crate::rcc::tests::word(rcc_base, 0x40), 1 << 17);
    }
}
