// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Reset and clock control: peripheral clock gating.
//!
//! Only the enable registers are driven. The core runs from the 16 MHz HSI it
//! selects out of reset, with all bus prescalers at one.

use kernel::platform::chip::ClockInterface;
use kernel::utilities::registers::interfaces::{ReadWriteable, Readable};
use kernel::utilities::registers::{register_bitfields, register_structs, ReadWrite};
use kernel::utilities::StaticRef;

register_structs! {
    /// Reset and clock control
    RccRegisters {
        /// clock control register
        (0x00 => cr: ReadWrite<u32>),
        /// PLL configuration register
        (0x04 => pllcfgr: ReadWrite<u32>),
        /// clock configuration register
        (0x08 => cfgr: ReadWrite<u32>),
        /// clock interrupt register
        (0x0C => cir: ReadWrite<u32>),
        /// AHB1 peripheral reset register
        (0x10 => ahb1rstr: ReadWrite<u32>),
        /// AHB2 peripheral reset register
        (0x14 => ahb2rstr: ReadWrite<u32>),
        /// AHB3 peripheral reset register
        (0x18 => ahb3rstr: ReadWrite<u32>),
        (0x1C => _reserved0),
        /// APB1 peripheral reset register
        (0x20 => apb1rstr: ReadWrite<u32>),
        /// APB2 peripheral reset register
        (0x24 => apb2rstr: ReadWrite<u32>),
        (0x28 => _reserved1),
        /// AHB1 peripheral clock register
        (0x30 => ahb1enr: ReadWrite<u32, AHB1ENR::Register>),
        /// AHB2 peripheral clock enable register
        (0x34 => ahb2enr: ReadWrite<u32>),
        /// AHB3 peripheral clock enable register
        (0x38 => ahb3enr: ReadWrite<u32>),
        (0x3C => _reserved2),
        /// APB1 peripheral clock enable register
        (0x40 => apb1enr: ReadWrite<u32, APB1ENR::Register>),
        /// APB2 peripheral clock enable register
        (0x44 => apb2enr: ReadWrite<u32, APB2ENR::Register>),
        (0x48 => @END),
    }
}

register_bitfields![u32,
    AHB1ENR [
        /// IO port H clock enable
        GPIOHEN OFFSET(7) NUMBITS(1) [],
        /// IO port G clock enable
        GPIOGEN OFFSET(6) NUMBITS(1) [],
        /// IO port F clock enable
        GPIOFEN OFFSET(5) NUMBITS(1) [],
        /// IO port E clock enable
        GPIOEEN OFFSET(4) NUMBITS(1) [],
        /// IO port D clock enable
        GPIODEN OFFSET(3) NUMBITS(1) [],
        /// IO port C clock enable
        GPIOCEN OFFSET(2) NUMBITS(1) [],
        /// IO port B clock enable
        GPIOBEN OFFSET(1) NUMBITS(1) [],
        /// IO port A clock enable
        GPIOAEN OFFSET(0) NUMBITS(1) []
    ],
    APB1ENR [
        /// UART5 clock enable
        UART5EN OFFSET(20) NUMBITS(1) [],
        /// UART4 clock enable
        UART4EN OFFSET(19) NUMBITS(1) [],
        /// USART3 clock enable
        USART3EN OFFSET(18) NUMBITS(1) [],
        /// USART2 clock enable
        USART2EN OFFSET(17) NUMBITS(1) []
    ],
    APB2ENR [
        /// System configuration controller clock enable
        SYSCFGEN OFFSET(14) NUMBITS(1) [],
        /// USART6 clock enable
        USART6EN OFFSET(5) NUMBITS(1) [],
        /// USART1 clock enable
        USART1EN OFFSET(4) NUMBITS(1) []
    ]
];

const RCC_BASE: StaticRef<RccRegisters> =
    unsafe { StaticRef::new(0x4002_3800 as *const RccRegisters) };

pub struct Rcc {
    registers: StaticRef<RccRegisters>,
}

impl Rcc {
    pub const fn new() -> Self {
        Self {
            registers: RCC_BASE,
        }
    }

    fn ahb1_field(clock: HCLK1) -> kernel::utilities::registers::Field<u32, AHB1ENR::Register> {
        match clock {
            HCLK1::GPIOH => AHB1ENR::GPIOHEN,
            HCLK1::GPIOG => AHB1ENR::GPIOGEN,
            HCLK1::GPIOF => AHB1ENR::GPIOFEN,
            HCLK1::GPIOE => AHB1ENR::GPIOEEN,
            HCLK1::GPIOD => AHB1ENR::GPIODEN,
            HCLK1::GPIOC => AHB1ENR::GPIOCEN,
            HCLK1::GPIOB => AHB1ENR::GPIOBEN,
            HCLK1::GPIOA => AHB1ENR::GPIOAEN,
        }
    }

    fn apb1_field(clock: PCLK1) -> kernel::utilities::registers::Field<u32, APB1ENR::Register> {
        match clock {
            PCLK1::USART2 => APB1ENR::USART2EN,
            PCLK1::USART3 => APB1ENR::USART3EN,
            PCLK1::UART4 => APB1ENR::UART4EN,
            PCLK1::UART5 => APB1ENR::UART5EN,
        }
    }

    fn apb2_field(clock: PCLK2) -> kernel::utilities::registers::Field<u32, APB2ENR::Register> {
        match clock {
            PCLK2::USART1 => APB2ENR::USART1EN,
            PCLK2::USART6 => APB2ENR::USART6EN,
            PCLK2::SYSCFG => APB2ENR::SYSCFGEN,
        }
    }

    fn is_enabled(&self, clock: PeripheralClockType) -> bool {
        match clock {
            PeripheralClockType::AHB1(c) => self.registers.ahb1enr.is_set(Self::ahb1_field(c)),
            PeripheralClockType::APB1(c) => self.registers.apb1enr.is_set(Self::apb1_field(c)),
            PeripheralClockType::APB2(c) => self.registers.apb2enr.is_set(Self::apb2_field(c)),
        }
    }

    fn set_enabled(&self, clock: PeripheralClockType, enabled: bool) {
        let value = u32::from(enabled);
        match clock {
            PeripheralClockType::AHB1(c) => self
                .registers
                .ahb1enr
                .modify(Self::ahb1_field(c).val(value)),
            PeripheralClockType::APB1(c) => self
                .registers
                .apb1enr
                .modify(Self::apb1_field(c).val(value)),
            PeripheralClockType::APB2(c) => self
                .registers
                .apb2enr
                .modify(Self::apb2_field(c).val(value)),
        }
    }
}

/// Bus a peripheral clock is gated on, and which one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PeripheralClockType {
    AHB1(HCLK1),
    APB1(PCLK1),
    APB2(PCLK2),
}

/// Peripherals clocked from AHB1.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HCLK1 {
    GPIOH,
    GPIOG,
    GPIOF,
    GPIOE,
    GPIOD,
    GPIOC,
    GPIOB,
    GPIOA,
}

/// Peripherals clocked from APB1.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PCLK1 {
    USART2,
    USART3,
    UART4,
    UART5,
}

/// Peripherals clocked from APB2.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PCLK2 {
    USART1,
    USART6,
    SYSCFG,
}

/// Clock gate of a single peripheral.
pub struct PeripheralClock<'a> {
    pub clock: PeripheralClockType,
    rcc: &'a Rcc,
}

impl<'a> PeripheralClock<'a> {
    pub const fn new(clock: PeripheralClockType, rcc: &'a Rcc) -> Self {
        Self { clock, rcc }
    }
}

impl ClockInterface for PeripheralClock<'_> {
    fn is_enabled(&self) -> bool {
        self.rcc.is_enabled(self.clock)
    }

    fn enable(&self) {
        self.rcc.set_enabled(self.clock, true);
    }

    fn disable(&self) {
        self.rcc.set_enabled(self.clock, false);
    }
}
