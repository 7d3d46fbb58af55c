// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Peripherals of the STM32F446RE used by boards.

use kernel::platform::chip::InterruptService;

use crate::exti::Exti;
use crate::gpio::{Port, PortId};
use crate::nvic;
use crate::rcc::Rcc;
use crate::syscfg::Syscfg;
use crate::usart::Usart;

pub struct Stm32f446reDefaultPeripherals<'a> {
    pub rcc: &'a Rcc,
    pub gpio_ports: [Port<'a>; 8],
    pub exti: Exti<'a>,
    pub syscfg: Syscfg<'a>,
    pub usart1: Usart<'a>,
    pub usart2: Usart<'a>,
    pub usart3: Usart<'a>,
    pub uart4: Usart<'a>,
    pub uart5: Usart<'a>,
    pub usart6: Usart<'a>,
}

impl<'a> Stm32f446reDefaultPeripherals<'a> {
    pub const fn new(rcc: &'a Rcc) -> Self {
        Self {
            rcc,
            gpio_ports: [
                Port::new(PortId::A, rcc),
                Port::new(PortId::B, rcc),
                Port::new(PortId::C, rcc),
                Port::new(PortId::D, rcc),
                Port::new(PortId::E, rcc),
                Port::new(PortId::F, rcc),
                Port::new(PortId::G, rcc),
                Port::new(PortId::H, rcc),
            ],
            exti: Exti::new(),
            syscfg: Syscfg::new(rcc),
            usart1: Usart::new_usart1(rcc),
            usart2: Usart::new_usart2(rcc),
            usart3: Usart::new_usart3(rcc),
            uart4: Usart::new_uart4(rcc),
            uart5: Usart::new_uart5(rcc),
            usart6: Usart::new_usart6(rcc),
        }
    }

    pub fn port(&self, id: PortId) -> &Port<'a> {
        &self.gpio_ports[id as usize]
    }
}

impl InterruptService for Stm32f446reDefaultPeripherals<'_> {
    unsafe fn service_interrupt(&self, interrupt: u32) -> bool {
        match interrupt {
            nvic::EXTI0
            | nvic::EXTI1
            | nvic::EXTI2
            | nvic::EXTI3
            | nvic::EXTI4
            | nvic::EXTI9_5
            | nvic::EXTI15_10 => {
                self.exti.handle_interrupt();
            }
            nvic::USART1 => self.usart1.handle_interrupt(),
            nvic::USART2 => self.usart2.handle_interrupt(),
            nvic::USART3 => self.usart3.handle_interrupt(),
            nvic::UART4 => self.uart4.handle_interrupt(),
            nvic::UART5 => self.uart5.handle_interrupt(),
            nvic::USART6 => self.usart6.handle_interrupt(),
            _ => return false,
        }
        true
    }
}
