// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Board file for Nucleo-F446RE development board
//!
//! - <https://www.st.com/en/evaluation-tools/nucleo-f446re.html>
//!
//! The user button (PC13) and the ST-LINK virtual COM port (USART2 on
//! PA2/PA3) both toggle the user LED (PA5). Every byte received on the
//! console is echoed back.

#![cfg_attr(all(target_arch = "arm", target_os = "none"), no_std)]
#![cfg_attr(all(target_arch = "arm", target_os = "none"), no_main)]
#![cfg_attr(not(all(target_arch = "arm", target_os = "none")), allow(dead_code))]
#![deny(missing_docs)]

use core::ptr::{addr_of, addr_of_mut};

use cortexm4::nvic::Nvic;
use cortexm4::systick::{SysTick, TickRate};
use cortexm4::vectors::Handler;
use kernel::platform::chip::InterruptService;
use kernel::{debug, static_init};
use stm32f446re::chip::Stm32f446reDefaultPeripherals;
use stm32f446re::exti::{EdgeTrigger, LineId};
use stm32f446re::gpio::{AlternateFunction, Mode, Pin, PinId, PortId};
use stm32f446re::rcc::Rcc;
use stm32f446re::usart::Usart;

/// Application handlers.
pub mod app;
/// Support routines for debugging I/O.
pub mod io;

/// Core clock: the 16 MHz HSI selected at reset.
pub const SYS_FREQ: u32 = 16_000_000;
/// Console baud rate, 8N1.
pub const CONSOLE_BAUD: u32 = 9600;
/// Tick counter resolution.
pub const TICK_RATE: TickRate = TickRate::Milliseconds;

/// User LED LD2.
pub const LED_PIN: PinId = PinId::new(PortId::A, 5);
/// User button B1, pulled up on the board and low while pressed.
pub const BUTTON_PIN: PinId = PinId::new(PortId::C, 13);
/// USART2 TX, wired to the ST-LINK virtual COM port.
pub const CONSOLE_TX: PinId = PinId::new(PortId::A, 2);
/// USART2 RX, wired to the ST-LINK virtual COM port.
pub const CONSOLE_RX: PinId = PinId::new(PortId::A, 3);

type NucleoApp = app::App<'static, Pin, Usart<'static>>;

// Static reference to the peripherals for the interrupt handlers.
static mut PERIPHERALS: Option<&'static Stm32f446reDefaultPeripherals<'static>> = None;

/// Pass `interrupt` to the driver that owns it.
unsafe fn service(interrupt: u32) {
    if let Some(peripherals) = *addr_of!(PERIPHERALS) {
        peripherals.service_interrupt(interrupt);
    }
}

unsafe extern "C" fn exti15_10_handler() {
    service(stm32f446re::nvic::EXTI15_10);
}

unsafe extern "C" fn usart2_handler() {
    service(stm32f446re::nvic::USART2);
}

/// Vendor interrupts this board services. Every other slot parks.
const IRQ_BINDINGS: [(u32, Handler); 2] = [
    (stm32f446re::nvic::EXTI15_10, exti15_10_handler),
    (stm32f446re::nvic::USART2, usart2_handler),
];

/// Helper function called during bring-up that configures multiplexed I/O.
unsafe fn set_pin_primary_functions(peripherals: &Stm32f446reDefaultPeripherals) -> &'static Pin {
    peripherals.port(PortId::A).enable_clock();
    peripherals.port(PortId::C).enable_clock();
    peripherals.syscfg.enable_clock();

    // User LD2 is connected to PA05.
    let led: &'static Pin = static_init!(Pin, Pin::new(LED_PIN));
    led.set_mode(Mode::Output);

    // button is connected on pc13
    Pin::new(BUTTON_PIN).set_mode(Mode::Input);

    // pa2 and pa3 (USART2) is connected to ST-LINK virtual COM port
    for pin in [CONSOLE_TX, CONSOLE_RX] {
        let pin = Pin::new(pin);
        pin.set_mode(Mode::AlternateFunction);
        // AF7 is USART2_TX / USART2_RX
        pin.set_alternate_function(AlternateFunction::AF7);
    }

    led
}

/// Bring up the console, the tick and the button, then unmask their
/// interrupts.
#[inline(never)]
unsafe fn setup() -> &'static Stm32f446reDefaultPeripherals<'static> {
    stm32f446re::init();

    let rcc: &'static Rcc = static_init!(Rcc, Rcc::new());
    let peripherals: &'static Stm32f446reDefaultPeripherals<'static> = static_init!(
        Stm32f446reDefaultPeripherals<'static>,
        Stm32f446reDefaultPeripherals::new(rcc)
    );

    let led = set_pin_primary_functions(peripherals);

    // Console first, so that later failures can be reported.
    let console = &peripherals.usart2;
    console.enable_clock();
    if console.configure(SYS_FREQ, CONSOLE_BAUD).is_ok() {
        let writer = static_init!(io::Writer<'static, Usart<'static>>, io::Writer::new(console));
        kernel::debug::set_debug_writer(writer);
    }

    let systick = SysTick::new();
    if let Err(error) = systick.init(SYS_FREQ, TICK_RATE) {
        debug!("systick: cannot tick at {:?} from {} Hz: {:?}", TICK_RATE, SYS_FREQ, error);
    }

    let button = LineId::for_pin(BUTTON_PIN);
    let app: &'static NucleoApp = static_init!(NucleoApp, app::App::new(led, console, button));
    peripherals.exti.set_client(app);
    console.set_receive_client(app);

    peripherals.syscfg.configure_interrupt(BUTTON_PIN);
    peripherals.exti.enable_line(button, EdgeTrigger::Falling);

    *addr_of_mut!(PERIPHERALS) = Some(peripherals);

    // Logged while still masked: a handler echoing on the console must not
    // interleave with this line.
    debug!("Initialization complete. Entering main loop");

    if let Some(irqn) = button.irqn() {
        Nvic::new(irqn).enable();
    }
    Nvic::new(console.irqn()).enable();

    peripherals
}

#[cfg(all(target_arch = "arm", target_os = "none"))]
mod boot {
    use core::ptr::{addr_of, addr_of_mut};

    use cortexm4::vectors::{exception_table, Binding, CoreExceptions, Vector, NUM_CORE_VECTORS};
    use stm32f446re::nvic::NUM_IRQS;
    use stm32f446re::vectors::peripheral_table;

    extern "C" {
        // Symbols defined in the linker file
        fn _estack();
        static _etext: u32;
        static mut _srelocate: u32;
        static mut _erelocate: u32;
        static mut _szero: u32;
        static mut _ezero: u32;
    }

    #[link_section = ".vectors"]
    #[used]
    static BASE_VECTORS: [Vector; NUM_CORE_VECTORS] = exception_table(
        _estack,
        reset_handler,
        &CoreExceptions {
            systick: Binding::Bound(cortexm4::ticks::systick_handler),
            ..CoreExceptions::DEFAULT
        },
    );

    #[link_section = ".irqs"]
    #[used]
    static IRQS: [Vector; NUM_IRQS] = peripheral_table(&super::IRQ_BINDINGS);

    /// Entry point after reset: initialize RAM, then run the board.
    #[no_mangle]
    pub unsafe extern "C" fn reset_handler() {
        cortexm4::startup::init_data(
            addr_of!(_etext),
            addr_of_mut!(_srelocate),
            addr_of_mut!(_erelocate),
        );
        cortexm4::startup::zero_bss(addr_of_mut!(_szero), addr_of_mut!(_ezero));

        super::setup();

        // Interrupts do all the work.
        loop {
            cortexm4::support::nop();
        }
    }
}

#[cfg(not(all(target_arch = "arm", target_os = "none")))]
fn main() {}

#[cfg(test)]
mod tests {
    use super::*;
    use cortexm4::vectors::unhandled_interrupt;
    use stm32f446re::nvic;
    use stm32f446re::vectors::peripheral_table;

    #[test]
    fn only_button_and_console_are_bound() {
        let table = peripheral_table(&IRQ_BINDINGS);
        let park = unhandled_interrupt as usize;
        for (irq, slot) in table.iter().enumerate() {
            let irq = irq as u32;
            if irq == nvic::EXTI15_10 {
                assert_eq!(slot.address(), exti15_10_handler as usize);
            } else if irq == nvic::USART2 {
                assert_eq!(slot.address(), usart2_handler as usize);
            } else if nvic::is_reserved(irq) {
                assert!(slot.is_reserved(), "irq {}", irq);
            } else {
                assert_eq!(slot.address(), park, "irq {}", irq);
            }
        }
        assert_eq!(nvic::EXTI15_10, 40);
        assert_eq!(nvic::USART2, 38);
    }

    #[test]
    fn button_line_is_serviced_by_a_bound_vector() {
        let line = LineId::for_pin(BUTTON_PIN);
        assert_eq!(line.irqn(), Some(nvic::EXTI15_10));
        assert!(IRQ_BINDINGS.iter().any(|&(irq, _)| Some(irq) == line.irqn()));
        assert!(IRQ_BINDINGS.iter().any(|&(irq, _)| irq == nvic::USART2));
    }
}
