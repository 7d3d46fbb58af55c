// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Application handlers: the user button and the serial console both toggle
//! the user LED and report it on the console. The console also echoes every
//! byte it receives.

use kernel::hil::gpio::Output;
use kernel::hil::uart::{ReceiveClient, Transmit};
use stm32f446re::exti::{ExtiClient, LineId};

/// Sent on the console after every LED toggle.
pub const TOGGLE_MESSAGE: &[u8] = b"led toggled\r\n";

/// Received byte that toggles the LED.
pub const TOGGLE_COMMAND: u8 = b't';

/// Reacts to button edges and received bytes.
pub struct App<'a, L: Output, C: Transmit> {
    led: &'a L,
    console: &'a C,
    button: LineId,
}

impl<'a, L: Output, C: Transmit> App<'a, L, C> {
    /// `button` is the EXTI line the user button is routed to.
    pub fn new(led: &'a L, console: &'a C, button: LineId) -> Self {
        Self {
            led,
            console,
            button,
        }
    }

    fn toggle_led(&self) {
        self.led.toggle();
        self.console.transmit(TOGGLE_MESSAGE);
    }
}

impl<L: Output, C: Transmit> ExtiClient for App<'_, L, C> {
    fn fired(&self, line: LineId) {
        if line == self.button {
            self.toggle_led();
        }
    }
}

impl<L: Output, C: Transmit> ReceiveClient for App<'_, L, C> {
    fn received_byte(&self, byte: u8) {
        self.console.transmit(&[byte]);
        if byte == TOGGLE_COMMAND {
            self.toggle_led();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    #[derive(Default)]
    struct Led {
        on: Cell<bool>,
        toggles: Cell<usize>,
    }

    impl Output for Led {
        fn set(&self) {
            self.on.set(true);
        }

        fn clear(&self) {
            self.on.set(false);
        }

        fn toggle(&self) -> bool {
            self.toggles.set(self.toggles.get() + 1);
            self.on.set(!self.on.get());
            self.on.get()
        }
    }

    #[derive(Default)]
    struct Console {
        sent: RefCell<Vec<u8>>,
    }

    impl Transmit for Console {
        fn transmit(&self, bytes: &[u8]) {
            self.sent.borrow_mut().extend_from_slice(bytes);
        }
    }

    #[test]
    fn button_toggles_and_reports() {
        let led = Led::default();
        let console = Console::default();
        let app = App::new(&led, &console, LineId::Exti13);

        app.fired(LineId::Exti13);
        assert!(led.on.get());
        assert_eq!(*console.sent.borrow(), TOGGLE_MESSAGE);
        assert_eq!(TOGGLE_MESSAGE.len(), 13);

        app.fired(LineId::Exti13);
        assert!(!led.on.get());
        assert_eq!(console.sent.borrow().len(), 26);
    }

    #[test]
    fn other_lines_are_ignored() {
        let led = Led::default();
        let console = Console::default();
        let app = App::new(&led, &console, LineId::Exti13);

        app.fired(LineId::Exti0);
        app.fired(LineId::Exti12);
        assert_eq!(led.toggles.get(), 0);
        assert!(console.sent.borrow().is_empty());
    }

    #[test]
    fn received_bytes_are_echoed() {
        let led = Led::default();
        let console = Console::default();
        let app = App::new(&led, &console, LineId::Exti13);

        for &byte in b"hi\r" {
            app.received_byte(byte);
        }
        assert_eq!(*console.sent.borrow(), b"hi\r");
        assert_eq!(led.toggles.get(), 0);
    }

    #[test]
    fn toggle_command_is_echoed_then_reported() {
        let led = Led::default();
        let console = Console::default();
        let app = App::new(&led, &console, LineId::Exti13);

        app.received_byte(b't');
        assert_eq!(led.toggles.get(), 1);
        assert_eq!(*console.sent.borrow(), b"tled toggled\r\n");

        // Only lowercase 't' toggles.
        app.received_byte(b'T');
        assert_eq!(led.toggles.get(), 1);
    }
}
