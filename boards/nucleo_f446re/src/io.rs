// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

use core::fmt::Write;

use kernel::debug::IoWrite;
use kernel::hil::uart::Transmit;
use kernel::platform::chip::ClockInterface;

/// Blocking writer over the console USART, used by `debug!` and on panic.
pub struct Writer<'a, T: Transmit + ?Sized> {
    console: &'a T,
}

impl<'a, T: Transmit + ?Sized> Writer<'a, T> {
    /// Writer over an already configured console.
    pub const fn new(console: &'a T) -> Self {
        Self { console }
    }

    /// Writer for a console that may never have been brought up. `None`
    /// while `clock` is gated, since an unclocked USART never reports
    /// transmit-complete and the first byte would spin forever.
    pub fn clocked(console: &'a T, clock: &dyn ClockInterface) -> Option<Self> {
        if clock.is_enabled() {
            Some(Self::new(console))
        } else {
            None
        }
    }
}

impl<T: Transmit + ?Sized> Write for Writer<'_, T> {
    fn write_str(&mut self, s: &str) -> ::core::fmt::Result {
        self.write(s.as_bytes());
        Ok(())
    }
}

impl<T: Transmit + ?Sized> IoWrite for Writer<'_, T> {
    fn write(&mut self, buf: &[u8]) -> usize {
        self.console.transmit(buf);
        buf.len()
    }
}

/// Panic handler.
///
/// Rebuilds the console and LED drivers from scratch, prints the panic
/// through the console if its clock is running and blinks the LED forever.
#[cfg(all(target_arch = "arm", target_os = "none"))]
#[panic_handler]
fn panic_fmt(info: &core::panic::PanicInfo) -> ! {
    use stm32f446re::gpio::{Mode, Pin};
    use stm32f446re::rcc::Rcc;
    use stm32f446re::usart::Usart;

    let rcc = Rcc::new();
    let console = Usart::new_usart2(&rcc);
    if let Some(mut writer) = Writer::clocked(&console, console.clock()) {
        kernel::debug::panic_print(&mut writer, info);
    }

    let led = Pin::new(crate::LED_PIN);
    led.set_mode(Mode::Output);
    kernel::debug::panic_blink_forever(&led)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    struct Console(RefCell<Vec<u8>>);

    impl Transmit for Console {
        fn transmit(&self, bytes: &[u8]) {
            self.0.borrow_mut().extend_from_slice(bytes);
        }
    }

    #[test]
    fn formatted_output_reaches_the_console() {
        let console = Console(RefCell::new(Vec::new()));
        let mut writer = Writer::new(&console);
        write!(writer, "systick: {:?}", kernel::ErrorCode::SIZE).unwrap();
        assert_eq!(*console.0.borrow(), b"systick: SIZE");
    }

    #[test]
    fn debug_lines_end_with_crlf() {
        let console = Console(RefCell::new(Vec::new()));
        let mut writer = Writer::new(&console);
        kernel::debug::write_line(&mut writer, format_args!("Initialization complete"));
        assert_eq!(*console.0.borrow(), b"Initialization complete\r\n");
    }

    struct Clock(Cell<bool>);

    impl ClockInterface for Clock {
        fn is_enabled(&self) -> bool {
            self.0.get()
        }

        fn enable(&self) {
            self.0.set(true);
        }

        fn disable(&self) {
            self.0.set(false);
        }
    }

    #[test]
    fn gated_console_gets_no_writer() {
        let console = Console(RefCell::new(Vec::new()));
        let clock = Clock(Cell::new(false));
        assert!(Writer::clocked(&console, &clock).is_none());

        clock.enable();
        let mut writer = Writer::clocked(&console, &clock).unwrap();
        writer.write(b"panicked");
        assert_eq!(*console.0.borrow(), b"panicked");
    }
}
