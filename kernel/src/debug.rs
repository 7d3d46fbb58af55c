// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Support for synchronous debug output and the panic path.
//!
//! Boards register a single [`IoWrite`] sink with [`set_debug_writer`]; the
//! `debug!` macro formats into it and terminates each message with `"\r\n"`.
//! Output issued before a writer is registered is dropped.
//!
//! ```ignore
//! debug!("Initialization complete. Entering main loop");
//! debug!("systick: reload rejected ({:?})", err);
//! ```
//!
//! Writes block until the sink has accepted every byte, so `debug!` must not
//! be used from a handler that can preempt another user of the same sink.

use core::fmt::{self, Write};
use core::panic::PanicInfo;
use core::ptr::addr_of_mut;

use crate::config::CONFIG;
use crate::hil::gpio;

/// Byte sink used by the debug and panic output paths.
pub trait IoWrite {
    /// Write every byte of `buf`, blocking until done. Returns the number of
    /// bytes written.
    fn write(&mut self, buf: &[u8]) -> usize;
}

static mut DEBUG_WRITER: Option<&'static mut dyn IoWrite> = None;

/// Register the sink used by `debug!`.
///
/// # Safety
///
/// Must be called from the main context before any interrupt that uses
/// `debug!` is enabled.
pub unsafe fn set_debug_writer(writer: &'static mut dyn IoWrite) {
    *addr_of_mut!(DEBUG_WRITER) = Some(writer);
}

/// Adapts an `IoWrite` sink to `core::fmt::Write`.
struct LineWriter<'a> {
    sink: &'a mut dyn IoWrite,
}

impl Write for LineWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.sink.write(s.as_bytes());
        Ok(())
    }
}

/// Format `args` into `sink` followed by a line terminator.
pub fn write_line(sink: &mut dyn IoWrite, args: fmt::Arguments) {
    let mut writer = LineWriter { sink };
    let _ = writer.write_fmt(args);
    let _ = writer.write_str("\r\n");
}

/// Backend of the `debug!` macro.
pub fn debug_println(args: fmt::Arguments) {
    // SAFETY: the writer is only installed during board setup and `debug!`
    // is not re-entered from interrupt context.
    let writer = unsafe { &mut *addr_of_mut!(DEBUG_WRITER) };
    if let Some(sink) = writer.as_deref_mut() {
        write_line(sink, args);
    }
}

/// Write a line to the registered debug writer.
#[macro_export]
macro_rules! debug {
    () => ({
        $crate::debug!("")
    });
    ($msg:expr $(,)?) => ({
        $crate::debug::debug_println(format_args!($msg))
    });
    ($fmt:expr, $($arg:tt)+) => ({
        $crate::debug::debug_println(format_args!($fmt, $($arg)+))
    });
}

/// Print the panic location and message on `writer`.
///
/// Nothing is printed when `debug_panics` is disabled in [`CONFIG`].
pub fn panic_print<W: Write + IoWrite>(writer: &mut W, panic_info: &PanicInfo) {
    if !CONFIG.debug_panics {
        return;
    }
    if let Some(location) = panic_info.location() {
        let _ = writer.write_fmt(format_args!(
            "\r\n\nPanic at {}:{}:\r\n\t\"",
            location.file(),
            location.line()
        ));
    } else {
        let _ = writer.write_str("\r\n\nPanic:\r\n\t\"");
    }
    let _ = writer.write_fmt(format_args!("{}", panic_info.message()));
    let _ = writer.write_str("\"\r\n");
    let _ = writer.write_fmt(format_args!(
        "\tKernel version {}\r\n",
        env!("CARGO_PKG_VERSION")
    ));
}

/// Blink `led` in a long-short pattern forever.
///
/// The delay is made of repeated pin writes so it works with interrupts
/// masked and without a running tick.
pub fn panic_blink_forever<L: gpio::Output + ?Sized>(led: &L) -> ! {
    led.clear();
    loop {
        for _ in 0..1_000_000 {
            led.set();
        }
        for _ in 0..100_000 {
            led.clear();
        }
        for _ in 0..1_000_000 {
            led.set();
        }
        for _ in 0..500_000 {
            led.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{write_line, IoWrite};

    struct Capture(Vec<u8>);

    impl IoWrite for Capture {
        fn write(&mut self, buf: &[u8]) -> usize {
            self.0.extend_from_slice(buf);
            buf.len()
        }
    }

    #[test]
    fn line_is_terminated() {
        let mut sink = Capture(Vec::new());
        write_line(&mut sink, format_args!("systick: {}", 42));
        assert_eq!(sink.0, b"systick: 42\r\n");
    }

    #[test]
    fn empty_line() {
        let mut sink = Capture(Vec::new());
        write_line(&mut sink, format_args!(""));
        assert_eq!(sink.0, b"\r\n");
    }
}
