// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Vector table entries and the core exception table.
//!
//! The table the core fetches on reset is an array of 32-bit words: the
//! initial stack pointer, the reset entry, fourteen core exception slots and
//! then one slot per vendor interrupt. Unused architecture slots must hold
//! zero. Every other slot holds either a handler bound by the board or
//! [`unhandled_interrupt`], resolved when the table is built.

use core::sync::atomic::{AtomicU32, Ordering};

use crate::support;

/// Entry point stored in a vector slot.
pub type Handler = unsafe extern "C" fn();

/// One slot of the vector table.
#[derive(Clone, Copy)]
#[repr(C)]
pub union Vector {
    handler: Handler,
    reserved: usize,
}

impl Vector {
    /// Slot the architecture or vendor leaves unused.
    pub const RESERVED: Vector = Vector { reserved: 0 };

    pub const fn handler(handler: Handler) -> Vector {
        Vector { handler }
    }

    /// Raw word stored in the slot.
    pub fn address(&self) -> usize {
        // SAFETY: both fields are one pointer-sized word, so any slot can be
        // read as an address.
        unsafe { self.reserved }
    }

    pub fn is_reserved(&self) -> bool {
        self.address() == 0
    }
}

/// What an exception or interrupt slot dispatches to.
#[derive(Clone, Copy)]
pub enum Binding {
    Bound(Handler),
    /// Park in [`unhandled_interrupt`].
    Default,
}

impl Binding {
    pub const fn resolve(self) -> Vector {
        match self {
            Binding::Bound(handler) => Vector::handler(handler),
            Binding::Default => Vector::handler(unhandled_interrupt),
        }
    }
}

/// Bindings for the configurable core exceptions.
#[derive(Clone, Copy)]
pub struct CoreExceptions {
    pub nmi: Binding,
    pub hard_fault: Binding,
    pub mem_manage: Binding,
    pub bus_fault: Binding,
    pub usage_fault: Binding,
    pub svcall: Binding,
    pub debug_monitor: Binding,
    pub pendsv: Binding,
    pub systick: Binding,
}

impl CoreExceptions {
    pub const DEFAULT: CoreExceptions = CoreExceptions {
        nmi: Binding::Default,
        hard_fault: Binding::Default,
        mem_manage: Binding::Default,
        bus_fault: Binding::Default,
        usage_fault: Binding::Default,
        svcall: Binding::Default,
        debug_monitor: Binding::Default,
        pendsv: Binding::Default,
        systick: Binding::Default,
    };
}

/// Number of architecture-defined slots, including the stack pointer.
pub const NUM_CORE_VECTORS: usize = 16;

/// Build the first sixteen slots of the vector table.
///
/// `stack_top` is not code: it is the linker symbol for the initial stack
/// pointer, declared as a function so it fits the slot type.
pub const fn exception_table(
    stack_top: Handler,
    reset: Handler,
    exceptions: &CoreExceptions,
) -> [Vector; NUM_CORE_VECTORS] {
    [
        Vector::handler(stack_top),
        Vector::handler(reset),
        exceptions.nmi.resolve(),
        exceptions.hard_fault.resolve(),
        exceptions.mem_manage.resolve(),
        exceptions.bus_fault.resolve(),
        exceptions.usage_fault.resolve(),
        Vector::RESERVED,
        Vector::RESERVED,
        Vector::RESERVED,
        Vector::RESERVED,
        exceptions.svcall.resolve(),
        exceptions.debug_monitor.resolve(),
        Vector::RESERVED,
        exceptions.pendsv.resolve(),
        exceptions.systick.resolve(),
    ]
}

/// Exception number that reached [`unhandled_interrupt`], for inspection
/// with a debugger. Zero until that happens.
pub static UNHANDLED_EXCEPTION: AtomicU32 = AtomicU32::new(0);

/// Shared default handler. Records the active exception number and parks the
/// processor.
pub unsafe extern "C" fn unhandled_interrupt() {
    UNHANDLED_EXCEPTION.store(support::active_exception(), Ordering::Relaxed);
    loop {
        support::nop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static HITS: AtomicU32 = AtomicU32::new(0);

    unsafe extern "C" fn stack_top() {
        HITS.fetch_add(1, Ordering::Relaxed);
    }
    unsafe extern "C" fn reset() {
        HITS.fetch_add(2, Ordering::Relaxed);
    }
    unsafe extern "C" fn tick() {
        HITS.fetch_add(3, Ordering::Relaxed);
    }

    const TABLE: [Vector; NUM_CORE_VECTORS] = exception_table(
        stack_top,
        reset,
        &CoreExceptions {
            systick: Binding::Bound(tick),
            ..CoreExceptions::DEFAULT
        },
    );

    #[test]
    fn fixed_slots() {
        assert_eq!(TABLE[0].address(), stack_top as usize);
        assert_eq!(TABLE[1].address(), reset as usize);
        assert_eq!(TABLE[15].address(), tick as usize);
    }

    #[test]
    fn reserved_slots_are_zero() {
        for slot in [7, 8, 9, 10, 13] {
            assert!(TABLE[slot].is_reserved(), "slot {}", slot);
        }
    }

    #[test]
    fn unbound_slots_park() {
        let park = unhandled_interrupt as usize;
        for slot in [2, 3, 4, 5, 6, 11, 12, 14] {
            assert_eq!(TABLE[slot].address(), park, "slot {}", slot);
        }
    }

    #[test]
    fn table_is_one_word_per_slot() {
        assert_eq!(
            core::mem::size_of::<[Vector; NUM_CORE_VECTORS]>(),
            NUM_CORE_VECTORS * core::mem::size_of::<usize>()
        );
    }
}
