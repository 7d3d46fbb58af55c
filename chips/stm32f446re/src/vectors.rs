// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Vendor half of the vector table.
//!
//! Boards list the interrupts they service and [`peripheral_table`] fills in
//! the rest: reserved holes become zero words and every other slot parks in
//! [`unhandled_interrupt`]. The table is built in a `const` context, so a
//! binding to a reserved, out-of-range or already bound interrupt stops the
//! build.

use cortexm4::vectors::{unhandled_interrupt, Handler, Vector};

use crate::nvic::{is_reserved, NUM_IRQS};

pub const fn peripheral_table(bindings: &[(u32, Handler)]) -> [Vector; NUM_IRQS] {
    let mut table = [Vector::handler(unhandled_interrupt); NUM_IRQS];
    let mut bound = [false; NUM_IRQS];

    let mut irq = 0;
    while irq < NUM_IRQS {
        if is_reserved(irq as u32) {
            table[irq] = Vector::RESERVED;
        }
        irq += 1;
    }

    let mut i = 0;
    while i < bindings.len() {
        let (irq, handler) = bindings[i];
        let slot = irq as usize;
        if slot >= NUM_IRQS {
            panic!("interrupt number out of range");
        }
        if is_reserved(irq) {
            panic!("interrupt slot is reserved");
        }
        if bound[slot] {
            panic!("interrupt bound twice");
        }
        bound[slot] = true;
        table[slot] = Vector::handler(handler);
        i += 1;
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nvic;

    unsafe extern "C" fn button() {}
    unsafe extern "C" fn console() {}

    const IRQS: [Vector; NUM_IRQS] = peripheral_table(&[
        (nvic::EXTI15_10, button),
        (nvic::USART2, console),
    ]);

    #[test]
    fn bound_slots() {
        assert_eq!(IRQS[40].address(), button as usize);
        assert_eq!(IRQS[38].address(), console as usize);
    }

    #[test]
    fn holes_are_zero_and_the_rest_park() {
        let park = unhandled_interrupt as usize;
        for (irq, slot) in IRQS.iter().enumerate() {
            if nvic::RESERVED.contains(&(irq as u32)) {
                assert!(slot.is_reserved(), "irq {}", irq);
            } else if irq != 38 && irq != 40 {
                assert_eq!(slot.address(), park, "irq {}", irq);
            }
        }
        assert_eq!(IRQS.iter().filter(|slot| slot.is_reserved()).count(), 11);
    }

    #[test]
    #[should_panic(expected = "reserved")]
    fn reserved_binding_is_rejected() {
        peripheral_table(&[(61, button)]);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn out_of_range_binding_is_rejected() {
        peripheral_table(&[(97, button)]);
    }

    #[test]
    #[should_panic(expected = "twice")]
    fn duplicate_binding_is_rejected() {
        peripheral_table(&[(nvic::USART2, console), (nvic::USART2, button)]);
    }
}
