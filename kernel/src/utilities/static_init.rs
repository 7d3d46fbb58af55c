// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Support for statically initializing objects in memory.

/// Allocates a statically-sized global region of memory for a data structure,
/// initializes it with `$e` and returns a `&'static mut` reference to it.
///
/// Because this instantiates a static object, you generally cannot pass a type
/// with generic parameters that are not known at the call site.
///
/// # Safety
///
/// As this macro writes directly to a global area without acquiring a lock,
/// calling it is inherently unsafe. The code containing a given expansion must
/// run at most once, otherwise the first value is overwritten without running
/// its destructor.
#[macro_export]
macro_rules! static_init {
    ($T:ty, $e:expr $(,)?) => {{
        let buf = $crate::static_buf!($T);
        buf.write($e)
    }};
}

/// Allocates a statically-sized global region of memory for a data structure
/// but does not initialize it.
///
/// Returns a `&'static mut MaybeUninit<$T>`.
#[macro_export]
macro_rules! static_buf {
    ($T:ty $(,)?) => {{
        static mut BUF: core::mem::MaybeUninit<$T> = core::mem::MaybeUninit::uninit();
        &mut *core::ptr::addr_of_mut!(BUF)
    }};
}
