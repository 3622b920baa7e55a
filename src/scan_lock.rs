//! Debug-only guard against re-entering a table while it runs user code.
//!
//! Tables call into caller-supplied code (comparators, `Eq`, `Hash`) in the
//! middle of a scan. A scan that re-enters the same table would observe a
//! half-finished operation, so each scan holds a [`ScanGuard`]; entering
//! again before it drops panics in debug builds. Release builds compile the
//! lock away.

#[cfg(debug_assertions)]
use core::cell::Cell;
use core::marker::PhantomData;

#[derive(Debug)]
pub(crate) struct ScanLock {
    #[cfg(debug_assertions)]
    active: Cell<Option<&'static str>>,
    // Tables are single-threaded.
    _nosend: PhantomData<*mut ()>,
}

impl ScanLock {
    pub(crate) const fn new() -> Self {
        Self {
            #[cfg(debug_assertions)]
            active: Cell::new(None),
            _nosend: PhantomData,
        }
    }

    /// Mark `op` as scanning until the returned guard drops.
    #[inline]
    pub(crate) fn enter(&self, op: &'static str) -> ScanGuard<'_> {
        #[cfg(debug_assertions)]
        {
            if let Some(outer) = self.active.replace(Some(op)) {
                panic!("reentrant `{op}` while `{outer}` is scanning the table");
            }
            ScanGuard { lock: self }
        }

        #[cfg(not(debug_assertions))]
        {
            let _ = op;
            ScanGuard { _lock: PhantomData }
        }
    }
}

impl Default for ScanLock {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) struct ScanGuard<'a> {
    #[cfg(debug_assertions)]
    lock: &'a ScanLock,
    #[cfg(not(debug_assertions))]
    _lock: PhantomData<&'a ScanLock>,
}

impl Drop for ScanGuard<'_> {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        {
            let prev = self.lock.active.take();
            debug_assert!(prev.is_some());
        }
    }
}
