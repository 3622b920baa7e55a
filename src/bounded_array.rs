//! BoundedArray: fixed-range, index-addressable slots with an optional
//! release callback.
//!
//! Slot `i` lives at offset `i - low`. Indices outside `[low, high]` are a
//! caller error and panic. The array never resizes; a larger array is a new
//! array.
//!
//! Two families of mutation:
//! - `set`/`clear` overwrite a slot and hand the previous occupant to the
//!   release callback (if one is registered).
//! - `take`/`replace` move items in and out without involving the callback.
//!   Containers built on top use these to relocate items they still own.

use crate::error::ArrayError;
use core::fmt;

/// Callback that receives ownership of an item the container relinquishes.
pub type Release<T> = Box<dyn FnMut(T)>;

pub struct BoundedArray<T> {
    low: isize,
    high: isize,
    slots: Vec<Option<T>>,
    release: Option<Release<T>>,
}

impl<T> BoundedArray<T> {
    /// Create an array over `[low, high]` with every slot empty.
    pub fn new(low: isize, high: isize) -> Result<Self, ArrayError> {
        Self::create(low, high, None)
    }

    /// Like [`new`](Self::new), registering `release` for overwritten and
    /// remaining items.
    pub fn with_release<F>(low: isize, high: isize, release: F) -> Result<Self, ArrayError>
    where
        F: FnMut(T) + 'static,
    {
        Self::create(low, high, Some(Box::new(release)))
    }

    /// Create an array of `capacity` slots whose first index is `low`.
    pub fn starting_at(low: isize, capacity: usize) -> Result<Self, ArrayError> {
        let high = isize::try_from(capacity)
            .ok()
            .and_then(|c| c.checked_sub(1))
            .and_then(|span| low.checked_add(span))
            .ok_or(ArrayError::InvalidBounds {
                low,
                high: low.saturating_add_unsigned(capacity).saturating_sub(1),
            })?;
        Self::new(low, high)
    }

    /// Create an array over `[low, high]` with an optional release callback.
    /// Fails on `low > high` or if the slots cannot be allocated.
    pub fn create(
        low: isize,
        high: isize,
        release: Option<Release<T>>,
    ) -> Result<Self, ArrayError> {
        let capacity = high
            .checked_sub(low)
            .filter(|d| *d >= 0)
            .and_then(|d| usize::try_from(d).ok())
            .and_then(|d| d.checked_add(1))
            .ok_or(ArrayError::InvalidBounds { low, high })?;
        let mut slots = Vec::new();
        slots.try_reserve_exact(capacity).map_err(ArrayError::Alloc)?;
        slots.resize_with(capacity, || None);
        Ok(Self {
            low,
            high,
            slots,
            release,
        })
    }

    pub fn low(&self) -> isize {
        self.low
    }

    pub fn high(&self) -> isize {
        self.high
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    fn offset(&self, i: isize) -> usize {
        debug_assert!(
            (self.low..=self.high).contains(&i),
            "index {i} outside [{}, {}]",
            self.low,
            self.high
        );
        // Below-range indices wrap to huge offsets and fail the slice bounds check.
        i.wrapping_sub(self.low) as usize
    }

    /// Item at `i`, or `None` if the slot is empty.
    ///
    /// # Panics
    ///
    /// Panics if `i` is outside `[low, high]`.
    pub fn get(&self, i: isize) -> Option<&T> {
        self.slots[self.offset(i)].as_ref()
    }

    /// Mutable access to the item at `i`. Panics like [`get`](Self::get).
    pub fn get_mut(&mut self, i: isize) -> Option<&mut T> {
        let off = self.offset(i);
        self.slots[off].as_mut()
    }

    /// Whether slot `i` is occupied.
    pub fn has_value(&self, i: isize) -> bool {
        self.slots[self.offset(i)].is_some()
    }

    /// Store `value` at `i`. A previous occupant is released if a callback
    /// is registered, dropped otherwise. `None` clears the slot.
    pub fn set(&mut self, value: Option<T>, i: isize) {
        let off = self.offset(i);
        let old = core::mem::replace(&mut self.slots[off], value);
        if let (Some(old), Some(release)) = (old, self.release.as_mut()) {
            release(old);
        }
    }

    /// Empty slot `i`, releasing its occupant. Same as `set(None, i)`.
    pub fn clear(&mut self, i: isize) {
        self.set(None, i);
    }

    /// Move the item out of slot `i`, leaving it empty. Never releases.
    pub fn take(&mut self, i: isize) -> Option<T> {
        let off = self.offset(i);
        self.slots[off].take()
    }

    /// Move `value` into slot `i` and return the previous occupant to the
    /// caller. Never releases.
    pub fn replace(&mut self, i: isize, value: T) -> Option<T> {
        let off = self.offset(i);
        self.slots[off].replace(value)
    }

    /// Slots from `low` to `high` with their index.
    pub fn iter(&self) -> impl Iterator<Item = (isize, Option<&T>)> + '_ {
        (self.low..=self.high).zip(self.slots.iter().map(Option::as_ref))
    }

    /// Release every remaining item and free the storage.
    pub fn destroy(self) {
        drop(self);
    }

    /// Display adapter: `[ [a],  [], [c] ]`, formatting occupied slots with
    /// `fmt_item`.
    pub fn render<F>(&self, fmt_item: F) -> Rendering<'_, T, F>
    where
        F: Fn(&T, &mut fmt::Formatter<'_>) -> fmt::Result,
    {
        Rendering {
            array: self,
            fmt_item,
        }
    }

    pub fn print<F>(&self, fmt_item: F)
    where
        F: Fn(&T, &mut fmt::Formatter<'_>) -> fmt::Result,
    {
        println!("{}", self.render(fmt_item));
    }
}

impl<T> Drop for BoundedArray<T> {
    fn drop(&mut self) {
        if let Some(release) = self.release.as_mut() {
            for item in self.slots.iter_mut().filter_map(Option::take) {
                release(item);
            }
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for BoundedArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundedArray")
            .field("low", &self.low)
            .field("high", &self.high)
            .field("slots", &self.slots)
            .field("release", &self.release.is_some())
            .finish()
    }
}

pub struct Rendering<'a, T, F> {
    array: &'a BoundedArray<T>,
    fmt_item: F,
}

impl<T, F> fmt::Display for Rendering<'_, T, F>
where
    F: Fn(&T, &mut fmt::Formatter<'_>) -> fmt::Result,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let last = self.array.slots.len() - 1;
        f.write_str("[ ")?;
        for (n, slot) in self.array.slots.iter().enumerate() {
            match slot {
                Some(item) => {
                    f.write_str("[")?;
                    (self.fmt_item)(item, f)?;
                    f.write_str("]")?;
                }
                None => f.write_str(" []")?,
            }
            if n < last {
                f.write_str(", ")?;
            }
        }
        f.write_str(" ]")
    }
}
