//! Volatile cell for hardware-shared descriptor fields.

/// Volatile cell wrapper for descriptor fields
///
/// Ensures all accesses are volatile so the compiler never caches or elides
/// reads and writes the DMA engine must observe.
#[repr(transparent)]
pub(crate) struct VolatileCell<T: Copy> {
    value: core::cell::UnsafeCell<T>,
}

// SAFETY: Every access is a single volatile read or write of a `Copy` value.
// Descriptor words are `u32`, which ARMv7 reads and writes atomically.
unsafe impl<T: Copy> Sync for VolatileCell<T> {}

impl<T: Copy> VolatileCell<T> {
    /// Create a new volatile cell with the given initial value
    #[inline(always)]
    pub const fn new(value: T) -> Self {
        Self {
            value: core::cell::UnsafeCell::new(value),
        }
    }

    /// Read the value (volatile read)
    #[inline(always)]
    pub fn get(&self) -> T {
        // SAFETY: The pointer comes from our own UnsafeCell and is valid.
        unsafe { core::ptr::read_volatile(self.value.get()) }
    }

    /// Write a value (volatile write)
    #[inline(always)]
    pub fn set(&self, value: T) {
        // SAFETY: The pointer comes from our own UnsafeCell and is valid.
        unsafe { core::ptr::write_volatile(self.value.get(), value) }
    }

    /// Read-modify-write
    #[inline(always)]
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(T) -> T,
    {
        let old = self.get();
        self.set(f(old));
    }
}

impl<T: Copy + Default> Default for VolatileCell<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
