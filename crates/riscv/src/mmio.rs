//! Memory mapped register access.

use core::ptr;

/// A physical bus that memory mapped registers are accessed through.
///
/// All accesses take `&self`, because device registers are shared by
/// every hart and the bus itself carries no state.
pub trait Bus {
    /// Read a 32-bit register at `addr`.
    fn read32(&self, addr: usize) -> u32;

    /// Write a 32-bit register at `addr`.
    fn write32(&self, addr: usize, val: u32);

    /// Read a 64-bit register at `addr` using a single access.
    fn read64(&self, addr: usize) -> u64;

    /// Write a 64-bit register at `addr` using a single access.
    fn write64(&self, addr: usize, val: u64);
}

/// The real memory bus, accessed using volatile loads and stores.
#[derive(Debug)]
pub struct Volatile {
    _priv: (),
}

impl Volatile {
    /// Create a handle to the memory bus.
    ///
    /// # Safety
    ///
    /// Every address that is passed to this bus must belong to a memory
    /// mapped device that is present on the machine.
    pub const unsafe fn new() -> Self {
        Self { _priv: () }
    }
}

impl Bus for Volatile {
    #[inline]
    fn read32(&self, addr: usize) -> u32 {
        unsafe { ptr::read_volatile(addr as *const u32) }
    }

    #[inline]
    fn write32(&self, addr: usize, val: u32) {
        unsafe { ptr::write_volatile(addr as *mut u32, val) }
    }

    #[inline]
    fn read64(&self, addr: usize) -> u64 {
        unsafe { ptr::read_volatile(addr as *const u64) }
    }

    #[inline]
    fn write64(&self, addr: usize, val: u64) {
        unsafe { ptr::write_volatile(addr as *mut u64, val) }
    }
}

impl<B: Bus + ?Sized> Bus for &B {
    fn read32(&self, addr: usize) -> u32 {
        (**self).read32(addr)
    }

    fn write32(&self, addr: usize, val: u32) {
        (**self).write32(addr, val)
    }

    fn read64(&self, addr: usize) -> u64 {
        (**self).read64(addr)
    }

    fn write64(&self, addr: usize, val: u64) {
        (**self).write64(addr, val)
    }
}
