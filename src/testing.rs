//! Fake hardware for the unit tests.

use riscv::{
    mmio::Bus,
    registers::{Interrupts, LocalInterrupts},
};
use std::{collections::HashMap, sync::Mutex};

/// A sparse memory bus that remembers every register write.
///
/// Memory is stored in 32-bit words, so 64-bit accesses are visible to
/// 32-bit reads of both halves and the other way around. Registers that
/// were never written read as zero.
#[derive(Default)]
pub struct FakeBus {
    words: Mutex<HashMap<usize, u32>>,
    stuck: Mutex<HashMap<usize, u32>>,
    writes: Mutex<Vec<usize>>,
}

impl FakeBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the register at `addr` ignore writes and always read `val`.
    pub fn stick(&self, addr: usize, val: u32) {
        self.stuck.lock().unwrap().insert(addr, val);
    }

    /// Addresses of all writes, in order.
    pub fn writes(&self) -> Vec<usize> {
        self.writes.lock().unwrap().clone()
    }

    pub fn poke32(&self, addr: usize, val: u32) {
        self.words.lock().unwrap().insert(addr, val);
    }

    pub fn poke64(&self, addr: usize, val: u64) {
        self.poke32(addr, val as u32);
        self.poke32(addr + 4, (val >> 32) as u32);
    }

    pub fn peek32(&self, addr: usize) -> u32 {
        if let Some(&val) = self.stuck.lock().unwrap().get(&addr) {
            return val;
        }
        self.words.lock().unwrap().get(&addr).copied().unwrap_or(0)
    }

    pub fn peek64(&self, addr: usize) -> u64 {
        ((self.peek32(addr + 4) as u64) << 32) | self.peek32(addr) as u64
    }

    fn store(&self, addr: usize, val: u32) {
        if !self.stuck.lock().unwrap().contains_key(&addr) {
            self.poke32(addr, val);
        }
    }
}

impl Bus for FakeBus {
    fn read32(&self, addr: usize) -> u32 {
        self.peek32(addr)
    }

    fn write32(&self, addr: usize, val: u32) {
        self.writes.lock().unwrap().push(addr);
        self.store(addr, val);
    }

    fn read64(&self, addr: usize) -> u64 {
        self.peek64(addr)
    }

    fn write64(&self, addr: usize, val: u64) {
        self.writes.lock().unwrap().push(addr);
        self.store(addr, val as u32);
        self.store(addr + 4, (val >> 32) as u32);
    }
}

/// Interrupt enable bits of every hart.
#[derive(Default)]
pub struct FakeHarts {
    enabled: Mutex<HashMap<usize, Interrupts>>,
}

impl FakeHarts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enabled(&self, hart_id: usize) -> Interrupts {
        self.enabled
            .lock()
            .unwrap()
            .get(&hart_id)
            .copied()
            .unwrap_or_else(Interrupts::empty)
    }
}

impl LocalInterrupts for FakeHarts {
    fn enable(&self, hart_id: usize, irqs: Interrupts) {
        *self
            .enabled
            .lock()
            .unwrap()
            .entry(hart_id)
            .or_insert_with(Interrupts::empty) |= irqs;
    }

    fn disable(&self, hart_id: usize, irqs: Interrupts) {
        if let Some(bits) = self.enabled.lock().unwrap().get_mut(&hart_id) {
            bits.remove(irqs);
        }
    }
}
