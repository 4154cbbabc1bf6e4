//! Driver for the LiteX UART, the console of the board.

use core::fmt;
use riscv::mmio::Bus;
use sbi::{InitError, InitResult};

mod registers {
    /// Transmit/receive data.
    pub const RXTX: usize = 0x00;
    /// Reads non-zero while the transmit FIFO is full.
    pub const TXFULL: usize = 0x04;
    /// Reads non-zero while the receive FIFO is empty.
    pub const RXEMPTY: usize = 0x08;
    pub const EV_STATUS: usize = 0x0C;
    pub const EV_PENDING: usize = 0x10;
    pub const EV_ENABLE: usize = 0x14;
}

bitflags::bitflags! {
    /// Bits of the UART event registers.
    pub struct Events: u32 {
        const TX = 1 << 0;
        const RX = 1 << 1;
    }
}

/// A LiteX UART, accessed through `bus` at `base`.
pub struct LitexUart<B> {
    bus: B,
    base: usize,
}

impl<B> LitexUart<B> {
    /// Create a driver for the UART at `base`.
    pub const fn new(bus: B, base: usize) -> Self {
        Self { bus, base }
    }

    /// The base address of this UART.
    pub fn base(&self) -> usize {
        self.base
    }
}

impl<B: Bus> LitexUart<B> {
    /// Prepares the UART for polled operation by masking all its events.
    ///
    /// Fails with [`InitError::DeviceNotResponding`] if the event mask
    /// does not read back as written.
    pub fn init(&self) -> InitResult {
        self.write(registers::EV_ENABLE, 0);
        if Events::from_bits_truncate(self.read(registers::EV_ENABLE)) != Events::empty() {
            return Err(InitError::DeviceNotResponding);
        }
        Ok(())
    }

    /// Spins until there's room in the transmit FIFO and sends `x`.
    pub fn putc(&self, x: u8) {
        while self.read(registers::TXFULL) != 0 {
            core::hint::spin_loop();
        }
        self.write(registers::RXTX, x as u32);
    }

    /// Tries to read incoming data, but will return `None`
    /// if there's no data available.
    pub fn getc(&self) -> Option<u8> {
        if self.read(registers::RXEMPTY) != 0 {
            return None;
        }

        let x = self.read(registers::RXTX) as u8;
        self.write(registers::EV_PENDING, Events::RX.bits());
        Some(x)
    }

    /// The events that are currently raised by the UART.
    pub fn status(&self) -> Events {
        Events::from_bits_truncate(self.read(registers::EV_STATUS))
    }

    fn read(&self, reg: usize) -> u32 {
        self.bus.read32(self.base + reg)
    }

    fn write(&self, reg: usize, val: u32) {
        self.bus.write32(self.base + reg, val)
    }
}

impl<B: Bus> fmt::Write for LitexUart<B> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for x in s.bytes() {
            if x == b'\n' {
                self.putc(b'\r');
            }
            self.putc(x);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeBus;
    use core::fmt::Write;

    const BASE: usize = 0xF000_1000;

    #[test]
    fn init_masks_events() {
        let bus = FakeBus::new();
        bus.poke32(BASE + registers::EV_ENABLE, 0b11);

        let uart = LitexUart::new(&bus, BASE);
        assert_eq!(uart.init(), Ok(()));
        assert_eq!(bus.peek32(BASE + registers::EV_ENABLE), 0);
    }

    #[test]
    fn init_fails_on_a_dead_device() {
        let bus = FakeBus::new();
        bus.stick(BASE + registers::EV_ENABLE, 0xFFFF_FFFF);

        let uart = LitexUart::new(&bus, BASE);
        assert_eq!(uart.init(), Err(InitError::DeviceNotResponding));
    }

    #[test]
    fn write_translates_newlines() {
        let bus = FakeBus::new();
        let mut uart = LitexUart::new(&bus, BASE);

        write!(uart, "ok\n").unwrap();
        assert_eq!(bus.writes(), vec![BASE; 4]);
        assert_eq!(bus.peek32(BASE + registers::RXTX), b'\n' as u32);
    }

    #[test]
    fn getc_acknowledges_rx_event() {
        let bus = FakeBus::new();
        let uart = LitexUart::new(&bus, BASE);

        bus.poke32(BASE + registers::RXEMPTY, 1);
        assert_eq!(uart.getc(), None);

        bus.poke32(BASE + registers::RXEMPTY, 0);
        bus.poke32(BASE + registers::RXTX, b'x' as u32);
        assert_eq!(uart.getc(), Some(b'x'));
        assert_eq!(
            bus.peek32(BASE + registers::EV_PENDING),
            Events::RX.bits()
        );
    }
}
