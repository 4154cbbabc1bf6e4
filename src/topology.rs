//! The fixed hardware layout of the LiteX VexRiscv-SMP SoC.
//!
//! The layout is validated while compiling, so a board with overlapping or
//! misaligned devices never produces a firmware image.

use crate::aclint;
use core::fmt;
use displaydoc_lite::displaydoc;

/// The number of harts in the core complex.
pub const VEX_HART_COUNT: usize = 8;
/// Base address of the CLINT compatible ACLINT block.
pub const VEX_CLINT_ADDR: usize = 0xF001_0000;
/// Frequency of the `mtime` counter in Hz.
pub const VEX_MTIMER_FREQ: u64 = 1_000_000;
/// Base address of the MSWI part of the CLINT.
pub const VEX_MSWI_ADDR: usize = VEX_CLINT_ADDR + aclint::CLINT_MSWI_OFFSET;
/// Base address of the MTIMER part of the CLINT.
pub const VEX_MTIMER_ADDR: usize = VEX_CLINT_ADDR + aclint::CLINT_MTIMER_OFFSET;
/// Base address of the LiteX CSR bus.
pub const VEX_CSR_BASE: usize = 0xF000_0000;
/// Base address of the LiteX UART.
pub const VEX_UART_BASE: usize = VEX_CSR_BASE + 0x1000;
/// Size of the LiteX UART register block.
pub const VEX_UART_SIZE: usize = 0x100;

/// The topology of the board this firmware is built for.
pub const VEX_TOPOLOGY: Topology = Topology {
    hart_count: VEX_HART_COUNT,
    first_hartid: 0,
    ipi_base: VEX_MSWI_ADDR,
    ipi_size: aclint::MSWI_SIZE,
    timer_base: VEX_MTIMER_ADDR,
    mtime_offset: aclint::DEFAULT_MTIME_OFFSET,
    mtime_size: aclint::DEFAULT_MTIME_SIZE,
    mtimecmp_offset: aclint::DEFAULT_MTIMECMP_OFFSET,
    mtimecmp_size: aclint::DEFAULT_MTIMECMP_SIZE,
    timer_freq: VEX_MTIMER_FREQ,
    has_64bit_mmio: true,
    console_base: VEX_UART_BASE,
    console_size: VEX_UART_SIZE,
};

const _: () = assert!(
    VEX_TOPOLOGY.validate().is_ok(),
    "the VexRiscv-SMP topology is malformed"
);

/// The devices that occupy address space on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Device {
    Mswi,
    Mtimecmp,
    Mtime,
    Console,
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Device::Mswi => "MSWI",
            Device::Mtimecmp => "MTIMECMP",
            Device::Mtime => "MTIME",
            Device::Console => "console",
        })
    }
}

displaydoc! {
    /// Reasons for a [`Topology`] to be rejected.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum TopologyError {
        /// the board has no harts
        NoHarts,
        /// the board has more harts than the ACLINT can serve
        TooManyHarts,
        /// the {_0} registers are misaligned
        Misaligned(Device),
        /// the {_0} register block is too small for every hart
        TooSmall(Device),
        /// the timer frequency is zero
        ZeroFrequency,
        /// the {_0} and {_1} registers overlap
        Overlap(Device, Device),
        /// the {_0} registers wrap around the address space
        AddressOverflow(Device),
    }
}

/// Hart count, device addresses and timer frequency of a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Topology {
    pub hart_count: usize,
    /// The id of the hart that owns the first slot of every per-hart
    /// register array.
    pub first_hartid: usize,
    pub ipi_base: usize,
    pub ipi_size: usize,
    pub timer_base: usize,
    pub mtime_offset: usize,
    pub mtime_size: usize,
    pub mtimecmp_offset: usize,
    pub mtimecmp_size: usize,
    /// Frequency of the `mtime` counter in Hz.
    pub timer_freq: u64,
    /// Whether the bus supports single 64-bit accesses to the timer.
    pub has_64bit_mmio: bool,
    pub console_base: usize,
    pub console_size: usize,
}

impl Topology {
    /// Address of the shared `mtime` register.
    pub const fn mtime_addr(&self) -> usize {
        self.timer_base + self.mtime_offset
    }

    /// Address of the first hart's `mtimecmp` register.
    pub const fn mtimecmp_addr(&self) -> usize {
        self.timer_base + self.mtimecmp_offset
    }

    /// The address space every device occupies, as `(device, start, size)`.
    pub const fn regions(&self) -> [(Device, usize, usize); 4] {
        [
            (Device::Mswi, self.ipi_base, self.ipi_size),
            (Device::Mtimecmp, self.mtimecmp_addr(), self.mtimecmp_size),
            (Device::Mtime, self.mtime_addr(), self.mtime_size),
            (Device::Console, self.console_base, self.console_size),
        ]
    }

    /// Checks that every device is placed plausibly and that no two devices
    /// share an address.
    pub const fn validate(&self) -> Result<(), TopologyError> {
        if self.hart_count == 0 {
            return Err(TopologyError::NoHarts);
        }
        if self.hart_count > aclint::MAX_HARTS {
            return Err(TopologyError::TooManyHarts);
        }

        if self.ipi_base % aclint::MSWI_ALIGN != 0 {
            return Err(TopologyError::Misaligned(Device::Mswi));
        }
        if self.ipi_size < self.hart_count * aclint::MSIP_SIZE {
            return Err(TopologyError::TooSmall(Device::Mswi));
        }

        if self.timer_base.checked_add(self.mtimecmp_offset).is_none()
            || self.timer_base.checked_add(self.mtime_offset).is_none()
        {
            return Err(TopologyError::AddressOverflow(Device::Mtime));
        }
        if self.mtimecmp_addr() % aclint::MTIMER_ALIGN != 0 {
            return Err(TopologyError::Misaligned(Device::Mtimecmp));
        }
        if self.mtime_addr() % aclint::MTIMER_ALIGN != 0 {
            return Err(TopologyError::Misaligned(Device::Mtime));
        }
        if self.mtimecmp_size < self.hart_count * aclint::MTIMECMP_SIZE {
            return Err(TopologyError::TooSmall(Device::Mtimecmp));
        }
        if self.mtime_size < aclint::DEFAULT_MTIME_SIZE {
            return Err(TopologyError::TooSmall(Device::Mtime));
        }
        if self.timer_freq == 0 {
            return Err(TopologyError::ZeroFrequency);
        }

        if self.console_base % 4 != 0 {
            return Err(TopologyError::Misaligned(Device::Console));
        }
        if self.console_size == 0 {
            return Err(TopologyError::TooSmall(Device::Console));
        }

        let regions = self.regions();

        let mut i = 0;
        while i < regions.len() {
            let (device, start, size) = regions[i];
            if start.checked_add(size).is_none() {
                return Err(TopologyError::AddressOverflow(device));
            }
            i += 1;
        }

        let mut i = 0;
        while i < regions.len() {
            let (device, start, size) = regions[i];
            let mut j = i + 1;
            while j < regions.len() {
                let (other, other_start, other_size) = regions[j];
                if start < other_start + other_size && other_start < start + size {
                    return Err(TopologyError::Overlap(device, other));
                }
                j += 1;
            }
            i += 1;
        }

        Ok(())
    }
}
