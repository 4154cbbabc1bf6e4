//! Machine-level timer with a shared `mtime` counter and one `mtimecmp`
//! comparator per hart.

use super::{slot_index, DEFAULT_MTIME_SIZE, MAX_HARTS, MTIMECMP_SIZE, MTIMER_ALIGN};
use crate::topology::Topology;
use riscv::{
    mmio::Bus,
    registers::{Interrupts, LocalInterrupts},
};
use sbi::{InitError, InitResult};
use spin::Once;

/// The board wide MTIMER configuration, recorded by the cold boot hart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Config {
    mtime_addr: usize,
    mtimecmp_addr: usize,
    first_hartid: usize,
    hart_count: usize,
    freq: u64,
    has_64bit_mmio: bool,
}

/// An ACLINT MTIMER device.
pub struct Mtimer<B> {
    bus: B,
    config: Once<Config>,
}

impl<B> Mtimer<B> {
    /// Create an adapter for an MTIMER device that is reachable through `bus`.
    pub const fn new(bus: B) -> Self {
        Self {
            bus,
            config: Once::new(),
        }
    }

    /// Returns `true` once the cold init completed.
    pub fn is_ready(&self) -> bool {
        self.config.get().is_some()
    }

    /// The frequency of the `mtime` counter in Hz, once known.
    pub fn frequency(&self) -> Option<u64> {
        self.config.get().map(|config| config.freq)
    }
}

impl<B: Bus> Mtimer<B> {
    /// Validate the timer layout of `topology` and record the comparator
    /// array and the timer frequency for all harts.
    ///
    /// Must run exactly once, before any hart runs [`Mtimer::warm_init`].
    pub fn cold_init(&self, topology: &Topology) -> InitResult {
        let hart_count = topology.hart_count;
        if hart_count == 0 || hart_count > MAX_HARTS || topology.timer_freq == 0 {
            return Err(InitError::UnsupportedConfiguration);
        }

        let mtime_addr = topology.mtime_addr();
        let mtimecmp_addr = topology.mtimecmp_addr();
        if mtime_addr % MTIMER_ALIGN != 0
            || mtimecmp_addr % MTIMER_ALIGN != 0
            || topology.mtime_size < DEFAULT_MTIME_SIZE
            || topology.mtimecmp_size < hart_count * MTIMECMP_SIZE
        {
            return Err(InitError::InvalidAddress);
        }

        let config = Config {
            mtime_addr,
            mtimecmp_addr,
            first_hartid: topology.first_hartid,
            hart_count,
            freq: topology.timer_freq,
            has_64bit_mmio: topology.has_64bit_mmio,
        };

        let mut fresh = false;
        self.config.call_once(|| {
            fresh = true;
            config
        });
        if !fresh {
            return Err(InitError::AlreadyInitialized);
        }

        log::debug!(
            "MTIMER at {:#x} running at {} Hz with {} comparators",
            config.mtimecmp_addr,
            config.freq,
            config.hart_count
        );
        Ok(())
    }

    /// Disarm the comparator of `hart_id` and enable timer interrupts on it.
    ///
    /// Only touches the `mtimecmp` register and interrupt enable bits of
    /// `hart_id`, so every hart may run this concurrently.
    pub fn warm_init<L: LocalInterrupts>(&self, hart_id: usize, local: &L) -> InitResult {
        let (config, mtimecmp) = self.mtimecmp(hart_id)?;
        self.write_cmp(config, mtimecmp, u64::MAX);
        local.enable(hart_id, Interrupts::MTI);
        Ok(())
    }

    /// The current value of the shared `mtime` counter.
    pub fn value(&self) -> InitResult<u64> {
        let config = self.config.get().ok_or(InitError::NotInitialized)?;
        Ok(self.read(config, config.mtime_addr))
    }

    /// Fire a timer interrupt on `hart_id` once `mtime` reaches `next`.
    pub fn event_start(&self, hart_id: usize, next: u64) -> InitResult {
        let (config, mtimecmp) = self.mtimecmp(hart_id)?;
        self.write_cmp(config, mtimecmp, next);
        Ok(())
    }

    /// Disarm the timer of `hart_id`.
    pub fn event_stop(&self, hart_id: usize) -> InitResult {
        self.event_start(hart_id, u64::MAX)
    }

    /// The comparator value of `hart_id`.
    pub fn comparator(&self, hart_id: usize) -> InitResult<u64> {
        let (config, mtimecmp) = self.mtimecmp(hart_id)?;
        Ok(self.read(config, mtimecmp))
    }

    fn mtimecmp(&self, hart_id: usize) -> InitResult<(&Config, usize)> {
        let config = self.config.get().ok_or(InitError::NotInitialized)?;
        let idx = slot_index(hart_id, config.first_hartid, config.hart_count)
            .ok_or(InitError::InvalidAddress)?;
        Ok((config, config.mtimecmp_addr + idx * MTIMECMP_SIZE))
    }

    fn read(&self, config: &Config, addr: usize) -> u64 {
        if config.has_64bit_mmio {
            return self.bus.read64(addr);
        }

        // the high half may change while the low half is read, so retry
        // until it is stable
        loop {
            let hi = self.bus.read32(addr + 4);
            let lo = self.bus.read32(addr);
            if hi == self.bus.read32(addr + 4) {
                return ((hi as u64) << 32) | lo as u64;
            }
        }
    }

    fn write_cmp(&self, config: &Config, addr: usize, val: u64) {
        if config.has_64bit_mmio {
            self.bus.write64(addr, val);
            return;
        }

        // keep the comparator in the future while the halves are updated
        self.bus.write32(addr, u32::MAX);
        self.bus.write32(addr + 4, (val >> 32) as u32);
        self.bus.write32(addr, val as u32);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        testing::{FakeBus, FakeHarts},
        topology::VEX_TOPOLOGY,
    };

    const MTIMECMP0: usize = 0xF001_4000;
    const MTIME: usize = 0xF001_BFF8;

    #[test]
    fn warm_before_cold_is_rejected() {
        let bus = FakeBus::new();
        let harts = FakeHarts::new();
        let mtimer = Mtimer::new(&bus);

        assert_eq!(mtimer.warm_init(0, &harts), Err(InitError::NotInitialized));
        assert_eq!(mtimer.value(), Err(InitError::NotInitialized));
        assert_eq!(mtimer.frequency(), None);
        assert!(bus.writes().is_empty());
        assert_eq!(harts.enabled(0), Interrupts::empty());
    }

    #[test]
    fn cold_init_records_frequency_once() {
        let bus = FakeBus::new();
        let mtimer = Mtimer::new(&bus);

        assert_eq!(mtimer.cold_init(&VEX_TOPOLOGY), Ok(()));
        assert_eq!(mtimer.frequency(), Some(1_000_000));
        assert_eq!(
            mtimer.cold_init(&VEX_TOPOLOGY),
            Err(InitError::AlreadyInitialized)
        );
    }

    #[test]
    fn invalid_layout_is_rejected() {
        let bus = FakeBus::new();
        let mtimer = Mtimer::new(&bus);

        let small = Topology {
            mtimecmp_size: 8 * 7,
            ..VEX_TOPOLOGY
        };
        assert_eq!(mtimer.cold_init(&small), Err(InitError::InvalidAddress));

        let stopped = Topology {
            timer_freq: 0,
            ..VEX_TOPOLOGY
        };
        assert_eq!(
            mtimer.cold_init(&stopped),
            Err(InitError::UnsupportedConfiguration)
        );
        assert!(!mtimer.is_ready());
    }

    #[test]
    fn warm_init_disarms_only_own_comparator() {
        let bus = FakeBus::new();
        let harts = FakeHarts::new();
        let mtimer = Mtimer::new(&bus);
        mtimer.cold_init(&VEX_TOPOLOGY).unwrap();

        assert_eq!(mtimer.warm_init(2, &harts), Ok(()));
        assert_eq!(mtimer.comparator(2), Ok(u64::MAX));
        assert_eq!(mtimer.comparator(1), Ok(0));
        assert_eq!(mtimer.comparator(3), Ok(0));
        assert_eq!(harts.enabled(2), Interrupts::MTI);
        assert_eq!(harts.enabled(3), Interrupts::empty());
    }

    #[test]
    fn events_program_the_comparator() {
        let bus = FakeBus::new();
        let mtimer = Mtimer::new(&bus);
        mtimer.cold_init(&VEX_TOPOLOGY).unwrap();

        bus.poke64(MTIME, 1234);
        assert_eq!(mtimer.value(), Ok(1234));

        mtimer.event_start(4, 5000).unwrap();
        assert_eq!(bus.peek64(MTIMECMP0 + 8 * 4), 5000);

        mtimer.event_stop(4).unwrap();
        assert_eq!(bus.peek64(MTIMECMP0 + 8 * 4), u64::MAX);
    }

    #[test]
    fn split_writes_without_64bit_mmio() {
        let bus = FakeBus::new();
        let mtimer = Mtimer::new(&bus);
        let topology = Topology {
            has_64bit_mmio: false,
            ..VEX_TOPOLOGY
        };
        mtimer.cold_init(&topology).unwrap();

        mtimer.event_start(1, 0x0000_0002_0000_0003).unwrap();

        let slot = MTIMECMP0 + 8;
        assert_eq!(bus.writes(), vec![slot, slot + 4, slot]);
        assert_eq!(bus.peek64(slot), 0x0000_0002_0000_0003);
        assert_eq!(mtimer.comparator(1), Ok(0x0000_0002_0000_0003));
    }
}
