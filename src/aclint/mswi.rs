//! Machine-level software interrupts, used to deliver IPIs.

use super::{slot_index, MAX_HARTS, MSIP_SIZE, MSWI_ALIGN};
use crate::topology::Topology;
use riscv::{
    mmio::Bus,
    registers::{Interrupts, LocalInterrupts},
};
use sbi::{InitError, InitResult};
use spin::Once;

/// The board wide MSWI configuration, recorded by the cold boot hart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Config {
    addr: usize,
    first_hartid: usize,
    hart_count: usize,
}

/// An ACLINT MSWI device with one `msip` register per hart.
pub struct Mswi<B> {
    bus: B,
    config: Once<Config>,
}

impl<B> Mswi<B> {
    /// Create an adapter for an MSWI device that is reachable through `bus`.
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
}

impl<B: Bus> Mswi<B> {
    /// Validate the MSWI layout of `topology` and record it for all harts.
    ///
    /// Must run exactly once, before any hart runs [`Mswi::warm_init`].
    pub fn cold_init(&self, topology: &Topology) -> InitResult {
        let hart_count = topology.hart_count;
        if hart_count == 0 || hart_count > MAX_HARTS {
            return Err(InitError::UnsupportedConfiguration);
        }
        if topology.ipi_base % MSWI_ALIGN != 0 || topology.ipi_size < hart_count * MSIP_SIZE {
            return Err(InitError::InvalidAddress);
        }

        let config = Config {
            addr: topology.ipi_base,
            first_hartid: topology.first_hartid,
            hart_count,
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
            "MSWI at {:#x} serving harts {}..{}",
            config.addr,
            config.first_hartid,
            config.first_hartid + config.hart_count
        );
        Ok(())
    }

    /// Clear any stale IPI of `hart_id` and enable software interrupts on it.
    ///
    /// Only touches the `msip` register and interrupt enable bits of
    /// `hart_id`, so every hart may run this concurrently.
    pub fn warm_init<L: LocalInterrupts>(&self, hart_id: usize, local: &L) -> InitResult {
        let msip = self.msip(hart_id)?;
        self.bus.write32(msip, 0);
        local.enable(hart_id, Interrupts::MSI);
        Ok(())
    }

    /// Raise a software interrupt on `hart_id`.
    pub fn send(&self, hart_id: usize) -> InitResult {
        let msip = self.msip(hart_id)?;
        self.bus.write32(msip, 1);
        Ok(())
    }

    /// Acknowledge the software interrupt of `hart_id`.
    pub fn clear(&self, hart_id: usize) -> InitResult {
        let msip = self.msip(hart_id)?;
        self.bus.write32(msip, 0);
        Ok(())
    }

    /// Returns `true` if a software interrupt is pending on `hart_id`.
    pub fn pending(&self, hart_id: usize) -> InitResult<bool> {
        let msip = self.msip(hart_id)?;
        Ok(self.bus.read32(msip) & 1 != 0)
    }

    fn msip(&self, hart_id: usize) -> InitResult<usize> {
        let config = self.config.get().ok_or(InitError::NotInitialized)?;
        let idx = slot_index(hart_id, config.first_hartid, config.hart_count)
            .ok_or(InitError::InvalidAddress)?;
        Ok(config.addr + idx * MSIP_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        testing::{FakeBus, FakeHarts},
        topology::VEX_TOPOLOGY,
    };

    const MSIP0: usize = 0xF001_0000;

    #[test]
    fn warm_before_cold_is_rejected() {
        let bus = FakeBus::new();
        let harts = FakeHarts::new();
        let mswi = Mswi::new(&bus);

        assert_eq!(mswi.warm_init(0, &harts), Err(InitError::NotInitialized));
        assert_eq!(mswi.send(1), Err(InitError::NotInitialized));
        assert!(bus.writes().is_empty());
        assert_eq!(harts.enabled(0), Interrupts::empty());
    }

    #[test]
    fn second_cold_init_is_rejected() {
        let bus = FakeBus::new();
        let mswi = Mswi::new(&bus);

        assert_eq!(mswi.cold_init(&VEX_TOPOLOGY), Ok(()));
        assert_eq!(
            mswi.cold_init(&VEX_TOPOLOGY),
            Err(InitError::AlreadyInitialized)
        );
    }

    #[test]
    fn invalid_layout_is_rejected() {
        let bus = FakeBus::new();
        let mswi = Mswi::new(&bus);

        let misaligned = Topology {
            ipi_base: MSIP0 + 0x10,
            ..VEX_TOPOLOGY
        };
        assert_eq!(mswi.cold_init(&misaligned), Err(InitError::InvalidAddress));

        let no_harts = Topology {
            hart_count: 0,
            ..VEX_TOPOLOGY
        };
        assert_eq!(
            mswi.cold_init(&no_harts),
            Err(InitError::UnsupportedConfiguration)
        );
        assert!(!mswi.is_ready());
    }

    #[test]
    fn warm_init_touches_only_own_slot() {
        let bus = FakeBus::new();
        let harts = FakeHarts::new();
        let mswi = Mswi::new(&bus);
        mswi.cold_init(&VEX_TOPOLOGY).unwrap();

        bus.poke32(MSIP0 + 4 * 5, 1);
        bus.poke32(MSIP0 + 4 * 6, 1);

        assert_eq!(mswi.warm_init(5, &harts), Ok(()));
        assert_eq!(bus.writes(), vec![MSIP0 + 4 * 5]);
        assert_eq!(bus.peek32(MSIP0 + 4 * 5), 0);
        assert_eq!(bus.peek32(MSIP0 + 4 * 6), 1);
        assert_eq!(harts.enabled(5), Interrupts::MSI);
        assert_eq!(harts.enabled(6), Interrupts::empty());
    }

    #[test]
    fn send_and_clear() {
        let bus = FakeBus::new();
        let mswi = Mswi::new(&bus);
        mswi.cold_init(&VEX_TOPOLOGY).unwrap();

        mswi.send(3).unwrap();
        assert_eq!(mswi.pending(3), Ok(true));
        assert_eq!(mswi.pending(2), Ok(false));

        mswi.clear(3).unwrap();
        assert_eq!(mswi.pending(3), Ok(false));
    }

    #[test]
    fn unknown_hart_is_rejected() {
        let bus = FakeBus::new();
        let harts = FakeHarts::new();
        let mswi = Mswi::new(&bus);
        mswi.cold_init(&VEX_TOPOLOGY).unwrap();

        assert_eq!(mswi.warm_init(8, &harts), Err(InitError::InvalidAddress));
        assert_eq!(mswi.send(100), Err(InitError::InvalidAddress));
    }
}
