//! The hooks of the VexRiscv-SMP board and its descriptor.

use crate::{
    aclint::{Mswi, Mtimer},
    print,
    topology::{Topology, VEX_HART_COUNT, VEX_TOPOLOGY},
    uart::LitexUart,
};
use riscv::{
    mmio::{Bus, Volatile},
    registers::{Csr, LocalInterrupts},
};
use sbi::{BootContext, Features, InitError, InitResult, Platform, PlatformDescriptor};
use core::sync::atomic::{AtomicBool, Ordering};
use spin::Once;

/// The name the board reports to the runtime.
pub const PLATFORM_NAME: &str = "LiteX / VexRiscv-SMP";

/// The board support for a LiteX SoC with a VexRiscv-SMP core complex.
///
/// All devices are reached through `bus`, and the interrupt enable bits
/// of each hart through `local`.
pub struct VexRiscv<B: 'static, L> {
    topology: Topology,
    bus: &'static B,
    local: L,
    console_claimed: AtomicBool,
    console: Once<LitexUart<&'static B>>,
    mswi: Mswi<&'static B>,
    mtimer: Mtimer<&'static B>,
}

impl<B: 'static, L> VexRiscv<B, L> {
    /// Create the board support for `topology`.
    pub const fn new(topology: Topology, bus: &'static B, local: L) -> Self {
        Self {
            topology,
            bus,
            local,
            console_claimed: AtomicBool::new(false),
            console: Once::new(),
            mswi: Mswi::new(bus),
            mtimer: Mtimer::new(bus),
        }
    }

    /// The topology this board was created with.
    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// The interrupt enable control of the harts.
    pub fn local(&self) -> &L {
        &self.local
    }

    /// The console UART, once `console_init` succeeded.
    pub fn console(&self) -> Option<&LitexUart<&'static B>> {
        self.console.get()
    }

    /// The IPI device.
    pub fn mswi(&self) -> &Mswi<&'static B> {
        &self.mswi
    }

    /// The timer device.
    pub fn mtimer(&self) -> &Mtimer<&'static B> {
        &self.mtimer
    }
}

impl<B, L> Platform for VexRiscv<B, L>
where
    B: Bus + Sync + 'static,
    L: LocalInterrupts,
{
    fn early_init(&self, ctx: BootContext) -> InitResult {
        log::trace!("early init on hart {}", ctx.hart_id);
        Ok(())
    }

    fn console_init(&self) -> InitResult {
        let base = self.topology.console_base;

        // single shot, even if the first attempt failed
        if self.console_claimed.swap(true, Ordering::AcqRel) {
            return Err(InitError::AlreadyInitialized);
        }

        let uart = LitexUart::new(self.bus, base);
        uart.init()?;
        self.console.call_once(|| uart);

        let bus: &'static (dyn Bus + Sync) = self.bus;
        print::set_console(LitexUart::new(bus, base));
        print::init_logging();
        log::info!("console at {:#x}", base);
        Ok(())
    }

    fn irqchip_init(&self, _ctx: BootContext) -> InitResult {
        // external interrupts are not routed through a PLIC on this board
        Ok(())
    }

    fn ipi_init(&self, ctx: BootContext) -> InitResult {
        if ctx.is_cold() {
            self.mswi.cold_init(&self.topology)?;
        }
        self.mswi.warm_init(ctx.hart_id, &self.local)
    }

    fn timer_init(&self, ctx: BootContext) -> InitResult {
        if ctx.is_cold() {
            self.mtimer.cold_init(&self.topology)?;
        }
        self.mtimer.warm_init(ctx.hart_id, &self.local)
    }

    fn final_init(&self, ctx: BootContext) -> InitResult {
        log::debug!("hart {} ready", ctx.hart_id);
        Ok(())
    }
}

/// The board as it runs on real hardware.
pub type Board = VexRiscv<Volatile, Csr>;

static BUS: Volatile = unsafe { Volatile::new() };
static BOARD: Board = VexRiscv::new(VEX_TOPOLOGY, &BUS, Csr);

/// The descriptor of this board that is handed to the runtime.
pub static PLATFORM: PlatformDescriptor<Board> = PlatformDescriptor {
    name: PLATFORM_NAME,
    firmware_version: sbi::FIRMWARE_VERSION,
    platform_version: sbi::version(0, 1),
    features: Features::DEFAULT,
    hart_count: VEX_HART_COUNT,
    hart_stack_size: sbi::DEFAULT_HART_STACK_SIZE,
    ops: &BOARD,
};
