//! Platform specific hooks and the static description of a board.

use crate::{BootRole, HartBoot, InitError, InitResult};

/// Encodes a `major.minor` version pair into its raw representation.
pub const fn version(major: u16, minor: u16) -> u32 {
    ((major as u32) << 16) | minor as u32
}

bitflags::bitflags! {
    /// Optional features a platform announces to the runtime.
    pub struct Features: u32 {
        /// Misaligned load/store and access faults may be delegated
        /// to supervisor mode.
        const MFAULTS_DELEGATION = 1 << 1;
    }
}

impl Features {
    /// The features a platform has if it has no special requirements.
    pub const DEFAULT: Features = Features::MFAULTS_DELEGATION;
}

/// The hart a hook runs on and its role for this boot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootContext {
    /// The id of the executing hart.
    pub hart_id: usize,
    /// Whether the executing hart is the cold boot hart.
    pub role: BootRole,
}

impl BootContext {
    /// Create a new context for `hart_id`.
    pub fn new(hart_id: usize, role: BootRole) -> Self {
        Self { hart_id, role }
    }

    /// Returns `true` if this hart must perform the board wide setup.
    pub fn is_cold(&self) -> bool {
        self.role.is_cold()
    }
}

/// The lifecycle hooks that the runtime invokes on every hart.
///
/// The hooks are called in declaration order, exactly once per hart and
/// boot, and [`HartBoot`] is the type that enforces this. Hooks with a
/// cold boot part may rely on the runtime running the cold boot hart's
/// hook to completion before any warm hart enters the same hook.
///
/// Every hook that returns an error aborts the boot of the calling hart.
pub trait Platform {
    /// The very first hook, reserved for board quirks.
    fn early_init(&self, _ctx: BootContext) -> InitResult {
        Ok(())
    }

    /// Sets up the console device.
    ///
    /// This hook has no cold/warm split. It is run by the cold boot hart
    /// only and must never be called twice.
    fn console_init(&self) -> InitResult;

    /// Sets up the external interrupt controller.
    fn irqchip_init(&self, _ctx: BootContext) -> InitResult {
        Ok(())
    }

    /// Sets up inter-processor interrupts.
    fn ipi_init(&self, ctx: BootContext) -> InitResult;

    /// Sets up the timer.
    fn timer_init(&self, ctx: BootContext) -> InitResult;

    /// The last hook before the hart is handed to the next stage.
    fn final_init(&self, _ctx: BootContext) -> InitResult {
        Ok(())
    }
}

/// The static description of a board that is exported to the runtime.
#[derive(Debug)]
pub struct PlatformDescriptor<P: 'static> {
    /// Human readable name of the board.
    pub name: &'static str,
    /// The firmware interface version the board was built against.
    pub firmware_version: u32,
    /// The version of the board support itself.
    pub platform_version: u32,
    /// The features the board provides.
    pub features: Features,
    /// The number of harts on this board.
    pub hart_count: usize,
    /// The stack size for every hart.
    pub hart_stack_size: usize,
    /// The hooks of this board.
    pub ops: &'static P,
}

impl<P: Platform + 'static> PlatformDescriptor<P> {
    /// Prepare the boot sequence of the hart with index `hart_id`.
    ///
    /// Fails with [`InitError::UnsupportedConfiguration`] if the board
    /// has no such hart.
    pub fn hart(&self, hart_id: usize, role: BootRole) -> InitResult<HartBoot<'static, P>> {
        if hart_id >= self.hart_count {
            return Err(InitError::UnsupportedConfiguration);
        }

        Ok(HartBoot::new(self.ops, BootContext::new(hart_id, role)))
    }
}
