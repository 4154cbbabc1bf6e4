//! The per-hart boot sequence.

use crate::{BootContext, InitError, InitResult, Platform};

/// One of the lifecycle hooks of a [`Platform`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hook {
    /// `early_init`, before any device is touched.
    Early,
    /// `console_init`, only run by the cold boot hart.
    Console,
    /// `irqchip_init`.
    Irqchip,
    /// `ipi_init`, sets up the software interrupt device.
    Ipi,
    /// `timer_init`, sets up the machine timer.
    Timer,
    /// `final_init`, the last hook of a hart.
    Final,
}

impl Hook {
    /// The name of this hook, as it appears in log messages.
    pub fn name(self) -> &'static str {
        match self {
            Hook::Early => "early_init",
            Hook::Console => "console_init",
            Hook::Irqchip => "irqchip_init",
            Hook::Ipi => "ipi_init",
            Hook::Timer => "timer_init",
            Hook::Final => "final_init",
        }
    }

    /// The stage a hart is in after this hook completed.
    pub fn done(self) -> BootStage {
        match self {
            Hook::Early => BootStage::EarlyDone,
            Hook::Console => BootStage::ConsoleDone,
            Hook::Irqchip => BootStage::IrqchipDone,
            Hook::Ipi => BootStage::IpiDone,
            Hook::Timer => BootStage::TimerDone,
            Hook::Final => BootStage::FinalDone,
        }
    }
}

/// How far a single hart got through the boot sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BootStage {
    /// No hook ran yet.
    NotStarted,
    /// `early_init` succeeded.
    EarlyDone,
    /// `console_init` succeeded, or was skipped on a warm hart.
    ConsoleDone,
    /// `irqchip_init` succeeded.
    IrqchipDone,
    /// `ipi_init` succeeded.
    IpiDone,
    /// `timer_init` succeeded.
    TimerDone,
    /// Every hook succeeded; stepping further does nothing.
    FinalDone,
}

impl BootStage {
    /// The hook that has to run next, or `None` if the sequence is complete.
    pub fn next_hook(self) -> Option<Hook> {
        match self {
            BootStage::NotStarted => Some(Hook::Early),
            BootStage::EarlyDone => Some(Hook::Console),
            BootStage::ConsoleDone => Some(Hook::Irqchip),
            BootStage::IrqchipDone => Some(Hook::Ipi),
            BootStage::IpiDone => Some(Hook::Timer),
            BootStage::TimerDone => Some(Hook::Final),
            BootStage::FinalDone => None,
        }
    }
}

/// Drives a single hart through the hooks of a [`Platform`].
///
/// The hooks run strictly in order and each one at most once. The first
/// error stops the sequence for good: it is returned unchanged by the
/// failing step and by every step after it, and no further hook is called.
#[derive(Debug)]
pub struct HartBoot<'p, P: ?Sized> {
    platform: &'p P,
    ctx: BootContext,
    stage: BootStage,
    failure: Option<InitError>,
}

impl<'p, P: Platform + ?Sized> HartBoot<'p, P> {
    /// Create the boot sequence for the hart described by `ctx`.
    pub fn new(platform: &'p P, ctx: BootContext) -> Self {
        Self {
            platform,
            ctx,
            stage: BootStage::NotStarted,
            failure: None,
        }
    }

    /// The hart and role this sequence runs for.
    pub fn context(&self) -> BootContext {
        self.ctx
    }

    /// The last stage that completed successfully.
    pub fn stage(&self) -> BootStage {
        self.stage
    }

    /// The error that aborted this sequence, if any.
    pub fn failure(&self) -> Option<InitError> {
        self.failure
    }

    /// Run the next hook and return the reached stage.
    ///
    /// Once [`BootStage::FinalDone`] is reached, this is a no-op.
    pub fn step(&mut self) -> InitResult<BootStage> {
        if let Some(err) = self.failure {
            return Err(err);
        }

        let hook = match self.stage.next_hook() {
            Some(hook) => hook,
            None => return Ok(self.stage),
        };

        match self.invoke(hook) {
            Ok(()) => {
                self.stage = hook.done();
                Ok(self.stage)
            }
            Err(err) => {
                log::error!(
                    "{} failed on hart {}: {} ({})",
                    hook.name(),
                    self.ctx.hart_id,
                    err,
                    err.code()
                );
                self.failure = Some(err);
                Err(err)
            }
        }
    }

    /// Run all remaining hooks.
    pub fn run(&mut self) -> InitResult {
        while self.stage != BootStage::FinalDone {
            self.step()?;
        }
        Ok(())
    }

    fn invoke(&self, hook: Hook) -> InitResult {
        log::trace!("hart {}: {} ({:?})", self.ctx.hart_id, hook.name(), self.ctx.role);

        let platform = self.platform;
        match hook {
            Hook::Early => platform.early_init(self.ctx),
            // console setup is single-shot, so only the cold boot hart runs it
            Hook::Console if self.ctx.is_cold() => platform.console_init(),
            Hook::Console => Ok(()),
            Hook::Irqchip => platform.irqchip_init(self.ctx),
            Hook::Ipi => platform.ipi_init(self.ctx),
            Hook::Timer => platform.timer_init(self.ctx),
            Hook::Final => platform.final_init(self.ctx),
        }
    }
}
