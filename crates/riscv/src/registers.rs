//! Access to the machine-level CSRs the platform layer needs.

#[macro_use]
mod macros;

csr_mod!(r, mhartid);
csr_mod!(rsc, mie);

bitflags::bitflags! {
    /// Interrupt bits as laid out in the `mie` and `mip` CSRs.
    pub struct Interrupts: usize {
        /// Supervisor software interrupt.
        const SSI = 1 << 1;
        /// Machine software interrupt.
        const MSI = 1 << 3;
        /// Supervisor timer interrupt.
        const STI = 1 << 5;
        /// Machine timer interrupt.
        const MTI = 1 << 7;
        /// Supervisor external interrupt.
        const SEI = 1 << 9;
        /// Machine external interrupt.
        const MEI = 1 << 11;
    }
}

/// Control over the interrupt enable bits of a single hart.
///
/// The enable register is hart local, so an implementation must only ever
/// be asked to modify the hart identified by `hart_id` from that very hart.
pub trait LocalInterrupts {
    /// Enable delivery of the given interrupts on `hart_id`.
    fn enable(&self, hart_id: usize, irqs: Interrupts);

    /// Disable delivery of the given interrupts on `hart_id`.
    fn disable(&self, hart_id: usize, irqs: Interrupts);
}

/// [`LocalInterrupts`] backed by the real `mie` CSR of the executing hart.
#[derive(Debug, Clone, Copy, Default)]
pub struct Csr;

impl LocalInterrupts for Csr {
    fn enable(&self, hart_id: usize, irqs: Interrupts) {
        debug_assert_eq!(hart_id, mhartid::read());
        mie::set(irqs.bits());
    }

    fn disable(&self, hart_id: usize, irqs: Interrupts) {
        debug_assert_eq!(hart_id, mhartid::read());
        mie::clear(irqs.bits());
    }
}
