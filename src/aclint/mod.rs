//! Adapters for the ACLINT software interrupt (MSWI) and timer (MTIMER)
//! devices.
//!
//! Both devices are split into a cold part, which is run once by the cold
//! boot hart and records the board wide configuration, and a warm part,
//! which every hart runs for its own registers only. A warm init before
//! the cold init is rejected with [`InitError::NotInitialized`].
//!
//! [`InitError::NotInitialized`]: sbi::InitError::NotInitialized

mod mswi;
mod mtimer;

pub use mswi::Mswi;
pub use mtimer::Mtimer;

/// Offset of the MSWI device inside a CLINT compatible block.
pub const CLINT_MSWI_OFFSET: usize = 0x0000;
/// Offset of the MTIMER device inside a CLINT compatible block.
pub const CLINT_MTIMER_OFFSET: usize = 0x4000;

/// The maximum number of harts a single ACLINT device can serve.
pub const MAX_HARTS: usize = 4095;

/// Required alignment of the MSWI base address.
pub const MSWI_ALIGN: usize = 0x1000;
/// The size of a full MSWI register block.
pub const MSWI_SIZE: usize = 0x4000;
/// Size of a single `msip` register.
pub const MSIP_SIZE: usize = 4;

/// Required alignment of the `mtime` and `mtimecmp` registers.
pub const MTIMER_ALIGN: usize = 0x8;
/// Size of a single `mtimecmp` register.
pub const MTIMECMP_SIZE: usize = 8;
pub const DEFAULT_MTIMECMP_OFFSET: usize = 0x0000;
pub const DEFAULT_MTIMECMP_SIZE: usize = 0x7FF8;
pub const DEFAULT_MTIME_OFFSET: usize = 0x7FF8;
pub const DEFAULT_MTIME_SIZE: usize = 0x8;

/// Returns the index of `hart_id` inside a per-hart register array that
/// starts at `first_hartid` and has `hart_count` slots.
fn slot_index(hart_id: usize, first_hartid: usize, hart_count: usize) -> Option<usize> {
    hart_id
        .checked_sub(first_hartid)
        .filter(|&idx| idx < hart_count)
}
