//! Board support for the LiteX SoC with a VexRiscv-SMP core complex.
//!
//! This crate describes the board's hardware topology and implements the
//! [`sbi::Platform`] hooks that bring up the ACLINT software interrupt and
//! timer devices and the LiteX UART. The cold boot hart configures the
//! shared devices once, and every hart then enables its own interrupts.
//!
//! The runtime picks up the board through [`PLATFORM`].
#![deny(rust_2018_idioms, rustdoc::broken_intra_doc_links)]
#![cfg_attr(not(test), no_std)]

#[cfg(not(target_has_atomic = "ptr"))]
compile_error!("the VexRiscv-SMP firmware needs atomic support");

pub mod aclint;
pub mod print;
pub mod topology;
pub mod uart;

mod platform;
#[cfg(test)]
mod testing;

pub use platform::{Board, VexRiscv, PLATFORM, PLATFORM_NAME};
pub use sbi;
