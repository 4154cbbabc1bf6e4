//! Architecture components that are shared by the platform crates
//! of the VexRiscv-SMP firmware.
//!
//! Everything that touches real hardware is reached through a small
//! capability: [`Bus`](mmio::Bus) for memory mapped registers and
//! [`LocalInterrupts`](registers::LocalInterrupts) for the hart local
//! interrupt enable CSR. The board code is generic over both so it can
//! be exercised on a hosted target.
#![deny(rust_2018_idioms, rustdoc::broken_intra_doc_links)]
#![cfg_attr(not(test), no_std)]

pub mod mmio;
pub mod registers;
