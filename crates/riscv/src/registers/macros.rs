#![allow(unused)]

// The CSR is named by its assembler mnemonic so the access is encoded
// directly into the instruction. Hosted builds get stand-ins that panic,
// since there is no CSR to talk to.

macro_rules! read_csr {
    ($(#[$meta:meta])* pub $name:ident) => {
        read_csr!($name);

        /// Read the raw bits out of this CSR.
        $(#[$meta])*
        #[inline]
        pub fn read() -> usize {
            unsafe { _read() }
        }
    };

    ($name:ident) => {
        /// Read the raw bits out of a CSR.
        #[cfg(any(target_arch = "riscv32", target_arch = "riscv64"))]
        #[inline(always)]
        unsafe fn _read() -> usize {
            let bits;
            core::arch::asm!(
                concat!("csrr {}, ", stringify!($name)),
                out(reg) bits,
                options(nomem, nostack)
            );
            bits
        }

        #[cfg(not(any(target_arch = "riscv32", target_arch = "riscv64")))]
        unsafe fn _read() -> usize {
            unimplemented!(concat!("`", stringify!($name), "` can only be read on RISC-V"))
        }
    };
}

macro_rules! set_csr {
    ($(#[$meta:meta])* pub $name:ident) => {
        set_csr!($name);

        /// Set all bits specified by the mask to one inside this CSR.
        $(#[$meta])*
        #[inline]
        pub fn set(mask: usize) {
            unsafe { _set(mask) };
        }
    };

    ($name:ident) => {
        #[cfg(any(target_arch = "riscv32", target_arch = "riscv64"))]
        #[inline(always)]
        unsafe fn _set(mask: usize) {
            core::arch::asm!(
                concat!("csrs ", stringify!($name), ", {}"),
                in(reg) mask,
                options(nomem, nostack)
            );
        }

        #[cfg(not(any(target_arch = "riscv32", target_arch = "riscv64")))]
        unsafe fn _set(_mask: usize) {
            unimplemented!(concat!("`", stringify!($name), "` can only be written on RISC-V"))
        }
    };
}

macro_rules! clear_csr {
    ($(#[$meta:meta])* pub $name:ident) => {
        clear_csr!($name);

        /// Clear all bits specified by the mask inside this CSR.
        $(#[$meta])*
        #[inline]
        pub fn clear(mask: usize) {
            unsafe { _clear(mask) }
        }
    };

    ($name:ident) => {
        #[cfg(any(target_arch = "riscv32", target_arch = "riscv64"))]
        #[inline(always)]
        unsafe fn _clear(mask: usize) {
            core::arch::asm!(
                concat!("csrc ", stringify!($name), ", {}"),
                in(reg) mask,
                options(nomem, nostack)
            );
        }

        #[cfg(not(any(target_arch = "riscv32", target_arch = "riscv64")))]
        unsafe fn _clear(_mask: usize) {
            unimplemented!(concat!("`", stringify!($name), "` can only be written on RISC-V"))
        }
    };
}

macro_rules! csr_mod {
    (r, $name:ident) => {
        #[doc = concat!("The `", stringify!($name), "` CSR.")]
        pub mod $name {
            read_csr!(pub $name);
        }
    };

    (rsc, $name:ident) => {
        #[doc = concat!("The `", stringify!($name), "` CSR.")]
        pub mod $name {
            read_csr!(pub $name);
            set_csr!(pub $name);
            clear_csr!(pub $name);
        }
    };
}
