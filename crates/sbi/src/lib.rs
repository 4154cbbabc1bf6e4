//! The contract between an SBI firmware runtime and the board support
//! code that brings up the hardware it runs on.
//!
//! The runtime decides which hart performs the [cold boot](BootRole::Cold)
//! and releases every other hart only after the cold boot hart finished its
//! one-time setup. A board implements [`Platform`] and exports a
//! [`PlatformDescriptor`], and every hart walks through the hooks of that
//! platform using a [`HartBoot`].
#![deny(rust_2018_idioms, rustdoc::broken_intra_doc_links)]
#![cfg_attr(not(test), no_std)]

mod boot;
mod platform;

pub use boot::{BootStage, HartBoot, Hook};
pub use platform::{version, BootContext, Features, Platform, PlatformDescriptor};

use displaydoc_lite::displaydoc;

/// The major version of the firmware interface implemented by this crate.
pub const FIRMWARE_VERSION_MAJOR: u16 = 1;
/// The minor version of the firmware interface implemented by this crate.
pub const FIRMWARE_VERSION_MINOR: u16 = 0;

/// The raw representation of the firmware interface version, encoded
/// the same way as [`version`].
pub const FIRMWARE_VERSION: u32 = version(FIRMWARE_VERSION_MAJOR, FIRMWARE_VERSION_MINOR);

/// The hart stack size a board uses if it has no special requirements.
pub const DEFAULT_HART_STACK_SIZE: usize = 8192;

/// The result of any initialization hook.
pub type InitResult<T = ()> = core::result::Result<T, InitError>;

/// Whether a hart runs the one-time, board wide setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BootRole {
    /// The single hart that performs the board wide setup.
    Cold,
    /// Any hart that only sets up its own local state.
    Warm,
}

impl BootRole {
    /// Returns `true` for the cold boot hart.
    pub fn is_cold(self) -> bool {
        self == BootRole::Cold
    }
}

impl From<bool> for BootRole {
    fn from(cold_boot: bool) -> Self {
        if cold_boot {
            BootRole::Cold
        } else {
            BootRole::Warm
        }
    }
}

displaydoc! {
    /// Any error that prevents a hart from finishing its initialization.
    ///
    /// None of these errors is transient. The runtime has to abort the
    /// boot of the hart that received it.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum InitError {
        /// a device was configured with an invalid address or size
        InvalidAddress,
        /// a device did not respond
        DeviceNotResponding,
        /// the device was already initialized
        AlreadyInitialized,
        /// the configuration is not supported by the device
        UnsupportedConfiguration,
        /// the device has not been set up by the cold boot hart yet
        NotInitialized,
    }
}

impl InitError {
    /// Converts this error into the SBI error code that is reported to
    /// the runtime.
    pub fn code(&self) -> isize {
        match *self {
            InitError::DeviceNotResponding | InitError::NotInitialized => -1,
            InitError::UnsupportedConfiguration => -2,
            InitError::InvalidAddress => -5,
            InitError::AlreadyInitialized => -6,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_follow_sbi_numbering() {
        assert_eq!(InitError::InvalidAddress.code(), -5);
        assert_eq!(InitError::AlreadyInitialized.code(), -6);
        assert_eq!(InitError::UnsupportedConfiguration.code(), -2);
        assert_eq!(InitError::DeviceNotResponding.code(), -1);
        assert_eq!(InitError::NotInitialized.code(), -1);
    }

    #[test]
    fn role_from_cold_boot_flag() {
        assert_eq!(BootRole::from(true), BootRole::Cold);
        assert_eq!(BootRole::from(false), BootRole::Warm);
        assert!(BootRole::Cold.is_cold());
        assert!(!BootRole::Warm.is_cold());
    }

    #[test]
    fn errors_display_their_doc() {
        let msg = InitError::NotInitialized.to_string();
        assert!(msg.contains("not been set up by the cold boot hart"));
    }
}
