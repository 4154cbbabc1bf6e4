//! `print` macros and the `log` backend, both writing to the console UART.

use crate::uart::LitexUart;
use core::fmt::{self, Write};
use owo_colors::OwoColorize;
use riscv::mmio::Bus;
use spin::Mutex;

/// The UART type the global console is made of.
pub type ConsoleUart = LitexUart<&'static (dyn Bus + Sync)>;

static CONSOLE: Mutex<Option<ConsoleUart>> = Mutex::new(None);

/// Make `uart` the destination of all console output.
pub fn set_console(uart: ConsoleUart) {
    *CONSOLE.lock() = Some(uart);
}

/// Returns `true` if a console is attached.
pub fn has_console() -> bool {
    CONSOLE.lock().is_some()
}

/// Prints to the console UART.
#[macro_export]
macro_rules! print {
    ($($arg:tt)*) => {
        $crate::print::_print(format_args!($($arg)*))
    };
}

/// Prints to the console UART, followed by a line break.
#[macro_export]
macro_rules! println {
    () => {
        $crate::print::_print(format_args!("\n"))
    };
    ($fmt:expr) => {
        $crate::print::_print(format_args!(concat!($fmt, "\n")))
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::print::_print(format_args!(concat!($fmt, "\n"), $($arg)*))
    };
}

/// Writes to the console, or drops the output if there's no console yet.
#[doc(hidden)]
pub fn _print(args: fmt::Arguments<'_>) {
    if let Some(ref mut uart) = *CONSOLE.lock() {
        // the UART never reports a write error
        let _ = uart.write_fmt(args);
    }
}

/// The most verbose level that reaches the console.
#[cfg(any(debug_assertions, feature = "logging"))]
const MAX_LEVEL: log::LevelFilter = log::LevelFilter::Trace;
#[cfg(not(any(debug_assertions, feature = "logging")))]
const MAX_LEVEL: log::LevelFilter = log::LevelFilter::Info;

struct Logger;

impl log::Log for Logger {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        metadata.level() <= MAX_LEVEL
    }

    fn log(&self, record: &log::Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let mod_path = record
            .module_path_static()
            .or_else(|| record.module_path())
            .unwrap_or("<n/a>");

        let level = record.level();
        match level {
            log::Level::Error => println!("[ {:>5} ] [{}] {}", level.red(), mod_path, record.args()),
            log::Level::Warn => println!("[ {:>5} ] [{}] {}", level.yellow(), mod_path, record.args()),
            log::Level::Info => println!("[ {:>5} ] [{}] {}", level.cyan(), mod_path, record.args()),
            log::Level::Debug => println!("[ {:>5} ] [{}] {}", level.magenta(), mod_path, record.args()),
            log::Level::Trace => println!("[ {:>5} ] [{}] {}", level.dimmed(), mod_path, record.args()),
        }
    }

    fn flush(&self) {}
}

static LOGGER: Logger = Logger;

/// Route `log` records to the console.
///
/// Should be called once the console is up. Calling it again has no effect.
pub fn init_logging() {
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(MAX_LEVEL);
    }
}
