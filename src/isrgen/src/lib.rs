//! Generates the x86-64 interrupt entry layer: one entry stub per vector, the common
//! save/dispatch/restore trampoline they all jump to, and the exported table of stub
//! addresses the kernel installs into its IDT.
//!
//! ```
//! let listing = isrgen::Listing::generate(&isrgen::Config::default()).unwrap();
//! let text = listing.to_string();
//!
//! assert!(text.contains("entry13:\n\tpushq $13\n\tjmp common_isr\n"));
//! ```

#![deny(clippy::semicolon_if_nothing_returned, clippy::debug_assert_with_mut_call)]
#![warn(clippy::cargo, clippy::pedantic)]
#![allow(
    clippy::cast_lossless,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::must_use_candidate
)]

#[macro_use]
extern crate log;

pub mod asm;
pub mod config;
pub mod export;
pub mod frame;
pub mod layout;
pub mod listing;
pub mod stub;
pub mod table;
pub mod trampoline;
pub mod vector;

mod error;
pub use error::*;

pub use config::Config;
pub use listing::Listing;

#[cfg(test)]
mod sim;
