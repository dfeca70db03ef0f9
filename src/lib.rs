//! `flagset` is a command line flag parser for Rust.
//!
//! It implements the POSIX/GNU hybrid token grammar against a single flat
//! namespace of caller-registered flags: short flag clusters (`-xy`, `-sfoo`),
//! long flags (`--flag`, `--flag=value`), the `--` terminator, and a bare `-`
//! treated as a positional placeholder. Parsed values land in shared storage
//! cells the caller reads afterward; everything the parser could not consume
//! as a flag or flag value is preserved, in order, as positional arguments.
//!
//! A few properties worth knowing up front:
//! * There is no hidden process-wide registry. Every [`FlagSet`] is an
//!   explicit, caller-constructed instance, and flag registration happens
//!   only through it.
//! * Parsing is strict. The first malformed, unknown, starved, or
//!   inconvertible flag aborts the whole parse with a typed [`ParseError`],
//!   after writing a diagnostic line and the usage block to the set's
//!   [`UserInterface`].
//! * A `FlagSet` accumulates. Repeated [`FlagSet::parse`] calls on one set
//!   append positionals and list values and never reset `is_set` state. This
//!   is intentional; construct a fresh set when you want a fresh slate.
//! * `--help` is recognized on every set without registration. It
//!   short-circuits parsing, renders usage with no error line, and surfaces
//!   as [`ParseError::HelpRequested`] so the program can exit cleanly.
//!
//! # Usage
//! ```
//! use flagset::FlagSet;
//!
//! let mut set = FlagSet::console("frobnicate [flags] <input>");
//! let verbose = set.bool("v,verbose", "Print progress information.");
//! let level = set.int("l,level", "Compression `level`.");
//!
//! set.parse(&["-v", "--level", "3", "input.txt"]).unwrap();
//!
//! assert!(*verbose.borrow());
//! assert_eq!(*level.borrow(), 3);
//! assert_eq!(set.arg(0), "input.txt");
//! assert!(set.is_set("verbose"));
//! ```
//!
//! Custom value kinds plug in through the [`Value`] trait; the parser and the
//! usage formatter only ever speak to flags through it.
//!
//! # Features
//! * `unit_test`: exports the in-memory and channel-backed [`UserInterface`]
//!   implementations (the `testing` module) for use in downstream test suites.
//! * `tracing_debug`: emits `tracing` debug events from the token scanner.
#![deny(missing_docs)]
mod api;
mod constant;
mod model;
mod parser;

pub use api::*;
pub use parser::{ConsoleInterface, ParseError, UserInterface};

#[cfg(any(test, feature = "unit_test"))]
pub use parser::util as testing;

#[cfg(test)]
#[macro_use]
extern crate assert_matches;
