//! mm2csv: convert MindMeister map exports into flat CSV lists
//!
//! Layers, innermost first:
//! - [`domain`]: map model, identifiers and the hierarchy walker
//! - [`application`]: the conversion service and its errors
//! - [`infrastructure`]: zip extraction, output sinks and wiring
//! - [`cli`]: argument parsing and terminal output

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
