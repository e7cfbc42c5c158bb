//! Taskdeck - a command-line dashboard for projects, tasks and services
//!
//! The library holds everything behind the `taskdeck` binary:
//! - SQLite storage with migrations (`db`) and per-entity repositories (`repo`)
//! - Form parsing into validated drafts (`forms`) and the write actions built on them (`actions`)
//! - The list engine: search, filters, sorting, pagination and facets (`list`)
//! - The current-project register (`repo::CurrentRepo`)
//! - Dashboard aggregates (`stats`)
//! - The clap command surface and terminal rendering (`cli`)
//!
//! # Example
//!
//! ```no_run
//! use taskdeck::cli::run;
//!
//! fn main() {
//!     if let Err(e) = run() {
//!         eprintln!("Error: {}", e);
//!         std::process::exit(1);
//!     }
//! }
//! ```

pub mod actions;
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod forms;
pub mod list;
pub mod models;
pub mod repo;
pub mod stats;
pub mod utils;
