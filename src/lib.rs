//! Installer for the `mycli` command-line tool.
//!
//! Downloads a pre-built release binary (or builds one from source),
//! verifies that it runs, places it in the first writable directory of a
//! fixed preference list, and adds that directory to the user's shell
//! profile exactly once.
//!
//! The public API is organised into four layers:
//!
//! - **[`config`]**: installer settings with TOML overrides
//! - **[`resources`]**: idempotent `check + apply` primitives (file mode, profile line)
//! - **[`installer`]**: the ordered install procedure behind injectable seams
//! - **[`commands`]**: the CLI boundary wiring real seams into the procedure
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod environment;
pub mod error;
pub mod exec;
pub mod fetch;
pub mod installer;
pub mod logging;
pub mod platform;
pub mod resources;
pub mod tool;
