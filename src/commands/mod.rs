//! Command handlers at the CLI boundary, where typed errors become
//! [`anyhow::Error`].
pub mod install;
