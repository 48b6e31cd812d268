//! Side-effecting collaborators: processes, files, locks and configuration.

pub mod command;
pub mod config;
pub mod lock;
pub mod manifest_store;
pub mod process;
pub mod scanner;
pub mod writer;
