//! Feature installer for Next.js projects.
//!
//! A project's state is a set of boolean flags inferred from files on disk.
//! Features declare which flags they require and which flag marks them as
//! installed; the installer validates against a fresh scan, then runs the
//! feature's steps in order and stops at the first failure.
//!
//! - **[`core`]**: Pure logic (catalog, validation, ordering, planning).
//! - **[`io`]**: Side effects (scanning, commands, file writes, locks, config).
//!
//! [`executor`] and [`chain`] tie the two together; [`installer`] is the
//! facade the CLI drives.

pub mod chain;
pub mod core;
pub mod executor;
pub mod exit_codes;
pub mod installer;
pub mod io;
pub mod logging;
pub mod report;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
