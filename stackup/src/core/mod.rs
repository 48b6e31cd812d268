//! Pure logic: feature catalog, validation, ordering and planning.
//!
//! Nothing in here touches the filesystem or spawns processes. Side effects
//! live in [`crate::io`] and are wired together by the executor.

pub mod artifact;
pub mod catalog;
pub mod error;
pub mod evidence;
pub mod feature;
pub mod manifest;
pub mod planner;
pub mod registry;
pub mod state;
pub mod types;
pub mod validator;
