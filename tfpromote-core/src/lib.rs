//! tfpromote core library — environment names, registry, errors.
//!
//! Public API surface:
//! - [`types`] — newtypes and domain enums
//! - [`error`] — [`RegistryError`]
//! - [`registry`] — the ordered environment [`Registry`]

pub mod error;
pub mod registry;
pub mod types;

pub use error::RegistryError;
pub use registry::{Registry, DEFAULT_ENVIRONMENTS};
pub use types::{EnvName, FileCategory};
