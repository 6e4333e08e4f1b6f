//! System Definitions.
//!
//! Contém os códigos de erro e os tipos fundamentais compartilhados pelos
//! subsistemas do núcleo.

pub mod error;
pub mod types;

pub use error::{Errno, KResult};
pub use types::{CoreId, Tid};
