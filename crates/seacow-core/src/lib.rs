//! Seacow Core: error taxonomy and process-level configuration.

pub mod config;
pub mod error;

pub use config::{env_nonempty, mask_secret, SeacowConfig};
pub use error::{Error, Result};
