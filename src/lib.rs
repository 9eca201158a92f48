pub mod address;
pub mod claims;
pub mod config;
pub mod error;
pub mod ledger;
pub mod utils;

pub use config::Config;
pub use error::{ClaimError, Result};
