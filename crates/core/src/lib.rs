pub mod config;
pub mod error;
pub mod presence;

pub use config::Config;
pub use error::*;
pub use presence::*;
