pub mod config;
pub mod types;

pub use config::HoistConfig;
pub use types::*;
