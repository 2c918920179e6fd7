pub mod env;
mod loader;

pub use env::{AppConfig, ModelConfig};
pub use loader::load_config;
