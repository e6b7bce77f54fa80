pub mod binding;
mod environment;
mod global_config;
pub mod global_user;
pub mod toml;

pub use environment::{Environment, QueryEnvironment};
pub use global_config::{get_global_config_path, get_home_dir, DEFAULT_CONFIG_FILE_NAME};
