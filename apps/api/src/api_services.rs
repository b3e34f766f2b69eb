mod database;
mod key_value;
mod state_builder;
mod sweeper;

pub use database::connect_and_migrate;
pub use key_value::{KeyValueBackend, build_key_value_backend};
pub use state_builder::build_app_state;
pub use sweeper::spawn_rate_limit_sweeper;
