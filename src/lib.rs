pub mod app;
pub mod calendar;
pub mod config;
pub mod errors;
pub mod fetch;
pub mod filter;
pub mod handlers;
pub mod models;
pub mod state;
pub mod summary;
pub mod ui;
pub mod view;

pub use app::router;
pub use config::Config;
pub use fetch::{refresh, set_auto_refresh, LeadsClient};
pub use state::AppState;
