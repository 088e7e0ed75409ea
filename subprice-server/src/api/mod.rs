//! HTTP API handlers for subprice-server

pub mod calculate;
pub mod data;
pub mod health;
pub mod ui;
pub mod upload;

pub use calculate::calculate_prices;
pub use data::get_data_page;
pub use health::health_routes;
pub use ui::{serve_app_js, serve_index};
pub use upload::upload_csv;
