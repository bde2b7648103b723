mod api;
mod dashboard;
mod health;

pub use api::api_router;
pub use dashboard::dashboard_router;
pub use health::health_router;
