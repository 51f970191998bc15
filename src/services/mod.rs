pub mod aggregate_service;
pub mod fetch_service;
pub mod refresh_service;
pub mod layout_service;
pub mod chart_service;
