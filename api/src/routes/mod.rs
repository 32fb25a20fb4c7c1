pub mod ask;
pub mod health_route;
pub mod reset_route;
pub mod upload;
