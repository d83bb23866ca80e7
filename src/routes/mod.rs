//! HTTP routes for carport

pub mod auth_routes;
pub mod cars;
pub mod health;
pub mod response;
pub mod users;

pub use auth_routes::{handle_login, handle_signup};
pub use cars::{handle_add_car, handle_list_cars};
pub use health::{health_check, readiness_check, version_info};
pub use response::{cors_preflight, error_response, ResponseBody};
pub use users::handle_list_users;
