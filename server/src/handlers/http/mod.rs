pub mod beep;
pub mod products;
pub mod routes;
pub mod utils;

pub use routes::{Router, build_api_router};
