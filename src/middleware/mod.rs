mod cors;
mod error_handler;
mod rate_limit;

pub use cors::cors;
pub use error_handler::log_errors;
pub use rate_limit::{ClientId, UNKNOWN_CLIENT, client_identifier, rate_limit};
