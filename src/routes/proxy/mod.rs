mod handler;
mod model;

pub use handler::dispatch;
pub use model::{Action, ActionQuery, PingResponse, RateLimitInfo};
