pub mod request_id;
pub mod timeout;

pub use request_id::{get_request_id, request_id_middleware, RequestId};
pub use timeout::timeout_middleware;
