pub mod error;
pub mod logging;

pub use error::{attach_request_id_middleware, get_request_id_from_headers, ErrorResponse};
pub use logging::request_logging_middleware;
