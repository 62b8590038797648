//! Guarded HTTP calls
//!
//! Specializes the guarded executor to "issue one HTTP request": a deadline
//! races the transport, 5xx answers are turned into errors, and the result
//! flows through the command's trip policy.
//!
//! The transport runs on its own task. When the deadline wins, that task is
//! left to finish unobserved unless the executor was built with
//! [`HttpExecutor::abort_on_deadline`].

mod error;
mod executor;
mod request;
mod transport;

#[cfg(test)]
mod tests;

pub use error::{ErrorKind, HttpError, TransportError};
pub use executor::HttpExecutor;
pub use request::{HttpMethod, HttpOutcome, RequestSpec, ResponseHead, UnsupportedMethod};
pub use transport::{HttpTransport, ReqwestTransport, TransportRequest, TransportResponse};
