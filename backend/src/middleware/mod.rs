//! Request middleware.

pub mod envelope;

pub use envelope::{Envelope, RequestId};
