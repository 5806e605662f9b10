//! Request middleware.
//!
//! Currently only request tracing; session handling is provided by
//! `actix-session` and wired in the server module.

pub mod trace;

pub use trace::Trace;
