//! Request middleware: CORS and the session guard.

mod cors;
mod session;

pub use cors::apply_cors;
pub use session::require_session;
