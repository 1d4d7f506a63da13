//! HTTP endpoint handlers.

pub mod auth;
pub mod course_reg;
pub mod home;
pub mod notices;
pub mod results;
pub mod status;
