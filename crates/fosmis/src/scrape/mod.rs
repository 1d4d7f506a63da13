//! Scrapers for the portal's authenticated pages.
//!
//! Each parser takes raw HTML and produces a serialisable struct; none of
//! them fail. Missing sections come back as empty fields so a page layout
//! change degrades the response instead of breaking it.

pub mod course_reg;
pub mod home;
pub mod notices;
