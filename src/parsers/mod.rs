//! Fragment classification and accessibility-label parsing.

pub mod classify;
pub mod dissect;
pub mod locale;
pub mod longlabel;
