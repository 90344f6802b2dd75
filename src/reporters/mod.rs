//! Output rendering
//!
//! Reporters are pure: they turn results into strings, and the CLI decides
//! where the bytes go.

pub mod json;
