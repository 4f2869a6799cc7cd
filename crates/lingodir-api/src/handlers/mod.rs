//! HTTP handlers for lingodir-api.

pub mod companies;
pub mod system;
pub mod tags;
