//! Application layer: panel services and background monitors

pub mod services;
