//! FFI surface of the to-do core for the mobile UI.

pub mod api;
