//! API request handlers

pub mod location;
