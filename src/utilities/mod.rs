//! Shared console helpers.

pub mod printer;
