//! Closed-form control laws.

pub mod automatic;
