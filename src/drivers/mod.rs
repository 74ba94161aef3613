//! Output drivers, panel buttons and hardware initialisation.

pub mod button;
pub mod hw_init;
pub mod switched;
