//! simulation module
//! 
//! the simulation module contains the time source and the signal
//! channels that connect peripherals to the rest of the board

pub mod channel;
pub mod error;
pub mod types;

pub use error::*;
pub use types::*;

/// global minimum simulation time resolution
pub const MIN_QUANT: f64 = 1e-6;
