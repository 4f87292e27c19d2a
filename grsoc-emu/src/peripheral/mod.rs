//! peripheral module
//! 
//! defines memory-mapped peripherals and the bus that routes to them

pub mod error;
pub mod generic;
pub mod memory_map;
pub mod traits;
pub mod types;

pub use error::*;
pub use memory_map::MemoryMap;
pub use traits::*;
pub use types::*;

/// log target for diagnostics caused by guest software misbehaving
/// (bad register offsets, wrong access sizes)
pub const GUEST_ERROR: &str = "guest_error";
