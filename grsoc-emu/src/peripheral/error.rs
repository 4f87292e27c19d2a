//! peripheral errors

use thiserror::Error;

use crate::peripheral::{ Address, AccessType };

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid peripheral {access} of size {size} @ {address}")]
    InvalidAccess {
        address: Address,
        size: usize,
        access: AccessType,
    },
    #[error("{access} to unmapped address {address}")]
    Unmapped {
        address: Address,
        access: AccessType,
    },
    #[error("new peripheral at {0} conflicts with peripheral at {1}")]
    MapConflict(Address, Address),
    #[error("peripheral window of size {1:#x} @ {0} does not fit the address space")]
    InvalidWindow(Address, u64),
    #[error("peripheral base {0} unaligned, expected {1:#x}-aligned")]
    UnalignedBase(Address, u64),
    #[error("pin count {0} out of range (1..={1})")]
    PinCount(u32, u32),
    #[error("pin {pin} out of range for {count}-pin controller")]
    PinOutOfRange {
        pin: usize,
        count: u32,
    },
    #[error("duplicate {0} binding for pin {1}")]
    DuplicateBinding(&'static str, usize),
    #[error("snapshot error: {0}")]
    Snapshot(String),
}
