//! peripheral types
//! 
//! address and access descriptors shared by the bus binding
use std::fmt;
use std::ops::{ Add, AddAssign, Sub };

use bitflags::bitflags;

/// a physical bus address
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(serde::Deserialize, serde::Serialize)]
pub struct Address(u64);

impl Address {
    pub const fn new(offset: u64) -> Self {
        Self(offset)
    }

    pub fn offset(&self) -> u64 {
        self.0
    }

    /// align the address down to a power-of-two boundary
    pub fn align_down(&self, align: u64) -> Self {
        Self(self.0 & !(align - 1))
    }

    pub fn is_aligned(&self, align: u64) -> bool {
        self.0 & (align - 1) == 0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

impl From<u64> for Address {
    fn from(offset: u64) -> Self {
        Self(offset)
    }
}

impl From<Address> for u64 {
    fn from(address: Address) -> Self {
        address.0
    }
}

impl Add<u64> for Address {
    type Output = Address;

    fn add(self, rhs: u64) -> Self::Output {
        Self(self.0.wrapping_add(rhs))
    }
}

impl Add<usize> for Address {
    type Output = Address;

    fn add(self, rhs: usize) -> Self::Output {
        self + rhs as u64
    }
}

impl AddAssign<u64> for Address {
    fn add_assign(&mut self, rhs: u64) {
        self.0 = self.0.wrapping_add(rhs)
    }
}

impl Sub for Address {
    type Output = u64;

    fn sub(self, rhs: Address) -> Self::Output {
        self.0.wrapping_sub(rhs.0)
    }
}

bitflags! {
    #[derive(Clone, Copy, Hash, PartialEq, Eq, Debug)]
    pub struct AccessType: u8 {
        const R = 0b0100;    // read
        const W = 0b0010;    // write
    }
}

impl fmt::Display for AccessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match *self {
            AccessType::R => "read",
            AccessType::W => "write",
            _ => "access",
        };
        f.write_str(s)
    }
}
