//! gpio register core
//!
//! holds the canonical pin state of the controller and implements the
//! IN/OUT/DIR register protocol. this layer knows nothing about lines;
//! a write reports what changed as a [`Transition`] and the caller
//! decides who to notify.

use crate::peripheral;
use crate::peripheral::GUEST_ERROR;

/// hard upper bound on pins, the registers are one 32-bit word wide
pub const MAX_PINS: u32 = 32;

/// size of the register window in bytes
pub const WINDOW_SIZE: usize = 0x100;

/// the only access width the register file accepts
pub const ACCESS_SIZE: usize = 4;

/// mask with the low `pin_count` bits set
pub fn pin_mask(pin_count: u32) -> u32 {
    if pin_count >= MAX_PINS {
        u32::MAX
    } else {
        (1u32 << pin_count) - 1
    }
}

#[inline]
pub fn bit(word: u32, pin: usize) -> bool {
    (word >> pin) & 1 != 0
}

/// gpio registers
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Register {
    /// composite pin value, read-only from the bus
    In,
    /// composite pin value, writes land on output pins only
    Out,
    /// pin directions, 1 = output
    Dir,
}

impl Register {
    pub const IN_OFFSET: u64 = 0x000;
    pub const OUT_OFFSET: u64 = 0x004;
    pub const DIR_OFFSET: u64 = 0x008;

    pub fn from_offset(offset: u64) -> Option<Self> {
        match offset {
            Self::IN_OFFSET => Some(Self::In),
            Self::OUT_OFFSET => Some(Self::Out),
            Self::DIR_OFFSET => Some(Self::Dir),
            _ => None,
        }
    }

    pub fn offset(&self) -> u64 {
        match self {
            Self::In => Self::IN_OFFSET,
            Self::Out => Self::OUT_OFFSET,
            Self::Dir => Self::DIR_OFFSET,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::In => "IN",
            Self::Out => "OUT",
            Self::Dir => "DIR",
        }
    }
}

/// the observable effect of a register write
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    /// no register bit changed
    None,
    /// the composite value changed through the OUT register
    Out { prev: u32, new: u32, dir: u32 },
    /// the direction register changed
    Dir { prev: u32, new: u32 },
}

/// pin state and register protocol
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegisterCore {
    pin_count: u32,
    value: u32,
    dir: u32,
}

impl RegisterCore {

    /// create a zeroed register core for 1..=MAX_PINS pins
    pub fn new(pin_count: u32) -> Result<Self, peripheral::Error> {
        if pin_count == 0 || pin_count > MAX_PINS {
            return Err(peripheral::Error::PinCount(pin_count, MAX_PINS));
        }
        Ok(Self {
            pin_count,
            value: 0,
            dir: 0,
        })
    }

    pub fn pin_count(&self) -> u32 {
        self.pin_count
    }

    /// bits of the registers that correspond to real pins
    pub fn mask(&self) -> u32 {
        pin_mask(self.pin_count)
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    pub fn dir(&self) -> u32 {
        self.dir
    }

    pub fn is_output(&self, pin: usize) -> bool {
        bit(self.dir, pin)
    }

    /// read the register at `offset`
    ///
    /// undefined offsets log a guest error and read as zero
    pub fn read(&self, offset: u64) -> u32 {
        match Register::from_offset(offset) {
            Some(Register::In) | Some(Register::Out) => self.value,
            Some(Register::Dir) => self.dir,
            None => {
                log::warn!(target: GUEST_ERROR, "gr_gpio: bad read offset {:#x}", offset);
                0
            }
        }
    }

    /// write the register at `offset` and report what changed
    ///
    /// undefined offsets log a guest error and leave the state untouched
    pub fn write(&mut self, offset: u64, word: u32) -> Transition {
        match Register::from_offset(offset) {
            Some(Register::In) => Transition::None,
            Some(Register::Out) => {
                let prev = self.value;
                let new = (prev & !self.dir) | (word & self.dir);
                if new == prev {
                    return Transition::None;
                }
                self.value = new;
                Transition::Out { prev, new, dir: self.dir }
            }
            Some(Register::Dir) => {
                let prev = self.dir;
                let new = word & self.mask();
                if new == prev {
                    return Transition::None;
                }
                self.dir = new;
                Transition::Dir { prev, new }
            }
            None => {
                log::warn!(
                    target: GUEST_ERROR,
                    "gr_gpio: bad write offset {:#x} (value {:#010x})",
                    offset,
                    word,
                );
                Transition::None
            }
        }
    }

    /// record an externally observed level for `pin`
    ///
    /// returns false (and changes nothing) if the pin does not exist or
    /// is currently driven as an output
    pub fn observe(&mut self, pin: usize, level: bool) -> bool {
        if pin >= self.pin_count as usize || self.is_output(pin) {
            return false;
        }
        if level {
            self.value |= 1 << pin;
        } else {
            self.value &= !(1 << pin);
        }
        true
    }

    /// every pin becomes an input, asserted low
    pub fn reset(&mut self) {
        self.value = 0;
        self.dir = 0;
    }

    /// overwrite the state wholesale, bits beyond the pin count are dropped
    pub(crate) fn load(&mut self, value: u32, dir: u32) {
        self.value = value & self.mask();
        self.dir = dir & self.mask();
    }
}
