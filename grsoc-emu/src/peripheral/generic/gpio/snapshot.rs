//! gpio state snapshots
//!
//! a snapshot carries exactly the persistent pin state (value and
//! direction) plus a format version. fields added in later versions must
//! be `#[serde(default)]` so older snapshots keep loading.

use serde::{ Deserialize, Serialize };

use crate::peripheral;

/// version written by this build
pub const SNAPSHOT_VERSION: u32 = 1;

/// oldest version this build can restore
pub const SNAPSHOT_MIN_VERSION: u32 = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GpioSnapshot {
    pub version: u32,
    pub value: u32,
    pub dir: u32,
}

impl GpioSnapshot {
    pub fn new(value: u32, dir: u32) -> Self {
        Self { version: SNAPSHOT_VERSION, value, dir }
    }

    /// check the snapshot can be loaded into a controller whose pins
    /// occupy the bits of `mask`
    pub fn validate(&self, mask: u32) -> Result<(), peripheral::Error> {
        if !(SNAPSHOT_MIN_VERSION..=SNAPSHOT_VERSION).contains(&self.version) {
            return Err(peripheral::Error::Snapshot(format!(
                "unsupported version {} (supported {}..={})",
                self.version, SNAPSHOT_MIN_VERSION, SNAPSHOT_VERSION,
            )));
        }
        if (self.value | self.dir) & !mask != 0 {
            return Err(peripheral::Error::Snapshot(format!(
                "state {:#010x}/{:#010x} has bits outside pin mask {:#010x}",
                self.value, self.dir, mask,
            )));
        }
        Ok(())
    }
}
