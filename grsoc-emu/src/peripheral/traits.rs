//! peripheral traits
//! 
//! defines the bus-facing and line-facing traits for peripherals
use crate::peripheral;
use crate::peripheral::Address;

/// memory-mapped peripheral trait
/// 
/// peripherals expose raw bytes on read/write; decoding the bytes into
/// register words (and enforcing access width/alignment) is the
/// peripheral's responsibility, since only it knows its register file.
/// 
/// accesses arriving here are already routed to this peripheral's
/// window by the memory map, but implementations must still reject
/// addresses outside [base, base + size).
pub trait MappedPeripheral: Send {

    /// a short name used in diagnostics
    fn name(&self) -> &str;

    /// return the base address of the mapped window
    fn base(&self) -> Address;

    /// return the size of the mapped window in bytes
    fn size(&self) -> usize;

    /// read `buf.len()` bytes at the specified address
    fn read_bytes(&self, address: Address, buf: &mut [u8]) -> Result<(), peripheral::Error>;

    /// write bytes at the specified address
    fn write_bytes(&mut self, address: Address, bytes: &[u8]) -> Result<(), peripheral::Error>;

    /// device lifecycle reset
    fn reset(&mut self);

    /// true if the address falls inside the mapped window
    fn contains(&self, address: Address) -> bool {
        address >= self.base() && (address - self.base()) < self.size() as u64
    }
}

/// a consumer of a single digital line
/// 
/// lines are the peripheral's outgoing wires (output levels, direction
/// changes). a consumer is told the index of the line and its new level;
/// it runs synchronously on the thread that caused the transition and
/// must not call back into the peripheral that notified it.
pub trait LineSink: Send {
    fn set_level(&self, line: usize, level: bool);
}

impl<F> LineSink for F
where
    F: Fn(usize, bool) + Send,
{
    fn set_level(&self, line: usize, level: bool) {
        self(line, level)
    }
}

