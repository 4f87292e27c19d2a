//! memory_map module
//!
//! implements MemoryMap to route bus accesses to mapped peripherals

use ahash::AHashMap;
use byteorder::{ ByteOrder, LE };

use crate::peripheral;
use crate::peripheral::{ AccessType, Address, MappedPeripheral };

/// granularity of the address lookup table, peripheral windows must
/// start on a multiple of this
pub const MAP_GRANULE: u64 = 0x100;

/// last address covered by a window, None if the window is empty or
/// runs past the end of the address space
fn last_address(base: Address, size: u64) -> Option<Address> {
    size.checked_sub(1)
        .and_then(|extent| base.offset().checked_add(extent))
        .map(Address::from)
}

/// MemoryMap
pub struct MemoryMap {
    map: AHashMap<Address, usize>,
    peripherals: Vec<Box<dyn MappedPeripheral>>,
}

impl Default for MemoryMap {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryMap {

    pub fn new() -> Self {
        Self {
            map: AHashMap::new(),
            peripherals: Vec::new(),
        }
    }

    /// number of mapped peripherals
    pub fn len(&self) -> usize {
        self.peripherals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peripherals.is_empty()
    }

    /// add a peripheral to the memory map
    pub fn map_peripheral(
        &mut self,
        device: Box<dyn MappedPeripheral>,
    ) -> Result<(), peripheral::Error> {
        let base = device.base();
        let size = device.size() as u64;

        if !base.is_aligned(MAP_GRANULE) {
            return Err(peripheral::Error::UnalignedBase(base, MAP_GRANULE));
        }
        let last = last_address(base, size)
            .ok_or(peripheral::Error::InvalidWindow(base, size))?;

        // linear scan is fine, mapping only happens while the board is built.
        // bounds are inclusive so a window ending at the top of the address
        // space does not wrap
        for mapped in self.peripherals.iter() {
            let lbound = mapped.base();
            let ubound = last_address(lbound, mapped.size() as u64).unwrap_or(lbound);
            if base <= ubound && last >= lbound {
                return Err(peripheral::Error::MapConflict(base, lbound));
            }
        }

        log::debug!(
            "mapping {} @ [{}, {}]",
            device.name(),
            base,
            last,
        );
        self.peripherals.push(device);
        let idx = self.peripherals.len() - 1;

        // every granule the window touches points at the peripheral
        let mut alias = Some(base);
        while let Some(granule) = alias.filter(|&a| a <= last) {
            self.map.insert(granule, idx);
            alias = granule.offset().checked_add(MAP_GRANULE).map(Address::from);
        }
        Ok(())
    }

    fn lookup(&self, address: Address, access: AccessType) -> Result<usize, peripheral::Error> {
        self.map.get(&address.align_down(MAP_GRANULE))
            .copied()
            .filter(|&idx| self.peripherals[idx].contains(address))
            .ok_or(peripheral::Error::Unmapped { address, access })
    }

    /// borrow the peripheral mapped at an address
    pub fn get_peripheral_at(
        &self,
        address: impl Into<Address>,
    ) -> Result<&dyn MappedPeripheral, peripheral::Error> {
        let idx = self.lookup(address.into(), AccessType::R)?;
        Ok(self.peripherals[idx].as_ref())
    }

    pub fn read_bytes(
        &self,
        address: impl Into<Address>,
        buf: &mut [u8],
    ) -> Result<(), peripheral::Error> {
        let address = address.into();
        let idx = self.lookup(address, AccessType::R)?;
        self.peripherals[idx].read_bytes(address, buf)?;
        log::trace!("read @ {}: {:02x?}", address, buf);
        Ok(())
    }

    pub fn write_bytes(
        &mut self,
        address: impl Into<Address>,
        bytes: &[u8],
    ) -> Result<(), peripheral::Error> {
        let address = address.into();
        let idx = self.lookup(address, AccessType::W)?;
        log::trace!("write @ {}: {:02x?}", address, bytes);
        self.peripherals[idx].write_bytes(address, bytes)
    }

    /// read a little-endian word
    pub fn read_u32(&self, address: impl Into<Address>) -> Result<u32, peripheral::Error> {
        let mut buf = [0u8; 4];
        self.read_bytes(address, &mut buf)?;
        Ok(LE::read_u32(&buf))
    }

    /// write a little-endian word
    pub fn write_u32(
        &mut self,
        address: impl Into<Address>,
        value: u32,
    ) -> Result<(), peripheral::Error> {
        let mut buf = [0u8; 4];
        LE::write_u32(&mut buf, value);
        self.write_bytes(address, &buf)
    }

    /// reset every mapped peripheral
    pub fn reset(&mut self) {
        for device in self.peripherals.iter_mut() {
            device.reset();
        }
    }
}
