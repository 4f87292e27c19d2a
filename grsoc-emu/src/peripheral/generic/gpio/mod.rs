//! generic gpio peripheral
//!
//! a model of the GR GPIO controller: up to 32 pins behind three
//! word-wide registers (IN, OUT, DIR) in a 0x100 byte window.
//!
//! the controller is split in two layers. [`regs::RegisterCore`] owns the
//! pin state and the register protocol; [`lines::LineTable`] turns the
//! transitions reported by the core into notifications on the per-pin
//! output and direction lines. external stimulus enters through
//! [`GrGpio::set_input_level`] (or an [`InputLine`] of a [`SharedGpio`]).
//!
//! ```
//! use grsoc_emu::peripheral::generic::gpio::{ GrGpio, Register };
//!
//! let mut gpio = GrGpio::builder(0xfc08_3000u64)
//!     .output_line(0, |pin: usize, level: bool| println!("pin {pin} -> {level}"))
//!     .build()
//!     .unwrap();
//!
//! gpio.write(Register::DIR_OFFSET, 0x1);
//! gpio.write(Register::OUT_OFFSET, 0x1);
//! assert_eq!(gpio.read(Register::IN_OFFSET), 0x1);
//! ```

use byteorder::{ ByteOrder, LE };
use serde::{ Deserialize, Serialize };

use crate::peripheral;
use crate::peripheral::{ AccessType, Address, LineSink, MappedPeripheral, GUEST_ERROR };

pub mod lines;
pub mod regs;
pub mod shared;
pub mod snapshot;

pub use lines::{ LineKind, LineTable };
pub use regs::{ Register, RegisterCore, Transition, ACCESS_SIZE, MAX_PINS, WINDOW_SIZE };
pub use shared::{ InputLine, SharedGpio };
pub use snapshot::GpioSnapshot;

/// device type name, used as the default instance name
pub const TYPE_GR_GPIO: &str = "gr_soc.gpio";

/// gpio device properties
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GpioConfig {
    /// number of pins wired to the controller
    pub ngpio: u32,
}

impl Default for GpioConfig {
    fn default() -> Self {
        Self { ngpio: MAX_PINS }
    }
}

/// builds a [`GrGpio`] together with its line bindings
pub struct GrGpioBuilder {
    name: String,
    base: Address,
    config: GpioConfig,
    bindings: Vec<(LineKind, usize, Box<dyn LineSink>)>,
}

impl GrGpioBuilder {

    pub fn new(base: impl Into<Address>) -> Self {
        Self {
            name: String::from(TYPE_GR_GPIO),
            base: base.into(),
            config: GpioConfig::default(),
            bindings: Vec::new(),
        }
    }

    /// instance name used in diagnostics
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn config(mut self, config: GpioConfig) -> Self {
        self.config = config;
        self
    }

    pub fn ngpio(mut self, ngpio: u32) -> Self {
        self.config.ngpio = ngpio;
        self
    }

    /// consumer for the driven level of `pin`
    pub fn output_line(mut self, pin: usize, sink: impl LineSink + 'static) -> Self {
        self.bindings.push((LineKind::Output, pin, Box::new(sink)));
        self
    }

    /// consumer for the direction of `pin`
    pub fn direction_line(mut self, pin: usize, sink: impl LineSink + 'static) -> Self {
        self.bindings.push((LineKind::Direction, pin, Box::new(sink)));
        self
    }

    /// validate the configuration and bindings and build the controller
    pub fn build(self) -> Result<GrGpio, peripheral::Error> {
        let ngpio = self.config.ngpio;
        let core = RegisterCore::new(ngpio)?;

        let mut lines = LineTable::new(ngpio);
        for (kind, pin, sink) in self.bindings {
            if pin >= ngpio as usize {
                return Err(peripheral::Error::PinOutOfRange { pin, count: ngpio });
            }
            if lines.is_bound(kind, pin) {
                return Err(peripheral::Error::DuplicateBinding(kind.name(), pin));
            }
            lines.bind(kind, pin, sink);
        }

        log::debug!("{}: {} pins @ {}", self.name, ngpio, self.base);
        Ok(GrGpio {
            name: self.name,
            base: self.base,
            core,
            lines,
        })
    }
}

/// GR GPIO controller
#[derive(Debug)]
pub struct GrGpio {
    name: String,
    base: Address,
    core: RegisterCore,
    lines: LineTable,
}

impl GrGpio {

    pub fn builder(base: impl Into<Address>) -> GrGpioBuilder {
        GrGpioBuilder::new(base)
    }

    pub fn pin_count(&self) -> u32 {
        self.core.pin_count()
    }

    /// composite pin value
    pub fn value(&self) -> u32 {
        self.core.value()
    }

    /// pin directions, 1 = output
    pub fn dir(&self) -> u32 {
        self.core.dir()
    }

    /// read the register at `offset` within the window
    pub fn read(&self, offset: u64) -> u32 {
        let value = self.core.read(offset);
        log::trace!("{}: read {:#05x} -> {:#010x}", self.name, offset, value);
        value
    }

    /// write the register at `offset` within the window, notifying the
    /// lines of every pin the write changed
    pub fn write(&mut self, offset: u64, value: u32) {
        log::trace!("{}: write {:#05x} <- {:#010x}", self.name, offset, value);
        let transition = self.core.write(offset, value);
        self.lines.propagate(transition);
    }

    /// external stimulus on input line `pin`
    ///
    /// the level is recorded only while the pin is an input; stimulus on
    /// an output pin is discarded. returns whether the level was taken.
    /// no line notifications are raised either way.
    pub fn set_input_level(&mut self, pin: usize, level: bool) -> Result<bool, peripheral::Error> {
        if pin >= self.pin_count() as usize {
            return Err(peripheral::Error::PinOutOfRange { pin, count: self.pin_count() });
        }
        let accepted = self.core.observe(pin, level);
        log::trace!(
            "{}: input {} <- {}{}",
            self.name,
            pin,
            level as u8,
            if accepted { "" } else { " (discarded, pin is output)" },
        );
        Ok(accepted)
    }

    /// every pin becomes an input, asserted low. lines are not notified.
    pub fn reset(&mut self) {
        log::debug!("{}: reset", self.name);
        self.core.reset();
    }

    pub fn snapshot(&self) -> GpioSnapshot {
        GpioSnapshot::new(self.core.value(), self.core.dir())
    }

    /// restore state saved by [`GrGpio::snapshot`], lines are not notified
    pub fn restore(&mut self, snapshot: &GpioSnapshot) -> Result<(), peripheral::Error> {
        snapshot.validate(self.core.mask())?;
        self.core.load(snapshot.value, snapshot.dir);
        Ok(())
    }

    /// move the controller behind a lock so it can be shared between
    /// the bus and the things driving its inputs
    pub fn into_shared(self) -> SharedGpio {
        SharedGpio::new(self)
    }

    /// translate a bus access into a register offset
    ///
    /// only aligned word accesses inside the window are accepted
    fn access_offset(
        &self,
        address: Address,
        size: usize,
        access: AccessType,
    ) -> Result<u64, peripheral::Error> {
        let offset = address - self.base;
        if !self.contains(address)
            || size != ACCESS_SIZE
            || offset % ACCESS_SIZE as u64 != 0
        {
            log::warn!(
                target: GUEST_ERROR,
                "{}: invalid {} of size {} @ {}",
                self.name,
                access,
                size,
                address,
            );
            return Err(peripheral::Error::InvalidAccess { address, size, access });
        }
        Ok(offset)
    }
}

impl MappedPeripheral for GrGpio {

    fn name(&self) -> &str {
        &self.name
    }

    fn base(&self) -> Address {
        self.base
    }

    fn size(&self) -> usize {
        WINDOW_SIZE
    }

    fn read_bytes(&self, address: Address, buf: &mut [u8]) -> Result<(), peripheral::Error> {
        buf.fill(0);
        let offset = self.access_offset(address, buf.len(), AccessType::R)?;
        LE::write_u32(buf, self.read(offset));
        Ok(())
    }

    fn write_bytes(&mut self, address: Address, bytes: &[u8]) -> Result<(), peripheral::Error> {
        let offset = self.access_offset(address, bytes.len(), AccessType::W)?;
        self.write(offset, LE::read_u32(bytes));
        Ok(())
    }

    fn reset(&mut self) {
        GrGpio::reset(self)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use parking_lot::Mutex;

    use super::*;

    const BASE: u64 = 0xfc08_3000;

    #[derive(Clone, Debug, PartialEq, Eq)]
    enum Note {
        Out(usize, bool),
        Dir(usize, bool),
    }

    type Notes = Arc<Mutex<Vec<Note>>>;

    fn wired(ngpio: u32) -> (GrGpio, Notes) {
        let notes = Notes::default();
        let mut builder = GrGpio::builder(BASE).ngpio(ngpio);
        for pin in 0..ngpio as usize {
            let out = notes.clone();
            let dir = notes.clone();
            builder = builder
                .output_line(pin, move |p: usize, l: bool| out.lock().push(Note::Out(p, l)))
                .direction_line(pin, move |p: usize, l: bool| dir.lock().push(Note::Dir(p, l)));
        }
        (builder.build().unwrap(), notes)
    }

    #[test]
    fn test_build_defaults() {
        let gpio = GrGpio::builder(BASE).build().unwrap();
        assert_eq!(gpio.pin_count(), 32);
        assert_eq!(gpio.name(), TYPE_GR_GPIO);
        assert_eq!(gpio.base(), Address::from(BASE));
        assert_eq!(gpio.size(), 0x100);
        assert_eq!((gpio.value(), gpio.dir()), (0, 0));
    }

    #[test]
    fn test_build_rejects_pin_counts() {
        assert!(matches!(
            GrGpio::builder(BASE).ngpio(0).build(),
            Err(peripheral::Error::PinCount(0, 32))
        ));
        assert!(matches!(
            GrGpio::builder(BASE).ngpio(33).build(),
            Err(peripheral::Error::PinCount(33, 32))
        ));
    }

    #[test]
    fn test_build_rejects_bindings() {
        let res = GrGpio::builder(BASE)
            .ngpio(8)
            .output_line(8, |_: usize, _: bool| ())
            .build();
        assert!(matches!(res, Err(peripheral::Error::PinOutOfRange { pin: 8, count: 8 })));

        let res = GrGpio::builder(BASE)
            .direction_line(3, |_: usize, _: bool| ())
            .direction_line(3, |_: usize, _: bool| ())
            .build();
        assert!(matches!(res, Err(peripheral::Error::DuplicateBinding("direction", 3))));
    }

    #[test]
    fn test_config_properties() {
        let config: GpioConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, GpioConfig::default());

        let config: GpioConfig = serde_json::from_str(r#"{ "ngpio": 12 }"#).unwrap();
        let gpio = GrGpio::builder(BASE).config(config).name("gpio1").build().unwrap();
        assert_eq!(gpio.pin_count(), 12);
        assert_eq!(gpio.name(), "gpio1");
    }

    #[test]
    fn test_write_notifies_changed_pins() {
        let (mut gpio, notes) = wired(32);

        gpio.write(Register::DIR_OFFSET, 0x0000_0005);
        gpio.write(Register::OUT_OFFSET, 0x0000_0007);
        gpio.write(Register::OUT_OFFSET, 0x0000_0007);
        gpio.write(Register::OUT_OFFSET, 0x0000_0003);

        assert_eq!(*notes.lock(), vec![
            Note::Dir(0, true),
            Note::Dir(2, true),
            Note::Out(0, true),
            Note::Out(2, true),
            Note::Out(2, false),
        ]);
        assert_eq!(gpio.value(), 0x1);
    }

    #[test]
    fn test_input_stimulus() {
        let (mut gpio, notes) = wired(16);
        gpio.write(Register::DIR_OFFSET, 0x1);
        notes.lock().clear();

        assert!(gpio.set_input_level(4, true).unwrap());
        assert_eq!(gpio.value(), 0x10);

        // pin 0 is driven, stimulus is dropped
        assert!(!gpio.set_input_level(0, true).unwrap());
        assert_eq!(gpio.value(), 0x10);

        assert!(matches!(
            gpio.set_input_level(16, true),
            Err(peripheral::Error::PinOutOfRange { pin: 16, count: 16 })
        ));
        assert_eq!(gpio.value(), 0x10);
        assert!(notes.lock().is_empty());
    }

    #[test]
    fn test_bus_access() {
        let (mut gpio, _notes) = wired(32);
        let base = Address::from(BASE);

        gpio.write_bytes(base + 0x8u64, &0xff00_00ffu32.to_le_bytes()).unwrap();
        gpio.write_bytes(base + 0x4u64, &[0x5a, 0x00, 0x00, 0xa5]).unwrap();

        let mut buf = [0u8; 4];
        gpio.read_bytes(base, &mut buf).unwrap();
        assert_eq!(u32::from_le_bytes(buf), 0xa500_005a);
        gpio.read_bytes(base + 0x8u64, &mut buf).unwrap();
        assert_eq!(u32::from_le_bytes(buf), 0xff00_00ff);

        // undefined registers inside the window read as zero
        gpio.read_bytes(base + 0x10u64, &mut buf).unwrap();
        assert_eq!(buf, [0; 4]);
        gpio.write_bytes(base + 0x10u64, &[0xff; 4]).unwrap();
        assert_eq!(gpio.value(), 0xa500_005a);
    }

    #[test]
    fn test_bus_rejects_bad_access() {
        let (mut gpio, notes) = wired(32);
        let base = Address::from(BASE);

        let mut half = [0xffu8; 2];
        assert!(matches!(
            gpio.read_bytes(base, &mut half),
            Err(peripheral::Error::InvalidAccess { size: 2, .. })
        ));
        assert_eq!(half, [0; 2]);

        assert!(gpio.write_bytes(base + 0x6u64, &[0xff; 4]).is_err());
        assert!(gpio.write_bytes(base + 0x8u64, &[0xff; 8]).is_err());
        assert!(gpio.write_bytes(base + 0x100u64, &[0xff; 4]).is_err());
        assert!(gpio.write_bytes(Address::from(BASE - 4), &[0xff; 4]).is_err());

        assert_eq!((gpio.value(), gpio.dir()), (0, 0));
        assert!(notes.lock().is_empty());

        // still usable
        gpio.write_bytes(base + 0x8u64, &[0x1, 0, 0, 0]).unwrap();
        assert_eq!(gpio.dir(), 0x1);
    }

    #[test]
    fn test_reset_is_silent() {
        let (mut gpio, notes) = wired(32);
        gpio.write(Register::DIR_OFFSET, 0xffff);
        gpio.write(Register::OUT_OFFSET, 0xffff);
        notes.lock().clear();

        MappedPeripheral::reset(&mut gpio);
        assert_eq!((gpio.value(), gpio.dir()), (0, 0));
        assert!(notes.lock().is_empty());
    }

    #[test]
    fn test_snapshot_restore() {
        let (mut gpio, notes) = wired(8);
        gpio.write(Register::DIR_OFFSET, 0xf0);
        gpio.write(Register::OUT_OFFSET, 0xa0);
        gpio.set_input_level(1, true).unwrap();
        let snapshot = gpio.snapshot();
        assert_eq!((snapshot.value, snapshot.dir), (0xa2, 0xf0));

        gpio.reset();
        notes.lock().clear();
        gpio.restore(&snapshot).unwrap();
        assert_eq!((gpio.value(), gpio.dir()), (0xa2, 0xf0));
        assert!(notes.lock().is_empty());

        // bits beyond the pin count are refused without touching state
        let bad = GpioSnapshot::new(0x100, 0);
        assert!(gpio.restore(&bad).is_err());
        assert_eq!((gpio.value(), gpio.dir()), (0xa2, 0xf0));
    }
}
