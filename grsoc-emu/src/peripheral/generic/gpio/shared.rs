//! shared gpio controller
//!
//! the bus and whatever drives the controller's inputs both need to
//! reach the same controller. [`SharedGpio`] puts it behind a single
//! lock so a register write and the notifications it raises happen as
//! one step with respect to input stimulus.

use std::sync::Arc;

use parking_lot::{ Mutex, MutexGuard };

use crate::peripheral;
use crate::peripheral::{ Address, LineSink, MappedPeripheral };

use super::GrGpio;

#[derive(Clone)]
pub struct SharedGpio {
    name: String,
    base: Address,
    size: usize,
    pin_count: u32,
    inner: Arc<Mutex<GrGpio>>,
}

impl SharedGpio {

    pub fn new(gpio: GrGpio) -> Self {
        Self {
            name: gpio.name().to_owned(),
            base: gpio.base(),
            size: gpio.size(),
            pin_count: gpio.pin_count(),
            inner: Arc::new(Mutex::new(gpio)),
        }
    }

    /// lock the controller for direct access
    ///
    /// line consumers run while the lock is held
    pub fn lock(&self) -> MutexGuard<'_, GrGpio> {
        self.inner.lock()
    }

    pub fn pin_count(&self) -> u32 {
        self.pin_count
    }

    /// external stimulus on input line `pin`, see [`GrGpio::set_input_level`]
    pub fn set_input_level(&self, pin: usize, level: bool) -> Result<bool, peripheral::Error> {
        self.inner.lock().set_input_level(pin, level)
    }

    /// get the input entry point of `pin`
    pub fn input_line(&self, pin: usize) -> Result<InputLine, peripheral::Error> {
        if pin >= self.pin_count as usize {
            return Err(peripheral::Error::PinOutOfRange { pin, count: self.pin_count });
        }
        Ok(InputLine { pin, inner: self.inner.clone() })
    }
}

impl MappedPeripheral for SharedGpio {

    fn name(&self) -> &str {
        &self.name
    }

    fn base(&self) -> Address {
        self.base
    }

    fn size(&self) -> usize {
        self.size
    }

    fn read_bytes(&self, address: Address, buf: &mut [u8]) -> Result<(), peripheral::Error> {
        self.inner.lock().read_bytes(address, buf)
    }

    fn write_bytes(&mut self, address: Address, bytes: &[u8]) -> Result<(), peripheral::Error> {
        self.inner.lock().write_bytes(address, bytes)
    }

    fn reset(&mut self) {
        self.inner.lock().reset()
    }
}

/// input entry point for a single pin
///
/// an input line is a [`LineSink`] itself, so the output line of one
/// controller can drive the input of another. it must not be bound to
/// a line of the controller it feeds: consumers run with that
/// controller's lock held.
#[derive(Clone)]
pub struct InputLine {
    pin: usize,
    inner: Arc<Mutex<GrGpio>>,
}

impl InputLine {

    pub fn pin(&self) -> usize {
        self.pin
    }

    /// drive the pin to `level`, returns false if the pin is an output
    pub fn set(&self, level: bool) -> bool {
        // the pin was range checked when the line was handed out
        self.inner.lock()
            .set_input_level(self.pin, level)
            .unwrap_or(false)
    }
}

impl LineSink for InputLine {
    fn set_level(&self, _line: usize, level: bool) {
        self.set(level);
    }
}

impl std::fmt::Debug for InputLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputLine").field("pin", &self.pin).finish()
    }
}
