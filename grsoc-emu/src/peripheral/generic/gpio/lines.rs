//! gpio line propagation
//!
//! turns register transitions into per-pin notifications on the
//! controller's outgoing lines

use crate::peripheral::LineSink;
use crate::sim::channel::digital;

use super::regs::{ bit, pin_mask, Transition, MAX_PINS };

type Binding = Option<Box<dyn LineSink>>;

/// which of the controller's outgoing line groups a binding belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineKind {
    /// driven level of an output pin ("GPIO" lines)
    Output,
    /// configured direction of a pin ("DIR" lines)
    Direction,
}

impl LineKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Output => "output",
            Self::Direction => "direction",
        }
    }
}

/// per-pin binding table
///
/// one optional consumer per pin for each line kind, fixed once the
/// controller is built
pub struct LineTable {
    pin_count: u32,
    output: [Binding; MAX_PINS as usize],
    direction: [Binding; MAX_PINS as usize],
}

impl LineTable {

    pub(crate) fn new(pin_count: u32) -> Self {
        Self {
            pin_count,
            output: std::array::from_fn(|_| None),
            direction: std::array::from_fn(|_| None),
        }
    }

    /// install a binding; the builder guarantees `pin` is in range and unbound
    pub(crate) fn bind(&mut self, kind: LineKind, pin: usize, sink: Box<dyn LineSink>) {
        let slot = match kind {
            LineKind::Output => &mut self.output[pin],
            LineKind::Direction => &mut self.direction[pin],
        };
        *slot = Some(sink);
    }

    pub fn is_bound(&self, kind: LineKind, pin: usize) -> bool {
        let table = match kind {
            LineKind::Output => &self.output,
            LineKind::Direction => &self.direction,
        };
        table.get(pin).map_or(false, Option::is_some)
    }

    /// notify consumers of a register transition
    pub fn propagate(&self, transition: Transition) {
        match transition {
            Transition::None => (),
            Transition::Out { prev, new, dir } => self.on_out_write(prev, new, dir),
            Transition::Dir { prev, new } => self.on_dir_write(prev, new),
        }
    }

    /// notify output consumers of every output pin whose value changed
    pub fn on_out_write(&self, prev_value: u32, new_value: u32, direction: u32) {
        let changed = (prev_value ^ new_value) & direction & pin_mask(self.pin_count);
        self.notify(LineKind::Output, changed, new_value);
    }

    /// notify direction consumers of every pin whose direction changed
    pub fn on_dir_write(&self, prev_direction: u32, new_direction: u32) {
        let changed = (prev_direction ^ new_direction) & pin_mask(self.pin_count);
        self.notify(LineKind::Direction, changed, new_direction);
    }

    fn notify(&self, kind: LineKind, changed: u32, levels: u32) {
        let table = match kind {
            LineKind::Output => &self.output,
            LineKind::Direction => &self.direction,
        };
        for pin in (0..self.pin_count as usize).filter(|&pin| bit(changed, pin)) {
            let level = bit(levels, pin);
            log::trace!("gr_gpio: {} line {} -> {}", kind.name(), pin, level as u8);
            if let Some(sink) = &table[pin] {
                sink.set_level(pin, level);
            }
        }
    }
}

impl std::fmt::Debug for LineTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let bound = |table: &[Binding]| -> u32 {
            table.iter()
                .enumerate()
                .filter(|(_, b)| b.is_some())
                .fold(0, |acc, (pin, _)| acc | (1 << pin))
        };
        f.debug_struct("LineTable")
            .field("pin_count", &self.pin_count)
            .field("output", &format_args!("{:#010x}", bound(&self.output)))
            .field("direction", &format_args!("{:#010x}", bound(&self.direction)))
            .finish()
    }
}

/// a digital channel can be bound to a line, each transition becomes a
/// timestamped Hi/Lo event
impl LineSink for digital::Channel {
    fn set_level(&self, line: usize, level: bool) {
        if let Err(err) = self.emit_level(level) {
            log::warn!("gr_gpio: line {} dropped: {}", line, err);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use parking_lot::Mutex;

    use super::*;

    type Events = Arc<Mutex<Vec<(usize, bool)>>>;

    fn recorder(events: &Events) -> Box<dyn LineSink> {
        let events = events.clone();
        Box::new(move |line: usize, level: bool| events.lock().push((line, level)))
    }

    fn fully_bound(pin_count: u32) -> (LineTable, Events, Events) {
        let outputs = Events::default();
        let dirs = Events::default();
        let mut table = LineTable::new(pin_count);
        for pin in 0..pin_count as usize {
            table.bind(LineKind::Output, pin, recorder(&outputs));
            table.bind(LineKind::Direction, pin, recorder(&dirs));
        }
        (table, outputs, dirs)
    }

    #[test]
    fn test_out_write_only_changed_outputs() {
        let (table, outputs, dirs) = fully_bound(32);

        // pins 0, 2 and 4 changed; 4 is an input
        table.on_out_write(0b00011, 0b10110, 0b00111);
        assert_eq!(*outputs.lock(), vec![(0, false), (2, true)]);
        assert!(dirs.lock().is_empty());
    }

    #[test]
    fn test_dir_write_carries_new_direction() {
        let (table, outputs, dirs) = fully_bound(32);

        table.on_dir_write(0x8000_0001, 0x0000_0003);
        assert_eq!(*dirs.lock(), vec![(1, true), (31, false)]);
        assert!(outputs.lock().is_empty());
    }

    #[test]
    fn test_pins_beyond_count_ignored() {
        let (table, outputs, dirs) = fully_bound(4);

        table.on_dir_write(0, 0xffff_ffff);
        table.on_out_write(0, 0xffff_ffff, 0xffff_ffff);
        assert_eq!(dirs.lock().len(), 4);
        assert_eq!(outputs.lock().len(), 4);
    }

    #[test]
    fn test_unbound_lines() {
        let events = Events::default();
        let mut table = LineTable::new(32);
        table.bind(LineKind::Output, 5, recorder(&events));
        assert!(table.is_bound(LineKind::Output, 5));
        assert!(!table.is_bound(LineKind::Direction, 5));
        assert!(!table.is_bound(LineKind::Output, 40));

        table.propagate(Transition::Out { prev: 0, new: 0x21, dir: 0x21 });
        assert_eq!(*events.lock(), vec![(5, true)]);
    }
}
