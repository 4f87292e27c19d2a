//! digital signal channel
//! 

use std::sync::mpsc;
use std::sync::Arc;

use crate::sim;
use crate::sim::Clock;

use super::logger::ChannelLogger;

/// events that can be sent over a Digital Channel
#[derive(Clone, Copy, PartialEq, Eq, std::fmt::Debug)]
pub enum Event {
    /// Hi represents logic high (1) that occurs at sim::Time
    Hi(sim::Time),
    /// Lo represents logic low (0) that occurs at sim::Time
    Lo(sim::Time),
}

impl Event {
    /// create the event for a logic level at the given time
    pub fn from_level(level: bool, time: sim::Time) -> Self {
        if level { Self::Hi(time) } else { Self::Lo(time) }
    }

    /// the logic level carried by the event
    pub fn level(&self) -> bool {
        matches!(self, Self::Hi(_))
    }

    /// the simulation time the event occurred at
    pub fn time(&self) -> sim::Time {
        match self {
            Self::Hi(t) | Self::Lo(t) => *t,
        }
    }
}

/// a channel for digital signals
/// 
/// acts as a broadcaster: every registered receiver gets a copy of
/// each emitted event, timestamped with the channel's clock
pub struct Channel {
    clock: Arc<Clock>,
    receivers: Vec<mpsc::Sender<Event>>,
}

impl Channel {
    /// create a new digital channel with the given clock as a time source
    pub fn new_with(clock: Arc<Clock>) -> Self {
        Self {
            clock,
            receivers: Vec::new(),
        }
    }

    /// get shared reference to channel's clock
    pub fn clock(&self) -> &Clock {
        self.clock.as_ref()
    }

    /// create a channel logger
    pub fn get_logger(&mut self) -> ChannelLogger<Event> {
        ChannelLogger::new_with(self.receiver())
    }

    /// emit a reference to a digital event to all receivers
    pub fn emit(&self, data: &Event) -> Result<(), sim::Error> {
        for tx in self.receivers.iter() {
            tx.send(*data).map_err(|err| super::Error::emit("digital", err))?;
        }
        Ok(())
    }

    /// emit a logic level stamped with the current clock time
    pub fn emit_level(&self, level: bool) -> Result<(), sim::Error> {
        self.emit(&Event::from_level(level, self.clock.ticks_elapsed()))
    }

    /// add a receiver by registering a mspc::Sender
    /// and returning a mpsc::Receiver
    pub fn receiver(&mut self) -> mpsc::Receiver<Event> {
        let (tx, rx) = mpsc::channel();
        self.receivers.push(tx);
        rx
    }
}
