//! channel logger module
//! 

use std::sync::mpsc;

/// a logger for channel events
pub struct ChannelLogger<Event: Clone + std::fmt::Debug> {
    log: Vec<Event>,
    rx: mpsc::Receiver<Event>,
}

impl<Event: Clone + std::fmt::Debug> ChannelLogger<Event> {
    
    pub fn new_with(rx: mpsc::Receiver<Event>) -> Self {
        Self {
            log: Vec::new(),
            rx,
        }
    }

    /// get a slice of the current log
    pub fn log(&self) -> &[Event] {
        &self.log
    }

    /// collect pending events into the log and return
    /// the number of events collected
    pub fn collect_pending(&mut self) -> usize {
        let before = self.log.len();
        self.log.extend(self.rx.try_iter());
        self.log.len() - before
    }
}
