//! simulation types
//! 
//! various types used across the simulation module

use std::sync::atomic::{ AtomicUsize, Ordering };

use crate::sim;

pub type Time = usize;

/// a simulation clock is a time source
/// 
/// the clock is shared (via Arc) between every channel that timestamps
/// events, so elapsed time is kept in an atomic and advanced through
/// a shared reference
#[derive(Debug)]
pub struct Clock {
    resolution: f64,
    elapsed: AtomicUsize,
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock {
    /// create a new clock (time source)
    pub fn new() -> Self {
        Self {
            resolution: sim::MIN_QUANT,
            elapsed: AtomicUsize::new(0),
        }
    }

    /// create a new clock with specified resolution in seconds
    /// 
    /// errors if resolution is lower than minimum
    pub fn new_with(resolution: f64) -> Result<Self, sim::Error> {
        if resolution < sim::MIN_QUANT {
            return Err(sim::Error::Clock(
                format!("failed to create clock with resolution {}", resolution)));
        }
        Ok(Self {
            resolution,
            elapsed: AtomicUsize::new(0),
        })
    }

    /// get clock resolution in seconds
    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    /// get elapsed time in ticks since instantiation
    pub fn ticks_elapsed(&self) -> Time {
        self.elapsed.load(Ordering::Relaxed)
    }

    /// increment elapsed time by one
    pub fn tick(&self) {
        self.ticks(1)
    }

    /// increment elapsed time by n
    pub fn ticks(&self, n: Time) {
        self.elapsed.fetch_add(n, Ordering::Relaxed);
    }

    /// get elapsed time in virtual seconds
    pub fn elapsed_seconds(&self) -> f64 {
        (self.ticks_elapsed() as f64) * self.resolution
    }
}
