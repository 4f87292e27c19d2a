//! grsoc-emu
//! 
//! peripheral models for the GR SoC platform. the centrepiece is the
//! GR GPIO controller in [`peripheral::generic::gpio`], which can be
//! mapped onto a [`peripheral::MemoryMap`] and wired to digital
//! [`sim::channel`]s or any other [`peripheral::LineSink`].

pub mod peripheral;
pub mod sim;
