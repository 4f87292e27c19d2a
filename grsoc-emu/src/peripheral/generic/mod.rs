//! generic peripherals
//! 
//! peripheral models that are not tied to a particular cpu architecture

pub mod gpio;
