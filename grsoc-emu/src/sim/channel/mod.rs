//! channel module
//! 
//! implements channels with emitters/receivers of various kinds

pub mod digital;
pub mod error;
pub mod logger;

pub use error::Error;
pub use logger::ChannelLogger;
