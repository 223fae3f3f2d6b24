pub mod transmitter;

pub use transmitter::{Transmitter, TransmitterSet};
