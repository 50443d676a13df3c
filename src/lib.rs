//! The core of a CHIP-8 virtual machine, from the raw opcode handling up to
//! the machine aggregate that runs a rom.
//!
//! The crate is frontend agnostic: rendering, key sampling and the buzzer
//! are behind the traits in [`devices`](devices), so that the interpreter
//! can be driven headless (tests) or by any host process.
pub mod cpu;
pub mod definitions;
pub mod devices;
pub mod memory;
pub mod opcode;
pub mod timer;

mod error;
mod machine;
mod shutdown;

// reexporting for convinience
pub use error::*;
pub use machine::*;
pub use shutdown::{Cancelled, Shutdown};
