use std::io;

use thiserror::Error;

/// Any error the dispatch loop can surface for a single cycle.
#[derive(Error, Debug, PartialEq, Clone, Copy)]
pub enum ProcessError {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Stack(#[from] StackError),
    #[error(transparent)]
    Memory(#[from] MemoryError),
    /// The shutdown token fired while an opcode was blocked (`Fx0A`).
    #[error("execution was interrupted by a shutdown request")]
    Interrupted,
}

/// A bit pattern with no entry in the opcode table.
///
/// Carries the raw opcode and the program counter it was fetched from, so
/// the caller can decide between aborting and skipping the instruction.
#[derive(Error, Debug, PartialEq, Eq, Clone, Copy)]
pub enum DecodeError {
    #[error("unknown opcode {opcode:#06X} at {pc:#05X}")]
    Unknown { opcode: u16, pc: u16 },
}

#[derive(Error, Debug, PartialEq, Eq, Clone, Copy)]
pub enum StackError {
    #[error("call stack overflow, nesting is limited to {limit} calls")]
    Overflow { limit: usize },
    #[error("return with an empty call stack")]
    Underflow,
}

#[derive(Error, Debug, PartialEq, Eq, Clone, Copy)]
pub enum MemoryError {
    #[error("access of {len} bytes at {addr:#05X} crosses the end of memory")]
    OutOfBounds { addr: u16, len: usize },
}

/// Errors surfaced while copying a rom into memory.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("unable to read the rom")]
    Io(#[from] io::Error),
    #[error("rom of {len} bytes does not fit into memory at {start:#05X}")]
    TooLarge { start: u16, len: usize },
    #[error("loading at {start:#05X} would overwrite the reserved interpreter area")]
    Reserved { start: u16 },
}
