//! The flat 4096 byte store of the machine.
use std::io::{self, Read, Write};

use crate::{
    definitions::{cpu, memory},
    error::{LoadError, MemoryError},
    opcode::Instruction,
};

/// The ram of the chip.
///
/// - `0x000..0x200` is reserved for the interpreter, the font glyphs live
///   at the bottom of it
/// - `0x200..` holds the program rom and its work ram
pub struct Memory {
    buf: Box<[u8; memory::SIZE]>,
}

impl Memory {
    /// Zero initialized memory. The font is written in by the machine
    /// during its init, not here.
    pub fn new() -> Self {
        Self {
            buf: Box::new([0; memory::SIZE]),
        }
    }

    /// Copies everything the source yields into memory starting at `start`,
    /// reporting the amount of bytes copied.
    ///
    /// The reserved interpreter area cannot be loaded into, and the data
    /// has to fit below the end of memory.
    pub fn load(&mut self, start: u16, source: &mut impl Read) -> Result<usize, LoadError> {
        if start < cpu::PROGRAM_START {
            return Err(LoadError::Reserved { start });
        }

        let mut data = Vec::new();
        let count = source.read_to_end(&mut data)?;

        let begin = start as usize;
        if begin + count > memory::SIZE {
            return Err(LoadError::TooLarge { start, len: count });
        }

        self.buf[begin..begin + count].copy_from_slice(&data);
        Ok(count)
    }

    /// Unchecked against the reserved area, used for the font glyphs.
    pub(crate) fn write(&mut self, addr: u16, data: &[u8]) -> Result<(), MemoryError> {
        let slice = self.slice_mut(addr, data.len())?;
        slice.copy_from_slice(data);
        Ok(())
    }

    /// The two bytes of the instruction word at `addr`, big-endian order.
    pub fn read_word(&self, addr: u16) -> Result<[u8; 2], MemoryError> {
        let word = self.slice(addr, memory::opcodes::SIZE)?;
        Ok([word[0], word[1]])
    }

    pub fn slice(&self, addr: u16, len: usize) -> Result<&[u8], MemoryError> {
        let begin = addr as usize;
        self.buf
            .get(begin..begin + len)
            .ok_or(MemoryError::OutOfBounds { addr, len })
    }

    pub fn slice_mut(&mut self, addr: u16, len: usize) -> Result<&mut [u8], MemoryError> {
        let begin = addr as usize;
        self.buf
            .get_mut(begin..begin + len)
            .ok_or(MemoryError::OutOfBounds { addr, len })
    }

    /// Walks the program area word by word and writes one mnemonic line per
    /// word into the sink.
    ///
    /// Purely diagnostic, independent of execution and not meant to be
    /// parsed back in.
    pub fn disassemble(&self, sink: &mut impl Write) -> io::Result<()> {
        let program = cpu::PROGRAM_START as usize;
        for addr in (program..memory::SIZE).step_by(memory::opcodes::SIZE) {
            let word = [self.buf[addr], self.buf[addr + 1]];
            writeln!(sink, "{:#05X}: {}", addr, Instruction::decode(word))?;
        }
        Ok(())
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}
