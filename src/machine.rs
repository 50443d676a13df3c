//! The machine aggregate, owning the cpu, the memory and the collaborator
//! devices.
use std::io::{self, Read, Write};

use rand::{rngs::OsRng, RngCore};

use crate::{
    cpu::Cpu,
    definitions::{cpu as cpu_defs, fontset, memory as memory_defs, timer},
    devices::{DisplayCommands, KeyboardCommands},
    error::{LoadError, ProcessError},
    memory::Memory,
    shutdown::Shutdown,
    timer::TimerCallback,
};

/// Why a run loop came to rest without an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The program counter ran past the end of memory, the sole natural
    /// stopping condition.
    EndOfMemory,
    /// The shutdown token fired.
    Interrupted,
}

/// The assembled CHIP-8 machine.
///
/// Construction zeroes the memory and writes the font glyphs into the
/// reserved area, [`load_rom`](Machine::load_rom) copies the program to
/// `0x200`. From there [`tick`](Machine::tick) advances a single cycle and
/// [`run`](Machine::run) drives the loop until it stops.
pub struct Machine<D, K, B>
where
    D: DisplayCommands,
    K: KeyboardCommands,
    B: TimerCallback + 'static,
{
    cpu: Cpu<B>,
    memory: Memory,
    display: D,
    keyboard: K,
    shutdown: Shutdown,
}

impl<D, K, B> Machine<D, K, B>
where
    D: DisplayCommands,
    K: KeyboardCommands,
    B: TimerCallback + 'static,
{
    /// Builds the machine with the default os randomness source.
    ///
    /// The buzzer is handed to the sound timer, which drives it on its
    /// zero/nonzero transitions.
    pub fn new(display: D, keyboard: K, buzzer: B) -> Self {
        Self::with_rng(display, keyboard, buzzer, Box::new(OsRng))
    }

    /// Builds the machine around an explicit randomness source (`Cxkk`).
    pub fn with_rng(display: D, keyboard: K, buzzer: B, rng: Box<dyn RngCore + Send>) -> Self {
        let mut memory = Memory::new();
        // glyph i lands exactly where fontset::glyph_address sends Fx29
        memory
            .write(fontset::LOCATION, &fontset::FONTSET)
            .expect("the font always fits into the reserved area");

        Self {
            cpu: Cpu::new(buzzer, timer::INTERVAL, rng),
            memory,
            display,
            keyboard,
            shutdown: Shutdown::new(),
        }
    }

    /// Copies the raw rom byte stream verbatim to `0x200`, reporting the
    /// copied size. There is no header or framing to parse.
    pub fn load_rom(&mut self, rom: &mut impl Read) -> Result<usize, LoadError> {
        let count = self.memory.load(cpu_defs::PROGRAM_START, rom)?;
        log::debug!(
            "loaded a rom of {} bytes at {:#05X}",
            count,
            cpu_defs::PROGRAM_START
        );
        Ok(count)
    }

    /// A token that cancels a running loop, and any blocked key wait
    /// inside of it, from another thread.
    pub fn shutdown_handle(&self) -> Shutdown {
        self.shutdown.clone()
    }

    /// Advances the machine by a single cycle.
    pub fn tick(&mut self) -> Result<(), ProcessError> {
        self.cpu.tick(
            &mut self.memory,
            &mut self.display,
            &self.keyboard,
            &self.shutdown,
        )
    }

    /// Drives the machine until the program counter leaves memory, the
    /// shutdown token fires, or a cycle surfaces an error.
    ///
    /// The loop itself is unthrottled, pacing it down to a historical cpu
    /// speed is the host's business.
    pub fn run(&mut self) -> Result<StopReason, ProcessError> {
        loop {
            if self.shutdown.is_triggered() {
                log::debug!("run loop stopping on shutdown");
                return Ok(StopReason::Interrupted);
            }
            if self.cpu.pc() as usize >= memory_defs::SIZE {
                log::debug!("program counter left memory, halting");
                return Ok(StopReason::EndOfMemory);
            }
            match self.tick() {
                Ok(()) => {}
                Err(ProcessError::Interrupted) => return Ok(StopReason::Interrupted),
                Err(err) => return Err(err),
            }
        }
    }

    pub fn cpu(&self) -> &Cpu<B> {
        &self.cpu
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    /// Writes one mnemonic line per program word into the sink, see
    /// [`Memory::disassemble`](Memory::disassemble).
    pub fn disassemble(&self, sink: &mut impl Write) -> io::Result<()> {
        self.memory.disassemble(sink)
    }
}
