//! The register file and the fetch-decode-execute loop driving it.
mod opcodes;


use std::time::Duration;

use rand::RngCore;

use crate::{
    definitions::cpu::{register, stack, PROGRAM_START},
    definitions::memory::opcodes as opcode_defs,
    error::StackError,
    timer::{NoCallback, Timer, TimerCallback},
};

/// Represents the program counter movement a single executed opcode asks
/// for.
///
/// Jump, call and return set the counter explicitly and bypass the
/// automatic advance, skips double it.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ProgramCounterStep {
    /// Will move to the following instruction.
    Next,
    /// Will skip over the following instruction.
    Skip,
    /// Will move the program counter to the given location.
    Jump(u16),
}

impl ProgramCounterStep {
    /// Will return a Skip if the condition is true.
    #[inline]
    pub fn cond(cond: bool) -> Self {
        if cond {
            ProgramCounterStep::Skip
        } else {
            ProgramCounterStep::Next
        }
    }
}

/// The cpu state of the machine.
///
/// The two timers live in here as well, their background schedules run
/// independently of the instruction loop and only meet it at the
/// `Fx07`/`Fx15`/`Fx18` opcodes.
pub struct Cpu<B: TimerCallback + 'static> {
    /// `8-bit` data registers named `V0` to `VF`. `VF` doubles as the flag
    /// register, every carry / borrow / shift / collision producing opcode
    /// overwrites it.
    pub(crate) registers: [u8; register::SIZE],
    /// The address register `I`
    pub(crate) index: u16,
    /// The address of the next instruction to fetch
    pub(crate) pc: u16,
    /// The return addresses of the active subroutine calls, nesting is
    /// bounded by the vector capacity
    pub(crate) stack: Vec<u16>,
    /// Counts down at 60 hertz, readable and writable by the program
    pub(crate) delay_timer: Timer<NoCallback>,
    /// Counts down at 60 hertz and drives the buzzer on its zero/nonzero
    /// transitions
    pub(crate) sound_timer: Timer<B>,
    /// The randomness source used by `Cxkk`, injected so tests can pin it
    pub(crate) rng: Box<dyn RngCore + Send>,
}

impl<B: TimerCallback + 'static> Cpu<B> {
    pub(crate) fn new(buzzer: B, timer_interval: Duration, rng: Box<dyn RngCore + Send>) -> Self {
        Self {
            registers: [0; register::SIZE],
            index: 0,
            pc: PROGRAM_START,
            stack: Vec::with_capacity(stack::SIZE),
            delay_timer: Timer::new(timer_interval),
            sound_timer: Timer::with_callback(timer_interval, buzzer),
            rng,
        }
    }

    /// The general registers `V0..VF`.
    pub fn registers(&self) -> &[u8; register::SIZE] {
        &self.registers
    }

    /// The address register `I`.
    pub fn index(&self) -> u16 {
        self.index
    }

    /// The program counter.
    pub fn pc(&self) -> u16 {
        self.pc
    }

    /// The current delay timer value.
    pub fn delay_timer(&self) -> u8 {
        self.delay_timer.get_value()
    }

    /// The current sound timer value.
    pub fn sound_timer(&self) -> u8 {
        self.sound_timer.get_value()
    }

    pub(crate) fn advance(&mut self, step: ProgramCounterStep) {
        const STEP: u16 = opcode_defs::SIZE as u16;
        self.pc = match step {
            ProgramCounterStep::Next => self.pc + STEP,
            ProgramCounterStep::Skip => self.pc + 2 * STEP,
            ProgramCounterStep::Jump(addr) => addr,
        };
    }

    /// Will push the return address to the stack.
    pub(crate) fn push_stack(&mut self, ret: u16) -> Result<(), StackError> {
        if self.stack.len() == stack::SIZE {
            Err(StackError::Overflow { limit: stack::SIZE })
        } else {
            self.stack.push(ret);
            Ok(())
        }
    }

    /// Will pop the return address of the innermost call.
    pub(crate) fn pop_stack(&mut self) -> Result<u16, StackError> {
        self.stack.pop().ok_or(StackError::Underflow)
    }
}
