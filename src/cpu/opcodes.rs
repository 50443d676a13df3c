//! The opcode dispatcher, one method per top level opcode group.
use crate::{
    definitions::{cpu::register, fontset, memory::opcodes as opcode_defs},
    devices::{DisplayCommands, KeyboardCommands},
    error::{DecodeError, ProcessError},
    memory::Memory,
    opcode::Instruction,
    shutdown::Shutdown,
    timer::TimerCallback,
};

use super::{Cpu, ProgramCounterStep};

impl<B: TimerCallback + 'static> Cpu<B> {
    /// One full cycle: fetch the word at the program counter, decode it,
    /// execute, then move the counter by whatever step the opcode asked
    /// for.
    pub(crate) fn tick<D, K>(
        &mut self,
        memory: &mut Memory,
        display: &mut D,
        keyboard: &K,
        shutdown: &Shutdown,
    ) -> Result<(), ProcessError>
    where
        D: DisplayCommands,
        K: KeyboardCommands,
    {
        let inst = Instruction::decode(memory.read_word(self.pc)?);
        log::trace!("{:#05X}: {}", self.pc, inst);

        let step = match inst.group() {
            0x0 => self.zero(&inst, display)?,
            // 1NNN
            // Jumps to address NNN.
            0x1 => ProgramCounterStep::Jump(inst.addr()),
            0x2 => self.call(&inst)?,
            // 3XNN
            // Skips the next instruction if VX equals NN.
            0x3 => ProgramCounterStep::cond(self.registers[inst.x()] == inst.byte()),
            // 4XNN
            // Skips the next instruction if VX doesn't equal NN.
            0x4 => ProgramCounterStep::cond(self.registers[inst.x()] != inst.byte()),
            0x5 | 0x9 => self.skip_compare(&inst)?,
            // 6XNN
            // Sets VX to NN.
            0x6 => {
                self.registers[inst.x()] = inst.byte();
                ProgramCounterStep::Next
            }
            // 7XNN
            // Adds NN to VX, lets VX overflow but leaves the flag alone.
            0x7 => {
                let x = inst.x();
                self.registers[x] = self.registers[x].wrapping_add(inst.byte());
                ProgramCounterStep::Next
            }
            0x8 => self.eight(&inst)?,
            // ANNN
            // Sets I to the address NNN.
            0xA => {
                self.index = inst.addr();
                ProgramCounterStep::Next
            }
            // BNNN
            // Jumps to the address NNN plus V0.
            0xB => ProgramCounterStep::Jump(inst.addr() + self.registers[0] as u16),
            // CXNN
            // Sets VX to a random byte masked with NN.
            0xC => {
                // the RngCore trait has no u8 output, so pull one byte
                let mut byte = [0u8; 1];
                self.rng.fill_bytes(&mut byte);
                self.registers[inst.x()] = byte[0] & inst.byte();
                ProgramCounterStep::Next
            }
            0xD => self.draw(&inst, memory, display)?,
            0xE => self.key_skip(&inst, keyboard)?,
            0xF => self.misc(&inst, memory, keyboard, shutdown)?,
            _ => unreachable!("a nibble has no sixteenth value"),
        };

        self.advance(step);
        Ok(())
    }

    /// The uniform answer to a bit pattern outside of the opcode table.
    fn unknown(&self, inst: &Instruction) -> ProcessError {
        DecodeError::Unknown {
            opcode: inst.word(),
            pc: self.pc,
        }
        .into()
    }

    /// - `00E0` clears the screen
    /// - `00EE` returns from the subroutine
    /// - any other `0NNN` is the legacy machine code call, treated as a
    ///   plain jump
    fn zero<D: DisplayCommands>(
        &mut self,
        inst: &Instruction,
        display: &mut D,
    ) -> Result<ProgramCounterStep, ProcessError> {
        let step = match inst.word() {
            0x00E0 => {
                display.clear();
                ProgramCounterStep::Next
            }
            0x00EE => ProgramCounterStep::Jump(self.pop_stack()?),
            _ => ProgramCounterStep::Jump(inst.addr()),
        };
        Ok(step)
    }

    /// `2NNN` calls the subroutine at `NNN`.
    ///
    /// The pushed return address is the instruction after the call, so the
    /// matching `00EE` jumps straight there.
    fn call(&mut self, inst: &Instruction) -> Result<ProgramCounterStep, ProcessError> {
        self.push_stack(self.pc + opcode_defs::SIZE as u16)?;
        Ok(ProgramCounterStep::Jump(inst.addr()))
    }

    /// `5XY0` skips if VX equals VY, `9XY0` if they differ. A nonzero low
    /// nibble has no table entry.
    fn skip_compare(&self, inst: &Instruction) -> Result<ProgramCounterStep, ProcessError> {
        let (vx, vy) = (self.registers[inst.x()], self.registers[inst.y()]);
        match (inst.group(), inst.n()) {
            (0x5, 0x0) => Ok(ProgramCounterStep::cond(vx == vy)),
            (0x9, 0x0) => Ok(ProgramCounterStep::cond(vx != vy)),
            _ => Err(self.unknown(inst)),
        }
    }

    /// The `8XYN` arithmetic and bit operation group.
    fn eight(&mut self, inst: &Instruction) -> Result<ProgramCounterStep, ProcessError> {
        let (x, y) = (inst.x(), inst.y());
        match inst.n() {
            // 8XY0
            // Sets VX to the value of VY.
            0x0 => self.registers[x] = self.registers[y],
            // 8XY1
            // Sets VX to VX or VY.
            0x1 => self.registers[x] |= self.registers[y],
            // 8XY2
            // Sets VX to VX and VY.
            0x2 => self.registers[x] &= self.registers[y],
            // 8XY3
            // Sets VX to VX xor VY.
            0x3 => self.registers[x] ^= self.registers[y],
            // 8XY4
            // Adds VY to VX, the flag holds the carry.
            0x4 => {
                let (res, carry) = self.registers[x].overflowing_add(self.registers[y]);
                self.registers[x] = res;
                self.registers[register::FLAG] = carry as u8;
            }
            // 8XY5
            // Subtracts VY from VX, the flag holds VX > VY.
            0x5 => {
                let (vx, vy) = (self.registers[x], self.registers[y]);
                self.registers[x] = vx.wrapping_sub(vy);
                self.registers[register::FLAG] = (vx > vy) as u8;
            }
            // 8XY6
            // Stores the least significant bit of VX in the flag, then
            // shifts VX right by one.
            0x6 => {
                let vx = self.registers[x];
                self.registers[x] = vx >> 1;
                self.registers[register::FLAG] = vx & 0x1;
            }
            // 8XY7
            // Sets VX to VY minus VX, the flag holds VY > VX.
            0x7 => {
                let (vx, vy) = (self.registers[x], self.registers[y]);
                self.registers[x] = vy.wrapping_sub(vx);
                self.registers[register::FLAG] = (vy > vx) as u8;
            }
            // 8XYE
            // Stores the most significant bit of VX in the flag, then
            // shifts VX left by one.
            0xE => {
                let vx = self.registers[x];
                self.registers[x] = vx << 1;
                self.registers[register::FLAG] = vx >> 7;
            }
            _ => return Err(self.unknown(inst)),
        }
        Ok(ProgramCounterStep::Next)
    }

    /// `DXYN` hands the `N` byte sprite at `I` to the display and stores
    /// the reported collision in the flag.
    fn draw<D: DisplayCommands>(
        &mut self,
        inst: &Instruction,
        memory: &Memory,
        display: &mut D,
    ) -> Result<ProgramCounterStep, ProcessError> {
        let sprite = memory.slice(self.index, inst.n())?;
        let collision = display.draw(self.registers[inst.x()], self.registers[inst.y()], sprite);
        self.registers[register::FLAG] = collision as u8;
        Ok(ProgramCounterStep::Next)
    }

    /// `EX9E` skips while the key in VX is held down, `EXA1` while it is
    /// not.
    fn key_skip<K: KeyboardCommands>(
        &self,
        inst: &Instruction,
        keyboard: &K,
    ) -> Result<ProgramCounterStep, ProcessError> {
        let key = self.registers[inst.x()] & 0xF;
        match inst.byte() {
            0x9E => Ok(ProgramCounterStep::cond(keyboard.is_pressed(key))),
            0xA1 => Ok(ProgramCounterStep::cond(!keyboard.is_pressed(key))),
            _ => Err(self.unknown(inst)),
        }
    }

    /// The `FXNN` group, timers, memory block transfers and the one
    /// blocking opcode of the machine.
    fn misc<K: KeyboardCommands>(
        &mut self,
        inst: &Instruction,
        memory: &mut Memory,
        keyboard: &K,
        shutdown: &Shutdown,
    ) -> Result<ProgramCounterStep, ProcessError> {
        let x = inst.x();
        match inst.byte() {
            // FX07
            // Sets VX to the value of the delay timer.
            0x07 => self.registers[x] = self.delay_timer.get_value(),
            // FX0A
            // Suspends the dispatch until the key in VX is observed
            // pressed. The wait has to park the thread, and the shutdown
            // token cuts it short.
            0x0A => {
                let key = self.registers[x] & 0xF;
                keyboard
                    .wait_pressed(key, shutdown)
                    .map_err(|_| ProcessError::Interrupted)?;
                self.registers[x] = key;
            }
            // FX15
            // Sets the delay timer to VX.
            0x15 => self.delay_timer.set_value(self.registers[x]),
            // FX18
            // Sets the sound timer to VX.
            0x18 => self.sound_timer.set_value(self.registers[x]),
            // FX1E
            // Adds VX to I, the flag is not affected.
            0x1E => self.index = self.index.wrapping_add(self.registers[x] as u16),
            // FX29
            // Points I at the font glyph for the digit in VX.
            0x29 => self.index = fontset::glyph_address(self.registers[x] & 0xF),
            // FX33
            // Stores the three decimal digits of VX at I, I+1 and I+2.
            0x33 => {
                let value = self.registers[x];
                let digits = [value / 100, value / 10 % 10, value % 10];
                memory.slice_mut(self.index, digits.len())?.copy_from_slice(&digits);
            }
            // FX55
            // Stores V0 to VX (including VX) in memory starting at I.
            0x55 => {
                memory
                    .slice_mut(self.index, x + 1)?
                    .copy_from_slice(&self.registers[..=x]);
            }
            // FX65
            // Fills V0 to VX (including VX) from memory starting at I.
            0x65 => {
                let data = memory.slice(self.index, x + 1)?;
                self.registers[..=x].copy_from_slice(data);
            }
            _ => return Err(self.unknown(inst)),
        }
        Ok(ProgramCounterStep::Next)
    }
}
