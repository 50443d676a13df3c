//! The constants that describe the emulated machine.

/// The memory definitions
pub mod memory {
    /// The size of the chipset ram
    pub const SIZE: usize = 0x1000; // 4096

    /// opcode information
    pub mod opcodes {
        /// The step used for calculating the program counter increments
        pub const SIZE: usize = 2;
    }
}

/// The definitions for the cpu
pub mod cpu {
    /// The starting point for the program
    pub const PROGRAM_START: u16 = 0x0200;

    /// The definitions needed for the register
    pub mod register {
        /// The size of the chip set registers
        pub const SIZE: usize = 16;
        /// The flag register `VF`, overwritten by every
        /// carry / borrow / shift / collision producing opcode
        pub const FLAG: usize = SIZE - 1;
    }

    /// The stack definitions
    pub mod stack {
        /// The count of nesting entries
        pub const SIZE: usize = 16;
    }
}

/// The timer definitions
pub mod timer {
    use std::time::Duration;

    /// The amount of hertz the clocks run at
    pub const HERTZ: u64 = 60;
    /// The period of a single clock tick
    pub const INTERVAL: Duration = Duration::from_millis(1000 / HERTZ);
}

/// The display definitions
pub mod display {
    /// The amount of pixels per row
    pub const WIDTH: usize = 64;
    /// The amount of rows
    pub const HEIGHT: usize = 32;
}

/// The definitions needed for correct keyboard handling.
pub mod keyboard {
    /// all the different keyboard entries (`0x0` - `0xF`)
    pub const SIZE: usize = 16;
}

/// The fontset information
pub mod fontset {
    /// The amount of bytes a single glyph takes up
    pub const GLYPH_SIZE: usize = 5;

    /// Is the location of the beginning of the font in memory
    pub const LOCATION: u16 = 0x0;

    /// Where the glyph for the given hex digit lives in memory.
    ///
    /// `Fx29` has to reproduce the exact address the glyph was
    /// loaded to during initialization, so both go through here.
    pub const fn glyph_address(digit: u8) -> u16 {
        LOCATION + (GLYPH_SIZE as u16) * (digit as u16)
    }

    /// The font set characters to be rendered on the screen,
    /// one `4x5` bitmap per hex digit, high nibble significant
    pub const FONTSET: [u8; 80] = [
        0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
        0x20, 0x60, 0x20, 0x20, 0x70, // 1
        0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
        0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
        0x90, 0x90, 0xF0, 0x10, 0x10, // 4
        0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
        0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
        0xF0, 0x10, 0x20, 0x40, 0x40, // 7
        0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
        0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
        0xF0, 0x90, 0xF0, 0x90, 0x90, // A
        0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
        0xF0, 0x80, 0x80, 0x80, 0xF0, // C
        0xE0, 0x90, 0x90, 0x90, 0xE0, // D
        0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
        0xF0, 0x80, 0xF0, 0x80, 0x80, // F
    ];
}
