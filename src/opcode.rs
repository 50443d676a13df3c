//! Opcode abstractions, the nibble decoder and the mnemonic formatting.
use std::fmt;

/// A single decoded instruction.
///
/// All instructions are two bytes long and stored most-significant-byte
/// first; decoding splits them into the four nibbles `o1..o4` that the
/// dispatcher and the disassembler work with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    o1: u8,
    o2: u8,
    o3: u8,
    o4: u8,
}

impl Instruction {
    /// Splits a big-endian word into its four nibbles.
    ///
    /// This is total, any two bytes decode to an instruction. Whether the
    /// bit pattern has an entry in the opcode table is the dispatcher's
    /// problem.
    ///
    /// # Example
    /// ```rust
    /// # use ocho::opcode::Instruction;
    /// let inst = Instruction::decode([0xD1, 0x2A]);
    /// assert_eq!(inst.nibbles(), (0xD, 0x1, 0x2, 0xA));
    /// assert_eq!(inst.word(), 0xD12A);
    /// ```
    pub fn decode(word: [u8; 2]) -> Self {
        Self {
            o1: word[0] >> 4,
            o2: word[0] & 0x0F,
            o3: word[1] >> 4,
            o4: word[1] & 0x0F,
        }
    }

    /// The four nibbles in fetch order.
    pub fn nibbles(&self) -> (u8, u8, u8, u8) {
        (self.o1, self.o2, self.o3, self.o4)
    }

    /// The top level opcode group (`o1`) the dispatcher switches on.
    pub fn group(&self) -> u8 {
        self.o1
    }

    /// The 12-bit address `nnn` built from `o2 o3 o4`.
    pub fn addr(&self) -> u16 {
        (self.o2 as u16) << 8 | (self.o3 as u16) << 4 | self.o4 as u16
    }

    /// The 8-bit immediate `kk` built from `o3 o4`.
    pub fn byte(&self) -> u8 {
        self.o3 << 4 | self.o4
    }

    /// The register index `x` (`o2`).
    pub fn x(&self) -> usize {
        self.o2 as usize
    }

    /// The register index `y` (`o3`).
    pub fn y(&self) -> usize {
        self.o3 as usize
    }

    /// The low nibble `n` (`o4`).
    pub fn n(&self) -> usize {
        self.o4 as usize
    }

    /// Recombines the nibbles into the raw 16-bit word.
    pub fn word(&self) -> u16 {
        (self.o1 as u16) << 12 | (self.o2 as u16) << 8 | (self.o3 as u16) << 4 | self.o4 as u16
    }
}

impl From<[u8; 2]> for Instruction {
    fn from(word: [u8; 2]) -> Self {
        Self::decode(word)
    }
}

/// Renders the canonical mnemonic of the instruction.
///
/// This is diagnostic output for the disassembly dump and the trace log,
/// it is not meant to be parsed back. Words without a table entry are
/// rendered as a plain data word (`DW`).
impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (x, y, n) = (self.x(), self.y(), self.n());
        match self.nibbles() {
            (0x0, 0x0, 0xE, 0x0) => write!(f, "CLS"),
            (0x0, 0x0, 0xE, 0xE) => write!(f, "RET"),
            (0x0, ..) => write!(f, "SYS {:#05X}", self.addr()),
            (0x1, ..) => write!(f, "JP {:#05X}", self.addr()),
            (0x2, ..) => write!(f, "CALL {:#05X}", self.addr()),
            (0x3, ..) => write!(f, "SE V{:X}, {:#04X}", x, self.byte()),
            (0x4, ..) => write!(f, "SNE V{:X}, {:#04X}", x, self.byte()),
            (0x5, .., 0x0) => write!(f, "SE V{:X}, V{:X}", x, y),
            (0x6, ..) => write!(f, "LD V{:X}, {:#04X}", x, self.byte()),
            (0x7, ..) => write!(f, "ADD V{:X}, {:#04X}", x, self.byte()),
            (0x8, .., 0x0) => write!(f, "LD V{:X}, V{:X}", x, y),
            (0x8, .., 0x1) => write!(f, "OR V{:X}, V{:X}", x, y),
            (0x8, .., 0x2) => write!(f, "AND V{:X}, V{:X}", x, y),
            (0x8, .., 0x3) => write!(f, "XOR V{:X}, V{:X}", x, y),
            (0x8, .., 0x4) => write!(f, "ADD V{:X}, V{:X}", x, y),
            (0x8, .., 0x5) => write!(f, "SUB V{:X}, V{:X}", x, y),
            (0x8, .., 0x6) => write!(f, "SHR V{:X}", x),
            (0x8, .., 0x7) => write!(f, "SUBN V{:X}, V{:X}", x, y),
            (0x8, .., 0xE) => write!(f, "SHL V{:X}", x),
            (0x9, .., 0x0) => write!(f, "SNE V{:X}, V{:X}", x, y),
            (0xA, ..) => write!(f, "LD I, {:#05X}", self.addr()),
            (0xB, ..) => write!(f, "JP V0, {:#05X}", self.addr()),
            (0xC, ..) => write!(f, "RND V{:X}, {:#04X}", x, self.byte()),
            (0xD, ..) => write!(f, "DRW V{:X}, V{:X}, {:#03X}", x, y, n),
            (0xE, _, 0x9, 0xE) => write!(f, "SKP V{:X}", x),
            (0xE, _, 0xA, 0x1) => write!(f, "SKNP V{:X}", x),
            (0xF, _, 0x0, 0x7) => write!(f, "LD V{:X}, DT", x),
            (0xF, _, 0x0, 0xA) => write!(f, "LD V{:X}, K", x),
            (0xF, _, 0x1, 0x5) => write!(f, "LD DT, V{:X}", x),
            (0xF, _, 0x1, 0x8) => write!(f, "LD ST, V{:X}", x),
            (0xF, _, 0x1, 0xE) => write!(f, "ADD I, V{:X}", x),
            (0xF, _, 0x2, 0x9) => write!(f, "LD F, V{:X}", x),
            (0xF, _, 0x3, 0x3) => write!(f, "LD B, V{:X}", x),
            (0xF, _, 0x5, 0x5) => write!(f, "LD [I], V{:X}", x),
            (0xF, _, 0x6, 0x5) => write!(f, "LD V{:X}, [I]", x),
            _ => write!(f, "DW {:#06X}", self.word()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_is_total_and_reversible() {
        // every possible word decodes and recombines to itself
        for word in 0..=u16::MAX {
            let bytes = word.to_be_bytes();
            let inst = Instruction::decode(bytes);
            assert_eq!(inst.word(), word);
        }
    }

    #[test]
    fn test_decode_splits_nibbles() {
        let inst = Instruction::decode([0x1E, 0xDA]);
        assert_eq!(inst.nibbles(), (0x1, 0xE, 0xD, 0xA));
        assert_eq!(inst.group(), 0x1);
        assert_eq!(inst.addr(), 0xEDA);
        assert_eq!(inst.byte(), 0xDA);
        assert_eq!(inst.x(), 0xE);
        assert_eq!(inst.y(), 0xD);
        assert_eq!(inst.n(), 0xA);
    }

    #[test]
    fn test_mnemonics() {
        let tests = [
            ([0x00u8, 0xE0u8], "CLS"),
            ([0x00, 0xEE], "RET"),
            ([0x02, 0x20], "SYS 0x220"),
            ([0x12, 0x00], "JP 0x200"),
            ([0x23, 0x45], "CALL 0x345"),
            ([0x31, 0x23], "SE V1, 0x23"),
            ([0x51, 0x20], "SE V1, V2"),
            ([0x81, 0x24], "ADD V1, V2"),
            ([0x81, 0x26], "SHR V1"),
            ([0xA2, 0x22], "LD I, 0x222"),
            ([0xC1, 0x0F], "RND V1, 0x0F"),
            ([0xD1, 0x25], "DRW V1, V2, 0x5"),
            ([0xE1, 0x9E], "SKP V1"),
            ([0xF1, 0x33], "LD B, V1"),
            ([0xF1, 0x65], "LD V1, [I]"),
            // not part of the opcode table, rendered as data
            ([0x51, 0x21], "DW 0x5121"),
            ([0xF1, 0xAA], "DW 0xF1AA"),
        ];
        for (word, mnemonic) in tests.iter() {
            assert_eq!(format!("{}", Instruction::decode(*word)), *mnemonic);
        }
    }
}
