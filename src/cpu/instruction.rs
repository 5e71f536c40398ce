// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)
#![allow(clippy::bad_bit_mask)]
//! Contains the definition of a decoded instruction, and the total decoder

use imperative_rs::InstructionSet;
use std::fmt::Display;

#[allow(non_camel_case_types, non_snake_case, missing_docs)]
#[derive(Clone, Copy, Debug, InstructionSet, PartialEq, Eq)]
/// The implemented opcode families, one variant per family.
///
/// Field letters follow opcode convention: `A` is a 12-bit address, `B` an
/// immediate byte, `x`/`y` register indices, `n` a nibble.
pub enum Insn {
    /// | 00ee | Return from subroutine
    #[opcode = "0x00ee"]
    ret,
    /// | 1aaa | Jump to an absolute address
    #[opcode = "0x1AAA"]
    jmp { A: u16 },
    /// | 2aaa | Push pc onto the stack, then jump to a
    #[opcode = "0x2AAA"]
    call { A: u16 },
    /// | 3xbb | Skip next instruction if vX == b
    #[opcode = "0x3xBB"]
    skeq { x: usize, B: u8 },
    /// | 4xbb | Skip next instruction if vX != b
    #[opcode = "0x4xBB"]
    skne { x: usize, B: u8 },
    /// | 6xbb | Load immediate byte b into vX
    #[opcode = "0x6xBB"]
    ldb { x: usize, B: u8 },
    /// | 7xbb | Add immediate byte b to vX, no carry
    #[opcode = "0x7xBB"]
    addb { x: usize, B: u8 },
    /// | 8xy0 | Copy vY into vX
    #[opcode = "0x8xy0"]
    ldr { x: usize, y: usize },
    /// | aaaa | Load address #a into register I
    #[opcode = "0xaAAA"]
    ldi { A: u16 },
    /// | dxyn | Draw an n-byte sprite at coordinates (vX, vY)
    #[opcode = "0xdxyn"]
    drw { x: usize, y: usize, n: u8 },
    /// | exa1 | Skip next instruction if key != vX
    #[opcode = "0xexa1"]
    sknp { x: usize },
    /// | fx07 | Read the delay timer into vX
    #[opcode = "0xfx07"]
    lddt { x: usize },
    /// | fx0a | Wait for input, store key in vX
    #[opcode = "0xfx0a"]
    waitk { x: usize },
    /// | fx15 | Write vX into the delay timer
    #[opcode = "0xfx15"]
    stdt { x: usize },
    /// | fx1e | Add vX into register I
    #[opcode = "0xfx1e"]
    addi { x: usize },
    /// | fx65 | Load registers v0..=vX from memory at I
    #[opcode = "0xfx65"]
    restore { x: usize },
}

impl Display for Insn {
    #[rustfmt::skip]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Insn::ret                => write!(f, "ret    "),
            Insn::jmp { A }          => write!(f, "jmp    {A:03x}"),
            Insn::call { A }         => write!(f, "call   {A:03x}"),
            Insn::skeq { x, B }      => write!(f, "skeq   v{x:X}, #{B:02x}"),
            Insn::skne { x, B }      => write!(f, "skne   v{x:X}, #{B:02x}"),
            Insn::ldb { x, B }       => write!(f, "ld     v{x:X}, #{B:02x}"),
            Insn::addb { x, B }      => write!(f, "add    v{x:X}, #{B:02x}"),
            Insn::ldr { x, y }       => write!(f, "ld     v{x:X}, v{y:X}"),
            Insn::ldi { A }          => write!(f, "ld     I, ${A:03x}"),
            Insn::drw { x, y, n }    => write!(f, "drw    v{x:X}, v{y:X}, #{n:x}"),
            Insn::sknp { x }         => write!(f, "sknp   v{x:X}"),
            Insn::lddt { x }         => write!(f, "ld     v{x:X}, DT"),
            Insn::waitk { x }        => write!(f, "waitk  v{x:X}"),
            Insn::stdt { x }         => write!(f, "ld     DT, v{x:X}"),
            Insn::addi { x }         => write!(f, "add    I, v{x:X}"),
            Insn::restore { x }      => write!(f, "restore v{x:X}"),
        }
    }
}

/// Result of decoding one instruction word: a known instruction, or the raw
/// word when it matched nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decoded {
    /// The word matched an implemented family
    Insn(Insn),
    /// The word matched nothing; executing it is fatal
    Unknown(u16),
}

/// Decodes one instruction word.
///
/// Total: every 16-bit value maps to some [Decoded], and the error for an
/// unmatched word is reported at execution time, not here.
pub fn decode(word: u16) -> Decoded {
    match Insn::decode(&word.to_be_bytes()) {
        Ok((_, insn)) => Decoded::Insn(insn),
        Err(_) => Decoded::Unknown(word),
    }
}
