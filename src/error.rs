// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)

//! Error type for Cricket

use thiserror::Error;

/// Result type, equivalent to [std::result::Result]<T, [enum@Error]>
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for Cricket.
///
/// The load group ([Error::EmptyRom], [Error::OversizedRom], [Error::IoError])
/// surfaces before the machine starts; the rest are fatal at runtime and
/// leave the machine halted.
#[derive(Debug, Error)]
pub enum Error {
    /// The program image contained no bytes
    #[error("program image is empty")]
    EmptyRom,
    /// The program image does not fit in program space
    #[error("program image is {size} bytes, but program space holds {max}")]
    OversizedRom {
        /// Size of the offending image
        size: usize,
        /// Capacity of program space
        max: usize,
    },
    /// A call was issued with the stack already full
    #[error("stack overflow: call at {addr:03x} with {depth} frames live")]
    StackOverflow {
        /// Address of the call instruction
        addr: u16,
        /// Frames on the stack when the call was issued
        depth: usize,
    },
    /// A return was issued with nothing on the stack
    #[error("stack underflow: return at {addr:03x} with no saved frame")]
    StackUnderflow {
        /// Address of the return instruction
        addr: u16,
    },
    /// The word matched no implemented opcode family
    #[error("opcode {word:04x} at {addr:03x} not recognized")]
    UnknownOpcode {
        /// The offending word
        word: u16,
        /// The address it was fetched from
        addr: u16,
    },
    /// A memory access fell outside the 4096-byte address space
    #[error("address {addr:04x} is outside addressable memory")]
    OutOfBounds {
        /// The first address past the end of the access
        addr: u16,
    },
    /// Tried to latch a key that doesn't exist
    #[error("tried to latch key {key:X} which does not exist")]
    InvalidKey {
        /// The offending key code
        key: u8,
    },
    /// Error originated in [std::io]
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    /// Error originated in [crossterm]
    ///
    /// Note: `crossterm::ErrorKind` is an alias for [std::io::Error], so the
    /// `From` conversion is provided by [Error::IoError]; this variant stays
    /// for explicit construction.
    #[error(transparent)]
    TerminalError(crossterm::ErrorKind),
}
