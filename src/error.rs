// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)

//! Error type for the interpreter

use thiserror::Error;

/// Result type, equivalent to [std::result::Result]<T, [enum@Error]>
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the interpreter.
///
/// Every variant is terminal for the current run. Faults raised while
/// executing carry the address the instruction was fetched from.
#[derive(Debug, Error)]
pub enum Error {
    /// The program image does not fit in program space
    #[error("program of {len} bytes does not fit in {max} bytes of program space", max = crate::cpu::PROGRAM_SPACE)]
    InvalidProgram {
        /// Length of the rejected image
        len: usize,
    },
    /// The font would not fit below program space
    #[error("font at {addr:03x} would overlap program space")]
    InvalidFont {
        /// The requested font location
        addr: u16,
    },
    /// Tried to read or write memory outside `0..0x1000`
    #[error("address {addr:04x} is out of bounds (pc {pc:03x})")]
    MemoryOutOfBounds {
        /// The offending address
        addr: usize,
        /// Address of the faulting instruction
        pc: u16,
    },
    /// Called a subroutine with a full stack
    #[error("stack overflow: {word:04x} at {pc:03x}")]
    StackOverflow {
        /// The offending word
        word: u16,
        /// Address of the faulting instruction
        pc: u16,
    },
    /// Returned from a subroutine with an empty stack
    #[error("stack underflow: {word:04x} at {pc:03x}")]
    StackUnderflow {
        /// The offending word
        word: u16,
        /// Address of the faulting instruction
        pc: u16,
    },
    /// Represents an unimplemented operation
    #[error("opcode {word:04x} not recognized at {pc:03x}")]
    UnknownOpcode {
        /// The offending word
        word: u16,
        /// Address of the faulting instruction
        pc: u16,
    },
    /// Tried to press a key that doesn't exist
    #[error("tried to press key {key:X} which does not exist")]
    InvalidKey {
        /// The offending key
        key: usize,
    },
    /// Tried to get/set an out-of-bounds register
    #[error("tried to access register v{reg:X} which does not exist")]
    InvalidRegister {
        /// The offending register
        reg: usize,
    },
    /// Tried to convert string into mode, but it did not match.
    #[error("no suitable conversion of \"{mode}\" into Mode")]
    InvalidMode {
        /// The string which failed to become a mode
        mode: String,
    },
    /// A thread panicked while holding the interpreter lock
    #[error("interpreter lock poisoned by a panicking thread")]
    Poisoned,
    /// Error originated in [std::io]
    #[error(transparent)]
    IoError(#[from] std::io::Error),
}
