// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)
#![allow(clippy::bad_bit_mask)]
//! Contains the definition of a Chip-8 [Insn]

pub mod disassembler;

use imperative_rs::InstructionSet;
use std::fmt::Display;

#[allow(non_camel_case_types, non_snake_case, missing_docs)]
#[derive(Clone, Copy, Debug, InstructionSet, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
/// A decoded Chip-8 instruction, with its operand fields extracted
///
/// ```rust
/// # use chip8_interp::*;
/// use imperative_rs::InstructionSet;
/// let (len, insn) = Insn::decode(&[0x8a, 0xb4]).unwrap();
/// assert_eq!(2, len);
/// assert_eq!(Insn::add { x: 0xa, y: 0xb }, insn);
/// ```
pub enum Insn {
    /// | 00e0 | Turns every pixel off
    #[opcode = "0x00e0"]
    cls,
    /// | 00ee | Pops the return address into pc
    #[opcode = "0x00ee"]
    ret,
    /// | 1aaa | pc = a
    #[opcode = "0x1AAA"]
    jmp { A: u16 },
    /// | 2aaa | Pushes pc, then pc = a
    #[opcode = "0x2AAA"]
    call { A: u16 },
    /// | 3xbb | Skip if vX == b
    #[opcode = "0x3xBB"]
    seb { B: u8, x: usize },
    /// | 4xbb | Skip if vX != b
    #[opcode = "0x4xBB"]
    sneb { B: u8, x: usize },
    /// | 5xy0 | Skip if vX == vY
    #[opcode = "0x5xy0"]
    se { y: usize, x: usize },
    /// | 6xbb | vX = b
    #[opcode = "0x6xBB"]
    movb { B: u8, x: usize },
    /// | 7xbb | vX += b, vF untouched
    #[opcode = "0x7xBB"]
    addb { B: u8, x: usize },
    /// | 8xy0 | vX = vY
    #[opcode = "0x8xy0"]
    mov { x: usize, y: usize },
    /// | 8xy1 | vX |= vY
    #[opcode = "0x8xy1"]
    or { y: usize, x: usize },
    /// | 8xy2 | vX &= vY
    #[opcode = "0x8xy2"]
    and { y: usize, x: usize },
    /// | 8xy3 | vX ^= vY
    #[opcode = "0x8xy3"]
    xor { y: usize, x: usize },
    /// | 8xy4 | vX += vY, vF = carry
    #[opcode = "0x8xy4"]
    add { y: usize, x: usize },
    /// | 8xy5 | vX -= vY, vF = !borrow
    #[opcode = "0x8xy5"]
    sub { y: usize, x: usize },
    /// | 8xy6 | vX >>= 1, vF = shifted-out bit
    #[opcode = "0x8xy6"]
    shr { y: usize, x: usize },
    /// | 8xy7 | vX = vY - vX, vF = !borrow
    #[opcode = "0x8xy7"]
    bsub { y: usize, x: usize },
    /// | 8xyE | vX <<= 1, vF = shifted-out bit
    #[opcode = "0x8xye"]
    shl { y: usize, x: usize },
    /// | 9xy0 | Skip if vX != vY
    #[opcode = "0x9xy0"]
    sne { y: usize, x: usize },
    /// | Aaaa | I = a
    #[opcode = "0xaAAA"]
    movI { A: u16 },
    /// | Baaa | pc = a + v0
    #[opcode = "0xbAAA"]
    jmpr { A: u16 },
    /// | Cxbb | vX = random & b
    #[opcode = "0xcxBB"]
    rand { B: u8, x: usize },
    /// | Dxyn | XOR an n-row sprite at (vX, vY), vF = collision
    #[opcode = "0xdxyn"]
    draw { y: usize, x: usize, n: u8 },
    /// | Ex9E | Skip if key vX is held
    #[opcode = "0xex9e"]
    sek { x: usize },
    /// | ExA1 | Skip if key vX is not held
    #[opcode = "0xexa1"]
    snek { x: usize },
    /// | Fx07 | vX = DT
    #[opcode = "0xfx07"]
    getdt { x: usize },
    /// | Fx0A | Suspend until a key is pressed, vX = key
    #[opcode = "0xfx0a"]
    waitk { x: usize },
    /// | Fx15 | DT = vX
    #[opcode = "0xfx15"]
    setdt { x: usize },
    /// | Fx18 | ST = vX
    #[opcode = "0xfx18"]
    movst { x: usize },
    /// | Fx1E | I += vX, vF = I overflowed 0xfff
    #[opcode = "0xfx1e"]
    addI { x: usize },
    /// | Fx29 | I = address of glyph vX
    #[opcode = "0xfx29"]
    font { x: usize },
    /// | Fx33 | BCD convert vX into I[0..3]
    #[opcode = "0xfx33"]
    bcd { x: usize },
    /// | Fx55 | Store v0..=vX at I
    #[opcode = "0xfx55"]
    dmao { x: usize },
    /// | Fx65 | Load v0..=vX from I
    #[opcode = "0xfx65"]
    dmai { x: usize },
}

impl Display for Insn {
    /// Formats the instruction in Cowgod's mnemonic syntax (destination first)
    #[rustfmt::skip]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Insn::cls               => write!(f, "cls"),
            Insn::ret               => write!(f, "ret"),
            Insn::jmp { A }         => write!(f, "jp     {A:03x}"),
            Insn::call { A }        => write!(f, "call   {A:03x}"),
            Insn::seb { B, x }      => write!(f, "se     v{x:X}, #{B:02x}"),
            Insn::sneb { B, x }     => write!(f, "sne    v{x:X}, #{B:02x}"),
            Insn::se { y, x }       => write!(f, "se     v{x:X}, v{y:X}"),
            Insn::movb { B, x }     => write!(f, "ld     v{x:X}, #{B:02x}"),
            Insn::addb { B, x }     => write!(f, "add    v{x:X}, #{B:02x}"),
            Insn::mov { x, y }      => write!(f, "ld     v{x:X}, v{y:X}"),
            Insn::or { y, x }       => write!(f, "or     v{x:X}, v{y:X}"),
            Insn::and { y, x }      => write!(f, "and    v{x:X}, v{y:X}"),
            Insn::xor { y, x }      => write!(f, "xor    v{x:X}, v{y:X}"),
            Insn::add { y, x }      => write!(f, "add    v{x:X}, v{y:X}"),
            Insn::sub { y, x }      => write!(f, "sub    v{x:X}, v{y:X}"),
            Insn::shr { y, x }      => write!(f, "shr    v{x:X}, v{y:X}"),
            Insn::bsub { y, x }     => write!(f, "subn   v{x:X}, v{y:X}"),
            Insn::shl { y, x }      => write!(f, "shl    v{x:X}, v{y:X}"),
            Insn::sne { y, x }      => write!(f, "sne    v{x:X}, v{y:X}"),
            Insn::movI { A }        => write!(f, "ld     I, {A:03x}"),
            Insn::jmpr { A }        => write!(f, "jp     v0, {A:03x}"),
            Insn::rand { B, x }     => write!(f, "rnd    v{x:X}, #{B:02x}"),
            Insn::draw { y, x, n }  => write!(f, "drw    v{x:X}, v{y:X}, {n:x}"),
            Insn::sek { x }         => write!(f, "skp    v{x:X}"),
            Insn::snek { x }        => write!(f, "sknp   v{x:X}"),
            Insn::getdt { x }       => write!(f, "ld     v{x:X}, DT"),
            Insn::waitk { x }       => write!(f, "ld     v{x:X}, K"),
            Insn::setdt { x }       => write!(f, "ld     DT, v{x:X}"),
            Insn::movst { x }       => write!(f, "ld     ST, v{x:X}"),
            Insn::addI { x }        => write!(f, "add    I, v{x:X}"),
            Insn::font { x }        => write!(f, "ld     F, v{x:X}"),
            Insn::bcd { x }         => write!(f, "ld     B, v{x:X}"),
            Insn::dmao { x }        => write!(f, "ld     [I], v{x:X}"),
            Insn::dmai { x }        => write!(f, "ld     v{x:X}, [I]"),
        }
    }
}
