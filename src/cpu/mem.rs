// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)

//! The Mem represents the CPU's memory
//!
//! Contains some handy utils for reading and writing

use std::{
    fmt::{Debug, Formatter},
    ops::Range,
    slice::SliceIndex,
};

/// Size of addressable memory, in bytes
pub const MEM_SIZE: usize = 0x1000;

/// The built-in hexadecimal font: 16 glyphs, 5 bytes each
#[rustfmt::skip]
pub const CHARSET: [u8; 80] = [
    0xf0, 0x90, 0x90, 0x90, 0xf0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xf0, 0x10, 0xf0, 0x80, 0xf0, // 2
    0xf0, 0x10, 0xf0, 0x10, 0xf0, // 3
    0x90, 0x90, 0xf0, 0x10, 0x10, // 4
    0xf0, 0x80, 0xf0, 0x10, 0xf0, // 5
    0xf0, 0x80, 0xf0, 0x90, 0xf0, // 6
    0xf0, 0x10, 0x20, 0x40, 0x40, // 7
    0xf0, 0x90, 0xf0, 0x90, 0xf0, // 8
    0xf0, 0x90, 0xf0, 0x10, 0xf0, // 9
    0xf0, 0x90, 0xf0, 0x90, 0x90, // A
    0xe0, 0x90, 0xe0, 0x90, 0xe0, // B
    0xf0, 0x80, 0x80, 0x80, 0xf0, // C
    0xe0, 0x90, 0x90, 0x90, 0xe0, // D
    0xf0, 0x80, 0xf0, 0x80, 0xf0, // E
    0xf0, 0x80, 0xf0, 0x80, 0x80, // F
];

/// Represents a named region in memory
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Region {
    /// Program memory, from `0x200` to the end of memory
    Program,
}

impl Region {
    /// The address range this region covers
    pub fn range(self) -> Range<usize> {
        match self {
            Region::Program => 0x200..MEM_SIZE,
        }
    }
}

/// 4 KiB of flat, byte-addressed memory. Nothing is write-protected.
#[derive(Clone, PartialEq, Eq)]
pub struct Mem {
    memory: [u8; MEM_SIZE],
}

impl Mem {
    /// Constructs a zeroed memory
    /// # Examples
    /// ```rust
    /// # use chip8_interp::*;
    /// let mem = Mem::new();
    /// assert_eq!(0x1000, mem.len());
    /// assert!(mem.as_slice().iter().all(|&b| b == 0));
    /// ```
    pub fn new() -> Self {
        Mem::default()
    }

    /// Gets the length of the backing memory
    pub fn len(&self) -> usize {
        self.memory.len()
    }

    /// Memory is never empty; this exists to satisfy `len_without_is_empty`
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Zeroes all of memory
    pub fn clear(&mut self) -> &mut Self {
        self.memory.fill(0);
        self
    }

    /// Copies the [CHARSET] into memory, starting at `base`.
    ///
    /// Returns [None] if the font wouldn't fit.
    pub fn load_charset(&mut self, base: usize) -> Option<&mut Self> {
        self.memory
            .get_mut(base..base.checked_add(CHARSET.len())?)?
            .copy_from_slice(&CHARSET);
        Some(self)
    }

    /// Loads data into the start of a named [Region].
    ///
    /// Returns [None] if the data is longer than the region.
    /// # Examples
    /// ```rust
    /// # use chip8_interp::*;
    /// let mut mem = Mem::new();
    /// mem.load_region(Region::Program, b"Hello, world!").unwrap();
    /// assert_eq!(Some(b"Hello".as_slice()), mem.get(0x200..0x205));
    /// assert!(mem.load_region(Region::Program, &[0; 0xe01]).is_none());
    /// ```
    pub fn load_region(&mut self, name: Region, data: &[u8]) -> Option<&mut Self> {
        let region = name.range();
        if data.len() > region.len() {
            return None;
        }
        self.memory[region.start..region.start + data.len()].copy_from_slice(data);
        Some(self)
    }

    /// Gets a slice of a named [Region] of memory
    pub fn get_region(&self, name: Region) -> &[u8] {
        &self.memory[name.range()]
    }

    /// Gets a byte or slice of memory, or [None] if out of bounds
    #[inline(always)]
    pub fn get<I>(&self, index: I) -> Option<&<I as SliceIndex<[u8]>>::Output>
    where
        I: SliceIndex<[u8]>,
    {
        self.memory.get(index)
    }

    /// Gets a mutable byte or slice of memory, or [None] if out of bounds
    #[inline(always)]
    pub fn get_mut<I>(&mut self, index: I) -> Option<&mut <I as SliceIndex<[u8]>>::Output>
    where
        I: SliceIndex<[u8]>,
    {
        self.memory.get_mut(index)
    }

    /// Reads a big-endian word at `addr`, or [None] if either byte is out of bounds
    /// # Examples
    /// ```rust
    /// # use chip8_interp::*;
    /// let mut mem = Mem::new();
    /// mem.load_region(Region::Program, &[0x12, 0x34]).unwrap();
    /// assert_eq!(Some(0x1234), mem.read_word(0x200));
    /// assert_eq!(None, mem.read_word(0xfff));
    /// ```
    pub fn read_word(&self, addr: usize) -> Option<u16> {
        let bytes = self.memory.get(addr..addr.checked_add(2)?)?;
        Some(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    /// Views all of memory
    pub fn as_slice(&self) -> &[u8] {
        &self.memory
    }

    /// Mutably views all of memory
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.memory
    }
}

impl Default for Mem {
    fn default() -> Self {
        Mem {
            memory: [0; MEM_SIZE],
        }
    }
}

impl Debug for Mem {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mem")
            .field("len", &self.memory.len())
            .field("used", &self.memory.iter().filter(|&&b| b != 0).count())
            .finish()
    }
}
