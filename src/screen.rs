// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)

//! Stores and displays the Chip-8's screen memory

use std::fmt::{Display, Formatter, Result};

/// Width of the screen, in pixels
pub const WIDTH: usize = 64;
/// Height of the screen, in pixels
pub const HEIGHT: usize = 32;

/// A 64x32 monochrome framebuffer.
///
/// Each row is packed into a [u64], with column 0 in the most significant bit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Screen {
    rows: [u64; HEIGHT],
}

impl Screen {
    /// Constructs a new, blank screen
    pub fn new() -> Self {
        Self::default()
    }

    /// Turns every pixel off
    pub fn clear(&mut self) {
        self.rows = [0; HEIGHT];
    }

    /// Gets the pixel at (x, y). Off-screen pixels are always off.
    /// # Examples
    /// ```rust
    /// # use chip8_interp::*;
    /// let mut screen = Screen::new();
    /// screen.toggle(3, 4);
    /// assert!(screen.get(3, 4));
    /// assert!(!screen.get(4, 3));
    /// assert!(!screen.get(64, 0));
    /// ```
    pub fn get(&self, x: usize, y: usize) -> bool {
        x < WIDTH && y < HEIGHT && self.rows[y] & Self::mask(x) != 0
    }

    /// XORs a single pixel, returning whether it was on beforehand.
    ///
    /// Off-screen coordinates are ignored, and report `false`.
    /// # Examples
    /// ```rust
    /// # use chip8_interp::*;
    /// let mut screen = Screen::new();
    /// assert!(!screen.toggle(63, 31));
    /// assert!(screen.toggle(63, 31));
    /// assert!(!screen.get(63, 31));
    /// ```
    pub fn toggle(&mut self, x: usize, y: usize) -> bool {
        if x >= WIDTH || y >= HEIGHT {
            return false;
        }
        let was_on = self.get(x, y);
        self.rows[y] ^= Self::mask(x);
        was_on
    }

    /// Gets the packed rows of the screen, top to bottom
    pub fn rows(&self) -> &[u64; HEIGHT] {
        &self.rows
    }

    /// Returns true if no pixel is on
    pub fn is_blank(&self) -> bool {
        self.rows.iter().all(|&row| row == 0)
    }

    /// Counts the pixels which are on
    pub fn lit(&self) -> usize {
        self.rows.iter().map(|row| row.count_ones() as usize).sum()
    }

    /// Packs the screen into 256 bytes, row-major, leftmost pixel in the high bit
    pub fn to_bytes(&self) -> Vec<u8> {
        self.rows.iter().flat_map(|row| row.to_be_bytes()).collect()
    }

    /// Prints the screen to stdout, using braille characters when `drawille` is enabled
    pub fn print_screen(&self) {
        #[cfg(feature = "drawille")]
        {
            use drawille::Canvas;
            let mut canvas = Canvas::new(WIDTH as u32, HEIGHT as u32);
            for y in 0..HEIGHT {
                for x in (0..WIDTH).filter(|&x| self.get(x, y)) {
                    canvas.set(x as u32, y as u32);
                }
            }
            println!("{}", canvas.frame());
        }
        #[cfg(not(feature = "drawille"))]
        print!("{self}");
    }

    #[inline(always)]
    fn mask(x: usize) -> u64 {
        0x8000_0000_0000_0000 >> x
    }
}

impl From<&[u8]> for Screen {
    /// Unpacks a screen from the format produced by [Screen::to_bytes].
    /// Missing bytes are treated as blank.
    fn from(value: &[u8]) -> Self {
        let mut screen = Screen::new();
        for (row, chunk) in screen.rows.iter_mut().zip(value.chunks(8)) {
            let mut bytes = [0u8; 8];
            bytes[..chunk.len()].copy_from_slice(chunk);
            *row = u64::from_be_bytes(bytes);
        }
        screen
    }
}

impl Display for Screen {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        for (y, row) in self.rows.iter().enumerate() {
            writeln!(
                f,
                "{y:02}|{}|",
                format!("{row:064b}").replace('0', " ").replace('1', "█")
            )?;
        }
        Ok(())
    }
}
