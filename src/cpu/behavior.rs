// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)

//! Contains implementations for each Chip-8 [Insn]
//!
//! Each instruction runs after `pc` has already moved past it.

use super::*;
use crate::screen::{HEIGHT, WIDTH};
use rand::random;

impl CPU {
    /// Executes a single [Insn]
    #[rustfmt::skip]
    #[inline(always)]
    pub(super) fn execute(&mut self, instruction: Insn) -> Result<()> {
        match instruction {
            Insn::cls               => self.clear_screen(),
            Insn::ret               => self.ret()?,
            Insn::jmp   {       A } => self.jump(A),
            Insn::call  {       A } => self.call(A)?,
            Insn::seb   {    x, B } => self.skip_equals_immediate(x, B),
            Insn::sneb  {    x, B } => self.skip_not_equals_immediate(x, B),
            Insn::se    { y, x    } => self.skip_equals(x, y),
            Insn::movb  {    x, B } => self.load_immediate(x, B),
            Insn::addb  {    x, B } => self.add_immediate(x, B),
            Insn::mov   { y, x    } => self.load(x, y),
            Insn::or    { y, x    } => self.or(x, y),
            Insn::and   { y, x    } => self.and(x, y),
            Insn::xor   { y, x    } => self.xor(x, y),
            Insn::add   { y, x    } => self.add(x, y),
            Insn::sub   { y, x    } => self.sub(x, y),
            Insn::shr   { y, x    } => self.shift_right(x, y),
            Insn::bsub  { y, x    } => self.backwards_sub(x, y),
            Insn::shl   { y, x    } => self.shift_left(x, y),
            Insn::sne   { y, x    } => self.skip_not_equals(x, y),
            Insn::movI  {       A } => self.load_i_immediate(A),
            Insn::jmpr  {       A } => self.jump_indexed(A),
            Insn::rand  {    x, B } => self.rand(x, B),
            Insn::draw  { y, x, n } => self.draw(x, y, n)?,
            Insn::sek   {    x    } => self.skip_key_equals(x),
            Insn::snek  {    x    } => self.skip_key_not_equals(x),
            Insn::getdt {    x    } => self.load_delay_timer(x),
            Insn::waitk {    x    } => self.wait_for_key(x),
            Insn::setdt {    x    } => self.store_delay_timer(x),
            Insn::movst {    x    } => self.store_sound_timer(x),
            Insn::addI  {    x    } => self.add_i(x),
            Insn::font  {    x    } => self.load_sprite(x),
            Insn::bcd   {    x    } => self.bcd_convert(x)?,
            Insn::dmao  {    x    } => self.store_dma(x)?,
            Insn::dmai  {    x    } => self.load_dma(x)?,
        }
        Ok(())
    }

    /// Builds a [Error::MemoryOutOfBounds] for the current instruction
    fn out_of_bounds(&self, addr: usize) -> Error {
        Error::MemoryOutOfBounds {
            addr,
            pc: self.current.0,
        }
    }

    /// Gets `len` bytes of memory at I, or faults on the first out-of-bounds address
    fn at_i(&self, len: usize) -> Result<std::ops::Range<usize>> {
        if len == 0 {
            return Ok(0..0);
        }
        let start = self.i as usize;
        if start + len > mem::MEM_SIZE {
            return Err(self.out_of_bounds(start.max(mem::MEM_SIZE)));
        }
        Ok(start..start + len)
    }
}

/// |opcode| effect                             |
/// |------|------------------------------------|
/// |`00e0`| Clear screen memory to all 0       |
/// |`00ee`| Return from subroutine             |
impl CPU {
    /// |`00e0`| Clears the screen memory to 0
    #[inline(always)]
    pub(super) fn clear_screen(&mut self) {
        self.screen.clear();
        self.draw = true;
    }
    /// |`00ee`| Returns from subroutine
    ///
    /// Faults with [Error::StackUnderflow] if there's nowhere to return to
    #[inline(always)]
    pub(super) fn ret(&mut self) -> Result<()> {
        let (pc, word) = self.current;
        self.pc = self
            .stack
            .pop()
            .ok_or(Error::StackUnderflow { word, pc })?;
        Ok(())
    }
}

/// |`1aaa`| Sets pc to an absolute address
impl CPU {
    /// |`1aaa`| Sets the program counter to an absolute address
    #[inline(always)]
    pub(super) fn jump(&mut self, a: Adr) {
        self.pc = a;
    }
}

/// |`2aaa`| Pushes pc onto the stack, then jumps to a
impl CPU {
    /// |`2aaa`| Pushes pc onto the stack, then jumps to a
    ///
    /// Faults with [Error::StackOverflow] if the stack already holds [STACK_DEPTH] addresses
    #[inline(always)]
    pub(super) fn call(&mut self, a: Adr) -> Result<()> {
        if self.stack.len() >= STACK_DEPTH {
            let (pc, word) = self.current;
            return Err(Error::StackOverflow { word, pc });
        }
        self.stack.push(self.pc);
        self.pc = a;
        Ok(())
    }
}

/// |`3xbb`| Skips next instruction if register X == b
impl CPU {
    /// |`3xbb`| Skips the next instruction if register X == b
    #[inline(always)]
    pub(super) fn skip_equals_immediate(&mut self, x: Reg, b: u8) {
        if self.v[x] == b {
            self.pc = self.pc.wrapping_add(2);
        }
    }
}

/// |`4xbb`| Skips next instruction if register X != b
impl CPU {
    /// |`4xbb`| Skips the next instruction if register X != b
    #[inline(always)]
    pub(super) fn skip_not_equals_immediate(&mut self, x: Reg, b: u8) {
        if self.v[x] != b {
            self.pc = self.pc.wrapping_add(2);
        }
    }
}

/// |`5xy0`| Skip next instruction if vX == vY
impl CPU {
    /// |`5xy0`| Skips the next instruction if register X == register Y
    #[inline(always)]
    pub(super) fn skip_equals(&mut self, x: Reg, y: Reg) {
        if self.v[x] == self.v[y] {
            self.pc = self.pc.wrapping_add(2);
        }
    }
}

/// |`6xbb`| Loads immediate byte b into register vX
impl CPU {
    /// |`6xbb`| Loads immediate byte b into register vX
    #[inline(always)]
    pub(super) fn load_immediate(&mut self, x: Reg, b: u8) {
        self.v[x] = b;
    }
}

/// |`7xbb`| Adds immediate byte b to register vX
impl CPU {
    /// |`7xbb`| Adds immediate byte b to register vX, without touching vF
    #[inline(always)]
    pub(super) fn add_immediate(&mut self, x: Reg, b: u8) {
        self.v[x] = self.v[x].wrapping_add(b);
    }
}

/// |`8xyn`| Performs ALU operation
///
/// `8xy4` writes vF last, so when X is F only the carry survives.
/// `8xy5`, `8xy6`, `8xy7` and `8xyE` write vF first and then compute X from
/// the registers as they stand, so when X is F the result overwrites the flag.
/// See [Quirks::vf_last](super::quirks::Quirks) for the flag-wins ordering.
///
/// |opcode| effect                             |
/// |------|------------------------------------|
/// |`8xy0`| X = Y                              |
/// |`8xy1`| X = X | Y                          |
/// |`8xy2`| X = X & Y                          |
/// |`8xy3`| X = X ^ Y                          |
/// |`8xy4`| X = X + Y; Set vF=carry            |
/// |`8xy5`| X = X - Y; Set vF=!borrow          |
/// |`8xy6`| X = X >> 1; Set vF=X & 1           |
/// |`8xy7`| X = Y - X; Set vF=!borrow          |
/// |`8xyE`| X = X << 1; Set vF=X >> 7          |
impl CPU {
    /// |`8xy0`| Loads the value of y into x
    #[inline(always)]
    pub(super) fn load(&mut self, x: Reg, y: Reg) {
        self.v[x] = self.v[y];
    }
    /// |`8xy1`| Performs bitwise or of vX and vY, and stores the result in vX
    ///
    /// # Quirk
    /// The Cosmac VIP clobbers vF for any logic instruction. See [Quirks::vf_reset](super::quirks::Quirks)
    #[inline(always)]
    pub(super) fn or(&mut self, x: Reg, y: Reg) {
        self.v[x] |= self.v[y];
        if self.flags.quirks.vf_reset {
            self.v[0xf] = 0;
        }
    }
    /// |`8xy2`| Performs bitwise and of vX and vY, and stores the result in vX
    ///
    /// # Quirk
    /// The Cosmac VIP clobbers vF for any logic instruction
    #[inline(always)]
    pub(super) fn and(&mut self, x: Reg, y: Reg) {
        self.v[x] &= self.v[y];
        if self.flags.quirks.vf_reset {
            self.v[0xf] = 0;
        }
    }
    /// |`8xy3`| Performs bitwise xor of vX and vY, and stores the result in vX
    ///
    /// # Quirk
    /// The Cosmac VIP clobbers vF for any logic instruction
    #[inline(always)]
    pub(super) fn xor(&mut self, x: Reg, y: Reg) {
        self.v[x] ^= self.v[y];
        if self.flags.quirks.vf_reset {
            self.v[0xf] = 0;
        }
    }
    /// |`8xy4`| Performs addition of vX and vY, and stores the result in vX.
    /// vF is 1 on carry.
    #[inline(always)]
    pub(super) fn add(&mut self, x: Reg, y: Reg) {
        let carry;
        (self.v[x], carry) = self.v[x].overflowing_add(self.v[y]);
        self.v[0xf] = carry.into();
    }
    /// |`8xy5`| Performs subtraction of vX and vY, and stores the result in vX.
    /// vF is 0 on borrow (vY > vX), 1 otherwise.
    #[inline(always)]
    pub(super) fn sub(&mut self, x: Reg, y: Reg) {
        let no_borrow = self.v[y] <= self.v[x];
        self.write_flagged(x, no_borrow, |v| v[x].wrapping_sub(v[y]));
    }
    /// |`8xy6`| Performs bitwise right shift of vX. vF is the bit shifted out.
    ///
    /// # Quirk
    /// On the Cosmac VIP, this shifts vY and stores the result in vX
    #[inline(always)]
    pub(super) fn shift_right(&mut self, x: Reg, y: Reg) {
        let src: Reg = if self.flags.quirks.shift_vy { y } else { x };
        let shift_out = self.v[src] & 1 == 1;
        self.write_flagged(x, shift_out, |v| v[src] >> 1);
    }
    /// |`8xy7`| Performs subtraction of vY and vX, and stores the result in vX.
    /// vF is 0 on borrow (vX > vY), 1 otherwise.
    #[inline(always)]
    pub(super) fn backwards_sub(&mut self, x: Reg, y: Reg) {
        let no_borrow = self.v[x] <= self.v[y];
        self.write_flagged(x, no_borrow, |v| v[y].wrapping_sub(v[x]));
    }
    /// |`8xyE`| Performs bitwise left shift of vX. vF is the bit shifted out.
    ///
    /// # Quirk
    /// On the Cosmac VIP, this shifts vY and stores the result in vX
    #[inline(always)]
    pub(super) fn shift_left(&mut self, x: Reg, y: Reg) {
        let src: Reg = if self.flags.quirks.shift_vy { y } else { x };
        let shift_out = self.v[src] >> 7 == 1;
        self.write_flagged(x, shift_out, |v| v[src] << 1);
    }
    /// Stores `flag` in vF and `result(v)` in vX.
    ///
    /// By default vF is written first, and `result` sees the new flag.
    /// With [Quirks::vf_last](super::quirks::Quirks), `result` sees the old
    /// registers and vF is written last.
    #[inline(always)]
    fn write_flagged(&mut self, x: Reg, flag: bool, result: impl FnOnce(&[u8; 16]) -> u8) {
        if self.flags.quirks.vf_last {
            self.v[x] = result(&self.v);
            self.v[0xf] = flag.into();
        } else {
            self.v[0xf] = flag.into();
            self.v[x] = result(&self.v);
        }
    }
}

/// |`9xy0`| Skip next instruction if vX != vY
impl CPU {
    /// |`9xy0`| Skip next instruction if X != y
    #[inline(always)]
    pub(super) fn skip_not_equals(&mut self, x: Reg, y: Reg) {
        if self.v[x] != self.v[y] {
            self.pc = self.pc.wrapping_add(2);
        }
    }
}

/// |`Aaaa`| Load address #a into register I
impl CPU {
    /// |`Aadr`| Load address #adr into register I
    #[inline(always)]
    pub(super) fn load_i_immediate(&mut self, a: Adr) {
        self.i = a;
    }
}

/// |`Baaa`| Jump to &adr + v0
impl CPU {
    /// |`Badr`| Jump to &adr + v0
    ///
    /// # Quirk
    /// On the Super-Chip, this jumps to &adr + vX, where X is the high nibble of adr
    #[inline(always)]
    pub(super) fn jump_indexed(&mut self, a: Adr) {
        let reg = if self.flags.quirks.jump_vx {
            a as usize >> 8
        } else {
            0
        };
        self.pc = a.wrapping_add(self.v[reg] as Adr);
    }
}

/// |`Cxbb`| Stores a random number & the provided byte into vX
impl CPU {
    /// |`Cxbb`| Stores a random number & the provided byte into vX
    #[inline(always)]
    pub(super) fn rand(&mut self, x: Reg, b: u8) {
        self.v[x] = random::<u8>() & b;
    }
}

/// |`Dxyn`| Draws n-byte sprite to the screen at coordinates (vX, vY)
impl CPU {
    /// |`Dxyn`| Draws n-byte sprite to the screen at coordinates (vX, vY)
    ///
    /// Sprite rows come from memory at I, leftmost pixel in the high bit.
    /// Every lit sprite pixel is XORed onto the screen, and vF is set if any
    /// pixel turns off. Pixels which land past the right or bottom edge are
    /// dropped.
    ///
    /// # Quirk
    /// With [Quirks::screen_wrap](super::quirks::Quirks), they wrap around instead.
    #[inline(always)]
    pub(super) fn draw(&mut self, x: Reg, y: Reg, n: Nib) -> Result<()> {
        let (x, y) = (self.v[x] as usize, self.v[y] as usize);
        let wrap = self.flags.quirks.screen_wrap;
        let sprite = self.at_i(n as usize)?;
        let mut collision = false;
        for (line, &row) in self.mem.as_slice()[sprite].iter().enumerate() {
            for (px, py) in (0..8)
                .filter(|bit| row & (0x80 >> bit) != 0)
                .filter_map(|bit| match (x + bit, y + line) {
                    (px, py) if wrap => Some((px % WIDTH, py % HEIGHT)),
                    (px, py) if px < WIDTH && py < HEIGHT => Some((px, py)),
                    _ => None,
                })
            {
                collision |= self.screen.toggle(px, py);
            }
        }
        self.v[0xf] = collision.into();
        if n > 0 {
            self.draw = true;
        }
        Ok(())
    }
}

/// |`Exbb`| Skips instruction on value of keypress
///
/// Keys above `F` are never held.
///
/// |opcode| effect                             |
/// |------|------------------------------------|
/// |`eX9e`| Skip next instruction if key vX is held     |
/// |`eXa1`| Skip next instruction if key vX is not held |
impl CPU {
    fn is_held(&self, x: Reg) -> bool {
        self.keys
            .get(self.v[x] as usize)
            .copied()
            .unwrap_or_default()
    }
    /// |`Ex9E`| Skip next instruction if key vX is held
    #[inline(always)]
    pub(super) fn skip_key_equals(&mut self, x: Reg) {
        if self.is_held(x) {
            self.pc = self.pc.wrapping_add(2);
        }
    }
    /// |`ExA1`| Skip next instruction if key vX is not held
    #[inline(always)]
    pub(super) fn skip_key_not_equals(&mut self, x: Reg) {
        if !self.is_held(x) {
            self.pc = self.pc.wrapping_add(2);
        }
    }
}

/// |`Fxbb`| Performs IO
///
/// |opcode| effect                             |
/// |------|------------------------------------|
/// |`fX07`| Set vX to value in delay timer     |
/// |`fX0a`| Wait for input, store key in vX    |
/// |`fX15`| Set delay timer to the value in vX |
/// |`fX18`| Set sound timer to the value in vX |
/// |`fX1e`| Add vX to I                        |
/// |`fX29`| Load sprite for character x into I |
/// |`fX33`| BCD convert X into I[0..3]         |
/// |`fX55`| DMA Stor from I to registers 0..=X |
/// |`fX65`| DMA Load from I to registers 0..=X |
impl CPU {
    /// |`Fx07`| Get the current DT, and put it in vX
    /// ```py
    /// vX = DT
    /// ```
    #[inline(always)]
    pub(super) fn load_delay_timer(&mut self, x: Reg) {
        self.v[x] = self.delay;
    }
    /// |`Fx0A`| Suspend until a key is pressed, then vX = K
    ///
    /// The key is delivered by [CPU::key_changed]
    #[inline(always)]
    pub(super) fn wait_for_key(&mut self, x: Reg) {
        self.state = RunState::AwaitingKey { reg: x };
    }
    /// |`Fx15`| Load vX into DT
    /// ```py
    /// DT = vX
    /// ```
    #[inline(always)]
    pub(super) fn store_delay_timer(&mut self, x: Reg) {
        self.delay = self.v[x];
    }
    /// |`Fx18`| Load vX into ST
    /// ```py
    /// ST = vX;
    /// ```
    #[inline(always)]
    pub(super) fn store_sound_timer(&mut self, x: Reg) {
        self.sound = self.v[x];
    }
    /// |`Fx1e`| Add vX to I, setting vF when I leaves the 12-bit address space
    /// ```py
    /// vF = I + vX > 0xfff
    /// I += vX;
    /// ```
    #[inline(always)]
    pub(super) fn add_i(&mut self, x: Reg) {
        let sum = self.i as u32 + self.v[x] as u32;
        self.v[0xf] = (sum > 0xfff).into();
        self.i = sum as Adr;
    }
    /// |`Fx29`| Load sprite for character x into I
    /// ```py
    /// I = font + vX * 5;
    /// ```
    #[inline(always)]
    pub(super) fn load_sprite(&mut self, x: Reg) {
        self.i = self.font.wrapping_add(5 * self.v[x] as Adr);
    }
    /// |`Fx33`| BCD convert X into I`[0..3]`
    #[inline(always)]
    pub(super) fn bcd_convert(&mut self, x: Reg) -> Result<()> {
        let x = self.v[x];
        let range = self.at_i(3)?;
        self.mem.as_mut_slice()[range].copy_from_slice(&[x / 100, x / 10 % 10, x % 10]);
        Ok(())
    }
    /// |`Fx55`| DMA Stor from I to registers 0..=X
    ///
    /// # Quirk
    /// The original chip-8 interpreter uses I to directly index memory,
    /// with the side effect of leaving I as I+X+1 after the transfer is done.
    /// Chip-48 leaves I alone.
    #[inline(always)]
    pub(super) fn store_dma(&mut self, x: Reg) -> Result<()> {
        let range = self.at_i(x + 1)?;
        self.mem.as_mut_slice()[range].copy_from_slice(&self.v[..=x]);
        if !self.flags.quirks.dma_hold_i {
            self.i = self.i.wrapping_add(x as Adr + 1);
        }
        Ok(())
    }
    /// |`Fx65`| DMA Load from I to registers 0..=X
    ///
    /// # Quirk
    /// The original chip-8 interpreter uses I to directly index memory,
    /// with the side effect of leaving I as I+X+1 after the transfer is done.
    /// Chip-48 leaves I alone.
    #[inline(always)]
    pub(super) fn load_dma(&mut self, x: Reg) -> Result<()> {
        let range = self.at_i(x + 1)?;
        self.v[..=x].copy_from_slice(&self.mem.as_slice()[range]);
        if !self.flags.quirks.dma_hold_i {
            self.i = self.i.wrapping_add(x as Adr + 1);
        }
        Ok(())
    }
}
