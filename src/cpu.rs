// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)

//! Decodes and runs instructions

#[cfg(test)]
mod tests;

pub mod behavior;
pub mod flags;
pub mod instruction;
pub mod mem;
pub mod mode;
pub mod quirks;

use self::{
    flags::Flags,
    instruction::{
        disassembler::{Dis, Disassembler},
        Insn,
    },
    mem::{Mem, Region, CHARSET},
    mode::Mode,
    quirks::Quirks,
};
use crate::{
    error::{Error, Result},
    screen::Screen,
};
use imperative_rs::InstructionSet;
use owo_colors::OwoColorize;

type Reg = usize;
type Adr = u16;
type Nib = u8;

/// Address programs are loaded at, and execution starts from
pub const PROGRAM_START: Adr = 0x200;
/// Number of bytes available to a program image
pub const PROGRAM_SPACE: usize = mem::MEM_SIZE - PROGRAM_START as usize;
/// Default location of the built-in font
pub const FONT_BASE: Adr = 0x000;
/// Maximum number of nested subroutine calls
pub const STACK_DEPTH: usize = 16;

/// Whether the CPU is executing, or suspended on `Fx0A`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RunState {
    /// Each [CPU::tick] executes one instruction
    #[default]
    Running,
    /// [CPU::tick] does nothing until a key is pressed, which is stored in `v[reg]`
    AwaitingKey {
        /// The register which receives the key
        reg: Reg,
    },
}

/// Represents the internal state of the CPU interpreter
#[derive(Clone, Debug, PartialEq)]
pub struct CPU {
    /// Flags that control how the CPU behaves, but which aren't inherent to the
    /// chip-8. Includes [Quirks] and the debug trace switch.
    pub flags: Flags,
    // memory map info
    font: Adr,
    // memory
    mem: Mem,
    screen: Screen,
    stack: Vec<Adr>,
    // registers
    pc: Adr,
    i: Adr,
    v: [u8; 16],
    delay: u8,
    sound: u8,
    // I/O
    keys: [bool; 16],
    draw: bool,
    // Execution data
    state: RunState,
    cycle: usize,
    /// Address and word of the instruction being executed, for fault reports
    current: (Adr, u16),
    disassembler: Dis,
}

// public interface
impl CPU {
    /// Constructs a new CPU, taking all configurable parameters
    ///
    /// Fails with [Error::InvalidFont] if the font would not fit below program space.
    /// # Examples
    /// ```rust
    /// # use chip8_interp::*;
    /// let cpu = CPU::new(
    ///     0x50,   // font location
    ///     Dis::default(),
    ///     Flags::default(),
    /// ).unwrap();
    /// assert_eq!(0x50, cpu.font());
    /// assert!(CPU::new(0x1c0, Dis::default(), Flags::default()).is_err());
    /// ```
    pub fn new(font: Adr, disassembler: Dis, flags: Flags) -> Result<Self> {
        if font as usize + CHARSET.len() > PROGRAM_START as usize {
            return Err(Error::InvalidFont { addr: font });
        }
        let mut cpu = CPU {
            disassembler,
            font,
            flags,
            ..Default::default()
        };
        cpu.load_program(&[])?;
        Ok(cpu)
    }

    /// Loads bytes into the CPU's program space, and resets all other state.
    ///
    /// Fails with [Error::InvalidProgram] if the program is longer than [PROGRAM_SPACE].
    /// # Examples
    /// ```rust
    /// # use chip8_interp::*;
    /// let mut cpu = CPU::default();
    /// cpu.load_program(&[0x60, 0x2a]).unwrap();
    /// assert_eq!(0x200, cpu.pc());
    /// assert_eq!(0, cpu.sp());
    /// assert!(cpu.load_program(&[0; 0xe01]).is_err());
    /// ```
    pub fn load_program(&mut self, rom: &[u8]) -> Result<&mut Self> {
        if rom.len() > PROGRAM_SPACE {
            return Err(Error::InvalidProgram { len: rom.len() });
        }
        self.reset();
        self.mem
            .clear()
            .load_charset(self.font as usize)
            .ok_or(Error::InvalidFont { addr: self.font })?
            .load_region(Region::Program, rom)
            .ok_or(Error::InvalidProgram { len: rom.len() })?;
        Ok(self)
    }

    /// Changes the state of a key, and reports whether it changed.
    /// If key does not exist, returns [Error::InvalidKey].
    ///
    /// While suspended on `Fx0A`, a press (not a release) stores the key
    /// and resumes execution.
    /// # Examples
    /// ```rust
    /// # use chip8_interp::*;
    /// let mut cpu = CPU::default();
    /// assert!(cpu.key_changed(0x7, true).unwrap());
    /// assert!(!cpu.key_changed(0x7, true).unwrap());
    /// assert!(cpu.keys()[0x7]);
    /// assert!(cpu.key_changed(0x10, true).is_err());
    /// ```
    pub fn key_changed(&mut self, key: usize, pressed: bool) -> Result<bool> {
        let keyref = self.keys.get_mut(key).ok_or(Error::InvalidKey { key })?;
        let changed = *keyref != pressed;
        *keyref = pressed;
        if let (true, RunState::AwaitingKey { reg }) = (pressed, self.state) {
            self.set_v(reg, key as u8)?;
            self.state = RunState::Running;
        }
        Ok(changed)
    }

    /// Presses a key, and reports whether the key's state changed.
    ///
    /// See [CPU::key_changed]
    pub fn press(&mut self, key: usize) -> Result<bool> {
        self.key_changed(key, true)
    }

    /// Releases a key, and reports whether the key's state changed.
    ///
    /// See [CPU::key_changed]
    pub fn release(&mut self, key: usize) -> Result<bool> {
        self.key_changed(key, false)
    }

    /// Counts both timers down by one, stopping at zero.
    ///
    /// Meant to be called at 60 Hz. Returns `true` when the sound timer
    /// was at 1, meaning this decrement ends a tone and a beep is due.
    /// # Examples
    /// ```rust
    /// # use chip8_interp::*;
    /// let mut cpu = CPU::default();
    /// cpu.load_program(&[0x60, 0x02, 0xf0, 0x18]).unwrap();
    /// cpu.tick().unwrap().tick().unwrap();
    /// assert_eq!(2, cpu.sound());
    /// assert!(!cpu.decrement_timers());
    /// assert!(cpu.decrement_timers());
    /// assert!(!cpu.decrement_timers());
    /// assert_eq!(0, cpu.sound());
    /// ```
    pub fn decrement_timers(&mut self) -> bool {
        let beep = self.sound == 1;
        self.delay = self.delay.saturating_sub(1);
        self.sound = self.sound.saturating_sub(1);
        beep
    }

    /// Sets a general purpose register in the CPU.
    /// If the register doesn't exist, returns [Error::InvalidRegister]
    /// # Examples
    /// ```rust
    /// # use chip8_interp::*;
    /// // Create a new CPU, and set v4 to 0x41
    /// let mut cpu = CPU::default();
    /// cpu.set_v(0x4, 0x41).unwrap();
    /// assert_eq!(0x41, cpu.v()[4]);
    /// assert!(cpu.set_v(0x10, 0).is_err());
    /// ```
    pub fn set_v(&mut self, reg: Reg, value: u8) -> Result<()> {
        if let Some(gpr) = self.v.get_mut(reg) {
            *gpr = value;
            Ok(())
        } else {
            Err(Error::InvalidRegister { reg })
        }
    }

    /// Gets a slice of the entire general purpose registers
    pub fn v(&self) -> &[u8] {
        self.v.as_slice()
    }

    /// Gets the program counter
    /// # Examples
    /// ```rust
    /// # use chip8_interp::*;
    /// let cpu = CPU::default();
    /// assert_eq!(0x200, cpu.pc());
    /// ```
    pub fn pc(&self) -> Adr {
        self.pc
    }

    /// Gets the stack pointer: the number of return addresses on the stack
    pub fn sp(&self) -> usize {
        self.stack.len()
    }

    /// Gets the live portion of the stack, oldest return address first
    pub fn stack(&self) -> &[Adr] {
        &self.stack
    }

    /// Gets the I register
    pub fn i(&self) -> Adr {
        self.i
    }

    /// Gets the value in the Sound Timer register
    pub fn sound(&self) -> u8 {
        self.sound
    }

    /// Gets the value in the Delay Timer register
    pub fn delay(&self) -> u8 {
        self.delay
    }

    /// Gets the state of every key
    pub fn keys(&self) -> &[bool; 16] {
        &self.keys
    }

    /// Gets the framebuffer
    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    /// Gets the CPU's memory
    pub fn mem(&self) -> &Mem {
        &self.mem
    }

    /// Gets the location of the built-in font
    pub fn font(&self) -> Adr {
        self.font
    }

    /// True if the last executed instruction changed the framebuffer.
    ///
    /// Reading the flag does not clear it; the next [CPU::tick] does.
    pub fn draw_flag(&self) -> bool {
        self.draw
    }

    /// Gets the current [RunState]
    pub fn state(&self) -> RunState {
        self.state
    }

    /// True while suspended on `Fx0A`
    pub fn is_awaiting_key(&self) -> bool {
        matches!(self.state, RunState::AwaitingKey { .. })
    }

    /// Gets the number of cycles the CPU has executed
    ///
    /// Ticks which do nothing (paused, or awaiting a key) are not counted,
    /// and neither are fetches of unknown opcodes.
    pub fn cycle(&self) -> usize {
        self.cycle
    }

    /// Resets the emulator.
    ///
    /// Touches the screen, stack, pc, registers, timers, keys, draw flag,
    /// key-await state, and cycle count.
    ///
    /// Does not touch [Flags], [Quirks], the font location, or memory.
    pub fn reset(&mut self) {
        self.screen.clear();
        self.stack.clear();
        self.pc = PROGRAM_START;
        self.i = 0;
        self.v = [0; 16];
        self.delay = 0;
        self.sound = 0;
        self.keys = [false; 16];
        self.draw = false;
        self.state = RunState::Running;
        self.cycle = 0;
        self.current = (PROGRAM_START, 0);
    }

    /// Executes a single instruction
    ///
    /// Does nothing while paused or awaiting a key.
    ///
    /// Returns [Error::MemoryOutOfBounds] if `pc` is not a valid address,
    /// [Error::UnknownOpcode] if the instruction at `pc` is not recognized,
    /// and propagates any fault raised by the instruction.
    /// # Examples
    /// ```rust
    /// # use chip8_interp::*;
    /// let mut cpu = CPU::default();
    /// cpu.load_program(&[
    ///     0x00, 0xe0, // cls
    ///     0x12, 0x02, // jp 202
    /// ]).unwrap();
    /// cpu.tick()
    ///     .expect("0x00e0 (cls) should be a valid opcode.");
    /// assert_eq!(0x202, cpu.pc());
    /// assert_eq!(1, cpu.cycle());
    /// assert!(cpu.draw_flag());
    /// ```
    /// Returns [Error::UnknownOpcode] if the instruction is not implemented.
    /// ```rust
    /// # use chip8_interp::*;
    /// let mut cpu = CPU::default();
    /// cpu.load_program(&[0xff, 0xff]).unwrap();
    /// match cpu.tick() {
    ///     Err(error::Error::UnknownOpcode { word, pc }) => {
    ///         assert_eq!((0xffff, 0x200), (word, pc))
    ///     }
    ///     other => panic!("{other:?}"),
    /// }
    /// ```
    pub fn tick(&mut self) -> Result<&mut Self> {
        // Do nothing if paused or suspended
        if self.flags.pause || self.is_awaiting_key() {
            return Ok(self);
        }
        // fetch opcode
        let pc = self.pc;
        let word = self
            .mem
            .read_word(pc as usize)
            .ok_or(Error::MemoryOutOfBounds {
                addr: pc as usize,
                pc,
            })?;
        self.current = (pc, word);

        // decode opcode
        let decoded =
            Insn::decode(&word.to_be_bytes()).map_err(|_| Error::UnknownOpcode { word, pc });
        if decoded.is_ok() {
            self.cycle += 1;
        }

        // Print opcode disassembly:
        if self.flags.debug {
            std::println!(
                "{:3} {:03x}: {:<36}",
                self.cycle.bright_black(),
                pc,
                self.disassembler.once(word)
            );
        }

        self.pc = pc.wrapping_add(2);
        self.draw = false;

        let (_, insn) = decoded?;
        self.execute(insn)?;
        Ok(self)
    }

    /// Runs up to `steps` cycles, stopping early if the CPU suspends on `Fx0A`
    /// # Examples
    /// ```rust
    /// # use chip8_interp::*;
    /// let mut cpu = CPU::default();
    /// cpu.load_program(&[
    ///     0x70, 0x01, // add v0, #01
    ///     0x12, 0x00, // jp 200
    /// ]).unwrap();
    /// cpu.multistep(0x20)
    ///     .expect("The program should only have valid opcodes.");
    /// assert_eq!(0x10, cpu.v()[0]);
    /// assert_eq!(0x20, cpu.cycle());
    /// ```
    pub fn multistep(&mut self, steps: usize) -> Result<&mut Self> {
        for _ in 0..steps {
            if self.is_awaiting_key() {
                break;
            }
            self.tick()?;
        }
        Ok(self)
    }

    /// Dumps the current state of all CPU registers, and the cycle count
    /// # Examples
    /// ```rust
    /// # use chip8_interp::*;
    /// let cpu = CPU::default();
    /// cpu.dump();
    /// ```
    /// outputs
    /// ```text
    /// PC: 0200, SP: 0000, I: 0000
    /// v0: 00 v1: 00 v2: 00 v3: 00
    /// v4: 00 v5: 00 v6: 00 v7: 00
    /// v8: 00 v9: 00 vA: 00 vB: 00
    /// vC: 00 vD: 00 vE: 00 vF: 00
    /// DLY: 0, SND: 0, CYC:      0
    /// ```
    pub fn dump(&self) {
        std::println!(
            "PC: {:04x}, SP: {:04x}, I: {:04x}\n{}DLY: {}, SND: {}, CYC: {:6}",
            self.pc,
            self.stack.len(),
            self.i,
            self.v
                .into_iter()
                .enumerate()
                .map(|(i, gpr)| {
                    format!(
                        "v{i:X}: {gpr:02x} {}",
                        match i % 4 {
                            3 => "\n",
                            _ => "",
                        }
                    )
                })
                .collect::<String>(),
            self.delay,
            self.sound,
            self.cycle,
        );
    }
}

impl Default for CPU {
    /// Constructs a new CPU with sane defaults, and an empty program loaded
    ///
    /// | value  | default | description
    /// |--------|---------|------------
    /// | font   |`0x0000` | Location of font memory.
    /// | pc     |`0x0200` | Start location.
    ///
    /// # Examples
    /// ```rust
    /// use chip8_interp::*;
    /// let cpu = CPU::default();
    /// assert_eq!(&[0xf0, 0x90, 0x90, 0x90, 0xf0], cpu.mem().get(0..5).unwrap());
    /// ```
    fn default() -> Self {
        let mut mem = Mem::new();
        mem.load_charset(FONT_BASE as usize);
        CPU {
            flags: Flags::default(),
            font: FONT_BASE,
            mem,
            screen: Screen::default(),
            stack: Vec::with_capacity(STACK_DEPTH),
            pc: PROGRAM_START,
            i: 0,
            v: [0; 16],
            delay: 0,
            sound: 0,
            keys: [false; 16],
            draw: false,
            state: RunState::Running,
            cycle: 0,
            current: (PROGRAM_START, 0),
            disassembler: Dis::default(),
        }
    }
}
