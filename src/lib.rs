// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)

//! This crate implements a Chip-8 interpreter as if it were a real CPU architecture.
//!
//! The [CPU] owns its memory, registers, stack, timers, keypad and [Screen].
//! The host drives it with [CPU::tick], counts the timers down at 60 Hz with
//! [CPU::decrement_timers], and feeds it input through [CPU::key_changed].
//!
//! When the cycle loop and the timer run on separate threads, wrap the
//! interpreter in a [Shared] handle.

pub mod cpu;
pub mod error;
pub mod screen;
pub mod shared;

// Common imports for chip8-interp
pub use cpu::{
    flags::Flags,
    instruction::{
        disassembler::{Dis, Disassembler},
        Insn,
    },
    mem::{Mem, Region, CHARSET, MEM_SIZE},
    mode::Mode,
    quirks::Quirks,
    RunState, CPU, FONT_BASE, PROGRAM_SPACE, PROGRAM_START, STACK_DEPTH,
};
pub use error::{Error, Result};
pub use screen::{Screen, HEIGHT, WIDTH};
pub use shared::{Shared, TimerHandle};
