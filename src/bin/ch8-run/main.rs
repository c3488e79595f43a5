// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)

//! Runs a Chip-8 program headless, then prints the screen and registers

use chip8_interp::{error::Result, shared::TIMER_PERIOD, *};
use gumdrop::*;
use owo_colors::OwoColorize;
use std::{
    fs::read,
    path::PathBuf,
    time::{Duration, Instant},
};

/// Parses a single hexadecimal key name
fn parse_key(value: &str) -> std::result::Result<u8, std::num::ParseIntError> {
    u8::from_str_radix(value, 16)
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Options, Hash)]
struct Arguments {
    #[options(help = "Load a ROM to run.", required, free)]
    pub file: PathBuf,
    #[options(help = "Print this help message.")]
    help: bool,
    #[options(help = "Print each instruction as it's executed.")]
    pub debug: bool,

    #[options(
        short = "n",
        help = "Stop after this many instructions.",
        default = "1000",
        meta = "N"
    )]
    pub cycles: usize,
    #[options(help = "Set the instructions-per-second rate. If unspecified, run unthrottled.")]
    pub speed: Option<u64>,
    #[options(
        help = "Answer every key wait with this key.",
        parse(try_from_str = "parse_key"),
        meta = "KEY"
    )]
    pub key: Option<u8>,

    #[options(help = "Run in (Chip8, VIP, SChip) mode.")]
    pub mode: Option<Mode>,

    #[options(short = "z", help = "Toggle setting vF to 0 after a bitwise operation.")]
    pub vfreset: bool,
    #[options(short = "c", help = "Toggle CHIP-48 style DMA instructions, which don't touch I.")]
    pub memory: bool,
    #[options(short = "v", help = "Toggle COSMAC style bit-shifts, which source from vY.")]
    pub shift: bool,
    #[options(short = "b", help = "Toggle SUPER-CHIP style indexed jump, relative to v[adr].")]
    pub jumping: bool,
    #[options(short = "w", help = "Toggle sprites wrapping around the edges of the screen.")]
    pub wrap: bool,
    #[options(short = "f", help = "Toggle writing vF after the result of 8xy5/6/7/E.")]
    pub flaglast: bool,
}

fn main() -> Result<()> {
    let options = Arguments::parse_args_default_or_exit();

    let mut flags = Flags {
        debug: options.debug,
        quirks: options.mode.unwrap_or_default().into(),
        ..Default::default()
    };
    // Flip the state of the quirks
    flags.quirks.vf_reset ^= options.vfreset;
    flags.quirks.dma_hold_i ^= options.memory;
    flags.quirks.shift_vy ^= options.shift;
    flags.quirks.jump_vx ^= options.jumping;
    flags.quirks.screen_wrap ^= options.wrap;
    flags.quirks.vf_last ^= options.flaglast;

    let mut cpu = CPU::new(FONT_BASE, Dis::default(), flags)?;
    cpu.load_program(&read(&options.file)?)?;
    let shared = Shared::new(cpu);

    let timer = shared.spawn_timer(TIMER_PERIOD, || eprint!("\x07"));
    let result = run(&shared, &options);
    let beeps = timer.stop()?;
    if let Err(e) = result {
        eprintln!("{}", e.bold().red());
    }

    shared.with(|cpu| {
        cpu.screen().print_screen();
        cpu.dump();
    })?;
    eprintln!("{}", format_args!("{beeps} beep(s)").bright_black());
    Ok(())
}

/// Ticks the CPU until it has run `options.cycles` instructions, or it
/// waits for a key nobody will press.
fn run(shared: &Shared, options: &Arguments) -> Result<()> {
    let rate = options
        .speed
        .map(|hz| Duration::from_nanos(1_000_000_000 / hz.max(1)));
    let mut next = Instant::now();
    while shared.with(|cpu| cpu.cycle())? < options.cycles {
        if shared.with(|cpu| cpu.is_awaiting_key())? {
            let Some(key) = options.key else {
                eprintln!("{}", "Waiting for a key, but none was given (-k)".yellow());
                break;
            };
            shared.key_changed(key as usize, true)?;
            shared.key_changed(key as usize, false)?;
        }
        shared.tick()?;
        if let Some(rate) = rate {
            next += rate;
            std::thread::sleep(next.saturating_duration_since(Instant::now()));
        }
    }
    Ok(())
}
