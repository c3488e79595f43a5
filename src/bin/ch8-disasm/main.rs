// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)

//! Disassembles a Chip-8 program, one word per line

use chip8_interp::{error::Result, *};
use gumdrop::*;
use owo_colors::OwoColorize;
use std::{fs::read, path::PathBuf};

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Options, Hash)]
struct Arguments {
    #[options(help = "Show help text")]
    help: bool,
    #[options(help = "Load a ROM to disassemble", free, required)]
    pub file: PathBuf,
    #[options(
        help = "Load address (default 200)",
        parse(try_from_str = "parse_hex"),
        meta = "ADR"
    )]
    pub loadaddr: Option<u16>,
    #[options(help = "Start disassembling at offset...")]
    pub offset: usize,
    #[options(help = "Print without colors")]
    pub plain: bool,
}

fn parse_hex(value: &str) -> std::result::Result<u16, std::num::ParseIntError> {
    u16::from_str_radix(value, 16)
}

fn main() -> Result<()> {
    let options = Arguments::parse_args_default_or_exit();
    let contents = read(&options.file)?;
    let disassembler = match options.plain {
        true => Dis::plain(),
        false => Dis::default(),
    };
    let base = options.loadaddr.unwrap_or(PROGRAM_START) as usize + options.offset;
    let words = contents.get(options.offset..).unwrap_or_default();
    for (addr, word) in words
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .enumerate()
        .map(|(index, word)| (base + 2 * index, word))
    {
        if options.plain {
            println!("{addr:03x}: {} {word:04x}", disassembler.once(word));
        } else {
            println!(
                "{:03x}: {} {:04x}",
                addr,
                disassembler.once(word),
                word.bright_black()
            );
        }
    }
    Ok(())
}
