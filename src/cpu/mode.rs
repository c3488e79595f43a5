// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)

//! Selects a compatibility preset for the [super::CPU]

use crate::error::Error;
use std::str::FromStr;

/// Selects a set of [Quirks](super::Quirks) by the interpreter it imitates
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Mode {
    /// Plain Chip-8, as most modern programs expect it
    #[default]
    Chip8,
    /// Cosmac VIP emulation mode
    Vip,
    /// Chip-48 / Super Chip emulation mode
    SChip,
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "chip8" | "chip-8" => Ok(Mode::Chip8),
            "vip" | "cosmac" => Ok(Mode::Vip),
            "schip" | "superchip" | "chip48" | "chip-48" => Ok(Mode::SChip),
            _ => Err(Error::InvalidMode {
                mode: s.to_string(),
            }),
        }
    }
}
