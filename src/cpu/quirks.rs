// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)

//! Controls the [Quirks] behavior of the CPU on a granular level.

use super::Mode;

/// Controls the quirk behavior of the CPU on a granular level.
///
/// The default (all `false`) is the interpretation documented on each
/// instruction in [super::behavior].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Quirks {
    /// Cosmac VIP: Shift ops in `8xy`(`6`, `E`) source from vY instead of vX
    pub shift_vy: bool,
    /// Chip-48:    DMA instructions `Fx55`/`Fx65` leave I untouched
    pub dma_hold_i: bool,
    /// XO-Chip:    Draw operations wrap from bottom to top and side to side
    pub screen_wrap: bool,
    /// Cosmac VIP: Binary ops in `8xy`(`1`, `2`, `3`) set vF to 0
    pub vf_reset: bool,
    /// Super Chip: Indexed jump goes to `adr` + v`x`, where `x` is the high nibble of `adr`
    pub jump_vx: bool,
    /// Some interpreters: `8xy`(`5`, `6`, `7`, `E`) write vF after vX, so vF as X keeps the flag
    pub vf_last: bool,
}

impl From<bool> for Quirks {
    /// `true` enables every quirk, `false` disables every quirk
    fn from(value: bool) -> Self {
        Quirks {
            shift_vy: value,
            dma_hold_i: value,
            screen_wrap: value,
            vf_reset: value,
            jump_vx: value,
            vf_last: value,
        }
    }
}

impl From<Mode> for Quirks {
    fn from(value: Mode) -> Self {
        match value {
            Mode::Chip8 => Quirks::default(),
            Mode::Vip => Quirks {
                shift_vy: true,
                vf_reset: true,
                ..Default::default()
            },
            Mode::SChip => Quirks {
                dma_hold_i: true,
                jump_vx: true,
                ..Default::default()
            },
        }
    }
}
