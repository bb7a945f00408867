//! Controller input synthesis.
//!
//! A [`Demo`] is what bgb replays with `-demoplay`: one button mask per
//! tick. Menu actions are described as a list of logical presses, and each
//! press is expanded into a fixed timing envelope so the game's input
//! polling sees a clean press and release.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::ops::BitOr;
use std::path::Path;

/// Bitset of held buttons for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Buttons(pub u8);

impl Buttons {
    /// Nothing held.
    pub const NONE: Self = Self(0);
    /// A button.
    pub const A: Self = Self(0b0000_0001);
    /// B button.
    pub const B: Self = Self(0b0000_0010);
    /// Select.
    pub const SELECT: Self = Self(0b0000_0100);
    /// Start.
    pub const START: Self = Self(0b0000_1000);
    /// D-pad right.
    pub const RIGHT: Self = Self(0b0001_0000);
    /// D-pad left.
    pub const LEFT: Self = Self(0b0010_0000);
    /// D-pad up.
    pub const UP: Self = Self(0b0100_0000);
    /// D-pad down.
    pub const DOWN: Self = Self(0b1000_0000);

    /// Raw mask byte.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Whether every button in `other` is held.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for Buttons {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Timing of the press envelope and trailing buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Idle ticks before each press.
    pub lead: usize,
    /// Ticks each press is held.
    pub hold: usize,
    /// Idle ticks after each release.
    pub settle: usize,
    /// Button mashed after the scripted presses.
    pub buffer_button: Buttons,
    /// How many buffer presses to append.
    pub buffer_presses: usize,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            lead: 1,
            hold: 2,
            settle: 12,
            buffer_button: Buttons::B,
            buffer_presses: 1000,
        }
    }
}

impl DemoConfig {
    /// Ticks taken by one enveloped press.
    #[must_use]
    pub const fn press_len(&self) -> usize {
        self.lead + self.hold + self.settle
    }

    /// Total demo length for `presses` scripted presses.
    #[must_use]
    pub const fn demo_len(&self, presses: usize) -> usize {
        (presses + self.buffer_presses) * self.press_len()
    }
}

/// A scripted input recording.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Demo {
    frames: Vec<Buttons>,
}

impl Demo {
    /// Expand logical presses into a demo, followed by the buffer presses.
    ///
    /// A press of [`Buttons::NONE`] is a wait of one envelope.
    #[must_use]
    pub fn from_presses(presses: &[Buttons], config: &DemoConfig) -> Self {
        let mut frames = Vec::with_capacity(config.demo_len(presses.len()));
        let buffer = std::iter::repeat(config.buffer_button).take(config.buffer_presses);
        for button in presses.iter().copied().chain(buffer) {
            frames.extend(std::iter::repeat(Buttons::NONE).take(config.lead));
            frames.extend(std::iter::repeat(button).take(config.hold));
            frames.extend(std::iter::repeat(Buttons::NONE).take(config.settle));
        }
        Self { frames }
    }

    /// The buffer presses alone, used before the first decision.
    #[must_use]
    pub fn idle(config: &DemoConfig) -> Self {
        Self::from_presses(&[], config)
    }

    /// Per-tick masks.
    #[must_use]
    pub fn frames(&self) -> &[Buttons] {
        &self.frames
    }

    /// Number of ticks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether the demo has no ticks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Demo file contents: one mask byte per tick.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        self.frames.iter().map(|b| b.bits()).collect()
    }

    /// Write the demo file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self, path: &Path) -> io::Result<()> {
        fs::write(path, self.to_bytes())
    }
}

const WAIT: Buttons = Buttons::NONE;

/// Presses for picking move slot `target` with the cursor on `current`.
///
/// Backs out to the battle menu, goes to FIGHT, then walks the cursor.
#[must_use]
pub fn select_move_presses(current: u8, target: u8) -> Vec<Buttons> {
    let (direction, steps) = if target < current {
        (Buttons::UP, current - target)
    } else {
        (Buttons::DOWN, target - current)
    };
    let mut presses = vec![Buttons::B, Buttons::UP, Buttons::LEFT, Buttons::A, WAIT, WAIT];
    presses.extend(std::iter::repeat(direction).take(usize::from(steps)));
    presses.push(Buttons::A);
    presses
}

/// Presses for choosing PKMN from the battle menu.
#[must_use]
pub fn select_switch_presses() -> Vec<Buttons> {
    vec![Buttons::UP, Buttons::RIGHT, Buttons::A]
}

/// Presses for picking party slot `index` from the top of the party menu.
#[must_use]
pub fn choose_party_slot_presses(index: u8) -> Vec<Buttons> {
    let mut presses = vec![WAIT; 5];
    presses.extend(std::iter::repeat(Buttons::DOWN).take(usize::from(index)));
    presses.push(Buttons::A);
    presses.extend([WAIT; 5]);
    presses.push(Buttons::A);
    presses
}

/// Presses for using the first bag item on the active Pokémon.
#[must_use]
pub fn use_item_presses() -> Vec<Buttons> {
    let mut presses = vec![WAIT; 4];
    presses.extend([Buttons::DOWN, Buttons::LEFT, Buttons::A]);
    presses.extend([WAIT; 5]);
    presses.extend([Buttons::A, Buttons::A]);
    presses
}

/// Demo for [`select_move_presses`].
#[must_use]
pub fn select_move(current: u8, target: u8, config: &DemoConfig) -> Demo {
    Demo::from_presses(&select_move_presses(current, target), config)
}

/// Demo for [`select_switch_presses`].
#[must_use]
pub fn select_switch(config: &DemoConfig) -> Demo {
    Demo::from_presses(&select_switch_presses(), config)
}

/// Demo for [`choose_party_slot_presses`].
#[must_use]
pub fn choose_party_slot(index: u8, config: &DemoConfig) -> Demo {
    Demo::from_presses(&choose_party_slot_presses(index), config)
}

/// Demo for [`use_item_presses`].
#[must_use]
pub fn use_item(config: &DemoConfig) -> Demo {
    Demo::from_presses(&use_item_presses(), config)
}
