use core::fmt;

use crate::InvalidMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Static description of a [`Mode`]: what goes on the wire and how long to wait for the result.
pub struct ModeInfo {
    /// The mode this entry describes.
    pub mode: Mode,
    /// Measurement command byte.
    pub command: u8,
    /// Human readable name.
    pub label: &'static str,
    /// Conversion time in milliseconds, including heater on-time.
    pub delay_ms: u32,
}

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// Measurement mode of an SHT4x sensor: precision level, or heater power and duration.
///
/// Heater modes fire the on-chip heater and measure at high precision just before it is
/// switched off again.
pub enum Mode {
    #[default]
    /// No heater, high precision.
    NoHeatHighPrecision = 0xFD,
    /// No heater, medium precision.
    NoHeatMedPrecision = 0xF6,
    /// No heater, low precision.
    NoHeatLowPrecision = 0xE0,
    /// 200 mW heater for 1 s.
    HighHeat1s = 0x39,
    /// 200 mW heater for 0.1 s.
    HighHeat100ms = 0x32,
    /// 110 mW heater for 1 s.
    MedHeat1s = 0x2F,
    /// 110 mW heater for 0.1 s.
    MedHeat100ms = 0x24,
    /// 20 mW heater for 1 s.
    LowHeat1s = 0x1E,
    /// 20 mW heater for 0.1 s.
    LowHeat100ms = 0x15,
}

impl Mode {
    /// Every mode, with its command byte, label and conversion time.
    pub const TABLE: [ModeInfo; 9] = [
        ModeInfo::new(Mode::NoHeatHighPrecision, "No heater, high precision", 10),
        ModeInfo::new(Mode::NoHeatMedPrecision, "No heater, med precision", 5),
        ModeInfo::new(Mode::NoHeatLowPrecision, "No heater, low precision", 2),
        ModeInfo::new(Mode::HighHeat1s, "High heat, 1 second", 1100),
        ModeInfo::new(Mode::HighHeat100ms, "High heat, 0.1 second", 110),
        ModeInfo::new(Mode::MedHeat1s, "Med heat, 1 second", 1100),
        ModeInfo::new(Mode::MedHeat100ms, "Med heat, 0.1 second", 110),
        ModeInfo::new(Mode::LowHeat1s, "Low heat, 1 second", 1100),
        ModeInfo::new(Mode::LowHeat100ms, "Low heat, 0.1 second", 110),
    ];

    /// The table entry for this mode.
    pub const fn info(self) -> &'static ModeInfo {
        let table: &'static [ModeInfo; 9] = &Self::TABLE;
        let mut i = 0;
        while i < table.len() {
            if table[i].command == self as u8 {
                return &table[i];
            }
            i += 1;
        }
        unreachable!()
    }

    /// The measurement command byte.
    pub const fn command(self) -> u8 {
        self as u8
    }

    /// Human readable name of the mode.
    pub const fn label(self) -> &'static str {
        self.info().label
    }

    /// Time to wait between the command and reading the result, in milliseconds.
    pub const fn delay_ms(self) -> u32 {
        self.info().delay_ms
    }

    /// Whether this mode turns on the heater.
    pub const fn heater(self) -> bool {
        !matches!(
            self,
            Mode::NoHeatHighPrecision | Mode::NoHeatMedPrecision | Mode::NoHeatLowPrecision
        )
    }

    /// Checks whether `command` is the command byte of any mode.
    pub fn is_valid(command: u8) -> bool {
        Self::try_from(command).is_ok()
    }

    /// Iterate over all modes in table order.
    pub fn iter() -> impl Iterator<Item = Mode> {
        let table: &'static [ModeInfo; 9] = &Self::TABLE;
        table.iter().map(|info| info.mode)
    }
}

impl ModeInfo {
    const fn new(mode: Mode, label: &'static str, delay_ms: u32) -> Self {
        Self {
            mode,
            command: mode as u8,
            label,
            delay_ms,
        }
    }
}

impl TryFrom<u8> for Mode {
    type Error = InvalidMode;

    fn try_from(command: u8) -> Result<Self, Self::Error> {
        Self::TABLE
            .iter()
            .find(|info| info.command == command)
            .map(|info| info.mode)
            .ok_or(InvalidMode(command))
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
