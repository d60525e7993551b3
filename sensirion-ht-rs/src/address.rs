//! I2C addresses of the supported parts.
//!
//! The SHT4x address is fixed at manufacture and encoded in the order code,
//! see the [SHT4x datasheet](https://sensirion.com/media/documents/33FD6951/67EB9032/HT_DS_Datasheet_SHT4x_5.pdf).

/// Default address of the SHT4x family.
pub const SHT4X_DEFAULT_ADDRESS: u8 = 0x44;
/// Address of the SHTC3. It cannot be changed.
pub const SHTC3_ADDRESS: u8 = 0x70;

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// Represents the slave address of an SHT4x sensor.
/// The three address options correspond to the `A`, `B` and `C` order code letters.
pub enum SlaveAddress {
    #[default]
    /// `0x44`, the default for most parts.
    A = 0x44,
    /// `0x45`
    B = 0x45,
    /// `0x46`
    C = 0x46,
}

impl SlaveAddress {
    /// The 7-bit bus address.
    pub const fn into_bits(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for SlaveAddress {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x44 => Ok(SlaveAddress::A),
            0x45 => Ok(SlaveAddress::B),
            0x46 => Ok(SlaveAddress::C),
            other => Err(other),
        }
    }
}
