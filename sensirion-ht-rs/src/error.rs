#[derive(Debug, PartialEq)]
/// Represents errors that can occur while interacting with a Sensirion sensor.
pub enum Error<E> {
    /// An error occurred while communicating with the I2C bus.
    I2c(E),
    /// The checksum of a received word did not match its contents.
    Crc {
        /// Checksum computed over the received word.
        computed: u8,
        /// Checksum sent by the sensor.
        received: u8,
    },
}

impl<E> From<E> for Error<E> {
    fn from(e: E) -> Self {
        Error::I2c(e)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// A command byte that does not name any [`Mode`](crate::Mode).
pub struct InvalidMode(pub u8);
