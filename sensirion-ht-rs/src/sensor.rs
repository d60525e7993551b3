use embedded_hal::{
    delay::DelayNs,
    i2c::{I2c, SevenBitAddress},
};

use crate::{Error, checksum::Word};

pub(crate) const SOFT_RESET: u8 = 0x94;
pub(crate) const READ_SERIAL: u8 = 0x89;
pub(crate) const RESET_DELAY_MS: u32 = 1;
pub(crate) const SERIAL_DELAY_MS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq)]
/// A temperature and relative humidity pair, read in one bus transaction.
pub struct Measurement {
    pub(crate) temperature: f32,
    pub(crate) relative_humidity: f32,
}

impl Measurement {
    /// Temperature in degrees Celsius.
    pub fn celsius(&self) -> f32 {
        self.temperature
    }

    /// Relative humidity in percent.
    pub fn humidity(&self) -> f32 {
        self.relative_humidity
    }
}

impl From<Measurement> for (f32, f32) {
    fn from(m: Measurement) -> Self {
        (m.temperature, m.relative_humidity)
    }
}

/// Operations shared by every supported sensor.
///
/// The bus and delay are borrowed for the duration of a single call, and the borrow
/// ends on every return path. Other devices on the same bus can be driven between calls.
pub trait HumidityTemperatureSensor {
    /// The 7-bit bus address of the device.
    fn address(&self) -> u8;

    /// Perform a soft reset, returning the sensor to its power-on defaults.
    ///
    /// No response is read. Blocks for 1 ms to let the device reinitialize.
    fn reset<T: I2c<SevenBitAddress>, D: DelayNs>(
        &mut self,
        i2c: &mut T,
        delay: &mut D,
    ) -> Result<(), Error<T::Error>> {
        soft_reset(self.address(), i2c, delay)
    }

    /// Measure temperature and relative humidity together.
    ///
    /// # Errors
    /// - [`Error::I2c`] if the bus fails.
    /// - [`Error::Crc`] if either word of the response is corrupted.
    fn measurements<T: I2c<SevenBitAddress>, D: DelayNs>(
        &mut self,
        i2c: &mut T,
        delay: &mut D,
    ) -> Result<Measurement, Error<T::Error>>;

    /// Read the unique 32-bit serial number.
    fn serial_number<T: I2c<SevenBitAddress>, D: DelayNs>(
        &mut self,
        i2c: &mut T,
        delay: &mut D,
    ) -> Result<u32, Error<T::Error>> {
        read_serial(self.address(), i2c, delay)
    }

    /// Temperature in degrees Celsius.
    ///
    /// Runs a full measurement and drops the humidity. Use [`measurements`](Self::measurements)
    /// when both are needed.
    fn temperature<T: I2c<SevenBitAddress>, D: DelayNs>(
        &mut self,
        i2c: &mut T,
        delay: &mut D,
    ) -> Result<f32, Error<T::Error>> {
        self.measurements(i2c, delay).map(|m| m.celsius())
    }

    /// Relative humidity in percent.
    ///
    /// Runs a full measurement and drops the temperature. Use [`measurements`](Self::measurements)
    /// when both are needed.
    fn relative_humidity<T: I2c<SevenBitAddress>, D: DelayNs>(
        &mut self,
        i2c: &mut T,
        delay: &mut D,
    ) -> Result<f32, Error<T::Error>> {
        self.measurements(i2c, delay).map(|m| m.humidity())
    }
}

pub(crate) fn soft_reset<T: I2c<SevenBitAddress>, D: DelayNs>(
    address: u8,
    i2c: &mut T,
    delay: &mut D,
) -> Result<(), Error<T::Error>> {
    log::debug!("[SHT] 0x{address:02x}: soft reset");
    // special command, only ACKs, so no return data
    i2c.write(address, &[SOFT_RESET])?;
    delay.delay_ms(RESET_DELAY_MS);
    Ok(())
}

pub(crate) fn read_serial<T: I2c<SevenBitAddress>, D: DelayNs>(
    address: u8,
    i2c: &mut T,
    delay: &mut D,
) -> Result<u32, Error<T::Error>> {
    i2c.write(address, &[READ_SERIAL])?;
    delay.delay_ms(SERIAL_DELAY_MS);
    let words = read_words(address, i2c)?;
    let [hi, lo] = verify(address, &words)?;
    Ok((u32::from(hi) << 16) | u32::from(lo))
}

/// Reads the 6-byte response `[msb, lsb, crc, msb, lsb, crc]` into its two words.
pub(crate) fn read_words<T: I2c<SevenBitAddress>>(
    address: u8,
    i2c: &mut T,
) -> Result<[Word; 2], T::Error> {
    let mut buf = [0u8; 6];
    i2c.read(address, &mut buf)?;
    Ok([
        Word::from_chunk(&[buf[0], buf[1], buf[2]]),
        Word::from_chunk(&[buf[3], buf[4], buf[5]]),
    ])
}

/// Checks both words and returns their values, or the first checksum mismatch.
pub(crate) fn verify<E>(address: u8, words: &[Word; 2]) -> Result<[u16; 2], Error<E>> {
    Ok([verify_word(address, &words[0])?, verify_word(address, &words[1])?])
}

/// Checks a single word and returns its value.
pub(crate) fn verify_word<E>(address: u8, word: &Word) -> Result<u16, Error<E>> {
    if let Some(computed) = word.mismatch() {
        log::warn!(
            "[SHT] 0x{address:02x}: checksum did not match (ours: {computed:#04x} != sensor's: {:#04x})",
            word.crc
        );
        return Err(Error::Crc {
            computed,
            received: word.crc,
        });
    }
    Ok(word.value())
}
