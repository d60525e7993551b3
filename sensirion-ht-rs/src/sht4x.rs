use embedded_hal::{
    delay::DelayNs,
    i2c::{I2c, SevenBitAddress},
};

use crate::{
    Error, HumidityTemperatureSensor, InvalidMode, Measurement, Mode,
    address::{SHT4X_DEFAULT_ADDRESS, SlaveAddress},
    sensor,
};

/// Represents the SHT4x sensor.
#[derive(Debug)]
pub struct Sht4x {
    pub(crate) address: u8,
    pub(crate) mode: Mode,
}

#[derive(Debug)]
/// Builder for a SHT4x sensor.
pub struct Sht4xBuilder {
    pub(crate) address: u8,
    pub(crate) mode: Mode,
}

impl Default for Sht4xBuilder {
    fn default() -> Self {
        Self {
            address: SHT4X_DEFAULT_ADDRESS,
            mode: Mode::default(),
        }
    }
}

impl Sht4xBuilder {
    /// Set the address of the SHT4x sensor.
    pub fn with_address(mut self, address: u8) -> Self {
        self.address = address;
        self
    }

    /// Set the address of the SHT4x sensor from its order code option.
    pub fn with_slave_address(mut self, address: SlaveAddress) -> Self {
        self.address = address.into_bits();
        self
    }

    /// Set the measurement mode used by [`HumidityTemperatureSensor::measurements`].
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Build the SHT4x sensor with the specified configuration.
    ///
    /// The sensor is soft reset before it is returned, so no heater state survives
    /// from a previous session.
    pub fn build<T: I2c<SevenBitAddress>, D: DelayNs>(
        self,
        i2c: &mut T,
        delay: &mut D,
    ) -> Result<Sht4x, Error<T::Error>> {
        let mut dev = Sht4x {
            address: self.address,
            mode: self.mode,
        };
        dev.reset(i2c, delay)?;
        Ok(dev)
    }
}

impl Sht4x {
    /// Open an SHT4x at the default address in the default mode.
    pub fn new<T: I2c<SevenBitAddress>, D: DelayNs>(
        i2c: &mut T,
        delay: &mut D,
    ) -> Result<Self, Error<T::Error>> {
        Sht4xBuilder::default().build(i2c, delay)
    }

    /// Get the current measurement mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Set the measurement mode. Takes effect on the next measurement.
    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    /// Set the measurement mode from its command byte.
    ///
    /// A byte that is not in [`Mode::TABLE`] is rejected and the current mode is kept.
    pub fn set_mode_raw(&mut self, command: u8) -> Result<(), InvalidMode> {
        self.mode = Mode::try_from(command)?;
        Ok(())
    }

    /// Converts a raw temperature word to degrees Celsius.
    pub fn convert_temperature(raw: u16) -> f32 {
        -45.0 + 175.0 * raw as f32 / 65535.0
    }

    /// Converts a raw humidity word to percent, clamped to `0..=100`.
    pub fn convert_humidity(raw: u16) -> f32 {
        (-6.0 + 125.0 * raw as f32 / 65535.0).clamp(0.0, 100.0)
    }

    /// Get the builder for the SHT4x sensor.
    pub fn to_builder(self) -> Sht4xBuilder {
        Sht4xBuilder {
            address: self.address,
            mode: self.mode,
        }
    }
}

impl HumidityTemperatureSensor for Sht4x {
    fn address(&self) -> u8 {
        self.address
    }

    fn measurements<T: I2c<SevenBitAddress>, D: DelayNs>(
        &mut self,
        i2c: &mut T,
        delay: &mut D,
    ) -> Result<Measurement, Error<T::Error>> {
        let mode = self.mode;
        log::debug!("[SHT] 0x{:02x}: measure ({mode})", self.address);
        i2c.write(self.address, &[mode.command()])?;
        delay.delay_ms(mode.delay_ms());
        let words = sensor::read_words(self.address, i2c)?;
        // datasheet section 4.5
        let [temp, humidity] = sensor::verify(self.address, &words)?;
        Ok(Measurement {
            temperature: Self::convert_temperature(temp),
            relative_humidity: Self::convert_humidity(humidity),
        })
    }
}
