//! [Datasheet SHTC3](https://sensirion.com/media/documents/643F9C8E/63A5A436/Datasheet_SHTC3.pdf)
use embedded_hal::{
    delay::DelayNs,
    i2c::{I2c, SevenBitAddress},
};

use crate::{
    Error, HumidityTemperatureSensor, Measurement, address::SHTC3_ADDRESS, checksum::Word, sensor,
};

const MEASURE_NORMAL: [u8; 2] = [0x78, 0x66];
const MEASURE_LOW_POWER: [u8; 2] = [0x60, 0x9C];
const SLEEP: [u8; 2] = [0xB0, 0x98];
const WAKE: [u8; 2] = [0x35, 0x17];
const SOFT_RESET: [u8; 2] = [0x80, 0x5D];
const READ_ID: [u8; 2] = [0xEF, 0xC8];

const NORMAL_DELAY_MS: u32 = 13;
const LOW_POWER_DELAY_MS: u32 = 1;
const POWER_DELAY_MS: u32 = 1;
// datasheet: 240 us max
const RESET_DELAY_MS: u32 = 1;

/// Represents the SHTC3 sensor.
///
/// Unlike the [`Sht4x`](crate::Sht4x), the SHTC3 is put to sleep after every
/// successful measurement and woken up again before the next one.
#[derive(Debug)]
pub struct Shtc3 {
    address: u8,
    low_power: bool,
    sleeping: bool,
}

#[derive(Debug)]
/// Builder for a SHTC3 sensor.
pub struct Shtc3Builder {
    address: u8,
    low_power: bool,
}

impl Default for Shtc3Builder {
    fn default() -> Self {
        Self {
            address: SHTC3_ADDRESS,
            low_power: false,
        }
    }
}

impl Shtc3Builder {
    /// Set the address of the SHTC3 sensor.
    pub fn with_address(mut self, address: u8) -> Self {
        self.address = address;
        self
    }

    /// Measure in low power mode: shorter conversion, lower accuracy.
    pub fn with_low_power(mut self, low_power: bool) -> Self {
        self.low_power = low_power;
        self
    }

    /// Build the SHTC3 sensor with the specified configuration.
    ///
    /// The sensor is woken up, since it ignores everything else while asleep,
    /// and then soft reset. It is left awake.
    pub fn build<T: I2c<SevenBitAddress>, D: DelayNs>(
        self,
        i2c: &mut T,
        delay: &mut D,
    ) -> Result<Shtc3, Error<T::Error>> {
        let mut dev = Shtc3 {
            address: self.address,
            low_power: self.low_power,
            sleeping: true,
        };
        dev.set_sleeping(i2c, delay, false)?;
        dev.reset(i2c, delay)?;
        Ok(dev)
    }
}

impl Shtc3 {
    /// Open an SHTC3 at its fixed address in normal power mode.
    pub fn new<T: I2c<SevenBitAddress>, D: DelayNs>(
        i2c: &mut T,
        delay: &mut D,
    ) -> Result<Self, Error<T::Error>> {
        Shtc3Builder::default().build(i2c, delay)
    }

    /// Whether measurements use the low power command.
    pub fn low_power(&self) -> bool {
        self.low_power
    }

    /// Select the low power (1 ms) or normal (13 ms) measurement command.
    pub fn set_low_power(&mut self, low_power: bool) {
        self.low_power = low_power;
    }

    /// Whether the sensor was last put to sleep.
    pub fn sleeping(&self) -> bool {
        self.sleeping
    }

    /// Put the sensor to sleep or wake it up.
    ///
    /// The state is only updated once the command has been acknowledged.
    pub fn set_sleeping<T: I2c<SevenBitAddress>, D: DelayNs>(
        &mut self,
        i2c: &mut T,
        delay: &mut D,
        sleeping: bool,
    ) -> Result<(), Error<T::Error>> {
        let cmd = if sleeping { SLEEP } else { WAKE };
        i2c.write(self.address, &cmd)?;
        delay.delay_ms(POWER_DELAY_MS);
        self.sleeping = sleeping;
        Ok(())
    }

    /// Converts a raw temperature word to degrees Celsius, in 0.01 °C steps.
    pub fn convert_temperature(raw: u16) -> f32 {
        let centi = ((4375 * raw as i32) >> 14) - 4500;
        centi as f32 / 100.0
    }

    /// Converts a raw humidity word to percent, in 0.01 % steps. Not clamped.
    pub fn convert_humidity(raw: u16) -> f32 {
        let centi = (625 * raw as u32) >> 12;
        centi as f32 / 100.0
    }

    /// Like [`HumidityTemperatureSensor::measurements`], but a corrupted response
    /// yields `Ok(None)` instead of [`Error::Crc`].
    ///
    /// The sensor is left awake when no reading is returned. Bus errors still fail.
    pub fn measurements_or_unavailable<T: I2c<SevenBitAddress>, D: DelayNs>(
        &mut self,
        i2c: &mut T,
        delay: &mut D,
    ) -> Result<Option<Measurement>, Error<T::Error>> {
        match self.measurements(i2c, delay) {
            Ok(m) => Ok(Some(m)),
            Err(Error::Crc { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

impl HumidityTemperatureSensor for Shtc3 {
    fn address(&self) -> u8 {
        self.address
    }

    /// Soft reset with the SHTC3's own 2-byte command, waking the sensor first if needed.
    fn reset<T: I2c<SevenBitAddress>, D: DelayNs>(
        &mut self,
        i2c: &mut T,
        delay: &mut D,
    ) -> Result<(), Error<T::Error>> {
        if self.sleeping {
            self.set_sleeping(i2c, delay, false)?;
        }
        log::debug!("[SHT] 0x{:02x}: soft reset", self.address);
        i2c.write(self.address, &SOFT_RESET)?;
        delay.delay_ms(RESET_DELAY_MS);
        Ok(())
    }

    /// The SHTC3 has no serial number register. This returns its 16-bit ID register,
    /// read with `0xEFC8` and checked against its CRC, widened to `u32`.
    fn serial_number<T: I2c<SevenBitAddress>, D: DelayNs>(
        &mut self,
        i2c: &mut T,
        delay: &mut D,
    ) -> Result<u32, Error<T::Error>> {
        if self.sleeping {
            self.set_sleeping(i2c, delay, false)?;
        }
        let mut buf = [0u8; 3];
        i2c.write_read(self.address, &READ_ID, &mut buf)?;
        let id = sensor::verify_word(self.address, &Word::from_chunk(&buf))?;
        Ok(u32::from(id))
    }

    fn measurements<T: I2c<SevenBitAddress>, D: DelayNs>(
        &mut self,
        i2c: &mut T,
        delay: &mut D,
    ) -> Result<Measurement, Error<T::Error>> {
        if self.sleeping {
            self.set_sleeping(i2c, delay, false)?;
        }
        let (cmd, wait) = if self.low_power {
            (MEASURE_LOW_POWER, LOW_POWER_DELAY_MS)
        } else {
            (MEASURE_NORMAL, NORMAL_DELAY_MS)
        };
        log::debug!(
            "[SHT] 0x{:02x}: measure (low power: {})",
            self.address,
            self.low_power
        );
        i2c.write(self.address, &cmd)?;
        delay.delay_ms(wait);
        let words = sensor::read_words(self.address, i2c)?;
        // temperature first
        let [temp, humidity] = sensor::verify(self.address, &words)?;
        let m = Measurement {
            temperature: Self::convert_temperature(temp),
            relative_humidity: Self::convert_humidity(humidity),
        };
        self.set_sleeping(i2c, delay, true)?;
        Ok(m)
    }
}

#[cfg(test)]
mod test {
    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};

    use super::*;
    use crate::{
        crc8,
        sensor::test::{RecordingDelay, response},
    };

    fn open(extra: &[I2cTransaction]) -> (Shtc3, I2cMock) {
        let mut expectations = vec![
            I2cTransaction::write(0x70, WAKE.to_vec()),
            I2cTransaction::write(0x70, SOFT_RESET.to_vec()),
        ];
        expectations.extend_from_slice(extra);
        let mut i2c = I2cMock::new(&expectations);
        let dev = Shtc3::new(&mut i2c, &mut RecordingDelay::default()).unwrap();
        (dev, i2c)
    }

    #[test]
    fn construction_wakes_then_resets_once() {
        let (dev, mut i2c) = open(&[]);
        assert_eq!(dev.address(), SHTC3_ADDRESS);
        assert!(!dev.sleeping());
        assert!(!dev.low_power());
        i2c.done();
    }

    #[test]
    fn measurement_cycle_sleeps_afterwards() {
        let (mut dev, mut i2c) = open(&[
            I2cTransaction::write(0x70, MEASURE_NORMAL.to_vec()),
            I2cTransaction::read(0x70, response(0x6642, 0x6CDA)),
            I2cTransaction::write(0x70, SLEEP.to_vec()),
            // next cycle starts asleep
            I2cTransaction::write(0x70, WAKE.to_vec()),
            I2cTransaction::write(0x70, MEASURE_LOW_POWER.to_vec()),
            I2cTransaction::read(0x70, response(0x6642, 0x6CDA)),
            I2cTransaction::write(0x70, SLEEP.to_vec()),
        ]);
        let mut delay = RecordingDelay::default();
        let first = dev.measurements(&mut i2c, &mut delay).unwrap();
        assert!(dev.sleeping());
        // 13 ms conversion + 1 ms sleep
        assert_eq!(delay.total_ms(), 14);

        dev.set_low_power(true);
        let mut delay = RecordingDelay::default();
        let second = dev.measurements(&mut i2c, &mut delay).unwrap();
        // wake + conversion + sleep
        assert_eq!(delay.total_ms(), 3);
        assert_eq!(first, second);
        i2c.done();
    }

    #[test]
    fn fixed_point_decode() {
        // 26178 -> ((4375 * 26178) >> 14) - 4500 = 2490
        assert_eq!(Shtc3::convert_temperature(0x6642), 24.9);
        // 27866 -> (625 * 27866) >> 12 = 4252
        assert_eq!(Shtc3::convert_humidity(0x6CDA), 42.52);
        assert_eq!(Shtc3::convert_temperature(0), -45.0);
        // no clamp: 65535 -> 99.99, never rounds past 100
        assert_eq!(Shtc3::convert_humidity(u16::MAX), 99.99);
    }

    #[test]
    fn corrupted_checksum_is_fatal_and_stays_awake() {
        let mut bytes = response(0x6642, 0x6CDA);
        bytes[2] ^= 0x80;
        let (mut dev, mut i2c) = open(&[
            I2cTransaction::write(0x70, MEASURE_NORMAL.to_vec()),
            I2cTransaction::read(0x70, bytes),
        ]);
        let res = dev.measurements(&mut i2c, &mut RecordingDelay::default());
        assert!(matches!(res, Err(Error::Crc { .. })));
        assert!(!dev.sleeping());
        i2c.done();
    }

    #[test]
    fn degraded_mode_reports_unavailable() {
        let mut bytes = response(0x6642, 0x6CDA);
        bytes[5] ^= 0x01;
        let (mut dev, mut i2c) = open(&[
            I2cTransaction::write(0x70, MEASURE_NORMAL.to_vec()),
            I2cTransaction::read(0x70, bytes),
            // no sleep after a bad read; the retry goes straight to measuring
            I2cTransaction::write(0x70, MEASURE_NORMAL.to_vec()),
            I2cTransaction::read(0x70, response(0x6642, 0x6CDA)),
            I2cTransaction::write(0x70, SLEEP.to_vec()),
        ]);
        let mut delay = RecordingDelay::default();
        assert_eq!(dev.measurements_or_unavailable(&mut i2c, &mut delay), Ok(None));
        let m = dev
            .measurements_or_unavailable(&mut i2c, &mut delay)
            .unwrap()
            .unwrap();
        assert_eq!(m.celsius(), 24.9);
        i2c.done();
    }

    #[test]
    fn degraded_mode_still_fails_on_bus_error() {
        let (mut dev, mut i2c) = open(&[
            I2cTransaction::write(0x70, MEASURE_NORMAL.to_vec()).with_error(ErrorKind::Other),
        ]);
        let res = dev.measurements_or_unavailable(&mut i2c, &mut RecordingDelay::default());
        assert_eq!(res, Err(Error::I2c(ErrorKind::Other)));
        i2c.done();
    }

    #[test]
    fn failed_sleep_keeps_state() {
        let (mut dev, mut i2c) = open(&[
            I2cTransaction::write(0x70, SLEEP.to_vec()).with_error(ErrorKind::Other),
        ]);
        let res = dev.set_sleeping(&mut i2c, &mut RecordingDelay::default(), true);
        assert!(res.is_err());
        assert!(!dev.sleeping());
        i2c.done();
    }

    #[test]
    fn construction_sends_two_byte_reset() {
        let expectations = [
            I2cTransaction::write(0x70, vec![0x35, 0x17]),
            I2cTransaction::write(0x70, vec![0x80, 0x5D]),
        ];
        let mut i2c = I2cMock::new(&expectations);
        let mut delay = RecordingDelay::default();
        Shtc3::new(&mut i2c, &mut delay).unwrap();
        // wake + reset
        assert_eq!(delay.total_ms(), 2);
        i2c.done();
    }

    #[test]
    fn reset_while_asleep_wakes_first() {
        let (mut dev, mut i2c) = open(&[
            I2cTransaction::write(0x70, SLEEP.to_vec()),
            I2cTransaction::write(0x70, WAKE.to_vec()),
            I2cTransaction::write(0x70, vec![0x80, 0x5D]),
        ]);
        let mut delay = RecordingDelay::default();
        dev.set_sleeping(&mut i2c, &mut delay, true).unwrap();
        dev.reset(&mut i2c, &mut delay).unwrap();
        assert!(!dev.sleeping());
        i2c.done();
    }

    #[test]
    fn serial_number_reads_id_register() {
        let (mut dev, mut i2c) = open(&[
            I2cTransaction::write_read(
                0x70,
                vec![0xEF, 0xC8],
                vec![0x08, 0x87, crc8(&[0x08, 0x87])],
            ),
            I2cTransaction::write_read(0x70, vec![0xEF, 0xC8], vec![0x08, 0x87, 0x00]),
        ]);
        let mut delay = RecordingDelay::default();
        assert_eq!(dev.serial_number(&mut i2c, &mut delay), Ok(0x0887));
        let res = dev.serial_number(&mut i2c, &mut delay);
        assert!(matches!(res, Err(Error::Crc { received: 0x00, .. })));
        i2c.done();
    }
}
