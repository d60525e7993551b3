use crc::{Algorithm, Crc};

// SHT4x datasheet section 4.4, same for the SHTC3
/// The CRC-8 algorithm Sensirion uses to protect every 16-bit word on the wire.
pub const CRC_8_SENSIRION: Algorithm<u8> = Algorithm {
    width: 8,
    poly: 0x31,
    init: 0xFF,
    refin: false,
    refout: false,
    xorout: 0x00,
    check: 0xF7,
    residue: 0x00,
};

const CRC: Crc<u8> = Crc::<u8>::new(&CRC_8_SENSIRION);

/// Computes the Sensirion CRC-8 over `data`.
///
/// The sensor sends one checksum per 2-byte word, so `data` is normally two bytes long.
pub fn crc8(data: &[u8]) -> u8 {
    CRC.checksum(data)
}

/// One 16-bit word of a response together with the checksum the sensor sent for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Word {
    pub(crate) bytes: [u8; 2],
    pub(crate) crc: u8,
}

impl Word {
    pub(crate) fn from_chunk(chunk: &[u8; 3]) -> Self {
        Self {
            bytes: [chunk[0], chunk[1]],
            crc: chunk[2],
        }
    }

    /// Returns the checksum computed locally if it disagrees with the sensor's.
    pub(crate) fn mismatch(&self) -> Option<u8> {
        let computed = crc8(&self.bytes);
        (computed != self.crc).then_some(computed)
    }

    pub(crate) fn value(&self) -> u16 {
        u16::from_be_bytes(self.bytes)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn crc_known_vector() {
        assert_eq!(crc8(&[0xBE, 0xEF]), 0x92);
    }

    #[test]
    fn crc_matches_bitwise_definition() {
        fn bitwise(data: &[u8]) -> u8 {
            let mut crc: u8 = 0xFF;
            for byte in data {
                crc ^= byte;
                for _ in 0..8 {
                    crc = if crc & 0x80 != 0 {
                        (crc << 1) ^ 0x31
                    } else {
                        crc << 1
                    };
                }
            }
            crc
        }
        for hi in (0..=u8::MAX).step_by(7) {
            for lo in 0..=u8::MAX {
                assert_eq!(crc8(&[hi, lo]), bitwise(&[hi, lo]), "{hi:#04x}{lo:02x}");
            }
        }
    }

    #[test]
    fn word_detects_corruption() {
        let good = Word::from_chunk(&[0xBE, 0xEF, 0x92]);
        assert_eq!(good.mismatch(), None);
        assert_eq!(good.value(), 0xBEEF);

        let bad = Word::from_chunk(&[0xBE, 0xEF, 0x93]);
        assert_eq!(bad.mismatch(), Some(0x92));
    }
}
