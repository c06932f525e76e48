#[derive(Debug, Default)]
/// Calculate CRC-8 used in 1-Wire communications.
pub struct OneWireCrc(u8);

impl OneWireCrc {
    /// Get the current CRC value
    pub fn value(&self) -> u8 {
        self.0
    }

    /// Update the CRC with the incoming byte.
    pub fn update(&mut self, byte: u8) {
        let mut crc = self.0 ^ byte;
        for _ in 0..8 {
            if crc & 0x1 == 0x1 {
                crc = (crc >> 1) ^ 0x8c; // x^8 + x^5 + x^4 + 1, reflected
            } else {
                crc >>= 1;
            }
        }
        self.0 = crc;
    }

    /// CRC of a whole sequence.
    pub fn checksum(sequence: &[u8]) -> u8 {
        let mut crc = OneWireCrc::default();
        sequence.iter().for_each(|&b| crc.update(b));
        crc.value()
    }

    /// Validate a sequence of bytes where the last byte is the 1-Wire CRC of
    /// the previous bytes.
    pub fn validate(sequence: &[u8]) -> bool {
        Self::checksum(sequence) == 0x0
    }
}

#[cfg(test)]
mod tests {
    use super::OneWireCrc;

    #[test]
    fn application_note_rom() {
        // family 0x02, serial 0x00000001b81c, crc 0xa2
        let rom = [0x02, 0x1c, 0xb8, 0x01, 0x00, 0x00, 0x00, 0xa2];
        assert_eq!(OneWireCrc::checksum(&rom[..7]), 0xa2);
        assert!(OneWireCrc::validate(&rom));
    }

    #[test]
    fn appended_checksum_validates() {
        for _ in 0..64 {
            let mut seq: [u8; 8] = rand::random();
            seq[7] = OneWireCrc::checksum(&seq[..7]);
            assert!(OneWireCrc::validate(&seq));
            seq[3] ^= 0x10;
            assert!(!OneWireCrc::validate(&seq));
        }
    }
}
