//! # CRC8-DVB-S2 Implementation
//!
//! Frame checksum for the wire transport.
//!
//! **Polynomial**: 0xD5 (x^8 + x^7 + x^6 + x^4 + x^2 + 1)
//! **Initial Value**: 0x00

/// CRC-8-DVB-S2 polynomial
const CRC8_POLY: u8 = 0xD5;

/// Precomputed CRC8 lookup table
const CRC8_TABLE: [u8; 256] = generate_crc8_table();

/// Generate CRC8 lookup table at compile time
const fn generate_crc8_table() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut i = 0;

    while i < 256 {
        let mut crc = i as u8;
        let mut j = 0;

        while j < 8 {
            if (crc & 0x80) != 0 {
                crc = (crc << 1) ^ CRC8_POLY;
            } else {
                crc <<= 1;
            }
            j += 1;
        }

        table[i] = crc;
        i += 1;
    }

    table
}

/// Calculate the CRC8-DVB-S2 checksum of a byte slice.
///
/// The transport checksums length + type + payload of every frame.
#[must_use]
pub fn crc8_dvb_s2(data: &[u8]) -> u8 {
    let mut crc: u8 = 0;
    for &byte in data {
        crc = CRC8_TABLE[(crc ^ byte) as usize];
    }
    crc
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Bitwise reference implementation for verifying the table.
    fn crc8_dvb_s2_slow(data: &[u8]) -> u8 {
        let mut crc: u8 = 0;
        for &byte in data {
            crc ^= byte;
            for _ in 0..8 {
                if (crc & 0x80) != 0 {
                    crc = (crc << 1) ^ CRC8_POLY;
                } else {
                    crc <<= 1;
                }
            }
        }
        crc
    }

    #[test]
    fn test_crc8_empty() {
        assert_eq!(crc8_dvb_s2(&[]), 0x00);
    }

    #[test]
    fn test_crc8_table_matches_reference() {
        let vectors: [&[u8]; 5] = [
            &[0x00],
            &[0xFF],
            &[0x04, 0x01, 0x0F, 0x00],
            &[0x12, 0x34, 0x56, 0x78, 0x9A],
            &[0xB1; 16],
        ];
        for data in vectors {
            assert_eq!(crc8_dvb_s2(data), crc8_dvb_s2_slow(data), "data {:?}", data);
        }
    }

    #[test]
    fn test_crc8_changes_with_data() {
        assert_ne!(crc8_dvb_s2(&[0x04, 0x01, 0x00]), crc8_dvb_s2(&[0x04, 0x01, 0x01]));
    }
}
