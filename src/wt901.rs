//! WT901 BLE notification decoding
//!
//! Each notification starts with `0x55` followed by a packet type. Type
//! `0x61` carries acceleration (three little-endian `i16` at bytes 2..8,
//! ±16 g full scale); type `0x71` is the answer to a magnetometer register
//! read (three `i16` at bytes 4..10, 150 LSB per µT). Vectors are returned
//! in register order; [`crate::HeadingCompensator`] maps them to the body
//! frame.

use nalgebra::Vector3;

use crate::types::InertialPacket;

/// Frame header byte
pub const PACKET_HEADER: u8 = 0x55;
/// Acceleration/angular rate/angle packet type
pub const ACCELERATION_PACKET: u8 = 0x61;
/// Register read reply type, used for the magnetometer
pub const MAGNETOMETER_PACKET: u8 = 0x71;
/// Shortest notification that can hold either packet
pub const MIN_PACKET_LEN: usize = 11;

/// Accelerometer full scale, g
const ACCELERATION_FULL_SCALE_G: f64 = 16.0;
/// Magnetometer sensitivity, LSB per µT
const MAGNETOMETER_LSB_PER_UT: f64 = 150.0;

/// Decode one notification.
///
/// Returns `None` for short or misframed packets and for packet types the
/// engine does not use.
///
/// # Example
/// ```
/// use fusion_wind::{InertialPacket, wt901};
///
/// // Gravity on the first register: 2048 LSB = 1 g
/// let packet = [0x55, 0x61, 0x00, 0x08, 0, 0, 0, 0, 0, 0, 0];
/// match wt901::decode_packet(&packet) {
///     Some(InertialPacket::Acceleration(a)) => assert_eq!(a.x, 1.0),
///     other => panic!("unexpected {other:?}"),
/// }
/// ```
pub fn decode_packet(data: &[u8]) -> Option<InertialPacket> {
    if data.len() < MIN_PACKET_LEN || data[0] != PACKET_HEADER {
        return None;
    }

    match data[1] {
        ACCELERATION_PACKET => {
            let raw = read_triplet(&data[2..8]);
            Some(InertialPacket::Acceleration(
                raw * (ACCELERATION_FULL_SCALE_G / 32768.0),
            ))
        }
        MAGNETOMETER_PACKET => {
            let raw = read_triplet(&data[4..10]);
            Some(InertialPacket::Magnetic(raw / MAGNETOMETER_LSB_PER_UT))
        }
        _ => None,
    }
}

/// Three consecutive little-endian `i16`
fn read_triplet(bytes: &[u8]) -> Vector3<f64> {
    let word = |i: usize| f64::from(i16::from_le_bytes([bytes[2 * i], bytes[2 * i + 1]]));
    Vector3::new(word(0), word(1), word(2))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn packet(kind: u8, payload: &[(usize, i16)]) -> Vec<u8> {
        let mut data = vec![0u8; 20];
        data[0] = PACKET_HEADER;
        data[1] = kind;
        for &(offset, value) in payload {
            data[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
        }
        data
    }

    #[test]
    fn test_decode_acceleration() {
        let data = packet(ACCELERATION_PACKET, &[(2, 2048), (4, -1024), (6, i16::MIN)]);
        let Some(InertialPacket::Acceleration(a)) = decode_packet(&data) else {
            panic!("expected acceleration");
        };
        assert_eq!(a, Vector3::new(1.0, -0.5, -16.0));
    }

    #[test]
    fn test_decode_magnetometer() {
        let data = packet(MAGNETOMETER_PACKET, &[(2, 0x3A), (4, 3000), (6, -1500), (8, 75)]);
        let Some(InertialPacket::Magnetic(m)) = decode_packet(&data) else {
            panic!("expected magnetometer");
        };
        assert_eq!(m, Vector3::new(20.0, -10.0, 0.5));
    }

    #[test]
    fn test_rejects_short_packet() {
        let data = packet(ACCELERATION_PACKET, &[(2, 2048)]);
        assert_eq!(decode_packet(&data[..MIN_PACKET_LEN - 1]), None);
        assert!(decode_packet(&data[..MIN_PACKET_LEN]).is_some());
        assert_eq!(decode_packet(&[]), None);
    }

    #[test]
    fn test_rejects_bad_header_and_unknown_type() {
        let mut data = packet(ACCELERATION_PACKET, &[(2, 2048)]);
        data[0] = 0x54;
        assert_eq!(decode_packet(&data), None);

        let data = packet(0x62, &[(2, 2048)]);
        assert_eq!(decode_packet(&data), None);
    }
}
