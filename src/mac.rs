//! MAC address scheme
//!
//! Characters are encoded into the access point's BSSID: a fixed
//! locally-administered prefix `02:7a:6d:a0` followed by the character's two
//! catalog bytes. The `02` first octet marks the address as locally
//! administered and unicast, so no vendor OUI is impersonated.

use crate::catalog::Character;
use crate::error::{Error, Result};

/// Fixed prefix of every character MAC (first four octets)
pub const MAC_PREFIX: &str = "02:7a:6d:a0";

/// Build the broadcast MAC for a character
pub fn character_mac(character: &Character) -> String {
    format_mac(character.byte1, character.byte2)
}

/// Build a MAC from a raw byte pair
pub fn format_mac(byte1: u8, byte2: u8) -> String {
    format!("{MAC_PREFIX}:{byte1:02x}:{byte2:02x}")
}

/// Extract the character byte pair from a MAC string
///
/// Accepts `:` or `-` separated hex octets, any case. Fails on anything
/// that is not exactly six octets.
pub fn parse_mac_bytes(mac: &str) -> Result<(u8, u8)> {
    let octets: Vec<u8> = mac
        .split([':', '-'])
        .map(|part| u8::from_str_radix(part, 16))
        .collect::<std::result::Result<_, _>>()
        .map_err(|_| Error::invalid_mac(mac))?;

    if octets.len() != 6 {
        return Err(Error::invalid_mac(mac));
    }
    Ok((octets[4], octets[5]))
}

/// Check whether a string is a syntactically valid MAC address
pub fn is_valid_mac(mac: &str) -> bool {
    parse_mac_bytes(mac).is_ok()
}

/// Check whether a MAC carries the tamalink character prefix
pub fn is_character_mac(mac: &str) -> bool {
    if !is_valid_mac(mac) {
        return false;
    }
    mac.to_lowercase()
        .replace('-', ":")
        .starts_with(MAC_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Character;

    fn character(byte1: u8, byte2: u8) -> Character {
        Character {
            byte1,
            byte2,
            name: "Test".to_string(),
            season: None,
        }
    }

    #[test]
    fn test_character_mac_format() {
        assert_eq!(character_mac(&character(0x00, 0x00)), "02:7a:6d:a0:00:00");
        assert_eq!(character_mac(&character(0x01, 0xA0)), "02:7a:6d:a0:01:a0");
    }

    #[test]
    fn test_format_mac_zero_pads() {
        assert_eq!(format_mac(0x0, 0xF), "02:7a:6d:a0:00:0f");
    }

    #[test]
    fn test_parse_round_trip() {
        let mac = format_mac(0x02, 0xE0);
        assert_eq!(parse_mac_bytes(&mac).unwrap(), (0x02, 0xE0));
    }

    #[test]
    fn test_parse_accepts_dashes_and_uppercase() {
        assert_eq!(parse_mac_bytes("02-7A-6D-A0-01-B0").unwrap(), (0x01, 0xB0));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(parse_mac_bytes("").is_err());
        assert!(parse_mac_bytes("02:7a:6d:a0:00").is_err());
        assert!(parse_mac_bytes("02:7a:6d:a0:00:00:00").is_err());
        assert!(parse_mac_bytes("02:7a:6d:a0:zz:00").is_err());
    }

    #[test]
    fn test_is_character_mac() {
        assert!(is_character_mac("02:7a:6d:a0:00:10"));
        assert!(is_character_mac("02:7A:6D:A0:00:10"));
        assert!(!is_character_mac("aa:bb:cc:dd:ee:ff"));
        assert!(!is_character_mac("not a mac"));
    }
}
