//! Message addresses.

use std::fmt;
use std::str::FromStr;

use base64::Engine;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};

use crate::{CellError, CellResult};

/// TON message address.
///
/// ```
/// use ton_cell::MsgAddress;
///
/// let raw = "0:83dfd552e63729b472fcbcc8c45ebcc6691702558b68ec7527e1ba403a0f31a8";
/// let addr: MsgAddress = raw.parse().unwrap();
/// assert_eq!(addr.to_string(), raw);
///
/// let friendly = addr.to_user_friendly(true, false).unwrap();
/// assert_eq!(MsgAddress::from_string(&friendly).unwrap(), addr);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum MsgAddress {
    /// `addr_none$00`
    #[default]
    Null,

    /// `addr_extern$01`
    External { len: u16, data: Vec<u8> },

    /// `addr_std$10`
    Internal { workchain: i32, address: [u8; 32] },
}

impl MsgAddress {
    pub fn internal(workchain: i32, address: [u8; 32]) -> Self {
        MsgAddress::Internal { workchain, address }
    }

    /// Parse a raw (`wc:hex`) or user-friendly (base64, 48 chars) address.
    /// An empty string is `addr_none`.
    pub fn from_string(s: &str) -> CellResult<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(MsgAddress::Null);
        }

        if let Some((wc, hash)) = s.split_once(':') {
            let workchain: i32 = wc
                .parse()
                .map_err(|_| CellError::InvalidAddress(format!("Invalid workchain: {}", wc)))?;
            let bytes = hex::decode(hash)
                .map_err(|e| CellError::InvalidAddress(format!("Invalid hex: {}", e)))?;
            let address: [u8; 32] = bytes.try_into().map_err(|b: Vec<u8>| {
                CellError::InvalidAddress(format!("Address must be 32 bytes, got {}", b.len()))
            })?;
            return Ok(MsgAddress::Internal { workchain, address });
        }

        if s.len() == 48 {
            return Self::from_user_friendly(s);
        }

        Err(CellError::InvalidAddress(format!(
            "Unrecognized address format: {}",
            s
        )))
    }

    /// `tag:u8 workchain:i8 hash:[u8;32] crc16:u16`, url-safe or standard base64.
    fn from_user_friendly(s: &str) -> CellResult<Self> {
        let normalized: String = s
            .chars()
            .map(|c| match c {
                '-' => '+',
                '_' => '/',
                c => c,
            })
            .collect();
        let bytes = STANDARD
            .decode(normalized)
            .map_err(|e| CellError::InvalidBase64(e.to_string()))?;
        if bytes.len() != 36 {
            return Err(CellError::InvalidAddress(format!(
                "User-friendly address must be 36 bytes, got {}",
                bytes.len()
            )));
        }

        let expected = u16::from_be_bytes([bytes[34], bytes[35]]);
        let actual = crc16_xmodem(&bytes[..34]);
        if expected != actual {
            return Err(CellError::InvalidAddress(format!(
                "CRC16 mismatch: expected {:04x}, got {:04x}",
                expected, actual
            )));
        }

        let mut address = [0u8; 32];
        address.copy_from_slice(&bytes[2..34]);
        Ok(MsgAddress::Internal {
            workchain: bytes[1] as i8 as i32,
            address,
        })
    }

    pub fn to_raw_string(&self) -> String {
        match self {
            MsgAddress::Null => String::new(),
            MsgAddress::External { len, data } => format!("extern:{}:{}", len, hex::encode(data)),
            MsgAddress::Internal { workchain, address } => {
                format!("{}:{}", workchain, hex::encode(address))
            }
        }
    }

    /// User-friendly form; `None` for non-internal addresses.
    pub fn to_user_friendly(&self, bounceable: bool, testnet: bool) -> Option<String> {
        let MsgAddress::Internal { workchain, address } = self else {
            return None;
        };
        let mut tag = if bounceable { 0x11 } else { 0x51 };
        if testnet {
            tag |= 0x80;
        }
        let mut data = Vec::with_capacity(36);
        data.push(tag);
        data.push(*workchain as i8 as u8);
        data.extend_from_slice(address);
        let crc = crc16_xmodem(&data);
        data.extend_from_slice(&crc.to_be_bytes());
        Some(URL_SAFE_NO_PAD.encode(data))
    }

    pub fn workchain(&self) -> Option<i32> {
        match self {
            MsgAddress::Internal { workchain, .. } => Some(*workchain),
            _ => None,
        }
    }

    pub fn hash_part(&self) -> Option<&[u8; 32]> {
        match self {
            MsgAddress::Internal { address, .. } => Some(address),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, MsgAddress::Null)
    }

    pub fn is_internal(&self) -> bool {
        matches!(self, MsgAddress::Internal { .. })
    }
}

impl FromStr for MsgAddress {
    type Err = CellError;

    fn from_str(s: &str) -> CellResult<Self> {
        Self::from_string(s)
    }
}

impl fmt::Display for MsgAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_raw_string())
    }
}

fn crc16_xmodem(data: &[u8]) -> u16 {
    let mut crc: u16 = 0;
    for &byte in data {
        crc ^= (byte as u16) << 8;
        for _ in 0..8 {
            crc = if crc & 0x8000 != 0 {
                (crc << 1) ^ 0x1021
            } else {
                crc << 1
            };
        }
    }
    crc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_roundtrip() {
        let addr = MsgAddress::internal(-1, [0x12; 32]);
        let parsed = MsgAddress::from_string(&addr.to_string()).unwrap();
        assert_eq!(parsed, addr);
        assert_eq!(parsed.workchain(), Some(-1));
    }

    #[test]
    fn test_empty_is_null() {
        assert!(MsgAddress::from_string("  ").unwrap().is_null());
        assert_eq!(MsgAddress::Null.to_user_friendly(true, false), None);
    }

    #[test]
    fn test_bad_inputs() {
        assert!(MsgAddress::from_string("x:00").is_err());
        assert!(MsgAddress::from_string("0:abcd").is_err());
        assert!(MsgAddress::from_string("not an address").is_err());
    }

    #[test]
    fn test_user_friendly_crc_checked() {
        let addr = MsgAddress::internal(0, [0xAB; 32]);
        let friendly = addr.to_user_friendly(false, true).unwrap();
        assert_eq!(friendly.len(), 48);
        assert_eq!(MsgAddress::from_string(&friendly).unwrap(), addr);

        let mut corrupted: Vec<char> = friendly.chars().collect();
        corrupted[10] = if corrupted[10] == 'A' { 'B' } else { 'A' };
        let corrupted: String = corrupted.into_iter().collect();
        assert!(MsgAddress::from_string(&corrupted).is_err());
    }

    #[test]
    fn test_crc16_vector() {
        assert_eq!(crc16_xmodem(b"123456789"), 0x31C3);
    }
}
