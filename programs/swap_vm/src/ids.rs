//! 32-byte identifiers for assets, accounts and programs
//!
//! Text form: a short printable name is zero-padded into the identifier
//! (`"USDC"`), anything else is base58. Text that is valid base58 of 32 bytes
//! always reads as base58, so a name like `"1111…"` that would be read back
//! that way prints in base58 instead.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Identifier text was neither a short name nor 32 bytes of base58
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid identifier `{0}`: expected a name of at most 32 printable ASCII bytes or base58 of 32 bytes")]
pub struct ParseIdError(pub String);

fn decode_base58(s: &str) -> Option<[u8; 32]> {
    let decoded = bs58::decode(s).into_vec().ok()?;
    <[u8; 32]>::try_from(decoded.as_slice()).ok()
}

fn parse_id(s: &str) -> Result<[u8; 32], ParseIdError> {
    if let Some(bytes) = decode_base58(s) {
        return Ok(bytes);
    }
    if !s.is_empty() && s.len() <= 32 && s.bytes().all(|b| b.is_ascii_graphic()) {
        let mut bytes = [0u8; 32];
        bytes[..s.len()].copy_from_slice(s.as_bytes());
        return Ok(bytes);
    }
    Err(ParseIdError(s.to_string()))
}

fn fmt_id(bytes: &[u8; 32], f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let len = bytes.iter().position(|&b| b == 0).unwrap_or(32);
    let (name, padding) = bytes.split_at(len);
    if len > 0 && padding.iter().all(|&b| b == 0) && name.iter().all(|b| b.is_ascii_graphic()) {
        // Printable by construction
        let name = core::str::from_utf8(name).map_err(|_| fmt::Error)?;
        if decode_base58(name).is_none() {
            return f.write_str(name);
        }
    }
    f.write_str(&bs58::encode(bytes).into_string())
}

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        pub struct $name(pub [u8; 32]);

        impl $name {
            pub const fn new(bytes: [u8; 32]) -> Self {
                Self(bytes)
            }

            pub fn as_bytes(&self) -> &[u8; 32] {
                &self.0
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                parse_id(s).map(Self)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt_id(&self.0, f)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

id_type!(
    /// Fungible asset identifier
    AssetId
);

id_type!(
    /// Account identifier (takers, fee recipients, oracles, external logic)
    Address
);

id_type!(
    /// Program identity; keys all per-order persistent state
    ProgramId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_round_trip() {
        let usdc: AssetId = "USDC".parse().unwrap();
        assert_eq!(&usdc.0[..4], b"USDC");
        assert!(usdc.0[4..].iter().all(|&b| b == 0));
        assert_eq!(usdc.to_string(), "USDC");
    }

    #[test]
    fn test_base58_lookalike_name_round_trip() {
        // Thirty-two '1's are base58 for the zero identifier
        let ones = "1".repeat(32);
        let zero: AssetId = ones.parse().unwrap();
        assert_eq!(zero, AssetId::default());
        assert_eq!(zero.to_string(), ones);

        // The same characters stored as a name print in base58
        let named = AssetId::new([b'1'; 32]);
        let text = named.to_string();
        assert_ne!(text, ones);
        assert_eq!(text.parse::<AssetId>().unwrap(), named);

        let short: AssetId = "111".parse().unwrap();
        assert_eq!(short.to_string(), "111");
    }

    #[test]
    fn test_base58_round_trip() {
        let raw = Address::new([7u8; 32]);
        let text = raw.to_string();
        assert_eq!(text.parse::<Address>().unwrap(), raw);
    }

    #[test]
    fn test_rejects_long_names() {
        let long = "x".repeat(33);
        assert!(long.parse::<AssetId>().is_err());
        assert!("".parse::<AssetId>().is_err());
        assert!("has space".parse::<AssetId>().is_err());
    }

    #[test]
    fn test_ordering_is_bytewise() {
        let a: AssetId = "AAA".parse().unwrap();
        let b: AssetId = "BBB".parse().unwrap();
        assert!(a < b);
    }

    #[test]
    fn test_serde_uses_text_form() {
        let weth: AssetId = "WETH".parse().unwrap();
        let json = serde_json::to_string(&weth).unwrap();
        assert_eq!(json, "\"WETH\"");
        let back: AssetId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, weth);
    }
}
