//! Little-endian argument reader and writers
//!
//! Records are `[code u8][len u8][args; len]`. Argument fields are fixed-width
//! little-endian integers and raw 32-byte identifiers.

use crate::error::DecodeError;
use crate::ids::{Address, AssetId};
use crate::opcode::Opcode;

/// Width of an encoded identifier
pub const ID_LEN: usize = 32;

/// Width of one `(asset, u64)` list entry
pub const ENTRY_LEN: usize = ID_LEN + 8;

/// Sequential reader over one record's argument bytes
pub struct ArgReader<'a> {
    data: &'a [u8],
    pos: usize,
    opcode: Opcode,
    offset: usize,
}

impl<'a> ArgReader<'a> {
    /// Reader for the arguments of the record at byte `offset`
    pub fn new(data: &'a [u8], opcode: Opcode, offset: usize) -> Self {
        Self {
            data,
            pos: 0,
            opcode,
            offset,
        }
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn short(&self, expected: usize) -> DecodeError {
        DecodeError::ArgumentLength {
            opcode: self.opcode,
            offset: self.offset,
            expected,
            actual: self.data.len(),
        }
    }

    pub fn read_bytes<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let end = self.pos + N;
        let slice = self.data.get(self.pos..end).ok_or_else(|| self.short(end))?;
        let mut out = [0u8; N];
        out.copy_from_slice(slice);
        self.pos = end;
        Ok(out)
    }

    pub fn read_u16(&mut self) -> Result<u16, DecodeError> {
        self.read_bytes::<2>().map(u16::from_le_bytes)
    }

    pub fn read_u32(&mut self) -> Result<u32, DecodeError> {
        self.read_bytes::<4>().map(u32::from_le_bytes)
    }

    pub fn read_u64(&mut self) -> Result<u64, DecodeError> {
        self.read_bytes::<8>().map(u64::from_le_bytes)
    }

    pub fn read_asset(&mut self) -> Result<AssetId, DecodeError> {
        self.read_bytes::<ID_LEN>().map(AssetId::new)
    }

    pub fn read_address(&mut self) -> Result<Address, DecodeError> {
        self.read_bytes::<ID_LEN>().map(Address::new)
    }

    /// Everything not yet consumed
    pub fn read_rest(&mut self) -> Vec<u8> {
        let rest = self.data[self.pos..].to_vec();
        self.pos = self.data.len();
        rest
    }

    /// `n × (asset, u64)` entries filling the whole argument
    pub fn read_entries(&mut self) -> Result<Vec<(AssetId, u64)>, DecodeError> {
        if self.remaining() % ENTRY_LEN != 0 {
            let whole = self.remaining() / ENTRY_LEN + 1;
            return Err(self.short(self.pos + whole * ENTRY_LEN));
        }
        let mut entries = Vec::with_capacity(self.remaining() / ENTRY_LEN);
        while self.remaining() > 0 {
            let asset = self.read_asset()?;
            let value = self.read_u64()?;
            entries.push((asset, value));
        }
        Ok(entries)
    }

    /// Fail if unread bytes remain
    pub fn finish(self) -> Result<(), DecodeError> {
        if self.pos == self.data.len() {
            Ok(())
        } else {
            Err(DecodeError::ArgumentLength {
                opcode: self.opcode,
                offset: self.offset,
                expected: self.pos,
                actual: self.data.len(),
            })
        }
    }

    /// Argument validation failure for this record
    pub fn invalid(&self, reason: &'static str) -> DecodeError {
        DecodeError::InvalidArgument {
            opcode: self.opcode,
            offset: self.offset,
            reason,
        }
    }
}

pub fn write_u16(out: &mut Vec<u8>, v: u16) {
    out.extend_from_slice(&v.to_le_bytes());
}

pub fn write_u32(out: &mut Vec<u8>, v: u32) {
    out.extend_from_slice(&v.to_le_bytes());
}

pub fn write_u64(out: &mut Vec<u8>, v: u64) {
    out.extend_from_slice(&v.to_le_bytes());
}

pub fn write_entries(out: &mut Vec<u8>, entries: &[(AssetId, u64)]) {
    for (asset, value) in entries {
        out.extend_from_slice(asset.as_bytes());
        write_u64(out, *value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_little_endian() {
        let mut data = Vec::new();
        write_u16(&mut data, 0x0102);
        write_u32(&mut data, 7);
        write_u64(&mut data, u64::MAX - 1);
        let mut r = ArgReader::new(&data, Opcode::Twap, 0);
        assert_eq!(r.read_u16().unwrap(), 0x0102);
        assert_eq!(r.read_u32().unwrap(), 7);
        assert_eq!(r.read_u64().unwrap(), u64::MAX - 1);
        assert!(r.finish().is_ok());
    }

    #[test]
    fn test_short_read_reports_lengths() {
        let data = [1u8, 2, 3];
        let mut r = ArgReader::new(&data, Opcode::Deadline, 4);
        assert_eq!(
            r.read_u64(),
            Err(DecodeError::ArgumentLength {
                opcode: Opcode::Deadline,
                offset: 4,
                expected: 8,
                actual: 3,
            })
        );
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let data = [0u8; 5];
        let mut r = ArgReader::new(&data, Opcode::Decay, 0);
        r.read_u32().unwrap();
        assert!(r.finish().is_err());
    }

    #[test]
    fn test_entries_must_be_whole() {
        let usdc: AssetId = "USDC".parse().unwrap();
        let mut data = Vec::new();
        write_entries(&mut data, &[(usdc, 100)]);
        let mut r = ArgReader::new(&data, Opcode::StaticBalances, 0);
        assert_eq!(r.read_entries().unwrap(), vec![(usdc, 100)]);

        data.push(0);
        let mut r = ArgReader::new(&data, Opcode::StaticBalances, 0);
        assert!(r.read_entries().is_err());
    }
}
