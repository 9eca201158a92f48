//! Fixed-layout encoding of packed call arguments and ledger replies.
//!
//! Layout is explicit: `u32` little-endian counts, `u16`-length-prefixed
//! UTF-8 strings, `u64` little-endian amounts. A claim status reply is
//! exactly 10 bytes: eligible flag, claimed flag, amount. Any shape
//! mismatch fails with a decode error; nothing is inferred from the bytes.

use crate::claims::{ClaimRecord, ClaimStatus};
use crate::error::{ClaimError, Result};

/// Byte length of an encoded claim status reply.
pub const STATUS_REPLY_BYTES: usize = 10;

pub fn encode_fund_claims(registry_id: &str, funding: u64, claims: &[ClaimRecord]) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    put_str(&mut buf, registry_id)?;
    buf.extend_from_slice(&funding.to_le_bytes());
    buf.extend_from_slice(&(claims.len() as u32).to_le_bytes());
    for claim in claims {
        put_str(&mut buf, &claim.address)?;
        buf.extend_from_slice(&claim.amount.to_le_bytes());
    }
    Ok(buf)
}

pub fn decode_fund_claims(bytes: &[u8]) -> Result<(String, u64, Vec<ClaimRecord>)> {
    let mut cursor = Cursor::new(bytes);
    let registry_id = cursor.take_str()?;
    let funding = cursor.take_u64()?;
    let count = cursor.take_u32()? as usize;
    let mut claims = Vec::with_capacity(count);
    for _ in 0..count {
        let address = cursor.take_str()?;
        let amount = cursor.take_u64()?;
        claims.push(ClaimRecord { address, amount });
    }
    cursor.finish()?;
    Ok((registry_id, funding, claims))
}

pub fn encode_address_list(registry_id: &str, addresses: &[String]) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    put_str(&mut buf, registry_id)?;
    buf.extend_from_slice(&(addresses.len() as u32).to_le_bytes());
    for address in addresses {
        put_str(&mut buf, address)?;
    }
    Ok(buf)
}

pub fn decode_address_list(bytes: &[u8]) -> Result<(String, Vec<String>)> {
    let mut cursor = Cursor::new(bytes);
    let registry_id = cursor.take_str()?;
    let count = cursor.take_u32()? as usize;
    let mut addresses = Vec::with_capacity(count);
    for _ in 0..count {
        addresses.push(cursor.take_str()?);
    }
    cursor.finish()?;
    Ok((registry_id, addresses))
}

pub fn encode_status_query(registry_id: &str, coin_type: &str, address: &str) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    put_str(&mut buf, registry_id)?;
    put_str(&mut buf, coin_type)?;
    put_str(&mut buf, address)?;
    Ok(buf)
}

pub fn decode_status_query(bytes: &[u8]) -> Result<(String, String, String)> {
    let mut cursor = Cursor::new(bytes);
    let registry_id = cursor.take_str()?;
    let coin_type = cursor.take_str()?;
    let address = cursor.take_str()?;
    cursor.finish()?;
    Ok((registry_id, coin_type, address))
}

pub fn encode_claim_status(status: &ClaimStatus) -> Vec<u8> {
    let mut buf = Vec::with_capacity(STATUS_REPLY_BYTES);
    buf.push(status.eligible as u8);
    buf.push(status.claimed as u8);
    buf.extend_from_slice(&status.amount.to_le_bytes());
    buf
}

pub fn decode_claim_status(bytes: &[u8]) -> Result<ClaimStatus> {
    if bytes.len() != STATUS_REPLY_BYTES {
        return Err(ClaimError::Decode(format!(
            "status reply must be {} bytes, got {}",
            STATUS_REPLY_BYTES,
            bytes.len()
        )));
    }
    let flag = |b: u8, name: &str| match b {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(ClaimError::Decode(format!("{} flag out of range: {}", name, other))),
    };
    let mut amount = [0u8; 8];
    amount.copy_from_slice(&bytes[2..10]);
    Ok(ClaimStatus {
        eligible: flag(bytes[0], "eligible")?,
        claimed: flag(bytes[1], "claimed")?,
        amount: u64::from_le_bytes(amount),
    })
}

fn put_str(buf: &mut Vec<u8>, s: &str) -> Result<()> {
    // the length prefix is u16; a silent cast would mis-split the payload
    let len = u16::try_from(s.len()).map_err(|_| {
        ClaimError::Config(format!(
            "string field of {} bytes exceeds the {}-byte encoding limit",
            s.len(),
            u16::MAX
        ))
    })?;
    buf.extend_from_slice(&len.to_le_bytes());
    buf.extend_from_slice(s.as_bytes());
    Ok(())
}

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.pos + n > self.bytes.len() {
            return Err(ClaimError::Decode(format!(
                "truncated reply: wanted {} bytes at offset {}, have {}",
                n,
                self.pos,
                self.bytes.len() - self.pos
            )));
        }
        let slice = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn take_u32(&mut self) -> Result<u32> {
        let mut raw = [0u8; 4];
        raw.copy_from_slice(self.take(4)?);
        Ok(u32::from_le_bytes(raw))
    }

    fn take_u64(&mut self) -> Result<u64> {
        let mut raw = [0u8; 8];
        raw.copy_from_slice(self.take(8)?);
        Ok(u64::from_le_bytes(raw))
    }

    fn take_str(&mut self) -> Result<String> {
        let mut raw = [0u8; 2];
        raw.copy_from_slice(self.take(2)?);
        let len = u16::from_le_bytes(raw) as usize;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|e| ClaimError::Decode(format!("invalid UTF-8 in string field: {}", e)))
    }

    fn finish(&self) -> Result<()> {
        if self.pos != self.bytes.len() {
            return Err(ClaimError::Decode(format!(
                "{} trailing bytes after payload",
                self.bytes.len() - self.pos
            )));
        }
        Ok(())
    }
}
