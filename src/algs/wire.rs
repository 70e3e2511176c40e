//! Fixed little-endian wire records for the element-graph exchanges.
//!
//! Received buffers carry no alignment guarantee, so decoding always goes
//! through unaligned reads.

use bytemuck::{Pod, Zeroable};
use std::mem::size_of;

pub fn cast_slice<T: Pod>(v: &[T]) -> &[u8] {
    bytemuck::cast_slice(v)
}

/// Decode a byte buffer holding a whole number of `T` records.
pub fn decode_records<T: Pod>(bytes: &[u8]) -> Result<Vec<T>, String> {
    let sz = size_of::<T>();
    if sz == 0 || bytes.len() % sz != 0 {
        return Err(format!(
            "{} bytes is not a whole number of {sz}-byte records",
            bytes.len()
        ));
    }
    Ok(bytes
        .chunks_exact(sz)
        .map(bytemuck::pod_read_unaligned::<T>)
        .collect())
}

pub fn expect_exact_len(actual: usize, expected: usize) -> Result<(), String> {
    if actual == expected {
        Ok(())
    } else {
        Err(format!("expected {expected} bytes, got {actual}"))
    }
}

/// Record count prefixed to variable-length payloads.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct WireCount {
    pub n_le: u64,
}

impl WireCount {
    pub fn new(n: usize) -> Self {
        Self {
            n_le: (n as u64).to_le(),
        }
    }
    pub fn get(&self) -> usize {
        u64::from_le(self.n_le) as usize
    }
}

/// A global element id on the wire.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct WireGlobalId {
    pub id_le: u64,
}

impl WireGlobalId {
    pub fn of(id: u64) -> Self {
        Self { id_le: id.to_le() }
    }
    pub fn get(&self) -> u64 {
        u64::from_le(self.id_le)
    }
}

/// One block's locally known shape, reduced across processes.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct WireBlockShape {
    pub nodes_le: u32,
    /// Element type wire code; `NULL_ELEMENT_CODE` when the block is empty here.
    pub type_code_le: u32,
}

impl WireBlockShape {
    pub fn new(nodes: u32, type_code: u32) -> Self {
        Self {
            nodes_le: nodes.to_le(),
            type_code_le: type_code.to_le(),
        }
    }
    pub fn nodes(&self) -> u32 {
        u32::from_le(self.nodes_le)
    }
    pub fn type_code(&self) -> u32 {
        u32::from_le(self.type_code_le)
    }
}

/// Encode `[count][ids...]`.
pub fn encode_global_ids(ids: &[u64]) -> Vec<u8> {
    let mut out = Vec::with_capacity(size_of::<WireCount>() + ids.len() * size_of::<WireGlobalId>());
    out.extend_from_slice(bytemuck::bytes_of(&WireCount::new(ids.len())));
    for &id in ids {
        out.extend_from_slice(bytemuck::bytes_of(&WireGlobalId::of(id)));
    }
    out
}

/// Decode `[count][ids...]`, requiring exactly `expected` ids.
pub fn decode_global_ids(bytes: &[u8], expected: usize) -> Result<Vec<u64>, String> {
    let hdr = size_of::<WireCount>();
    if bytes.len() < hdr {
        return Err(format!("message of {} bytes has no count header", bytes.len()));
    }
    let (head, body) = bytes.split_at(hdr);
    let count = bytemuck::pod_read_unaligned::<WireCount>(head).get();
    if count != expected {
        return Err(format!("peer sent {count} ids, map has {expected} entries"));
    }
    expect_exact_len(body.len(), count * size_of::<WireGlobalId>())?;
    Ok(decode_records::<WireGlobalId>(body)?
        .iter()
        .map(WireGlobalId::get)
        .collect())
}

/// Size in bytes of an encoded id array of `n` entries.
pub fn global_ids_len(n: usize) -> usize {
    size_of::<WireCount>() + n * size_of::<WireGlobalId>()
}

const _: () = {
    assert!(size_of::<WireCount>() == 8);
    assert!(size_of::<WireGlobalId>() == 8);
    assert!(size_of::<WireBlockShape>() == 8);
};
