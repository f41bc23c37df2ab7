// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// `.ico` container handling.
//
// A favicon.ico usually bundles several sizes. The best one is extracted:
// PNG entries are returned as-is, BMP entries are rewrapped into a
// single-entry `.ico` so the `image` crate can decode them.

use tracing::debug;

const HEADER_LEN: usize = 6;
const ENTRY_LEN: usize = 16;
const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

/// One directory entry of an `.ico` file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IcoEntry {
    /// Width in pixels (a stored 0 means 256).
    pub width: u32,
    pub height: u32,
    /// Raw 16-byte directory record.
    record: [u8; ENTRY_LEN],
    pub size: usize,
    pub offset: usize,
}

fn u16_at(data: &[u8], at: usize) -> Option<u16> {
    Some(u16::from_le_bytes(data.get(at..at + 2)?.try_into().ok()?))
}

fn u32_at(data: &[u8], at: usize) -> Option<u32> {
    Some(u32::from_le_bytes(data.get(at..at + 4)?.try_into().ok()?))
}

/// Whether `data` starts with an icon directory header.
pub fn is_ico(data: &[u8]) -> bool {
    matches!(
        (u16_at(data, 0), u16_at(data, 2), u16_at(data, 4)),
        (Some(0), Some(1), Some(n)) if n > 0
    )
}

/// Read the directory; `None` when the header or any entry is out of bounds.
pub fn entries(data: &[u8]) -> Option<Vec<IcoEntry>> {
    if !is_ico(data) {
        return None;
    }
    let count = usize::from(u16_at(data, 4)?);
    (0..count)
        .map(|i| {
            let at = HEADER_LEN + i * ENTRY_LEN;
            let record: [u8; ENTRY_LEN] = data.get(at..at + ENTRY_LEN)?.try_into().ok()?;
            let size = u32_at(&record, 8)? as usize;
            let offset = u32_at(&record, 12)? as usize;
            if offset.checked_add(size)? > data.len() {
                return None;
            }
            let dimension = |byte: u8| if byte == 0 { 256 } else { u32::from(byte) };
            Some(IcoEntry {
                width: dimension(record[0]),
                height: dimension(record[1]),
                record,
                size,
                offset,
            })
        })
        .collect()
}

/// Pick the entry whose width equals `target_size`, else the widest one,
/// and return it as a standalone image file.
pub fn select(data: &[u8], target_size: u32) -> Option<Vec<u8>> {
    let entries = entries(data)?;
    let best = entries
        .iter()
        .find(|e| e.width == target_size)
        .or_else(|| entries.iter().max_by_key(|e| e.width))?;
    debug!(
        entries = entries.len(),
        width = best.width,
        target_size,
        "icon entry selected"
    );

    let payload = &data[best.offset..best.offset + best.size];
    if payload.starts_with(PNG_SIGNATURE) {
        return Some(payload.to_vec());
    }

    let mut single = Vec::with_capacity(HEADER_LEN + ENTRY_LEN + payload.len());
    single.extend_from_slice(&[0, 0, 1, 0, 1, 0]);
    let mut record = best.record;
    record[12..16].copy_from_slice(&((HEADER_LEN + ENTRY_LEN) as u32).to_le_bytes());
    single.extend_from_slice(&record);
    single.extend_from_slice(payload);
    Some(single)
}
