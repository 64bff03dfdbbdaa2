// src/pcap.rs
//
// Minimal offline reader for classic pcap captures: the whole file is read
// into memory and walked record by record, yielding raw Ethernet frames
// with their captured lengths. Both byte orders and both timestamp
// resolutions are accepted; pcapng is not.

use anyhow::{bail, Context};
use std::fs;
use std::path::Path;

const MAGIC_USEC: u32 = 0xA1B2_C3D4;
const MAGIC_NSEC: u32 = 0xA1B2_3C4D;
const GLOBAL_HEADER_LEN: usize = 24;
const RECORD_HEADER_LEN: usize = 16;

pub const LINKTYPE_ETHERNET: u32 = 1;

pub struct CaptureReader {
    data: Vec<u8>,
    off: usize,
    swapped: bool,
    nanos: bool,
}

/// One captured frame. `data.len()` is the captured length; `orig_len` is
/// the on-wire length (longer when the capture used a snap length).
pub struct Record<'a> {
    pub data: &'a [u8],
    pub orig_len: u32,
    pub ts_ns: u64,
}

impl CaptureReader {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let data =
            fs::read(path).with_context(|| format!("open capture {}", path.display()))?;
        Self::from_bytes(data)
    }

    pub fn from_bytes(data: Vec<u8>) -> anyhow::Result<Self> {
        if data.len() < GLOBAL_HEADER_LEN {
            bail!("capture too small for pcap global header");
        }
        let magic = u32::from_le_bytes([data[0], data[1], data[2], data[3]]);
        let (swapped, nanos) = match magic {
            MAGIC_USEC => (false, false),
            MAGIC_NSEC => (false, true),
            m if m == MAGIC_USEC.swap_bytes() => (true, false),
            m if m == MAGIC_NSEC.swap_bytes() => (true, true),
            other => bail!("unrecognized capture magic {other:#010x}"),
        };
        let mut reader = Self {
            data,
            off: GLOBAL_HEADER_LEN,
            swapped,
            nanos,
        };
        let link_type = reader.read_u32(20);
        if link_type != LINKTYPE_ETHERNET {
            bail!("unsupported link type {link_type} (expected Ethernet)");
        }
        Ok(reader)
    }

    #[inline]
    fn read_u32(&self, off: usize) -> u32 {
        let raw = u32::from_le_bytes([
            self.data[off],
            self.data[off + 1],
            self.data[off + 2],
            self.data[off + 3],
        ]);
        if self.swapped {
            raw.swap_bytes()
        } else {
            raw
        }
    }

    /// Next frame, or `None` at end of file. A record header that overruns
    /// the file ends iteration; the truncated tail is dropped.
    pub fn next_record(&mut self) -> Option<Record<'_>> {
        if self.off + RECORD_HEADER_LEN > self.data.len() {
            return None;
        }
        let ts_sec = self.read_u32(self.off) as u64;
        let ts_frac = self.read_u32(self.off + 4) as u64;
        let incl_len = self.read_u32(self.off + 8) as usize;
        let orig_len = self.read_u32(self.off + 12);
        let start = self.off + RECORD_HEADER_LEN;
        let end = start.checked_add(incl_len)?;
        if end > self.data.len() {
            return None;
        }
        self.off = end;
        let ts_ns = ts_sec * 1_000_000_000 + ts_frac * if self.nanos { 1 } else { 1_000 };
        Some(Record {
            data: &self.data[start..end],
            orig_len,
            ts_ns,
        })
    }
}

/// Capture construction for tests and `gen_capture`. Writes classic pcap
/// with microsecond timestamps, little-endian, Ethernet link type.
pub mod write {
    use super::{GLOBAL_HEADER_LEN, LINKTYPE_ETHERNET, MAGIC_USEC, RECORD_HEADER_LEN};

    pub fn global_header(out: &mut Vec<u8>) {
        out.reserve(GLOBAL_HEADER_LEN);
        out.extend_from_slice(&MAGIC_USEC.to_le_bytes());
        out.extend_from_slice(&2u16.to_le_bytes()); // version major
        out.extend_from_slice(&4u16.to_le_bytes()); // version minor
        out.extend_from_slice(&0i32.to_le_bytes()); // thiszone
        out.extend_from_slice(&0u32.to_le_bytes()); // sigfigs
        out.extend_from_slice(&65_535u32.to_le_bytes()); // snaplen
        out.extend_from_slice(&LINKTYPE_ETHERNET.to_le_bytes());
    }

    pub fn record(out: &mut Vec<u8>, ts_sec: u32, ts_usec: u32, frame: &[u8]) {
        out.reserve(RECORD_HEADER_LEN + frame.len());
        out.extend_from_slice(&ts_sec.to_le_bytes());
        out.extend_from_slice(&ts_usec.to_le_bytes());
        out.extend_from_slice(&(frame.len() as u32).to_le_bytes());
        out.extend_from_slice(&(frame.len() as u32).to_le_bytes());
        out.extend_from_slice(frame);
    }
}
