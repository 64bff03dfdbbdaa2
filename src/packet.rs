// src/packet.rs
//
// XDP packet framing: a 16-byte little-endian packet header followed by
// exactly `num_messages` length-prefixed messages. The framer yields raw
// (type, body) pairs; it does not interpret message types.

use thiserror::Error;

pub const PACKET_HEADER_LEN: usize = 16;
pub const MESSAGE_HEADER_LEN: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketHeader {
    pub packet_size: u16,
    pub delivery_flag: u8,
    pub num_messages: u8,
    pub sequence_number: u32,
    pub send_time: u64,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PacketError {
    #[error("packet too short for header: need 16 bytes, have {0}")]
    TooShort(usize),
    #[error("packet size mismatch: header says {declared}, payload is {actual} bytes")]
    SizeMismatch { declared: u16, actual: usize },
    #[error("message {index} truncated at offset {offset}")]
    MessageTruncated { index: u8, offset: usize },
}

#[inline]
fn le_u16(b: &[u8]) -> u16 {
    u16::from_le_bytes([b[0], b[1]])
}

#[inline]
fn le_u32(b: &[u8]) -> u32 {
    u32::from_le_bytes([b[0], b[1], b[2], b[3]])
}

#[inline]
fn le_u64(b: &[u8]) -> u64 {
    u64::from_le_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]])
}

impl PacketHeader {
    pub fn parse(payload: &[u8]) -> Result<PacketHeader, PacketError> {
        if payload.len() < PACKET_HEADER_LEN {
            return Err(PacketError::TooShort(payload.len()));
        }
        let hdr = PacketHeader {
            packet_size: le_u16(&payload[0..2]),
            delivery_flag: payload[2],
            num_messages: payload[3],
            sequence_number: le_u32(&payload[4..8]),
            send_time: le_u64(&payload[8..16]),
        };
        if hdr.packet_size as usize != payload.len() {
            return Err(PacketError::SizeMismatch {
                declared: hdr.packet_size,
                actual: payload.len(),
            });
        }
        Ok(hdr)
    }
}

/// One length-prefixed message as it appears on the wire: the numeric type
/// tag and the body with the 4-byte message header stripped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawMessage<'a> {
    pub msg_type: u16,
    pub body: &'a [u8],
}

/// Parse the packet header and return an iterator over its messages.
pub fn messages(payload: &[u8]) -> Result<(PacketHeader, MessageIter<'_>), PacketError> {
    let hdr = PacketHeader::parse(payload)?;
    Ok((
        hdr,
        MessageIter {
            buf: payload,
            off: PACKET_HEADER_LEN,
            index: 0,
            remaining: hdr.num_messages,
            failed: false,
        },
    ))
}

pub struct MessageIter<'a> {
    buf: &'a [u8],
    off: usize,
    index: u8,
    remaining: u8,
    failed: bool,
}

impl<'a> Iterator for MessageIter<'a> {
    type Item = Result<RawMessage<'a>, PacketError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.remaining == 0 {
            return None;
        }
        if self.off + MESSAGE_HEADER_LEN > self.buf.len() {
            self.failed = true;
            return Some(Err(PacketError::MessageTruncated {
                index: self.index,
                offset: self.off,
            }));
        }
        let msg_size = le_u16(&self.buf[self.off..self.off + 2]) as usize;
        let msg_type = le_u16(&self.buf[self.off + 2..self.off + 4]);
        // msg_size includes the 4-byte message header and must stay in bounds.
        if msg_size < MESSAGE_HEADER_LEN || self.off + msg_size > self.buf.len() {
            self.failed = true;
            return Some(Err(PacketError::MessageTruncated {
                index: self.index,
                offset: self.off,
            }));
        }
        let body = &self.buf[self.off + MESSAGE_HEADER_LEN..self.off + msg_size];
        self.off += msg_size;
        self.index += 1;
        self.remaining -= 1;
        Some(Ok(RawMessage { msg_type, body }))
    }
}

/// Packet construction for captures written by tests and `gen_capture`.
pub mod build {
    use super::{MESSAGE_HEADER_LEN, PACKET_HEADER_LEN};

    /// Assemble a feed packet from (type, body) pairs, filling in
    /// `packet_size` and `num_messages`.
    pub fn packet(sequence_number: u32, send_time: u64, msgs: &[(u16, Vec<u8>)]) -> Vec<u8> {
        let total: usize = PACKET_HEADER_LEN
            + msgs
                .iter()
                .map(|(_, b)| MESSAGE_HEADER_LEN + b.len())
                .sum::<usize>();
        let mut out = Vec::with_capacity(total);
        out.extend_from_slice(&(total as u16).to_le_bytes());
        out.push(1); // delivery flag: original delivery
        out.push(msgs.len() as u8);
        out.extend_from_slice(&sequence_number.to_le_bytes());
        out.extend_from_slice(&send_time.to_le_bytes());
        for (msg_type, body) in msgs {
            out.extend_from_slice(&((MESSAGE_HEADER_LEN + body.len()) as u16).to_le_bytes());
            out.extend_from_slice(&msg_type.to_le_bytes());
            out.extend_from_slice(body);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_header_and_iterates_messages() {
        let pkt = build::packet(42, 1_700_000_000, &[(100, vec![1, 2, 3]), (102, vec![4])]);
        let (hdr, iter) = messages(&pkt).unwrap();
        assert_eq!(hdr.packet_size as usize, pkt.len());
        assert_eq!(hdr.num_messages, 2);
        assert_eq!(hdr.sequence_number, 42);
        assert_eq!(hdr.send_time, 1_700_000_000);
        let msgs: Vec<_> = iter.map(|m| m.unwrap()).collect();
        assert_eq!(msgs[0].msg_type, 100);
        assert_eq!(msgs[0].body, &[1, 2, 3]);
        assert_eq!(msgs[1].msg_type, 102);
        assert_eq!(msgs[1].body, &[4]);
    }

    #[test]
    fn empty_packet_is_valid() {
        let pkt = build::packet(7, 0, &[]);
        let (hdr, mut iter) = messages(&pkt).unwrap();
        assert_eq!(hdr.num_messages, 0);
        assert!(iter.next().is_none());
    }

    #[test]
    fn rejects_size_mismatch() {
        let mut pkt = build::packet(1, 0, &[(100, vec![0; 8])]);
        pkt.push(0xff); // payload longer than declared
        assert_eq!(
            PacketHeader::parse(&pkt),
            Err(PacketError::SizeMismatch {
                declared: (pkt.len() - 1) as u16,
                actual: pkt.len(),
            })
        );
    }

    #[test]
    fn rejects_msg_size_below_header() {
        let mut pkt = build::packet(1, 0, &[(100, vec![0; 4])]);
        // Corrupt first message size to 3 (< 4-byte message header).
        pkt[PACKET_HEADER_LEN..PACKET_HEADER_LEN + 2].copy_from_slice(&3u16.to_le_bytes());
        let (_, mut iter) = messages(&pkt).unwrap();
        assert!(matches!(
            iter.next(),
            Some(Err(PacketError::MessageTruncated { index: 0, .. }))
        ));
        // The iterator does not advance past the corrupt record.
        assert!(iter.next().is_none());
    }

    #[test]
    fn second_message_overrun_stops_after_first() {
        let mut pkt = build::packet(1, 0, &[(100, vec![0; 4]), (102, vec![0; 4])]);
        // Inflate the second message's declared size past the packet end.
        let second = PACKET_HEADER_LEN + MESSAGE_HEADER_LEN + 4;
        pkt[second..second + 2].copy_from_slice(&200u16.to_le_bytes());
        let (_, mut iter) = messages(&pkt).unwrap();
        assert!(matches!(iter.next(), Some(Ok(RawMessage { msg_type: 100, .. }))));
        assert!(matches!(
            iter.next(),
            Some(Err(PacketError::MessageTruncated { index: 1, .. }))
        ));
        assert!(iter.next().is_none());
    }

    #[test]
    fn count_exceeding_payload_is_truncation() {
        let mut pkt = build::packet(1, 0, &[(100, vec![0; 4])]);
        pkt[3] = 3; // claim three messages; only one present
        let (_, iter) = messages(&pkt).unwrap();
        let results: Vec<_> = iter.collect();
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(matches!(
            results[1],
            Err(PacketError::MessageTruncated { index: 1, .. })
        ));
    }
}
