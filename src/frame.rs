// src/frame.rs
//
// Peels the transport layers off a captured Ethernet frame down to the UDP
// payload carrying one feed packet. Only IPv4/UDP traffic is of interest;
// anything else in the capture is skipped, not failed.

use thiserror::Error;

pub const ETH_HEADER_LEN: usize = 14;
pub const ETHERTYPE_IPV4: u16 = 0x0800;
pub const IP_PROTO_UDP: u8 = 17;
const IPV4_MIN_HEADER_LEN: usize = 20;
const UDP_HEADER_LEN: usize = 8;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    #[error("frame truncated: need {required} bytes, have {available}")]
    Truncated { required: usize, available: usize },
    #[error("not IPv4 (ethertype {0:#06x})")]
    NotIpv4(u16),
    #[error("not UDP (protocol {0})")]
    NotUdp(u8),
    #[error("UDP payload exceeds frame: payload ends at {end}, frame is {len} bytes")]
    PayloadExceedsFrame { end: usize, len: usize },
}

impl FrameError {
    /// Non-matching traffic (ARP, TCP, ...) is expected in a capture and is
    /// skipped; only malformed frames count as decode failures.
    #[inline]
    pub fn is_skip(&self) -> bool {
        matches!(self, FrameError::NotIpv4(_) | FrameError::NotUdp(_))
    }
}

#[inline]
fn be_u16(b: &[u8]) -> u16 {
    u16::from_be_bytes([b[0], b[1]])
}

/// Locate the UDP payload within a captured Ethernet frame.
///
/// Validates the ethertype, the IPv4 protocol byte and the UDP length field
/// (which includes the 8-byte UDP header) against the captured length.
pub fn udp_payload(frame: &[u8]) -> Result<&[u8], FrameError> {
    if frame.len() < ETH_HEADER_LEN {
        return Err(FrameError::Truncated {
            required: ETH_HEADER_LEN,
            available: frame.len(),
        });
    }
    let ethertype = be_u16(&frame[12..14]);
    if ethertype != ETHERTYPE_IPV4 {
        return Err(FrameError::NotIpv4(ethertype));
    }
    if frame.len() < ETH_HEADER_LEN + IPV4_MIN_HEADER_LEN {
        return Err(FrameError::Truncated {
            required: ETH_HEADER_LEN + IPV4_MIN_HEADER_LEN,
            available: frame.len(),
        });
    }

    // IHL is the low nibble of the first IPv4 byte, in 32-bit words.
    let ip_header_len = ((frame[ETH_HEADER_LEN] & 0x0f) as usize) * 4;
    if ip_header_len < IPV4_MIN_HEADER_LEN {
        return Err(FrameError::Truncated {
            required: IPV4_MIN_HEADER_LEN,
            available: ip_header_len,
        });
    }
    let protocol = frame[ETH_HEADER_LEN + 9];
    if protocol != IP_PROTO_UDP {
        return Err(FrameError::NotUdp(protocol));
    }

    let udp_off = ETH_HEADER_LEN + ip_header_len;
    if frame.len() < udp_off + UDP_HEADER_LEN {
        return Err(FrameError::Truncated {
            required: udp_off + UDP_HEADER_LEN,
            available: frame.len(),
        });
    }

    // UDP length includes its own 8-byte header.
    let udp_len = be_u16(&frame[udp_off + 4..udp_off + 6]) as usize;
    let payload_len = udp_len
        .checked_sub(UDP_HEADER_LEN)
        .ok_or(FrameError::Truncated {
            required: UDP_HEADER_LEN,
            available: udp_len,
        })?;
    let payload_off = udp_off + UDP_HEADER_LEN;
    let end = payload_off + payload_len;
    if end > frame.len() {
        return Err(FrameError::PayloadExceedsFrame {
            end,
            len: frame.len(),
        });
    }
    Ok(&frame[payload_off..end])
}

/// Frame construction for captures written by tests and `gen_capture`.
pub mod build {
    use super::{ETHERTYPE_IPV4, ETH_HEADER_LEN, IP_PROTO_UDP, UDP_HEADER_LEN};

    /// Wrap a feed packet in Ethernet + IPv4 (no options) + UDP headers.
    pub fn udp_frame(payload: &[u8]) -> Vec<u8> {
        let mut f = Vec::with_capacity(ETH_HEADER_LEN + 20 + UDP_HEADER_LEN + payload.len());
        // Ethernet: synthetic MACs, IPv4 ethertype
        f.extend_from_slice(&[0x02, 0, 0, 0, 0, 0x01]);
        f.extend_from_slice(&[0x02, 0, 0, 0, 0, 0x02]);
        f.extend_from_slice(&ETHERTYPE_IPV4.to_be_bytes());
        // IPv4: version 4, IHL 5
        let ip_total = (20 + UDP_HEADER_LEN + payload.len()) as u16;
        f.push(0x45);
        f.push(0);
        f.extend_from_slice(&ip_total.to_be_bytes());
        f.extend_from_slice(&[0, 0, 0, 0]); // id, flags/frag
        f.push(64); // ttl
        f.push(IP_PROTO_UDP);
        f.extend_from_slice(&[0, 0]); // checksum (not validated offline)
        f.extend_from_slice(&[10, 0, 0, 1]);
        f.extend_from_slice(&[224, 0, 90, 1]);
        // UDP
        let udp_len = (UDP_HEADER_LEN + payload.len()) as u16;
        f.extend_from_slice(&11_000u16.to_be_bytes());
        f.extend_from_slice(&11_001u16.to_be_bytes());
        f.extend_from_slice(&udp_len.to_be_bytes());
        f.extend_from_slice(&[0, 0]); // checksum optional over IPv4
        f.extend_from_slice(payload);
        f
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_payload_from_plain_frame() {
        let frame = build::udp_frame(b"pillar");
        assert_eq!(udp_payload(&frame).unwrap(), b"pillar");
    }

    #[test]
    fn skips_non_ipv4() {
        let mut frame = build::udp_frame(b"x");
        frame[12..14].copy_from_slice(&0x0806u16.to_be_bytes()); // ARP
        assert_eq!(udp_payload(&frame), Err(FrameError::NotIpv4(0x0806)));
        assert!(udp_payload(&frame).unwrap_err().is_skip());
    }

    #[test]
    fn skips_non_udp() {
        let mut frame = build::udp_frame(b"x");
        frame[ETH_HEADER_LEN + 9] = 6; // TCP
        assert_eq!(udp_payload(&frame), Err(FrameError::NotUdp(6)));
    }

    #[test]
    fn honors_ip_options() {
        // Rebuild with IHL=6 (one 4-byte option word).
        let plain = build::udp_frame(b"abc");
        let mut frame = Vec::new();
        frame.extend_from_slice(&plain[..ETH_HEADER_LEN]);
        frame.push(0x46);
        frame.extend_from_slice(&plain[ETH_HEADER_LEN + 1..ETH_HEADER_LEN + 20]);
        frame.extend_from_slice(&[0, 0, 0, 0]); // option word
        frame.extend_from_slice(&plain[ETH_HEADER_LEN + 20..]);
        assert_eq!(udp_payload(&frame).unwrap(), b"abc");
    }

    #[test]
    fn rejects_payload_overrun() {
        let mut frame = build::udp_frame(b"abcdef");
        let truncated = frame.len() - 3;
        frame.truncate(truncated);
        assert!(matches!(
            udp_payload(&frame),
            Err(FrameError::PayloadExceedsFrame { .. })
        ));
    }

    #[test]
    fn rejects_short_frame() {
        assert!(matches!(
            udp_payload(&[0u8; 10]),
            Err(FrameError::Truncated { .. })
        ));
    }
}
