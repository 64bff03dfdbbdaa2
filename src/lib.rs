//! Pillar/XDP market-data capture decoder and order-book reconstructor.
//!
//! This crate replays a captured UDP multicast feed (NYSE Pillar "XDP"
//! integrated feed) from a pcap file and maintains a live limit-order book
//! per security:
//!
//! - `pcap`: offline capture reader (raw frames with captured lengths)
//! - `frame`: Ethernet / IPv4 / UDP peel down to the feed packet
//! - `packet`: XDP packet header and length-prefixed message framing
//! - `messages`: typed decode of every business message
//! - `orderbook`: per-symbol books with arena-allocated orders and a
//!   cached top-10 view per side
//! - `symbols`: symbol-index metadata (ticker text, price scale)
//! - `feed`: sequential dispatch, snapshot policy, counters
//! - `render`: top-of-book snapshot text
//!
//! The binaries in this repository (`src/main.rs` and
//! `src/bin/gen_capture.rs`) use these modules to replay captures and to
//! produce synthetic ones.

pub mod config;
pub mod feed;
pub mod frame;
pub mod messages;
pub mod orderbook;
pub mod packet;
pub mod pcap;
pub mod render;
pub mod symbols;
