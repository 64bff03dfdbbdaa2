// src/feed.rs
//
// Sequential driver for one feed channel: peels frames, frames packets,
// decodes messages and applies them to the per-symbol books. Owns the
// symbol table and the session cursor, and decides when a top-of-book
// snapshot is due (symbol switch or a top-10 move).
//
// Every failure is reported through the sink and processing continues with
// the next message or frame; nothing here aborts a replay.

use crate::frame::{self, FrameError};
use crate::messages::{self, MessageError, Msg};
use crate::orderbook::{Book, BookError, Books, TOP_DEPTH};
use crate::packet::{self, PacketError};
use crate::render;
use crate::symbols::SymbolTable;
use log::{debug, info, warn};
use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum FeedError {
    #[error(transparent)]
    Frame(#[from] FrameError),
    #[error(transparent)]
    Packet(#[from] PacketError),
    #[error(transparent)]
    Message(#[from] MessageError),
    #[error("book error on symbol {symbol_index}: {source}")]
    Book {
        symbol_index: u32,
        source: BookError,
    },
    #[error("sequence gap: expected {expected}, got {got}")]
    SequenceGap { expected: u32, got: u32 },
}

/// Receives snapshots and diagnostics from the replay. Implementations
/// decide where they go; the engine itself never touches stdout.
pub trait FeedSink {
    fn on_snapshot(&mut self, symbol_index: u32, rendered: &str);
    fn on_error(&mut self, err: &FeedError);
}

/// Default sink: snapshots to stdout, diagnostics to the log. Skipped
/// frames (foreign traffic in the capture) only show up at debug level.
#[derive(Debug, Default)]
pub struct LogSink {
    pub print_snapshots: bool,
}

impl FeedSink for LogSink {
    fn on_snapshot(&mut self, _symbol_index: u32, rendered: &str) {
        if self.print_snapshots {
            println!("{rendered}");
        }
    }

    fn on_error(&mut self, err: &FeedError) {
        match err {
            FeedError::Frame(e) if e.is_skip() => debug!("{e}"),
            FeedError::Message(MessageError::UnknownType(_)) => debug!("{err}"),
            _ => warn!("{err}"),
        }
    }
}

/// Plain counters accumulated over a replay and logged as the end-of-run
/// summary.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FeedStats {
    pub frames: u64,
    pub frames_skipped: u64,
    pub frames_malformed: u64,
    pub packets: u64,
    pub messages: u64,
    pub unknown_messages: u64,
    pub decode_errors: u64,
    pub book_errors: u64,
    pub sequence_gaps: u64,
    pub snapshots: u64,
}

pub struct Feed {
    books: Books,
    symbols: SymbolTable,
    /// Sequence number the next packet should carry, once known.
    next_seq: Option<u32>,
    /// Symbol touched by the last applied book mutation.
    current_symbol: Option<u32>,
    /// Levels per side rendered into snapshots.
    snapshot_depth: usize,
    stats: FeedStats,
}

impl Default for Feed {
    fn default() -> Self {
        Self::new()
    }
}

impl Feed {
    pub fn new() -> Self {
        Self {
            books: Books::new(),
            symbols: SymbolTable::new(),
            next_seq: None,
            current_symbol: None,
            snapshot_depth: TOP_DEPTH,
            stats: FeedStats::default(),
        }
    }

    /// Reporting depth for emitted snapshots, up to the ten levels the
    /// engine tracks. Change detection always uses the full top-10 view.
    pub fn set_snapshot_depth(&mut self, depth: usize) {
        self.snapshot_depth = depth.clamp(1, TOP_DEPTH);
    }

    /// Process one captured Ethernet frame end to end.
    pub fn apply_frame(&mut self, frame_bytes: &[u8], sink: &mut dyn FeedSink) {
        self.stats.frames += 1;
        match frame::udp_payload(frame_bytes) {
            Ok(payload) => self.apply_packet(payload, sink),
            Err(e) => {
                if e.is_skip() {
                    self.stats.frames_skipped += 1;
                } else {
                    self.stats.frames_malformed += 1;
                }
                sink.on_error(&FeedError::Frame(e));
            }
        }
    }

    /// Frame one feed packet into messages and apply each in order.
    pub fn apply_packet(&mut self, payload: &[u8], sink: &mut dyn FeedSink) {
        let (hdr, iter) = match packet::messages(payload) {
            Ok(v) => v,
            Err(e) => {
                self.stats.decode_errors += 1;
                sink.on_error(&FeedError::Packet(e));
                return;
            }
        };
        self.stats.packets += 1;
        self.track_sequence(hdr.sequence_number, hdr.num_messages, sink);

        for item in iter {
            match item {
                Ok(raw) => match messages::decode(raw.msg_type, raw.body) {
                    Ok(msg) => self.apply_message(&msg, sink),
                    Err(e) => {
                        if matches!(e, MessageError::UnknownType(_)) {
                            self.stats.unknown_messages += 1;
                        } else {
                            self.stats.decode_errors += 1;
                        }
                        sink.on_error(&FeedError::Message(e));
                    }
                },
                Err(e) => {
                    // The framer stops at the first bad record; earlier
                    // messages in this packet stay applied.
                    self.stats.decode_errors += 1;
                    sink.on_error(&FeedError::Packet(e));
                }
            }
        }
    }

    /// Apply one decoded message. Book mutations may emit a snapshot;
    /// informational messages are narrated at debug level.
    pub fn apply_message(&mut self, msg: &Msg, sink: &mut dyn FeedSink) {
        self.stats.messages += 1;
        match msg {
            Msg::SequenceNumberReset(m) => {
                debug!(
                    "sequence number reset: product={} channel={}",
                    m.product_id, m.channel_id
                );
                self.next_seq = None;
            }
            Msg::SourceTimeReference(m) => {
                debug!("source time reference: id={} time={}", m.id, m.source_time);
            }
            Msg::SymbolIndexMapping(m) => {
                debug!(
                    "symbol mapping: {} -> {:?} scale={}",
                    m.symbol_index, m.symbol, m.price_scale_code
                );
                self.symbols.apply_mapping(m);
            }
            Msg::SecurityStatus(m) => {
                debug!(
                    "security status: symbol={} status={} market_state={}",
                    m.symbol_index, m.security_status as char, m.market_state as char
                );
            }
            Msg::SymbolClear(m) => {
                let changed = self.books.book_mut(m.symbol_index).clear();
                self.after_mutation(m.symbol_index, changed, sink);
            }
            Msg::AddOrder(m) => {
                let r = self
                    .books
                    .book_mut(m.symbol_index)
                    .add(m.order_id, m.price, m.volume, m.side, m.firm_id);
                self.finish_book_op(m.symbol_index, r, sink);
            }
            Msg::AddOrderRefresh(m) => {
                let r = self
                    .books
                    .book_mut(m.symbol_index)
                    .add(m.order_id, m.price, m.volume, m.side, m.firm_id);
                self.finish_book_op(m.symbol_index, r, sink);
            }
            Msg::ModifyOrder(m) => {
                let r = self
                    .books
                    .book_mut(m.symbol_index)
                    .modify(m.order_id, m.price, m.volume, m.side);
                self.finish_book_op(m.symbol_index, r, sink);
            }
            Msg::DeleteOrder(m) => {
                let r = self.books.book_mut(m.symbol_index).delete(m.order_id);
                self.finish_book_op(m.symbol_index, r, sink);
            }
            Msg::OrderExecution(m) => {
                let r = self
                    .books
                    .book_mut(m.symbol_index)
                    .execute(m.order_id, m.volume);
                self.finish_book_op(m.symbol_index, r, sink);
            }
            Msg::ReplaceOrder(m) => {
                let r = self.books.book_mut(m.symbol_index).replace(
                    m.order_id,
                    m.new_order_id,
                    m.price,
                    m.volume,
                    m.side,
                );
                self.finish_book_op(m.symbol_index, r, sink);
            }
            Msg::NonDisplayedTrade(m) => {
                debug!(
                    "non-displayed trade: symbol={} trade_id={} price={} volume={}",
                    m.symbol_index, m.trade_id, m.price, m.volume
                );
            }
            Msg::CrossTrade(m) => {
                debug!(
                    "cross trade: symbol={} cross_id={} price={} volume={} ({})",
                    m.symbol_index,
                    m.cross_id,
                    m.price,
                    m.volume,
                    m.cross_type_name()
                );
            }
            Msg::TradeCancel(m) => {
                debug!(
                    "trade cancel: symbol={} trade_id={}",
                    m.symbol_index, m.trade_id
                );
            }
            Msg::CrossCorrection(m) => {
                debug!(
                    "cross correction: symbol={} cross_id={} volume={}",
                    m.symbol_index, m.cross_id, m.volume
                );
            }
            Msg::Imbalance(m) => {
                debug!(
                    "imbalance: symbol={} paired={} total={} match_price={}",
                    m.symbol_index, m.paired_qty, m.total_imbalance_qty, m.indicative_match_price
                );
            }
            Msg::RetailPriceImprovement(m) => {
                debug!(
                    "retail price improvement: symbol={} ({})",
                    m.symbol_index,
                    m.indicator_name()
                );
            }
        }
    }

    fn finish_book_op(
        &mut self,
        symbol_index: u32,
        result: Result<bool, BookError>,
        sink: &mut dyn FeedSink,
    ) {
        match result {
            Ok(top_changed) => self.after_mutation(symbol_index, top_changed, sink),
            Err(source) => {
                self.stats.book_errors += 1;
                sink.on_error(&FeedError::Book {
                    symbol_index,
                    source,
                });
            }
        }
    }

    /// Snapshot policy: emit when the mutated symbol differs from the
    /// previous one, or when the top-10 view moved.
    fn after_mutation(&mut self, symbol_index: u32, top_changed: bool, sink: &mut dyn FeedSink) {
        let symbol_changed = self.current_symbol != Some(symbol_index);
        self.current_symbol = Some(symbol_index);
        if symbol_changed || top_changed {
            self.stats.snapshots += 1;
            if let Some(book) = self.books.get(symbol_index) {
                let text =
                    render::render_book(symbol_index, book, &self.symbols, self.snapshot_depth);
                sink.on_snapshot(symbol_index, &text);
            }
        }
    }

    fn track_sequence(&mut self, seq: u32, num_messages: u8, sink: &mut dyn FeedSink) {
        if let Some(expected) = self.next_seq {
            if seq != expected {
                self.stats.sequence_gaps += 1;
                sink.on_error(&FeedError::SequenceGap {
                    expected,
                    got: seq,
                });
            }
        }
        self.next_seq = Some(seq.wrapping_add(num_messages as u32));
    }

    // ------------------------------- Views ---------------------------------

    pub fn book(&self, symbol_index: u32) -> Option<&Book> {
        self.books.get(symbol_index)
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn stats(&self) -> &FeedStats {
        &self.stats
    }

    pub fn log_summary(&self) {
        let s = &self.stats;
        info!(
            "replay complete: frames={} skipped={} malformed={} packets={} messages={} \
             unknown={} decode_errors={} book_errors={} gaps={} snapshots={} \
             symbols={} live_orders={}",
            s.frames,
            s.frames_skipped,
            s.frames_malformed,
            s.packets,
            s.messages,
            s.unknown_messages,
            s.decode_errors,
            s.book_errors,
            s.sequence_gaps,
            s.snapshots,
            self.symbols.len(),
            self.books.order_count(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::{AddOrder, DeleteOrder, OrderExecution, Side};
    use crate::packet::build as pkt;

    #[derive(Default)]
    struct Recorder {
        snapshots: Vec<(u32, String)>,
        errors: Vec<FeedError>,
    }

    impl FeedSink for Recorder {
        fn on_snapshot(&mut self, symbol_index: u32, rendered: &str) {
            self.snapshots.push((symbol_index, rendered.to_string()));
        }

        fn on_error(&mut self, err: &FeedError) {
            self.errors.push(*err);
        }
    }

    fn add(symbol_index: u32, order_id: u64, price: u32, volume: u32, side: Side) -> Msg {
        Msg::AddOrder(AddOrder {
            source_time_ns: 0,
            symbol_index,
            symbol_seq_num: 0,
            order_id,
            price,
            volume,
            side,
            firm_id: *b"TEST ",
        })
    }

    #[test]
    fn snapshot_on_symbol_switch_even_without_top_change() {
        let mut feed = Feed::new();
        let mut sink = Recorder::default();
        feed.apply_message(&add(1, 10, 100, 5, Side::Bid), &mut sink);
        feed.apply_message(&add(2, 20, 100, 5, Side::Bid), &mut sink);
        // Back to symbol 1 at an existing level: top-10 unchanged there,
        // but the symbol switched.
        feed.apply_message(&add(1, 11, 100, 5, Side::Bid), &mut sink);
        let emitted: Vec<u32> = sink.snapshots.iter().map(|(s, _)| *s).collect();
        assert_eq!(emitted, [1, 2, 1]);
    }

    #[test]
    fn no_snapshot_when_neither_condition_holds() {
        let mut feed = Feed::new();
        let mut sink = Recorder::default();
        feed.apply_message(&add(1, 10, 100, 5, Side::Bid), &mut sink);
        // Partial execution on the same symbol leaves the price set alone.
        feed.apply_message(
            &Msg::OrderExecution(OrderExecution {
                source_time_ns: 0,
                symbol_index: 1,
                symbol_seq_num: 0,
                order_id: 10,
                trade_id: 900,
                price: 100,
                volume: 2,
                printable_flag: 1,
                trade_conds: *b"@   ",
            }),
            &mut sink,
        );
        assert_eq!(sink.snapshots.len(), 1);
        assert_eq!(feed.book(1).unwrap().resting_volume(10), Some(3));
    }

    #[test]
    fn snapshot_depth_caps_rendered_levels() {
        let mut feed = Feed::new();
        feed.set_snapshot_depth(1);
        let mut sink = Recorder::default();
        feed.apply_message(&add(1, 10, 100, 5, Side::Bid), &mut sink);
        feed.apply_message(&add(1, 11, 101, 5, Side::Bid), &mut sink);
        let (_, last) = sink.snapshots.last().unwrap();
        assert!(last.contains("101:"));
        assert!(!last.contains("100:"));
    }

    #[test]
    fn book_errors_are_reported_and_non_fatal() {
        let mut feed = Feed::new();
        let mut sink = Recorder::default();
        feed.apply_message(
            &Msg::DeleteOrder(DeleteOrder {
                source_time_ns: 0,
                symbol_index: 1,
                symbol_seq_num: 0,
                order_id: 404,
            }),
            &mut sink,
        );
        assert_eq!(
            sink.errors,
            [FeedError::Book {
                symbol_index: 1,
                source: BookError::UnknownOrderId(404),
            }]
        );
        // The feed keeps going afterwards.
        feed.apply_message(&add(1, 10, 100, 5, Side::Bid), &mut sink);
        assert_eq!(feed.stats().book_errors, 1);
        assert_eq!(feed.book(1).unwrap().order_count(), 1);
    }

    #[test]
    fn truncated_second_message_keeps_first_applied() {
        let mut feed = Feed::new();
        let mut sink = Recorder::default();
        let (t1, b1) = messages::build::encode(&add(1, 10, 100, 5, Side::Bid));
        let (t2, b2) = messages::build::encode(&add(1, 11, 101, 5, Side::Bid));
        let mut payload = pkt::packet(1, 0, &[(t1, b1), (t2, b2)]);
        // Inflate the second message's size field past the packet end.
        let second = 16 + 4 + 35;
        payload[second..second + 2].copy_from_slice(&300u16.to_le_bytes());
        // The header's packet_size still matches the payload length.
        feed.apply_packet(&payload, &mut sink);
        assert_eq!(feed.book(1).unwrap().order_count(), 1);
        assert!(matches!(
            sink.errors.as_slice(),
            [FeedError::Packet(PacketError::MessageTruncated { index: 1, .. })]
        ));
    }

    #[test]
    fn sequence_gap_is_informational() {
        let mut feed = Feed::new();
        let mut sink = Recorder::default();
        let (t, b) = messages::build::encode(&add(1, 10, 100, 5, Side::Bid));
        feed.apply_packet(&pkt::packet(100, 0, &[(t, b.clone())]), &mut sink);
        // Next expected is 101; jump to 105.
        feed.apply_packet(&pkt::packet(105, 0, &[]), &mut sink);
        assert_eq!(feed.stats().sequence_gaps, 1);
        assert!(matches!(
            sink.errors.last(),
            Some(FeedError::SequenceGap {
                expected: 101,
                got: 105,
            })
        ));
        // The book built by the first packet is intact.
        assert_eq!(feed.book(1).unwrap().order_count(), 1);
    }
}
