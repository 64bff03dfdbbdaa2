// src/messages.rs
//
// Typed decode of XDP business messages. Bodies are packed little-endian
// records at fixed offsets; the 64-bit order/trade identifiers are carried
// byte-reversed on the wire and are swapped when materialized so that
// in-memory identifiers match the venue's published values.
//
// A body shorter than the type's fixed layout is rejected without partial
// application; longer bodies are accepted and the tail ignored, which keeps
// the decoder tolerant of vendor extensions.

use thiserror::Error;

/// Message type tags carried in the 4-byte message header.
pub mod msg_type {
    pub const SEQUENCE_NUMBER_RESET: u16 = 1;
    pub const SOURCE_TIME_REFERENCE: u16 = 2;
    pub const SYMBOL_INDEX_MAPPING: u16 = 3;
    pub const SYMBOL_CLEAR: u16 = 32;
    pub const SECURITY_STATUS: u16 = 34;
    pub const ADD_ORDER: u16 = 100;
    pub const MODIFY_ORDER: u16 = 101;
    pub const DELETE_ORDER: u16 = 102;
    pub const ORDER_EXECUTION: u16 = 103;
    pub const REPLACE_ORDER: u16 = 104;
    pub const IMBALANCE: u16 = 105;
    pub const ADD_ORDER_REFRESH: u16 = 106;
    pub const NON_DISPLAYED_TRADE: u16 = 110;
    pub const CROSS_TRADE: u16 = 111;
    pub const TRADE_CANCEL: u16 = 112;
    pub const CROSS_CORRECTION: u16 = 113;
    pub const RETAIL_PRICE_IMPROVEMENT: u16 = 114;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Bid,
    Ask,
}

impl Side {
    /// 'B' marks the buy side; every other code rests on the sell side.
    #[inline]
    pub fn from_wire(b: u8) -> Side {
        if b == b'B' {
            Side::Bid
        } else {
            Side::Ask
        }
    }

    #[inline]
    pub fn to_wire(self) -> u8 {
        match self {
            Side::Bid => b'B',
            Side::Ask => b'S',
        }
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MessageError {
    #[error("message type {msg_type} truncated: need {required} bytes, have {available}")]
    Truncated {
        msg_type: u16,
        required: usize,
        available: usize,
    },
    #[error("unknown message type {0}")]
    UnknownType(u16),
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

// Order and trade identifiers arrive byte-reversed relative to the rest of
// the little-endian payload.
#[inline]
fn le_u64_swapped(b: &[u8]) -> u64 {
    le_u64(b).swap_bytes()
}

#[inline]
fn fixed<const N: usize>(b: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&b[..N]);
    out
}

// ---------------------------- Message bodies ----------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceNumberReset {
    pub source_time: u64,
    pub source_time_ns: u32,
    pub product_id: u16,
    pub channel_id: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceTimeReference {
    pub id: u16,
    pub symbol_seq_num: u32,
    pub source_time: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolIndexMapping {
    pub symbol_index: u32,
    pub symbol: String,
    pub market_id: u16,
    pub system_id: u8,
    pub exchange_code: u8,
    pub price_scale_code: u8,
    pub security_type: u8,
    pub lot_size: u16,
    pub prev_close_price: u32,
    pub prev_close_volume: u32,
    pub price_resolution: u8,
    pub round_lot: u8,
    pub mpv: u16,
    pub unit_of_trade: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolClear {
    pub source_time: u64,
    pub source_time_ns: u32,
    pub symbol_index: u32,
    pub next_source_seq_num: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecurityStatus {
    pub source_time: u32,
    pub source_time_ns: u32,
    pub symbol_index: u32,
    pub symbol_seq_num: u32,
    pub security_status: u8,
    pub halt_condition: u8,
    pub price1: u32,
    pub price2: u32,
    pub ssr_triggering_exchange_id: u8,
    pub ssr_triggering_volume: u32,
    pub time: u32,
    pub ssr_state: u8,
    pub market_state: u8,
    pub session_state: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddOrder {
    pub source_time_ns: u32,
    pub symbol_index: u32,
    pub symbol_seq_num: u32,
    pub order_id: u64,
    pub price: u32,
    pub volume: u32,
    pub side: Side,
    pub firm_id: [u8; 5],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModifyOrder {
    pub source_time_ns: u32,
    pub symbol_index: u32,
    pub symbol_seq_num: u32,
    pub order_id: u64,
    pub price: u32,
    pub volume: u32,
    pub position_change: u8,
    pub side: Side,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteOrder {
    pub source_time_ns: u32,
    pub symbol_index: u32,
    pub symbol_seq_num: u32,
    pub order_id: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderExecution {
    pub source_time_ns: u32,
    pub symbol_index: u32,
    pub symbol_seq_num: u32,
    pub order_id: u64,
    pub trade_id: u64,
    pub price: u32,
    pub volume: u32,
    pub printable_flag: u8,
    pub trade_conds: [u8; 4],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplaceOrder {
    pub source_time_ns: u32,
    pub symbol_index: u32,
    pub symbol_seq_num: u32,
    pub order_id: u64,
    pub new_order_id: u64,
    pub price: u32,
    pub volume: u32,
    pub side: Side,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Imbalance {
    pub source_time: u32,
    pub source_time_ns: u32,
    pub symbol_index: u32,
    pub symbol_seq_num: u32,
    pub reference_price: u32,
    pub paired_qty: u32,
    pub total_imbalance_qty: u32,
    pub market_imbalance_qty: u32,
    pub auction_time: u16,
    pub auction_type: u8,
    pub imbalance_side: u8,
    pub continuous_book_clearing_price: u32,
    pub auction_interest_clearing_price: u32,
    pub ssr_filing_price: u32,
    pub indicative_match_price: u32,
    pub upper_collar: u32,
    pub lower_collar: u32,
    pub auction_status: u8,
    pub freeze_status: u8,
    pub num_extensions: u8,
    pub unpaired_qty: u32,
    pub unpaired_side: u8,
    pub significant_imbalance: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddOrderRefresh {
    pub source_time: u32,
    pub source_time_ns: u32,
    pub symbol_index: u32,
    pub symbol_seq_num: u32,
    pub order_id: u64,
    pub price: u32,
    pub volume: u32,
    pub side: Side,
    pub firm_id: [u8; 5],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NonDisplayedTrade {
    pub source_time_ns: u32,
    pub symbol_index: u32,
    pub symbol_seq_num: u32,
    pub trade_id: u64,
    pub price: u32,
    pub volume: u32,
    pub printable_flag: u8,
    pub trade_conds: [u8; 4],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrossTrade {
    pub source_time_ns: u32,
    pub symbol_index: u32,
    pub symbol_seq_num: u32,
    pub cross_id: u32,
    pub price: u32,
    pub volume: u32,
    pub cross_type: u8,
}

impl CrossTrade {
    pub fn cross_type_name(&self) -> &'static str {
        match self.cross_type {
            b'E' => "market center early opening auction",
            b'O' => "market center opening auction",
            b'5' => "market center reopening auction",
            b'6' => "market center closing auction",
            _ => "unknown cross type",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TradeCancel {
    pub source_time_ns: u32,
    pub symbol_index: u32,
    pub symbol_seq_num: u32,
    pub trade_id: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrossCorrection {
    pub source_time_ns: u32,
    pub symbol_index: u32,
    pub symbol_seq_num: u32,
    pub cross_id: u32,
    pub volume: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetailPriceImprovement {
    pub source_time_ns: u32,
    pub symbol_index: u32,
    pub symbol_seq_num: u32,
    pub rpi_indicator: u8,
}

impl RetailPriceImprovement {
    pub fn indicator_name(&self) -> &'static str {
        match self.rpi_indicator {
            b' ' => "no retail interest",
            b'A' => "retail interest on the bid side",
            b'B' => "retail interest on the offer side",
            b'C' => "retail interest on both bid and offer sides",
            _ => "unknown indicator",
        }
    }
}

/// A decoded feed message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    SequenceNumberReset(SequenceNumberReset),
    SourceTimeReference(SourceTimeReference),
    SymbolIndexMapping(SymbolIndexMapping),
    SymbolClear(SymbolClear),
    SecurityStatus(SecurityStatus),
    AddOrder(AddOrder),
    ModifyOrder(ModifyOrder),
    DeleteOrder(DeleteOrder),
    OrderExecution(OrderExecution),
    ReplaceOrder(ReplaceOrder),
    Imbalance(Imbalance),
    AddOrderRefresh(AddOrderRefresh),
    NonDisplayedTrade(NonDisplayedTrade),
    CrossTrade(CrossTrade),
    TradeCancel(TradeCancel),
    CrossCorrection(CrossCorrection),
    RetailPriceImprovement(RetailPriceImprovement),
}

// Fixed body lengths per type (header-stripped).
const LEN_SEQUENCE_NUMBER_RESET: usize = 16;
const LEN_SOURCE_TIME_REFERENCE: usize = 14;
const LEN_SYMBOL_INDEX_MAPPING: usize = 40;
const LEN_SYMBOL_CLEAR: usize = 20;
const LEN_SECURITY_STATUS: usize = 42;
const LEN_ADD_ORDER: usize = 35;
const LEN_MODIFY_ORDER: usize = 31;
const LEN_DELETE_ORDER: usize = 21;
const LEN_ORDER_EXECUTION: usize = 42;
const LEN_REPLACE_ORDER: usize = 38;
const LEN_IMBALANCE: usize = 69;
const LEN_ADD_ORDER_REFRESH: usize = 39;
const LEN_NON_DISPLAYED_TRADE: usize = 33;
const LEN_CROSS_TRADE: usize = 25;
const LEN_TRADE_CANCEL: usize = 20;
const LEN_CROSS_CORRECTION: usize = 20;
const LEN_RETAIL_PRICE_IMPROVEMENT: usize = 13;

fn require(msg_type: u16, body: &[u8], required: usize) -> Result<(), MessageError> {
    if body.len() < required {
        return Err(MessageError::Truncated {
            msg_type,
            required,
            available: body.len(),
        });
    }
    Ok(())
}

/// Decode one message body according to its type tag.
pub fn decode(tag: u16, body: &[u8]) -> Result<Msg, MessageError> {
    match tag {
        msg_type::SEQUENCE_NUMBER_RESET => {
            require(tag, body, LEN_SEQUENCE_NUMBER_RESET)?;
            Ok(Msg::SequenceNumberReset(SequenceNumberReset {
                source_time: le_u64(&body[0..8]),
                source_time_ns: le_u32(&body[8..12]),
                product_id: le_u16(&body[12..14]),
                channel_id: le_u16(&body[14..16]),
            }))
        }
        msg_type::SOURCE_TIME_REFERENCE => {
            require(tag, body, LEN_SOURCE_TIME_REFERENCE)?;
            Ok(Msg::SourceTimeReference(SourceTimeReference {
                id: le_u16(&body[0..2]),
                symbol_seq_num: le_u32(&body[2..6]),
                source_time: le_u64(&body[6..14]),
            }))
        }
        msg_type::SYMBOL_INDEX_MAPPING => {
            require(tag, body, LEN_SYMBOL_INDEX_MAPPING)?;
            let raw = &body[4..15];
            let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
            Ok(Msg::SymbolIndexMapping(SymbolIndexMapping {
                symbol_index: le_u32(&body[0..4]),
                symbol: String::from_utf8_lossy(&raw[..end]).into_owned(),
                market_id: le_u16(&body[16..18]),
                system_id: body[18],
                exchange_code: body[19],
                price_scale_code: body[20],
                security_type: body[21],
                lot_size: le_u16(&body[22..24]),
                prev_close_price: le_u32(&body[24..28]),
                prev_close_volume: le_u32(&body[28..32]),
                price_resolution: body[32],
                round_lot: body[33],
                mpv: le_u16(&body[34..36]),
                unit_of_trade: le_u16(&body[36..38]),
            }))
        }
        msg_type::SYMBOL_CLEAR => {
            require(tag, body, LEN_SYMBOL_CLEAR)?;
            Ok(Msg::SymbolClear(SymbolClear {
                source_time: le_u64(&body[0..8]),
                source_time_ns: le_u32(&body[8..12]),
                symbol_index: le_u32(&body[12..16]),
                next_source_seq_num: le_u32(&body[16..20]),
            }))
        }
        msg_type::SECURITY_STATUS => {
            require(tag, body, LEN_SECURITY_STATUS)?;
            Ok(Msg::SecurityStatus(SecurityStatus {
                source_time: le_u32(&body[0..4]),
                source_time_ns: le_u32(&body[4..8]),
                symbol_index: le_u32(&body[8..12]),
                symbol_seq_num: le_u32(&body[12..16]),
                security_status: body[16],
                halt_condition: body[17],
                price1: le_u32(&body[22..26]),
                price2: le_u32(&body[26..30]),
                ssr_triggering_exchange_id: body[30],
                ssr_triggering_volume: le_u32(&body[31..35]),
                time: le_u32(&body[35..39]),
                ssr_state: body[39],
                market_state: body[40],
                session_state: body[41],
            }))
        }
        msg_type::ADD_ORDER => {
            require(tag, body, LEN_ADD_ORDER)?;
            Ok(Msg::AddOrder(AddOrder {
                source_time_ns: le_u32(&body[0..4]),
                symbol_index: le_u32(&body[4..8]),
                symbol_seq_num: le_u32(&body[8..12]),
                order_id: le_u64_swapped(&body[12..20]),
                price: le_u32(&body[20..24]),
                volume: le_u32(&body[24..28]),
                side: Side::from_wire(body[28]),
                firm_id: fixed::<5>(&body[29..34]),
            }))
        }
        msg_type::MODIFY_ORDER => {
            require(tag, body, LEN_MODIFY_ORDER)?;
            Ok(Msg::ModifyOrder(ModifyOrder {
                source_time_ns: le_u32(&body[0..4]),
                symbol_index: le_u32(&body[4..8]),
                symbol_seq_num: le_u32(&body[8..12]),
                order_id: le_u64_swapped(&body[12..20]),
                price: le_u32(&body[20..24]),
                volume: le_u32(&body[24..28]),
                position_change: body[28],
                side: Side::from_wire(body[29]),
            }))
        }
        msg_type::DELETE_ORDER => {
            require(tag, body, LEN_DELETE_ORDER)?;
            Ok(Msg::DeleteOrder(DeleteOrder {
                source_time_ns: le_u32(&body[0..4]),
                symbol_index: le_u32(&body[4..8]),
                symbol_seq_num: le_u32(&body[8..12]),
                order_id: le_u64_swapped(&body[12..20]),
            }))
        }
        msg_type::ORDER_EXECUTION => {
            require(tag, body, LEN_ORDER_EXECUTION)?;
            Ok(Msg::OrderExecution(OrderExecution {
                source_time_ns: le_u32(&body[0..4]),
                symbol_index: le_u32(&body[4..8]),
                symbol_seq_num: le_u32(&body[8..12]),
                order_id: le_u64_swapped(&body[12..20]),
                trade_id: le_u64_swapped(&body[20..28]),
                price: le_u32(&body[28..32]),
                volume: le_u32(&body[32..36]),
                printable_flag: body[36],
                trade_conds: fixed::<4>(&body[38..42]),
            }))
        }
        msg_type::REPLACE_ORDER => {
            require(tag, body, LEN_REPLACE_ORDER)?;
            Ok(Msg::ReplaceOrder(ReplaceOrder {
                source_time_ns: le_u32(&body[0..4]),
                symbol_index: le_u32(&body[4..8]),
                symbol_seq_num: le_u32(&body[8..12]),
                order_id: le_u64_swapped(&body[12..20]),
                new_order_id: le_u64_swapped(&body[20..28]),
                price: le_u32(&body[28..32]),
                volume: le_u32(&body[32..36]),
                side: Side::from_wire(body[36]),
            }))
        }
        msg_type::IMBALANCE => {
            require(tag, body, LEN_IMBALANCE)?;
            Ok(Msg::Imbalance(Imbalance {
                source_time: le_u32(&body[0..4]),
                source_time_ns: le_u32(&body[4..8]),
                symbol_index: le_u32(&body[8..12]),
                symbol_seq_num: le_u32(&body[12..16]),
                reference_price: le_u32(&body[16..20]),
                paired_qty: le_u32(&body[20..24]),
                total_imbalance_qty: le_u32(&body[24..28]),
                market_imbalance_qty: le_u32(&body[28..32]),
                auction_time: le_u16(&body[32..34]),
                auction_type: body[34],
                imbalance_side: body[35],
                continuous_book_clearing_price: le_u32(&body[36..40]),
                auction_interest_clearing_price: le_u32(&body[40..44]),
                ssr_filing_price: le_u32(&body[44..48]),
                indicative_match_price: le_u32(&body[48..52]),
                upper_collar: le_u32(&body[52..56]),
                lower_collar: le_u32(&body[56..60]),
                auction_status: body[60],
                freeze_status: body[61],
                num_extensions: body[62],
                unpaired_qty: le_u32(&body[63..67]),
                unpaired_side: body[67],
                significant_imbalance: body[68],
            }))
        }
        msg_type::ADD_ORDER_REFRESH => {
            require(tag, body, LEN_ADD_ORDER_REFRESH)?;
            Ok(Msg::AddOrderRefresh(AddOrderRefresh {
                source_time: le_u32(&body[0..4]),
                source_time_ns: le_u32(&body[4..8]),
                symbol_index: le_u32(&body[8..12]),
                symbol_seq_num: le_u32(&body[12..16]),
                order_id: le_u64_swapped(&body[16..24]),
                price: le_u32(&body[24..28]),
                volume: le_u32(&body[28..32]),
                side: Side::from_wire(body[32]),
                firm_id: fixed::<5>(&body[33..38]),
            }))
        }
        msg_type::NON_DISPLAYED_TRADE => {
            require(tag, body, LEN_NON_DISPLAYED_TRADE)?;
            Ok(Msg::NonDisplayedTrade(NonDisplayedTrade {
                source_time_ns: le_u32(&body[0..4]),
                symbol_index: le_u32(&body[4..8]),
                symbol_seq_num: le_u32(&body[8..12]),
                trade_id: le_u64_swapped(&body[12..20]),
                price: le_u32(&body[20..24]),
                volume: le_u32(&body[24..28]),
                printable_flag: body[28],
                trade_conds: fixed::<4>(&body[29..33]),
            }))
        }
        msg_type::CROSS_TRADE => {
            require(tag, body, LEN_CROSS_TRADE)?;
            Ok(Msg::CrossTrade(CrossTrade {
                source_time_ns: le_u32(&body[0..4]),
                symbol_index: le_u32(&body[4..8]),
                symbol_seq_num: le_u32(&body[8..12]),
                cross_id: le_u32(&body[12..16]),
                price: le_u32(&body[16..20]),
                volume: le_u32(&body[20..24]),
                cross_type: body[24],
            }))
        }
        msg_type::TRADE_CANCEL => {
            require(tag, body, LEN_TRADE_CANCEL)?;
            Ok(Msg::TradeCancel(TradeCancel {
                source_time_ns: le_u32(&body[0..4]),
                symbol_index: le_u32(&body[4..8]),
                symbol_seq_num: le_u32(&body[8..12]),
                trade_id: le_u64_swapped(&body[12..20]),
            }))
        }
        msg_type::CROSS_CORRECTION => {
            require(tag, body, LEN_CROSS_CORRECTION)?;
            Ok(Msg::CrossCorrection(CrossCorrection {
                source_time_ns: le_u32(&body[0..4]),
                symbol_index: le_u32(&body[4..8]),
                symbol_seq_num: le_u32(&body[8..12]),
                cross_id: le_u32(&body[12..16]),
                volume: le_u32(&body[16..20]),
            }))
        }
        msg_type::RETAIL_PRICE_IMPROVEMENT => {
            require(tag, body, LEN_RETAIL_PRICE_IMPROVEMENT)?;
            Ok(Msg::RetailPriceImprovement(RetailPriceImprovement {
                source_time_ns: le_u32(&body[0..4]),
                symbol_index: le_u32(&body[4..8]),
                symbol_seq_num: le_u32(&body[8..12]),
                rpi_indicator: body[12],
            }))
        }
        other => Err(MessageError::UnknownType(other)),
    }
}

/// Wire-format construction: the inverse of [`decode`], shared by the
/// capture generator and the round-trip tests.
pub mod build {
    use super::*;

    /// Encode a message back to its wire form, returning the type tag
    /// and the header-stripped body.
    pub fn encode(msg: &Msg) -> (u16, Vec<u8>) {
        match msg {
            Msg::SequenceNumberReset(m) => {
                let mut b = Vec::with_capacity(LEN_SEQUENCE_NUMBER_RESET);
                b.extend_from_slice(&m.source_time.to_le_bytes());
                b.extend_from_slice(&m.source_time_ns.to_le_bytes());
                b.extend_from_slice(&m.product_id.to_le_bytes());
                b.extend_from_slice(&m.channel_id.to_le_bytes());
                (msg_type::SEQUENCE_NUMBER_RESET, b)
            }
            Msg::SourceTimeReference(m) => {
                let mut b = Vec::with_capacity(LEN_SOURCE_TIME_REFERENCE);
                b.extend_from_slice(&m.id.to_le_bytes());
                b.extend_from_slice(&m.symbol_seq_num.to_le_bytes());
                b.extend_from_slice(&m.source_time.to_le_bytes());
                (msg_type::SOURCE_TIME_REFERENCE, b)
            }
            Msg::SymbolIndexMapping(m) => {
                let mut b = Vec::with_capacity(LEN_SYMBOL_INDEX_MAPPING);
                b.extend_from_slice(&m.symbol_index.to_le_bytes());
                let mut sym = [0u8; 11];
                let n = m.symbol.len().min(11);
                sym[..n].copy_from_slice(&m.symbol.as_bytes()[..n]);
                b.extend_from_slice(&sym);
                b.push(0); // reserved
                b.extend_from_slice(&m.market_id.to_le_bytes());
                b.push(m.system_id);
                b.push(m.exchange_code);
                b.push(m.price_scale_code);
                b.push(m.security_type);
                b.extend_from_slice(&m.lot_size.to_le_bytes());
                b.extend_from_slice(&m.prev_close_price.to_le_bytes());
                b.extend_from_slice(&m.prev_close_volume.to_le_bytes());
                b.push(m.price_resolution);
                b.push(m.round_lot);
                b.extend_from_slice(&m.mpv.to_le_bytes());
                b.extend_from_slice(&m.unit_of_trade.to_le_bytes());
                b.extend_from_slice(&[0, 0]); // reserved
                (msg_type::SYMBOL_INDEX_MAPPING, b)
            }
            Msg::SymbolClear(m) => {
                let mut b = Vec::with_capacity(LEN_SYMBOL_CLEAR);
                b.extend_from_slice(&m.source_time.to_le_bytes());
                b.extend_from_slice(&m.source_time_ns.to_le_bytes());
                b.extend_from_slice(&m.symbol_index.to_le_bytes());
                b.extend_from_slice(&m.next_source_seq_num.to_le_bytes());
                (msg_type::SYMBOL_CLEAR, b)
            }
            Msg::SecurityStatus(m) => {
                let mut b = Vec::with_capacity(LEN_SECURITY_STATUS);
                b.extend_from_slice(&m.source_time.to_le_bytes());
                b.extend_from_slice(&m.source_time_ns.to_le_bytes());
                b.extend_from_slice(&m.symbol_index.to_le_bytes());
                b.extend_from_slice(&m.symbol_seq_num.to_le_bytes());
                b.push(m.security_status);
                b.push(m.halt_condition);
                b.extend_from_slice(&[0, 0, 0, 0]); // reserved
                b.extend_from_slice(&m.price1.to_le_bytes());
                b.extend_from_slice(&m.price2.to_le_bytes());
                b.push(m.ssr_triggering_exchange_id);
                b.extend_from_slice(&m.ssr_triggering_volume.to_le_bytes());
                b.extend_from_slice(&m.time.to_le_bytes());
                b.push(m.ssr_state);
                b.push(m.market_state);
                b.push(m.session_state);
                (msg_type::SECURITY_STATUS, b)
            }
            Msg::AddOrder(m) => {
                let mut b = Vec::with_capacity(LEN_ADD_ORDER);
                b.extend_from_slice(&m.source_time_ns.to_le_bytes());
                b.extend_from_slice(&m.symbol_index.to_le_bytes());
                b.extend_from_slice(&m.symbol_seq_num.to_le_bytes());
                b.extend_from_slice(&m.order_id.swap_bytes().to_le_bytes());
                b.extend_from_slice(&m.price.to_le_bytes());
                b.extend_from_slice(&m.volume.to_le_bytes());
                b.push(m.side.to_wire());
                b.extend_from_slice(&m.firm_id);
                b.push(0); // reserved
                (msg_type::ADD_ORDER, b)
            }
            Msg::ModifyOrder(m) => {
                let mut b = Vec::with_capacity(LEN_MODIFY_ORDER);
                b.extend_from_slice(&m.source_time_ns.to_le_bytes());
                b.extend_from_slice(&m.symbol_index.to_le_bytes());
                b.extend_from_slice(&m.symbol_seq_num.to_le_bytes());
                b.extend_from_slice(&m.order_id.swap_bytes().to_le_bytes());
                b.extend_from_slice(&m.price.to_le_bytes());
                b.extend_from_slice(&m.volume.to_le_bytes());
                b.push(m.position_change);
                b.push(m.side.to_wire());
                b.push(0); // reserved
                (msg_type::MODIFY_ORDER, b)
            }
            Msg::DeleteOrder(m) => {
                let mut b = Vec::with_capacity(LEN_DELETE_ORDER);
                b.extend_from_slice(&m.source_time_ns.to_le_bytes());
                b.extend_from_slice(&m.symbol_index.to_le_bytes());
                b.extend_from_slice(&m.symbol_seq_num.to_le_bytes());
                b.extend_from_slice(&m.order_id.swap_bytes().to_le_bytes());
                b.push(0); // reserved
                (msg_type::DELETE_ORDER, b)
            }
            Msg::OrderExecution(m) => {
                let mut b = Vec::with_capacity(LEN_ORDER_EXECUTION);
                b.extend_from_slice(&m.source_time_ns.to_le_bytes());
                b.extend_from_slice(&m.symbol_index.to_le_bytes());
                b.extend_from_slice(&m.symbol_seq_num.to_le_bytes());
                b.extend_from_slice(&m.order_id.swap_bytes().to_le_bytes());
                b.extend_from_slice(&m.trade_id.swap_bytes().to_le_bytes());
                b.extend_from_slice(&m.price.to_le_bytes());
                b.extend_from_slice(&m.volume.to_le_bytes());
                b.push(m.printable_flag);
                b.push(0); // reserved
                b.extend_from_slice(&m.trade_conds);
                (msg_type::ORDER_EXECUTION, b)
            }
            Msg::ReplaceOrder(m) => {
                let mut b = Vec::with_capacity(LEN_REPLACE_ORDER);
                b.extend_from_slice(&m.source_time_ns.to_le_bytes());
                b.extend_from_slice(&m.symbol_index.to_le_bytes());
                b.extend_from_slice(&m.symbol_seq_num.to_le_bytes());
                b.extend_from_slice(&m.order_id.swap_bytes().to_le_bytes());
                b.extend_from_slice(&m.new_order_id.swap_bytes().to_le_bytes());
                b.extend_from_slice(&m.price.to_le_bytes());
                b.extend_from_slice(&m.volume.to_le_bytes());
                b.push(m.side.to_wire());
                b.push(0); // reserved
                (msg_type::REPLACE_ORDER, b)
            }
            Msg::Imbalance(m) => {
                let mut b = Vec::with_capacity(LEN_IMBALANCE);
                b.extend_from_slice(&m.source_time.to_le_bytes());
                b.extend_from_slice(&m.source_time_ns.to_le_bytes());
                b.extend_from_slice(&m.symbol_index.to_le_bytes());
                b.extend_from_slice(&m.symbol_seq_num.to_le_bytes());
                b.extend_from_slice(&m.reference_price.to_le_bytes());
                b.extend_from_slice(&m.paired_qty.to_le_bytes());
                b.extend_from_slice(&m.total_imbalance_qty.to_le_bytes());
                b.extend_from_slice(&m.market_imbalance_qty.to_le_bytes());
                b.extend_from_slice(&m.auction_time.to_le_bytes());
                b.push(m.auction_type);
                b.push(m.imbalance_side);
                b.extend_from_slice(&m.continuous_book_clearing_price.to_le_bytes());
                b.extend_from_slice(&m.auction_interest_clearing_price.to_le_bytes());
                b.extend_from_slice(&m.ssr_filing_price.to_le_bytes());
                b.extend_from_slice(&m.indicative_match_price.to_le_bytes());
                b.extend_from_slice(&m.upper_collar.to_le_bytes());
                b.extend_from_slice(&m.lower_collar.to_le_bytes());
                b.push(m.auction_status);
                b.push(m.freeze_status);
                b.push(m.num_extensions);
                b.extend_from_slice(&m.unpaired_qty.to_le_bytes());
                b.push(m.unpaired_side);
                b.push(m.significant_imbalance);
                (msg_type::IMBALANCE, b)
            }
            Msg::AddOrderRefresh(m) => {
                let mut b = Vec::with_capacity(LEN_ADD_ORDER_REFRESH);
                b.extend_from_slice(&m.source_time.to_le_bytes());
                b.extend_from_slice(&m.source_time_ns.to_le_bytes());
                b.extend_from_slice(&m.symbol_index.to_le_bytes());
                b.extend_from_slice(&m.symbol_seq_num.to_le_bytes());
                b.extend_from_slice(&m.order_id.swap_bytes().to_le_bytes());
                b.extend_from_slice(&m.price.to_le_bytes());
                b.extend_from_slice(&m.volume.to_le_bytes());
                b.push(m.side.to_wire());
                b.extend_from_slice(&m.firm_id);
                b.push(0); // reserved
                (msg_type::ADD_ORDER_REFRESH, b)
            }
            Msg::NonDisplayedTrade(m) => {
                let mut b = Vec::with_capacity(LEN_NON_DISPLAYED_TRADE);
                b.extend_from_slice(&m.source_time_ns.to_le_bytes());
                b.extend_from_slice(&m.symbol_index.to_le_bytes());
                b.extend_from_slice(&m.symbol_seq_num.to_le_bytes());
                b.extend_from_slice(&m.trade_id.swap_bytes().to_le_bytes());
                b.extend_from_slice(&m.price.to_le_bytes());
                b.extend_from_slice(&m.volume.to_le_bytes());
                b.push(m.printable_flag);
                b.extend_from_slice(&m.trade_conds);
                (msg_type::NON_DISPLAYED_TRADE, b)
            }
            Msg::CrossTrade(m) => {
                let mut b = Vec::with_capacity(LEN_CROSS_TRADE);
                b.extend_from_slice(&m.source_time_ns.to_le_bytes());
                b.extend_from_slice(&m.symbol_index.to_le_bytes());
                b.extend_from_slice(&m.symbol_seq_num.to_le_bytes());
                b.extend_from_slice(&m.cross_id.to_le_bytes());
                b.extend_from_slice(&m.price.to_le_bytes());
                b.extend_from_slice(&m.volume.to_le_bytes());
                b.push(m.cross_type);
                (msg_type::CROSS_TRADE, b)
            }
            Msg::TradeCancel(m) => {
                let mut b = Vec::with_capacity(LEN_TRADE_CANCEL);
                b.extend_from_slice(&m.source_time_ns.to_le_bytes());
                b.extend_from_slice(&m.symbol_index.to_le_bytes());
                b.extend_from_slice(&m.symbol_seq_num.to_le_bytes());
                b.extend_from_slice(&m.trade_id.swap_bytes().to_le_bytes());
                (msg_type::TRADE_CANCEL, b)
            }
            Msg::CrossCorrection(m) => {
                let mut b = Vec::with_capacity(LEN_CROSS_CORRECTION);
                b.extend_from_slice(&m.source_time_ns.to_le_bytes());
                b.extend_from_slice(&m.symbol_index.to_le_bytes());
                b.extend_from_slice(&m.symbol_seq_num.to_le_bytes());
                b.extend_from_slice(&m.cross_id.to_le_bytes());
                b.extend_from_slice(&m.volume.to_le_bytes());
                (msg_type::CROSS_CORRECTION, b)
            }
            Msg::RetailPriceImprovement(m) => {
                let mut b = Vec::with_capacity(LEN_RETAIL_PRICE_IMPROVEMENT);
                b.extend_from_slice(&m.source_time_ns.to_le_bytes());
                b.extend_from_slice(&m.symbol_index.to_le_bytes());
                b.extend_from_slice(&m.symbol_seq_num.to_le_bytes());
                b.push(m.rpi_indicator);
                (msg_type::RETAIL_PRICE_IMPROVEMENT, b)
            }
        }
    }
}
