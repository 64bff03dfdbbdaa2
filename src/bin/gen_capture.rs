// Writes a small synthetic Pillar capture: a scripted session of mappings,
// adds, executions, a replace and a clear, wrapped in Ethernet/IPv4/UDP and
// classic pcap framing. Useful as replay input and for eyeballing output.

use pillarbook::frame;
use pillarbook::messages::build::encode;
use pillarbook::messages::{
    AddOrder, CrossTrade, DeleteOrder, ModifyOrder, Msg, OrderExecution, ReplaceOrder, Side,
    SymbolClear, SymbolIndexMapping,
};
use pillarbook::packet;
use pillarbook::pcap;

fn mapping(symbol_index: u32, symbol: &str, scale: u8) -> Msg {
    Msg::SymbolIndexMapping(SymbolIndexMapping {
        symbol_index,
        symbol: symbol.to_string(),
        market_id: 1,
        system_id: 1,
        exchange_code: b'N',
        price_scale_code: scale,
        security_type: b'E',
        lot_size: 100,
        prev_close_price: 1_000_000,
        prev_close_volume: 10_000,
        price_resolution: 0,
        round_lot: b'Y',
        mpv: 1,
        unit_of_trade: 1,
    })
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
        firm_id: *b"GENCO",
    })
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 2 {
        eprintln!("usage: gen_capture <out.pcap>");
        std::process::exit(2);
    }
    let out_path = &args[1];

    let script: Vec<Vec<Msg>> = vec![
        vec![mapping(42, "IBM", 4), mapping(43, "AAPL", 4)],
        vec![
            add(42, 1, 1_000_000, 10, Side::Bid),
            add(42, 2, 1_010_000, 5, Side::Bid),
            add(42, 3, 1_020_000, 7, Side::Ask),
            add(42, 4, 1_030_000, 9, Side::Ask),
        ],
        vec![
            add(43, 10, 2_000_000, 20, Side::Bid),
            add(43, 11, 2_010_000, 15, Side::Ask),
        ],
        vec![
            Msg::ModifyOrder(ModifyOrder {
                source_time_ns: 0,
                symbol_index: 42,
                symbol_seq_num: 0,
                order_id: 1,
                price: 1_000_000,
                volume: 8,
                position_change: 0,
                side: Side::Bid,
            }),
            Msg::OrderExecution(OrderExecution {
                source_time_ns: 0,
                symbol_index: 42,
                symbol_seq_num: 0,
                order_id: 2,
                trade_id: 9001,
                price: 1_010_000,
                volume: 5,
                printable_flag: 1,
                trade_conds: *b"@   ",
            }),
        ],
        vec![
            Msg::ReplaceOrder(ReplaceOrder {
                source_time_ns: 0,
                symbol_index: 42,
                symbol_seq_num: 0,
                order_id: 3,
                new_order_id: 30,
                price: 1_040_000,
                volume: 7,
                side: Side::Ask,
            }),
            Msg::DeleteOrder(DeleteOrder {
                source_time_ns: 0,
                symbol_index: 42,
                symbol_seq_num: 0,
                order_id: 4,
            }),
            Msg::CrossTrade(CrossTrade {
                source_time_ns: 0,
                symbol_index: 42,
                symbol_seq_num: 0,
                cross_id: 1,
                price: 1_015_000,
                volume: 100,
                cross_type: b'O',
            }),
        ],
        vec![Msg::SymbolClear(SymbolClear {
            source_time: 0,
            source_time_ns: 0,
            symbol_index: 43,
            next_source_seq_num: 0,
        })],
    ];

    let mut buf = Vec::new();
    pcap::write::global_header(&mut buf);
    let mut seq: u32 = 1;
    let mut frames = 0u32;
    let mut msgs = 0usize;
    for (i, packet_msgs) in script.iter().enumerate() {
        let encoded: Vec<(u16, Vec<u8>)> = packet_msgs.iter().map(encode).collect();
        let payload = packet::build::packet(seq, 1_700_000_000_000 + i as u64, &encoded);
        let eth = frame::build::udp_frame(&payload);
        pcap::write::record(&mut buf, 1_700_000_000 + i as u32, i as u32 * 100, &eth);
        seq += packet_msgs.len() as u32;
        frames += 1;
        msgs += packet_msgs.len();
    }

    std::fs::write(out_path, &buf)?;
    eprintln!("wrote {frames} frames ({msgs} messages) to {out_path}");
    Ok(())
}
