// src/render.rs
//
// Text rendering of a book's visible top: ten best levels per side, bids
// descending and asks ascending, each order shown as [id/volume] in time
// priority. Prices are scaled to decimals via the symbol table.

use crate::messages::Side;
use crate::orderbook::Book;
use crate::symbols::{format_price, SymbolTable};
use std::fmt::Write;

pub fn render_book(symbol_index: u32, book: &Book, symbols: &SymbolTable, depth: usize) -> String {
    let (name, scale) = symbols
        .get(symbol_index)
        .map(|s| (s.symbol.as_str(), s.price_scale_code))
        .unwrap_or(("Unknown", 0));

    let mut out = String::new();
    let _ = writeln!(out, "{name} ({symbol_index})");
    let _ = writeln!(out, "  Bids:");
    for &price in book.top_bids().iter().take(depth) {
        render_level(&mut out, book, Side::Bid, price, scale);
    }
    let _ = writeln!(out, "  Asks:");
    for &price in book.top_asks().iter().take(depth) {
        render_level(&mut out, book, Side::Ask, price, scale);
    }
    out
}

fn render_level(out: &mut String, book: &Book, side: Side, price: u32, scale: u8) {
    let _ = write!(out, "    {}:", format_price(price, scale));
    for o in book.orders_at(side, price) {
        let _ = write!(out, " [{}/{}]", o.order_id, o.volume);
    }
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::SymbolIndexMapping;
    use crate::orderbook::{EMPTY_FIRM, TOP_DEPTH};

    fn two_sided_book() -> Book {
        let mut book = Book::new();
        book.add(1, 1000, 10, Side::Bid, EMPTY_FIRM).unwrap();
        book.add(2, 1010, 5, Side::Bid, EMPTY_FIRM).unwrap();
        book.add(5, 1010, 2, Side::Bid, EMPTY_FIRM).unwrap();
        book.add(3, 1020, 7, Side::Ask, EMPTY_FIRM).unwrap();
        book.add(4, 1030, 9, Side::Ask, EMPTY_FIRM).unwrap();
        book
    }

    fn ibm_symbols() -> SymbolTable {
        let mut symbols = SymbolTable::new();
        symbols.apply_mapping(&SymbolIndexMapping {
            symbol_index: 42,
            symbol: "IBM".to_string(),
            market_id: 1,
            system_id: 0,
            exchange_code: b'N',
            price_scale_code: 2,
            security_type: b'E',
            lot_size: 100,
            prev_close_price: 0,
            prev_close_volume: 0,
            price_resolution: 0,
            round_lot: b'Y',
            mpv: 1,
            unit_of_trade: 1,
        });
        symbols
    }

    #[test]
    fn renders_scaled_ladders_in_book_order() {
        let text = render_book(42, &two_sided_book(), &ibm_symbols(), TOP_DEPTH);
        let expected = "IBM (42)\n\
                        \x20 Bids:\n\
                        \x20   10.10: [2/5] [5/2]\n\
                        \x20   10.00: [1/10]\n\
                        \x20 Asks:\n\
                        \x20   10.20: [3/7]\n\
                        \x20   10.30: [4/9]\n";
        assert_eq!(text, expected);
    }

    #[test]
    fn depth_caps_rendered_levels() {
        let text = render_book(42, &two_sided_book(), &ibm_symbols(), 1);
        let expected = "IBM (42)\n\
                        \x20 Bids:\n\
                        \x20   10.10: [2/5] [5/2]\n\
                        \x20 Asks:\n\
                        \x20   10.20: [3/7]\n";
        assert_eq!(text, expected);
    }

    #[test]
    fn unmapped_symbol_renders_unknown_with_raw_prices() {
        let book = Book::new();
        let symbols = SymbolTable::new();
        let text = render_book(7, &book, &symbols, TOP_DEPTH);
        assert!(text.starts_with("Unknown (7)\n"));
        assert!(text.contains("Bids:"));
        assert!(text.contains("Asks:"));
    }
}
