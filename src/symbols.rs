// src/symbols.rs
//
// Symbol-index metadata learned from Symbol Index Mapping messages. The
// table is process-wide for a run and only ever grows; a remapping of an
// index overwrites the previous entry.

use crate::messages::SymbolIndexMapping;
use hashbrown::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolInfo {
    pub symbol: String,
    /// Base-10 exponent: decimal price = integer price / 10^price_scale_code.
    pub price_scale_code: u8,
}

#[derive(Default)]
pub struct SymbolTable {
    map: HashMap<u32, SymbolInfo>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply_mapping(&mut self, m: &SymbolIndexMapping) {
        self.map.insert(
            m.symbol_index,
            SymbolInfo {
                symbol: m.symbol.clone(),
                price_scale_code: m.price_scale_code,
            },
        );
    }

    pub fn get(&self, symbol_index: u32) -> Option<&SymbolInfo> {
        self.map.get(&symbol_index)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Render an integer feed price as a decimal string using a scale code.
pub fn format_price(price: u32, scale: u8) -> String {
    if scale == 0 {
        return price.to_string();
    }
    let pow = 10u64.pow(scale as u32);
    let p = price as u64;
    format!("{}.{:0width$}", p / pow, p % pow, width = scale as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(symbol_index: u32, symbol: &str, scale: u8) -> SymbolIndexMapping {
        SymbolIndexMapping {
            symbol_index,
            symbol: symbol.to_string(),
            market_id: 1,
            system_id: 0,
            exchange_code: b'N',
            price_scale_code: scale,
            security_type: b'E',
            lot_size: 100,
            prev_close_price: 0,
            prev_close_volume: 0,
            price_resolution: 0,
            round_lot: b'Y',
            mpv: 1,
            unit_of_trade: 1,
        }
    }

    #[test]
    fn mapping_inserts_and_overwrites() {
        let mut t = SymbolTable::new();
        t.apply_mapping(&mapping(42, "IBM", 4));
        assert_eq!(t.get(42).unwrap().symbol, "IBM");
        t.apply_mapping(&mapping(42, "IBM", 2));
        assert_eq!(t.get(42).unwrap().price_scale_code, 2);
        assert_eq!(t.len(), 1);
        assert!(t.get(7).is_none());
    }

    #[test]
    fn price_formatting_honors_scale() {
        assert_eq!(format_price(1234500, 4), "123.4500");
        assert_eq!(format_price(1234500, 0), "1234500");
        assert_eq!(format_price(5, 2), "0.05");
        assert_eq!(format_price(0, 3), "0.000");
        // Largest scale the feed defines.
        assert_eq!(format_price(u32::MAX, 9), "4.294967295");
    }
}
