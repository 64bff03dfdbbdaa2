// src/orderbook.rs
//
// Per-symbol limit-order books. Orders live in a slab arena and are linked
// into per-price FIFO lists through stable handles, so no reference into a
// container survives a rehash or node removal. Each mutation refreshes a
// cached top-10 price view per side and reports whether it changed.

use crate::messages::Side;
use hashbrown::HashMap;
use slab::Slab;
use smallvec::SmallVec;
use std::collections::BTreeMap;
use thiserror::Error;

/// Depth of the cached best-price view on each side.
pub const TOP_DEPTH: usize = 10;

pub const EMPTY_FIRM: [u8; 5] = *b"     ";

type Handle = usize;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BookError {
    #[error("duplicate order id {0}")]
    DuplicateOrderId(u64),
    #[error("unknown order id {0}")]
    UnknownOrderId(u64),
    #[error("execution volume {executed} exceeds resting volume {resting} on order {order_id}")]
    OverExecute {
        order_id: u64,
        resting: u32,
        executed: u32,
    },
    #[error("level {price} missing for resting order {order_id}")]
    LevelMissing { order_id: u64, price: u32 },
}

#[derive(Clone, Debug)]
struct Node {
    order_id: u64,
    price: u32,
    volume: u32,
    side: Side,
    firm_id: [u8; 5],
    prev: Option<Handle>,
    next: Option<Handle>,
}

impl Node {
    #[inline]
    fn new(order_id: u64, price: u32, volume: u32, side: Side, firm_id: [u8; 5]) -> Self {
        Self {
            order_id,
            price,
            volume,
            side,
            firm_id,
            prev: None,
            next: None,
        }
    }
}

#[derive(Clone, Debug, Default)]
struct Level {
    head: Option<Handle>,
    tail: Option<Handle>,
    total_volume: u64,
    count: usize,
}

/// A resting order as seen from outside the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderView {
    pub order_id: u64,
    pub volume: u32,
    pub firm_id: [u8; 5],
}

/// FIFO iterator over the orders resting at one price level.
pub struct LevelOrders<'a> {
    orders: &'a Slab<Node>,
    cur: Option<Handle>,
}

impl<'a> Iterator for LevelOrders<'a> {
    type Item = OrderView;

    fn next(&mut self) -> Option<Self::Item> {
        let h = self.cur?;
        let n = &self.orders[h];
        self.cur = n.next;
        Some(OrderView {
            order_id: n.order_id,
            volume: n.volume,
            firm_id: n.firm_id,
        })
    }
}

#[derive(Default)]
pub struct Book {
    bids: BTreeMap<u32, Level>,
    asks: BTreeMap<u32, Level>,
    orders: Slab<Node>,
    index: HashMap<u64, Handle>,
    top_bids: SmallVec<[u32; TOP_DEPTH]>,
    top_asks: SmallVec<[u32; TOP_DEPTH]>,
}

impl Book {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    fn levels_mut(&mut self, side: Side) -> &mut BTreeMap<u32, Level> {
        match side {
            Side::Bid => &mut self.bids,
            Side::Ask => &mut self.asks,
        }
    }

    #[inline]
    fn levels(&self, side: Side) -> &BTreeMap<u32, Level> {
        match side {
            Side::Bid => &self.bids,
            Side::Ask => &self.asks,
        }
    }

    /// Append an already-allocated node at the tail of its `(side, price)`
    /// level, creating the level on first use.
    fn link_tail(&mut self, h: Handle) {
        let (price, side, volume) = {
            let n = &self.orders[h];
            (n.price, n.side, n.volume)
        };
        let prev_tail = {
            let lvl = self.levels_mut(side).entry(price).or_default();
            lvl.tail
        };
        if let Some(t) = prev_tail {
            self.orders[t].next = Some(h);
        }
        {
            let n = &mut self.orders[h];
            n.prev = prev_tail;
            n.next = None;
        }
        let lvl = self.levels_mut(side).entry(price).or_default();
        if prev_tail.is_none() {
            lvl.head = Some(h);
        }
        lvl.tail = Some(h);
        lvl.count += 1;
        lvl.total_volume += volume as u64;
    }

    /// Detach a node from its level, removing the level once empty. The
    /// slab entry itself stays allocated so the caller can re-link or drop
    /// it.
    fn unlink(&mut self, h: Handle) -> Result<(), BookError> {
        let (order_id, price, side, prev, next, volume) = {
            let n = &self.orders[h];
            (n.order_id, n.price, n.side, n.prev, n.next, n.volume)
        };
        if let Some(p) = prev {
            self.orders[p].next = next;
        }
        if let Some(nh) = next {
            self.orders[nh].prev = prev;
        }
        let levels = self.levels_mut(side);
        let Some(lvl) = levels.get_mut(&price) else {
            return Err(BookError::LevelMissing { order_id, price });
        };
        if prev.is_none() {
            lvl.head = next;
        }
        if next.is_none() {
            lvl.tail = prev;
        }
        lvl.count -= 1;
        lvl.total_volume -= volume as u64;
        if lvl.count == 0 {
            levels.remove(&price);
        }
        Ok(())
    }

    /// Recompute the top-10 view per side and report whether it moved.
    fn refresh_top(&mut self) -> bool {
        let bids: SmallVec<[u32; TOP_DEPTH]> =
            self.bids.keys().rev().take(TOP_DEPTH).copied().collect();
        let asks: SmallVec<[u32; TOP_DEPTH]> =
            self.asks.keys().take(TOP_DEPTH).copied().collect();
        let changed = bids != self.top_bids || asks != self.top_asks;
        self.top_bids = bids;
        self.top_asks = asks;
        changed
    }

    // ------------------------------ Operations ------------------------------

    pub fn add(
        &mut self,
        order_id: u64,
        price: u32,
        volume: u32,
        side: Side,
        firm_id: [u8; 5],
    ) -> Result<bool, BookError> {
        if self.index.contains_key(&order_id) {
            return Err(BookError::DuplicateOrderId(order_id));
        }
        let h = self
            .orders
            .insert(Node::new(order_id, price, volume, side, firm_id));
        self.link_tail(h);
        self.index.insert(order_id, h);
        Ok(self.refresh_top())
    }

    /// A price or side change re-queues the order at the tail of its new
    /// level; a volume-only change keeps its queue position.
    pub fn modify(
        &mut self,
        order_id: u64,
        price: u32,
        volume: u32,
        side: Side,
    ) -> Result<bool, BookError> {
        let h = *self
            .index
            .get(&order_id)
            .ok_or(BookError::UnknownOrderId(order_id))?;
        let (old_price, old_volume, old_side) = {
            let n = &self.orders[h];
            (n.price, n.volume, n.side)
        };
        if old_price == price && old_side == side {
            self.orders[h].volume = volume;
            let Some(lvl) = self.levels_mut(side).get_mut(&price) else {
                return Err(BookError::LevelMissing { order_id, price });
            };
            lvl.total_volume -= old_volume as u64;
            lvl.total_volume += volume as u64;
        } else {
            self.unlink(h)?;
            {
                let n = &mut self.orders[h];
                n.price = price;
                n.volume = volume;
                n.side = side;
                n.prev = None;
                n.next = None;
            }
            self.link_tail(h);
        }
        Ok(self.refresh_top())
    }

    pub fn delete(&mut self, order_id: u64) -> Result<bool, BookError> {
        let h = *self
            .index
            .get(&order_id)
            .ok_or(BookError::UnknownOrderId(order_id))?;
        self.unlink(h)?;
        self.orders.remove(h);
        self.index.remove(&order_id);
        Ok(self.refresh_top())
    }

    /// Reduce the resting volume; a full fill removes the order. An
    /// execution for more than rests is rejected without mutation.
    pub fn execute(&mut self, order_id: u64, volume: u32) -> Result<bool, BookError> {
        let h = *self
            .index
            .get(&order_id)
            .ok_or(BookError::UnknownOrderId(order_id))?;
        let (resting, price, side) = {
            let n = &self.orders[h];
            (n.volume, n.price, n.side)
        };
        if volume > resting {
            return Err(BookError::OverExecute {
                order_id,
                resting,
                executed: volume,
            });
        }
        if volume == resting {
            self.unlink(h)?;
            self.orders.remove(h);
            self.index.remove(&order_id);
        } else {
            self.orders[h].volume = resting - volume;
            let Some(lvl) = self.levels_mut(side).get_mut(&price) else {
                return Err(BookError::LevelMissing { order_id, price });
            };
            lvl.total_volume -= volume as u64;
        }
        Ok(self.refresh_top())
    }

    /// Atomic delete-old / add-new. The replacement rests at the tail of
    /// its level; the wire carries no firm id for it.
    pub fn replace(
        &mut self,
        order_id: u64,
        new_order_id: u64,
        price: u32,
        volume: u32,
        side: Side,
    ) -> Result<bool, BookError> {
        let Some(&h) = self.index.get(&order_id) else {
            return Err(BookError::UnknownOrderId(order_id));
        };
        if new_order_id != order_id && self.index.contains_key(&new_order_id) {
            return Err(BookError::DuplicateOrderId(new_order_id));
        }
        self.unlink(h)?;
        self.orders.remove(h);
        self.index.remove(&order_id);

        let h2 = self
            .orders
            .insert(Node::new(new_order_id, price, volume, side, EMPTY_FIRM));
        self.link_tail(h2);
        self.index.insert(new_order_id, h2);
        Ok(self.refresh_top())
    }

    /// Drop every order and level; the book object survives for reuse.
    pub fn clear(&mut self) -> bool {
        self.bids.clear();
        self.asks.clear();
        self.orders.clear();
        self.index.clear();
        self.refresh_top()
    }

    // ------------------------------- Views ---------------------------------

    pub fn top_bids(&self) -> &[u32] {
        &self.top_bids
    }

    pub fn top_asks(&self) -> &[u32] {
        &self.top_asks
    }

    /// Orders resting at a price level in time priority, head first.
    pub fn orders_at(&self, side: Side, price: u32) -> LevelOrders<'_> {
        LevelOrders {
            orders: &self.orders,
            cur: self.levels(side).get(&price).and_then(|l| l.head),
        }
    }

    pub fn order_count(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn resting_volume(&self, order_id: u64) -> Option<u32> {
        self.index.get(&order_id).map(|&h| self.orders[h].volume)
    }

    #[inline]
    pub fn bbo(&self) -> (Option<(u32, u64)>, Option<(u32, u64)>) {
        let bid = self
            .bids
            .iter()
            .next_back()
            .map(|(p, l)| (*p, l.total_volume));
        let ask = self.asks.iter().next().map(|(p, l)| (*p, l.total_volume));
        (bid, ask)
    }

    /// Walk every structural invariant; test support.
    #[cfg(test)]
    fn check_invariants(&self) {
        use std::collections::HashSet;
        let mut seen: HashSet<u64> = HashSet::new();
        for (&order_id, &h) in &self.index {
            assert!(seen.insert(order_id), "id {order_id} indexed twice");
            let n = &self.orders[h];
            assert_eq!(n.order_id, order_id);
            let lvl = self
                .levels(n.side)
                .get(&n.price)
                .unwrap_or_else(|| panic!("level {} missing for order {}", n.price, order_id));
            let found = LevelOrders {
                orders: &self.orders,
                cur: lvl.head,
            }
            .filter(|o| o.order_id == order_id)
            .count();
            assert_eq!(found, 1, "order {order_id} not linked exactly once");
        }
        for levels in [&self.bids, &self.asks] {
            for (price, lvl) in levels {
                assert!(lvl.count > 0, "empty level {price} retained");
                let walked: Vec<_> = LevelOrders {
                    orders: &self.orders,
                    cur: lvl.head,
                }
                .collect();
                assert_eq!(walked.len(), lvl.count);
                assert_eq!(
                    walked.iter().map(|o| o.volume as u64).sum::<u64>(),
                    lvl.total_volume
                );
            }
        }
        let bids: Vec<u32> = self.bids.keys().rev().take(TOP_DEPTH).copied().collect();
        let asks: Vec<u32> = self.asks.keys().take(TOP_DEPTH).copied().collect();
        assert_eq!(self.top_bids.as_slice(), bids.as_slice());
        assert_eq!(self.top_asks.as_slice(), asks.as_slice());
    }
}

/// Lazily-growing registry of per-symbol books. Books are never removed;
/// a symbol clear empties its book in place.
#[derive(Default)]
pub struct Books {
    books: HashMap<u32, Book>,
}

impl Books {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn book_mut(&mut self, symbol_index: u32) -> &mut Book {
        self.books.entry(symbol_index).or_default()
    }

    pub fn get(&self, symbol_index: u32) -> Option<&Book> {
        self.books.get(&symbol_index)
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    /// Total resting orders across all symbols.
    pub fn order_count(&self) -> usize {
        self.books.values().map(Book::order_count).sum()
    }
}
