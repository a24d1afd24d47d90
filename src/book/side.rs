use crate::models::{Price, Side, Size};
use std::collections::BTreeMap;

/// One side of the book: price -> size, ordered, with the best price cached.
///
/// The `BTreeMap` is both the lookup map and the ordered index, so `set` and
/// `remove` are O(log depth). `best()` is O(1); the cache is only rebuilt
/// from the map when the level that held it is removed.
#[derive(Debug, Clone)]
pub(crate) struct BookSide {
    side: Side,
    levels: BTreeMap<Price, Size>,
    best: Option<Price>,
}

impl BookSide {
    pub(crate) fn new(side: Side) -> Self {
        Self {
            side,
            levels: BTreeMap::new(),
            best: None,
        }
    }

    /// Bids improve upwards, asks downwards.
    fn improves_on(&self, candidate: &Price, current: &Price) -> bool {
        match self.side {
            Side::Buy => candidate > current,
            Side::Sell => candidate < current,
        }
    }

    fn extreme_from_index(&self) -> Option<Price> {
        let entry = match self.side {
            Side::Buy => self.levels.last_key_value(),
            Side::Sell => self.levels.first_key_value(),
        };
        entry.map(|(price, _)| price.clone())
    }

    /// Insert or overwrite. Callers guarantee `size > 0`.
    pub(crate) fn set(&mut self, price: Price, size: Size) {
        let improves = match &self.best {
            Some(best) => self.improves_on(&price, best),
            None => true,
        };
        if improves {
            self.best = Some(price.clone());
        }
        self.levels.insert(price, size);
    }

    /// Remove a level; absent prices are a no-op.
    pub(crate) fn remove(&mut self, price: &Price) -> Option<Size> {
        let removed = self.levels.remove(price)?;
        if self.best.as_ref() == Some(price) {
            self.best = self.extreme_from_index();
        }
        Some(removed)
    }

    pub(crate) fn clear(&mut self) {
        self.levels.clear();
        self.best = None;
    }

    pub(crate) fn best(&self) -> Option<&Price> {
        self.best.as_ref()
    }

    pub(crate) fn best_level(&self) -> Option<(&Price, &Size)> {
        let best = self.best.as_ref()?;
        self.levels.get_key_value(best)
    }

    pub(crate) fn get(&self, price: &Price) -> Option<&Size> {
        self.levels.get(price)
    }

    pub(crate) fn len(&self) -> usize {
        self.levels.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Levels in best-first order.
    pub(crate) fn iter(&self) -> Box<dyn Iterator<Item = (&Price, &Size)> + '_> {
        match self.side {
            Side::Buy => Box::new(self.levels.iter().rev()),
            Side::Sell => Box::new(self.levels.iter()),
        }
    }
}
