use serde_json::{Map, Value};

/// One record of the item store: an open attribute mapping.
///
/// The only attribute the gateway knows about is the primary key; everything
/// else is caller-defined and passed through unchanged.
pub type Item = Map<String, Value>;

/// Opaque continuation marker returned by a scan.
///
/// Wraps the store's last-evaluated key. Only the store that produced it knows
/// how to interpret it.
#[derive(Debug, Clone, PartialEq)]
pub struct Cursor(Item);

impl Cursor {
    /// Wraps a store's last-evaluated key.
    pub fn new(last_evaluated_key: Item) -> Self {
        Self(last_evaluated_key)
    }

    /// The store's last-evaluated key.
    pub fn last_evaluated_key(&self) -> &Item {
        &self.0
    }
}

/// A single page of scan results.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanPage {
    pub items: Vec<Item>,
    /// `None` once the store has no more pages.
    pub next_cursor: Option<Cursor>,
}

impl ScanPage {
    /// The final page of a scan.
    pub fn last(items: Vec<Item>) -> Self {
        Self {
            items,
            next_cursor: None,
        }
    }

    /// A page followed by more pages.
    pub fn with_cursor(items: Vec<Item>, cursor: Cursor) -> Self {
        Self {
            items,
            next_cursor: Some(cursor),
        }
    }
}
