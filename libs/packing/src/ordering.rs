//! Sibling ordering
//!
//! Write side: default placement appends after the current maximum.
//! Read side: sort by `(order, created_at, id)` ascending; the store never
//! returns rows pre-sorted.

use std::cmp::Ordering;
use std::collections::HashSet;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{Category, Item};

/// An entity ordered among the children of one parent
pub trait Sibling {
    fn order(&self) -> i32;
    fn created_at(&self) -> DateTime<Utc>;
    fn tie_breaker(&self) -> Uuid;
}

impl Sibling for Category {
    fn order(&self) -> i32 {
        self.order
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn tie_breaker(&self) -> Uuid {
        self.id.as_uuid()
    }
}

impl Sibling for Item {
    fn order(&self) -> i32 {
        self.order
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn tie_breaker(&self) -> Uuid {
        self.id.as_uuid()
    }
}

fn compare<T: Sibling>(a: &T, b: &T) -> Ordering {
    a.order()
        .cmp(&b.order())
        .then_with(|| a.created_at().cmp(&b.created_at()))
        .then_with(|| a.tie_breaker().cmp(&b.tie_breaker()))
}

/// Sort siblings for display
pub fn sort_siblings<T: Sibling>(siblings: &mut [T]) {
    siblings.sort_by(compare);
}

/// Order value for a sibling appended without an explicit order:
/// `max(order) + 1`, or `0` for the first child.
pub fn next_order<T: Sibling>(siblings: &[T]) -> i32 {
    siblings
        .iter()
        .map(Sibling::order)
        .max()
        .map_or(0, |max| max.saturating_add(1))
}

/// Compute the `order` assignments for a reorder request.
///
/// Each id in `requested` that belongs to `siblings` gets its index in
/// `requested`. Ids that are not children of the parent are skipped, and
/// children missing from `requested` keep their current order. A child
/// listed twice ends up with its last position. Returns `(id, order)` pairs
/// in request order.
pub fn reorder_assignments<Id>(siblings: &[Id], requested: &[Id]) -> Vec<(Id, i32)>
where
    Id: Copy + Eq + std::hash::Hash,
{
    let known: HashSet<Id> = siblings.iter().copied().collect();
    requested
        .iter()
        .enumerate()
        .filter(|(_, id)| known.contains(*id))
        .map(|(index, id)| (*id, i32::try_from(index).unwrap_or(i32::MAX)))
        .collect()
}
