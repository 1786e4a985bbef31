// Order index allocation for a user's link list
//
// Pure planning functions: callers load the sibling snapshot inside their
// transaction (after locking the owner row), plan here, and write the
// returned changes back in the same transaction.

use std::collections::{HashMap, HashSet};

use thiserror::Error;
use uuid::Uuid;

use crate::models::link::LinkOrder;

/// Position of one link in its owner's list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sibling {
    pub id: Uuid,
    pub order_index: i32,
}

/// A write the caller must apply: set `link_id`'s index to `order_index`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexChange {
    pub link_id: Uuid,
    pub order_index: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderingError {
    #[error("Links not owned by caller: {0:?}")]
    UnknownLinks(Vec<Uuid>),

    #[error("Link {0} appears more than once in the batch")]
    DuplicateLink(Uuid),

    #[error("Order index {index} for link {link_id} is negative")]
    NegativeIndex { link_id: Uuid, index: i32 },

    #[error("Order index {0} is assigned to more than one link")]
    DuplicateIndex(i32),

    #[error("Order indices must run from 0 to {expected_max} without gaps")]
    NotDense { expected_max: i32 },
}

fn sorted(siblings: &[Sibling]) -> Vec<Sibling> {
    let mut ordered = siblings.to_vec();
    ordered.sort_by_key(|s| s.order_index);
    ordered
}

fn list_len(siblings: &[Sibling]) -> i32 {
    i32::try_from(siblings.len()).unwrap_or(i32::MAX)
}

/// Index for an appended link: one past the highest, or 0 for an empty list
pub fn next_order_index(max_existing: Option<i32>) -> i32 {
    max_existing.map_or(0, |max| max.saturating_add(1))
}

/// Where a new link lands. An explicit request is clamped to `[0, n]`.
pub fn insertion_position(requested: Option<i32>, siblings: &[Sibling]) -> i32 {
    match requested {
        None => next_order_index(siblings.iter().map(|s| s.order_index).max()),
        Some(position) => position.clamp(0, list_len(siblings)),
    }
}

/// Opens a slot at `position` by shifting every sibling at or after it up by one
pub fn shift_for_insert(siblings: &[Sibling], position: i32) -> Vec<IndexChange> {
    sorted(siblings)
        .into_iter()
        .filter(|s| s.order_index >= position)
        .map(|s| IndexChange {
            link_id: s.id,
            order_index: s.order_index + 1,
        })
        .collect()
}

/// Closes the gap left by a link removed from `removed_index`.
/// Siblings before it are untouched, siblings after it move down by exactly one.
pub fn compact_after_removal(remaining: &[Sibling], removed_index: i32) -> Vec<IndexChange> {
    sorted(remaining)
        .into_iter()
        .filter(|s| s.order_index > removed_index)
        .map(|s| IndexChange {
            link_id: s.id,
            order_index: s.order_index - 1,
        })
        .collect()
}

/// Moves `link_id` to `target` (clamped to the list) and renumbers densely.
/// Only rows whose index actually changes are returned.
pub fn move_to(
    siblings: &[Sibling],
    link_id: Uuid,
    target: i32,
) -> Result<Vec<IndexChange>, OrderingError> {
    let mut ordered = sorted(siblings);
    let current = ordered
        .iter()
        .position(|s| s.id == link_id)
        .ok_or_else(|| OrderingError::UnknownLinks(vec![link_id]))?;

    let moving = ordered.remove(current);
    let slot = usize::try_from(target.clamp(0, list_len(&ordered))).unwrap_or(0);
    ordered.insert(slot, moving);

    Ok(ordered
        .iter()
        .zip(0..)
        .filter(|(s, index)| s.order_index != *index)
        .map(|(s, index)| IndexChange {
            link_id: s.id,
            order_index: index,
        })
        .collect())
}

/// Validates a reorder batch against the caller's siblings.
///
/// Every pair in the batch is returned as a change, including pairs that keep
/// their index, so the caller refreshes `updated_at` on each touched link.
/// The resulting index set must be exactly `0..n`.
pub fn plan_reorder(
    siblings: &[Sibling],
    batch: &[LinkOrder],
) -> Result<Vec<IndexChange>, OrderingError> {
    let mut resulting: HashMap<Uuid, i32> =
        siblings.iter().map(|s| (s.id, s.order_index)).collect();

    let mut unknown: Vec<Uuid> = Vec::new();
    for entry in batch {
        if !resulting.contains_key(&entry.id) && !unknown.contains(&entry.id) {
            unknown.push(entry.id);
        }
    }
    if !unknown.is_empty() {
        return Err(OrderingError::UnknownLinks(unknown));
    }

    let mut seen = HashSet::with_capacity(batch.len());
    for entry in batch {
        if !seen.insert(entry.id) {
            return Err(OrderingError::DuplicateLink(entry.id));
        }
        if entry.order_index < 0 {
            return Err(OrderingError::NegativeIndex {
                link_id: entry.id,
                index: entry.order_index,
            });
        }
        resulting.insert(entry.id, entry.order_index);
    }

    let mut indices: Vec<i32> = resulting.values().copied().collect();
    indices.sort_unstable();
    if let Some(pair) = indices.windows(2).find(|pair| pair[0] == pair[1]) {
        return Err(OrderingError::DuplicateIndex(pair[0]));
    }
    let expected_max = list_len(siblings) - 1;
    if indices.iter().zip(0..).any(|(actual, expected)| *actual != expected) {
        return Err(OrderingError::NotDense { expected_max });
    }

    Ok(batch
        .iter()
        .map(|entry| IndexChange {
            link_id: entry.id,
            order_index: entry.order_index,
        })
        .collect())
}
