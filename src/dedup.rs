//! # Deduplication
//!
//! Rows sharing a case-insensitive `(artist, title)` form a group. Within a
//! group the row kept is the first occurrence in the playlist holding most of
//! the group's rows; every other row of the group is removed, including
//! repeats inside that playlist. When two playlists hold the same number of
//! rows, the playlist that appears first in row order wins.
//!
//! This is a best-effort choice of a "home" copy, not a canonical one.

use std::collections::{HashMap, HashSet};

use crate::types::TrackRow;

/// Result of a deduplication pass. Both lists keep the original row order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DedupOutcome {
    pub kept: Vec<TrackRow>,
    pub removed: Vec<TrackRow>,
}

impl DedupOutcome {
    pub fn removed_count(&self) -> usize {
        self.removed.len()
    }

    pub fn found_duplicates(&self) -> bool {
        !self.removed.is_empty()
    }
}

/// Removes duplicate tracks from `rows`.
///
/// When no group has more than one member, `kept` equals `rows` and
/// `removed` is empty.
pub fn deduplicate(rows: &[TrackRow]) -> DedupOutcome {
    let mut groups: HashMap<(String, String), Vec<usize>> = HashMap::new();
    for (idx, row) in rows.iter().enumerate() {
        groups.entry(row.dedup_key()).or_default().push(idx);
    }

    let mut removed_indices = HashSet::new();
    for indices in groups.values().filter(|g| g.len() > 1) {
        let keep = index_to_keep(rows, indices);
        removed_indices.extend(indices.iter().copied().filter(|&idx| idx != keep));
    }

    let mut outcome = DedupOutcome::default();
    for (idx, row) in rows.iter().enumerate() {
        if removed_indices.contains(&idx) {
            outcome.removed.push(row.clone());
        } else {
            outcome.kept.push(row.clone());
        }
    }

    log::debug!(
        "deduplicated {} rows: {} kept, {} removed",
        rows.len(),
        outcome.kept.len(),
        outcome.removed.len()
    );
    outcome
}

/// First index of the playlist with the most members of the group. `indices`
/// is in row order, so sub-groups are created in order of first appearance
/// and the strict comparison keeps the earliest playlist on ties.
fn index_to_keep(rows: &[TrackRow], indices: &[usize]) -> usize {
    let mut by_playlist: Vec<(&str, Vec<usize>)> = Vec::new();
    for &idx in indices {
        let playlist = rows[idx].playlist.as_str();
        match by_playlist.iter_mut().find(|(name, _)| *name == playlist) {
            Some((_, members)) => members.push(idx),
            None => by_playlist.push((playlist, vec![idx])),
        }
    }

    let mut best = &by_playlist[0];
    for candidate in &by_playlist[1..] {
        if candidate.1.len() > best.1.len() {
            best = candidate;
        }
    }
    best.1[0]
}
