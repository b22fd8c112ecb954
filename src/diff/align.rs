//! Block sequence alignment.

use super::key::block_key;
use super::SubDiffer;
use crate::model::{Block, ChangeRecord};
use log::debug;
use similar::{Algorithm, DiffTag};
use std::hash::Hash;
use std::ops::Range;

/// One alignment operation over two sequences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Opcode {
    /// `old[old]` and `new[new]` are pairwise equal.
    Equal {
        /// Old range
        old: Range<usize>,
        /// New range
        new: Range<usize>,
    },
    /// `old[old]` was replaced by `new[new]`.
    Replace {
        /// Old range
        old: Range<usize>,
        /// New range
        new: Range<usize>,
    },
    /// `old[old]` has no counterpart.
    Delete {
        /// Old range
        old: Range<usize>,
    },
    /// `new[new]` has no counterpart.
    Insert {
        /// New range
        new: Range<usize>,
    },
}

/// Compute a minimal edit script between two sequences.
///
/// Runs Myers' algorithm, so the equal runs form a longest common
/// subsequence. The result is deterministic.
pub fn opcodes<T: Eq + Hash + Ord>(old: &[T], new: &[T]) -> Vec<Opcode> {
    similar::capture_diff_slices(Algorithm::Myers, old, new)
        .iter()
        .map(|op| match op.as_tag_tuple() {
            (DiffTag::Equal, old, new) => Opcode::Equal { old, new },
            (DiffTag::Replace, old, new) => Opcode::Replace { old, new },
            (DiffTag::Delete, old, _) => Opcode::Delete { old },
            (DiffTag::Insert, _, new) => Opcode::Insert { new },
        })
        .collect()
}

/// Align two block sequences into change records.
///
/// Inside a replace run, blocks are paired by position; the differ is asked
/// for a nested diff of each pair. Extra old blocks become deletions and
/// extra new blocks become additions. A failing differ only drops the
/// nested diff of its pair.
pub fn align(old: &[Block], new: &[Block], differ: &dyn SubDiffer) -> Vec<ChangeRecord> {
    let old_keys: Vec<_> = old.iter().map(block_key).collect();
    let new_keys: Vec<_> = new.iter().map(block_key).collect();

    let mut records = Vec::with_capacity(old.len().max(new.len()));
    for op in opcodes(&old_keys, &new_keys) {
        match op {
            Opcode::Equal { old: range, .. } => {
                records.extend(old[range].iter().map(|block| ChangeRecord::Unchanged {
                    block: block.clone(),
                }));
            }
            Opcode::Replace {
                old: old_range,
                new: new_range,
            } => {
                let pairs = old_range.len().min(new_range.len());
                for k in 0..pairs {
                    let old_block = &old[old_range.start + k];
                    let new_block = &new[new_range.start + k];
                    let detail = match differ.diff_pair(old_block, new_block) {
                        Ok(detail) => detail,
                        Err(e) => {
                            debug!(
                                "No detail for changed pair at old #{} / new #{}: {}",
                                old_range.start + k,
                                new_range.start + k,
                                e
                            );
                            None
                        }
                    };
                    records.push(ChangeRecord::Changed {
                        old: old_block.clone(),
                        new: new_block.clone(),
                        detail,
                    });
                }
                records.extend(
                    old[old_range.start + pairs..old_range.end]
                        .iter()
                        .map(|block| ChangeRecord::Deleted {
                            block: block.clone(),
                        }),
                );
                records.extend(
                    new[new_range.start + pairs..new_range.end]
                        .iter()
                        .map(|block| ChangeRecord::Added {
                            block: block.clone(),
                        }),
                );
            }
            Opcode::Delete { old: range } => {
                records.extend(old[range].iter().map(|block| ChangeRecord::Deleted {
                    block: block.clone(),
                }));
            }
            Opcode::Insert { new: range } => {
                records.extend(new[range].iter().map(|block| ChangeRecord::Added {
                    block: block.clone(),
                }));
            }
        }
    }
    records
}
