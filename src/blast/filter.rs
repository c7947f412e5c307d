// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Thomas Junier

use crate::blast::record::{Alignment, AlignmentRecord, Hsp};

pub const DEFAULT_EVALUE_THRESHOLD: f64 = 0.01;

/// HSPs whose E-value is strictly below `threshold`, paired with their alignment, in report order.
pub fn significant_hsps<'a>(
    record: &'a AlignmentRecord,
    threshold: f64,
) -> impl Iterator<Item = (&'a Alignment, &'a Hsp)> + 'a {
    record
        .alignments
        .iter()
        .flat_map(|aln| aln.hsps.iter().map(move |hsp| (aln, hsp)))
        .filter(move |(_, hsp)| hsp.expect < threshold)
}
