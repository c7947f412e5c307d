// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Thomas Junier

use std::io::{self, Write};

use log::debug;

use crate::blast::filter::significant_hsps;
use crate::blast::record::AlignmentRecord;

pub const ALIGNMENT_MARKER: &str = "****Alignment****";

/// Writes one block per HSP with E-value < `threshold`, then a summary line. Returns the number of
/// blocks written.
pub fn write_report<W: Write>(
    out: &mut W,
    record: &AlignmentRecord,
    threshold: f64,
) -> io::Result<usize> {
    let mut count = 0;
    for (aln, hsp) in significant_hsps(record, threshold) {
        count += 1;
        writeln!(out, "{}", ALIGNMENT_MARKER)?;
        writeln!(out, "sequence: {}", aln.title)?;
        writeln!(out, "length: {}", aln.length)?;
        writeln!(out, "e value: {}", format_float(hsp.expect))?;
        writeln!(out, "{}", hsp.query)?;
        writeln!(out, "{}", hsp.match_)?;
        writeln!(out, "{}", hsp.sbjct)?;
    }
    writeln!(out, "{}", summary_line(threshold, count))?;
    debug!("{} of {} HSP(s) reported", count, record.num_hsps());
    Ok(count)
}

pub fn summary_line(threshold: f64, count: usize) -> String {
    format!(
        "Total alignments found with E-value < {}: {}",
        format_float(threshold),
        count
    )
}

// Shortest round-trip representation, with a decimal point for integral values and scientific
// notation (two-digit signed exponent) below 1e-4 or from 1e16 on. This is how E-values have
// always been printed in these reports, e.g. 0.01, 3.0, 1e-05, 2.5e-120.
pub fn format_float(x: f64) -> String {
    if !x.is_finite() {
        return if x.is_nan() {
            String::from("nan")
        } else if x > 0.0 {
            String::from("inf")
        } else {
            String::from("-inf")
        };
    }
    let abs = x.abs();
    if abs != 0.0 && !(1e-4..1e16).contains(&abs) {
        let sci = format!("{:e}", x);
        if let Some((mantissa, exp)) = sci.split_once('e') {
            if let Ok(exp) = exp.parse::<i32>() {
                let sign = if exp < 0 { '-' } else { '+' };
                return format!("{}e{}{:02}", mantissa, sign, exp.abs());
            }
        }
        return sci;
    }
    let plain = format!("{}", x);
    if plain.contains('.') {
        plain
    } else {
        format!("{}.0", plain)
    }
}
