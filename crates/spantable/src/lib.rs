//! Span-table advisor.
//!
//! Maps a span length and load rating to a recommended joist variant and
//! spacing by scanning the catalog span rows in contract order; the first row
//! whose limit covers the span wins. The table data is opaque engineering
//! output and is never recomputed here.
//!
//! Bearers consult the same table with the length of the joists they carry;
//! only the returned spacing applies to them.

use catalog::{span_rows, SpanRow};
use types::{KpaRating, ProfileVariant};

/// Recommendation for a given span and load rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpanAdvice {
    /// Recommended joist variant
    pub variant: ProfileVariant,
    /// Recommended joist centre spacing in mm
    pub joist_spacing_mm: u32,
    /// True when the span exceeds every tabled row
    pub exceeds_limit: bool,
}

/// Look up the recommendation for a span at a load rating.
///
/// Spans beyond the last row fall back to that row's profile with
/// `exceeds_limit` set; the caller decides whether that gates anything.
pub fn advise(length_mm: u32, kpa: KpaRating) -> SpanAdvice {
    let rows = span_rows(kpa);
    let mut fallback = &rows[0];
    for row in rows {
        if length_mm <= row.max_length_mm {
            return advice(row, false);
        }
        fallback = row;
    }
    advice(fallback, true)
}

fn advice(row: &SpanRow, exceeds_limit: bool) -> SpanAdvice {
    SpanAdvice {
        variant: row.variant,
        joist_spacing_mm: row.joist_spacing_mm,
        exceeds_limit,
    }
}
