//! The `selected` parameter: `Ford:F-150,Chevrolet:Corvette`.
//!
//! Tuples are separated by `,` and path segments by `:`. A literal `%`, `,` or
//! `:` inside a segment is percent-encoded so every value survives the trip.

use autos_protocol::HierarchicalSelection;
use percent_encoding::percent_decode_str;

const TUPLE_SEPARATOR: char = ',';
const SEGMENT_SEPARATOR: char = ':';

pub fn encode_selections(items: &[HierarchicalSelection]) -> String {
    items
        .iter()
        .filter(|item| !item.path.is_empty())
        .map(|item| {
            item.path
                .iter()
                .map(String::as_str)
                .map(escape_segment)
                .collect::<Vec<_>>()
                .join(":")
        })
        .collect::<Vec<_>>()
        .join(",")
}

/// Malformed tuples (empty, or with only empty segments) are skipped.
pub fn decode_selections(raw: &str) -> Vec<HierarchicalSelection> {
    raw.split(TUPLE_SEPARATOR)
        .filter_map(|token| {
            let path: Vec<String> = token
                .split(SEGMENT_SEPARATOR)
                .map(unescape_segment)
                .filter(|segment| !segment.is_empty())
                .collect();
            HierarchicalSelection::from_path(path)
        })
        .collect()
}

fn escape_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for ch in segment.chars() {
        match ch {
            '%' => out.push_str("%25"),
            ',' => out.push_str("%2C"),
            ':' => out.push_str("%3A"),
            other => out.push(other),
        }
    }
    out
}

fn unescape_segment(segment: &str) -> String {
    percent_decode_str(segment.trim())
        .decode_utf8_lossy()
        .into_owned()
}
