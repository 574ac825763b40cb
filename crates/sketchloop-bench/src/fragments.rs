//! Fragment file parsing.
//!
//! Each non-blank line is `fragment_id, sub_id, x, y`. Rows sharing a
//! `fragment_id` form one fragment, in row order; fragments are numbered
//! by first appearance. `sub_id` is accepted and ignored. A first line
//! that does not parse is treated as a header.

use std::collections::HashMap;

use sketchloop_pipeline::{Point, Polyline};

/// Parse fragment rows from CSV text.
///
/// Returns a message naming the offending line on malformed input.
pub fn parse_fragments(text: &str) -> Result<Vec<Polyline>, String> {
    let mut order: HashMap<u64, usize> = HashMap::new();
    let mut fragments: Vec<Vec<Point>> = Vec::new();

    for (index, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (key, point) = match parse_row(line) {
            Ok(row) => row,
            Err(_) if index == 0 => continue,
            Err(e) => return Err(format!("line {}: {e}", index + 1)),
        };
        let slot = *order.entry(key.to_bits()).or_insert_with(|| {
            fragments.push(Vec::new());
            fragments.len() - 1
        });
        fragments[slot].push(point);
    }

    Ok(fragments.into_iter().map(Polyline::new).collect())
}

fn parse_row(line: &str) -> Result<(f64, Point), String> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    let [id, _sub_id, x, y] = fields.as_slice() else {
        return Err(format!("expected 4 fields, found {}", fields.len()));
    };
    let number = |field: &str| {
        field
            .parse::<f64>()
            .map_err(|e| format!("invalid number {field:?}: {e}"))
    };
    // Normalize -0.0 so it groups with 0.0.
    let id = number(*id)? + 0.0;
    Ok((id, Point::new(number(*x)?, number(*y)?)))
}
