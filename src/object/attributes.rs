//! Well-known attribute keys and their plain-text encodings.
//!
//! Attributes travel between modules as string key/value pairs on data
//! objects; the codecs here keep the formats stable across producers and
//! consumers.

/// Axis-aligned bounds, six space-separated decimal floats.
pub const ATTR_BOUNDING_BOX: &str = "BOUNDING_BOX";

/// Inclusive 1-based timestep range, two space-separated integers.
pub const ATTR_TIMESTEP: &str = "TIMESTEP";

/// Variant label chosen by the producing module.
pub const ATTR_VARIANT: &str = "VARIANT";

/// Marker stamped alongside a non-empty variant.
pub const ATTR_MODULE: &str = "MODULE";

/// Display name resolved by the combiner (title / inherited / variant).
pub const ATTR_OBJECTNAME: &str = "OBJECTNAME";

/// Material definition forwarded to renderers, `"MAT: <definition>"`.
pub const ATTR_MATERIAL: &str = "MATERIAL";

/// Formats a bounding box as `"minX minY minZ maxX maxY maxZ"`.
///
/// Returns `None` when `min == max` on every axis: a fully degenerate box
/// means "no explicit bound" and the attribute is omitted entirely.
pub fn format_bounding_box(min: [f32; 3], max: [f32; 3]) -> Option<String> {
    if min == max {
        return None;
    }
    Some(format!(
        "{:.6} {:.6} {:.6} {:.6} {:.6} {:.6}",
        min[0], min[1], min[2], max[0], max[1], max[2]
    ))
}

/// Parses a bounding box attribute back into `(min, max)`.
pub fn parse_bounding_box(value: &str) -> Option<([f32; 3], [f32; 3])> {
    let mut parts = value.split_ascii_whitespace();
    let mut values = [0.0f32; 6];
    for slot in values.iter_mut() {
        *slot = parts.next()?.parse().ok()?;
    }
    if parts.next().is_some() {
        return None;
    }
    Some((
        [values[0], values[1], values[2]],
        [values[3], values[4], values[5]],
    ))
}

/// Formats a timestep range as `"<first> <last>"`.
pub fn format_timestep(first: usize, last: usize) -> String {
    format!("{} {}", first, last)
}

/// Parses a timestep range attribute.
pub fn parse_timestep(value: &str) -> Option<(usize, usize)> {
    let mut parts = value.split_ascii_whitespace();
    let first = parts.next()?.parse().ok()?;
    let last = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((first, last))
}

/// Splits a free-form parameter of the shape `"k1=v1;k2=v2;..."`.
///
/// Only entries that split into exactly two parts on `=` are kept; malformed
/// entries are dropped without affecting their neighbors.
pub fn parse_attribute_list(value: &str) -> Vec<(String, String)> {
    value
        .split(';')
        .filter_map(|entry| {
            let mut parts = entry.split('=');
            match (parts.next(), parts.next(), parts.next()) {
                (Some(key), Some(val), None) => Some((key.to_string(), val.to_string())),
                _ => None,
            }
        })
        .collect()
}
