//! Tag heuristics: area classification and rendering order.

/// Keys whose presence lets a closed way be treated as an area.
const AREA_KEYS: &[&str] = &[
    "aeroway", "amenity", "area", "building", "harbour", "historic", "landuse", "leisure",
    "man_made", "military", "natural", "power", "place", "shop", "sport", "tourism", "water",
    "waterway", "wetland",
];

/// Whether the tags suggest the way could be an area.
///
/// Only the tags are looked at; whether the way is actually closed is the
/// caller's business.
pub fn looks_like_area(tags: &[(String, String)]) -> bool {
    tags.iter().any(|(k, _)| AREA_KEYS.contains(&k.as_str()))
}

fn highway_rank(value: &str) -> i32 {
    match value {
        "minor" | "road" | "unclassified" | "residential" | "living_street" => 3,
        "tertiary" | "tertiary_link" => 4,
        "secondary" | "secondary_link" => 6,
        "primary" | "primary_link" => 7,
        "trunk" | "trunk_link" => 8,
        "motorway" | "motorway_link" => 9,
        _ => 0,
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(value, "yes" | "true" | "1")
}

/// Rendering order for lines and areas: higher draws on top.
///
/// The sum saturates at the `i32` bounds.
pub fn z_order(tags: &[(String, String)]) -> i32 {
    let mut z: i32 = 0;
    for (k, v) in tags {
        let delta = match k.as_str() {
            "layer" => v.trim().parse::<i32>().unwrap_or(0).saturating_mul(10),
            "highway" => highway_rank(v),
            "railway" => 5,
            "bridge" if is_truthy(v) => 10,
            "tunnel" if is_truthy(v) => -10,
            _ => 0,
        };
        z = z.saturating_add(delta);
    }
    z
}
