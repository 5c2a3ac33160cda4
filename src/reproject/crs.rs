//! Spatial reference identifiers understood by the built-in transform

use super::{ReprojectError, ReprojectResult};

/// How a spatial reference maps to geographic coordinates
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrsDefinition {
    /// Longitude/latitude in degrees
    Geographic,
    /// A geodesy operator taking geographic radians to projected units
    Projected(String),
}

/// Largest absolute latitude, in degrees, inside the square web mercator
/// extent (`atan(sinh(pi))`)
pub const MERCATOR_LATITUDE_LIMIT: f64 = 85.051_128_779_806_59;

impl CrsDefinition {
    /// Latitude bound of projections that run off to infinity at the poles
    pub fn latitude_limit(&self) -> Option<f64> {
        match self {
            Self::Projected(definition) => match definition.split_whitespace().next() {
                Some("webmerc") | Some("merc") => Some(MERCATOR_LATITUDE_LIMIT),
                _ => None,
            },
            Self::Geographic => None,
        }
    }
}

/// Resolve a CRS identifier such as `epsg:4326` or `EPSG:32631`.
///
/// Lookup is case-insensitive and tolerates a leading `+init=`/`init=`.
/// `geodesy:<definition>` passes an operator definition through unchanged.
pub fn resolve(identifier: &str) -> ReprojectResult<CrsDefinition> {
    let trimmed = identifier.trim();
    if let Some(definition) = strip_prefix_ignore_case(trimmed, "geodesy:") {
        let definition = definition.trim();
        if definition.is_empty() {
            return Err(ReprojectError::InvalidCrs(identifier.to_string()));
        }
        return Ok(CrsDefinition::Projected(definition.to_string()));
    }

    let lower = trimmed.to_ascii_lowercase();
    let lower = lower
        .strip_prefix("+init=")
        .or_else(|| lower.strip_prefix("init="))
        .unwrap_or(&lower);

    match lower {
        "crs:84" | "wgs84" | "ogc:crs84" => return Ok(CrsDefinition::Geographic),
        _ => {}
    }

    let code: u32 = lower
        .strip_prefix("epsg:")
        .and_then(|c| c.parse().ok())
        .ok_or_else(|| ReprojectError::InvalidCrs(identifier.to_string()))?;

    let definition = match code {
        4326 => return Ok(CrsDefinition::Geographic),
        3857 | 3785 | 900913 => "webmerc".to_string(),
        3395 => "merc".to_string(),
        32601..=32660 => format!("utm zone={}", code - 32600),
        32701..=32760 => format!("utm zone={} south", code - 32700),
        _ => return Err(ReprojectError::InvalidCrs(identifier.to_string())),
    };
    Ok(CrsDefinition::Projected(definition))
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &s[prefix.len()..])
}
