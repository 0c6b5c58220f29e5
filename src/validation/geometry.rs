//! Polygon and country filters.
//!
//! Polygons are validated before any statement is built: closed rings,
//! lon/lat bounds, no self-intersection, non-zero area, EPSG:4326 only,
//! and a configurable maximum area.

use serde::Serialize;
use serde_json::{json, Value};

use super::{Violation, ViolationKind};

/// WGS84 equatorial radius used for spherical ring area, in metres.
const EARTH_RADIUS_M: f64 = 6_378_137.0;

const ACCEPTED_CRS: &[&str] = &[
    "EPSG:4326",
    "urn:ogc:def:crs:EPSG::4326",
    "urn:ogc:def:crs:OGC:1.3:CRS84",
    "urn:ogc:def:crs:OGC::CRS84",
];

fn invalid(message: impl Into<String>) -> Violation {
    Violation::new(ViolationKind::InvalidGeometry, message)
}

/// A longitude/latitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Position {
    pub lon: f64,
    pub lat: f64,
}

impl Position {
    fn from_json(value: &Value) -> Result<Self, Violation> {
        let coords = value
            .as_array()
            .filter(|c| c.len() >= 2)
            .ok_or_else(|| invalid("a position must be an array [longitude, latitude]"))?;
        let lon = coords[0]
            .as_f64()
            .ok_or_else(|| invalid("longitude must be a number"))?;
        let lat = coords[1]
            .as_f64()
            .ok_or_else(|| invalid("latitude must be a number"))?;
        if !(-180.0..=180.0).contains(&lon) || !(-90.0..=90.0).contains(&lat) {
            return Err(invalid(format!(
                "position [{}, {}] is outside longitude/latitude bounds",
                lon, lat
            )));
        }
        Ok(Self { lon, lat })
    }
}

/// A simple polygon in EPSG:4326: one exterior ring and optional holes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Polygon {
    rings: Vec<Vec<Position>>,
}

impl Polygon {
    /// Parse a GeoJSON `Polygon`, a `Feature` wrapping one, or a
    /// `[minLon, minLat, maxLon, maxLat]` bounding box.
    pub fn from_json(value: &Value) -> Result<Self, Violation> {
        if let Some(bbox) = value.as_array() {
            return Self::from_bbox(bbox);
        }

        let object = value
            .as_object()
            .ok_or_else(|| invalid("expected a GeoJSON Polygon or a bounding box"))?;

        match object.get("type").and_then(Value::as_str) {
            Some("Feature") => {
                let geometry = object
                    .get("geometry")
                    .ok_or_else(|| invalid("feature has no geometry"))?;
                Self::from_json(geometry)
            }
            Some("Polygon") => {
                check_crs(object.get("crs"))?;
                let rings = object
                    .get("coordinates")
                    .and_then(Value::as_array)
                    .ok_or_else(|| invalid("polygon has no coordinates"))?
                    .iter()
                    .map(|ring| {
                        ring.as_array()
                            .ok_or_else(|| invalid("a ring must be an array of positions"))?
                            .iter()
                            .map(Position::from_json)
                            .collect::<Result<Vec<_>, _>>()
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Self::new(rings)
            }
            Some(other) => Err(invalid(format!(
                "geometry type '{}' is not supported, expected Polygon",
                other
            ))),
            None => Err(invalid("geometry has no type")),
        }
    }

    fn from_bbox(bbox: &[Value]) -> Result<Self, Violation> {
        let numbers: Vec<f64> = bbox.iter().filter_map(Value::as_f64).collect();
        let &[min_lon, min_lat, max_lon, max_lat] = numbers.as_slice() else {
            return Err(invalid(
                "bounding box must be [minLon, minLat, maxLon, maxLat]",
            ));
        };
        if numbers.len() != bbox.len() {
            return Err(invalid("bounding box values must be numbers"));
        }
        if min_lon >= max_lon || min_lat >= max_lat {
            return Err(invalid("bounding box minimum must be below its maximum"));
        }
        let corners = [
            [min_lon, min_lat],
            [max_lon, min_lat],
            [max_lon, max_lat],
            [min_lon, max_lat],
            [min_lon, min_lat],
        ];
        let ring = corners
            .iter()
            .map(|c| Position::from_json(&json!(c)))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(vec![ring])
    }

    /// Validate rings given as positions.
    pub fn new(rings: Vec<Vec<Position>>) -> Result<Self, Violation> {
        if rings.is_empty() {
            return Err(invalid("polygon has no rings"));
        }

        let mut cleaned = Vec::with_capacity(rings.len());
        for ring in rings {
            if ring.len() < 4 {
                return Err(invalid("a ring needs at least 4 positions"));
            }
            if ring.first() != ring.last() {
                return Err(invalid("ring is not closed"));
            }
            let mut ring = ring;
            ring.dedup();
            if ring.len() < 4 {
                return Err(invalid("ring collapses to fewer than 3 distinct points"));
            }
            cleaned.push(ring);
        }

        if planar_area(&cleaned[0]) == 0.0 {
            return Err(invalid("polygon has zero area"));
        }
        if let Some(hole) = cleaned[1..]
            .iter()
            .find(|hole| !contains(&cleaned[0], hole[0]))
        {
            return Err(invalid(format!(
                "hole starting at [{}, {}] lies outside the exterior ring",
                hole[0].lon, hole[0].lat
            )));
        }
        if self_intersects(&cleaned) {
            return Err(invalid("polygon is self-intersecting"));
        }

        Ok(Self { rings: cleaned })
    }

    pub fn rings(&self) -> &[Vec<Position>] {
        &self.rings
    }

    /// Spherical area in km².
    pub fn area_km2(&self) -> f64 {
        let outer = ring_area(&self.rings[0]).abs();
        let holes: f64 = self.rings[1..].iter().map(|r| ring_area(r).abs()).sum();
        (outer - holes) * 1e-6
    }

    /// GeoJSON text, bound as a statement parameter.
    pub fn to_geojson(&self) -> String {
        let coordinates: Vec<Vec<[f64; 2]>> = self
            .rings
            .iter()
            .map(|ring| ring.iter().map(|p| [p.lon, p.lat]).collect())
            .collect();
        json!({"type": "Polygon", "coordinates": coordinates}).to_string()
    }
}

fn check_crs(crs: Option<&Value>) -> Result<(), Violation> {
    let Some(crs) = crs else {
        return Ok(());
    };
    let name = crs
        .pointer("/properties/name")
        .and_then(Value::as_str)
        .unwrap_or_default();
    if ACCEPTED_CRS.contains(&name) {
        Ok(())
    } else {
        Err(invalid(format!(
            "coordinate reference system '{}' is not supported, use EPSG:4326",
            name
        )))
    }
}

fn planar_area(ring: &[Position]) -> f64 {
    ring.windows(2)
        .map(|w| w[0].lon * w[1].lat - w[1].lon * w[0].lat)
        .sum::<f64>()
        / 2.0
}

/// Signed ring area on the sphere, in m².
fn ring_area(ring: &[Position]) -> f64 {
    let n = ring.len();
    if n < 3 {
        return 0.0;
    }
    let mut area = 0.0;
    for i in 0..n {
        let (lower, middle, upper) = if i == n - 2 {
            (n - 2, n - 1, 0)
        } else if i == n - 1 {
            (n - 1, 0, 1)
        } else {
            (i, i + 1, i + 2)
        };
        area += (ring[upper].lon.to_radians() - ring[lower].lon.to_radians())
            * ring[middle].lat.to_radians().sin();
    }
    area * EARTH_RADIUS_M * EARTH_RADIUS_M / 2.0
}

/// Ray casting point-in-ring test.
fn contains(ring: &[Position], p: Position) -> bool {
    let mut inside = false;
    for w in ring.windows(2) {
        let (a, b) = (w[0], w[1]);
        if (a.lat > p.lat) != (b.lat > p.lat)
            && p.lon < (b.lon - a.lon) * (p.lat - a.lat) / (b.lat - a.lat) + a.lon
        {
            inside = !inside;
        }
    }
    inside
}

fn orientation(a: Position, b: Position, c: Position) -> f64 {
    (b.lon - a.lon) * (c.lat - a.lat) - (b.lat - a.lat) * (c.lon - a.lon)
}

/// `p` lies within the bounding box of `a`-`b` (collinearity checked by caller).
fn within(a: Position, b: Position, p: Position) -> bool {
    p.lon >= a.lon.min(b.lon)
        && p.lon <= a.lon.max(b.lon)
        && p.lat >= a.lat.min(b.lat)
        && p.lat <= a.lat.max(b.lat)
}

fn segments_intersect(p1: Position, p2: Position, q1: Position, q2: Position) -> bool {
    let d1 = orientation(q1, q2, p1);
    let d2 = orientation(q1, q2, p2);
    let d3 = orientation(p1, p2, q1);
    let d4 = orientation(p1, p2, q2);

    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }

    (d1 == 0.0 && within(q1, q2, p1))
        || (d2 == 0.0 && within(q1, q2, p2))
        || (d3 == 0.0 && within(p1, p2, q1))
        || (d4 == 0.0 && within(p1, p2, q2))
}

fn self_intersects(rings: &[Vec<Position>]) -> bool {
    // (ring index, position in ring, ring segment count, start, end)
    let segments: Vec<(usize, usize, usize, Position, Position)> = rings
        .iter()
        .enumerate()
        .flat_map(|(r, ring)| {
            let count = ring.len() - 1;
            ring.windows(2)
                .enumerate()
                .map(move |(i, w)| (r, i, count, w[0], w[1]))
        })
        .collect();

    for (x, &(ra, ia, count, a1, a2)) in segments.iter().enumerate() {
        for &(rb, ib, _, b1, b2) in &segments[x + 1..] {
            if ra == rb {
                let adjacent = ib == ia + 1 || (ia == 0 && ib == count - 1);
                if adjacent {
                    // Shared vertex is expected; a fold back along the previous edge is not.
                    let (prev, shared, next) = if ib == ia + 1 {
                        (a1, a2, b2)
                    } else {
                        (b1, b2, a2)
                    };
                    if orientation(prev, shared, next) == 0.0
                        && (within(prev, shared, next) || within(shared, next, prev))
                    {
                        return true;
                    }
                    continue;
                }
            }
            if segments_intersect(a1, a2, b1, b2) {
                return true;
            }
        }
    }
    false
}

/// ISO 3166-1 alpha-3 country code, upper-cased.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CountryCode(String);

impl CountryCode {
    pub fn new(raw: &str) -> Result<Self, Violation> {
        let code = raw.trim();
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(Violation::new(
                ViolationKind::InvalidValue,
                format!("'{}' is not an ISO 3166-1 alpha-3 country code", code),
            ));
        }
        Ok(Self(code.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A polygon and/or a country, at least one present.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeometryFilter {
    polygon: Option<Polygon>,
    country: Option<CountryCode>,
}

impl GeometryFilter {
    pub fn new(
        polygon: Option<Polygon>,
        country: Option<CountryCode>,
        max_area_km2: f64,
    ) -> Result<Self, Violation> {
        if polygon.is_none() && country.is_none() {
            return Err(Violation::new(
                ViolationKind::Empty,
                "a polygon or a country is required",
            ));
        }
        if let Some(polygon) = &polygon {
            let area = polygon.area_km2();
            if area > max_area_km2 {
                return Err(Violation::new(
                    ViolationKind::AreaExceeded,
                    format!(
                        "polygon area {:.1} km² exceeds the maximum of {} km²",
                        area, max_area_km2
                    ),
                ));
            }
        }
        Ok(Self { polygon, country })
    }

    pub fn polygon(&self) -> Option<&Polygon> {
        self.polygon.as_ref()
    }

    pub fn country(&self) -> Option<&CountryCode> {
        self.country.as_ref()
    }
}
