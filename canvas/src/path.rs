//! Path mini-language: typed polylines and their wire encoding.
//!
//! Committed strokes travel to storage and to the report pipeline as
//! SVG-style path data restricted to one `M x,y` followed by zero or more
//! ` L x,y` commands. Inside the engine a stroke is a [`Polyline`]; the string
//! form exists only at the serialization boundary.
//!
//! Strings that fail to parse are kept verbatim as [`PathData::Unparsed`] so a
//! load/save cycle never loses data. They have no endpoints and no drawable
//! geometry.

#[cfg(test)]
#[path = "path_test.rs"]
mod path_test;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::camera::Point;

/// Why a path string could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathParseError {
    #[error("path is empty")]
    Empty,
    #[error("path must begin with `M`")]
    MissingMoveTo,
    #[error("malformed coordinate pair `{0}`")]
    BadCoordinate(String),
}

/// An ordered list of points; the first is the moveto, the rest are linetos.
///
/// Never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Polyline {
    points: Vec<Point>,
}

impl Polyline {
    /// Start a polyline at `start` with no segments.
    #[must_use]
    pub fn new(start: Point) -> Self {
        Self { points: vec![start] }
    }

    /// A single straight segment from `start` to `end`.
    #[must_use]
    pub fn segment(start: Point, end: Point) -> Self {
        Self { points: vec![start, end] }
    }

    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    #[must_use]
    pub fn start(&self) -> Point {
        self.points[0]
    }

    #[must_use]
    pub fn end(&self) -> Point {
        self.points[self.points.len() - 1]
    }

    /// True when there is no lineto at all.
    #[must_use]
    pub fn is_zero_length(&self) -> bool {
        self.points.len() < 2
    }

    /// Start and end of a two-point path. Single-point and multi-segment
    /// polylines have no snappable endpoints.
    #[must_use]
    pub fn endpoints(&self) -> Option<(Point, Point)> {
        match self.points.as_slice() {
            [start, end] => Some((*start, *end)),
            _ => None,
        }
    }

    /// Append a lineto (freeform drawing).
    pub fn push(&mut self, p: Point) {
        self.points.push(p);
    }

    /// Collapse to a single segment from the start to `end` (straight drawing).
    pub fn set_straight_end(&mut self, end: Point) {
        *self = Self::segment(self.start(), end);
    }

    /// Move the final point to `end`. A zero-length polyline is left untouched.
    pub fn replace_end(&mut self, end: Point) {
        if let [_, .., last] = self.points.as_mut_slice() {
            *last = end;
        }
    }
}

impl fmt::Display for Polyline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, p) in self.points.iter().enumerate() {
            let cmd = if i == 0 { "M" } else { " L" };
            write!(f, "{cmd}{},{}", Coord(p.x), Coord(p.y))?;
        }
        Ok(())
    }
}

impl FromStr for Polyline {
    type Err = PathParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(PathParseError::Empty);
        }
        let body = s.strip_prefix('M').ok_or(PathParseError::MissingMoveTo)?;
        let points = body
            .split('L')
            .map(parse_coordinate)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { points })
    }
}

fn parse_coordinate(raw: &str) -> Result<Point, PathParseError> {
    let bad = || PathParseError::BadCoordinate(raw.trim().to_string());
    let (x, y) = raw.split_once(',').ok_or_else(bad)?;
    let x: f64 = x.trim().parse().map_err(|_| bad())?;
    let y: f64 = y.trim().parse().map_err(|_| bad())?;
    if !x.is_finite() || !y.is_finite() {
        return Err(bad());
    }
    Ok(Point::new(x, y))
}

/// Shortest round-trip float form; `-0` prints as `0`.
struct Coord(f64);

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let v = if self.0 == 0.0 { 0.0 } else { self.0 };
        write!(f, "{v}")
    }
}

/// A stored path: either decoded geometry or the raw string it came from.
#[derive(Debug, Clone, PartialEq)]
pub enum PathData {
    Polyline(Polyline),
    Unparsed(String),
}

impl PathData {
    /// Decode a wire string, keeping it verbatim if it does not parse.
    #[must_use]
    pub fn from_wire(raw: &str) -> Self {
        match raw.parse::<Polyline>() {
            Ok(line) => Self::Polyline(line),
            Err(e) => {
                tracing::debug!(error = %e, path = raw, "keeping unparsed path");
                Self::Unparsed(raw.to_string())
            }
        }
    }

    #[must_use]
    pub fn polyline(&self) -> Option<&Polyline> {
        match self {
            Self::Polyline(line) => Some(line),
            Self::Unparsed(_) => None,
        }
    }

    /// Snappable endpoints; `None` for unparsed or non-two-point paths.
    #[must_use]
    pub fn endpoints(&self) -> Option<(Point, Point)> {
        self.polyline().and_then(Polyline::endpoints)
    }

    #[must_use]
    pub fn to_wire(&self) -> String {
        match self {
            Self::Polyline(line) => line.to_string(),
            Self::Unparsed(raw) => raw.clone(),
        }
    }
}

impl From<Polyline> for PathData {
    fn from(line: Polyline) -> Self {
        Self::Polyline(line)
    }
}

impl Serialize for PathData {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_wire())
    }
}

impl<'de> Deserialize<'de> for PathData {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from_wire(&raw))
    }
}
