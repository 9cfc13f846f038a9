use std::fmt;

use serde::de::Error as _;
use serde::ser::SerializeMap as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Side of the image requested for paths and boolean groups, which have no meaningful size
/// of their own.
const FREEFORM_SIDE: u32 = 500;

/// Geometry of a selected layer, as far as filling it with a map is concerned.
///
/// In JSON, shapes are tagged by `type`, e.g. `{"type": "ellipse", "radiusX": 5, "radiusY": 6}`.
/// A tag which is not one of the variants below gives [`Shape::Other`].
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Rectangle { width: f64, height: f64 },
    Polygon { width: f64, height: f64 },
    Ellipse { radius_x: f64, radius_y: f64 },
    Path,
    BooleanGroup,
    /// Layer which cannot hold an image fill, e.g. text or a line.
    Other { kind: String },
}

/// Wire form of the shapes which can be filled.
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
enum FillableShape {
    Rectangle {
        width: f64,
        height: f64,
    },
    Polygon {
        width: f64,
        height: f64,
    },
    #[serde(rename_all = "camelCase")]
    Ellipse {
        radius_x: f64,
        radius_y: f64,
    },
    Path,
    BooleanGroup,
}

impl FillableShape {
    const TAGS: [&'static str; 5] = ["rectangle", "polygon", "ellipse", "path", "boolean-group"];
}

impl From<FillableShape> for Shape {
    fn from(shape: FillableShape) -> Self {
        match shape {
            FillableShape::Rectangle { width, height } => Self::Rectangle { width, height },
            FillableShape::Polygon { width, height } => Self::Polygon { width, height },
            FillableShape::Ellipse { radius_x, radius_y } => Self::Ellipse { radius_x, radius_y },
            FillableShape::Path => Self::Path,
            FillableShape::BooleanGroup => Self::BooleanGroup,
        }
    }
}

impl Serialize for Shape {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let fillable = match *self {
            Self::Rectangle { width, height } => FillableShape::Rectangle { width, height },
            Self::Polygon { width, height } => FillableShape::Polygon { width, height },
            Self::Ellipse { radius_x, radius_y } => FillableShape::Ellipse { radius_x, radius_y },
            Self::Path => FillableShape::Path,
            Self::BooleanGroup => FillableShape::BooleanGroup,
            Self::Other { ref kind } => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("type", kind)?;
                return map.end();
            }
        };
        fillable.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Shape {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let tag = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| D::Error::missing_field("type"))?;

        if !FillableShape::TAGS.iter().any(|known| *known == tag) {
            return Ok(Self::Other {
                kind: tag.to_owned(),
            });
        }

        serde_json::from_value::<FillableShape>(value)
            .map(Into::into)
            .map_err(D::Error::custom)
    }
}

impl Shape {
    /// Human readable name of the layer kind.
    pub fn kind(&self) -> &str {
        match self {
            Self::Rectangle { .. } => "Rectangle",
            Self::Polygon { .. } => "Polygon",
            Self::Ellipse { .. } => "Ellipse",
            Self::Path => "Path",
            Self::BooleanGroup => "BooleanGroup",
            Self::Other { kind } => kind,
        }
    }

    /// Size of the map image to be requested for this shape.
    ///
    /// # Errors
    ///
    /// For shapes which cannot be filled with an image, and for shapes whose size rounds down
    /// to nothing.
    pub fn dimensions(&self) -> Result<ShapeDimensions, UnsupportedShape> {
        let (width, height) = match self {
            Self::Rectangle { width, height } | Self::Polygon { width, height } => {
                (*width, *height)
            }
            Self::Ellipse { radius_x, radius_y } => (2. * radius_x, 2. * radius_y),
            Self::Path | Self::BooleanGroup => {
                return Ok(ShapeDimensions {
                    width: FREEFORM_SIDE,
                    height: FREEFORM_SIDE,
                });
            }
            Self::Other { kind } => return Err(UnsupportedShape::Kind(kind.clone())),
        };

        match (pixels(width), pixels(height)) {
            (Some(width), Some(height)) => Ok(ShapeDimensions { width, height }),
            _ => Err(UnsupportedShape::Degenerate {
                kind: self.kind().to_owned(),
                width,
                height,
            }),
        }
    }
}

/// Round to whole pixels, rejecting sizes which cannot be requested.
fn pixels(value: f64) -> Option<u32> {
    let rounded = value.round();
    (rounded >= 1. && rounded <= f64::from(u32::MAX)).then_some(rounded as u32)
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum UnsupportedShape {
    #[error("{0} is not supported and so was skipped.")]
    Kind(String),

    #[error("{kind} of size {width}x{height} is too small and so was skipped.")]
    Degenerate {
        kind: String,
        width: f64,
        height: f64,
    },
}

/// Pixel size of the image to request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShapeDimensions {
    pub width: u32,
    pub height: u32,
}

impl fmt::Display for ShapeDimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}
