use egui::TextureHandle;
use mapfill::Shape;

/// Layer of the demo scene, with the map it was filled with, if any.
pub struct SceneItem {
    pub name: &'static str,
    pub shape: Shape,
    pub selected: bool,
    pub fill: Option<TextureHandle>,
}

impl SceneItem {
    fn new(name: &'static str, shape: Shape) -> Self {
        Self {
            name,
            shape,
            selected: false,
            fill: None,
        }
    }

    pub fn describe(&self) -> String {
        match &self.shape {
            Shape::Rectangle { width, height } | Shape::Polygon { width, height } => {
                format!("{} {width}x{height}", self.shape.kind())
            }
            Shape::Ellipse { radius_x, radius_y } => {
                format!("Ellipse with radii {radius_x} and {radius_y}")
            }
            shape => shape.kind().to_owned(),
        }
    }
}

/// Mixture of layers which can and which cannot be filled.
pub fn scene() -> Vec<SceneItem> {
    vec![
        SceneItem::new(
            "Header",
            Shape::Rectangle {
                width: 320.,
                height: 120.,
            },
        ),
        SceneItem::new(
            "Badge",
            Shape::Ellipse {
                radius_x: 60.,
                radius_y: 60.,
            },
        ),
        SceneItem::new(
            "Hexagon",
            Shape::Polygon {
                width: 150.,
                height: 130.,
            },
        ),
        SceneItem::new("Squiggle", Shape::Path),
        SceneItem::new("Cutout", Shape::BooleanGroup),
        SceneItem::new(
            "Caption",
            Shape::Other {
                kind: "Text".to_owned(),
            },
        ),
        SceneItem::new(
            "Divider",
            Shape::Other {
                kind: "Line".to_owned(),
            },
        ),
    ]
}
