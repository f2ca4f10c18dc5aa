//! Visual property sets, one tagged variant per shape kind.
//!
//! Every variant exposes the shared [`VisualProps`] capability (bounds, paint,
//! canonical field list) so the comparator and the property diff stay generic.

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ShapeKind {
    Rectangle,
    Ellipse,
    Path,
    Text,
    Composite,
    Group,
}

impl ShapeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ShapeKind::Rectangle => "rectangle",
            ShapeKind::Ellipse => "ellipse",
            ShapeKind::Path => "path",
            ShapeKind::Text => "text",
            ShapeKind::Composite => "composite",
            ShapeKind::Group => "group",
        }
    }

    /// Containers keep animating even when their own fields are unchanged.
    pub fn is_container(self) -> bool {
        matches!(self, ShapeKind::Composite | ShapeKind::Group)
    }

    /// Ellipses and rectangles can morph into each other.
    pub fn is_morph_compatible(self, other: ShapeKind) -> bool {
        matches!(
            (self, other),
            (ShapeKind::Ellipse, ShapeKind::Rectangle) | (ShapeKind::Rectangle, ShapeKind::Ellipse)
        )
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 && self.height <= 0.0
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    pub fn union(&self, other: &Bounds) -> Bounds {
        let x0 = self.x.min(other.x);
        let y0 = self.y.min(other.y);
        let x1 = (self.x + self.width).max(other.x + other.width);
        let y1 = (self.y + self.height).max(other.y + other.height);
        Bounds::new(x0, y0, x1 - x0, y1 - y0)
    }
}

/// Canonical value of one visual field, as compared by the property diff.
#[derive(Clone, Debug, PartialEq)]
pub enum PropValue {
    Number(f64),
    Category(String),
    Points(Vec<[f64; 2]>),
}

impl PropValue {
    /// Numeric fields tolerate `tolerance` units of drift; categories need exact equality.
    pub fn differs(&self, other: &PropValue, tolerance: f64) -> bool {
        match (self, other) {
            (PropValue::Number(a), PropValue::Number(b)) => (a - b).abs() > tolerance,
            (PropValue::Category(a), PropValue::Category(b)) => a != b,
            (PropValue::Points(a), PropValue::Points(b)) => {
                a.len() != b.len()
                    || a.iter().zip(b).any(|(p, q)| {
                        (p[0] - q[0]).abs() > tolerance || (p[1] - q[1]).abs() > tolerance
                    })
            }
            _ => true,
        }
    }
}

/// Shared capability interface over all property variants.
pub trait VisualProps {
    fn kind(&self) -> ShapeKind;
    fn bounds(&self) -> Bounds;
    fn fill(&self) -> Option<&str>;
    fn stroke(&self) -> Option<&str>;
    fn opacity(&self) -> f64;
    /// Canonical `(field, value)` list; bounds fields first.
    fn fields(&self) -> Vec<(&'static str, PropValue)>;

    fn field(&self, name: &str) -> Option<PropValue> {
        self.fields()
            .into_iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v)
    }
}

fn default_opacity() -> f64 {
    1.0
}

fn default_font_size() -> f64 {
    12.0
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paint {
    #[serde(default)]
    pub fill: Option<String>,
    #[serde(default)]
    pub stroke: Option<String>,
    #[serde(default)]
    pub stroke_width: f64,
    #[serde(default = "default_opacity")]
    pub opacity: f64,
}

impl Default for Paint {
    fn default() -> Self {
        Self {
            fill: None,
            stroke: None,
            stroke_width: 0.0,
            opacity: 1.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RectProps {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub corner_radius: f64,
    #[serde(flatten)]
    pub paint: Paint,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EllipseProps {
    pub cx: f64,
    pub cy: f64,
    pub rx: f64,
    pub ry: f64,
    #[serde(flatten)]
    pub paint: Paint,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PathProps {
    pub points: Vec<[f64; 2]>,
    #[serde(default)]
    pub closed: bool,
    #[serde(flatten)]
    pub paint: Paint,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextProps {
    pub x: f64,
    pub y: f64,
    pub text: String,
    #[serde(default = "default_font_size")]
    pub font_size: f64,
    #[serde(flatten)]
    pub paint: Paint,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContainerProps {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default = "default_opacity")]
    pub opacity: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ObjectProps {
    Rectangle(RectProps),
    Ellipse(EllipseProps),
    Path(PathProps),
    Text(TextProps),
    Composite(ContainerProps),
    Group(ContainerProps),
}

fn paint_category(v: Option<&str>) -> PropValue {
    PropValue::Category(v.unwrap_or("none").to_string())
}

fn points_bounds(points: &[[f64; 2]]) -> Bounds {
    let mut it = points.iter();
    let Some(first) = it.next() else {
        return Bounds::default();
    };
    let (mut x0, mut y0, mut x1, mut y1) = (first[0], first[1], first[0], first[1]);
    for p in it {
        x0 = x0.min(p[0]);
        y0 = y0.min(p[1]);
        x1 = x1.max(p[0]);
        y1 = y1.max(p[1]);
    }
    Bounds::new(x0, y0, x1 - x0, y1 - y0)
}

impl ObjectProps {
    fn paint(&self) -> Option<&Paint> {
        match self {
            ObjectProps::Rectangle(p) => Some(&p.paint),
            ObjectProps::Ellipse(p) => Some(&p.paint),
            ObjectProps::Path(p) => Some(&p.paint),
            ObjectProps::Text(p) => Some(&p.paint),
            ObjectProps::Composite(_) | ObjectProps::Group(_) => None,
        }
    }

    pub fn with_opacity(&self, opacity: f64) -> ObjectProps {
        let mut out = self.clone();
        match &mut out {
            ObjectProps::Rectangle(p) => p.paint.opacity = opacity,
            ObjectProps::Ellipse(p) => p.paint.opacity = opacity,
            ObjectProps::Path(p) => p.paint.opacity = opacity,
            ObjectProps::Text(p) => p.paint.opacity = opacity,
            ObjectProps::Composite(p) | ObjectProps::Group(p) => p.opacity = opacity,
        }
        out
    }

    /// Copy of `self` fitted into `target`. Paths are remapped point by point;
    /// text keeps its anchor at the bounds origin and scales its font by height.
    pub fn with_bounds(&self, target: Bounds) -> ObjectProps {
        let current = self.bounds();
        let mut out = self.clone();
        match &mut out {
            ObjectProps::Rectangle(p) => {
                p.x = target.x;
                p.y = target.y;
                p.width = target.width;
                p.height = target.height;
            }
            ObjectProps::Ellipse(p) => {
                let (cx, cy) = target.center();
                p.cx = cx;
                p.cy = cy;
                p.rx = target.width * 0.5;
                p.ry = target.height * 0.5;
            }
            ObjectProps::Path(p) => {
                let sx = if current.width > 0.0 {
                    target.width / current.width
                } else {
                    0.0
                };
                let sy = if current.height > 0.0 {
                    target.height / current.height
                } else {
                    0.0
                };
                for pt in &mut p.points {
                    pt[0] = target.x + (pt[0] - current.x) * sx;
                    pt[1] = target.y + (pt[1] - current.y) * sy;
                }
            }
            ObjectProps::Text(p) => {
                if current.height > 0.0 {
                    p.font_size *= target.height / current.height;
                }
                p.x = target.x;
                p.y = target.y;
            }
            ObjectProps::Composite(p) | ObjectProps::Group(p) => {
                p.x = target.x;
                p.y = target.y;
                p.width = target.width;
                p.height = target.height;
            }
        }
        out
    }
}

impl VisualProps for ObjectProps {
    fn kind(&self) -> ShapeKind {
        match self {
            ObjectProps::Rectangle(_) => ShapeKind::Rectangle,
            ObjectProps::Ellipse(_) => ShapeKind::Ellipse,
            ObjectProps::Path(_) => ShapeKind::Path,
            ObjectProps::Text(_) => ShapeKind::Text,
            ObjectProps::Composite(_) => ShapeKind::Composite,
            ObjectProps::Group(_) => ShapeKind::Group,
        }
    }

    fn bounds(&self) -> Bounds {
        match self {
            ObjectProps::Rectangle(p) => Bounds::new(p.x, p.y, p.width, p.height),
            ObjectProps::Ellipse(p) => {
                Bounds::new(p.cx - p.rx, p.cy - p.ry, p.rx * 2.0, p.ry * 2.0)
            }
            ObjectProps::Path(p) => points_bounds(&p.points),
            // Rough box: 0.6em per glyph.
            ObjectProps::Text(p) => Bounds::new(
                p.x,
                p.y,
                p.text.chars().count() as f64 * p.font_size * 0.6,
                p.font_size,
            ),
            ObjectProps::Composite(p) | ObjectProps::Group(p) => {
                Bounds::new(p.x, p.y, p.width, p.height)
            }
        }
    }

    fn fill(&self) -> Option<&str> {
        self.paint().and_then(|p| p.fill.as_deref())
    }

    fn stroke(&self) -> Option<&str> {
        self.paint().and_then(|p| p.stroke.as_deref())
    }

    fn opacity(&self) -> f64 {
        match self {
            ObjectProps::Composite(p) | ObjectProps::Group(p) => p.opacity,
            _ => self.paint().map_or(1.0, |p| p.opacity),
        }
    }

    fn fields(&self) -> Vec<(&'static str, PropValue)> {
        let b = self.bounds();
        let mut out = vec![
            ("x", PropValue::Number(b.x)),
            ("y", PropValue::Number(b.y)),
            ("width", PropValue::Number(b.width)),
            ("height", PropValue::Number(b.height)),
            ("opacity", PropValue::Number(self.opacity())),
        ];
        if let Some(paint) = self.paint() {
            out.push(("fill", paint_category(paint.fill.as_deref())));
            out.push(("stroke", paint_category(paint.stroke.as_deref())));
            out.push(("strokeWidth", PropValue::Number(paint.stroke_width)));
        }
        match self {
            ObjectProps::Rectangle(p) => {
                out.push(("cornerRadius", PropValue::Number(p.corner_radius)));
            }
            ObjectProps::Path(p) => {
                out.push(("points", PropValue::Points(p.points.clone())));
            }
            ObjectProps::Text(p) => {
                out.push(("text", PropValue::Category(p.text.clone())));
                out.push(("fontSize", PropValue::Number(p.font_size)));
            }
            _ => {}
        }
        out
    }
}

/// Fields whose value differs between `a` and `b`, in `a`'s field order
/// followed by fields only `b` carries.
pub fn changed_fields(a: &ObjectProps, b: &ObjectProps, tolerance: f64) -> Vec<&'static str> {
    let fa = a.fields();
    let fb = b.fields();
    let mut out = Vec::new();
    for (name, va) in &fa {
        match fb.iter().find(|(n, _)| n == name) {
            Some((_, vb)) if !va.differs(vb, tolerance) => {}
            _ => out.push(*name),
        }
    }
    for (name, _) in &fb {
        if !fa.iter().any(|(n, _)| n == name) {
            out.push(*name);
        }
    }
    out
}
