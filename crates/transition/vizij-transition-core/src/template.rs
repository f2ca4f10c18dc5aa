//! Board templates: object classes, parent map, decorations, and bounds.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::data::Dataset;
use crate::error::{Result, TransitionError};
use crate::ids::{ClassId, ObjectId};
use crate::props::{Bounds, ObjectProps, ShapeKind, VisualProps};
use crate::scope::DataScope;

/// A peer group of same-typed graphical instances on one board.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectClass {
    pub id: ClassId,
    pub shape: ShapeKind,
    #[serde(default)]
    pub label: Option<String>,
    /// Dataset the scopes were resolved against, if any.
    #[serde(default)]
    pub dataset: Option<String>,
    /// Peer ids in enumeration order.
    pub ids: Vec<ObjectId>,
    #[serde(default)]
    pub properties: HashMap<ObjectId, ObjectProps>,
    #[serde(default)]
    pub scopes: HashMap<ObjectId, DataScope>,
}

impl ObjectClass {
    pub fn props(&self, id: &str) -> Option<&ObjectProps> {
        self.properties.get(id)
    }

    pub fn scope(&self, id: &str) -> Option<&DataScope> {
        self.scopes.get(id)
    }

    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.id)
    }

    /// Classes missing ids, properties, or scopes never take part in matching.
    pub fn is_malformed(&self) -> bool {
        self.ids.is_empty() || self.properties.is_empty() || self.scopes.is_empty()
    }

    /// Union of the peer bounds, `None` for classes without properties.
    pub fn bounds(&self) -> Option<Bounds> {
        self.ids
            .iter()
            .filter_map(|id| self.props(id))
            .map(|p| p.bounds())
            .reduce(|a, b| a.union(&b))
    }

    pub fn resolve_scopes(&mut self, dataset: &Dataset) {
        for scope in self.scopes.values_mut() {
            scope.resolve(dataset);
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DecorationKind {
    Axis,
    Legend,
    Gridline,
}

impl DecorationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DecorationKind::Axis => "axis",
            DecorationKind::Legend => "legend",
            DecorationKind::Gridline => "gridline",
        }
    }
}

/// Axis/legend attached to an owner class and one of its visual fields.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Decoration {
    pub id: String,
    pub owner: ClassId,
    pub visual_field: String,
    pub kind: DecorationKind,
    #[serde(default)]
    pub bounds: Bounds,
    /// Renderer-specific payload, carried through untouched.
    #[serde(default)]
    pub properties: serde_json::Value,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: String,
    #[serde(default)]
    pub classes: Vec<ObjectClass>,
    /// child class -> parent class
    #[serde(default)]
    pub parent_map: HashMap<ClassId, ClassId>,
    #[serde(default)]
    pub decorations: Vec<Decoration>,
    #[serde(default)]
    pub bounds: Bounds,
}

impl Template {
    pub fn class(&self, id: &str) -> Option<&ObjectClass> {
        self.classes.iter().find(|c| c.id == id)
    }

    pub fn parent_of(&self, id: &str) -> Option<&ClassId> {
        self.parent_map.get(id)
    }

    pub fn decoration(&self, id: &str) -> Option<&Decoration> {
        self.decorations.iter().find(|d| d.id == id)
    }

    /// Resolve every class bound to `dataset` against it.
    pub fn resolve_scopes(&mut self, dataset: &Dataset) {
        for class in &mut self.classes {
            if class.dataset.as_deref() == Some(dataset.id.as_str()) {
                class.resolve_scopes(dataset);
            }
        }
    }

    pub fn dataset_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = Vec::new();
        for id in self.classes.iter().filter_map(|c| c.dataset.as_ref()) {
            if !ids.contains(id) {
                ids.push(id.clone());
            }
        }
        ids
    }
}

/// Parse a board template from JSON.
pub fn parse_template_json(s: &str) -> Result<Template> {
    serde_json::from_str(s).map_err(|e| TransitionError::TemplateParse(e.to_string()))
}
