//! Registry trait: read-only lookup of render targets and datasets.
//!
//! Handles are small string keys chosen by the host. The generator never
//! touches render objects directly; it emits commands addressed by handle.

use hashbrown::HashMap;

use crate::data::Dataset;
use crate::ids::Side;
use crate::template::Template;

/// Opaque target handle (small string key).
pub type TargetHandle = String;

/// Host-side lookup injected into the generator at construction.
pub trait Registry {
    /// Render object of a class on one board.
    fn object(&self, class_id: &str, side: Side) -> Option<TargetHandle>;
    /// Render object of a decoration on one board.
    fn decoration(&self, id: &str, side: Side) -> Option<TargetHandle>;
    fn dataset(&self, id: &str) -> Option<&Dataset>;
}

/// HashMap-backed registry for hosts with a fixed scene and for tests.
#[derive(Debug, Default, Clone)]
pub struct StaticRegistry {
    objects: HashMap<(String, Side), TargetHandle>,
    decorations: HashMap<(String, Side), TargetHandle>,
    datasets: HashMap<String, Dataset>,
}

impl StaticRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_object(mut self, class_id: &str, side: Side, handle: impl Into<TargetHandle>) -> Self {
        self.objects.insert((class_id.to_string(), side), handle.into());
        self
    }

    pub fn with_decoration(mut self, id: &str, side: Side, handle: impl Into<TargetHandle>) -> Self {
        self.decorations.insert((id.to_string(), side), handle.into());
        self
    }

    pub fn with_dataset(mut self, dataset: Dataset) -> Self {
        self.datasets.insert(dataset.id.clone(), dataset);
        self
    }

    /// Register every class and decoration of `template` under `"{side}:{id}"`.
    pub fn with_template(mut self, template: &Template, side: Side) -> Self {
        let prefix = match side {
            Side::Start => "start",
            Side::End => "end",
        };
        for class in &template.classes {
            self.objects
                .insert((class.id.clone(), side), format!("{prefix}:{}", class.id));
        }
        for deco in &template.decorations {
            self.decorations
                .insert((deco.id.clone(), side), format!("{prefix}:{}", deco.id));
        }
        self
    }
}

impl Registry for StaticRegistry {
    fn object(&self, class_id: &str, side: Side) -> Option<TargetHandle> {
        self.objects.get(&(class_id.to_string(), side)).cloned()
    }

    fn decoration(&self, id: &str, side: Side) -> Option<TargetHandle> {
        self.decorations.get(&(id.to_string(), side)).cloned()
    }

    fn dataset(&self, id: &str) -> Option<&Dataset> {
        self.datasets.get(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_are_per_side() {
        let reg = StaticRegistry::new()
            .with_object("bars", Side::Start, "a")
            .with_object("bars", Side::End, "b");
        assert_eq!(reg.object("bars", Side::Start).as_deref(), Some("a"));
        assert_eq!(reg.object("bars", Side::End).as_deref(), Some("b"));
        assert!(reg.object("dots", Side::End).is_none());
        assert!(reg.dataset("sales").is_none());
    }
}
