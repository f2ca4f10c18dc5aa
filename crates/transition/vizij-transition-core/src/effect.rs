//! Enter/exit effect presets.
//!
//! An effect maps a visible property set to its hidden "off-state". Enter
//! edges animate from the off-state to the end props; exit edges animate
//! from the start props to the off-state.

use serde::{Deserialize, Serialize};

use crate::props::{Bounds, ObjectProps, VisualProps};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WipeDirection {
    Left,
    Right,
    Up,
    Down,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "camelCase")]
pub enum Effect {
    Fade,
    Wipe { direction: WipeDirection },
    Scale,
    None,
}

impl Default for Effect {
    fn default() -> Self {
        Effect::Fade
    }
}

impl Effect {
    pub fn apply(&self, props: &ObjectProps) -> ObjectProps {
        let b = props.bounds();
        match self {
            Effect::Fade => props.with_opacity(0.0),
            Effect::Scale => {
                let (cx, cy) = b.center();
                props.with_bounds(Bounds::new(cx, cy, 0.0, 0.0))
            }
            // The collapsed edge is the one the wipe travels towards.
            Effect::Wipe { direction } => {
                let target = match direction {
                    WipeDirection::Right => Bounds::new(b.x, b.y, 0.0, b.height),
                    WipeDirection::Left => Bounds::new(b.x + b.width, b.y, 0.0, b.height),
                    WipeDirection::Down => Bounds::new(b.x, b.y, b.width, 0.0),
                    WipeDirection::Up => Bounds::new(b.x, b.y + b.height, b.width, 0.0),
                };
                props.with_bounds(target)
            }
            Effect::None => props.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::props::{Paint, RectProps};

    fn bar() -> ObjectProps {
        ObjectProps::Rectangle(RectProps {
            x: 10.0,
            y: 20.0,
            width: 30.0,
            height: 40.0,
            corner_radius: 0.0,
            paint: Paint::default(),
        })
    }

    #[test]
    fn fade_only_touches_opacity() {
        let off = Effect::Fade.apply(&bar());
        assert_eq!(off.opacity(), 0.0);
        assert_eq!(off.bounds(), bar().bounds());
    }

    #[test]
    fn scale_collapses_to_center() {
        let off = Effect::Scale.apply(&bar());
        assert_eq!(off.bounds(), Bounds::new(25.0, 40.0, 0.0, 0.0));
    }

    #[test]
    fn wipe_right_collapses_onto_leading_edge() {
        let off = Effect::Wipe {
            direction: WipeDirection::Right,
        }
        .apply(&bar());
        assert_eq!(off.bounds(), Bounds::new(10.0, 20.0, 0.0, 40.0));
    }
}
