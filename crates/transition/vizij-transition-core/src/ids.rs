//! Identifiers shared by the linker, timing graph, and generator.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Object class identifier (one peer group within a board).
pub type ClassId = String;

/// Identifier of a single peer instance inside an object class.
pub type ObjectId = String;

/// Row identifier inside a dataset.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TupleId(pub u32);

/// Slot in the timing graph arena. Slots are never reused.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimingId(pub u32);

impl TimingId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Which board of the transition a class or decoration belongs to.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Side {
    Start,
    End,
}

/// Classification of an object class (or decoration) across the transition.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LinkType {
    Enter,
    Linked,
    Exit,
}

impl LinkType {
    pub fn as_str(self) -> &'static str {
        match self {
            LinkType::Enter => "enter",
            LinkType::Linked => "linked",
            LinkType::Exit => "exit",
        }
    }
}

impl fmt::Display for LinkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for TupleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
