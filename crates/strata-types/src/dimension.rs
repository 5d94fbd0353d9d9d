//! Spatial dimensionality of a simulation.

use serde::{Deserialize, Serialize};

/// Number of spatial dimensions a grid and its materials live in.
///
/// Two-dimensional problems are embedded in 3D vectors with a zero
/// third component, so every solver stage works on `DVec3`/`DMat3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Two,
    Three,
}

impl Dimension {
    /// Returns the number of active spatial components.
    #[inline]
    pub fn count(self) -> usize {
        match self {
            Dimension::Two => 2,
            Dimension::Three => 3,
        }
    }

    /// Builds a dimension from a component count.
    pub fn from_count(count: usize) -> Option<Self> {
        match count {
            2 => Some(Dimension::Two),
            3 => Some(Dimension::Three),
            _ => None,
        }
    }
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}D", self.count())
    }
}
