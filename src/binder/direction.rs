use std::fmt;

use serde::{Deserialize, Serialize};

/// Which way an exchange moves data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// View to model.
    Push,
    /// Model to view.
    Pop,
}

impl Direction {
    pub fn opposite(self) -> Direction {
        match self {
            Direction::Push => Direction::Pop,
            Direction::Pop => Direction::Push,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Push => "push",
            Direction::Pop => "pop",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
