//! Compass headings used both for neighbor lookups and as motion commands.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::LocalizationError;

/// One of the four compass directions on the grid.
///
/// Row indices grow southwards and column indices grow eastwards, so
/// `North` is `(-1, 0)` and `East` is `(0, 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Heading {
    North,
    South,
    East,
    West,
}

impl Heading {
    /// All headings in observation order: west, north, east, south.
    pub const ALL: [Heading; 4] = [Heading::West, Heading::North, Heading::East, Heading::South];

    /// Row/column step taken when moving one cell in this heading.
    pub fn offset(self) -> (isize, isize) {
        match self {
            Heading::North => (-1, 0),
            Heading::South => (1, 0),
            Heading::East => (0, 1),
            Heading::West => (0, -1),
        }
    }

    /// The heading 90 degrees counter-clockwise (to the mover's left).
    pub fn left(self) -> Heading {
        match self {
            Heading::North => Heading::West,
            Heading::West => Heading::South,
            Heading::South => Heading::East,
            Heading::East => Heading::North,
        }
    }

    /// The heading 90 degrees clockwise (to the mover's right).
    pub fn right(self) -> Heading {
        match self {
            Heading::North => Heading::East,
            Heading::East => Heading::South,
            Heading::South => Heading::West,
            Heading::West => Heading::North,
        }
    }

    pub fn token(self) -> &'static str {
        match self {
            Heading::North => "N",
            Heading::South => "S",
            Heading::East => "E",
            Heading::West => "W",
        }
    }
}

impl fmt::Display for Heading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token())
    }
}

impl FromStr for Heading {
    type Err = LocalizationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "n" | "north" => Ok(Heading::North),
            "s" | "south" => Ok(Heading::South),
            "e" | "east" => Ok(Heading::East),
            "w" | "west" => Ok(Heading::West),
            _ => Err(LocalizationError::InvalidDirection(s.to_string())),
        }
    }
}

impl TryFrom<String> for Heading {
    type Error = LocalizationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Heading> for String {
    fn from(heading: Heading) -> Self {
        heading.token().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_from_str() {
        assert_eq!("N".parse::<Heading>().unwrap(), Heading::North);
        assert_eq!("s".parse::<Heading>().unwrap(), Heading::South);
        assert_eq!("East".parse::<Heading>().unwrap(), Heading::East);
        assert_eq!(" w ".parse::<Heading>().unwrap(), Heading::West);
        assert!(matches!(
            "X".parse::<Heading>(),
            Err(LocalizationError::InvalidDirection(token)) if token == "X"
        ));
    }

    #[test]
    fn test_left_and_right_are_inverse() {
        for heading in Heading::ALL {
            assert_eq!(heading.left().right(), heading);
            assert_eq!(heading.right().left(), heading);
            assert_ne!(heading.left(), heading.right());
        }
    }

    #[test]
    fn test_moving_west_drifts_south_on_the_left() {
        assert_eq!(Heading::West.left(), Heading::South);
        assert_eq!(Heading::West.right(), Heading::North);
    }

    #[test]
    fn test_serde_token() {
        let json = serde_json::to_string(&Heading::East).unwrap();
        assert_eq!(json, "\"E\"");
        let back: Heading = serde_json::from_str("\"n\"").unwrap();
        assert_eq!(back, Heading::North);
        assert!(serde_json::from_str::<Heading>("\"up\"").is_err());
    }
}
