// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Waste categories predicted by the classifier.
//!
//! The order of [`Category::ALL`] is the order of the model's output scores.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Waste category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    /// Paper and cardboard.
    Paper,
    /// Glass bottles and jars.
    Glass,
    /// Cans and other metal.
    Metal,
    /// Plastic containers and film.
    Plastic,
    /// Anything not recyclable.
    Trash,
}

impl Category {
    /// All categories in model output order.
    pub const ALL: [Self; 5] = [
        Self::Paper,
        Self::Glass,
        Self::Metal,
        Self::Plastic,
        Self::Trash,
    ];

    /// Number of categories the model must output.
    pub const COUNT: usize = Self::ALL.len();

    /// Returns the display name, as written in JSON output and stats files.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Paper => "Paper",
            Self::Glass => "Glass",
            Self::Metal => "Metal",
            Self::Plastic => "Plastic",
            Self::Trash => "Trash",
        }
    }

    /// Position of this category in the model output.
    #[must_use]
    pub const fn index(&self) -> usize {
        match self {
            Self::Paper => 0,
            Self::Glass => 1,
            Self::Metal => 2,
            Self::Plastic => 3,
            Self::Trash => 4,
        }
    }

    /// Category for a model output index.
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        if index < Self::COUNT {
            Some(Self::ALL[index])
        } else {
            None
        }
    }

    /// Byte sent to the sorting controller for this category.
    #[must_use]
    pub const fn code(&self) -> u8 {
        match self {
            Self::Paper => 0x01,
            Self::Glass => 0x02,
            Self::Metal => 0x03,
            Self::Plastic => 0x04,
            Self::Trash => 0x05,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Category {
    type Err = CategoryParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "paper" => Ok(Self::Paper),
            "glass" => Ok(Self::Glass),
            "metal" => Ok(Self::Metal),
            "plastic" => Ok(Self::Plastic),
            "trash" => Ok(Self::Trash),
            _ => Err(CategoryParseError(s.to_string())),
        }
    }
}

/// Error returned when parsing an unknown category name.
#[derive(Debug, Clone)]
pub struct CategoryParseError(String);

impl fmt::Display for CategoryParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid category '{}', expected one of: paper, glass, metal, plastic, trash",
            self.0
        )
    }
}

impl std::error::Error for CategoryParseError {}

/// Per-category counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryCounts([usize; Category::COUNT]);

impl CategoryCounts {
    /// All counters at zero.
    #[must_use]
    pub const fn new() -> Self {
        Self([0; Category::COUNT])
    }

    /// Current count for `category`.
    #[must_use]
    pub const fn get(&self, category: Category) -> usize {
        self.0[category.index()]
    }

    /// Add one to `category` and return the new count.
    pub const fn increment(&mut self, category: Category) -> usize {
        self.0[category.index()] += 1;
        self.0[category.index()]
    }

    /// Sum over all categories.
    #[must_use]
    pub fn total(&self) -> usize {
        self.0.iter().sum()
    }

    /// Iterate `(category, count)` in output order.
    pub fn iter(&self) -> impl Iterator<Item = (Category, usize)> + '_ {
        Category::ALL.iter().map(|&c| (c, self.get(c)))
    }
}
