//! A single character-pair adjustment

use std::fmt;

use kurbo::Vec2;
use serde::{Deserialize, Serialize};

/// Ordered character pair; a rule's identity
pub type RuleKey = (char, char);

/// Shift applied to `second` when it follows `first`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentRule {
    pub name: String,
    pub first: char,
    pub second: char,
    pub x_placement: f64,
    pub y_placement: f64,
    pub selected: bool,
    pub category: String,
}

impl AdjustmentRule {
    /// A selected rule named `"{first}+{second}"`
    pub fn new(first: char, second: char, placement: Vec2, category: impl Into<String>) -> Self {
        Self {
            name: format!("{first}+{second}"),
            first,
            second,
            x_placement: placement.x,
            y_placement: placement.y,
            selected: true,
            category: category.into(),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn key(&self) -> RuleKey {
        (self.first, self.second)
    }

    pub fn placement(&self) -> Vec2 {
        Vec2::new(self.x_placement, self.y_placement)
    }
}

impl fmt::Display for AdjustmentRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} + {}", self.first, self.second)
    }
}
