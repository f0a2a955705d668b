//! # Number Classification
//!
//! Combines the independent property checks in [`properties`] into a single
//! [`NumberClassification`] together with the ordered property tag list used
//! in API responses.

pub mod properties;

pub use properties::{digit_sum, is_armstrong, is_perfect, is_prime};

use serde::{Deserialize, Serialize};

/// Tag reported in the `properties` array of a classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyTag {
    /// Sum of digits raised to the digit count equals the number
    Armstrong,
    /// Divisible by two
    Even,
    /// Not divisible by two
    Odd,
}

impl PropertyTag {
    /// Wire name of the tag
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Armstrong => "armstrong",
            Self::Even => "even",
            Self::Odd => "odd",
        }
    }
}

impl std::fmt::Display for PropertyTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered tag list: `armstrong` first when it applies, then exactly one parity tag
#[must_use]
pub fn property_tags(number: u64, armstrong: bool) -> Vec<PropertyTag> {
    let mut tags = Vec::with_capacity(2);
    if armstrong {
        tags.push(PropertyTag::Armstrong);
    }
    tags.push(if number % 2 == 0 {
        PropertyTag::Even
    } else {
        PropertyTag::Odd
    });
    tags
}

/// Arithmetic properties of a single non-negative number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberClassification {
    /// The classified number
    pub number: u64,
    /// Result of [`is_prime`]
    pub is_prime: bool,
    /// Result of [`is_perfect`]
    pub is_perfect: bool,
    /// Result of [`is_armstrong`]
    pub is_armstrong: bool,
    /// Result of [`digit_sum`]
    pub digit_sum: u64,
    /// Tags in response order
    pub properties: Vec<PropertyTag>,
}

impl NumberClassification {
    /// Run every property check against `number`
    #[must_use]
    pub fn classify(number: u64) -> Self {
        let armstrong = is_armstrong(number);
        Self {
            number,
            is_prime: is_prime(number),
            is_perfect: is_perfect(number),
            is_armstrong: armstrong,
            digit_sum: digit_sum(number),
            properties: property_tags(number, armstrong),
        }
    }
}
