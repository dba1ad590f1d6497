// ============================================================
// Layer 3: Prediction Domain Type
// ============================================================
// The answer the image service gives for one picture.
//
// The network emits a single number: the probability that the
// picture shows a dog. Everything else is derived from it:
//
//   P(cat)     = 1 - P(dog)
//   label      = "dog" if P(dog) > 0.5, otherwise "cat"
//   confidence = max(P(dog), P(cat))
//
// The comparison is strict, so an exact 0.5 is reported as a cat.
//
// Reference: Rust Book §6 (Enums), §5 (Structs)

use serde::{Deserialize, Serialize};
use std::fmt;

/// The two classes the image model knows about.
/// Serialised in lowercase ("cat" / "dog") to match the JSON API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Cat,
    Dog,
}

impl Label {
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Cat => "cat",
            Label::Dog => "dog",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-class probabilities. Always sums to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Probabilities {
    pub cat: f32,
    pub dog: f32,
}

/// A formatted classification result, ready for the HTTP response
/// or the command line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub predicted_class: Label,
    pub confidence:      f32,
    pub probabilities:   Probabilities,
}

impl Prediction {
    /// Build a prediction from the network's P(dog) output.
    ///
    /// The input is clamped into [0, 1] so a slightly out-of-range
    /// float from the backend can never produce a negative probability.
    pub fn from_dog_probability(dog: f32) -> Self {
        let dog = dog.clamp(0.0, 1.0);
        let cat = 1.0 - dog;

        let predicted_class = if dog > 0.5 { Label::Dog } else { Label::Cat };

        Self {
            predicted_class,
            confidence:    dog.max(cat),
            probabilities: Probabilities { cat, dog },
        }
    }
}
