//! Catalog - closed vocabularies for body parts and laterality

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Body part an exercise is filed under
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BodyPart {
    Chest,
    UpperBack,
    LowerBack,
    Shoulders,
    Calves,
    Glutes,
    Core,
    Biceps,
    Triceps,
    RotatorCuff,
    Neck,
    Forearm,
    Hamstrings,
    Quads,
    Traps,
    TibiaDorsi,
    Knee,
    Hip,
    Legs,
}

impl BodyPart {
    pub fn label(&self) -> &'static str {
        match self {
            BodyPart::Chest => "Chest",
            BodyPart::UpperBack => "Upper Back",
            BodyPart::LowerBack => "Lower Back",
            BodyPart::Shoulders => "Shoulders",
            BodyPart::Calves => "Calves",
            BodyPart::Glutes => "Glutes",
            BodyPart::Core => "Core",
            BodyPart::Biceps => "Biceps",
            BodyPart::Triceps => "Triceps",
            BodyPart::RotatorCuff => "Rotator Cuff",
            BodyPart::Neck => "Neck",
            BodyPart::Forearm => "Forearm",
            BodyPart::Hamstrings => "Hamstrings",
            BodyPart::Quads => "Quads",
            BodyPart::Traps => "Traps",
            BodyPart::TibiaDorsi => "Tibia Dorsi",
            BodyPart::Knee => "Knee",
            BodyPart::Hip => "Hip",
            BodyPart::Legs => "Legs",
        }
    }

    /// All body parts for iteration
    pub fn all() -> &'static [BodyPart] {
        &[
            BodyPart::Chest,
            BodyPart::UpperBack,
            BodyPart::LowerBack,
            BodyPart::Shoulders,
            BodyPart::Calves,
            BodyPart::Glutes,
            BodyPart::Core,
            BodyPart::Biceps,
            BodyPart::Triceps,
            BodyPart::RotatorCuff,
            BodyPart::Neck,
            BodyPart::Forearm,
            BodyPart::Hamstrings,
            BodyPart::Quads,
            BodyPart::Traps,
            BodyPart::TibiaDorsi,
            BodyPart::Knee,
            BodyPart::Hip,
            BodyPart::Legs,
        ]
    }

    /// Exact label match, as stored in the database
    pub fn from_label(label: &str) -> Option<BodyPart> {
        Self::all().iter().copied().find(|b| b.label() == label)
    }
}

impl fmt::Display for BodyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for BodyPart {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BodyPart::from_label(s.trim()).ok_or_else(|| format!("unknown body part: {}", s))
    }
}

/// Whether both sides are recorded separately
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Laterality {
    Unilateral,
    Bilateral,
}

impl Laterality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Laterality::Unilateral => "unilateral",
            Laterality::Bilateral => "bilateral",
        }
    }
}

impl fmt::Display for Laterality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Laterality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "unilateral" => Ok(Laterality::Unilateral),
            "bilateral" => Ok(Laterality::Bilateral),
            other => Err(format!("invalid laterality: {}", other)),
        }
    }
}
