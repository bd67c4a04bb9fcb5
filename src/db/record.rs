//! Exercise records and manual-entry validation

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::{BodyPart, Laterality};
use crate::sets::SetValues;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// One completed exercise, as stored in the `exercises` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseRecord {
    pub id: Option<i64>,
    pub date_completed: NaiveDate,
    pub body_part: String, // free text on import, may be "Unknown"
    pub exercise_name: String,
    pub laterality: Laterality,
    pub sets: i64,
    pub weight_left: Option<String>,
    pub weight_right: Option<String>,
    pub reps_left: Option<String>,
    pub reps_right: Option<String>,
}

impl ExerciseRecord {
    pub fn date_string(&self) -> String {
        self.date_completed.format(DATE_FORMAT).to_string()
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("invalid body part: {0}")]
    BodyPart(String),
    #[error("sets must be a positive integer")]
    Sets,
    #[error("unilateral exercises require --weight and --reps")]
    MissingUnilateral,
    #[error("number of weight and rep values must equal sets ({0})")]
    UnilateralCount(i64),
    #[error("bilateral exercises require --{0}")]
    MissingBilateral(&'static str),
    #[error("--{0} must have {1} values")]
    BilateralCount(&'static str, i64),
}

/// Manual entry from the `add` command
#[derive(Debug, Clone, Default)]
pub struct NewExercise {
    pub body_part: String,
    pub exercise_name: String,
    pub sets: i64,
    pub weights: Option<Vec<i64>>,
    pub reps: Option<Vec<i64>>,
    pub weights_left: Option<Vec<i64>>,
    pub weights_right: Option<Vec<i64>>,
    pub reps_left: Option<Vec<i64>>,
    pub reps_right: Option<Vec<i64>>,
}

impl NewExercise {
    /// Check the entry and turn it into a storable record
    pub fn validate(self, date: NaiveDate, laterality: Laterality) -> Result<ExerciseRecord, ValidationError> {
        let body_part = BodyPart::from_label(&self.body_part)
            .ok_or_else(|| ValidationError::BodyPart(self.body_part.clone()))?;
        if self.sets <= 0 {
            return Err(ValidationError::Sets);
        }
        let sets = self.sets;
        let joined = |v: Vec<i64>| Some(SetValues::new(v).to_string());

        let (weight_left, weight_right, reps_left, reps_right) = match laterality {
            Laterality::Unilateral => {
                let (Some(weights), Some(reps)) = (self.weights, self.reps) else {
                    return Err(ValidationError::MissingUnilateral);
                };
                if weights.len() as i64 != sets || reps.len() as i64 != sets {
                    return Err(ValidationError::UnilateralCount(sets));
                }
                (joined(weights), None, joined(reps), None)
            }
            Laterality::Bilateral => {
                let sides = [
                    (self.weights_left, "weight-left"),
                    (self.weights_right, "weight-right"),
                    (self.reps_left, "reps-left"),
                    (self.reps_right, "reps-right"),
                ];
                let mut checked = Vec::with_capacity(4);
                for (values, flag) in sides {
                    let values = values.ok_or(ValidationError::MissingBilateral(flag))?;
                    if values.len() as i64 != sets {
                        return Err(ValidationError::BilateralCount(flag, sets));
                    }
                    checked.push(joined(values));
                }
                let mut it = checked.into_iter();
                (
                    it.next().flatten(),
                    it.next().flatten(),
                    it.next().flatten(),
                    it.next().flatten(),
                )
            }
        };

        Ok(ExerciseRecord {
            id: None,
            date_completed: date,
            body_part: body_part.label().to_string(),
            exercise_name: self.exercise_name,
            laterality,
            sets,
            weight_left,
            weight_right,
            reps_left,
            reps_right,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
    }

    fn unilateral(sets: i64, weights: Vec<i64>, reps: Vec<i64>) -> NewExercise {
        NewExercise {
            body_part: "Chest".to_string(),
            exercise_name: "Bench Press".to_string(),
            sets,
            weights: Some(weights),
            reps: Some(reps),
            ..Default::default()
        }
    }

    #[test]
    fn test_unilateral_stores_left_only() {
        let record = unilateral(2, vec![135, 145], vec![10, 8])
            .validate(date(), Laterality::Unilateral)
            .unwrap();
        assert_eq!(record.weight_left.as_deref(), Some("135,145"));
        assert_eq!(record.reps_left.as_deref(), Some("10,8"));
        assert_eq!(record.weight_right, None);
        assert_eq!(record.reps_right, None);
    }

    #[test]
    fn test_unilateral_count_mismatch() {
        let err = unilateral(3, vec![135, 145], vec![10, 8, 6])
            .validate(date(), Laterality::Unilateral)
            .unwrap_err();
        assert_eq!(err, ValidationError::UnilateralCount(3));
    }

    #[test]
    fn test_rejects_unknown_body_part_and_zero_sets() {
        let mut entry = unilateral(1, vec![10], vec![10]);
        entry.body_part = "Elbow".to_string();
        assert_eq!(
            entry.validate(date(), Laterality::Unilateral).unwrap_err(),
            ValidationError::BodyPart("Elbow".to_string())
        );

        let entry = unilateral(0, vec![], vec![]);
        assert_eq!(entry.validate(date(), Laterality::Unilateral).unwrap_err(), ValidationError::Sets);
    }

    #[test]
    fn test_bilateral_requires_all_sides() {
        let entry = NewExercise {
            body_part: "Biceps".to_string(),
            exercise_name: "Curl".to_string(),
            sets: 2,
            weights_left: Some(vec![25, 25]),
            weights_right: Some(vec![25, 25]),
            reps_left: Some(vec![10, 9]),
            ..Default::default()
        };
        assert_eq!(
            entry.validate(date(), Laterality::Bilateral).unwrap_err(),
            ValidationError::MissingBilateral("reps-right")
        );
    }

    #[test]
    fn test_bilateral_valid() {
        let entry = NewExercise {
            body_part: "Biceps".to_string(),
            exercise_name: "Curl".to_string(),
            sets: 2,
            weights_left: Some(vec![25, 25]),
            weights_right: Some(vec![25, 30]),
            reps_left: Some(vec![10, 9]),
            reps_right: Some(vec![10, 7]),
            ..Default::default()
        };
        let record = entry.validate(date(), Laterality::Bilateral).unwrap();
        assert_eq!(record.weight_right.as_deref(), Some("25,30"));
        assert_eq!(record.reps_right.as_deref(), Some("10,7"));
        assert_eq!(record.laterality, Laterality::Bilateral);
    }
}
