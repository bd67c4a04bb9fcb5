//! Per-set value lists (weights or reps)
//!
//! The database keeps them as comma separated text, the chatbot CSV uses
//! semicolons inside a cell.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetValues(Vec<i64>);

impl SetValues {
    pub fn new(values: Vec<i64>) -> Self {
        Self(values)
    }

    /// Parse `"135,135,145"` or `"135;135;145"`
    pub fn parse(text: &str) -> Result<Self, String> {
        let text = text.trim();
        if text.is_empty() {
            return Err("empty value list".to_string());
        }
        text.split([',', ';'])
            .map(|token| {
                let token = token.trim();
                if token.is_empty() {
                    return Err(format!("empty value in '{}'", text));
                }
                token
                    .parse::<i64>()
                    .map_err(|_| format!("not a number: '{}'", token))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }

    pub fn values(&self) -> &[i64] {
        &self.0
    }
}

impl fmt::Display for SetValues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<String> = self.0.iter().map(|v| v.to_string()).collect();
        f.write_str(&joined.join(","))
    }
}

/// Normalize a CSV cell to database form. Empty cells become `None`.
pub fn normalize_cell(cell: &str) -> Option<String> {
    let cell = cell.trim();
    if cell.is_empty() {
        None
    } else {
        Some(cell.replace(';', ","))
    }
}

/// Pair weights with reps for display: `135x10, 135x8`
pub fn pair_summary(weights: Option<&str>, reps: Option<&str>) -> String {
    let split = |s: Option<&str>| -> Vec<String> {
        s.map(|s| s.split(',').map(|t| t.trim().to_string()).collect())
            .unwrap_or_default()
    };
    let weights = split(weights);
    let reps = split(reps);

    let count = weights.len().max(reps.len());
    (0..count)
        .map(|i| {
            let w = weights.get(i).map(String::as_str).unwrap_or("?");
            let r = reps.get(i).map(String::as_str).unwrap_or("?");
            format!("{}x{}", w, r)
        })
        .collect::<Vec<_>>()
        .join(", ")
}
