//! The fixed list of quiz questions a game draws from.

use crate::types::Question;
use std::path::Path;

/// Built-in questions as (prompt, answer)
const BUILTIN_QUESTIONS: &[(&str, f64)] = &[
    ("What is the current population of the Earth? (hundreds of millions)", 80.0),
    ("How tall is Mount Everest in meters?", 8848.0),
    ("How many prefectures does Japan have?", 47.0),
    ("How tall is Tokyo Tower in meters?", 333.0),
    ("How many minutes are in a year?", 525600.0),
    ("Roughly how many bones does an adult human have?", 206.0),
    ("How far does light travel in one second? (10,000 km)", 30.0),
    ("How many keys does a piano have?", 88.0),
    ("Roughly what is the surface temperature of the Sun? (1,000 °C)", 6.0),
    ("Roughly how far away is the Moon? (10,000 km)", 38.0),
];

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse catalog file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("catalog contains no questions")]
    Empty,

    #[error("question {prompt:?} has an unusable answer {answer} (must be finite and non-zero)")]
    InvalidAnswer { prompt: String, answer: f64 },
}

/// Validated, immutable question catalog.
///
/// Every answer is finite and non-zero, so error percentages are always
/// well defined.
#[derive(Debug, Clone)]
pub struct Catalog {
    questions: Vec<Question>,
}

impl Catalog {
    pub fn new(questions: Vec<Question>) -> Result<Self, CatalogError> {
        if questions.is_empty() {
            return Err(CatalogError::Empty);
        }
        if let Some(bad) = questions
            .iter()
            .find(|q| !q.answer.is_finite() || q.answer == 0.0)
        {
            return Err(CatalogError::InvalidAnswer {
                prompt: bad.prompt.clone(),
                answer: bad.answer,
            });
        }
        Ok(Self { questions })
    }

    pub fn builtin() -> Self {
        Self {
            questions: BUILTIN_QUESTIONS
                .iter()
                .map(|(prompt, answer)| Question {
                    prompt: prompt.to_string(),
                    answer: *answer,
                })
                .collect(),
        }
    }

    /// Load a JSON array of `{"q": "...", "a": 123}` objects
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path)?;
        let questions: Vec<Question> = serde_json::from_str(&raw)?;
        Self::new(questions)
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}
