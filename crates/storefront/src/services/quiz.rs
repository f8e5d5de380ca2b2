//! Product recommendation quiz.
//!
//! Each answer option awards points to one or more health benefits. The
//! benefit with the highest total wins; ties go to the benefit declared first
//! in [`HealthBenefit`]. Recommended products are the active products of the
//! best-ranked benefit that has any.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use crowe_logic_core::HealthBenefit;
use crowe_logic_core::HealthBenefit::{Cognitive, Energy, Immune, Mood, Relaxation};

use crate::db::{RepositoryError, Storage};
use crate::models::ProductWithIngredients;

/// Points an option awards to one benefit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Weight {
    pub benefit: HealthBenefit,
    pub points: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuizOption {
    pub id: &'static str,
    pub label: &'static str,
    pub weights: &'static [Weight],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Question {
    pub id: &'static str,
    pub prompt: &'static str,
    pub options: &'static [QuizOption],
}

const fn w(benefit: HealthBenefit, points: u32) -> Weight {
    Weight { benefit, points }
}

/// The question set served by `GET /api/quiz`.
pub static QUESTIONS: &[Question] = &[
    Question {
        id: "goal",
        prompt: "What would you most like support with?",
        options: &[
            QuizOption {
                id: "focus",
                label: "Focus and mental clarity",
                weights: &[w(Cognitive, 3)],
            },
            QuizOption {
                id: "immunity",
                label: "Staying well year-round",
                weights: &[w(Immune, 3)],
            },
            QuizOption {
                id: "mood",
                label: "A steadier mood",
                weights: &[w(Mood, 3)],
            },
            QuizOption {
                id: "energy",
                label: "Energy and endurance",
                weights: &[w(Energy, 3)],
            },
            QuizOption {
                id: "calm",
                label: "Winding down and stress relief",
                weights: &[w(Relaxation, 3)],
            },
        ],
    },
    Question {
        id: "afternoon",
        prompt: "How do you usually feel mid-afternoon?",
        options: &[
            QuizOption {
                id: "foggy",
                label: "Foggy, hard to concentrate",
                weights: &[w(Cognitive, 2), w(Energy, 1)],
            },
            QuizOption {
                id: "drained",
                label: "Physically drained",
                weights: &[w(Energy, 2), w(Immune, 1)],
            },
            QuizOption {
                id: "tense",
                label: "Tense or on edge",
                weights: &[w(Relaxation, 2), w(Mood, 1)],
            },
            QuizOption {
                id: "fine",
                label: "Pretty good",
                weights: &[],
            },
        ],
    },
    Question {
        id: "seasons",
        prompt: "How often do seasonal bugs slow you down?",
        options: &[
            QuizOption {
                id: "often",
                label: "Several times a year",
                weights: &[w(Immune, 3)],
            },
            QuizOption {
                id: "sometimes",
                label: "Once in a while",
                weights: &[w(Immune, 1)],
            },
            QuizOption {
                id: "rarely",
                label: "Hardly ever",
                weights: &[],
            },
        ],
    },
    Question {
        id: "sleep",
        prompt: "How well do you sleep?",
        options: &[
            QuizOption {
                id: "restless",
                label: "Restless, my mind keeps going",
                weights: &[w(Relaxation, 2), w(Mood, 1)],
            },
            QuizOption {
                id: "light",
                label: "Lightly, I wake up often",
                weights: &[w(Relaxation, 1)],
            },
            QuizOption {
                id: "well",
                label: "Soundly",
                weights: &[w(Cognitive, 1)],
            },
        ],
    },
];

/// One answered question.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub question_id: String,
    pub option_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuizSubmission {
    #[serde(default)]
    pub answers: Vec<Answer>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BenefitScore {
    pub benefit: HealthBenefit,
    pub score: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub scores: Vec<BenefitScore>,
    pub primary_benefit: HealthBenefit,
    pub products: Vec<ProductWithIngredients>,
}

#[derive(Debug, Error)]
pub enum QuizError {
    #[error("At least one answer is required")]
    NoAnswers,

    #[error("Unknown question: {0}")]
    UnknownQuestion(String),

    #[error("Unknown option '{option}' for question '{question}'")]
    UnknownOption { question: String, option: String },

    #[error("Question answered more than once: {0}")]
    DuplicateAnswer(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Total points per benefit, best first.
///
/// # Errors
///
/// Returns an error for an empty submission, an unknown question or option,
/// or a question answered twice.
pub fn score(answers: &[Answer]) -> Result<Vec<BenefitScore>, QuizError> {
    if answers.is_empty() {
        return Err(QuizError::NoAnswers);
    }

    let mut scores = HealthBenefit::ALL.map(|benefit| BenefitScore { benefit, score: 0 });
    let mut seen: Vec<&str> = Vec::with_capacity(answers.len());

    for answer in answers {
        if seen.contains(&answer.question_id.as_str()) {
            return Err(QuizError::DuplicateAnswer(answer.question_id.clone()));
        }
        seen.push(&answer.question_id);

        let question = QUESTIONS
            .iter()
            .find(|q| q.id == answer.question_id)
            .ok_or_else(|| QuizError::UnknownQuestion(answer.question_id.clone()))?;
        let option = question
            .options
            .iter()
            .find(|o| o.id == answer.option_id)
            .ok_or_else(|| QuizError::UnknownOption {
                question: answer.question_id.clone(),
                option: answer.option_id.clone(),
            })?;

        for weight in option.weights {
            for entry in &mut scores {
                if entry.benefit == weight.benefit {
                    entry.score += weight.points;
                }
            }
        }
    }

    // Stable sort keeps declaration order among equal scores.
    let mut scores = scores.to_vec();
    scores.sort_by(|a, b| b.score.cmp(&a.score));
    Ok(scores)
}

/// Score the answers and pick products.
///
/// # Errors
///
/// Returns a `QuizError` for invalid answers or a storage failure.
#[instrument(skip_all, fields(answers = answers.len()))]
pub async fn recommend(
    storage: &dyn Storage,
    answers: &[Answer],
) -> Result<Recommendation, QuizError> {
    let scores = score(answers)?;

    let mut chosen = None;
    for entry in &scores {
        let mut products = storage
            .list_products_with_ingredients(Some(entry.benefit))
            .await?;
        products.retain(|item| item.product.status.is_active());
        if !products.is_empty() {
            chosen = Some((entry.benefit, products));
            break;
        }
    }

    // With no active products anywhere, still report the best match.
    let (primary_benefit, products) = chosen.unwrap_or_else(|| {
        let best = scores.first().map_or(HealthBenefit::Cognitive, |s| s.benefit);
        (best, Vec::new())
    });

    Ok(Recommendation {
        scores,
        primary_benefit,
        products,
    })
}
