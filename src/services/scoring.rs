use std::collections::BTreeMap;

use serde_json::Value;

use crate::db::models::{AnswerEntry, QuizQuestion};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ScoredSubmission {
    pub(crate) answers: Vec<AnswerEntry>,
    pub(crate) correct_answers: i32,
    pub(crate) total_questions: i32,
    pub(crate) score: i32,
}

impl ScoredSubmission {
    /// Selected options in question order, `None` for unanswered questions.
    pub(crate) fn selections(&self) -> Vec<Option<i32>> {
        self.answers.iter().map(|entry| entry.selected_option).collect()
    }
}

/// Reads the client's answer sheet.
///
/// Accepts either an object keyed by question index (`{"0": 1, "2": 3}`) or a
/// positional array (`[1, null, 3]`). Entries that are not integers are dropped,
/// which later scores them as unanswered.
pub(crate) fn parse_selections(raw: &Value) -> BTreeMap<usize, i32> {
    let mut selections = BTreeMap::new();

    match raw {
        Value::Object(map) => {
            for (key, value) in map {
                let (Ok(index), Some(option)) = (key.trim().parse::<usize>(), as_option(value))
                else {
                    continue;
                };
                selections.insert(index, option);
            }
        }
        Value::Array(items) => {
            for (index, value) in items.iter().enumerate() {
                if let Some(option) = as_option(value) {
                    selections.insert(index, option);
                }
            }
        }
        _ => {}
    }

    selections
}

fn as_option(value: &Value) -> Option<i32> {
    match value {
        Value::Number(number) => number.as_i64().and_then(|raw| i32::try_from(raw).ok()),
        Value::String(text) => text.trim().parse::<i32>().ok(),
        _ => None,
    }
}

pub(crate) fn score_submission(
    questions: &[QuizQuestion],
    selections: &BTreeMap<usize, i32>,
) -> ScoredSubmission {
    let answers: Vec<AnswerEntry> = questions
        .iter()
        .enumerate()
        .map(|(index, question)| {
            let selected_option = selections.get(&index).copied();
            AnswerEntry {
                question_index: index as i32,
                selected_option,
                is_correct: selected_option == Some(question.correct_answer),
            }
        })
        .collect();

    let correct_answers = answers.iter().filter(|entry| entry.is_correct).count() as i32;
    let total_questions = questions.len() as i32;

    ScoredSubmission {
        score: percentage(i64::from(correct_answers), i64::from(total_questions)),
        answers,
        correct_answers,
        total_questions,
    }
}

/// `round(100 * part / whole)`, zero when `whole` is zero.
pub(crate) fn percentage(part: i64, whole: i64) -> i32 {
    if whole <= 0 {
        return 0;
    }
    (100.0 * part as f64 / whole as f64).round() as i32
}
