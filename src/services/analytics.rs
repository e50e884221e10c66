//! Performance aggregation over already-fetched quiz attempts.
//!
//! Everything here is pure: callers load the attempts, these functions only
//! group and rank them.

use serde::Serialize;
use time::PrimitiveDateTime;

use crate::services::scoring::percentage;

pub(crate) const UNKNOWN_SUBJECT: &str = "Unknown";
pub(crate) const GENERAL_TOPIC: &str = "General";

/// One completed submission, flattened with the labels needed for grouping.
#[derive(Debug, Clone, Default)]
pub(crate) struct AttemptRecord {
    pub(crate) subject: Option<String>,
    pub(crate) title: Option<String>,
    pub(crate) score: Option<i32>,
    pub(crate) correct_answers: Option<i32>,
    pub(crate) total_questions: Option<i32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct SubjectStat {
    pub(crate) subject: String,
    pub(crate) attempts: usize,
    pub(crate) accuracy: i32,
    pub(crate) average_score: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct TopicStat {
    pub(crate) topic: String,
    pub(crate) attempts: usize,
    pub(crate) accuracy: i32,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct AnalyticsReport {
    pub(crate) subject_stats: Vec<SubjectStat>,
    pub(crate) weak_subjects: Vec<String>,
    pub(crate) topic_stats: Vec<TopicStat>,
    pub(crate) weakest_topics: Vec<String>,
    pub(crate) recommended_difficulty: Difficulty,
    pub(crate) recommendations: Vec<String>,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct WeakAreaPolicy {
    pub(crate) threshold: i32,
    pub(crate) limit: usize,
}

impl Default for WeakAreaPolicy {
    fn default() -> Self {
        Self { threshold: 60, limit: 3 }
    }
}

#[derive(Default)]
struct Bucket {
    attempts: usize,
    correct: i64,
    total: i64,
    score_sum: i64,
}

impl Bucket {
    fn add(&mut self, record: &AttemptRecord) {
        self.attempts += 1;
        self.correct += i64::from(record.correct_answers.unwrap_or(0).max(0));
        self.total += i64::from(record.total_questions.unwrap_or(0).max(0));
        self.score_sum += i64::from(record.score.unwrap_or(0));
    }

    fn accuracy(&self) -> i32 {
        percentage(self.correct, self.total)
    }

    fn average_score(&self) -> i32 {
        if self.attempts == 0 {
            return 0;
        }
        (self.score_sum as f64 / self.attempts as f64).round() as i32
    }
}

/// Groups by a label while keeping first-appearance order, so the later stable
/// sort leaves ties in input order.
fn group_by<'a>(
    records: &'a [AttemptRecord],
    label: impl Fn(&'a AttemptRecord) -> String,
) -> Vec<(String, Bucket)> {
    let mut groups: Vec<(String, Bucket)> = Vec::new();
    for record in records {
        let key = label(record);
        match groups.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, bucket)) => bucket.add(record),
            None => {
                let mut bucket = Bucket::default();
                bucket.add(record);
                groups.push((key, bucket));
            }
        }
    }
    groups
}

pub(crate) fn subject_label(subject: Option<&str>) -> String {
    subject
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(UNKNOWN_SUBJECT)
        .to_string()
}

/// Naive topic: the part of the title before the first `:`.
pub(crate) fn topic_of(title: Option<&str>) -> String {
    let head = title.unwrap_or_default().split(':').next().unwrap_or_default().trim();
    if head.is_empty() {
        GENERAL_TOPIC.to_string()
    } else {
        head.to_string()
    }
}

/// Per-subject stats, weakest first.
pub(crate) fn subject_stats(records: &[AttemptRecord]) -> Vec<SubjectStat> {
    let mut stats: Vec<SubjectStat> =
        group_by(records, |record| subject_label(record.subject.as_deref()))
            .into_iter()
            .map(|(subject, bucket)| SubjectStat {
                subject,
                attempts: bucket.attempts,
                accuracy: bucket.accuracy(),
                average_score: bucket.average_score(),
            })
            .collect();
    stats.sort_by_key(|stat| stat.accuracy);
    stats
}

pub(crate) fn topic_stats(records: &[AttemptRecord]) -> Vec<TopicStat> {
    let mut stats: Vec<TopicStat> = group_by(records, |record| topic_of(record.title.as_deref()))
        .into_iter()
        .map(|(topic, bucket)| TopicStat {
            topic,
            attempts: bucket.attempts,
            accuracy: bucket.accuracy(),
        })
        .collect();
    stats.sort_by_key(|stat| stat.accuracy);
    stats
}

pub(crate) fn weak_subjects(stats: &[SubjectStat], policy: WeakAreaPolicy) -> Vec<String> {
    stats
        .iter()
        .filter(|stat| stat.accuracy < policy.threshold)
        .take(policy.limit)
        .map(|stat| stat.subject.clone())
        .collect()
}

pub(crate) fn weakest_topics(stats: &[TopicStat], policy: WeakAreaPolicy) -> Vec<String> {
    stats
        .iter()
        .filter(|stat| stat.accuracy < policy.threshold)
        .take(policy.limit)
        .map(|stat| stat.topic.clone())
        .collect()
}

pub(crate) fn recommend_difficulty(stats: &[SubjectStat]) -> Difficulty {
    if stats.is_empty() {
        return Difficulty::Medium;
    }

    let sum: i64 = stats.iter().map(|stat| i64::from(stat.accuracy)).sum();
    let mean = (sum as f64 / stats.len() as f64).round() as i64;

    if mean >= 80 {
        Difficulty::Hard
    } else if mean >= 55 {
        Difficulty::Medium
    } else {
        Difficulty::Easy
    }
}

pub(crate) fn build_report(records: &[AttemptRecord], policy: WeakAreaPolicy) -> AnalyticsReport {
    let subject_stats = subject_stats(records);
    let topic_stats = topic_stats(records);
    let weak_subjects = weak_subjects(&subject_stats, policy);
    let weakest_topics = weakest_topics(&topic_stats, policy);
    let recommended_difficulty = recommend_difficulty(&subject_stats);

    let mut recommendations = Vec::new();
    if !weak_subjects.is_empty() {
        recommendations.push(format!("Focus on {}.", weak_subjects.join(", ")));
    }
    if !weakest_topics.is_empty() {
        recommendations.push(format!("Review topics: {}.", weakest_topics.join(", ")));
    }
    recommendations.push(format!("Next quiz difficulty: {}.", recommended_difficulty.as_str()));

    AnalyticsReport {
        subject_stats,
        weak_subjects,
        topic_stats,
        weakest_topics,
        recommended_difficulty,
        recommendations,
    }
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct ScorePoint {
    pub(crate) quiz_id: String,
    pub(crate) quiz_title: String,
    pub(crate) subject: String,
    pub(crate) score: i32,
    pub(crate) completed_at: String,
    #[serde(skip)]
    pub(crate) completed_at_raw: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct ScoreSummary {
    pub(crate) total_quizzes: usize,
    pub(crate) average_score: f64,
    pub(crate) highest_score: i32,
    pub(crate) lowest_score: i32,
    pub(crate) results: Vec<ScorePoint>,
}

/// Score trend for one student: results oldest first, average to two decimals.
pub(crate) fn score_summary(mut points: Vec<ScorePoint>) -> ScoreSummary {
    points.sort_by_key(|point| point.completed_at_raw);

    let total_quizzes = points.len();
    let (average_score, highest_score, lowest_score) = if points.is_empty() {
        (0.0, 0, 0)
    } else {
        let sum: i64 = points.iter().map(|point| i64::from(point.score)).sum();
        let average = (sum as f64 / total_quizzes as f64 * 100.0).round() / 100.0;
        let highest = points.iter().map(|point| point.score).max().unwrap_or(0);
        let lowest = points.iter().map(|point| point.score).min().unwrap_or(0);
        (average, highest, lowest)
    };

    ScoreSummary { total_quizzes, average_score, highest_score, lowest_score, results: points }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn attempt(subject: &str, title: &str, score: i32, correct: i32, total: i32) -> AttemptRecord {
        AttemptRecord {
            subject: Some(subject.to_string()),
            title: Some(title.to_string()),
            score: Some(score),
            correct_answers: Some(correct),
            total_questions: Some(total),
        }
    }

    fn stat(subject: &str, accuracy: i32) -> SubjectStat {
        SubjectStat { subject: subject.to_string(), attempts: 1, accuracy, average_score: accuracy }
    }

    #[test]
    fn weakest_subject_ranks_first() {
        let records = vec![
            attempt("Math", "Algebra: linear", 90, 9, 10),
            attempt("Math", "Algebra: quadratics", 80, 8, 10),
            attempt("Science", "Cells", 50, 5, 10),
        ];

        let stats = subject_stats(&records);

        assert_eq!(stats[0].subject, "Science");
        assert_eq!(stats[0].average_score, 50);
        assert_eq!(stats[1].subject, "Math");
        assert_eq!(stats[1].average_score, 85);
        assert_eq!(stats[1].accuracy, 85);
        assert_eq!(stats[1].attempts, 2);
    }

    #[test]
    fn zero_questions_give_zero_accuracy() {
        let records = vec![attempt("History", "Empty", 0, 0, 0)];
        assert_eq!(subject_stats(&records)[0].accuracy, 0);
    }

    #[test]
    fn missing_fields_are_treated_as_zero() {
        let records = vec![AttemptRecord::default()];
        let stats = subject_stats(&records);
        assert_eq!(stats[0].subject, UNKNOWN_SUBJECT);
        assert_eq!(stats[0].accuracy, 0);
        assert_eq!(stats[0].average_score, 0);
        assert_eq!(topic_stats(&records)[0].topic, GENERAL_TOPIC);
    }

    #[test]
    fn ties_keep_input_order() {
        let records = vec![
            attempt("Physics", "a", 40, 4, 10),
            attempt("Art", "b", 40, 4, 10),
            attempt("Biology", "c", 40, 4, 10),
        ];
        let names: Vec<_> = subject_stats(&records).into_iter().map(|s| s.subject).collect();
        assert_eq!(names, vec!["Physics", "Art", "Biology"]);
    }

    #[test]
    fn weak_subjects_respect_threshold_and_limit() {
        let stats = vec![stat("A", 10), stat("B", 20), stat("C", 30), stat("D", 40), stat("E", 60)];
        assert_eq!(weak_subjects(&stats, WeakAreaPolicy::default()), vec!["A", "B", "C"]);
        assert!(weak_subjects(&[stat("E", 60)], WeakAreaPolicy::default()).is_empty());
    }

    #[test]
    fn difficulty_bands_at_boundaries() {
        assert_eq!(recommend_difficulty(&[stat("x", 80)]), Difficulty::Hard);
        assert_eq!(recommend_difficulty(&[stat("x", 79)]), Difficulty::Medium);
        assert_eq!(recommend_difficulty(&[stat("x", 55)]), Difficulty::Medium);
        assert_eq!(recommend_difficulty(&[stat("x", 54)]), Difficulty::Easy);
        assert_eq!(recommend_difficulty(&[]), Difficulty::Medium);
        // mean 79.5 rounds to 80
        assert_eq!(recommend_difficulty(&[stat("x", 79), stat("y", 80)]), Difficulty::Hard);
    }

    #[test]
    fn topic_is_text_before_first_colon() {
        assert_eq!(topic_of(Some("Fractions: part 2: review")), "Fractions");
        assert_eq!(topic_of(Some("  Weekly check ")), "Weekly check");
        assert_eq!(topic_of(Some(": untitled")), GENERAL_TOPIC);
        assert_eq!(topic_of(None), GENERAL_TOPIC);
    }

    #[test]
    fn report_builds_recommendations() {
        let records = vec![
            attempt("Math", "Fractions: intro", 30, 3, 10),
            attempt("English", "Grammar", 95, 19, 20),
        ];

        let report = build_report(&records, WeakAreaPolicy::default());

        assert_eq!(report.weak_subjects, vec!["Math"]);
        assert_eq!(report.weakest_topics, vec!["Fractions"]);
        assert_eq!(report.recommended_difficulty, Difficulty::Medium);
        assert_eq!(
            report.recommendations,
            vec![
                "Focus on Math.".to_string(),
                "Review topics: Fractions.".to_string(),
                "Next quiz difficulty: medium.".to_string(),
            ]
        );
    }

    #[test]
    fn empty_history_only_recommends_difficulty() {
        let report = build_report(&[], WeakAreaPolicy::default());
        assert!(report.subject_stats.is_empty());
        assert_eq!(report.recommendations, vec!["Next quiz difficulty: medium.".to_string()]);
    }

    #[test]
    fn score_summary_sorts_oldest_first() {
        let point = |id: &str, score: i32, at: PrimitiveDateTime| ScorePoint {
            quiz_id: id.to_string(),
            quiz_title: id.to_string(),
            subject: "Math".to_string(),
            score,
            completed_at: String::new(),
            completed_at_raw: at,
        };
        let summary = score_summary(vec![
            point("late", 70, datetime!(2025-03-02 10:00)),
            point("early", 65, datetime!(2025-03-01 10:00)),
            point("mid", 66, datetime!(2025-03-01 12:00)),
        ]);

        assert_eq!(summary.total_quizzes, 3);
        assert_eq!(summary.average_score, 67.0);
        assert_eq!(summary.highest_score, 70);
        assert_eq!(summary.lowest_score, 65);
        let order: Vec<_> = summary.results.iter().map(|p| p.quiz_id.as_str()).collect();
        assert_eq!(order, vec!["early", "mid", "late"]);
    }

    #[test]
    fn score_summary_keeps_two_decimals() {
        let at = datetime!(2025-03-01 10:00);
        let points = [90, 85, 81]
            .into_iter()
            .map(|score| ScorePoint {
                quiz_id: score.to_string(),
                quiz_title: String::new(),
                subject: String::new(),
                score,
                completed_at: String::new(),
                completed_at_raw: at,
            })
            .collect();
        assert_eq!(score_summary(points).average_score, 85.33);
    }
}
