//! Free-text task capture.
//!
//! # Responsibility
//! - Turn one line of user text into a reminder proposal
//!   (title, due time, category) pending user confirmation.
//!
//! # Invariants
//! - The title is the input text, unmodified.
//! - Classification never fails: without a detectable date the proposal is
//!   due `DEFAULT_DUE_OFFSET_MINUTES` after "now".
//! - Category keywords are plain lower-case substring tests, checked in the
//!   order homework, appointment, event; the first hit wins.

pub mod date_detector;

use crate::model::reminder::TaskType;
use chrono::{DateTime, Duration, Local};
use date_detector::{DateDetector, DateLocale, PatternDateDetector};
use log::{debug, warn};

pub use date_detector::DetectedDate;

/// Due offset used when the text carries no date.
pub const DEFAULT_DUE_OFFSET_MINUTES: i64 = 60;

const HOMEWORK_KEYWORDS: &[&str] = &["examen", "estudiar", "entrega", "informe"];
const APPOINTMENT_KEYWORDS: &[&str] = &["medico", "médico", "cita", "reunion", "reunión"];
const EVENT_KEYWORDS: &[&str] = &["fiesta", "cumpleaños", "boda", "disco", "concierto"];

/// Ordered keyword table; earlier rows take precedence.
const KEYWORD_TABLE: [(TaskType, &[&str]); 3] = [
    (TaskType::Homework, HOMEWORK_KEYWORDS),
    (TaskType::Appointment, APPOINTMENT_KEYWORDS),
    (TaskType::Event, EVENT_KEYWORDS),
];

/// Reminder proposal built from free text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proposal {
    pub title: String,
    pub due_at: DateTime<Local>,
    pub task_type: TaskType,
    /// `false` when `due_at` is the default offset.
    pub date_detected: bool,
}

/// Stateless classifier; holds only the compiled date detector.
pub struct TextClassifier {
    detector: Option<Box<dyn DateDetector + Send + Sync>>,
}

impl TextClassifier {
    /// Builds a classifier with the regex detector for `locale`.
    ///
    /// A detector that fails to build is logged and replaced by the
    /// default-offset fallback.
    pub fn new(locale: DateLocale) -> Self {
        match PatternDateDetector::new(locale) {
            Ok(detector) => Self::with_detector(detector),
            Err(err) => {
                warn!(
                    "event=date_detector_init module=classifier status=error error={}",
                    err
                );
                Self::without_detector()
            }
        }
    }

    pub fn with_detector(detector: impl DateDetector + Send + Sync + 'static) -> Self {
        Self {
            detector: Some(Box::new(detector)),
        }
    }

    pub fn without_detector() -> Self {
        Self { detector: None }
    }

    pub fn has_detector(&self) -> bool {
        self.detector.is_some()
    }

    /// Classifies `text` relative to the current local time.
    pub fn analyze(&self, text: &str) -> Proposal {
        self.analyze_at(text, Local::now())
    }

    /// Classifies `text` relative to `now`.
    pub fn analyze_at(&self, text: &str, now: DateTime<Local>) -> Proposal {
        let detected = self
            .detector
            .as_ref()
            .and_then(|detector| detector.detect(text, now));
        let task_type = infer_task_type(text);

        debug!(
            "event=classify module=classifier status=ok date_detected={} task_type={} text_len={}",
            detected.is_some(),
            task_type,
            text.chars().count()
        );

        Proposal {
            title: text.to_string(),
            date_detected: detected.is_some(),
            due_at: detected.map_or(now + default_due_offset(), |found| found.at),
            task_type,
        }
    }
}

impl Default for TextClassifier {
    fn default() -> Self {
        Self::new(DateLocale::default())
    }
}

pub fn default_due_offset() -> Duration {
    Duration::minutes(DEFAULT_DUE_OFFSET_MINUTES)
}

/// Infers the category from keyword membership.
pub fn infer_task_type(text: &str) -> TaskType {
    let lowered = text.to_lowercase();
    KEYWORD_TABLE
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|keyword| lowered.contains(keyword)))
        .map_or(TaskType::Reminder, |(task_type, _)| *task_type)
}

#[cfg(test)]
mod tests {
    use super::{default_due_offset, infer_task_type, TextClassifier};
    use crate::classifier::date_detector::{DateDetector, DetectedDate};
    use crate::model::reminder::TaskType;
    use chrono::{DateTime, Duration, Local};

    struct FixedDetector(DateTime<Local>);

    impl DateDetector for FixedDetector {
        fn detect(&self, _text: &str, _now: DateTime<Local>) -> Option<DetectedDate> {
            Some(DetectedDate {
                at: self.0,
                span: 0..1,
            })
        }
    }

    #[test]
    fn homework_wins_over_later_categories() {
        assert_eq!(
            infer_task_type("Examen después de la fiesta y la cita"),
            TaskType::Homework
        );
        assert_eq!(infer_task_type("cita antes de la boda"), TaskType::Appointment);
        assert_eq!(infer_task_type("CONCIERTO"), TaskType::Event);
        assert_eq!(infer_task_type("comprar pan"), TaskType::Reminder);
    }

    #[test]
    fn keywords_match_inside_other_words() {
        // "disco" inside "discoteca", "cita" inside "felicitar".
        assert_eq!(infer_task_type("ir a la discoteca"), TaskType::Event);
        assert_eq!(infer_task_type("felicitar a Ana"), TaskType::Appointment);
    }

    #[test]
    fn missing_detector_falls_back_to_default_offset() {
        let now = Local::now();
        let proposal = TextClassifier::without_detector().analyze_at("examen mañana", now);
        assert_eq!(proposal.due_at, now + default_due_offset());
        assert!(!proposal.date_detected);
        assert_eq!(proposal.title, "examen mañana");
        assert_eq!(proposal.task_type, TaskType::Homework);
    }

    #[test]
    fn injected_detector_result_is_used() {
        let now = Local::now();
        let due = now + Duration::days(4);
        let proposal = TextClassifier::with_detector(FixedDetector(due)).analyze_at("x", now);
        assert_eq!(proposal.due_at, due);
        assert!(proposal.date_detected);
    }
}
