//! Domain Value Objects
//!
//! The closed status vocabulary of the review pipeline, the center
//! kind, and the presentation-layer locale lookup. Statuses are stored
//! as stable integers; display strings are a per-locale projection and
//! never act as the domain value.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which kind of center an application accredits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i16)]
pub enum CenterKind {
    Training = 0,
    Testing = 1,
}

impl CenterKind {
    #[inline]
    pub const fn id(&self) -> i16 {
        *self as i16
    }

    #[inline]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Training => "training",
            Self::Testing => "testing",
        }
    }

    #[inline]
    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            0 => Some(Self::Training),
            1 => Some(Self::Testing),
            _ => None,
        }
    }
}

impl fmt::Display for CenterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Display locale for status and progress-step labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    /// Arabic, the portal's primary display language
    #[default]
    Ar,
    En,
}

/// Application review status
///
/// The pipeline is strictly forward:
/// `Submitted -> UnderReview -> FieldVisit -> UnderEvaluation -> Accepted`,
/// with `Rejected` reachable from the three intermediate states.
/// `Accepted` and `Rejected` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i16)]
pub enum ApplicationStatus {
    Submitted = 0,
    UnderReview = 1,
    FieldVisit = 2,
    UnderEvaluation = 3,
    Accepted = 4,
    Rejected = 5,
}

impl ApplicationStatus {
    /// Every status, in pipeline order
    pub const ALL: [ApplicationStatus; 6] = [
        Self::Submitted,
        Self::UnderReview,
        Self::FieldVisit,
        Self::UnderEvaluation,
        Self::Accepted,
        Self::Rejected,
    ];

    /// Numeric ID for database storage
    #[inline]
    pub const fn id(&self) -> i16 {
        *self as i16
    }

    /// Stable wire code
    #[inline]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::UnderReview => "under_review",
            Self::FieldVisit => "field_visit",
            Self::UnderEvaluation => "under_evaluation",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }

    /// Human-readable label per locale (presentation only)
    pub const fn label(&self, locale: Locale) -> &'static str {
        match locale {
            Locale::Ar => match self {
                Self::Submitted => "تم التقديم",
                Self::UnderReview => "قيد المراجعة",
                Self::FieldVisit => "الزيارة الميدانية",
                Self::UnderEvaluation => "قيد التقييم",
                Self::Accepted => "مقبول",
                Self::Rejected => "مرفوض",
            },
            Locale::En => match self {
                Self::Submitted => "Submitted",
                Self::UnderReview => "Under review",
                Self::FieldVisit => "Field visit",
                Self::UnderEvaluation => "Under evaluation",
                Self::Accepted => "Accepted",
                Self::Rejected => "Rejected",
            },
        }
    }

    /// Terminal statuses admit no further transition
    #[inline]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Accepted | Self::Rejected)
    }

    /// Legal next statuses from this one
    pub const fn successors(&self) -> &'static [ApplicationStatus] {
        match self {
            Self::Submitted => &[Self::UnderReview],
            Self::UnderReview => &[Self::FieldVisit, Self::Rejected],
            Self::FieldVisit => &[Self::UnderEvaluation, Self::Rejected],
            Self::UnderEvaluation => &[Self::Accepted, Self::Rejected],
            Self::Accepted | Self::Rejected => &[],
        }
    }

    /// Is `target` reachable from this status in one step?
    pub fn can_transition_to(&self, target: ApplicationStatus) -> bool {
        self.successors().contains(&target)
    }

    #[inline]
    pub fn from_id(id: i16) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.id() == id)
    }

    #[inline]
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.code() == code)
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// State of one step in the visual progress projection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepState {
    Completed,
    Current,
    Pending,
    Rejected,
}

/// One of the five fixed review steps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressStep {
    /// 1-based step number
    pub id: u8,
    pub kind: StepKind,
    pub state: StepState,
}

/// The five steps of the pipeline as shown to users
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    Submission,
    InitialReview,
    FieldVisit,
    Evaluation,
    Decision,
}

impl StepKind {
    pub const ALL: [StepKind; 5] = [
        Self::Submission,
        Self::InitialReview,
        Self::FieldVisit,
        Self::Evaluation,
        Self::Decision,
    ];

    pub const fn title(&self, locale: Locale) -> &'static str {
        match locale {
            Locale::Ar => match self {
                Self::Submission => "تقديم الطلب",
                Self::InitialReview => "المراجعة الأولية",
                Self::FieldVisit => "الزيارة الميدانية",
                Self::Evaluation => "التقييم",
                Self::Decision => "القرار",
            },
            Locale::En => match self {
                Self::Submission => "Submission",
                Self::InitialReview => "Initial review",
                Self::FieldVisit => "Field visit",
                Self::Evaluation => "Evaluation",
                Self::Decision => "Decision",
            },
        }
    }
}
