//! Review lifecycle status, legal transition graph, and gating rank.

use super::ParseTaskStatusError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Review lifecycle status of a task.
///
/// The declaration order follows the lifecycle and is relied upon by
/// [`TaskStatus::ALL`] and the derived ordering used for map keys.
///
/// Decoding trims surrounding whitespace and ignores case, so hand-edited
/// values such as `approved` are accepted. Encoding always writes the
/// canonical upper-case name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", try_from = "String")]
pub enum TaskStatus {
    /// Work is being drafted and has not been submitted.
    Draft,
    /// Work has been submitted and awaits a review decision.
    PendingReview,
    /// A reviewer rejected the submission and asked for changes.
    ChangesRequested,
    /// The submission cleared review.
    Approved,
    /// The work has been released. Terminal.
    Published,
}

impl TaskStatus {
    /// Every status in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::Draft,
        Self::PendingReview,
        Self::ChangesRequested,
        Self::Approved,
        Self::Published,
    ];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::PendingReview => "PENDING_REVIEW",
            Self::ChangesRequested => "CHANGES_REQUESTED",
            Self::Approved => "APPROVED",
            Self::Published => "PUBLISHED",
        }
    }

    /// Returns the statuses reachable from this one in a single transition.
    #[must_use]
    pub const fn allowed_transitions(self) -> &'static [Self] {
        match self {
            Self::Draft => &[Self::PendingReview],
            Self::PendingReview => &[Self::Approved, Self::ChangesRequested],
            Self::ChangesRequested => &[Self::PendingReview, Self::Draft],
            Self::Approved => &[Self::Published, Self::ChangesRequested],
            Self::Published => &[],
        }
    }

    /// Returns whether transition to `target` is allowed.
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Draft, Self::PendingReview)
                | (Self::PendingReview, Self::Approved | Self::ChangesRequested)
                | (Self::ChangesRequested, Self::PendingReview | Self::Draft)
                | (Self::Approved, Self::Published | Self::ChangesRequested)
        )
    }

    /// Returns whether moving to `target` is a critical transition that must
    /// carry a non-blank justification.
    ///
    /// Critical transitions are rejections and the irreversible release.
    #[must_use]
    pub const fn requires_justification(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::PendingReview | Self::Approved, Self::ChangesRequested)
                | (Self::Approved, Self::Published)
        )
    }

    /// Returns whether no further transitions are possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Published)
    }

    /// Returns the gating rank.
    ///
    /// The rank is a total preorder used only by gates and is independent of
    /// the transition graph: `PENDING_REVIEW` and `CHANGES_REQUESTED` share
    /// rank 2.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Draft => 1,
            Self::PendingReview | Self::ChangesRequested => 2,
            Self::Approved => 3,
            Self::Published => 4,
        }
    }

    /// Returns whether this status ranks at or above `minimum`.
    #[must_use]
    pub const fn satisfies(self, minimum: Self) -> bool {
        self.rank() >= minimum.rank()
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseTaskStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_uppercase();
        match normalized.as_str() {
            "DRAFT" => Ok(Self::Draft),
            "PENDING_REVIEW" => Ok(Self::PendingReview),
            "CHANGES_REQUESTED" => Ok(Self::ChangesRequested),
            "APPROVED" => Ok(Self::Approved),
            "PUBLISHED" => Ok(Self::Published),
            _ => Err(ParseTaskStatusError(value.to_owned())),
        }
    }
}

impl TryFrom<String> for TaskStatus {
    type Error = ParseTaskStatusError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_from(value.as_str())
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = ParseTaskStatusError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::try_from(value)
    }
}
