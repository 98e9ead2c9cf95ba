use serde::{Deserialize, Serialize};
use std::fmt;

/// Step number given to the end of the finalization phase.
///
/// The real number of steps is only known once the user reaches the end, so the
/// last phase is left open up to this value.
pub const FINALIZATION_END: u32 = 100;

/// Logical phases of the trip questionnaire, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneKey {
    Profile,
    Destination,
    Dates,
    Budget,
    Flights,
    Activities,
    Mobility,
    Accommodation,
    Finalization,
}

impl MilestoneKey {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Profile => "profile",
            Self::Destination => "destination",
            Self::Dates => "dates",
            Self::Budget => "budget",
            Self::Flights => "flights",
            Self::Activities => "activities",
            Self::Mobility => "mobility",
            Self::Accommodation => "accommodation",
            Self::Finalization => "finalization",
        }
    }

    /// Default English label for progress indicators.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Profile => "Your profile",
            Self::Destination => "Destination",
            Self::Dates => "Dates",
            Self::Budget => "Budget",
            Self::Flights => "Flights",
            Self::Activities => "Activities",
            Self::Mobility => "Getting around",
            Self::Accommodation => "Accommodation",
            Self::Finalization => "Finalization",
        }
    }
}

impl fmt::Display for MilestoneKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inclusive range of global step numbers covered by a milestone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRange {
    pub start: u32,
    pub end: u32,
}

impl StepRange {
    #[must_use]
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub fn contains(&self, step: u32) -> bool {
        (self.start..=self.end).contains(&step)
    }

    /// Number of steps in the range; zero if the range is inverted.
    #[must_use]
    pub fn len(&self) -> u32 {
        if self.end < self.start {
            0
        } else {
            self.end - self.start + 1
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A questionnaire phase and the steps it occupies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    pub key: MilestoneKey,
    pub label: String,
    pub step_range: StepRange,
}

impl Milestone {
    #[must_use]
    pub fn new(key: MilestoneKey, step_range: StepRange) -> Self {
        Self {
            key,
            label: key.label().to_owned(),
            step_range,
        }
    }

    #[must_use]
    pub fn start(&self) -> u32 {
        self.step_range.start
    }

    #[must_use]
    pub fn end(&self) -> u32 {
        self.step_range.end
    }
}
