use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::model::MilestoneKey;

/// Every question the trip questionnaire can ask.
///
/// `as_str` returns the answer-set key the question's answer is stored under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QuestionKey {
    TravelGroup,
    Children,
    HelpWith,
    HasDestination,
    Destination,
    Climate,
    Affinities,
    Ambiance,
    DatesType,
    ExactDates,
    FlexibleMonth,
    TripDuration,
    Budget,
    BudgetAmount,
    DepartureCity,
    FlightPreferences,
    ActivityTypes,
    TravelStyle,
    Mobility,
    AccommodationType,
    AccommodationComfort,
}

impl QuestionKey {
    pub const ALL: [QuestionKey; 21] = [
        Self::TravelGroup,
        Self::Children,
        Self::HelpWith,
        Self::HasDestination,
        Self::Destination,
        Self::Climate,
        Self::Affinities,
        Self::Ambiance,
        Self::DatesType,
        Self::ExactDates,
        Self::FlexibleMonth,
        Self::TripDuration,
        Self::Budget,
        Self::BudgetAmount,
        Self::DepartureCity,
        Self::FlightPreferences,
        Self::ActivityTypes,
        Self::TravelStyle,
        Self::Mobility,
        Self::AccommodationType,
        Self::AccommodationComfort,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TravelGroup => "travelGroup",
            Self::Children => "children",
            Self::HelpWith => "helpWith",
            Self::HasDestination => "hasDestination",
            Self::Destination => "destination",
            Self::Climate => "climate",
            Self::Affinities => "affinities",
            Self::Ambiance => "ambiance",
            Self::DatesType => "datesType",
            Self::ExactDates => "exactDates",
            Self::FlexibleMonth => "flexibleMonth",
            Self::TripDuration => "tripDuration",
            Self::Budget => "budget",
            Self::BudgetAmount => "budgetAmount",
            Self::DepartureCity => "departureCity",
            Self::FlightPreferences => "flightPreferences",
            Self::ActivityTypes => "activityTypes",
            Self::TravelStyle => "travelStyle",
            Self::Mobility => "mobility",
            Self::AccommodationType => "accommodationType",
            Self::AccommodationComfort => "accommodationComfort",
        }
    }
}

impl fmt::Display for QuestionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error type for parsing a question key from its answer-set key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownQuestionKey(pub String);

impl fmt::Display for UnknownQuestionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown question key: {}", self.0)
    }
}

impl std::error::Error for UnknownQuestionKey {}

impl FromStr for QuestionKey {
    type Err = UnknownQuestionKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| UnknownQuestionKey(s.to_owned()))
    }
}

/// One question placed at a global step of the questionnaire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedQuestion {
    pub step: u32,
    pub key: QuestionKey,
    pub milestone: MilestoneKey,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_answer_key() {
        for key in QuestionKey::ALL {
            assert_eq!(key.as_str().parse::<QuestionKey>().unwrap(), key);
        }
    }

    #[test]
    fn rejects_unknown_key() {
        assert!("favouriteColour".parse::<QuestionKey>().is_err());
    }

    #[test]
    fn serde_name_matches_answer_key() {
        let json = serde_json::to_string(&QuestionKey::AccommodationComfort).unwrap();
        assert_eq!(json, "\"accommodationComfort\"");
    }
}
