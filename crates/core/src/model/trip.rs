use crate::model::{AnswerSet, QuestionKey};

//
// ─── NORMALIZATION ─────────────────────────────────────────────────────────────
//

/// Locale-tolerant matching helpers for free-text answers.
///
/// Answers may arrive in English or French. Literal options are matched after
/// trimming and lowercasing; yes/no answers are matched by substring.
pub mod normalize {
    /// Lowercases and trims an answer token.
    #[must_use]
    pub fn token(raw: &str) -> String {
        raw.trim().to_lowercase()
    }

    /// Returns true when the normalized token equals one of `options`.
    #[must_use]
    pub fn matches_any(raw: &str, options: &[&str]) -> bool {
        let token = token(raw);
        options.iter().any(|option| token == *option)
    }

    /// Interprets a yes/no style answer.
    ///
    /// Substring containment of `yes`/`oui` wins over `no`/`non`. Anything else
    /// is undecided. This is a heuristic: an unrelated sentence containing
    /// "oui" or "yes" is read as an affirmation.
    #[must_use]
    pub fn affirmation(raw: &str) -> Option<bool> {
        let token = token(raw);
        if token.contains("yes") || token.contains("oui") {
            Some(true)
        } else if token.contains("no") || token.contains("non") {
            Some(false)
        } else {
            None
        }
    }
}

//
// ─── TYPED ANSWERS ─────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TravelGroup {
    Solo,
    Couple,
    Family,
    Friends,
}

impl TravelGroup {
    fn parse(raw: &str) -> Option<Self> {
        if normalize::matches_any(raw, &["solo", "seul", "seule"]) {
            Some(Self::Solo)
        } else if normalize::matches_any(raw, &["couple", "en couple"]) {
            Some(Self::Couple)
        } else if normalize::matches_any(raw, &["family", "famille"]) {
            Some(Self::Family)
        } else if normalize::matches_any(raw, &["friends", "amis", "group", "groupe"]) {
            Some(Self::Friends)
        } else {
            None
        }
    }
}

/// A service the user asked the planner for help with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Service {
    Flights,
    Accommodation,
    Activities,
    Other,
}

impl Service {
    fn parse(raw: &str) -> Self {
        if normalize::matches_any(raw, &["flights", "flight", "vols", "vol"]) {
            Self::Flights
        } else if normalize::matches_any(
            raw,
            &["accommodation", "accommodations", "hebergement", "hébergement"],
        ) {
            Self::Accommodation
        } else if normalize::matches_any(raw, &["activities", "activites", "activités"]) {
            Self::Activities
        } else {
            Self::Other
        }
    }
}

/// Deduplicated set of services selected under `helpWith`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HelpWith {
    services: Vec<Service>,
}

impl HelpWith {
    fn from_tokens(tokens: &[String]) -> Self {
        let mut services: Vec<Service> = tokens.iter().map(|t| Service::parse(t)).collect();
        services.sort_unstable();
        services.dedup();
        Self { services }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    #[must_use]
    pub fn contains(&self, service: Service) -> bool {
        self.services.contains(&service)
    }

    /// True when `service` is the one and only selected service.
    #[must_use]
    pub fn is_only(&self, service: Service) -> bool {
        self.services == [service]
    }

    #[must_use]
    pub fn only_flights(&self) -> bool {
        self.is_only(Service::Flights)
    }

    #[must_use]
    pub fn only_accommodation(&self) -> bool {
        self.is_only(Service::Accommodation)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestinationStatus {
    Known,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatesKind {
    Fixed,
    Flexible,
}

impl DatesKind {
    fn parse(raw: &str) -> Option<Self> {
        if normalize::matches_any(raw, &["fixed", "fixes", "fixed dates", "dates fixes", "exact"]) {
            Some(Self::Fixed)
        } else if normalize::matches_any(raw, &["flexible", "flexibles", "dates flexibles"]) {
            Some(Self::Flexible)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetKind {
    Preset,
    Custom,
}

impl BudgetKind {
    fn parse(raw: &str) -> Self {
        if normalize::matches_any(raw, &["custom", "personnalise", "personnalisé"]) {
            Self::Custom
        } else {
            Self::Preset
        }
    }
}

/// Strongly typed view over the answers the planner branches on.
///
/// Built from an [`AnswerSet`] snapshot. Missing or wrong-typed answers become
/// `None` or an empty selection; construction never fails.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TripAnswers {
    pub travel_group: Option<TravelGroup>,
    pub help_with: HelpWith,
    pub destination: Option<DestinationStatus>,
    pub dates: Option<DatesKind>,
    pub budget: Option<BudgetKind>,
}

impl TripAnswers {
    #[must_use]
    pub fn from_answers(answers: &AnswerSet) -> Self {
        let text = |key: QuestionKey| answers.text(key.as_str());

        let destination = text(QuestionKey::HasDestination)
            .and_then(normalize::affirmation)
            .map(|known| {
                if known {
                    DestinationStatus::Known
                } else {
                    DestinationStatus::Unknown
                }
            });

        Self {
            travel_group: text(QuestionKey::TravelGroup).and_then(TravelGroup::parse),
            help_with: answers
                .list(QuestionKey::HelpWith.as_str())
                .map(HelpWith::from_tokens)
                .unwrap_or_default(),
            destination,
            dates: text(QuestionKey::DatesType).and_then(DatesKind::parse),
            budget: text(QuestionKey::Budget).map(BudgetKind::parse),
        }
    }

    #[must_use]
    pub fn is_family(&self) -> bool {
        self.travel_group == Some(TravelGroup::Family)
    }

    #[must_use]
    pub fn destination_known(&self) -> bool {
        self.destination == Some(DestinationStatus::Known)
    }

    #[must_use]
    pub fn destination_unknown(&self) -> bool {
        self.destination == Some(DestinationStatus::Unknown)
    }

    /// Whether a mobility question applies at all.
    #[must_use]
    pub fn wants_mobility(&self) -> bool {
        !self.help_with.is_empty()
            && !self.help_with.only_flights()
            && !self.help_with.only_accommodation()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AnswerValue;

    #[test]
    fn affirmation_accepts_both_locales() {
        assert_eq!(normalize::affirmation("Yes"), Some(true));
        assert_eq!(normalize::affirmation("  OUI  "), Some(true));
        assert_eq!(normalize::affirmation("oui, Lisbonne"), Some(true));
        assert_eq!(normalize::affirmation("No"), Some(false));
        assert_eq!(normalize::affirmation("non"), Some(false));
        assert_eq!(normalize::affirmation("peut-être"), None);
    }

    #[test]
    fn affirmation_substring_heuristic_is_loose() {
        // "Louis" contains "oui": read as yes.
        assert_eq!(normalize::affirmation("ask Louis"), Some(true));
    }

    #[test]
    fn help_with_dedups_and_detects_only() {
        let answers = AnswerSet::new().with("helpWith", AnswerValue::list(["flights", "Vols"]));
        let trip = TripAnswers::from_answers(&answers);
        assert!(trip.help_with.only_flights());
        assert!(!trip.wants_mobility());
    }

    #[test]
    fn unknown_service_breaks_only_flights() {
        let answers =
            AnswerSet::new().with("helpWith", AnswerValue::list(["flights", "car rental"]));
        let trip = TripAnswers::from_answers(&answers);
        assert!(trip.help_with.contains(Service::Flights));
        assert!(!trip.help_with.only_flights());
        assert!(trip.wants_mobility());
    }

    #[test]
    fn wrong_types_fall_back_to_defaults() {
        let answers = AnswerSet::new()
            .with("travelGroup", 3.0)
            .with("helpWith", "flights")
            .with("hasDestination", AnswerValue::list(["yes"]));
        let trip = TripAnswers::from_answers(&answers);
        assert_eq!(trip, TripAnswers::default());
    }

    #[test]
    fn french_literals_are_recognized() {
        let answers = AnswerSet::new()
            .with("travelGroup", "Famille")
            .with("datesType", "flexibles")
            .with("budget", "personnalisé");
        let trip = TripAnswers::from_answers(&answers);
        assert!(trip.is_family());
        assert_eq!(trip.dates, Some(DatesKind::Flexible));
        assert_eq!(trip.budget, Some(BudgetKind::Custom));
    }
}
