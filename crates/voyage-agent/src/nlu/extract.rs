//! Entity extraction: map recognizer entity names onto the canonical slots
//! and reduce the intent map to its top entry.

use crate::dialog::booking::Slot;
use crate::turn::TopIntent;

use super::recognizer::RecognizerResult;

/// Intent taxonomy of the booking recognizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    BookFlight,
    Cancel,
    GetWeather,
    NoneIntent,
}

impl Intent {
    /// Classify a wire intent name.
    pub fn from_name(name: &str) -> Self {
        match name {
            "inform" => Self::BookFlight,
            "Cancel" => Self::Cancel,
            "GetWeather" => Self::GetWeather,
            _ => Self::NoneIntent,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::BookFlight => "inform",
            Self::Cancel => "Cancel",
            Self::GetWeather => "GetWeather",
            Self::NoneIntent => "None",
        }
    }
}

/// Recognizer wire entity names and the slots they feed.
const ENTITY_SLOTS: [(&str, Slot); 5] = [
    ("dst_city", Slot::Destination),
    ("or_city", Slot::Origin),
    ("str_date", Slot::TravelStartDate),
    ("end_date", Slot::TravelEndDate),
    ("budget", Slot::Budget),
];

/// What one recognition query contributed to the turn.
#[derive(Debug, Default)]
pub struct Extraction {
    /// At most one value per slot, first entity occurrence wins.
    pub prefill: Vec<(Slot, String)>,
    /// Highest-confidence intent, when any were returned.
    pub top_intent: Option<TopIntent>,
}

/// Reduce a recognizer result to slot prefills and the top intent. Date
/// entities get a secondary date-expression parse; the normalized value is
/// substituted when that parse names an exact day, raw text otherwise.
pub fn extract(result: &RecognizerResult) -> Extraction {
    let mut extraction = Extraction::default();

    for (entity, slot) in ENTITY_SLOTS {
        let Some(first) = result.entities.get(entity).and_then(|matches| matches.first()) else {
            continue;
        };
        let text = first.text.trim();
        if text.is_empty() {
            continue;
        }
        let value = match slot {
            Slot::TravelStartDate | Slot::TravelEndDate => {
                voyage_timex::definite_date(text).unwrap_or_else(|| text.to_string())
            }
            _ => text.to_string(),
        };
        extraction.prefill.push((slot, value));
    }

    extraction.top_intent = result
        .intents
        .iter()
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map(|(name, score)| TopIntent {
            name: name.clone(),
            score: *score,
        });

    extraction
}
