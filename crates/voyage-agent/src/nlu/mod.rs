//! NLU collaborator: the recognizer seam, its HTTP client, and the
//! entity-to-slot extraction that feeds the per-turn scratch map.

mod extract;
mod recognizer;

pub use extract::{extract, Extraction, Intent};
pub use recognizer::{EntityMatch, NluClient, RecognizeTurn, RecognizerResult, SlotRecognizer};
