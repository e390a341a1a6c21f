//! Per-turn processing: the typed turn context and the ordered stage
//! pipeline that wraps every dialog dispatch.

mod context;
mod pipeline;

pub use context::{TopIntent, TurnContext};
pub use pipeline::{NluPrefillStage, TranscriptStage, TurnPipeline, TurnStage, NLU_NOT_CONFIGURED_NOTICE};
