//! Feature windows and output synthesis for short-horizon prediction
//!
//! Everything here is a pure function of canonical observations. Model
//! evaluation itself sits behind the application layer's model port.

mod features;
mod synthesis;

pub use features::{
    FeatureRow, FeatureSet, InsufficientHistory, MAX_GAP_MINUTES, MIN_HISTORY_HOURS,
    PRECIPITATION_FEATURES, PRECIPITATION_WINDOW, TEMPERATURE_WINDOW, build_features,
    contiguous_history,
};
pub use synthesis::{
    CONFIDENCE_FLOOR, CONFIDENCE_START, CONFIDENCE_STEP, SecondaryMetrics, confidence_schedule,
    synthesize_secondary,
};
