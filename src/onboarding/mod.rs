//! Guided twin interview: a fixed script of questions whose free-text
//! answers fill the digital twin form.
//!
//! Each answer is run through the field extractor for the current step, the
//! resulting partial update is merged into the persisted [`TwinState`], and
//! the sequencer moves on. Completion of the five required fields gates
//! confirmation.

pub mod chat;
pub mod completion;
pub mod extraction;
pub mod manager;
pub mod model;
pub mod routes;
pub mod steps;

pub use chat::{ChatMessage, Role};
pub use completion::{
    CompletionSummary, RequiredField, completed_count, is_ready_to_confirm, required_field_count,
};
pub use extraction::extract;
pub use manager::{ConsentChoice, Confirmation, InterviewSession, SessionSnapshot, TurnOutcome};
pub use model::{Channel, Tone, TwinState, TwinUpdate};
pub use routes::{OnboardingRouteState, onboarding_routes};
pub use steps::{Step, StepField, StepSequencer, TWIN_STEPS};
