//! Onboarding wizard — the guided setup a new tenant walks through.
//!
//! Five pages in a fixed order. Each page holds its own form state; moving
//! forward runs the page's validator and, for the Business and Settings
//! pages, saves to the backend before the step counter changes.

pub mod manager;
pub mod step;
pub mod test_chat;
pub mod upload;

pub use manager::{AdvanceOutcome, OnboardingWizard};
pub use step::{WizardState, WizardStep};
pub use test_chat::{TestChat, TranscriptEntry, TurnState};
pub use upload::{SkipReason, UploadFile, UploadReport, UploadTarget};
