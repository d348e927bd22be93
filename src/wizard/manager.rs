//! OnboardingWizard — owns the per-step form state and drives transitions.

use std::sync::Arc;

use tracing::{info, warn};

use super::step::{WizardState, WizardStep};
use super::test_chat::TestChat;
use super::upload::{self, UploadFile, UploadReport, UploadTarget};
use crate::api::Backend;
use crate::connectors::TelegramBot;
use crate::error::{Result, ValidationError};
use crate::models::{AgentSettings, BusinessInfo, ConfigUpdate, Document};
use crate::notify::{Notification, Notifier};

/// Result of a successful `advance`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// Moved to this step.
    Moved(WizardStep),
    /// Already on the last step; onboarding is finished.
    Finished,
}

/// Linear onboarding flow: Business → Knowledge → Settings → TestChat → Connect.
///
/// Form fields are public so a front end can bind to them directly; the
/// step counter is private and only moves through `advance`, `retreat`
/// and `jump_to_step`.
pub struct OnboardingWizard {
    backend: Arc<dyn Backend>,
    notifier: Arc<dyn Notifier>,
    state: WizardState,
    pub business: BusinessInfo,
    pub settings: AgentSettings,
    documents: Vec<Document>,
    chat: TestChat,
    telegram: TelegramBot,
}

impl OnboardingWizard {
    /// Fresh wizard at step 1 with empty forms.
    pub fn new(backend: Arc<dyn Backend>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            backend,
            notifier,
            state: WizardState::default(),
            business: BusinessInfo::default(),
            settings: AgentSettings::default(),
            documents: Vec::new(),
            chat: TestChat::default(),
            telegram: TelegramBot::new(),
        }
    }

    /// Fill the forms from the tenant's saved config. The step is unchanged.
    pub async fn resume(&mut self) -> Result<()> {
        let config = match self.backend.get_config().await {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "Failed to load saved config");
                self.notifier.notify(Notification::error(e.user_message()));
                return Err(e.into());
            }
        };
        self.business = config.business;
        self.settings = config.settings;
        self.documents = config.documents;
        self.chat.set_greeting(self.settings.greeting_message.as_deref());

        // Channel state is informational here; a failure must not block resuming.
        match self.backend.integrations_status().await {
            Ok(status) => self.telegram = TelegramBot::from_status(&status.telegram),
            Err(e) => warn!(error = %e, "Could not load integrations status"),
        }

        info!(
            business = %self.business.name,
            documents = self.documents.len(),
            "Wizard resumed from saved config"
        );
        Ok(())
    }

    pub fn current_step(&self) -> WizardStep {
        self.state.current_step()
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn is_complete(&self) -> bool {
        self.state.current_step().is_last()
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn chat(&self) -> &TestChat {
        &self.chat
    }

    pub fn telegram(&self) -> &TelegramBot {
        &self.telegram
    }

    /// Synchronous check for a step's required fields.
    pub fn validate_step(&self, step: WizardStep) -> std::result::Result<(), ValidationError> {
        match step {
            WizardStep::Business => self.business.validate(),
            WizardStep::Settings => self.settings.validate(),
            WizardStep::Knowledge | WizardStep::TestChat | WizardStep::Connect => Ok(()),
        }
    }

    /// Payload written when leaving `step` forward, if the step persists.
    fn save_payload(&self, step: WizardStep) -> Option<ConfigUpdate> {
        match step {
            WizardStep::Business => Some(ConfigUpdate::Business(self.business.normalized())),
            WizardStep::Settings => Some(ConfigUpdate::Settings(self.settings.clone())),
            _ => None,
        }
    }

    /// Validate the current step, save it if it persists, then move forward.
    ///
    /// A validation failure issues no request. A failed save leaves the step
    /// unchanged; the caller retries by calling `advance` again.
    pub async fn advance(&mut self) -> Result<AdvanceOutcome> {
        let step = self.state.current_step();

        if let Err(e) = self.validate_step(step) {
            self.state.record_validity(step, false);
            self.notifier.notify(Notification::warning(e.to_string()));
            return Err(e.into());
        }
        self.state.record_validity(step, true);

        if let Some(update) = self.save_payload(step) {
            if let Err(e) = self.backend.update_config(&update).await {
                warn!(%step, section = update.section(), error = %e, "Saving wizard step failed");
                self.notifier.notify(Notification::error(e.user_message()));
                return Err(e.into());
            }
            info!(%step, section = update.section(), "Wizard step saved");

            if step == WizardStep::Settings {
                self.chat
                    .set_greeting(self.settings.greeting_message.as_deref());
            }
        }

        match self.state.step_forward() {
            Some(next) => {
                info!(from = %step, to = %next, "Wizard advanced");
                Ok(AdvanceOutcome::Moved(next))
            }
            None => {
                info!("Onboarding finished");
                Ok(AdvanceOutcome::Finished)
            }
        }
    }

    /// Go back one step. No validation, no request, no data loss.
    pub fn retreat(&mut self) -> WizardStep {
        self.state.step_back()
    }

    /// Resume directly at `step`, e.g. when returning from an OAuth redirect.
    ///
    /// Intermediate steps are not validated. Only call this when every step
    /// before `step` has already been saved server-side.
    pub fn jump_to_step(&mut self, step: WizardStep) {
        let skipped = self.state.unvalidated_before(step);
        if !skipped.is_empty() {
            warn!(
                target_step = %step,
                skipped = ?skipped,
                "Jumping past steps not validated in this session"
            );
        }
        self.state.set_step(step);
    }

    // ── Knowledge step ──────────────────────────────────────────────

    /// Upload a selection of files; accepted ones join the document list.
    pub async fn upload_documents(&mut self, files: Vec<UploadFile>) -> UploadReport {
        let report = upload::upload_all(
            self.backend.as_ref(),
            self.notifier.as_ref(),
            UploadTarget::Tenant,
            files,
        )
        .await;
        self.documents.extend(report.accepted.iter().cloned());
        report
    }

    pub async fn delete_document(&mut self, id: &str) -> Result<()> {
        if let Err(e) = self.backend.delete_document(id).await {
            warn!(document_id = id, error = %e, "Document delete failed");
            self.notifier.notify(Notification::error(e.user_message()));
            return Err(e.into());
        }
        self.documents.retain(|d| d.id != id);
        info!(document_id = id, "Document deleted");
        Ok(())
    }

    // ── Test chat step ──────────────────────────────────────────────

    /// Send one test message; the reply (or an error line) lands in the transcript.
    pub async fn send_test_message(&mut self, text: &str) -> Result<()> {
        self.chat.send(self.backend.as_ref(), text).await?;
        Ok(())
    }

    pub fn reset_test_chat(&mut self) {
        self.chat.reset();
    }

    // ── Connect step ────────────────────────────────────────────────

    pub async fn connect_telegram(&mut self, bot_token: &str) -> Result<()> {
        self.telegram
            .connect(self.backend.as_ref(), self.notifier.as_ref(), bot_token)
            .await
    }

    pub async fn disconnect_telegram(&mut self) -> Result<()> {
        self.telegram
            .disconnect(self.backend.as_ref(), self.notifier.as_ref())
            .await
    }
}
