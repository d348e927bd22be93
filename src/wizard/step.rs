//! Wizard step counter — which page of onboarding the user is on.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The onboarding pages, in order.
///
/// Progresses linearly: Business → Knowledge → Settings → TestChat → Connect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    Business,
    Knowledge,
    Settings,
    TestChat,
    Connect,
}

impl WizardStep {
    pub const ALL: [WizardStep; 5] = [
        Self::Business,
        Self::Knowledge,
        Self::Settings,
        Self::TestChat,
        Self::Connect,
    ];

    pub const COUNT: usize = Self::ALL.len();

    /// 1-based position shown to the user.
    pub fn number(&self) -> usize {
        match self {
            Self::Business => 1,
            Self::Knowledge => 2,
            Self::Settings => 3,
            Self::TestChat => 4,
            Self::Connect => 5,
        }
    }

    pub fn from_number(n: usize) -> Option<Self> {
        Self::ALL.get(n.checked_sub(1)?).copied()
    }

    pub fn next(&self) -> Option<Self> {
        Self::from_number(self.number() + 1)
    }

    pub fn prev(&self) -> Option<Self> {
        Self::from_number(self.number() - 1)
    }

    pub fn is_last(&self) -> bool {
        self.next().is_none()
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Business => "Business info",
            Self::Knowledge => "Knowledge base",
            Self::Settings => "Agent settings",
            Self::TestChat => "Test chat",
            Self::Connect => "Connect channels",
        }
    }
}

impl Default for WizardStep {
    fn default() -> Self {
        Self::Business
    }
}

impl std::fmt::Display for WizardStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Business => "business",
            Self::Knowledge => "knowledge",
            Self::Settings => "settings",
            Self::TestChat => "test_chat",
            Self::Connect => "connect",
        };
        write!(f, "{s}")
    }
}

/// Step counter plus the last known validity of each step.
///
/// Only the wizard's transition operations touch this; the counter moves
/// forward only after the caller has finished any save for the step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WizardState {
    current_step: WizardStep,
    step_validity: BTreeMap<WizardStep, bool>,
}

impl WizardState {
    pub fn current_step(&self) -> WizardStep {
        self.current_step
    }

    pub fn step_validity(&self) -> &BTreeMap<WizardStep, bool> {
        &self.step_validity
    }

    /// `None` when the step has not been checked yet.
    pub fn is_valid(&self, step: WizardStep) -> Option<bool> {
        self.step_validity.get(&step).copied()
    }

    pub fn record_validity(&mut self, step: WizardStep, valid: bool) {
        self.step_validity.insert(step, valid);
    }

    /// Move forward one step. Stays put (and returns `None`) on the last step.
    pub fn step_forward(&mut self) -> Option<WizardStep> {
        let next = self.current_step.next()?;
        self.current_step = next;
        Some(next)
    }

    /// Move back one step. Stays put on the first step.
    pub fn step_back(&mut self) -> WizardStep {
        if let Some(prev) = self.current_step.prev() {
            self.current_step = prev;
        }
        self.current_step
    }

    /// Set the step directly, with no checks.
    pub fn set_step(&mut self, step: WizardStep) {
        self.current_step = step;
    }

    /// Steps before `step` that were never validated in this instance.
    pub fn unvalidated_before(&self, step: WizardStep) -> Vec<WizardStep> {
        WizardStep::ALL
            .iter()
            .copied()
            .take_while(|s| *s < step)
            .filter(|s| self.is_valid(*s) != Some(true))
            .collect()
    }
}
