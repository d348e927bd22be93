//! Leads dashboard — list, filter and move leads through the pipeline.

use std::sync::Arc;

use tracing::{info, warn};

use crate::api::Backend;
use crate::error::Result;
use crate::models::{Hotness, Lead, LeadStatus};
use crate::notify::{Notification, Notifier};

/// Client-side filter. Empty fields match everything.
#[derive(Debug, Clone, Default)]
pub struct LeadFilter {
    pub status: Option<LeadStatus>,
    pub hotness: Option<Hotness>,
    /// Case-insensitive match on name, phone or product.
    pub query: Option<String>,
}

impl LeadFilter {
    pub fn matches(&self, lead: &Lead) -> bool {
        if self.status.is_some_and(|s| s != lead.status) {
            return false;
        }
        if self.hotness.is_some() && self.hotness != lead.hotness {
            return false;
        }
        match self.query.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            None => true,
            Some(q) => {
                let q = q.to_lowercase();
                [&lead.name, &lead.phone, &lead.product]
                    .into_iter()
                    .flatten()
                    .any(|field| field.to_lowercase().contains(&q))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HotnessSummary {
    pub hot: usize,
    pub warm: usize,
    pub cold: usize,
    /// No tier yet, or one this client does not know.
    pub unrated: usize,
}

pub struct LeadBoard {
    backend: Arc<dyn Backend>,
    notifier: Arc<dyn Notifier>,
    leads: Vec<Lead>,
}

impl LeadBoard {
    pub fn new(backend: Arc<dyn Backend>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            backend,
            notifier,
            leads: Vec::new(),
        }
    }

    /// Replace the local list with the backend's.
    pub async fn load(&mut self) -> Result<()> {
        match self.backend.list_leads().await {
            Ok(leads) => {
                info!(count = leads.len(), "Leads loaded");
                self.leads = leads;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Loading leads failed");
                self.notifier.notify(Notification::error(e.user_message()));
                Err(e.into())
            }
        }
    }

    pub fn leads(&self) -> &[Lead] {
        &self.leads
    }

    pub fn filter(&self, filter: &LeadFilter) -> Vec<&Lead> {
        self.leads.iter().filter(|l| filter.matches(l)).collect()
    }

    pub fn summary(&self) -> HotnessSummary {
        let mut summary = HotnessSummary::default();
        for lead in &self.leads {
            match lead.hotness {
                Some(Hotness::Hot) => summary.hot += 1,
                Some(Hotness::Warm) => summary.warm += 1,
                Some(Hotness::Cold) => summary.cold += 1,
                Some(Hotness::Unknown) | None => summary.unrated += 1,
            }
        }
        summary
    }

    /// Change a lead's status. The local copy changes only after the backend accepts.
    pub async fn update_status(&mut self, id: &str, status: LeadStatus) -> Result<()> {
        if let Err(e) = self.backend.update_lead_status(id, status).await {
            warn!(lead_id = id, %status, error = %e, "Lead status update failed");
            self.notifier.notify(Notification::error(e.user_message()));
            return Err(e.into());
        }
        if let Some(lead) = self.leads.iter_mut().find(|l| l.id == id) {
            lead.status = status;
        }
        info!(lead_id = id, %status, "Lead status updated");
        self.notifier
            .notify(Notification::success(format!("Lead marked {status}")));
        Ok(())
    }
}
