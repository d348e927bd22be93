//! Shared knowledge base, managed by admins and visible to every tenant's agent.

use std::sync::Arc;

use tracing::{info, warn};

use crate::api::Backend;
use crate::error::{Result, ValidationError};
use crate::models::{Document, GlobalTextDocument};
use crate::notify::{Notification, Notifier};
use crate::wizard::upload::{self, UploadFile, UploadReport, UploadTarget};

pub struct GlobalKnowledge {
    backend: Arc<dyn Backend>,
    notifier: Arc<dyn Notifier>,
    documents: Vec<Document>,
}

impl GlobalKnowledge {
    pub fn new(backend: Arc<dyn Backend>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            backend,
            notifier,
            documents: Vec::new(),
        }
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub async fn load(&mut self) -> Result<()> {
        match self.backend.list_global_documents().await {
            Ok(docs) => {
                self.documents = docs;
                Ok(())
            }
            Err(e) => {
                self.notifier.notify(Notification::error(e.user_message()));
                Err(e.into())
            }
        }
    }

    /// Add a text entry (FAQ answer, policy, ...).
    pub async fn add_text(&mut self, title: &str, content: &str) -> Result<&Document> {
        if title.trim().is_empty() {
            return Err(ValidationError::MissingField { field: "title" }.into());
        }
        if content.trim().is_empty() {
            return Err(ValidationError::MissingField { field: "content" }.into());
        }
        let doc = GlobalTextDocument {
            title: title.trim().to_string(),
            content: content.trim().to_string(),
        };
        match self.backend.add_global_text(&doc).await {
            Ok(created) => {
                info!(document_id = %created.id, "Global text document added");
                self.documents.push(created);
                Ok(&self.documents[self.documents.len() - 1])
            }
            Err(e) => {
                warn!(error = %e, "Adding global text document failed");
                self.notifier.notify(Notification::error(e.user_message()));
                Err(e.into())
            }
        }
    }

    /// Same rules as tenant uploads: sequential, 10 MB ceiling, per-file outcome.
    pub async fn upload(&mut self, files: Vec<UploadFile>) -> UploadReport {
        let report = upload::upload_all(
            self.backend.as_ref(),
            self.notifier.as_ref(),
            UploadTarget::Global,
            files,
        )
        .await;
        self.documents.extend(report.accepted.iter().cloned());
        report
    }

    pub async fn delete(&mut self, id: &str) -> Result<()> {
        if let Err(e) = self.backend.delete_global_document(id).await {
            warn!(document_id = id, error = %e, "Deleting global document failed");
            self.notifier.notify(Notification::error(e.user_message()));
            return Err(e.into());
        }
        self.documents.retain(|d| d.id != id);
        Ok(())
    }
}
