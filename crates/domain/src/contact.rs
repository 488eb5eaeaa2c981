use common::{ContactMessage, ContactMessageDraft};
use storage::Storage;

use crate::error::Result;
use crate::validation::{ValidationErrors, normalize_email};

/// Contact form submissions.
#[derive(Clone)]
pub struct ContactService<S> {
    store: S,
}

impl<S: Storage> ContactService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    #[tracing::instrument(skip(self, draft))]
    pub async fn submit(&self, draft: ContactMessageDraft) -> Result<ContactMessage> {
        let draft = ContactMessageDraft {
            name: draft.name.trim().to_string(),
            email: normalize_email(&draft.email),
            phone: non_blank(draft.phone),
            subject: non_blank(draft.subject),
            message: draft.message.trim().to_string(),
        };

        let mut errors = ValidationErrors::new();
        errors.require_text("name", &draft.name);
        errors.require_email("email", &draft.email);
        errors.require_text("message", &draft.message);
        errors.finish()?;

        let message = self.store.save_message(draft).await?;
        tracing::info!(message_id = %message.id, "contact message stored");
        Ok(message)
    }

    pub async fn list(&self) -> Result<Vec<ContactMessage>> {
        Ok(self.store.list_messages().await?)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
