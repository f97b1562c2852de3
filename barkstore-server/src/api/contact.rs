//! Contact and newsletter handlers.
//!
//! Submissions are relayed to the CRM fire-and-forget: the handler
//! responds immediately and the relay task logs its own outcome.

use axum::{Json, extract::State, http::StatusCode};
use barkstore_core::crm::FormField;
use barkstore_sdk::objects::{ContactForm, NewsletterSignup};
use std::sync::Arc;

use crate::state::{AppState, CrmForms};

/// `POST /contact` — relay a contact form to the CRM.
pub(super) async fn submit_contact(
    state: State<AppState>,
    Json(form): Json<ContactForm>,
) -> StatusCode {
    let fields = vec![
        FormField::new("name", form.name),
        FormField::new("email", form.email),
        FormField::new("message", form.message),
    ];
    relay(state.crm.clone(), state.crm.contact_form_id.clone(), fields);
    StatusCode::ACCEPTED
}

/// `POST /newsletter` — relay a newsletter signup to the CRM.
pub(super) async fn subscribe_newsletter(
    state: State<AppState>,
    Json(signup): Json<NewsletterSignup>,
) -> StatusCode {
    let fields = vec![FormField::new("email", signup.email)];
    relay(
        state.crm.clone(),
        state.crm.newsletter_form_id.clone(),
        fields,
    );
    StatusCode::ACCEPTED
}

/// Spawn the relay; a failure is logged, never surfaced to the shopper.
fn relay(crm: Arc<CrmForms>, form_id: String, fields: Vec<FormField>) {
    tokio::spawn(async move {
        if let Err(e) = crm.client.submit(&form_id, fields).await {
            tracing::error!(error = %e, form_id = %form_id, "CRM form relay failed");
        }
    });
}
