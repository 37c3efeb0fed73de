//! The submission pipeline: sanitize, validate, compose, dispatch.

use herald_contact::{ContactRequest, SenderProfile, ValidationResult, compose, validate};
use herald_dispatch::{DispatchChannel, DispatchError};

/// Outcome of one contact submission.
#[derive(Debug)]
pub enum Submission {
    /// Validation failed; nothing was dispatched.
    Rejected(ValidationResult),
    /// The agency notification could not be delivered. The visitor
    /// confirmation was never attempted.
    AgencyDispatchFailed(DispatchError),
    /// The agency notification went out. `confirmation_sent` records
    /// whether the visitor's copy followed it; a lost confirmation does
    /// not fail the submission.
    Accepted { confirmation_sent: bool },
}

/// Run one submission through the pipeline.
///
/// The agency notification always goes first: it is the email that matters,
/// and a visitor should never receive "we got your message" when the agency
/// did not.
pub async fn handle(
    request: &ContactRequest,
    profile: &SenderProfile,
    channel: &dyn DispatchChannel,
) -> Submission {
    let fields = request.sanitize();

    let validation = validate::validate(&fields);
    if !validation.is_valid() {
        tracing::debug!(errors = validation.errors().len(), "submission rejected");
        return Submission::Rejected(validation);
    }

    let notification = compose::agency_notification(&fields, profile);
    if let Err(error) = channel.dispatch(&notification).await {
        tracing::error!(%error, channel = channel.name(), "agency notification failed");
        return Submission::AgencyDispatchFailed(error);
    }

    let confirmation = compose::visitor_confirmation(&fields, profile);
    let confirmation_sent = match channel.dispatch(&confirmation).await {
        Ok(()) => true,
        Err(error) => {
            tracing::warn!(%error, to = %fields.email, "visitor confirmation failed");
            false
        }
    };

    tracing::info!(name = %fields.name, confirmation_sent, "contact request dispatched");
    Submission::Accepted { confirmation_sent }
}
