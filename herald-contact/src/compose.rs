//! Rendering of the two outbound emails.
//!
//! Composition trusts its input: fields arrive sanitized and validated, and
//! no rule is re-checked here. This is also the only place where text meets
//! HTML, so entity escaping happens here, right before interpolation, and
//! newlines in the message become `<br>` AFTER escaping so the break tags
//! survive.

use html_escape::encode_text;

use crate::{Mailbox, SanitizedFields};

/// Sender-side identity for composed mail, fixed at process start.
#[derive(Clone, Debug)]
pub struct SenderProfile {
    /// The mailbox the service sends as. Relays reject forged senders, so
    /// both emails go out under this address; the visitor's identity travels
    /// in display names and reply-to headers instead.
    pub from: Mailbox,
    /// The agency inbox that receives notifications.
    pub agency: Mailbox,
    /// Reply-to set on the visitor confirmation, when configured.
    pub confirmation_reply_to: Option<Mailbox>,
}

/// An assembled outbound email. Constructed fresh per send and never
/// mutated afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmailMessage {
    pub from: Mailbox,
    pub to: Mailbox,
    pub reply_to: Option<Mailbox>,
    pub subject: String,
    pub text_body: String,
    pub html_body: String,
}

const PHONE_FALLBACK: &str = "Not provided";

/// The email summarizing the inquiry for the agency inbox. Sent from the
/// service's own address with the visitor's name as display name, reply-to
/// the visitor, so "Reply" in the agency's client does the right thing.
#[must_use]
pub fn agency_notification(fields: &SanitizedFields, profile: &SenderProfile) -> EmailMessage {
    let name = &fields.name;
    let email = &fields.email;
    let phone = fields.phone.as_deref().unwrap_or(PHONE_FALLBACK);
    let message = &fields.message;

    let text_body = format!(
        "Name: {name}\nEmail: {email}\nPhone: {phone}\n\nMessage:\n{message}\n"
    );

    let html_body = format!(
        "<h3>New Contact Request</h3>\n\
         <p><strong>Name:</strong> {}</p>\n\
         <p><strong>Email:</strong> {}</p>\n\
         <p><strong>Phone:</strong> {}</p>\n\
         <br/>\n\
         <p><strong>Message:</strong></p>\n\
         <p>{}</p>\n",
        encode_text(name),
        encode_text(email),
        encode_text(phone),
        html_block(message),
    );

    EmailMessage {
        from: profile.from.named(name),
        to: profile.agency.clone(),
        reply_to: Some(fields.mailbox()),
        subject: format!("New Contact Request from {name}"),
        text_body,
        html_body,
    }
}

/// The receipt acknowledgement sent back to the visitor, with a quoted copy
/// of their message.
#[must_use]
pub fn visitor_confirmation(fields: &SanitizedFields, profile: &SenderProfile) -> EmailMessage {
    let name = &fields.name;
    let sender = profile.from.name.as_deref();
    let heading = sender.map_or_else(
        || "Thank you for contacting us".to_owned(),
        |sender| format!("Thank you for contacting {sender}"),
    );
    let sign_off = sender.map_or_else(String::new, |sender| format!("\n{sender}"));

    let quoted = fields
        .message
        .lines()
        .map(|line| format!("> {line}"))
        .collect::<Vec<_>>()
        .join("\n");

    let text_body = format!(
        "Hi {name},\n\n\
         We have received your message and our team will be in touch with you very soon.\n\n\
         Here is a copy of your message:\n\n\
         {quoted}\n\n\
         If you have any urgent inquiries, feel free to reply directly to this email.\n\n\
         Best regards,{sign_off}\n"
    );

    let html_sign_off = sender.map_or_else(String::new, |sender| {
        format!("\n    <p><strong>{}</strong></p>", encode_text(sender))
    });
    let html_body = format!(
        "<div style=\"font-family: Arial, sans-serif; max-width: 600px;\">\n\
         \x20   <h2>{heading}</h2>\n\
         \x20   <p>Hi {name},</p>\n\
         \x20   <p>We have received your message and our team will be in touch with you very soon.</p>\n\
         \x20   <p>Here is a copy of your message:</p>\n\
         \x20   <blockquote style=\"border-left: 4px solid #ccc; padding-left: 12px; font-style: italic;\">{message}</blockquote>\n\
         \x20   <p>If you have any urgent inquiries, feel free to reply directly to this email.</p>\n\
         \x20   <p>Best regards,</p>{html_sign_off}\n\
         </div>\n",
        heading = encode_text(&heading),
        name = encode_text(name),
        message = html_block(&fields.message),
    );

    EmailMessage {
        from: profile.from.clone(),
        to: fields.mailbox(),
        reply_to: profile.confirmation_reply_to.clone(),
        subject: "We received your message!".to_owned(),
        text_body,
        html_body,
    }
}

/// Escapes text for HTML interpolation, then converts newlines to `<br>`.
fn html_block(text: &str) -> String {
    encode_text(text).replace('\n', "<br>")
}
