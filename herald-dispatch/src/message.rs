//! Conversion from the domain's email model to transport messages.

use herald_contact::{EmailMessage, Mailbox};
use lettre::{
    Message,
    message::{Mailbox as TransportMailbox, MultiPart, SinglePart, header::ContentType},
};

use crate::DispatchError;

/// Expresses a domain mailbox as a transport mailbox.
pub(crate) fn transport_mailbox(mailbox: &Mailbox) -> Result<TransportMailbox, DispatchError> {
    let address = mailbox.address.parse::<lettre::Address>()?;
    Ok(TransportMailbox::new(mailbox.name.clone(), address))
}

/// Assembles the MIME message: multipart/alternative with the plain-text
/// rendering first so clients that prefer HTML pick the second part.
pub(crate) fn assemble(email: &EmailMessage) -> Result<Message, DispatchError> {
    let mut builder = Message::builder()
        .from(transport_mailbox(&email.from)?)
        .to(transport_mailbox(&email.to)?)
        .subject(email.subject.clone());

    if let Some(reply_to) = &email.reply_to {
        builder = builder.reply_to(transport_mailbox(reply_to)?);
    }

    let message = builder.multipart(
        MultiPart::alternative()
            .singlepart(
                SinglePart::builder()
                    .header(ContentType::TEXT_PLAIN)
                    .body(email.text_body.clone()),
            )
            .singlepart(
                SinglePart::builder()
                    .header(ContentType::TEXT_HTML)
                    .body(email.html_body.clone()),
            ),
    )?;

    Ok(message)
}
