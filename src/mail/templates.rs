use super::{ContactMessage, MailMessage, MailSettings};

const OTP_SUBJECT: &str = "Your verification code";
const SUBJECT_PREFIX: &str = "New contact form message";

/// Escape text for interpolation into an HTML body.
#[must_use]
pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Collapse all whitespace (including CR/LF) to single spaces so the value
/// is safe in a header line.
#[must_use]
pub fn single_line(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Mail carrying the one-time code to the address being verified.
#[must_use]
pub fn otp_message(
    settings: &MailSettings,
    to: &str,
    code: u32,
    validity_minutes: u64,
) -> MailMessage {
    let html = format!(
        "<p>Your verification code is <strong>{code}</strong>.</p>\
         <p>It is valid for {validity_minutes} minutes. If you did not request it, \
         you can ignore this email.</p>"
    );

    MailMessage {
        from: settings.from().to_string(),
        to: single_line(to),
        reply_to: None,
        subject: OTP_SUBJECT.to_string(),
        html,
    }
}

/// Notification relaying a verified contact submission to the operator.
#[must_use]
pub fn contact_notification(settings: &MailSettings, contact: &ContactMessage) -> MailMessage {
    let subject = single_line(&contact.subject);
    let subject = if subject.is_empty() {
        SUBJECT_PREFIX.to_string()
    } else {
        format!("{SUBJECT_PREFIX}: {subject}")
    };

    let message = escape_html(&contact.message).replace('\n', "<br>");
    let html = format!(
        "<h2>New contact form submission</h2>\
         <p><strong>Name:</strong> {name}</p>\
         <p><strong>Email:</strong> {email}</p>\
         <p><strong>Subject:</strong> {subject}</p>\
         <p><strong>Message:</strong></p>\
         <p>{message}</p>",
        name = escape_html(&contact.name),
        email = escape_html(&contact.email),
        subject = escape_html(&contact.subject),
    );

    let reply_to = single_line(&contact.email);

    MailMessage {
        from: settings.from().to_string(),
        to: settings.notify_to().to_string(),
        reply_to: (!reply_to.is_empty()).then_some(reply_to),
        subject,
        html,
    }
}
