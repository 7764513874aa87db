use crate::fields::{self, Record};

fn name(contact: &Record) -> String {
    fields::text(contact, &["name"]).unwrap_or_else(|| "Sem nome".to_string())
}

/// Single line: `• {name} — tel: {phone} — email: {email}`.
#[must_use]
pub fn contact_summary(contact: &Record) -> String {
    let mut parts = vec![format!("• {}", name(contact))];
    if let Some(phone) = fields::text(contact, &["phone"]) {
        parts.push(format!("tel: {phone}"));
    }
    if let Some(email) = fields::text(contact, &["email"]) {
        parts.push(format!("email: {email}"));
    }
    parts.join(" — ")
}

/// One line per known field, name first.
#[must_use]
pub fn contact_detail(contact: &Record) -> String {
    let mut lines = vec![name(contact)];
    let labelled = [
        ("Telefone", "phone"),
        ("Email", "email"),
        ("Origem", "source"),
        ("Observações", "notes"),
    ];
    for (label, field) in labelled {
        let value = fields::text(contact, &[field])
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());
        if let Some(value) = value {
            lines.push(format!("{label}: {value}"));
        }
    }
    lines.join("\n")
}
