//! Email delivery settings: SMTP, SendGrid or Amazon SES.

use super::rules::{check_provider, check_section, reject_foreign_sections, require_object, ProviderId};
use super::ValidationErrors;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

pub const SENSITIVE_FIELDS: &[&str] = &[
    "smtp.password",
    "sendgrid.apiKey",
    "ses.accessKeyId",
    "ses.secretAccessKey",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailProvider {
    Smtp,
    Sendgrid,
    Ses,
}

impl ProviderId for EmailProvider {
    const ALL: &'static [Self] = &[Self::Smtp, Self::Sendgrid, Self::Ses];

    fn as_str(&self) -> &'static str {
        match self {
            Self::Smtp => "smtp",
            Self::Sendgrid => "sendgrid",
            Self::Ses => "ses",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct SmtpConfig {
    #[validate(length(min = 1, message = "is required"))]
    pub host: String,
    #[validate(
        required(message = "is required"),
        range(min = 1, max = 65535, message = "must be between 1 and 65535")
    )]
    pub port: Option<i64>,
    #[validate(length(min = 1, message = "is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "is required"))]
    pub password: String,
    /// Implicit TLS instead of STARTTLS
    pub secure: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct SendgridConfig {
    #[validate(length(min = 1, message = "is required"))]
    pub api_key: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct SesConfig {
    #[validate(length(min = 1, message = "is required"))]
    pub access_key_id: String,
    #[validate(length(min = 1, message = "is required"))]
    pub secret_access_key: String,
    #[validate(length(min = 1, message = "is required"))]
    pub region: String,
}

/// Transport selected by `provider`, carrying only that provider's payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum EmailTransport {
    Smtp { smtp: SmtpConfig },
    Sendgrid { sendgrid: SendgridConfig },
    Ses { ses: SesConfig },
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
struct Sender {
    #[validate(email(message = "must be a valid email address"))]
    from_email: String,
    #[validate(length(min = 1, max = 100, message = "must be 1 to 100 characters"))]
    from_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailSettings {
    #[serde(flatten)]
    pub transport: EmailTransport,
    pub from_email: String,
    pub from_name: String,
}

impl EmailSettings {
    pub fn provider(&self) -> EmailProvider {
        match self.transport {
            EmailTransport::Smtp { .. } => EmailProvider::Smtp,
            EmailTransport::Sendgrid { .. } => EmailProvider::Sendgrid,
            EmailTransport::Ses { .. } => EmailProvider::Ses,
        }
    }
}

pub fn validate(raw: &Value) -> Result<EmailSettings, ValidationErrors> {
    let mut errors = ValidationErrors::default();
    if !require_object(raw, &mut errors) {
        return errors.finish(None);
    }

    let sender: Option<Sender> = check_section(Some(raw), "", &mut errors);
    let transport = check_provider::<EmailProvider>(raw, &mut errors).and_then(|provider| {
        reject_foreign_sections(raw, provider, &mut errors);
        let section = raw.get(provider.as_str());
        match provider {
            EmailProvider::Smtp => check_section(section, "smtp", &mut errors)
                .map(|smtp| EmailTransport::Smtp { smtp }),
            EmailProvider::Sendgrid => check_section(section, "sendgrid", &mut errors)
                .map(|sendgrid| EmailTransport::Sendgrid { sendgrid }),
            EmailProvider::Ses => check_section(section, "ses", &mut errors)
                .map(|ses| EmailTransport::Ses { ses }),
        }
    });

    let settings = match (sender, transport) {
        (Some(sender), Some(transport)) => Some(EmailSettings {
            transport,
            from_email: sender.from_email,
            from_name: sender.from_name,
        }),
        _ => None,
    };
    errors.finish(settings)
}
