//! Provider configuration records.
//!
//! One record per organization and payment provider. Each record holds a
//! fixed set of independent secret fields, stored as opaque strings that may
//! be empty, plaintext, or encrypted under either master key.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Payment gateways an organization can configure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentProvider {
    ToyyibPay,
    Billplz,
    Chip,
    Stripe,
}

/// The secret fields of a [`ProviderConfigRecord`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialField {
    ApiKey,
    SecretKey,
    SigningKey,
    WebhookSecret,
}

impl CredentialField {
    /// Every secret field, in storage order.
    pub const ALL: [CredentialField; 4] = [
        CredentialField::ApiKey,
        CredentialField::SecretKey,
        CredentialField::SigningKey,
        CredentialField::WebhookSecret,
    ];

    /// Column name, safe to log.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ApiKey => "api_key",
            Self::SecretKey => "secret_key",
            Self::SigningKey => "signing_key",
            Self::WebhookSecret => "webhook_secret",
        }
    }
}

impl fmt::Display for CredentialField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored gateway configuration for one organization.
///
/// `Debug` lists which credential fields are set, never their values.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfigRecord {
    pub id: Uuid,
    pub organization_id: String,
    pub provider: PaymentProvider,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub secret_key: Option<String>,
    #[serde(default)]
    pub signing_key: Option<String>,
    #[serde(default)]
    pub webhook_secret: Option<String>,
    pub is_active: bool,
    pub updated_at: DateTime<Utc>,
}

impl ProviderConfigRecord {
    /// Creates an active record with no credentials set.
    pub fn new(organization_id: impl Into<String>, provider: PaymentProvider) -> Self {
        Self {
            id: Uuid::now_v7(),
            organization_id: organization_id.into(),
            provider,
            api_key: None,
            secret_key: None,
            signing_key: None,
            webhook_secret: None,
            is_active: true,
            updated_at: Utc::now(),
        }
    }

    /// Stored value of `field`, `None` when absent.
    pub fn get(&self, field: CredentialField) -> Option<&str> {
        match field {
            CredentialField::ApiKey => self.api_key.as_deref(),
            CredentialField::SecretKey => self.secret_key.as_deref(),
            CredentialField::SigningKey => self.signing_key.as_deref(),
            CredentialField::WebhookSecret => self.webhook_secret.as_deref(),
        }
    }

    pub fn set(&mut self, field: CredentialField, value: Option<String>) {
        let slot = match field {
            CredentialField::ApiKey => &mut self.api_key,
            CredentialField::SecretKey => &mut self.secret_key,
            CredentialField::SigningKey => &mut self.signing_key,
            CredentialField::WebhookSecret => &mut self.webhook_secret,
        };
        *slot = value;
    }

    /// Builder-style [`set`](Self::set).
    pub fn with(mut self, field: CredentialField, value: impl Into<String>) -> Self {
        self.set(field, Some(value.into()));
        self
    }

    /// Fields holding a non-empty value.
    pub fn configured_fields(&self) -> impl Iterator<Item = CredentialField> + '_ {
        CredentialField::ALL
            .into_iter()
            .filter(|f| self.get(*f).is_some_and(|v| !v.is_empty()))
    }
}

impl fmt::Debug for ProviderConfigRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let configured: Vec<&str> = self.configured_fields().map(CredentialField::as_str).collect();
        f.debug_struct("ProviderConfigRecord")
            .field("id", &self.id)
            .field("organization_id", &self.organization_id)
            .field("provider", &self.provider)
            .field("configured", &configured)
            .field("is_active", &self.is_active)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}
