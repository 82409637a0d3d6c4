//! Explicitly supplied credentials.
//!
//! The core never reads process state for credentials. A loader outside the
//! core fills a [`SecretsMap`] and hands it over inside the release context.

use std::collections::BTreeMap;
use std::fmt;

use super::error::{Error, Result};

/// Every credential the pipeline may need.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SecretName {
    /// Code signing identity, e.g. `Developer ID Application: Name (TEAMID1234)`
    SigningIdentity,
    /// App Store Connect API key identifier
    NotaryKeyId,
    /// App Store Connect API private key (.p8 contents)
    NotaryPrivateKey,
    /// Optional App Store Connect issuer identifier
    NotaryIssuerId,
    /// EdDSA private key for the update feed
    FeedPrivateKey,
    /// Optional explicit team identifier
    TeamId,
}

impl SecretName {
    /// All secret names, in a stable order.
    pub const ALL: [SecretName; 6] = [
        Self::SigningIdentity,
        Self::NotaryKeyId,
        Self::NotaryPrivateKey,
        Self::NotaryIssuerId,
        Self::FeedPrivateKey,
        Self::TeamId,
    ];

    /// Stable lowercase identifier used in messages.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SigningIdentity => "signing-identity",
            Self::NotaryKeyId => "notary-key-id",
            Self::NotaryPrivateKey => "notary-private-key",
            Self::NotaryIssuerId => "notary-issuer-id",
            Self::FeedPrivateKey => "feed-private-key",
            Self::TeamId => "team-id",
        }
    }
}

impl fmt::Display for SecretName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Secret name to value map.
///
/// `Debug` output never includes values.
#[derive(Clone, Default)]
pub struct SecretsMap {
    values: BTreeMap<SecretName, String>,
}

impl SecretsMap {
    /// Empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a value. Blank values are ignored so they read as absent.
    pub fn insert(&mut self, name: SecretName, value: impl Into<String>) {
        let value = value.into();
        if value.trim().is_empty() {
            return;
        }
        self.values.insert(name, value);
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, name: SecretName, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Optional lookup.
    pub fn get(&self, name: SecretName) -> Option<&str> {
        self.values.get(&name).map(String::as_str)
    }

    /// Mandatory lookup, a configuration error when absent.
    pub fn require(&self, name: SecretName) -> Result<&str> {
        self.get(name).ok_or(Error::MissingSecret { name })
    }

    /// True when a value is present.
    pub fn contains(&self, name: SecretName) -> bool {
        self.values.contains_key(&name)
    }
}

impl fmt::Debug for SecretsMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.values.keys()).finish()
    }
}

impl FromIterator<(SecretName, String)> for SecretsMap {
    fn from_iter<I: IntoIterator<Item = (SecretName, String)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (name, value) in iter {
            map.insert(name, value);
        }
        map
    }
}
