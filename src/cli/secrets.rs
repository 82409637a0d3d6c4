//! Credentials from the process environment.

use crate::release::{SecretName, SecretsMap};

/// Environment variable carrying `name`.
pub const fn secret_env_var(name: SecretName) -> &'static str {
    match name {
        SecretName::SigningIdentity => "DEVELOPER_ID_APPLICATION",
        SecretName::NotaryKeyId => "APP_STORE_CONNECT_KEY_ID",
        SecretName::NotaryPrivateKey => "APP_STORE_CONNECT_PRIVATE_KEY",
        SecretName::NotaryIssuerId => "APP_STORE_CONNECT_ISSUER_ID",
        SecretName::FeedPrivateKey => "SPARKLE_PRIVATE_KEY",
        SecretName::TeamId => "APPLE_TEAM_ID",
    }
}

/// Reads every known secret from the environment. Unset and empty
/// variables are left out.
pub fn load_secrets() -> SecretsMap {
    load_secrets_with(|var| std::env::var(var).ok())
}

/// Same as [`load_secrets`] with a custom variable lookup.
pub fn load_secrets_with(lookup: impl Fn(&str) -> Option<String>) -> SecretsMap {
    SecretName::ALL
        .iter()
        .filter_map(|name| lookup(secret_env_var(*name)).map(|value| (*name, value)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_environment_names() {
        let secrets = load_secrets_with(|var| match var {
            "DEVELOPER_ID_APPLICATION" => Some("Developer ID Application: Demo (ABCDEFGH12)".into()),
            "APP_STORE_CONNECT_KEY_ID" => Some(String::new()),
            _ => None,
        });
        assert!(secrets.contains(SecretName::SigningIdentity));
        assert!(!secrets.contains(SecretName::NotaryKeyId));
        assert!(!secrets.contains(SecretName::FeedPrivateKey));
    }
}
