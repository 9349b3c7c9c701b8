use anyhow::{Context, Result};
use keyring::Entry;

const SERVICE_NAME: &str = "burgerclub";

/// Keychain account the store API key is saved under.
const API_KEY_ACCOUNT: &str = "api-key";

pub struct CredentialStore;

impl CredentialStore {
    /// Save the store API key in the OS keychain
    pub fn store_api_key(api_key: &str) -> Result<()> {
        let entry = Entry::new(SERVICE_NAME, API_KEY_ACCOUNT)
            .context("Failed to create keyring entry")?;
        entry
            .set_password(api_key)
            .context("Failed to store API key in keychain")?;
        Ok(())
    }

    pub fn get_api_key() -> Result<String> {
        let entry = Entry::new(SERVICE_NAME, API_KEY_ACCOUNT)
            .context("Failed to create keyring entry")?;
        entry
            .get_password()
            .context("Failed to retrieve API key from keychain")
    }

    pub fn delete_api_key() -> Result<()> {
        let entry = Entry::new(SERVICE_NAME, API_KEY_ACCOUNT)
            .context("Failed to create keyring entry")?;
        entry
            .delete_credential()
            .context("Failed to delete API key from keychain")?;
        Ok(())
    }

    pub fn has_api_key() -> bool {
        Entry::new(SERVICE_NAME, API_KEY_ACCOUNT)
            .map(|entry| entry.get_password().is_ok())
            .unwrap_or(false)
    }
}
