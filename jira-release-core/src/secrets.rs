//! Credential resolution
//!
//! The `userpass` config field holds either `user:secret` or a bare
//! username. For a bare username the secret is read from the operating
//! system's secret store, keyed by the tracker URL and the username:
//! - macOS: Keychain (generic password, then internet password)
//! - Windows: Credential Manager
//! - Linux: kernel keyutils

use std::process::{Command, Stdio};

use keyring::Entry;
use tracing::debug;

use crate::{Error, Result};

/// Username and secret used for basic authentication
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub username: String,
    pub secret: String,
}

impl Credential {
    /// Resolve a `userpass` string into a credential
    ///
    /// `service` is the tracker base URL and is only used when the secret
    /// has to come from `store`.
    pub fn resolve(userpass: &str, service: &str, store: &dyn SecretStore) -> Result<Self> {
        if let Some((username, secret)) = userpass.split_once(':') {
            return Ok(Self {
                username: username.to_string(),
                secret: secret.to_string(),
            });
        }

        debug!(service, account = userpass, "Looking up secret in secret store");
        let raw = store.find_password(service, userpass)?;

        Ok(Self {
            username: userpass.to_string(),
            secret: unwrap_secret(&raw),
        })
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// Source of secrets for a (service, account) pair
pub trait SecretStore {
    /// Return the stored secret, possibly still in the store's raw form
    fn find_password(&self, service: &str, account: &str) -> Result<String>;
}

/// Strip whitespace and the store's `password: "..."` wrapping
///
/// Handles `password: "s3cret"`, `password: 0x7333...  "s3cret"` and bare
/// values. When the hex form is present it holds the exact secret bytes,
/// the quoted form after it is octal-escaped.
pub fn unwrap_secret(raw: &str) -> String {
    let mut value = raw.trim();
    let labeled = value.starts_with("password:");

    if let Some(rest) = value.strip_prefix("password:") {
        value = rest.trim();
    }

    // only the labeled keychain output carries the hex form
    if let Some(hex_part) = value.strip_prefix("0x").filter(|_| labeled) {
        let digits = hex_part.split_whitespace().next().unwrap_or_default();
        if let Some(decoded) = hex::decode(digits)
            .ok()
            .and_then(|bytes| String::from_utf8(bytes).ok())
        {
            return decoded;
        }
        if let Some(idx) = value.find('"') {
            value = &value[idx..];
        }
    }

    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        value = &value[1..value.len() - 1];
    }

    value.to_string()
}

/// OS credential store lookup through the `keyring` crate
#[derive(Debug, Clone)]
pub struct KeyringStore {
    fallback: Option<KeychainStore>,
}

impl KeyringStore {
    /// Keyring lookup, falling back to `security` internet passwords on macOS
    pub fn new() -> Self {
        Self {
            fallback: cfg!(target_os = "macos").then(KeychainStore::new),
        }
    }

    /// Keyring lookup only
    pub fn without_fallback() -> Self {
        Self { fallback: None }
    }
}

impl Default for KeyringStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SecretStore for KeyringStore {
    fn find_password(&self, service: &str, account: &str) -> Result<String> {
        let entry = Entry::new(service, account)
            .map_err(|e| Error::SecretStore(format!("Failed to create keyring entry: {}", e)))?;

        match entry.get_password() {
            Ok(secret) => {
                debug!(service, account, "Loaded secret from keyring");
                Ok(secret)
            }
            Err(keyring::Error::NoEntry) => match &self.fallback {
                Some(fallback) => {
                    debug!(service, account, "No keyring entry, trying keychain");
                    fallback.find_password(service, account)
                }
                None => Err(Error::SecretStore(format!(
                    "No secret found for {} at {}",
                    account, service
                ))),
            },
            Err(e) => Err(Error::SecretStore(format!(
                "Failed to read secret for {} at {}: {}",
                account, service, e
            ))),
        }
    }
}

/// macOS keychain internet-password lookup through the `security` tool
#[derive(Debug, Clone)]
pub struct KeychainStore {
    program: String,
}

impl KeychainStore {
    pub fn new() -> Self {
        Self {
            program: "security".to_string(),
        }
    }

    /// Use a different executable, e.g. a wrapper script
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for KeychainStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SecretStore for KeychainStore {
    fn find_password(&self, service: &str, account: &str) -> Result<String> {
        let output = Command::new(&self.program)
            .args(["find-internet-password", "-g", "-s", service, "-a", account])
            .stdin(Stdio::null())
            .output()
            .map_err(|e| Error::SecretStore(format!("Failed to run {}: {}", self.program, e)))?;

        if !output.status.success() {
            return Err(Error::SecretStore(format!(
                "No secret found for {} at {} ({})",
                account,
                service,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        // `-g` writes the password line to stderr
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stdout = String::from_utf8_lossy(&output.stdout);
        stderr
            .lines()
            .chain(stdout.lines())
            .find(|line| line.trim_start().starts_with("password:"))
            .map(str::to_string)
            .ok_or_else(|| {
                Error::SecretStore(format!("No password line in {} output", self.program))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// In-memory store recording every lookup
    struct FakeStore {
        secret: String,
        lookups: RefCell<Vec<(String, String)>>,
    }

    impl FakeStore {
        fn new(secret: &str) -> Self {
            Self {
                secret: secret.to_string(),
                lookups: RefCell::new(Vec::new()),
            }
        }
    }

    impl SecretStore for FakeStore {
        fn find_password(&self, service: &str, account: &str) -> Result<String> {
            self.lookups
                .borrow_mut()
                .push((service.to_string(), account.to_string()));
            Ok(self.secret.clone())
        }
    }

    struct FailingStore;

    impl SecretStore for FailingStore {
        fn find_password(&self, _service: &str, _account: &str) -> Result<String> {
            Err(Error::SecretStore("locked".to_string()))
        }
    }

    #[test]
    fn test_split_userpass() {
        let store = FakeStore::new("unused");
        let cred = Credential::resolve("bob:secret", "https://example.atlassian.net", &store)
            .unwrap();

        assert_eq!(cred.username, "bob");
        assert_eq!(cred.secret, "secret");
        assert!(store.lookups.borrow().is_empty());
    }

    #[test]
    fn test_split_at_first_separator() {
        let cred = Credential::resolve("bob:a:b", "svc", &FailingStore).unwrap();
        assert_eq!(cred.username, "bob");
        assert_eq!(cred.secret, "a:b");
    }

    #[test]
    fn test_store_lookup() {
        let store = FakeStore::new("  password: \"hunter2\"\n");
        let cred = Credential::resolve("bob", "https://example.atlassian.net", &store).unwrap();

        assert_eq!(cred.username, "bob");
        assert_eq!(cred.secret, "hunter2");
        assert_eq!(
            *store.lookups.borrow(),
            vec![(
                "https://example.atlassian.net".to_string(),
                "bob".to_string()
            )]
        );
    }

    #[test]
    fn test_store_failure_propagates() {
        let result = Credential::resolve("bob", "svc", &FailingStore);
        assert!(matches!(result, Err(Error::SecretStore(_))));
    }

    #[test]
    fn test_unwrap_secret() {
        assert_eq!(unwrap_secret("password: \"abc\""), "abc");
        assert_eq!(unwrap_secret("  plain \n"), "plain");
        assert_eq!(unwrap_secret("password: 0x616263C3A9  \"abc\\303\\251\""), "abcé");
        // undecodable hex falls back to the quoted form
        assert_eq!(unwrap_secret("password: 0xZZ  \"abc\""), "abc");
        assert_eq!(unwrap_secret("\"\""), "");
        // unlabeled values are taken literally
        assert_eq!(unwrap_secret("0x41"), "0x41");
    }

    #[test]
    fn test_debug_hides_secret() {
        let cred = Credential {
            username: "bob".to_string(),
            secret: "hunter2".to_string(),
        };
        let debug = format!("{:?}", cred);
        assert!(debug.contains("bob"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_keyring_missing_entry() {
        keyring::set_default_credential_builder(keyring::mock::default_credential_builder());

        let store = KeyringStore::without_fallback();
        let err = store
            .find_password("https://example.atlassian.net", "bob")
            .unwrap_err();
        assert!(matches!(err, Error::SecretStore(_)));
        assert!(err.to_string().contains("No secret found for bob"));
    }

    /// Write an executable shell script standing in for `security`
    #[cfg(unix)]
    fn fake_security(dir: &std::path::Path, body: &str) -> String {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("security");
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[cfg(unix)]
    #[test]
    fn test_keychain_reads_password_line_from_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let program = fake_security(
            dir.path(),
            "echo 'keychain: \"/Users/bob/login.keychain\"'\necho 'password: \"hunter2\"' >&2",
        );

        let raw = KeychainStore::with_program(program)
            .find_password("https://example.atlassian.net", "bob")
            .unwrap();
        assert_eq!(raw, "password: \"hunter2\"");
        assert_eq!(unwrap_secret(&raw), "hunter2");
    }

    #[cfg(unix)]
    #[test]
    fn test_keychain_falls_back_to_stdout() {
        let dir = tempfile::tempdir().unwrap();
        let program = fake_security(dir.path(), "echo 'password: \"from-stdout\"'");

        let raw = KeychainStore::with_program(program)
            .find_password("svc", "bob")
            .unwrap();
        assert_eq!(unwrap_secret(&raw), "from-stdout");
    }

    #[cfg(unix)]
    #[test]
    fn test_keychain_passes_service_and_account() {
        let dir = tempfile::tempdir().unwrap();
        let program = fake_security(dir.path(), "echo \"password: \\\"$*\\\"\" >&2");

        let raw = KeychainStore::with_program(program)
            .find_password("https://example.atlassian.net", "bob")
            .unwrap();
        assert_eq!(
            unwrap_secret(&raw),
            "find-internet-password -g -s https://example.atlassian.net -a bob"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_keychain_nonzero_exit() {
        let dir = tempfile::tempdir().unwrap();
        let program = fake_security(
            dir.path(),
            "echo 'The specified item could not be found in the keychain.' >&2\nexit 44",
        );

        let err = KeychainStore::with_program(program)
            .find_password("svc", "bob")
            .unwrap_err();
        assert!(err.to_string().contains("could not be found"));
    }

    #[cfg(unix)]
    #[test]
    fn test_keychain_without_password_line() {
        let dir = tempfile::tempdir().unwrap();
        let program = fake_security(dir.path(), "echo 'keychain: \"login\"'");

        let err = KeychainStore::with_program(program)
            .find_password("svc", "bob")
            .unwrap_err();
        assert!(err.to_string().contains("No password line"));
    }

    #[cfg(unix)]
    #[test]
    fn test_keychain_missing_program() {
        let store = KeychainStore::with_program("/nonexistent/security-tool");
        let result = store.find_password("svc", "bob");
        assert!(matches!(result, Err(Error::SecretStore(_))));
    }
}
