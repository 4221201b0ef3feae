//! Active Directory provider options
//!
//! A flat mapping of option names to string templates. Templates may reference
//! `{username}`, `{password}` and anything the search phase discovers (`{dn}` and the
//! requested attributes).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Well-known option names
pub mod keys {
    pub const SERVER: &str = "server";
    pub const BIND_USER: &str = "bind-user";
    pub const BIND_PASSWORD: &str = "bind-password";
    pub const AUTO_REGISTER_USERNAME: &str = "auto-register-username";
    pub const SEARCH_FIELDS: &str = "search-fields";
    pub const SEARCH_BASE: &str = "search-base";
    pub const SEARCH_FILTER: &str = "search-filter";
    pub const SEARCH_USER: &str = "search-user";
    pub const SEARCH_PASSWORD: &str = "search-password";
    pub const CONTINUE_ON_FAILURE: &str = "continue-on-failure";
}

/// Text stored for boolean option values; `FLAG_FALSE` is the `continue-on-failure` default
pub const FLAG_TRUE: &str = "True";
pub const FLAG_FALSE: &str = "False";

/// Ordered option name -> template mapping
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, OptionValue>")]
#[serde(into = "BTreeMap<String, String>")]
pub struct ProviderOptions(BTreeMap<String, String>);

/// Scalar accepted for an option in a configuration file
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Text(String),
    Flag(bool),
    Integer(i64),
    Float(f64),
}

impl From<OptionValue> for String {
    fn from(value: OptionValue) -> Self {
        match value {
            OptionValue::Text(s) => s,
            OptionValue::Flag(true) => FLAG_TRUE.to_string(),
            OptionValue::Flag(false) => FLAG_FALSE.to_string(),
            OptionValue::Integer(i) => i.to_string(),
            OptionValue::Float(f) => f.to_string(),
        }
    }
}

impl From<BTreeMap<String, OptionValue>> for ProviderOptions {
    fn from(map: BTreeMap<String, OptionValue>) -> Self {
        Self(map.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

impl From<ProviderOptions> for BTreeMap<String, String> {
    fn from(options: ProviderOptions) -> Self {
        options.0
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ProviderOptions {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl ProviderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(|s| s.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.remove(key)
    }

    /// Get an option or fail with a configuration error
    pub fn require(&self, key: &str) -> crate::Result<&str> {
        self.get(key)
            .ok_or_else(|| crate::Error::MissingOption(key.to_string()))
    }

    /// Option names an authentication attempt with these options will resolve
    pub fn referenced_keys(&self) -> Vec<&'static str> {
        let mut referenced = vec![
            keys::SERVER,
            keys::BIND_USER,
            keys::BIND_PASSWORD,
            keys::AUTO_REGISTER_USERNAME,
        ];

        if self.contains(keys::SEARCH_FIELDS) {
            referenced.push(keys::SEARCH_BASE);
            referenced.push(keys::SEARCH_FILTER);
            if self.contains(keys::SEARCH_USER) {
                referenced.push(keys::SEARCH_PASSWORD);
            }
        }

        referenced
    }

    /// Check every referenced option is present
    pub fn validate(&self) -> crate::Result<()> {
        for key in self.referenced_keys() {
            self.require(key)?;
        }
        Ok(())
    }

    /// View suitable for logs: password values are masked
    pub fn redacted(&self) -> Redacted<'_> {
        Redacted(self)
    }
}

/// Debug/Display view of [`ProviderOptions`] with secrets masked
pub struct Redacted<'a>(&'a ProviderOptions);

fn is_secret(key: &str) -> bool {
    key.to_ascii_lowercase().contains("password")
}

impl fmt::Debug for Redacted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (key, value) in self.0.0.iter() {
            if is_secret(key) {
                map.entry(&key, &"********");
            } else {
                map.entry(&key, &value);
            }
        }
        map.finish()
    }
}

impl fmt::Display for Redacted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_options() -> ProviderOptions {
        [
            ("server", "ldap://x"),
            ("bind-user", "{username}"),
            ("bind-password", "{password}"),
            ("auto-register-username", "{username}@corp"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_validate_minimal_options() {
        assert!(base_options().validate().is_ok());
    }

    #[test]
    fn test_validate_reports_missing_key() {
        let mut options = base_options();
        options.remove("bind-password");

        match options.validate() {
            Err(crate::Error::MissingOption(key)) => assert_eq!(key, "bind-password"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_search_keys_required_only_with_search_fields() {
        let mut options = base_options();
        assert!(!options.referenced_keys().contains(&keys::SEARCH_BASE));

        options.insert("search-fields", "mail");
        options.insert("search-base", "dc=corp");
        options.insert("search-filter", "(sAMAccountName={username})");
        assert!(options.validate().is_ok());

        options.insert("search-user", "svc");
        assert!(matches!(
            options.validate(),
            Err(crate::Error::MissingOption(ref k)) if k == "search-password"
        ));
    }

    #[test]
    fn test_redacted_masks_passwords() {
        let mut options = base_options();
        options.insert("search-password", "hunter2");
        let shown = format!("{}", options.redacted());

        assert!(!shown.contains("hunter2"));
        assert!(!shown.contains("{password}"));
        assert!(shown.contains("ldap://x"));
    }

    #[test]
    fn test_deserialize_scalars_from_toml() {
        let options: ProviderOptions = toml::from_str(
            r#"
            server = "ldap://dc.corp"
            continue-on-failure = true
            "#,
        )
        .unwrap();

        assert_eq!(options.get("server"), Some("ldap://dc.corp"));
        assert_eq!(options.get("continue-on-failure"), Some("True"));
    }
}
