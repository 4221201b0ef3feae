//! Per-attempt parameter set referenced by option templates

use std::collections::HashMap;
use std::fmt;

/// Placeholder name -> value, seeded with `username` and `password`
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Params(HashMap<String, String>);

impl Params {
    pub const USERNAME: &'static str = "username";
    pub const PASSWORD: &'static str = "password";
    pub const DN: &'static str = "dn";

    pub fn new(username: &str, password: &str) -> Self {
        let mut params = HashMap::with_capacity(4);
        params.insert(Self::USERNAME.to_string(), username.to_string());
        params.insert(Self::PASSWORD.to_string(), password.to_string());
        Self(params)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(|s| s.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }
}

// Never print the password
impl fmt::Debug for Params {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (name, value) in &self.0 {
            if name == Self::PASSWORD {
                map.entry(name, &"********");
            } else {
                map.entry(name, value);
            }
        }
        map.finish()
    }
}
