//! In-memory directory used by the engine tests

use super::{
    DirectoryConnection, DirectoryConnector, DirectoryEntry, DirectoryError, DirectoryResult,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RecordedSearch {
    pub base: String,
    pub filter: String,
    pub attributes: Vec<String>,
    pub timeout: Duration,
}

#[derive(Debug, Default)]
pub(crate) struct Journal {
    pub connects: Vec<String>,
    pub binds: Vec<(String, String)>,
    pub searches: Vec<RecordedSearch>,
    pub chase_referrals: Vec<bool>,
    pub unbinds: usize,
}

/// Directory double: accepts the registered credentials, answers every search with
/// the configured result.
#[derive(Clone, Default)]
pub(crate) struct MockDirectory {
    credentials: HashMap<String, String>,
    search_result: Option<Result<Vec<DirectoryEntry>, DirectoryError>>,
    refuse_connections: bool,
    bind_delay: Option<Duration>,
    journal: Arc<Mutex<Journal>>,
}

impl MockDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept a simple bind with this DN and password
    pub fn with_user(mut self, dn: &str, password: &str) -> Self {
        self.credentials.insert(dn.to_string(), password.to_string());
        self
    }

    pub fn with_entries(mut self, entries: Vec<DirectoryEntry>) -> Self {
        self.search_result = Some(Ok(entries));
        self
    }

    pub fn with_search_error(mut self, err: DirectoryError) -> Self {
        self.search_result = Some(Err(err));
        self
    }

    pub fn refusing_connections(mut self) -> Self {
        self.refuse_connections = true;
        self
    }

    pub fn with_bind_delay(mut self, delay: Duration) -> Self {
        self.bind_delay = Some(delay);
        self
    }

    pub fn journal(&self) -> std::sync::MutexGuard<'_, Journal> {
        self.journal.lock().unwrap()
    }

    pub fn connector(&self) -> Arc<dyn DirectoryConnector> {
        Arc::new(self.clone())
    }
}

#[async_trait]
impl DirectoryConnector for MockDirectory {
    async fn connect(&self, url: &str) -> DirectoryResult<Box<dyn DirectoryConnection>> {
        self.journal().connects.push(url.to_string());

        if self.refuse_connections {
            return Err(DirectoryError::Connect(format!("{}: connection refused", url)));
        }

        Ok(Box::new(MockConnection {
            directory: self.clone(),
        }))
    }
}

struct MockConnection {
    directory: MockDirectory,
}

#[async_trait]
impl DirectoryConnection for MockConnection {
    fn set_chase_referrals(&mut self, chase: bool) {
        self.directory.journal().chase_referrals.push(chase);
    }

    async fn simple_bind(&mut self, bind_dn: &str, password: &str) -> DirectoryResult<()> {
        self.directory
            .journal()
            .binds
            .push((bind_dn.to_string(), password.to_string()));

        if let Some(delay) = self.directory.bind_delay {
            tokio::time::sleep(delay).await;
        }

        // Anonymous binds are always allowed
        if bind_dn.is_empty() && password.is_empty() {
            return Ok(());
        }

        match self.directory.credentials.get(bind_dn) {
            Some(expected) if expected == password => Ok(()),
            _ => Err(DirectoryError::InvalidCredentials),
        }
    }

    async fn search(
        &mut self,
        base: &str,
        filter: &str,
        attributes: &[String],
        timeout: Duration,
    ) -> DirectoryResult<Vec<DirectoryEntry>> {
        self.directory.journal().searches.push(RecordedSearch {
            base: base.to_string(),
            filter: filter.to_string(),
            attributes: attributes.to_vec(),
            timeout,
        });

        self.directory
            .search_result
            .clone()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn unbind(&mut self) -> DirectoryResult<()> {
        self.directory.journal().unbinds += 1;
        Ok(())
    }
}
