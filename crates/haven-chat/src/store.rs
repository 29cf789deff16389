//! Saved-property stores.
//!
//! Guests keep their saved properties in a JSON state file next to the
//! config; logged-in users keep them on their account through the backend.
//! Both present the same capability surface, and both list in the same
//! order: most recently saved first.

use std::path::PathBuf;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use haven_api::{ApiClient, SavedProperty};

/// How many compare uses a guest gets before login is required
pub const GUEST_COMPARE_LIMIT: u32 = 3;

/// Capability surface over the saved-property list
#[async_trait]
pub trait PropertyStore: Send + Sync {
    /// All saved properties, most recently saved first
    async fn list(&self) -> Result<Vec<SavedProperty>>;

    /// Save a listing URL. Saving an already-saved URL is a no-op.
    async fn save(&self, url: &str) -> Result<()>;

    /// Remove a listing URL
    async fn remove(&self, url: &str) -> Result<()>;

    /// Record that the agent was contacted about a listing
    async fn mark_contacted(&self, url: &str) -> Result<()>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct GuestState {
    properties: Vec<SavedProperty>,
    #[serde(default)]
    compare_uses: u32,
}

/// File-backed store for guests.
///
/// Also carries the guest compare counter, which lives with the properties
/// because both clear together on login.
pub struct LocalStore {
    path: PathBuf,
    client: ApiClient,
    state: Mutex<GuestState>,
}

impl LocalStore {
    pub fn load(path: PathBuf, client: ApiClient) -> Result<Self> {
        let state = match std::fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw)
                .map_err(|e| Error::Store(format!("{}: {}", path.display(), e)))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => GuestState::default(),
            Err(e) => return Err(Error::Store(format!("{}: {}", path.display(), e))),
        };
        Ok(Self {
            path,
            client,
            state: Mutex::new(state),
        })
    }

    fn persist(&self, state: &GuestState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::Store(format!("{}: {}", parent.display(), e)))?;
        }
        let raw = serde_json::to_string_pretty(state)
            .map_err(|e| Error::Store(e.to_string()))?;
        std::fs::write(&self.path, raw)
            .map_err(|e| Error::Store(format!("{}: {}", self.path.display(), e)))
    }

    /// Insert an already-resolved property at the front of the list
    pub fn insert(&self, property: SavedProperty) -> Result<()> {
        let mut state = self.state.lock();
        if state.properties.iter().any(|p| p.url == property.url) {
            return Ok(());
        }
        state.properties.insert(0, property);
        self.persist(&state)
    }

    /// Drain every saved property, clearing the file.
    ///
    /// Used on login to hand the guest list over to the account.
    pub fn take_all(&self) -> Result<Vec<SavedProperty>> {
        let mut state = self.state.lock();
        let drained = std::mem::take(&mut state.properties);
        self.persist(&state)?;
        Ok(drained)
    }

    pub fn compare_uses(&self) -> u32 {
        self.state.lock().compare_uses
    }

    /// Spend one guest compare use, erroring once the allowance is gone
    pub fn record_compare_use(&self) -> Result<()> {
        let mut state = self.state.lock();
        if state.compare_uses >= GUEST_COMPARE_LIMIT {
            return Err(Error::CompareLimitReached);
        }
        state.compare_uses += 1;
        self.persist(&state)
    }
}

#[async_trait]
impl PropertyStore for LocalStore {
    async fn list(&self) -> Result<Vec<SavedProperty>> {
        Ok(self.state.lock().properties.clone())
    }

    async fn save(&self, url: &str) -> Result<()> {
        if self.state.lock().properties.iter().any(|p| p.url == url) {
            return Ok(());
        }
        let lookup = self.client.lookup_property(url).await?;
        if lookup.property.is_empty() {
            return Err(Error::Store(format!("listing not recognized: {url}")));
        }
        self.insert(SavedProperty {
            name: lookup.property,
            url: url.to_string(),
            contacted: false,
            property_tag: lookup.property_tag,
        })
    }

    async fn remove(&self, url: &str) -> Result<()> {
        let mut state = self.state.lock();
        state.properties.retain(|p| p.url != url);
        self.persist(&state)
    }

    async fn mark_contacted(&self, url: &str) -> Result<()> {
        let mut state = self.state.lock();
        for property in state.properties.iter_mut() {
            if property.url == url {
                property.contacted = true;
            }
        }
        self.persist(&state)
    }
}

/// Account-backed store for logged-in users
pub struct RemoteStore {
    client: ApiClient,
}

impl RemoteStore {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PropertyStore for RemoteStore {
    async fn list(&self) -> Result<Vec<SavedProperty>> {
        // The backend returns oldest first; one reversal here gives the
        // same most-recent-first order the local store keeps.
        let mut properties = self.client.get_saved_properties().await?;
        properties.reverse();
        Ok(properties)
    }

    async fn save(&self, url: &str) -> Result<()> {
        Ok(self.client.save_property(url).await?)
    }

    async fn remove(&self, url: &str) -> Result<()> {
        Ok(self.client.delete_property(url).await?)
    }

    async fn mark_contacted(&self, _url: &str) -> Result<()> {
        // The backend flips the flag when it records the enquiry.
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn property(url: &str, name: &str) -> SavedProperty {
        SavedProperty {
            name: name.to_string(),
            url: url.to_string(),
            contacted: false,
            property_tag: format!("/property/{name}"),
        }
    }

    fn store_at(dir: &std::path::Path) -> LocalStore {
        let client = ApiClient::new("http://localhost:8000").unwrap();
        LocalStore::load(dir.join("saved.json"), client).unwrap()
    }

    #[tokio::test]
    async fn test_insert_orders_most_recent_first() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_at(dir.path());
        store.insert(property("u1", "first")).unwrap();
        store.insert(property("u2", "second")).unwrap();

        let listed = store.list().await.unwrap();
        assert_eq!(listed[0].name, "second");
        assert_eq!(listed[1].name, "first");
    }

    #[tokio::test]
    async fn test_insert_dedupes_by_url() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_at(dir.path());
        store.insert(property("u1", "a")).unwrap();
        store.insert(property("u1", "a again")).unwrap();
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_state_survives_reload() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = store_at(dir.path());
            store.insert(property("u1", "kept")).unwrap();
            store.record_compare_use().unwrap();
        }
        let store = store_at(dir.path());
        assert_eq!(store.list().await.unwrap()[0].name, "kept");
        assert_eq!(store.compare_uses(), 1);
    }

    #[tokio::test]
    async fn test_remove_and_mark_contacted() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_at(dir.path());
        store.insert(property("u1", "a")).unwrap();
        store.insert(property("u2", "b")).unwrap();

        store.mark_contacted("u1").await.unwrap();
        let listed = store.list().await.unwrap();
        assert!(listed.iter().find(|p| p.url == "u1").unwrap().contacted);
        assert!(!listed.iter().find(|p| p.url == "u2").unwrap().contacted);

        store.remove("u2").await.unwrap();
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[test]
    fn test_compare_allowance_is_three_uses() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_at(dir.path());
        for _ in 0..GUEST_COMPARE_LIMIT {
            store.record_compare_use().unwrap();
        }
        assert!(matches!(
            store.record_compare_use(),
            Err(Error::CompareLimitReached)
        ));
    }

    #[test]
    fn test_take_all_drains_and_persists_empty_list() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_at(dir.path());
        store.insert(property("u1", "a")).unwrap();
        let drained = store.take_all().unwrap();
        assert_eq!(drained.len(), 1);

        let reloaded = store_at(dir.path());
        assert_eq!(reloaded.compare_uses(), 0);
        assert!(futures::executor::block_on(reloaded.list()).unwrap().is_empty());
    }
}
