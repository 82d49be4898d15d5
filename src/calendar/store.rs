use std::path::PathBuf;
use std::sync::Arc;

use color_eyre::eyre::{eyre, Result};

use super::event::{load_events, save_events, EventRecord};
use crate::remote::{AuthSession, DocumentClient, RemoteError};

/// Where events are read from and written to.
#[derive(Clone)]
pub enum EventSource {
    File(PathBuf),
    Remote {
        client: Arc<DocumentClient>,
        admins: Arc<Vec<String>>,
    },
}

impl EventSource {
    pub fn describe(&self) -> String {
        match self {
            EventSource::File(path) => path.display().to_string(),
            EventSource::Remote { client, .. } => client.collection_url(),
        }
    }

    pub fn requires_sign_in(&self) -> bool {
        matches!(self, EventSource::Remote { .. })
    }

    /// Whether `session` may create events in this source.
    pub fn permits(&self, session: Option<&AuthSession>) -> Result<(), RemoteError> {
        match self {
            EventSource::File(_) => Ok(()),
            EventSource::Remote { admins, .. } => {
                let session = session.ok_or(RemoteError::NotSignedIn)?;
                if session.is_admin(admins) {
                    Ok(())
                } else {
                    Err(RemoteError::NotAdmin(session.email.clone()))
                }
            }
        }
    }

    /// A missing local file is an empty calendar.
    pub async fn fetch(self) -> Result<Vec<EventRecord>> {
        match self {
            EventSource::File(path) => {
                tokio::task::spawn_blocking(move || {
                    if !path.exists() {
                        log::info!("{} does not exist yet, starting empty", path.display());
                        return Ok(Vec::new());
                    }
                    load_events(&path).map_err(|e| eyre!("{}: {}", path.display(), e))
                })
                .await?
            }
            EventSource::Remote { client, .. } => Ok(client.list_events().await?),
        }
    }

    /// Persist one new record. A file source re-reads the file and appends,
    /// so a stale or failed in-memory load never overwrites stored events.
    pub async fn create(self, session: Option<AuthSession>, record: EventRecord) -> Result<EventRecord> {
        match self {
            EventSource::File(path) => tokio::task::spawn_blocking(move || -> Result<EventRecord> {
                let mut events = if path.exists() {
                    load_events(&path).map_err(|e| eyre!("{}: {}", path.display(), e))?
                } else {
                    Vec::new()
                };
                events.push(record.clone());
                save_events(&path, &events)?;
                Ok(record)
            })
            .await?,
            EventSource::Remote { ref client, .. } => {
                self.permits(session.as_ref())?;
                let session = session.ok_or(RemoteError::NotSignedIn)?;
                Ok(client.create_event(&session, &record).await?)
            }
        }
    }
}

/// In-memory event list plus the source it came from.
pub struct Store {
    source: EventSource,
    events: Vec<EventRecord>,
    loaded: bool,
}

impl Store {
    pub fn new(source: EventSource) -> Self {
        Self {
            source,
            events: Vec::new(),
            loaded: false,
        }
    }

    pub fn source(&self) -> &EventSource {
        &self.source
    }

    pub fn events(&self) -> &[EventRecord] {
        &self.events
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn replace(&mut self, events: Vec<EventRecord>) {
        self.events = events;
        self.loaded = true;
    }

    pub fn insert(&mut self, record: EventRecord) {
        self.events.push(record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(title: &str) -> EventRecord {
        EventRecord::new(title, NaiveDate::from_ymd_opt(2025, 7, 4).unwrap(), "Other")
    }

    #[tokio::test]
    async fn test_fetch_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let source = EventSource::File(dir.path().join("events.json"));
        assert!(source.fetch().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_appends_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.json");
        let source = EventSource::File(path.clone());

        save_events(&path, &[record("First")]).unwrap();
        source.clone().create(None, record("Second")).await.unwrap();

        let titles: Vec<String> = source.fetch().await.unwrap().into_iter().map(|e| e.title).collect();
        assert_eq!(titles, vec!["First", "Second"]);
    }

    #[tokio::test]
    async fn test_create_leaves_unreadable_file_alone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.json");
        let raw = r#"[{"title":"Keep me","date":"7/4/25","category":"Other"},{"title":"Typo","date":"13/1/25","category":"Other"}]"#;
        std::fs::write(&path, raw).unwrap();

        let err = EventSource::File(path.clone()).create(None, record("New")).await.unwrap_err();
        assert!(err.to_string().contains("13/1/25"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), raw);
    }

    #[tokio::test]
    async fn test_remote_create_requires_session() {
        let client = DocumentClient::new(reqwest::Client::new(), "http://127.0.0.1:9", "p", "events", None);
        let source = EventSource::Remote {
            client: Arc::new(client),
            admins: Arc::new(vec!["boss@example.com".to_string()]),
        };
        assert!(source.requires_sign_in());

        let err = source.clone().create(None, record("x")).await.unwrap_err();
        assert_eq!(err.to_string(), "Not signed in");

        let session = AuthSession {
            email: "guest@example.com".to_string(),
            id_token: "t".to_string(),
            refresh_token: String::new(),
            local_id: "u".to_string(),
        };
        let err = source.create(Some(session), record("x")).await.unwrap_err();
        assert_eq!(err.to_string(), "guest@example.com is not allowed to create events");
    }

    #[test]
    fn test_store_replace_marks_loaded() {
        let mut store = Store::new(EventSource::File(PathBuf::from("x.json")));
        assert!(!store.is_loaded());
        store.replace(vec![record("a")]);
        store.insert(record("b"));
        assert!(store.is_loaded());
        assert_eq!(store.events().len(), 2);
    }
}
