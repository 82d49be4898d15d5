//! Event collection stored in the document REST API.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::auth::AuthSession;
use super::error::{RemoteError, RemoteResult};
use crate::calendar::EventRecord;

const PAGE_SIZE: usize = 300;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldValue {
    StringValue(String),
    NullValue(Option<()>),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub fields: BTreeMap<String, FieldValue>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse {
    #[serde(default)]
    documents: Vec<Document>,
    next_page_token: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

impl Document {
    pub fn from_record(record: &EventRecord) -> RemoteResult<Self> {
        let value = serde_json::to_value(record).map_err(|e| RemoteError::Document(e.to_string()))?;
        let Value::Object(map) = value else {
            return Err(RemoteError::Document("record is not an object".to_string()));
        };
        let fields = map
            .into_iter()
            .filter(|(key, _)| key != "id")
            .filter_map(|(key, v)| match v {
                Value::String(s) => Some((key, FieldValue::StringValue(s))),
                _ => None,
            })
            .collect();
        Ok(Self { name: None, fields })
    }

    /// The document id becomes the record id.
    pub fn into_record(self) -> RemoteResult<EventRecord> {
        let map = self
            .fields
            .into_iter()
            .filter_map(|(key, v)| match v {
                FieldValue::StringValue(s) => Some((key, Value::String(s))),
                FieldValue::NullValue(_) => None,
            })
            .collect();
        let mut record: EventRecord = serde_json::from_value(Value::Object(map))
            .map_err(|e| RemoteError::Document(e.to_string()))?;
        record.id = self
            .name
            .as_deref()
            .and_then(|n| n.rsplit('/').next())
            .map(str::to_string);
        Ok(record)
    }
}

pub struct DocumentClient {
    http: reqwest::Client,
    base_url: String,
    project_id: String,
    collection: String,
    api_key: Option<String>,
}

impl DocumentClient {
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        project_id: impl Into<String>,
        collection: impl Into<String>,
        api_key: Option<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            project_id: project_id.into(),
            collection: collection.into(),
            api_key,
        }
    }

    pub fn collection_url(&self) -> String {
        format!(
            "{}/projects/{}/databases/(default)/documents/{}",
            self.base_url.trim_end_matches('/'),
            self.project_id,
            self.collection
        )
    }

    fn query(&self, page_token: Option<&str>) -> Vec<(&'static str, String)> {
        let mut query = vec![("pageSize", PAGE_SIZE.to_string())];
        if let Some(token) = page_token {
            query.push(("pageToken", token.to_string()));
        }
        if let Some(key) = &self.api_key {
            query.push(("key", key.clone()));
        }
        query
    }

    pub async fn list_events(&self) -> RemoteResult<Vec<EventRecord>> {
        let url = self.collection_url();
        let mut events = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let response = self
                .http
                .get(&url)
                .query(&self.query(page_token.as_deref()))
                .send()
                .await?;
            let page: ListResponse = read_json(response).await?;
            for doc in page.documents {
                let name = doc.name.clone().unwrap_or_default();
                match doc.into_record() {
                    Ok(record) => events.push(record),
                    Err(e) => log::warn!("Skipping document {}: {}", name, e),
                }
            }
            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        log::info!("Fetched {} events from {}", events.len(), self.collection);
        Ok(events)
    }

    pub async fn create_event(
        &self,
        session: &AuthSession,
        record: &EventRecord,
    ) -> RemoteResult<EventRecord> {
        let doc = Document::from_record(record)?;
        let mut request = self
            .http
            .post(self.collection_url())
            .bearer_auth(&session.id_token)
            .json(&doc);
        if let Some(key) = &self.api_key {
            request = request.query(&[("key", key)]);
        }
        let created: Document = read_json(request.send().await?).await?;
        let record = created.into_record()?;
        log::info!("Created event {:?} ({})", record.title, record.id.as_deref().unwrap_or("?"));
        Ok(record)
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> RemoteResult<T> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }
    let body = response.text().await?;
    let message = serde_json::from_str::<ErrorEnvelope>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body);
    Err(RemoteError::Service {
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    #[test]
    fn test_record_to_document_uses_string_values() {
        let record = EventRecord::new("Homecoming", NaiveDate::from_ymd_opt(2025, 10, 4).unwrap(), "Football")
            .with_time(NaiveTime::from_hms_opt(14, 30, 0).unwrap())
            .with_subcategory("College");
        let doc = Document::from_record(&record).unwrap();
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["fields"]["title"]["stringValue"], "Homecoming");
        assert_eq!(json["fields"]["date"]["stringValue"], "10/4/25");
        assert_eq!(json["fields"]["time"]["stringValue"], "2:30 PM");
        assert!(json["fields"].get("location").is_none());
        assert!(json.get("name").is_none());
    }

    #[test]
    fn test_document_to_record_takes_id_from_name() {
        let json = r#"{
            "name": "projects/p/databases/(default)/documents/events/abc123",
            "fields": {
                "title": {"stringValue": "Awards Night"},
                "date": {"stringValue": "2/8/26"},
                "category": {"stringValue": "Ceremony"},
                "description": {"nullValue": null}
            },
            "createTime": "2025-01-01T00:00:00Z"
        }"#;
        let doc: Document = serde_json::from_str(json).unwrap();
        let record = doc.into_record().unwrap();
        assert_eq!(record.id.as_deref(), Some("abc123"));
        assert_eq!(record.title, "Awards Night");
        assert_eq!(record.time, None);
        assert_eq!(record.description, None);
    }

    #[test]
    fn test_document_with_bad_date_is_rejected() {
        let mut doc = Document::default();
        doc.fields.insert("title".into(), FieldValue::StringValue("x".into()));
        doc.fields.insert("date".into(), FieldValue::StringValue("someday".into()));
        assert!(matches!(doc.into_record(), Err(RemoteError::Document(_))));
    }

    #[test]
    fn test_empty_list_response() {
        let page: ListResponse = serde_json::from_str("{}").unwrap();
        assert!(page.documents.is_empty());
        assert!(page.next_page_token.is_none());
    }

    #[test]
    fn test_collection_url_and_query() {
        let client = DocumentClient::new(
            reqwest::Client::new(),
            "https://docs.example.com/v1/",
            "racetracker",
            "events",
            Some("k".into()),
        );
        assert_eq!(
            client.collection_url(),
            "https://docs.example.com/v1/projects/racetracker/databases/(default)/documents/events"
        );
        let query = client.query(Some("next"));
        assert!(query.contains(&("pageToken", "next".to_string())));
        assert!(query.contains(&("key", "k".to_string())));
    }
}
