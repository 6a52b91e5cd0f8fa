use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::models::{
    Collection, Course, CourseStatus, Instructor, Participant, Registration, Room,
};
use crate::source::DataService;

/// HTTP client for the remote record service. Each collection lives under
/// `{base_url}/{collection}/records`.
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str, api_key: Option<String>) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn records_url(&self, collection: Collection) -> String {
        format!("{}/{}/records", self.base_url, collection.name())
    }

    async fn fetch_records(&self, collection: Collection) -> anyhow::Result<Value> {
        let url = self.records_url(collection);
        log::debug!("GET {url}");

        let mut request = self.client.get(&url).header("Accept", "application/json");
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("request to {url} failed"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("HTTP {status} from {url}: {body}");
        }

        response
            .json()
            .await
            .with_context(|| format!("invalid JSON from {url}"))
    }
}

#[derive(Debug, Deserialize)]
struct RecordEnvelope<F> {
    record_id: Option<String>,
    fields: F,
}

fn decode_envelope<F>(item: Value, label: &str) -> Option<RecordEnvelope<F>>
where
    F: DeserializeOwned,
{
    match serde_json::from_value(item) {
        Ok(envelope) => Some(envelope),
        Err(err) => {
            log::warn!("skipping malformed record {label}: {err}");
            None
        }
    }
}

/// Accepts either a JSON array of records or an object keyed by record id. Records
/// keep the order the service sent them in.
fn decode_records<F>(body: Value) -> anyhow::Result<Vec<(String, F)>>
where
    F: DeserializeOwned,
{
    let mut records = Vec::new();

    match body {
        Value::Array(items) => {
            for (index, item) in items.into_iter().enumerate() {
                let Some(envelope) = decode_envelope::<F>(item, &format!("#{index}")) else {
                    continue;
                };
                let id = envelope.record_id.unwrap_or_default();
                records.push((id, envelope.fields));
            }
        }
        Value::Object(map) => {
            for (key, item) in map {
                let Some(envelope) = decode_envelope::<F>(item, &key) else {
                    continue;
                };
                records.push((envelope.record_id.unwrap_or(key), envelope.fields));
            }
        }
        other => anyhow::bail!("expected a list of records, got {other}"),
    }

    Ok(records)
}

fn lenient_string(value: Option<Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s),
        Value::Number(n) => Some(n.to_string()),
        // lookup fields arrive as {"key": ..., "label": ...}
        Value::Object(map) => map.get("key").and_then(Value::as_str).map(str::to_string),
        _ => None,
    }
}

fn lenient_number(value: Option<Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn lenient_bool(value: Option<Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => b,
        Some(Value::String(s)) => matches!(s.as_str(), "true" | "1" | "yes"),
        Some(Value::Number(n)) => n.as_i64() == Some(1),
        _ => false,
    }
}

#[derive(Debug, Deserialize)]
struct CourseFields {
    #[serde(default, alias = "titel")]
    title: Option<Value>,
    #[serde(default, alias = "startdatum", alias = "startDate")]
    start_date: Option<Value>,
    #[serde(default, alias = "preis")]
    price: Option<Value>,
    #[serde(default)]
    status: Option<Value>,
}

impl CourseFields {
    fn into_course(self, id: String) -> Course {
        let status = lenient_string(self.status);
        Course {
            id,
            title: lenient_string(self.title),
            start_date: lenient_string(self.start_date),
            price: lenient_number(self.price),
            status: CourseStatus::parse(status.as_deref()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct PersonFields {
    #[serde(default)]
    name: Option<Value>,
    #[serde(default)]
    email: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct RoomFields {
    #[serde(default, alias = "raumname")]
    name: Option<Value>,
    #[serde(default, alias = "kapazitaet")]
    capacity: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct RegistrationFields {
    #[serde(default, alias = "teilnehmer", alias = "participant")]
    participant_ref: Option<Value>,
    #[serde(default, alias = "kurs", alias = "course")]
    course_ref: Option<Value>,
    #[serde(default, alias = "bezahlt")]
    paid: Option<Value>,
}

#[async_trait]
impl DataService for ApiClient {
    async fn fetch_courses(&self) -> anyhow::Result<Vec<Course>> {
        let body = self.fetch_records(Collection::Courses).await?;
        Ok(decode_records::<CourseFields>(body)?
            .into_iter()
            .map(|(id, fields)| fields.into_course(id))
            .collect())
    }

    async fn fetch_instructors(&self) -> anyhow::Result<Vec<Instructor>> {
        let body = self.fetch_records(Collection::Instructors).await?;
        Ok(decode_records::<PersonFields>(body)?
            .into_iter()
            .map(|(id, fields)| Instructor {
                id,
                name: lenient_string(fields.name),
            })
            .collect())
    }

    async fn fetch_participants(&self) -> anyhow::Result<Vec<Participant>> {
        let body = self.fetch_records(Collection::Participants).await?;
        Ok(decode_records::<PersonFields>(body)?
            .into_iter()
            .map(|(id, fields)| Participant {
                id,
                name: lenient_string(fields.name),
                email: lenient_string(fields.email),
            })
            .collect())
    }

    async fn fetch_rooms(&self) -> anyhow::Result<Vec<Room>> {
        let body = self.fetch_records(Collection::Rooms).await?;
        Ok(decode_records::<RoomFields>(body)?
            .into_iter()
            .map(|(id, fields)| Room {
                id,
                name: lenient_string(fields.name),
                capacity: lenient_number(fields.capacity).map(|c| c as i32),
            })
            .collect())
    }

    async fn fetch_registrations(&self) -> anyhow::Result<Vec<Registration>> {
        let body = self.fetch_records(Collection::Registrations).await?;
        Ok(decode_records::<RegistrationFields>(body)?
            .into_iter()
            .map(|(id, fields)| Registration {
                id,
                participant_ref: lenient_string(fields.participant_ref),
                course_ref: lenient_string(fields.course_ref),
                paid: lenient_bool(fields.paid),
            })
            .collect())
    }
}
