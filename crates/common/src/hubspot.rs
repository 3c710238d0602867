//! HubSpot contacts client.
//!
//! Translates a [`Contact`] into the property-list payload and extracts the
//! created record's identifier from the response.

use std::fmt;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::http::{build_client, ensure_success, trim_base_url};
use crate::types::Contact;
use crate::CoreError;

pub const CONTACTS_PATH: &str = "/crm/v3/objects/contacts";

/// Property names in the order they are sent.
pub const CONTACT_PROPERTIES: [&str; 6] =
    ["email", "firstname", "lastname", "phone", "website", "estado_clickup"];

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct PropertyValue {
    pub property: &'static str,
    pub value: Value,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ContactPayload {
    pub properties: Vec<PropertyValue>,
}

/// Absent optional fields are sent as explicit `null` values.
pub fn contact_payload(contact: &Contact) -> ContactPayload {
    let values = [
        Value::from(contact.email.clone()),
        Value::from(contact.firstname.clone()),
        Value::from(contact.lastname.clone()),
        contact.phone.clone().map_or(Value::Null, Value::from),
        contact.website.clone().map_or(Value::Null, Value::from),
        Value::from(contact.task_synced),
    ];
    let properties = CONTACT_PROPERTIES
        .into_iter()
        .zip(values)
        .map(|(property, value)| PropertyValue { property, value })
        .collect();
    ContactPayload { properties }
}

/// Read the record id from a create response: `id` (v3), falling back to `vid` (legacy).
pub fn extract_record_id(body: &Value) -> Result<String, CoreError> {
    ["id", "vid"]
        .iter()
        .find_map(|key| match body.get(*key) {
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        })
        .ok_or_else(|| CoreError::Parse("hubspot response carries no record id".into()))
}

#[derive(Clone)]
pub struct HubSpotClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl fmt::Debug for HubSpotClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HubSpotClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"***")
            .finish()
    }
}

impl HubSpotClient {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self, CoreError> {
        Ok(Self {
            http: build_client(timeout)?,
            base_url: trim_base_url(base_url),
            api_key: api_key.to_string(),
        })
    }

    pub fn contacts_url(&self) -> String {
        format!("{}{}", self.base_url, CONTACTS_PATH)
    }

    /// Create one CRM contact and return its identifier. Never deduplicates.
    #[instrument(skip(self, contact), fields(email = %contact.email))]
    pub async fn create_contact(&self, contact: &Contact) -> Result<String, CoreError> {
        let resp = self
            .http
            .post(self.contacts_url())
            .bearer_auth(&self.api_key)
            .json(&contact_payload(contact))
            .send()
            .await?;
        let resp = ensure_success(resp).await?;
        let body = resp.json::<Value>().await?;
        let id = extract_record_id(&body)?;
        debug!(record_id = %id, "hubspot contact created");
        Ok(id)
    }
}
