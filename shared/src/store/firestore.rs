use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::sync::Mutex;
use tracing::debug;

use crate::credentials::ServiceAccountKey;
use crate::error::StoreError;
use crate::store::DocumentStore;

const FIRESTORE_BASE_URL: &str = "https://firestore.googleapis.com/v1";
const FIRESTORE_SCOPE: &str = "https://www.googleapis.com/auth/datastore";
const LIST_PAGE_SIZE: u32 = 300;

/// Cloud Firestore backend over the v1 REST API.
///
/// One instance is constructed at startup from the service account key and
/// shared for the life of the process. The access token is cached and
/// re-minted when it is within five minutes of expiry.
pub struct FirestoreStore {
    client: Client,
    key: ServiceAccountKey,
    base_url: String,
    token: Mutex<Option<CachedToken>>,
}

struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at - Duration::seconds(300)
    }
}

#[derive(Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

impl FirestoreStore {
    pub fn new(key: ServiceAccountKey) -> Self {
        let base_url = format!(
            "{}/projects/{}/databases/(default)/documents",
            FIRESTORE_BASE_URL, key.project_id
        );
        Self {
            client: Client::new(),
            key,
            base_url,
            token: Mutex::new(None),
        }
    }

    fn document_url(&self, collection: &str, id: &str) -> String {
        format!("{}/{}/{}", self.base_url, collection, id)
    }

    async fn bearer_token(&self) -> Result<String, StoreError> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if !token.is_expired() {
                return Ok(token.access_token.clone());
            }
        }

        debug!("Minting new Firestore access token");
        let token = self.exchange_token().await?;
        let access_token = token.access_token.clone();
        *cached = Some(token);
        Ok(access_token)
    }

    async fn exchange_token(&self) -> Result<CachedToken, StoreError> {
        let now = Utc::now();
        let claims = Claims {
            iss: &self.key.client_email,
            scope: FIRESTORE_SCOPE,
            aud: &self.key.token_uri,
            iat: now.timestamp(),
            exp: (now + Duration::seconds(3600)).timestamp(),
        };

        let encoding_key = EncodingKey::from_rsa_pem(self.key.private_key.as_bytes())
            .map_err(|e| StoreError::Auth(format!("invalid private key: {}", e)))?;
        let assertion = encode(&Header::new(Algorithm::RS256), &claims, &encoding_key)
            .map_err(|e| StoreError::Auth(format!("failed to sign token assertion: {}", e)))?;

        let params = [
            ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
            ("assertion", assertion.as_str()),
        ];

        let response = self
            .client
            .post(&self.key.token_uri)
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Auth(format!(
                "token endpoint rejected request: {}",
                body
            )));
        }

        let token: TokenResponse = response.json().await?;
        Ok(CachedToken {
            access_token: token.access_token,
            expires_at: now + Duration::seconds(token.expires_in),
        })
    }
}

async fn check(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        let body = response.text().await.unwrap_or_default();
        Err(StoreError::Backend {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        let token = self.bearer_token().await?;
        let response = self
            .client
            .get(self.document_url(collection, id))
            .bearer_auth(&token)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let document: Value = check(response).await?.json().await?;
        Ok(Some(decode_document(&document)))
    }

    async fn set(&self, collection: &str, id: &str, data: Value) -> Result<(), StoreError> {
        let token = self.bearer_token().await?;
        // PATCH on a full document path is Firestore's create-or-replace.
        let response = self
            .client
            .patch(self.document_url(collection, id))
            .bearer_auth(&token)
            .json(&encode_document(&data)?)
            .send()
            .await?;

        check(response).await?;
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let token = self.bearer_token().await?;
        // Firestore reports success whether or not the document existed.
        let response = self
            .client
            .delete(self.document_url(collection, id))
            .bearer_auth(&token)
            .send()
            .await?;

        check(response).await?;
        Ok(())
    }

    async fn stream_all(&self, collection: &str) -> Result<Vec<Value>, StoreError> {
        let token = self.bearer_token().await?;
        let url = format!("{}/{}", self.base_url, collection);
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .client
                .get(&url)
                .bearer_auth(&token)
                .query(&[("pageSize", LIST_PAGE_SIZE.to_string())]);
            if let Some(ref next) = page_token {
                request = request.query(&[("pageToken", next)]);
            }

            let page: Value = check(request.send().await?).await?.json().await?;

            if let Some(items) = page.get("documents").and_then(Value::as_array) {
                documents.extend(items.iter().map(decode_document));
            }

            match page.get("nextPageToken").and_then(Value::as_str) {
                Some(next) => page_token = Some(next.to_string()),
                None => break,
            }
        }

        debug!(
            "Fetched {} document(s) from collection {}",
            documents.len(),
            collection
        );
        Ok(documents)
    }
}

fn encode_document(data: &Value) -> Result<Value, StoreError> {
    match data {
        Value::Object(map) => Ok(json!({ "fields": encode_fields(map) })),
        _ => Err(StoreError::Codec(
            "document body must be a JSON object".to_string(),
        )),
    }
}

fn encode_fields(map: &Map<String, Value>) -> Value {
    Value::Object(
        map.iter()
            .map(|(name, value)| (name.clone(), encode_value(value)))
            .collect(),
    )
}

fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        // Firestore transports 64-bit integers as decimal strings.
        Value::Number(n) => match n.as_i64() {
            Some(i) => json!({ "integerValue": i.to_string() }),
            None => json!({ "doubleValue": n.as_f64() }),
        },
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => json!({
            "arrayValue": { "values": items.iter().map(encode_value).collect::<Vec<_>>() }
        }),
        Value::Object(map) => json!({ "mapValue": { "fields": encode_fields(map) } }),
    }
}

fn decode_document(document: &Value) -> Value {
    document
        .get("fields")
        .and_then(Value::as_object)
        .map(decode_fields)
        .unwrap_or_else(|| Value::Object(Map::new()))
}

fn decode_fields(fields: &Map<String, Value>) -> Value {
    Value::Object(
        fields
            .iter()
            .map(|(name, value)| (name.clone(), decode_value(value)))
            .collect(),
    )
}

fn decode_value(value: &Value) -> Value {
    let Some((kind, inner)) = value.as_object().and_then(|map| map.iter().next()) else {
        return Value::Null;
    };

    match kind.as_str() {
        "nullValue" => Value::Null,
        "booleanValue" | "doubleValue" => inner.clone(),
        "integerValue" => inner
            .as_str()
            .and_then(|s| s.parse::<i64>().ok())
            .map(Value::from)
            .unwrap_or_else(|| inner.clone()),
        "stringValue" | "timestampValue" | "referenceValue" => inner.clone(),
        "arrayValue" => Value::Array(
            inner
                .get("values")
                .and_then(Value::as_array)
                .map(|items| items.iter().map(decode_value).collect())
                .unwrap_or_default(),
        ),
        "mapValue" => inner
            .get("fields")
            .and_then(Value::as_object)
            .map(decode_fields)
            .unwrap_or_else(|| Value::Object(Map::new())),
        _ => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_document_to_firestore_fields() {
        let doc = json!({
            "id": 7,
            "model": "Panda",
            "available": true,
            "extras": ["gps", "tow bar"],
            "engine": { "kw": 51.5 }
        });

        let encoded = encode_document(&doc).unwrap();
        let fields = &encoded["fields"];

        assert_eq!(fields["id"], json!({ "integerValue": "7" }));
        assert_eq!(fields["model"], json!({ "stringValue": "Panda" }));
        assert_eq!(fields["available"], json!({ "booleanValue": true }));
        assert_eq!(
            fields["extras"],
            json!({ "arrayValue": { "values": [
                { "stringValue": "gps" },
                { "stringValue": "tow bar" }
            ]}})
        );
        assert_eq!(
            fields["engine"],
            json!({ "mapValue": { "fields": { "kw": { "doubleValue": 51.5 } } } })
        );
    }

    #[test]
    fn decodes_firestore_document_back_to_plain_json() {
        let wire = json!({
            "name": "projects/p/databases/(default)/documents/auto/7",
            "fields": {
                "id": { "integerValue": "7" },
                "model": { "stringValue": "Panda" },
                "previous_owner": { "nullValue": null },
                "extras": { "arrayValue": { "values": [{ "stringValue": "gps" }] } },
                "engine": { "mapValue": { "fields": { "kw": { "doubleValue": 51.5 } } } }
            },
            "createTime": "2024-01-01T00:00:00Z",
            "updateTime": "2024-01-01T00:00:00Z"
        });

        let decoded = decode_document(&wire);
        assert_eq!(
            decoded,
            json!({
                "id": 7,
                "model": "Panda",
                "previous_owner": null,
                "extras": ["gps"],
                "engine": { "kw": 51.5 }
            })
        );
    }

    #[test]
    fn document_without_fields_decodes_to_empty_object() {
        let wire = json!({ "name": "projects/p/databases/(default)/documents/auto/7" });
        assert_eq!(decode_document(&wire), json!({}));
    }

    #[test]
    fn rejects_non_object_document_body() {
        let err = encode_document(&json!([1, 2, 3])).unwrap_err();
        assert!(matches!(err, StoreError::Codec(_)));
    }
}
