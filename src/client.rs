use crate::config::ClientConfig;
use crate::entity::{EntitiesReply, GetEntityByIdResponse};
use crate::error::{MilvusError, Result};
use crate::insert::InsertParam;
use crate::mapping::{validate_name, CollectionMapping};
use crate::models::{Response, StatusReply};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;
use url::Url;

#[derive(Debug, Deserialize)]
struct StatusEnvelope {
    status: StatusReply,
}

#[derive(Debug, Deserialize)]
struct InsertReply {
    status: StatusReply,
    #[serde(default)]
    entity_id_array: Vec<i64>,
}

/// HTTP client that sends collection, insert and lookup descriptors to a Milvus server
#[derive(Debug, Clone)]
pub struct MilvusClient {
    client: Client,
    base_url: Url,
}

impl MilvusClient {
    /// Create a new client with the default timeout
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, ClientConfig::default().timeout())
    }

    /// Create a new client with custom timeout
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)?;
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self { client, base_url })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Self::with_timeout(&config.base_url, config.timeout())
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    fn collections_url(&self) -> Result<Url> {
        Ok(self.base_url.join("collections")?)
    }

    fn entities_url(&self, collection_name: &str) -> Result<Url> {
        Ok(self
            .base_url
            .join(&format!("collections/{}/entities", collection_name))?)
    }

    /// Create a collection from its mapping
    pub async fn create_collection(&self, mapping: &CollectionMapping) -> Result<()> {
        debug!(
            collection = mapping.collection_name(),
            fields = mapping.fields().len(),
            "creating collection"
        );
        let url = self.collections_url()?;
        let response = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .json(mapping)
            .send()
            .await?;

        let reply: StatusEnvelope = self.handle_response(response).await?;
        Response::from(reply.status).into_result()
    }

    /// Insert a batch of entities, returning the ids assigned by the server
    pub async fn insert(&self, param: &InsertParam) -> Result<Vec<i64>> {
        debug!(
            collection = param.collection_name(),
            partition = param.partition_tag(),
            entities = param.entity_count(),
            "inserting entities"
        );
        let url = self.entities_url(param.collection_name())?;
        let response = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .json(param)
            .send()
            .await?;

        let reply: InsertReply = self.handle_response(response).await?;
        inserted_ids(reply, param.entity_count())
    }

    /// Look up entities by id.
    ///
    /// A non-success server status is reported through the returned
    /// response, not as an error.
    pub async fn get_entity_by_id(
        &self,
        collection_name: &str,
        ids: &[i64],
    ) -> Result<GetEntityByIdResponse> {
        validate_name("collection", collection_name)?;
        if ids.is_empty() {
            return Err(MilvusError::invalid_argument("ids must not be empty"));
        }
        debug!(collection = collection_name, ids = ids.len(), "getting entities by id");

        let url = self.entities_url(collection_name)?;
        let response = self
            .client
            .get(url)
            .query(&[("ids", join_ids(ids))])
            .send()
            .await?;

        let reply: EntitiesReply = self.handle_response(response).await?;
        GetEntityByIdResponse::decode(ids, reply)
    }

    /// Handle JSON response
    async fn handle_response<T>(&self, response: reqwest::Response) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            parse_reply(&text)
        } else {
            Err(self.parse_error_response(status.as_u16(), &text))
        }
    }

    /// Parse error response
    fn parse_error_response(&self, status: u16, text: &str) -> MilvusError {
        // Prefer the server's own status block when the body carries one
        if let Ok(envelope) = serde_json::from_str::<StatusEnvelope>(text) {
            let response = Response::from(envelope.status);
            if !response.ok() {
                return MilvusError::from_status(response.status(), response.message().to_string());
            }
        }

        MilvusError::from_http_status(status, text.to_string())
    }
}

fn parse_reply<T>(text: &str) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    serde_json::from_str(text).map_err(|e| {
        MilvusError::InvalidResponse(format!("Failed to parse response: {} - {}", e, text))
    })
}

/// Check the insert status and that one id came back per entity sent.
fn inserted_ids(reply: InsertReply, entity_count: usize) -> Result<Vec<i64>> {
    Response::from(reply.status).into_result()?;

    if reply.entity_id_array.len() != entity_count {
        return Err(MilvusError::invalid_response(format!(
            "server returned {} ids for {} entities",
            reply.entity_id_array.len(),
            entity_count
        )));
    }
    Ok(reply.entity_id_array)
}

fn join_ids(ids: &[i64]) -> String {
    ids.iter()
        .map(i64::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Status;

    #[test]
    fn test_client_creation() {
        let client = MilvusClient::new("http://localhost:19121").unwrap();
        assert_eq!(client.base_url(), "http://localhost:19121/");
    }

    #[test]
    fn test_client_creation_with_invalid_url() {
        let result = MilvusClient::new("invalid-url");
        assert!(matches!(result, Err(MilvusError::Url(_))));
    }

    #[test]
    fn test_client_from_config() {
        let config = ClientConfig {
            base_url: "http://milvus:19121".to_string(),
            timeout_secs: 5,
        };
        let client = MilvusClient::from_config(&config).unwrap();
        assert_eq!(client.base_url(), "http://milvus:19121/");
    }

    #[test]
    fn test_collections_url() {
        let client = MilvusClient::new("http://localhost:19121").unwrap();
        let url = client.collections_url().unwrap();
        assert_eq!(url.as_str(), "http://localhost:19121/collections");
    }

    #[test]
    fn test_entities_url() {
        let client = MilvusClient::new("http://localhost:19121").unwrap();
        let url = client.entities_url("films").unwrap();
        assert_eq!(url.as_str(), "http://localhost:19121/collections/films/entities");
    }

    #[test]
    fn test_join_ids() {
        assert_eq!(join_ids(&[1, 2, 3]), "1,2,3");
        assert_eq!(join_ids(&[-7]), "-7");
    }

    #[test]
    fn test_parse_error_response_prefers_server_status() {
        let client = MilvusClient::new("http://localhost:19121").unwrap();
        let err = client.parse_error_response(
            400,
            r#"{"status": {"error_code": 9, "reason": "bad name"}}"#,
        );
        assert!(matches!(
            err,
            MilvusError::Server { status: Status::IllegalCollectionName, .. }
        ));

        let err = client.parse_error_response(502, "bad gateway");
        assert!(matches!(err, MilvusError::HttpStatus { status: 502, .. }));
    }

    #[test]
    fn test_inserted_ids_match_entity_count() {
        let reply: InsertReply = parse_reply(
            r#"{"status": {"error_code": 0, "reason": ""}, "entity_id_array": [11, 12]}"#,
        )
        .unwrap();
        assert_eq!(inserted_ids(reply, 2).unwrap(), vec![11, 12]);

        let short: InsertReply = parse_reply(
            r#"{"status": {"error_code": 0, "reason": ""}, "entity_id_array": [11]}"#,
        )
        .unwrap();
        assert!(matches!(inserted_ids(short, 2), Err(MilvusError::InvalidResponse(_))));
    }

    #[test]
    fn test_inserted_ids_surface_server_status() {
        let reply: InsertReply = parse_reply(
            r#"{"status": {"error_code": 4, "reason": "no collection"}, "entity_id_array": []}"#,
        )
        .unwrap();
        match inserted_ids(reply, 1) {
            Err(MilvusError::Server { status, message }) => {
                assert_eq!(status, Status::CollectionNotExists);
                assert_eq!(message, "no collection");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_reply_without_status_is_invalid() {
        let result = parse_reply::<InsertReply>(r#"{"entity_id_array": [1]}"#);
        assert!(matches!(result, Err(MilvusError::InvalidResponse(_))));

        let result = parse_reply::<EntitiesReply>("{}");
        assert!(matches!(result, Err(MilvusError::InvalidResponse(_))));
    }

    #[test]
    fn test_lookup_reply_status_reaches_response() {
        let reply: EntitiesReply = parse_reply(
            r#"{"status": {"error_code": 1, "reason": "boom"}, "ids": [1], "valid_row": [true]}"#,
        )
        .unwrap();
        let response = GetEntityByIdResponse::decode(&[1], reply).unwrap();
        assert!(!response.ok());
        assert_eq!(response.response().status(), Status::UnexpectedError);
        assert_eq!(response.response().message(), "boom");
        assert!(response.valid_ids().is_empty());

        let reply: EntitiesReply = parse_reply(
            r#"{"status": {"error_code": 0, "reason": ""}, "ids": [1, 2, 3],
                "valid_row": [false, true, false],
                "fields": [{"field_name": "A", "type": "INT64", "values": [20]}]}"#,
        )
        .unwrap();
        let response = GetEntityByIdResponse::decode(&[1, 2, 3], reply).unwrap();
        assert!(response.ok());
        assert_eq!(response.valid_ids(), &[2]);
        assert_eq!(response.fields_map().len(), 1);
    }

    #[tokio::test]
    async fn test_get_entity_by_id_rejects_bad_input_before_sending() {
        let client = MilvusClient::new("http://localhost:19121").unwrap();
        let result = client.get_entity_by_id("films", &[]).await;
        assert!(matches!(result, Err(MilvusError::InvalidArgument(_))));

        let result = client.get_entity_by_id("", &[1]).await;
        assert!(matches!(result, Err(MilvusError::InvalidArgument(_))));
    }
}
