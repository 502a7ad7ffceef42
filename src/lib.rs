//! Typed collection, insert and lookup descriptors for the Milvus vector
//! database, plus a thin HTTP client that sends them.

pub mod client;
pub mod config;
pub mod entity;
pub mod error;
pub mod insert;
pub mod mapping;
pub mod models;

pub use client::MilvusClient;
pub use config::ClientConfig;
pub use entity::{EntitiesReply, FieldColumnReply, GetEntityByIdResponse};
pub use error::{MilvusError, Result};
pub use insert::{FieldData, InsertConfig, InsertParam};
pub use mapping::{
    CollectionMapping, CollectionMappingConfig, CollectionParams, FieldParams, FieldSchema,
    IndexSpec,
};
pub use models::*;

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_descriptors_are_shareable() {
        assert_send_sync::<CollectionMapping>();
        assert_send_sync::<InsertParam>();
        assert_send_sync::<GetEntityByIdResponse>();
        assert_send_sync::<MilvusClient>();
    }

    #[test]
    fn test_mapping_and_insert_agree_on_field_kinds() {
        let mapping = CollectionMapping::new(CollectionMappingConfig {
            collection_name: "films".to_string(),
            fields: vec![
                FieldSchema::new("year", DataType::Int32),
                FieldSchema::vector("embedding", DataType::FloatVector, 2).with_metric(MetricType::L2),
            ],
            params_in_json: Some(
                CollectionParams {
                    segment_row_count: Some(4096),
                    auto_id: Some(false),
                }
                .to_json()
                .unwrap(),
            ),
        })
        .unwrap();

        let insert = InsertParam::new(InsertConfig {
            collection_name: mapping.collection_name().to_string(),
            fields: vec![
                FieldData::new("year", vec![1999i32, 2004]),
                FieldData::new("embedding", vec![vec![0.1f32, 0.9], vec![0.7, 0.3]]),
            ],
            entity_ids: vec![1, 2],
            ..Default::default()
        })
        .unwrap();

        for column in insert.fields() {
            let schema = mapping.field(&column.name).unwrap();
            assert_eq!(schema.data_type, column.data_type());
        }
    }
}
