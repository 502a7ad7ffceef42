use std::collections::HashSet;

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::error::{MilvusError, Result};
use crate::mapping::validate_name;
use crate::models::{DataType, FieldValues};

/// Column of data to insert for one field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldData {
    pub name: String,
    pub values: FieldValues,
}

impl FieldData {
    pub fn new(name: impl Into<String>, values: impl Into<FieldValues>) -> Self {
        Self {
            name: name.into(),
            values: values.into(),
        }
    }

    pub fn data_type(&self) -> DataType {
        self.values.data_type()
    }
}

impl Serialize for FieldData {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("FieldData", 3)?;
        state.serialize_field("field", &self.name)?;
        state.serialize_field("type", &self.values.data_type())?;
        state.serialize_field("values", &self.values)?;
        state.end()
    }
}

/// Input for [`InsertParam::new`]
#[derive(Debug, Clone, Default)]
pub struct InsertConfig {
    pub collection_name: String,
    pub fields: Vec<FieldData>,
    /// Only needed when the collection was created without auto-generated ids
    pub entity_ids: Vec<i64>,
    /// Empty means the default partition
    pub partition_tag: String,
}

impl InsertConfig {
    pub fn new(collection_name: impl Into<String>, fields: Vec<FieldData>) -> Self {
        Self {
            collection_name: collection_name.into(),
            fields,
            ..Default::default()
        }
    }
}

/// A validated batch-insert request
#[derive(Debug, Clone, PartialEq)]
pub struct InsertParam {
    collection_name: String,
    fields: Vec<FieldData>,
    entity_ids: Vec<i64>,
    partition_tag: String,
    entity_count: usize,
}

impl InsertParam {
    /// Validate the batch shape. Length mismatches fail here, before any
    /// request reaches the server.
    pub fn new(config: InsertConfig) -> Result<Self> {
        validate_name("collection", &config.collection_name)?;

        let Some(first) = config.fields.first() else {
            return Err(MilvusError::invalid_argument(
                "insert requires at least one field",
            ));
        };
        let entity_count = first.values.len();
        if entity_count == 0 {
            return Err(MilvusError::invalid_argument(format!(
                "field {} has no values",
                first.name
            )));
        }

        let mut seen = HashSet::with_capacity(config.fields.len());
        for field in &config.fields {
            validate_name("field", &field.name)?;
            if !seen.insert(field.name.as_str()) {
                return Err(MilvusError::invalid_argument(format!(
                    "duplicate field name: {}",
                    field.name
                )));
            }
            if field.values.len() != entity_count {
                return Err(MilvusError::invalid_argument(format!(
                    "field {} has {} values, expected {}",
                    field.name,
                    field.values.len(),
                    entity_count
                )));
            }
            field.values.vector_dim().map_err(|e| match e {
                MilvusError::InvalidArgument(msg) => {
                    MilvusError::invalid_argument(format!("field {}: {}", field.name, msg))
                }
                other => other,
            })?;
        }

        if !config.entity_ids.is_empty() && config.entity_ids.len() != entity_count {
            return Err(MilvusError::invalid_argument(format!(
                "{} entity ids supplied for {} entities",
                config.entity_ids.len(),
                entity_count
            )));
        }

        Ok(Self {
            collection_name: config.collection_name,
            fields: config.fields,
            entity_ids: config.entity_ids,
            partition_tag: config.partition_tag,
            entity_count,
        })
    }

    pub fn collection_name(&self) -> &str {
        &self.collection_name
    }

    pub fn fields(&self) -> &[FieldData] {
        &self.fields
    }

    pub fn entity_ids(&self) -> &[i64] {
        &self.entity_ids
    }

    pub fn partition_tag(&self) -> &str {
        &self.partition_tag
    }

    /// Number of entities in the batch
    pub fn entity_count(&self) -> usize {
        self.entity_count
    }
}

#[derive(Serialize)]
struct InsertBody<'a> {
    collection_name: &'a str,
    fields: &'a [FieldData],
    entity_id_array: &'a [i64],
    partition_tag: &'a str,
}

impl Serialize for InsertParam {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        InsertBody {
            collection_name: &self.collection_name,
            fields: &self.fields,
            entity_id_array: &self.entity_ids,
            partition_tag: &self.partition_tag,
        }
        .serialize(serializer)
    }
}
