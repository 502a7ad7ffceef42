use std::collections::HashSet;
use std::fmt;

use serde::{Serialize, Serializer};

use crate::error::{MilvusError, Result};
use crate::models::{DataType, MetricType};

const MAX_NAME_LENGTH: usize = 255;

/// Field params with a typed slot in `FieldParams`
const RESERVED_PARAMS: [&str; 2] = ["dim", "metric_type"];

/// Check a collection or field name: an ASCII letter or `_` first, then
/// ASCII alphanumerics or `_`.
pub(crate) fn validate_name(kind: &str, name: &str) -> Result<()> {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return Err(MilvusError::invalid_argument(format!("{} name must not be empty", kind)));
    };
    if name.len() > MAX_NAME_LENGTH {
        return Err(MilvusError::invalid_argument(format!(
            "{} name exceeds {} bytes: {}",
            kind, MAX_NAME_LENGTH, name
        )));
    }
    if !(first.is_ascii_alphabetic() || first == '_') {
        return Err(MilvusError::invalid_argument(format!(
            "{} name must start with a letter or underscore: {}",
            kind, name
        )));
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(MilvusError::invalid_argument(format!(
            "{} name may only contain letters, digits and underscores: {}",
            kind, name
        )));
    }
    Ok(())
}

/// Index attached to a field at collection creation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub index_type: String,
    /// Free-form index parameters, e.g. `{"nlist": 1024}`
    pub params: serde_json::Map<String, serde_json::Value>,
}

/// Field parameters; vector fields carry `dim`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FieldParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dim: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metric_type: Option<MetricType>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl FieldParams {
    fn is_empty(&self) -> bool {
        self.dim.is_none() && self.metric_type.is_none() && self.extra.is_empty()
    }
}

/// One field of a collection schema
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSchema {
    #[serde(rename = "field")]
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: DataType,
    #[serde(skip_serializing_if = "FieldParams::is_empty")]
    pub params: FieldParams,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<IndexSpec>,
}

impl FieldSchema {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            params: FieldParams::default(),
            index: None,
        }
    }

    /// Vector field with the given dimensionality
    pub fn vector(name: impl Into<String>, data_type: DataType, dim: u32) -> Self {
        let mut field = Self::new(name, data_type);
        field.params.dim = Some(dim);
        field
    }

    pub fn with_metric(mut self, metric_type: MetricType) -> Self {
        self.params.metric_type = Some(metric_type);
        self
    }

    /// Set a field parameter. `dim` and `metric_type` go to their typed slots;
    /// a value that does not fit is kept in `extra` and rejected at validation.
    pub fn with_param(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        let key = key.into();
        match key.as_str() {
            "dim" => {
                if let Some(dim) = value.as_u64().and_then(|d| u32::try_from(d).ok()) {
                    self.params.dim = Some(dim);
                    self.params.extra.remove("dim");
                    return self;
                }
            }
            "metric_type" => {
                if let Ok(metric) = serde_json::from_value::<MetricType>(value.clone()) {
                    self.params.metric_type = Some(metric);
                    self.params.extra.remove("metric_type");
                    return self;
                }
            }
            _ => {}
        }
        self.params.extra.insert(key, value);
        self
    }

    pub fn with_index(mut self, index: IndexSpec) -> Self {
        self.index = Some(index);
        self
    }

    fn validate(&self) -> Result<()> {
        validate_name("field", &self.name)?;

        for key in RESERVED_PARAMS {
            if let Some(value) = self.params.extra.get(key) {
                return Err(MilvusError::invalid_argument(format!(
                    "field {} has an invalid {} param: {}",
                    self.name, key, value
                )));
            }
        }

        if self.data_type.is_vector() {
            let dim = match self.params.dim {
                Some(dim) if dim > 0 => dim,
                Some(_) => {
                    return Err(MilvusError::invalid_argument(format!(
                        "vector field {} must have a positive dim",
                        self.name
                    )));
                }
                None => {
                    return Err(MilvusError::invalid_argument(format!(
                        "vector field {} is missing dim in params",
                        self.name
                    )));
                }
            };
            if self.data_type == DataType::BinaryVector && dim % 8 != 0 {
                return Err(MilvusError::invalid_argument(format!(
                    "binary vector field {} has dim {}, which is not a multiple of 8",
                    self.name, dim
                )));
            }
        }

        if let Some(metric) = self.params.metric_type {
            if !metric.supports(self.data_type) {
                return Err(MilvusError::invalid_argument(format!(
                    "metric {:?} cannot be used on field {} of type {:?}",
                    metric, self.name, self.data_type
                )));
            }
        }

        Ok(())
    }
}

/// Recognized collection options, rendered into the opaque JSON parameter string
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CollectionParams {
    /// Segment merge is triggered once more than this many rows are inserted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub segment_row_count: Option<u64>,
    /// Whether the server generates entity ids
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_id: Option<bool>,
}

impl CollectionParams {
    pub fn to_json(&self) -> Result<String> {
        if self.segment_row_count == Some(0) {
            return Err(MilvusError::invalid_argument(
                "segment_row_count must be positive",
            ));
        }
        Ok(serde_json::to_string(self)?)
    }
}

/// Input for [`CollectionMapping::new`]
#[derive(Debug, Clone, Default)]
pub struct CollectionMappingConfig {
    pub collection_name: String,
    pub fields: Vec<FieldSchema>,
    /// Extra parameters as an already-serialized JSON string, passed through untouched
    pub params_in_json: Option<String>,
}

/// Schema and creation parameters of a collection
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionMapping {
    collection_name: String,
    fields: Vec<FieldSchema>,
    params_in_json: Option<String>,
}

impl CollectionMapping {
    pub fn new(config: CollectionMappingConfig) -> Result<Self> {
        validate_name("collection", &config.collection_name)?;

        if config.fields.is_empty() {
            return Err(MilvusError::invalid_argument(format!(
                "collection {} must declare at least one field",
                config.collection_name
            )));
        }

        let mut seen = HashSet::with_capacity(config.fields.len());
        for field in &config.fields {
            field.validate()?;
            if !seen.insert(field.name.as_str()) {
                return Err(MilvusError::invalid_argument(format!(
                    "duplicate field name: {}",
                    field.name
                )));
            }
        }

        Ok(Self {
            collection_name: config.collection_name,
            fields: config.fields,
            params_in_json: config.params_in_json,
        })
    }

    pub fn collection_name(&self) -> &str {
        &self.collection_name
    }

    pub fn fields(&self) -> &[FieldSchema] {
        &self.fields
    }

    pub fn params_in_json(&self) -> Option<&str> {
        self.params_in_json.as_deref()
    }

    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.name == name)
    }
}

impl fmt::Display for CollectionMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CollectionMapping = {{collection_name = {}, fields = {:?}, params = {}}}",
            self.collection_name,
            self.fields,
            self.params_in_json.as_deref().unwrap_or("")
        )
    }
}

#[derive(Serialize)]
struct KeyValuePair<'a> {
    key: &'a str,
    value: &'a str,
}

#[derive(Serialize)]
struct CreateCollectionBody<'a> {
    collection_name: &'a str,
    fields: &'a [FieldSchema],
    #[serde(skip_serializing_if = "Vec::is_empty")]
    extra_params: Vec<KeyValuePair<'a>>,
}

impl Serialize for CollectionMapping {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let extra_params = self
            .params_in_json
            .as_deref()
            .map(|value| KeyValuePair { key: "params", value })
            .into_iter()
            .collect();
        CreateCollectionBody {
            collection_name: &self.collection_name,
            fields: &self.fields,
            extra_params,
        }
        .serialize(serializer)
    }
}
