use serde::{Deserialize, Serialize};

use crate::error::{MilvusError, Result};

/// Data kind of a collection field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataType {
    Int32,
    Int64,
    /// 32-bit float
    Float,
    /// 64-bit float
    Double,
    FloatVector,
    BinaryVector,
}

impl DataType {
    pub fn is_vector(&self) -> bool {
        matches!(self, DataType::FloatVector | DataType::BinaryVector)
    }
}

/// Distance metric for vector fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MetricType {
    L2,
    Ip,
    Hamming,
    Jaccard,
    Tanimoto,
    Substructure,
    Superstructure,
}

impl MetricType {
    /// Whether the metric can be used on a vector field of the given kind.
    pub fn supports(&self, data_type: DataType) -> bool {
        match self {
            MetricType::L2 | MetricType::Ip => data_type == DataType::FloatVector,
            _ => data_type == DataType::BinaryVector,
        }
    }
}

/// A single field value of one entity
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Int32(i32),
    Int64(i64),
    Float(f32),
    Double(f64),
    FloatVector(Vec<f32>),
    BinaryVector(Vec<u8>),
}

impl FieldValue {
    pub fn data_type(&self) -> DataType {
        match self {
            FieldValue::Int32(_) => DataType::Int32,
            FieldValue::Int64(_) => DataType::Int64,
            FieldValue::Float(_) => DataType::Float,
            FieldValue::Double(_) => DataType::Double,
            FieldValue::FloatVector(_) => DataType::FloatVector,
            FieldValue::BinaryVector(_) => DataType::BinaryVector,
        }
    }
}

/// Column of values for one field, one entry per entity.
///
/// The data kind is carried by the variant, so a column can never disagree
/// with the type it is sent as.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValues {
    Int32(Vec<i32>),
    Int64(Vec<i64>),
    Float(Vec<f32>),
    Double(Vec<f64>),
    FloatVector(Vec<Vec<f32>>),
    BinaryVector(Vec<Vec<u8>>),
}

impl FieldValues {
    pub fn data_type(&self) -> DataType {
        match self {
            FieldValues::Int32(_) => DataType::Int32,
            FieldValues::Int64(_) => DataType::Int64,
            FieldValues::Float(_) => DataType::Float,
            FieldValues::Double(_) => DataType::Double,
            FieldValues::FloatVector(_) => DataType::FloatVector,
            FieldValues::BinaryVector(_) => DataType::BinaryVector,
        }
    }

    /// Number of entities in the column
    pub fn len(&self) -> usize {
        match self {
            FieldValues::Int32(v) => v.len(),
            FieldValues::Int64(v) => v.len(),
            FieldValues::Float(v) => v.len(),
            FieldValues::Double(v) => v.len(),
            FieldValues::FloatVector(v) => v.len(),
            FieldValues::BinaryVector(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Value of the entity at `index`, if any.
    pub fn get(&self, index: usize) -> Option<FieldValue> {
        match self {
            FieldValues::Int32(v) => v.get(index).copied().map(FieldValue::Int32),
            FieldValues::Int64(v) => v.get(index).copied().map(FieldValue::Int64),
            FieldValues::Float(v) => v.get(index).copied().map(FieldValue::Float),
            FieldValues::Double(v) => v.get(index).copied().map(FieldValue::Double),
            FieldValues::FloatVector(v) => v.get(index).cloned().map(FieldValue::FloatVector),
            FieldValues::BinaryVector(v) => v.get(index).cloned().map(FieldValue::BinaryVector),
        }
    }

    /// Dimension shared by every vector of a vector column.
    ///
    /// Returns `Ok(None)` for scalar or empty columns and an error when the
    /// vectors are ragged or zero-length.
    pub fn vector_dim(&self) -> Result<Option<usize>> {
        let lens: Vec<usize> = match self {
            FieldValues::FloatVector(v) => v.iter().map(Vec::len).collect(),
            FieldValues::BinaryVector(v) => v.iter().map(Vec::len).collect(),
            _ => return Ok(None),
        };
        let Some(&first) = lens.first() else {
            return Ok(None);
        };
        if first == 0 {
            return Err(MilvusError::invalid_argument("vectors must not be empty"));
        }
        if let Some(pos) = lens.iter().position(|&len| len != first) {
            return Err(MilvusError::invalid_argument(format!(
                "vector at row {} has length {}, expected {}",
                pos, lens[pos], first
            )));
        }
        Ok(Some(first))
    }

    /// Decode a JSON array into a column of the given kind.
    pub fn from_json(data_type: DataType, value: serde_json::Value) -> Result<Self> {
        let values = match data_type {
            DataType::Int32 => FieldValues::Int32(serde_json::from_value(value)?),
            DataType::Int64 => FieldValues::Int64(serde_json::from_value(value)?),
            DataType::Float => FieldValues::Float(serde_json::from_value(value)?),
            DataType::Double => FieldValues::Double(serde_json::from_value(value)?),
            DataType::FloatVector => FieldValues::FloatVector(serde_json::from_value(value)?),
            DataType::BinaryVector => FieldValues::BinaryVector(serde_json::from_value(value)?),
        };
        Ok(values)
    }
}

impl From<Vec<i32>> for FieldValues {
    fn from(values: Vec<i32>) -> Self {
        FieldValues::Int32(values)
    }
}

impl From<Vec<i64>> for FieldValues {
    fn from(values: Vec<i64>) -> Self {
        FieldValues::Int64(values)
    }
}

impl From<Vec<f32>> for FieldValues {
    fn from(values: Vec<f32>) -> Self {
        FieldValues::Float(values)
    }
}

impl From<Vec<f64>> for FieldValues {
    fn from(values: Vec<f64>) -> Self {
        FieldValues::Double(values)
    }
}

impl From<Vec<Vec<f32>>> for FieldValues {
    fn from(values: Vec<Vec<f32>>) -> Self {
        FieldValues::FloatVector(values)
    }
}

impl From<Vec<Vec<u8>>> for FieldValues {
    fn from(values: Vec<Vec<u8>>) -> Self {
        FieldValues::BinaryVector(values)
    }
}

/// Server status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Success,
    UnexpectedError,
    ConnectFailed,
    PermissionDenied,
    CollectionNotExists,
    IllegalArgument,
    IllegalRange,
    IllegalDimension,
    IllegalIndexType,
    IllegalCollectionName,
    IllegalTopk,
    IllegalRowRecord,
    IllegalVectorId,
    IllegalSearchResult,
    FileNotFound,
    MetaFailed,
    CacheFailed,
    CannotCreateFolder,
    CannotCreateFile,
    CannotDeleteFolder,
    CannotDeleteFile,
    BuildIndexError,
    IllegalNlist,
    IllegalMetricType,
    OutOfMemory,
    RpcError,
    ClientNotConnected,
    Unknown,
    VersionMismatch,
}

impl Status {
    const CODES: [(Status, i32); 29] = [
        (Status::Success, 0),
        (Status::UnexpectedError, 1),
        (Status::ConnectFailed, 2),
        (Status::PermissionDenied, 3),
        (Status::CollectionNotExists, 4),
        (Status::IllegalArgument, 5),
        (Status::IllegalRange, 6),
        (Status::IllegalDimension, 7),
        (Status::IllegalIndexType, 8),
        (Status::IllegalCollectionName, 9),
        (Status::IllegalTopk, 10),
        (Status::IllegalRowRecord, 11),
        (Status::IllegalVectorId, 12),
        (Status::IllegalSearchResult, 13),
        (Status::FileNotFound, 14),
        (Status::MetaFailed, 15),
        (Status::CacheFailed, 16),
        (Status::CannotCreateFolder, 17),
        (Status::CannotCreateFile, 18),
        (Status::CannotDeleteFolder, 19),
        (Status::CannotDeleteFile, 20),
        (Status::BuildIndexError, 21),
        (Status::IllegalNlist, 22),
        (Status::IllegalMetricType, 23),
        (Status::OutOfMemory, 24),
        (Status::RpcError, -1),
        (Status::ClientNotConnected, -2),
        (Status::Unknown, -3),
        (Status::VersionMismatch, -4),
    ];

    /// Unrecognized codes map to `Status::Unknown`.
    pub fn from_code(code: i32) -> Self {
        Self::CODES
            .iter()
            .find(|(_, c)| *c == code)
            .map(|(status, _)| *status)
            .unwrap_or(Status::Unknown)
    }

    pub fn code(&self) -> i32 {
        Self::CODES
            .iter()
            .find(|(status, _)| status == self)
            .map(|(_, c)| *c)
            .unwrap_or(-3)
    }
}

/// Status block as sent by the server
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusReply {
    #[serde(default)]
    pub error_code: i32,
    #[serde(default)]
    pub reason: String,
}

/// Overall status of a call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: Status,
    message: String,
}

impl Response {
    pub fn new(status: Status, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn success() -> Self {
        Self::new(Status::Success, "Success")
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// `true` if the status equals `Status::Success`
    pub fn ok(&self) -> bool {
        self.status == Status::Success
    }

    /// Turn a non-success response into `MilvusError::Server`.
    pub fn into_result(self) -> Result<()> {
        if self.ok() {
            Ok(())
        } else {
            Err(MilvusError::from_status(self.status, self.message))
        }
    }
}

impl From<StatusReply> for Response {
    fn from(reply: StatusReply) -> Self {
        Response::new(Status::from_code(reply.error_code), reply.reason)
    }
}
