use std::collections::{HashMap, HashSet};

use serde::Deserialize;
use tracing::warn;

use crate::error::{MilvusError, Result};
use crate::models::{DataType, FieldValue, FieldValues, Response, StatusReply};

/// One column of an entity lookup reply, holding values for the valid rows only
#[derive(Debug, Clone, Deserialize)]
pub struct FieldColumnReply {
    pub field_name: String,
    #[serde(rename = "type")]
    pub data_type: DataType,
    #[serde(default)]
    pub values: serde_json::Value,
}

/// Entity lookup reply as sent by the server
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntitiesReply {
    pub status: StatusReply,
    /// Echo of the queried ids
    #[serde(default)]
    pub ids: Vec<i64>,
    /// `valid_row[i]` is true when `ids[i]` exists
    #[serde(default)]
    pub valid_row: Vec<bool>,
    #[serde(default)]
    pub fields: Vec<FieldColumnReply>,
}

/// Result of a lookup-by-id call.
///
/// `fields_map()[i]` holds the field values of `valid_ids()[i]`. Ids that
/// were queried but not found are left out of both lists.
#[derive(Debug, Clone, PartialEq)]
pub struct GetEntityByIdResponse {
    response: Response,
    valid_ids: Vec<i64>,
    fields_map: Vec<HashMap<String, FieldValue>>,
}

impl GetEntityByIdResponse {
    pub fn decode(requested_ids: &[i64], reply: EntitiesReply) -> Result<Self> {
        let response = Response::from(reply.status);
        if !response.ok() {
            warn!(
                status = ?response.status(),
                message = response.message(),
                "entity lookup failed"
            );
            return Ok(Self {
                response,
                valid_ids: Vec::new(),
                fields_map: Vec::new(),
            });
        }

        let ids = if reply.ids.is_empty() && !reply.valid_row.is_empty() {
            warn!("entity lookup reply has no ids, using requested ids");
            requested_ids.to_vec()
        } else {
            reply.ids
        };
        if ids.len() != reply.valid_row.len() {
            return Err(MilvusError::invalid_response(format!(
                "reply has {} ids but {} validity flags",
                ids.len(),
                reply.valid_row.len()
            )));
        }

        let valid_ids: Vec<i64> = ids
            .into_iter()
            .zip(reply.valid_row)
            .filter_map(|(id, valid)| valid.then_some(id))
            .collect();
        check_query_order(requested_ids, &valid_ids)?;

        let mut seen = HashSet::with_capacity(reply.fields.len());
        let mut columns = Vec::with_capacity(reply.fields.len());
        for column in reply.fields {
            if !seen.insert(column.field_name.clone()) {
                return Err(MilvusError::invalid_response(format!(
                    "reply contains field {} more than once",
                    column.field_name
                )));
            }
            let values = FieldValues::from_json(column.data_type, column.values).map_err(|e| {
                MilvusError::invalid_response(format!(
                    "field {} does not decode as {:?}: {}",
                    column.field_name, column.data_type, e
                ))
            })?;
            if values.len() != valid_ids.len() {
                return Err(MilvusError::invalid_response(format!(
                    "field {} has {} values for {} valid ids",
                    column.field_name,
                    values.len(),
                    valid_ids.len()
                )));
            }
            columns.push((column.field_name, values));
        }

        let fields_map: Vec<HashMap<String, FieldValue>> = (0..valid_ids.len())
            .map(|row| {
                columns
                    .iter()
                    .filter_map(|(name, values)| values.get(row).map(|v| (name.clone(), v)))
                    .collect()
            })
            .collect();

        Ok(Self {
            response,
            valid_ids,
            fields_map,
        })
    }

    pub fn response(&self) -> &Response {
        &self.response
    }

    /// `true` if the response status is success
    pub fn ok(&self) -> bool {
        self.response.ok()
    }

    /// Ids present in the collection, in query order
    pub fn valid_ids(&self) -> &[i64] {
        &self.valid_ids
    }

    pub fn fields_map(&self) -> &[HashMap<String, FieldValue>] {
        &self.fields_map
    }
}

/// Each valid id must match a requested id later than the previous match,
/// so the valid ids form an ordered subsequence of the query.
fn check_query_order(requested_ids: &[i64], valid_ids: &[i64]) -> Result<()> {
    let mut remaining = requested_ids.iter();
    for id in valid_ids {
        if !remaining.any(|requested| requested == id) {
            return Err(MilvusError::invalid_response(format!(
                "reply id {} was not requested or is out of query order",
                id
            )));
        }
    }
    Ok(())
}
