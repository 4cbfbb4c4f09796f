//! Result-set row decoding.
//!
//! A [`ResultSchema`] parses each column's type text once; every row after
//! that only walks the cached [`Type`] trees.

use std::sync::Arc;

use crate::decode::{DecodeOptions, decode_cell};
use crate::error::{CodecError, CodecResult};
use crate::types::{Type, parse_type_with_depth};
use crate::value::Value;

/// Column metadata as reported by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    pub name: String,
    pub type_text: String,
}

impl ColumnDescriptor {
    pub fn new(name: impl Into<String>, type_text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_text: type_text.into(),
        }
    }
}

/// Parsed column types for one result set.
#[derive(Debug, Clone)]
pub struct ResultSchema {
    names: Arc<[String]>,
    types: Vec<Type>,
    options: DecodeOptions,
}

impl ResultSchema {
    pub fn new(columns: &[ColumnDescriptor]) -> Self {
        Self::with_options(columns, DecodeOptions::default())
    }

    pub fn with_options(columns: &[ColumnDescriptor], options: DecodeOptions) -> Self {
        let types = columns
            .iter()
            .map(|c| parse_type_with_depth(&c.type_text, options.max_depth))
            .collect();
        tracing::debug!(columns = columns.len(), "parsed result schema");
        Self {
            names: columns.iter().map(|c| c.name.clone()).collect(),
            types,
            options,
        }
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Parsed type of a column.
    pub fn column_type(&self, idx: usize) -> Option<&Type> {
        self.types.get(idx)
    }

    pub fn column_name(&self, idx: usize) -> Option<&str> {
        self.names.get(idx).map(String::as_str)
    }

    /// Decode one row of cell texts, in column order.
    pub fn decode_row(&self, cells: &[&str]) -> CodecResult<Row> {
        if cells.len() != self.types.len() {
            return Err(CodecError::ColumnCount {
                expected: self.types.len(),
                got: cells.len(),
            });
        }
        let values = cells
            .iter()
            .zip(&self.types)
            .enumerate()
            .map(|(idx, (cell, ty))| {
                decode_cell(cell, ty, &self.options)
                    .map_err(|e| e.in_column(idx, self.names[idx].as_str()))
            })
            .collect::<CodecResult<Vec<_>>>()?;
        Ok(Row {
            names: Arc::clone(&self.names),
            values,
        })
    }
}

/// A decoded row.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    names: Arc<[String]>,
    values: Vec<Value>,
}

impl Row {
    /// Get a column value by index.
    pub fn get(&self, idx: usize) -> Option<&Value> {
        self.values.get(idx)
    }

    /// Get a column value by name (case-insensitive, first match).
    pub fn get_by_name(&self, name: &str) -> Option<&Value> {
        let idx = self.names.iter().position(|n| n.eq_ignore_ascii_case(name))?;
        self.values.get(idx)
    }

    /// Check if a column is NULL. Out-of-range indices count as NULL.
    pub fn is_null(&self, idx: usize) -> bool {
        self.values.get(idx).map(Value::is_null).unwrap_or(true)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn columns(&self) -> &[String] {
        &self.names
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }
}
