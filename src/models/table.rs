use serde::{Deserialize, Serialize};

/// One column as reported by `PRAGMA table_info`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableColumn {
  pub name: String,
  pub column_type: String,
  pub not_null: bool,
  pub default_value: Option<String>,
  pub primary_key: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSchema {
  pub name: String,
  pub columns: Vec<TableColumn>,
}

/// Raw contents of one table; column names are empty when the table has no rows
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableData {
  pub columns: Vec<String>,
  pub rows: Vec<Vec<serde_json::Value>>,
}
