//! Labelled tabular dataset: flattened creature rows with an observed level.

use crate::error::TableError;
use crate::level::Level;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const LEVEL_KEY: &str = "level";
const SOURCE_KEY: &str = "book";

/// A single creature row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelRow {
    /// One cell per table column; `None` where the source record had no value.
    pub values: Vec<Option<f64>>,
    pub level: Level,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// The flattened training table consumed by the dataset profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelTable {
    pub columns: Vec<String>,
    pub rows: Vec<LevelRow>,
}

impl LevelTable {
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Result<Self, TableError> {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        for (i, name) in columns.iter().enumerate() {
            if columns[..i].contains(name) {
                return Err(TableError::DuplicateColumn { name: name.clone() });
            }
        }
        Ok(Self {
            columns,
            rows: Vec::new(),
        })
    }

    pub fn push_row(&mut self, row: LevelRow) -> Result<(), TableError> {
        if row.values.len() != self.columns.len() {
            return Err(TableError::RowWidth {
                expected: self.columns.len(),
                actual: row.values.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// All cells of a column, nulls included. `None` if the column does not exist.
    pub fn column_values(&self, name: &str) -> Option<Vec<Option<f64>>> {
        let index = self.column_index(name)?;
        Some(self.rows.iter().map(|r| r.values[index]).collect())
    }

    pub fn levels(&self) -> impl Iterator<Item = Level> + '_ {
        self.rows.iter().map(|r| r.level)
    }

    /// Parse one flattened JSON object per line.
    ///
    /// Every line needs an integer `level`; `book` is kept as the row source. Any other
    /// key becomes a column, numeric or null. Columns absent from a line are null for that
    /// row. Levels above 20 are folded into 21.
    pub fn from_json_lines(input: &str) -> Result<Self, TableError> {
        let mut columns: Vec<String> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut parsed: Vec<(HashMap<usize, f64>, Level, Option<String>)> = Vec::new();

        for (line_no, line) in input.lines().enumerate() {
            let line_no = line_no + 1;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let parse_err = |message: String| TableError::Parse {
                line: line_no,
                message,
            };
            let value: serde_json::Value =
                serde_json::from_str(line).map_err(|e| parse_err(e.to_string()))?;
            let object = value
                .as_object()
                .ok_or_else(|| parse_err("expected a JSON object".to_string()))?;

            let level = object
                .get(LEVEL_KEY)
                .and_then(serde_json::Value::as_i64)
                .and_then(|l| i32::try_from(l).ok())
                .ok_or_else(|| parse_err("missing or non-integer 'level'".to_string()))?;
            let source = object
                .get(SOURCE_KEY)
                .and_then(serde_json::Value::as_str)
                .map(str::to_string);

            let mut cells = HashMap::new();
            for (key, cell) in object {
                if key == LEVEL_KEY || key == SOURCE_KEY {
                    continue;
                }
                let position = *index.entry(key.clone()).or_insert_with(|| {
                    columns.push(key.clone());
                    columns.len() - 1
                });
                match cell {
                    serde_json::Value::Null => {}
                    serde_json::Value::Number(n) => {
                        if let Some(f) = n.as_f64() {
                            cells.insert(position, f);
                        }
                    }
                    other => {
                        return Err(parse_err(format!(
                            "column '{key}' holds non-numeric value {other}"
                        )));
                    }
                }
            }
            parsed.push((cells, Level(level).fold_epic(), source));
        }

        let width = columns.len();
        let rows = parsed
            .into_iter()
            .map(|(cells, level, source)| LevelRow {
                values: (0..width).map(|i| cells.get(&i).copied()).collect(),
                level,
                source,
            })
            .collect();

        tracing::debug!(columns = width, "Parsed flattened level table");
        Ok(Self { columns, rows })
    }
}
