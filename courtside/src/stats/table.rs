use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One named table from a stats response: column headers plus positional rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultTable {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub headers: Vec<String>,
    #[serde(rename = "rowSet", default)]
    pub rows: Vec<Vec<Value>>,
}

/// Top-level response envelope of the stats endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatsResponse {
    #[serde(rename = "resultSets", default)]
    pub result_sets: Vec<ResultTable>,
}

impl StatsResponse {
    /// The table called `name`, else the first table, else an empty one.
    pub fn into_table(self, name: &str) -> ResultTable {
        let mut sets = self.result_sets;
        match sets.iter().position(|set| set.name == name) {
            Some(index) => sets.swap_remove(index),
            None if !sets.is_empty() => sets.swap_remove(0),
            None => ResultTable {
                name: name.to_string(),
                ..Default::default()
            },
        }
    }
}

impl ResultTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of `header`, falling back to `default` when the response
    /// carries no header row or does not name the column.
    pub fn column(&self, header: &str, default: usize) -> usize {
        self.headers
            .iter()
            .position(|candidate| candidate.eq_ignore_ascii_case(header))
            .unwrap_or(default)
    }

    pub fn rows(&self) -> impl Iterator<Item = RawRow<'_>> {
        self.rows.iter().map(|row| RawRow(row.as_slice()))
    }
}

/// Borrowed positional row. Every accessor degrades to a default for
/// missing, null or mistyped cells instead of failing.
#[derive(Debug, Clone, Copy)]
pub struct RawRow<'a>(pub &'a [Value]);

impl<'a> RawRow<'a> {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&'a Value> {
        self.0.get(index).filter(|value| !value.is_null())
    }

    pub fn f64_at(&self, index: usize) -> f64 {
        match self.get(index) {
            Some(Value::Number(number)) => number.as_f64().unwrap_or(0.0),
            Some(Value::String(text)) => text.trim().parse().unwrap_or(0.0),
            _ => 0.0,
        }
    }

    pub fn u32_at(&self, index: usize) -> u32 {
        let value = self.f64_at(index).round();
        if value.is_finite() && value > 0.0 {
            value.min(f64::from(u32::MAX)) as u32
        } else {
            0
        }
    }

    pub fn u64_at(&self, index: usize) -> Option<u64> {
        match self.get(index)? {
            Value::Number(number) => number.as_u64(),
            Value::String(text) => text.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn str_at(&self, index: usize) -> String {
        match self.get(index) {
            Some(Value::String(text)) => text.trim().to_string(),
            Some(Value::Number(number)) => number.to_string(),
            Some(Value::Bool(flag)) => flag.to_string(),
            _ => String::new(),
        }
    }

    pub fn opt_str_at(&self, index: usize) -> Option<String> {
        Some(self.str_at(index)).filter(|text| !text.is_empty())
    }
}
