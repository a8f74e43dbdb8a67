// src/csv/group.rs

use std::collections::HashMap;

use super::CsvRow;

/// Group key used for rows whose discriminator column is blank.
pub const BLANK_GROUP: &str = "_";

/// Stable partition of rows by the value of one column. Key discovery order
/// and source order within each group are both preserved, so concatenating
/// the groups in order reproduces a permutation of the input.
#[derive(Debug, Default)]
pub struct DatasetGroups {
    order: Vec<String>,
    groups: HashMap<String, Vec<CsvRow>>,
}

impl DatasetGroups {
    pub fn partition(rows: &[CsvRow], column: &str) -> Self {
        let mut out = Self::default();
        for row in rows {
            let key = match row.get(column) {
                "" => BLANK_GROUP,
                value => value,
            };
            match out.groups.get_mut(key) {
                Some(bucket) => bucket.push(row.clone()),
                None => {
                    out.order.push(key.to_string());
                    out.groups.insert(key.to_string(), vec![row.clone()]);
                }
            }
        }
        out
    }

    /// Rows of the named group, in source order.
    pub fn get(&self, name: &str) -> Option<&[CsvRow]> {
        self.groups.get(name).map(Vec::as_slice)
    }

    /// Group names in discovery order.
    pub fn names(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
