use std::collections::{BTreeMap, HashMap};

use crate::classify::StatusCode;

/// Status code → remark shown next to each policy.
#[derive(Debug, Clone, Default)]
pub struct CommentTable {
    remarks: HashMap<u8, String>,
}

impl CommentTable {
    /// Keys that are not numeric codes are ignored; `LookupConfig::validate` rejects them earlier.
    pub fn from_map(map: &BTreeMap<String, String>) -> Self {
        let remarks = map
            .iter()
            .filter_map(|(k, v)| k.trim().parse::<u8>().ok().map(|code| (code, v.clone())))
            .collect();
        Self { remarks }
    }

    pub fn remark(&self, code: StatusCode) -> &str {
        self.remarks.get(&code.value()).map(String::as_str).unwrap_or("")
    }
}
