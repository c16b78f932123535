//! Dining Table Model (桌台)

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

pub type DiningTableId = RecordId;

/// Dining table entity (桌台)
///
/// 容量区间 `[min_capacity, max_capacity]` 必须非空 (min ≤ max)，
/// repository 在写入时校验。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiningTable {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<DiningTableId>,

    pub name: String,

    /// Location reference
    #[serde(with = "serde_helpers::record_id")]
    pub location: RecordId,

    /// 最小可接待人数 (避免大桌浪费给小团)
    pub min_capacity: i32,

    /// 最大可接待人数
    pub max_capacity: i32,

    /// 是否允许与同组桌台拼桌
    #[serde(default, deserialize_with = "serde_helpers::bool_false")]
    pub combinable: bool,

    /// 拼桌组标识，同组且 combinable 的桌台可合并接待大团
    pub combination_group: Option<String>,

    #[serde(default = "default_true", deserialize_with = "serde_helpers::bool_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

impl DiningTable {
    /// 桌台 ID 字符串 ("dining_table:xyz")，用于确定性排序
    pub fn id_string(&self) -> String {
        self.id.as_ref().map(|id| id.to_string()).unwrap_or_default()
    }
}

/// Create dining table payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiningTableCreate {
    pub name: String,
    #[serde(with = "serde_helpers::record_id")]
    pub location: RecordId,
    pub min_capacity: Option<i32>,
    pub max_capacity: i32,
    #[serde(default)]
    pub combinable: bool,
    pub combination_group: Option<String>,
}

/// Update dining table payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiningTableUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_capacity: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_capacity: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub combinable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub combination_group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}
