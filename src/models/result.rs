use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 所有分析结果的数据来源标识
pub const SOURCE_HUBEAU: &str = "Hub'Eau";

/// 归一化后的水质分析结果
///
/// 缺失字段一律序列化为 `null`，输出结构固定。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub parametre_id: Option<String>,
    pub parametre_libelle: Option<String>,
    /// 数值或字符串，按上游原样透传
    pub valeur: Value,
    pub unite: Option<String>,
    pub date_prelevement: Option<String>,
    pub source: String,
}
