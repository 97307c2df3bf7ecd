use serde::{Deserialize, Serialize};

/// 归一化后的市镇记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommuneRecord {
    pub nom: String,
    pub code_insee: String,
    pub code_postal: String,
}
