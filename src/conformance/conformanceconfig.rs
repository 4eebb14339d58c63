use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{
    Deserialize,
    Serialize
};
use thiserror::Error;

use super::comparison::DEFAULT_TOLERANCE;

#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    #[error(transparent)]
    JsonParseError(#[from] serde_json::Error),

    #[error("at least one sample order is required")]
    EmptyOrders,

    #[error("sample order must be at least 1, got {0}")]
    InvalidOrder(usize),

    #[error("tolerance must be finite and non-negative, got {0}")]
    InvalidTolerance(f64),
}

/// 一致性檢查組的設定。
///
/// JSON 中省略的欄位採用預設值：
/// ```json
/// { "orders": [2, 4, 8], "seed": 1234 }
/// ```
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConformanceConfig {
    /// 檢查 D 的樣本數
    pub orders: Vec<usize>,
    /// 檢查 D 的亂數種子；None 時於建立檢查組時自熵源取得
    pub seed: Option<u64>,
    pub tolerance: f64,
    /// 啟用 DifferentiationFormsAgree
    pub check_differentiation_forms: bool,
}

impl Default for ConformanceConfig {
    fn default() -> Self {
        ConformanceConfig {
            orders: vec![4],
            seed: None,
            tolerance: DEFAULT_TOLERANCE,
            check_differentiation_forms: false,
        }
    }
}

impl ConformanceConfig {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.orders.is_empty() {
            return Err(ConfigurationError::EmptyOrders);
        }
        if let Some(&order) = self.orders.iter().find(|&&order| order == 0) {
            return Err(ConfigurationError::InvalidOrder(order));
        }
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(ConfigurationError::InvalidTolerance(self.tolerance));
        }
        Ok(())
    }

    pub fn from_json(json_value: serde_json::Value) -> Result<ConformanceConfig, ConfigurationError> {
        let config: ConformanceConfig = serde_json::from_value(json_value)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_reader(file_path: impl AsRef<Path>) -> Result<ConformanceConfig, ConfigurationError> {
        let file = File::open(file_path)?;
        let reader = BufReader::new(file);
        let config: ConformanceConfig = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }
}
