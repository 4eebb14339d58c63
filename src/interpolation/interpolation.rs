use std::fmt::Display;

use serde::Serialize;

use super::interpolationerror::{
    InterpolationError,
    Operation
};

// ─────────────────────────────────────────────────────────────────────────────
// InterpolationKind
// ─────────────────────────────────────────────────────────────────────────────

/// 候選實作的具體型別標籤。
///
/// 檢查 A 以此比對 factory 實際產出的型別與預期型別，不依賴反射。
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize)]
pub struct InterpolationKind(&'static str);

impl InterpolationKind {
    pub const fn new(name: &'static str) -> InterpolationKind {
        InterpolationKind(name)
    }

    /// 以型別名稱作為標籤，與 `Interpolation::kind()` 的預設實作一致
    pub fn of<T: ?Sized>() -> InterpolationKind {
        InterpolationKind(std::any::type_name::<T>())
    }

    pub fn name(&self) -> &'static str {
        self.0
    }
}

impl Display for InterpolationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Interpolation：候選實作必須滿足的能力模型
// ─────────────────────────────────────────────────────────────────────────────
//
// 兩個能力旗標在建構後即固定：
//   supports_differentiation → differentiate / differentiate_with_value
//   supports_integration     → integrate
// 旗標為 false 時，受控操作必須回傳 InterpolationError::Unsupported。

pub trait Interpolation {
    fn interpolate(&self, x: f64) -> Result<f64, InterpolationError>;

    fn supports_differentiation(&self) -> bool;

    fn supports_integration(&self) -> bool;

    /// 一階導數
    fn differentiate(&self, _x: f64) -> Result<f64, InterpolationError> {
        Err(InterpolationError::unsupported(Operation::Differentiate))
    }

    /// 回傳 (值, 一階導數)
    fn differentiate_with_value(&self, _x: f64) -> Result<(f64, f64), InterpolationError> {
        Err(InterpolationError::unsupported(Operation::DifferentiateWithValue))
    }

    /// 自最小節點積分至 `upper_bound`
    fn integrate(&self, _upper_bound: f64) -> Result<f64, InterpolationError> {
        Err(InterpolationError::unsupported(Operation::Integrate))
    }

    fn kind(&self) -> InterpolationKind {
        InterpolationKind::of::<Self>()
    }
}

impl<T> Interpolation for Box<T> where
    T: Interpolation + ?Sized {
    fn interpolate(&self, x: f64) -> Result<f64, InterpolationError> {
        (**self).interpolate(x)
    }

    fn supports_differentiation(&self) -> bool {
        (**self).supports_differentiation()
    }

    fn supports_integration(&self) -> bool {
        (**self).supports_integration()
    }

    fn differentiate(&self, x: f64) -> Result<f64, InterpolationError> {
        (**self).differentiate(x)
    }

    fn differentiate_with_value(&self, x: f64) -> Result<(f64, f64), InterpolationError> {
        (**self).differentiate_with_value(x)
    }

    fn integrate(&self, upper_bound: f64) -> Result<f64, InterpolationError> {
        (**self).integrate(upper_bound)
    }

    fn kind(&self) -> InterpolationKind {
        (**self).kind()
    }
}
