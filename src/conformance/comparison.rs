use std::any::Any;
use std::panic::{
    self,
    AssertUnwindSafe
};

pub const DEFAULT_TOLERANCE: f64 = 1e-12;

/// 絕對誤差比較。`actual` 為 NaN 時視為不相符。
pub fn within_tolerance(expected: f64, actual: f64, tolerance: f64) -> bool {
    (expected - actual).abs() <= tolerance
}

/// 執行候選實作的呼叫，將 panic 轉為錯誤訊息
pub fn guarded<T, F>(f: F) -> Result<T, String> where
    F: FnOnce() -> T {
    panic::catch_unwind(AssertUnwindSafe(f)).map_err(panic_message)
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("candidate panicked: {}", message)
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("candidate panicked: {}", message)
    } else {
        "candidate panicked".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tolerance_is_absolute_and_inclusive() {
        assert!(within_tolerance(30.0, 30.0, DEFAULT_TOLERANCE));
        assert!(within_tolerance(0.0, 1e-13, DEFAULT_TOLERANCE));
        assert!(!within_tolerance(0.0, 1e-11, DEFAULT_TOLERANCE));
        assert!(within_tolerance(1.0, 1.5, 0.5));
    }

    #[test]
    fn nan_never_matches() {
        assert!(!within_tolerance(1.0, f64::NAN, DEFAULT_TOLERANCE));
        assert!(!within_tolerance(1.0, f64::INFINITY, DEFAULT_TOLERANCE));
    }

    #[test]
    fn guarded_captures_panics() {
        assert_eq!(guarded(|| 3), Ok(3));
        let err = guarded(|| -> i32 { panic!("boom") }).unwrap_err();
        assert!(err.contains("boom"));
    }
}
