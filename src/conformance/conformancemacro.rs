/// 為一組 factory 產生 `#[test]` 函數，每項檢查各一個。
///
/// ```ignore
/// interpolation_conformance!(
///     linear_spline,
///     PolynomialType::Linear.kind(),
///     |p: &[f64], v: &[f64]| PiecewisePolynomial::new(PolynomialType::Linear, p, v)
/// );
/// ```
///
/// 第四個參數可傳入 `ConformanceConfig`；`differentiation_forms_agree`
/// 僅在設定啟用時實際執行。
#[macro_export]
macro_rules! interpolation_conformance {
    ($name:ident, $kind:expr, $factory:expr) => {
        $crate::interpolation_conformance!(
            $name,
            $kind,
            $factory,
            $crate::conformance::conformanceconfig::ConformanceConfig::default()
        );
    };
    ($name:ident, $kind:expr, $factory:expr, $config:expr) => {
        mod $name {
            #[allow(unused_imports)]
            use super::*;

            use $crate::conformance::conformancesuite::ConformanceSuite;
            use $crate::conformance::verificationreport::{CheckName, CheckReport};
            use $crate::interpolation::interpolationfactory::InterpolationFactory;

            fn suite() -> ConformanceSuite<impl InterpolationFactory> {
                match ConformanceSuite::with_config($kind, $factory, $config) {
                    Ok(suite) => suite,
                    Err(error) => panic!("invalid conformance configuration: {}", error),
                }
            }

            fn verify(report: CheckReport) {
                if let Err(failure) = report.into_result() {
                    panic!("{}", failure);
                }
            }

            #[test]
            fn factory_returns_correct_type() {
                verify(suite().factory_returns_correct_type());
            }

            #[test]
            fn consistent_capability_behavior() {
                verify(suite().consistent_capability_behavior());
            }

            #[test]
            fn interpolation_matches_node_points() {
                verify(suite().interpolation_matches_node_points());
            }

            #[test]
            fn can_deal_with_linear_samples() {
                verify(suite().can_deal_with_linear_samples());
            }

            #[test]
            fn differentiation_forms_agree() {
                let suite = suite();
                if suite.checks().contains(&CheckName::DifferentiationFormsAgree) {
                    verify(suite.differentiation_forms_agree());
                }
            }
        }
    };
}
