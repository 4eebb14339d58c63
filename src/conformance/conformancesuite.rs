use std::fmt::Debug;

use rand::SeedableRng;
use rand::rngs::StdRng;
use uuid::Uuid;

use crate::interpolation::interpolation::{
    Interpolation,
    InterpolationKind
};
use crate::interpolation::interpolationerror::{
    InterpolationError,
    Operation
};
use crate::interpolation::interpolationfactory::InterpolationFactory;

use super::comparison::{
    guarded,
    within_tolerance
};
use super::conformanceconfig::{
    ConfigurationError,
    ConformanceConfig
};
use super::samples::{
    linear_probes,
    linear_samples,
    SampleSet
};
use super::verificationreport::{
    CheckName,
    CheckReport,
    CheckReportBuilder,
    Failure
};

/// 檢查 B 與 E 的內部探測點
pub const PROBE_POINT: f64 = 1.2;

// ─────────────────────────────────────────────────────────────────────────────
// ConformanceSuite
// ─────────────────────────────────────────────────────────────────────────────
//
// 每項檢查各自透過 factory 建構一個候選實作，彼此不共享狀態，
// 可由外部測試框架以「一項檢查 = 一個工作單位」平行執行。
// 檢查失敗以 CheckReport 回傳，不會中斷其他檢查。

pub struct ConformanceSuite<F> {
    id: Uuid,
    expected_kind: InterpolationKind,
    factory: F,
    config: ConformanceConfig,
    seed: u64,
}

impl<F> ConformanceSuite<F> where
    F: InterpolationFactory {
    pub fn new(expected_kind: InterpolationKind, factory: F) -> ConformanceSuite<F> {
        ConformanceSuite {
            id: Uuid::new_v4(),
            expected_kind,
            factory,
            seed: rand::random(),
            config: ConformanceConfig::default(),
        }
    }

    pub fn with_config(expected_kind: InterpolationKind,
                       factory: F,
                       config: ConformanceConfig) -> Result<ConformanceSuite<F>, ConfigurationError> {
        config.validate()?;
        let seed = config.seed.unwrap_or_else(rand::random);
        Ok(ConformanceSuite {
            id: Uuid::new_v4(),
            expected_kind,
            factory,
            config,
            seed,
        })
    }

    pub fn with_orders(mut self, orders: Vec<usize>) -> Result<ConformanceSuite<F>, ConfigurationError> {
        self.config.orders = orders;
        self.config.validate()?;
        Ok(self)
    }

    pub fn with_seed(mut self, seed: u64) -> ConformanceSuite<F> {
        self.config.seed = Some(seed);
        self.seed = seed;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn expected_kind(&self) -> InterpolationKind {
        self.expected_kind
    }

    pub fn config(&self) -> &ConformanceConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// 已啟用的檢查
    pub fn checks(&self) -> Vec<CheckName> {
        let mut checks = CheckName::standard();
        if self.config.check_differentiation_forms {
            checks.push(CheckName::DifferentiationFormsAgree);
        }
        checks
    }

    pub fn run(&self, check: CheckName) -> CheckReport {
        match check {
            CheckName::FactoryReturnsCorrectType      => self.factory_returns_correct_type(),
            CheckName::ConsistentCapabilityBehavior   => self.consistent_capability_behavior(),
            CheckName::InterpolationMatchesNodePoints => self.interpolation_matches_node_points(),
            CheckName::CanDealWithLinearSamples       => self.can_deal_with_linear_samples(),
            CheckName::DifferentiationFormsAgree      => self.differentiation_forms_agree(),
        }
    }

    /// 每項已啟用檢查各一份報告，不做彙總
    pub fn run_all(&self) -> Vec<CheckReport> {
        self.checks()
            .into_iter()
            .map(|check| self.run(check))
            .collect()
    }

    fn build(&self, samples: &SampleSet, report: &mut CheckReportBuilder) -> Option<F::Candidate> {
        let outcome = guarded(|| self.factory.build(samples.points(), samples.values()));
        match outcome {
            Ok(Ok(candidate)) => Some(candidate),
            Ok(Err(error)) => {
                report.fail(
                    Failure::new("factory failed to build a candidate")
                        .label("samples", samples.len())
                        .error(error)
                );
                None
            }
            Err(panic) => {
                report.fail(
                    Failure::new("factory panicked while building a candidate")
                        .label("samples", samples.len())
                        .error(panic)
                );
                None
            }
        }
    }

    // ─────────────────────────────────────────────
    // 檢查 A：FactoryReturnsCorrectType
    // ─────────────────────────────────────────────

    pub fn factory_returns_correct_type(&self) -> CheckReport {
        let mut report = CheckReportBuilder::new(CheckName::FactoryReturnsCorrectType, self.id);
        report.context("expected_kind", self.expected_kind);

        if let Some(candidate) = self.build(&SampleSet::three_point(), &mut report) {
            match guarded(|| candidate.kind()) {
                Ok(kind) if kind == self.expected_kind => {}
                Ok(kind) => report.fail(
                    Failure::new("factory returned a candidate of an unexpected kind")
                        .expected(self.expected_kind)
                        .actual(kind)
                        .label("expected_type", self.expected_kind)
                ),
                Err(panic) => report.fail(
                    Failure::new("candidate panicked while reporting its kind").error(panic)
                ),
            }
        }
        report.finish()
    }

    // ─────────────────────────────────────────────
    // 檢查 B：ConsistentCapabilityBehavior
    // ─────────────────────────────────────────────
    //
    // 旗標為 true → 受控操作在 PROBE_POINT 必須成功
    // 旗標為 false → 受控操作必須回傳 Unsupported
    // 操作完成後再次查詢旗標，結果必須一致

    pub fn consistent_capability_behavior(&self) -> CheckReport {
        let mut report = CheckReportBuilder::new(CheckName::ConsistentCapabilityBehavior, self.id);
        report.context("probe", PROBE_POINT);

        let Some(candidate) = self.build(&SampleSet::three_point(), &mut report) else {
            return report.finish();
        };

        // 兩項能力各自獨立檢查；一方的旗標查詢 panic 不影響另一方
        let differentiation = query_flag(&mut report, "supports_differentiation", || {
            candidate.supports_differentiation()
        });
        if let Some(differentiation) = differentiation {
            report.context("supports_differentiation", differentiation);
            expect_gated(&mut report, differentiation, Operation::Differentiate, || {
                candidate.differentiate(PROBE_POINT)
            });
            expect_gated(&mut report, differentiation, Operation::DifferentiateWithValue, || {
                candidate.differentiate_with_value(PROBE_POINT)
            });
        }

        let integration = query_flag(&mut report, "supports_integration", || {
            candidate.supports_integration()
        });
        if let Some(integration) = integration {
            report.context("supports_integration", integration);
            expect_gated(&mut report, integration, Operation::Integrate, || {
                candidate.integrate(PROBE_POINT)
            });
        }

        if let Some(differentiation) = differentiation {
            expect_stable_flag(&mut report, "supports_differentiation", differentiation, || {
                candidate.supports_differentiation()
            });
        }
        if let Some(integration) = integration {
            expect_stable_flag(&mut report, "supports_integration", integration, || {
                candidate.supports_integration()
            });
        }

        report.finish()
    }

    // ─────────────────────────────────────────────
    // 檢查 C：InterpolationMatchesNodePoints
    // ─────────────────────────────────────────────

    pub fn interpolation_matches_node_points(&self) -> CheckReport {
        let mut report = CheckReportBuilder::new(CheckName::InterpolationMatchesNodePoints, self.id);
        report.context("tolerance", self.config.tolerance);

        let samples = SampleSet::five_point();
        if let Some(candidate) = self.build(&samples, &mut report) {
            for (index, (x, y)) in samples.iter().enumerate() {
                let failure = Failure::new("interpolation does not pass through node")
                    .label("index", index)
                    .label("x", x);
                expect_value(&mut report, failure, y, self.config.tolerance, || {
                    candidate.interpolate(x)
                });
            }
        }
        report.finish()
    }

    // ─────────────────────────────────────────────
    // 檢查 D：CanDealWithLinearSamples
    // ─────────────────────────────────────────────

    pub fn can_deal_with_linear_samples(&self) -> CheckReport {
        let mut report = CheckReportBuilder::new(CheckName::CanDealWithLinearSamples, self.id);
        report.context("seed", self.seed);
        report.context("tolerance", self.config.tolerance);
        report.context("orders", format!("{:?}", self.config.orders));

        let mut rng = StdRng::seed_from_u64(self.seed);
        for &order in &self.config.orders {
            let samples = linear_samples(order);
            let probes = linear_probes(order, &mut rng);
            let Some(candidate) = self.build(&samples, &mut report) else {
                continue;
            };
            for probe in probes {
                let failure = Failure::new("linear samples are not reproduced")
                    .label("order", order)
                    .label("x", probe.x);
                expect_value(&mut report, failure, probe.expected, self.config.tolerance, || {
                    candidate.interpolate(probe.x)
                });
            }
        }
        report.finish()
    }

    // ─────────────────────────────────────────────
    // 檢查 E：DifferentiationFormsAgree
    // ─────────────────────────────────────────────
    //
    // differentiate_with_value(x) 必須等於 (interpolate(x), differentiate(x))。
    // 不支援微分的候選實作直接通過。

    pub fn differentiation_forms_agree(&self) -> CheckReport {
        let mut report = CheckReportBuilder::new(CheckName::DifferentiationFormsAgree, self.id);
        report.context("tolerance", self.config.tolerance);

        let samples = SampleSet::three_point();
        let Some(candidate) = self.build(&samples, &mut report) else {
            return report.finish();
        };
        let Some(supported) = query_flag(&mut report, "supports_differentiation", || {
            candidate.supports_differentiation()
        }) else {
            return report.finish();
        };
        if !supported {
            report.context("skipped", "candidate does not support differentiation");
            return report.finish();
        }

        let mut probes = vec![PROBE_POINT];
        probes.extend_from_slice(samples.points());
        for x in probes {
            let dual = match guarded(|| candidate.differentiate_with_value(x)) {
                Ok(Ok(dual)) => dual,
                Ok(Err(error)) => {
                    report.fail(Failure::new("differentiate_with_value failed").label("x", x).error(error));
                    continue;
                }
                Err(panic) => {
                    report.fail(Failure::new("differentiate_with_value panicked").label("x", x).error(panic));
                    continue;
                }
            };
            expect_value(
                &mut report,
                Failure::new("dual form value differs from interpolate").label("x", x),
                dual.0,
                self.config.tolerance,
                || candidate.interpolate(x),
            );
            expect_value(
                &mut report,
                Failure::new("dual form derivative differs from differentiate").label("x", x),
                dual.1,
                self.config.tolerance,
                || candidate.differentiate(x),
            );
        }
        report.finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// 共用輔助函數
// ─────────────────────────────────────────────────────────────────────────────

fn query_flag<Q>(report: &mut CheckReportBuilder, flag: &'static str, query: Q) -> Option<bool> where
    Q: FnOnce() -> bool {
    match guarded(query) {
        Ok(value) => Some(value),
        Err(panic) => {
            report.fail(Failure::new("candidate panicked while reporting a capability flag")
                .label("flag", flag)
                .error(panic));
            None
        }
    }
}

fn expect_stable_flag<Q>(report: &mut CheckReportBuilder, flag: &'static str, first: bool, query: Q) where
    Q: FnOnce() -> bool {
    if let Some(second) = query_flag(report, flag, query) {
        if second != first {
            report.fail(Failure::new("capability flag changed between queries")
                .label("flag", flag)
                .expected(first)
                .actual(second));
        }
    }
}

fn expect_gated<T, O>(report: &mut CheckReportBuilder,
                      supported: bool,
                      operation: Operation,
                      invoke: O) where
    T: Debug,
    O: FnOnce() -> Result<T, InterpolationError> {
    let outcome = guarded(invoke);
    match (supported, outcome) {
        (_, Err(panic)) => report.fail(
            Failure::new("candidate panicked in a gated operation")
                .label("operation", operation)
                .label("supported", supported)
                .error(panic)
        ),
        (true, Ok(Ok(_))) => {}
        (true, Ok(Err(error))) => report.fail(
            Failure::new("operation failed although its capability flag is set")
                .label("operation", operation)
                .expected("Ok")
                .error(error)
        ),
        (false, Ok(Err(error))) if error.is_unsupported() => {}
        (false, Ok(Err(error))) => report.fail(
            Failure::new("operation failed with the wrong error kind while its capability flag is unset")
                .label("operation", operation)
                .expected("unsupported operation")
                .actual(&error)
                .error(error)
        ),
        (false, Ok(Ok(value))) => report.fail(
            Failure::new("operation succeeded although its capability flag is unset")
                .label("operation", operation)
                .expected("unsupported operation")
                .actual(format!("{:?}", value))
        ),
    }
}

fn expect_value<O>(report: &mut CheckReportBuilder,
                   failure: Failure,
                   expected: f64,
                   tolerance: f64,
                   evaluate: O) where
    O: FnOnce() -> Result<f64, InterpolationError> {
    match guarded(evaluate) {
        Ok(Ok(actual)) if within_tolerance(expected, actual, tolerance) => {}
        Ok(Ok(actual)) => report.fail(
            failure
                .expected(expected)
                .actual(actual)
                .label("deviation", (expected - actual).abs())
        ),
        Ok(Err(error)) => report.fail(failure.expected(expected).error(error)),
        Err(panic) => report.fail(failure.expected(expected).error(panic)),
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::conformance::verificationreport::Verdict;

    /// 最小的線性插值，可調整能力旗標與錯誤行為
    struct Segmented {
        xs: Vec<f64>,
        ys: Vec<f64>,
        differentiation: bool,
        integration: bool,
        /// 加在 interpolate 上，使曲線偏離節點
        value_offset: f64,
        /// 只加在 differentiate 上，使兩種微分形式不一致
        derivative_offset: f64,
        flag_panics: bool,
    }

    impl Segmented {
        fn build(points: &[f64], values: &[f64]) -> Result<Segmented, InterpolationError> {
            if points.len() < 2 {
                return Err(InterpolationError::InsufficientPoints { required: 2, given: points.len() });
            }
            Ok(Segmented {
                xs: points.to_vec(),
                ys: values.to_vec(),
                differentiation: false,
                integration: false,
                value_offset: 0.0,
                derivative_offset: 0.0,
                flag_panics: false,
            })
        }

        fn slope_at(&self, x: f64) -> (usize, f64) {
            let i = (1..self.xs.len() - 1)
                .rev()
                .find(|&i| self.xs[i] <= x)
                .unwrap_or(0);
            (i, (self.ys[i + 1] - self.ys[i]) / (self.xs[i + 1] - self.xs[i]))
        }
    }

    impl Interpolation for Segmented {
        fn interpolate(&self, x: f64) -> Result<f64, InterpolationError> {
            if let Some(i) = self.xs.iter().position(|&xi| xi == x) {
                return Ok(self.ys[i] + self.value_offset);
            }
            let (i, slope) = self.slope_at(x);
            Ok(self.ys[i] + slope * (x - self.xs[i]) + self.value_offset)
        }

        fn supports_differentiation(&self) -> bool {
            if self.flag_panics {
                panic!("differentiation flag unavailable");
            }
            self.differentiation
        }

        fn supports_integration(&self) -> bool {
            self.integration
        }

        fn differentiate(&self, x: f64) -> Result<f64, InterpolationError> {
            if !self.differentiation {
                return Err(InterpolationError::unsupported(Operation::Differentiate));
            }
            Ok(self.slope_at(x).1 + self.derivative_offset)
        }

        fn differentiate_with_value(&self, x: f64) -> Result<(f64, f64), InterpolationError> {
            if !self.differentiation {
                return Err(InterpolationError::unsupported(Operation::DifferentiateWithValue));
            }
            Ok((self.interpolate(x)?, self.slope_at(x).1))
        }
    }

    fn segmented_kind() -> InterpolationKind {
        InterpolationKind::of::<Segmented>()
    }

    #[test]
    fn conforming_candidate_passes_every_check() {
        let suite = ConformanceSuite::new(segmented_kind(), Segmented::build).with_seed(3);
        let reports = suite.run_all();
        assert_eq!(reports.len(), 4);
        for report in reports {
            assert!(report.passed(), "{}", report);
            assert_eq!(report.suite_id, suite.id());
        }
    }

    #[test]
    fn wrong_kind_names_the_expected_type() {
        let expected = InterpolationKind::new("SomethingElse");
        let suite = ConformanceSuite::new(expected, Segmented::build);
        let report = suite.factory_returns_correct_type();
        assert_eq!(report.verdict, Verdict::Failed);
        assert_eq!(report.failures[0].expected.as_deref(), Some("SomethingElse"));
        assert_eq!(report.failures[0].labels["expected_type"], "SomethingElse");
    }

    #[test]
    fn factory_error_is_attached() {
        let failing = |_: &[f64], _: &[f64]| -> Result<Segmented, InterpolationError> {
            Err(InterpolationError::SingularSystem("test"))
        };
        let suite = ConformanceSuite::new(segmented_kind(), failing);
        for report in suite.run_all() {
            assert!(!report.passed());
            let error = report.failures[0].error.as_deref().unwrap_or_default();
            assert!(error.contains("singular"), "{}", report);
        }
    }

    #[test]
    fn flag_set_without_behavior_is_reported() {
        let lying = |p: &[f64], v: &[f64]| {
            Segmented::build(p, v).map(|mut s| {
                s.integration = true;
                s
            })
        };
        let report = ConformanceSuite::new(segmented_kind(), lying).consistent_capability_behavior();
        assert_eq!(report.failures.len(), 1, "{}", report);
        assert_eq!(report.failures[0].labels["operation"], "integrate");
        assert!(report.failures[0].error.is_some());
    }

    #[test]
    fn nodes_missed_by_an_offset_curve_are_all_reported() {
        let shifted = |p: &[f64], v: &[f64]| {
            Segmented::build(p, v).map(|mut s| {
                s.value_offset = 1e-9;
                s
            })
        };
        let report = ConformanceSuite::new(segmented_kind(), shifted).interpolation_matches_node_points();

        assert_eq!(report.verdict, Verdict::Failed);
        let indices: Vec<&str> = report.failures.iter().map(|f| f.labels["index"].as_str()).collect();
        assert_eq!(indices, vec!["0", "1", "2", "3", "4"], "{}", report);
        for failure in &report.failures {
            assert!(failure.expected.is_some());
            assert!(failure.actual.is_some());
            assert!(failure.labels.contains_key("deviation"));
            assert!(failure.error.is_none());
        }
    }

    #[test]
    fn disagreeing_differentiation_forms_are_reported() {
        let skewed = |p: &[f64], v: &[f64]| {
            Segmented::build(p, v).map(|mut s| {
                s.differentiation = true;
                s.derivative_offset = 1.0;
                s
            })
        };
        let suite = ConformanceSuite::new(segmented_kind(), skewed);
        let report = suite.differentiation_forms_agree();

        assert_eq!(report.verdict, Verdict::Failed);
        // PROBE_POINT 與三個節點，各一筆導數不一致
        assert_eq!(report.failures.len(), 4, "{}", report);
        assert!(report
            .failures
            .iter()
            .all(|f| f.message == "dual form derivative differs from differentiate"));
        // 兩種形式本身仍各自可用，其他檢查不受影響
        assert!(suite.consistent_capability_behavior().passed());
    }

    #[test]
    fn panicking_flag_does_not_skip_the_other_capability() {
        let panicky = |p: &[f64], v: &[f64]| {
            Segmented::build(p, v).map(|mut s| {
                s.flag_panics = true;
                s.integration = true;
                s
            })
        };
        let report = ConformanceSuite::new(segmented_kind(), panicky).consistent_capability_behavior();

        assert_eq!(report.failures.len(), 2, "{}", report);
        assert_eq!(report.failures[0].labels["flag"], "supports_differentiation");
        assert!(report.failures[0].error.as_deref().unwrap_or_default().contains("differentiation flag unavailable"));
        assert_eq!(report.failures[1].labels["operation"], "integrate");
        assert_eq!(report.context["supports_integration"], "true");
    }

    #[test]
    fn differentiation_forms_agree_for_consistent_candidate() {
        let differentiable = |p: &[f64], v: &[f64]| {
            Segmented::build(p, v).map(|mut s| {
                s.differentiation = true;
                s
            })
        };
        let config = ConformanceConfig { check_differentiation_forms: true, ..ConformanceConfig::default() };
        let suite = ConformanceSuite::with_config(segmented_kind(), differentiable, config).unwrap();
        assert_eq!(suite.checks().len(), 5);
        for report in suite.run_all() {
            assert!(report.passed(), "{}", report);
        }
    }

    #[test]
    fn differentiation_forms_skipped_without_capability() {
        let suite = ConformanceSuite::new(segmented_kind(), Segmented::build);
        let report = suite.differentiation_forms_agree();
        assert!(report.passed());
        assert!(report.context.contains_key("skipped"));
    }

    #[test]
    fn order_one_fails_factory_requiring_two_points() {
        let suite = ConformanceSuite::new(segmented_kind(), Segmented::build)
            .with_orders(vec![1, 3])
            .unwrap();
        let report = suite.can_deal_with_linear_samples();
        assert_eq!(report.failures.len(), 1, "{}", report);
        assert_eq!(report.failures[0].labels["samples"], "1");
    }

    #[test]
    fn invalid_orders_are_rejected() {
        assert!(matches!(
            ConformanceSuite::new(segmented_kind(), Segmented::build).with_orders(vec![]),
            Err(ConfigurationError::EmptyOrders)
        ));
    }

    #[test]
    fn checks_build_a_fresh_candidate_each() {
        let builds = Cell::new(0);
        let counting = |p: &[f64], v: &[f64]| {
            builds.set(builds.get() + 1);
            Segmented::build(p, v)
        };
        let suite = ConformanceSuite::new(segmented_kind(), counting).with_orders(vec![2, 4]).unwrap();
        suite.run_all();
        // A、B、C 各一次，D 每個 order 一次
        assert_eq!(builds.get(), 5);
    }

    #[test]
    fn seed_is_reported_and_reproducible() {
        let config = ConformanceConfig { seed: Some(77), ..ConformanceConfig::default() };
        let suite = ConformanceSuite::with_config(segmented_kind(), Segmented::build, config).unwrap();
        assert_eq!(suite.seed(), 77);
        let report = suite.can_deal_with_linear_samples();
        assert_eq!(report.context["seed"], "77");
    }
}
