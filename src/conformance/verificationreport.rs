use std::collections::BTreeMap;
use std::fmt::Display;

use chrono::{
    DateTime,
    Utc
};
use serde::{
    Deserialize,
    Serialize
};
use thiserror::Error;
use tracing::{
    debug,
    warn
};
use uuid::Uuid;

// ─────────────────────────────────────────────────────────────────────────────
// CheckName
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CheckName {
    FactoryReturnsCorrectType,
    ConsistentCapabilityBehavior,
    InterpolationMatchesNodePoints,
    CanDealWithLinearSamples,
    /// 預設不啟用
    DifferentiationFormsAgree,
}

impl CheckName {
    /// 預設啟用的四項檢查
    pub fn standard() -> Vec<CheckName> {
        vec![
            CheckName::FactoryReturnsCorrectType,
            CheckName::ConsistentCapabilityBehavior,
            CheckName::InterpolationMatchesNodePoints,
            CheckName::CanDealWithLinearSamples,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            CheckName::FactoryReturnsCorrectType      => "FactoryReturnsCorrectType",
            CheckName::ConsistentCapabilityBehavior   => "ConsistentCapabilityBehavior",
            CheckName::InterpolationMatchesNodePoints => "InterpolationMatchesNodePoints",
            CheckName::CanDealWithLinearSamples       => "CanDealWithLinearSamples",
            CheckName::DifferentiationFormsAgree      => "DifferentiationFormsAgree",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            CheckName::FactoryReturnsCorrectType => {
                "factory returns a candidate of the expected kind"
            }
            CheckName::ConsistentCapabilityBehavior => {
                "capability flags agree with the behavior of the gated operations"
            }
            CheckName::InterpolationMatchesNodePoints => {
                "interpolation reproduces every node value"
            }
            CheckName::CanDealWithLinearSamples => {
                "interpolation reproduces linear samples between and around the nodes"
            }
            CheckName::DifferentiationFormsAgree => {
                "single and dual differentiation forms agree with each other and with interpolate"
            }
        }
    }
}

impl Display for CheckName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Failure
// ─────────────────────────────────────────────────────────────────────────────

/// 單一失敗描述：訊息、期望值、實際值、情境標籤，以及候選實作回報的錯誤
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Failure {
    pub message: String,
    pub expected: Option<String>,
    pub actual: Option<String>,
    pub labels: BTreeMap<String, String>,
    pub error: Option<String>,
}

impl Failure {
    pub fn new(message: impl Into<String>) -> Failure {
        Failure {
            message: message.into(),
            expected: None,
            actual: None,
            labels: BTreeMap::new(),
            error: None,
        }
    }

    pub fn expected(mut self, expected: impl Display) -> Failure {
        self.expected = Some(expected.to_string());
        self
    }

    pub fn actual(mut self, actual: impl Display) -> Failure {
        self.actual = Some(actual.to_string());
        self
    }

    pub fn label(mut self, key: impl Into<String>, value: impl Display) -> Failure {
        self.labels.insert(key.into(), value.to_string());
        self
    }

    pub fn error(mut self, error: impl Display) -> Failure {
        self.error = Some(error.to_string());
        self
    }
}

impl Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(expected) = &self.expected {
            write!(f, "; expected {}", expected)?;
        }
        if let Some(actual) = &self.actual {
            write!(f, ", actual {}", actual)?;
        }
        for (key, value) in &self.labels {
            write!(f, " [{}={}]", key, value)?;
        }
        if let Some(error) = &self.error {
            write!(f, " (error: {})", error)?;
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// CheckReport
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum Verdict {
    Passed,
    Failed,
}

/// 單項檢查的結果。每次檢查執行後即交還呼叫端，不做彙總或保存。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckReport {
    pub check: CheckName,
    pub verdict: Verdict,
    pub failures: Vec<Failure>,
    /// 重現用情境，例如亂數種子與預期型別
    pub context: BTreeMap<String, String>,
    pub suite_id: Uuid,
    pub timestamp: DateTime<Utc>,
}

impl CheckReport {
    pub fn passed(&self) -> bool {
        self.verdict == Verdict::Passed
    }

    pub fn into_result(self) -> Result<(), ConformanceFailure> {
        if self.passed() {
            Ok(())
        } else {
            Err(ConformanceFailure { report: self })
        }
    }
}

impl Display for CheckReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let verdict = match self.verdict {
            Verdict::Passed => "passed",
            Verdict::Failed => "FAILED",
        };
        writeln!(f, "{} {}: {}", self.check, verdict, self.check.description())?;
        for (key, value) in &self.context {
            writeln!(f, "  {} = {}", key, value)?;
        }
        for failure in &self.failures {
            writeln!(f, "  - {}", failure)?;
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
#[error("conformance check failed\n{report}")]
pub struct ConformanceFailure {
    pub report: CheckReport,
}

// ─────────────────────────────────────────────────────────────────────────────
// CheckReportBuilder
// ─────────────────────────────────────────────────────────────────────────────

pub struct CheckReportBuilder {
    check: CheckName,
    suite_id: Uuid,
    failures: Vec<Failure>,
    context: BTreeMap<String, String>,
}

impl CheckReportBuilder {
    pub fn new(check: CheckName, suite_id: Uuid) -> CheckReportBuilder {
        debug!(check = %check, suite = %suite_id, "running conformance check");
        CheckReportBuilder {
            check,
            suite_id,
            failures: Vec::new(),
            context: BTreeMap::new(),
        }
    }

    pub fn context(&mut self, key: impl Into<String>, value: impl Display) {
        self.context.insert(key.into(), value.to_string());
    }

    pub fn fail(&mut self, failure: Failure) {
        warn!(check = %self.check, suite = %self.suite_id, "{}", failure);
        self.failures.push(failure);
    }

    pub fn finish(self) -> CheckReport {
        let verdict = if self.failures.is_empty() {
            Verdict::Passed
        } else {
            Verdict::Failed
        };
        debug!(check = %self.check, suite = %self.suite_id, failures = self.failures.len(), "conformance check finished");
        CheckReport {
            check: self.check,
            verdict,
            failures: self.failures,
            context: self.context,
            suite_id: self.suite_id,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_builder_passes() {
        let report = CheckReportBuilder::new(CheckName::InterpolationMatchesNodePoints, Uuid::new_v4()).finish();
        assert!(report.passed());
        assert!(report.into_result().is_ok());
    }

    #[test]
    fn failure_is_rendered_with_labels() {
        let mut builder = CheckReportBuilder::new(CheckName::InterpolationMatchesNodePoints, Uuid::new_v4());
        builder.context("tolerance", 1e-12);
        builder.fail(
            Failure::new("node value not reproduced")
                .expected(30.0)
                .actual(29.5)
                .label("index", 2)
        );
        let report = builder.finish();
        assert_eq!(report.verdict, Verdict::Failed);

        let text = report.to_string();
        assert!(text.contains("InterpolationMatchesNodePoints FAILED"));
        assert!(text.contains("expected 30, actual 29.5 [index=2]"));
        assert!(text.contains("tolerance = 0.000000000001"));

        let failure = report.into_result().unwrap_err();
        assert_eq!(failure.report.failures.len(), 1);
    }

    #[test]
    fn report_serializes_to_json() {
        let mut builder = CheckReportBuilder::new(CheckName::FactoryReturnsCorrectType, Uuid::new_v4());
        builder.fail(Failure::new("wrong kind").expected("Linear").actual("ForwardFlat"));
        let json = serde_json::to_value(builder.finish()).unwrap();
        assert_eq!(json["check"], "FactoryReturnsCorrectType");
        assert_eq!(json["verdict"], "Failed");
        assert_eq!(json["failures"][0]["expected"], "Linear");
    }
}
