//! Multi-device orchestration: shared session groups, suites of scenarios,
//! and the runner that turns soft and fatal failures into a report.
//!
//! A suite prepares its devices once and then runs every case in order on
//! the same [`SessionGroup`]. Devices are never synchronised implicitly; a
//! case that needs device B to see what device A did waits for it with the
//! element polling helpers.

use crate::assertion::{AssertionSummary, SoftErrors};
use crate::result::{E2eError, E2eResult};
use crate::session::Session;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write as _};
use std::time::Instant;
use uuid::Uuid;

// =============================================================================
// SESSION GROUP
// =============================================================================

/// Ordered devices shared by every case of a suite
#[derive(Debug, Default)]
pub struct SessionGroup {
    sessions: Vec<Session>,
}

impl SessionGroup {
    /// Wrap already created sessions
    #[must_use]
    pub fn new(sessions: Vec<Session>) -> Self {
        Self { sessions }
    }

    /// Create `count` sessions, numbered from 1.
    ///
    /// When one session cannot be created the ones already started are quit
    /// before the error is returned.
    pub fn create_shared<F>(count: usize, mut factory: F) -> E2eResult<Self>
    where
        F: FnMut(usize) -> E2eResult<Session>,
    {
        let mut sessions = Vec::with_capacity(count);
        for number in 1..=count {
            match factory(number) {
                Ok(session) => sessions.push(session),
                Err(e) => {
                    tracing::error!(device = number, error = %e, "failed to create session");
                    let partial = Self { sessions };
                    if let Err(quit) = partial.quit_all() {
                        tracing::warn!(error = %quit, "failed to quit partial session group");
                    }
                    return Err(e);
                }
            }
        }
        tracing::info!(count, "session group created");
        Ok(Self { sessions })
    }

    /// Device at `index` (0-based)
    pub fn device(&self, index: usize) -> E2eResult<&Session> {
        self.sessions.get(index).ok_or_else(|| {
            E2eError::config(format!(
                "no device {index} in a group of {}",
                self.sessions.len()
            ))
        })
    }

    /// Number of devices
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether the group has no devices
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Devices in order
    pub fn iter(&self) -> std::slice::Iter<'_, Session> {
        self.sessions.iter()
    }

    /// Quit every session, reporting the first failure
    pub fn quit_all(&self) -> E2eResult<()> {
        let mut first_error = None;
        for session in &self.sessions {
            if let Err(e) = session.quit() {
                tracing::warn!(device = session.number(), error = %e, "quit failed");
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

impl<'a> IntoIterator for &'a SessionGroup {
    type Item = &'a Session;
    type IntoIter = std::slice::Iter<'a, Session>;

    fn into_iter(self) -> Self::IntoIter {
        self.sessions.iter()
    }
}

// =============================================================================
// SCENARIO METADATA
// =============================================================================

/// Id of a case in the external test-management system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TestCaseId(pub u32);

impl fmt::Display for TestCaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Run selection marks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mark {
    /// Runs in the nightly job
    Nightly,
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Nightly => "nightly",
        })
    }
}

/// Name, id, marks and skip reason of one case
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioMeta {
    /// Case name
    pub name: String,
    /// Test-management id
    pub testrail_id: TestCaseId,
    /// Marks
    pub marks: Vec<Mark>,
    /// Why the case is skipped, if it is
    pub skip: Option<String>,
}

impl ScenarioMeta {
    /// Metadata for a case
    #[must_use]
    pub fn new(name: impl Into<String>, testrail_id: u32) -> Self {
        Self {
            name: name.into(),
            testrail_id: TestCaseId(testrail_id),
            marks: Vec::new(),
            skip: None,
        }
    }

    /// Add a mark
    #[must_use]
    pub fn with_mark(mut self, mark: Mark) -> Self {
        self.marks.push(mark);
        self
    }

    /// Skip the case
    #[must_use]
    pub fn skipped(mut self, reason: impl Into<String>) -> Self {
        self.skip = Some(reason.into());
        self
    }

    /// Whether the name or id contains `filter`
    #[must_use]
    pub fn matches(&self, filter: &str) -> bool {
        self.name.contains(filter) || self.testrail_id.to_string().contains(filter)
    }
}

/// Per-case state handed to a scenario: its metadata and soft errors
#[derive(Debug)]
pub struct ScenarioContext {
    /// Case metadata
    pub meta: ScenarioMeta,
    /// Soft assertion failures collected so far
    pub errors: SoftErrors,
}

impl ScenarioContext {
    /// Fresh context with no errors
    #[must_use]
    pub fn new(meta: ScenarioMeta) -> Self {
        Self {
            meta,
            errors: SoftErrors::new(),
        }
    }

    /// Log a scenario step
    pub fn just_fyi(&self, message: &str) {
        tracing::info!(case = %self.meta.name, "==> {message}");
    }

    /// Surface every soft failure collected so far
    pub fn verify_no_errors(&mut self) -> E2eResult<()> {
        Ok(self.errors.verify_no_errors()?)
    }
}

// =============================================================================
// SUITES
// =============================================================================

/// Body of one case
pub type ScenarioFn<S> = fn(&mut S, &SessionGroup, &mut ScenarioContext) -> E2eResult<()>;

/// One case of a suite
pub struct ScenarioCase<S> {
    /// Case metadata
    pub meta: ScenarioMeta,
    /// Case body
    pub run: ScenarioFn<S>,
}

impl<S> ScenarioCase<S> {
    /// Case with metadata and body
    #[must_use]
    pub fn new(meta: ScenarioMeta, run: ScenarioFn<S>) -> Self {
        Self { meta, run }
    }
}

impl<S> fmt::Debug for ScenarioCase<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScenarioCase")
            .field("meta", &self.meta)
            .finish_non_exhaustive()
    }
}

/// Cases sharing one group of devices prepared once
pub trait SharedDeviceSuite {
    /// Suite name
    fn name(&self) -> &str;

    /// Worker group; suites in one group must not run in parallel
    fn group(&self) -> &str;

    /// Devices the suite needs
    fn device_count(&self) -> usize;

    /// Bring the devices into the state every case starts from
    fn prepare_devices(&mut self, group: &SessionGroup) -> E2eResult<()>;

    /// Cases in run order
    fn cases(&self) -> Vec<ScenarioCase<Self>>
    where
        Self: Sized;

    /// Clean up after the last case
    fn teardown(&mut self, _group: &SessionGroup) -> E2eResult<()> {
        Ok(())
    }
}

// =============================================================================
// REPORTS
// =============================================================================

/// How one case ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CaseOutcome {
    /// No failures
    Passed,
    /// Ran to the end with soft failures
    Failed {
        /// Every soft failure message
        soft: Vec<String>,
    },
    /// Stopped by a fatal error
    Errored {
        /// The fatal error
        fatal: String,
        /// Soft failures collected before it
        soft: Vec<String>,
    },
    /// Not run
    Skipped {
        /// Why
        reason: String,
    },
}

impl CaseOutcome {
    /// Whether the case counts as passed
    #[must_use]
    pub const fn is_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }

    /// Whether the case failed or errored
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. } | Self::Errored { .. })
    }

    /// Upper-case label used in text reports
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Passed => "PASSED",
            Self::Failed { .. } => "FAILED",
            Self::Errored { .. } => "ERROR",
            Self::Skipped { .. } => "SKIPPED",
        }
    }
}

/// Outcome of one case
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseReport {
    /// Case metadata
    pub meta: ScenarioMeta,
    /// How it ended
    pub outcome: CaseOutcome,
    /// Wall time
    pub duration_ms: u64,
    /// Soft checks the case performed
    #[serde(default)]
    pub checks: AssertionSummary,
}

/// Outcome of a suite run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteReport {
    /// Unique run id
    pub run_id: Uuid,
    /// Suite name
    pub suite: String,
    /// Worker group
    pub group: String,
    /// Start time
    pub started_at: DateTime<Utc>,
    /// End time
    pub finished_at: DateTime<Utc>,
    /// Per-case outcomes, in run order
    pub cases: Vec<CaseReport>,
}

impl SuiteReport {
    /// Cases that passed
    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.cases.iter().filter(|c| c.outcome.is_passed()).count()
    }

    /// Cases with soft failures only
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.cases
            .iter()
            .filter(|c| matches!(c.outcome, CaseOutcome::Failed { .. }))
            .count()
    }

    /// Cases stopped by a fatal error
    #[must_use]
    pub fn errored_count(&self) -> usize {
        self.cases
            .iter()
            .filter(|c| matches!(c.outcome, CaseOutcome::Errored { .. }))
            .count()
    }

    /// Cases not run
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.cases
            .iter()
            .filter(|c| matches!(c.outcome, CaseOutcome::Skipped { .. }))
            .count()
    }

    /// Whether nothing failed or errored
    #[must_use]
    pub fn all_passed(&self) -> bool {
        !self.cases.iter().any(|c| c.outcome.is_failure())
    }

    /// Outcome of the case with `testrail_id`
    #[must_use]
    pub fn case(&self, testrail_id: u32) -> Option<&CaseReport> {
        self.cases
            .iter()
            .find(|c| c.meta.testrail_id == TestCaseId(testrail_id))
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> E2eResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Human-readable summary
    #[must_use]
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "Suite {} (group {}) run {}",
            self.suite, self.group, self.run_id
        );
        for case in &self.cases {
            let _ = write!(
                out,
                "  {:<7} [{}] {}",
                case.outcome.label(),
                case.meta.testrail_id,
                case.meta.name
            );
            match &case.outcome {
                CaseOutcome::Passed => {
                    let _ = writeln!(out, " ({}ms)", case.duration_ms);
                }
                CaseOutcome::Skipped { reason } => {
                    let _ = writeln!(out, ": {reason}");
                }
                CaseOutcome::Failed { soft } => {
                    let _ = writeln!(out, " ({}ms)", case.duration_ms);
                    render_soft(&mut out, soft);
                }
                CaseOutcome::Errored { fatal, soft } => {
                    let _ = writeln!(out, ": {fatal}");
                    render_soft(&mut out, soft);
                }
            }
        }
        let _ = writeln!(
            out,
            "{} passed, {} failed, {} errored, {} skipped",
            self.passed_count(),
            self.failed_count(),
            self.errored_count(),
            self.skipped_count()
        );
        out
    }
}

fn render_soft(out: &mut String, soft: &[String]) {
    for (i, message) in soft.iter().enumerate() {
        let _ = writeln!(out, "      {}. {message}", i + 1);
    }
}

// =============================================================================
// RUNNER
// =============================================================================

/// Runs a suite's cases in order on a prepared group
#[derive(Debug, Clone, Default)]
pub struct SuiteRunner {
    filter: Option<String>,
}

impl SuiteRunner {
    /// Runner for every case
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Only run cases whose name or id contains `filter`
    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Prepare the suite once, then run every selected case
    pub fn run<S: SharedDeviceSuite>(&self, suite: &mut S, group: &SessionGroup) -> SuiteReport {
        let started_at = Utc::now();
        let run_id = Uuid::new_v4();
        let cases: Vec<ScenarioCase<S>> = suite
            .cases()
            .into_iter()
            .filter(|c| self.filter.as_deref().map_or(true, |f| c.meta.matches(f)))
            .collect();
        tracing::info!(suite = suite.name(), %run_id, cases = cases.len(), "running suite");

        let prepared = if group.len() < suite.device_count() {
            Err(format!(
                "suite needs {} device(s), group has {}",
                suite.device_count(),
                group.len()
            ))
        } else if cases.iter().all(|c| c.meta.skip.is_some()) {
            Ok(())
        } else {
            suite
                .prepare_devices(group)
                .map_err(|e| format!("prepare_devices failed: {e}"))
        };
        if let Err(e) = &prepared {
            tracing::error!(suite = suite.name(), error = %e, "suite setup failed");
        }

        let mut reports = Vec::with_capacity(cases.len());
        for case in cases {
            let start = Instant::now();
            let (outcome, checks) = match (&case.meta.skip, &prepared) {
                (Some(reason), _) => (
                    CaseOutcome::Skipped {
                        reason: reason.clone(),
                    },
                    AssertionSummary::default(),
                ),
                (None, Err(e)) => (
                    CaseOutcome::Errored {
                        fatal: e.clone(),
                        soft: Vec::new(),
                    },
                    AssertionSummary::default(),
                ),
                (None, Ok(())) => run_case(suite, group, &case),
            };
            let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
            tracing::info!(case = %case.meta.name, id = %case.meta.testrail_id, status = outcome.label(), duration_ms, checks = checks.total, "case finished");
            reports.push(CaseReport {
                meta: case.meta,
                outcome,
                duration_ms,
                checks,
            });
        }

        if prepared.is_ok() {
            if let Err(e) = suite.teardown(group) {
                tracing::warn!(suite = suite.name(), error = %e, "teardown failed");
            }
        }

        SuiteReport {
            run_id,
            suite: suite.name().to_string(),
            group: suite.group().to_string(),
            started_at,
            finished_at: Utc::now(),
            cases: reports,
        }
    }
}

fn run_case<S>(
    suite: &mut S,
    group: &SessionGroup,
    case: &ScenarioCase<S>,
) -> (CaseOutcome, AssertionSummary) {
    let mut ctx = ScenarioContext::new(case.meta.clone());
    tracing::info!(case = %case.meta.name, id = %case.meta.testrail_id, "case started");
    let outcome = match (case.run)(suite, group, &mut ctx) {
        Ok(()) if ctx.errors.is_empty() => CaseOutcome::Passed,
        Ok(()) => CaseOutcome::Failed {
            soft: ctx.errors.drain(),
        },
        Err(E2eError::SoftAssertions(soft)) => {
            let mut messages = soft.failures;
            messages.extend(ctx.errors.drain());
            CaseOutcome::Failed { soft: messages }
        }
        Err(fatal) => CaseOutcome::Errored {
            fatal: fatal.to_string(),
            soft: ctx.errors.drain(),
        },
    };
    (outcome, ctx.errors.summary())
}
