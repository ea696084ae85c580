//! Command implementations

use crate::error::{CliError, CliResult};
use serde::Serialize;
use status_e2e::{
    AppiumDriver, BuiltinSuite, E2eConfig, LinkKind, LinkScheme, ScenarioMeta, Session,
    SessionGroup, StatusLink, SuiteReport, SuiteRunner, Translations,
};
use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;

/// Configuration from `path`, or defaults with environment overrides
pub fn load_config(path: Option<&Path>) -> CliResult<E2eConfig> {
    let config = match path {
        Some(path) => E2eConfig::load(path)?,
        None => E2eConfig::default().with_env_overrides().validated()?,
    };
    Ok(config)
}

/// Translation table named by the configuration, or the built-in one
pub fn load_translations(config: &E2eConfig) -> CliResult<Arc<Translations>> {
    let table = match &config.translations {
        Some(path) => Translations::from_file(path)?,
        None => Translations::builtin(),
    };
    Ok(Arc::new(table))
}

/// Start `count` Appium sessions
pub fn connect(config: &E2eConfig, count: usize) -> CliResult<SessionGroup> {
    let translations = load_translations(config)?;
    let group = SessionGroup::create_shared(count, |number| {
        let driver = AppiumDriver::connect(config, number - 1)?;
        Ok(Session::from_config(
            number,
            Box::new(driver),
            config,
            Arc::clone(&translations),
        ))
    })?;
    Ok(group)
}

/// Run `suite` on an existing group
#[must_use]
pub fn execute(suite: BuiltinSuite, filter: Option<&str>, group: &SessionGroup) -> SuiteReport {
    let runner = match filter {
        Some(filter) => SuiteRunner::new().with_filter(filter),
        None => SuiteRunner::new(),
    };
    suite.run(&runner, group)
}

/// Save the JSON report
pub fn write_report(report: &SuiteReport, path: &Path) -> CliResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, report.to_json()?)?;
    tracing::info!(path = %path.display(), "report written");
    Ok(())
}

/// Turn a finished report into the process outcome
pub fn check_report(report: &SuiteReport) -> CliResult<()> {
    if report.all_passed() {
        return Ok(());
    }
    let failing = report.failed_count() + report.errored_count();
    Err(CliError::suite_failed(format!(
        "{failing} of {} cases did not pass",
        report.cases.len()
    )))
}

// =============================================================================
// CATALOG
// =============================================================================

/// One suite as `list` shows it
#[derive(Debug, Clone, Serialize)]
pub struct SuiteEntry {
    /// Suite name
    pub name: &'static str,
    /// Worker group
    pub group: &'static str,
    /// Devices needed
    pub devices: usize,
    /// Cases in run order
    pub cases: Vec<ScenarioMeta>,
}

/// Every built-in suite
#[must_use]
pub fn catalog() -> Vec<SuiteEntry> {
    BuiltinSuite::ALL
        .into_iter()
        .map(|suite| SuiteEntry {
            name: suite.name(),
            group: suite.group(),
            devices: suite.device_count(),
            cases: suite.cases(),
        })
        .collect()
}

/// Text listing of the catalog
#[must_use]
pub fn render_catalog(entries: &[SuiteEntry]) -> String {
    let mut out = String::new();
    for entry in entries {
        let _ = writeln!(
            out,
            "{} (group {}, {} device{})",
            entry.name,
            entry.group,
            entry.devices,
            if entry.devices == 1 { "" } else { "s" }
        );
        for case in &entry.cases {
            let marks: Vec<String> = case.marks.iter().map(ToString::to_string).collect();
            let _ = write!(out, "  [{}] {}", case.testrail_id, case.name);
            if !marks.is_empty() {
                let _ = write!(out, " ({})", marks.join(", "));
            }
            if let Some(reason) = &case.skip {
                let _ = write!(out, " skipped: {reason}");
            }
            out.push('\n');
        }
    }
    out
}

// =============================================================================
// LINKS
// =============================================================================

/// Assemble a link, rejecting keys and payloads the app could not open
pub fn build_link(
    key: &str,
    kind: LinkKind,
    payload: Option<&str>,
    scheme: LinkScheme,
) -> CliResult<String> {
    if key.is_empty() || key.contains(['#', '/']) {
        return Err(CliError::invalid_argument(format!("invalid key '{key}'")));
    }
    let mut link = StatusLink::new(scheme, kind, key);
    if let Some(payload) = payload {
        link = link.with_payload(payload);
        let _ = link.payload_bytes()?;
    }
    Ok(link.to_string())
}

/// Re-route a link through `to`
pub fn convert_link(link: &str, to: LinkScheme) -> CliResult<String> {
    let parsed: StatusLink = link.parse()?;
    Ok(parsed.with_scheme(to).to_string())
}
