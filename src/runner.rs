// src/runner.rs
use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;
use std::time::Instant;

use crate::config::HarnessConfig;
use crate::errors::{ExecutionError, Result, RunnerError};
use crate::harness::{classify_crash, extract_report};
use crate::judge::CodeJudge;
use crate::models::{ExecuteCodeRequest, ExecuteTestCaseRequest, TestCaseOutcome, TestCaseResult};

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").unwrap());

const DRIVER: &str = r#""use strict";
(async () => {
  const emit = (payload) => {
    process.stdout.write("\n@@harness@@" + JSON.stringify(payload) + "\n");
  };
  const message = (e) => (e && e.message !== undefined ? String(e.message) : String(e));
  const equal = (a, b) => {
    if (Object.is(a, b)) return true;
    if (typeof a !== "object" || typeof b !== "object" || a === null || b === null) return false;
    if (Array.isArray(a) !== Array.isArray(b)) return false;
    const ka = Object.keys(a);
    const kb = Object.keys(b);
    if (ka.length !== kb.length) return false;
    return ka.every((k) => Object.prototype.hasOwnProperty.call(b, k) && equal(a[k], b[k]));
  };
  const submission = __PAYLOAD__;
  const name = submission.functionName;
  let load;
  try {
    load = new Function(submission.code + "\n;return typeof " + name + " === \"function\" ? " + name + " : undefined;");
  } catch (e) {
    emit({ error: { kind: "CompileError", message: message(e) } });
    return;
  }
  let target;
  try {
    target = load();
  } catch (e) {
    emit({ error: { kind: "RuntimeError", message: message(e) } });
    return;
  }
  if (target === undefined) {
    emit({ error: { kind: "RuntimeError", message: "function " + name + " is not defined" } });
    return;
  }
  const results = [];
  for (const c of submission.cases) {
    try {
      const value = await target(...c.input);
      const json = JSON.stringify(value);
      const actual = json === undefined ? null : JSON.parse(json);
      results.push({ input: c.input, expected: c.expected, actual, passed: equal(actual, c.expected) });
    } catch (e) {
      results.push({ input: c.input, expected: c.expected, actual: null, passed: false, error: message(e) });
    }
  }
  emit({ results });
})();
"#;

#[derive(Deserialize)]
struct DriverReport {
    #[serde(default)]
    results: Option<Vec<TestCaseResult>>,
    #[serde(default)]
    error: Option<ExecutionError>,
}

fn validate(request: &ExecuteTestCaseRequest) -> Result<()> {
    if !matches!(request.language.as_str(), "javascript" | "js") {
        return Err(RunnerError::UnsupportedLanguage(request.language.clone()));
    }
    if !IDENTIFIER.is_match(&request.function_name) {
        return Err(RunnerError::Validation(format!(
            "'{}' is not a valid function name",
            request.function_name
        )));
    }
    if request.test_cases.is_empty() {
        return Err(RunnerError::Validation("at least one test case is required".to_string()));
    }
    Ok(())
}

/// Builds the driver program for one test-case request.
pub fn build_driver(request: &ExecuteTestCaseRequest) -> Result<String> {
    validate(request)?;
    // `functionName` is spliced into source text by the driver, so it must
    // already be a plain identifier here.
    let payload = serde_json::to_string(&serde_json::json!({
        "code": request.code,
        "functionName": request.function_name,
        "cases": request.test_cases,
    }))?;
    Ok(DRIVER.replacen("__PAYLOAD__", &payload, 1))
}

/// Runs the named function once per test case and compares each answer with
/// the expected value.
pub async fn run_test_cases(
    judge: &dyn CodeJudge,
    harness: &HarnessConfig,
    request: &ExecuteTestCaseRequest,
) -> Result<TestCaseOutcome> {
    let source = build_driver(request)?;
    let version = request.version.clone().unwrap_or_else(|| harness.version.clone());
    let execute = ExecuteCodeRequest::new(request.language.clone(), version, source);

    log::info!(
        "Running {} test cases for '{}' on {}",
        request.test_cases.len(),
        request.function_name,
        judge.name()
    );

    let start = Instant::now();
    let response = judge.execute(&execute).await?;
    let latency_ms = start.elapsed().as_millis() as u64;

    let report: DriverReport = match extract_report(&response.run.stdout) {
        Some(Ok(report)) => report,
        Some(Err(e)) => {
            return Err(ExecutionError::engine(format!("malformed report: {}", e)).into());
        }
        None => return Err(classify_crash(&response.run).into()),
    };

    if let Some(error) = report.error {
        log::warn!("Test cases for '{}' failed: {}", request.function_name, error);
        return Err(error.into());
    }

    let test_case = report
        .results
        .ok_or_else(|| ExecutionError::engine("report carried neither results nor an error"))?;
    let passed = test_case.iter().all(|c| c.passed);

    log::info!(
        "Test cases for '{}': {}/{} passed ({}ms)",
        request.function_name,
        test_case.iter().filter(|c| c.passed).count(),
        test_case.len(),
        latency_ms
    );

    Ok(TestCaseOutcome { passed, test_case })
}
