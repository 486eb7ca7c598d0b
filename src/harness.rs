// src/harness.rs
//! Runs user code against test code through a judge.
//!
//! The submitted code never runs in this process. We ship a small assertion
//! engine (`describe`, `it`, `test`, `expect`) as a prelude, splice the user
//! and test code in as one JSON object, and let the judge execute the whole
//! program. The program reports back on stdout with a single marker line:
//!
//! ```text
//! @@harness@@{"results":[{"duration":1,"errors":[],"status":"pass","testPath":["adds"]}]}
//! @@harness@@{"error":{"kind":"CompileError","message":"Unexpected token '}'"}}
//! ```
//!
//! Every call runs a fresh engine, so the results describe this call only.

use regex::Regex;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::sync::{Arc, LazyLock};
use std::time::Duration;

use crate::config::HarnessConfig;
use crate::errors::{ExecutionError, Result};
use crate::judge::CodeJudge;
use crate::models::{ExecuteCodeRequest, RunOutput, TestResult};

pub(crate) const REPORT_MARKER: &str = "@@harness@@";

const ENGINE_PRELUDE: &str = r#""use strict";
const __harness = (() => {
  const tests = [];
  const stack = [];
  const emit = (payload) => {
    process.stdout.write("\n@@harness@@" + JSON.stringify(payload) + "\n");
  };
  const message = (e) => (e && e.message !== undefined ? String(e.message) : String(e));
  const fmt = (v) => {
    try {
      const s = JSON.stringify(v);
      return s === undefined ? String(v) : s;
    } catch (_) {
      return String(v);
    }
  };
  const equal = (a, b) => {
    if (Object.is(a, b)) return true;
    if (typeof a !== "object" || typeof b !== "object" || a === null || b === null) return false;
    if (Array.isArray(a) !== Array.isArray(b)) return false;
    const ka = Object.keys(a);
    const kb = Object.keys(b);
    if (ka.length !== kb.length) return false;
    return ka.every((k) => Object.prototype.hasOwnProperty.call(b, k) && equal(a[k], b[k]));
  };
  function describe(name, fn) {
    stack.push(String(name));
    try {
      fn();
    } finally {
      stack.pop();
    }
  }
  function it(name, fn) {
    tests.push({ path: [...stack, String(name)], fn });
  }
  function expect(actual) {
    const build = (negated) => {
      const check = (ok, text) => {
        if (Boolean(ok) === negated) {
          throw new Error("expected " + fmt(actual) + (negated ? " not " : " ") + text);
        }
      };
      return {
        toBe: (e) => check(Object.is(actual, e), "to be " + fmt(e)),
        toEqual: (e) => check(equal(actual, e), "to equal " + fmt(e)),
        toStrictEqual: (e) => check(equal(actual, e), "to strictly equal " + fmt(e)),
        toBeTruthy: () => check(!!actual, "to be truthy"),
        toBeFalsy: () => check(!actual, "to be falsy"),
        toBeNull: () => check(actual === null, "to be null"),
        toBeUndefined: () => check(actual === undefined, "to be undefined"),
        toBeDefined: () => check(actual !== undefined, "to be defined"),
        toContain: (item) =>
          check(actual != null && typeof actual.includes === "function" && actual.includes(item), "to contain " + fmt(item)),
        toHaveLength: (n) => check(actual != null && actual.length === n, "to have length " + n),
        toBeGreaterThan: (n) => check(actual > n, "to be greater than " + fmt(n)),
        toBeLessThan: (n) => check(actual < n, "to be less than " + fmt(n)),
        toThrow: () => {
          let threw = false;
          try {
            actual();
          } catch (_) {
            threw = true;
          }
          check(threw, "to throw");
        },
      };
    };
    const matchers = build(false);
    matchers.not = build(true);
    return matchers;
  }
  async function run() {
    const results = [];
    for (const t of tests) {
      const errors = [];
      const start = Date.now();
      try {
        await t.fn();
      } catch (e) {
        errors.push(message(e));
      }
      results.push({
        duration: Date.now() - start,
        errors,
        status: errors.length ? "fail" : "pass",
        testPath: t.path,
      });
    }
    return results;
  }
  return { describe, it, test: it, expect, run, emit, message };
})();
"#;

const ENGINE_MAIN: &str = r#"
(async () => {
  const submission = __PAYLOAD__;
  let unit;
  try {
    unit = new Function("describe", "it", "test", "expect", submission.user + "\n;\n" + submission.test);
  } catch (e) {
    __harness.emit({ error: { kind: "CompileError", message: __harness.message(e) } });
    return;
  }
  try {
    unit(__harness.describe, __harness.it, __harness.test, __harness.expect);
  } catch (e) {
    __harness.emit({ error: { kind: "RuntimeError", message: __harness.message(e) } });
    return;
  }
  try {
    __harness.emit({ results: await __harness.run() });
  } catch (e) {
    __harness.emit({ error: { kind: "EngineError", message: __harness.message(e) } });
  }
})();
"#;

static ERROR_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^(?:Uncaught )?(\w*Error)(?::\s*(.*))?$").unwrap());

#[derive(Deserialize)]
struct HarnessReport {
    #[serde(default)]
    results: Option<Vec<TestResult>>,
    #[serde(default)]
    error: Option<ExecutionError>,
}

/// Builds the single program the judge runs for one harness call.
pub fn build_program(user_code: &str, test_code: &str) -> String {
    // One JSON object, spliced in once; the inserted text is never scanned again.
    let payload = serde_json::json!({ "user": user_code, "test": test_code }).to_string();
    format!("{}{}", ENGINE_PRELUDE, ENGINE_MAIN.replacen("__PAYLOAD__", &payload, 1))
}

/// Finds the last report line in `stdout` and decodes its payload.
pub(crate) fn extract_report<T: DeserializeOwned>(stdout: &str) -> Option<std::result::Result<T, serde_json::Error>> {
    stdout
        .lines()
        .rev()
        .find_map(|line| line.trim_end().strip_prefix(REPORT_MARKER))
        .map(serde_json::from_str)
}

/// Explains a run that ended without a report line.
pub(crate) fn classify_crash(run: &RunOutput) -> ExecutionError {
    if let Some(signal) = &run.signal {
        return ExecutionError::engine(format!("program was killed by {}", signal));
    }
    match ERROR_LINE.captures(&run.stderr) {
        Some(caps) => {
            let name = &caps[1];
            let line = caps.get(0).map(|m| m.as_str().to_string()).unwrap_or_default();
            if name == "SyntaxError" {
                ExecutionError::compile(line)
            } else {
                ExecutionError::runtime(line)
            }
        }
        None => {
            let stderr = run.stderr.trim();
            if stderr.is_empty() {
                ExecutionError::engine(format!("no report produced (exit code {:?})", run.code))
            } else {
                ExecutionError::engine(stderr.to_string())
            }
        }
    }
}

/// Turns the judge's output for one harness program into results.
pub fn parse_run(run: &RunOutput) -> std::result::Result<Vec<TestResult>, ExecutionError> {
    let report: HarnessReport = match extract_report(&run.stdout) {
        Some(Ok(report)) => report,
        Some(Err(e)) => return Err(ExecutionError::engine(format!("malformed report: {}", e))),
        None => return Err(classify_crash(run)),
    };

    match (report.error, report.results) {
        (Some(error), _) => Err(error),
        (None, Some(results)) => Ok(results),
        (None, None) => Err(ExecutionError::engine("report carried neither results nor an error")),
    }
}

/// Adapter between an editor session and the judge.
pub struct TestHarness {
    judge: Arc<dyn CodeJudge>,
    language: String,
    version: String,
    delay: Duration,
}

impl TestHarness {
    pub fn new(judge: Arc<dyn CodeJudge>, config: &HarnessConfig) -> Self {
        Self {
            judge,
            language: config.language.clone(),
            version: config.version.clone(),
            delay: config.delay(),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Runs every test declared by `test_code` against `user_code`.
    ///
    /// Problems with the submitted code come back as
    /// [`RunnerError::Execution`](crate::errors::RunnerError::Execution); judge
    /// and network failures keep their own variants.
    pub async fn run(&self, user_code: &str, test_code: &str) -> Result<Vec<TestResult>> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let request = ExecuteCodeRequest::new(
            self.language.clone(),
            self.version.clone(),
            build_program(user_code, test_code),
        );
        let response = self.judge.execute(&request).await?;

        match parse_run(&response.run) {
            Ok(results) => {
                log::info!(
                    "Harness run on {}: {} tests, {} failed",
                    self.judge.name(),
                    results.len(),
                    results.iter().filter(|r| !r.passed()).count()
                );
                Ok(results)
            }
            Err(error) => {
                log::warn!("Harness run on {} failed: {}", self.judge.name(), error);
                Err(error.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{ExecutionErrorKind, RunnerError};
    use crate::judge::{LocalNodeJudge, ScriptedJudge};
    use crate::models::TestStatus;

    fn harness(judge: Arc<ScriptedJudge>) -> TestHarness {
        TestHarness::new(judge, &HarnessConfig::default()).with_delay(Duration::ZERO)
    }

    fn run_with(stdout: &str, stderr: &str, code: Option<i32>) -> RunOutput {
        RunOutput {
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
            code,
            signal: None,
            output: format!("{}{}", stdout, stderr),
        }
    }

    #[test]
    fn program_embeds_code_as_one_payload() {
        let program = build_program("const s = \"a\\nb\";", "test('x', () => {})");
        assert!(program.contains(r#"const submission = {"test":"test('x', () => {})","user":"const s = \"a\\nb\";"};"#));
        assert!(!program.contains("__PAYLOAD__"));
    }

    #[test]
    fn placeholder_text_in_user_code_stays_data() {
        let program = build_program("const s = '__PAYLOAD__ __TEST_CODE__';", "const t = '__PAYLOAD__';");
        assert_eq!(program.matches("const submission = ").count(), 1);
        assert!(program.contains(r#""user":"const s = '__PAYLOAD__ __TEST_CODE__';""#));
        assert!(program.contains(r#""test":"const t = '__PAYLOAD__';""#));
    }

    #[test]
    fn last_report_line_wins() {
        let stdout = "hello\n@@harness@@{\"results\":[]}\nnoise\n@@harness@@{\"results\":[{\"duration\":2,\"errors\":[\"expected 4 to be 5\"],\"status\":\"fail\",\"testPath\":[\"math\",\"adds\"]}]}\n";
        let results = parse_run(&run_with(stdout, "", Some(0))).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].status, TestStatus::Fail);
        assert_eq!(results[0].test_path, vec!["math", "adds"]);
        assert_eq!(results[0].errors, vec!["expected 4 to be 5"]);
    }

    #[test]
    fn reported_errors_keep_their_kind() {
        let stdout = "@@harness@@{\"error\":{\"kind\":\"RuntimeError\",\"message\":\"add is not defined\"}}";
        let err = parse_run(&run_with(stdout, "", Some(0))).unwrap_err();
        assert_eq!(err.kind, ExecutionErrorKind::RuntimeError);
        assert_eq!(err.message, "add is not defined");
    }

    #[test]
    fn crashes_are_classified_from_stderr() {
        let syntax = run_with("", "file.js:3\n}\n^\n\nSyntaxError: Unexpected token '}'\n", Some(1));
        assert_eq!(parse_run(&syntax).unwrap_err().kind, ExecutionErrorKind::CompileError);

        let range = run_with("", "RangeError: Maximum call stack size exceeded\n", Some(1));
        assert_eq!(parse_run(&range).unwrap_err().kind, ExecutionErrorKind::RuntimeError);

        let silent = run_with("", "", Some(139));
        assert_eq!(parse_run(&silent).unwrap_err().kind, ExecutionErrorKind::EngineError);

        let mut killed = run_with("", "", None);
        killed.signal = Some("SIGKILL".to_string());
        let err = parse_run(&killed).unwrap_err();
        assert_eq!(err.kind, ExecutionErrorKind::EngineError);
        assert!(err.message.contains("SIGKILL"));
    }

    #[test]
    fn garbage_after_marker_is_an_engine_error() {
        let err = parse_run(&run_with("@@harness@@{not json", "", Some(0))).unwrap_err();
        assert_eq!(err.kind, ExecutionErrorKind::EngineError);
    }

    #[actix_rt::test]
    async fn passing_add_test_yields_one_result() {
        let judge = Arc::new(ScriptedJudge::new());
        judge.push_stdout(
            "@@harness@@{\"results\":[{\"duration\":0,\"errors\":[],\"status\":\"pass\",\"testPath\":[\"adds\"]}]}\n",
            0,
        );

        let results = harness(judge.clone())
            .run("function add(a,b){return a+b}", "test('adds', () => expect(add(2,3)).toBe(5))")
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        assert!(results[0].passed());
        assert!(results[0].errors.is_empty());

        let requests = judge.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].language, "javascript");
        assert!(requests[0].source.contains("function add(a,b){return a+b}"));
    }

    #[actix_rt::test]
    async fn invalid_user_code_is_a_compile_error() {
        let judge = Arc::new(ScriptedJudge::new());
        judge.push_stdout(
            "@@harness@@{\"error\":{\"kind\":\"CompileError\",\"message\":\"Unexpected token '{'\"}}\n",
            0,
        );

        let err = harness(judge).run("function add(a,b){{", "").await.unwrap_err();
        match err {
            RunnerError::Execution(e) => assert_eq!(e.kind, ExecutionErrorKind::CompileError),
            other => panic!("expected an execution error, got {:?}", other),
        }
    }

    #[actix_rt::test]
    async fn judge_failures_are_not_execution_errors() {
        let judge = Arc::new(ScriptedJudge::new());
        judge.push(Err(RunnerError::ApiError { status: 503, body: "down".to_string() }));

        let err = harness(judge).run("", "").await.unwrap_err();
        assert!(matches!(err, RunnerError::ApiError { status: 503, .. }));
    }

    fn node_harness() -> Option<TestHarness> {
        if !crate::judge::local::node_available() {
            eprintln!("node not found, skipping");
            return None;
        }
        let judge = Arc::new(LocalNodeJudge::new("node", Duration::from_secs(20)));
        Some(TestHarness::new(judge, &HarnessConfig::default()).with_delay(Duration::ZERO))
    }

    #[actix_rt::test]
    async fn node_runs_the_add_example() {
        let Some(harness) = node_harness() else { return };

        let results = harness
            .run("function add(a, b) { return a + b; }", "test('adds', () => expect(add(2, 3)).toBe(5))")
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        assert!(results[0].passed());
        assert_eq!(results[0].test_path, vec!["adds"]);
    }

    #[actix_rt::test]
    async fn node_reports_nested_paths_in_declaration_order() {
        let Some(harness) = node_harness() else { return };
        let tests = r#"
            describe('math', () => {
              describe('add', () => {
                it('adds', () => expect(add(2, 2)).toBe(5));
              });
              it('negates', () => expect(add(1, 1)).not.toBe(3));
            });
            test('top', () => expect([add(1, 2)]).toEqual([3]));
        "#;

        let results = harness.run("function add(a, b) { return a + b; }", tests).await.unwrap();

        let paths: Vec<Vec<String>> = results.iter().map(|r| r.test_path.clone()).collect();
        assert_eq!(paths, vec![vec!["math", "add", "adds"], vec!["math", "negates"], vec!["top"]]);
        assert_eq!(results[0].status, TestStatus::Fail);
        assert_eq!(results[0].errors, vec!["expected 4 to be 5"]);
        assert!(results[1].passed());
        assert!(results[2].passed());
    }

    #[actix_rt::test]
    async fn node_rejects_invalid_code_as_compile_error() {
        let Some(harness) = node_harness() else { return };

        let err = harness.run("function add(a,b){{", "").await.unwrap_err();
        match err {
            RunnerError::Execution(e) => assert_eq!(e.kind, ExecutionErrorKind::CompileError),
            other => panic!("expected an execution error, got {:?}", other),
        }
    }

    #[actix_rt::test]
    async fn node_keeps_placeholder_text_in_user_code() {
        let Some(harness) = node_harness() else { return };
        let user = "const tag = '__TEST_CODE__ __PAYLOAD__';\nfunction add(a, b) { return a + b; }";
        let tests = "test('tag', () => expect(tag).toBe('__TEST_CODE__ __PAYLOAD__'));\ntest('adds', () => expect(add(2, 3)).toBe(5));";

        let results = harness.run(user, tests).await.unwrap();

        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.passed()), "{:?}", results);
    }
}
