// src/models.rs
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Pass,
    Fail,
}

/// Outcome of one test declared with `it`/`test`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    /// Elapsed milliseconds.
    pub duration: f64,
    pub errors: Vec<String>,
    pub status: TestStatus,
    /// Enclosing `describe` names, outermost first, then the test name.
    pub test_path: Vec<String>,
}

impl TestResult {
    pub fn passed(&self) -> bool {
        self.status == TestStatus::Pass
    }
}

/// Request sent to the judge service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecuteCodeRequest {
    pub language: String,
    pub version: String,
    pub source: String,
    #[serde(default)]
    pub stdin: String,
}

impl ExecuteCodeRequest {
    pub fn new(language: impl Into<String>, version: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            version: version.into(),
            source: source.into(),
            stdin: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunOutput {
    #[serde(default)]
    pub stdout: String,
    #[serde(default)]
    pub stderr: String,
    /// `None` when the program was terminated by a signal.
    pub code: Option<i32>,
    #[serde(default)]
    pub signal: Option<String>,
    #[serde(default)]
    pub output: String,
}

impl RunOutput {
    pub fn succeeded(&self) -> bool {
        self.code == Some(0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecuteCodeResponse {
    pub run: RunOutput,
    pub language: String,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCaseInput {
    pub input: Vec<f64>,
    pub expected: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteTestCaseRequest {
    pub code: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub version: Option<String>,
    pub function_name: String,
    pub test_cases: Vec<TestCaseInput>,
}

fn default_language() -> String {
    "javascript".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCaseResult {
    pub input: Vec<f64>,
    pub expected: serde_json::Value,
    pub actual: serde_json::Value,
    pub passed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCaseOutcome {
    pub passed: bool,
    pub test_case: Vec<TestCaseResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecuteTestCaseResponse {
    pub message: String,
    pub data: TestCaseOutcome,
}

/// Body of a session run answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunDelta {
    pub seq: u64,
    pub reset: bool,
    pub results: Vec<TestResult>,
    pub finished_at: String,
}

/// JSON error body shared by every endpoint.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ApiError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into(), error: None }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ApiResponse<T> {
    pub message: String,
    pub data: T,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_case_response_survives_serde() {
        let response = ExecuteTestCaseResponse {
            message: "Test cases executed".to_string(),
            data: TestCaseOutcome {
                passed: false,
                test_case: vec![
                    TestCaseResult {
                        input: vec![2.0, 3.0],
                        expected: json!(5),
                        actual: json!(5),
                        passed: true,
                        error: None,
                    },
                    TestCaseResult {
                        input: vec![-1.5],
                        expected: json!([1, 2]),
                        actual: json!("oops"),
                        passed: false,
                        error: Some("boom".to_string()),
                    },
                ],
            },
        };

        let text = serde_json::to_string(&response).unwrap();
        assert!(text.contains("\"testCase\""));
        let back: ExecuteTestCaseResponse = serde_json::from_str(&text).unwrap();
        assert_eq!(back, response);
        assert_eq!(back.data.test_case[1].input, vec![-1.5]);
    }

    #[test]
    fn judge_response_tolerates_signal_kill() {
        let body = json!({
            "language": "javascript",
            "version": "18.15.0",
            "run": {"stdout": "", "stderr": "", "code": null, "signal": "SIGKILL", "output": ""}
        });
        let parsed: ExecuteCodeResponse = serde_json::from_value(body).unwrap();
        assert_eq!(parsed.run.code, None);
        assert!(!parsed.run.succeeded());
    }

    #[test]
    fn test_result_uses_camel_case_path() {
        let result = TestResult {
            duration: 1.0,
            errors: vec![],
            status: TestStatus::Pass,
            test_path: vec!["math".into(), "adds".into()],
        };
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["testPath"], json!(["math", "adds"]));
        assert_eq!(value["status"], json!("pass"));
    }
}
