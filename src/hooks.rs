// src/hooks.rs
//! Caller-facing wrappers around execution: one call at a time, outcomes
//! reported through a [`Notifier`].

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::client::ApiClient;
use crate::errors::{Result, RunnerError};
use crate::judge::CodeJudge;
use crate::models::{ExecuteCodeRequest, ExecuteCodeResponse, ExecuteTestCaseRequest, RunDelta, TestCaseOutcome};
use crate::session::TestSession;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Success(String),
    Failure(String),
}

/// Receives user-facing messages.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Sends notifications to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: Notification) {
        match notification {
            Notification::Success(message) => log::info!("{}", message),
            Notification::Failure(message) => log::warn!("{}", message),
        }
    }
}

const GENERIC_FAILURE: &str = "Something went wrong, please try again";

struct LoadingGuard<'a>(&'a AtomicBool);

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct ExecutionHooks {
    judge: Arc<dyn CodeJudge>,
    api: ApiClient,
    notifier: Arc<dyn Notifier>,
    loading: AtomicBool,
}

impl ExecutionHooks {
    pub fn new(judge: Arc<dyn CodeJudge>, api: ApiClient, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            judge,
            api,
            notifier,
            loading: AtomicBool::new(false),
        }
    }

    /// True while a call is in flight; callers should disable submission.
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    fn start(&self) -> Result<LoadingGuard<'_>> {
        self.loading
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| LoadingGuard(&self.loading))
            .map_err(|_| RunnerError::Busy)
    }

    /// Runs code on the judge and reports success when it exits with code 0.
    pub async fn execute_code(&self, request: &ExecuteCodeRequest) -> Result<ExecuteCodeResponse> {
        let _guard = self.start()?;

        match self.judge.execute(request).await {
            Ok(response) => {
                if response.run.succeeded() {
                    self.notifier.notify(Notification::Success("Code executed successfully".to_string()));
                } else {
                    let reason = match (&response.run.code, &response.run.signal) {
                        (Some(code), _) => format!("exit code {}", code),
                        (None, Some(signal)) => format!("killed by {}", signal),
                        (None, None) => "no exit code".to_string(),
                    };
                    self.notifier.notify(Notification::Failure(format!("Code execution failed ({})", reason)));
                }
                Ok(response)
            }
            Err(e) => {
                log::error!("Judge request failed: {}", e);
                self.notifier.notify(Notification::Failure(GENERIC_FAILURE.to_string()));
                Err(e)
            }
        }
    }

    /// Sends test cases to the runner API and reports server-side failures.
    pub async fn execute_test_case(&self, request: &ExecuteTestCaseRequest) -> Result<TestCaseOutcome> {
        let _guard = self.start()?;

        self.api.execute_test_case(request).await.inspect_err(|e| {
            log::error!("Test case request failed: {}", e);
            let message = match e {
                RunnerError::ApiResponse(message) => message.clone(),
                _ => GENERIC_FAILURE.to_string(),
            };
            self.notifier.notify(Notification::Failure(message));
        })
    }

    /// Runs the session's harness and returns only the new results.
    pub async fn run_tests(&self, session: &TestSession, user_code: &str, test_code: &str) -> Result<RunDelta> {
        let _guard = self.start()?;

        session.run(user_code, test_code).await.inspect_err(|e| match e {
            RunnerError::Execution(error) => {
                self.notifier.notify(Notification::Failure(error.to_string()));
            }
            RunnerError::StaleRun { seq } => log::debug!("Ignoring stale run #{}", seq),
            other => {
                log::error!("Test run failed: {}", other);
                self.notifier.notify(Notification::Failure(GENERIC_FAILURE.to_string()));
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HarnessConfig;
    use crate::harness::TestHarness;
    use crate::judge::ScriptedJudge;
    use crate::models::{RunOutput, TestCaseInput};
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<Notification>>);

    impl Notifier for Recorder {
        fn notify(&self, notification: Notification) {
            self.0.lock().unwrap().push(notification);
        }
    }

    impl Recorder {
        fn taken(&self) -> Vec<Notification> {
            std::mem::take(&mut *self.0.lock().unwrap())
        }
    }

    fn hooks(judge: Arc<ScriptedJudge>, recorder: Arc<Recorder>) -> ExecutionHooks {
        // Nothing listens on the discard port.
        let api = ApiClient::new(reqwest::Client::new(), "http://127.0.0.1:9");
        ExecutionHooks::new(judge, api, recorder)
    }

    fn request() -> ExecuteCodeRequest {
        ExecuteCodeRequest::new("javascript", "18.15.0", "console.log('hi')")
    }

    #[actix_rt::test]
    async fn exit_code_decides_notification() {
        let judge = Arc::new(ScriptedJudge::new());
        judge.push_stdout("hi\n", 0);
        judge.push_stdout("", 1);
        let recorder = Arc::new(Recorder::default());
        let hooks = hooks(judge, recorder.clone());

        let ok = hooks.execute_code(&request()).await.unwrap();
        assert_eq!(ok.run.stdout, "hi\n");
        assert_eq!(recorder.taken(), vec![Notification::Success("Code executed successfully".to_string())]);

        hooks.execute_code(&request()).await.unwrap();
        assert_eq!(
            recorder.taken(),
            vec![Notification::Failure("Code execution failed (exit code 1)".to_string())]
        );
        assert!(!hooks.is_loading());
    }

    #[actix_rt::test]
    async fn transport_errors_give_generic_failure() {
        let judge = Arc::new(ScriptedJudge::new());
        judge.push(Err(RunnerError::UnexpectedResponse("garbage".to_string())));
        let recorder = Arc::new(Recorder::default());
        let hooks = hooks(judge, recorder.clone());

        assert!(hooks.execute_code(&request()).await.is_err());
        assert_eq!(recorder.taken(), vec![Notification::Failure(GENERIC_FAILURE.to_string())]);
    }

    #[actix_rt::test]
    async fn second_submission_while_loading_is_rejected() {
        let judge = Arc::new(ScriptedJudge::new());
        let recorder = Arc::new(Recorder::default());
        let hooks = hooks(judge.clone(), recorder.clone());

        let guard = hooks.start().unwrap();
        assert!(hooks.is_loading());
        assert!(matches!(hooks.execute_code(&request()).await, Err(RunnerError::Busy)));
        assert!(judge.requests().is_empty());
        drop(guard);
        assert!(!hooks.is_loading());
    }

    #[actix_rt::test]
    async fn unreachable_api_notifies_failure() {
        let recorder = Arc::new(Recorder::default());
        let hooks = hooks(Arc::new(ScriptedJudge::new()), recorder.clone());
        let req = ExecuteTestCaseRequest {
            code: "function id(x) { return x; }".to_string(),
            language: "javascript".to_string(),
            version: None,
            function_name: "id".to_string(),
            test_cases: vec![TestCaseInput { input: vec![1.0], expected: serde_json::json!(1) }],
        };

        assert!(hooks.execute_test_case(&req).await.is_err());
        assert_eq!(recorder.taken(), vec![Notification::Failure(GENERIC_FAILURE.to_string())]);
    }

    #[actix_rt::test]
    async fn execution_errors_name_their_kind() {
        let judge = Arc::new(ScriptedJudge::new());
        judge.push(Ok(RunOutput {
            stdout: "@@harness@@{\"error\":{\"kind\":\"RuntimeError\",\"message\":\"add is not defined\"}}\n".to_string(),
            code: Some(0),
            ..RunOutput::default()
        }));
        let recorder = Arc::new(Recorder::default());
        let hooks = hooks(judge.clone(), recorder.clone());
        let harness = TestHarness::new(judge, &HarnessConfig::default()).with_delay(Duration::ZERO);
        let session = TestSession::new(Arc::new(harness));

        let err = hooks.run_tests(&session, "", "test('a', () => add())").await.unwrap_err();
        assert!(matches!(err, RunnerError::Execution(_)));
        assert_eq!(
            recorder.taken(),
            vec![Notification::Failure("runtime error: add is not defined".to_string())]
        );
    }
}
