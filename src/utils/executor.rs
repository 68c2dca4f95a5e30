//! Command execution abstraction for testability
//!
//! Adapters that shell out (pg_dump, pg_restore, pg_isready) take a
//! [`CommandExecutor`] so tests can record calls instead of spawning tools.

use anyhow::Result;
use std::process::Output;
use std::time::Duration;

/// Abstraction for command execution, enabling mocking in tests
pub trait CommandExecutor: Send + Sync {
    /// Run a command with extra environment variables and an optional timeout
    fn run_command(
        &self,
        program: &str,
        args: &[&str],
        env: &[(String, String)],
        timeout: Option<Duration>,
    ) -> Result<Output>;
}

/// Default implementation using real subprocess calls
#[derive(Debug, Clone, Default)]
pub struct RealExecutor;

impl RealExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl CommandExecutor for RealExecutor {
    fn run_command(
        &self,
        program: &str,
        args: &[&str],
        env: &[(String, String)],
        timeout: Option<Duration>,
    ) -> Result<Output> {
        super::command::run_command(program, args, env, timeout)
    }
}

/// A mock executor for testing that records calls and returns configured responses
/// Available for use in external test crates
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    /// Recorded command invocation
    #[derive(Clone, Debug)]
    pub struct CommandCall {
        pub program: String,
        pub args: Vec<String>,
        pub env: Vec<(String, String)>,
        pub timeout: Option<Duration>,
    }

    /// Response configuration for mock
    #[derive(Clone, Debug)]
    pub enum MockResponse {
        Success { stdout: String },
        Failure { stderr: String, exit_code: i32 },
        Timeout,
    }

    impl Default for MockResponse {
        fn default() -> Self {
            MockResponse::Success {
                stdout: String::new(),
            }
        }
    }

    /// Mock executor for testing
    #[derive(Clone, Default)]
    pub struct MockExecutor {
        /// Recorded command invocations
        pub calls: Arc<Mutex<Vec<CommandCall>>>,
        /// Pre-configured responses: program name -> response
        responses: Arc<Mutex<HashMap<String, MockResponse>>>,
    }

    impl MockExecutor {
        pub fn new() -> Self {
            Self::default()
        }

        /// Configure a response for a specific program
        pub fn expect(self, program: &str, response: MockResponse) -> Self {
            self.responses
                .lock()
                .unwrap()
                .insert(program.to_string(), response);
            self
        }

        /// Get all recorded calls
        pub fn get_calls(&self) -> Vec<CommandCall> {
            self.calls.lock().unwrap().clone()
        }

        /// Check if a program was called
        pub fn was_called(&self, program: &str) -> bool {
            self.call_count(program) > 0
        }

        /// Get number of calls to a specific program
        pub fn call_count(&self, program: &str) -> usize {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|c| c.program == program)
                .count()
        }
    }

    impl CommandExecutor for MockExecutor {
        fn run_command(
            &self,
            program: &str,
            args: &[&str],
            env: &[(String, String)],
            timeout: Option<Duration>,
        ) -> Result<Output> {
            self.calls.lock().unwrap().push(CommandCall {
                program: program.to_string(),
                args: args.iter().map(|s| s.to_string()).collect(),
                env: env.to_vec(),
                timeout,
            });

            let response = self
                .responses
                .lock()
                .unwrap()
                .get(program)
                .cloned()
                .unwrap_or_default();

            match response {
                MockResponse::Success { stdout } => Ok(Output {
                    status: std::process::ExitStatus::default(),
                    stdout: stdout.into_bytes(),
                    stderr: Vec::new(),
                }),
                MockResponse::Failure { stderr, exit_code } => {
                    anyhow::bail!("{} failed with exit code {:?}: {}", program, exit_code, stderr)
                }
                MockResponse::Timeout => {
                    anyhow::bail!("{} timed out", program)
                }
            }
        }
    }
}
