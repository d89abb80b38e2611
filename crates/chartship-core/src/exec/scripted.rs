//! In-memory executor for tests
//!
//! Records every invocation and answers through a responder closure, so
//! orchestration can be exercised without helm, yq, curl or a registry.

use async_trait::async_trait;
use std::sync::{Arc, Mutex, PoisonError};

use super::{ExecOutput, Executor};
use crate::command::{Invocation, ToolCommand};
use crate::error::Result;

type Responder = dyn Fn(&Invocation) -> ExecOutput + Send + Sync;

/// Executor returning scripted results
#[derive(Clone)]
pub struct ScriptedExecutor {
    responder: Arc<Responder>,
    calls: Arc<Mutex<Vec<Invocation>>>,
}

impl ScriptedExecutor {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&Invocation) -> ExecOutput + Send + Sync + 'static,
    {
        Self {
            responder: Arc::new(responder),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Every invocation seen so far, in order
    pub fn calls(&self) -> Vec<Invocation> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Rendered command lines of every invocation, in order
    pub fn command_lines(&self) -> Vec<String> {
        self.calls()
            .iter()
            .map(|inv| inv.command.display_line())
            .collect()
    }

    /// Number of invocations whose command matches `predicate`
    pub fn count<P>(&self, predicate: P) -> usize
    where
        P: Fn(&ToolCommand) -> bool,
    {
        self.calls()
            .iter()
            .filter(|inv| predicate(&inv.command))
            .count()
    }

    /// Forget recorded invocations
    pub fn reset(&self) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

#[async_trait]
impl Executor for ScriptedExecutor {
    async fn run(&self, invocation: &Invocation) -> Result<ExecOutput> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(invocation.clone());
        Ok((self.responder)(invocation))
    }

    fn describe(&self) -> String {
        "scripted".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::HelmCommand;

    #[tokio::test]
    async fn test_records_and_responds() {
        let executor = ScriptedExecutor::new(|inv| match &inv.command {
            ToolCommand::Helm(HelmCommand::DependencyList) => ExecOutput::ok("no deps"),
            _ => ExecOutput::failed(1, "unexpected"),
        });

        let output = executor
            .run(&Invocation::new("list", HelmCommand::DependencyList))
            .await
            .unwrap();
        assert_eq!(output.stdout, "no deps");

        let output = executor
            .run(&Invocation::new("update", HelmCommand::DependencyUpdate))
            .await
            .unwrap();
        assert_eq!(output.exit_code, 1);

        assert_eq!(
            executor.command_lines(),
            vec!["helm dependency list", "helm dependency update ."]
        );
        assert_eq!(
            executor.count(|cmd| matches!(cmd, ToolCommand::Helm(HelmCommand::DependencyUpdate))),
            1
        );

        executor.reset();
        assert!(executor.calls().is_empty());
    }
}
