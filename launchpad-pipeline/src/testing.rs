//! Scripted command runner for tests
//!
//! Records every invocation and answers with canned output keyed by the
//! tool verb (`build`, `push`, `get-credentials`, `apply`, `wait`,
//! `get pods`, `get job`, `logs`, `delete`). Unscripted verbs succeed with
//! empty output. A verb can also be made to never return, or to panic.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use crate::process::{CommandOutput, CommandRunner, Invocation, ToolError};

#[derive(Default)]
pub struct ScriptedRunner {
    responses: Mutex<HashMap<String, CommandOutput>>,
    calls: Mutex<Vec<Invocation>>,
    hanging: Mutex<HashSet<String>>,
    panicking: Mutex<HashSet<String>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ok(stdout: &str) -> CommandOutput {
        CommandOutput {
            exit_code: Some(0),
            stdout: stdout.to_string(),
            stderr: String::new(),
        }
    }

    pub fn fail(stderr: &str) -> CommandOutput {
        CommandOutput {
            exit_code: Some(1),
            stdout: String::new(),
            stderr: stderr.to_string(),
        }
    }

    pub fn respond(&self, verb: &str, output: CommandOutput) {
        self.responses
            .lock()
            .unwrap()
            .insert(verb.to_string(), output);
    }

    /// The verb never completes
    pub fn hang(&self, verb: &str) {
        self.hanging.lock().unwrap().insert(verb.to_string());
    }

    /// The verb panics when invoked
    pub fn panic_on(&self, verb: &str) {
        self.panicking.lock().unwrap().insert(verb.to_string());
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().unwrap().clone()
    }

    pub fn verbs(&self) -> Vec<String> {
        self.calls().iter().map(verb).collect()
    }

    pub fn count(&self, wanted: &str) -> usize {
        self.verbs().iter().filter(|v| v.as_str() == wanted).count()
    }
}

/// Tool verb of an invocation, ignoring the leading `--kubeconfig <file>`
pub fn verb(invocation: &Invocation) -> String {
    let mut args = invocation.args.iter().map(String::as_str).peekable();
    if args.peek() == Some(&"--kubeconfig") {
        args.next();
        args.next();
    }
    let args: Vec<&str> = args.collect();

    match args.as_slice() {
        ["container", "clusters", sub, ..] => sub.to_string(),
        ["get", kind, ..] => format!("get {}", kind),
        [first, ..] => first.to_string(),
        [] => String::new(),
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, invocation: &Invocation) -> Result<CommandOutput, ToolError> {
        let verb = verb(invocation);
        self.calls.lock().unwrap().push(invocation.clone());

        let panics = self.panicking.lock().unwrap().contains(&verb);
        if panics {
            panic!("scripted panic in `{}`", verb);
        }
        let hangs = self.hanging.lock().unwrap().contains(&verb);
        if hangs {
            std::future::pending::<()>().await;
        }

        let output = self
            .responses
            .lock()
            .unwrap()
            .get(&verb)
            .cloned()
            .unwrap_or_else(|| ScriptedRunner::ok(""));
        Ok(output)
    }
}
