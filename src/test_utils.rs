//! Test utilities
//!
//! A [`ProcessRunner`] that records every invocation and answers with a
//! scripted handler instead of starting real processes.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::ProcessError;
use crate::infra::executable::make_executable;
use crate::infra::process::{Invocation, ProcessOutput, ProcessRunner, RunStatus};

type Handler = Box<dyn Fn(&Invocation) -> ProcessOutput + Send + Sync>;

/// Recording fake for external commands
pub struct RecordingRunner {
    programs: HashMap<String, PathBuf>,
    handler: Handler,
    invocations: Mutex<Vec<Invocation>>,
}

impl RecordingRunner {
    /// Runner where nothing is on PATH and every command succeeds silently
    pub fn new() -> Self {
        Self {
            programs: HashMap::new(),
            handler: Box::new(|_| ProcessOutput::ok("")),
            invocations: Mutex::new(Vec::new()),
        }
    }

    /// Pretend `name` is installed at `path`
    #[must_use]
    pub fn with_program(mut self, name: &str, path: &str) -> Self {
        self.programs.insert(name.to_string(), PathBuf::from(path));
        self
    }

    /// Answer every invocation with `handler`
    #[must_use]
    pub fn with_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Invocation) -> ProcessOutput + Send + Sync + 'static,
    {
        self.handler = Box::new(handler);
        self
    }

    /// Everything run so far, in order
    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations.lock().unwrap().clone()
    }

    /// Invocations of `program` whose arguments start with `prefix`
    pub fn matching(&self, program: &str, prefix: &[&str]) -> Vec<Invocation> {
        self.invocations()
            .into_iter()
            .filter(|inv| inv.program_name() == program)
            .filter(|inv| {
                inv.args.len() >= prefix.len()
                    && inv.args.iter().zip(prefix).all(|(a, p)| a == p)
            })
            .collect()
    }

    /// First invocation of `program` whose arguments start with `prefix`
    pub fn find(&self, program: &str, prefix: &[&str]) -> Option<Invocation> {
        self.matching(program, prefix).into_iter().next()
    }

    /// Number of invocations of `program` whose arguments start with `prefix`
    pub fn count(&self, program: &str, prefix: &[&str]) -> usize {
        self.matching(program, prefix).len()
    }

    fn record(&self, invocation: &Invocation) -> ProcessOutput {
        self.invocations.lock().unwrap().push(invocation.clone());
        (self.handler)(invocation)
    }
}

impl Default for RecordingRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessRunner for RecordingRunner {
    async fn status(&self, invocation: &Invocation) -> Result<RunStatus, ProcessError> {
        Ok(self.record(invocation).status)
    }

    async fn output(&self, invocation: &Invocation) -> Result<ProcessOutput, ProcessError> {
        Ok(self.record(invocation))
    }

    fn locate(&self, program: &str) -> Option<PathBuf> {
        self.programs.get(program).cloned()
    }
}

/// Write a small executable script at `path`, creating parent directories
pub fn write_executable(path: &Path) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, "#!/bin/sh\nexit 0\n").unwrap();
    make_executable(path).unwrap();
}

/// Emulate an OCB build: drop an executable `binary_name` into the
/// `--output-path` directory of `invocation`
pub fn fake_ocb_build(invocation: &Invocation, binary_name: &str) -> ProcessOutput {
    let output_path = invocation
        .args
        .iter()
        .find_map(|arg| arg.strip_prefix("--output-path="));

    match output_path {
        Some(dir) => {
            let dir = Path::new(dir);
            std::fs::write(dir.join("main.go"), "package main\n").unwrap();
            write_executable(&dir.join(binary_name));
            ProcessOutput::ok("")
        }
        None => ProcessOutput::ok(""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fake_ocb_build_writes_binary() {
        let temp = tempfile::TempDir::new().unwrap();
        let dir = temp.path().join("dist/amd64");
        std::fs::create_dir_all(&dir).unwrap();
        let invocation = Invocation::new("ocb").arg(format!("--output-path={}", dir.display()));

        assert!(fake_ocb_build(&invocation, "otelcol-custom").status.success());
        assert!(dir.join("otelcol-custom").is_file());
    }

    #[tokio::test]
    async fn test_records_in_order() {
        let runner = RecordingRunner::new();
        runner
            .status(&Invocation::new("docker").args(["buildx", "ls"]))
            .await
            .unwrap();
        runner
            .output(&Invocation::new("/usr/bin/go").args(["env", "GOPATH"]))
            .await
            .unwrap();

        let programs: Vec<String> = runner
            .invocations()
            .iter()
            .map(Invocation::program_name)
            .collect();
        assert_eq!(programs, vec!["docker", "go"]);
        assert_eq!(runner.count("go", &["env"]), 1);
        assert!(runner.find("docker", &["buildx", "build"]).is_none());
    }

    #[test]
    fn test_locate_only_known_programs() {
        let runner = RecordingRunner::new().with_program("docker", "/usr/bin/docker");
        assert_eq!(runner.locate("docker"), Some(PathBuf::from("/usr/bin/docker")));
        assert_eq!(runner.locate("go"), None);
    }
}
