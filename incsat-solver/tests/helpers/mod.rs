//! Helpers to run the solver binary on the instances in `tests/cnf`.
#![allow(
    dead_code,
    reason = "is used in integration tests but unable to find a way to silence these warnings"
)]

use std::fs::File;
use std::path::Path;
use std::path::PathBuf;
use std::process::Command;
use std::process::Stdio;
use std::time::Duration;

use regex::Regex;
use wait_timeout::ChildExt;

#[derive(Debug)]
pub(crate) struct SolverOutput {
    pub(crate) exit_code: i32,
    pub(crate) stdout: String,
    pub(crate) stderr: String,
}

impl SolverOutput {
    /// The answer on the `s` line.
    pub(crate) fn status(&self) -> Option<&str> {
        let status = Regex::new(r"(?m)^s (SATISFIABLE|UNSATISFIABLE|UNKNOWN)$").unwrap();
        status
            .captures(&self.stdout)
            .and_then(|captures| captures.get(1))
            .map(|status| status.as_str())
    }

    /// The literals on the `v` lines, without the terminating `0`.
    pub(crate) fn model(&self) -> Vec<i32> {
        let mut model = self
            .stdout
            .lines()
            .filter_map(|line| line.strip_prefix("v "))
            .flat_map(|values| values.split_whitespace())
            .map(|literal| literal.parse::<i32>().expect("valid literal on a v-line"))
            .collect::<Vec<_>>();
        assert_eq!(model.pop(), Some(0), "v-lines are terminated with 0");
        model
    }

    /// The literals on the `c failed:` line.
    pub(crate) fn failed(&self) -> Option<Vec<i32>> {
        let failed = Regex::new(r"(?m)^c failed:((?: -?\d+)*)$").unwrap();
        failed.captures(&self.stdout).map(|captures| {
            captures[1]
                .split_whitespace()
                .map(|literal| literal.parse::<i32>().unwrap())
                .collect()
        })
    }

    /// The value of every `c stat:` line with the given name.
    pub(crate) fn statistics(&self, name: &str) -> Vec<String> {
        let statistic = Regex::new(&format!(r"(?m)^c stat: (\S*{name})=(\S+)$")).unwrap();
        statistic
            .captures_iter(&self.stdout)
            .map(|captures| captures[2].to_owned())
            .collect()
    }
}

pub(crate) fn instance_path(instance_name: &str) -> PathBuf {
    PathBuf::from(format!(
        "{}/tests/cnf/{instance_name}",
        env!("CARGO_MANIFEST_DIR")
    ))
}

pub(crate) fn run_solver(instance_name: &str) -> SolverOutput {
    run_solver_with_options(instance_name, std::iter::empty(), None)
}

/// Runs the solver on the instance; `prefix` keeps the output files of tests which use the same
/// instance apart.
pub(crate) fn run_solver_with_options<'a>(
    instance_name: &str,
    args: impl IntoIterator<Item = &'a str>,
    prefix: Option<&str>,
) -> SolverOutput {
    const TEST_TIMEOUT: Duration = Duration::from_secs(60);

    let instance_path = instance_path(instance_name);
    let solver = PathBuf::from(env!("CARGO_BIN_EXE_incsat-solver"));

    let add_extension = |extension: &str| -> PathBuf {
        let file_name = match prefix {
            Some(prefix) => format!("{instance_name}.{prefix}.{extension}"),
            None => format!("{instance_name}.{extension}"),
        };
        std::env::temp_dir().join(file_name)
    };
    let log_file_path = add_extension("log");
    let err_file_path = add_extension("err");

    let mut command = Command::new(solver);
    for arg in args {
        let _ = command.arg(arg);
    }

    let mut child = command
        .arg(&instance_path)
        .stdout(File::create(&log_file_path).expect("Failed to create log file."))
        .stderr(File::create(&err_file_path).expect("Failed to create error file."))
        .stdin(Stdio::null())
        .spawn()
        .expect("Failed to run solver.");

    let exit_code = match child.wait_timeout(TEST_TIMEOUT) {
        Ok(None) => {
            let _ = child.kill();
            panic!("solver took more than {} seconds", TEST_TIMEOUT.as_secs())
        }
        Ok(Some(status)) => status.code().expect("solver was not killed by a signal"),
        Err(e) => panic!("error starting solver: {e}"),
    };

    let output = SolverOutput {
        exit_code,
        stdout: std::fs::read_to_string(&log_file_path).expect("Failed to read solver output"),
        stderr: std::fs::read_to_string(&err_file_path).expect("Failed to read solver errors"),
    };

    cleanup(&log_file_path);
    cleanup(&err_file_path);

    output
}

fn cleanup(path: &Path) {
    std::fs::remove_file(path).expect("Failed to remove output file");
}

/// Reads the clauses of a DIMACS file, skipping comments and the header.
pub(crate) fn read_clauses(instance_name: &str) -> Vec<Vec<i32>> {
    let source = std::fs::read_to_string(instance_path(instance_name)).unwrap();

    let literals = source
        .lines()
        .filter(|line| !line.starts_with('c') && !line.starts_with('p'))
        .flat_map(|line| line.split_whitespace())
        .map(|literal| literal.parse::<i32>().unwrap())
        .collect::<Vec<_>>();

    literals
        .split(|&literal| literal == 0)
        .filter(|clause| !clause.is_empty())
        .map(|clause| clause.to_vec())
        .collect()
}

pub(crate) fn assert_model_satisfies(instance_name: &str, model: &[i32]) {
    for clause in read_clauses(instance_name) {
        assert!(
            clause.iter().any(|literal| model.contains(literal)),
            "clause {clause:?} is violated by the model"
        );
    }
}
