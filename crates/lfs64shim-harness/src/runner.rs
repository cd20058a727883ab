//! Test execution engine.
//!
//! Each case is executed once per route on its own freshly opened subject,
//! then the rendered outcomes are compared.

use std::ffi::{c_int, c_long, c_void};
use std::fmt;

use lfs64shim_abi::fallocate_abi::posix_fallocate64;
use lfs64shim_abi::fcntl_abi::{fcntl64, fcntl64_as_variadic, fcntl64_with};
use lfs64shim_abi::symbols::{self, ArgConvention};
use lfs64shim_core::errno;
use lfs64shim_core::fcntl::{self as fcntl_core, FcntlArg, FcntlArgKind};
use serde::Deserialize;

use crate::fixtures::{FixtureCase, FixtureSet};
use crate::scratch::{OpenKind, Subject};
use crate::verify::VerificationResult;

/// Runs a fixture set and collects verification results.
pub struct TestRunner {
    /// Name of the test campaign.
    pub campaign: String,
}

impl TestRunner {
    /// Create a new test runner.
    #[must_use]
    pub fn new(campaign: impl Into<String>) -> Self {
        Self {
            campaign: campaign.into(),
        }
    }

    /// Run all fixtures in a set and return results.
    pub fn run(&self, fixture_set: &FixtureSet) -> Vec<VerificationResult> {
        fixture_set
            .cases
            .iter()
            .map(|case| verify_case(&fixture_set.family, case))
            .collect()
    }
}

/// Way a call reaches the host libc.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// The exported entry point called through its C prototype, the way a
    /// C program calls it. Falls back to [`Route::Slot`] on targets where
    /// that prototype does not match the definition.
    Shim,
    /// The exported entry point called through its fixed Rust signature,
    /// optional argument packed into one `long`.
    Slot,
    /// The typed Rust companion (`fcntl64` only).
    Typed,
    /// The host libc function called directly.
    Direct,
}

impl Route {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Shim => "shim",
            Self::Slot => "slot",
            Self::Typed => "typed",
            Self::Direct => "direct",
        }
    }
}

/// Rendered result of one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseOutcome {
    /// Canonical text form compared across routes and against fixtures.
    pub rendered: String,
    /// `errno` after a failed `fcntl64`, or the returned code of
    /// `posix_fallocate64`; zero on success.
    pub error: c_int,
}

/// Reasons a case could not be executed at all.
#[derive(Debug)]
pub enum CaseError {
    UnsupportedFunction(String),
    BadInputs(serde_json::Error),
    MissingInput(&'static str),
    UnknownCommand(String),
    UnknownLockType(String),
    ArgumentOutOfRange(i64),
    ArgumentKind {
        cmd: String,
        expected: &'static str,
        got: &'static str,
    },
    Scratch(std::io::Error),
}

impl fmt::Display for CaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedFunction(name) => write!(f, "unsupported function '{name}'"),
            Self::BadInputs(err) => write!(f, "malformed inputs: {err}"),
            Self::MissingInput(field) => write!(f, "missing input '{field}'"),
            Self::UnknownCommand(name) => write!(f, "unknown fcntl command '{name}'"),
            Self::UnknownLockType(name) => write!(f, "unknown lock type '{name}'"),
            Self::ArgumentOutOfRange(value) => write!(f, "argument {value} does not fit in int"),
            Self::ArgumentKind { cmd, expected, got } => {
                write!(f, "{cmd} takes a {expected} argument, fixture gives {got}")
            }
            Self::Scratch(err) => write!(f, "scratch descriptor: {err}"),
        }
    }
}

impl std::error::Error for CaseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::BadInputs(err) => Some(err),
            Self::Scratch(err) => Some(err),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CaseInputs {
    #[serde(default)]
    open: OpenKind,
    #[serde(default)]
    cmd: Option<CommandSpec>,
    #[serde(default)]
    arg: Option<ArgSpec>,
    #[serde(default)]
    offset: Option<i64>,
    #[serde(default)]
    len: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CommandSpec {
    Code(c_int),
    Name(String),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ArgSpec {
    Int(i64),
    Flock { flock: FlockSpec },
}

#[derive(Debug, Deserialize)]
struct FlockSpec {
    #[serde(rename = "type")]
    lock_type: String,
    #[serde(default)]
    start: i64,
    #[serde(default)]
    len: i64,
}

/// `fcntl` request with every symbolic input resolved.
#[derive(Debug, Clone, Copy)]
enum ResolvedArg {
    None,
    Int(c_int),
    Flock { lock_type: c_int, start: i64, len: i64 },
}

fn verify_case(family: &str, case: &FixtureCase) -> VerificationResult {
    let routes: &[Route] = if case.function == "fcntl64" {
        &[Route::Shim, Route::Slot, Route::Typed, Route::Direct]
    } else {
        &[Route::Shim, Route::Direct]
    };

    let outcomes: Result<Vec<(Route, CaseOutcome)>, CaseError> = routes
        .iter()
        .map(|route| execute_case(case, *route).map(|outcome| (*route, outcome)))
        .collect();

    let outcomes = match outcomes {
        Ok(outcomes) => outcomes,
        Err(err) => {
            let actual = format!("error:{err}");
            return VerificationResult {
                family: family.to_string(),
                case_name: case.name.clone(),
                function: case.function.clone(),
                contract: case.contract.clone(),
                passed: false,
                expected: case.expected_output.clone(),
                diff: Some(format!("case did not execute: {err}")),
                actual,
                reference: String::new(),
            };
        }
    };

    let shim = &outcomes[0].1;
    let mut problems = Vec::new();
    for (route, outcome) in &outcomes[1..] {
        if outcome != shim {
            problems.push(format!(
                "{} route diverged: shim `{}` vs {} `{}`",
                route.as_str(),
                shim.rendered,
                route.as_str(),
                outcome.rendered
            ));
        }
    }
    if !case.parity_only() && shim.rendered != case.expected_output {
        problems.push(format!(
            "expected `{}`, got `{}`",
            case.expected_output, shim.rendered
        ));
    }
    if case.expected_errno != 0 && shim.error != case.expected_errno {
        problems.push(format!(
            "expected error {}, got {}",
            errno::describe(case.expected_errno),
            errno::describe(shim.error)
        ));
    }

    let reference = outcomes
        .iter()
        .find(|(route, _)| *route == Route::Direct)
        .map(|(_, outcome)| outcome.rendered.clone())
        .unwrap_or_default();

    VerificationResult {
        family: family.to_string(),
        case_name: case.name.clone(),
        function: case.function.clone(),
        contract: case.contract.clone(),
        passed: problems.is_empty(),
        expected: case.expected_output.clone(),
        actual: shim.rendered.clone(),
        reference,
        diff: (!problems.is_empty()).then(|| problems.join("; ")),
    }
}

/// Execute one case through `route` on a fresh subject.
pub fn execute_case(case: &FixtureCase, route: Route) -> Result<CaseOutcome, CaseError> {
    let symbol = symbols::find(&case.function)
        .ok_or_else(|| CaseError::UnsupportedFunction(case.function.clone()))?;
    let inputs: CaseInputs =
        serde_json::from_value(case.inputs.clone()).map_err(CaseError::BadInputs)?;
    match symbol.convention {
        ArgConvention::VariadicSlot => run_fcntl(&inputs, route),
        ArgConvention::Fixed => run_fallocate(&inputs, route),
    }
}

fn resolve_command(spec: &CommandSpec) -> Result<c_int, CaseError> {
    match spec {
        CommandSpec::Code(code) => Ok(*code),
        CommandSpec::Name(name) => fcntl_core::command_by_name(name)
            .ok_or_else(|| CaseError::UnknownCommand(name.clone())),
    }
}

fn resolve_arg(spec: Option<&ArgSpec>) -> Result<ResolvedArg, CaseError> {
    match spec {
        None => Ok(ResolvedArg::None),
        Some(ArgSpec::Int(value)) => c_int::try_from(*value)
            .map(ResolvedArg::Int)
            .map_err(|_| CaseError::ArgumentOutOfRange(*value)),
        Some(ArgSpec::Flock { flock }) => {
            let lock_type = fcntl_core::lock_type_by_name(&flock.lock_type)
                .ok_or_else(|| CaseError::UnknownLockType(flock.lock_type.clone()))?;
            Ok(ResolvedArg::Flock {
                lock_type,
                start: flock.start,
                len: flock.len,
            })
        }
    }
}

// A mistyped argument would hand the kernel a bogus pointer; refuse it up
// front. Unclassified commands are forwarded with whatever the fixture says.
fn check_arg_kind(cmd: c_int, arg: ResolvedArg) -> Result<(), CaseError> {
    let got = match arg {
        ResolvedArg::None => FcntlArgKind::None,
        ResolvedArg::Int(_) => FcntlArgKind::Int,
        ResolvedArg::Flock { .. } => FcntlArgKind::Pointer,
    };
    match fcntl_core::arg_kind(cmd) {
        Some(expected) if expected != got => Err(CaseError::ArgumentKind {
            cmd: fcntl_core::command_name(cmd).map_or_else(|| cmd.to_string(), str::to_string),
            expected: expected.as_str(),
            got: got.as_str(),
        }),
        _ => Ok(()),
    }
}

fn new_flock(lock_type: c_int, start: i64, len: i64) -> libc::flock {
    // SAFETY: flock is a plain C struct; all-zero is a valid value.
    let mut lock: libc::flock = unsafe { std::mem::zeroed() };
    lock.l_type = lock_type as libc::c_short;
    lock.l_whence = libc::SEEK_SET as libc::c_short;
    lock.l_start = start as libc::off_t;
    lock.l_len = len as libc::off_t;
    lock
}

fn last_errno() -> c_int {
    std::io::Error::last_os_error().raw_os_error().unwrap_or(0)
}

fn run_fcntl(inputs: &CaseInputs, route: Route) -> Result<CaseOutcome, CaseError> {
    let cmd = resolve_command(inputs.cmd.as_ref().ok_or(CaseError::MissingInput("cmd"))?)?;
    let arg = resolve_arg(inputs.arg.as_ref())?;
    check_arg_kind(cmd, arg)?;
    let subject = Subject::open(inputs.open).map_err(CaseError::Scratch)?;
    let fd = subject.fd();

    let mut lock = match arg {
        ResolvedArg::Flock {
            lock_type,
            start,
            len,
        } => Some(new_flock(lock_type, start, len)),
        _ => None,
    };
    let lock_ptr = lock
        .as_mut()
        .map(|lock| (lock as *mut libc::flock).cast::<c_void>());

    let typed = match (arg, lock_ptr) {
        (ResolvedArg::Int(value), _) => FcntlArg::Int(value),
        (ResolvedArg::Flock { .. }, Some(ptr)) => FcntlArg::Pointer(ptr),
        _ => FcntlArg::None,
    };

    let rc = match route {
        // SAFETY: fd is open or -1, and any pointer refers to `lock`, which
        // outlives the call.
        Route::Shim => match fcntl64_as_variadic() {
            // SAFETY: same as above.
            Some(c_fcntl64) => unsafe {
                match typed {
                    FcntlArg::None => c_fcntl64(fd, cmd),
                    FcntlArg::Int(value) => c_fcntl64(fd, cmd, value),
                    FcntlArg::Pointer(ptr) => c_fcntl64(fd, cmd, ptr),
                }
            },
            // SAFETY: same as above.
            None => unsafe { fcntl64(fd, cmd, typed.slot() as c_long) },
        },
        // SAFETY: same as above.
        Route::Slot => unsafe { fcntl64(fd, cmd, typed.slot() as c_long) },
        // SAFETY: same as above.
        Route::Typed => unsafe { fcntl64_with(fd, cmd, typed) },
        // SAFETY: same as above.
        Route::Direct => unsafe {
            match typed {
                FcntlArg::None => libc::fcntl(fd, cmd),
                FcntlArg::Int(value) => libc::fcntl(fd, cmd, value),
                FcntlArg::Pointer(ptr) => libc::fcntl(fd, cmd, ptr),
            }
        },
    };
    let error = if rc == -1 { last_errno() } else { 0 };

    let mut rendered = if rc >= 0 && creates_descriptor(cmd) {
        // Descriptor numbers race with other threads; only the floor and
        // the close-on-exec flag are stable across routes.
        let floor = match typed {
            FcntlArg::Int(value) => value,
            _ => 0,
        };
        // SAFETY: rc is the duplicate just created by this run.
        let dup_flags = unsafe { libc::fcntl(rc, libc::F_GETFD) };
        format!("rc=fd>={floor}:{} dup_fd_flags={dup_flags}", rc >= floor)
    } else {
        format!("rc={rc}")
    };
    if rc == -1 {
        rendered.push_str(&format!(" errno={}", errno::describe(error)));
    }
    if subject.is_open() {
        // SAFETY: fd is open for the lifetime of `subject`.
        let (fd_flags, status) =
            unsafe { (libc::fcntl(fd, libc::F_GETFD), libc::fcntl(fd, libc::F_GETFL)) };
        rendered.push_str(&format!(" fd_flags={fd_flags} status={status:#x}"));
    }
    if let Some(lock) = &lock {
        let lock_type = fcntl_core::lock_type_name(c_int::from(lock.l_type))
            .map_or_else(|| lock.l_type.to_string(), str::to_string);
        rendered.push_str(&format!(
            " lock={lock_type}@{}+{} pid={}",
            lock.l_start, lock.l_len, lock.l_pid
        ));
    }

    if rc >= 0 && creates_descriptor(cmd) {
        // SAFETY: the duplicate belongs to this run and nothing else uses it.
        unsafe { libc::close(rc) };
    }

    Ok(CaseOutcome { rendered, error })
}

fn creates_descriptor(cmd: c_int) -> bool {
    cmd == fcntl_core::F_DUPFD || cmd == fcntl_core::F_DUPFD_CLOEXEC
}

fn run_fallocate(inputs: &CaseInputs, route: Route) -> Result<CaseOutcome, CaseError> {
    let offset = inputs.offset.ok_or(CaseError::MissingInput("offset"))?;
    let len = inputs.len.ok_or(CaseError::MissingInput("len"))?;
    let subject = Subject::open(inputs.open).map_err(CaseError::Scratch)?;
    let fd = subject.fd();

    let rc = match route {
        // SAFETY: fd is open or -1; posix_fallocate validates the range.
        Route::Shim | Route::Slot | Route::Typed => unsafe {
            posix_fallocate64(fd, offset, len)
        },
        // SAFETY: same as above.
        Route::Direct => unsafe {
            libc::posix_fallocate(fd, offset as libc::off_t, len as libc::off_t)
        },
    };

    let mut rendered = format!("rc={}", errno::describe(rc));
    if let Some(size) = subject.size() {
        rendered.push_str(&format!(" size={size}"));
    }
    Ok(CaseOutcome {
        rendered,
        error: rc,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::FixtureSet;

    fn single_case_set(case_json: &str) -> FixtureSet {
        FixtureSet::from_json(&format!(
            r#"{{
                "version":"v1",
                "family":"lfs64/test",
                "captured_at":"2026-10-19T00:00:00Z",
                "cases":[{case_json}]
            }}"#
        ))
        .expect("valid fixture json")
    }

    #[test]
    fn getfl_read_only_passes_on_all_routes() {
        let set = single_case_set(
            r#"{"name":"getfl","function":"fcntl64","contract":"parity",
                "inputs":{"open":"read_only","cmd":"F_GETFL","arg":null}}"#,
        );
        let results = TestRunner::new("smoke").run(&set);
        assert_eq!(results.len(), 1);
        assert!(results[0].passed, "{:?}", results[0].diff);
        assert_eq!(results[0].actual, results[0].reference);
    }

    #[test]
    fn fallocate_first_page_renders_size() {
        let set = single_case_set(
            r#"{"name":"page","function":"posix_fallocate64","contract":"alloc",
                "inputs":{"open":"read_write","offset":0,"len":4096},
                "expected_output":"rc=OK size=4096"}"#,
        );
        let results = TestRunner::new("smoke").run(&set);
        assert!(results[0].passed, "{:?}", results[0].diff);
    }

    #[test]
    fn wrong_expectation_fails_with_diff() {
        let set = single_case_set(
            r#"{"name":"wrong","function":"posix_fallocate64","contract":"alloc",
                "inputs":{"open":"bad_fd","offset":0,"len":16},
                "expected_output":"rc=OK"}"#,
        );
        let results = TestRunner::new("smoke").run(&set);
        assert!(!results[0].passed);
        let diff = results[0].diff.as_deref().unwrap_or_default();
        assert!(diff.contains("expected `rc=OK`"), "{diff}");
    }

    #[test]
    fn unknown_command_name_is_a_case_error() {
        let set = single_case_set(
            r#"{"name":"typo","function":"fcntl64","contract":"parity",
                "inputs":{"open":"read_only","cmd":"F_GETFLAGS"}}"#,
        );
        let results = TestRunner::new("smoke").run(&set);
        assert!(!results[0].passed);
        assert!(results[0].actual.starts_with("error:unknown fcntl command"));
    }

    #[test]
    fn unsupported_function_is_reported() {
        let case = FixtureCase {
            name: String::from("lseek"),
            function: String::from("lseek64"),
            contract: String::from("n/a"),
            inputs: serde_json::json!({}),
            expected_output: String::from("parity"),
            expected_errno: 0,
        };
        let err = execute_case(&case, Route::Shim).expect_err("lseek64 is not exported");
        assert!(matches!(err, CaseError::UnsupportedFunction(name) if name == "lseek64"));
    }

    #[test]
    fn oversized_int_argument_is_rejected() {
        let case = FixtureCase {
            name: String::from("huge"),
            function: String::from("fcntl64"),
            contract: String::from("n/a"),
            inputs: serde_json::json!({"open": "read_only", "cmd": "F_SETFD", "arg": 1_i64 << 40}),
            expected_output: String::from("parity"),
            expected_errno: 0,
        };
        let err = execute_case(&case, Route::Direct).expect_err("argument exceeds int");
        assert!(matches!(err, CaseError::ArgumentOutOfRange(_)));
    }

    #[test]
    fn mistyped_argument_is_refused_before_the_call() {
        let case = FixtureCase {
            name: String::from("int_for_lock"),
            function: String::from("fcntl64"),
            contract: String::from("n/a"),
            inputs: serde_json::json!({"open": "read_write", "cmd": "F_GETLK", "arg": 7}),
            expected_output: String::from("parity"),
            expected_errno: 0,
        };
        let err = execute_case(&case, Route::Shim).expect_err("int is not a flock pointer");
        assert_eq!(
            err.to_string(),
            "F_GETLK takes a pointer argument, fixture gives int"
        );
    }

    #[test]
    fn variadic_and_fixed_shim_calls_agree_with_fcntl() {
        let cases = [
            serde_json::json!({"open": "read_only", "cmd": "F_GETFL"}),
            serde_json::json!({"open": "read_write", "cmd": "F_SETFD", "arg": libc::FD_CLOEXEC}),
            serde_json::json!({"open": "read_write", "cmd": "F_GETLK",
                "arg": {"flock": {"type": "F_WRLCK", "len": 64}}}),
        ];
        for inputs in cases {
            let case = FixtureCase {
                name: String::from("routes"),
                function: String::from("fcntl64"),
                contract: String::from("parity"),
                inputs,
                expected_output: String::from("parity"),
                expected_errno: 0,
            };
            let shim = execute_case(&case, Route::Shim).expect("shim route executes");
            let slot = execute_case(&case, Route::Slot).expect("slot route executes");
            let direct = execute_case(&case, Route::Direct).expect("direct route executes");
            assert_eq!(shim, slot, "{}", case.inputs);
            assert_eq!(shim, direct, "{}", case.inputs);
            assert_eq!(shim.error, 0, "{}", shim.rendered);
        }
    }

    #[test]
    fn getlk_renders_lock_state() {
        let case = FixtureCase {
            name: String::from("getlk"),
            function: String::from("fcntl64"),
            contract: String::from("pointer"),
            inputs: serde_json::json!({"open": "read_write", "cmd": "F_GETLK",
                "arg": {"flock": {"type": "F_RDLCK"}}}),
            expected_output: String::from("parity"),
            expected_errno: 0,
        };
        let outcome = execute_case(&case, Route::Shim).expect("getlk executes");
        assert!(outcome.rendered.contains("lock=F_UNLCK@"), "{}", outcome.rendered);
        assert_eq!(outcome.error, 0);
    }
}
