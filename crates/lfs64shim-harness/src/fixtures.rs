//! Fixture loading and the built-in fixture sets.

use serde::de::Deserializer;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Expected output meaning "shim and host must agree, whatever they return".
pub const PARITY: &str = "parity";

/// A single fixture test case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureCase {
    /// Case identifier.
    pub name: String,
    /// Exported symbol being exercised (`fcntl64` or `posix_fallocate64`).
    pub function: String,
    /// Contract clause the case checks.
    pub contract: String,
    /// Call inputs: descriptor kind, command, argument or byte range.
    pub inputs: serde_json::Value,
    /// Rendered outcome the shim must produce, or [`PARITY`].
    #[serde(default = "parity", deserialize_with = "deserialize_expected_output")]
    pub expected_output: String,
    /// Expected error code; zero means unchecked.
    #[serde(default)]
    pub expected_errno: i32,
}

impl FixtureCase {
    #[must_use]
    pub fn parity_only(&self) -> bool {
        self.expected_output == PARITY
    }
}

/// A collection of fixture cases for one symbol family.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureSet {
    /// Schema version.
    pub version: String,
    /// Family name, e.g. `lfs64/fcntl64`.
    pub family: String,
    /// When (or how) the set was produced.
    pub captured_at: String,
    /// Individual test cases.
    pub cases: Vec<FixtureCase>,
}

impl FixtureSet {
    /// Load fixture set from JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize fixture set to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load fixture set from a file path.
    pub fn from_file(path: &std::path::Path) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let set = Self::from_json(&content)?;
        Ok(set)
    }

    /// File name `capture` writes this set under.
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("{}.json", self.family.replace('/', "_"))
    }
}

fn parity() -> String {
    PARITY.to_string()
}

fn deserialize_expected_output<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(normalize_expected_output_value(&value))
}

pub(crate) fn normalize_expected_output_value(value: &serde_json::Value) -> String {
    if let Some(text) = value.as_str() {
        return text.to_string();
    }
    if value.is_null() {
        return parity();
    }
    serde_json::to_string(value).unwrap_or_else(|_| parity())
}

fn case(
    name: &str,
    function: &str,
    contract: &str,
    inputs: serde_json::Value,
    expected_output: &str,
    expected_errno: i32,
) -> FixtureCase {
    FixtureCase {
        name: name.to_string(),
        function: function.to_string(),
        contract: contract.to_string(),
        inputs,
        expected_output: expected_output.to_string(),
        expected_errno,
    }
}

/// Fixture set covering the `fcntl64` forwarding contract.
#[must_use]
pub fn builtin_fcntl64() -> FixtureSet {
    let f = "fcntl64";
    FixtureSet {
        version: String::from("v1"),
        family: String::from("lfs64/fcntl64"),
        captured_at: String::from("builtin"),
        cases: vec![
            case(
                "getfl_read_only",
                f,
                "no-argument command matches fcntl",
                json!({"open": "read_only", "cmd": "F_GETFL", "arg": null}),
                PARITY,
                0,
            ),
            case(
                "getfd_read_write",
                f,
                "no-argument command matches fcntl",
                json!({"open": "read_write", "cmd": "F_GETFD", "arg": null}),
                PARITY,
                0,
            ),
            case(
                "getpipe_sz",
                f,
                "no-argument command matches fcntl",
                json!({"open": "pipe", "cmd": "F_GETPIPE_SZ", "arg": null}),
                PARITY,
                0,
            ),
            case(
                "setfd_clear_cloexec",
                f,
                "int-argument command matches fcntl",
                json!({"open": "read_write", "cmd": "F_SETFD", "arg": 0}),
                PARITY,
                0,
            ),
            case(
                "setfl_nonblock",
                f,
                "int-argument command matches fcntl",
                json!({"open": "read_write", "cmd": "F_SETFL", "arg": libc::O_NONBLOCK}),
                PARITY,
                0,
            ),
            case(
                "dupfd_cloexec_min",
                f,
                "int-argument command matches fcntl",
                json!({"open": "read_only", "cmd": "F_DUPFD_CLOEXEC", "arg": 400}),
                PARITY,
                0,
            ),
            case(
                "getlk_unlocked",
                f,
                "pointer-argument command fills identical structure",
                json!({"open": "read_write", "cmd": "F_GETLK",
                       "arg": {"flock": {"type": "F_WRLCK", "start": 0, "len": 0}}}),
                PARITY,
                0,
            ),
            case(
                "setlk_write",
                f,
                "pointer-argument command matches fcntl",
                json!({"open": "read_write", "cmd": "F_SETLK",
                       "arg": {"flock": {"type": "F_WRLCK", "start": 0, "len": 128}}}),
                PARITY,
                0,
            ),
            case(
                "setlk_write_on_read_only",
                f,
                "errno passes through",
                json!({"open": "read_only", "cmd": "F_SETLK",
                       "arg": {"flock": {"type": "F_WRLCK", "start": 0, "len": 0}}}),
                PARITY,
                libc::EBADF,
            ),
            case(
                "bad_fd",
                f,
                "errno passes through",
                json!({"open": "bad_fd", "cmd": "F_GETFL", "arg": null}),
                "rc=-1 errno=EBADF",
                libc::EBADF,
            ),
            case(
                "unknown_command",
                f,
                "unclassified commands are still forwarded",
                json!({"open": "read_only", "cmd": 32767, "arg": 0}),
                PARITY,
                libc::EINVAL,
            ),
        ],
    }
}

/// Fixture set covering the `posix_fallocate64` forwarding contract.
#[must_use]
pub fn builtin_posix_fallocate64() -> FixtureSet {
    let f = "posix_fallocate64";
    FixtureSet {
        version: String::from("v1"),
        family: String::from("lfs64/posix_fallocate64"),
        captured_at: String::from("builtin"),
        cases: vec![
            case(
                "first_page",
                f,
                "allocation reserves the requested range",
                json!({"open": "read_write", "offset": 0, "len": 4096}),
                "rc=OK size=4096",
                0,
            ),
            case(
                "past_end",
                f,
                "allocation reserves the requested range",
                json!({"open": "write_only", "offset": 8192, "len": 100}),
                "rc=OK size=8292",
                0,
            ),
            case(
                "negative_offset",
                f,
                "error code is returned, not negated",
                json!({"open": "read_write", "offset": -1, "len": 16}),
                "rc=EINVAL size=0",
                libc::EINVAL,
            ),
            case(
                "negative_len",
                f,
                "error code is returned, not negated",
                json!({"open": "read_write", "offset": 0, "len": -1}),
                "rc=EINVAL size=0",
                libc::EINVAL,
            ),
            case(
                "zero_len",
                f,
                "error code is returned, not negated",
                json!({"open": "read_write", "offset": 0, "len": 0}),
                "rc=EINVAL size=0",
                libc::EINVAL,
            ),
            case(
                "overflowing_end",
                f,
                "64-bit range reaches the primitive unchanged",
                json!({"open": "read_write", "offset": i64::MAX, "len": 1}),
                PARITY,
                0,
            ),
            case(
                "read_only",
                f,
                "error code is returned, not negated",
                json!({"open": "read_only", "offset": 0, "len": 16}),
                "rc=EBADF size=0",
                libc::EBADF,
            ),
            case(
                "pipe",
                f,
                "error code is returned, not negated",
                json!({"open": "pipe", "offset": 0, "len": 16}),
                "rc=ESPIPE",
                libc::ESPIPE,
            ),
            case(
                "bad_fd",
                f,
                "error code is returned, not negated",
                json!({"open": "bad_fd", "offset": 0, "len": 16}),
                "rc=EBADF",
                libc::EBADF,
            ),
        ],
    }
}

/// Every built-in fixture set.
#[must_use]
pub fn builtin_sets() -> Vec<FixtureSet> {
    vec![builtin_fcntl64(), builtin_posix_fallocate64()]
}
