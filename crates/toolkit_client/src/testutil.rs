//! Fake toolkit binaries for tests.
//!
//! The client is exercised against real subprocesses: each helper writes
//! a small shell script into a tempdir and hands back its path. Keep the
//! returned [`TempDir`] alive for as long as the script is in use.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;

use tempfile::TempDir;

/// Script body that prints every argument on its own line.
pub const ECHO_ARGS: &str = r#"for arg in "$@"; do
  printf '%s\n' "$arg"
done"#;

/// Fake toolkit that answers the `version` handshake and otherwise runs
/// `body` with the invocation arguments in `$@`.
pub fn fake_toolkit(body: &str) -> (TempDir, PathBuf) {
    fake_toolkit_raw(&format!(
        r#"if [ "$1" = "version" ]; then
  echo '{{"compat": 1}}'
  exit 0
fi
{}"#,
        body
    ))
}

/// Fake toolkit running `body` for every invocation, `version` included.
pub fn fake_toolkit_raw(body: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("toolkit.sh");
    fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();

    let mut perms = fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).unwrap();

    (dir, path)
}

/// Fake toolkit that prints `json` for every command after the
/// handshake.
pub fn json_toolkit(json: &str) -> (TempDir, PathBuf) {
    fake_toolkit(&format!("cat <<'EOF'\n{}\nEOF", json))
}

/// Fake toolkit that records its argument vector (one argument per
/// line) next to the script before printing `json`. Returns the capture
/// file path alongside the script.
pub fn capture_toolkit(json: &str) -> (TempDir, PathBuf, PathBuf) {
    let (dir, script) = fake_toolkit(&format!(
        r#"printf '%s\n' "$@" > "$(dirname "$0")/args.txt"
cat <<'EOF'
{}
EOF"#,
        json
    ));
    let capture = dir.path().join("args.txt");
    (dir, script, capture)
}

/// Read an argument vector recorded by [`capture_toolkit`].
pub fn captured_args(capture: &std::path::Path) -> Vec<String> {
    fs::read_to_string(capture)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}
