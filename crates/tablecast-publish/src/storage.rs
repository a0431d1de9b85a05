//! Serialization and storage backends.

use std::io::Write;
use std::path::PathBuf;
use std::process::Command;
use std::time::Duration;

use anyhow::Context;
use tablecast_core::Deadline;

use crate::metadata::Payload;

/// JSON-encode a payload, then HTML-escape it so the result could be
/// inlined inside a `<script>` tag (we don't currently do so, but
/// consumers might).
pub fn serialize(payload: &Payload) -> anyhow::Result<Vec<u8>> {
    let raw = serde_json::to_vec(payload).context("failed to serialize payload")?;
    Ok(html_escape(&raw))
}

/// Escape `<`, `>`, `&`, U+2028 and U+2029 as `\uXXXX`. The line
/// separators matter because they are valid JSON but not valid
/// JavaScript string content.
fn html_escape(raw: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(raw.len());
    let mut i = 0;
    while i < raw.len() {
        match raw[i] {
            b'<' => out.extend_from_slice(b"\\u003c"),
            b'>' => out.extend_from_slice(b"\\u003e"),
            b'&' => out.extend_from_slice(b"\\u0026"),
            0xE2 if raw.get(i + 1) == Some(&0x80)
                && matches!(raw.get(i + 2), Some(0xA8) | Some(0xA9)) =>
            {
                if raw[i + 2] == 0xA8 {
                    out.extend_from_slice(b"\\u2028");
                } else {
                    out.extend_from_slice(b"\\u2029");
                }
                i += 2;
            }
            b => out.push(b),
        }
        i += 1;
    }
    out
}

/// Writes one serialized payload to a destination URL.
pub trait Storage: Send + Sync {
    fn store(&self, deadline: Deadline, destination: &str, bytes: &[u8]) -> anyhow::Result<()>;
}

impl<S: Storage + ?Sized> Storage for std::sync::Arc<S> {
    fn store(&self, deadline: Deadline, destination: &str, bytes: &[u8]) -> anyhow::Result<()> {
        (**self).store(deadline, destination, bytes)
    }
}

/// Uploads through `gsutil`, staged in a temp directory so the upload
/// gets gzip transport encoding and a short public cache lifetime.
pub struct GcsStorage;

impl Storage for GcsStorage {
    fn store(&self, deadline: Deadline, destination: &str, bytes: &[u8]) -> anyhow::Result<()> {
        if deadline.expired() {
            anyhow::bail!("publish deadline exceeded before upload to {destination}");
        }

        let file_name = destination
            .rsplit('/')
            .next()
            .filter(|n| !n.is_empty())
            .with_context(|| format!("destination {destination} has no file name"))?;

        let staging = tempfile::tempdir().context("failed to make staging directory")?;
        let local = staging.path().join(file_name);
        let mut f = std::fs::File::create(&local)
            .with_context(|| format!("failed to create {}", local.display()))?;
        f.write_all(bytes)
            .with_context(|| format!("failed to write {}", local.display()))?;

        // Bump the README latency notes if the max-age changes.
        let mut cmd = Command::new("gsutil");
        cmd.args(["-h", "Cache-Control:public,max-age=120", "cp", "-Z"])
            .arg(&local)
            .arg(destination);
        let output = run_until_deadline(cmd, deadline)
            .with_context(|| format!("gsutil upload to {destination}"))?;
        if !output.status.success() {
            log::error!("{}", String::from_utf8_lossy(&output.stderr));
            anyhow::bail!("gsutil upload to {destination} failed: {}", output.status);
        }
        Ok(())
    }
}

/// Run a child process, killing it if the deadline expires first.
/// `Command::output` alone would block unboundedly, and an upload must
/// not outlive the publish cycle that started it.
fn run_until_deadline(
    mut cmd: Command,
    deadline: Deadline,
) -> anyhow::Result<std::process::Output> {
    use std::process::Stdio;

    let mut child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .context("failed to spawn")?;
    loop {
        if child.try_wait().context("failed to poll child")?.is_some() {
            return child.wait_with_output().context("failed to collect output");
        }
        if deadline.expired() {
            let _ = child.kill();
            let _ = child.wait();
            anyhow::bail!("publish deadline exceeded, killed after spawn");
        }
        std::thread::sleep(Duration::from_millis(25));
    }
}

/// Writes under a local directory instead of a bucket, for runs with
/// no upload credentials. The destination's scheme and bucket name
/// become directories.
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Storage for LocalStorage {
    fn store(&self, _deadline: Deadline, destination: &str, bytes: &[u8]) -> anyhow::Result<()> {
        let relative = destination
            .split_once("://")
            .map(|(_, rest)| rest)
            .unwrap_or(destination);
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to make directories {}", parent.display()))?;
        }
        std::fs::write(&path, bytes)
            .with_context(|| format!("failed to write {}", path.display()))?;
        log::info!("wrote out to local path: {}", path.display());
        Ok(())
    }
}

/// Logs what would be written and writes nothing.
pub struct DebugStorage;

impl Storage for DebugStorage {
    fn store(&self, _deadline: Deadline, destination: &str, bytes: &[u8]) -> anyhow::Result<()> {
        log::info!("would write {} bytes to {destination}", bytes.len());
        Ok(())
    }
}
