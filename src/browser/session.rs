//! A persistent Playwright helper process serving one page at a time.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::task::JoinHandle;
use tokio::time::timeout;

use super::dom::{convert_raw_dom, RawDomSnapshot};
use super::playwright::{
    ensure_node_available, ensure_playwright_available, map_helper_error, map_spawn_error,
    HELPER_SCRIPT,
};
use super::{CaptureRequest, CapturedShot, PageDriver, PageLoad};
use crate::types::{DomSnapshot, Viewport};
use crate::{AuditError, Result};

/// Default timeout for page navigation.
pub const DEFAULT_NAVIGATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Default delay after navigation before sampling.
pub const DEFAULT_SETTLE: Duration = Duration::from_millis(1500);

/// Default delay after each scroll before a capture.
pub const DEFAULT_CAPTURE_SETTLE: Duration = Duration::from_millis(300);

/// Default budget for a single helper command beyond its own waits.
pub const DEFAULT_PROCESS_TIMEOUT: Duration = Duration::from_secs(60);

/// Analytics and embed hosts whose requests are aborted.
pub const DEFAULT_BLOCKED_DOMAINS: [&str; 11] = [
    "analytics.google.com",
    "google-analytics.com",
    "doubleclick.net",
    "youtube.com",
    "ytimg.com",
    "linkedin.com",
    "facebook.com",
    "fbcdn.net",
    "googletagmanager.com",
    "hotjar.com",
    "clarity.ms",
];

/// Configuration options for browser sessions.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// The Node.js command to use (default: "node").
    pub node_command: String,
    /// Whether to run in headless mode.
    pub headless: bool,
    /// Timeout for page navigation.
    pub navigation_timeout: Duration,
    /// Wait after navigation, animation freezing and lazy-image loading.
    pub settle: Duration,
    /// Wait after each scroll before capturing.
    pub capture_settle: Duration,
    /// Budget for each helper command on top of its own waits.
    pub process_timeout: Duration,
    pub blocked_domains: Vec<String>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            node_command: "node".to_string(),
            headless: true,
            navigation_timeout: DEFAULT_NAVIGATION_TIMEOUT,
            settle: DEFAULT_SETTLE,
            capture_settle: DEFAULT_CAPTURE_SETTLE,
            process_timeout: DEFAULT_PROCESS_TIMEOUT,
            blocked_domains: DEFAULT_BLOCKED_DOMAINS.iter().map(|d| d.to_string()).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    id: Option<u64>,
    status: String,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenReply {
    loaded: bool,
    error: Option<String>,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawShot {
    index: usize,
    scroll_y: f64,
    path: PathBuf,
}

#[derive(Debug, Deserialize)]
struct CaptureReply {
    #[serde(default)]
    shots: Vec<RawShot>,
}

/// A running helper with one browser; pages are opened one after another.
pub struct PageSession {
    options: SessionOptions,
    child: Child,
    stdin: ChildStdin,
    stdout: Lines<BufReader<ChildStdout>>,
    stderr_task: Option<JoinHandle<String>>,
    next_id: u64,
}

impl PageSession {
    /// Checks Node and Playwright, then starts the helper and waits for Chromium.
    pub async fn launch(options: SessionOptions) -> Result<Self> {
        ensure_node_available(&options.node_command).await?;
        ensure_playwright_available(&options.node_command).await?;

        let mut cmd = Command::new(&options.node_command);
        cmd.arg("-e")
            .arg(HELPER_SCRIPT)
            .arg(if options.headless { "1" } else { "0" })
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd
            .spawn()
            .map_err(|err| map_spawn_error(err, &options.node_command))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| AuditError::browser("Playwright helper stdin unavailable"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| AuditError::browser("Playwright helper stdout unavailable"))?;
        let stderr_pipe = child.stderr.take();

        let stderr_task = tokio::spawn(async move {
            let mut buf = Vec::new();
            if let Some(mut err) = stderr_pipe {
                let _ = err.read_to_end(&mut buf).await;
            }
            String::from_utf8_lossy(&buf).into_owned()
        });

        let mut session = Self {
            options,
            child,
            stdin,
            stdout: BufReader::new(stdout).lines(),
            stderr_task: Some(stderr_task),
            next_id: 0,
        };

        let ready = session
            .read_reply("launch", session.options.process_timeout)
            .await?;
        if ready.status != "ready" {
            let message = ready.message.unwrap_or_else(|| ready.status.clone());
            return Err(map_helper_error("launch", &message));
        }
        log::debug!("Playwright helper ready (headless: {})", session.options.headless);
        Ok(session)
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// Asks the helper to close the browser; kills it if it does not exit in time.
    pub async fn close(mut self) -> Result<()> {
        let id = self.next_id;
        let line = format!("{}\n", json!({ "id": id, "cmd": "close" }));
        if self.stdin.write_all(line.as_bytes()).await.is_ok() {
            let _ = self.stdin.flush().await;
        }
        match timeout(Duration::from_secs(10), self.child.wait()).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(err)) => Err(AuditError::Io(err)),
            Err(_) => {
                let _ = self.child.kill().await;
                Ok(())
            }
        }
    }

    async fn request<T: DeserializeOwned>(
        &mut self,
        cmd: &str,
        mut body: Value,
        budget: Duration,
    ) -> Result<T> {
        let id = self.next_id;
        self.next_id += 1;
        if let Value::Object(map) = &mut body {
            map.insert("id".into(), json!(id));
            map.insert("cmd".into(), json!(cmd));
        }

        let line = format!("{}\n", body);
        if let Err(err) = self.stdin.write_all(line.as_bytes()).await {
            return Err(self.crashed(cmd, &err.to_string()).await);
        }
        self.stdin.flush().await?;

        let (envelope, raw) = self.read_reply_raw(cmd, budget).await?;
        if envelope.id != Some(id) {
            return Err(AuditError::browser(format!(
                "Playwright helper answered request {:?} while {} was waiting on {}",
                envelope.id, cmd, id
            )));
        }
        if envelope.status != "ok" {
            let message = envelope.message.unwrap_or_else(|| envelope.status.clone());
            return Err(map_helper_error(cmd, &message));
        }
        Ok(serde_json::from_value(raw)?)
    }

    async fn read_reply(&mut self, context: &str, budget: Duration) -> Result<Envelope> {
        self.read_reply_raw(context, budget).await.map(|(env, _)| env)
    }

    async fn read_reply_raw(&mut self, context: &str, budget: Duration) -> Result<(Envelope, Value)> {
        let line = match timeout(budget, self.stdout.next_line()).await {
            Ok(Ok(Some(line))) => line,
            Ok(Ok(None)) => return Err(self.crashed(context, "helper exited").await),
            Ok(Err(err)) => return Err(AuditError::Io(err)),
            Err(_) => {
                let _ = self.child.kill().await;
                return Err(AuditError::browser(format!(
                    "Playwright helper timed out after {:?} during {}",
                    budget, context
                )));
            }
        };

        let raw: Value = serde_json::from_str(line.trim()).map_err(|_| {
            AuditError::browser(format!(
                "Unexpected Playwright helper output during {}: {}",
                context,
                line.trim()
            ))
        })?;
        let envelope: Envelope = serde_json::from_value(raw.clone())?;
        Ok((envelope, raw))
    }

    async fn crashed(&mut self, context: &str, fallback: &str) -> AuditError {
        let stderr = match self.stderr_task.take() {
            Some(task) => timeout(Duration::from_secs(2), task)
                .await
                .ok()
                .and_then(|joined| joined.ok())
                .unwrap_or_default(),
            None => String::new(),
        };
        let detail = if stderr.trim().is_empty() {
            fallback.to_string()
        } else {
            stderr
        };
        map_helper_error(context, &detail)
    }
}

impl PageDriver for PageSession {
    async fn open(&mut self, url: &str, viewport: &Viewport) -> Result<PageLoad> {
        let opts = &self.options;
        let body = json!({
            "url": url,
            "width": viewport.width,
            "height": viewport.height,
            "navTimeout": opts.navigation_timeout.as_millis() as u64,
            "settleMs": opts.settle.as_millis() as u64,
            "blockedDomains": opts.blocked_domains,
        });
        let budget = opts.navigation_timeout + opts.settle + opts.process_timeout;
        let reply: OpenReply = self.request("open", body, budget).await?;
        Ok(PageLoad {
            loaded: reply.loaded,
            error: reply.error,
            final_url: reply.url,
        })
    }

    async fn snapshot(&mut self, selectors: &[String]) -> Result<DomSnapshot> {
        let budget = self.options.process_timeout;
        let raw: RawDomSnapshot = self
            .request("snapshot", json!({ "selectors": selectors }), budget)
            .await?;
        Ok(convert_raw_dom(raw))
    }

    async fn capture(&mut self, request: &CaptureRequest) -> Result<Vec<CapturedShot>> {
        let opts = &self.options;
        let body = json!({
            "overlays": request.overlays,
            "labels": request.labels,
            "positions": request.positions,
            "dir": request.dir.to_string_lossy(),
            "prefix": request.prefix,
            "settleMs": opts.capture_settle.as_millis() as u64,
        });
        let budget = opts.process_timeout + opts.capture_settle * request.positions.len() as u32;
        let reply: CaptureReply = self.request("capture", body, budget).await?;
        Ok(reply
            .shots
            .into_iter()
            .map(|s| CapturedShot {
                index: s.index,
                scroll_y: s.scroll_y,
                path: s.path,
            })
            .collect())
    }
}
