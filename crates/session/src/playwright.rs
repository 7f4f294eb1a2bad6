//! Playwright-backed session
//!
//! Drives a real browser through a persistent Node sidecar. The factory
//! writes a small driver script to a tempdir; each opened session spawns
//! `node driver.js <options-json>` and speaks a line-delimited JSON
//! protocol over the child's stdin/stdout: one command per line out, one
//! reply per line back. The driver launches one browser context and keeps
//! it alive for the life of the process, which is what makes stateful
//! page interaction possible from this side.

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command as TokioCommand};
use tracing::{debug, info};

use crate::error::{SessionError, SessionResult};
use crate::session::{Session, SessionFactory, StorageState, ValidityState};

/// Browser engine to launch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Browser {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl Browser {
    fn as_str(&self) -> &'static str {
        match self {
            Browser::Chromium => "chromium",
            Browser::Firefox => "firefox",
            Browser::Webkit => "webkit",
        }
    }
}

/// Configuration for Playwright-backed sessions.
#[derive(Debug, Clone)]
pub struct PlaywrightConfig {
    pub browser: Browser,
    pub headless: bool,
    pub viewport_width: u32,
    pub viewport_height: u32,
    /// Default timeout applied to every page action and wait.
    pub action_timeout_ms: u64,
}

impl Default for PlaywrightConfig {
    fn default() -> Self {
        Self {
            browser: Browser::Chromium,
            headless: true,
            viewport_width: 1280,
            viewport_height: 720,
            action_timeout_ms: 5000,
        }
    }
}

/// Opens Playwright-backed sessions, one sidecar process per session.
pub struct PlaywrightFactory {
    config: PlaywrightConfig,
    // Keeps the tempdir alive for as long as sessions may be spawned.
    _script_dir: tempfile::TempDir,
    script_path: PathBuf,
}

impl PlaywrightFactory {
    /// Create a factory, verifying the Playwright installation up front.
    pub fn new(config: PlaywrightConfig) -> SessionResult<Self> {
        Self::check_playwright_installed()?;

        let script_dir = tempfile::tempdir()?;
        let script_path = script_dir.path().join("driver.js");
        std::fs::write(&script_path, DRIVER_JS)?;

        debug!("Playwright driver script at {}", script_path.display());

        Ok(Self {
            config,
            _script_dir: script_dir,
            script_path,
        })
    }

    fn check_playwright_installed() -> SessionResult<()> {
        let status = std::process::Command::new("npx")
            .args(["playwright", "--version"])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();

        match status {
            Ok(status) if status.success() => Ok(()),
            _ => Err(SessionError::DriverNotFound),
        }
    }
}

#[async_trait]
impl SessionFactory for PlaywrightFactory {
    async fn open(&self, storage: Option<&StorageState>) -> SessionResult<Box<dyn Session>> {
        let opts = json!({
            "browser": self.config.browser.as_str(),
            "headless": self.config.headless,
            "viewport": {
                "width": self.config.viewport_width,
                "height": self.config.viewport_height,
            },
            "timeout_ms": self.config.action_timeout_ms,
            "storageState": storage.map(|s| s.0.clone()),
        });

        info!("Launching {} sidecar", self.config.browser.as_str());

        let mut child = TokioCommand::new("node")
            .arg(&self.script_path)
            .arg(opts.to_string())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| SessionError::Driver("driver stdin unavailable".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| SessionError::Driver("driver stdout unavailable".to_string()))?;

        let mut session = PlaywrightSession {
            child,
            stdin,
            reader: BufReader::new(stdout),
        };

        // The driver emits one reply line once the browser context is up.
        session.read_reply().await?;

        Ok(Box::new(session))
    }
}

/// One live browser context behind a sidecar process.
pub struct PlaywrightSession {
    child: Child,
    stdin: ChildStdin,
    reader: BufReader<ChildStdout>,
}

#[derive(Debug, Deserialize)]
struct Reply {
    ok: bool,
    #[serde(default)]
    value: Option<Value>,
    #[serde(default)]
    error: Option<String>,
}

impl PlaywrightSession {
    async fn read_reply(&mut self) -> SessionResult<Value> {
        let mut line = String::new();
        let n = self.reader.read_line(&mut line).await?;
        if n == 0 {
            return Err(SessionError::Closed);
        }

        let reply: Reply = serde_json::from_str(line.trim())
            .map_err(|e| SessionError::Protocol(format!("bad driver reply: {e}: {line}")))?;

        if reply.ok {
            Ok(reply.value.unwrap_or(Value::Null))
        } else {
            Err(SessionError::Driver(
                reply.error.unwrap_or_else(|| "unknown driver error".to_string()),
            ))
        }
    }

    async fn send(&mut self, cmd: Value) -> SessionResult<Value> {
        let line = cmd.to_string();
        debug!("driver <- {}", line);

        self.stdin.write_all(line.as_bytes()).await?;
        self.stdin.write_all(b"\n").await?;
        self.stdin.flush().await?;

        self.read_reply().await
    }
}

/// Classify a driver error message for an element interaction.
fn element_error(selector: &str, err: SessionError) -> SessionError {
    match err {
        SessionError::Driver(message) => {
            if message.contains("Timeout") {
                SessionError::InteractionTimeout(selector.to_string())
            } else if message.contains("failed to find element") {
                SessionError::ElementNotFound(selector.to_string())
            } else {
                SessionError::Driver(message)
            }
        }
        other => other,
    }
}

#[async_trait]
impl Session for PlaywrightSession {
    async fn goto(&mut self, url: &str) -> SessionResult<()> {
        self.send(json!({ "op": "goto", "url": url }))
            .await
            .map_err(|e| match e {
                SessionError::Driver(reason) => SessionError::Navigation {
                    url: url.to_string(),
                    reason,
                },
                other => other,
            })?;
        Ok(())
    }

    async fn fill(&mut self, selector: &str, value: &str) -> SessionResult<()> {
        self.send(json!({ "op": "fill", "selector": selector, "value": value }))
            .await
            .map_err(|e| element_error(selector, e))?;
        Ok(())
    }

    async fn check(&mut self, selector: &str) -> SessionResult<()> {
        self.send(json!({ "op": "check", "selector": selector }))
            .await
            .map_err(|e| element_error(selector, e))?;
        Ok(())
    }

    async fn click(&mut self, selector: &str) -> SessionResult<()> {
        self.send(json!({ "op": "click", "selector": selector }))
            .await
            .map_err(|e| element_error(selector, e))?;
        Ok(())
    }

    async fn is_visible(&mut self, selector: &str) -> SessionResult<bool> {
        let value = self
            .send(json!({ "op": "is_visible", "selector": selector }))
            .await
            .map_err(|e| element_error(selector, e))?;
        Ok(value.as_bool().unwrap_or(false))
    }

    async fn wait_visible(&mut self, selector: &str) -> SessionResult<()> {
        self.send(json!({ "op": "wait_visible", "selector": selector }))
            .await
            .map_err(|e| element_error(selector, e))?;
        Ok(())
    }

    async fn wait_for_url(&mut self, url: &str) -> SessionResult<()> {
        self.send(json!({ "op": "wait_url", "url": url }))
            .await
            .map_err(|e| element_error(url, e))?;
        Ok(())
    }

    async fn current_url(&mut self) -> SessionResult<String> {
        let value = self.send(json!({ "op": "current_url" })).await?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| SessionError::Protocol("current_url reply was not a string".to_string()))
    }

    async fn input_value(&mut self, selector: &str) -> SessionResult<String> {
        let value = self
            .send(json!({ "op": "input_value", "selector": selector }))
            .await
            .map_err(|e| element_error(selector, e))?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| SessionError::Protocol("input_value reply was not a string".to_string()))
    }

    async fn validity(&mut self, selector: &str) -> SessionResult<ValidityState> {
        let value = self
            .send(json!({ "op": "validity", "selector": selector }))
            .await
            .map_err(|e| element_error(selector, e))?;
        serde_json::from_value(value)
            .map_err(|e| SessionError::Protocol(format!("bad validity reply: {e}")))
    }

    async fn submit_form(&mut self, selector: &str) -> SessionResult<()> {
        self.send(json!({ "op": "submit_form", "selector": selector }))
            .await
            .map_err(|e| element_error(selector, e))?;
        Ok(())
    }

    async fn storage_state(&mut self) -> SessionResult<StorageState> {
        let value = self.send(json!({ "op": "storage_state" })).await?;
        Ok(StorageState(value))
    }

    async fn close(&mut self) -> SessionResult<()> {
        // Best effort: ask the driver to shut down, then reap the child.
        let _ = self.send(json!({ "op": "close" })).await;
        let _ = self.child.wait().await;
        Ok(())
    }
}

/// Line-delimited JSON driver serving one browser context.
const DRIVER_JS: &str = r#"// Driver for one Playwright browsing context.
// Reads one JSON command per stdin line, writes one JSON reply per line.
const { chromium, firefox, webkit } = require('playwright');
const readline = require('readline');

(async () => {
  const opts = JSON.parse(process.argv[2]);
  const engines = { chromium, firefox, webkit };
  const browser = await engines[opts.browser].launch({ headless: opts.headless });
  const context = await browser.newContext({
    viewport: opts.viewport,
    ...(opts.storageState ? { storageState: opts.storageState } : {}),
  });
  const page = await context.newPage();
  page.setDefaultTimeout(opts.timeout_ms);
  page.setDefaultNavigationTimeout(opts.timeout_ms);
  console.log(JSON.stringify({ ok: true }));

  const rl = readline.createInterface({ input: process.stdin, terminal: false });
  for await (const line of rl) {
    if (!line.trim()) continue;
    let reply;
    try {
      const cmd = JSON.parse(line);
      let value = null;
      switch (cmd.op) {
        case 'goto':
          await page.goto(cmd.url);
          break;
        case 'fill':
          await page.fill(cmd.selector, cmd.value);
          break;
        case 'check':
          await page.check(cmd.selector);
          break;
        case 'click':
          await page.click(cmd.selector);
          break;
        case 'is_visible':
          value = await page.isVisible(cmd.selector);
          break;
        case 'wait_visible':
          await page.waitForSelector(cmd.selector, { state: 'visible' });
          break;
        case 'wait_url':
          await page.waitForURL(cmd.url);
          break;
        case 'current_url':
          value = page.url();
          break;
        case 'input_value':
          value = await page.inputValue(cmd.selector);
          break;
        case 'validity':
          value = await page.$eval(cmd.selector, (el) => ({
            value_missing: el.validity.valueMissing,
            type_mismatch: el.validity.typeMismatch,
            too_short: el.validity.tooShort,
            valid: el.checkValidity(),
          }));
          break;
        case 'submit_form':
          await page.$eval(cmd.selector, (form) => form.submit());
          await page.waitForLoadState();
          break;
        case 'storage_state':
          value = await context.storageState();
          break;
        case 'close':
          console.log(JSON.stringify({ ok: true }));
          await browser.close();
          process.exit(0);
        default:
          throw new Error('unknown op: ' + cmd.op);
      }
      reply = { ok: true, value };
    } catch (err) {
      reply = { ok: false, error: String((err && err.message) || err) };
    }
    console.log(JSON.stringify(reply));
  }
  await browser.close();
})();
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_messages_classify_as_interaction_timeout() {
        let err = element_error(
            "button[type=\"submit\"]",
            SessionError::Driver("page.click: Timeout 5000ms exceeded.".to_string()),
        );
        assert!(matches!(err, SessionError::InteractionTimeout(_)));
    }

    #[test]
    fn missing_element_messages_classify_as_element_not_found() {
        let err = element_error(
            "#logout-form",
            SessionError::Driver("Error: failed to find element matching selector".to_string()),
        );
        assert!(matches!(err, SessionError::ElementNotFound(_)));
    }

    #[test]
    fn non_driver_errors_pass_through_unmodified() {
        let err = element_error("input", SessionError::Closed);
        assert!(matches!(err, SessionError::Closed));
    }

    #[test]
    fn driver_script_covers_every_protocol_op() {
        for op in [
            "goto",
            "fill",
            "check",
            "click",
            "is_visible",
            "wait_visible",
            "wait_url",
            "current_url",
            "input_value",
            "validity",
            "submit_form",
            "storage_state",
            "close",
        ] {
            assert!(DRIVER_JS.contains(&format!("case '{op}':")), "missing op {op}");
        }
    }
}
