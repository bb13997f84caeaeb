//! Playwright integration for headless browser automation.
//!
//! This module contains the inline helper script, error mapping,
//! and availability checks for Node.js and Playwright.

use crate::{AuditError, Result};
use std::io;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Long-lived helper driven over stdin/stdout, one JSON object per line.
///
/// Commands: `open`, `snapshot`, `capture`, `close`. Every reply echoes the request `id`
/// and carries `status` (`ok` or `error`). The first line printed is `{"status":"ready"}`
/// once Chromium is up.
pub(crate) const HELPER_SCRIPT: &str = r#"
const readline = require('readline');
const headless = process.argv[1] !== '0';

let browser = null;
let context = null;
let page = null;

const FREEZE_CSS = '*, *::before, *::after { animation: none !important; transition: none !important; scroll-behavior: auto !important; }';

function reply(obj) {
  process.stdout.write(JSON.stringify(obj) + '\n');
}

function errorMessage(err) {
  return err && err.message ? err.message : String(err);
}

const sleep = (ms) => new Promise((resolve) => setTimeout(resolve, ms));

function isBlocked(url, domains) {
  let host = '';
  try {
    host = new URL(url).hostname;
  } catch (_) {
    return false;
  }
  return domains.some((d) => host === d || host.endsWith('.' + d));
}

async function open(msg) {
  if (context) {
    await context.close().catch(() => {});
    context = null;
    page = null;
  }
  context = await browser.newContext({ viewport: { width: msg.width, height: msg.height } });
  const blocked = msg.blockedDomains || [];
  if (blocked.length > 0) {
    await context.route('**/*', (route) =>
      isBlocked(route.request().url(), blocked) ? route.abort() : route.continue()
    );
  }
  page = await context.newPage();
  page.on('pageerror', () => {});

  let loaded = true;
  let error = null;
  try {
    await page.goto(msg.url, { waitUntil: 'load', timeout: msg.navTimeout });
  } catch (err) {
    loaded = false;
    error = errorMessage(err);
  }

  await page.addStyleTag({ content: FREEZE_CSS }).catch(() => {});
  await page
    .evaluate(() => {
      document.querySelectorAll('img[loading="lazy"]').forEach((img) => img.setAttribute('loading', 'eager'));
    })
    .catch(() => {});
  await sleep(msg.settleMs);

  return { loaded, error, url: page.url() };
}

async function snapshot(msg) {
  return page.evaluate((selectors) => {
    const nodes = [];
    const ids = new Map();

    const record = (el) => {
      if (ids.has(el)) return ids.get(el);
      const id = nodes.length;
      ids.set(el, id);
      const entry = { id, tag: el.tagName.toLowerCase(), children: [] };
      nodes.push(entry);

      const own = [];
      for (const child of el.childNodes) {
        if (child.nodeType === Node.TEXT_NODE) {
          const t = child.textContent.trim();
          if (t) own.push(t);
        }
      }
      const rect = el.getBoundingClientRect();
      const cs = window.getComputedStyle(el);
      entry.ownText = own.join(' ');
      entry.textContent = (el.textContent || '').trim();
      entry.boundingBox = {
        x: rect.left + window.scrollX,
        y: rect.top + window.scrollY,
        width: rect.width,
        height: rect.height
      };
      entry.computedStyle = {
        fontFamily: cs.fontFamily,
        fontSize: cs.fontSize,
        fontWeight: cs.fontWeight,
        lineHeight: cs.lineHeight
      };
      entry.children = Array.from(el.children).map(record);
      return id;
    };

    const matches = selectors.map((selector) => {
      try {
        return { selector, roots: Array.from(document.querySelectorAll(selector)).map(record) };
      } catch (err) {
        return { selector, roots: [], error: err && err.message ? err.message : String(err) };
      }
    });

    const doc = document.documentElement;
    return {
      url: window.location.href,
      title: document.title,
      documentHeight: Math.max(doc.scrollHeight, document.body ? document.body.scrollHeight : 0),
      viewportHeight: window.innerHeight,
      clientWidth: doc.clientWidth,
      nodes,
      matches
    };
  }, msg.selectors);
}

async function capture(msg) {
  await page.evaluate(({ overlays, labels }) => {
    const doc = document.documentElement;
    const container = document.createElement('div');
    container.id = '__fontaudit_overlay';
    Object.assign(container.style, {
      position: 'absolute', top: '0', left: '0', width: '100%',
      height: doc.scrollHeight + 'px', pointerEvents: 'none', zIndex: '2147483646'
    });
    for (const o of overlays) {
      const box = document.createElement('div');
      Object.assign(box.style, {
        position: 'absolute', top: o.bounds.y + 'px', left: o.bounds.x + 'px',
        width: o.bounds.width + 'px', height: o.bounds.height + 'px',
        border: '2px solid #ff0000', boxSizing: 'border-box'
      });
      container.appendChild(box);
    }
    for (const l of labels) {
      const label = document.createElement('div');
      label.textContent = l.text;
      Object.assign(label.style, {
        position: 'absolute', top: l.bounds.y + 'px', left: l.bounds.x + 'px',
        width: l.bounds.width + 'px', boxSizing: 'border-box', whiteSpace: 'pre-wrap',
        backgroundColor: 'rgba(255,255,255,0.9)', color: '#cc0000', fontFamily: 'monospace',
        fontSize: '12px', lineHeight: '16px', fontWeight: '500', padding: '6px 10px',
        borderRadius: '4px', border: l.overlapping ? '1px dashed #cc0000' : '1px solid #cc0000'
      });
      container.appendChild(label);
    }
    doc.appendChild(container);
  }, { overlays: msg.overlays, labels: msg.labels });

  const shots = [];
  try {
    for (let i = 0; i < msg.positions.length; i++) {
      await page.evaluate((y) => window.scrollTo(0, y), msg.positions[i]);
      await sleep(msg.settleMs);
      const scrollY = await page.evaluate(() => window.scrollY);
      const path = `${msg.dir}/${msg.prefix}_${String(i).padStart(4, '0')}.png`;
      await page.screenshot({ path, fullPage: false });
      shots.push({ index: i, scrollY, path });
    }
  } finally {
    await page
      .evaluate(() => {
        const el = document.getElementById('__fontaudit_overlay');
        if (el) el.remove();
      })
      .catch(() => {});
  }
  return { shots };
}

async function handle(msg) {
  switch (msg.cmd) {
    case 'open':
      return open(msg);
    case 'snapshot':
      if (!page) throw new Error('no page is open');
      return snapshot(msg);
    case 'capture':
      if (!page) throw new Error('no page is open');
      return capture(msg);
    default:
      throw new Error('unknown command ' + msg.cmd);
  }
}

async function main() {
  try {
    const { chromium } = require('playwright');
    browser = await chromium.launch({ headless });
  } catch (err) {
    reply({ status: 'error', message: errorMessage(err) });
    process.exit(1);
  }
  reply({ status: 'ready' });

  const rl = readline.createInterface({ input: process.stdin, terminal: false });
  for await (const line of rl) {
    if (!line.trim()) continue;
    let msg;
    try {
      msg = JSON.parse(line);
    } catch (err) {
      reply({ status: 'error', message: 'invalid request: ' + errorMessage(err) });
      continue;
    }
    if (msg.cmd === 'close') {
      await browser.close().catch(() => {});
      reply({ id: msg.id, status: 'ok' });
      process.exit(0);
    }
    try {
      const result = await handle(msg);
      reply(Object.assign({ id: msg.id, status: 'ok' }, result));
    } catch (err) {
      reply({ id: msg.id, status: 'error', message: errorMessage(err) });
    }
  }
  await browser.close().catch(() => {});
}

main();
"#;

/// Timeout for checking node/playwright availability.
pub(crate) const NODE_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// Script to check if Playwright is installed.
const PLAYWRIGHT_CHECK_SCRIPT: &str = "require('playwright'); process.stdout.write('ok');";

/// Maps a spawn error to an appropriate AuditError.
pub(crate) fn map_spawn_error(err: io::Error, command: &str) -> AuditError {
    if err.kind() == io::ErrorKind::NotFound {
        AuditError::browser(format!(
            "Unable to spawn Playwright helper; '{}' was not found on PATH",
            command
        ))
    } else {
        AuditError::Io(err)
    }
}

/// Maps an error message reported by the helper (or its stderr) to an AuditError.
pub(crate) fn map_helper_error(context: &str, message: &str) -> AuditError {
    let lower = message.to_ascii_lowercase();

    if lower.contains("cannot find module 'playwright'") {
        return AuditError::browser(
            "Playwright npm package is missing; install with `npm install playwright`.",
        );
    }

    if lower.contains("executable doesn't exist") {
        return AuditError::browser(format!(
            "Playwright chromium executable is missing; run `npx playwright install chromium`. ({})",
            first_line(message)
        ));
    }

    if lower.contains("timeout") {
        return AuditError::browser(format!(
            "Playwright {} timed out: {}. Hint: increase --nav-timeout or [timeouts] process, and ensure the page finishes loading.",
            context,
            first_line(message)
        ));
    }

    AuditError::browser(format!("Playwright {} failed: {}", context, message.trim()))
}

fn first_line(message: &str) -> &str {
    message.lines().next().unwrap_or_default().trim()
}

/// Ensures Node.js is available on the system.
pub(crate) async fn ensure_node_available(node_command: &str) -> Result<()> {
    let mut cmd = Command::new(node_command);
    cmd.arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null());

    let status = tokio::time::timeout(NODE_CHECK_TIMEOUT, cmd.status())
        .await
        .map_err(|_| {
            AuditError::browser(format!(
                "Timed out checking node availability after {:?}",
                NODE_CHECK_TIMEOUT
            ))
        })?
        .map_err(|err| map_spawn_error(err, node_command))?;

    if !status.success() {
        return Err(AuditError::browser(format!(
            "Node command {:?} is not available (exit {})",
            node_command, status
        )));
    }

    Ok(())
}

/// Ensures Playwright npm package is installed.
pub(crate) async fn ensure_playwright_available(node_command: &str) -> Result<()> {
    let mut cmd = Command::new(node_command);
    cmd.arg("-e")
        .arg(PLAYWRIGHT_CHECK_SCRIPT)
        .stdout(Stdio::null())
        .stderr(Stdio::piped());

    let output = tokio::time::timeout(NODE_CHECK_TIMEOUT, cmd.output())
        .await
        .map_err(|_| {
            AuditError::browser(format!(
                "Timed out checking Playwright availability after {:?}",
                NODE_CHECK_TIMEOUT
            ))
        })?
        .map_err(|err| map_spawn_error(err, node_command))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(map_helper_error("availability check", &stderr));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(err: AuditError) -> String {
        match err {
            AuditError::Browser(msg) => msg,
            other => panic!("expected browser error, got {other:?}"),
        }
    }

    #[test]
    fn helper_error_detects_missing_module() {
        let msg = message(map_helper_error(
            "launch",
            "Error: Cannot find module 'playwright'\n    at Module._resolveFilename",
        ));
        assert!(
            msg.contains("Playwright npm package is missing"),
            "expected missing playwright hint, got: {msg}"
        );
    }

    #[test]
    fn helper_error_detects_missing_chromium() {
        let msg = message(map_helper_error(
            "launch",
            "browserType.launch: Executable doesn't exist at /root/.cache/ms-playwright/chromium-1091/chrome-linux/chrome",
        ));
        assert!(msg.contains("chromium executable is missing"), "got: {msg}");
        assert!(msg.contains("npx playwright install chromium"));
    }

    #[test]
    fn helper_error_includes_timeout_hint() {
        let msg = message(map_helper_error(
            "snapshot",
            "page.evaluate: Timeout 30000ms exceeded.",
        ));
        assert!(msg.contains("timed out"), "got: {msg}");
        assert!(msg.contains("--nav-timeout"), "expected CLI hint, got: {msg}");
    }

    #[test]
    fn helper_error_falls_back_to_raw_message() {
        let msg = message(map_helper_error("capture", "  Target closed  "));
        assert_eq!(msg, "Playwright capture failed: Target closed");
    }

    #[test]
    fn spawn_not_found_mentions_command() {
        let err = map_spawn_error(io::Error::from(io::ErrorKind::NotFound), "node18");
        let msg = message(err);
        assert!(msg.contains("'node18' was not found on PATH"));
    }

    #[test]
    fn helper_script_speaks_every_command() {
        for cmd in ["'open'", "'snapshot'", "'capture'", "'close'", "'ready'"] {
            assert!(HELPER_SCRIPT.contains(cmd), "helper script is missing {cmd}");
        }
    }
}
