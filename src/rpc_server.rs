//! Noise Control RPC Server — JSON-RPC over stdin/stdout for a browser host.
//!
//! Protocol: one JSON object per line (newline-delimited JSON).
//! Request:  {"id":1, "method":"prober.message", "params":{"tab":"...","name":"hasNoise","data":true}}
//! Response: {"id":1, "result":{...}} or {"id":1, "error":"..."}
//!
//! Logs go to stderr; stdout carries protocol lines only.

use std::io::{self, BufRead, Write};
use std::sync::Mutex;
use std::time::Instant;

use noise_control::app::{now_secs, NoiseControl, UnloadReason};
use noise_control::rpc_handler::handle_method;
use noise_control::services::donation_reminder::LoadReason;

use serde_json::{json, Value};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// Simple rate limiter: max requests per second.
struct RateLimiter {
    window_start: Instant,
    request_count: u32,
    max_per_second: u32,
}

impl RateLimiter {
    fn new(max_per_second: u32) -> Self {
        Self { window_start: Instant::now(), request_count: 0, max_per_second }
    }

    /// Returns true if the request is allowed, false if rate-limited.
    fn check(&mut self) -> bool {
        if self.window_start.elapsed().as_secs() >= 1 {
            self.window_start = Instant::now();
            self.request_count = 0;
        }
        self.request_count += 1;
        self.request_count <= self.max_per_second
    }
}

fn respond(out: &mut impl Write, response: &Value) -> io::Result<()> {
    writeln!(out, "{}", response)?;
    out.flush()
}

fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("noise_control=info")),
        )
        .with_writer(io::stderr)
        .init();

    // NOISE_CONTROL_DATA_DIR overrides the platform preferences location.
    let prefs_path = std::env::var("NOISE_CONTROL_DATA_DIR")
        .ok()
        .map(|dir| std::path::PathBuf::from(dir).join("prefs.json").to_string_lossy().into_owned());
    let locales_dir = std::env::var("NOISE_CONTROL_LOCALES_DIR").unwrap_or_else(|_| "locales".to_string());

    let mut core = NoiseControl::new(prefs_path, &locales_dir);
    core.startup(LoadReason::Startup, now_secs());
    let app = Mutex::new(core);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    respond(&mut out, &json!({"event": "ready", "version": env!("CARGO_PKG_VERSION")}))?;

    // Probers can report in bursts while pages load; cap well above that.
    let mut rate_limiter = RateLimiter::new(500);

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                warn!(error = %e, "stdin closed");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: Value = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                respond(&mut out, &json!({"id": null, "error": format!("parse error: {}", e)}))?;
                continue;
            }
        };

        let id = req.get("id").cloned().unwrap_or(Value::Null);

        if !rate_limiter.check() {
            respond(&mut out, &json!({"id": id, "error": "rate limit exceeded"}))?;
            continue;
        }

        let method = req.get("method").and_then(|v| v.as_str()).unwrap_or("");
        let params = req.get("params").cloned().unwrap_or(json!({}));
        debug!(method, "rpc request");

        let response = match handle_method(&app, method, &params) {
            Ok(val) => json!({"id": id, "result": val}),
            Err(err) => json!({"id": id, "error": err}),
        };
        respond(&mut out, &response)?;
    }

    if let Ok(mut core) = app.lock() {
        core.shutdown(UnloadReason::Shutdown);
    }
    info!("rpc server exiting");
    Ok(())
}
