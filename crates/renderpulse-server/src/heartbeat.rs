//! Heartbeat log emitter.
//!
//! Forwards syslog-style records over UDP to a log collector:
//! `<14>Mmm dd HH:MM:SS <host> <service>[<pid>]: INFO <json payload>`.
//! The priority is fixed at user.info. This is a boundary collaborator of
//! the service; the metrics core never depends on it.

use chrono::{DateTime, Local};
use serde_json::json;
use tokio::net::UdpSocket;
use tokio::time::{interval, Duration, MissedTickBehavior};

use crate::config::HeartbeatSection;

/// Facility `user` (1) * 8 + severity `info` (6).
const PRI_USER_INFO: u8 = 14;

/// Static context composed into every record. Built once at task start so
/// formatting stays a pure function of (context, timestamp, iteration).
pub struct HeartbeatContext {
    pub hostname: String,
    pub service: String,
    pub env: String,
    pub pid: u32,
}

impl HeartbeatContext {
    pub fn new(service: &str, env: &str) -> Self {
        let hostname = hostname::get()
            .ok()
            .and_then(|h| h.into_string().ok())
            .unwrap_or_else(|| "unknown".to_string());
        Self {
            hostname,
            service: service.to_string(),
            env: env.to_string(),
            pid: std::process::id(),
        }
    }
}

/// Format one heartbeat record.
pub fn format_heartbeat(ctx: &HeartbeatContext, now: DateTime<Local>, iteration: u64) -> String {
    let payload = json!({
        "service": ctx.service,
        "env": ctx.env,
        "iteration": iteration,
        "event": "heartbeat",
    });
    format!(
        "<{}>{} {} {}[{}]: INFO {}",
        PRI_USER_INFO,
        now.format("%b %d %H:%M:%S"),
        ctx.hostname,
        ctx.service,
        ctx.pid,
        payload
    )
}

/// Emit loop. Send failures are logged and skipped; the next tick retries.
/// A bind/connect failure ends the task (the service itself keeps running).
pub async fn run(cfg: HeartbeatSection) {
    let socket = match UdpSocket::bind("0.0.0.0:0").await {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "heartbeat socket bind failed");
            return;
        }
    };
    if let Err(e) = socket.connect(&cfg.target).await {
        tracing::error!(error = %e, collector = %cfg.target, "heartbeat connect failed");
        return;
    }

    let ctx = HeartbeatContext::new(&cfg.service, &cfg.env);
    let mut tick = interval(Duration::from_millis(cfg.interval_ms));
    tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tracing::info!(collector = %cfg.target, interval_ms = cfg.interval_ms, "heartbeat emitter started");

    let mut iteration: u64 = 0;
    loop {
        tick.tick().await;
        let line = format_heartbeat(&ctx, Local::now(), iteration);
        if let Err(e) = socket.send(line.as_bytes()).await {
            tracing::warn!(error = %e, "heartbeat send failed");
        }
        iteration += 1;
    }
}
