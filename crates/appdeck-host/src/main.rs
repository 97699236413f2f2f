// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Appdeck host harness.
//
// Entry point. Initialises logging, builds the package service (an in-memory
// device from a fixture, or the platform service), and pumps JSON lines from
// stdin through the bridge. Replies and push-channel events go to stdout;
// logs go to stderr.

mod session;

use std::path::PathBuf;
use std::sync::Arc;

use appdeck_bridge::memory::{DeviceFixture, MemoryDevice};
use appdeck_bridge::platform_service;
use appdeck_core::BridgeConfig;
use appdeck_core::error::Result;
use clap::Parser;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;

use session::{Session, event_line};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Device fixture (JSON). Without it the platform service is used.
    #[arg(short, long)]
    fixture: Option<PathBuf>,

    /// Bridge configuration (JSON). Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => BridgeConfig::load(path)?,
        None => BridgeConfig::default(),
    };

    tracing::info!(
        method_channel = %config.method_channel,
        fixture = ?args.fixture,
        "Appdeck host starting"
    );

    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<Value>();
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();

    let writer = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(line) = out_rx.recv().await {
            let mut text = line.to_string();
            text.push('\n');
            if stdout.write_all(text.as_bytes()).await.is_err() {
                break;
            }
            let _ = stdout.flush().await;
        }
    });

    let event_out = out_tx.clone();
    let forwarder = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            if event_out.send(event_line(&event)).is_err() {
                break;
            }
        }
    });

    let mut session = match &args.fixture {
        Some(path) => {
            let device = Arc::new(MemoryDevice::from_fixture(DeviceFixture::load(path)?));
            Session::with_device(device, config, event_tx)
        }
        None => Session::new(platform_service(), None, config, event_tx),
    };

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if let Some(reply) = session.handle_line(&line) {
            if out_tx.send(reply).is_err() {
                break;
            }
        }
    }

    let released = session.close();
    tracing::info!(released, "Input closed, bridge torn down");
    drop(session);

    let _ = forwarder.await;
    drop(out_tx);
    let _ = writer.await;
    Ok(())
}
