// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// One harness session: decodes JSON-line commands, runs them against the
// bridge and produces JSON-line replies.

use std::sync::Arc;

use appdeck_bridge::memory::{DevicePackage, MemoryDevice};
use appdeck_bridge::{LauncherBridge, MethodCall, PackageService};
use appdeck_core::error::{LauncherError, Result};
use appdeck_core::{BridgeConfig, PackageEvent, SubscriptionId};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

/// Device-side change injected through the harness.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Simulation {
    Install(DevicePackage),
    Uninstall {
        package: String,
        #[serde(default)]
        keep_data: bool,
    },
    Change(String),
    Available {
        packages: Vec<String>,
        #[serde(default)]
        replacing: bool,
    },
}

/// `{"listen": true}`
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ListenCommand {
    pub listen: bool,
}

/// `{"cancel": "<subscription id>"}`
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CancelCommand {
    pub cancel: String,
}

/// `{"simulate": {...}}`
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimulateCommand {
    pub simulate: Simulation,
}

/// One input line. Harness commands match only their exact shape; anything
/// else is decoded as a method call.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum HostCommand {
    Listen(ListenCommand),
    Cancel(CancelCommand),
    Simulate(SimulateCommand),
    Call(MethodCall),
}

pub struct Session {
    bridge: LauncherBridge,
    device: Option<Arc<MemoryDevice>>,
    events: UnboundedSender<PackageEvent>,
}

impl Session {
    /// `device` is `None` when running against the platform service.
    pub fn new(
        service: Arc<dyn PackageService>,
        device: Option<Arc<MemoryDevice>>,
        config: BridgeConfig,
        events: UnboundedSender<PackageEvent>,
    ) -> Self {
        Self {
            bridge: LauncherBridge::new(service, config),
            device,
            events,
        }
    }

    /// Session over an in-memory device.
    pub fn with_device(
        device: Arc<MemoryDevice>,
        config: BridgeConfig,
        events: UnboundedSender<PackageEvent>,
    ) -> Self {
        Self::new(device.clone(), Some(device), config, events)
    }

    /// Decode and run one input line. Blank lines produce no reply.
    pub fn handle_line(&mut self, line: &str) -> Option<Value> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        let reply = match serde_json::from_str::<HostCommand>(line) {
            Ok(command) => self.run(command),
            Err(e) => error_reply(None, &LauncherError::InvalidArgument(format!("bad command: {e}"))),
        };
        Some(reply)
    }

    pub fn run(&mut self, command: HostCommand) -> Value {
        debug!(?command, "Host command");
        match command {
            HostCommand::Call(call) => match self.bridge.handle(&call) {
                Ok(response) => json!({ "method": call.method, "result": response }),
                Err(e) => error_reply(Some(call.method.as_str()), &e),
            },
            HostCommand::Listen(ListenCommand { listen }) => {
                if !listen {
                    return json!({ "subscription": Value::Null });
                }
                match self.bridge.listen(Arc::new(self.events.clone())) {
                    Ok(id) => json!({ "subscription": id.to_string() }),
                    Err(e) => error_reply(None, &e),
                }
            }
            HostCommand::Cancel(CancelCommand { cancel }) => match cancel.parse::<SubscriptionId>() {
                Ok(id) => json!({ "cancelled": self.bridge.cancel(id) }),
                Err(e) => error_reply(
                    None,
                    &LauncherError::InvalidArgument(format!("bad subscription id {cancel}: {e}")),
                ),
            },
            HostCommand::Simulate(SimulateCommand { simulate }) => match self.simulate(simulate) {
                Ok(()) => json!({ "simulated": true }),
                Err(e) => error_reply(None, &e),
            },
        }
    }

    fn simulate(&self, simulation: Simulation) -> Result<()> {
        let device = self.device.as_ref().ok_or(LauncherError::PlatformUnavailable)?;
        match simulation {
            Simulation::Install(package) => device.install(package),
            Simulation::Uninstall { package, keep_data } => device.uninstall(&package, keep_data),
            Simulation::Change(package) => device.change(&package),
            Simulation::Available {
                packages,
                replacing,
            } => device.make_available(&packages, replacing),
        }
        Ok(())
    }

    /// Release every subscription; returns how many were active.
    pub fn close(&mut self) -> usize {
        self.bridge.teardown()
    }
}

fn error_reply(method: Option<&str>, e: &LauncherError) -> Value {
    let code = if e.is_invalid_argument() {
        "invalid-argument"
    } else {
        "bridge"
    };
    warn!(code, error = %e, "Command failed");
    json!({
        "method": method,
        "error": { "code": code, "message": e.to_string() },
    })
}

/// Push-channel record as printed by the harness.
pub fn event_line(event: &PackageEvent) -> Value {
    json!({ "event": event })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn session() -> (Session, mpsc::UnboundedReceiver<PackageEvent>) {
        let device = Arc::new(MemoryDevice::new());
        device.install(DevicePackage::new("com.tv", "TV").with_leanback());
        let (tx, rx) = mpsc::unbounded_channel();
        (Session::with_device(device, BridgeConfig::default(), tx), rx)
    }

    #[test]
    fn call_line_returns_result() {
        let (mut session, _rx) = session();
        let reply = session
            .handle_line(r#"{"method": "launchApp", "arguments": "com.tv"}"#)
            .expect("reply");
        assert_eq!(reply["result"], true);
    }

    #[test]
    fn unknown_method_reports_invalid_argument() {
        let (mut session, _rx) = session();
        let reply = session
            .handle_line(r#"{"method": "frobnicate"}"#)
            .expect("reply");
        assert_eq!(reply["error"]["code"], "invalid-argument");
        assert!(reply.get("result").is_none());
    }

    #[test]
    fn listen_then_simulate_emits_event() {
        let (mut session, mut rx) = session();
        let reply = session.handle_line(r#"{"listen": true}"#).expect("reply");
        let id = reply["subscription"].as_str().expect("id").to_string();

        session
            .handle_line(r#"{"simulate": {"uninstall": {"package": "com.tv"}}}"#)
            .expect("reply");
        let event = rx.try_recv().expect("event");
        assert_eq!(event_line(&event)["event"]["action"], "PACKAGE_REMOVED");

        let reply = session
            .handle_line(&format!(r#"{{"cancel": "{id}"}}"#))
            .expect("reply");
        assert_eq!(reply["cancelled"], true);
        assert_eq!(session.close(), 0);
    }

    #[test]
    fn blank_and_garbage_lines() {
        let (mut session, _rx) = session();
        assert!(session.handle_line("   ").is_none());
        let reply = session.handle_line("not json").expect("reply");
        assert_eq!(reply["error"]["code"], "invalid-argument");
    }

    #[test]
    fn method_call_with_stray_listen_key_is_a_call() {
        let (mut session, _rx) = session();
        let reply = session
            .handle_line(r#"{"method": "lauchApp", "arguments": "com.tv", "listen": true}"#)
            .expect("reply");
        assert!(reply.get("subscription").is_none());
        assert_eq!(reply["method"], "lauchApp");
        assert_eq!(reply["error"]["code"], "invalid-argument");
        assert_eq!(session.close(), 0);
    }

    #[test]
    fn listen_with_extra_fields_is_rejected() {
        let (mut session, _rx) = session();
        let reply = session
            .handle_line(r#"{"listen": true, "arguments": "com.tv"}"#)
            .expect("reply");
        assert_eq!(reply["error"]["code"], "invalid-argument");
        assert_eq!(session.close(), 0);
    }

    #[test]
    fn simulate_without_device_is_unavailable() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let device = Arc::new(MemoryDevice::new());
        let mut session = Session::new(device, None, BridgeConfig::default(), tx);
        let reply = session
            .handle_line(r#"{"simulate": {"change": "com.tv"}}"#)
            .expect("reply");
        assert_eq!(reply["error"]["code"], "bridge");
    }

    #[test]
    fn fixture_file_drives_enumeration() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("device.json");
        std::fs::write(
            &path,
            r#"{"packages": [
                {"package_name": "b.tv", "label": "B", "leanback_activity": "b.tv.Tv", "launcher_activity": "b.tv.Main"},
                {"package_name": "c.phone", "label": "C", "launcher_activity": "c.phone.Main"}
            ]}"#,
        )
        .expect("write fixture");

        let fixture = appdeck_bridge::memory::DeviceFixture::load(&path).expect("load");
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut session =
            Session::with_device(Arc::new(MemoryDevice::from_fixture(fixture)), BridgeConfig::default(), tx);

        let reply = session
            .handle_line(r#"{"method": "getApplications"}"#)
            .expect("reply");
        let apps = reply["result"].as_array().expect("list");
        assert_eq!(apps.len(), 2);
        assert_eq!(apps[0]["sideloaded"], false);
        assert_eq!(apps[1]["sideloaded"], true);
    }
}
