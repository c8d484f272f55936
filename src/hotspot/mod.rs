//! Access-point lifecycle management
//!
//! Drives the system pieces that turn a character selection into a real
//! network: a virtual AP interface on top of the station interface, the
//! character MAC applied to it, and hostapd + dnsmasq spawned against
//! generated config files. Requires root and the usual Linux wireless
//! userland (`iw`, `ip`, `hostapd`, `dnsmasq`).
//!
//! The manager owns the spawned daemons and the temp config files; dropping
//! it (or calling [`HotspotManager::stop`]) kills the daemons and removes the
//! virtual interface.

use chrono::Local;
use regex::Regex;
use std::io::Write;
use std::os::unix::fs::MetadataExt;
use std::path::Path;
use std::process::Stdio;
use tempfile::NamedTempFile;
use thiserror::Error;
use tokio::process::{Child, Command};

use crate::catalog::Catalog;
use crate::config::Config;
use crate::error::Result;
use crate::exclusions::ExclusionStore;
use crate::mac;
use crate::selection::{self, CycleCursor};
use crate::ssid;

/// Binaries the hotspot cannot run without
const REQUIRED_TOOLS: &[&str] = &["iw", "ip", "hostapd", "dnsmasq"];

/// Errors from access-point orchestration
#[derive(Error, Debug)]
pub enum HotspotError {
    #[error("root privileges required (run with sudo)")]
    RootRequired,

    #[error("required tool not found in PATH: {0}")]
    MissingDependency(String),

    #[error("interface {0} not found")]
    InterfaceNotFound(String),

    #[error("command `{command}` failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("could not detect wireless channel: {0}")]
    ChannelDetection(String),

    #[error("{name} exited during startup: {detail}")]
    DaemonDied { name: String, detail: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

type HotspotResult<T> = std::result::Result<T, HotspotError>;

// ============================================================================
// Preflight Checks
// ============================================================================

/// Check that the process runs as root
pub fn check_root() -> HotspotResult<()> {
    let uid = std::fs::metadata("/proc/self")?.uid();
    if uid != 0 {
        return Err(HotspotError::RootRequired);
    }
    Ok(())
}

/// Check that every required external tool is reachable via PATH
///
/// Returns the list of missing tools so the CLI can report them all at once.
pub fn missing_dependencies() -> Vec<&'static str> {
    let path_var = std::env::var("PATH").unwrap_or_default();
    let dirs: Vec<&str> = path_var.split(':').collect();

    REQUIRED_TOOLS
        .iter()
        .filter(|tool| {
            !dirs
                .iter()
                .any(|dir| Path::new(dir).join(tool).is_file())
        })
        .copied()
        .collect()
}

/// Check dependencies, failing on the first missing tool
pub fn check_dependencies() -> HotspotResult<()> {
    match missing_dependencies().first() {
        Some(tool) => Err(HotspotError::MissingDependency(tool.to_string())),
        None => Ok(()),
    }
}

// ============================================================================
// Broadcast Plan
// ============================================================================

/// Everything the AP needs for one broadcast session
#[derive(Debug, Clone)]
pub struct BroadcastPlan {
    /// Network name to broadcast
    pub ssid: String,

    /// Character MAC for the AP interface; `None` keeps the default MAC
    pub mac: Option<String>,

    /// WPA2 passphrase; `None` broadcasts an open network
    pub password: Option<String>,

    /// Display name of the impersonated character, if any
    pub character_name: Option<String>,
}

/// Resolve today's broadcast plan from configuration and selection state
///
/// Combines character selection, SSID resolution, and the password policy.
/// A special-SSID selection overrides the configured SSID mode; a MAC
/// selection broadcasts the configured SSID with the character MAC.
pub fn plan_broadcast(
    config: &Config,
    catalog: &Catalog,
    exclusions: &ExclusionStore,
    cursor: &CycleCursor,
) -> BroadcastPlan {
    let today = Local::now().date_naive();
    let selected = selection::select_combined(&config.selection, catalog, exclusions, cursor, today);

    let ssid = match selected.ssid() {
        Some(special) => special.to_string(),
        None => ssid::resolve_ssid(&config.ssid, catalog),
    };

    let password = if config.security.daily_password {
        Some(selection::generate_daily_password(today))
    } else if config.security.password.is_empty() {
        None
    } else {
        Some(config.security.password.clone())
    };

    BroadcastPlan {
        ssid,
        mac: selected.character.map(mac::character_mac),
        password,
        character_name: selected.name().map(str::to_string),
    }
}

// ============================================================================
// Manager
// ============================================================================

/// Live state of a started hotspot, for status display and the web API
#[derive(Debug, Clone, serde::Serialize)]
pub struct HotspotState {
    pub ssid: String,
    pub mac: Option<String>,
    pub character_name: Option<String>,
    pub open_network: bool,
    pub channel: u32,
    pub interface: String,
    pub started_at: chrono::DateTime<Local>,
}

/// Owns the virtual interface and the hostapd/dnsmasq processes
pub struct HotspotManager {
    config: Config,
    hostapd: Option<Child>,
    dnsmasq: Option<Child>,
    // Temp config files must outlive the daemons reading them
    config_files: Vec<NamedTempFile>,
    state: Option<HotspotState>,
}

impl HotspotManager {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            hostapd: None,
            dnsmasq: None,
            config_files: Vec::new(),
            state: None,
        }
    }

    /// Current broadcast state, if running
    pub fn state(&self) -> Option<&HotspotState> {
        self.state.as_ref()
    }

    /// Bring up the access point for the given plan
    pub async fn start(&mut self, plan: BroadcastPlan) -> Result<HotspotState> {
        check_root()?;
        check_dependencies()?;
        self.check_interface().await?;

        let channel = match self.config.network.channel {
            Some(channel) => channel,
            None => self.detect_channel().await?,
        };

        self.create_ap_interface(plan.mac.as_deref()).await?;

        match self.spawn_daemons(&plan, channel).await {
            Ok(()) => {}
            Err(e) => {
                // Partial startup must not leave a stray interface behind
                self.stop().await;
                return Err(e.into());
            }
        }

        let state = HotspotState {
            ssid: plan.ssid.clone(),
            mac: plan.mac.clone(),
            character_name: plan.character_name.clone(),
            open_network: plan.password.is_none(),
            channel,
            interface: self.config.network.ap_interface.clone(),
            started_at: Local::now(),
        };
        tracing::info!(
            ssid = %state.ssid,
            mac = state.mac.as_deref().unwrap_or("default"),
            character = state.character_name.as_deref().unwrap_or("none"),
            channel,
            "Hotspot up"
        );
        self.state = Some(state.clone());
        Ok(state)
    }

    /// Tear everything down; safe to call when nothing is running
    pub async fn stop(&mut self) {
        if let Some(mut child) = self.hostapd.take() {
            let _ = child.kill().await;
        }
        if let Some(mut child) = self.dnsmasq.take() {
            let _ = child.kill().await;
        }
        self.config_files.clear();

        let ap = self.config.network.ap_interface.clone();
        if let Err(e) = self.run(&format!("iw dev {ap} del")).await {
            tracing::debug!(interface = %ap, error = %e, "AP interface removal skipped");
        }

        if self.state.take().is_some() {
            tracing::info!("Hotspot stopped");
        }
    }

    // ------------------------------------------------------------------
    // System plumbing
    // ------------------------------------------------------------------

    /// Run a shell command, capturing output
    async fn run(&self, command: &str) -> HotspotResult<String> {
        tracing::debug!(%command, "exec");
        let output = Command::new("sh")
            .arg("-c")
            .arg(command)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !output.status.success() {
            return Err(HotspotError::CommandFailed {
                command: command.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    async fn check_interface(&self) -> HotspotResult<()> {
        let iface = &self.config.network.interface;
        self.run(&format!("iw dev {iface} info"))
            .await
            .map_err(|_| HotspotError::InterfaceNotFound(iface.clone()))?;
        Ok(())
    }

    /// Read the station interface's current channel
    ///
    /// The AP must share the channel with the station link; most single-radio
    /// chipsets cannot operate two channels at once.
    async fn detect_channel(&self) -> HotspotResult<u32> {
        let iface = &self.config.network.interface;
        let info = self.run(&format!("iw dev {iface} info")).await?;

        let pattern = Regex::new(r"channel\s+(\d+)")
            .map_err(|e| HotspotError::ChannelDetection(e.to_string()))?;
        let channel = pattern
            .captures(&info)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<u32>().ok());

        match channel {
            Some(channel) if (1..=14).contains(&channel) => Ok(channel),
            Some(channel) => {
                tracing::warn!(channel, "Station on a 5 GHz channel, falling back to 6");
                Ok(6)
            }
            None => {
                tracing::warn!(interface = %iface, "No active channel (not associated?), using 6");
                Ok(6)
            }
        }
    }

    async fn create_ap_interface(&self, mac: Option<&str>) -> HotspotResult<()> {
        let iface = &self.config.network.interface;
        let ap = &self.config.network.ap_interface;
        let gateway = &self.config.network.gateway;

        // rfkill may not exist on minimal images; a soft-blocked radio will
        // surface as an interface error right after anyway
        let _ = self.run("rfkill unblock wifi").await;

        // A leftover interface from an unclean shutdown is replaced
        let _ = self.run(&format!("iw dev {ap} del")).await;

        self.run(&format!("iw dev {iface} interface add {ap} type __ap"))
            .await?;
        if let Some(mac) = mac {
            self.run(&format!("ip link set dev {ap} address {mac}")).await?;
        }
        self.run(&format!("ip addr add {gateway}/24 dev {ap}")).await?;
        self.run(&format!("ip link set dev {ap} up")).await?;
        Ok(())
    }

    fn write_config_file(&mut self, content: &str) -> HotspotResult<std::path::PathBuf> {
        let mut file = NamedTempFile::new()?;
        file.write_all(content.as_bytes())?;
        file.flush()?;
        let path = file.path().to_path_buf();
        self.config_files.push(file);
        Ok(path)
    }

    fn hostapd_conf(&self, plan: &BroadcastPlan, channel: u32) -> String {
        let mut conf = format!(
            "interface={}\n\
             driver=nl80211\n\
             ssid={}\n\
             hw_mode=g\n\
             channel={}\n\
             ieee80211n=1\n",
            self.config.network.ap_interface, plan.ssid, channel
        );
        if let Some(password) = &plan.password {
            conf.push_str(&format!(
                "wpa=2\n\
                 wpa_passphrase={password}\n\
                 wpa_key_mgmt=WPA-PSK\n\
                 rsn_pairwise=CCMP\n"
            ));
        }
        conf
    }

    fn dnsmasq_conf(&self) -> String {
        format!(
            "interface={}\n\
             bind-interfaces\n\
             dhcp-range={},12h\n\
             dhcp-option=option:router,{}\n\
             port=0\n",
            self.config.network.ap_interface,
            self.config.network.dhcp_range,
            self.config.network.gateway
        )
    }

    async fn spawn_daemons(&mut self, plan: &BroadcastPlan, channel: u32) -> HotspotResult<()> {
        let hostapd_path = self.write_config_file(&self.hostapd_conf(plan, channel))?;
        let dnsmasq_path = self.write_config_file(&self.dnsmasq_conf())?;

        let hostapd = Command::new("hostapd")
            .arg(&hostapd_path)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;
        self.hostapd = Some(hostapd);

        let dnsmasq = Command::new("dnsmasq")
            .arg("--no-daemon")
            .arg(format!("--conf-file={}", dnsmasq_path.display()))
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;
        self.dnsmasq = Some(dnsmasq);

        // Give both a moment to fail fast on bad config before declaring up
        tokio::time::sleep(std::time::Duration::from_millis(500)).await;
        self.check_daemon("hostapd").await?;
        self.check_daemon("dnsmasq").await?;
        Ok(())
    }

    async fn check_daemon(&mut self, name: &str) -> HotspotResult<()> {
        let child = match name {
            "hostapd" => self.hostapd.as_mut(),
            _ => self.dnsmasq.as_mut(),
        };
        let Some(child) = child else {
            return Ok(());
        };
        if let Some(status) = child.try_wait()? {
            return Err(HotspotError::DaemonDied {
                name: name.to_string(),
                detail: status.to_string(),
            });
        }
        Ok(())
    }
}
