//! Environment, device, and permission diagnostics.
//!
//! Collected on startup failures and on demand via the `diagnose`
//! subcommand, so the supervisor journal and the setup tool both get an
//! actionable picture without guesswork.

use std::fmt::Write as _;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use wheel_bridge_input::locate::{self, DeviceRole, MatchRules};

const UINPUT_NODE: &str = "/dev/uinput";
const INPUT_GROUP: &str = "input";

/// Accessibility of a device node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeAccess {
    Missing,
    Denied,
    Accessible,
}

/// One enumerated input device. `name` is `None` when the node could not
/// be opened.
#[derive(Debug, Clone)]
pub struct DeviceStatus {
    pub path: PathBuf,
    pub name: Option<String>,
}

/// Snapshot of everything the troubleshooting output reports.
#[derive(Debug, Clone)]
pub struct Diagnostics {
    pub uinput: NodeAccess,
    pub devices: Vec<DeviceStatus>,
    /// `None` when membership could not be determined.
    pub input_group_member: Option<bool>,
    pub matched_mouse: Option<String>,
    pub matched_touch: Option<String>,
}

/// Gather the current environment state.
#[must_use]
pub fn collect(rules: &MatchRules<'_>) -> Diagnostics {
    let mut devices = Vec::new();
    let mut matched_mouse = None;
    let mut matched_touch = None;

    if let Ok(nodes) = locate::event_nodes() {
        for path in nodes {
            let name = locate::probe(&path);
            if let Some(name) = &name {
                match locate::classify(name, rules) {
                    Some(DeviceRole::Mouse) if matched_mouse.is_none() => {
                        matched_mouse = Some(name.clone());
                    }
                    Some(DeviceRole::Touch) if matched_touch.is_none() => {
                        matched_touch = Some(name.clone());
                    }
                    _ => {}
                }
            }
            devices.push(DeviceStatus { path, name });
        }
    }

    Diagnostics {
        uinput: probe_node(Path::new(UINPUT_NODE)),
        devices,
        input_group_member: in_input_group(),
        matched_mouse,
        matched_touch,
    }
}

impl Diagnostics {
    /// Render the report as plain text, one finding per line, with the
    /// remediation attached to each failing check.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();

        match self.uinput {
            NodeAccess::Accessible => push_line(&mut out, "/dev/uinput: ok"),
            NodeAccess::Missing => push_line(
                &mut out,
                "/dev/uinput: missing — load the uinput kernel module (modprobe uinput)",
            ),
            NodeAccess::Denied => push_line(
                &mut out,
                "/dev/uinput: permission denied — a udev rule must grant write access",
            ),
        }

        match self.input_group_member {
            Some(true) => push_line(&mut out, "input group: member"),
            Some(false) => push_line(
                &mut out,
                "input group: not a member — add the user to the `input` group and re-login",
            ),
            None => push_line(&mut out, "input group: could not determine membership"),
        }

        match &self.matched_mouse {
            Some(name) => {
                let _ = writeln!(out, "pointing-button device: {name}");
            }
            None => push_line(&mut out, "pointing-button device: NOT FOUND"),
        }
        match &self.matched_touch {
            Some(name) => {
                let _ = writeln!(out, "touch-surface device: {name}");
            }
            None => push_line(&mut out, "touch-surface device: NOT FOUND"),
        }

        let unreadable = self.devices.iter().filter(|d| d.name.is_none()).count();
        let _ = writeln!(
            out,
            "input devices: {} enumerated, {} unreadable",
            self.devices.len(),
            unreadable
        );
        for device in &self.devices {
            match &device.name {
                Some(name) => {
                    let _ = writeln!(out, "  {}  {name}", device.path.display());
                }
                None => {
                    let _ = writeln!(out, "  {}  (unreadable)", device.path.display());
                }
            }
        }
        out
    }
}

fn push_line(out: &mut String, line: &str) {
    out.push_str(line);
    out.push('\n');
}

fn probe_node(path: &Path) -> NodeAccess {
    if !path.exists() {
        return NodeAccess::Missing;
    }
    match fs::OpenOptions::new().write(true).open(path) {
        Ok(_) => NodeAccess::Accessible,
        Err(e) if e.kind() == ErrorKind::PermissionDenied => NodeAccess::Denied,
        Err(_) => NodeAccess::Denied,
    }
}

/// Whether the process belongs to the privileged input-access group.
///
/// Resolved from `/proc/self/status` and `/etc/group`; `None` when either
/// source is unavailable.
fn in_input_group() -> Option<bool> {
    let status = fs::read_to_string("/proc/self/status").ok()?;
    let groups: Vec<String> = status
        .lines()
        .find(|line| line.starts_with("Groups:"))?
        .trim_start_matches("Groups:")
        .split_whitespace()
        .map(str::to_string)
        .collect();

    let db = fs::read_to_string("/etc/group").ok()?;
    let input_gid = db.lines().find_map(|line| {
        let mut fields = line.split(':');
        if fields.next()? != INPUT_GROUP {
            return None;
        }
        // Skip the password field; the third field is the gid.
        fields.nth(1).map(str::to_string)
    })?;

    Some(groups.iter().any(|gid| *gid == input_gid))
}
