//! Locating the two halves of the bridged device pair.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use evdev::Device;
use tracing::{debug, warn};

use crate::error::InputError;

const DEV_INPUT: &str = "/dev/input";

/// Which half of the bridged pair a device plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceRole {
    /// The pointing-button half, source of middle-button edges.
    Mouse,
    /// The touch-surface half, source of contact and position samples.
    Touch,
}

impl std::fmt::Display for DeviceRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mouse => write!(f, "pointing-button"),
            Self::Touch => write!(f, "touch-surface"),
        }
    }
}

/// Name fragments that identify the bridged pair among all input devices.
#[derive(Debug, Clone, Copy)]
pub struct MatchRules<'a> {
    /// Every fragment here must appear in a device name for it to qualify.
    pub required: &'a [&'a str],
    /// Any of these marks the pointing-button half.
    pub mouse: &'a [&'a str],
    /// Any of these marks the touch-surface half.
    pub touch: &'a [&'a str],
}

/// Defaults matching the supported receiver hardware, which enumerates its
/// two halves as "... 2.4G ... Mouse" and "... 2.4G ... Touchpad".
pub const DEFAULT_RULES: MatchRules<'static> = MatchRules {
    required: &["2.4G"],
    mouse: &["Mouse"],
    touch: &["Touchpad", "Pad"],
};

/// Classify a device name under the matching rules. Case-insensitive.
///
/// The touch fragments are tested before the mouse fragments, so a name
/// containing fragments of both roles resolves the same way on every run.
#[must_use]
pub fn classify(name: &str, rules: &MatchRules<'_>) -> Option<DeviceRole> {
    let name = name.to_lowercase();
    if !rules
        .required
        .iter()
        .all(|frag| name.contains(&frag.to_lowercase()))
    {
        return None;
    }
    if rules
        .touch
        .iter()
        .any(|frag| name.contains(&frag.to_lowercase()))
    {
        return Some(DeviceRole::Touch);
    }
    if rules
        .mouse
        .iter()
        .any(|frag| name.contains(&frag.to_lowercase()))
    {
        return Some(DeviceRole::Mouse);
    }
    None
}

/// One opened half of the pair, not yet wrapped in an event stream.
pub struct LocatedDevice {
    pub path: PathBuf,
    pub name: String,
    pub device: Device,
}

/// Both halves of the bridged pair.
pub struct LocatedPair {
    pub mouse: LocatedDevice,
    pub touch: LocatedDevice,
}

/// Enumerate `/dev/input` and open the first device matching each role.
///
/// Unmatched and duplicate matches are closed as soon as they are ruled
/// out. Devices the process may not open are counted and skipped, so one
/// unreadable node never aborts enumeration.
pub fn locate(rules: &MatchRules<'_>) -> Result<LocatedPair, InputError> {
    let mut mouse: Option<LocatedDevice> = None;
    let mut touch: Option<LocatedDevice> = None;
    let mut names = Vec::new();
    let mut scanned = 0usize;
    let mut denied = 0usize;

    for path in event_nodes()? {
        scanned += 1;
        let device = match Device::open(&path) {
            Ok(d) => d,
            Err(e) if e.kind() == ErrorKind::PermissionDenied => {
                debug!(path = %path.display(), "permission denied");
                denied += 1;
                continue;
            }
            Err(e) => {
                debug!(path = %path.display(), error = %e, "failed to open, skipping");
                continue;
            }
        };
        let name = device.name().unwrap_or("unknown").to_string();
        names.push(name.clone());

        match classify(&name, rules) {
            Some(DeviceRole::Mouse) if mouse.is_none() => {
                debug!(device = %name, path = %path.display(), "matched pointing-button device");
                mouse = Some(LocatedDevice { path, name, device });
            }
            Some(DeviceRole::Touch) if touch.is_none() => {
                debug!(device = %name, path = %path.display(), "matched touch-surface device");
                touch = Some(LocatedDevice { path, name, device });
            }
            // Unmatched or a duplicate of an already-filled role: the
            // handle drops here, closing the descriptor immediately.
            _ => {}
        }
    }

    if denied > 0 {
        warn!(denied, "some input devices could not be opened");
    }

    match (mouse, touch) {
        (Some(mouse), Some(touch)) => Ok(LocatedPair { mouse, touch }),
        (mouse, _) => {
            let role = if mouse.is_none() {
                DeviceRole::Mouse
            } else {
                DeviceRole::Touch
            };
            Err(InputError::DeviceNotFound {
                role,
                names,
                scanned,
                denied,
            })
        }
    }
}

/// Open a node just long enough to read its name. `None` when unreadable.
#[must_use]
pub fn probe(path: &Path) -> Option<String> {
    Device::open(path)
        .ok()
        .map(|device| device.name().unwrap_or("unknown").to_string())
}

/// List `/dev/input/event*` nodes in numeric order.
///
/// `read_dir` order is arbitrary; sorting keeps enumeration deterministic
/// so first-match-wins classification is stable across runs.
pub fn event_nodes() -> Result<Vec<PathBuf>, InputError> {
    let entries = std::fs::read_dir(DEV_INPUT).map_err(|e| InputError::DeviceOpen {
        path: PathBuf::from(DEV_INPUT),
        source: e,
    })?;

    let mut nodes: Vec<(u32, PathBuf)> = entries
        .filter_map(Result::ok)
        .filter_map(|entry| {
            let path = entry.path();
            let index = path
                .file_name()?
                .to_str()?
                .strip_prefix("event")?
                .parse()
                .ok()?;
            Some((index, path))
        })
        .collect();
    nodes.sort_unstable_by_key(|(index, _)| *index);
    Ok(nodes.into_iter().map(|(_, path)| path).collect())
}
