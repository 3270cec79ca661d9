//! Status snapshot served by the network boundary
//!
//! The report renders (via [`StatusReport::write_json`] or `Display`) as the
//! JSON object the fixture's web page polls:
//!
//! ```text
//! {"lights":{"bulb":{"value":0,"default":255,"rampOn":3000,"rampOff":3000,"delay":0},...,
//!  "rgb":{"value":"#000000"},"rgbw":{"value":"#00000000"},"Lrgbw":{"value":"#0000000000"}},
//!  "ota":"false","otaTimer":0,"reboot":"false","rebootTimer":0}
//! ```

use core::fmt;

use heapless::String;

use crate::channel::Channel;
use crate::color::Rgb;
use crate::config::ChannelConfig;
use crate::registry::{CHANNEL_COUNT, ChannelRegistry, GROUP_COLOR_LEN, Group};
use crate::store::ConfigStore;

/// Live and persisted state of one channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelStatus {
    pub name: &'static str,
    pub value: u8,
    pub target: u8,
    pub progress: u8,
    pub config: ChannelConfig,
}

impl From<&Channel> for ChannelStatus {
    fn from(channel: &Channel) -> Self {
        Self {
            name: channel.name(),
            value: channel.current_value(),
            target: channel.current_target(),
            progress: channel.current_progress_percent(),
            config: *channel.config(),
        }
    }
}

/// Snapshot of the whole fixture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub channels: [ChannelStatus; CHANNEL_COUNT],
    /// `#rrggbb`
    pub rgb: String<GROUP_COLOR_LEN>,
    /// `#rrggbbww`
    pub rgbw: String<GROUP_COLOR_LEN>,
    /// `#llrrggbbww`, bulb first
    pub lrgbw: String<GROUP_COLOR_LEN>,
    /// RGB group levels, e.g. for a local indicator LED
    pub color: Rgb,
    /// Firmware-update window open
    pub update_mode: bool,
    /// Seconds left in the firmware-update window
    pub update_mode_secs: u64,
    /// Reboot pending
    pub reboot: bool,
    /// Seconds left before the pending reboot
    pub reboot_secs: u64,
}

impl StatusReport {
    /// Collect channel state; timers start out idle
    pub fn collect<S: ConfigStore>(registry: &ChannelRegistry<S>) -> Self {
        let channels = registry.channels();
        Self {
            channels: core::array::from_fn(|i| ChannelStatus::from(&channels[i])),
            rgb: registry.group_color(Group::Rgb),
            rgbw: registry.group_color(Group::Rgbw),
            lrgbw: registry.group_color(Group::All),
            color: registry.rgb(),
            update_mode: false,
            update_mode_secs: 0,
            reboot: false,
            reboot_secs: 0,
        }
    }

    /// Render the JSON object into any text sink, e.g. a response buffer
    pub fn write_json<W: fmt::Write>(&self, f: &mut W) -> fmt::Result {
        f.write_str("{\"lights\":{")?;
        for channel in &self.channels {
            write!(
                f,
                "\"{}\":{{\"value\":{},\"default\":{},\"rampOn\":{},\"rampOff\":{},\"delay\":{}}},",
                channel.name,
                channel.value,
                channel.config.default_on,
                channel.config.ramp_on_ms,
                channel.config.ramp_off_ms,
                channel.config.delay_ms,
            )?;
        }
        write!(
            f,
            "\"rgb\":{{\"value\":\"{}\"}},\"rgbw\":{{\"value\":\"{}\"}},\"Lrgbw\":{{\"value\":\"{}\"}}}},",
            self.rgb, self.rgbw, self.lrgbw
        )?;
        write!(
            f,
            "\"ota\":\"{}\",\"otaTimer\":{},\"reboot\":\"{}\",\"rebootTimer\":{}}}",
            self.update_mode, self.update_mode_secs, self.reboot, self.reboot_secs
        )
    }
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_json(f)
    }
}
