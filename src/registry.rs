//! Fixed set of fixture channels and the groups addressing them

use embassy_time::{Duration, Instant};
use heapless::String;

use crate::OutputDriver;
use crate::channel::{Channel, ChannelId, OutputId};
use crate::color::{Rgb, push_hex};
use crate::config::{ConfigUpdate, SLOT_SIZE};
use crate::store::ConfigStore;

/// Number of channels in the fixture
pub const CHANNEL_COUNT: usize = 5;

/// Longest group color string, `#` plus two digits per channel
pub const GROUP_COLOR_LEN: usize = 1 + 2 * CHANNEL_COUNT;

const GROUP_NAME_RGB: &str = "rgb";
const GROUP_NAME_RGBW: &str = "rgbw";
const GROUP_NAME_ALL: &str = "all";

const MEMBERS_RGB: [ChannelId; 3] = [ChannelId::Red, ChannelId::Green, ChannelId::Blue];
const MEMBERS_RGBW: [ChannelId; 4] = [
    ChannelId::Red,
    ChannelId::Green,
    ChannelId::Blue,
    ChannelId::White,
];

/// Named subsets of the registry
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Group {
    /// Red, green and blue
    Rgb,
    /// The whole color array
    Rgbw,
    /// Bulb and color array
    All,
}

impl Group {
    /// Groups in the order their commands are applied
    pub const ALL: [Self; 3] = [Self::All, Self::Rgbw, Self::Rgb];

    pub const fn members(self) -> &'static [ChannelId] {
        match self {
            Self::Rgb => &MEMBERS_RGB,
            Self::Rgbw => &MEMBERS_RGBW,
            Self::All => &ChannelId::ALL,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Rgb => GROUP_NAME_RGB,
            Self::Rgbw => GROUP_NAME_RGBW,
            Self::All => GROUP_NAME_ALL,
        }
    }

    pub fn parse_from_str(s: &str) -> Option<Self> {
        match s {
            GROUP_NAME_RGB => Some(Self::Rgb),
            GROUP_NAME_RGBW => Some(Self::Rgbw),
            GROUP_NAME_ALL => Some(Self::All),
            _ => None,
        }
    }
}

/// Error returned when a registry cannot be built
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryError {
    /// The store cannot hold one slot per channel
    StoreTooSmall { required: usize, available: usize },
}

/// The fixture's channels together with their configuration store
pub struct ChannelRegistry<S: ConfigStore> {
    channels: [Channel; CHANNEL_COUNT],
    store: S,
    output_range: u16,
}

impl<S: ConfigStore> ChannelRegistry<S> {
    /// Load every channel from `store`
    ///
    /// `outputs` maps channels to physical outputs in registry order.
    pub fn load(
        mut store: S,
        outputs: [OutputId; CHANNEL_COUNT],
        output_range: u16,
    ) -> Result<Self, RegistryError> {
        let required = CHANNEL_COUNT * SLOT_SIZE;
        let available = store.capacity();
        if available < required {
            return Err(RegistryError::StoreTooSmall {
                required,
                available,
            });
        }

        let channels =
            core::array::from_fn(|i| Channel::load(ChannelId::ALL[i], outputs[i], &mut store));

        Ok(Self {
            channels,
            store,
            output_range,
        })
    }

    pub fn channels(&self) -> &[Channel; CHANNEL_COUNT] {
        &self.channels
    }

    pub fn channel(&self, id: ChannelId) -> &Channel {
        &self.channels[id.index()]
    }

    pub fn channel_mut(&mut self, id: ChannelId) -> &mut Channel {
        &mut self.channels[id.index()]
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Give the store back, e.g. to load it again after a restart
    pub fn into_store(self) -> S {
        self.store
    }

    pub const fn output_range(&self) -> u16 {
        self.output_range
    }

    /// Channels of `group`, in registry order
    pub fn group(&self, group: Group) -> impl Iterator<Item = &Channel> {
        group.members().iter().map(|id| self.channel(*id))
    }

    /// Check if any member of `group` currently emits light
    pub fn group_is_on(&self, group: Group) -> bool {
        self.group(group).any(Channel::is_on)
    }

    pub fn set_dimming(&mut self, id: ChannelId, target: u8, ramp: Option<Duration>, now: Instant) {
        self.channel_mut(id).set_dimming(target, ramp, now);
    }

    pub fn set_power(&mut self, id: ChannelId, on: bool, ramp: Option<Duration>, now: Instant) {
        self.channel_mut(id).set_power(on, ramp, now);
    }

    /// Turn every member of `group` on or off
    pub fn set_group_power(&mut self, group: Group, on: bool, ramp: Option<Duration>, now: Instant) {
        for id in group.members() {
            self.set_power(*id, on, ramp, now);
        }
    }

    /// Update one persisted default of a channel
    pub fn configure(&mut self, id: ChannelId, update: ConfigUpdate) {
        self.channels[id.index()].configure(&mut self.store, update);
    }

    /// Persist every channel's current level as its default level
    pub fn capture_current_as_default(&mut self) {
        for channel in &mut self.channels {
            let value = channel.current_value();
            channel.set_default_on_value(&mut self.store, value);
        }
    }

    /// Advance every channel's ramp, in registry order
    pub fn advance_all<O: OutputDriver>(&mut self, now: Instant, driver: &mut O) {
        for channel in &mut self.channels {
            channel.advance(now, driver, self.output_range);
        }
    }

    /// Current levels of `group` as a `#..` hex string
    pub fn group_color(&self, group: Group) -> String<GROUP_COLOR_LEN> {
        let mut color = String::new();
        let _ = color.push('#');
        for channel in self.group(group) {
            push_hex(&mut color, channel.current_value());
        }
        color
    }

    /// Current levels of the RGB group
    pub fn rgb(&self) -> Rgb {
        Rgb {
            r: self.channel(ChannelId::Red).current_value(),
            g: self.channel(ChannelId::Green).current_value(),
            b: self.channel(ChannelId::Blue).current_value(),
        }
    }
}
