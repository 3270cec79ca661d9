//! Dimmable output channel
//!
//! A [`Channel`] owns one PWM output: its persisted defaults and its live
//! ramp. Requests only record a new ramp; the output itself moves when the
//! scheduler calls [`Channel::advance`].

use embassy_time::{Duration, Instant};

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::OutputDriver;
use crate::config::{ChannelConfig, ConfigField, ConfigSlot, ConfigUpdate};
use crate::ramp::Ramp;
use crate::store::ConfigStore;

const CHANNEL_NAME_BULB: &str = "bulb";
const CHANNEL_NAME_RED: &str = "red";
const CHANNEL_NAME_GREEN: &str = "green";
const CHANNEL_NAME_BLUE: &str = "blue";
const CHANNEL_NAME_WHITE: &str = "white";

/// Physical output handle, as understood by the [`OutputDriver`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OutputId(pub u8);

/// Logical channels of the fixture, in registry order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ChannelId {
    /// Warm-white bulb, independent from the color array
    Bulb = 0,
    Red = 1,
    Green = 2,
    Blue = 3,
    White = 4,
}

impl ChannelId {
    pub const ALL: [Self; 5] = [Self::Bulb, Self::Red, Self::Green, Self::Blue, Self::White];

    /// Position in the registry
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bulb => CHANNEL_NAME_BULB,
            Self::Red => CHANNEL_NAME_RED,
            Self::Green => CHANNEL_NAME_GREEN,
            Self::Blue => CHANNEL_NAME_BLUE,
            Self::White => CHANNEL_NAME_WHITE,
        }
    }

    pub fn parse_from_str(s: &str) -> Option<Self> {
        match s {
            CHANNEL_NAME_BULB => Some(Self::Bulb),
            CHANNEL_NAME_RED => Some(Self::Red),
            CHANNEL_NAME_GREEN => Some(Self::Green),
            CHANNEL_NAME_BLUE => Some(Self::Blue),
            CHANNEL_NAME_WHITE => Some(Self::White),
            _ => None,
        }
    }

    /// Request key that sets `field` of this channel's defaults
    pub const fn config_key(self, field: ConfigField) -> &'static str {
        match (self, field) {
            (_, ConfigField::DefaultOn) => self.as_str(),
            (Self::Bulb, ConfigField::RampOn) => "bulb_rampOn",
            (Self::Bulb, ConfigField::RampOff) => "bulb_rampOff",
            (Self::Bulb, ConfigField::Delay) => "bulb_delay",
            (Self::Red, ConfigField::RampOn) => "red_rampOn",
            (Self::Red, ConfigField::RampOff) => "red_rampOff",
            (Self::Red, ConfigField::Delay) => "red_delay",
            (Self::Green, ConfigField::RampOn) => "green_rampOn",
            (Self::Green, ConfigField::RampOff) => "green_rampOff",
            (Self::Green, ConfigField::Delay) => "green_delay",
            (Self::Blue, ConfigField::RampOn) => "blue_rampOn",
            (Self::Blue, ConfigField::RampOff) => "blue_rampOff",
            (Self::Blue, ConfigField::Delay) => "blue_delay",
            (Self::White, ConfigField::RampOn) => "white_rampOn",
            (Self::White, ConfigField::RampOff) => "white_rampOff",
            (Self::White, ConfigField::Delay) => "white_delay",
        }
    }
}

/// PWM duty for `level` on an output with full scale `output_range`
#[allow(clippy::cast_possible_truncation)]
pub const fn duty(level: u8, output_range: u16) -> u16 {
    (output_range as u32 * level as u32 / 256) as u16
}

/// One dimmable output with persisted defaults and a live ramp
#[derive(Debug, Clone)]
pub struct Channel {
    id: ChannelId,
    output: OutputId,
    slot: ConfigSlot,
    config: ChannelConfig,
    ramp: Ramp,
    /// Time before which a turn-on request is not allowed to settle
    delay_deadline: Instant,
}

impl Channel {
    /// Create the channel from its persisted slot
    ///
    /// An uninitialized slot is repopulated with factory defaults.
    pub fn load<S: ConfigStore>(id: ChannelId, output: OutputId, store: &mut S) -> Self {
        let slot = ConfigSlot::new(id.index());
        Self {
            id,
            output,
            slot,
            config: slot.load(store),
            ramp: Ramp::new(0),
            delay_deadline: Instant::from_millis(0),
        }
    }

    pub const fn id(&self) -> ChannelId {
        self.id
    }

    pub const fn name(&self) -> &'static str {
        self.id.as_str()
    }

    pub const fn output(&self) -> OutputId {
        self.output
    }

    pub const fn config(&self) -> &ChannelConfig {
        &self.config
    }

    pub const fn ramp(&self) -> &Ramp {
        &self.ramp
    }

    pub const fn current_value(&self) -> u8 {
        self.ramp.current()
    }

    pub const fn current_target(&self) -> u8 {
        self.ramp.target()
    }

    pub const fn current_progress_percent(&self) -> u8 {
        self.ramp.progress_percent()
    }

    pub const fn is_on(&self) -> bool {
        self.ramp.current() > 0
    }

    /// Request a new target level
    ///
    /// Without an override the ramp is the persisted ramp-on duration for a
    /// non-zero target and the ramp-off duration otherwise.
    pub fn set_dimming(&mut self, target: u8, ramp: Option<Duration>, now: Instant) {
        let duration = ramp.unwrap_or(if target > 0 {
            self.config.ramp_on()
        } else {
            self.config.ramp_off()
        });
        self.ramp.set(target, duration, now);
        self.delay_deadline = now + self.config.delay();
    }

    /// Request the default level or off
    pub fn set_power(&mut self, on: bool, ramp: Option<Duration>, now: Instant) {
        let target = if on { self.config.default_on } else { 0 };
        self.set_dimming(target, ramp, now);
    }

    /// Move the output toward its target and emit the level if it changed
    pub fn advance<O: OutputDriver>(&mut self, now: Instant, driver: &mut O, output_range: u16) {
        if self.config.delay_ms > 0 && self.ramp.target() > 0 && self.delay_deadline > now {
            // Turn-on requested before the delay elapsed: go off instead
            #[cfg(feature = "esp32-log")]
            println!("[Channel.advance] {} held off by delay", self.name());
            self.set_power(false, None, now);
        }

        if self.ramp.tick(now) {
            driver.write(self.output, duty(self.ramp.current(), output_range));
        }
    }

    /// Update one persisted default, writing it through immediately
    pub fn configure<S: ConfigStore>(&mut self, store: &mut S, update: ConfigUpdate) {
        self.config.apply(update);
        self.slot.write(store, update);
    }

    pub fn set_default_on_value<S: ConfigStore>(&mut self, store: &mut S, value: u8) {
        self.configure(store, ConfigUpdate::DefaultOn(value));
    }

    pub fn set_default_ramp_on<S: ConfigStore>(&mut self, store: &mut S, ms: u16) {
        self.configure(store, ConfigUpdate::RampOn(ms));
    }

    pub fn set_default_ramp_off<S: ConfigStore>(&mut self, store: &mut S, ms: u16) {
        self.configure(store, ConfigUpdate::RampOff(ms));
    }

    pub fn set_default_delay<S: ConfigStore>(&mut self, store: &mut S, ms: u32) {
        self.configure(store, ConfigUpdate::Delay(ms));
    }
}
