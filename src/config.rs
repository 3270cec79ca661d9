//! Persisted channel defaults and engine configuration
//!
//! Every channel owns one fixed-size slot in the [`ConfigStore`]. The slot
//! starts with a one-byte sentinel followed by the packed record:
//!
//! | offset | width | field          |
//! |--------|-------|----------------|
//! | 0      | 1     | sentinel (0)   |
//! | 1      | 1     | default level  |
//! | 2      | 2     | ramp on, ms    |
//! | 4      | 2     | ramp off, ms   |
//! | 6      | 4     | delay, ms      |
//!
//! Multi-byte fields are little endian.

use embassy_time::Duration;

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::store::ConfigStore;

/// Bytes reserved per channel slot
pub const SLOT_SIZE: usize = 64;

/// Bytes actually used by a record, sentinel included
pub const RECORD_LEN: usize = 10;

/// Sentinel value of an initialized slot
const SENTINEL_INITIALIZED: u8 = 0;

const OFFSET_SENTINEL: usize = 0;
const OFFSET_DEFAULT_ON: usize = 1;
const OFFSET_RAMP_ON: usize = 2;
const OFFSET_RAMP_OFF: usize = 4;
const OFFSET_DELAY: usize = 6;

/// Error returned when a slot cannot be decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// The sentinel byte does not mark an initialized slot
    Uninitialized(u8),
}

/// Persisted defaults of one channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelConfig {
    /// Level used by a plain "on"
    pub default_on: u8,
    /// Ramp used when turning on, in milliseconds
    pub ramp_on_ms: u16,
    /// Ramp used when turning off, in milliseconds
    pub ramp_off_ms: u16,
    /// Minimum time a turn-on request must settle, in milliseconds
    pub delay_ms: u32,
}

impl ChannelConfig {
    /// Built-in defaults written on first boot
    pub const FACTORY: Self = Self {
        default_on: 255,
        ramp_on_ms: 3000,
        ramp_off_ms: 3000,
        delay_ms: 0,
    };

    pub const fn ramp_on(&self) -> Duration {
        Duration::from_millis(self.ramp_on_ms as u64)
    }

    pub const fn ramp_off(&self) -> Duration {
        Duration::from_millis(self.ramp_off_ms as u64)
    }

    pub const fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms as u64)
    }

    /// Encode the record, sentinel included
    pub fn encode(&self) -> [u8; RECORD_LEN] {
        let mut record = [0u8; RECORD_LEN];
        record[OFFSET_SENTINEL] = SENTINEL_INITIALIZED;
        for update in self.updates() {
            let (offset, bytes, len) = update.encode();
            record[offset..offset + len].copy_from_slice(&bytes[..len]);
        }
        record
    }

    /// Decode a record read back from a slot
    pub fn decode(record: &[u8; RECORD_LEN]) -> Result<Self, ConfigError> {
        let sentinel = record[OFFSET_SENTINEL];
        if sentinel != SENTINEL_INITIALIZED {
            return Err(ConfigError::Uninitialized(sentinel));
        }
        Ok(Self {
            default_on: record[OFFSET_DEFAULT_ON],
            ramp_on_ms: u16::from_le_bytes([record[OFFSET_RAMP_ON], record[OFFSET_RAMP_ON + 1]]),
            ramp_off_ms: u16::from_le_bytes([
                record[OFFSET_RAMP_OFF],
                record[OFFSET_RAMP_OFF + 1],
            ]),
            delay_ms: u32::from_le_bytes([
                record[OFFSET_DELAY],
                record[OFFSET_DELAY + 1],
                record[OFFSET_DELAY + 2],
                record[OFFSET_DELAY + 3],
            ]),
        })
    }

    /// Apply a single field update
    pub fn apply(&mut self, update: ConfigUpdate) {
        match update {
            ConfigUpdate::DefaultOn(value) => self.default_on = value,
            ConfigUpdate::RampOn(ms) => self.ramp_on_ms = ms,
            ConfigUpdate::RampOff(ms) => self.ramp_off_ms = ms,
            ConfigUpdate::Delay(ms) => self.delay_ms = ms,
        }
    }

    const fn updates(&self) -> [ConfigUpdate; 4] {
        [
            ConfigUpdate::DefaultOn(self.default_on),
            ConfigUpdate::RampOn(self.ramp_on_ms),
            ConfigUpdate::RampOff(self.ramp_off_ms),
            ConfigUpdate::Delay(self.delay_ms),
        ]
    }
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self::FACTORY
    }
}

/// Persisted field of a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigField {
    DefaultOn,
    RampOn,
    RampOff,
    Delay,
}

impl ConfigField {
    pub const ALL: [Self; 4] = [Self::DefaultOn, Self::RampOn, Self::RampOff, Self::Delay];

    /// Offset of the field inside its slot
    pub const fn offset(self) -> usize {
        match self {
            Self::DefaultOn => OFFSET_DEFAULT_ON,
            Self::RampOn => OFFSET_RAMP_ON,
            Self::RampOff => OFFSET_RAMP_OFF,
            Self::Delay => OFFSET_DELAY,
        }
    }
}

/// New value for one persisted field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigUpdate {
    DefaultOn(u8),
    RampOn(u16),
    RampOff(u16),
    Delay(u32),
}

impl ConfigUpdate {
    pub const fn field(self) -> ConfigField {
        match self {
            Self::DefaultOn(_) => ConfigField::DefaultOn,
            Self::RampOn(_) => ConfigField::RampOn,
            Self::RampOff(_) => ConfigField::RampOff,
            Self::Delay(_) => ConfigField::Delay,
        }
    }

    /// Field offset, little endian bytes and number of used bytes
    fn encode(self) -> (usize, [u8; 4], usize) {
        let mut bytes = [0u8; 4];
        let len = match self {
            Self::DefaultOn(value) => {
                bytes[0] = value;
                1
            }
            Self::RampOn(ms) | Self::RampOff(ms) => {
                bytes[..2].copy_from_slice(&ms.to_le_bytes());
                2
            }
            Self::Delay(ms) => {
                bytes.copy_from_slice(&ms.to_le_bytes());
                4
            }
        };
        (self.field().offset(), bytes, len)
    }
}

/// Location of one channel's record in the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigSlot {
    base: usize,
}

impl ConfigSlot {
    /// Slot of the channel at `index`
    pub const fn new(index: usize) -> Self {
        Self {
            base: index * SLOT_SIZE,
        }
    }

    pub const fn base(self) -> usize {
        self.base
    }

    /// Load the record, repopulating factory defaults on first boot
    pub fn load<S: ConfigStore>(self, store: &mut S) -> ChannelConfig {
        let mut record = [0u8; RECORD_LEN];
        store.read(self.base, &mut record);
        match ChannelConfig::decode(&record) {
            Ok(config) => config,
            Err(ConfigError::Uninitialized(_sentinel)) => {
                #[cfg(feature = "esp32-log")]
                println!(
                    "[ConfigSlot.load] slot {} uninitialized ({}), writing factory defaults",
                    self.base,
                    _sentinel
                );
                let config = ChannelConfig::FACTORY;
                store.write(self.base, &config.encode());
                config
            }
        }
    }

    /// Write a single field through to the store
    pub fn write<S: ConfigStore>(self, store: &mut S, update: ConfigUpdate) {
        let (offset, bytes, len) = update.encode();
        store.write(self.base + offset, &bytes[..len]);
    }
}

/// Configuration for the dimmer
#[derive(Debug, Clone, Copy)]
pub struct DimmerConfig {
    /// PWM full-scale value of the output driver
    pub output_range: u16,
    /// Idle time between two scheduler ticks
    pub idle_interval: Duration,
    /// Delay applied to a reboot request
    pub reboot_delay: Duration,
    /// How long the firmware-update mode stays enabled
    pub update_window: Duration,
}

impl Default for DimmerConfig {
    fn default() -> Self {
        Self {
            output_range: 1023,
            idle_interval: Duration::from_millis(50),
            reboot_delay: Duration::from_secs(3),
            update_window: Duration::from_secs(10 * 60),
        }
    }
}
