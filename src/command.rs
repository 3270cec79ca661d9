//! Typed requests parsed from key/value parameters
//!
//! The network boundary hands over flat `key=value` parameters. They are
//! parsed here, once, into closed enums; nothing downstream compares
//! strings. Parsing never fails: unknown keys are ignored and malformed
//! values degrade to safe defaults.

use embassy_time::Duration;
use heapless::Vec;

use crate::channel::ChannelId;
use crate::color::HexColor;
use crate::config::{ConfigField, ConfigUpdate};
use crate::ramp::MAX_RAMP;
use crate::registry::{CHANNEL_COUNT, Group};

const VALUE_ON: &str = "on";
const VALUE_OFF: &str = "off";
const VALUE_TOGGLE: &str = "toggle";
const VALUE_CURRENT: &str = "current";

const KEY_RAMP: &str = "ramp";
const KEY_ALL: &str = "all";
const KEY_ACTION: &str = "action";

/// Most commands a light batch can hold: one per channel and per group
pub const MAX_LIGHT_COMMANDS: usize = CHANNEL_COUNT + Group::ALL.len();

/// Most commands a defaults batch can hold
pub const MAX_DEFAULTS_COMMANDS: usize = CHANNEL_COUNT * ConfigField::ALL.len() + 1;

/// Source of request parameters
pub trait Params {
    /// Value of `key`, `None` if the key is absent
    fn arg(&self, key: &str) -> Option<&str>;

    /// Value of `key`, `None` if absent or empty
    fn non_empty(&self, key: &str) -> Option<&str> {
        self.arg(key).filter(|value| !value.is_empty())
    }
}

impl Params for [(&str, &str)] {
    fn arg(&self, key: &str) -> Option<&str> {
        self.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
    }
}

impl<const N: usize> Params for [(&str, &str); N] {
    fn arg(&self, key: &str) -> Option<&str> {
        self.as_slice().arg(key)
    }
}

/// Parse a leading decimal integer the lenient way
///
/// Leading whitespace and a sign are accepted, parsing stops at the first
/// non-digit, input without digits is zero and the result saturates.
pub fn parse_int(value: &str) -> i64 {
    let bytes = value.trim_start().as_bytes();
    let (negative, digits) = match bytes.first() {
        Some(b'-') => (true, &bytes[1..]),
        Some(b'+') => (false, &bytes[1..]),
        _ => (false, bytes),
    };
    let magnitude = digits
        .iter()
        .take_while(|ch| ch.is_ascii_digit())
        .fold(0i64, |acc, ch| {
            acc.saturating_mul(10).saturating_add(i64::from(ch - b'0'))
        });
    if negative { -magnitude } else { magnitude }
}

/// Parse a level, clamped to `0..=255`
pub fn parse_level(value: &str) -> u8 {
    u8::try_from(parse_int(value).max(0)).unwrap_or(u8::MAX)
}

fn parse_u16(value: &str) -> u16 {
    u16::try_from(parse_int(value).max(0)).unwrap_or(u16::MAX)
}

fn parse_u32(value: &str) -> u32 {
    u32::try_from(parse_int(value).max(0)).unwrap_or(u32::MAX)
}

/// Parse a ramp override, negative values mean "use the defaults"
///
/// Clamped to [`MAX_RAMP`] before conversion, the tick rate would overflow
/// on huge millisecond counts.
pub fn parse_ramp(value: &str) -> Option<Duration> {
    let ms = u64::try_from(parse_int(value)).ok()?;
    Some(Duration::from_millis(ms.min(MAX_RAMP.as_millis())))
}

/// Requested state of a single channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    On,
    Off,
    Toggle,
    Value(u8),
}

impl Level {
    pub fn parse(value: &str) -> Self {
        match value {
            VALUE_ON => Self::On,
            VALUE_OFF => Self::Off,
            VALUE_TOGGLE => Self::Toggle,
            _ => Self::Value(parse_level(value)),
        }
    }
}

/// Requested state of a group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupLevel {
    On,
    Off,
    /// Off if any member is on, on otherwise
    Toggle,
    /// One hex pair per member, in registry order
    Color(HexColor),
}

impl GroupLevel {
    /// Parse a group value, `None` for anything that is not a verb or color
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            VALUE_ON => Some(Self::On),
            VALUE_OFF => Some(Self::Off),
            VALUE_TOGGLE => Some(Self::Toggle),
            _ => HexColor::parse(value).map(Self::Color),
        }
    }
}

/// One dimming command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Channel { id: ChannelId, level: Level },
    Group { group: Group, level: GroupLevel },
}

/// Dimming commands applied together
///
/// Commands are stored in application order: single channels in registry
/// order first, then groups, so a group overrides its members.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandBatch {
    commands: Vec<Command, MAX_LIGHT_COMMANDS>,
    ramp: Option<Duration>,
}

impl CommandBatch {
    pub const fn new() -> Self {
        Self {
            commands: Vec::new(),
            ramp: None,
        }
    }

    /// Parse the light grammar
    pub fn parse<P: Params + ?Sized>(params: &P) -> Self {
        let mut batch = Self::new();
        batch.ramp = params.arg(KEY_RAMP).and_then(parse_ramp);

        for id in ChannelId::ALL {
            if let Some(value) = params.non_empty(id.as_str()) {
                batch.push(Command::Channel {
                    id,
                    level: Level::parse(value),
                });
            }
        }
        for group in Group::ALL {
            if let Some(level) = params.non_empty(group.as_str()).and_then(GroupLevel::parse) {
                batch.push(Command::Group { group, level });
            }
        }
        batch
    }

    /// Set the ramp override of every command in the batch
    #[must_use]
    pub fn with_ramp(mut self, ramp: Option<Duration>) -> Self {
        self.ramp = ramp;
        self
    }

    /// Append a command, dropping it if the batch is full
    pub fn push(&mut self, command: Command) {
        let _ = self.commands.push(command);
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub const fn ramp(&self) -> Option<Duration> {
        self.ramp
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// One change to the persisted defaults
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultsCommand {
    Configure { id: ChannelId, update: ConfigUpdate },
    /// Copy every channel's current level into its default level
    CaptureCurrent,
}

/// Changes to the persisted defaults applied together
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefaultsBatch {
    commands: Vec<DefaultsCommand, MAX_DEFAULTS_COMMANDS>,
}

impl DefaultsBatch {
    pub const fn new() -> Self {
        Self {
            commands: Vec::new(),
        }
    }

    /// Parse the defaults grammar
    pub fn parse<P: Params + ?Sized>(params: &P) -> Self {
        let mut batch = Self::new();

        for id in ChannelId::ALL {
            for field in ConfigField::ALL {
                let Some(value) = params.non_empty(id.config_key(field)) else {
                    continue;
                };
                let update = match field {
                    ConfigField::DefaultOn => ConfigUpdate::DefaultOn(parse_level(value)),
                    ConfigField::RampOn => ConfigUpdate::RampOn(parse_u16(value)),
                    ConfigField::RampOff => ConfigUpdate::RampOff(parse_u16(value)),
                    ConfigField::Delay => ConfigUpdate::Delay(parse_u32(value)),
                };
                batch.push(DefaultsCommand::Configure { id, update });
            }
        }
        if params.arg(KEY_ALL) == Some(VALUE_CURRENT) {
            batch.push(DefaultsCommand::CaptureCurrent);
        }
        batch
    }

    /// Append a command, dropping it if the batch is full
    pub fn push(&mut self, command: DefaultsCommand) {
        let _ = self.commands.push(command);
    }

    pub fn commands(&self) -> &[DefaultsCommand] {
        &self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Requested change of the firmware-update window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeAction {
    On,
    Off,
    Toggle,
}

impl ModeAction {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            VALUE_ON => Some(Self::On),
            VALUE_OFF => Some(Self::Off),
            VALUE_TOGGLE => Some(Self::Toggle),
            _ => None,
        }
    }
}

/// Request marshalled from the network boundary onto the scheduler
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Dimming commands
    Light(CommandBatch),
    /// Persisted default changes
    Defaults(DefaultsBatch),
    /// Restart after the configured reboot delay
    Reboot,
    /// Open or close the firmware-update window
    UpdateMode(ModeAction),
    /// Forget network credentials and restart
    ResetNetwork,
}

impl Request {
    pub fn light<P: Params + ?Sized>(params: &P) -> Self {
        Self::Light(CommandBatch::parse(params))
    }

    pub fn defaults<P: Params + ?Sized>(params: &P) -> Self {
        Self::Defaults(DefaultsBatch::parse(params))
    }

    /// Check if applying the request would change nothing
    pub fn is_noop(&self) -> bool {
        match self {
            Self::Light(batch) => batch.is_empty(),
            Self::Defaults(batch) => batch.is_empty(),
            Self::Reboot | Self::UpdateMode(_) | Self::ResetNetwork => false,
        }
    }

    /// Parse an update-mode request, `None` without a valid `action`
    pub fn update_mode<P: Params + ?Sized>(params: &P) -> Option<Self> {
        params
            .arg(KEY_ACTION)
            .and_then(ModeAction::parse)
            .map(Self::UpdateMode)
    }
}
