#![no_std]

pub mod channel;
pub mod color;
pub mod command;
pub mod config;
pub mod mailbox;
pub mod ramp;
pub mod registry;
pub mod resolver;
pub mod scheduler;
pub mod status;
pub mod store;
pub mod timer;

pub use channel::{Channel, ChannelId, OutputId};
pub use command::{CommandBatch, DefaultsBatch, ModeAction, Params, Request};
pub use config::{ChannelConfig, ConfigUpdate, DimmerConfig};
pub use mailbox::{MailboxFull, RequestInbox, RequestMailbox, RequestPoster};
pub use registry::{CHANNEL_COUNT, ChannelRegistry, Group, RegistryError};
pub use resolver::CommandResolver;
pub use scheduler::{Scheduler, TickResult};
pub use status::StatusReport;
pub use store::{ConfigStore, RamStore};
pub use timer::OneShotTimer;

pub use color::Rgb;
pub use embassy_time::{Duration, Instant};

/// Abstract PWM driver trait
///
/// Implement this trait to support different hardware platforms.
/// Writes are fire-and-forget; a failed write is not reported back.
pub trait OutputDriver {
    /// Set the duty cycle of `output`, `0..=output_range`
    fn write(&mut self, output: OutputId, duty: u16);
}

/// Binary presence input, sampled once per tick
pub trait PresenceSensor {
    fn is_present(&mut self) -> bool;
}

/// Platform services the scheduler calls into
pub trait SystemControl {
    /// Hard restart. Does not return on real hardware.
    fn restart(&mut self);

    /// Enable or disable the firmware-update listener
    fn set_update_mode(&mut self, enabled: bool);

    /// Forget stored network credentials
    fn reset_network(&mut self);
}
