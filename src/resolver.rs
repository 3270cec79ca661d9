//! Request resolution
//!
//! Turns parsed requests into channel dimming calls and persisted default
//! updates. Housekeeping requests (reboot, update window) are handed back
//! to the scheduler as [`ResolverEffects`].

use embassy_time::Instant;

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::command::{Command, CommandBatch, DefaultsBatch, DefaultsCommand, GroupLevel, Level};
use crate::command::{ModeAction, Request};
use crate::mailbox::RequestInbox;
use crate::registry::ChannelRegistry;
use crate::store::ConfigStore;

/// Side effects from resolving a request that the scheduler should apply
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolverEffects {
    /// Arm the reboot timer
    pub reboot: bool,
    /// Change the firmware-update window
    pub update_mode: Option<ModeAction>,
    /// Forget network credentials, then restart
    pub reset_network: bool,
}

impl ResolverEffects {
    /// Check if any effects need to be applied
    pub const fn has_effects(&self) -> bool {
        self.reboot || self.update_mode.is_some() || self.reset_network
    }
}

/// Resolves posted requests against the channel registry
pub struct CommandResolver<'a, const SIZE: usize> {
    inbox: RequestInbox<'a, SIZE>,
}

impl<'a, const SIZE: usize> CommandResolver<'a, SIZE> {
    /// Create a new resolver
    pub const fn new(inbox: RequestInbox<'a, SIZE>) -> Self {
        Self { inbox }
    }

    /// Take the oldest posted request, if any (non-blocking)
    pub fn next_request(&mut self) -> Option<Request> {
        self.inbox.take()
    }

    /// Resolve a single request completely
    pub fn apply<S: ConfigStore>(
        request: &Request,
        registry: &mut ChannelRegistry<S>,
        now: Instant,
    ) -> ResolverEffects {
        let mut effects = ResolverEffects::default();
        match request {
            Request::Light(batch) => Self::apply_light(batch, registry, now),
            Request::Defaults(batch) => Self::apply_defaults(batch, registry),
            Request::Reboot => effects.reboot = true,
            Request::UpdateMode(action) => effects.update_mode = Some(*action),
            Request::ResetNetwork => effects.reset_network = true,
        }
        effects
    }

    /// Apply every dimming command of the batch, in order
    pub fn apply_light<S: ConfigStore>(
        batch: &CommandBatch,
        registry: &mut ChannelRegistry<S>,
        now: Instant,
    ) {
        let ramp = batch.ramp();
        for command in batch.commands() {
            #[cfg(feature = "esp32-log")]
            println!("[CommandResolver.apply_light] {:?} ramp {:?}", command, ramp);
            match *command {
                Command::Channel { id, level } => match level {
                    Level::On => registry.set_power(id, true, ramp, now),
                    Level::Off => registry.set_power(id, false, ramp, now),
                    Level::Toggle => {
                        let on = !registry.channel(id).is_on();
                        registry.set_power(id, on, ramp, now);
                    }
                    Level::Value(value) => registry.set_dimming(id, value, ramp, now),
                },
                Command::Group { group, level } => match level {
                    GroupLevel::On => registry.set_group_power(group, true, ramp, now),
                    GroupLevel::Off => registry.set_group_power(group, false, ramp, now),
                    GroupLevel::Toggle => {
                        let on = !registry.group_is_on(group);
                        registry.set_group_power(group, on, ramp, now);
                    }
                    GroupLevel::Color(color) => {
                        for (i, id) in group.members().iter().enumerate() {
                            registry.set_dimming(*id, color.level(i), ramp, now);
                        }
                    }
                },
            }
        }
    }

    /// Apply every default change of the batch, in order
    pub fn apply_defaults<S: ConfigStore>(batch: &DefaultsBatch, registry: &mut ChannelRegistry<S>) {
        for command in batch.commands() {
            #[cfg(feature = "esp32-log")]
            println!("[CommandResolver.apply_defaults] {:?}", command);
            match *command {
                DefaultsCommand::Configure { id, update } => registry.configure(id, update),
                DefaultsCommand::CaptureCurrent => registry.capture_current_as_default(),
            }
        }
    }
}
