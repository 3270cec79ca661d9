//! Cooperative scheduler loop step.
//!
//! Everything the fixture does happens on one thread, one tick at a time.
//! A tick never waits on I/O; the caller sleeps for the returned interval
//! between ticks.

use embassy_time::{Duration, Instant};

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::command::{ModeAction, Request};
use crate::config::DimmerConfig;
use crate::registry::{ChannelRegistry, Group};
use crate::mailbox::RequestInbox;
use crate::resolver::{CommandResolver, ResolverEffects};
use crate::status::StatusReport;
use crate::store::ConfigStore;
use crate::timer::OneShotTimer;
use crate::{OutputDriver, PresenceSensor, SystemControl};

/// Result of a tick.
#[derive(Debug, Clone, Copy)]
pub struct TickResult {
    /// When the next tick is due.
    pub next_deadline: Instant,
    /// How long to idle before the next tick.
    pub sleep_duration: Duration,
}

/// Single-threaded scheduler owning the registry and the hardware seams.
///
/// Each [`tick`](Self::tick), in order:
/// 1. resolves at most one posted request
/// 2. restarts if the reboot deadline passed
/// 3. closes the firmware-update window if its deadline passed
/// 4. turns every channel on or off on a presence edge
/// 5. advances every channel's ramp
///
/// # Usage
///
/// ```ignore
/// let mailbox = RequestMailbox::<4>::new();
/// let mut scheduler = Scheduler::new(registry, mailbox.inbox(), output, sensor, system, config);
/// scheduler.start(now());
///
/// loop {
///     let result = scheduler.tick(now());
///     sleep(result.sleep_duration);
/// }
/// ```
pub struct Scheduler<'a, S, O, P, X, const MAILBOX_SIZE: usize>
where
    S: ConfigStore,
    O: OutputDriver,
    P: PresenceSensor,
    X: SystemControl,
{
    registry: ChannelRegistry<S>,
    resolver: CommandResolver<'a, MAILBOX_SIZE>,
    output: O,
    sensor: P,
    system: X,
    config: DimmerConfig,
    reboot: OneShotTimer,
    update_window: OneShotTimer,
    update_mode: bool,
    presence: bool,
}

impl<'a, S, O, P, X, const MAILBOX_SIZE: usize> Scheduler<'a, S, O, P, X, MAILBOX_SIZE>
where
    S: ConfigStore,
    O: OutputDriver,
    P: PresenceSensor,
    X: SystemControl,
{
    /// Create a new scheduler.
    pub fn new(
        registry: ChannelRegistry<S>,
        inbox: RequestInbox<'a, MAILBOX_SIZE>,
        output: O,
        sensor: P,
        system: X,
        config: DimmerConfig,
    ) -> Self {
        Self {
            registry,
            resolver: CommandResolver::new(inbox),
            output,
            sensor,
            system,
            config,
            reboot: OneShotTimer::new(),
            update_window: OneShotTimer::new(),
            update_mode: false,
            presence: false,
        }
    }

    /// Turn every channel on at its default level, as done on boot.
    pub fn start(&mut self, now: Instant) {
        self.registry.set_group_power(Group::All, true, None, now);
    }

    /// Run one loop iteration with the next posted request.
    pub fn tick(&mut self, now: Instant) -> TickResult {
        let request = self.resolver.next_request();
        self.step(now, request.as_ref())
    }

    /// Run one loop iteration with an explicit request.
    ///
    /// Same as [`tick`](Self::tick) but bypasses the mailbox.
    pub fn step(&mut self, now: Instant, request: Option<&Request>) -> TickResult {
        if let Some(request) = request {
            let effects = CommandResolver::<'a, MAILBOX_SIZE>::apply(request, &mut self.registry, now);
            self.apply_effects(effects, now);
        }

        if self.reboot.poll(now) {
            #[cfg(feature = "esp32-log")]
            println!("[Scheduler.step] rebooting");
            self.system.restart();
        }

        if self.update_window.poll(now) {
            self.close_update_window();
        }

        let presence = self.sensor.is_present();
        if presence != self.presence {
            #[cfg(feature = "esp32-log")]
            println!("[Scheduler.step] presence {} -> {}", self.presence, presence);
            self.presence = presence;
            self.registry.set_group_power(Group::All, presence, None, now);
        }

        self.registry.advance_all(now, &mut self.output);

        TickResult {
            next_deadline: now + self.config.idle_interval,
            sleep_duration: self.config.idle_interval,
        }
    }

    /// Apply side effects from request resolution
    fn apply_effects(&mut self, effects: ResolverEffects, now: Instant) {
        if effects.reset_network {
            self.system.reset_network();
            self.request_reboot(Duration::from_millis(0), now);
        } else if effects.reboot {
            self.request_reboot(self.config.reboot_delay, now);
        }

        if let Some(action) = effects.update_mode {
            self.set_update_mode(action, now);
        }
    }

    /// Restart once `delay` has passed; zero restarts on the next check.
    pub fn request_reboot(&mut self, delay: Duration, now: Instant) {
        #[cfg(feature = "esp32-log")]
        println!("[Scheduler.request_reboot] in {} ms", delay.as_millis());
        self.reboot.arm_after(now, delay);
    }

    /// Open, close or toggle the firmware-update window.
    ///
    /// Closing takes effect on the next deadline check.
    pub fn set_update_mode(&mut self, action: ModeAction, now: Instant) {
        let enable = match action {
            ModeAction::On => true,
            ModeAction::Off => false,
            ModeAction::Toggle => !self.update_mode,
        };

        if enable {
            if !self.update_mode {
                #[cfg(feature = "esp32-log")]
                println!("[Scheduler.set_update_mode] window opened");
                self.update_mode = true;
                self.system.set_update_mode(true);
                self.update_window.arm_after(now, self.config.update_window);
            }
        } else if self.update_mode {
            self.update_window.arm(now);
        }
    }

    fn close_update_window(&mut self) {
        #[cfg(feature = "esp32-log")]
        println!("[Scheduler.close_update_window] window closed");
        self.update_mode = false;
        self.system.set_update_mode(false);
    }

    pub const fn is_update_mode(&self) -> bool {
        self.update_mode
    }

    pub const fn is_reboot_pending(&self) -> bool {
        self.reboot.is_armed()
    }

    /// Snapshot of channels and timers.
    pub fn status(&self, now: Instant) -> StatusReport {
        let mut report = StatusReport::collect(&self.registry);
        report.update_mode = self.update_mode;
        report.update_mode_secs = self.update_window.remaining_secs(now);
        report.reboot = self.reboot.is_armed();
        report.reboot_secs = self.reboot.remaining_secs(now);
        report
    }

    pub const fn registry(&self) -> &ChannelRegistry<S> {
        &self.registry
    }

    pub const fn output(&self) -> &O {
        &self.output
    }

    pub fn sensor_mut(&mut self) -> &mut P {
        &mut self.sensor
    }

    pub const fn system(&self) -> &X {
        &self.system
    }

    pub const fn config(&self) -> &DimmerConfig {
        &self.config
    }
}
