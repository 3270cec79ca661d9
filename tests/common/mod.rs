#![allow(dead_code)]

use myrtio_light_dimmer::{
    ChannelRegistry, DimmerConfig, Instant, OutputDriver, OutputId, PresenceSensor, RamStore,
    SystemControl,
};

/// Five slots of 64 bytes
pub type Store = RamStore<320>;

pub const OUTPUTS: [OutputId; 5] = [OutputId(14), OutputId(2), OutputId(0), OutputId(4), OutputId(5)];

pub const OUTPUT_RANGE: u16 = 1023;

pub fn at(ms: u64) -> Instant {
    Instant::from_millis(ms)
}

pub fn registry() -> ChannelRegistry<Store> {
    registry_from(Store::new())
}

pub fn registry_from(store: Store) -> ChannelRegistry<Store> {
    match ChannelRegistry::load(store, OUTPUTS, DimmerConfig::default().output_range) {
        Ok(registry) => registry,
        Err(err) => panic!("registry failed to load: {err:?}"),
    }
}

#[derive(Debug, Default)]
pub struct RecordingOutput {
    pub writes: Vec<(OutputId, u16)>,
}

impl RecordingOutput {
    pub fn last_duty(&self, output: OutputId) -> Option<u16> {
        self.writes
            .iter()
            .rev()
            .find(|(id, _)| *id == output)
            .map(|(_, duty)| *duty)
    }
}

impl OutputDriver for RecordingOutput {
    fn write(&mut self, output: OutputId, duty: u16) {
        self.writes.push((output, duty));
    }
}

#[derive(Debug, Default)]
pub struct FakeSensor {
    pub present: bool,
}

impl PresenceSensor for FakeSensor {
    fn is_present(&mut self) -> bool {
        self.present
    }
}

#[derive(Debug, Default)]
pub struct FakeSystem {
    pub restarts: u32,
    pub update_mode: bool,
    pub update_mode_changes: u32,
    pub network_resets: u32,
}

impl SystemControl for FakeSystem {
    fn restart(&mut self) {
        self.restarts += 1;
    }

    fn set_update_mode(&mut self, enabled: bool) {
        self.update_mode = enabled;
        self.update_mode_changes += 1;
    }

    fn reset_network(&mut self) {
        self.network_resets += 1;
    }
}
