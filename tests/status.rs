mod common;

mod tests {
    use embassy_time::Duration;
    use heapless::String;
    use myrtio_light_dimmer::{
        ChannelId, ChannelRegistry, DimmerConfig, ModeAction, Request, RequestMailbox, Rgb,
        Scheduler, StatusReport,
    };

    use super::common::{FakeSensor, FakeSystem, RecordingOutput, Store, at, registry};

    fn mixed_registry() -> ChannelRegistry<Store> {
        let mut registry = registry();
        let levels = [
            (ChannelId::Bulb, 1),
            (ChannelId::Red, 255),
            (ChannelId::Green, 128),
            (ChannelId::Blue, 0),
            (ChannelId::White, 10),
        ];
        let zero = Some(Duration::from_millis(0));
        for (id, level) in levels {
            registry.set_dimming(id, level, zero, at(0));
        }
        registry.advance_all(at(0), &mut RecordingOutput::default());
        registry
    }

    #[test]
    fn test_group_colors() {
        let report = StatusReport::collect(&mixed_registry());
        assert_eq!(report.rgb.as_str(), "#ff8000");
        assert_eq!(report.rgbw.as_str(), "#ff80000a");
        assert_eq!(report.lrgbw.as_str(), "#01ff80000a");
    }

    #[test]
    fn test_rgb_snapshot() {
        let report = StatusReport::collect(&mixed_registry());
        assert_eq!(report.color, Rgb { r: 255, g: 128, b: 0 });
    }

    #[test]
    fn test_write_json_into_fixed_buffer() {
        let report = StatusReport::collect(&mixed_registry());
        let mut out: String<640> = String::new();
        assert!(report.write_json(&mut out).is_ok());
        assert_eq!(out.as_str(), report.to_string());

        // Too small a buffer reports an error instead of truncating silently
        let mut short: String<16> = String::new();
        assert!(report.write_json(&mut short).is_err());
    }

    #[test]
    fn test_channel_status() {
        let report = StatusReport::collect(&mixed_registry());
        let green = &report.channels[ChannelId::Green.index()];
        assert_eq!(green.name, "green");
        assert_eq!(green.value, 128);
        assert_eq!(green.target, 128);
        assert_eq!(green.progress, 100);
        assert_eq!(green.config.default_on, 255);
    }

    #[test]
    fn test_json_rendering() {
        let json = StatusReport::collect(&mixed_registry()).to_string();
        assert!(json.starts_with("{\"lights\":{\"bulb\":{\"value\":1,\"default\":255,"));
        assert!(json.contains(
            "\"red\":{\"value\":255,\"default\":255,\"rampOn\":3000,\"rampOff\":3000,\"delay\":0}"
        ));
        assert!(json.contains("\"rgb\":{\"value\":\"#ff8000\"}"));
        assert!(json.contains("\"Lrgbw\":{\"value\":\"#01ff80000a\"}}"));
        assert!(json.ends_with("\"ota\":\"false\",\"otaTimer\":0,\"reboot\":\"false\",\"rebootTimer\":0}"));
    }

    #[test]
    fn test_timers_in_report() {
        let mailbox = RequestMailbox::<4>::new();
        let mut scheduler = Scheduler::new(
            registry(),
            mailbox.inbox(),
            RecordingOutput::default(),
            FakeSensor::default(),
            FakeSystem::default(),
            DimmerConfig::default(),
        );

        scheduler.step(at(0), Some(&Request::Reboot));
        scheduler.step(at(0), Some(&Request::UpdateMode(ModeAction::On)));

        let report = scheduler.status(at(1_000));
        assert!(report.reboot);
        assert_eq!(report.reboot_secs, 2);
        assert!(report.update_mode);
        assert_eq!(report.update_mode_secs, 599);

        let json = report.to_string();
        assert!(json.ends_with("\"ota\":\"true\",\"otaTimer\":599,\"reboot\":\"true\",\"rebootTimer\":2}"));
    }
}
