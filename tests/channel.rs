mod common;

mod tests {
    use embassy_time::Duration;
    use myrtio_light_dimmer::channel::{Channel, ChannelId, duty};
    use myrtio_light_dimmer::ConfigStore;

    use super::common::{OUTPUT_RANGE, OUTPUTS, RecordingOutput, Store, at};

    fn bulb(store: &mut Store) -> Channel {
        Channel::load(ChannelId::Bulb, OUTPUTS[0], store)
    }

    #[test]
    fn test_duty() {
        assert_eq!(duty(0, 1023), 0);
        assert_eq!(duty(128, 1023), 511);
        assert_eq!(duty(200, 1023), 799);
        assert_eq!(duty(255, 1023), 1019);
        assert_eq!(duty(255, 255), 254);
    }

    #[test]
    fn test_channel_names() {
        for id in ChannelId::ALL {
            assert_eq!(ChannelId::parse_from_str(id.as_str()), Some(id));
        }
        assert_eq!(ChannelId::parse_from_str("rgb"), None);
        assert_eq!(ChannelId::White.index(), 4);
    }

    #[test]
    fn test_instant_dimming_has_no_intermediate_values() {
        let mut store = Store::new();
        let mut output = RecordingOutput::default();
        let mut channel = bulb(&mut store);

        channel.set_dimming(200, Some(Duration::from_millis(0)), at(100));
        assert_eq!(channel.current_value(), 0);
        assert_eq!(channel.current_target(), 200);

        channel.advance(at(100), &mut output, OUTPUT_RANGE);
        assert_eq!(channel.current_value(), 200);
        assert_eq!(output.writes, vec![(OUTPUTS[0], 799)]);
        assert_eq!(channel.current_progress_percent(), 100);
    }

    #[test]
    fn test_timed_ramp() {
        let mut store = Store::new();
        let mut output = RecordingOutput::default();
        let mut channel = bulb(&mut store);

        channel.set_dimming(200, Some(Duration::from_millis(1000)), at(0));
        channel.advance(at(400), &mut output, OUTPUT_RANGE);
        assert_eq!(channel.current_value(), 80);
        assert_eq!(channel.current_progress_percent(), 40);

        channel.advance(at(999), &mut output, OUTPUT_RANGE);
        assert_eq!(channel.current_value(), 199);

        channel.advance(at(1000), &mut output, OUTPUT_RANGE);
        assert_eq!(channel.current_value(), 200);
        assert_eq!(channel.current_progress_percent(), 100);
        assert_eq!(output.last_duty(OUTPUTS[0]), Some(799));
    }

    #[test]
    fn test_default_ramps_follow_direction() {
        let mut store = Store::new();
        let mut output = RecordingOutput::default();
        let mut channel = bulb(&mut store);
        channel.set_default_ramp_on(&mut store, 1000);
        channel.set_default_ramp_off(&mut store, 2000);

        channel.set_power(true, None, at(0));
        assert_eq!(channel.current_target(), 255);
        assert_eq!(channel.ramp().duration(), Duration::from_millis(1000));
        channel.advance(at(1000), &mut output, OUTPUT_RANGE);
        assert_eq!(channel.current_value(), 255);

        channel.set_power(false, None, at(1000));
        assert_eq!(channel.current_target(), 0);
        assert_eq!(channel.ramp().duration(), Duration::from_millis(2000));
        channel.advance(at(2000), &mut output, OUTPUT_RANGE);
        // 255 - 255 * 1000 / 2000 = 255 - 127
        assert_eq!(channel.current_value(), 128);
    }

    #[test]
    fn test_power_on_uses_default_level() {
        let mut store = Store::new();
        let mut output = RecordingOutput::default();
        let mut channel = bulb(&mut store);
        channel.set_default_on_value(&mut store, 90);

        channel.set_power(true, Some(Duration::from_millis(0)), at(0));
        channel.advance(at(0), &mut output, OUTPUT_RANGE);
        assert_eq!(channel.current_value(), 90);
        assert!(channel.is_on());
    }

    #[test]
    fn test_reissue_mid_ramp_reanchors_at_current_value() {
        let mut store = Store::new();
        let mut output = RecordingOutput::default();
        let mut channel = bulb(&mut store);

        channel.set_dimming(200, Some(Duration::from_millis(1000)), at(0));
        channel.advance(at(500), &mut output, OUTPUT_RANGE);
        assert_eq!(channel.current_value(), 100);

        channel.set_dimming(250, Some(Duration::from_millis(1000)), at(500));
        assert_eq!(channel.ramp().original(), 100);
        assert_eq!(channel.current_value(), 100);

        channel.advance(at(1000), &mut output, OUTPUT_RANGE);
        assert_eq!(channel.current_value(), 175);
    }

    #[test]
    fn test_output_written_only_on_change() {
        let mut store = Store::new();
        let mut output = RecordingOutput::default();
        let mut channel = bulb(&mut store);

        channel.set_dimming(10, Some(Duration::from_millis(10_000)), at(0));
        channel.advance(at(1), &mut output, OUTPUT_RANGE);
        assert!(output.writes.is_empty());

        channel.advance(at(1000), &mut output, OUTPUT_RANGE);
        assert_eq!(output.writes, vec![(OUTPUTS[0], duty(1, OUTPUT_RANGE))]);

        channel.advance(at(1001), &mut output, OUTPUT_RANGE);
        assert_eq!(output.writes.len(), 1);
    }

    #[test]
    fn test_delay_turns_early_request_off() {
        let mut store = Store::new();
        let mut output = RecordingOutput::default();
        let mut channel = bulb(&mut store);
        channel.set_default_delay(&mut store, 500);

        channel.set_power(true, None, at(0));
        assert_eq!(channel.current_target(), 255);

        // Advanced before the delay elapsed: the request falls back to off
        channel.advance(at(50), &mut output, OUTPUT_RANGE);
        assert_eq!(channel.current_target(), 0);
        assert_eq!(channel.current_value(), 0);
        assert!(output.writes.is_empty());

        channel.advance(at(5_000), &mut output, OUTPUT_RANGE);
        assert_eq!(channel.current_value(), 0);
    }

    #[test]
    fn test_delay_elapsed_lets_request_through() {
        let mut store = Store::new();
        let mut output = RecordingOutput::default();
        let mut channel = bulb(&mut store);
        channel.set_default_delay(&mut store, 500);

        channel.set_power(true, None, at(0));
        channel.advance(at(600), &mut output, OUTPUT_RANGE);
        assert_eq!(channel.current_target(), 255);
        // 255 * 600 / 3000
        assert_eq!(channel.current_value(), 51);
    }

    #[test]
    fn test_delay_does_not_hold_off_requests() {
        let mut store = Store::new();
        let mut output = RecordingOutput::default();
        let mut channel = bulb(&mut store);
        channel.set_dimming(200, Some(Duration::from_millis(0)), at(0));
        channel.advance(at(0), &mut output, OUTPUT_RANGE);
        channel.set_default_delay(&mut store, 500);

        channel.set_power(false, Some(Duration::from_millis(0)), at(10));
        channel.advance(at(20), &mut output, OUTPUT_RANGE);
        assert_eq!(channel.current_value(), 0);
    }

    #[test]
    fn test_setters_write_through() {
        let mut store = Store::new();
        let mut channel = Channel::load(ChannelId::Blue, OUTPUTS[3], &mut store);
        channel.set_default_delay(&mut store, 70_000);

        let mut raw = [0u8; 4];
        store.read(3 * 64 + 6, &mut raw);
        assert_eq!(u32::from_le_bytes(raw), 70_000);
        assert_eq!(channel.config().delay_ms, 70_000);
    }
}
