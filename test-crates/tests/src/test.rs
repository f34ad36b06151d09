pub mod wasms;

#[cfg(test)]
#[ctor::ctor]
fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Collects everything a driver presents.
#[derive(Default)]
pub struct Recorder {
    pub outcomes: Vec<render_wasmer_host::prelude::RenderOutcome>,
    pub notices: Vec<String>,
    pub skins: Vec<String>,
}

impl render_wasmer_host::prelude::Presenter for Recorder {
    fn show_outcome(&mut self, outcome: &render_wasmer_host::prelude::RenderOutcome) {
        self.outcomes.push(outcome.clone());
    }

    fn offer_skin(&mut self, json: &str) {
        self.skins.push(json.to_string());
    }

    fn notify(&mut self, notice: &str) {
        self.notices.push(notice.to_string());
    }
}

#[cfg(test)]
pub mod protocol {
    use crate::Recorder;
    use render_wasmer_host::prelude::*;
    use render_wasmer_host::result::decode_result;
    use render_wasmer_host::string;
    use serde_json::Value;
    use test_common::arena::ArenaGuest;
    use test_common::*;

    fn driver() -> RenderDriver<ArenaGuest<WaveRenderer>, Recorder> {
        RenderDriver::new(wave_guest(), Recorder::default(), HostConfig::default()).unwrap()
    }

    fn last_release<R: render_wasmer_guest::Renderer>(guest: &ArenaGuest<R>) -> Len {
        guest.audit.releases.last().unwrap().1
    }

    #[test]
    fn clock_renders() {
        let mut driver = driver();
        driver.handle(Event::TextEdited(CLOCK.into())).unwrap();

        let outcome = driver.presenter().outcomes.last().unwrap().clone();
        assert!(outcome.success);
        assert_eq!("Successful build", outcome.message);
        let markup = outcome.markup.unwrap();
        assert!(markup.starts_with("<svg"));
        assert!(markup.contains(">clk<"));

        let guest = driver.guest();
        assert_eq!(RESULT_HEADER_LEN + markup.len() as Len, last_release(guest));
        assert!(guest.is_clean());
    }

    #[test]
    fn malformed_input_fails_with_one_byte_release() {
        let mut driver = driver();
        driver.handle(Event::TextEdited(MALFORMED.into())).unwrap();

        let outcome = driver.presenter().outcomes.last().unwrap();
        assert!(!outcome.success);
        assert_eq!(StatusCode::MalformedInput.message(), outcome.message);
        assert_eq!(None, outcome.markup);
        assert_eq!(RESULT_STATUS_LEN, last_release(driver.guest()));
        assert!(driver.guest().is_clean());
    }

    #[test]
    fn every_status_releases_the_right_size() {
        let cases = [
            (CLOCK, None),
            (MALFORMED, Some(StatusCode::MalformedInput)),
            (r#"{"signals":[]}"#, Some(StatusCode::InvalidValue)),
            (r#"{"signal":[{"wave":"p?"}]}"#, Some(StatusCode::AssemblyFailure)),
            (r#"{"signal":[]}"#, Some(StatusCode::RenderFailure)),
            ("", Some(StatusCode::MalformedInput)),
        ];
        let mut guest = wave_guest();
        let config = HostConfig::default();
        for (input, expected) in cases {
            let ptr = {
                let mut encoded = string::encode(&mut guest, input, &config).unwrap();
                let (ptr, len) = encoded.hand_over();
                encoded.guest().render(ptr, len).unwrap()
            };
            let outcome = decode_result(&mut guest, ptr, SCHEMA_V2.status_count).unwrap();
            match (outcome, expected) {
                (Ok(payload), None) => {
                    assert_eq!(RESULT_HEADER_LEN + payload.len() as Len, last_release(&guest))
                }
                (Err(status), Some(expected)) => {
                    assert_eq!(expected, status, "{}", input);
                    assert_eq!(RESULT_STATUS_LEN, last_release(&guest));
                }
                (outcome, expected) => panic!("{}: {:?} vs {:?}", input, outcome, expected),
            }
        }
        assert!(guest.is_clean());
    }

    #[test]
    fn invalid_utf8_input() {
        let mut guest = wave_guest();
        let ptr = guest.allocate(2).unwrap();
        guest.write_bytes(ptr, &[0xC3, 0x28]).unwrap();
        let result = guest.render(ptr, 2).unwrap();
        assert_eq!(
            Err(StatusCode::InvalidUtf8),
            decode_result(&mut guest, result, SCHEMA_V2.status_count).unwrap()
        );
        assert!(guest.is_clean());
    }

    #[test]
    fn older_schema_clamps_newer_statuses() {
        let mut guest = wave_guest_with_schema(&SCHEMA_V1);
        let registry = ParameterRegistry::connect(&mut guest, &HostConfig::default()).unwrap();
        assert_eq!(ProtocolVersion::V1, registry.schema().version);
        assert_eq!(SCHEMA_V1.len() as usize, registry.controls().count());

        let ptr = guest.allocate(1).unwrap();
        guest.write_bytes(ptr, &[0xFF]).unwrap();
        let result = guest.render(ptr, 1).unwrap();
        // InvalidUtf8 is beyond what a V1 module is known to report
        assert_eq!(
            Err(StatusCode::Unknown),
            decode_result(&mut guest, result, registry.schema().status_count).unwrap()
        );
        assert!(guest.is_clean());
    }

    #[test]
    fn input_buffers_are_consumed_exactly_once() {
        let mut driver = driver();
        for i in 0..100 {
            let text = if i % 3 == 0 { MALFORMED } else { CLOCK };
            driver.handle(Event::TextEdited(text.into())).unwrap();
        }
        driver
            .handle(Event::SkinImported(r#"{"cycle-width":30}"#.into()))
            .unwrap();
        let guest = driver.guest();
        assert!(guest.is_clean(), "{:?}", guest.audit.violations);
        // every render released its input with the written length, then its result
        assert_eq!(CLOCK.len() as Len, guest.audit.releases[2].1);
    }

    #[test]
    fn oversized_input_is_truncated() {
        let config = HostConfig {
            max_input_bytes: 10,
            ..HostConfig::default()
        };
        let mut guest = wave_guest();
        {
            let encoded = string::encode(&mut guest, CLOCK, &config).unwrap();
            assert!(encoded.truncated);
            assert_eq!(10, encoded.written);
        }

        let mut driver = RenderDriver::new(guest, Recorder::default(), config).unwrap();
        driver.handle(Event::TextEdited(CLOCK.into())).unwrap();
        let outcome = driver.presenter().outcomes.last().unwrap();
        assert_eq!(StatusCode::MalformedInput.message(), outcome.message);
        assert!(driver.guest().is_clean());
    }

    #[test]
    fn multibyte_text_is_never_split() {
        let config = HostConfig {
            max_input_bytes: 5,
            ..HostConfig::default()
        };
        let mut guest = wave_guest();
        let encoded = string::encode(&mut guest, "ab€€", &config).unwrap();
        assert_eq!(5, encoded.written);
        assert!(encoded.truncated);
    }

    #[test]
    fn integer_parameters_round_trip() {
        let mut guest = wave_guest();
        let mut registry = ParameterRegistry::connect(&mut guest, &HostConfig::default()).unwrap();
        for key in ["signal-height", "cycle-width", "register-bar-width"] {
            for n in [0_u32, 1, 7, 24, 800, 65_535, u32::MAX] {
                let display = DisplayValue::Number(n.to_string());
                registry.set(&mut guest, key, display.clone()).unwrap();
                let packed = registry.get(&mut guest, key).unwrap();
                assert_eq!(n, packed);
                let descriptor = registry.schema().resolve(key).unwrap().1;
                assert_eq!(display, descriptor.deserialize(packed));
            }
        }
    }

    #[test]
    fn color_parameters_round_trip() {
        let mut guest = wave_guest();
        let mut registry = ParameterRegistry::connect(&mut guest, &HostConfig::default()).unwrap();
        for hex in ["#000000", "#ffffff", "#336699", "#0a0b0c", "#fe0001"] {
            let display = DisplayValue::Color(hex.into());
            let packed = registry.set(&mut guest, "signal-path-color", display.clone()).unwrap();
            assert!(Color::is_enabled(packed));
            let read = registry.get(&mut guest, "signal-path-color").unwrap();
            let descriptor = registry.schema().resolve("signal-path-color").unwrap().1;
            assert_eq!(display, descriptor.deserialize(read));

            let optional = DisplayValue::OptionalColor {
                enabled: true,
                color: hex.into(),
            };
            registry.set(&mut guest, "background", optional.clone()).unwrap();
            let read = registry.get(&mut guest, "background").unwrap();
            let descriptor = registry.schema().resolve("background").unwrap().1;
            assert_eq!(optional, descriptor.deserialize(read));
        }
    }

    #[test]
    fn disabled_optional_color_shows_white() {
        let mut driver = driver();
        for change in [
            ("background", ControlChange::Text("#123456".into())),
            ("background-enabled", ControlChange::Toggle(true)),
            ("background-enabled", ControlChange::Toggle(false)),
        ] {
            driver
                .handle(Event::ParameterChanged {
                    key: change.0.into(),
                    change: change.1,
                })
                .unwrap();
        }
        assert_eq!(
            Some(&DisplayValue::OptionalColor {
                enabled: false,
                color: DISABLED_COLOR_DISPLAY.into(),
            }),
            driver.registry().display("background")
        );
        assert_eq!(0, driver.guest().module().get_parameter(3));
        // every control change re-renders
        assert_eq!(3, driver.presenter().outcomes.len());
    }

    #[test]
    fn export_then_import_changes_nothing() {
        let mut driver = driver();
        driver
            .handle(Event::ParameterChanged {
                key: "cycle-width".into(),
                change: ControlChange::Text("31".into()),
            })
            .unwrap();
        driver
            .handle(Event::ParameterChanged {
                key: "signal-undefined-background-color-enabled".into(),
                change: ControlChange::Toggle(true),
            })
            .unwrap();
        driver.handle(Event::ExportRequested).unwrap();
        let skin = driver.presenter().skins.last().unwrap().clone();

        let before: Vec<PackedValue> = (0..SCHEMA_V2.len())
            .map(|index| driver.guest().module().get_parameter(index))
            .collect();
        let controls_before = driver.registry().clone();
        driver.handle(Event::SkinImported(skin)).unwrap();
        let after: Vec<PackedValue> = (0..SCHEMA_V2.len())
            .map(|index| driver.guest().module().get_parameter(index))
            .collect();
        assert_eq!(before, after);
        assert_eq!(&controls_before, driver.registry());
        assert!(driver.presenter().notices.is_empty());
    }

    #[test]
    fn export_then_import_keeps_raw_writes() {
        let mut driver = driver();
        let path = SCHEMA_V2.resolve("signal-path-color").unwrap().0;
        let undefined = SCHEMA_V2.resolve("signal-undefined-background-color").unwrap().0;
        // a legacy enabled marker, and rgb bits left in a disabled slot
        driver.guest().modify_parameter(path, 0xFF12_3456).unwrap();
        driver.guest().modify_parameter(undefined, 0x0012_3456).unwrap();

        let before: Vec<PackedValue> = (0..SCHEMA_V2.len())
            .map(|index| driver.guest().get_parameter(index).unwrap())
            .collect();
        assert_eq!(0x0112_3456, before[path as usize]);
        assert_eq!(0, before[undefined as usize]);

        driver.handle(Event::ExportRequested).unwrap();
        let skin = driver.presenter().skins.last().unwrap().clone();
        driver.handle(Event::SkinImported(skin)).unwrap();
        let after: Vec<PackedValue> = (0..SCHEMA_V2.len())
            .map(|index| driver.guest().get_parameter(index).unwrap())
            .collect();
        assert_eq!(before, after);
        assert!(driver.presenter().notices.is_empty());
    }

    #[test]
    fn export_keeps_table_order() {
        let mut driver = driver();
        driver.handle(Event::ExportRequested).unwrap();
        let skin = driver.presenter().skins.last().unwrap();
        let document: serde_json::Map<String, Value> = serde_json::from_str(skin).unwrap();
        let keys: Vec<&str> = document.keys().map(String::as_str).collect();
        let expected: Vec<&str> = SCHEMA_V2.parameters().iter().map(|d| d.key).collect();
        assert_eq!(expected, keys);
        assert_eq!(Value::Null, document["background"]);
        assert_eq!(Value::from(24), document["signal-height"]);
    }

    #[test]
    fn partial_skin_only_touches_named_keys() {
        let mut driver = driver();
        let defaults = SCHEMA_V2.defaults();
        // one key in ten survives, each bumped away from its default
        let mut document = serde_json::Map::new();
        let mut touched = Vec::new();
        for (index, descriptor) in SCHEMA_V2.iter().filter(|(index, _)| index % 10 == 0) {
            let value = match descriptor.shape {
                ParameterShape::Simple => Value::from(descriptor.default + 1),
                _ => Value::from("#010203"),
            };
            document.insert(descriptor.key.to_string(), value);
            touched.push(index);
        }
        document.insert("no-such-key".into(), Value::from(5));
        driver
            .handle(Event::SkinImported(Value::Object(document).to_string()))
            .unwrap();

        assert!(driver.presenter().notices.is_empty());
        for (index, default) in defaults.into_iter().enumerate() {
            let value = driver.guest().module().get_parameter(index as u32);
            if touched.contains(&(index as u32)) {
                assert_ne!(default, value, "slot {}", index);
            } else {
                assert_eq!(default, value, "slot {}", index);
            }
        }
        assert!(driver.guest().is_clean());
    }

    #[test]
    fn bad_skin_values_are_skipped() {
        let mut driver = driver();
        driver
            .handle(Event::SkinImported(
                r#"{"signal-height":"tall","cycle-width":12}"#.into(),
            ))
            .unwrap();
        assert_eq!(
            vec![format!("Invalid skin file: {}", StatusCode::InvalidValue)],
            driver.presenter().notices
        );
        assert_eq!(Some(&DisplayValue::Number("12".into())), driver.registry().display("cycle-width"));
        assert_eq!(Some(&DisplayValue::Number("24".into())), driver.registry().display("signal-height"));

        driver.handle(Event::SkinImported("not json".into())).unwrap();
        assert_eq!(2, driver.presenter().notices.len());
    }

    #[test]
    fn reset_restores_defaults() {
        let mut driver = driver();
        for (key, value) in [("signal-height", "30"), ("edge-arrow-size", "3"), ("register-hint-indent", "9")] {
            driver
                .handle(Event::ParameterChanged {
                    key: key.into(),
                    change: ControlChange::Text(value.into()),
                })
                .unwrap();
        }
        driver.handle(Event::ResetClicked).unwrap();
        let values: Vec<PackedValue> = (0..SCHEMA_V2.len())
            .map(|index| driver.guest().module().get_parameter(index))
            .collect();
        assert_eq!(SCHEMA_V2.defaults(), values);
        assert_eq!(&ParameterRegistry::new(&SCHEMA_V2), driver.registry());
    }

    #[test]
    fn parameter_changes_rerender() {
        let mut driver = driver();
        driver.handle(Event::TextEdited(CLOCK.into())).unwrap();
        driver
            .handle(Event::ParameterChanged {
                key: "cycle-width".into(),
                change: ControlChange::Text("10".into()),
            })
            .unwrap();
        let markup = driver.presenter().outcomes.last().unwrap().markup.clone().unwrap();
        // three cycles of ten
        assert!(markup.contains(r#"width="30""#));
    }

    #[test]
    fn huge_parameters_fail_the_render() {
        let mut driver = driver();
        driver.handle(Event::TextEdited(CLOCK.into())).unwrap();
        driver
            .handle(Event::ParameterChanged {
                key: "cycle-width".into(),
                change: ControlChange::Text(u32::MAX.to_string()),
            })
            .unwrap();
        assert_eq!(
            &RenderOutcome::failed(StatusCode::RenderFailure),
            driver.presenter().outcomes.last().unwrap()
        );
        assert_eq!(RESULT_STATUS_LEN, last_release(driver.guest()));
        assert!(driver.guest().is_clean());
    }

    #[test]
    fn schema_fails_closed() {
        let guest = wave_guest().without_schema_export();
        assert!(matches!(
            RenderDriver::new(guest, Recorder::default(), HostConfig::default()),
            Err(HostError::MissingSchema)
        ));

        let guest = wave_guest_with_schema(&SCHEMA_V1).without_schema_export();
        let config = HostConfig {
            assume_schema: Some(1),
            ..HostConfig::default()
        };
        let mut driver = RenderDriver::new(guest, Recorder::default(), config).unwrap();
        assert_eq!(ProtocolVersion::V1, driver.registry().schema().version);
        assert!(driver.registry().display("register-bar-width").is_none());
        driver.handle(Event::TextEdited(CLOCK.into())).unwrap();
        assert!(driver.presenter().outcomes[0].success);
    }

    #[test]
    fn shared_driver_across_threads() {
        let shared = SharedDriver::new(driver());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let shared = shared.clone();
                std::thread::spawn(move || {
                    let event = if i % 2 == 0 {
                        Event::TextEdited(CLOCK.into())
                    } else {
                        Event::ParameterChanged {
                            key: "signal-height".into(),
                            change: ControlChange::Text(format!("{}", 20 + i)),
                        }
                    };
                    shared.handle(event).unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        shared.with(|driver| {
            assert_eq!(8, driver.presenter().outcomes.len());
            assert!(driver.guest().is_clean());
        });
    }
}

#[cfg(test)]
pub mod stub {
    use crate::wasms::TestWasm;
    use crate::Recorder;
    use render_wasmer_host::prelude::*;
    use std::io::Write;
    use test_common::CLOCK;

    fn live(guest: &mut WasmerGuest) -> u32 {
        guest.global_u32("live_allocations").unwrap()
    }

    fn released(guest: &mut WasmerGuest) -> u32 {
        guest.global_u32("released_bytes").unwrap()
    }

    fn driver(wasm: TestWasm) -> RenderDriver<WasmerGuest, Recorder> {
        RenderDriver::new(wasm.guest().unwrap(), Recorder::default(), wasm.config()).unwrap()
    }

    #[test]
    fn negotiates_current_schema() {
        let mut guest = TestWasm::Stub.guest().unwrap();
        assert_eq!(Some(ProtocolVersion::CURRENT.as_wire()), guest.schema_version().unwrap());
        assert!(guest.memory_size() >= 65_536);
    }

    #[test]
    fn render_round_trip() {
        let mut driver = driver(TestWasm::Stub);
        driver.handle(Event::TextEdited(CLOCK.into())).unwrap();
        assert_eq!(
            &RenderOutcome::rendered(CLOCK.to_string()),
            driver.presenter().outcomes.last().unwrap()
        );
        let guest = driver.guest();
        // input released by the guest with its written length, then the echoed result
        let len = CLOCK.len() as u32;
        assert_eq!(len + RESULT_HEADER_LEN + len, released(guest));
        assert_eq!(0, live(guest));
    }

    #[test]
    fn failures_release_one_byte() {
        let mut driver = driver(TestWasm::Stub);
        driver.handle(Event::TextEdited("nope".into())).unwrap();
        assert_eq!(
            &RenderOutcome::failed(StatusCode::MalformedInput),
            driver.presenter().outcomes.last().unwrap()
        );
        let guest = driver.guest();
        assert_eq!(4 + RESULT_STATUS_LEN, released(guest));
        assert_eq!(0, live(guest));

        driver.handle(Event::TextEdited(String::new())).unwrap();
        assert!(!driver.presenter().outcomes.last().unwrap().success);
        assert_eq!(0, live(driver.guest()));
    }

    #[test]
    fn unknown_status_is_clamped() {
        let mut driver = driver(TestWasm::Stub);
        driver.handle(Event::TextEdited("9".into())).unwrap();
        assert_eq!(
            &RenderOutcome::failed(StatusCode::Unknown),
            driver.presenter().outcomes.last().unwrap()
        );
        assert_eq!(0, live(driver.guest()));
    }

    #[test]
    fn trap_is_a_runtime_error() {
        let mut driver = driver(TestWasm::Stub);
        assert!(matches!(
            driver.handle(Event::TextEdited("T".into())),
            Err(HostError::Runtime(_))
        ));
        // the instance stays usable
        driver.handle(Event::TextEdited(CLOCK.into())).unwrap();
        assert!(driver.presenter().outcomes.last().unwrap().success);
    }

    #[test]
    fn runaway_guest_runs_out_of_points() {
        let config = HostConfig {
            metering_limit: 100_000,
            ..HostConfig::default()
        };
        let guest = TestWasm::Stub.guest_with(&config).unwrap();
        let mut driver = RenderDriver::new(guest, Recorder::default(), config).unwrap();
        assert!(matches!(
            driver.handle(Event::TextEdited("L".into())),
            Err(HostError::OutOfPoints)
        ));
        // every call gets a fresh budget
        driver.handle(Event::TextEdited(CLOCK.into())).unwrap();
        assert!(driver.presenter().outcomes.last().unwrap().success);
    }

    #[test]
    fn parameter_table() {
        let mut guest = TestWasm::Stub.guest().unwrap();
        let mut registry = ParameterRegistry::connect(&mut guest, &HostConfig::default()).unwrap();
        let values: Vec<PackedValue> = (0..SCHEMA_V2.len())
            .map(|index| guest.get_parameter(index).unwrap())
            .collect();
        assert_eq!(SCHEMA_V2.defaults(), values);
        assert_eq!(&ParameterRegistry::new(&SCHEMA_V2), &registry);

        registry
            .change(&mut guest, "background", ControlChange::Text("#abcdef".into()))
            .unwrap();
        registry
            .change(&mut guest, "background-enabled", ControlChange::Toggle(true))
            .unwrap();
        assert_eq!(0x01AB_CDEF, guest.get_parameter(3).unwrap());
        // out of range reads as zero
        assert_eq!(0, guest.get_parameter(SCHEMA_V2.len()).unwrap());

        registry.reset(&mut guest).unwrap();
        assert_eq!(0, guest.get_parameter(3).unwrap());
        assert_eq!(&ParameterRegistry::new(&SCHEMA_V2), &registry);
    }

    #[test]
    fn export_and_import() {
        let mut driver = driver(TestWasm::Stub);
        driver.handle(Event::ExportRequested).unwrap();
        assert_eq!(vec![r#"{"stub":true}"#.to_string()], driver.presenter().skins);

        driver.handle(Event::SkinImported("{}".into())).unwrap();
        assert!(driver.presenter().notices.is_empty());
        driver.handle(Event::SkinImported("x".into())).unwrap();
        assert_eq!(1, driver.presenter().notices.len());
        assert_eq!(0, live(driver.guest()));
    }

    #[test]
    fn legacy_module_needs_an_assumed_schema() {
        let guest = TestWasm::Legacy.guest().unwrap();
        assert!(matches!(
            RenderDriver::new(guest, Recorder::default(), HostConfig::default()),
            Err(HostError::MissingSchema)
        ));

        let mut driver = driver(TestWasm::Legacy);
        assert_eq!(ProtocolVersion::V2, driver.registry().schema().version);
        driver.handle(Event::TextEdited(CLOCK.into())).unwrap();
        assert!(driver.presenter().outcomes[0].success);
    }

    #[test]
    fn renamed_exports_come_from_config() {
        assert!(matches!(
            TestWasm::Renamed.guest_with(&HostConfig::default()),
            Err(HostError::Export { name, .. }) if name == "allocate"
        ));
        let mut driver = driver(TestWasm::Renamed);
        driver.handle(Event::TextEdited(CLOCK.into())).unwrap();
        assert!(driver.presenter().outcomes[0].success);
    }

    #[test]
    fn config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"exports": {{"allocate": "malloc", "release": "free"}}, "metering_limit": 1000000}}"#
        )
        .unwrap();
        let config = HostConfig::from_json_file(file.path()).unwrap();
        assert_eq!(1_000_000, config.metering_limit);

        let guest = TestWasm::Renamed.guest_with(&config).unwrap();
        let mut driver = RenderDriver::new(guest, Recorder::default(), config).unwrap();
        driver.handle(Event::TextEdited(CLOCK.into())).unwrap();
        assert!(driver.presenter().outcomes[0].success);
    }
}
