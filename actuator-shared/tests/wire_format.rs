use actuator_shared::{ControlPoint, CurveSet, DriveSettings, Frame, ProtocolVersion, TickInput};

#[test]
fn paused_v3_tick_on_the_wire() {
    let mut curves = CurveSet::default();
    curves.position.insert(ControlPoint::new(1.0, 0.0));
    curves.amplitude.insert(ControlPoint::new(1.0, 1023.0));
    curves.force.insert(ControlPoint::new(0.0, 100.0));
    curves.force.insert(ControlPoint::new(5.0, 300.0));

    let tick = TickInput {
        time: 2.5,
        end_time: 10.0,
        paused: false,
        air_out: true,
        air_in: false,
    };
    let drive = DriveSettings::default();

    let frame = Frame::build(&curves, &tick, ProtocolVersion::V3, &drive);
    assert_eq!(frame.position, 0);
    assert_eq!(frame.force, 200);

    let bytes = frame.encode(ProtocolVersion::V3);
    assert_eq!(bytes, [0, 0, 0, 0, 200, 0, 0, 0, 0b0000_0001]);

    let paused = Frame::build(
        &curves,
        &TickInput {
            paused: true,
            ..tick
        },
        ProtocolVersion::V3,
        &drive,
    );
    assert_eq!(
        paused.encode(ProtocolVersion::V3),
        [0, 0, 0, 0, 0, 0, 0, 0, 0b0000_0001]
    );
}

#[test]
fn every_version_decodes_what_it_encodes() {
    let frame = Frame {
        position: -512,
        force: 0,
        air_out: false,
        air_in: true,
    };

    for version in ProtocolVersion::ALL {
        let bytes = frame.encode(version);
        assert_eq!(bytes.len(), version.frame_len());
        assert_eq!(Frame::decode(&bytes, version), Ok(frame));
    }
}
