use std::sync::Mutex;

use can_dict::hooks::{be_getter, be_setter};
use can_dict::{
    Access, Dictionary, Error, ManualClock, SendInterval, Value, VarId, Variable, WriteCallback,
};

const NEVER: SendInterval = SendInterval::Never;

#[test]
fn read_refused_when_not_readable() {
    let clock = ManualClock::new(0);
    let cell = Variable::from_u32(0xDEAD_BEEF);
    let mut dict = Dictionary::new(&clock);
    let id = VarId::new(3).unwrap();
    dict.bind(id, &cell, 4, Access::WRITE_ONLY, NEVER).unwrap();

    for capacity in 0..=8 {
        let mut out = [0u8; 8];
        assert_eq!(dict.handle_read_request(id.raw(), &mut out[..capacity]), 0);
        assert_eq!(out, [0; 8]);
    }
    assert_eq!(dict.read(id, &mut [0; 8]), Err(Error::AccessDenied));
}

#[test]
fn read_returns_min_of_length_and_capacity() {
    let clock = ManualClock::new(0);
    let cell = Variable::new(0x0807_0605_0403_0201);
    let mut dict = Dictionary::new(&clock);
    let id = VarId::new(4).unwrap();
    dict.bind(id, &cell, 6, Access::READ_ONLY, NEVER).unwrap();

    for capacity in 0..=8 {
        let mut out = [0u8; 8];
        let n = dict.handle_read_request(id.raw(), &mut out[..capacity]);
        assert_eq!(n, capacity.min(6));
        assert_eq!(out[..n], [1, 2, 3, 4, 5, 6][..n]);
    }
}

#[test]
fn invalid_ids_read_and_write_nothing() {
    let clock = ManualClock::new(0);
    let dict = Dictionary::new(&clock);

    for raw in [0u8, 64, 0x80, 0xFF] {
        assert_eq!(dict.handle_read_request(raw, &mut [0; 8]), 0);
        assert!(!dict.handle_write_request(raw, &[1, 2, 3]));
    }
}

#[test]
fn write_refused_when_not_writable() {
    static CALLS: Mutex<u32> = Mutex::new(0);
    fn count(_: VarId, _: Value) {
        *CALLS.lock().unwrap() += 1;
    }

    let clock = ManualClock::new(0);
    let cell = Variable::new(0x1122_3344_5566_7788);
    let mut dict = Dictionary::new(&clock);
    let id = VarId::new(7).unwrap();
    dict.bind(id, &cell, 8, Access::READ_ONLY, NEVER).unwrap();
    dict.on_write(id, count).unwrap();

    assert!(!dict.handle_write_request(id.raw(), &[0; 8]));
    assert_eq!(dict.write(id, &[0; 8]), Err(Error::AccessDenied));
    assert_eq!(cell.raw(), 0x1122_3344_5566_7788);
    assert_eq!(*CALLS.lock().unwrap(), 0);
}

#[test]
fn callbacks_run_in_order_with_the_same_value() {
    static SEEN: Mutex<Vec<(u8, VarId, Value)>> = Mutex::new(Vec::new());
    fn first(id: VarId, v: Value) {
        SEEN.lock().unwrap().push((1, id, v));
    }
    fn second(id: VarId, v: Value) {
        SEEN.lock().unwrap().push((2, id, v));
    }
    fn third(id: VarId, v: Value) {
        SEEN.lock().unwrap().push((3, id, v));
    }
    fn fourth(id: VarId, v: Value) {
        SEEN.lock().unwrap().push((4, id, v));
    }

    let clock = ManualClock::new(0);
    let mut dict = Dictionary::new(&clock);
    let id = VarId::new(0x21).unwrap();
    dict.add_int(id, 2, 0, Access::READ_WRITE, NEVER).unwrap();
    let callbacks: [WriteCallback; 4] = [first, second, third, fourth];
    for cb in callbacks {
        dict.on_write(id, cb).unwrap();
    }

    assert!(dict.handle_write_request(id.raw(), &[0x34, 0x12]));

    let seen = SEEN.lock().unwrap();
    assert_eq!(seen.iter().map(|(tag, _, _)| *tag).collect::<Vec<_>>(), [1, 2, 3, 4]);
    for (_, seen_id, value) in seen.iter() {
        assert_eq!(*seen_id, id);
        assert_eq!(value.len(), 2);
        assert_eq!(value.as_u16(), 0x1234);
    }
}

#[test]
fn short_and_long_payloads_are_clamped() {
    let clock = ManualClock::new(0);
    let cell = Variable::from_u32(0xAABB_CCDD);
    let mut dict = Dictionary::new(&clock);
    let id = VarId::new(8).unwrap();
    dict.bind(id, &cell, 4, Access::READ_WRITE, NEVER).unwrap();

    assert!(dict.handle_write_request(id.raw(), &[0x11]));
    assert_eq!(cell.load_u32(), 0xAABB_CC11);

    assert!(dict.handle_write_request(id.raw(), &[1, 2, 3, 4, 5, 6, 7]));
    assert_eq!(cell.raw(), 0x0403_0201);
}

#[test]
fn callback_value_carries_bytes_past_length() {
    static SEEN: Mutex<Option<Value>> = Mutex::new(None);
    fn record(_: VarId, v: Value) {
        *SEEN.lock().unwrap() = Some(v);
    }

    let clock = ManualClock::new(0);
    let cell = Variable::from_u32(0xEEFF_1100);
    let mut dict = Dictionary::new(&clock);
    let id = VarId::new(9).unwrap();
    dict.bind(id, &cell, 1, Access::READ_WRITE, NEVER).unwrap();
    dict.on_write(id, record).unwrap();

    assert!(dict.handle_write_request(id.raw(), &[0x07]));

    let value = SEEN.lock().unwrap().expect("callback ran");
    assert_eq!(value.as_bytes(), &[0x07]);
    assert_eq!(value.as_u8(), 0x07);
    assert_eq!(value.as_u32(), 0xEEFF_1107);
}

#[test]
fn four_byte_round_trip() {
    let clock = ManualClock::new(0);
    let mut dict = Dictionary::new(&clock);
    let id = VarId::new(0x30).unwrap();
    dict.add_int(id, 4, 0, Access::READ_WRITE, NEVER).unwrap();

    assert!(dict.handle_write_request(id.raw(), &[0x01, 0x00, 0x00, 0x00]));
    let mut out = [0u8; 8];
    assert_eq!(dict.handle_read_request(id.raw(), &mut out), 4);
    assert_eq!(out[..4], [0x01, 0x00, 0x00, 0x00]);
    assert_eq!(dict.get(id).unwrap().load_u32(), 1);
}

#[test]
fn float_write_scenario() {
    let clock = ManualClock::new(0);
    let mut dict = Dictionary::new(&clock);
    let id = VarId::new(0x11).unwrap();
    dict.add_float(id, 1.0, Access::READ_WRITE, NEVER).unwrap();
    dict.get(id).unwrap().store_f32(0.25);

    assert!(dict.handle_write_request(0x11, &[0x00, 0x00, 0x80, 0x3F]));

    let cell = dict.get(id).unwrap();
    assert_eq!(cell.load_f32(), 1.0);
    assert_eq!(cell.load_u32(), 0x3F80_0000);
}

#[test]
fn replaced_hooks_change_wire_encoding() {
    let clock = ManualClock::new(0);
    let cell = Variable::from_f32(0.0);
    let mut dict = Dictionary::new(&clock);
    let id = VarId::new(0x31).unwrap();
    dict.bind(id, &cell, 4, Access::READ_WRITE, NEVER).unwrap();
    dict.set_setter(id, be_setter).unwrap();
    dict.set_getter(id, be_getter).unwrap();

    assert!(dict.handle_write_request(id.raw(), &[0x3F, 0x80, 0x00, 0x00]));
    assert_eq!(cell.load_f32(), 1.0);

    let mut out = [0u8; 4];
    assert_eq!(dict.handle_read_request(id.raw(), &mut out), 4);
    assert_eq!(out, [0x3F, 0x80, 0x00, 0x00]);
}

#[test]
fn local_writes_are_visible_to_remote_reads() {
    static LIGHTS: Variable = Variable::from_bool(false);

    let clock = ManualClock::new(0);
    let mut dict = Dictionary::new(&clock);
    let id = VarId::new(1).unwrap();
    dict.bind(id, &LIGHTS, 1, Access::READ_WRITE, NEVER).unwrap();

    LIGHTS.store_bool(true);
    let mut out = [0u8; 1];
    assert_eq!(dict.handle_read_request(1, &mut out), 1);
    assert_eq!(out, [1]);

    assert!(dict.handle_write_request(1, &[0]));
    assert!(!LIGHTS.load_bool());
}
