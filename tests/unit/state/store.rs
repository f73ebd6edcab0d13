use super::*;

fn frame(w: u32, h: u32, v: u8) -> Frame {
    Frame::filled(w, h, [v, v, v, 255], 0.0).unwrap()
}

#[test]
fn first_sight_initializes_and_seeds_from_frame() {
    let mut store = StateStore::new();
    let f = frame(4, 4, 77);
    assert!(matches!(
        store.get_or_init(StatefulKind::Datamosh, &f, 5),
        Slot::Initialized
    ));
    let s = store.get(StatefulKind::Datamosh).unwrap();
    assert_eq!((s.width(), s.height()), (4, 4));
    assert_eq!(s.previous_input(), f.data());
    assert_eq!(s.accumulation(), f.data());
    assert!(s.motion().is_empty());
    assert_eq!(s.last_update(), 5);
}

#[test]
fn same_dimensions_are_ready() {
    let mut store = StateStore::new();
    let f = frame(4, 4, 1);
    store.get_or_init(StatefulKind::BlockShoving, &f, 0);
    match store.get_or_init(StatefulKind::BlockShoving, &frame(4, 4, 9), 0) {
        Slot::Ready(s) => assert_eq!(s.previous_input[0], 1),
        Slot::Initialized => panic!("expected ready slot"),
    }
}

#[test]
fn resize_rebuilds_the_slot() {
    let mut store = StateStore::new();
    store.get_or_init(StatefulKind::MotionSmear, &frame(4, 4, 1), 0);
    let bigger = frame(8, 2, 3);
    assert!(matches!(
        store.get_or_init(StatefulKind::MotionSmear, &bigger, 0),
        Slot::Initialized
    ));
    let s = store.get(StatefulKind::MotionSmear).unwrap();
    assert_eq!(s.accumulation.len(), 8 * 2 * 4);
    assert_eq!(s.accumulation[0], 3);
}

#[test]
fn kinds_have_independent_slots() {
    let mut store = StateStore::new();
    let f = frame(2, 2, 0);
    store.get_or_init(StatefulKind::Datamosh, &f, 0);
    store.get_or_init(StatefulKind::BlockShoving, &f, 0);
    assert_eq!(store.len(), 2);
    assert!(store.reset(StatefulKind::Datamosh));
    assert!(!store.reset(StatefulKind::Datamosh));
    assert!(store.get(StatefulKind::BlockShoving).is_some());
    store.clear();
    assert!(store.is_empty());
}
