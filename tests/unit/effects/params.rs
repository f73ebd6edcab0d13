use super::*;

#[test]
fn kinds_parse_from_ui_names() {
    assert_eq!(
        "block-shoving".parse::<EffectKind>().unwrap(),
        EffectKind::BlockShoving
    );
    assert_eq!(" 3D-Mesh ".parse::<EffectKind>().unwrap(), EffectKind::Mesh3d);
    let err = "invert".parse::<EffectKind>().unwrap_err();
    assert!(err.to_string().contains("unknown effect kind"));
    for k in EffectKind::ALL {
        assert_eq!(k.as_str().parse::<EffectKind>().unwrap(), k);
    }
}

#[test]
fn missing_keys_use_defaults() {
    let p = EffectParams::from_json(EffectKind::MotionSmear, &serde_json::json!({}));
    assert_eq!(p, EffectParams::default_for(EffectKind::MotionSmear));
    let EffectParams::MotionSmear(m) = p else {
        panic!("wrong variant");
    };
    assert_eq!(m.intensity, 70.0);
    assert_eq!(m.momentum, 0.92);
    assert_eq!(m.mode, SmearMode::Melt);
    assert_eq!(m.source.active_source, -1);
}

#[test]
fn malformed_values_fall_back_and_ranges_clamp() {
    let p = EffectParams::from_json(
        EffectKind::BlockShoving,
        &serde_json::json!({
            "style": "fluid",
            "intensity": "loud",
            "blockSize": 0,
            "activeSource": 2,
            "lastUpdate": 1700000000123.0,
        }),
    );
    let EffectParams::BlockShoving(b) = p else {
        panic!("wrong variant");
    };
    assert_eq!(b.style, ShoveStyle::Fluid);
    assert_eq!(b.intensity, 50.0);
    assert_eq!(b.block_size, 16);
    assert_eq!(b.source.active_source, 2);
    assert_eq!(b.source.last_update, 1_700_000_000_123);

    let EffectParams::MotionSmear(m) = EffectParams::from_json(
        EffectKind::MotionSmear,
        &serde_json::json!({ "intensity": 400, "momentum": -2, "mode": "nonsense" }),
    ) else {
        panic!("wrong variant");
    };
    assert_eq!(m.intensity, 100.0);
    assert_eq!(m.momentum, 0.0);
    assert_eq!(m.mode, SmearMode::Melt);
}

#[test]
fn oversized_source_index_never_means_live() {
    let parse = |v: serde_json::Value| match EffectParams::from_json(EffectKind::Datamosh, &v) {
        EffectParams::Datamosh(d) => d.source.active_source,
        other => panic!("wrong variant: {other:?}"),
    };
    assert_eq!(parse(serde_json::json!({ "activeSource": 3_000_000_000i64 })), i32::MAX);
    assert_eq!(parse(serde_json::json!({ "activeSource": -3_000_000_000i64 })), i32::MIN);
    assert_eq!(parse(serde_json::json!({ "activeSource": 1e300 })), i32::MAX);
    assert_eq!(parse(serde_json::json!({ "activeSource": "two" })), -1);
    assert_eq!(parse(serde_json::json!({})), -1);
}

#[test]
fn json_view_round_trips() {
    for kind in EffectKind::ALL {
        let p = EffectParams::default_for(kind);
        assert_eq!(EffectParams::from_json(kind, &p.to_json()), p);
        assert_eq!(p.kind(), kind);
    }
}

#[test]
fn only_motion_kinds_are_stateful() {
    assert!(EffectKind::Datamosh.stateful().is_some());
    assert!(EffectKind::MotionSmear.stateful().is_some());
    assert!(EffectKind::Glitch.stateful().is_none());
    assert!(EffectKind::Mesh3d.is_pinned_last());
    assert!(!EffectKind::Datamosh.is_pinned_last());
}
