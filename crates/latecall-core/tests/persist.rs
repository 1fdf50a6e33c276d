//! Call sheet persistence: round trips, restarts, and stored data outliving
//! the types it names.

use latecall_core::scene::stock::{Light, LightMode, Timer, Transform};
use latecall_core::{
    CallKind, CallSheet, CallVariant, Combine, Condition, EntityRef, ErrorCode, InvocationResult,
    ObjectGraph, ResolveError, Scene, TypeRegistry, Value, candidates, supported_for,
};
use pretty_assertions::assert_eq;

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// Same layout as the app's demo scene.
fn demo_scene() -> (Scene, EntityRef, EntityRef) {
    let mut scene = Scene::new();
    let lamp = scene.spawn("lamp");
    scene.attach(lamp, Transform::default()).unwrap();
    scene.attach(lamp, Light::default()).unwrap();
    let clock = scene.spawn("clock");
    scene.attach(clock, Timer { remaining: 0.0, running: true }).unwrap();
    (scene, lamp, clock)
}

fn pick(reg: &TypeRegistry, scene: &Scene, root: EntityRef, kind: CallKind, menu_path: &str) -> CallVariant {
    let found = candidates(reg, scene, root, &supported_for(kind))
        .into_iter()
        .find(|c| c.menu_path == menu_path)
        .unwrap();
    let mut call = CallVariant::new(kind);
    call.select(&found, scene).unwrap();
    call
}

fn sheet(reg: &TypeRegistry, scene: &Scene, lamp: EntityRef, clock: EntityRef) -> CallSheet {
    let mut sheet = CallSheet::new();
    sheet.conditions.push(
        Condition::new(Combine::All).with(pick(reg, scene, clock, CallKind::Predicate, "Timer/IsReady ()")),
    );
    let mut mode = pick(reg, scene, lamp, CallKind::Action, "Light/SetMode (mode: LightMode)");
    mode.arguments.set("mode", Value::Enum { ty: "scene::LightMode".into(), index: 0 });
    sheet.actions.push(mode);
    sheet
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[test]
fn sheet_round_trips_through_json() {
    let reg = TypeRegistry::standard();
    let (scene, lamp, clock) = demo_scene();
    let saved = sheet(&reg, &scene, lamp, clock);

    let back = CallSheet::from_json(&saved.to_json().unwrap()).unwrap();
    assert_eq!(back, saved);
}

#[test]
fn last_error_is_not_persisted() {
    let reg = TypeRegistry::standard();
    let (mut scene, lamp, clock) = demo_scene();
    let mut saved = sheet(&reg, &scene, lamp, clock);
    scene.despawn(lamp);
    saved.actions.invoke_all(&reg, &mut scene);
    assert!(saved.actions.get(0).unwrap().has_error());

    let back = CallSheet::from_json(&saved.to_json().unwrap()).unwrap();
    assert!(!back.actions.get(0).unwrap().has_error());
}

#[test]
fn loaded_sheet_runs_against_a_rebuilt_scene() {
    let json = {
        let reg = TypeRegistry::standard();
        let (scene, lamp, clock) = demo_scene();
        sheet(&reg, &scene, lamp, clock).to_json().unwrap()
    };

    // Fresh registry and scene, as after a restart.
    let reg = TypeRegistry::standard();
    let (mut scene, lamp, _) = demo_scene();
    let mut loaded = CallSheet::from_json(&json).unwrap();

    assert!(loaded.conditions_hold(&reg, &mut scene));
    assert!(loaded.actions.invoke_all(&reg, &mut scene).all_completed());
    let light = scene.find_component(lamp, "scene::Light").unwrap();
    assert_eq!(scene.component::<Light>(light).unwrap().mode, LightMode::Off);
}

#[test]
fn renamed_enum_type_is_reported_after_load() {
    let reg = TypeRegistry::standard();
    let (mut scene, lamp, clock) = demo_scene();
    let json = sheet(&reg, &scene, lamp, clock)
        .to_json()
        .unwrap()
        .replace("enum:scene::LightMode", "enum:scene::LampMode");
    let mut loaded = CallSheet::from_json(&json).unwrap();

    let result = loaded.actions.get_mut(0).unwrap().invoke(&reg, &mut scene);
    assert!(matches!(
        result,
        InvocationResult::Skipped(ResolveError::ParameterTypeNotFound { ref ty, .. }) if ty == "enum:scene::LampMode"
    ));
}

#[test]
fn descriptor_json_is_plain_strings() {
    let reg = TypeRegistry::standard();
    let (scene, lamp, clock) = demo_scene();
    let json = sheet(&reg, &scene, lamp, clock).to_json().unwrap();
    let doc: serde_json::Value = serde_json::from_str(&json).unwrap();

    let descriptor = &doc["actions"][0]["descriptor"];
    assert_eq!(descriptor["owner_type"], "scene::Light");
    assert_eq!(descriptor["method_name"], "SetMode");
    assert_eq!(descriptor["parameter_types"][0], "enum:scene::LightMode");
    assert_eq!(doc["actions"][0]["kind"], "action");
    assert_eq!(doc["conditions"][0]["combine"], "all");
}

#[test]
fn demo_sheet_in_repo_loads() {
    let text = include_str!("../../../demos/lamp.json");
    let sheet = CallSheet::from_json(text).unwrap();
    assert_eq!(sheet.actions.len(), 3);
    assert_eq!(sheet.conditions.len(), 1);
}

#[test]
fn version_mismatch_is_rejected() {
    let err = CallSheet::from_json(r#"{ "version": 0, "actions": [] }"#).unwrap_err();
    assert_eq!(err.code(), ErrorCode::J002);
}
