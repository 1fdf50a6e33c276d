//! Stock target types: entity, component base, transform, light, timer.
//! Installed by `TypeRegistry::standard()`.

use std::any::Any;

use crate::error::ExecError;
use crate::runtime::value::{EntityRef, ObjectRef, Value};
use crate::types::identity::ValueType;
use crate::types::registry::{
    EnumDesc, MethodDesc, ParamDesc, TypeDesc, TypeRegistry,
    arg_bool, arg_color, arg_enum, arg_float, arg_int, arg_mask, arg_ref, arg_text, arg_vec3,
    receiver,
};
use super::{Component, ComponentCell, ENTITY_TYPE, EntityData, component_receiver};

pub const COMPONENT_TYPE: &str = "scene::Component";
pub const LIGHT_MODE: &str = "scene::LightMode";

pub fn register(r: &mut TypeRegistry) {
    r.register(entity_desc());
    r.register(component_desc());
    r.register(transform_desc());
    r.register(light_desc());
    r.register(timer_desc());
    r.register_enum(EnumDesc { name: LIGHT_MODE, variants: vec!["Off", "Steady", "Flicker"] });
    r.register_opaque("asset::Texture");
}

// ─── Helpers ──────────────────────────────────────────────────────────────────

fn p(name: &'static str, ty: ValueType) -> ParamDesc {
    ParamDesc { name, ty }
}

fn entity_ref() -> ValueType { ValueType::Ref(ENTITY_TYPE.into()) }

fn unit() -> Result<Option<Value>, ExecError> { Ok(None) }

fn yes_no(b: bool) -> Result<Option<Value>, ExecError> { Ok(Some(Value::Bool(b))) }

// ─── scene::Entity ────────────────────────────────────────────────────────────

fn entity_desc() -> TypeDesc {
    TypeDesc {
        name: ENTITY_TYPE,
        base: None,
        methods: vec![
            MethodDesc {
                name: "SetActive", params: vec![p("value", ValueType::Bool)], ret: None,
                call: |recv, args| {
                    receiver::<EntityData>(recv, ENTITY_TYPE)?.active = arg_bool(args, 0)?;
                    unit()
                },
            },
            MethodDesc {
                name: "IsActive", params: vec![], ret: Some(ValueType::Bool),
                call: |recv, _args| yes_no(receiver::<EntityData>(recv, ENTITY_TYPE)?.active),
            },
            MethodDesc {
                name: "SetName", params: vec![p("name", ValueType::Text)], ret: None,
                call: |recv, args| {
                    receiver::<EntityData>(recv, ENTITY_TYPE)?.name = arg_text(args, 0)?.to_string();
                    unit()
                },
            },
            MethodDesc {
                name: "SetLayer", params: vec![p("layer", ValueType::Int)], ret: None,
                call: |recv, args| {
                    let layer = arg_int(args, 0)?;
                    let data = receiver::<EntityData>(recv, ENTITY_TYPE)?;
                    data.layer = u32::try_from(layer)
                        .ok()
                        .filter(|l| *l < 32)
                        .ok_or_else(|| ExecError::msg(format!("layer {layer} is outside 0..32")))?;
                    unit()
                },
            },
            MethodDesc {
                name: "IsInLayers", params: vec![p("mask", ValueType::Mask)], ret: Some(ValueType::Bool),
                call: |recv, args| {
                    let mask = arg_mask(args, 0)?;
                    let data = receiver::<EntityData>(recv, ENTITY_TYPE)?;
                    yes_no(mask & 1u32.checked_shl(data.layer).unwrap_or(0) != 0)
                },
            },
        ],
    }
}

// ─── scene::Component ─────────────────────────────────────────────────────────

fn cell(recv: &mut dyn Any) -> Result<&mut ComponentCell, ExecError> {
    receiver::<ComponentCell>(recv, COMPONENT_TYPE)
}

fn component_desc() -> TypeDesc {
    TypeDesc {
        name: COMPONENT_TYPE,
        base: None,
        methods: vec![
            MethodDesc {
                name: "SetEnabled", params: vec![p("value", ValueType::Bool)], ret: None,
                call: |recv, args| {
                    cell(recv)?.enabled = arg_bool(args, 0)?;
                    unit()
                },
            },
            MethodDesc {
                name: "IsEnabled", params: vec![], ret: Some(ValueType::Bool),
                call: |recv, _args| yes_no(cell(recv)?.enabled),
            },
        ],
    }
}

// ─── scene::Transform ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    pub position: (f64, f64, f64),
    pub scale:    (f64, f64, f64),
    pub parent:   Option<EntityRef>,
}

impl Default for Transform {
    fn default() -> Self {
        Self { position: (0.0, 0.0, 0.0), scale: (1.0, 1.0, 1.0), parent: None }
    }
}

impl Component for Transform {
    const TYPE_NAME: &'static str = "scene::Transform";
}

fn transform_desc() -> TypeDesc {
    TypeDesc {
        name: Transform::TYPE_NAME,
        base: Some(COMPONENT_TYPE),
        methods: vec![
            MethodDesc {
                name: "SetPosition", params: vec![p("position", ValueType::Vec3)], ret: None,
                call: |recv, args| {
                    component_receiver::<Transform>(recv)?.position = arg_vec3(args, 0)?;
                    unit()
                },
            },
            MethodDesc {
                name: "Translate", params: vec![p("delta", ValueType::Vec3)], ret: None,
                call: |recv, args| {
                    let (dx, dy, dz) = arg_vec3(args, 0)?;
                    let t = component_receiver::<Transform>(recv)?;
                    t.position = (t.position.0 + dx, t.position.1 + dy, t.position.2 + dz);
                    unit()
                },
            },
            MethodDesc {
                name: "SetScale", params: vec![p("scale", ValueType::Vec3)], ret: None,
                call: |recv, args| {
                    component_receiver::<Transform>(recv)?.scale = arg_vec3(args, 0)?;
                    unit()
                },
            },
            MethodDesc {
                name: "SetParent", params: vec![p("parent", entity_ref())], ret: None,
                call: |recv, args| {
                    let parent = match arg_ref(args, 0)? {
                        Some(ObjectRef::Entity(e)) => Some(*e),
                        Some(other) => return Err(ExecError::msg(format!("{other} is not an entity"))),
                        None => None,
                    };
                    component_receiver::<Transform>(recv)?.parent = parent;
                    unit()
                },
            },
            MethodDesc {
                name: "IsAtOrigin", params: vec![], ret: Some(ValueType::Bool),
                call: |recv, _args| {
                    let t = component_receiver::<Transform>(recv)?;
                    yes_no(t.position == (0.0, 0.0, 0.0))
                },
            },
        ],
    }
}

// ─── scene::Light ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LightMode {
    Off,
    #[default]
    Steady,
    Flicker,
}

impl LightMode {
    fn from_index(index: u32) -> Option<Self> {
        match index {
            0 => Some(Self::Off),
            1 => Some(Self::Steady),
            2 => Some(Self::Flicker),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    pub color:     [f64; 4],
    pub intensity: f64,
    pub mode:      LightMode,
}

impl Default for Light {
    fn default() -> Self {
        Self { color: [1.0, 1.0, 1.0, 1.0], intensity: 1.0, mode: LightMode::Steady }
    }
}

impl Component for Light {
    const TYPE_NAME: &'static str = "scene::Light";
}

fn light_desc() -> TypeDesc {
    TypeDesc {
        name: Light::TYPE_NAME,
        base: Some(COMPONENT_TYPE),
        methods: vec![
            MethodDesc {
                name: "SetColor", params: vec![p("color", ValueType::Color)], ret: None,
                call: |recv, args| {
                    component_receiver::<Light>(recv)?.color = arg_color(args, 0)?;
                    unit()
                },
            },
            MethodDesc {
                name: "SetIntensity", params: vec![p("intensity", ValueType::Float)], ret: None,
                call: |recv, args| {
                    let intensity = arg_float(args, 0)?;
                    if intensity < 0.0 {
                        return Err(ExecError::msg(format!("negative intensity {intensity}")));
                    }
                    component_receiver::<Light>(recv)?.intensity = intensity;
                    unit()
                },
            },
            MethodDesc {
                name: "SetMode", params: vec![p("mode", ValueType::Enum(LIGHT_MODE.into()))], ret: None,
                call: |recv, args| {
                    let index = arg_enum(args, 0)?;
                    let mode = LightMode::from_index(index)
                        .ok_or_else(|| ExecError::msg(format!("no light mode #{index}")))?;
                    component_receiver::<Light>(recv)?.mode = mode;
                    unit()
                },
            },
            MethodDesc {
                name: "IsBrighterThan", params: vec![p("threshold", ValueType::Float)], ret: Some(ValueType::Bool),
                call: |recv, args| {
                    let threshold = arg_float(args, 0)?;
                    let light = component_receiver::<Light>(recv)?;
                    yes_no(light.mode != LightMode::Off && light.intensity > threshold)
                },
            },
        ],
    }
}

// ─── scene::Timer ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Timer {
    pub remaining: f64,
    pub running:   bool,
}

impl Component for Timer {
    const TYPE_NAME: &'static str = "scene::Timer";
}

fn timer_desc() -> TypeDesc {
    TypeDesc {
        name: Timer::TYPE_NAME,
        base: Some(COMPONENT_TYPE),
        methods: vec![
            MethodDesc {
                name: "Start", params: vec![p("seconds", ValueType::Float)], ret: None,
                call: |recv, args| {
                    let seconds = arg_float(args, 0)?;
                    let t = component_receiver::<Timer>(recv)?;
                    t.remaining = seconds.max(0.0);
                    t.running = true;
                    unit()
                },
            },
            MethodDesc {
                name: "Tick", params: vec![p("dt", ValueType::Float)], ret: None,
                call: |recv, args| {
                    let dt = arg_float(args, 0)?;
                    let t = component_receiver::<Timer>(recv)?;
                    if t.running {
                        t.remaining = (t.remaining - dt).max(0.0);
                    }
                    unit()
                },
            },
            MethodDesc {
                name: "IsReady", params: vec![], ret: Some(ValueType::Bool),
                call: |recv, _args| {
                    let t = component_receiver::<Timer>(recv)?;
                    yes_no(t.running && t.remaining <= 0.0)
                },
            },
            MethodDesc {
                name: "Fail", params: vec![p("reason", ValueType::Text)], ret: None,
                call: |_recv, args| Err(ExecError::msg(arg_text(args, 0)?.to_string())),
            },
        ],
    }
}
