use std::str::FromStr;

use serde_json::{Value, json};

use crate::{
    foundation::error::{MoshError, MoshResult},
    state::{inject::SourceSelect, store::StatefulKind},
};

/// Every effect kind the chain understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EffectKind {
    Datamosh,
    BlockShoving,
    MotionSmear,
    Glitch,
    BlockCorrupt,
    /// Rendered by the external 3D renderer; always pinned to the tail of a chain.
    Mesh3d,
}

impl EffectKind {
    pub const ALL: [EffectKind; 6] = [
        EffectKind::Datamosh,
        EffectKind::BlockShoving,
        EffectKind::MotionSmear,
        EffectKind::Glitch,
        EffectKind::BlockCorrupt,
        EffectKind::Mesh3d,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EffectKind::Datamosh => "datamosh",
            EffectKind::BlockShoving => "block-shoving",
            EffectKind::MotionSmear => "motion-smear",
            EffectKind::Glitch => "glitch",
            EffectKind::BlockCorrupt => "block-corrupt",
            EffectKind::Mesh3d => "3d-mesh",
        }
    }

    /// State slot used by this kind, if it keeps cross-frame buffers.
    pub fn stateful(self) -> Option<StatefulKind> {
        match self {
            EffectKind::Datamosh => Some(StatefulKind::Datamosh),
            EffectKind::BlockShoving => Some(StatefulKind::BlockShoving),
            EffectKind::MotionSmear => Some(StatefulKind::MotionSmear),
            EffectKind::Glitch | EffectKind::BlockCorrupt | EffectKind::Mesh3d => None,
        }
    }

    /// Kinds that must stay last in a chain.
    pub fn is_pinned_last(self) -> bool {
        matches!(self, EffectKind::Mesh3d)
    }
}

impl FromStr for EffectKind {
    type Err = MoshError;

    fn from_str(s: &str) -> MoshResult<Self> {
        let key = s.trim().to_ascii_lowercase();
        EffectKind::ALL
            .into_iter()
            .find(|k| k.as_str() == key)
            .ok_or_else(|| MoshError::config(format!("unknown effect kind '{s}'")))
    }
}

impl std::fmt::Display for EffectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Block-shoving synthesis style.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ShoveStyle {
    /// Nearest sampling at the block's vector.
    #[default]
    Block,
    /// 3x3-smoothed field, interpolated per pixel, bilinear sampling.
    Fluid,
}

/// Motion-smear synthesis mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SmearMode {
    #[default]
    Melt,
    Bloom,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DatamoshParams {
    /// `0..=100`; scales how much temporal change is integrated.
    pub intensity: f32,
    pub source: SourceSelect,
}

impl Default for DatamoshParams {
    fn default() -> Self {
        Self {
            intensity: 50.0,
            source: SourceSelect::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlockShovingParams {
    pub style: ShoveStyle,
    /// `0..=100`; displacement strength is `intensity / 50`.
    pub intensity: f32,
    pub block_size: u32,
    pub source: SourceSelect,
}

impl Default for BlockShovingParams {
    fn default() -> Self {
        Self {
            style: ShoveStyle::Block,
            intensity: 50.0,
            block_size: 16,
            source: SourceSelect::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotionSmearParams {
    pub mode: SmearMode,
    /// `0..=100`; displacement strength is `intensity / 100`.
    pub intensity: f32,
    /// `0..=1`; weight kept from the previous frame's motion field.
    pub momentum: f32,
    pub source: SourceSelect,
}

impl Default for MotionSmearParams {
    fn default() -> Self {
        Self {
            mode: SmearMode::Melt,
            intensity: 70.0,
            momentum: 0.92,
            source: SourceSelect::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlitchParams {
    pub intensity: f32,
    pub speed: f32,
}

impl Default for GlitchParams {
    fn default() -> Self {
        Self {
            intensity: 50.0,
            speed: 10.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlockCorruptParams {
    pub intensity: f32,
    pub block_size: u32,
}

impl Default for BlockCorruptParams {
    fn default() -> Self {
        Self {
            intensity: 30.0,
            block_size: 16,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MeshParams {
    pub displacement_scale: f32,
    pub wireframe: bool,
}

impl Default for MeshParams {
    fn default() -> Self {
        Self {
            displacement_scale: 3.0,
            wireframe: true,
        }
    }
}

/// Typed parameters, one variant per [`EffectKind`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EffectParams {
    Datamosh(DatamoshParams),
    BlockShoving(BlockShovingParams),
    MotionSmear(MotionSmearParams),
    Glitch(GlitchParams),
    BlockCorrupt(BlockCorruptParams),
    Mesh3d(MeshParams),
}

impl EffectParams {
    pub fn default_for(kind: EffectKind) -> Self {
        match kind {
            EffectKind::Datamosh => Self::Datamosh(DatamoshParams::default()),
            EffectKind::BlockShoving => Self::BlockShoving(BlockShovingParams::default()),
            EffectKind::MotionSmear => Self::MotionSmear(MotionSmearParams::default()),
            EffectKind::Glitch => Self::Glitch(GlitchParams::default()),
            EffectKind::BlockCorrupt => Self::BlockCorrupt(BlockCorruptParams::default()),
            EffectKind::Mesh3d => Self::Mesh3d(MeshParams::default()),
        }
    }

    pub fn kind(&self) -> EffectKind {
        match self {
            Self::Datamosh(_) => EffectKind::Datamosh,
            Self::BlockShoving(_) => EffectKind::BlockShoving,
            Self::MotionSmear(_) => EffectKind::MotionSmear,
            Self::Glitch(_) => EffectKind::Glitch,
            Self::BlockCorrupt(_) => EffectKind::BlockCorrupt,
            Self::Mesh3d(_) => EffectKind::Mesh3d,
        }
    }

    /// Parse a loose key/value map.
    ///
    /// Missing keys, values of the wrong type and non-finite numbers fall back to the
    /// kind's defaults; numeric ranges are clamped. Never fails.
    pub fn from_json(kind: EffectKind, params: &Value) -> Self {
        match kind {
            EffectKind::Datamosh => {
                let d = DatamoshParams::default();
                Self::Datamosh(DatamoshParams {
                    intensity: get_intensity(params, d.intensity),
                    source: get_source(params),
                })
            }
            EffectKind::BlockShoving => {
                let d = BlockShovingParams::default();
                let style = match get_str(params, "style") {
                    Some("fluid") => ShoveStyle::Fluid,
                    _ => ShoveStyle::Block,
                };
                Self::BlockShoving(BlockShovingParams {
                    style,
                    intensity: get_intensity(params, d.intensity),
                    block_size: get_block_size(params, d.block_size),
                    source: get_source(params),
                })
            }
            EffectKind::MotionSmear => {
                let d = MotionSmearParams::default();
                let mode = match get_str(params, "mode") {
                    Some("bloom") => SmearMode::Bloom,
                    _ => SmearMode::Melt,
                };
                Self::MotionSmear(MotionSmearParams {
                    mode,
                    intensity: get_intensity(params, d.intensity),
                    momentum: get_f32_or(params, "momentum", d.momentum).clamp(0.0, 1.0),
                    source: get_source(params),
                })
            }
            EffectKind::Glitch => {
                let d = GlitchParams::default();
                Self::Glitch(GlitchParams {
                    intensity: get_intensity(params, d.intensity),
                    speed: get_f32_or(params, "speed", d.speed).max(0.0),
                })
            }
            EffectKind::BlockCorrupt => {
                let d = BlockCorruptParams::default();
                Self::BlockCorrupt(BlockCorruptParams {
                    intensity: get_intensity(params, d.intensity),
                    block_size: get_block_size(params, d.block_size),
                })
            }
            EffectKind::Mesh3d => {
                let d = MeshParams::default();
                Self::Mesh3d(MeshParams {
                    displacement_scale: get_f32_or(
                        params,
                        "displacementScale",
                        d.displacement_scale,
                    ),
                    wireframe: params
                        .get("wireframe")
                        .and_then(Value::as_bool)
                        .unwrap_or(d.wireframe),
                })
            }
        }
    }

    /// The UI-facing key/value map for these parameters.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Datamosh(p) => json!({
                "intensity": p.intensity,
                "activeSource": p.source.active_source,
                "lastUpdate": p.source.last_update,
            }),
            Self::BlockShoving(p) => json!({
                "style": match p.style {
                    ShoveStyle::Block => "block",
                    ShoveStyle::Fluid => "fluid",
                },
                "intensity": p.intensity,
                "blockSize": p.block_size,
                "activeSource": p.source.active_source,
                "lastUpdate": p.source.last_update,
            }),
            Self::MotionSmear(p) => json!({
                "mode": match p.mode {
                    SmearMode::Melt => "melt",
                    SmearMode::Bloom => "bloom",
                },
                "intensity": p.intensity,
                "momentum": p.momentum,
                "activeSource": p.source.active_source,
                "lastUpdate": p.source.last_update,
            }),
            Self::Glitch(p) => json!({
                "intensity": p.intensity,
                "speed": p.speed,
            }),
            Self::BlockCorrupt(p) => json!({
                "intensity": p.intensity,
                "blockSize": p.block_size,
            }),
            Self::Mesh3d(p) => json!({
                "displacementScale": p.displacement_scale,
                "wireframe": p.wireframe,
            }),
        }
    }
}

fn get_f32_or(obj: &Value, key: &str, default: f32) -> f32 {
    obj.get(key)
        .and_then(Value::as_f64)
        .map(|v| v as f32)
        .filter(|v| v.is_finite())
        .unwrap_or(default)
}

fn get_i64_or(obj: &Value, key: &str, default: i64) -> i64 {
    let Some(v) = obj.get(key) else {
        return default;
    };
    if let Some(n) = v.as_i64() {
        return n;
    }
    match v.as_f64() {
        Some(f) if f.is_finite() => f.floor() as i64,
        _ => default,
    }
}

fn get_str<'a>(obj: &'a Value, key: &str) -> Option<&'a str> {
    obj.get(key).and_then(Value::as_str)
}

fn get_intensity(obj: &Value, default: f32) -> f32 {
    get_f32_or(obj, "intensity", default).clamp(0.0, 100.0)
}

/// `0`, negatives and junk mean "use the default".
fn get_block_size(obj: &Value, default: u32) -> u32 {
    let v = get_i64_or(obj, "blockSize", 0);
    if v <= 0 {
        default
    } else {
        u32::try_from(v).unwrap_or(default)
    }
}

fn get_source(obj: &Value) -> SourceSelect {
    let d = SourceSelect::default();
    let raw = get_i64_or(obj, "activeSource", i64::from(d.active_source));
    // An index past i32 can never resolve; it must not collapse onto the live feed.
    let active_source = i32::try_from(raw).unwrap_or(if raw < 0 { i32::MIN } else { i32::MAX });
    SourceSelect {
        active_source,
        last_update: get_i64_or(obj, "lastUpdate", d.last_update),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/params.rs"]
mod tests;
