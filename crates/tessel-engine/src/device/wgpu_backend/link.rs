//! Merging two reflected stages into one program interface.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashMap};

use crate::device::{ProgramInterface, ShaderStage, UniformValue};

use super::reflect::{Resource, ResourceKind, StageReflection, UniformType};

/// A uniform buffer shared by the program's stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct UniformBlock {
    pub name: String,
    pub group: u32,
    pub binding: u32,
    pub size: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TextureBinding {
    pub name: String,
    pub group: u32,
    pub binding: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SamplerBinding {
    pub group: u32,
    pub binding: u32,
    /// Index into `LinkedInterface::textures` of the texture this sampler belongs to.
    pub texture: Option<usize>,
}

/// Where a uniform location writes.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum LocationTarget {
    /// A byte range of a uniform block.
    Bytes {
        block: usize,
        offset: u32,
        size: u32,
        ty: UniformType,
    },
    /// The slot a texture reads.
    TextureSlot { texture: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LinkedInterface {
    pub inputs: Vec<u32>,
    pub blocks: Vec<UniformBlock>,
    pub textures: Vec<TextureBinding>,
    pub samplers: Vec<SamplerBinding>,
    /// Indexed by raw uniform location.
    pub locations: Vec<LocationTarget>,
    pub names: HashMap<String, usize>,
    /// Highest bind group index used, plus one.
    pub group_count: u32,
}

impl LinkedInterface {
    pub(crate) fn program_interface(&self) -> ProgramInterface {
        let mut uniforms: Vec<String> = self
            .names
            .iter()
            .filter(|(_, i)| matches!(self.locations[**i], LocationTarget::Bytes { .. }))
            .map(|(name, _)| name.clone())
            .collect();
        uniforms.sort();
        ProgramInterface {
            inputs: self.inputs.clone(),
            samplers: self.textures.iter().map(|t| t.name.clone()).collect(),
            uniforms,
        }
    }
}

/// Checks that `fragment` only reads what `vertex` writes and that the two stages
/// agree on every shared binding, then lays out uniform locations.
pub(crate) fn link(vertex: &StageReflection, fragment: &StageReflection) -> Result<LinkedInterface, String> {
    if vertex.stage != ShaderStage::Vertex || fragment.stage != ShaderStage::Fragment {
        return Err("a program needs one vertex and one fragment stage".to_string());
    }

    if !fragment.outputs.contains(&0) {
        return Err("fragment stage writes no color to @location(0)".to_string());
    }

    let unwritten: Vec<u32> = fragment
        .inputs
        .iter()
        .copied()
        .filter(|l| !vertex.outputs.contains(l))
        .collect();
    if !unwritten.is_empty() {
        return Err(format!(
            "fragment inputs at @location {unwritten:?} are not written by the vertex stage"
        ));
    }

    let mut merged: BTreeMap<(u32, u32), &Resource> = BTreeMap::new();
    for res in vertex.resources.iter().chain(&fragment.resources) {
        match merged.entry((res.group, res.binding)) {
            Entry::Occupied(existing) if *existing.get() != res => {
                return Err(format!(
                    "@group({}) @binding({}) is `{}` in one stage and `{}` in the other",
                    res.group,
                    res.binding,
                    existing.get().name,
                    res.name
                ));
            }
            Entry::Occupied(_) => {}
            Entry::Vacant(slot) => {
                slot.insert(res);
            }
        }
    }

    let mut linked = LinkedInterface {
        inputs: vertex.inputs.clone(),
        blocks: Vec::new(),
        textures: Vec::new(),
        samplers: Vec::new(),
        locations: Vec::new(),
        names: HashMap::new(),
        group_count: merged.keys().map(|(g, _)| g + 1).max().unwrap_or(0),
    };

    for res in merged.values() {
        match &res.kind {
            ResourceKind::Uniform { size, ty, fields } => {
                let block = linked.blocks.len();
                linked.blocks.push(UniformBlock {
                    name: res.name.clone(),
                    group: res.group,
                    binding: res.binding,
                    size: *size,
                });
                if fields.is_empty() {
                    let target = LocationTarget::Bytes {
                        block,
                        offset: 0,
                        size: *size,
                        ty: *ty,
                    };
                    linked.add_location(&res.name, target)?;
                }
                for field in fields {
                    let target = LocationTarget::Bytes {
                        block,
                        offset: field.offset,
                        size: field.size,
                        ty: field.ty,
                    };
                    linked.add_location(&format!("{}.{}", res.name, field.name), target)?;
                    if !linked.names.contains_key(&field.name) {
                        linked.add_location(&field.name, target)?;
                    }
                }
            }
            ResourceKind::Texture => {
                let texture = linked.textures.len();
                linked.textures.push(TextureBinding {
                    name: res.name.clone(),
                    group: res.group,
                    binding: res.binding,
                });
                linked.add_location(&res.name, LocationTarget::TextureSlot { texture })?;
            }
            ResourceKind::Sampler => {}
        }
    }

    for res in merged.values().filter(|r| r.kind == ResourceKind::Sampler) {
        let texture = linked
            .textures
            .iter()
            .position(|t| format!("{}_sampler", t.name) == res.name);
        linked.samplers.push(SamplerBinding {
            group: res.group,
            binding: res.binding,
            texture,
        });
    }
    for (i, texture) in linked.textures.iter().enumerate() {
        if !linked.samplers.iter().any(|s| s.texture == Some(i)) {
            return Err(format!(
                "texture `{0}` has no sampler; declare `var {0}_sampler: sampler`",
                texture.name
            ));
        }
    }

    Ok(linked)
}

impl LinkedInterface {
    fn add_location(&mut self, name: &str, target: LocationTarget) -> Result<(), String> {
        if self.names.contains_key(name) {
            return Err(format!("`{name}` names more than one uniform"));
        }
        self.names.insert(name.to_string(), self.locations.len());
        self.locations.push(target);
        Ok(())
    }
}

/// Writes `value` into a block's CPU copy at `offset`. Values of another shape, or
/// ranges past the block, leave `shadow` untouched.
pub(crate) fn place_uniform(
    shadow: &mut [u8],
    offset: u32,
    ty: UniformType,
    value: &UniformValue,
) -> Result<(), String> {
    if !ty.accepts(value) {
        return Err(format!("{value:?} does not fit a {ty:?} uniform"));
    }
    let bytes = value.to_bytes();
    let start = offset as usize;
    let range = start
        .checked_add(bytes.len())
        .and_then(|end| shadow.get_mut(start..end))
        .ok_or_else(|| format!("{} bytes at offset {offset} run past the block", bytes.len()))?;
    range.copy_from_slice(&bytes);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::wgpu_backend::reflect::reflect;

    const VERTEX: &str = r#"
struct VertexOut {
    @builtin(position) clip: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_main(@location(0) pos: vec2<f32>, @location(1) uv: vec2<f32>) -> VertexOut {
    var out: VertexOut;
    out.clip = vec4<f32>(pos, 0.0, 1.0);
    out.uv = uv;
    return out;
}
"#;

    const FRAGMENT: &str = r#"
struct Params {
    mix_amount: f32,
};

@group(0) @binding(0) var texture1: texture_2d<f32>;
@group(0) @binding(1) var texture1_sampler: sampler;
@group(0) @binding(2) var texture2: texture_2d<f32>;
@group(0) @binding(3) var texture2_sampler: sampler;
@group(1) @binding(0) var<uniform> params: Params;

@fragment
fn fs_main(@location(0) uv: vec2<f32>) -> @location(0) vec4<f32> {
    let a = textureSample(texture1, texture1_sampler, uv);
    let b = textureSample(texture2, texture2_sampler, uv);
    return mix(a, b, params.mix_amount);
}
"#;

    fn stages(vs: &str, fs: &str) -> (StageReflection, StageReflection) {
        (
            reflect(ShaderStage::Vertex, vs).unwrap(),
            reflect(ShaderStage::Fragment, fs).unwrap(),
        )
    }

    // ── accepted programs ────────────────────────────────────────────────

    #[test]
    fn textured_program_interface() {
        let (vs, fs) = stages(VERTEX, FRAGMENT);
        let linked = link(&vs, &fs).unwrap();
        assert_eq!(linked.group_count, 2);

        let iface = linked.program_interface();
        assert_eq!(iface.inputs, vec![0, 1]);
        assert_eq!(iface.samplers, vec!["texture1".to_string(), "texture2".to_string()]);
        assert_eq!(iface.uniforms, vec!["mix_amount".to_string(), "params.mix_amount".to_string()]);
        assert_eq!(linked.samplers.iter().map(|s| s.texture).collect::<Vec<_>>(), vec![Some(0), Some(1)]);
    }

    #[test]
    fn short_and_qualified_names_share_a_target() {
        let (vs, fs) = stages(VERTEX, FRAGMENT);
        let linked = link(&vs, &fs).unwrap();
        let short = linked.locations[linked.names["mix_amount"]];
        let long = linked.locations[linked.names["params.mix_amount"]];
        assert_eq!(short, long);
        assert_eq!(
            short,
            LocationTarget::Bytes {
                block: 0,
                offset: 0,
                size: 4,
                ty: UniformType::Float
            }
        );
    }

    // ── uniform writes ───────────────────────────────────────────────────

    #[test]
    fn value_lands_at_its_member_offset() {
        let mut shadow = vec![0u8; 32];
        place_uniform(&mut shadow, 16, UniformType::Vec4, &UniformValue::Vec4([1.0, 2.0, 3.0, 4.0])).unwrap();
        assert!(shadow[..16].iter().all(|&b| b == 0));
        assert_eq!(&shadow[16..20], &1.0f32.to_le_bytes());
        assert_eq!(&shadow[28..32], &4.0f32.to_le_bytes());
    }

    #[test]
    fn int_into_float_member_is_refused() {
        let mut shadow = 0.2f32.to_le_bytes().to_vec();
        let err = place_uniform(&mut shadow, 0, UniformType::Float, &UniformValue::Int(1)).unwrap_err();
        assert!(err.contains("Float"), "{err}");
        assert_eq!(shadow, 0.2f32.to_le_bytes().to_vec());
    }

    #[test]
    fn write_past_the_block_is_refused() {
        let mut shadow = vec![0u8; 16];
        assert!(place_uniform(&mut shadow, 12, UniformType::Vec2, &UniformValue::Vec2([1.0; 2])).is_err());
        assert!(place_uniform(&mut shadow, u32::MAX, UniformType::Float, &UniformValue::Float(1.0)).is_err());
        assert!(shadow.iter().all(|&b| b == 0));
    }

    // ── rejected programs ────────────────────────────────────────────────

    #[test]
    fn fragment_input_must_be_written() {
        let fs = r#"
@fragment
fn fs_main(@location(3) shade: f32) -> @location(0) vec4<f32> {
    return vec4<f32>(shade);
}
"#;
        let (vs, fs) = stages(VERTEX, fs);
        let err = link(&vs, &fs).unwrap_err();
        assert!(err.contains("[3]"), "{err}");
    }

    #[test]
    fn fragment_must_write_a_color() {
        let fs = r#"
@fragment
fn fs_main(@location(0) uv: vec2<f32>) {
}
"#;
        let (vs, fs) = stages(VERTEX, fs);
        let err = link(&vs, &fs).unwrap_err();
        assert!(err.contains("@location(0)"), "{err}");
    }

    #[test]
    fn texture_without_sampler() {
        let fs = r#"
@group(0) @binding(0) var lonely: texture_2d<f32>;
@group(0) @binding(1) var other: sampler;

@fragment
fn fs_main(@location(0) uv: vec2<f32>) -> @location(0) vec4<f32> {
    return textureSample(lonely, other, uv);
}
"#;
        let (vs, fs) = stages(VERTEX, fs);
        let err = link(&vs, &fs).unwrap_err();
        assert!(err.contains("lonely_sampler"), "{err}");
    }

    #[test]
    fn conflicting_bindings() {
        let vs = r#"
struct Camera { scale: f32 };
@group(0) @binding(0) var<uniform> camera: Camera;

struct VertexOut {
    @builtin(position) clip: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_main(@location(0) pos: vec2<f32>) -> VertexOut {
    var out: VertexOut;
    out.clip = vec4<f32>(pos * camera.scale, 0.0, 1.0);
    out.uv = pos;
    return out;
}
"#;
        let (vs, fs) = stages(vs, FRAGMENT);
        let err = link(&vs, &fs).unwrap_err();
        assert!(err.contains("@group(0) @binding(0)"), "{err}");
    }

    #[test]
    fn stages_in_the_wrong_order() {
        let (vs, fs) = stages(VERTEX, FRAGMENT);
        assert!(link(&fs, &vs).is_err());
    }
}
