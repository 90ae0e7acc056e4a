//! What one WGSL stage reads and writes, as reported by naga.

use naga::valid::{Capabilities, ValidationFlags, Validator};
use naga::{
    AddressSpace, Binding, Handle, ImageClass, ImageDimension, Module, Scalar, ScalarKind, Type, TypeInner,
    VectorSize,
};

use crate::device::{ShaderStage, UniformValue};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct StageReflection {
    pub stage: ShaderStage,
    pub entry_point: String,
    /// `@location` inputs of the entry point, ascending.
    pub inputs: Vec<u32>,
    /// `@location` outputs of the entry point, ascending.
    pub outputs: Vec<u32>,
    pub resources: Vec<Resource>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Resource {
    pub name: String,
    pub group: u32,
    pub binding: u32,
    pub kind: ResourceKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ResourceKind {
    /// `var<uniform>`; struct members are listed in `fields`, a plain value has
    /// none and is described by `ty`.
    Uniform {
        size: u32,
        ty: UniformType,
        fields: Vec<UniformField>,
    },
    /// `texture_2d<f32>`.
    Texture,
    /// Filtering `sampler`.
    Sampler,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct UniformField {
    pub name: String,
    pub offset: u32,
    pub size: u32,
    pub ty: UniformType,
}

/// Shape of a uniform value, as far as a [`UniformValue`] can fill it.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum UniformType {
    Int,
    Uint,
    Float,
    Vec2,
    Vec3,
    Vec4,
    Mat4,
    /// Structs, arrays, f16 and other shapes no value writes.
    Opaque,
}

impl UniformType {
    pub(crate) fn of(inner: &TypeInner) -> Self {
        const F32: Scalar = Scalar {
            kind: ScalarKind::Float,
            width: 4,
        };
        match *inner {
            TypeInner::Scalar(Scalar {
                kind: ScalarKind::Sint,
                width: 4,
            }) => UniformType::Int,
            TypeInner::Scalar(Scalar {
                kind: ScalarKind::Uint,
                width: 4,
            }) => UniformType::Uint,
            TypeInner::Scalar(s) if s == F32 => UniformType::Float,
            TypeInner::Vector { size, scalar } if scalar == F32 => match size {
                VectorSize::Bi => UniformType::Vec2,
                VectorSize::Tri => UniformType::Vec3,
                VectorSize::Quad => UniformType::Vec4,
            },
            TypeInner::Matrix {
                columns: VectorSize::Quad,
                rows: VectorSize::Quad,
                scalar,
            } if scalar == F32 => UniformType::Mat4,
            _ => UniformType::Opaque,
        }
    }

    /// Whether `value` has this shape. A `u32` takes a non-negative `Int`.
    pub(crate) fn accepts(self, value: &UniformValue) -> bool {
        match (self, value) {
            (UniformType::Int, UniformValue::Int(_)) => true,
            (UniformType::Uint, UniformValue::Int(v)) => *v >= 0,
            (UniformType::Float, UniformValue::Float(_))
            | (UniformType::Vec2, UniformValue::Vec2(_))
            | (UniformType::Vec3, UniformValue::Vec3(_))
            | (UniformType::Vec4, UniformValue::Vec4(_))
            | (UniformType::Mat4, UniformValue::Mat4(_)) => true,
            _ => false,
        }
    }
}

/// Parses, validates and reflects `source` as `stage`. Errors are human-readable
/// diagnostics with source excerpts.
pub(crate) fn reflect(stage: ShaderStage, source: &str) -> Result<StageReflection, String> {
    let module = naga::front::wgsl::parse_str(source).map_err(|e| e.emit_to_string(source))?;
    Validator::new(ValidationFlags::all(), Capabilities::empty())
        .validate(&module)
        .map_err(|e| e.emit_to_string(source))?;

    let wanted = match stage {
        ShaderStage::Vertex => naga::ShaderStage::Vertex,
        ShaderStage::Fragment => naga::ShaderStage::Fragment,
    };
    let mut entries = module.entry_points.iter().filter(|ep| ep.stage == wanted);
    let entry = entries
        .next()
        .ok_or_else(|| format!("no @{stage} entry point"))?;
    if entries.next().is_some() {
        return Err(format!("more than one @{stage} entry point"));
    }

    let mut inputs = Vec::new();
    for arg in &entry.function.arguments {
        collect_locations(&module, arg.ty, arg.binding.as_ref(), &mut inputs);
    }
    let mut outputs = Vec::new();
    if let Some(result) = &entry.function.result {
        collect_locations(&module, result.ty, result.binding.as_ref(), &mut outputs);
    }
    inputs.sort_unstable();
    outputs.sort_unstable();

    Ok(StageReflection {
        stage,
        entry_point: entry.name.clone(),
        inputs,
        outputs,
        resources: resources(&module)?,
    })
}

fn collect_locations(module: &Module, ty: Handle<Type>, binding: Option<&Binding>, out: &mut Vec<u32>) {
    match binding {
        Some(Binding::Location { location, .. }) => out.push(*location),
        Some(Binding::BuiltIn(_)) => {}
        None => {
            if let TypeInner::Struct { members, .. } = &module.types[ty].inner {
                for member in members {
                    collect_locations(module, member.ty, member.binding.as_ref(), out);
                }
            }
        }
    }
}

fn resources(module: &Module) -> Result<Vec<Resource>, String> {
    let mut out = Vec::new();
    for (_, var) in module.global_variables.iter() {
        let Some(rb) = &var.binding else { continue };
        let name = var.name.clone().ok_or_else(|| {
            format!("resource at @group({}) @binding({}) has no name", rb.group, rb.binding)
        })?;
        let inner = &module.types[var.ty].inner;

        let kind = match var.space {
            AddressSpace::Uniform => {
                let size = inner.size(module.to_ctx());
                let fields = match inner {
                    TypeInner::Struct { members, .. } => members
                        .iter()
                        .filter_map(|m| {
                            Some(UniformField {
                                name: m.name.clone()?,
                                offset: m.offset,
                                size: module.types[m.ty].inner.size(module.to_ctx()),
                                ty: UniformType::of(&module.types[m.ty].inner),
                            })
                        })
                        .collect(),
                    _ => Vec::new(),
                };
                ResourceKind::Uniform {
                    size,
                    ty: UniformType::of(inner),
                    fields,
                }
            }
            AddressSpace::Handle => match inner {
                TypeInner::Image {
                    dim: ImageDimension::D2,
                    arrayed: false,
                    class: ImageClass::Sampled {
                        kind: ScalarKind::Float,
                        multi: false,
                    },
                } => ResourceKind::Texture,
                TypeInner::Sampler { comparison: false } => ResourceKind::Sampler,
                _ => {
                    return Err(format!(
                        "`{name}`: only texture_2d<f32> and sampler resources are supported"
                    ));
                }
            },
            other => return Err(format!("`{name}`: unsupported address space {other:?}")),
        };

        out.push(Resource {
            name,
            group: rb.group,
            binding: rb.binding,
            kind,
        });
    }
    Ok(out)
}
