//! WGSL front-end: parse, validate and describe a stage's interface.
//!
//! The driver seam resolves attributes and uniforms by name; WGSL binds them
//! by `@location`/`@binding`. Reflection bridges the two.

use naga::valid::{Capabilities, ValidationFlags, Validator};

use super::ShaderStage;

/// A location-bound stage input or output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Varying {
    pub name: String,
    pub location: u32,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum ResourceKind {
    Texture,
    Sampler,
    Other,
}

/// A `@group/@binding` module-scope resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Resource {
    pub name: String,
    pub group: u32,
    pub binding: u32,
    pub kind: ResourceKind,
}

/// What a compiled stage consumes and produces.
#[derive(Debug, Clone)]
pub(crate) struct StageInterface {
    pub entry_point: String,
    pub inputs: Vec<Varying>,
    pub outputs: Vec<Varying>,
    pub resources: Vec<Resource>,
}

impl StageInterface {
    pub fn input(&self, name: &str) -> Option<u32> {
        self.inputs.iter().find(|v| v.name == name).map(|v| v.location)
    }

    pub fn resource(&self, name: &str) -> Option<&Resource> {
        self.resources.iter().find(|r| r.name == name)
    }
}

/// Parses and validates `source`, returning the module and the interface of
/// its `stage` entry point. Errors are rendered diagnostics.
pub(crate) fn compile_wgsl(
    stage: ShaderStage,
    source: &str,
) -> Result<(naga::Module, StageInterface), String> {
    let module = naga::front::wgsl::parse_str(source).map_err(|e| e.emit_to_string(source))?;

    Validator::new(ValidationFlags::all(), Capabilities::empty())
        .validate(&module)
        .map_err(|e| e.emit_to_string(source))?;

    let interface = describe(&module, stage)?;
    Ok((module, interface))
}

fn describe(module: &naga::Module, stage: ShaderStage) -> Result<StageInterface, String> {
    let naga_stage = match stage {
        ShaderStage::Vertex => naga::ShaderStage::Vertex,
        ShaderStage::Fragment => naga::ShaderStage::Fragment,
    };

    let mut entry_points = module.entry_points.iter().filter(|ep| ep.stage == naga_stage);
    let ep = entry_points
        .next()
        .ok_or_else(|| format!("no {stage} entry point"))?;
    if entry_points.next().is_some() {
        return Err(format!("more than one {stage} entry point"));
    }

    let mut inputs = Vec::new();
    for arg in &ep.function.arguments {
        collect_locations(module, arg.name.as_deref(), arg.ty, arg.binding.as_ref(), &mut inputs);
    }

    let mut outputs = Vec::new();
    if let Some(result) = &ep.function.result {
        collect_locations(module, None, result.ty, result.binding.as_ref(), &mut outputs);
    }

    let resources = module
        .global_variables
        .iter()
        .filter_map(|(_, var)| {
            let binding = var.binding.as_ref()?;
            let kind = match module.types[var.ty].inner {
                naga::TypeInner::Image { .. } => ResourceKind::Texture,
                naga::TypeInner::Sampler { .. } => ResourceKind::Sampler,
                _ => ResourceKind::Other,
            };
            Some(Resource {
                name: var.name.clone().unwrap_or_default(),
                group: binding.group,
                binding: binding.binding,
                kind,
            })
        })
        .collect();

    Ok(StageInterface {
        entry_point: ep.name.clone(),
        inputs,
        outputs,
        resources,
    })
}

/// Flattens an argument/result into its `@location` members. Builtins are skipped.
fn collect_locations(
    module: &naga::Module,
    name: Option<&str>,
    ty: naga::Handle<naga::Type>,
    binding: Option<&naga::Binding>,
    out: &mut Vec<Varying>,
) {
    match binding {
        Some(naga::Binding::Location { location, .. }) => out.push(Varying {
            name: name.unwrap_or_default().to_string(),
            location: *location,
        }),
        Some(naga::Binding::BuiltIn(_)) => {}
        None => {
            if let naga::TypeInner::Struct { members, .. } = &module.types[ty].inner {
                for m in members {
                    collect_locations(module, m.name.as_deref(), m.ty, m.binding.as_ref(), out);
                }
            }
        }
    }
}

/// Every fragment input must be written by the vertex stage at the same location.
pub(crate) fn check_interface(
    vertex: &StageInterface,
    fragment: &StageInterface,
) -> Result<(), String> {
    for input in &fragment.inputs {
        if !vertex.outputs.iter().any(|o| o.location == input.location) {
            return Err(format!(
                "fragment input `{}` at location {} is not written by the vertex stage",
                input.name, input.location
            ));
        }
    }
    Ok(())
}
