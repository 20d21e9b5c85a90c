//! Combine a grid with normals, colors, textures and vertex attributes into
//! one geometry object for rendering.

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::module::{
    ComputeError, Module, ModuleContext, ModuleInfo, ModuleKind, MODULE_KINDS,
};
use crate::object::attributes::{
    format_bounding_box, parse_attribute_list, ATTR_BOUNDING_BOX, ATTR_MATERIAL, ATTR_MODULE,
    ATTR_OBJECTNAME, ATTR_VARIANT,
};
use crate::object::{GeometryData, Payload, TagSet};
use crate::port::{InputPort, OutputPort};
use crate::space::ObjectHandle;

const GRID: usize = 0;
const COLORS: usize = 1;
const NORMALS: usize = 2;
const TEXTURE: usize = 3;
const VERTEX: usize = 4;

/// Parameters of the [`Collect`] module.
///
/// `material`, when set, switches the module into material mode: the grid is
/// deep-copied and the whole result tree is stamped with a `MATERIAL`
/// attribute for the renderer.
#[derive(Clone, Debug, Default, Serialize, Deserialize, Builder)]
#[builder(default)]
pub struct CollectParams {
    /// Name of the variant; stamped as `VARIANT` (possibly empty).
    pub variant: String,
    /// Free-form attributes, `"name=value;name2=value2;..."`.
    pub attributes: String,
    /// Minimum bound; together with `max_bound` forms `BOUNDING_BOX`.
    pub min_bound: [f32; 3],
    /// Maximum bound; all axes equal to `min_bound` means "no explicit bound".
    pub max_bound: [f32; 3],
    /// Material definition for the renderer.
    pub material: Option<String>,
}

pub struct Collect {
    info: ModuleInfo,
    params: CollectParams,
    inputs: Vec<InputPort>,
    outputs: Vec<OutputPort>,
}

impl Collect {
    pub fn new(params: CollectParams) -> Self {
        let info = ModuleInfo::new("Collect");
        let inputs = vec![
            InputPort::new("GridIn0", TagSet::GRIDS, "Grid"),
            InputPort::new(
                "DataIn0",
                TagSet::COLORS,
                "Colors or Scalar Data for Volume Visualization",
            )
            .optional(),
            InputPort::new("DataIn1", TagSet::VEC3, "Normals").optional(),
            InputPort::new("TextureIn0", TagSet::TEXTURE, "Textures").optional(),
            InputPort::new(
                "VertexAttribIn0",
                TagSet::VEC3 | TagSet::FLOAT,
                "Vertex Attribute 0",
            )
            .optional(),
        ];
        let outputs = vec![OutputPort::new(
            &info,
            "GeometryOut0",
            TagSet::GEOMETRY,
            "combined object",
        )
        .with_dependency("GridIn0")];
        Self {
            info,
            params,
            inputs,
            outputs,
        }
    }

    pub fn params(&self) -> &CollectParams {
        &self.params
    }

    pub fn set_params(&mut self, params: CollectParams) {
        self.params = params;
    }

    /// Resolves the `OBJECTNAME` attribute by priority: user-chosen title,
    /// then the grid's inherited attribute, then a non-empty variant.
    fn object_name_attribute(&self, grid: &ObjectHandle) -> Option<String> {
        if !self.info.title_is_default() {
            Some(self.info.title().to_string())
        } else if let Some(inherited) = grid.attribute(ATTR_OBJECTNAME) {
            Some(inherited)
        } else if !self.params.variant.is_empty() {
            Some(self.params.variant.clone())
        } else {
            None
        }
    }
}

impl Default for Collect {
    fn default() -> Self {
        Self::new(CollectParams::default())
    }
}

/// Stamps `MATERIAL` onto an object and, for sets, every child below it.
fn stamp_material(object: &ObjectHandle, material: &str) {
    if let Some(set) = object.as_set() {
        for child in set.children() {
            stamp_material(child, material);
        }
    }
    object.add_attribute(ATTR_MATERIAL, material);
}

impl Module for Collect {
    fn info(&self) -> &ModuleInfo {
        &self.info
    }

    fn info_mut(&mut self) -> &mut ModuleInfo {
        &mut self.info
    }

    fn inputs(&self) -> &[InputPort] {
        &self.inputs
    }

    fn inputs_mut(&mut self) -> &mut [InputPort] {
        &mut self.inputs
    }

    fn outputs(&self) -> &[OutputPort] {
        &self.outputs
    }

    fn compute(&mut self, ctx: &ModuleContext) -> Result<(), ComputeError> {
        let grid_in = self.inputs[GRID]
            .current()
            .ok_or_else(|| ComputeError::MissingInput("GridIn0".into()))?;
        let colors = self.inputs[COLORS].current();
        let normals = self.inputs[NORMALS].current();
        let texture = self.inputs[TEXTURE].current();
        let vertex = self.inputs[VERTEX].current();

        let out_name = self.outputs[0].object_name().to_string();

        // Material mode works on a private copy of the grid tree; otherwise
        // the grid is re-used as-is.
        let grid = if self.params.material.is_some() {
            ctx.space()
                .clone_object(&grid_in, format!("{}_1", out_name))?
        } else {
            grid_in
        };

        let mut composite = GeometryData::new(grid.clone())?;
        if let Some(colors) = &colors {
            composite.attach_colors(colors);
        }
        if let Some(texture) = &texture {
            composite.attach_texture(texture);
        }
        if let Some(normals) = &normals {
            composite.attach_normals(normals);
        }
        if let Some(vertex) = &vertex {
            composite.attach_vertex_attribute(vertex);
        }

        let geometry = ctx.space().create(&out_name, Payload::Geometry(composite))?;

        if let Some(bounds) =
            format_bounding_box(self.params.min_bound, self.params.max_bound)
        {
            geometry.add_attribute(ATTR_BOUNDING_BOX, bounds);
        }
        if !self.params.attributes.is_empty() {
            geometry.add_attributes(parse_attribute_list(&self.params.attributes));
        }

        geometry.add_attribute(ATTR_VARIANT, self.params.variant.clone());
        if !self.params.variant.is_empty() {
            geometry.add_attribute(ATTR_MODULE, "Variant");
        }

        if let Some(object_name) = self.object_name_attribute(&grid) {
            geometry.add_attribute(ATTR_OBJECTNAME, object_name);
        }

        if let Some(material) = &self.params.material {
            let definition = format!("MAT: {}", material);
            stamp_material(&geometry, &definition);
            stamp_material(&grid, &definition);
        }

        self.outputs[0].publish(geometry)?;
        Ok(())
    }
}

fn instantiate() -> Box<dyn Module> {
    Box::<Collect>::default()
}

#[linkme::distributed_slice(MODULE_KINDS)]
static COLLECT_KIND: ModuleKind = ModuleKind {
    name: "Collect",
    category: "Tools",
    description: "Combine grid, normals, colors, textures and vertex \
                  attributes in one data object for rendering",
    instantiate,
};
