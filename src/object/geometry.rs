use super::payload::ObjectError;
use super::tag::TagSet;
use crate::space::ObjectHandle;

/// A renderable composite: one grid plus optional auxiliary channels.
///
/// The grid is required and must carry one of the grid/mesh tags
/// ([`TagSet::GRIDS`]). Channels are attached by handle, which shares
/// ownership with the original producer; attaching a channel twice replaces
/// the previous handle for that slot.
#[derive(Clone, Debug)]
pub struct GeometryData {
    grid: ObjectHandle,
    colors: Option<ObjectHandle>,
    normals: Option<ObjectHandle>,
    texture: Option<ObjectHandle>,
    vertex_attribute: Option<ObjectHandle>,
}

impl GeometryData {
    pub fn new(grid: ObjectHandle) -> Result<Self, ObjectError> {
        if !TagSet::GRIDS.accepts(grid.tag()) {
            return Err(ObjectError::NotAGrid(grid.tag()));
        }
        Ok(Self {
            grid,
            colors: None,
            normals: None,
            texture: None,
            vertex_attribute: None,
        })
    }

    pub fn grid(&self) -> &ObjectHandle {
        &self.grid
    }

    pub fn colors(&self) -> Option<&ObjectHandle> {
        self.colors.as_ref()
    }

    pub fn normals(&self) -> Option<&ObjectHandle> {
        self.normals.as_ref()
    }

    pub fn texture(&self) -> Option<&ObjectHandle> {
        self.texture.as_ref()
    }

    pub fn vertex_attribute(&self) -> Option<&ObjectHandle> {
        self.vertex_attribute.as_ref()
    }

    pub fn attach_colors(&mut self, colors: &ObjectHandle) {
        self.colors = Some(colors.clone());
    }

    pub fn attach_normals(&mut self, normals: &ObjectHandle) {
        self.normals = Some(normals.clone());
    }

    pub fn attach_texture(&mut self, texture: &ObjectHandle) {
        self.texture = Some(texture.clone());
    }

    pub fn attach_vertex_attribute(&mut self, attribute: &ObjectHandle) {
        self.vertex_attribute = Some(attribute.clone());
    }

    /// The attached channels in declaration order, skipping absent ones.
    pub fn channels(&self) -> impl Iterator<Item = &ObjectHandle> {
        [
            self.colors.as_ref(),
            self.normals.as_ref(),
            self.texture.as_ref(),
            self.vertex_attribute.as_ref(),
        ]
        .into_iter()
        .flatten()
    }

    pub fn num_channels(&self) -> usize {
        self.channels().count()
    }
}
