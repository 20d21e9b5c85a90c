use ndarray::{Array1, Array2};
use thiserror::Error;

use super::geometry::GeometryData;
use super::set::SetData;
use super::tag::TypeTag;

/// Errors raised while constructing or combining data objects.
#[derive(Debug, Error)]
pub enum ObjectError {
    #[error("coordinate block must have shape (n, 3), got (_, {0})")]
    BadCoordinateShape(usize),

    #[error("dimensions {dims:?} imply {expected} coordinates, got {actual}")]
    DimensionMismatch {
        dims: [usize; 3],
        expected: usize,
        actual: usize,
    },

    #[error("{centers} sphere centers but {radii} radii")]
    SphereCountMismatch { centers: usize, radii: usize },

    #[error("corner index {index} out of range for {corners} corners")]
    ElementOutOfRange { index: usize, corners: usize },

    #[error("corner {index} references vertex {vertex}, but only {vertices} exist")]
    CornerOutOfRange {
        index: usize,
        vertex: usize,
        vertices: usize,
    },

    #[error("texture is {width}x{height} but carries {texels} texels")]
    TexelCountMismatch {
        width: usize,
        height: usize,
        texels: usize,
    },

    #[error("vector field must have shape (n, 3), got (_, {0})")]
    BadVectorShape(usize),

    #[error("a geometry composite requires a grid object, got a {0}")]
    NotAGrid(TypeTag),
}

/// A block of points in space, shape `(n, 3)`.
#[derive(Clone, Debug)]
pub struct PointBlock {
    coords: Array2<f32>,
}

impl PointBlock {
    pub fn new(coords: Array2<f32>) -> Result<Self, ObjectError> {
        if coords.ncols() != 3 {
            return Err(ObjectError::BadCoordinateShape(coords.ncols()));
        }
        Ok(Self { coords })
    }

    pub fn len(&self) -> usize {
        self.coords.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.nrows() == 0
    }

    pub fn coords(&self) -> &Array2<f32> {
        &self.coords
    }
}

/// A curvilinear grid: explicit coordinates on an `(i, j, k)` lattice.
#[derive(Clone, Debug)]
pub struct StructuredGridData {
    dims: [usize; 3],
    points: PointBlock,
}

impl StructuredGridData {
    pub fn new(dims: [usize; 3], coords: Array2<f32>) -> Result<Self, ObjectError> {
        let points = PointBlock::new(coords)?;
        let expected = dims.iter().product();
        if points.len() != expected {
            return Err(ObjectError::DimensionMismatch {
                dims,
                expected,
                actual: points.len(),
            });
        }
        Ok(Self { dims, points })
    }

    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    pub fn points(&self) -> &PointBlock {
        &self.points
    }
}

/// Cell-based grid: per-element offsets into a shared corner list.
#[derive(Clone, Debug)]
pub struct UnstructuredGridData {
    elements: Vec<usize>,
    corners: Vec<usize>,
    points: PointBlock,
}

impl UnstructuredGridData {
    pub fn new(
        elements: Vec<usize>,
        corners: Vec<usize>,
        coords: Array2<f32>,
    ) -> Result<Self, ObjectError> {
        let points = PointBlock::new(coords)?;
        for &start in &elements {
            if start > corners.len() {
                return Err(ObjectError::ElementOutOfRange {
                    index: start,
                    corners: corners.len(),
                });
            }
        }
        for (index, &vertex) in corners.iter().enumerate() {
            if vertex >= points.len() {
                return Err(ObjectError::CornerOutOfRange {
                    index,
                    vertex,
                    vertices: points.len(),
                });
            }
        }
        Ok(Self {
            elements,
            corners,
            points,
        })
    }

    pub fn num_elements(&self) -> usize {
        self.elements.len()
    }

    pub fn points(&self) -> &PointBlock {
        &self.points
    }
}

/// Axis-aligned grid with per-axis coordinate vectors.
#[derive(Clone, Debug)]
pub struct RectilinearGridData {
    pub x: Array1<f32>,
    pub y: Array1<f32>,
    pub z: Array1<f32>,
}

/// Axis-aligned grid with uniform spacing, stored as extents only.
#[derive(Clone, Copy, Debug)]
pub struct UniformGridData {
    pub dims: [usize; 3],
    pub min: [f32; 3],
    pub max: [f32; 3],
}

/// Sphere set: one center and radius per sphere.
#[derive(Clone, Debug)]
pub struct SpheresData {
    centers: PointBlock,
    radii: Array1<f32>,
}

impl SpheresData {
    pub fn new(centers: Array2<f32>, radii: Array1<f32>) -> Result<Self, ObjectError> {
        let centers = PointBlock::new(centers)?;
        if centers.len() != radii.len() {
            return Err(ObjectError::SphereCountMismatch {
                centers: centers.len(),
                radii: radii.len(),
            });
        }
        Ok(Self { centers, radii })
    }

    pub fn len(&self) -> usize {
        self.radii.len()
    }

    pub fn is_empty(&self) -> bool {
        self.radii.is_empty()
    }
}

/// Element/corner/coordinate layout shared by the line and polygon kinds.
#[derive(Clone, Debug)]
pub struct MeshData {
    elements: Vec<usize>,
    corners: Vec<usize>,
    points: PointBlock,
}

impl MeshData {
    pub fn new(
        elements: Vec<usize>,
        corners: Vec<usize>,
        coords: Array2<f32>,
    ) -> Result<Self, ObjectError> {
        let points = PointBlock::new(coords)?;
        for &start in &elements {
            if start > corners.len() {
                return Err(ObjectError::ElementOutOfRange {
                    index: start,
                    corners: corners.len(),
                });
            }
        }
        for (index, &vertex) in corners.iter().enumerate() {
            if vertex >= points.len() {
                return Err(ObjectError::CornerOutOfRange {
                    index,
                    vertex,
                    vertices: points.len(),
                });
            }
        }
        Ok(Self {
            elements,
            corners,
            points,
        })
    }

    pub fn num_elements(&self) -> usize {
        self.elements.len()
    }

    pub fn points(&self) -> &PointBlock {
        &self.points
    }
}

/// Pixel image plus per-vertex texture coordinates.
#[derive(Clone, Debug)]
pub struct TextureData {
    width: usize,
    height: usize,
    texels: Array1<u32>,
    tex_coords: Array2<f32>,
}

impl TextureData {
    pub fn new(
        width: usize,
        height: usize,
        texels: Array1<u32>,
        tex_coords: Array2<f32>,
    ) -> Result<Self, ObjectError> {
        if texels.len() != width * height {
            return Err(ObjectError::TexelCountMismatch {
                width,
                height,
                texels: texels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            texels,
            tex_coords,
        })
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }
}

/// The structural data carried by a [`DataObject`](super::DataObject), one
/// variant per [`TypeTag`].
///
/// Payloads are immutable after the owning object is created; only the
/// attribute map mutates afterwards.
#[derive(Clone, Debug)]
pub enum Payload {
    StructuredGrid(StructuredGridData),
    UnstructuredGrid(UnstructuredGridData),
    RectilinearGrid(RectilinearGridData),
    UniformGrid(UniformGridData),
    Points(PointBlock),
    Spheres(SpheresData),
    Lines(MeshData),
    Polygons(MeshData),
    Quads(MeshData),
    Triangles(MeshData),
    TriangleStrips(MeshData),
    Geometry(GeometryData),
    Set(SetData),
    Texture(TextureData),
    Byte(Array1<u8>),
    Float(Array1<f32>),
    Vec3(Array2<f32>),
    Rgba(Array1<u32>),
}

impl Payload {
    /// A `(n, 3)` vector field; the only payload constructor with a shape
    /// check that does not live on a dedicated data struct.
    pub fn vec3(field: Array2<f32>) -> Result<Self, ObjectError> {
        if field.ncols() != 3 {
            return Err(ObjectError::BadVectorShape(field.ncols()));
        }
        Ok(Payload::Vec3(field))
    }

    pub fn tag(&self) -> TypeTag {
        match self {
            Payload::StructuredGrid(_) => TypeTag::StructuredGrid,
            Payload::UnstructuredGrid(_) => TypeTag::UnstructuredGrid,
            Payload::RectilinearGrid(_) => TypeTag::RectilinearGrid,
            Payload::UniformGrid(_) => TypeTag::UniformGrid,
            Payload::Points(_) => TypeTag::Points,
            Payload::Spheres(_) => TypeTag::Spheres,
            Payload::Lines(_) => TypeTag::Lines,
            Payload::Polygons(_) => TypeTag::Polygons,
            Payload::Quads(_) => TypeTag::Quads,
            Payload::Triangles(_) => TypeTag::Triangles,
            Payload::TriangleStrips(_) => TypeTag::TriangleStrips,
            Payload::Geometry(_) => TypeTag::Geometry,
            Payload::Set(_) => TypeTag::Set,
            Payload::Texture(_) => TypeTag::Texture,
            Payload::Byte(_) => TypeTag::Byte,
            Payload::Float(_) => TypeTag::Float,
            Payload::Vec3(_) => TypeTag::Vec3,
            Payload::Rgba(_) => TypeTag::Rgba,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn structured_grid_checks_dims_against_coords() {
        let coords = Array2::zeros((8, 3));
        assert!(StructuredGridData::new([2, 2, 2], coords.clone()).is_ok());
        assert!(matches!(
            StructuredGridData::new([2, 2, 3], coords),
            Err(ObjectError::DimensionMismatch { expected: 12, .. })
        ));
    }

    #[test]
    fn points_reject_non_triplet_coords() {
        assert!(matches!(
            PointBlock::new(Array2::zeros((4, 2))),
            Err(ObjectError::BadCoordinateShape(2))
        ));
    }

    #[test]
    fn spheres_require_matching_radii() {
        let centers = array![[0.0f32, 0.0, 0.0], [1.0, 0.0, 0.0]];
        assert!(matches!(
            SpheresData::new(centers, array![1.0f32]),
            Err(ObjectError::SphereCountMismatch {
                centers: 2,
                radii: 1
            })
        ));
    }

    #[test]
    fn mesh_rejects_dangling_corners() {
        let coords = Array2::zeros((3, 3));
        let bad = MeshData::new(vec![0], vec![0, 1, 7], coords);
        assert!(matches!(
            bad,
            Err(ObjectError::CornerOutOfRange { vertex: 7, .. })
        ));
    }

    #[test]
    fn payload_tags_are_pattern_matched() {
        let field = Payload::vec3(Array2::zeros((5, 3))).unwrap();
        assert_eq!(field.tag(), TypeTag::Vec3);
        assert!(Payload::vec3(Array2::zeros((5, 2))).is_err());
    }
}
