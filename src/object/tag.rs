use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The closed set of object kinds exchanged between modules.
///
/// Every [`Payload`](super::Payload) maps to exactly one tag; ports declare
/// which tags they accept via [`TagSet`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeTag {
    StructuredGrid,
    UnstructuredGrid,
    RectilinearGrid,
    UniformGrid,
    Points,
    Spheres,
    Lines,
    Polygons,
    Quads,
    Triangles,
    TriangleStrips,
    Geometry,
    Set,
    Texture,
    Byte,
    Float,
    Vec3,
    Rgba,
}

impl TypeTag {
    /// All tags, in declaration order.
    pub const ALL: [TypeTag; 18] = [
        TypeTag::StructuredGrid,
        TypeTag::UnstructuredGrid,
        TypeTag::RectilinearGrid,
        TypeTag::UniformGrid,
        TypeTag::Points,
        TypeTag::Spheres,
        TypeTag::Lines,
        TypeTag::Polygons,
        TypeTag::Quads,
        TypeTag::Triangles,
        TypeTag::TriangleStrips,
        TypeTag::Geometry,
        TypeTag::Set,
        TypeTag::Texture,
        TypeTag::Byte,
        TypeTag::Float,
        TypeTag::Vec3,
        TypeTag::Rgba,
    ];

    /// The name used in textual port declarations.
    pub const fn name(&self) -> &'static str {
        match self {
            TypeTag::StructuredGrid => "StructuredGrid",
            TypeTag::UnstructuredGrid => "UnstructuredGrid",
            TypeTag::RectilinearGrid => "RectilinearGrid",
            TypeTag::UniformGrid => "UniformGrid",
            TypeTag::Points => "Points",
            TypeTag::Spheres => "Spheres",
            TypeTag::Lines => "Lines",
            TypeTag::Polygons => "Polygons",
            TypeTag::Quads => "Quads",
            TypeTag::Triangles => "Triangles",
            TypeTag::TriangleStrips => "TriangleStrips",
            TypeTag::Geometry => "Geometry",
            TypeTag::Set => "Set",
            TypeTag::Texture => "Texture",
            TypeTag::Byte => "Byte",
            TypeTag::Float => "Float",
            TypeTag::Vec3 => "Vec3",
            TypeTag::Rgba => "RGBA",
        }
    }
}

impl std::fmt::Display for TypeTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for TypeTag {
    type Err = TagParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TypeTag::ALL
            .into_iter()
            .find(|tag| tag.name() == s)
            .ok_or_else(|| TagParseError::UnknownType(s.to_string()))
    }
}

/// Failure to parse a type name or a pipe-separated acceptance list.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TagParseError {
    /// The name does not match any known object type.
    #[error("unknown object type {0:?}")]
    UnknownType(String),

    /// The acceptance list was empty.
    #[error("empty type list")]
    Empty,
}

bitflags::bitflags! {
    /// A set of accepted [`TypeTag`]s, used as a port's type predicate.
    ///
    /// Combine with bitwise OR: `TagSet::VEC3 | TagSet::FLOAT`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct TagSet: u32 {
        const STRUCTURED_GRID = 1 << 0;
        const UNSTRUCTURED_GRID = 1 << 1;
        const RECTILINEAR_GRID = 1 << 2;
        const UNIFORM_GRID = 1 << 3;
        const POINTS = 1 << 4;
        const SPHERES = 1 << 5;
        const LINES = 1 << 6;
        const POLYGONS = 1 << 7;
        const QUADS = 1 << 8;
        const TRIANGLES = 1 << 9;
        const TRIANGLE_STRIPS = 1 << 10;
        const GEOMETRY = 1 << 11;
        const SET = 1 << 12;
        const TEXTURE = 1 << 13;
        const BYTE = 1 << 14;
        const FLOAT = 1 << 15;
        const VEC3 = 1 << 16;
        const RGBA = 1 << 17;
    }
}

impl TagSet {
    /// Every grid and mesh kind that can anchor a geometry composite.
    pub const GRIDS: TagSet = TagSet::STRUCTURED_GRID
        .union(TagSet::UNSTRUCTURED_GRID)
        .union(TagSet::RECTILINEAR_GRID)
        .union(TagSet::UNIFORM_GRID)
        .union(TagSet::POINTS)
        .union(TagSet::SPHERES)
        .union(TagSet::LINES)
        .union(TagSet::POLYGONS)
        .union(TagSet::QUADS)
        .union(TagSet::TRIANGLES)
        .union(TagSet::TRIANGLE_STRIPS);

    /// Data kinds usable as color or scalar input for volume visualization.
    pub const COLORS: TagSet = TagSet::BYTE
        .union(TagSet::FLOAT)
        .union(TagSet::VEC3)
        .union(TagSet::RGBA);

    /// The set containing only `tag`.
    pub const fn from_tag(tag: TypeTag) -> TagSet {
        match tag {
            TypeTag::StructuredGrid => TagSet::STRUCTURED_GRID,
            TypeTag::UnstructuredGrid => TagSet::UNSTRUCTURED_GRID,
            TypeTag::RectilinearGrid => TagSet::RECTILINEAR_GRID,
            TypeTag::UniformGrid => TagSet::UNIFORM_GRID,
            TypeTag::Points => TagSet::POINTS,
            TypeTag::Spheres => TagSet::SPHERES,
            TypeTag::Lines => TagSet::LINES,
            TypeTag::Polygons => TagSet::POLYGONS,
            TypeTag::Quads => TagSet::QUADS,
            TypeTag::Triangles => TagSet::TRIANGLES,
            TypeTag::TriangleStrips => TagSet::TRIANGLE_STRIPS,
            TypeTag::Geometry => TagSet::GEOMETRY,
            TypeTag::Set => TagSet::SET,
            TypeTag::Texture => TagSet::TEXTURE,
            TypeTag::Byte => TagSet::BYTE,
            TypeTag::Float => TagSet::FLOAT,
            TypeTag::Vec3 => TagSet::VEC3,
            TypeTag::Rgba => TagSet::RGBA,
        }
    }

    /// Whether `tag` is accepted by this set.
    pub fn accepts(&self, tag: TypeTag) -> bool {
        self.contains(TagSet::from_tag(tag))
    }

    /// Parses a pipe-separated acceptance list, e.g. `"Vec3|Float"`.
    ///
    /// The name `Object` is the wildcard and expands to every tag; it may be
    /// combined with other names, which is then redundant but not an error.
    pub fn parse(spec: &str) -> Result<TagSet, TagParseError> {
        let mut set = TagSet::empty();
        let mut seen_any = false;
        for part in spec.split('|') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            seen_any = true;
            if part == "Object" {
                set |= TagSet::all();
            } else {
                set |= TagSet::from_tag(part.parse()?);
            }
        }
        if !seen_any {
            return Err(TagParseError::Empty);
        }
        Ok(set)
    }

    /// Renders the set in declaration syntax; the full set prints as `Object`.
    pub fn describe(&self) -> String {
        if *self == TagSet::all() {
            return "Object".to_string();
        }
        let names: Vec<_> = TypeTag::ALL
            .into_iter()
            .filter(|tag| self.accepts(*tag))
            .map(|tag| tag.name())
            .collect();
        names.join("|")
    }
}

impl From<TypeTag> for TagSet {
    fn from(tag: TypeTag) -> Self {
        TagSet::from_tag(tag)
    }
}
