use crate::space::ObjectHandle;

/// An ordered, immutable sequence of child objects.
///
/// Sets represent multi-timestep or multi-block data. They are built in one
/// shot from a vector of handles: moving the handles in transfers the
/// references the caller already held, so construction itself performs no
/// reference-count traffic. Children may be shared with other sets.
///
/// An empty vector yields a well-formed empty set, not an error; downstream
/// consumers must handle the zero-element case explicitly.
#[derive(Clone, Debug)]
pub struct SetData {
    children: Vec<ObjectHandle>,
}

impl SetData {
    pub fn new(children: Vec<ObjectHandle>) -> Self {
        Self { children }
    }

    /// Read-only view of the children; count is exact, no copy.
    pub fn children(&self) -> &[ObjectHandle] {
        &self.children
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}
