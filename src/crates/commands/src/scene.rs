use scene_query_primitives::PrimitiveRef;

/// The scene engine's query primitives.
///
/// Each field is supplied by the engine integration. Kinds built over the same
/// field share one primitive instance and can therefore fuse.
#[derive(Debug, Clone)]
pub struct SceneCommands {
    /// Lists nodes, optionally limited to the selection or to types.
    pub ls: PrimitiveRef,
    pub list_history: PrimitiveRef,
    /// Lists children, shapes or parents.
    pub list_relatives: PrimitiveRef,
    /// Expands component selections for a selection mask.
    pub filter_expand: PrimitiveRef,
    pub find_type: PrimitiveRef,
    /// Converts components to another component kind.
    pub convert_components: PrimitiveRef,
    /// Queries transform values of one node.
    pub xform: PrimitiveRef,
}
