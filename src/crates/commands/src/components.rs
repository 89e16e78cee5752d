//! Component selections: the mask to marker table and the expand primitive.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use scene_query_primitives::{
    OptionSet, Primitive, PrimitiveOutput, PrimitiveRef, QueryError, Result, Value, is_truthy,
};

/// Selection masks understood by the standard component combinators.
pub mod mask {
    pub const CVS: i64 = 28;
    pub const EPS: i64 = 30;
    pub const VERTICES: i64 = 31;
    pub const EDGES: i64 = 32;
    pub const FACES: i64 = 34;
    pub const UVS: i64 = 35;
    pub const VERTEX_FACES: i64 = 70;
}

/// Maps a component-kind mask to the marker used in component names,
/// e.g. `31` to `vtx` as in `pCube1.vtx[*]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentMarkers(BTreeMap<i64, String>);

impl Default for ComponentMarkers {
    fn default() -> Self {
        Self::empty()
            .with(mask::VERTICES, "vtx")
            .with(mask::EDGES, "e")
            .with(mask::FACES, "f")
            .with(mask::UVS, "map")
            .with(mask::VERTEX_FACES, "vtxFace")
            .with(mask::CVS, "cv")
            .with(mask::EPS, "ep")
    }
}

impl ComponentMarkers {
    pub fn empty() -> Self {
        Self(BTreeMap::new())
    }

    pub fn with(mut self, mask: i64, marker: impl Into<String>) -> Self {
        self.0.insert(mask, marker.into());
        self
    }

    pub fn marker(&self, mask: i64) -> Result<&str> {
        self.0
            .get(&mask)
            .map(String::as_str)
            .ok_or(QueryError::UnknownComponentKind(mask))
    }

    /// Mask whose marker is `marker`, if any.
    pub fn mask_of(&self, marker: &str) -> Option<i64> {
        self.0
            .iter()
            .find_map(|(mask, m)| (m == marker).then_some(*mask))
    }

    /// Parses a table like `{"31": "vtx", "32": "e"}`.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref()).map_err(serde_json::Error::io)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }
}

/// Turns a bare node name into a whole-kind component selection,
/// `pCube1` into `pCube1.vtx[*]`. Names that already select components are
/// returned unchanged.
pub fn componentize(item: &str, mask: i64, markers: &ComponentMarkers) -> Result<String> {
    if item.contains('[') {
        return Ok(item.to_owned());
    }
    Ok(format!("{}.{}[*]", item, markers.marker(mask)?))
}

/// Wraps the engine's component expansion.
///
/// With a truthy `force` option every argument is componentized with the
/// marker for `selectionMask` first. `force` itself never reaches the engine.
pub struct ExpandPrimitive {
    filter_expand: PrimitiveRef,
    markers: ComponentMarkers,
}

impl ExpandPrimitive {
    pub fn new(filter_expand: PrimitiveRef, markers: ComponentMarkers) -> Self {
        Self {
            filter_expand,
            markers,
        }
    }

    fn forced_args(&self, args: &[Value], options: &OptionSet) -> Result<Vec<Value>> {
        let mask = options
            .get("selectionMask")
            .and_then(Value::as_i64)
            .ok_or_else(|| QueryError::invalid_call("filterExpand", "force needs a selectionMask"))?;
        args.iter()
            .map(|arg| match arg {
                Value::String(s) => Ok(Value::String(componentize(s, mask, &self.markers)?)),
                other => Ok(other.clone()),
            })
            .collect()
    }
}

impl Primitive for ExpandPrimitive {
    fn name(&self) -> &str {
        self.filter_expand.name()
    }

    fn invoke(&self, args: &[Value], options: &OptionSet) -> PrimitiveOutput {
        let mut options = options.clone();
        let force = options.remove("force").is_some_and(|v| is_truthy(&v));
        if force {
            let args = self.forced_args(args, &options)?;
            self.filter_expand.invoke(&args, &options)
        } else {
            self.filter_expand.invoke(args, &options)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use serde_json::json;

    use scene_query_primitives::test_utils::{CallLog, RecordingPrimitive};

    use super::*;

    #[test]
    fn componentize_names() -> anyhow::Result<()> {
        let markers = ComponentMarkers::default();
        assert_eq!(componentize("pCube1", mask::VERTICES, &markers)?, "pCube1.vtx[*]");
        assert_eq!(componentize("curve1", mask::CVS, &markers)?, "curve1.cv[*]");
        assert_eq!(componentize("pCube1.f[2]", mask::VERTICES, &markers)?, "pCube1.f[2]");
        assert!(matches!(
            componentize("pCube1", 99, &markers),
            Err(QueryError::UnknownComponentKind(99))
        ));
        Ok(())
    }

    #[test]
    fn markers_load_from_json() -> anyhow::Result<()> {
        let markers = ComponentMarkers::from_json_str(r#"{"31": "pt", "34": "face"}"#)?;
        assert_eq!(markers.marker(31)?, "pt");
        assert_eq!(markers.mask_of("face"), Some(34));
        assert!(markers.marker(32).is_err());

        assert!(matches!(
            ComponentMarkers::from_json_str("[1, 2]"),
            Err(QueryError::Config(_))
        ));
        Ok(())
    }

    #[test]
    fn markers_load_from_file() -> anyhow::Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        write!(file, "{}", serde_json::to_string(&ComponentMarkers::default())?)?;
        assert_eq!(ComponentMarkers::from_path(file.path())?, ComponentMarkers::default());

        let missing = file.path().with_extension("missing");
        assert!(matches!(ComponentMarkers::from_path(missing), Err(QueryError::Config(_))));
        Ok(())
    }

    #[test]
    fn force_componentizes_and_is_stripped() -> anyhow::Result<()> {
        let log = CallLog::new();
        let inner = RecordingPrimitive::echo("filterExpand", &log);
        let expand = ExpandPrimitive::new(inner, ComponentMarkers::default());

        let options = OptionSet::new()
            .with("selectionMask", mask::FACES)
            .with("force", true)
            .with("expand", true);
        let out = expand
            .invoke(&[json!("pCube1"), json!("pCube2.f[3]")], &options)
            .map_err(|e| anyhow::anyhow!("{e}"))?;
        assert_eq!(out, Some(vec![json!("pCube1.f[*]"), json!("pCube2.f[3]")]));

        let call = &log.calls()[0];
        assert!(!call.options.contains_key("force"));
        assert_eq!(call.options.get("expand"), Some(&json!(true)));
        Ok(())
    }

    #[test]
    fn without_force_args_pass_through() -> anyhow::Result<()> {
        let log = CallLog::new();
        let inner = RecordingPrimitive::echo("filterExpand", &log);
        let expand = ExpandPrimitive::new(inner, ComponentMarkers::default());
        let options = OptionSet::new().with("selectionMask", mask::VERTICES).with("force", false);
        let out = expand
            .invoke(&[json!("pCube1")], &options)
            .map_err(|e| anyhow::anyhow!("{e}"))?;
        assert_eq!(out, Some(vec![json!("pCube1")]));
        Ok(())
    }

    #[test]
    fn force_with_unknown_mask_fails_before_the_engine() {
        let log = CallLog::new();
        let inner = RecordingPrimitive::echo("filterExpand", &log);
        let expand = ExpandPrimitive::new(inner, ComponentMarkers::default());
        let options = OptionSet::new().with("selectionMask", 12).with("force", true);
        let err = expand.invoke(&[json!("pCube1")], &options).unwrap_err();
        assert!(matches!(
            QueryError::from_primitive(err),
            QueryError::UnknownComponentKind(12)
        ));
        assert!(log.is_empty());
    }
}
