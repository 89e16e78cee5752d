//! An in-memory scene implementing the engine primitives for tests.
//!
//! Node paths are `|`-separated (`|pCube1|pCubeShape1`). Mesh shapes have 8
//! vertices, 12 edges and 6 faces; curve shapes have 4 CVs and 2 EPs.

use std::sync::Arc;

use serde_json::json;

use scene_query_primitives::test_utils::{CallLog, RecordingPrimitive};
use scene_query_primitives::{OptionSet, PrimitiveOutput, Value};

use crate::components::ComponentMarkers;
use crate::scene::SceneCommands;

const SHAPE_TYPES: [&str; 2] = ["mesh", "nurbsCurve"];

#[derive(Debug, Clone)]
pub struct MockNode {
    pub path: String,
    pub node_type: String,
    pub translate: [f64; 3],
    pub rotate: [f64; 3],
    pub scale: [f64; 3],
}

impl MockNode {
    pub fn new(path: &str, node_type: &str) -> Self {
        Self {
            path: path.to_owned(),
            node_type: node_type.to_owned(),
            translate: [0.0; 3],
            rotate: [0.0; 3],
            scale: [1.0; 3],
        }
    }

    pub fn at(mut self, translate: [f64; 3]) -> Self {
        self.translate = translate;
        self
    }

    pub fn short_name(&self) -> &str {
        self.path.rsplit('|').next().unwrap_or(&self.path)
    }

    pub fn parent_path(&self) -> Option<&str> {
        self.path.rfind('|').filter(|&i| i > 0).map(|i| &self.path[..i])
    }

    fn is_shape(&self) -> bool {
        SHAPE_TYPES.contains(&self.node_type.as_str())
    }

    fn component_count(&self, marker: &str) -> usize {
        match (self.node_type.as_str(), marker) {
            ("mesh", "vtx") => 8,
            ("mesh", "e") => 12,
            ("mesh", "f") => 6,
            ("mesh", "map") => 14,
            ("mesh", "vtxFace") => 24,
            ("nurbsCurve", "cv") => 4,
            ("nurbsCurve", "ep") => 2,
            _ => 0,
        }
    }
}

#[derive(Debug, Default)]
pub struct MockScene {
    nodes: Vec<MockNode>,
    selection: Vec<String>,
    markers: ComponentMarkers,
}

fn text(v: &Value) -> &str {
    v.as_str().unwrap_or_default()
}

fn answer(items: Vec<Value>) -> PrimitiveOutput {
    Ok(if items.is_empty() { None } else { Some(items) })
}

fn push_unique(out: &mut Vec<Value>, item: Value) {
    if !out.contains(&item) {
        out.push(item);
    }
}

/// Splits `node.marker[spec]` into its parts.
fn split_component(item: &str) -> Option<(&str, &str, &str)> {
    let (node, rest) = item.rsplit_once('.')?;
    let (marker, spec) = rest.split_once('[')?;
    Some((node, marker, spec.strip_suffix(']')?))
}

impl MockScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_node(mut self, node: MockNode) -> Self {
        self.nodes.push(node);
        self
    }

    /// Adds a transform with one mesh shape below it.
    pub fn with_mesh(self, name: &str, translate: [f64; 3]) -> Self {
        let transform = format!("|{}", name);
        let shape = format!("{}|{}Shape", transform, name);
        self.with_node(MockNode::new(&transform, "transform").at(translate))
            .with_node(MockNode::new(&shape, "mesh"))
    }

    pub fn select(mut self, names: &[&str]) -> Self {
        self.selection = names.iter().map(|s| (*s).to_owned()).collect();
        self
    }

    /// A node by full path or short name.
    pub fn find(&self, name: &str) -> Option<&MockNode> {
        self.nodes
            .iter()
            .find(|n| n.path == name || n.short_name() == name)
    }

    fn display_name(node: &MockNode, long: bool) -> Value {
        if long {
            json!(node.path)
        } else {
            json!(node.short_name())
        }
    }

    fn children(&self, parent: &MockNode) -> impl Iterator<Item = &MockNode> {
        let path = parent.path.clone();
        self.nodes
            .iter()
            .filter(move |n| n.parent_path() == Some(path.as_str()))
    }

    /// The node holding components: the node itself or its first shape.
    fn component_owner<'a>(&'a self, node: &'a MockNode) -> Option<&'a MockNode> {
        if node.is_shape() {
            Some(node)
        } else {
            self.children(node).find(|c| c.is_shape())
        }
    }

    fn ls(&self, args: &[Value], options: &OptionSet) -> PrimitiveOutput {
        let candidates: Vec<&MockNode> = if options.flag("selection", false) {
            self.selection.iter().filter_map(|s| self.find(s)).collect()
        } else if !args.is_empty() {
            args.iter().filter_map(|a| self.find(text(a))).collect()
        } else {
            self.nodes.iter().collect()
        };
        let types: Option<Vec<&str>> = options
            .get("type")
            .and_then(Value::as_array)
            .map(|ts| ts.iter().map(text).collect());
        let long = options.flag("long", false);
        answer(
            candidates
                .into_iter()
                .filter(|n| types.as_ref().is_none_or(|ts| ts.contains(&n.node_type.as_str())))
                .map(|n| Self::display_name(n, long))
                .collect(),
        )
    }

    fn list_relatives(&self, args: &[Value], options: &OptionSet) -> PrimitiveOutput {
        let long = options.flag("fullPath", false);
        let mut out = Vec::new();
        for node in args.iter().filter_map(|a| self.find(text(a))) {
            if options.flag("parent", false) {
                if let Some(parent) = node.parent_path().and_then(|p| self.find(p)) {
                    push_unique(&mut out, Self::display_name(parent, long));
                }
            } else {
                let shapes_only = options.flag("shapes", false);
                for child in self.children(node).filter(|c| !shapes_only || c.is_shape()) {
                    out.push(Self::display_name(child, long));
                }
            }
        }
        answer(out)
    }

    fn filter_expand(&self, args: &[Value], options: &OptionSet) -> PrimitiveOutput {
        let mask = options.get("selectionMask").and_then(Value::as_i64).unwrap_or_default();
        let wanted = self.markers.marker(mask)?;
        let expand = options.flag("expand", true);
        let mut out = Vec::new();
        for item in args.iter().map(text) {
            let Some((name, marker, spec)) = split_component(item) else {
                continue;
            };
            let owner = self.find(name).and_then(|n| self.component_owner(n));
            let (Some(owner), true) = (owner, marker == wanted) else {
                continue;
            };
            if spec == "*" && expand {
                for i in 0..owner.component_count(marker) {
                    push_unique(&mut out, json!(format!("{}.{}[{}]", owner.path, marker, i)));
                }
            } else {
                push_unique(&mut out, json!(format!("{}.{}[{}]", owner.path, marker, spec)));
            }
        }
        answer(out)
    }

    fn convert(&self, args: &[Value], options: &OptionSet) -> PrimitiveOutput {
        let target = [("tf", "f"), ("tv", "vtx"), ("te", "e"), ("tvf", "vtxFace")]
            .into_iter()
            .find(|(flag, _)| options.flag(flag, false))
            .map(|(_, marker)| marker);
        let mut out = Vec::new();
        for item in args {
            match (target, split_component(text(item))) {
                (Some(target), Some((name, _, spec))) => {
                    push_unique(&mut out, json!(format!("{}.{}[{}]", name, target, spec)));
                }
                _ => push_unique(&mut out, item.clone()),
            }
        }
        answer(out)
    }

    fn xform(&self, args: &[Value], options: &OptionSet) -> PrimitiveOutput {
        let name = args.first().map(text).unwrap_or_default();
        let node = self
            .find(name)
            .ok_or_else(|| format!("No object matches name: {}", name))?;
        let world = options.flag("ws", false);
        let translate = if world {
            let mut acc = node.translate;
            let mut parent = node.parent_path();
            while let Some(p) = parent.and_then(|p| self.find(p)) {
                for (a, t) in acc.iter_mut().zip(p.translate) {
                    *a += t;
                }
                parent = p.parent_path();
            }
            acc
        } else {
            node.translate
        };
        let values: Vec<f64> = if options.flag("t", false) {
            translate.to_vec()
        } else if options.flag("r", false) {
            node.rotate.to_vec()
        } else if options.flag("s", false) {
            node.scale.to_vec()
        } else if options.flag("piv", false) {
            translate.iter().chain(translate.iter()).copied().collect()
        } else if options.flag("matrix", false) {
            let [x, y, z] = translate;
            vec![1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, x, y, z, 1.0]
        } else {
            return Ok(None);
        };
        Ok(Some(values.into_iter().map(Value::from).collect()))
    }

    /// Primitives over this scene, each recording into `log`.
    pub fn commands(self: Arc<Self>, log: &CallLog) -> SceneCommands {
        let primitive = |name: &str, f: fn(&MockScene, &[Value], &OptionSet) -> PrimitiveOutput| {
            let scene = Arc::clone(&self);
            RecordingPrimitive::with(name, log, move |args, options| f(&scene, args, options))
        };
        let echo = |name: &str| RecordingPrimitive::echo(name, log);
        SceneCommands {
            ls: primitive("ls", MockScene::ls),
            list_history: echo("listHistory"),
            list_relatives: primitive("listRelatives", MockScene::list_relatives),
            filter_expand: primitive("filterExpand", MockScene::filter_expand),
            find_type: echo("findType"),
            convert_components: primitive("polyListComponentConversion", MockScene::convert),
            xform: primitive("xform", MockScene::xform),
        }
    }
}
