use std::sync::{Arc, RwLock};

use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use crate::error::{Error, Result};
use crate::record::{NodeRecord, OptionBag, read_common_options};
use crate::scene::{Align, AlignX, AlignY, Flow, FlowDirection, Node, OffsetMode};

/// Builds a node of one kind from its option bag. A factory consumes the
/// keys it understands; whatever is left over is reported as unknown.
pub type NodeFactory =
    Arc<dyn Fn(&mut OptionBag) -> std::result::Result<Node, String> + Send + Sync>;

static FACTORIES: Lazy<RwLock<FxHashMap<SmolStr, NodeFactory>>> = Lazy::new(|| {
    let mut map: FxHashMap<SmolStr, NodeFactory> = FxHashMap::default();
    map.insert(
        SmolStr::new_static("group"),
        Arc::new(|_options: &mut OptionBag| Ok(Node::group())),
    );
    map.insert(SmolStr::new_static("align"), Arc::new(align_from_options));
    map.insert(SmolStr::new_static("flow"), Arc::new(flow_from_options));
    RwLock::new(map)
});

fn align_from_options(bag: &mut OptionBag) -> std::result::Result<Node, String> {
    let mut align = Align::default();
    if let Some(text) = bag.remove_str("align_x")? {
        align.x = AlignX::parse(&text).ok_or_else(|| format!("unknown alignment `{text}`"))?;
    }
    if let Some(text) = bag.remove_str("align_y")? {
        align.y = AlignY::parse(&text).ok_or_else(|| format!("unknown alignment `{text}`"))?;
    }
    Ok(Node::new(align))
}

fn flow_from_options(bag: &mut OptionBag) -> std::result::Result<Node, String> {
    let mut flow = Flow::default();
    if let Some(text) = bag.remove_str("direction")? {
        flow.direction = FlowDirection::parse(&text)
            .ok_or_else(|| format!("unknown flow direction `{text}`"))?;
    }
    if let Some(gap) = bag.remove_f64("gap")? {
        flow.gap = gap;
    }
    Ok(Node::new(flow))
}

/// Registers a node kind under its tag. Later registrations replace earlier
/// ones.
pub fn register_node_kind(tag: impl Into<SmolStr>, factory: NodeFactory) {
    if let Ok(mut map) = FACTORIES.write() {
        map.insert(tag.into(), factory);
    }
}

fn factory_for(tag: &str) -> Option<NodeFactory> {
    FACTORIES.read().ok()?.get(tag).cloned()
}

fn invalid(tag: &SmolStr, message: String) -> Error {
    Error::InvalidOption {
        tag: tag.to_string(),
        message,
    }
}

/// Instantiates a record's subtree: factory lookup by tag, kind-specific
/// options, common options, unknown-key rejection, then children.
pub fn node_from_record(record: &NodeRecord) -> Result<Node> {
    let factory =
        factory_for(&record.tag).ok_or_else(|| Error::UnknownTag(record.tag.to_string()))?;
    let mut bag = OptionBag::from_entries(record.options.clone());
    let mut node = factory(&mut bag).map_err(|message| invalid(&record.tag, message))?;
    if let Some(mode) = bag
        .remove_str("offset_mode")
        .map_err(|message| invalid(&record.tag, message))?
    {
        node.core.offset_mode =
            OffsetMode::parse(&mode).ok_or_else(|| Error::UnknownOffsetMode(mode.to_string()))?;
    }
    read_common_options(&mut node, &mut bag).map_err(|message| invalid(&record.tag, message))?;
    if let Some(key) = bag.first_key() {
        return Err(Error::UnknownOption {
            tag: record.tag.to_string(),
            key: key.to_string(),
        });
    }
    for child in &record.children {
        node.append_child(node_from_record(child)?)?;
    }
    Ok(node)
}
