use smol_str::SmolStr;

use crate::error::{Error, Result};
use crate::scene::{Node, NodeCore, OffsetMode};
use crate::style::{Color, Direction, LineCap, LineJoin, Paint, Shadow, Style, TextAlign};

/// Plain data value inside a node record's option bag.
#[derive(Clone, Debug, PartialEq)]
pub enum OptionValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(SmolStr),
    List(Vec<OptionValue>),
}

/// Declarative description of one node: tag, options, children. The
/// serialization boundary — everything in here is plain data.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NodeRecord {
    pub tag: SmolStr,
    pub options: Vec<(SmolStr, OptionValue)>,
    pub children: Vec<NodeRecord>,
}

impl NodeRecord {
    pub fn new(tag: impl Into<SmolStr>) -> Self {
        Self {
            tag: tag.into(),
            options: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn option(mut self, key: impl Into<SmolStr>, value: OptionValue) -> Self {
        self.options.push((key.into(), value));
        self
    }

    pub fn child(mut self, child: NodeRecord) -> Self {
        self.children.push(child);
        self
    }
}

/// Option bag a factory consumes while building a node. Keys left after
/// construction are unknown options.
#[derive(Debug, Default)]
pub struct OptionBag {
    entries: Vec<(SmolStr, OptionValue)>,
}

impl OptionBag {
    pub fn from_entries(entries: Vec<(SmolStr, OptionValue)>) -> Self {
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn first_key(&self) -> Option<&SmolStr> {
        self.entries.first().map(|(key, _)| key)
    }

    pub fn remove_raw(&mut self, key: &str) -> Option<OptionValue> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        let (_, value) = self.entries.remove(index);
        Some(value)
    }

    pub fn remove_f64(&mut self, key: &str) -> std::result::Result<Option<f64>, String> {
        match self.remove_raw(key) {
            Some(OptionValue::Int(v)) => Ok(Some(v as f64)),
            Some(OptionValue::Float(v)) => Ok(Some(v)),
            Some(_) => Err(format!("option `{key}` expects numeric value")),
            None => Ok(None),
        }
    }

    pub fn remove_bool(&mut self, key: &str) -> std::result::Result<Option<bool>, String> {
        match self.remove_raw(key) {
            Some(OptionValue::Bool(v)) => Ok(Some(v)),
            Some(_) => Err(format!("option `{key}` expects bool value")),
            None => Ok(None),
        }
    }

    pub fn remove_str(&mut self, key: &str) -> std::result::Result<Option<SmolStr>, String> {
        match self.remove_raw(key) {
            Some(OptionValue::Str(v)) => Ok(Some(v)),
            Some(_) => Err(format!("option `{key}` expects string value")),
            None => Ok(None),
        }
    }

    pub fn remove_f64_list(&mut self, key: &str) -> std::result::Result<Option<Vec<f64>>, String> {
        let Some(value) = self.remove_raw(key) else {
            return Ok(None);
        };
        let OptionValue::List(items) = value else {
            return Err(format!("option `{key}` expects list value"));
        };
        let mut out = Vec::with_capacity(items.len());
        for item in items {
            match item {
                OptionValue::Int(v) => out.push(v as f64),
                OptionValue::Float(v) => out.push(v),
                _ => return Err(format!("option `{key}` expects numeric list items")),
            }
        }
        Ok(Some(out))
    }

    pub fn remove_str_list(
        &mut self,
        key: &str,
    ) -> std::result::Result<Option<Vec<SmolStr>>, String> {
        let Some(value) = self.remove_raw(key) else {
            return Ok(None);
        };
        let OptionValue::List(items) = value else {
            return Err(format!("option `{key}` expects list value"));
        };
        let mut out = Vec::with_capacity(items.len());
        for item in items {
            match item {
                OptionValue::Str(v) => out.push(v),
                _ => return Err(format!("option `{key}` expects string list items")),
            }
        }
        Ok(Some(out))
    }
}

fn push(out: &mut Vec<(SmolStr, OptionValue)>, key: &'static str, value: OptionValue) {
    out.push((SmolStr::new_static(key), value));
}

fn write_paint(
    paint: &Paint,
    key: &'static str,
    out: &mut Vec<(SmolStr, OptionValue)>,
) -> Result<()> {
    match paint {
        Paint::Solid(color) => {
            push(out, key, OptionValue::Str(color.to_hex().into()));
            Ok(())
        }
        Paint::Handle(_) => Err(Error::UnserializableStyle(key)),
    }
}

/// Serializes the set fields of a sparse style. A paint handle anywhere
/// fails the call — records never silently drop fields.
pub fn write_style_options(style: &Style, out: &mut Vec<(SmolStr, OptionValue)>) -> Result<()> {
    if let Some(fill) = &style.fill {
        write_paint(fill, "fill", out)?;
    }
    if let Some(stroke) = &style.stroke {
        write_paint(stroke, "stroke", out)?;
    }
    if let Some(width) = style.line_width {
        push(out, "line_width", OptionValue::Float(width));
    }
    if let Some(cap) = style.line_cap {
        push(out, "line_cap", OptionValue::Str(cap.as_str().into()));
    }
    if let Some(join) = style.line_join {
        push(out, "line_join", OptionValue::Str(join.as_str().into()));
    }
    if let Some(limit) = style.miter_limit {
        push(out, "miter_limit", OptionValue::Float(limit));
    }
    if let Some(dash) = &style.line_dash {
        let items = dash.iter().copied().map(OptionValue::Float).collect();
        push(out, "line_dash", OptionValue::List(items));
    }
    if let Some(offset) = style.line_dash_offset {
        push(out, "line_dash_offset", OptionValue::Float(offset));
    }
    if let Some(shadow) = &style.shadow {
        push(out, "shadow_color", OptionValue::Str(shadow.color.to_hex().into()));
        push(out, "shadow_blur", OptionValue::Float(shadow.blur));
        push(out, "shadow_offset_x", OptionValue::Float(shadow.offset.x));
        push(out, "shadow_offset_y", OptionValue::Float(shadow.offset.y));
    }
    if let Some(opacity) = style.opacity {
        push(out, "opacity", OptionValue::Float(opacity));
    }
    if let Some(font) = &style.font {
        push(out, "font", OptionValue::Str(font.clone()));
    }
    if let Some(align) = style.text_align {
        push(out, "text_align", OptionValue::Str(align.as_str().into()));
    }
    if let Some(direction) = style.direction {
        push(out, "direction", OptionValue::Str(direction.as_str().into()));
    }
    if let Some(ratio) = style.pixel_ratio {
        push(out, "pixel_ratio", OptionValue::Float(ratio));
    }
    Ok(())
}

fn parse_color(key: &str, text: &str) -> std::result::Result<Color, String> {
    Color::parse_hex(text).ok_or_else(|| format!("option `{key}` expects a hex color"))
}

/// Consumes every recognized style key from the bag into the style.
pub fn read_style_options(
    bag: &mut OptionBag,
    style: &mut Style,
) -> std::result::Result<(), String> {
    if let Some(text) = bag.remove_str("fill")? {
        style.fill = Some(Paint::Solid(parse_color("fill", &text)?));
    }
    if let Some(text) = bag.remove_str("stroke")? {
        style.stroke = Some(Paint::Solid(parse_color("stroke", &text)?));
    }
    if let Some(width) = bag.remove_f64("line_width")? {
        style.line_width = Some(width);
    }
    if let Some(text) = bag.remove_str("line_cap")? {
        style.line_cap =
            Some(LineCap::parse(&text).ok_or_else(|| format!("unknown line cap `{text}`"))?);
    }
    if let Some(text) = bag.remove_str("line_join")? {
        style.line_join =
            Some(LineJoin::parse(&text).ok_or_else(|| format!("unknown line join `{text}`"))?);
    }
    if let Some(limit) = bag.remove_f64("miter_limit")? {
        style.miter_limit = Some(limit);
    }
    if let Some(dash) = bag.remove_f64_list("line_dash")? {
        style.line_dash = Some(dash);
    }
    if let Some(offset) = bag.remove_f64("line_dash_offset")? {
        style.line_dash_offset = Some(offset);
    }
    let shadow_color = bag.remove_str("shadow_color")?;
    let shadow_blur = bag.remove_f64("shadow_blur")?;
    let shadow_offset_x = bag.remove_f64("shadow_offset_x")?;
    let shadow_offset_y = bag.remove_f64("shadow_offset_y")?;
    if shadow_color.is_some()
        || shadow_blur.is_some()
        || shadow_offset_x.is_some()
        || shadow_offset_y.is_some()
    {
        let Some(color) = shadow_color else {
            return Err("shadow options require `shadow_color`".to_string());
        };
        style.shadow = Some(Shadow {
            color: parse_color("shadow_color", &color)?,
            blur: shadow_blur.unwrap_or(0.0),
            offset: glam::DVec2::new(
                shadow_offset_x.unwrap_or(0.0),
                shadow_offset_y.unwrap_or(0.0),
            ),
        });
    }
    if let Some(opacity) = bag.remove_f64("opacity")? {
        style.opacity = Some(opacity);
    }
    if let Some(font) = bag.remove_str("font")? {
        style.font = Some(font);
    }
    if let Some(text) = bag.remove_str("text_align")? {
        style.text_align =
            Some(TextAlign::parse(&text).ok_or_else(|| format!("unknown text align `{text}`"))?);
    }
    if let Some(text) = bag.remove_str("direction")? {
        style.direction =
            Some(Direction::parse(&text).ok_or_else(|| format!("unknown direction `{text}`"))?);
    }
    if let Some(ratio) = bag.remove_f64("pixel_ratio")? {
        style.pixel_ratio = Some(ratio);
    }
    Ok(())
}

fn write_common_options(core: &NodeCore, out: &mut Vec<(SmolStr, OptionValue)>) -> Result<()> {
    if let Some(id) = &core.id {
        push(out, "id", OptionValue::Str(id.clone()));
    }
    if !core.classes.is_empty() {
        let items = core
            .classes
            .iter()
            .cloned()
            .map(OptionValue::Str)
            .collect();
        push(out, "class", OptionValue::List(items));
    }
    if core.offset.x != 0.0 {
        push(out, "x", OptionValue::Float(core.offset.x));
    }
    if core.offset.y != 0.0 {
        push(out, "y", OptionValue::Float(core.offset.y));
    }
    if core.offset_mode != OffsetMode::Relative {
        push(out, "offset_mode", OptionValue::Str(core.offset_mode.as_str().into()));
    }
    if core.bounds.width() != 0.0 {
        push(out, "width", OptionValue::Float(core.bounds.width()));
    }
    if core.bounds.height() != 0.0 {
        push(out, "height", OptionValue::Float(core.bounds.height()));
    }
    if let Some(stretch) = core.stretch_x {
        push(out, "stretch_x", OptionValue::Float(stretch));
    }
    if let Some(stretch) = core.stretch_y {
        push(out, "stretch_y", OptionValue::Float(stretch));
    }
    write_flag_deviations(core, out);
    write_style_options(&core.style, out)
}

fn write_flag_deviations(core: &NodeCore, out: &mut Vec<(SmolStr, OptionValue)>) {
    use crate::scene::NodeFlags;

    if !core.is_visible() {
        push(out, "visible", OptionValue::Bool(false));
    }
    if !core.is_interactive() {
        push(out, "interactive", OptionValue::Bool(false));
    }
    if core.is_penetrable() {
        push(out, "penetrable", OptionValue::Bool(true));
    }
    if !core.flags.contains(NodeFlags::SMART_UPDATE) {
        push(out, "smart_update", OptionValue::Bool(false));
    }
    if core.flags.contains(NodeFlags::NO_UPDATE) {
        push(out, "no_update", OptionValue::Bool(true));
    }
    if core.flags.contains(NodeFlags::NO_CHILD_UPDATE) {
        push(out, "no_child_update", OptionValue::Bool(true));
    }
    if core.flags.contains(NodeFlags::NO_CHILD_RENDER) {
        push(out, "no_child_render", OptionValue::Bool(true));
    }
}

/// Applies every recognized geometry, flag and style key from the bag.
/// Offset-mode parsing stays with the caller, which owns its typed error.
pub fn read_common_options(
    node: &mut Node,
    bag: &mut OptionBag,
) -> std::result::Result<(), String> {
    use crate::scene::NodeFlags;

    if let Some(id) = bag.remove_str("id")? {
        node.core.id = Some(id);
    }
    if let Some(classes) = bag.remove_str_list("class")? {
        node.core.classes = classes;
    }
    if let Some(x) = bag.remove_f64("x")? {
        node.core.offset.x = x;
    }
    if let Some(y) = bag.remove_f64("y")? {
        node.core.offset.y = y;
    }
    if let Some(width) = bag.remove_f64("width")? {
        node.core.bounds.set_width(width);
    }
    if let Some(height) = bag.remove_f64("height")? {
        node.core.bounds.set_height(height);
    }
    if let Some(stretch) = bag.remove_f64("stretch_x")? {
        node.core.stretch_x = Some(stretch);
    }
    if let Some(stretch) = bag.remove_f64("stretch_y")? {
        node.core.stretch_y = Some(stretch);
    }
    if let Some(visible) = bag.remove_bool("visible")? {
        node.core.set_visible(visible);
    }
    if let Some(interactive) = bag.remove_bool("interactive")? {
        node.core.set_interactive(interactive);
    }
    if let Some(penetrable) = bag.remove_bool("penetrable")? {
        node.core.set_penetrable(penetrable);
    }
    if let Some(smart) = bag.remove_bool("smart_update")? {
        node.core.flags.set(NodeFlags::SMART_UPDATE, smart);
    }
    if let Some(flag) = bag.remove_bool("no_update")? {
        node.core.flags.set(NodeFlags::NO_UPDATE, flag);
    }
    if let Some(flag) = bag.remove_bool("no_child_update")? {
        node.core.flags.set(NodeFlags::NO_CHILD_UPDATE, flag);
    }
    if let Some(flag) = bag.remove_bool("no_child_render")? {
        node.core.flags.set(NodeFlags::NO_CHILD_RENDER, flag);
    }
    read_style_options(bag, &mut node.core.style)
}

impl Node {
    /// Serializes the subtree into a record: tag, non-default geometry and
    /// flags, set style fields, behavior extras, then children. All-or-
    /// nothing — an unserializable value anywhere fails the whole call.
    pub fn to_record(&self) -> Result<NodeRecord> {
        let mut options = Vec::new();
        write_common_options(&self.core, &mut options)?;
        self.behavior.write_options(&self.core, &mut options);
        let mut children = Vec::with_capacity(self.children().len());
        for child in self.children() {
            children.push(child.to_record()?);
        }
        Ok(NodeRecord {
            tag: self.tag().into(),
            options,
            children,
        })
    }
}
