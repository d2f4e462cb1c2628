use std::sync::Arc;

use glam::DVec2;
use log::debug;

use easel::record::OptionBag;
use easel::registry::register_node_kind;
use easel::scene::Node;

use crate::{Disc, Label, Rect, Sprite};

/// Makes every shape kind available to record instantiation. Safe to call
/// more than once; later registrations replace earlier ones.
pub fn register_shape_kinds() {
    debug!("registering shape node kinds");
    register_node_kind("rect", Arc::new(|_bag: &mut OptionBag| Ok(Rect::node())));
    register_node_kind("label", Arc::new(label_from_options));
    register_node_kind("disc", Arc::new(|_bag: &mut OptionBag| Ok(Disc::node())));
    register_node_kind("sprite", Arc::new(sprite_from_options));
}

fn label_from_options(bag: &mut OptionBag) -> Result<Node, String> {
    let text = bag.remove_str("text")?.unwrap_or_default();
    Ok(Label::node(text))
}

fn sprite_from_options(bag: &mut OptionBag) -> Result<Node, String> {
    let natural_size = match (
        bag.remove_f64("natural_width")?,
        bag.remove_f64("natural_height")?,
    ) {
        (Some(width), Some(height)) => Some(DVec2::new(width, height)),
        (None, None) => None,
        _ => {
            return Err(
                "sprite natural size needs both `natural_width` and `natural_height`".to_string(),
            );
        }
    };
    Ok(Node::new(Sprite { natural_size }))
}
