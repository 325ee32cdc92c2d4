use fibra_dom::{ElementKind, HostTree, PropValue, VNode};

use crate::error::RenderError;

/// Materialize a single node (not its children) in the host tree.
///
/// Handler props named `on<event>` become listeners for `<event>` (lower
/// case); every other prop except `key` becomes an attribute. Props are
/// applied in name order.
pub fn create_host_node<H: HostTree>(host: &mut H, vnode: &VNode) -> Result<H::Node, RenderError> {
    let el = match vnode {
        VNode::Text(t) => return Ok(host.create_text_node(t)?),
        VNode::Element(el) => el,
    };
    if el.kind == ElementKind::Fragment {
        return Err(RenderError::Malformed(
            "fragments have no host node".to_string(),
        ));
    }
    let node = host.create_node(&el.tag)?;
    let mut props: Vec<_> = el.props.iter().filter(|(name, _)| *name != "key").collect();
    props.sort_by_key(|(name, _)| *name);
    for (name, value) in props {
        match value {
            PropValue::Handler(handler) => {
                let Some(event) = name.strip_prefix("on").filter(|e| !e.is_empty()) else {
                    return Err(RenderError::Malformed(format!(
                        "handler prop `{name}` on <{}> must be named on<event>",
                        el.tag
                    )));
                };
                host.add_event_listener(&node, &event.to_lowercase(), handler.clone())?;
            }
            other => {
                if let Some(attr) = other.to_attr() {
                    host.set_attribute(&node, name, &attr)?;
                }
            }
        }
    }
    Ok(node)
}
