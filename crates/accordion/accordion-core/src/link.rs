//! Link-group synchronization across Containers.
//!
//! A link group is not an owned object: it is every Item in the document whose
//! `data-link-group` equals the identifier. Members are driven through their
//! owning Coordinator so each Container's own settings and auto-close apply.

use hashbrown::HashMap;
use log::{debug, trace};

use crate::attrs;
use crate::config::EngineConfig;
use crate::container::Coordinator;
use crate::host::{Dom, Host};
use crate::ids::ContainerId;
use crate::outputs::Outputs;
use crate::registry::InstanceRegistry;

/// Item nodes anywhere under the document root that belong to `group`.
pub fn members<D: Dom + ?Sized>(dom: &D, cfg: &EngineConfig, group: &str) -> Vec<D::Node> {
    let root = dom.document_root();
    dom.descendants(&root)
        .into_iter()
        .filter(|n| dom.has_class(n, &cfg.item_class))
        .filter(|n| attrs::read_non_empty(dom, n, attrs::LINK_GROUP).as_deref() == Some(group))
        .collect()
}

/// Drive every other member of `group` to `open`. Returns how many members
/// were reached.
#[allow(clippy::too_many_arguments)]
pub fn sync<H: Host>(
    host: &mut H,
    cfg: &EngineConfig,
    registry: &InstanceRegistry<H::Node>,
    containers: &mut HashMap<ContainerId, Coordinator<H>>,
    out: &mut Outputs,
    group: &str,
    open: bool,
    trigger: &H::Node,
) -> usize {
    let mut reached = 0;
    for node in members(host, cfg, group) {
        if &node == trigger {
            continue;
        }
        let owner = host
            .parent(&node)
            .and_then(|parent| registry.resolve(&parent))
            .and_then(|id| containers.get_mut(&id));
        let managed = owner.and_then(|c| {
            let key = c.item_by_node(&node)?;
            Some((c, key))
        });
        match managed {
            Some((coordinator, key)) => {
                trace!("link group {group}: {} item {key:?}", if open { "open" } else { "close" });
                if open {
                    coordinator.open_item(host, cfg, key, out);
                } else {
                    coordinator.close_item(host, cfg, key, out);
                }
            }
            None => {
                debug!("link group {group}: member without coordinator, applying directly");
                apply_unmanaged(host, cfg, &node, open);
            }
        }
        reached += 1;
    }
    reached
}

/// Settings-agnostic open/close for an Item no Coordinator owns.
pub fn apply_unmanaged<H: Host>(host: &mut H, cfg: &EngineConfig, node: &H::Node, open: bool) {
    let descendants = host.descendants(node);
    let toggle = descendants
        .iter()
        .find(|n| host.has_class(n, &cfg.toggle_class))
        .cloned();
    let panel = descendants
        .iter()
        .find(|n| host.has_class(n, &cfg.panel_class))
        .cloned();
    if open {
        host.add_class(node, &cfg.open_class);
    } else {
        host.remove_class(node, &cfg.open_class);
    }
    if let Some(toggle) = toggle {
        host.set_attribute(&toggle, "aria-expanded", if open { "true" } else { "false" });
    }
    if let Some(panel) = panel {
        host.remove_style(&panel, "height");
        if open {
            host.remove_attribute(&panel, "hidden");
        } else {
            host.set_attribute(&panel, "hidden", "");
        }
    }
}
