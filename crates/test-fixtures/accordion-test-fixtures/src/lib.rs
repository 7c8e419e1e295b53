use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::Deserialize;

mod harness;
mod page;

pub use harness::Harness;
pub use page::{FakePage, NodeId, NodeSpec, SubscriptionId, TimerId};

static MANIFEST: Lazy<Manifest> = Lazy::new(|| {
    let raw = include_str!("../../../../fixtures/manifest.json");
    serde_json::from_str(raw).expect("fixtures manifest should parse")
});

#[derive(Debug, Deserialize)]
struct Manifest {
    pages: HashMap<String, String>,
}

fn fixtures_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../fixtures")
}

fn resolve_path(rel: &str) -> PathBuf {
    fixtures_root().join(rel)
}

fn read_to_string(rel: &str) -> Result<String> {
    let path = resolve_path(rel);
    fs::read_to_string(&path)
        .with_context(|| format!("failed to read fixture at {}", path.display()))
}

/// Names of every page fixture in the manifest.
pub fn page_names() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = MANIFEST.pages.keys().map(String::as_str).collect();
    names.sort_unstable();
    names
}

/// Load a page fixture by manifest name.
pub fn page(name: &str) -> Result<NodeSpec> {
    let rel = MANIFEST
        .pages
        .get(name)
        .ok_or_else(|| anyhow!("page fixture '{name}' not found"))?;
    let raw = read_to_string(rel)?;
    serde_json::from_str(&raw).with_context(|| format!("failed to parse page fixture '{name}'"))
}

// ---------------------------------------------------------------------------
// Builders mirroring the markup the block editor saves.
// ---------------------------------------------------------------------------

/// `<body>` holding the given top-level nodes.
pub fn body(children: Vec<NodeSpec>) -> NodeSpec {
    children
        .into_iter()
        .fold(NodeSpec::new("body"), |acc, child| acc.child(child))
}

/// Accordion container with container-level attributes.
pub fn container(attrs: &[(&str, &str)], items: Vec<NodeSpec>) -> NodeSpec {
    items.into_iter().fold(
        NodeSpec::new("div").class("accordion").attrs(attrs),
        |acc, item| acc.child(item),
    )
}

/// One item: heading toggle plus a bordered panel with two paragraphs
/// (natural panel height 100px, box height 102px).
pub fn item(item_id: &str, attrs: &[(&str, &str)]) -> NodeSpec {
    item_with_panel(item_id, attrs, panel(&[40.0, 60.0]))
}

pub fn item_with_panel(item_id: &str, attrs: &[(&str, &str)], panel: NodeSpec) -> NodeSpec {
    NodeSpec::new("div")
        .class("accordion-item")
        .attr("data-item-id", item_id)
        .attrs(attrs)
        .child(
            NodeSpec::new("h3").child(
                NodeSpec::new("button")
                    .class("accordion-toggle")
                    .height(24.0),
            ),
        )
        .child(panel)
}

/// Content panel whose children have the given heights.
pub fn panel(child_heights: &[f64]) -> NodeSpec {
    child_heights.iter().fold(
        NodeSpec::new("div").class("accordion-content").border(2.0),
        |acc, h| acc.child(NodeSpec::new("p").height(*h)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_manifest_page_parses() {
        for name in page_names() {
            let spec = page(name).unwrap_or_else(|e| panic!("{name}: {e:#}"));
            assert_eq!(spec.tag, "body", "{name} must have a body root");
        }
    }

    #[test]
    fn unknown_page_is_an_error() {
        assert!(page("does-not-exist").is_err());
    }
}
