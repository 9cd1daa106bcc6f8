//! HTML Tag Tables
//!
//! Void element, boolean attribute and SVG tag sets consulted by the walker
//! and both code generators.

use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Elements that never take children and render without a closing tag.
pub static VOID_ELEMENTS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
        "source", "track", "wbr",
    ]
    .into_iter()
    .collect()
});

/// Attributes whose presence (not value) carries the state. The client
/// renderer assigns them as element properties with boolean values.
pub static BOOLEAN_ATTRIBUTES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "allowfullscreen", "async", "autofocus", "autoplay", "checked", "controls", "default",
        "defer", "disabled", "formnovalidate", "hidden", "ismap", "loop", "multiple", "muted",
        "novalidate", "open", "readonly", "required", "reversed", "selected",
    ]
    .into_iter()
    .collect()
});

/// Tags that must be created in the SVG namespace on the client.
pub static SVG_ELEMENTS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "svg", "animate", "circle", "clipPath", "defs", "ellipse", "foreignObject", "g", "image",
        "line", "linearGradient", "marker", "mask", "path", "pattern", "polygon", "polyline",
        "radialGradient", "rect", "stop", "symbol", "text", "textPath", "tspan", "use", "view",
    ]
    .into_iter()
    .collect()
});
