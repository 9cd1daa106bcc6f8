//! Reactive runtime assembly.
//!
//! The runtime ships as a fixed catalog of capability modules, each with a
//! full body and at most one reduced variant. Building a bundle is a pure
//! selection over the catalog driven by the accumulated feature vector,
//! followed by concatenation. No syntax-level surgery happens here.

use bitflags::bitflags;

bitflags! {
    /// Runtime needs accumulated by OR across every compiled template.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct RuntimeFeatures: u8 {
        const CONDITIONALS = 1;
        const OBSERVABLE_ARRAYS = 1 << 1;
        const OBSERVABLE_DATES = 1 << 2;
        const SUB_OBJECTS = 1 << 3;
        const ISOMORPHIC = 1 << 4;
        const SVG = 1 << 5;
    }
}

impl RuntimeFeatures {
    /// True when the data proxy has to build nested observables.
    pub fn needs_observable_dispatch(&self) -> bool {
        self.intersects(
            RuntimeFeatures::OBSERVABLE_ARRAYS
                | RuntimeFeatures::OBSERVABLE_DATES
                | RuntimeFeatures::SUB_OBJECTS,
        )
    }
}

/// One selected capability module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeModule {
    pub name: &'static str,
    pub source: &'static str,
}

const RENDER: RuntimeModule = RuntimeModule {
    name: "render",
    source: include_str!("js/render.js"),
};
const RENDER_REDUCED: RuntimeModule = RuntimeModule {
    name: "render_reduced",
    source: include_str!("js/render_reduced.js"),
};
const COMMENT: RuntimeModule = RuntimeModule {
    name: "comment",
    source: include_str!("js/comment.js"),
};
const OBSERVABLE: RuntimeModule = RuntimeModule {
    name: "observable",
    source: include_str!("js/observable.js"),
};
const OBSERVABLE_OBJECT: RuntimeModule = RuntimeModule {
    name: "observable_object",
    source: include_str!("js/observable_object.js"),
};
const OBSERVABLE_OBJECT_REDUCED: RuntimeModule = RuntimeModule {
    name: "observable_object_reduced",
    source: include_str!("js/observable_object_reduced.js"),
};
const OBSERVABLE_ARRAY: RuntimeModule = RuntimeModule {
    name: "observable_array",
    source: include_str!("js/observable_array.js"),
};
const OBSERVABLE_DATE: RuntimeModule = RuntimeModule {
    name: "observable_date",
    source: include_str!("js/observable_date.js"),
};
const CONDITIONALS: RuntimeModule = RuntimeModule {
    name: "conditionals",
    source: include_str!("js/conditionals.js"),
};
const EVENTS: RuntimeModule = RuntimeModule {
    name: "events",
    source: include_str!("js/events.js"),
};
const COMPONENT: RuntimeModule = RuntimeModule {
    name: "component",
    source: include_str!("js/component.js"),
};
const COMPONENT_REDUCED: RuntimeModule = RuntimeModule {
    name: "component_reduced",
    source: include_str!("js/component_reduced.js"),
};
const ROUTER: RuntimeModule = RuntimeModule {
    name: "router",
    source: include_str!("js/router.js"),
};

/// The modules a bundle with the given features carries, in definition order.
pub fn select_modules(features: RuntimeFeatures, include_router: bool) -> Vec<RuntimeModule> {
    let mut modules = Vec::new();

    modules.push(if features.contains(RuntimeFeatures::SVG) {
        RENDER
    } else {
        RENDER_REDUCED
    });
    if features.contains(RuntimeFeatures::ISOMORPHIC) {
        modules.push(COMMENT);
    }
    if features.needs_observable_dispatch() {
        modules.push(OBSERVABLE);
        modules.push(OBSERVABLE_OBJECT);
    } else {
        modules.push(OBSERVABLE_OBJECT_REDUCED);
    }
    if features.contains(RuntimeFeatures::OBSERVABLE_ARRAYS) {
        modules.push(OBSERVABLE_ARRAY);
    }
    if features.contains(RuntimeFeatures::OBSERVABLE_DATES) {
        modules.push(OBSERVABLE_DATE);
    }
    if features.contains(RuntimeFeatures::CONDITIONALS) {
        modules.push(CONDITIONALS);
    }
    if features.contains(RuntimeFeatures::ISOMORPHIC) {
        modules.push(EVENTS);
    }
    modules.push(if features.contains(RuntimeFeatures::ISOMORPHIC) {
        COMPONENT
    } else {
        COMPONENT_REDUCED
    });
    if include_router {
        modules.push(ROUTER);
    }
    modules
}

/// The runtime bundle source for one feature vector.
pub fn assemble_runtime(features: RuntimeFeatures, include_router: bool) -> String {
    let modules = select_modules(features, include_router);
    let mut out = String::new();
    for module in modules {
        out.push_str(module.source);
        if !out.ends_with('\n') {
            out.push('\n');
        }
    }
    out
}
