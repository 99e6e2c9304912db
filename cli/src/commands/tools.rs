use colored::*;

use optiscan_core::ToolRegistry;

use crate::mprint;
use crate::terminal::{colors, print};

pub fn list() {
    let mut registry = ToolRegistry::new();
    optiscan_tools::register_builtin(&mut registry);

    let entries = registry.entries();
    for (idx, (name, description)) in entries.iter().enumerate() {
        print::tree_head(idx, name);
        print::as_tree_one_level(vec![(
            "About".to_string(),
            description.color(colors::TEXT_DEFAULT),
        )]);
        if idx + 1 != entries.len() {
            mprint!();
        }
    }
}
