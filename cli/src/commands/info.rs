use optiscan_core::ToolRegistry;

use crate::terminal::print;

pub fn info() {
    let mut registry = ToolRegistry::new();
    optiscan_tools::register_builtin(&mut registry);

    print::aligned_line("Version", env!("CARGO_PKG_VERSION"));
    print::aligned_line("Tools", registry.len().to_string());
    print::aligned_line("Ceiling", "1024 units (2048 aggressive)");
    print::aligned_line("Width", "8 units in flight");
    print::aligned_line("Timeout", "2000 ms per unit");
}
