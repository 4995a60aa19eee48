//! Commands that need no daemon

use anyhow::anyhow;
use periph_device::{find_class, CLASSES};
use periphd::handler_registry;

use super::CommandResult;

/// Print every known device class
pub fn classes() -> CommandResult {
    println!("{:<18} {:<10} {:<8} Methods", "Class", "Type", "Matrix");
    println!("{}", "-".repeat(48));
    for class in CLASSES {
        let matrix = class
            .matrix_dims
            .map(|(rows, cols)| format!("{rows}x{cols}"))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<18} {:<10} {:<8} {}",
            class.name,
            class.device_type,
            matrix,
            class.methods().count()
        );
    }
    Ok(())
}

/// Print the methods a class exposes, grouped by interface
pub fn methods(class_name: &str) -> CommandResult {
    let class = find_class(class_name).ok_or_else(|| anyhow!("unknown class: {class_name}"))?;
    let registry = handler_registry();

    let mut current = "";
    for (interface, method) in class.methods() {
        if interface != current {
            println!("{interface}");
            current = interface;
        }
        let marker = if registry.contains(interface, method) {
            ""
        } else {
            " (no handler)"
        };
        println!("  {method}{marker}");
    }
    Ok(())
}
