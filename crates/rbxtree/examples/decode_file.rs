//! Simple decoder to inspect place and model files.
//!
//! ```text
//! cargo run --example decode_file -- path/to/place.rbxl [format]
//! RUST_LOG=rbxtree=debug cargo run --example decode_file -- model.rbxmx
//! ```

use rbxtree::format::source::read_file;
use rbxtree::{Dom, FormatRegistry, Ref, Value};
use tracing_subscriber::EnvFilter;

fn format_value(v: &Value) -> String {
    match v {
        Value::String(s) | Value::ProtectedString(s) | Value::Content(s) => {
            let preview: String = s.chars().take(60).collect();
            if s.chars().count() > 60 {
                format!("\"{}...\"", preview)
            } else {
                format!("\"{}\"", preview)
            }
        }
        Value::BinaryString(b) | Value::SharedString(b) => format!("BYTES[{}]", b.len()),
        Value::Instance(r) => format!("-> {}", r),
        other => format!("{} ({})", other, other.type_name()),
    }
}

fn print_tree(dom: &Dom, r: Ref, depth: usize, stats: &mut (usize, usize)) {
    let Some(inst) = dom.get(r) else { return };
    let indent = "  ".repeat(depth);
    let service = if inst.is_service { " [service]" } else { "" };
    println!("{}{} {} ({}){}", indent, r, inst.name(), inst.class_name, service);
    for (name, value) in inst.properties.iter() {
        println!("{}    .{} = {}", indent, name, format_value(value));
    }
    stats.0 += 1;
    stats.1 += inst.properties.len();
    for child in inst.children() {
        print_tree(dom, *child, depth + 1, stats);
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let Some(path) = args.next() else {
        eprintln!("usage: decode_file <path> [format]");
        std::process::exit(2);
    };
    let format = args.next();

    println!("Reading: {}", path);
    let registry = FormatRegistry::standard();
    let doc = match read_file(&registry, &path, format.as_deref()) {
        Ok(doc) => doc,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    };

    println!("\n=== Instances ===");
    let mut stats = (0, 0);
    for object in doc.objects() {
        print_tree(&doc.dom, object, 0, &mut stats);
    }

    println!("\n=== Summary ===");
    println!("Instances: {}", stats.0);
    println!("Properties: {}", stats.1);
}
