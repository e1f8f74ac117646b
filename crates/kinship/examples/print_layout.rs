//! Lays out a pedigree from a JSON file and prints every node's placement.
//!
//! ```text
//! cargo run -p kinship --example print_layout -- demos/three_generations.json
//! ```

use std::{env, fs, process};

use kinship::{LayoutEngine, layout::routing::EdgeKind};

fn main() {
    let Some(path) = env::args().nth(1) else {
        eprintln!("usage: print_layout <records.json>");
        process::exit(2);
    };

    let source = fs::read_to_string(&path).expect("Failed to read input");
    let records = LayoutEngine::parse_records(&source).expect("Failed to parse records");
    let layout = LayoutEngine::default()
        .layout(&records)
        .expect("Failed to lay out pedigree");

    println!(
        "{} x {} px, {} crossings",
        layout.width(),
        layout.height(),
        layout.crossings()
    );
    for (id, annotation) in layout.annotations() {
        println!(
            "{:<24} gen {} rank {} at ({:.1}, {:.1})",
            id.as_string(),
            annotation.height_index(),
            annotation.order(),
            annotation.x(),
            annotation.y()
        );
    }

    let routed = layout
        .edges()
        .iter()
        .filter(|edge| edge.kind() == EdgeKind::Adjustable)
        .count();
    println!("{} edges, {routed} routed", layout.edges().len());

    for warning in layout.warnings() {
        println!("{warning}");
    }
}
