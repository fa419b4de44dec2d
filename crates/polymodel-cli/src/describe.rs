//! # Describe Subcommand
//!
//! `polymodel describe --definitions <file>` prints each variant in
//! registration order with its ancestry and the full field table,
//! inherited fields first.

use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use polymodel_core::{TypeRegistry, VariantDescriptor};

use crate::load_registry;

/// Arguments for the `polymodel describe` subcommand.
#[derive(Args, Debug)]
pub struct DescribeArgs {
    /// Definition set (YAML or JSON).
    #[arg(long, short)]
    pub definitions: PathBuf,

    /// Only describe this variant and its descendants.
    #[arg(long)]
    pub family: Option<String>,
}

/// Execute the describe subcommand.
pub fn run_describe(args: &DescribeArgs) -> Result<u8> {
    let registry = load_registry(&args.definitions)?;
    if let Some(family) = &args.family {
        registry.resolve(family)?;
    }
    print!("{}", describe(&registry, args.family.as_deref()));
    Ok(0)
}

/// Render the description of every variant (or of one family subtree).
pub fn describe(registry: &TypeRegistry, family: Option<&str>) -> String {
    let mut out = String::new();
    let selected = registry
        .variants()
        .filter(|v| family.map_or(true, |base| v.is_a(base)));
    for (i, variant) in selected.enumerate() {
        if i > 0 {
            out.push('\n');
        }
        describe_variant(&mut out, variant);
    }
    out
}

fn describe_variant(out: &mut String, variant: &VariantDescriptor) {
    let ancestry: Vec<&str> = variant.ancestry().into_iter().map(|v| v.discriminator()).collect();
    let _ = writeln!(
        out,
        "{} ({}={:?})",
        ancestry.join(" > "),
        variant.discriminator_property(),
        variant.discriminator()
    );

    let width = variant.fields().map(|(_, f)| f.name().len()).max().unwrap_or(0);
    for (level, field) in variant.fields() {
        let mut line = format!("  {:<width$}  {}", field.name(), field.kind());
        if field.wire() != field.name() {
            let _ = write!(line, "  wire={}", field.wire_path());
        }
        if field.is_required() {
            line.push_str("  required");
        }
        if field.is_read_only() {
            line.push_str("  read-only");
        }
        for constraint in field.constraints() {
            let _ = write!(line, "  {constraint}");
        }
        if level.discriminator() != variant.discriminator() {
            let _ = write!(line, "  (from {})", level.discriminator());
        }
        let _ = writeln!(out, "{line}");
    }
    if variant.validate_hook().is_some() {
        let _ = writeln!(out, "  [hook]");
    }
}
