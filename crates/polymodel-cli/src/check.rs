//! # Check Subcommand
//!
//! `polymodel check --definitions <file> <document.json>` deserializes a
//! wire document, validates it and prints the normalised re-serialization.
//!
//! Exit codes: `0` valid, `2` validation failed, `1` anything else
//! (unreadable files, bad JSON, unknown discriminators, type mismatches).

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use polymodel_codec::{serialize_with, Codec, SerializeOptions};
use polymodel_core::ValidationError;
use serde_json::Value;

use crate::load_registry;

/// Arguments for the `polymodel check` subcommand.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Definition set (YAML or JSON).
    #[arg(long, short)]
    pub definitions: PathBuf,

    /// JSON wire document to check.
    pub document: PathBuf,

    /// Require the document to be this variant or one of its descendants.
    #[arg(long = "as", value_name = "VARIANT")]
    pub base: Option<String>,

    /// Print the re-serialization without validating first.
    #[arg(long)]
    pub skip_validation: bool,

    /// Serialize as a request body (read-only fields omitted).
    #[arg(long)]
    pub request: bool,

    /// Print compact JSON instead of pretty-printed.
    #[arg(long)]
    pub compact: bool,
}

/// What to do with a document once it is deserialized.
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    pub base: Option<String>,
    pub skip_validation: bool,
    pub request: bool,
}

impl From<&CheckArgs> for CheckOptions {
    fn from(args: &CheckArgs) -> Self {
        Self {
            base: args.base.clone(),
            skip_validation: args.skip_validation,
            request: args.request,
        }
    }
}

/// Result of checking one document.
#[derive(Debug)]
pub enum CheckOutcome {
    /// The normalised wire form.
    Normalized(Value),
    /// The document decoded but failed validation.
    Invalid(ValidationError),
}

/// Execute the check subcommand.
pub fn run_check(args: &CheckArgs) -> Result<u8> {
    let codec = Codec::new(load_registry(&args.definitions)?);
    let text = std::fs::read_to_string(&args.document)
        .with_context(|| format!("reading {}", args.document.display()))?;

    let outcome = check_document(&codec, &text, &CheckOptions::from(args))
        .with_context(|| format!("checking {}", args.document.display()))?;

    match outcome {
        CheckOutcome::Normalized(doc) => {
            let rendered = if args.compact {
                serde_json::to_string(&doc)?
            } else {
                serde_json::to_string_pretty(&doc)?
            };
            println!("{rendered}");
            Ok(0)
        }
        CheckOutcome::Invalid(err) => {
            eprintln!("{}: {err}", args.document.display());
            Ok(2)
        }
    }
}

/// Deserialize, optionally validate, and re-serialize `text`.
///
/// Decoding failures are errors; validation failures are an outcome.
pub fn check_document(codec: &Codec, text: &str, options: &CheckOptions) -> Result<CheckOutcome> {
    let doc: Value = serde_json::from_str(text).context("document is not valid JSON")?;
    let instance = match &options.base {
        Some(base) => codec.deserialize_as(&doc, base)?,
        None => codec.deserialize(&doc)?,
    };
    tracing::info!(variant = instance.discriminator(), "decoded document");

    if options.skip_validation {
        let serialize_options = if options.request {
            SerializeOptions::request()
        } else {
            SerializeOptions::default()
        };
        return Ok(CheckOutcome::Normalized(serialize_with(&instance, serialize_options)));
    }

    let normalized = if options.request {
        codec.prepare_request(&instance)
    } else {
        instance.validate().map(|()| codec.serialize(&instance))
    };
    Ok(match normalized {
        Ok(doc) => CheckOutcome::Normalized(doc),
        Err(err) => CheckOutcome::Invalid(err),
    })
}
