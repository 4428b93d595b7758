//! Subcommand implementations.
//!
//! Each command writes its result to `out` so it can be exercised without a
//! terminal.

use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use clap::Args;
use parcel_crypto::{DeepHashMessage, Ed25519Signer, ed25519_registry};
use parcel_proto::{
    BundleItem, ItemBuilder, SignatureType, Signer as _, Tag, ValidationLimits, Validator,
};
use tracing::info;

use crate::error::CliError;

/// Arguments for `parcel create`.
#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Payload file
    #[arg(long)]
    pub data: PathBuf,

    /// Tag as name=value (repeatable)
    #[arg(long = "tag", value_parser = parse_tag)]
    pub tags: Vec<Tag>,

    /// Target as 64 hex characters
    #[arg(long, value_parser = parse_field)]
    pub target: Option<[u8; 32]>,

    /// Anchor as 64 hex characters
    #[arg(long, value_parser = parse_field)]
    pub anchor: Option<[u8; 32]>,

    /// Ed25519 seed as 64 hex characters
    #[arg(long, env = "PARCEL_ED25519_SEED", hide_env_values = true, value_parser = parse_field)]
    pub seed: [u8; 32],

    /// Sign as a Solana item (type 4) instead of Ed25519 (type 2)
    #[arg(long)]
    pub solana: bool,

    /// Output file
    #[arg(long)]
    pub out: PathBuf,
}

/// Validator over every built-in signature type with Ed25519 verifiers.
pub fn validator(max_tag_block: u64) -> Validator {
    let limits = ValidationLimits { max_tag_block_size: max_tag_block, ..ValidationLimits::default() };
    Validator::new(ed25519_registry()).with_limits(limits)
}

/// Check the structure of the item at `path` and print its JSON projection.
pub fn inspect(path: &Path, validator: &Validator, out: &mut impl Write) -> Result<(), CliError> {
    let buf = read(path)?;
    validator.check_structure(&buf)?;
    let item = BundleItem::new(buf.as_slice(), validator.registry())?;

    serde_json::to_writer_pretty(&mut *out, &item.to_json()?)?;
    writeln!(out)?;
    Ok(())
}

/// Check the structure of the item at `path` and print its identifier.
pub fn id(path: &Path, validator: &Validator, out: &mut impl Write) -> Result<(), CliError> {
    let buf = read(path)?;
    validator.check_structure(&buf)?;
    let item = BundleItem::new(buf.as_slice(), validator.registry())?;
    writeln!(out, "{}", item.id())?;
    Ok(())
}

/// Validate the item at `path`, signature included, and print its identifier.
///
/// A rejected signature is returned as [`parcel_proto::ItemError::SignatureInvalid`].
pub async fn verify(
    path: &Path,
    validator: &Validator,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let buf = read(path)?;
    validator.validate(&buf, &DeepHashMessage).await?;
    let item = BundleItem::new(buf.as_slice(), validator.registry())?;
    writeln!(out, "valid {}", item.id())?;
    Ok(())
}

/// Build an item from `args`, sign it with the Ed25519 seed and write it to
/// `args.out`. Prints the new identifier.
pub async fn create(
    args: &CreateArgs,
    max_tag_block: u64,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let data = read(&args.data)?;

    let mut signer = Ed25519Signer::from_seed(&args.seed);
    if args.solana {
        signer = signer.with_signature_type(SignatureType::SOLANA)?;
    }

    let mut builder = ItemBuilder::new(signer.signature_type())
        .tags(args.tags.iter().cloned())
        .max_tag_block_size(max_tag_block);
    if let Some(target) = args.target {
        builder = builder.target(target);
    }
    if let Some(anchor) = args.anchor {
        builder = builder.anchor(anchor);
    }

    let mut item = builder.build(&data)?;
    let id = item.sign(&signer, &DeepHashMessage).await?;
    fs::write(&args.out, item.as_bytes())
        .map_err(|source| CliError::File { path: args.out.clone(), source })?;

    info!(%id, path = %args.out.display(), len = item.len(), "item written");
    writeln!(out, "{id}")?;
    Ok(())
}

fn read(path: &Path) -> Result<Vec<u8>, CliError> {
    fs::read(path).map_err(|source| CliError::File { path: path.to_path_buf(), source })
}

fn parse_tag(arg: &str) -> Result<Tag, String> {
    let (name, value) =
        arg.split_once('=').ok_or_else(|| format!("expected name=value, got {arg:?}"))?;
    Ok(Tag::new(name, value))
}

fn parse_field(arg: &str) -> Result<[u8; 32], String> {
    let mut field = [0u8; 32];
    hex::decode_to_slice(arg, &mut field).map_err(|e| e.to_string())?;
    Ok(field)
}
