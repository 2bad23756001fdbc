//! `stanza platform` - show the platform profile for this host

use anyhow::{Context as AnyhowContext, Result};
use platform::{PlatformProfile, Product};

use super::declarative::Session;
use crate::Context;
use crate::cli::PlatformArgs;
use crate::ui;

pub fn run(ctx: &Context, args: &PlatformArgs) -> Result<()> {
    let session = Session::load(ctx, false).ok();
    let manifest = session.as_ref().map(|s| &s.manifest);

    let product: Product = args
        .product
        .or_else(|| manifest.map(|m| m.product))
        .unwrap_or_default();
    let release = args
        .release
        .clone()
        .or_else(|| manifest.and_then(|m| m.release.clone()))
        .unwrap_or_default();

    let facts = platform::detect(&release);
    log::debug!("Host facts: {facts:?}");
    let profile = platform::profile(&facts, product)
        .with_context(|| format!("No {product} profile for this host"))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&profile)?);
    } else {
        print_profile(&profile);
    }
    Ok(())
}

fn print_profile(profile: &PlatformProfile) {
    ui::header(&format!("Platform profile ({})", profile.product));
    ui::kv("Kernel", &format!("{:?}", profile.kernel));
    ui::kv("Architecture", &format!("{:?}", profile.arch));

    ui::section("Package");
    ui::kv("Name", &profile.package_name);
    ui::kv("Format", &format!("{:?}", profile.package_format));
    match &profile.package_file {
        Some(file) => ui::kv("File", file),
        None => ui::kv("Suffix", &profile.package_suffix),
    }

    ui::section("Paths");
    ui::kv("Home", &profile.home_dir.display().to_string());
    ui::kv("Settings", &profile.conf_dir.display().to_string());

    ui::section("Service");
    ui::kv("Name", &profile.service.name);
    ui::kv("Manager", &profile.service.provider.to_string());
}
