use std::path::PathBuf;

use {
    anyhow::{Context, Result, bail},
    clap::Args,
    webcall_config::{Decimal, PropertyLoader, ResourceRoots, SystemProperties, parse_number},
};

/// Where properties come from. Every flag may be repeated.
#[derive(Args, Debug, Default)]
pub struct SourceArgs {
    /// Property file to load, in order.
    #[arg(short = 'p', long = "props", value_name = "FILE", global = true)]
    pub props: Vec<PathBuf>,

    /// Resource to load from the resource roots, after the files.
    #[arg(long = "resource", value_name = "PATH", global = true)]
    pub resources: Vec<String>,

    /// Directory searched for resources, before `WEBCALL_RESOURCE_PATH`.
    #[arg(long = "resource-root", value_name = "DIR", global = true)]
    pub resource_roots: Vec<PathBuf>,

    /// Process-wide property visible to `${jvm.NAME}` placeholders.
    #[arg(short = 'D', value_name = "NAME=VALUE", value_parser = parse_define, global = true)]
    pub defines: Vec<(String, String)>,
}

fn parse_define(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        },
        _ => Err(format!("expected NAME=VALUE, got `{s}`")),
    }
}

pub fn build_loader(args: &SourceArgs) -> Result<PropertyLoader> {
    for (name, value) in &args.defines {
        SystemProperties::set(name.as_str(), value.as_str());
    }

    let mut roots = ResourceRoots::new(&args.resource_roots);
    for root in ResourceRoots::from_env().roots() {
        roots.push(root.clone());
    }

    let mut props = PropertyLoader::new()
        .with_logger_name("webcall")
        .with_resources(roots);
    for path in &args.props {
        props
            .load_file(path)
            .with_context(|| format!("failed to load properties from {}", path.display()))?;
    }
    for resource in &args.resources {
        props
            .load_resource(resource)
            .with_context(|| format!("failed to load resource {resource}"))?;
    }
    Ok(props)
}

pub fn get(props: &PropertyLoader, key: &str, default: Option<&str>, numeric: bool) -> Result<()> {
    println!("{}", lookup(props, key, default, numeric)?);
    Ok(())
}

fn lookup(props: &PropertyLoader, key: &str, default: Option<&str>, numeric: bool) -> Result<String> {
    if numeric {
        let fallback = match default {
            Some(d) => parse_number(d).with_context(|| format!("default `{d}` is not a number"))?,
            None => Decimal::ZERO,
        };
        return Ok(props.numeric_value_or(key, fallback).to_string());
    }
    match (props.value(key), default) {
        (Some(value), _) => Ok(value),
        (None, Some(d)) => Ok(props.value_or(key, d)),
        (None, None) => bail!("property {key} is not defined"),
    }
}

pub fn keys(props: &PropertyLoader) {
    for key in props.keys() {
        println!("{key}");
    }
}
