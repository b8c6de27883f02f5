use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use adb_sdk::{ContentId, Contract, Db, NetworkId, ResourceKind};
use adb_server::{AdbConfig, AdbServer};
use anyhow::{bail, Context};
use colored::Colorize;
use serde_json::Value;

use crate::cli::*;

pub fn load_config(cli: &Cli) -> anyhow::Result<AdbConfig> {
    Ok(AdbConfig::load_or_default(&cli.config)?)
}

pub fn run_command(cli: Cli, config: AdbConfig) -> anyhow::Result<()> {
    let network = cli
        .network
        .map(NetworkId::from)
        .or_else(|| config.network.default_network_id.clone());
    let ctx = Ctx {
        config,
        format: cli.format,
        network,
    };

    match cli.command {
        Command::Load(args) => cmd_load(&ctx, args),
        Command::Query(args) => cmd_query(&ctx, args),
        Command::Show(args) => cmd_show(&ctx, args),
        Command::Link(args) => cmd_link(&ctx, args),
        Command::Events(args) => cmd_events(&ctx, args),
        Command::Serve(args) => cmd_serve(ctx, args),
        Command::Config(args) => cmd_config(&ctx, args, &cli.config),
    }
}

struct Ctx {
    config: AdbConfig,
    format: OutputFormat,
    network: Option<NetworkId>,
}

impl Ctx {
    fn artifacts_dir(&self, arg: &ArtifactsArg) -> anyhow::Result<PathBuf> {
        match arg.artifacts.clone().or_else(|| self.config.server.artifacts_dir.clone()) {
            Some(dir) => Ok(dir),
            None => bail!("no artifacts directory: pass --artifacts or set server.artifacts_dir"),
        }
    }

    fn open_db(&self, arg: &ArtifactsArg) -> anyhow::Result<(Db, Vec<(String, Option<ContentId>)>)> {
        let dir = self.artifacts_dir(arg)?;
        let db = Db::new().with_build_dir(&dir);
        let loaded = db
            .load_build_dir()
            .with_context(|| format!("loading artifacts from {}", dir.display()))?;
        Ok((db, loaded))
    }

    fn contract(&self, arg: &ArtifactsArg, name: &str) -> anyhow::Result<Arc<Contract>> {
        let (db, _) = self.open_db(arg)?;
        Ok(db.contract(name)?)
    }

    fn print_json(&self, value: &Value) -> anyhow::Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }
}

fn cmd_load(ctx: &Ctx, args: LoadArgs) -> anyhow::Result<()> {
    let (db, loaded) = ctx.open_db(&args.artifacts)?;
    let count = |kind| db.store().count(kind).unwrap_or_default();

    if ctx.format == OutputFormat::Json {
        let contracts: Vec<&str> = loaded.iter().map(|(name, _)| name.as_str()).collect();
        return ctx.print_json(&serde_json::json!({
            "contracts": contracts,
            "sources": count(ResourceKind::Source),
            "bytecodes": count(ResourceKind::Bytecode),
            "compilations": count(ResourceKind::Compilation),
        }));
    }

    for (name, compilation) in &loaded {
        let compilation = compilation
            .map(|id| id.short_hex())
            .unwrap_or_else(|| "-".into());
        println!("  {} {}  compilation {}", "loaded:".green(), name.bold(), compilation.dimmed());
    }
    println!(
        "{} {} contracts: {} sources, {} bytecodes, {} compilations",
        "✓".green().bold(),
        loaded.len(),
        count(ResourceKind::Source),
        count(ResourceKind::Bytecode),
        count(ResourceKind::Compilation),
    );
    Ok(())
}

fn cmd_query(ctx: &Ctx, args: QueryArgs) -> anyhow::Result<()> {
    let variables: Value = match &args.variables {
        Some(text) => serde_json::from_str(text).context("--variables is not valid JSON")?,
        None => Value::Null,
    };
    let db = if args.artifacts.artifacts.is_some() || ctx.config.server.artifacts_dir.is_some() {
        ctx.open_db(&args.artifacts)?.0
    } else {
        Db::new()
    };

    let response = db.execute(args.document.as_str(), &variables);
    ctx.print_json(&serde_json::to_value(&response)?)?;
    if !response.is_ok() {
        bail!("query failed");
    }
    Ok(())
}

fn cmd_show(ctx: &Ctx, args: ContractArgs) -> anyhow::Result<()> {
    let contract = ctx.contract(&args.artifacts, &args.name)?;
    if ctx.format == OutputFormat::Json {
        return ctx.print_json(&serde_json::to_value(contract.to_raw()?)?);
    }

    let artifact = contract.artifact();
    println!("{}", contract.name().bold());
    if let Some(compiler) = artifact.compiler() {
        println!("  Compiler: {} {}", compiler.name, compiler.version.cyan());
    }
    if let Some(path) = artifact.source().and_then(|s| s.source_path.as_deref()) {
        println!("  Source: {path}");
    }
    println!("  ABI entries: {}", artifact.abi().len());
    println!("  Number format: {}", artifact.options().number_format);

    let networks = contract.networks().networks()?;
    if networks.is_empty() {
        println!("  Networks: {}", "none".dimmed());
    }
    for (id, record) in &networks {
        let address = record
            .address
            .as_ref()
            .map(|a| a.to_string().yellow().to_string())
            .unwrap_or_else(|| "not deployed".red().to_string());
        let marker = if ctx.network.as_ref() == Some(id) { "*" } else { " " };
        println!("  {marker} network {}: {address}", id.to_string().bold());
        for (name, link) in &record.links {
            println!("      link {name} → {link}");
        }
    }
    Ok(())
}

fn cmd_link(ctx: &Ctx, args: LinkArgs) -> anyhow::Result<()> {
    let contract = ctx.contract(&args.artifacts, &args.name)?;
    let network = ctx.network.as_ref();
    let binary = if args.deployed {
        contract.deployed_binary(network)?
    } else {
        contract.binary(network)?
    };
    if ctx.format == OutputFormat::Json {
        return ctx.print_json(&serde_json::json!({
            "contract": contract.name(),
            "network": network,
            "binary": binary,
        }));
    }
    println!("{binary}");
    Ok(())
}

fn cmd_events(ctx: &Ctx, args: ContractArgs) -> anyhow::Result<()> {
    let contract = ctx.contract(&args.artifacts, &args.name)?;
    let events = contract.events(ctx.network.as_ref())?;
    if ctx.format == OutputFormat::Json {
        return ctx.print_json(&serde_json::to_value(&events)?);
    }
    if events.is_empty() {
        println!("No events.");
    }
    for (key, entry) in &events {
        println!("{}  {}", key.yellow(), entry.canonical_signature());
    }
    Ok(())
}

fn cmd_serve(ctx: Ctx, args: ServeArgs) -> anyhow::Result<()> {
    let mut config = ctx.config;
    if let Some(bind) = args.bind {
        config.server.bind_addr = bind
            .parse()
            .with_context(|| format!("invalid bind address {bind:?}"))?;
    }
    if let Some(dir) = args.artifacts.artifacts {
        config.server.artifacts_dir = Some(dir);
    }
    let server = AdbServer::with_artifacts(config)?;
    println!(
        "{} ADB server on {}",
        "✓".green().bold(),
        server.config().server.bind_addr.to_string().bold()
    );
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(server.serve())?;
    Ok(())
}

fn cmd_config(ctx: &Ctx, args: ConfigArgs, path: &Path) -> anyhow::Result<()> {
    let text = ctx.config.to_toml()?;
    if args.init {
        if path.exists() {
            bail!("{} already exists", path.display());
        }
        fs::write(path, &text).with_context(|| format!("writing {}", path.display()))?;
        println!("{} Wrote {}", "✓".green().bold(), path.display());
        return Ok(());
    }
    if ctx.format == OutputFormat::Json {
        return ctx.print_json(&serde_json::to_value(&ctx.config)?);
    }
    print!("{text}");
    Ok(())
}
