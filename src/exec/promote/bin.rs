use std::{path::Path, process};

use tagforge::{
    ForgeError, GameCache, InstancedGeometryToObjectConverter, PromoteLayoutFile, TagStream,
    tags::Scenario, validate_layout,
};
use tracing::{info, warn};

#[derive(Debug, Default)]
struct Cli {
    layout: PromoteLayoutFile,
    list: bool,
}

fn main() {
    let mut args = std::env::args();
    let program = args.next().unwrap_or_else(|| "promote".to_string());

    let cli = match parse_command(&program, args) {
        Ok(cli) => cli,
        Err(err) => {
            eprintln!("{err}");
            print_usage(&program);
            process::exit(1);
        }
    };

    init_logging();

    if let Err(err) = run(&cli) {
        eprintln!("{err}");
        process::exit(1);
    }
}

fn init_logging() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn parse_command(program: &str, args: impl Iterator<Item = String>) -> Result<Cli, String> {
    let mut args: Vec<String> = args.collect();

    // The layout file is the base; flags given alongside it override it.
    let mut cli = Cli::default();
    if let Some(position) = args.iter().position(|arg| arg == "--layout") {
        let Some(path) = args.get(position + 1).cloned() else {
            return Err("--layout requires a layout file path".into());
        };
        cli.layout = PromoteLayoutFile::from_file(&path)
            .map_err(|err| format!("failed to read layout {path}: {err}"))?;
        args.drain(position..=position + 1);
    }

    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print_usage(program);
                process::exit(0);
            }
            "--source" => {
                cli.layout.source = next_value(&mut args, "--source", "a cache path")?;
            }
            "--dest" => {
                cli.layout.dest = next_value(&mut args, "--dest", "a cache path")?;
            }
            "--scenario" => {
                cli.layout.scenario = next_value(&mut args, "--scenario", "a scenario tag name")?;
            }
            "--bsp" => {
                let value = next_value(&mut args, "--bsp", "a structure bsp index")?;
                cli.layout.structure_bsp = value
                    .parse::<usize>()
                    .map_err(|_| "--bsp expects a non-negative integer".to_string())?;
            }
            "--instance" => {
                let value = next_value(&mut args, "--instance", "an instance name")?;
                cli.layout.instances.push(value);
            }
            "--all" => {
                cli.layout.all = true;
            }
            "--list" => {
                cli.list = true;
            }
            other => {
                return Err(format!("unexpected argument: {other}"));
            }
        }
    }

    Ok(cli)
}

fn next_value(
    args: &mut impl Iterator<Item = String>,
    flag: &str,
    what: &str,
) -> Result<String, String> {
    args.next()
        .ok_or_else(|| format!("{flag} requires {what}"))
}

fn run(cli: &Cli) -> Result<(), ForgeError> {
    let layout = &cli.layout;
    if cli.list {
        if layout.scenario.is_empty() {
            return Err(ForgeError::Layout("no scenario tag given".to_string()));
        }
    } else {
        validate_layout(layout)?;
    }

    let (source_cache, source_stream) = GameCache::load(&layout.source)?;
    let scenario_tag = source_cache
        .try_get_tag::<Scenario>(&layout.scenario)
        .ok_or_else(|| ForgeError::Layout(format!("no scenario named '{}'", layout.scenario)))?;
    let scenario: Scenario = source_cache.deserialize(&source_stream, scenario_tag)?;

    let (mut dest_cache, mut dest_stream) = if Path::new(&layout.dest).exists() {
        GameCache::load(&layout.dest)?
    } else {
        (GameCache::new(), TagStream::new())
    };

    let mut converter = InstancedGeometryToObjectConverter::new(
        &mut dest_cache,
        &mut dest_stream,
        &source_cache,
        &source_stream,
        &scenario,
        layout.structure_bsp,
    )?
    .with_defaults(layout.object_defaults.clone());

    if cli.list {
        for (index, name) in converter.instance_names()?.iter().enumerate() {
            println!("{index:>4}  {name:<32}  {}", converter.object_tag_name(index)?);
        }
        return Ok(());
    }

    let promoted = if layout.all {
        converter.convert_all()?.len()
    } else {
        let mut promoted = 0;
        for name in &layout.instances {
            match converter.convert(name)? {
                Some(_) => promoted += 1,
                None => warn!(resource = "instance", entry = %name, "no instance with this name"),
            }
        }
        promoted
    };
    drop(converter);

    dest_cache.save(&dest_stream, &layout.dest)?;
    info!(
        resource = "cache",
        path = %layout.dest,
        promoted,
        "promotion finished"
    );
    Ok(())
}

fn print_usage(program: &str) {
    eprintln!("Usage:");
    eprintln!("  {program} --layout <promote.json> [options]");
    eprintln!(
        "  {program} --source <cache> --dest <cache> --scenario <tag> [--bsp <index>] (--instance <name>... | --all)"
    );
    eprintln!("  {program} --source <cache> --scenario <tag> [--bsp <index>] --list");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --layout <FILE>     Read settings from a JSON layout file");
    eprintln!("  --source <CACHE>    Cache holding the scenario (default source.rdb)");
    eprintln!("  --dest <CACHE>      Cache to write objects into, created if missing (default dest.rdb)");
    eprintln!("  --scenario <TAG>    Scenario tag name in the source cache");
    eprintln!("  --bsp <INDEX>       Structure BSP index within the scenario (default 0)");
    eprintln!("  --instance <NAME>   Promote the named instance; repeatable");
    eprintln!("  --all               Promote every instance of the structure BSP");
    eprintln!("  --list              Print instance names and their object tag names");
    eprintln!("  -h, --help          Show this help message");
    eprintln!();
    eprintln!("Logging follows RUST_LOG (default info).");
}
