use std::process;
use std::sync::Arc;

use anyhow::Context;
use lotkeeper::{
    Allocator, LARGE_SPOTS_ENV, LotConfig, MEDIUM_SPOTS_ENV, Request, RequestClass,
    SMALL_SPOTS_ENV, SpotClass,
};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Default, PartialEq)]
struct Args {
    small: Option<usize>,
    medium: Option<usize>,
    large: Option<usize>,
    json: bool,
    concurrent: Option<usize>,
}

fn main() {
    init_tracing();

    let args: Vec<String> = std::env::args().collect();
    let args = match parse_args(&args) {
        Ok(v) => v,
        Err(msg) => {
            if !msg.is_empty() {
                eprintln!("error: {msg}");
                eprintln!();
            }
            eprintln!("Usage: lotkeeper-demo [--small <n>] [--medium <n>] [--large <n>] [--json] [--concurrent <n>]");
            eprintln!();
            eprintln!("Options:");
            eprintln!("  --small <n>       Small (moto) spots [default: $LOTKEEPER_SMALL_SPOTS or 2]");
            eprintln!("  --medium <n>      Medium (car) spots [default: $LOTKEEPER_MEDIUM_SPOTS or 5]");
            eprintln!("  --large <n>       Large (van) spots [default: $LOTKEEPER_LARGE_SPOTS or 2]");
            eprintln!("  --json            Print the final occupancy snapshot as JSON");
            eprintln!("  --concurrent <n>  Race <n> vans against a fresh lot afterwards");
            process::exit(2);
        }
    };

    if let Err(e) = run(&args) {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

/// Initialize tracing: RUST_LOG wins, then LOTKEEPER_LOG, then `info`.
/// LOG_FORMAT=json switches to JSON lines. Everything goes to stderr.
fn init_tracing() {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = match std::env::var("LOTKEEPER_LOG").as_deref() {
            Ok("debug") => "debug",
            Ok("warn") | Ok("warning") => "warn",
            Ok("error") => "error",
            _ => "info",
        };
        EnvFilter::new(format!("lotkeeper={level},lotkeeper_demo={level}"))
    };

    let use_json = std::env::var("LOG_FORMAT").as_deref() == Ok("json");

    if use_json {
        let subscriber = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr));
        let _ = subscriber.try_init();
    } else {
        let subscriber = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr));
        let _ = subscriber.try_init();
    }
}

fn parse_args(args: &[String]) -> Result<Args, String> {
    fn count(flag: &str, value: Option<&String>) -> Result<usize, String> {
        let value = value.ok_or_else(|| format!("{flag} requires a value"))?;
        value
            .parse()
            .map_err(|_| format!("{flag} expects a non-negative integer, got '{value}'"))
    }

    let mut parsed = Args::default();
    let mut i = 1; // skip argv[0]
    while i < args.len() {
        match args[i].as_str() {
            "--small" => {
                i += 1;
                parsed.small = Some(count("--small", args.get(i))?);
            }
            "--medium" => {
                i += 1;
                parsed.medium = Some(count("--medium", args.get(i))?);
            }
            "--large" => {
                i += 1;
                parsed.large = Some(count("--large", args.get(i))?);
            }
            "--concurrent" => {
                i += 1;
                parsed.concurrent = Some(count("--concurrent", args.get(i))?);
            }
            "--json" => parsed.json = true,
            "--help" | "-h" => return Err(String::new()),
            arg => return Err(format!("unexpected argument: {arg}")),
        }
        i += 1;
    }
    Ok(parsed)
}

/// Flags override the environment; the environment overrides the defaults.
/// A variable is only read when its flag is absent.
fn lot_config(
    args: &Args,
    lookup: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<LotConfig> {
    let env = LotConfig::from_lookup(|name| {
        let flagged = match name {
            SMALL_SPOTS_ENV => args.small.is_some(),
            MEDIUM_SPOTS_ENV => args.medium.is_some(),
            LARGE_SPOTS_ENV => args.large.is_some(),
            _ => false,
        };
        if flagged { None } else { lookup(name) }
    })
    .context("reading lot configuration")?;
    Ok(LotConfig::new(
        args.small.unwrap_or(env.small),
        args.medium.unwrap_or(env.medium),
        args.large.unwrap_or(env.large),
    ))
}

fn run(args: &Args) -> anyhow::Result<()> {
    let config = lot_config(args, |name| std::env::var(name).ok())?;
    let allocator = Allocator::from_config(&config);

    println!("== Initial lot ==");
    println!("Total spots: {}", allocator.total_spots());
    println!("Free spots : {}", allocator.free_spots_count());
    println!("Is empty?   {}", allocator.is_empty());

    println!();
    println!("== Parking ==");
    let van2 = Request::van("VAN-002");
    for request in [
        Request::moto("MOTO-123"),
        Request::moto("MOTO-456"),
        Request::car("CAR-ABC"),
        Request::van("VAN-001"),
        van2.clone(),
    ] {
        park_and_print(&allocator, &request);
    }

    println!();
    println!("== After parking ==");
    print_occupancy(&allocator);

    println!();
    println!("== Releasing {} ==", van2.identifier());
    match allocator.release(&van2) {
        Some(freed) => debug!(spots = ?freed.spots(), "Released demo van"),
        None => println!("{} was not parked", van2.identifier()),
    }
    print_occupancy(&allocator);

    if args.json {
        println!();
        println!("{}", serde_json::to_string_pretty(&allocator.snapshot())?);
    }

    if let Some(contenders) = args.concurrent {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .context("starting tokio runtime")?;
        runtime.block_on(race_vans(config, contenders))?;
    }

    Ok(())
}

fn park_and_print(allocator: &Allocator, request: &Request) {
    let kind = request.class().vehicle_kind();
    match allocator.try_allocate(request) {
        Ok(assignment) => {
            let spots: Vec<_> = assignment.spots().iter().map(|s| s.as_str()).collect();
            println!(
                "Parked {kind} \"{}\" on {}",
                request.identifier(),
                spots.join(", ")
            );
        }
        Err(e) => println!("Could NOT park {kind} \"{}\": {e}", request.identifier()),
    }
    println!(" -> Free spots now: {}", allocator.free_spots_count());
}

fn print_occupancy(allocator: &Allocator) {
    println!("Free spots : {}", allocator.free_spots_count());
    println!("Is full?    {}", allocator.is_full());
    for class in SpotClass::ALL {
        println!(
            "{:<6} spots full? {}",
            class.as_str(),
            allocator.class_full(class)
        );
    }
    println!(
        "Spots occupied by vans: {}",
        allocator.occupied_units_by_class(RequestClass::Bulk)
    );
}

/// Race `contenders` van requests against a fresh lot from blocking tasks.
async fn race_vans(config: LotConfig, contenders: usize) -> anyhow::Result<()> {
    let allocator = Arc::new(Allocator::from_config(&config));
    info!(contenders, "Racing vans");

    let tasks: Vec<_> = (0..contenders)
        .map(|n| {
            let allocator = Arc::clone(&allocator);
            tokio::task::spawn_blocking(move || {
                allocator.allocate(&Request::van(format!("RACE-{n:03}")))
            })
        })
        .collect();

    let mut parked = 0;
    for task in tasks {
        if task.await.context("van task panicked")? {
            parked += 1;
        }
    }

    let snapshot = allocator.snapshot();
    println!();
    println!("== Concurrent vans ==");
    println!("Contenders : {contenders}");
    println!("Parked     : {parked}");
    println!("Van units  : {}", snapshot.units_by_request.bulk);
    println!("Free spots : {}", snapshot.free_spots);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        std::iter::once("lotkeeper-demo")
            .chain(args.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn parses_counts_and_flags() {
        let args = parse_args(&argv(&["--small", "1", "--large", "0", "--json"])).unwrap();
        assert_eq!(
            args,
            Args {
                small: Some(1),
                medium: None,
                large: Some(0),
                json: true,
                concurrent: None,
            }
        );
    }

    #[test]
    fn no_flags_is_default() {
        assert_eq!(parse_args(&argv(&[])).unwrap(), Args::default());
    }

    #[test]
    fn rejects_missing_value() {
        let err = parse_args(&argv(&["--medium"])).unwrap_err();
        assert_eq!(err, "--medium requires a value");
    }

    #[test]
    fn rejects_bad_count() {
        let err = parse_args(&argv(&["--concurrent", "many"])).unwrap_err();
        assert_eq!(err, "--concurrent expects a non-negative integer, got 'many'");
    }

    #[test]
    fn rejects_unknown_argument() {
        assert!(parse_args(&argv(&["--verbose"])).is_err());
        assert_eq!(parse_args(&argv(&["-h"])).unwrap_err(), "");
    }

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: Vec<(String, String)> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| {
            vars.iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.clone())
        }
    }

    #[test]
    fn flags_override_config() {
        let args = Args {
            small: Some(0),
            medium: Some(3),
            large: Some(0),
            ..Args::default()
        };
        let env = lookup(&[(SMALL_SPOTS_ENV, "4"), (MEDIUM_SPOTS_ENV, "4")]);
        let config = lot_config(&args, env).unwrap();
        assert_eq!(config, LotConfig::new(0, 3, 0));
    }

    #[test]
    fn flags_skip_invalid_environment() {
        let args = Args {
            small: Some(1),
            medium: Some(1),
            large: Some(1),
            ..Args::default()
        };
        let env = lookup(&[(SMALL_SPOTS_ENV, "lots")]);
        let config = lot_config(&args, env).unwrap();
        assert_eq!(config, LotConfig::new(1, 1, 1));
    }

    #[test]
    fn missing_flags_fall_back_to_environment() {
        let args = Args {
            small: Some(1),
            ..Args::default()
        };
        let env = lookup(&[(MEDIUM_SPOTS_ENV, "7")]);
        let config = lot_config(&args, env).unwrap();
        assert_eq!(config, LotConfig::new(1, 7, 2));

        let env = lookup(&[(LARGE_SPOTS_ENV, "lots")]);
        let err = lot_config(&args, env).unwrap_err();
        assert!(format!("{err:#}").contains("lots"), "{err:#}");
    }
}
