use std::env;
use std::net::SocketAddr;

use contracts::{DemoConfig, ScenarioKind};
use imob_api::{serve, ConsoleApi};

fn print_usage() {
    println!("imob-cli <command>");
    println!("commands:");
    println!("  seed [seed]");
    println!("    regenerates the demo dataset (default seed: 42)");
    println!("  status");
    println!("  dashboard");
    println!("  generate-invoices <period>");
    println!("    period format: YYYY-MM");
    println!("  toggle <high_delinquency|high_vacancy|high_maintenance>");
    println!("  reset");
    println!("  serve [addr]");
    println!("    default addr: 127.0.0.1:8080");
}

fn parse_socket_addr(value: Option<&String>) -> Result<SocketAddr, String> {
    let raw = value.map(String::as_str).unwrap_or("127.0.0.1:8080");
    raw.parse::<SocketAddr>()
        .map_err(|_| format!("invalid addr: {raw}"))
}

fn parse_seed(value: Option<&String>) -> Result<u64, String> {
    match value {
        Some(raw) => raw
            .parse::<u64>()
            .map_err(|_| format!("invalid seed: {raw}")),
        None => Ok(DemoConfig::default().seed),
    }
}

fn default_sqlite_path() -> String {
    std::env::var("IMOBGEST_SQLITE_PATH")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| "imobgest_demo.sqlite".to_string())
}

fn open_api() -> Result<ConsoleApi, String> {
    let path = default_sqlite_path();
    log::debug!("using sqlite store at {path}");
    let mut api = ConsoleApi::from_config(DemoConfig::default())
        .map_err(|err| format!("failed to seed dataset: {err}"))?;
    api.attach_sqlite_store(path)
        .map_err(|err| format!("failed to attach sqlite store: {err}"))?;
    Ok(api)
}

fn run_seed(args: &[String]) -> Result<(), String> {
    let seed = parse_seed(args.get(2))?;
    let mut config = DemoConfig::default();
    config.seed = seed;

    let mut api = open_api()?;
    api.reseed(config)
        .map_err(|err| format!("failed to reseed: {err}"))?;

    let entities = api.store().entities();
    println!(
        "seeded seed={} properties={} owners={} leases={} invoices={} sqlite={}",
        seed,
        entities.properties.len(),
        entities.owners.len(),
        entities.leases.len(),
        entities.invoices.len(),
        default_sqlite_path()
    );
    Ok(())
}

fn run_status() -> Result<(), String> {
    let api = open_api()?;
    let store = api.store();
    let entities = store.entities();
    let flags = store.scenarios();
    println!(
        "seed={} clock={} properties={} leases={} invoices={} tickets={} mail={} notices={}",
        store.config().seed,
        store.now().to_rfc3339(),
        entities.properties.len(),
        entities.leases.len(),
        entities.invoices.len(),
        entities.tickets.len(),
        entities.mail.len(),
        entities.notices.len()
    );
    println!(
        "scenarios: high_delinquency={} high_vacancy={} high_maintenance={}",
        flags.high_delinquency, flags.high_vacancy, flags.high_maintenance
    );
    if let Some(error) = api.last_persistence_error() {
        println!("persistence warning: {error}");
    }
    Ok(())
}

fn run_dashboard() -> Result<(), String> {
    let api = open_api()?;
    let aggregates = api.dashboard();

    println!(
        "kpis: active_leases={} occupancy={:.1}% delinquency={:.1}% due_7d={}",
        aggregates.kpis.active_leases,
        aggregates.kpis.occupancy_rate * 100.0,
        aggregates.kpis.delinquency_rate * 100.0,
        aggregates.kpis.due_within_7_days
    );
    println!("series (expected/received):");
    for point in &aggregates.delinquency_series {
        println!(
            "  {} {}  {:>10} / {:>10}",
            point.period, point.month_label, point.expected, point.received
        );
    }
    let aging = &aggregates.aging;
    println!(
        "aging: 0-30d {}x{}  31-60d {}x{}  61-90d {}x{}  >90d {}x{}",
        aging.current_30.invoices,
        aging.current_30.amount,
        aging.days_31_60.invoices,
        aging.days_31_60.amount,
        aging.days_61_90.invoices,
        aging.days_61_90.amount,
        aging.over_90.invoices,
        aging.over_90.amount
    );
    println!(
        "map_points={} overdue_rows={}",
        aggregates.map_points.len(),
        aggregates.overdue_invoices.len()
    );
    Ok(())
}

fn run_generate_invoices(args: &[String]) -> Result<(), String> {
    let period = args.get(2).ok_or_else(|| "missing period".to_string())?;
    let mut api = open_api()?;
    let created = api
        .generate_invoices(period)
        .map_err(|err| format!("failed to generate invoices: {err}"))?;
    println!("period={period} created={created}");
    Ok(())
}

fn run_toggle(args: &[String]) -> Result<(), String> {
    let raw = args.get(2).ok_or_else(|| "missing scenario flag".to_string())?;
    let kind = ScenarioKind::parse(raw).ok_or_else(|| format!("unknown scenario flag: {raw}"))?;
    let mut api = open_api()?;
    let flags = api.toggle_scenario(kind);
    println!(
        "high_delinquency={} high_vacancy={} high_maintenance={}",
        flags.high_delinquency, flags.high_vacancy, flags.high_maintenance
    );
    Ok(())
}

fn run_reset() -> Result<(), String> {
    let mut api = open_api()?;
    api.reset().map_err(|err| format!("failed to reset: {err}"))?;
    println!("reset seed={}", api.store().config().seed);
    Ok(())
}

#[tokio::main]
async fn main() {
    let _logger = flexi_logger::Logger::try_with_env_or_str("info")
        .and_then(|logger| logger.start())
        .unwrap_or_else(|err| {
            eprintln!("failed to start logger: {err}");
            std::process::exit(1);
        });

    let args: Vec<String> = env::args().collect();
    let command = args.get(1).map(String::as_str);

    let outcome = match command {
        Some("seed") => run_seed(&args),
        Some("status") => run_status(),
        Some("dashboard") => run_dashboard(),
        Some("generate-invoices") => run_generate_invoices(&args),
        Some("toggle") => run_toggle(&args),
        Some("reset") => run_reset(),
        Some("serve") => match parse_socket_addr(args.get(2)) {
            Ok(addr) => {
                println!("serving console api on http://{addr}");
                serve(addr, DemoConfig::default(), Some(default_sqlite_path()))
                    .await
                    .map_err(|err| format!("server error: {err}"))
            }
            Err(err) => Err(err),
        },
        _ => {
            print_usage();
            return;
        }
    };

    if let Err(err) = outcome {
        eprintln!("error: {err}");
        print_usage();
        std::process::exit(2);
    }
}
