//! fraudwatch-runner: headless front end for the fraud-monitoring core.
//!
//! Usage:
//!   fraudwatch-runner                                   (summary of the default dataset)
//!   fraudwatch-runner --csv data/tx.csv --filter suspicious --limit 20
//!   fraudwatch-runner --csv data/tx.csv --export out/   (write the export file)
//!   fraudwatch-runner --csv data/tx.csv --export out/ --full   (every record, all columns)
//!   fraudwatch-runner --config monitor.json --ipc-mode  (JSON lines on stdin/stdout)

use anyhow::Result;
use fraudwatch_core::{
    config::{MonitorConfig, SourceConfig},
    risk_model::PredictionRequest,
    service::{MonitorService, TransactionsParams},
};
use std::env;
use std::io::{self, BufRead, Write};
use std::path::Path;

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    /// Raw routed request, e.g. `{"type":"request","method":"GET","target":"/api/analytics"}`.
    Request {
        #[serde(default = "default_method")]
        method: String,
        target: String,
        #[serde(default)]
        body: Option<serde_json::Value>,
    },
    Analytics,
    Transactions {
        #[serde(default)]
        filter: Option<String>,
        #[serde(default)]
        limit: Option<i64>,
        #[serde(default)]
        refresh: Option<i64>,
    },
    Predict {
        request: PredictionRequest,
    },
    Retrain,
    Quit,
}

fn default_method() -> String {
    "GET".to_string()
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let config = load_config(&args)?;

    let filter = arg_str(&args, "--filter").unwrap_or("all");
    let limit = parse_arg(&args, "--limit", config.default_limit as i64);
    let refresh = parse_arg(&args, "--refresh", 0i64);
    let params = TransactionsParams::new(filter, limit, refresh);

    if !ipc_mode {
        println!("FraudWatch runner");
        println!("  source:    {:?}", config.source);
        println!("  filter:    {filter}");
        println!("  limit:     {limit}");
        println!("  refresh:   {refresh}");
        println!();
    }

    let service = MonitorService::from_config(&config)?;

    if ipc_mode {
        run_ipc_loop(&service)?;
    } else if let Some(dir) = arg_str(&args, "--export") {
        let file = if args.iter().any(|a| a == "--full") {
            service.export_full(refresh)?
        } else {
            service.export(&params)?
        };
        let path = Path::new(dir).join(&file.filename);
        std::fs::write(&path, &file.content)?;
        println!("Exported {} rows to {}", file.rows, path.display());
    } else {
        print_summary(&service, &params);
    }

    Ok(())
}

fn load_config(args: &[String]) -> Result<MonitorConfig> {
    let mut config = match arg_str(args, "--config") {
        Some(path) => MonitorConfig::load(path)?,
        None => MonitorConfig::default(),
    };
    if let Some(url) = arg_str(args, "--source") {
        config.source = SourceConfig::Url { url: url.to_string() };
    }
    if let Some(path) = arg_str(args, "--csv") {
        config.source = SourceConfig::File { path: path.to_string() };
    }
    if let Some(seed) = arg_str(args, "--seed").and_then(|s| s.parse().ok()) {
        config.rng_seed = Some(seed);
    }
    Ok(config)
}

fn run_ipc_loop(service: &MonitorService) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }
        if buffer.trim().is_empty() {
            continue;
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                log::warn!("Malformed IPC command: {e}");
                let err_json = serde_json::json!({ "error": e.to_string() });
                writeln!(stdout, "{}", err_json)?;
                stdout.flush()?;
                continue;
            }
        };

        let reply = match cmd {
            IpcCommand::Quit => break,
            IpcCommand::Request { method, target, body } => {
                let body = body.map(|b| b.to_string());
                serde_json::to_string(&service.handle(&method, &target, body.as_deref()))?
            }
            IpcCommand::Analytics => serde_json::to_string(&service.analytics())?,
            IpcCommand::Transactions { filter, limit, refresh } => {
                let params = TransactionsParams::new(
                    filter.unwrap_or_else(|| "all".to_string()),
                    limit.unwrap_or(service.default_limit() as i64),
                    refresh.unwrap_or(0),
                );
                serde_json::to_string(&service.transactions(&params))?
            }
            IpcCommand::Predict { request } => serde_json::to_string(&service.predict(&request))?,
            IpcCommand::Retrain => serde_json::to_string(&service.retrain())?,
        };
        writeln!(stdout, "{reply}")?;
        stdout.flush()?;
    }
    Ok(())
}

fn print_summary(service: &MonitorService, params: &TransactionsParams) {
    let analytics = service.analytics();
    if let Some(error) = &analytics.error {
        println!("  {error}");
        return;
    }
    let summary = &analytics.summary;

    println!("=== DATASET SUMMARY ===");
    println!("  transactions:     {}", summary.total_transactions);
    println!("  suspicious:       {}", summary.suspicious_transactions);
    println!("  fraud rate:       {:.1}%", summary.fraud_rate);
    println!("  total amount:     ${:.2}", summary.total_amount);
    println!("  suspicious amount: ${:.2}", summary.suspicious_amount);

    println!();
    println!("=== DAILY ===");
    for day in &summary.daily_stats {
        println!(
            "  {} | total: {:>6} | suspicious: {:>5} | rate: {:.1}%",
            day.date, day.total, day.suspicious, day.fraud_rate
        );
    }

    println!();
    println!("=== RISK DISTRIBUTION ===");
    for bucket in &summary.risk_distribution {
        println!("  {:<18} {:>6} ({:.1}%)", bucket.risk, bucket.count, bucket.percentage);
    }

    println!();
    println!("=== BY TYPE ===");
    for group in &summary.transaction_types {
        println!("  {:<10} total: {:>6} | suspicious: {:>5}", group.tx_type, group.total, group.suspicious);
    }

    let page = service.transactions(params);
    println!();
    println!("=== TRANSACTIONS ({} of {}, filter {}) ===", page.records.len(), page.total, page.filter);
    for r in &page.records {
        println!(
            "  {} | {:<8} | ${:>12.2} | risk {:>3} | {:<10} | {}, {}",
            r.transaction_id,
            r.core.tx_type,
            r.core.amount,
            r.risk_score,
            r.status.as_str(),
            r.context.city,
            r.context.country
        );
    }
}

fn arg_str<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2).find(|w| w[0] == flag).map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
