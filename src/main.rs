use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use colored::*;
use env_logger::Builder;
use log::{debug, error, info, LevelFilter};

use flightsurety_core::config::amount_serde::format_amount;
use flightsurety_core::config::{ConfigValidator, NodeConfig, ParamsProfile};
use flightsurety_core::ledger::{HealthReport, LedgerInterface, LocalLedger, Operation, OperationOutcome};
use flightsurety_core::oracles::OracleSimulator;
use flightsurety_core::utils::{current_time, format_departure, time_since};
use flightsurety_core::{Address, FlightStatus, RequestKey, SuretyResult};

#[derive(Parser)]
#[clap(author, version, about)]
/// Flight delay insurance marketplace with oracle consensus
struct Cli {
    /// Subcommand to execute
    #[clap(subcommand)]
    command: Commands,

    /// Log level for output; defaults to the configured level
    #[clap(short, long)]
    log_level: Option<String>,

    /// TOML configuration file
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// Parameter preset used when no configuration file is given
    #[clap(short, long, default_value = "devnet")]
    profile: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one flight through purchase, oracle consensus and payout
    #[clap(alias = "sim")]
    Simulate {
        /// Number of simulated oracles
        #[clap(short, long)]
        oracles: Option<usize>,

        /// Status code every oracle reports (10, 20, 30, 40, 50); random if omitted
        #[clap(short, long)]
        status: Option<u8>,

        /// Number of insured passengers
        #[clap(long, default_value = "3")]
        passengers: u64,

        /// Flight code to insure
        #[clap(long, default_value = "SV 1265")]
        flight: String,

        /// Seconds to wait for consensus
        #[clap(short, long, default_value = "10")]
        timeout: u64,
    },

    /// Print the health report of a freshly deployed marketplace
    Health,

    /// Print the effective configuration as TOML
    #[clap(alias = "cfg")]
    Config {
        /// Only validate, printing warnings and suggested fixes
        #[clap(long)]
        validate: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            process::exit(1);
        }
    };

    // Setup logging
    let level = cli.log_level.as_deref().unwrap_or(&config.log_level);
    let log_level = match level.to_lowercase().as_str() {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        _ => LevelFilter::Info,
    };
    Builder::new()
        .filter_level(log_level)
        .format_timestamp_millis()
        .parse_default_env()
        .init();
    debug!("Effective parameters: {:?}", config.params);

    let result = match &cli.command {
        Commands::Simulate {
            oracles,
            status,
            passengers,
            flight,
            timeout,
        } => run_simulation(config, *oracles, *status, *passengers, flight, *timeout),
        Commands::Health => show_health(&config),
        Commands::Config { validate } => show_config(&config, *validate),
    };

    if let Err(e) = result {
        error!("{} failed: {}", e.kind(), e);
        eprintln!("{} {}", "error:".red().bold(), e);
        process::exit(1);
    }
}

fn load_config(cli: &Cli) -> SuretyResult<NodeConfig> {
    match &cli.config {
        Some(path) => NodeConfig::load(path),
        None => Ok(NodeConfig::for_profile(cli.profile.parse::<ParamsProfile>()?)),
    }
}

fn owner() -> Address {
    Address::derived(0x00, 1)
}

fn first_airline() -> Address {
    Address::derived(0xa1, 1)
}

fn passenger(n: u64) -> Address {
    Address::derived(0xb0, n)
}

fn run_simulation(
    mut config: NodeConfig,
    oracles: Option<usize>,
    status: Option<u8>,
    passengers: u64,
    flight: &str,
    timeout: u64,
) -> SuretyResult<()> {
    if let Some(count) = oracles {
        config.simulator.oracle_count = count;
    }
    if status.is_some() {
        config.simulator.fixed_status = status;
    }
    let params = config.params.clone();

    println!("{}", "FlightSurety Simulation".green().bold());
    println!("Profile: {}", params.profile);
    println!("Oracles: {}", config.simulator.oracle_count);
    println!("Passengers: {}", passengers);

    let ledger = Arc::new(LocalLedger::from_config(&config, owner(), first_airline()));
    let airline = first_airline();
    // the vault must cover every payout the simulation may credit
    let exposure = params
        .payout_multiplier
        .apply(params.purchase_cap)?
        .saturating_mul(passengers as u128);
    let deposit = params.funding_threshold.max(exposure);
    ledger.submit(Operation::FundAirline { airline }, airline, deposit)?;
    println!("Airline deposit: {}", format_amount(deposit));

    let departure = current_time() + 3 * 3600;
    let receipt = ledger.submit(
        Operation::RegisterFlight {
            flight: flight.to_string(),
            timestamp: departure,
        },
        airline,
        0,
    )?;
    let key = match receipt.outcome {
        OperationOutcome::FlightRegistered { key } => key,
        _ => RequestKey::new(airline, flight, departure),
    };
    println!("Flight: {} departing {}", key, format_departure(departure));

    for n in 1..=passengers {
        ledger.submit(
            Operation::PurchaseInsurance {
                airline,
                flight: key.flight.clone(),
                timestamp: key.timestamp,
            },
            passenger(n),
            params.purchase_cap,
        )?;
    }
    println!(
        "Premium per passenger: {}",
        format_amount(params.purchase_cap)
    );

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let simulator = OracleSimulator::register(
            Arc::clone(&ledger),
            &config.simulator,
            params.registration_fee,
        )?;
        let handle = simulator.spawn();
        let requested_at = current_time();

        let receipt = ledger.submit(
            Operation::RequestStatus {
                airline,
                flight: key.flight.clone(),
                timestamp: key.timestamp,
            },
            passenger(1),
            0,
        )?;
        if let OperationOutcome::StatusRequested { index } = receipt.outcome {
            info!("Status of {} requested at index {}", key, index);
        }

        let finalized = simulator
            .await_finalized(&key, Duration::from_secs(timeout))
            .await?;
        let reports = handle.shutdown().await;

        println!("\n{}", "Oracle Consensus".green().bold());
        match finalized {
            Some(status) => println!(
                "Canonical status: {} after {}s",
                status.to_string().cyan(),
                time_since(requested_at)
            ),
            None => println!("{}", "No quorum reached before the timeout".yellow()),
        }
        let submitted: usize = reports.iter().map(|r| r.submitted).sum();
        let skipped: usize = reports.iter().map(|r| r.skipped).sum();
        let failed: usize = reports.iter().map(|r| r.failed).sum();
        println!(
            "Reports: {} accepted, {} skipped, {} failed",
            submitted, skipped, failed
        );

        if finalized == Some(FlightStatus::LateAirline) {
            println!("\n{}", "Payouts".green().bold());
            for n in 1..=passengers {
                let receipt = ledger.submit(
                    Operation::WithdrawPayout {
                        airline,
                        flight: key.flight.clone(),
                        timestamp: key.timestamp,
                    },
                    passenger(n),
                    0,
                )?;
                if let OperationOutcome::PayoutWithdrawn { amount } = receipt.outcome {
                    println!("  {} withdrew {}", passenger(n), format_amount(amount));
                }
            }
        }
        Ok::<(), flightsurety_core::SuretyError>(())
    })?;

    print_health(&ledger.health());
    println!("State root: {}", ledger.state_root()?);
    Ok(())
}

fn show_health(config: &NodeConfig) -> SuretyResult<()> {
    let ledger = LocalLedger::from_config(config, owner(), first_airline());
    print_health(&ledger.health());
    Ok(())
}

fn print_health(report: &HealthReport) {
    println!("\n{}", "Marketplace Health".green().bold());
    let operational = if report.operational {
        "yes".green()
    } else {
        "no".red()
    };
    println!("Operational: {}", operational);
    println!(
        "Airlines: {} registered, {} funded",
        report.airlines, report.funded_airlines
    );
    println!("Flights: {}", report.flights);
    println!("Oracles: {}", report.oracles);
    println!(
        "Requests: {} open, {} finalized",
        report.open_requests, report.finalized_requests
    );
    println!("Policies: {}", report.policies);
    println!("Vault balance: {}", format_amount(report.vault_balance));
    println!("Events logged: {}", report.log_length);
}

fn show_config(config: &NodeConfig, validate: bool) -> SuretyResult<()> {
    if !validate {
        println!("{}", config.to_toml_string()?);
        return Ok(());
    }
    let result = ConfigValidator::new().validate(&config.params);
    if result.is_valid {
        println!("{}", "Configuration is valid".green().bold());
    } else {
        println!("{}", "Configuration is invalid".red().bold());
    }
    println!("{}", result.get_summary());
    for (setting, fix) in &result.suggested_fixes {
        println!("  {} {}: {}", "fix:".yellow(), setting, fix);
    }
    Ok(())
}
