//! # Zakat CLI
//!
//! Computes Zakat from command-line flags or a JSON declaration and prints
//! the assessment as a table or as JSON.
//!
//! ## Usage
//! ```bash
//! # Hanafi, cash only, snapshot prices
//! zakat-cli --offline --cash 400000
//!
//! # Load a declaration and refresh prices for a city
//! zakat-cli --declaration zakat.json --locality Pune
//!
//! # Machine-readable result
//! zakat-cli --json --fiqh shafii --gold-personal 10
//!
//! # JSON Schema of the declaration file
//! zakat-cli schema
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::path::PathBuf;
use tabled::{Table, Tabled, settings::Style};

use zakat_engine::prelude::*;

mod config_loader;

use config_loader::{CliConfig, policy_by_name};

/// Command-line Zakat calculator
#[derive(Parser, Debug)]
#[command(name = "zakat-cli")]
#[command(version)]
#[command(about = "Fiqh-aware Zakat calculator with live metal rates", long_about = None)]
struct Args {
    /// Enable file logging to logs/ directory
    #[arg(long, default_value = "false")]
    log: bool,

    /// Skip live price lookups
    #[arg(long, default_value = "false")]
    offline: bool,

    /// Output results as JSON
    #[arg(long, default_value = "false")]
    json: bool,

    /// Load a declaration from a JSON file; flags override its fields
    #[arg(long)]
    declaration: Option<PathBuf>,

    /// School of jurisprudence
    #[arg(long)]
    fiqh: Option<FiqhSchool>,

    /// Display currency (INR, USD, GBP, EUR, AED, SAR)
    #[arg(long)]
    currency: Option<Currency>,

    /// City for live rate lookups
    #[arg(long)]
    locality: Option<String>,

    /// Base URL of the rate site
    #[arg(long)]
    rates_url: Option<String>,

    /// Gold price per gram (overrides live/default)
    #[arg(long)]
    gold_price: Option<String>,

    /// Silver price per gram (overrides live/default)
    #[arg(long)]
    silver_price: Option<String>,

    /// Investment policy: "full" or "intent"
    #[arg(long)]
    investment_policy: Option<String>,

    #[command(flatten)]
    assets: AssetFlags,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Declaration fields. Values go through the engine's normalizer, so
/// `"1,00,000"` and `"₹500"` are accepted and garbage reads as zero.
#[derive(clap::Args, Debug, Default)]
struct AssetFlags {
    #[arg(long, help_heading = "Cash")]
    cash: Option<String>,
    #[arg(long, help_heading = "Cash")]
    bank: Option<String>,
    #[arg(long, help_heading = "Cash")]
    wallets: Option<String>,

    /// Gold worn as personal jewelry (grams)
    #[arg(long, help_heading = "Precious metals")]
    gold_personal: Option<String>,
    /// Gold held for investment (grams)
    #[arg(long, help_heading = "Precious metals")]
    gold_investment: Option<String>,
    /// Karat of the gold given by flags
    #[arg(long, default_value_t = 24, help_heading = "Precious metals")]
    karat: u32,
    #[arg(long, help_heading = "Precious metals")]
    silver_personal: Option<String>,
    #[arg(long, help_heading = "Precious metals")]
    silver_investment: Option<String>,

    #[arg(long, help_heading = "Business")]
    inventory: Option<String>,
    #[arg(long, help_heading = "Business")]
    business_cash: Option<String>,
    #[arg(long, help_heading = "Business")]
    receivables: Option<String>,

    #[arg(long, help_heading = "Investments")]
    stocks: Option<String>,
    #[arg(long, value_enum, help_heading = "Investments")]
    stock_strategy: Option<StrategyArg>,
    #[arg(long, help_heading = "Investments")]
    crypto: Option<String>,
    #[arg(long, help_heading = "Investments")]
    pension: Option<String>,
    #[arg(long, value_enum, help_heading = "Investments")]
    pension_access: Option<AccessArg>,

    /// Debts due immediately
    #[arg(long, help_heading = "Liabilities")]
    debts: Option<String>,
    /// Near-term expenses due
    #[arg(long, help_heading = "Liabilities")]
    expenses: Option<String>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum StrategyArg {
    Passive,
    Trader,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum AccessArg {
    Accessible,
    Locked,
}

#[derive(ValueEnum, Clone, Copy, Debug, Default)]
enum SchemaTarget {
    #[default]
    Declaration,
    Result,
    Config,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print a JSON Schema
    Schema {
        #[arg(value_enum, default_value_t)]
        target: SchemaTarget,
    },
    /// Write a sample config file to the platform config directory
    InitConfig,
}

#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "Item")]
    item: String,
    #[tabled(rename = "Amount")]
    amount: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let file_config = CliConfig::load();

    let _file_guard = init_tracing(args.log || file_config.enable_logging.unwrap_or(false))?;

    match &args.command {
        Some(Commands::Schema { target }) => {
            let schema = match target {
                SchemaTarget::Declaration => serde_json::to_string_pretty(&zakat_engine::declaration_schema())?,
                SchemaTarget::Result => serde_json::to_string_pretty(&zakat_engine::result_schema())?,
                SchemaTarget::Config => serde_json::to_string_pretty(&zakat_engine::config::config_schema())?,
            };
            println!("{}", schema);
            return Ok(());
        }
        Some(Commands::InitConfig) => {
            let path = CliConfig::create_sample()?;
            println!("Sample configuration written to {}", path.display());
            return Ok(());
        }
        None => {}
    }

    let config = build_config(&args, &file_config)?;
    let declaration = match &args.declaration {
        Some(path) => DeclarationFile::load(path)?,
        None => DeclarationFile::default(),
    };
    let declaration = apply_asset_flags(declaration, &args.assets);
    let pinned_rates = declaration.rates.is_some();

    let mut session = ZakatSession::from_declaration(&config, declaration);
    if let Some(fiqh) = args.fiqh {
        session.set_fiqh(fiqh);
    }
    if let Some(currency) = args.currency {
        session.set_currency(currency);
    }

    let offline = args.offline || file_config.offline.unwrap_or(false);
    let manual_prices = args.gold_price.is_some() && args.silver_price.is_some();
    if !offline && !pinned_rates && !manual_prices {
        refresh_prices(&mut session, &args, &config).await;
    }

    // Manual prices win over anything fetched.
    if let Some(price) = &args.gold_price {
        session.set_price(Metal::Gold, price.as_str());
    }
    if let Some(price) = &args.silver_price {
        session.set_price(Metal::Silver, price.as_str());
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(session.result())?);
    } else {
        print_summary(&session);
    }
    Ok(())
}

fn init_tracing(
    to_file: bool,
) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>, Box<dyn std::error::Error>> {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let level = if to_file { "zakat=debug" } else { "zakat=info" };
    let env_filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.parse()?);
    let console = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    if to_file {
        std::fs::create_dir_all("logs")?;
        let file_appender = tracing_appender::rolling::daily("logs", "zakat.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(console)
            .with(tracing_subscriber::fmt::layer().with_writer(non_blocking).with_ansi(false))
            .init();

        tracing::info!("--- Zakat Calculation Session Started [{}] ---", chrono::Utc::now());
        Ok(Some(guard))
    } else {
        tracing_subscriber::registry().with(env_filter).with(console).init();
        Ok(None)
    }
}

/// Defaults, then the TOML file, then flags.
fn build_config(args: &Args, file_config: &CliConfig) -> Result<ZakatConfig, ZakatError> {
    let mut config = file_config.apply(ZakatConfig::default());
    if let Some(fiqh) = args.fiqh {
        config.fiqh = fiqh;
    }
    if let Some(currency) = args.currency {
        config.currency = currency;
    }
    if let Some(locality) = &args.locality {
        config.locality = locality.clone();
    }
    if let Some(name) = &args.investment_policy {
        config.investment_policy = policy_by_name(name).ok_or_else(|| ZakatError::InvalidInput {
            field: "investment-policy".to_string(),
            reason: format!("expected 'full' or 'intent', got '{}'", name),
        })?;
    }
    config.validate()?;
    Ok(config)
}

fn apply_asset_flags(mut file: DeclarationFile, flags: &AssetFlags) -> DeclarationFile {
    let assets = &mut file.assets;

    if let Some(v) = &flags.cash {
        assets.cash.cash_in_hand = normalize(v.as_str());
    }
    if let Some(v) = &flags.bank {
        assets.cash.bank_deposits = normalize(v.as_str());
    }
    if let Some(v) = &flags.wallets {
        assets.cash.digital_wallets = normalize(v.as_str());
    }

    let metal_flags = [
        &flags.gold_personal,
        &flags.gold_investment,
        &flags.silver_personal,
        &flags.silver_investment,
    ];
    if metal_flags.iter().any(|f| f.is_some()) {
        let grams = |flag: &Option<String>| normalize(flag.as_deref());
        assets.metals = MetalHoldings::new()
            .with(MetalItem::gold(grams(&flags.gold_personal), flags.karat, MetalUsage::PersonalUse))
            .with(MetalItem::gold(grams(&flags.gold_investment), flags.karat, MetalUsage::Investment))
            .with(MetalItem::silver(grams(&flags.silver_personal), MetalUsage::PersonalUse))
            .with(MetalItem::silver(grams(&flags.silver_investment), MetalUsage::Investment))
            .into();
    }

    if let Some(v) = &flags.inventory {
        assets.business.inventory = normalize(v.as_str());
    }
    if let Some(v) = &flags.business_cash {
        assets.business.business_cash = normalize(v.as_str());
    }
    if let Some(v) = &flags.receivables {
        assets.business.receivables = normalize(v.as_str());
    }

    if let Some(v) = &flags.stocks {
        assets.investments.stocks_value = normalize(v.as_str());
    }
    if let Some(strategy) = flags.stock_strategy {
        assets.investments.stock_strategy = Some(match strategy {
            StrategyArg::Passive => StockStrategy::Passive,
            StrategyArg::Trader => StockStrategy::Trader,
        });
    }
    if let Some(v) = &flags.crypto {
        assets.investments.crypto_value = normalize(v.as_str());
    }
    if let Some(v) = &flags.pension {
        assets.investments.pension_value = normalize(v.as_str());
    }
    if let Some(access) = flags.pension_access {
        assets.investments.pension_access = Some(match access {
            AccessArg::Accessible => PensionAccess::Accessible,
            AccessArg::Locked => PensionAccess::Locked,
        });
    }

    if let Some(v) = &flags.debts {
        file.liabilities.immediate_debts = normalize(v.as_str());
    }
    if let Some(v) = &flags.expenses {
        file.liabilities.expenses_due = normalize(v.as_str());
    }
    file
}

#[cfg(feature = "live-pricing")]
async fn refresh_prices(session: &mut ZakatSession, args: &Args, config: &ZakatConfig) {
    let base = args
        .rates_url
        .clone()
        .unwrap_or_else(|| zakat_engine::pricing::DEFAULT_BASE_URL.to_string());
    let oracle = RateTableOracle::new(base, config.oracle_timeout());

    for notice in session.refresh_prices(&oracle).await {
        eprintln!("{} {}", "warning:".yellow().bold(), notice);
    }
}

#[cfg(not(feature = "live-pricing"))]
async fn refresh_prices(_session: &mut ZakatSession, _args: &Args, _config: &ZakatConfig) {
    tracing::debug!("compiled without live-pricing; using configured rates");
}

fn print_summary(session: &ZakatSession) {
    let summary = session.summary();
    let rows: Vec<SummaryRow> = summary
        .rows()
        .into_iter()
        .map(|(item, amount)| SummaryRow { item, amount })
        .collect();

    println!("\n{}", "Zakat Assessment".bright_cyan().bold());
    if let Some(date) = session.rates().as_of {
        println!("{}", format!("Prices as of {}", date).dimmed());
    }
    println!("{}", Table::new(rows).with(Style::rounded()));

    let status = if summary.is_eligible {
        format!("PAYABLE: {}", summary.money(summary.zakat_payable)).green().bold()
    } else {
        "EXEMPT: net wealth below Nisab".yellow().bold()
    };
    println!("{}\n", status);
}
