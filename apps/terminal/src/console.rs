//! # Register Console
//!
//! Line-oriented front end. Each line is split into words and parsed by
//! clap as a multicall command, so the first word names the command and
//! `help` is generated from the definitions below.
//!
//! ## Session at the Register
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  > open 100                    Register opened with S/ 100.00           │
//! │  > scan P001                   + Nike Air Max                           │
//! │  > add samsung                 + Samsung Galaxy S23                     │
//! │  > pay efectivo -c 2           Ticket #1  total S/ 1239.00              │
//! │  > close 1339                  Expected S/ 1339.00  variance S/ 0.00    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Commands that commit (open, pay, close, tax, store) are followed by a
//! snapshot save.

use std::fmt::Write as _;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, Subcommand};
use tracing::debug;

use crate::commands::cart::CartResponse;
use crate::commands::sale::ReceiptResponse;
use crate::commands::report::SessionReport;
use crate::commands::{cart, config, product, report, sale, session};
use crate::error::{ApiError, ApiResult};
use crate::persist;
use crate::state::{ConfigState, DbState, RegisterState};
use till_core::{AddOutcome, Money, SaleStatus};

/// One console line. The first word selects the command.
#[derive(Debug, Parser)]
#[command(
    name = "till",
    multicall = true,
    disable_help_subcommand = true,
    help_template = "Commands:\n{subcommands}"
)]
struct ConsoleLine {
    #[command(subcommand)]
    command: Command,
}

/// A parsed console line.
#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum Command {
    /// Open the register with a cash float
    Open {
        #[arg(value_parser = amount_arg, allow_negative_numbers = true)]
        amount: Money,
        #[arg(trailing_var_arg = true)]
        notes: Vec<String>,
    },
    /// Close the register against counted cash
    Close {
        #[arg(value_parser = amount_arg, allow_negative_numbers = true)]
        counted: Money,
        #[arg(trailing_var_arg = true)]
        notes: Vec<String>,
    },
    /// Open session figures
    Status,
    /// Report for the open session, or a past one by id
    Session { id: Option<String> },
    /// Closed sessions, most recent first
    History,
    /// Sales, revenue and stock totals
    Dashboard,
    /// Add by exact product code
    Scan { code: String },
    /// Add by code, id or a unique search term
    Add {
        #[arg(required = true, trailing_var_arg = true)]
        term: Vec<String>,
    },
    /// Change a line's quantity (+2, -1)
    Qty {
        code: String,
        #[arg(allow_negative_numbers = true)]
        delta: i64,
    },
    /// Remove a line
    #[command(alias = "remove")]
    Rm { code: String },
    /// Switch the price tier (retail, wholesale, special)
    Tier { tier: String },
    /// Show the cart
    Cart,
    /// Empty the cart
    Clear,
    /// Check out and start a new cart
    Pay {
        /// Client id; the walk-in customer when omitted
        #[arg(short, long)]
        client: Option<String>,
        /// Payment method id, name or unique name prefix
        method: Vec<String>,
    },
    /// Sales history, newest first
    Sales {
        /// First day, YYYY-MM-DD
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Last day, YYYY-MM-DD
        #[arg(long)]
        to: Option<NaiveDate>,
        /// completed or canceled
        #[arg(long, value_parser = sale_status_arg)]
        status: Option<SaleStatus>,
    },
    /// Show a past ticket by #number or id
    Receipt { key: String },
    /// Search the catalog
    Find {
        #[arg(trailing_var_arg = true)]
        term: Vec<String>,
    },
    /// Sales by product
    Report {
        #[arg(trailing_var_arg = true)]
        term: Vec<String>,
    },
    /// Inventory summary and low stock
    Stock,
    /// Payment methods
    Methods,
    /// Change the tax rate, in percent
    Tax {
        #[arg(value_parser = percent_arg, allow_negative_numbers = true)]
        percent: f64,
    },
    /// Change the store name
    Store {
        #[arg(required = true, trailing_var_arg = true)]
        name: Vec<String>,
    },
    /// This list, or the usage of one command
    Help { topic: Option<String> },
    /// Exit
    #[command(alias = "exit")]
    Quit,
}

/// Parses a cash amount such as `100`, `1339.5` or `12.05` into cents.
pub fn parse_amount(input: &str) -> ApiResult<Money> {
    let invalid = || ApiError::validation(format!("Invalid amount: {}", input));
    let trimmed = input.trim();
    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };

    let (major, minor) = match digits.split_once('.') {
        Some((major, minor)) => (major, minor),
        None => (digits, ""),
    };

    let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if major.is_empty() || !all_digits(major) || minor.len() > 2 || !all_digits(minor) {
        return Err(invalid());
    }

    let major: i64 = major.parse().map_err(|_| invalid())?;
    let minor: i64 = if minor.is_empty() {
        0
    } else {
        // "5" means 50 cents.
        format!("{:0<2}", minor).parse().map_err(|_| invalid())?
    };

    let cents = major
        .checked_mul(100)
        .and_then(|c| c.checked_add(minor))
        .ok_or_else(invalid)?;
    Ok(Money::from_cents(if negative { -cents } else { cents }))
}

fn amount_arg(input: &str) -> Result<Money, String> {
    parse_amount(input).map_err(|e| e.message)
}

fn percent_arg(input: &str) -> Result<f64, String> {
    input
        .trim_end_matches('%')
        .parse()
        .map_err(|_| format!("Invalid tax rate: {}", input))
}

fn sale_status_arg(input: &str) -> Result<SaleStatus, String> {
    match input.to_lowercase().as_str() {
        "completed" => Ok(SaleStatus::Completed),
        "canceled" | "cancelled" => Ok(SaleStatus::Canceled),
        _ => Err(format!("Unknown sale status: {}", input)),
    }
}

fn unknown_command(name: &str) -> ApiError {
    ApiError::validation(format!(
        "Unknown command '{}'. Type 'help' for the list.",
        name
    ))
}

/// Flattens clap's rendered error into a one-line validation message.
fn usage_error(err: &clap::Error) -> ApiError {
    let rendered = err.to_string();
    let message = rendered
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with("For more information"))
        .collect::<Vec<_>>()
        .join(" ");
    ApiError::validation(message.trim_start_matches("error: ").to_string())
}

fn joined(words: Vec<String>) -> Option<String> {
    (!words.is_empty()).then(|| words.join(" "))
}

/// Usage text for every command, or for the one named by `topic`.
pub fn help_text(topic: Option<&str>) -> ApiResult<String> {
    let mut root = ConsoleLine::command();
    let text = match topic {
        None => root.render_help(),
        Some(name) => root
            .find_subcommand_mut(name.to_lowercase())
            .ok_or_else(|| unknown_command(name))?
            .render_help(),
    };
    Ok(text.to_string())
}

impl Command {
    /// Parses one console line. Blank lines yield `Ok(None)`.
    pub fn parse(line: &str) -> ApiResult<Option<Command>> {
        let mut words: Vec<String> = line.split_whitespace().map(str::to_string).collect();
        let Some(first) = words.first_mut() else {
            return Ok(None);
        };
        *first = first.to_lowercase();
        let name = first.clone();

        if ConsoleLine::command().find_subcommand(&name).is_none() {
            return Err(unknown_command(&name));
        }

        match ConsoleLine::try_parse_from(&words) {
            Ok(parsed) => Ok(Some(parsed.command)),
            Err(err)
                if matches!(
                    err.kind(),
                    ErrorKind::DisplayHelp | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                ) =>
            {
                Ok(Some(Command::Help { topic: Some(name) }))
            }
            Err(err) => Err(usage_error(&err)),
        }
    }

    /// Commands after which the register state must be saved.
    pub fn commits(&self) -> bool {
        matches!(
            self,
            Command::Open { .. }
                | Command::Close { .. }
                | Command::Pay { .. }
                | Command::Tax { .. }
                | Command::Store { .. }
        )
    }
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}

fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    start_of_day(date) + Duration::days(1) - Duration::nanoseconds(1)
}

/// What the console loop should do after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Text(String),
    Quit,
}

/// Runs parsed commands against the register.
#[derive(Debug, Clone)]
pub struct Console {
    register: RegisterState,
    db: DbState,
    config: ConfigState,
}

impl Console {
    pub fn new(register: RegisterState, db: DbState, config: ConfigState) -> Self {
        Console {
            register,
            db,
            config,
        }
    }

    pub fn register(&self) -> &RegisterState {
        &self.register
    }

    /// Parses and runs one line.
    pub async fn handle_line(&self, line: &str) -> ApiResult<Option<Reply>> {
        match Command::parse(line)? {
            Some(command) => self.execute(command).await.map(Some),
            None => Ok(None),
        }
    }

    pub async fn execute(&self, command: Command) -> ApiResult<Reply> {
        debug!(command = ?command, "Executing console command");

        let commits = command.commits();
        let reply = self.run(command)?;

        if commits {
            persist::save(&self.register, &self.db).await?;
        }

        Ok(reply)
    }

    /// Formats with the currency symbol of the settings in effect.
    fn money(&self, cents: i64) -> String {
        let symbol = self
            .register
            .with_register(|r| r.settings.currency_symbol.clone());
        self.config.format_with_symbol(&symbol, cents)
    }

    fn run(&self, command: Command) -> ApiResult<Reply> {
        let register = &self.register;

        let text = match command {
            Command::Open { amount, notes } => {
                let opened = session::open_session(register, amount, joined(notes))?;
                format!("Register opened with {}", self.money(opened.initial_cents))
            }
            Command::Close { counted, notes } => {
                let closed = session::close_session(register, counted, joined(notes))?;
                let mut out = format!(
                    "Register closed\n  Expected  {}\n  Counted   {}\n  Variance  {}\n",
                    self.money(closed.expected_cents),
                    self.money(closed.counted_cents),
                    self.money(closed.variance_cents)
                );
                out.push_str(&self.render_session(&closed.report));
                out
            }
            Command::Status => match session::current_session(register) {
                Some(current) => format!(
                    "Register open since {}\n  Float {}  Sales {}  Expected {}",
                    current.opened_at,
                    self.money(current.initial_cents),
                    self.money(current.sales_total_cents),
                    self.money(current.expected_cents)
                ),
                None => "Register is closed".to_string(),
            },
            Command::Session { id } => {
                self.render_session(&report::session_report(register, id.as_deref())?)
            }
            Command::History => {
                let sessions = report::session_history(register);
                if sessions.is_empty() {
                    "No closed sessions".to_string()
                } else {
                    let mut out = String::new();
                    for s in sessions {
                        let _ = writeln!(
                            out,
                            "{}  {} -> {}  expected {}  counted {}  variance {}",
                            s.session_id,
                            &s.opened_at[..s.opened_at.len().min(19)],
                            s.closed_at
                                .as_deref()
                                .map_or("-", |at| &at[..at.len().min(19)]),
                            self.money(s.expected_cents),
                            self.money(s.counted_cents.unwrap_or_default()),
                            self.money(s.variance_cents.unwrap_or_default())
                        );
                    }
                    out
                }
            }
            Command::Dashboard => {
                let totals = report::dashboard(register);
                let mut out = format!(
                    "Sales     {} completed, {}\nProducts  {} ({} low on stock)\n",
                    totals.completed_sales,
                    self.money(totals.revenue_cents),
                    totals.product_count,
                    totals.low_stock_count
                );
                match totals.session_sales_cents {
                    Some(cents) => {
                        let _ = write!(out, "Register  open, {} sold", self.money(cents));
                    }
                    None => out.push_str("Register  closed"),
                }
                out
            }
            Command::Scan { code } => {
                let scanned = cart::scan_code(register, &code)?;
                match scanned.outcome {
                    Some(outcome) => self.render_added(&outcome, &scanned.cart),
                    None => format!("No product with code '{}'", code.trim()),
                }
            }
            Command::Add { term } => {
                let added = cart::add_to_cart(register, &term.join(" "))?;
                self.render_added(&added.outcome, &added.cart)
            }
            Command::Qty { code, delta } => {
                self.render_cart(&cart::change_quantity(register, &code, delta)?)
            }
            Command::Rm { code } => self.render_cart(&cart::remove_from_cart(register, &code)),
            Command::Tier { tier } => self.render_cart(&cart::set_price_tier(register, &tier)?),
            Command::Cart => self.render_cart(&cart::get_cart(register)),
            Command::Clear => {
                cart::clear_cart(register);
                "Cart cleared".to_string()
            }
            Command::Pay { client, method } => self.render_receipt(&sale::checkout(
                register,
                &method.join(" "),
                client.as_deref(),
            )?),
            Command::Sales { from, to, status } => {
                let sales = sale::list_sales(
                    register,
                    from.map(start_of_day),
                    to.map(end_of_day),
                    status,
                );
                if sales.is_empty() {
                    "No sales found".to_string()
                } else {
                    let mut out = String::new();
                    for s in sales {
                        let _ = writeln!(
                            out,
                            "#{:<5} {}  {:<20} {:<26} {:>4} items  {:>14}{}",
                            s.number,
                            &s.timestamp[..s.timestamp.len().min(19)],
                            s.client,
                            s.payment_method,
                            s.total_quantity,
                            self.money(s.total_cents),
                            if s.status == SaleStatus::Canceled {
                                "  CANCELED"
                            } else {
                                ""
                            }
                        );
                    }
                    out
                }
            }
            Command::Receipt { key } => self.render_receipt(&sale::get_sale(register, &key)?),
            Command::Find { term } => {
                let found = product::search_products(register, &term.join(" "), None)?;
                if found.is_empty() {
                    "No products found".to_string()
                } else {
                    let mut out = String::new();
                    for p in found {
                        let _ = writeln!(
                            out,
                            "{:<8} {:<24} {:<12} {:>12}  stock {:>4}{}",
                            p.code,
                            p.name,
                            p.category,
                            self.money(p.price_retail_cents),
                            p.stock,
                            if p.is_low_stock { "  LOW" } else { "" }
                        );
                    }
                    out
                }
            }
            Command::Report { term } => {
                let rollup = report::product_sales_report(register, joined(term).as_deref())?;
                let mut out = String::new();
                for row in &rollup.rows {
                    let _ = writeln!(
                        out,
                        "{:<8} {:<24} {:>5} units  {:>14}  {:>5.1}%",
                        row.code,
                        row.name,
                        row.quantity_sold,
                        self.money(row.revenue.cents()),
                        row.share_percent
                    );
                }
                let _ = write!(
                    out,
                    "Total: {} units, {}",
                    rollup.total_quantity,
                    self.money(rollup.total_revenue.cents())
                );
                out
            }
            Command::Stock => {
                let inventory = report::inventory_report(register);
                let mut out = format!(
                    "{} products, {} units, stock value {}\n",
                    inventory.product_count,
                    inventory.total_units,
                    self.money(inventory.stock_value.cents())
                );
                for p in product::get_low_stock(register) {
                    let _ = writeln!(
                        out,
                        "  LOW {:<8} {:<24} {} of min {}",
                        p.code, p.name, p.stock, p.min_stock
                    );
                }
                out
            }
            Command::Methods => config::list_payment_methods(register)
                .into_iter()
                .map(|m| format!("{:>3}  {}", m.id, m.name))
                .collect::<Vec<_>>()
                .join("\n"),
            Command::Tax { percent } => {
                let settings = config::set_tax_rate(register, percent)?;
                format!(
                    "{} set to {:.2}%",
                    settings.tax_name,
                    settings.tax_rate.percentage()
                )
            }
            Command::Store { name } => {
                let settings = config::update_settings(
                    register,
                    config::SettingsUpdate {
                        name: joined(name),
                        ..config::SettingsUpdate::default()
                    },
                )?;
                format!("Store name set to {}", settings.name)
            }
            Command::Help { topic } => help_text(topic.as_deref())?,
            Command::Quit => return Ok(Reply::Quit),
        };

        Ok(Reply::Text(text.trim_end().to_string()))
    }

    fn render_added(&self, outcome: &AddOutcome, cart: &CartResponse) -> String {
        let (product_id, quantity) = match outcome {
            AddOutcome::Added { product_id } => (product_id, 1),
            AddOutcome::Incremented {
                product_id,
                quantity,
            } => (product_id, *quantity),
        };
        let name = cart
            .lines
            .iter()
            .find(|l| &l.product_id == product_id)
            .map_or("?", |l| l.name.as_str());
        format!(
            "+ {} (x{})  total {}",
            name,
            quantity,
            self.money(cart.total_cents)
        )
    }

    fn render_cart(&self, cart: &CartResponse) -> String {
        if cart.lines.is_empty() {
            return format!("Cart is empty ({} prices)", cart.tier);
        }

        let mut out = format!("Cart ({} prices)\n", cart.tier);
        for line in &cart.lines {
            let _ = writeln!(
                out,
                "  {:<8} {:<24} x{:<4} {:>12} {:>14}",
                line.code,
                line.name,
                line.quantity,
                self.money(line.unit_price_cents),
                self.money(line.line_total_cents)
            );
        }
        let tax_label = self.register.with_register(|r| r.settings.tax_name.clone());
        let _ = write!(
            out,
            "  Subtotal {}\n  {} ({:.2}%) {}\n  TOTAL {}",
            self.money(cart.subtotal_cents),
            tax_label,
            cart.tax_rate_bps as f64 / 100.0,
            self.money(cart.tax_cents),
            self.money(cart.total_cents)
        );
        out
    }

    fn render_receipt(&self, receipt: &ReceiptResponse) -> String {
        let mut out = format!(
            "{}\nTicket #{}  {}\nClient: {}\n",
            receipt.store_name, receipt.number, receipt.timestamp, receipt.client
        );
        for item in &receipt.items {
            let _ = writeln!(
                out,
                "  {:<24} x{:<4} {:>14}",
                item.name,
                item.quantity,
                self.money(item.line_total_cents)
            );
        }
        let _ = write!(
            out,
            "  Subtotal {}\n  {} {}\n  TOTAL {}\n  Paid with {}",
            self.money(receipt.subtotal_cents),
            receipt.tax_name,
            self.money(receipt.tax_cents),
            self.money(receipt.total_cents),
            receipt.payment_method
        );
        out
    }

    fn render_session(&self, report: &SessionReport) -> String {
        let mut out = format!(
            "Session {} opened {}\n  Float {}  Sales {}  Expected {}\n  {} sales\n",
            report.session_id,
            report.opened_at,
            self.money(report.initial_cents),
            self.money(report.sales_total_cents),
            self.money(report.expected_cents),
            report.sale_count
        );
        for row in &report.by_payment_method {
            let _ = writeln!(
                out,
                "  {:<26} {:>3} sales {:>14}",
                row.payment_method,
                row.sale_count,
                self.money(row.total.cents())
            );
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::persist::load_register;
    use till_store::{Database, DbConfig};

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("100").unwrap(), Money::from_major(100));
        assert_eq!(parse_amount("1339.5").unwrap(), Money::from_cents(133_950));
        assert_eq!(parse_amount("12.05").unwrap(), Money::from_cents(1_205));
        assert_eq!(parse_amount("-5").unwrap(), Money::from_cents(-500));
        assert!(parse_amount("abc").is_err());
        assert!(parse_amount("1.234").is_err());
        assert!(parse_amount(".5").is_err());
        assert!(parse_amount("").is_err());
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("   ").unwrap(), None);
        assert_eq!(
            Command::parse("open 100 morning shift").unwrap(),
            Some(Command::Open {
                amount: Money::from_major(100),
                notes: vec!["morning".into(), "shift".into()]
            })
        );
        assert_eq!(
            Command::parse("qty P001 +2").unwrap(),
            Some(Command::Qty {
                code: "P001".into(),
                delta: 2
            })
        );
        assert_eq!(
            Command::parse("qty P001 -1").unwrap(),
            Some(Command::Qty {
                code: "P001".into(),
                delta: -1
            })
        );
        assert_eq!(
            Command::parse("PAY Yape / Plin").unwrap(),
            Some(Command::Pay {
                client: None,
                method: vec!["Yape".into(), "/".into(), "Plin".into()]
            })
        );
        assert_eq!(
            Command::parse("pay efectivo --client 2").unwrap(),
            Some(Command::Pay {
                client: Some("2".into()),
                method: vec!["efectivo".into()]
            })
        );
        assert_eq!(
            Command::parse("pay").unwrap(),
            Some(Command::Pay {
                client: None,
                method: Vec::new()
            })
        );
        assert_eq!(
            Command::parse("report").unwrap(),
            Some(Command::Report { term: Vec::new() })
        );
        assert_eq!(Command::parse("exit").unwrap(), Some(Command::Quit));
        assert_eq!(
            Command::parse("remove P001").unwrap(),
            Some(Command::Rm { code: "P001".into() })
        );
        assert_eq!(
            Command::parse("tax 10%").unwrap(),
            Some(Command::Tax { percent: 10.0 })
        );
    }

    #[test]
    fn test_parse_sales_filters() {
        assert_eq!(
            Command::parse("sales --from 2026-10-01 --to 2026-10-16 --status completed").unwrap(),
            Some(Command::Sales {
                from: NaiveDate::from_ymd_opt(2026, 10, 1),
                to: NaiveDate::from_ymd_opt(2026, 10, 16),
                status: Some(SaleStatus::Completed)
            })
        );
        assert!(Command::parse("sales --status lost").is_err());
        assert!(Command::parse("sales --from yesterday").is_err());
    }

    #[test]
    fn test_parse_errors() {
        let err = Command::parse("qty P001").unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(err.message.contains("<DELTA>"));

        let err = Command::parse("dance").unwrap_err();
        assert_eq!(err.message, "Unknown command 'dance'. Type 'help' for the list.");

        let err = Command::parse("open lots").unwrap_err();
        assert!(err.message.contains("Invalid amount: lots"));

        assert!(Command::parse("qty P001 2 3").is_err());
    }

    #[test]
    fn test_help() {
        assert_eq!(Command::parse("help").unwrap(), Some(Command::Help { topic: None }));
        assert_eq!(
            Command::parse("pay --help").unwrap(),
            Some(Command::Help {
                topic: Some("pay".into())
            })
        );

        let all = help_text(None).unwrap();
        assert!(all.contains("Check out and start a new cart"));
        assert!(all.contains("dashboard"));

        let pay = help_text(Some("pay")).unwrap();
        assert!(pay.contains("--client"));

        assert_eq!(
            help_text(Some("dance")).unwrap_err().code,
            ErrorCode::ValidationError
        );
    }

    #[test]
    fn test_commits() {
        assert!(Command::Pay {
            client: None,
            method: vec!["Efectivo".into()]
        }
        .commits());
        assert!(!Command::Cart.commits());
        assert!(!Command::Scan { code: "P001".into() }.commits());
        assert!(!Command::Dashboard.commits());
    }

    async fn console() -> (Console, Database) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let config = ConfigState::default();
        let register = load_register(&db, &config).await.unwrap();
        let console = Console::new(RegisterState::new(register), DbState::new(db.clone()), config);
        (console, db)
    }

    async fn text(console: &Console, line: &str) -> String {
        match console.handle_line(line).await.unwrap() {
            Some(Reply::Text(text)) => text,
            other => panic!("unexpected reply: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_full_shift() {
        let (console, db) = console().await;

        assert_eq!(text(&console, "open 100").await, "Register opened with S/ 100.00");
        assert!(text(&console, "scan P001").await.starts_with("+ Nike Air Max (x1)"));
        text(&console, "add P003").await;

        let receipt = text(&console, "pay efectivo").await;
        assert!(receipt.contains("Ticket #1"));
        assert!(receipt.contains("TOTAL S/ 1239.00"));

        let closed = text(&console, "close 1339").await;
        assert!(closed.contains("Expected  S/ 1339.00"));
        assert!(closed.contains("Variance  S/ 0.00"));

        let stored = db.state().load_snapshot().await.unwrap();
        assert!(stored.session.is_none());
        assert_eq!(stored.sales.unwrap().len(), 1);
        assert_eq!(stored.session_history.unwrap().len(), 1);
        let p001 = stored
            .products
            .unwrap()
            .into_iter()
            .find(|p| p.code == "P001")
            .unwrap();
        assert_eq!(p001.stock, 49);
    }

    #[tokio::test]
    async fn test_rejections_surface_as_errors() {
        let (console, _db) = console().await;

        let err = console.handle_line("pay efectivo").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::CartError);

        text(&console, "scan P001").await;
        let err = console.handle_line("pay efectivo").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::SessionError);

        assert_eq!(text(&console, "scan NOPE").await, "No product with code 'NOPE'");
    }

    #[tokio::test]
    async fn test_cart_commands_do_not_persist() {
        let (console, db) = console().await;

        text(&console, "open 10").await;
        text(&console, "scan P002").await;
        text(&console, "tier wholesale").await;

        let cart = text(&console, "cart").await;
        assert!(cart.contains("wholesale"));
        assert!(cart.contains("S/ 95.00"));

        let stored = db.state().load_snapshot().await.unwrap();
        assert!(stored.session.is_some());
        assert!(stored.sales.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_huge_quantity_change_is_rejected() {
        let (console, _db) = console().await;
        text(&console, "scan P001").await;

        let err = console
            .handle_line("qty P001 9223372036854775807")
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientStock);
        assert_eq!(err.message, "Only 50 units of P001 in stock");
        assert!(text(&console, "cart").await.contains("x1"));
    }

    #[tokio::test]
    async fn test_pay_with_client_and_filter_sales() {
        let (console, _db) = console().await;

        text(&console, "open 100").await;
        text(&console, "scan P002").await;
        let receipt = text(&console, "pay yape --client 2").await;
        assert!(receipt.contains("Client: Empresa ABC S.A."));
        assert!(receipt.contains("Paid with Yape / Plin"));

        let sales = text(&console, "sales --status completed").await;
        assert!(sales.contains("#1"));
        assert!(sales.contains("Empresa ABC S.A."));

        assert_eq!(text(&console, "sales --status canceled").await, "No sales found");
        assert_eq!(text(&console, "sales --to 2000-01-01").await, "No sales found");
        assert!(text(&console, "sales --from 2000-01-01").await.contains("#1"));
    }

    #[tokio::test]
    async fn test_status_history_and_dashboard() {
        let (console, _db) = console().await;

        assert_eq!(text(&console, "status").await, "Register is closed");
        assert_eq!(text(&console, "history").await, "No closed sessions");

        text(&console, "open 100").await;
        text(&console, "scan P001").await;
        text(&console, "pay efectivo").await;

        let status = text(&console, "status").await;
        assert!(status.contains("Sales S/ 177.00"));
        assert!(status.contains("Expected S/ 277.00"));

        let dashboard = text(&console, "dashboard").await;
        assert!(dashboard.contains("1 completed, S/ 177.00"));
        assert!(dashboard.contains("Register  open, S/ 177.00 sold"));

        text(&console, "close 277").await;
        let history = text(&console, "history").await;
        assert!(history.contains("expected S/ 277.00"));
        assert!(history.contains("variance S/ 0.00"));
        assert!(text(&console, "dashboard").await.ends_with("Register  closed"));
    }

    #[tokio::test]
    async fn test_amounts_use_persisted_currency_symbol() {
        let (console, _db) = console().await;
        console
            .register()
            .with_register_mut(|r| r.settings.currency_symbol = "$".to_string());

        assert_eq!(text(&console, "open 100").await, "Register opened with $ 100.00");
    }

    #[tokio::test]
    async fn test_quit() {
        let (console, _db) = console().await;
        assert_eq!(console.handle_line("quit").await.unwrap(), Some(Reply::Quit));
    }
}
