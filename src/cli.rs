//! CLI definition, adapter wiring and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, warn};

use crate::adapters::cached::{Caches, CachedMembershipPort, CachedNewsPort, CachedQuotePort};
use crate::adapters::csv_adapter::CsvQuoteAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::google_news_adapter::GoogleNewsAdapter;
use crate::adapters::http::{HttpClient, DEFAULT_USER_AGENT};
use crate::adapters::json_state_store::JsonStateStore;
use crate::adapters::vader_lexicon::VaderLexicon;
use crate::adapters::wikipedia_membership_adapter::WikipediaMembershipAdapter;
use crate::adapters::yahoo_adapter::YahooQuoteAdapter;
use crate::domain::analysis::{analyze, AnalysisReport, AnalysisRequest};
use crate::domain::config::AppConfig;
use crate::domain::decision::Holding;
use crate::domain::error::SignalError;
use crate::domain::market::{bottom, top, ChangeWindow, MarketAggregator, MarketRow, MarketSummary, RankBy};
use crate::domain::period::{Horizon, Period};
use crate::domain::resolver::IdentifierResolver;
use crate::domain::risk_profile::ProfileName;
use crate::domain::sentiment::{regional_flash, NewsItem, NewsSentimentAggregator, Region, SentimentResult};
use crate::domain::symbol_cache::SymbolCache;
use crate::domain::symbol_guess::normalize_identifier;
use crate::domain::universe::Universe;
use crate::ports::lexicon_port::SentimentLexicon;
use crate::ports::membership_port::MembershipPort;
use crate::ports::news_port::NewsPort;
use crate::ports::quote_port::QuotePort;

/// Config file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "signaldesk.ini";
/// Leaders and laggards shown by the flash.
pub const FLASH_LEADERS: usize = 5;

#[derive(Parser, Debug)]
#[command(
    name = "signaldesk",
    about = "Market signal desk: symbol resolution, trend indicators, news sentiment"
)]
pub struct Cli {
    /// INI configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve an identifier to a market symbol
    Resolve { identifier: String },
    /// Preview the symbol guessed for a ticker, without network access
    Guess { ticker: String },
    /// Store a manual identifier to symbol mapping
    Map { raw: String, symbol: String },
    /// Indicators, recommendation, price levels and news for one instrument
    Analyze {
        /// Defaults to the last analysed identifier
        identifier: Option<String>,
        #[arg(long, default_value = "30d")]
        horizon: Horizon,
        #[arg(long)]
        held: bool,
        /// Average purchase price; implies --held
        #[arg(long)]
        cost_basis: Option<f64>,
        #[arg(long)]
        profile: Option<String>,
    },
    /// Headline sentiment for a query
    News {
        query: String,
        #[arg(long)]
        symbol: Option<String>,
        #[arg(long)]
        lang: Option<String>,
    },
    /// Regional headlines plus the day's market reading
    Flash,
    /// Market table, leaderboards and summary across index universes
    Markets {
        #[arg(long = "universe", value_delimiter = ',')]
        universes: Vec<String>,
        /// trend, 1d, 7d or 30d
        #[arg(long, default_value = "1d")]
        sort: RankBy,
        #[arg(long)]
        top: Option<usize>,
        /// Daily history requested per universe
        #[arg(long)]
        days: Option<u32>,
    },
    /// Show or set the risk profile
    Profile { name: Option<String> },
    /// Manage the watchlist
    Watchlist {
        #[command(subcommand)]
        action: WatchlistAction,
    },
    /// Drop fetch caches, and with --mappings the stored identifier mapping
    ClearCache {
        #[arg(long)]
        mappings: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum WatchlistAction {
    List,
    Add { symbol: String },
    Remove { symbol: String },
}

pub fn run(cli: Cli) -> ExitCode {
    let config = match load_config(cli.config.as_deref()) {
        Ok(c) => c,
        Err(err) => return report(&err),
    };
    let desk = match Desk::connect(config) {
        Ok(d) => d,
        Err(err) => return report(&err),
    };
    match desk.execute(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => report(&err),
    }
}

fn report(err: &SignalError) -> ExitCode {
    eprintln!("error: {err}");
    ExitCode::from(err)
}

/// An explicit path must load. Without one, `signaldesk.ini` in the working
/// directory is used when present, else the built-in defaults.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, SignalError> {
    let adapter = match path {
        Some(p) => FileConfigAdapter::from_file(p)?,
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
            FileConfigAdapter::from_file(DEFAULT_CONFIG_FILE)?
        }
        None => FileConfigAdapter::empty(),
    };
    AppConfig::from_port(&adapter)
}

/// Everything a command needs: settings, persisted state, the fetch ports and
/// their memo caches.
pub struct Desk {
    pub config: AppConfig,
    pub store: JsonStateStore,
    pub caches: Caches,
    quotes: Box<dyn QuotePort>,
    news: Box<dyn NewsPort>,
    membership: Box<dyn MembershipPort>,
    lexicon: Option<VaderLexicon>,
}

impl Desk {
    pub fn new(
        config: AppConfig,
        quotes: Box<dyn QuotePort>,
        news: Box<dyn NewsPort>,
        membership: Box<dyn MembershipPort>,
        lexicon: Option<VaderLexicon>,
    ) -> Result<Self, SignalError> {
        let store = JsonStateStore::new(&config.data_dir);
        store.init()?;
        Ok(Self {
            config,
            store,
            caches: Caches::default(),
            quotes,
            news,
            membership,
            lexicon,
        })
    }

    /// Network adapters (or the CSV quote source when `[quotes] csv_dir` is set).
    pub fn connect(config: AppConfig) -> Result<Self, SignalError> {
        let agent = config.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT);
        let http = HttpClient::new(config.timeout_secs, agent)?;

        let quotes: Box<dyn QuotePort> = match &config.csv_dir {
            Some(dir) => {
                debug!("quotes from CSV files in {}", dir.display());
                Box::new(CsvQuoteAdapter::new(dir.clone()))
            }
            None => Box::new(YahooQuoteAdapter::new(http.clone())),
        };
        let news = Box::new(GoogleNewsAdapter::new(http.clone())?);
        let membership = Box::new(WikipediaMembershipAdapter::new(http)?);
        let lexicon = config.lexicon_path.as_ref().and_then(|path| {
            VaderLexicon::load(path)
                .inspect_err(|e| warn!("sentiment lexicon unavailable, keyword scoring only: {e}"))
                .ok()
        });

        Self::new(config, quotes, news, membership, lexicon)
    }

    pub fn execute(&self, command: Command) -> Result<(), SignalError> {
        match command {
            Command::Resolve { identifier } => self.run_resolve(&identifier),
            Command::Guess { ticker } => self.run_guess(&ticker),
            Command::Map { raw, symbol } => self.run_map(&raw, &symbol),
            Command::Analyze {
                identifier,
                horizon,
                held,
                cost_basis,
                profile,
            } => {
                let holding = if held || cost_basis.is_some() {
                    Holding::held(cost_basis)
                } else {
                    Holding::none()
                };
                self.run_analyze(identifier, horizon, holding, profile.as_deref())
            }
            Command::News {
                query,
                symbol,
                lang,
            } => self.run_news(&query, symbol.as_deref(), lang.as_deref()),
            Command::Flash => self.run_flash(),
            Command::Markets {
                universes,
                sort,
                top,
                days,
            } => self.run_markets(&universes, sort, top, days),
            Command::Profile { name } => self.run_profile(name.as_deref()),
            Command::Watchlist { action } => self.run_watchlist(action),
            Command::ClearCache { mappings } => self.run_clear_cache(mappings),
        }
    }

    fn quotes(&self) -> CachedQuotePort<'_> {
        CachedQuotePort::new(self.quotes.as_ref(), &self.caches.quotes)
    }

    fn news(&self) -> CachedNewsPort<'_> {
        CachedNewsPort::new(self.news.as_ref(), &self.caches.news)
    }

    fn membership(&self) -> CachedMembershipPort<'_> {
        CachedMembershipPort::new(self.membership.as_ref(), &self.caches.membership)
    }

    fn lexicon(&self) -> Option<&dyn SentimentLexicon> {
        self.lexicon.as_ref().map(|lx| lx as &dyn SentimentLexicon)
    }

    fn symbol_cache(&self) -> SymbolCache {
        SymbolCache::open(Box::new(self.store.clone()))
    }

    fn run_resolve(&self, identifier: &str) -> Result<(), SignalError> {
        let quotes = self.quotes();
        let mut symbols = self.symbol_cache();
        let mut resolver = IdentifierResolver::new(&mut symbols, &quotes);

        if let Some(resolution) = resolver.resolve(identifier) {
            println!(
                "{} -> {} ({})",
                normalize_identifier(identifier),
                resolution.symbol,
                resolution.provenance
            );
            return Ok(());
        }

        let candidates = resolver.suggest(identifier);
        if candidates.is_empty() {
            println!("No candidates found for '{}'.", identifier.trim());
        } else {
            println!("Candidates (store one with `signaldesk map`):");
            for c in &candidates {
                println!(
                    "  {:<12} {:<40} {:<10} {}",
                    c.symbol, c.name, c.exchange, c.instrument_type
                );
            }
        }
        Err(SignalError::Unresolved {
            identifier: identifier.trim().to_string(),
        })
    }

    fn run_guess(&self, ticker: &str) -> Result<(), SignalError> {
        let quotes = self.quotes();
        let mut symbols = self.symbol_cache();
        let resolver = IdentifierResolver::new(&mut symbols, &quotes);
        match resolver.preview(ticker) {
            Some(symbol) => {
                println!("{} -> {}", normalize_identifier(ticker), symbol);
                Ok(())
            }
            None => Err(SignalError::Unresolved {
                identifier: ticker.trim().to_string(),
            }),
        }
    }

    fn run_map(&self, raw: &str, symbol: &str) -> Result<(), SignalError> {
        let quotes = self.quotes();
        let mut symbols = self.symbol_cache();
        let mut resolver = IdentifierResolver::new(&mut symbols, &quotes);
        resolver.assign(raw, symbol)?;
        println!(
            "{} -> {} (stored)",
            normalize_identifier(raw),
            normalize_identifier(symbol)
        );
        Ok(())
    }

    fn run_analyze(
        &self,
        identifier: Option<String>,
        horizon: Horizon,
        holding: Holding,
        profile: Option<&str>,
    ) -> Result<(), SignalError> {
        let identifier = identifier.unwrap_or_else(|| self.store.last_search());
        let profile = match profile {
            Some(name) => name
                .parse::<ProfileName>()
                .map_err(SignalError::UnknownProfile)?,
            None => self.store.profile(),
        };

        let quotes = self.quotes();
        let news = self.news();
        let aggregator = NewsSentimentAggregator::new(&news, self.lexicon(), &self.config.news_lang)
            .with_limit(self.config.news_max_items);
        let mut symbols = self.symbol_cache();
        let mut resolver = IdentifierResolver::new(&mut symbols, &quotes);

        let request = AnalysisRequest {
            identifier: identifier.clone(),
            horizon,
            holding,
            profile: profile.params(),
        };
        let report = analyze(&mut resolver, &quotes, &aggregator, &request)?;

        if let Err(e) = self.store.set_last_search(&identifier) {
            warn!("last search not saved: {e}");
        }
        print!("{}", render_analysis(&report, profile));
        Ok(())
    }

    fn run_news(&self, query: &str, symbol: Option<&str>, lang: Option<&str>) -> Result<(), SignalError> {
        let lang = lang
            .map(|l| l.trim().to_lowercase())
            .unwrap_or_else(|| self.config.news_lang.clone());
        let news = self.news();
        let result = NewsSentimentAggregator::new(&news, self.lexicon(), &lang)
            .with_limit(self.config.news_max_items)
            .summarize(query, symbol);
        print!("{}", render_sentiment(&result));
        Ok(())
    }

    fn run_flash(&self) -> Result<(), SignalError> {
        let news = self.news();
        for region in Region::ALL {
            println!("== {} ==", region);
            print!("{}", render_headlines(&regional_flash(&news, region)));
        }

        let window = ChangeWindow::OneDay;
        let quotes = self.quotes();
        let membership = self.membership();
        let rows = MarketAggregator::new(&membership, &quotes)
            .collect(&Universe::ALL, Period::Days(window.history_days()));
        println!();
        print!(
            "{}",
            render_market(&rows, RankBy::Change(window), FLASH_LEADERS)
        );
        Ok(())
    }

    fn run_markets(
        &self,
        universes: &[String],
        sort: RankBy,
        top_n: Option<usize>,
        days: Option<u32>,
    ) -> Result<(), SignalError> {
        let period = Period::Days(days.unwrap_or(self.config.history_days));
        let quotes = self.quotes();
        let membership = self.membership();
        let aggregator = MarketAggregator::new(&membership, &quotes);
        let rows = if universes.is_empty() {
            aggregator.collect(&Universe::ALL, period)
        } else {
            aggregator.collect_named(universes, period)
        };
        print!(
            "{}",
            render_market(&rows, sort, top_n.unwrap_or(self.config.top_n))
        );
        Ok(())
    }

    fn run_profile(&self, name: Option<&str>) -> Result<(), SignalError> {
        let profile = match name {
            Some(n) => {
                let profile = n.parse::<ProfileName>().map_err(SignalError::UnknownProfile)?;
                self.store.set_profile(profile)?;
                profile
            }
            None => self.store.profile(),
        };
        let p = profile.params();
        println!(
            "{}: max volatility {:.1}%, entry x{:.3}, target x{:.2}, stop x{:.2}",
            profile,
            p.vol_max * 100.0,
            p.entry_mult,
            p.target_mult,
            p.stop_mult
        );
        Ok(())
    }

    fn run_watchlist(&self, action: WatchlistAction) -> Result<(), SignalError> {
        match action {
            WatchlistAction::List => {
                let list = self.store.watchlist()?;
                if list.is_empty() {
                    println!("Watchlist is empty.");
                }
                for symbol in list {
                    println!("{}", symbol);
                }
            }
            WatchlistAction::Add { symbol } => {
                let symbol = normalize_identifier(&symbol);
                if self.store.watch(&symbol)? {
                    println!("Added {}.", symbol);
                } else {
                    println!("{} is already watched.", symbol);
                }
            }
            WatchlistAction::Remove { symbol } => {
                let symbol = normalize_identifier(&symbol);
                if self.store.unwatch(&symbol)? {
                    println!("Removed {}.", symbol);
                } else {
                    println!("{} was not watched.", symbol);
                }
            }
        }
        Ok(())
    }

    fn run_clear_cache(&self, mappings: bool) -> Result<(), SignalError> {
        let dropped = self.caches.len();
        self.caches.clear_all();
        println!("Cleared {} cached fetch result(s).", dropped);
        if mappings {
            let mut symbols = self.symbol_cache();
            let count = symbols.len();
            symbols.clear()?;
            println!("Cleared {} stored identifier mapping(s).", count);
        }
        Ok(())
    }
}

pub fn fmt_price(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{:.2}", v))
}

/// Fraction rendered as a signed percentage.
pub fn fmt_pct(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{:+.2}%", v * 100.0))
}

pub fn render_headlines(items: &[NewsItem]) -> String {
    if items.is_empty() {
        return "  (no headlines)\n".to_string();
    }
    items
        .iter()
        .map(|it| match it.published {
            Some(date) => format!("  - {} {}\n", date, it.title),
            None => format!("  - {}\n", it.title),
        })
        .collect()
}

pub fn render_sentiment(result: &SentimentResult) -> String {
    format!(
        "News: {} (score {:+.2})\n{}",
        result.narrative(),
        result.score,
        render_headlines(&result.items)
    )
}

pub fn render_analysis(report: &AnalysisReport, profile: ProfileName) -> String {
    let snap = &report.snapshot;
    let mut out = format!(
        "{} -> {} ({}), horizon {}, {} bars\n",
        report.identifier.trim(),
        report.resolution.symbol,
        report.resolution.provenance,
        report.horizon,
        report.bars
    );
    let asof = snap.asof.map_or_else(|| "n/a".to_string(), |d| d.to_string());
    out.push_str(&format!("  as of {}  close {}\n", asof, fmt_price(snap.close)));
    out.push_str(&format!(
        "  MA20 {} (gap {})  MA50 {} (gap {})\n",
        fmt_price(snap.ma20),
        fmt_pct(snap.gap20),
        fmt_price(snap.ma50),
        fmt_pct(snap.gap50)
    ));
    out.push_str(&format!(
        "  ATR14 {}  trend {}\n",
        fmt_price(snap.atr14),
        fmt_pct(snap.trend_score)
    ));
    out.push_str(&format!(
        "  change 1d {}  7d {}  30d {}\n",
        fmt_pct(snap.pct_1d),
        fmt_pct(snap.pct_7d),
        fmt_pct(snap.pct_30d)
    ));
    match report.score {
        Some(score) => out.push_str(&format!(
            "Recommendation: {} (score {:+.2})\n",
            report.decision, score
        )),
        None => out.push_str(&format!("Recommendation: {}\n", report.decision)),
    }
    match &report.levels {
        Some(l) => out.push_str(&format!(
            "Levels ({}): entry {:.2}  target {:.2}  stop {:.2}\n",
            profile, l.entry, l.target, l.stop
        )),
        None => out.push_str("Levels: n/a\n"),
    }
    out.push_str(&render_sentiment(&report.sentiment));
    out
}

fn render_row(row: &MarketRow) -> String {
    let label: String = row.label().chars().take(28).collect();
    format!(
        "  {:<10} {:<28} {:<10} {:>8} {:>8} {:>8} {:>8}\n",
        row.symbol(),
        label,
        row.universe.label(),
        fmt_pct(row.snapshot.trend_score),
        fmt_pct(Some(row.pct_1d)),
        fmt_pct(Some(row.pct_7d)),
        fmt_pct(Some(row.pct_30d))
    )
}

/// Summary over the sort window (1d when sorting by trend) and both leaderboards.
pub fn render_market(rows: &[MarketRow], sort: RankBy, n: usize) -> String {
    if rows.is_empty() {
        return "No market data.\n".to_string();
    }
    let window = match sort {
        RankBy::Change(w) => w,
        RankBy::Trend => ChangeWindow::OneDay,
    };

    let mut out = String::new();
    match MarketSummary::from_rows(rows, window) {
        Some(s) => {
            out.push_str(&format!(
                "Market {}: mean {:+.2}%, {} up / {} down, dispersion {:.2} pts, {}\n",
                s.window, s.mean_pct, s.up, s.down, s.dispersion, s.tone
            ));
            out.push_str(&format!("  {}\n", s.reading()));
            for (universe, mean) in &s.per_universe {
                out.push_str(&format!("  {:<12} {:+.2}%\n", universe.label(), mean));
            }
        }
        None => out.push_str(&format!("Market {}: no known changes\n", window)),
    }

    let header = format!(
        "  {:<10} {:<28} {:<10} {:>8} {:>8} {:>8} {:>8}\n",
        "symbol", "name", "universe", "trend", "1d", "7d", "30d"
    );
    out.push_str(&format!("\nTop {}:\n{}", n, header));
    for row in top(rows, sort, n) {
        out.push_str(&render_row(row));
    }
    out.push_str(&format!("\nBottom {}:\n{}", n, header));
    for row in bottom(rows, sort, n) {
        out.push_str(&render_row(row));
    }
    out
}
