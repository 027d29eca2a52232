use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use unidex::data::types::{CodePoint, check_code, parse_code_literal, to_hex};
use unidex::ingest::{self, IngestOptions};
use unidex::output;
use unidex::server::UnicodeService;
use unidex::server::protocol::{Request, Response};
use unidex::utils::{AppConfig, Verbosity, get_config_path, init_logging};

#[derive(Parser)]
#[command(name = "unidex")]
#[command(about = "Look up and search the Unicode character database")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Resource directory (overrides UNIDEX_RESOURCES and the config file)
    #[arg(long, global = true)]
    resources: Option<PathBuf>,

    /// Print raw JSON instead of formatted output
    #[arg(long, global = true)]
    json: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Never talk to the daemon, even when it is running
    #[arg(long, global = true)]
    no_daemon: bool,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Errors only
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show everything known about one code point
    Char {
        /// U+1F600, 0x41, é, bare hex, or the character itself
        code: String,
    },
    /// Show the name of one code point
    Name { code: String },
    /// Show the 16-character row containing a code point
    Row { code: String },
    /// Search names, aliases and readings
    Search {
        #[arg(required = true, trailing_var_arg = true)]
        query: Vec<String>,
    },
    /// List blocks
    Blocks {
        /// Include private use and surrogate blocks
        #[arg(long)]
        all: bool,
    },
    /// Show a named sequence and its variants
    Sequence {
        #[arg(required = true)]
        codes: Vec<String>,
    },
    /// Load every chunk so later searches start warm
    Warm,
    /// Convert raw UCD files into a resource directory
    Ingest {
        /// Directory holding UnicodeData.txt, Blocks.txt and friends
        raw_dir: PathBuf,

        /// Output directory (defaults to the resolved resource directory)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Manage the background server
    #[cfg(all(unix, feature = "daemon"))]
    Daemon {
        #[command(subcommand)]
        action: DaemonAction,
    },
    /// Show the config file location and effective settings
    Config,
}

#[cfg(all(unix, feature = "daemon"))]
#[derive(Subcommand)]
enum DaemonAction {
    /// Start the daemon in background
    Start,
    /// Stop the running daemon
    Stop,
    /// Check daemon status
    Status,
    /// Run daemon in foreground (for debugging)
    Foreground,
}

/// User input to a servable code point
fn parse_code_arg(input: &str) -> Result<CodePoint> {
    let code = parse_code_literal(input).ok_or_else(|| anyhow!("not a code point: {:?}", input))?;
    Ok(check_code(code)?)
}

/// Where requests are answered: the running daemon or an in-process service
enum Backend {
    #[cfg(all(unix, feature = "daemon"))]
    Daemon(unidex::server::UnicodeClient),
    Local(Box<UnicodeService>),
}

impl Backend {
    fn open(cli: &Cli, config: &AppConfig) -> Result<Self> {
        // The daemon serves its own resource directory; an explicit one wins
        if !cli.no_daemon
            && cli.resources.is_none()
            && let Some(backend) = Self::connect_daemon()
        {
            return Ok(backend);
        }

        let dir = config.resolve_resources_dir(cli.resources.as_deref())?;
        let service = UnicodeService::open_dir(&dir, config.parallel_loading)
            .with_context(|| format!("Failed to open resources in {}", dir.display()))?;
        Ok(Backend::Local(Box::new(service)))
    }

    #[cfg(all(unix, feature = "daemon"))]
    fn connect_daemon() -> Option<Self> {
        let client = unidex::server::UnicodeClient::connect()?;
        tracing::debug!("using daemon");
        Some(Backend::Daemon(client))
    }

    #[cfg(not(all(unix, feature = "daemon")))]
    fn connect_daemon() -> Option<Self> {
        None
    }

    fn request(&mut self, request: Request) -> Result<Response> {
        match self {
            #[cfg(all(unix, feature = "daemon"))]
            Backend::Daemon(client) => Ok(client.request(&request)?),
            Backend::Local(service) => match service.handle(request) {
                Response::Error { message } => Err(anyhow!(message)),
                response => Ok(response),
            },
        }
    }
}

fn unexpected(response: Response) -> anyhow::Error {
    anyhow!("unexpected response: {:?}", response)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(Verbosity::from_flags(cli.verbose, cli.quiet));

    let config = AppConfig::load()?;
    let color = !cli.no_color;

    match &cli.command {
        Commands::Ingest { raw_dir, out } => {
            let out_dir = match out {
                Some(dir) => dir.clone(),
                None => config.resolve_resources_dir(cli.resources.as_deref())?,
            };
            let summary = ingest::run(&IngestOptions {
                raw_dir: raw_dir.clone(),
                out_dir: out_dir.clone(),
                show_progress: !cli.quiet,
            })?;
            if !cli.quiet {
                println!(
                    "Wrote {} chunks ({} characters, {} blocks, {} sequences) to {}",
                    summary.chunks_written,
                    summary.characters,
                    summary.blocks,
                    summary.sequences,
                    out_dir.display()
                );
            }
            return Ok(());
        }
        Commands::Config => {
            println!("config:    {}", get_config_path()?.display());
            println!(
                "resources: {}",
                config.resolve_resources_dir(cli.resources.as_deref())?.display()
            );
            println!("parallel:  {}", config.parallel_loading);
            println!("cache:     {}", config.query_cache_size);
            return Ok(());
        }
        #[cfg(all(unix, feature = "daemon"))]
        Commands::Daemon { action } => return handle_daemon_command(action, &cli, &config),
        _ => {}
    }

    let mut backend = Backend::open(&cli, &config)?;
    match &cli.command {
        Commands::Char { code } => {
            let response = backend.request(Request::GetChar { code: parse_code_arg(code)? })?;
            let info = match response {
                Response::Char(info) => info,
                other => return Err(unexpected(other)),
            };
            if cli.json {
                output::print_json(&info)?;
            } else {
                output::print_char_info(&info, color)?;
            }
        }
        Commands::Name { code } => {
            let response = backend.request(Request::GetCharName { code: parse_code_arg(code)? })?;
            let name = match response {
                Response::CharName(name) => name,
                other => return Err(unexpected(other)),
            };
            if cli.json {
                output::print_json(&name)?;
            } else {
                println!("{}", name.name.as_deref().unwrap_or("<unassigned>"));
            }
        }
        Commands::Row { code } => {
            let response = backend.request(Request::GetRow { code: parse_code_arg(code)? })?;
            let chars = match response {
                Response::Row { chars } => chars,
                other => return Err(unexpected(other)),
            };
            if cli.json {
                output::print_json(&chars)?;
            } else {
                output::print_row(&chars, color)?;
            }
        }
        Commands::Search { query } => {
            let response = backend.request(Request::Search { query: query.join(" ") })?;
            let search = match response {
                Response::Search(search) => search,
                other => return Err(unexpected(other)),
            };
            if cli.json {
                output::print_json(&search)?;
            } else if search.results.is_empty() {
                eprintln!("No matches");
            } else {
                output::print_search_results(&search.results, color)?;
            }
        }
        Commands::Blocks { all } => {
            let response = backend.request(Request::Init)?;
            let init = match response {
                Response::Init(init) => init,
                other => return Err(unexpected(other)),
            };
            let blocks: Vec<_> = init.blocks.iter().filter(|b| *all || b.is_listed()).collect();
            if cli.json {
                output::print_json(&blocks)?;
            } else {
                output::print_blocks(blocks, color)?;
            }
        }
        Commands::Sequence { codes } => {
            let codes = codes.iter().map(|c| parse_code_arg(c)).collect::<Result<Vec<_>>>()?;
            let response = backend.request(Request::Init)?;
            let init = match response {
                Response::Init(init) => init,
                other => return Err(unexpected(other)),
            };
            let Some(sequence) = init.sequences.into_iter().find(|s| s.codes == codes) else {
                let label: Vec<String> = codes.iter().map(|&c| format!("U+{}", to_hex(c))).collect();
                bail!("no named sequence {}", label.join(" "));
            };

            let response = backend.request(Request::GetVariants { codes })?;
            let variants = match response {
                Response::Variants { variants } => variants,
                other => return Err(unexpected(other)),
            };
            if cli.json {
                output::print_json(&serde_json::json!({ "sequence": sequence, "variants": variants }))?;
            } else {
                output::print_sequences(std::slice::from_ref(&sequence), color)?;
                if let Some(variants) = variants {
                    println!("variants:");
                    output::print_sequences(&variants, color)?;
                }
            }
        }
        Commands::Warm => {
            let response = backend.request(Request::InitSearch)?;
            let duration_ms = match response {
                Response::SearchReady { duration_ms } => duration_ms,
                other => return Err(unexpected(other)),
            };
            if !cli.quiet {
                println!("Search data loaded in {:.1} ms", duration_ms);
            }
        }
        Commands::Ingest { .. } | Commands::Config => {}
        #[cfg(all(unix, feature = "daemon"))]
        Commands::Daemon { .. } => {}
    }

    Ok(())
}

#[cfg(all(unix, feature = "daemon"))]
fn handle_daemon_command(action: &DaemonAction, cli: &Cli, config: &AppConfig) -> Result<()> {
    use unidex::server::daemon::{self, ServerOptions};
    use unidex::server::{UnicodeClient, get_log_path, get_socket_path, is_daemon_running};

    let options = || -> Result<ServerOptions> {
        Ok(ServerOptions {
            resources_dir: config.resolve_resources_dir(cli.resources.as_deref())?,
            parallel_loading: config.parallel_loading,
            cache_size: config.query_cache_size,
        })
    };

    match action {
        DaemonAction::Start => {
            if is_daemon_running() {
                println!("Daemon is already running");
                return Ok(());
            }

            println!("Starting unidex daemon...");
            daemon::daemonize(options()?)?;

            // Wait a moment for daemon to start
            std::thread::sleep(std::time::Duration::from_millis(500));

            if is_daemon_running() {
                println!("Daemon started (socket: {})", get_socket_path().display());
            } else {
                println!("Daemon may have failed to start. Check {}", get_log_path().display());
            }
        }

        DaemonAction::Stop => {
            if !is_daemon_running() {
                println!("Daemon is not running");
                return Ok(());
            }

            println!("Stopping daemon...");

            // Try graceful shutdown via client first
            if let Some(mut client) = UnicodeClient::connect() {
                let _ = client.shutdown();
                std::thread::sleep(std::time::Duration::from_millis(500));
            }

            // Force stop if still running
            if is_daemon_running() {
                daemon::stop_daemon()?;
            }

            println!("Daemon stopped");
        }

        DaemonAction::Status => {
            if !is_daemon_running() {
                println!("Daemon is not running");
                return Ok(());
            }

            match UnicodeClient::connect() {
                Some(mut client) => match client.status() {
                    Ok(status) if cli.json => output::print_json(&status)?,
                    Ok(status) => output::print_status(&status, !cli.no_color)?,
                    Err(e) => println!("Failed to get status: {}", e),
                },
                None => println!("Daemon is running but not responding"),
            }
        }

        DaemonAction::Foreground => {
            if is_daemon_running() {
                println!("Daemon is already running in background. Stop it first with 'unidex daemon stop'");
                return Ok(());
            }

            println!("Running daemon in foreground (Ctrl+C to stop)...");
            daemon::run_foreground(options()?)?;
        }
    }

    Ok(())
}
