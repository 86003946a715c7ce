mod error;
mod paths;
mod render;

use std::fs::File;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::ArgAction;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use odatagrid_lib::Coordinator;
use odatagrid_lib::DEFAULT_BASE_URL;
use odatagrid_lib::GridConfig;
use odatagrid_lib::GridEvent;
use odatagrid_lib::LoadStatus;
use odatagrid_lib::MemoryHistory;
use odatagrid_lib::modal::ModalPresenter;
use odatagrid_lib::people_columns;
use odatagrid_lib::query::FilterInput;
use odatagrid_lib::query::SortInput;
use odatagrid_lib::relay::Relay;
use odatagrid_lib::relay::RelayConfig;
use simplelog::Config;
use simplelog::LevelFilter;
use simplelog::WriteLogger;
use tokio_util::sync::CancellationToken;

use crate::error::CliError;
use crate::paths::LogDir;
use crate::render::TerminalPresenter;

#[derive(Parser, Debug)]
#[command(
    name = "odatagrid",
    version,
    about = "Browse an OData entity set with server-side sort, filter and paging"
)]
struct Cli {
    /// Increase log verbosity (-v, -vv).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Directory for log files. Defaults to $ODATAGRID_LOG_DIR, then the user cache directory.
    #[arg(long, global = true, value_name = "DIR")]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load a page of the grid and print it.
    View {
        /// Address-bar query string to start from, e.g. '?$orderby=LastName%20desc&page=2'.
        #[arg(default_value = "")]
        search: String,

        #[arg(long, default_value = DEFAULT_BASE_URL)]
        base_url: String,

        #[arg(long, default_value_t = 5)]
        page_size: u32,

        /// Request timeout in seconds.
        #[arg(long)]
        timeout: Option<u64>,

        /// Sort criterion FIELD[:asc|desc] (repeatable, in precedence order).
        #[arg(long = "sort", value_name = "FIELD[:ORDER]", action = ArgAction::Append)]
        sort: Vec<String>,

        /// Filter criterion FIELD:OP:VALUE with OP one of equals, contains, starts, ends.
        #[arg(long = "filter", value_name = "FIELD:OP:VALUE", action = ArgAction::Append)]
        filter: Vec<String>,

        /// Navigate to this page after applying criteria.
        #[arg(long)]
        page: Option<u32>,

        /// Print HTML instead of text.
        #[arg(long)]
        html: bool,

        /// Also show a dialog pre-filled with the applied criteria.
        #[arg(long, value_enum)]
        dialog: Option<Dialog>,
    },

    /// Run the cross-origin relay.
    Relay {
        #[arg(long, default_value = "127.0.0.1:3000")]
        bind: SocketAddr,

        #[arg(long, default_value = "/odata")]
        prefix: String,

        #[arg(long, default_value = "https://services.odata.org")]
        upstream: String,

        /// Allowed browser origin (repeatable). Defaults to the local dev origins.
        #[arg(long = "allow-origin", action = ArgAction::Append)]
        allow_origin: Vec<String>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Dialog {
    Sort,
    Filter,
}

fn init_logging(verbose: u8, log_dir: Option<PathBuf>) {
    let level = match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    let Some(dir) = paths::resolve_log_dir(log_dir) else {
        eprintln!("Warning: no log directory, logging disabled");
        return;
    };
    let logs = LogDir::new(dir);
    let archived = match logs.rotate(paths::MAX_ARCHIVED_LOGS) {
        Ok(archived) => archived,
        Err(e) => {
            eprintln!("Warning: log rotation failed: {}", e);
            None
        }
    };

    let path = logs.latest();
    match File::create(&path) {
        Ok(file) => {
            if let Err(e) = WriteLogger::init(level, Config::default(), file) {
                eprintln!("Warning: failed to initialize logger: {}", e);
                return;
            }
            if let Some(archived) = archived {
                log::debug!("Previous log archived to {}", archived.display());
            }
        }
        Err(e) => eprintln!("Warning: cannot create {}: {}", path.display(), e),
    }
}

fn parse_sort(arg: &str) -> Result<SortInput, CliError> {
    let (field, order) = arg.split_once(':').unwrap_or((arg, "asc"));
    if field.is_empty() {
        return Err(CliError::Argument {
            flag: "--sort",
            value: arg.to_string(),
            expected: "FIELD[:asc|desc]",
        });
    }
    Ok(SortInput::new(field, order))
}

fn parse_filter(arg: &str) -> Result<FilterInput, CliError> {
    let mut parts = arg.splitn(3, ':');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(field), Some(op), Some(value)) if !field.is_empty() => {
            Ok(FilterInput::new(field, op, value))
        }
        _ => Err(CliError::Argument {
            flag: "--filter",
            value: arg.to_string(),
            expected: "FIELD:OP:VALUE",
        }),
    }
}

struct ViewArgs {
    search: String,
    config: GridConfig,
    sort: Vec<SortInput>,
    filter: Vec<FilterInput>,
    page: Option<u32>,
    html: bool,
    dialog: Option<Dialog>,
}

async fn view(args: ViewArgs) -> Result<(), CliError> {
    let history = MemoryHistory::new("/", args.search);
    let mut grid = Coordinator::new(args.config, people_columns(), history)?;

    let mut events = vec![GridEvent::Load];
    if !args.sort.is_empty() {
        events.push(GridEvent::ApplySort(args.sort));
    }
    if !args.filter.is_empty() {
        events.push(GridEvent::ApplyFilter(args.filter));
    }
    if let Some(page) = args.page {
        events.push(GridEvent::GoToPage(page));
    }

    for event in events {
        log::debug!("Dispatching {:?}", event);
        if grid.dispatch(event).await == LoadStatus::Failed {
            break;
        }
    }

    println!("{}", grid.address_bar().href());
    if let Some(notice) = grid.notice() {
        eprintln!("{}", notice);
    }

    if args.html {
        println!("{}", grid.toolbar_html());
        println!("{}", grid.table_html());
        println!("{}", grid.pagination_html());
    } else {
        println!("Sort ({})  Filter ({})", grid.sort_count(), grid.filter_count());
        println!("{}", render::table_text(&grid.table().render()));
        println!("{}", render::pagination_text(grid.pagination()));
    }

    if let Some(dialog) = args.dialog {
        let mut presenter = TerminalPresenter::default();
        presenter.show(match dialog {
            Dialog::Sort => grid.sort_dialog(),
            Dialog::Filter => grid.filter_dialog(),
        });
        presenter.close();
    }

    Ok(())
}

async fn relay(config: RelayConfig) -> Result<(), CliError> {
    let relay = Relay::bind(config).await?;
    println!("Relay listening on {}", relay.local_addr());

    let shutdown = CancellationToken::new();
    let server = tokio::spawn(relay.serve(shutdown.clone()));

    tokio::signal::ctrl_c().await?;
    shutdown.cancel();
    match server.await {
        Ok(result) => result?,
        Err(e) => log::error!("Relay task failed: {}", e),
    }
    Ok(())
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::View {
            search,
            base_url,
            page_size,
            timeout,
            sort,
            filter,
            page,
            html,
            dialog,
        } => {
            let mut config = GridConfig::new()
                .with_base_url(base_url)
                .with_page_size(page_size);
            if let Some(secs) = timeout {
                config = config.with_timeout(Duration::from_secs(secs));
            }
            let args = ViewArgs {
                search,
                config,
                sort: sort.iter().map(|s| parse_sort(s)).collect::<Result<_, _>>()?,
                filter: filter.iter().map(|f| parse_filter(f)).collect::<Result<_, _>>()?,
                page,
                html,
                dialog,
            };
            view(args).await
        }
        Command::Relay {
            bind,
            prefix,
            upstream,
            allow_origin,
        } => {
            let mut config = RelayConfig::default()
                .with_bind(bind)
                .with_prefix(prefix)
                .with_upstream(upstream);
            if !allow_origin.is_empty() {
                config = config.with_allowed_origins(allow_origin);
            }
            relay(config).await
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_dir.clone());

    if let Err(e) = run(cli).await {
        log::error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sort() {
        assert_eq!(parse_sort("LastName:desc").unwrap(), SortInput::new("LastName", "desc"));
        assert_eq!(parse_sort("Age").unwrap(), SortInput::new("Age", "asc"));
        assert!(parse_sort(":desc").is_err());
    }

    #[test]
    fn test_parse_filter_keeps_colons_in_value() {
        assert_eq!(
            parse_filter("UserName:starts:a:b").unwrap(),
            FilterInput::new("UserName", "starts", "a:b")
        );
        assert!(parse_filter("UserName:contains").is_err());
    }

    #[test]
    fn test_cli_parses_view() {
        let cli = Cli::try_parse_from([
            "odatagrid",
            "view",
            "?page=2",
            "--sort",
            "LastName:desc",
            "--filter",
            "FirstName:contains:a",
            "-v",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 1);
        match cli.command {
            Command::View { search, sort, filter, .. } => {
                assert_eq!(search, "?page=2");
                assert_eq!(sort, ["LastName:desc"]);
                assert_eq!(filter, ["FirstName:contains:a"]);
            }
            Command::Relay { .. } => panic!("expected view"),
        }
        assert_eq!(cli.log_dir, None);
    }

    #[test]
    fn test_log_dir_is_global() {
        let cli = Cli::try_parse_from(["odatagrid", "relay", "--log-dir", "/var/log/odatagrid"]).unwrap();
        assert_eq!(cli.log_dir, Some(PathBuf::from("/var/log/odatagrid")));
        assert!(matches!(cli.command, Command::Relay { .. }));
    }
}
