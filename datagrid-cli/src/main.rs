mod args;
mod render;

use std::fs::File;
use std::path::Path;

use clap::Parser;
use simplelog::ColorChoice;
use simplelog::Config;
use simplelog::LevelFilter;
use simplelog::TermLogger;
use simplelog::TerminalMode;
use simplelog::WriteLogger;

use datagrid_lib::TableController;
use datagrid_lib::config::ColumnDef;
use datagrid_lib::config::Roles;
use datagrid_lib::config::TableConfig;
use datagrid_lib::error::SourceError;
use datagrid_lib::export::ExportFormat;
use datagrid_lib::model::RowId;
use datagrid_lib::source::DataSource;
use datagrid_lib::source::JsonFileSource;
use datagrid_lib::view::Direction;
use datagrid_lib::view::SortSpec;

use args::Cli;
use args::Commands;
use args::TableArgs;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Engine(#[from] datagrid_lib::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Usage(String),
}

impl From<SourceError> for CliError {
    fn from(err: SourceError) -> Self {
        CliError::Engine(err.into())
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.verbose, cli.log_file.as_deref()) {
        eprintln!("Failed to initialize logger: {}", e);
    }

    if let Err(e) = run(cli.command).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8, log_file: Option<&Path>) -> Result<(), CliError> {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let result = match log_file {
        Some(path) => WriteLogger::init(level.max(LevelFilter::Info), Config::default(), File::create(path)?),
        None => TermLogger::init(level, Config::default(), TerminalMode::Stderr, ColorChoice::Auto),
    };
    result.map_err(|e| CliError::Usage(e.to_string()))
}

async fn run(command: Commands) -> Result<(), CliError> {
    match command {
        Commands::View { table } => {
            let controller = load(&table).await?;
            let columns: Vec<&ColumnDef> = controller.config().data_columns().collect();
            print!("{}", render::render_table(&columns, &controller.view()));
        }
        Commands::Export {
            table,
            format,
            select,
            out,
        } => {
            let format: ExportFormat = format
                .parse()
                .map_err(|e: datagrid_lib::error::ExportError| CliError::Engine(e.into()))?;
            let mut controller = load(&table).await?;

            if let Some(ids) = select {
                let requested = ids.len();
                let selected = controller.select_all(ids.into_iter().map(RowId::from));
                if selected < requested {
                    log::warn!("{} of {} ids are not in the filtered rows", requested - selected, requested);
                }
            }

            let file = controller
                .export(format)
                .map_err(|e| CliError::Engine(e.into()))?;
            let path = out.join(&file.file_name);
            tokio::fs::write(&path, &file.bytes).await?;
            println!("{} ({} rows)", path.display(), file.row_count);
        }
    }
    Ok(())
}

async fn load(args: &TableArgs) -> Result<TableController, CliError> {
    let json = tokio::fs::read_to_string(&args.config).await?;
    let config = TableConfig::from_json(&json).map_err(|e| CliError::Engine(e.into()))?;
    let rows = JsonFileSource::new(&args.rows).fetch().await?;

    let mut controller = TableController::builder(config)
        .rows(rows)
        .roles(Roles::from(args.roles.clone()))
        .build()
        .map_err(|e| CliError::Engine(e.into()))?;

    apply_query(&mut controller, args)?;
    Ok(controller)
}

fn apply_query(controller: &mut TableController, args: &TableArgs) -> Result<(), CliError> {
    let state_err = |e: datagrid_lib::error::StateError| CliError::Engine(e.into());

    if let Some(term) = &args.search {
        controller.set_search(term.as_str());
    }

    for filter in &args.filters {
        let (id, value) = filter
            .split_once('=')
            .ok_or_else(|| CliError::Usage(format!("filter '{}' is not ID=VALUE", filter)))?;
        controller.set_filter(id.trim(), value).map_err(state_err)?;
    }

    if let Some(sort) = &args.sort {
        controller.set_sort(Some(parse_sort(sort)?)).map_err(state_err)?;
    }

    if let Some(per_page) = args.per_page {
        let applied = controller.set_items_per_page(per_page);
        if applied != per_page {
            log::warn!("{} rows per page is not offered, using {}", per_page, applied);
        }
    }

    if let Some(page) = args.page {
        controller.set_page(page);
    }
    Ok(())
}

fn parse_sort(s: &str) -> Result<SortSpec, CliError> {
    let (column, direction) = match s.split_once(':') {
        Some((column, "asc")) => (column, Direction::Asc),
        Some((column, "desc")) => (column, Direction::Desc),
        Some((_, other)) => return Err(CliError::Usage(format!("unknown sort direction '{}'", other))),
        None => (s, Direction::Asc),
    };
    Ok(SortSpec::new(column, direction))
}
