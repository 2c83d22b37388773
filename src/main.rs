use clap::Parser;
use env_logger::{Builder, Env};
use saveform::cli::commands::{cmd_clear, cmd_list, cmd_show};
use saveform::cli::config::{Cli, Commands, load_config, resolve_config};
use saveform::storage::file::FileStorage;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    Builder::from_env(Env::default().default_filter_or(level)).init();

    // Resolve settings: CLI > config > defaults
    let config = resolve_config(&cli, load_config(cli.config.as_deref()));
    let store = FileStorage::open(&config.store)?;
    log::info!("using store {}", store.path().display());

    match cli.command {
        Commands::List { all } => {
            let lines = cmd_list(&store, &config.prefix, all)?;
            if lines.is_empty() {
                eprintln!("No snapshots stored in {}", config.store);
            }
            for line in lines {
                println!("{}", line);
            }
        }
        Commands::Show { form } => match cmd_show(&store, &config.prefix, &form)? {
            Some(rendered) => println!("{}", rendered),
            None => {
                eprintln!("No snapshot stored for '{}{}'", config.prefix, form);
                std::process::exit(1);
            }
        },
        Commands::Clear { form } => {
            if cmd_clear(&store, &config.prefix, &form)? {
                println!("Cleared {}{}", config.prefix, form);
            } else {
                println!("Nothing stored for {}{}", config.prefix, form);
            }
        }
    }

    Ok(())
}
