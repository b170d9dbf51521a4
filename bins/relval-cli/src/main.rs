mod cmd;

use clap::{Parser, Subcommand};
use cmd::config::{Effective, GlobalArgs};
use cmd::encode::Layout;
use cmd::error::CliError;
use cmd::eval::Op;

#[derive(Parser)]
#[command(name = "relval", about = "Evaluate, cast and encode typed SQL values")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Command,
}

/// Literals are `kind:text`, `null:kind` or `array:kind:a,b,c`.
#[derive(Subcommand)]
enum Command {
    /// Apply a binary operator, e.g. `eval integer:2 add bigint:40`
    Eval {
        lhs: String,
        #[arg(value_enum)]
        op: Op,
        rhs: String,
    },

    /// Cast a literal to another kind, e.g. `cast varchar:42 smallint`
    Cast { literal: String, target: String },

    /// Encode literals, decode them back and print both
    Encode {
        #[arg(long, value_enum, default_value_t = Layout::Stream)]
        layout: Layout,

        #[arg(required = true)]
        literals: Vec<String>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Eval { lhs, op, rhs } => println!("{}", cmd::eval::run(&lhs, op, &rhs)?),
        Command::Cast { literal, target } => println!("{}", cmd::cast::run(&literal, &target)?),
        Command::Encode { layout, literals } => {
            let eff = Effective::new(&cli.global)?;
            for line in cmd::encode::run(&eff, layout, &literals)? {
                println!("{line}");
            }
            tracing::info!(bytes = eff.pool.allocated_bytes(), "pool usage");
        }
    }
    Ok(())
}
