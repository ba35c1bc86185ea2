use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod build_cmd;
mod codes;
mod dump;
mod hello_args;
mod parse_cmd;
mod send;

use hello_args::HelloArgs;

/// helloforge: build, send and dissect TLS hello messages.
#[derive(Parser)]
#[command(name = "hforge")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a ClientHello and print it as hex.
    Build {
        #[command(flatten)]
        hello: HelloArgs,
        /// Print only the ClientHello body, without handshake or record headers.
        #[arg(long)]
        body: bool,
        /// Also print a field-by-field dump to stderr.
        #[arg(short, long)]
        text: bool,
    },
    /// Send a ClientHello to a server and dissect the reply.
    Send {
        /// Target host[:port] (default port 443).
        connect: Option<String>,
        #[command(flatten)]
        hello: HelloArgs,
        /// Connect and I/O timeout in seconds.
        #[arg(long, default_value_t = 10)]
        timeout: u64,
        /// Emit a JSON summary instead of a text dump.
        #[arg(long)]
        json: bool,
    },
    /// Dissect hex-encoded records (a file path, or - for stdin).
    Parse {
        /// Input file containing hex (use - for stdin).
        input: String,
        /// Keep unrecognized extension types instead of failing.
        #[arg(long)]
        permissive: bool,
    },
    /// List known protocol codes.
    Codes {
        /// Filter (all, versions, ciphers, groups, sigalgs, extensions).
        #[arg(default_value = "all")]
        filter: String,
    },
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("hforge={level},hforge_tls={level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match &cli.command {
        Commands::Build { hello, body, text } => build_cmd::run(hello, *body, *text),
        Commands::Send {
            connect,
            hello,
            timeout,
            json,
        } => send::run(connect.as_deref(), hello, *timeout, *json),
        Commands::Parse { input, permissive } => parse_cmd::run(input, *permissive),
        Commands::Codes { filter } => codes::run(filter),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
