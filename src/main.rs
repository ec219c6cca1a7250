use std::io::Write;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use dimse::{UlConnector, WorklistQuery};
use worklist_probe::config::ProbeConfig;
use worklist_probe::{files, inspector, logging, query_runner, self_test};

#[derive(Parser, Debug)]
#[command(
    name = "worklist-probe",
    about = "Inspect DICOM worklist files and query a worklist SCP"
)]
struct Cli {
    /// TOML file overriding the built-in defaults
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log protocol details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Decode the first worklist file in the directory and print its fields
    Inspect {
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },
    /// List the worklist files present in the directory
    Files {
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },
    /// Run a worklist C-FIND against the SCP
    Query(RemoteArgs),
    /// Check the worklist files, then query the SCP
    Test {
        #[arg(short, long)]
        dir: Option<PathBuf>,
        #[command(flatten)]
        remote: RemoteArgs,
    },
}

#[derive(Args, Debug)]
struct RemoteArgs {
    /// SCP host
    #[arg(long)]
    host: Option<String>,
    /// SCP port
    #[arg(long)]
    port: Option<u16>,
    /// Called AE title
    #[arg(long)]
    aet: Option<String>,
    /// Calling AE title
    #[arg(long)]
    calling_aet: Option<String>,
}

impl RemoteArgs {
    fn apply(self, config: &mut ProbeConfig) {
        if let Some(host) = self.host {
            config.remote.host = host;
        }
        if let Some(port) = self.port {
            config.remote.port = port;
        }
        if let Some(aet) = self.aet {
            config.remote.ae_title = aet;
        }
        if let Some(aet) = self.calling_aet {
            config.scu.local_aet = aet;
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ProbeConfig::from_file(path)?,
        None => ProbeConfig::default(),
    };

    match &cli.cmd {
        Cmd::Inspect { dir } | Cmd::Files { dir } | Cmd::Test { dir, .. } => {
            if let Some(dir) = dir {
                config.worklist_dir = dir.clone();
            }
        }
        Cmd::Query(_) => {}
    }

    logging::init_logging(&config.logging, cli.verbose)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cli.cmd {
        Cmd::Inspect { .. } => {
            inspector::inspect_directory(&config.worklist_dir, &config.extension, &mut out)?;
        }
        Cmd::Files { .. } => {
            files::list_worklist_files(
                &config.worklist_dir,
                &config.extension,
                config.sample_size,
                &mut out,
            )?;
        }
        Cmd::Query(remote) => {
            remote.apply(&mut config);
            config.validate()?;
            let connector = UlConnector::new(config.scu.clone());
            query_runner::run_query(&connector, &config.remote, &WorklistQuery::default(), &mut out)?;
        }
        Cmd::Test { remote, .. } => {
            remote.apply(&mut config);
            config.validate()?;
            let connector = UlConnector::new(config.scu.clone());
            self_test::run_self_test(&config, &connector, &mut out)?;
        }
    }

    out.flush()?;
    Ok(())
}
