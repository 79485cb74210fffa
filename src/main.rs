use anyhow::Result;
use clap::Parser;
use inkoscribe_installer::commands::{self, InstallOptions};
use inkoscribe_installer::platform::PlatformOverrides;
use inkoscribe_installer::source::BinarySource;
use std::path::PathBuf;
use std::time::Duration;

/// inkoscribe-installer - set up inkoscribe on Apple Silicon Macs
///
/// Installs the inkoscribe binary, a launcher that points it at the Whisper
/// model, and the English base model itself.
///
/// Layout under the prefix:
///   bin/inkoscribe                     launcher (on PATH)
///   libexec/inkoscribe                 the real binary
///   share/whisper/ggml-base.en.bin     Whisper model
///
/// Examples:
///   inkoscribe-installer install
///   inkoscribe-installer --prefix /opt/inkoscribe install --binary ./inkoscribe
#[derive(Parser, Debug)]
#[command(author, version = env!("INKOSCRIBE_INSTALLER_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Install prefix (defaults to /usr/local as root, ~/.local otherwise)
    #[arg(
        long = "prefix",
        short = 'p',
        env = "INKOSCRIBE_PREFIX",
        value_name = "PATH",
        global = true
    )]
    prefix: Option<PathBuf>,

    /// Pretend to run on this OS instead of detecting it
    #[arg(long, env = "INKOSCRIBE_ASSUME_OS", global = true, hide = true)]
    assume_os: Option<String>,

    /// Pretend to run on this OS version instead of detecting it
    #[arg(long, env = "INKOSCRIBE_ASSUME_OS_VERSION", global = true, hide = true)]
    assume_os_version: Option<String>,

    /// Pretend to run on this CPU architecture instead of detecting it
    #[arg(long, env = "INKOSCRIBE_ASSUME_ARCH", global = true, hide = true)]
    assume_arch: Option<String>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Check the platform, stage inkoscribe and download the Whisper model
    Install(InstallArgs),

    /// Show permission and usage notes
    Caveats,

    /// Show where each installed file lives
    Paths(PathsArgs),

    /// Run the installed launcher and check that it responds
    Verify,
}

#[derive(clap::Args, Debug)]
struct InstallArgs {
    /// Use an already extracted inkoscribe executable
    #[arg(long, value_name = "PATH", conflicts_with_all = ["release_url", "release_sha256"])]
    binary: Option<PathBuf>,

    /// Download the binary from this release tarball
    #[arg(long, value_name = "URL", requires = "release_sha256")]
    release_url: Option<String>,

    /// Expected SHA-256 of the release tarball
    #[arg(long, value_name = "HEX", requires = "release_url")]
    release_sha256: Option<String>,

    /// Download the Whisper model from this URL
    #[arg(long, value_name = "URL", env = "INKOSCRIBE_MODEL_URL")]
    model_url: Option<String>,

    /// Expected SHA-256 of the Whisper model
    #[arg(long, value_name = "HEX")]
    model_sha256: Option<String>,

    /// Abort each download after this many seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,
}

#[derive(clap::Args, Debug)]
struct PathsArgs {
    /// Print the layout as JSON
    #[arg(long)]
    json: bool,
}

impl InstallArgs {
    fn binary_source(&self) -> BinarySource {
        match (&self.binary, &self.release_url, &self.release_sha256) {
            (Some(path), _, _) => BinarySource::Local(path.clone()),
            (None, Some(url), Some(sha256)) => BinarySource::Release {
                url: url.clone(),
                sha256: sha256.clone(),
            },
            _ => BinarySource::default(),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let runtime = inkoscribe_installer::runtime::RealRuntime;

    match cli.command {
        Commands::Install(args) => {
            let overrides = PlatformOverrides::parse(
                cli.assume_os.as_deref(),
                cli.assume_os_version.as_deref(),
                cli.assume_arch.as_deref(),
            )?;
            let options = InstallOptions {
                binary: args.binary_source(),
                model_url: args.model_url,
                model_sha256: args.model_sha256,
                timeout: args.timeout.map(Duration::from_secs),
                overrides,
            };
            commands::install(runtime, cli.prefix, options).await?
        }
        Commands::Caveats => commands::caveats()?,
        Commands::Paths(args) => commands::paths(runtime, cli.prefix, args.json)?,
        Commands::Verify => commands::verify(runtime, cli.prefix)?,
    }
    Ok(())
}
