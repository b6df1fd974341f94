use anyhow::bail;
use clap::Parser;
use core::time::Duration;
use std::path::PathBuf;
use stresstest::{ConnectionReuse, FleetConfig, PoolConfig};

/// Runtime configuration for the `stresstest` binary.
///
/// Every option can also be given through an environment variable (or a
/// `.env` file), which is convenient when the generator runs in a container
/// next to the service under test.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "stresstest",
    version,
    about = "Simulates many clients sending periodic requests over a shared TCP connection pool"
)]
pub struct CliArgs {
    /// Number of simulated applications (clients).
    ///
    /// Each application gets its own identifier, producer and dispatcher.
    ///
    /// Environment variable: `STRESSTEST_NR_OF_APPLICATIONS`
    #[arg(
        short = 'n',
        long,
        alias = "nr_of_applications",
        env = "STRESSTEST_NR_OF_APPLICATIONS",
        default_value_t = 20
    )]
    pub nr_of_applications: usize,

    /// File with one application identifier per line.
    ///
    /// Without it, identifiers are drawn from the built-in NATO alphabet. A
    /// file must hold at least as many distinct identifiers as there are
    /// applications.
    ///
    /// Environment variable: `STRESSTEST_PATH`
    #[arg(short = 'p', long, env = "STRESSTEST_PATH")]
    pub path: Option<PathBuf>,

    /// Maximum number of idle connections kept in the pool.
    ///
    /// Environment variable: `STRESSTEST_POOL_CAPACITY`
    #[arg(
        long,
        visible_alias = "pc",
        alias = "pool_capacity",
        env = "STRESSTEST_POOL_CAPACITY",
        default_value_t = 20
    )]
    pub pool_capacity: usize,

    /// Connections dialed when the pool is built. Startup fails if any of
    /// them cannot be made.
    ///
    /// Environment variable: `STRESSTEST_MIN_CAPACITY`
    #[arg(long, env = "STRESSTEST_MIN_CAPACITY", default_value_t = 5)]
    pub min_capacity: usize,

    /// Host to send requests to.
    ///
    /// Environment variable: `STRESSTEST_SERVER`
    #[arg(short = 's', long, env = "STRESSTEST_SERVER", default_value_t = String::from("127.0.0.1"))]
    pub server: String,

    /// Port to send requests to.
    ///
    /// Environment variable: `STRESSTEST_PORT`
    #[arg(long, visible_alias = "po", env = "STRESSTEST_PORT", default_value_t = 80)]
    pub port: u16,

    /// Seconds between two requests of the same application.
    ///
    /// Environment variable: `STRESSTEST_TIMEOUT`
    #[arg(short = 't', long, env = "STRESSTEST_TIMEOUT", default_value_t = 60)]
    pub timeout: u64,

    /// Each application waits a random number of seconds below this bound
    /// before its first request, so applications do not fire in lockstep.
    ///
    /// Environment variable: `STRESSTEST_INITIAL_JITTER`
    #[arg(long, env = "STRESSTEST_INITIAL_JITTER", default_value_t = 59)]
    pub initial_jitter: u64,

    /// Return connections to the pool after a successful send instead of
    /// closing them.
    ///
    /// Environment variable: `STRESSTEST_REUSE_CONNECTIONS`
    #[arg(long, env = "STRESSTEST_REUSE_CONNECTIONS", default_value_t = false)]
    pub reuse_connections: bool,

    /// Probe idle connections before handing them out and drop the ones the
    /// peer has closed.
    ///
    /// Environment variable: `STRESSTEST_VALIDATE_IDLE`
    #[arg(long, env = "STRESSTEST_VALIDATE_IDLE", default_value_t = false)]
    pub validate_idle: bool,

    /// Seconds to wait for applications to stop after Ctrl+C or SIGTERM.
    ///
    /// Environment variable: `STRESSTEST_SHUTDOWN_TIMEOUT`
    #[arg(long, env = "STRESSTEST_SHUTDOWN_TIMEOUT", default_value_t = 3)]
    pub shutdown_timeout: u64,
}

#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub identifier_path: Option<PathBuf>,
    pub server: String,
    pub port: u16,
    pub pool: PoolConfig,
    pub fleet: FleetConfig,
    pub shutdown_timeout: Duration,
}

impl TryFrom<CliArgs> for RunnerConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if args.nr_of_applications == 0 {
            bail!("NR_OF_APPLICATIONS must be greater than 0");
        }

        if args.pool_capacity == 0 {
            bail!("POOL_CAPACITY must be greater than 0");
        }

        if args.min_capacity > args.pool_capacity {
            bail!(
                "MIN_CAPACITY ({}) exceeds POOL_CAPACITY ({})",
                args.min_capacity,
                args.pool_capacity
            );
        }

        if args.timeout == 0 {
            bail!("TIMEOUT must be greater than 0");
        }

        if args.port == 0 {
            bail!("PORT must not be 0");
        }

        let connection_reuse = if args.reuse_connections {
            ConnectionReuse::Release
        } else {
            ConnectionReuse::Discard
        };

        Ok(Self {
            identifier_path: args.path,
            server: args.server,
            port: args.port,
            pool: PoolConfig::new(args.min_capacity, args.pool_capacity)
                .with_validate_idle(args.validate_idle),
            fleet: FleetConfig {
                application_count: args.nr_of_applications,
                send_period: Duration::from_secs(args.timeout),
                initial_jitter: Duration::from_secs(args.initial_jitter),
                connection_reuse,
            },
            shutdown_timeout: Duration::from_secs(args.shutdown_timeout),
        })
    }
}
