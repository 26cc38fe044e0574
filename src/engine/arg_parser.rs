use clap::Parser;
use std::path::PathBuf;

/// Load gzip-compressed installed-apps TSV files into sharded memcached.
///
/// Every option also has a config-file counterpart; flags given here win.
#[derive(Clone, Debug, Default, Parser)]
#[command(name = "memc_load")]
#[command(about = "Load installed-apps TSV dumps into memcached; exit status reflects the error rate.")]
pub struct Cli {
    /// Log file (appended). Default: memc.log; stderr if it cannot be opened.
    #[arg(long)]
    pub log: Option<PathBuf>,

    /// Glob pattern of input files. Default: ./data/*.tsv.gz
    #[arg(long, short = 'p')]
    pub pattern: Option<String>,

    /// memcached address for idfa devices. Default: 127.0.0.1:33013
    #[arg(long, value_name = "HOST:PORT")]
    pub idfa: Option<String>,

    /// memcached address for gaid devices. Default: 127.0.0.1:33014
    #[arg(long, value_name = "HOST:PORT")]
    pub gaid: Option<String>,

    /// memcached address for adid devices. Default: 127.0.0.1:33015
    #[arg(long, value_name = "HOST:PORT")]
    pub adid: Option<String>,

    /// memcached address for dvid devices. Default: 127.0.0.1:33016
    #[arg(long, value_name = "HOST:PORT")]
    pub dvid: Option<String>,

    /// Reader (decompress + parse) threads. Default: 3
    #[arg(long, short = 'r')]
    pub readers: Option<usize>,

    /// Writer (memcached) threads. Default: 3
    #[arg(long, short = 'w')]
    pub writers: Option<usize>,

    /// Records per batch. Default: 100
    #[arg(long, short = 'n')]
    pub batch_size: Option<usize>,

    /// Config file. Default: memc_load.toml in the working directory, if present.
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Log what would be written; do not contact memcached or rename files.
    #[arg(long)]
    pub dry_run: bool,

    /// Debug logging and a progress bar.
    #[arg(long, short = 'v')]
    pub verbose: bool,
}

impl Cli {
    /// Shard addresses given on the command line, by category.
    pub fn shard_overrides(&self) -> Vec<(&'static str, &str)> {
        [
            ("idfa", &self.idfa),
            ("gaid", &self.gaid),
            ("adid", &self.adid),
            ("dvid", &self.dvid),
        ]
        .into_iter()
        .filter_map(|(c, a)| a.as_deref().map(|a| (c, a)))
        .collect()
    }
}
