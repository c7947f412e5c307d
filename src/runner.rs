// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Thomas Junier
// Modifications (c) 2026 Peter Carlton

use std::{
    io::{stdout, Write},
    path::{Path, PathBuf},
    time::Duration,
};

use log::{error, info, warn};

use clap::Parser;

use crate::blast::client::{AlignmentService, NcbiWww, Program, SearchRequest};
use crate::blast::filter::DEFAULT_EVALUE_THRESHOLD;
use crate::blast::record::AlignmentRecord;
use crate::blast::report::write_report;
use crate::config::{find_sigblast_config, SigBlastConfig};
use crate::errors::SigBlastError;
use crate::seq::fasta::read_fasta_query;

#[derive(Debug, Parser)]
#[command(version, about, long_about = None) ]
struct Cli {
    /// Query file (FastA)
    #[arg(default_value = "myseq.fa")]
    fasta: PathBuf,

    /// Report HSPs with an E-value strictly below this
    #[arg(short, long, default_value_t = DEFAULT_EVALUE_THRESHOLD)]
    evalue: f64,

    /// BLAST program
    #[arg(short, long, default_value_t = Program::Blastn,
        help = "BLAST program [blastn|blastp|blastx|tblastn|tblastx]; default: blastn",
        hide_default_value = true,
        hide_possible_values = true,
    )]
    program: Program,

    /// Target database
    #[arg(short, long, default_value = "nt")]
    database: String,

    /// BLAST service URL (overrides config)
    #[arg(long)]
    url: Option<String>,

    /// Contact e-mail sent along with the search (overrides config)
    #[arg(long)]
    email: Option<String>,

    /// Seconds between status checks (overrides config)
    #[clap(long = "poll-interval")]
    poll_interval: Option<u64>,

    /// Maximum number of hits the service returns (overrides config)
    #[clap(long = "hitlist-size")]
    hitlist_size: Option<u32>,
}

/// Reads the query in `path`, runs a blastn search against nt, and writes the HSPs with E-value
/// below `threshold` to `out`. Returns the number of HSPs written.
pub fn perform_blast<S, W>(
    path: &Path,
    threshold: f64,
    service: &S,
    out: &mut W,
) -> Result<usize, SigBlastError>
where
    S: AlignmentService,
    W: Write,
{
    search_and_report(path, SearchRequest::blastn_nt(""), threshold, service, out)
}

/// Like `perform_blast()`, with program, database and service limits taken from `request`. Its
/// sequence is replaced by the contents of `path`.
pub fn search_and_report<S, W>(
    path: &Path,
    mut request: SearchRequest,
    threshold: f64,
    service: &S,
    out: &mut W,
) -> Result<usize, SigBlastError>
where
    S: AlignmentService,
    W: Write,
{
    let query = read_fasta_query(path)?;
    if query.is_empty() {
        warn!("{} is empty", path.display());
    }
    request.sequence = query.text;

    // The handle is consumed by the parser, so the connection is closed before anything is
    // printed.
    let handle = service.qblast(&request)?;
    let record = AlignmentRecord::read(handle)?;
    info!(
        "{} alignment(s), {} HSP(s) for {}",
        record.alignments.len(),
        record.num_hsps(),
        record.query_title
    );

    let count = write_report(out, &record, threshold)?;
    Ok(count)
}

/// Prints the outcome of a search the way users expect: nothing more on success, one line on
/// failure. Termination is normal either way.
pub fn report_outcome<W: Write>(result: Result<usize, SigBlastError>, out: &mut W) {
    if let Err(e) = result {
        error!("{:?}", e);
        writeln!(out, "{}", e.user_message()).ok();
    }
}

fn load_config() -> SigBlastConfig {
    match find_sigblast_config() {
        Some(path) => match SigBlastConfig::from_file(&path) {
            Ok(cfg) => {
                info!("Read config from {}", path.display());
                cfg
            }
            Err(e) => {
                warn!("Error reading {}: {}", path.display(), e);
                SigBlastConfig::default()
            }
        },
        None => SigBlastConfig::default(),
    }
}

pub fn run() -> Result<(), SigBlastError> {
    env_logger::init();
    info!("Starting log");

    let cli = Cli::parse();
    let config = load_config();

    let mut service = NcbiWww::new(cli.url.unwrap_or(config.url));
    service.email = cli.email.or(config.email);
    if let Some(tool) = config.tool {
        service.tool = tool;
    }
    service.poll_interval = cli
        .poll_interval
        .map(Duration::from_secs)
        .unwrap_or(config.poll_interval);

    let request = SearchRequest {
        program: cli.program,
        database: cli.database,
        sequence: String::new(),
        hitlist_size: cli.hitlist_size.unwrap_or(config.hitlist_size),
        expect: config.expect,
    };

    let mut out = stdout().lock();
    let result = search_and_report(&cli.fasta, request, cli.evalue, &service, &mut out);
    report_outcome(result, &mut out);
    out.flush()?;

    Ok(())
}
