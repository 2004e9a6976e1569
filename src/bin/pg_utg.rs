// Peregrine Assembler and SHIMMER Genome Assembly Toolkit
// 2019, 2020, 2021- (c) by Jason, Chen-Shan, Chin
//
// This Source Code Form is subject to the terms of the
// Creative Commons Attribution-NonCommercial-ShareAlike 4.0 International License.
//
// You should have received a copy of the license along with this
// work. If not, see <http://creativecommons.org/licenses/by-nc-sa/4.0/>.

const VERSION_STRING: &'static str = env!("VERSION_STRING");

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use clap::{clap_app, value_t};
mod utils;
use simple_logger::SimpleLogger;
use sysinfo::SystemExt;
use utils::error::LayoutError;
use utils::layout_io::{load_layout_input, log_unitig_summary, write_layout_file};
use utils::populate::build_unitigs;
use utils::tig_vector::TigVector;
use utils::{log_resource, rusage, MaybeUninit, Parameters};

// the per-read placement lines are debug lines, so --verbose implies DEBUG
fn log_level(log: Option<&str>, verbose: bool) -> log::LevelFilter {
    match log.unwrap_or("INFO") {
        "DEBUG" => log::LevelFilter::Debug,
        _ if verbose => log::LevelFilter::Debug,
        _ => log::LevelFilter::Info,
    }
}

fn main() -> Result<(), LayoutError> {
    let mut rdata: rusage = unsafe { MaybeUninit::zeroed().assume_init() };

    let matches = clap_app!(pg_utg =>
        (version: VERSION_STRING)
        (author: "Jason Chin <jason@omnibio.ai>")
        (about: "
Peregrine-2021 genome assembler,
pg_utg: build unitigs from the best overlap graph and refine the read positions
LICENSE: http://creativecommons.org/licenses/by-nc-sa/4.0/")
        (@arg INPUT_PREFIX: +required "Prefix of the read / best edge / overlap files (plain or gz)")
        (@arg output_file: --output +required +takes_value "Path to the output layout file")
        (@arg NTHREADS: +takes_value "Number of threads")
        (@arg max_iter: --max_iter +takes_value "Maximum position refinement rounds [default: 5]")
        (@arg verbose: --verbose "log per-read placement details (turns on DEBUG logging)")
        (@arg no_optimize: --no_optimize "skip the position refinement")
        (@arg log: --log +takes_value "log level: DBBUG or INFO (default)")
    ).get_matches();

    let log_level = log_level(matches.value_of("log"), matches.is_present("verbose"));

    SimpleLogger::new()
        .with_level(log_level)
        .with_utc_timestamps()
        .init()
        .unwrap_or_else(|e| eprintln!("logger is already set: {}", e));

    let input_prefix = matches.value_of("INPUT_PREFIX").unwrap_or_default().to_string();
    let output_file = matches.value_of("output_file").unwrap_or_default().to_string();

    let mut parameters = Parameters::default();
    parameters.nthreads = if matches.is_present("NTHREADS") {
        value_t!(matches, "NTHREADS", u32).unwrap_or_else(|e| e.exit())
    } else {
        num_cpus::get_physical() as u32
    };
    if matches.is_present("max_iter") {
        parameters.max_iterations = value_t!(matches, "max_iter", u32).unwrap_or_else(|e| e.exit());
    }
    parameters.verbose = matches.is_present("verbose");
    let no_optimize = matches.is_present("no_optimize");

    log::info!("pg_utg: version: {}", VERSION_STRING);
    log::info!("pg_utg: input_prefix: {}", input_prefix);
    log::info!("pg_utg: output: {}", output_file);
    log::info!("pg_utg: nthreads: {}", parameters.nthreads);
    log::info!("pg_utg: max_iterations: {}", parameters.max_iterations);

    if let Err(e) = rayon::ThreadPoolBuilder::new()
        .num_threads(parameters.nthreads as usize)
        .build_global()
    {
        log::warn!("pg_utg: can not set up the thread pool: {}", e);
    }

    let system = sysinfo::System::new_all();
    log::info!(
        "pg_utg: total memory: {}kb, used memory: {}kb",
        system.total_memory(),
        system.used_memory()
    );

    log_resource("BGN: loading layout input", &mut rdata);
    let input = load_layout_input(&input_prefix)?;
    log_resource("END: loading layout input", &mut rdata);

    log_resource("BGN: building unitigs", &mut rdata);
    let mut tigs = TigVector::new(input.ri.num_reads());
    build_unitigs(&mut tigs, &input.ri, &input.og, true)?;
    log_resource("END: building unitigs", &mut rdata);

    if no_optimize {
        log::info!("pg_utg: position refinement disabled");
    } else {
        log_resource("BGN: optimizing positions", &mut rdata);
        let summary = tigs.optimize_positions(&input.ri, &input.oc, &parameters, "pg_utg");
        log::info!(
            "pg_utg: position refinement ran {} round(s), {} reads converged, {} changed",
            summary.iterations,
            summary.converged,
            summary.changed
        );
        log_resource("END: optimizing positions", &mut rdata);
    }

    write_layout_file(&tigs, &output_file)?;
    log_unitig_summary(&tigs);
    log_resource("END: pg_utg", &mut rdata);
    Ok(())
}
