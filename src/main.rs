use jobshop_sim::params::default_config;
use jobshop_sim::report::GanttChart;
use jobshop_sim::{
    run_replications, ConcurrencyMode, MeanValueSource, ReplicationConfig, ReplicationSummary,
    SimulationEngine, SimulationReport,
};

const USAGE: &str = "usage: jobshop-sim [--seed N] [--duration T] [--replications N] \
[--parallel] [--threads N] [--mean-values] [--json] [--gantt]";

struct Options {
    seed: Option<u64>,
    duration: Option<f64>,
    replications: usize,
    parallel: bool,
    threads: Option<usize>,
    mean_values: bool,
    json: bool,
    gantt: bool,
}

fn parse_value<T: std::str::FromStr>(flag: &str, value: Option<String>) -> Result<T, String> {
    let value = value.ok_or_else(|| format!("{} needs a value\n{}", flag, USAGE))?;
    value
        .parse()
        .map_err(|_| format!("invalid value '{}' for {}", value, flag))
}

/// `Ok(None)` means help was requested
fn parse_args(argv: impl IntoIterator<Item = String>) -> Result<Option<Options>, String> {
    let mut options = Options {
        seed: None,
        duration: None,
        replications: 1,
        parallel: false,
        threads: None,
        mean_values: false,
        json: false,
        gantt: false,
    };

    let mut args = argv.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--seed" => options.seed = Some(parse_value(&arg, args.next())?),
            "--duration" => options.duration = Some(parse_value(&arg, args.next())?),
            "--replications" => options.replications = parse_value(&arg, args.next())?,
            "--threads" => options.threads = Some(parse_value(&arg, args.next())?),
            "--parallel" => options.parallel = true,
            "--mean-values" => options.mean_values = true,
            "--json" => options.json = true,
            "--gantt" => options.gantt = true,
            "-h" | "--help" => return Ok(None),
            other => return Err(format!("unknown argument '{}'\n{}", other, USAGE)),
        }
    }
    Ok(Some(options))
}

fn print_report(report: &SimulationReport, options: &Options) -> Result<(), String> {
    if options.json {
        let json = serde_json::to_string_pretty(report).map_err(|e| e.to_string())?;
        println!("{}", json);
    } else {
        println!("{}", report);
    }
    if options.gantt {
        let chart = GanttChart::from_intervals(&report.busy_intervals);
        println!("\n{}", chart.render_text(report.final_clock, 100));
    }
    Ok(())
}

fn main() -> Result<(), String> {
    env_logger::init();

    let options = match parse_args(std::env::args().skip(1))? {
        Some(options) => options,
        None => {
            println!("{}", USAGE);
            return Ok(());
        }
    };
    let mut config = default_config().map_err(|e| e.to_string())?;
    if let Some(seed) = options.seed {
        config.seed = seed;
    }
    if let Some(duration) = options.duration {
        config.sim_duration = duration;
    }

    if options.mean_values {
        let mut engine =
            SimulationEngine::with_source(config, MeanValueSource).map_err(|e| e.to_string())?;
        let report = engine.run().map_err(|e| e.to_string())?;
        return print_report(&report, &options);
    }

    if options.replications <= 1 {
        let mut engine = SimulationEngine::new(config).map_err(|e| e.to_string())?;
        let report = engine.run().map_err(|e| e.to_string())?;
        return print_report(&report, &options);
    }

    let mut replication = ReplicationConfig::new();
    if options.parallel {
        replication = replication.with_concurrency(ConcurrencyMode::Rayon);
    }
    if let Some(threads) = options.threads {
        replication = replication.with_thread_pool_size(threads);
    }

    let reports = run_replications(&config, options.replications, &replication)
        .map_err(|e| e.to_string())?;
    let summary = ReplicationSummary::from_reports(&reports);

    if options.json {
        let json = serde_json::to_string_pretty(&summary).map_err(|e| e.to_string())?;
        println!("{}", json);
    } else {
        println!("--- {} replications ---", summary.replications);
        for (label, metric) in [
            ("Total tardiness", summary.total_tardiness),
            ("Makespan", summary.makespan),
            ("Average utilization", summary.average_utilization),
            ("Completed", summary.completed),
        ] {
            println!(
                "{:<20} mean {:>10.3}  min {:>10.3}  max {:>10.3}",
                label, metric.mean, metric.min, metric.max
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_help_is_not_an_error() {
        assert!(parse_args(args(&["--help"])).unwrap().is_none());
        assert!(parse_args(args(&["--seed", "3", "-h"])).unwrap().is_none());
    }

    #[test]
    fn test_flags_are_parsed() {
        let options = parse_args(args(&["--seed", "7", "--replications", "4", "--parallel"]))
            .unwrap()
            .unwrap();
        assert_eq!(options.seed, Some(7));
        assert_eq!(options.replications, 4);
        assert!(options.parallel);
        assert!(!options.json);
    }

    #[test]
    fn test_bad_arguments_are_errors() {
        assert!(parse_args(args(&["--bogus"])).is_err());
        assert!(parse_args(args(&["--seed"])).is_err());
        assert!(parse_args(args(&["--seed", "x"])).is_err());
    }
}
