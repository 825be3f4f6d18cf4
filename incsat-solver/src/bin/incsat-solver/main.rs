mod dimacs;
mod os_signal_termination;
mod result;

use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use dimacs::parse_cnf;
use dimacs::DimacsFormula;
use incsat_solver::asserts::INCSAT_ASSERT_LEVEL_DEFINITION;
use incsat_solver::asserts::INCSAT_ASSERT_MODERATE;
use incsat_solver::exchange::Portfolio;
use incsat_solver::statistics::configure_statistic_logging;
use incsat_solver::termination::Combinator;
use incsat_solver::termination::TimeBudget;
use incsat_solver::EliminationOptions;
use incsat_solver::LearnedClauseSortingStrategy;
use incsat_solver::LearningOptions;
use incsat_solver::Literal;
use incsat_solver::RestartOptions;
use incsat_solver::SearchLimit;
use incsat_solver::SequenceGeneratorType;
use incsat_solver::SolveResult;
use incsat_solver::SolverInstance;
use incsat_solver::SolverOptions;
use log::error;
use log::info;
use log::warn;
use log::Level;
use log::LevelFilter;
use os_signal_termination::OsSignal;
use result::SolverError;
use result::SolverResult;

#[derive(Debug, Parser)]
#[command(
    help_template = "\
{before-help}{name} {version}
Authors: {author}
About: {about}

{usage-heading}\n{tab}{usage}

{all-args}{after-help}
",
    author,
    version,
    about,
    arg_required_else_help = true
)]
struct Args {
    /// The instance to solve, given in the DIMACS CNF format ('*.cnf').
    #[clap(verbatim_doc_comment)]
    instance_path: PathBuf,

    /// Literals (in DIMACS notation) which are assumed to be true while solving. They can be
    /// given as a comma separated list or by repeating the option, e.g. "--assume=1,-4".
    ///
    /// When the instance is unsatisfiable under the assumptions, the failed assumptions are
    /// printed on a line starting with "c failed:".
    #[arg(
        long = "assume",
        value_delimiter = ',',
        allow_negative_numbers = true,
        verbatim_doc_comment
    )]
    assumptions: Vec<i32>,

    /// The number of variable elimination rounds which are run before solving. Variables in
    /// the assumptions are never eliminated.
    ///
    /// Possible values: u32
    #[arg(long = "simplify-rounds", default_value_t = 0, verbatim_doc_comment)]
    simplify_rounds: u32,

    /// The number of instances which solve the formula in turns while exchanging short learned
    /// clauses. With a single instance no clauses are exchanged.
    ///
    /// Possible values: usize
    #[arg(long = "portfolio", default_value_t = 1, verbatim_doc_comment)]
    portfolio: usize,

    /// The maximum number of literals in a learned clause which is exchanged between the
    /// instances of the portfolio.
    ///
    /// Possible values: usize
    #[arg(long = "exchange-max-length", default_value_t = 3, verbatim_doc_comment)]
    exchange_max_length: usize,

    /// The time (in milliseconds) an instance of the portfolio solves before the next instance
    /// takes over.
    ///
    /// Possible values: u64
    #[arg(long = "time-slice", default_value_t = 20, verbatim_doc_comment)]
    time_slice: u64,

    /// The maximum number of conflicts before the solver gives up. Not used in portfolio mode.
    ///
    /// Possible values: u64 (Optional)
    #[arg(long = "conflict-limit", verbatim_doc_comment)]
    conflict_limit: Option<u64>,

    /// The maximum number of decisions before the solver gives up. Not used in portfolio mode.
    ///
    /// Possible values: u64 (Optional)
    #[arg(long = "decision-limit", verbatim_doc_comment)]
    decision_limit: Option<u64>,

    /// The maximum number of bytes the clause database may occupy. When the solver needs more,
    /// it stops with an unknown result.
    ///
    /// Possible values: usize (Optional)
    #[arg(long = "clause-memory-limit", verbatim_doc_comment)]
    clause_memory_limit: Option<usize>,

    /// Learned clauses with an LBD of at most this value are never removed from the database.
    ///
    /// Possible values: u32
    #[arg(long = "learning-lbd-threshold", default_value_t = 5, verbatim_doc_comment)]
    learning_lbd_threshold: u32,

    /// The number of high-LBD learned clauses which are kept before roughly half of them are
    /// removed.
    ///
    /// Possible values: usize
    #[arg(
        long = "learning-max-num-high-lbd-clauses",
        default_value_t = 4000,
        verbatim_doc_comment
    )]
    learning_max_num_high_lbd_clauses: usize,

    /// Decides which high-LBD learned clauses are removed first when the database is reduced.
    #[arg(long = "learning-sorting-strategy", value_enum, default_value_t)]
    learning_sorting_strategy: LearnedClauseSortingStrategy,

    /// Decides whether learned clauses are minimised as a post-processing step after computing
    /// the 1-UIP, by removing the literals which are implied by the remaining ones.
    ///
    /// If this flag is present then the minimisation is turned off.
    ///
    /// Possible values: bool
    #[arg(long = "no-learning-minimise", verbatim_doc_comment)]
    no_learning_clause_minimisation: bool,

    /// Decides the sequence based on which the restarts are performed.
    ///
    /// - The "constant" approach uses a constant number of conflicts before another restart is
    ///   triggered
    /// - The "geometric" approach uses a geometrically increasing sequence
    /// - The "luby" approach uses a recursive sequence of the form 1, 1, 2, 1, 1, 2, 4, 1, 1, 2,
    ///   1, 1, 2, 4, 8, 1, 1, 2.... (see "Optimal speedup of Las Vegas algorithms - Luby et al.
    ///   (1993)")
    ///
    /// To be used in combination with "--restart-base-interval".
    #[arg(long, value_enum, default_value_t)]
    restart_sequence_generator_type: SequenceGeneratorType,

    /// The base interval length is used as a multiplier to the restart sequence.
    /// - In the case of the "constant" restart sequence this argument indicates the constant which
    ///   is used to determine when a restart occurs
    /// - For the "geometric" approach this argument indicates the starting value of the sequence
    /// - For the "luby" approach, the sequence is multiplied by this value
    ///
    /// Possible values: u64
    #[arg(
        long = "restart-base-interval",
        default_value_t = 50,
        verbatim_doc_comment
    )]
    restart_base_interval: u64,

    /// Indicates the minimum number of initial conflicts before the first restart can occur.
    ///
    /// Possible values: u64
    #[arg(
        long = "restart-min-initial-conflicts",
        default_value_t = 10000,
        verbatim_doc_comment
    )]
    restart_min_num_conflicts_before_first_restart: u64,

    /// Used to determine if a restart should be forced (see "Refining Restarts Strategies for SAT
    /// and UNSAT - Audemard and Simon (2012)"). A restart is performed when the short-term
    /// average LBD exceeds the long-term average LBD multiplied by this coefficient.
    ///
    /// Possible values: f64
    #[arg(
        long = "restart-lbd-coef",
        default_value_t = 1.25,
        verbatim_doc_comment
    )]
    restart_lbd_coef: f64,

    /// Used to determine if a restart should be blocked. A restart is blocked if the number of
    /// assigned variables is much greater than the average number of assigned variables in the
    /// recent past.
    ///
    /// Possible values: f64
    #[arg(
        long = "restart-num-assigned-coef",
        default_value_t = 1.4,
        verbatim_doc_comment
    )]
    restart_num_assigned_coef: f64,

    /// The number of conflicts over which the number of assigned variables is averaged when
    /// deciding on blocking restarts.
    ///
    /// Possible values: u64
    #[arg(
        long = "restart-num-assigned-window",
        default_value_t = 5000,
        verbatim_doc_comment
    )]
    restart_num_assigned_window: u64,

    /// The coefficient in the geometric sequence `x_i = x_{i-1} * "--restart-geometric-coef"`
    /// where `x_1 = "--restart-base-interval"`. Used only if "--restart-sequence-generator-type"
    /// is "geometric".
    ///
    /// Possible values: f64
    #[arg(
        long = "restart-geometric-coef",
        default_value_t = 1.5,
        verbatim_doc_comment
    )]
    restart_geometric_coef: f64,

    /// Determines that no restarts are allowed by the solver.
    ///
    /// Possible values: bool
    #[arg(long = "no-restarts", verbatim_doc_comment)]
    no_restarts: bool,

    /// The probability with which a decision is made on a random variable.
    ///
    /// Possible values: f64
    #[arg(
        long = "random-decision-frequency",
        default_value_t = 0.0,
        verbatim_doc_comment
    )]
    random_decision_frequency: f64,

    /// The time budget for the solver, given in milliseconds.
    ///
    /// Possible values: u64 (Optional)
    #[arg(short = 't', long = "time-limit", verbatim_doc_comment)]
    time_limit: Option<u64>,

    /// The random seed to use for the Pseudo Random Number Generator. In portfolio mode, instance
    /// `i` uses this seed plus `i`.
    ///
    /// Possible values: u64
    #[arg(
        short = 'r',
        long = "random-seed",
        default_value_t = 42,
        verbatim_doc_comment
    )]
    random_seed: u64,

    /// Enables log message output from the solver.
    ///
    /// Possible values: bool
    #[arg(short = 'v', long = "verbose", verbatim_doc_comment)]
    verbose: bool,

    /// Enables logging of statistics from the solver.
    ///
    /// Possible values: bool
    #[arg(short = 's', long = "log-statistics", verbatim_doc_comment)]
    log_statistics: bool,

    /// If `--verbose` is enabled then this option removes the timestamp information from the log
    /// messages.
    ///
    /// Possible values: bool
    #[arg(long = "omit-timestamp", verbatim_doc_comment)]
    omit_timestamp: bool,

    /// If `--verbose` is enabled then this option removes the call site information from the log
    /// messages. The call site is the file and line from which the message originated.
    ///
    /// Possible values: bool
    #[arg(long = "omit-call-site", default_value_t = false, verbatim_doc_comment)]
    omit_call_site: bool,
}

impl Args {
    fn solver_options(&self) -> SolverOptions {
        let restart_options = RestartOptions {
            sequence_generator_type: self.restart_sequence_generator_type,
            base_interval: self.restart_base_interval,
            min_num_conflicts_before_first_restart: if self.no_restarts {
                u64::MAX
            } else {
                self.restart_min_num_conflicts_before_first_restart
            },
            lbd_coef: self.restart_lbd_coef,
            num_assigned_coef: self.restart_num_assigned_coef,
            num_assigned_window: self.restart_num_assigned_window,
            geometric_coef: self.restart_geometric_coef,
        };
        let learning_options = LearningOptions {
            lbd_threshold: self.learning_lbd_threshold,
            limit_high_lbd_clauses: self.learning_max_num_high_lbd_clauses,
            sorting_strategy: self.learning_sorting_strategy,
            ..LearningOptions::default()
        };

        SolverOptions {
            restart_options,
            learning_options,
            elimination_options: EliminationOptions::default(),
            random_seed: self.random_seed,
            random_decision_frequency: self.random_decision_frequency,
            learned_clause_minimisation: !self.no_learning_clause_minimisation,
            clause_memory_limit: self.clause_memory_limit,
            ..SolverOptions::default()
        }
    }
}

fn configure_logging_sat(
    verbose: bool,
    log_statistics: bool,
    omit_timestamp: bool,
    omit_call_site: bool,
) -> std::io::Result<()> {
    if log_statistics {
        configure_statistic_logging("c stat:", None, None, None);
    }
    let level_filter = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };

    env_logger::Builder::new()
        .format(move |buf, record| {
            write!(buf, "c ")?;
            if record.level() != Level::Info && !omit_timestamp {
                write!(buf, "{} ", buf.timestamp())?;
            }
            write!(buf, "{} ", record.level())?;
            if record.level() != Level::Info && !omit_call_site {
                write!(
                    buf,
                    "[{}:{}] ",
                    record.file().unwrap_or("unknown"),
                    record.line().unwrap_or(0)
                )?;
            }
            writeln!(buf, "{}", record.args())
        })
        .filter_level(level_filter)
        .target(env_logger::Target::Stdout)
        .init();
    info!("Logging successfully configured");
    Ok(())
}

fn configure_logging_unknown() -> std::io::Result<()> {
    env_logger::Builder::new()
        .format(move |buf, record| writeln!(buf, "c {}", record.args()))
        .filter_level(LevelFilter::Trace)
        .target(env_logger::Target::Stdout)
        .init();
    Ok(())
}

fn main() {
    match run() {
        Ok(result) => std::process::exit(result.to_ipasir()),
        Err(e) => {
            error!("Execution failed, error: {e}");
            std::process::exit(1);
        }
    }
}

fn run() -> SolverResult<SolveResult> {
    let args = Args::parse();

    if args.instance_path.extension().and_then(|ext| ext.to_str()) != Some("cnf") {
        configure_logging_unknown()?;
        return Err(SolverError::invalid_instance(args.instance_path.display()));
    }

    configure_logging_sat(
        args.verbose,
        args.log_statistics,
        args.omit_timestamp,
        args.omit_call_site,
    )?;

    if INCSAT_ASSERT_LEVEL_DEFINITION >= INCSAT_ASSERT_MODERATE {
        warn!(
            "Potential performance degradation: the incsat assert level is set to {INCSAT_ASSERT_LEVEL_DEFINITION}, meaning many debug asserts are active which may result in performance degradation."
        );
    }

    let assumptions = args
        .assumptions
        .iter()
        .map(|&code| Literal::try_from(code))
        .collect::<Result<Vec<_>, _>>()?;

    let termination = Combinator::new(
        OsSignal::install()?,
        args.time_limit
            .map(|time_limit| TimeBudget::starting_now(Duration::from_millis(time_limit))),
    );

    let instance_file = File::open(&args.instance_path)?;
    if args.portfolio > 1 {
        let DimacsFormula {
            solver: mut portfolio,
            num_variables,
        } = parse_cnf::<DimacsFormula<Portfolio>>(
            instance_file,
            (args.portfolio, args.solver_options()),
        )?;
        info!(
            "read {num_variables} variables into {} instances",
            portfolio.len()
        );

        for index in 0..portfolio.len() {
            let instance = portfolio.instance(index);
            let mut instance = instance.borrow_mut();
            // The assumptions are only queued when the portfolio solves.
            for assumption in &assumptions {
                instance.freeze(assumption.variable())?;
            }
            simplify(&mut instance, args.simplify_rounds)?;
            for assumption in &assumptions {
                instance.melt(assumption.variable())?;
            }
        }
        for &assumption in &assumptions {
            portfolio.assume(assumption);
        }
        if args.conflict_limit.is_some() || args.decision_limit.is_some() {
            warn!("conflict and decision limits are ignored in portfolio mode");
        }

        portfolio.connect(args.exchange_max_length);
        let result = portfolio.solve(Duration::from_millis(args.time_slice), termination)?;

        match portfolio.winner().map(|index| portfolio.instance(index)) {
            Some(instance) => report(&instance.borrow(), result, num_variables, &assumptions)?,
            None => println!("s UNKNOWN"),
        }

        if args.log_statistics {
            portfolio.log_statistics();
        }

        Ok(result)
    } else {
        let DimacsFormula {
            solver: mut instance,
            num_variables,
        } = parse_cnf::<DimacsFormula<SolverInstance>>(instance_file, args.solver_options())?;
        info!(
            "read {num_variables} variables and {} clauses",
            instance.irredundant_clauses()
        );

        for &assumption in &assumptions {
            instance.assume(assumption)?;
        }
        simplify(&mut instance, args.simplify_rounds)?;
        if let Some(conflicts) = args.conflict_limit {
            instance.limit(SearchLimit::Conflicts(conflicts));
        }
        if let Some(decisions) = args.decision_limit {
            instance.limit(SearchLimit::Decisions(decisions));
        }
        instance.set_termination(termination);

        let result = instance.solve()?;
        report(&instance, result, num_variables, &assumptions)?;

        if args.log_statistics {
            instance.log_statistics();
        }

        Ok(result)
    }
}

/// Runs the requested elimination rounds; queued assumptions are not eliminated.
fn simplify(instance: &mut SolverInstance, simplify_rounds: u32) -> SolverResult<()> {
    if simplify_rounds > 0 {
        let verdict = instance.simplify(simplify_rounds)?;
        info!(
            "simplification: {verdict}, {} active variables remain",
            instance.active_variables()
        );
    }

    Ok(())
}

/// Prints the verdict in the SAT competition output format.
fn report(
    instance: &SolverInstance,
    result: SolveResult,
    num_variables: usize,
    assumptions: &[Literal],
) -> SolverResult<()> {
    println!("s {result}");

    match result {
        SolveResult::Satisfiable => {
            println!("v {}", stringify_solution(instance, num_variables)?);
        }
        SolveResult::Unsatisfiable if !assumptions.is_empty() => {
            let mut failed = Vec::new();
            for &assumption in assumptions {
                if instance.failed(assumption)? && !failed.contains(&assumption) {
                    failed.push(assumption);
                }
            }
            println!(
                "c failed: {}",
                failed
                    .iter()
                    .map(|literal| literal.to_string())
                    .collect::<Vec<_>>()
                    .join(" ")
            );
        }
        _ => {}
    }

    Ok(())
}

fn stringify_solution(instance: &SolverInstance, num_variables: usize) -> SolverResult<String> {
    let num_known = instance
        .max_variable()
        .map_or(0, |variable| variable.to_dimacs() as usize);

    let mut solution = String::new();
    for index in 1..=num_variables.max(num_known) {
        // Variables which occur in no clause can take either value.
        let is_true = index > num_known || instance.value(Literal::try_from(index as i32)?)?;
        solution.push_str(&format!("{}{index} ", if is_true { "" } else { "-" }));
    }
    solution.push('0');

    Ok(solution)
}
