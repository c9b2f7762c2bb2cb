use clap::{Parser as ClapParser, Subcommand};
use rcalc::Evaluator;
use rcalc::cli::{self, CalcOptions, CalcResult, CliError};
use std::io::{self, Read};

#[derive(ClapParser)]
#[command(name = "rcalc")]
#[command(about = "rcalc - evaluate lisp-like calculator expressions against array inputs")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate an expression using JSON inputs
    ///
    /// (read i) is the i-th input, (read i j) its j-th band, and
    /// (take foo j) the j-th band of the input named foo.
    Calc {
        /// The expression, e.g. "(+ 2 (* 0.95 (read 1)))"
        expression: String,

        /// JSON inputs, bound as _i1, _i2, ... (reads stdin if none given)
        inputs: Vec<String>,

        /// Named input as NAME=JSON, e.g. a=[[1,2],[3,4]]
        #[arg(long = "name")]
        names: Vec<String>,

        /// Cast the result to a data type (uint8, int16, float32, ...)
        #[arg(long)]
        dtype: Option<String>,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,

        /// Only validate syntax, don't evaluate
        #[arg(long)]
        syntax_only: bool,

        /// Maximum parenthesis nesting
        #[arg(long)]
        max_depth: Option<usize>,
    },

    /// List operators and functions
    Functions,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Calc {
            expression,
            inputs,
            names,
            dtype,
            pretty,
            syntax_only,
            max_depth,
        } => run_calc(
            CalcOptions {
                expression,
                inputs,
                names,
                dtype,
                syntax_only,
                max_depth,
            },
            pretty,
        ),
        Commands::Functions => {
            print!("{}", cli::functions_overview(&Evaluator::with_builtins()));
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn run_calc(mut options: CalcOptions, pretty: bool) -> Result<(), CliError> {
    if options.inputs.is_empty() && !atty::is(atty::Stream::Stdin) {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        if !buffer.trim().is_empty() {
            options.inputs.push(buffer);
        }
    }

    match cli::execute_calc(&options)? {
        CalcResult::SyntaxValid => println!("Syntax is valid"),
        CalcResult::Success(output) => {
            let json = if pretty {
                serde_json::to_string_pretty(&output)
            } else {
                serde_json::to_string(&output)
            }?;
            println!("{}", json);
        }
    }
    Ok(())
}
