use clap::{Parser, Subcommand};
use colored::Colorize;
use regtree::ast::{Ast, NodeId, NodeKind};
use regtree::{
    CompatOptions, OptimizeOptions, ParseOptions, compat_transpile_with, generate, optimize_with,
    parse_with, to_dfa, to_regexp,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "regtree")]
#[command(about = "Regtree - parse, optimize, transpile and interpret regular expressions")]
#[command(version)]
struct Cli {
    /// Log what the toolkit is doing (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the AST of a /pattern/flags literal
    Parse {
        /// The regex literal
        regexp: String,
        /// Show the source range of every node
        #[arg(short, long)]
        locations: bool,
    },
    /// Parse and regenerate a regex literal
    Generate {
        /// The regex literal
        regexp: String,
    },
    /// Optimize a regex literal
    Optimize {
        /// Only run these rules
        #[arg(short, long, value_delimiter = ',')]
        whitelist: Vec<String>,
        /// Never run these rules
        #[arg(short, long, value_delimiter = ',')]
        blacklist: Vec<String>,
        /// The regex literal
        regexp: String,
    },
    /// Rewrite newer syntax for older engines
    Compat {
        /// Only apply these transforms
        #[arg(short, long, value_delimiter = ',')]
        transforms: Vec<String>,
        /// The regex literal
        regexp: String,
    },
    /// Check whether the whole input matches, using the minimized DFA
    Test {
        /// The regex literal
        regexp: String,
        /// The input string to test
        input: String,
    },
    /// Print the DFA transition tables
    Dfa {
        /// The regex literal
        regexp: String,
        /// Print the table before minimization too
        #[arg(short, long)]
        original: bool,
    },
    /// Run the regex with the native engine and show the first match
    Exec {
        /// The regex literal
        regexp: String,
        /// The input string
        input: String,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Parse { regexp, locations } => cmd_parse(&regexp, locations),
        Commands::Generate { regexp } => cmd_generate(&regexp),
        Commands::Optimize {
            whitelist,
            blacklist,
            regexp,
        } => cmd_optimize(&regexp, whitelist, blacklist),
        Commands::Compat { transforms, regexp } => cmd_compat(&regexp, transforms),
        Commands::Test { regexp, input } => cmd_test(&regexp, &input),
        Commands::Dfa { regexp, original } => cmd_dfa(&regexp, original),
        Commands::Exec { regexp, input } => cmd_exec(&regexp, &input),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "regtree=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn fail(e: impl std::fmt::Display) -> ! {
    eprintln!("{} {}", "Error:".red().bold(), e);
    std::process::exit(1);
}

fn cmd_parse(regexp: &str, locations: bool) {
    let options = ParseOptions {
        capture_locations: locations,
        ..ParseOptions::default()
    };
    let ast = parse_with(regexp, &options).unwrap_or_else(|e| fail(e));
    print_node(&ast, ast.root(), 0, locations);
}

fn describe(ast: &Ast, id: NodeId) -> String {
    match ast.kind(id) {
        NodeKind::RegExp { flags, .. } => format!("flags={:?}", flags.as_str()),
        NodeKind::Assertion { kind, negative, .. } => format!("{:?} negative={}", kind, negative),
        NodeKind::Char(c) => match c.code_point {
            Some(code_point) => format!("{:?} {} U+{:04X}", c.kind, c.value, code_point),
            None => format!("{:?} {}", c.kind, c.value),
        },
        NodeKind::CharacterClass { negative, .. } => format!("negative={}", negative),
        NodeKind::ClassRange { from, to } => format!("{}-{}", from.value, to.value),
        NodeKind::Backreference(reference) => {
            format!("{:?} {} -> {}", reference.kind, reference.reference, reference.number)
        }
        NodeKind::Group(group) => match (&group.name, group.number) {
            (Some(name), Some(number)) => format!("capturing #{} <{}>", number, name),
            (None, Some(number)) => format!("capturing #{}", number),
            _ => "non-capturing".to_string(),
        },
        NodeKind::Repetition { quantifier, .. } => format!("{}", quantifier),
        NodeKind::UnicodeProperty(property) => format!(
            "{}={} negative={}",
            property.canonical_name, property.canonical_value, property.negative
        ),
        NodeKind::Disjunction { .. } | NodeKind::Alternative { .. } => String::new(),
    }
}

fn print_node(ast: &Ast, id: NodeId, depth: usize, locations: bool) {
    let node = ast.node(id);
    let mut line = format!(
        "{}{} {}",
        "  ".repeat(depth),
        node.kind.type_name().cyan(),
        describe(ast, id)
    );
    if locations && let Some(loc) = &node.loc {
        line.push_str(&format!(
            " {}",
            format!("@{}..{} {:?}", loc.start.offset, loc.end.offset, loc.source).dimmed()
        ));
    }
    println!("{}", line.trim_end());

    if let NodeKind::Disjunction { left, right } = &node.kind {
        for side in [left, right] {
            match side {
                Some(child) => print_node(ast, *child, depth + 1, locations),
                None => println!("{}{}", "  ".repeat(depth + 1), "(empty)".dimmed()),
            }
        }
        return;
    }
    for child in ast.children(id) {
        print_node(ast, child, depth + 1, locations);
    }
}

fn cmd_generate(regexp: &str) {
    let ast = parse_with(regexp, &ParseOptions::default()).unwrap_or_else(|e| fail(e));
    println!("{}", generate(&ast).green());
}

fn cmd_optimize(regexp: &str, whitelist: Vec<String>, blacklist: Vec<String>) {
    let options = OptimizeOptions {
        whitelist,
        blacklist,
    };
    let result = optimize_with(regexp, &options).unwrap_or_else(|e| fail(e));
    let optimized = result.to_string();

    println!("{}", "Optimizing pattern...".bold());
    println!("  Input:  {}", regexp.cyan());
    println!("  Output: {}", optimized.green());
    let saved = regexp.chars().count().saturating_sub(optimized.chars().count());
    if saved > 0 {
        println!("  Saved:  {} char(s)", saved);
    }
}

fn cmd_compat(regexp: &str, transforms: Vec<String>) {
    let options = CompatOptions {
        whitelist: transforms,
    };
    let result = compat_transpile_with(regexp, &options).unwrap_or_else(|e| fail(e));
    println!("{}", result.to_string().green());

    if let Some(groups) = result.extra()
        && !groups.is_empty()
    {
        println!();
        println!("{}", "Named groups:".bold());
        for (name, number) in groups {
            println!("  {} -> {}", name.cyan(), number);
        }
    }
}

fn cmd_test(regexp: &str, input: &str) {
    match regtree::test(regexp, input) {
        Ok(true) => println!("{}", "✓ Match".green().bold()),
        Ok(false) => {
            println!("{}", "✗ No match".red());
            std::process::exit(1);
        }
        Err(e) => fail(e),
    }
}

fn print_table(table: &regtree::fa::TransitionTable, accepting: &std::collections::BTreeSet<usize>) {
    for (state, row) in table {
        let marker = if accepting.contains(state) { "*" } else { " " };
        let transitions: Vec<String> = row
            .iter()
            .map(|(symbol, target)| format!("{:?} -> {}", symbol, target))
            .collect();
        println!("  {}{:>3}: {}", marker.green(), state, transitions.join(", "));
    }
}

fn cmd_dfa(regexp: &str, original: bool) {
    let dfa = to_dfa(regexp).unwrap_or_else(|e| fail(e));
    if original {
        println!("{}", "Subset construction:".bold());
        for state in dfa.original_transition_table() {
            let marker = if state.accepting { "*" } else { " " };
            let transitions: Vec<String> = state
                .transitions
                .iter()
                .map(|(symbol, key)| format!("{:?} -> {{{}}}", symbol, key))
                .collect();
            println!(
                "  {}{:>3} {{{}}}: {}",
                marker.green(),
                state.number,
                state.key,
                transitions.join(", ")
            );
        }
        println!();
        println!("{}", "DFA:".bold());
        print_table(dfa.transition_table(), dfa.accepting_state_numbers());
        println!();
    }

    let minimized = dfa.minimize();
    println!(
        "{} ({} states, * = accepting)",
        "Minimized DFA:".bold(),
        minimized.state_count()
    );
    print_table(minimized.transition_table(), minimized.accepting_state_numbers());
}

fn cmd_exec(regexp: &str, input: &str) {
    let regex = to_regexp(regexp).unwrap_or_else(|e| fail(e));

    let Some(found) = regex.exec(input) else {
        println!("{}", "✗ No match".red());
        std::process::exit(1);
    };

    println!("{}", "✓ Match found!".green().bold());
    println!("  Index: {}", found.index);
    for (number, group) in found.groups.iter().enumerate() {
        match group {
            Some(text) => println!("  Group {}: {}", number, text.green()),
            None => println!("  Group {}: {}", number, "undefined".dimmed()),
        }
    }
    for (name, group) in &found.named {
        match group {
            Some(text) => println!("  <{}>: {}", name.cyan(), text.green()),
            None => println!("  <{}>: {}", name.cyan(), "undefined".dimmed()),
        }
    }
}
