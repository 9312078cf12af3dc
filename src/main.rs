//! CLI entry point: Markdown in on stdin, HTML out on stdout.
//!
//! This binary is the harness-facing shell around the library; the
//! interesting work all happens in [`marktree::parse_document`] and
//! [`marktree::format_document`].

use std::io::{self, Read, Write};
use std::process::ExitCode;

use clap::Parser as ClapParser;
use typed_arena::Arena;

use marktree::{format_document, parse_document, Options};

/// Convert CommonMark input to HTML.
#[derive(ClapParser, Debug)]
#[command(name = "marktree", version, about)]
struct Cli {
    /// Treat soft line breaks as hard line breaks.
    #[arg(long)]
    hardbreaks: bool,

    /// Allow raw HTML and otherwise-dangerous link destinations through
    /// verbatim instead of escaping/stripping them.
    #[arg(long = "unsafe")]
    unsafe_: bool,

    /// Use `<pre lang="LANG">` instead of `<code class="language-LANG">`
    /// for fenced code blocks with an info string.
    #[arg(long = "github-pre-lang")]
    github_pre_lang: bool,

    /// Suppress the diagnostic written to stderr on an I/O failure.
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut source = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut source) {
        if !cli.quiet {
            eprintln!("marktree: failed to read stdin: {}", e);
        }
        return ExitCode::FAILURE;
    }

    let options = Options {
        hardbreaks: cli.hardbreaks,
        unsafe_: cli.unsafe_,
        github_pre_lang: cli.github_pre_lang,
    };

    let arena = Arena::new();
    let root = parse_document(&arena, &source, &options);

    let mut output = String::new();
    if format_document(root, &options, &mut output).is_err() {
        if !cli.quiet {
            eprintln!("marktree: internal error: renderer produced invalid UTF-8");
        }
        return ExitCode::FAILURE;
    }

    if let Err(e) = io::stdout().write_all(output.as_bytes()) {
        if !cli.quiet {
            eprintln!("marktree: failed to write stdout: {}", e);
        }
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
