/// Preview — generate phrases from a template against a RON lexicon.
///
/// Usage: preview --lexicon <path> [--seed <n>] [--count <n>] <template>

use std::process;

use syntagma::core::generator::Engine;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        print_usage();
        return;
    }

    let mut lexicon_path = None;
    let mut seed: u64 = 42;
    let mut count: usize = 1;
    let mut template = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--lexicon" if i + 1 < args.len() => {
                i += 1;
                lexicon_path = Some(args[i].clone());
            }
            "--seed" if i + 1 < args.len() => {
                i += 1;
                seed = args[i].parse().unwrap_or(42);
            }
            "--count" if i + 1 < args.len() => {
                i += 1;
                count = args[i].parse().unwrap_or(1);
            }
            other if !other.starts_with("--") => {
                template = Some(args[i].clone());
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_usage();
                process::exit(1);
            }
        }
        i += 1;
    }

    let Some(lexicon_path) = lexicon_path else {
        eprintln!("ERROR: --lexicon is required");
        print_usage();
        process::exit(1);
    };
    let Some(template) = template else {
        eprintln!("ERROR: no template given");
        print_usage();
        process::exit(1);
    };

    let mut engine = match Engine::builder()
        .lexicon_path(&lexicon_path)
        .seed(seed)
        .build()
    {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("ERROR: failed to load lexicon: {}", e);
            process::exit(1);
        }
    };

    for _ in 0..count {
        match engine.generate(&template) {
            Ok(generation) => {
                println!("> {}", generation.phrase());
                for word in &generation.words {
                    println!(
                        "  {:<12} {:<14} [{}]  {}",
                        word.pos.token(),
                        word.forms.first().map(String::as_str).unwrap_or("?"),
                        word.features,
                        word.translations.join(", ")
                    );
                }
                for warning in &generation.warnings {
                    println!("  WARNING: {}", warning);
                }
            }
            Err(e) => {
                eprintln!("ERROR: {}", e);
                process::exit(1);
            }
        }
    }
}

fn print_usage() {
    println!("Usage: preview --lexicon <path> [--seed <n>] [--count <n>] <template>");
    println!();
    println!("Examples:");
    println!("  preview --lexicon tests/fixtures/lexicon.ron \\");
    println!("      '(article noun)@{{nominative:masculine:singular}}'");
    println!("  preview --lexicon tests/fixtures/lexicon.ron --count 5 \\");
    println!("      '(article noun)@{{nominative:*gender*:singular}} (adjective)@$1'");
}
