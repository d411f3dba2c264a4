#[macro_use]
extern crate clap;
#[macro_use]
extern crate log;

use landmarks::dom::{build_dom, print_dom};
use landmarks::{LandmarksFinder, ScanOptions};
use std::fs::File;
use std::process;

enum DumpKind {
    Landmarks { json: bool },
    Dom,
}

fn run(input: &str, kind: DumpKind, options: ScanOptions) -> landmarks::Result<()> {
    let mut file = File::open(input)?;
    let document = build_dom(&mut file)?;

    match kind {
        DumpKind::Dom => print_dom(&document)?,
        DumpKind::Landmarks { json } => {
            let mut finder = LandmarksFinder::new(document, options);
            finder.scan();
            info!("Found {} landmarks in {}", finder.number_of_landmarks(), input);
            if json {
                println!("{}", finder.tree_json()?);
            } else {
                finder.print()?;
            }
        },
    }
    Ok(())
}

fn main() {
    use clap::{AppSettings, SubCommand};

    env_logger::init();

    let args = app_from_crate!()
        .subcommand(
            SubCommand::with_name("landmarks")
                .about("Dumps the landmarks of an HTML document")
                .arg_from_usage("<input>  'The document to find landmarks in'")
                .arg_from_usage("--heuristics  'Guess main and navigation landmarks if missing'")
                .arg_from_usage("--developer-mode  'Attach lint warnings'")
                .arg_from_usage("--json  'Print the landmark tree as JSON'"),
        )
        .subcommand(
            SubCommand::with_name("dom")
                .about("Dumps a DOM tree from an HTML document")
                .arg_from_usage("<input>  'The document to build the tree for'"),
        )
        .setting(AppSettings::ArgRequiredElseHelp)
        .get_matches();

    let (sub_args, kind) = if let Some(args) = args.subcommand_matches("landmarks") {
        let json = args.is_present("json");
        (args, DumpKind::Landmarks { json })
    } else if let Some(args) = args.subcommand_matches("dom") {
        (args, DumpKind::Dom)
    } else {
        eprintln!("Unknown subcommand, {:?}", args);
        process::exit(2);
    };

    // Both subcommands require it.
    let input = sub_args.value_of("input").unwrap_or_default();
    let options = ScanOptions {
        heuristics: sub_args.is_present("heuristics"),
        developer_mode: sub_args.is_present("developer-mode"),
    };

    if let Err(e) = run(input, kind, options) {
        eprintln!("{}: {}", input, e);
        process::exit(1);
    }
}
