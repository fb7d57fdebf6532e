use std::{
    fs, io,
    path::{Path, PathBuf},
    process::ExitCode,
};

use asm14::{output, Compilation, Error};
use clap::Parser;
use color_print::cprintln;
use tracing::Level;

const HELP_TEMPLATE: &str = "\
{before-help}{bin} {version}
  {author}
  {about}

{usage-heading}
{tab}{usage}

{all-args}{after-help}";

#[derive(Debug, clap::Parser)]
#[clap(author, version, about, help_template = HELP_TEMPLATE)]
struct Args {
    /// Source names, without the `.as` extension
    #[clap(required = true)]
    input: Vec<String>,

    /// Directory for the generated files (default: next to each source)
    #[clap(short, long)]
    out_dir: Option<PathBuf>,

    /// Dump the encoded object
    #[clap(short, long)]
    dump: bool,

    /// Trace each stage on stderr
    #[clap(short, long)]
    verbose: bool,
}

impl Args {
    /// `<dir>/<name>.<ext>`
    fn out_path(&self, name: &str, ext: &str) -> PathBuf {
        let file = format!("{}.{}", name, ext);
        match &self.out_dir {
            Some(dir) => {
                let base = Path::new(&file).file_name().map(PathBuf::from);
                dir.join(base.unwrap_or_else(|| PathBuf::from(&file)))
            }
            None => PathBuf::from(file),
        }
    }
}

fn write(path: &Path, text: &str) -> Result<(), Error> {
    fs::write(path, text).map_err(|e| Error::FileCreate(path.display().to_string(), e))?;
    println!("  > {}", path.display());
    Ok(())
}

/// Assembles `<name>.as`. Returns whether the object was written.
fn assemble(args: &Args, name: &str) -> Result<bool, Error> {
    let path = format!("{}.as", name);
    println!("  < {}", path);
    let src = fs::read_to_string(&path).map_err(|e| Error::FileOpen(path.clone(), e))?;

    let Compilation {
        expanded,
        counters,
        symbols,
        output,
        report,
    } = asm14::compile(&src);
    report.print(&path, &src);
    tracing::debug!(%name, ic = counters.ic, dc = counters.dc, "compiled");

    if let Some(expanded) = &expanded {
        write(&args.out_path(name, "am"), &expanded.text())?;
    }
    let Some(output) = output else {
        cprintln!(
            "<red,bold>compilation failed</>: {} ({} errors, {} warnings)",
            path,
            report.errors().count(),
            report.warnings().count()
        );
        return Ok(false);
    };

    write(&args.out_path(name, "ob"), &output.object_text())?;
    if let Some(text) = output.entries_text() {
        write(&args.out_path(name, "ent"), &text)?;
    }
    if let Some(text) = output.externs_text() {
        write(&args.out_path(name, "ext"), &text)?;
    }
    if args.dump {
        output::print_dump(name, &output, &symbols);
    }
    cprintln!(
        "<green,bold>compilation succeeded</>: {} ({} warnings)",
        path,
        report.warnings().count()
    );
    Ok(true)
}

fn main() -> ExitCode {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::WARN })
        .with_writer(io::stderr)
        .init();
    println!("asm14: two-pass assembler for the 14-bit CPU");

    let mut ok = true;
    for (idx, name) in args.input.iter().enumerate() {
        println!("{}. {}", idx + 1, name);
        match assemble(&args, name) {
            Ok(done) => ok &= done,
            Err(err) => {
                match std::error::Error::source(&err) {
                    Some(cause) => cprintln!("<red,bold>error</>: {} ({})", err, cause),
                    None => cprintln!("<red,bold>error</>: {}", err),
                }
                ok = false;
            }
        }
    }

    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
