mod parser;

use mesh25d::{build_mesh, io, Result};
use parser::Args;

use clap::Parser;
use env_logger::{Builder, Target};
use log::{error, info, LevelFilter};
use std::{fs::File, io::Write, process::ExitCode, time::Instant};

fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = init_logger(&args) {
        eprintln!(
            "Could not create log file {}: {}",
            args.log_file.to_string_lossy(),
            e
        );
        return ExitCode::FAILURE;
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            if !args.verbose {
                eprintln!("Error: {}", e);
            }
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let now = Instant::now();
    args.validate()?;
    let params = args.mesh_params();

    let cloud = io::read_point_cloud(&args.input_file)?;
    let output = build_mesh(&cloud, &params)?;
    io::write_outputs(&output, &args.output_file, args.dsm_file.as_deref())?;

    info!("Done in {:.2} s", now.elapsed().as_secs_f64());
    Ok(())
}

fn init_logger(args: &Args) -> std::io::Result<()> {
    let file = File::create(&args.log_file)?;

    Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .target(Target::Pipe(Box::new(LogSink {
            file,
            echo: args.verbose,
        })))
        .init();
    Ok(())
}

/// Writes log records to the log file and echoes them to stderr when verbose
struct LogSink {
    file: File,
    echo: bool,
}

impl Write for LogSink {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        if self.echo {
            std::io::stderr().write_all(buf)?;
        }
        self.file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.file.flush()
    }
}
