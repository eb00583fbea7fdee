use std::env;
use std::fs::File;
use std::io::{self, Write};

use ustar_light::{Archive, Error, Result};

const CHUNK_SIZE: usize = 64 * 1024;

fn main() {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 3 {
        print_usage();
        std::process::exit(1);
    }

    let command = &args[1];
    let tarfile = &args[2];
    let mut out = io::stdout().lock();

    let result = match (command.as_str(), args.get(3)) {
        ("check", _) => check(tarfile, &mut out),
        ("ls", dir) => ls(tarfile, dir.map_or("", String::as_str), &mut out),
        ("cat", Some(path)) => cat(tarfile, path, &mut out),
        ("stat", Some(path)) => stat(tarfile, path, &mut out),
        ("cat" | "stat", None) => {
            eprintln!("Error: {command} requires a path inside the archive");
            print_usage();
            std::process::exit(1);
        }
        _ => {
            eprintln!("Error: Unknown command '{}'", command);
            print_usage();
            std::process::exit(1);
        }
    };

    if let Err(e) = result.and_then(|()| Ok(out.flush()?)) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn open(tarfile: &str) -> Result<Archive<File>> {
    Archive::new(File::open(tarfile)?)
}

fn check(tarfile: &str, out: &mut impl Write) -> Result<()> {
    let count = open(tarfile)?.check_archive()?;
    writeln!(out, "{tarfile}: valid, {count} header(s)")?;
    Ok(())
}

fn ls(tarfile: &str, dir: &str, out: &mut impl Write) -> Result<()> {
    let mut archive = open(tarfile)?;
    for child in archive.list(dir)? {
        writeln!(out, "{child}")?;
    }
    Ok(())
}

fn cat(tarfile: &str, path: &str, out: &mut impl Write) -> Result<()> {
    let mut archive = open(tarfile)?;
    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut offset = 0;
    loop {
        let read = archive.read_file_into(path, offset, &mut buf)?;
        out.write_all(&buf[..read.copied])?;
        offset += read.copied as u64;
        if read.is_complete() {
            break;
        }
    }
    Ok(())
}

fn stat(tarfile: &str, path: &str, out: &mut impl Write) -> Result<()> {
    let mut archive = open(tarfile)?;
    let Some(header) = archive.find(path)? else {
        return Err(Error::NotFound(path.to_string()));
    };
    writeln!(out, "{:>10}  {}", "Name", header.name)?;
    writeln!(out, "{:>10}  {:?}", "Kind", header.kind())?;
    writeln!(out, "{:>10}  {}", "Size", header.size)?;
    writeln!(out, "{:>10}  {:o}", "Mode", header.mode)?;
    writeln!(out, "{:>10}  {}/{}", "Owner", header.uname, header.gname)?;
    if let Some(modified) = header.modified() {
        writeln!(out, "{:>10}  {}", "Modified", modified.to_rfc3339())?;
    }
    if header.kind().is_link() {
        writeln!(out, "{:>10}  {}", "Target", header.linkname)?;
        if let Some(resolved) = archive.resolve(path)? {
            writeln!(
                out,
                "{:>10}  {} ({:?})",
                "Resolves",
                resolved.name,
                resolved.kind()
            )?;
        }
    }
    Ok(())
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  check <tarfile>       - Validate every header");
    eprintln!("  ls <tarfile> [dir]    - List a directory");
    eprintln!("  cat <tarfile> <path>  - Print a file");
    eprintln!("  stat <tarfile> <path> - Show an entry");
}
