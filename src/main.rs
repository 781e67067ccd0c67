//! Interactive FAT32 image explorer.
//!
//! A prompt loop over one [`Session`]: open an image, walk its directories,
//! inspect entries and copy file content out. All filesystem failures reach
//! this layer as typed errors and are reported here; the library itself
//! never prints.

use fat_explorer::commands::Command;
use fat_explorer::session::Session;
use log::{error, warn};
use std::fs::File;
use std::io::{self, Write};

fn main() {
    stderrlog::new().module(module_path!()).init().unwrap();

    let mut session = Session::new();

    loop {
        print!("fat> ");
        io::stdout().flush().unwrap();

        let mut line = String::new();
        let read = io::stdin()
            .read_line(&mut line)
            .expect("Failed to read command");
        if read == 0 {
            // End of input behaves like `quit`.
            break;
        }

        match Command::from_string(&line) {
            Command::Open(path) => match session.open(&path) {
                Ok(()) => println!("Opened {path}."),
                Err(err) => error!("{err}"),
            },
            Command::Close => {
                if let Err(err) = session.close() {
                    error!("{err}");
                }
            }
            Command::Info => match session.geometry() {
                Ok(geometry) => print!("{geometry}"),
                Err(err) => error!("{err}"),
            },
            Command::Ls => match session.list() {
                Ok(entries) => {
                    for (name, _) in entries {
                        println!("{name}");
                    }
                }
                Err(err) => error!("{err}"),
            },
            Command::Stat(name) => match session.stat(&name) {
                Ok(stat) => {
                    println!("{:<10} {:>10} {:>14}", "Attribute", "Size", "First Cluster");
                    println!(
                        "{:<10} {:>10} {:>14}",
                        format!("0x{:02X}", stat.attribute),
                        stat.size,
                        stat.first_cluster
                    );
                }
                Err(err) => error!("{err}"),
            },
            Command::Cd(name) => {
                if let Err(err) = session.change_directory(&name) {
                    error!("{err}");
                }
            }
            Command::Get(name) => retrieve_to_working_dir(&mut session, &name),
            Command::Del(name) => match session.delete(&name) {
                Ok(()) => warn!("Deleted `{name}` from the in-memory view only."),
                Err(err) => error!("{err}"),
            },
            Command::Undel(name) => {
                if let Err(err) = session.undelete(&name) {
                    error!("{err}");
                }
            }
            Command::Read {
                name,
                offset,
                length,
            } => match session.read_range(&name, offset, length) {
                Ok(bytes) => {
                    let rendered: Vec<String> =
                        bytes.iter().map(|byte| byte.to_string()).collect();
                    println!("{}", rendered.join(" "));
                }
                Err(err) => error!("{err}"),
            },
            Command::Quit => break,
            Command::Unknown(s) => error!("Unknown command: {s:?}"),
            Command::Invalid(s) => error!("{s}"),
            Command::Empty => {}
        }
    }
}

/// Copies the named file out of the image into a file of the same name in
/// the process working directory.
fn retrieve_to_working_dir(session: &mut Session, name: &str) {
    let mut output = match File::create(name) {
        Ok(file) => file,
        Err(err) => {
            error!("Failed to create output file `{name}`: {err}");
            return;
        }
    };

    match session.retrieve(name, &mut output) {
        Ok(written) => println!("Retrieved {written} bytes into {name}."),
        Err(err) => error!("{err}"),
    }
}
