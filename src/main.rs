//! Interactive front end for the buddy allocation simulator.
//!
//! Reads menu selections from stdin, drives a [`BuddyAllocator`], and prints
//! the resulting memory state. All allocation semantics live in the library;
//! this binary only parses input and formats output.

use std::env;
use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use buddy_sim::BuddyAllocator;
use tracing::Level;

const DEFAULT_REGION_SIZE: usize = 1024;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_max_level(Level::TRACE)
        .init();

    let total_size = match env::args().nth(1) {
        Some(arg) => match arg.parse() {
            Ok(n) => n,
            Err(_) => {
                eprintln!("usage: buddy_sim [region-size-in-kb]");
                return ExitCode::FAILURE;
            }
        },
        None => DEFAULT_REGION_SIZE,
    };

    let sim = match BuddyAllocator::try_new(total_size) {
        Ok(sim) => sim,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };

    match run(sim) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(mut sim: BuddyAllocator) -> io::Result<()> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        println!();
        println!("Menu:");
        println!("1. Allocate Memory");
        println!("2. Deallocate Memory");
        println!("3. Display Memory State");
        println!("4. Exit");

        let Some(choice) = read_line(&mut lines, "Enter your choice: ")? else {
            break;
        };

        match choice.trim().parse::<u32>() {
            Ok(1) => {
                let Some(line) =
                    read_line(&mut lines, "Enter memory size to allocate (in KB): ")?
                else {
                    break;
                };

                let Ok(size) = line.trim().parse::<usize>() else {
                    println!("Invalid number. Please try again.");
                    continue;
                };

                match sim.allocate(size) {
                    Ok(addr) => {
                        println!("Allocated {size} KB at address: {addr}");
                        display(&sim);
                    }
                    Err(err) => println!("Allocation failed: {err}"),
                }
            }

            Ok(2) => {
                let Some(line) =
                    read_line(&mut lines, "Enter starting address to deallocate (Memory Address): ")?
                else {
                    break;
                };

                let Ok(addr) = line.trim().parse::<usize>() else {
                    println!("Invalid number. Please try again.");
                    continue;
                };

                match sim.deallocate(addr) {
                    Ok(()) => {
                        println!("Deallocated block at address: {addr}");
                        display(&sim);
                    }
                    Err(err) => println!("Deallocation failed: {err}"),
                }
            }

            Ok(3) => display(&sim),

            Ok(4) => {
                println!("Exiting...");
                break;
            }

            _ => println!("Invalid choice. Please try again."),
        }
    }

    Ok(())
}

/// Prompts and reads one line, returning `None` at end of input.
fn read_line<B: BufRead>(lines: &mut io::Lines<B>, prompt: &str) -> io::Result<Option<String>> {
    print!("{prompt}");
    io::stdout().flush()?;

    match lines.next() {
        Some(line) => Ok(Some(line?)),
        None => Ok(None),
    }
}

fn display(sim: &BuddyAllocator) {
    println!("Memory State:");

    for block in sim.blocks() {
        if block.is_free() {
            println!("Block: {} KB | Free", block.size());
        } else {
            println!(
                "Block: {} KB | Allocated | Internal Fragmentation: {} KB | Address: {}",
                block.size(),
                block.fragmentation(),
                block.start()
            );
        }
    }
}
