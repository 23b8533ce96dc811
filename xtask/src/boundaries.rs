//! Boundary walk
//!
//! This module provides the `boundaries` subcommand. It pushes `0..upto`
//! onto an empty vector, and whenever the trie changes shape (root created
//! or depth grown) it checks every index of the versions on both sides of
//! the transition.

use anyhow::{Result, ensure};
use clap::Args;
use radix_vector::persistent::PersistentVector;

/// Arguments for the boundaries subcommand
#[derive(Args, Debug)]
pub struct BoundariesArgs {
    /// Number of sequential values to push
    #[arg(long, default_value_t = 32 + 32 * 32 + 1)]
    pub upto: usize,
}

/// A change of trie shape observed while pushing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Transition {
    /// Length of the vector after the push that caused the change
    length: usize,
    depth_before: usize,
    depth_after: usize,
}

fn check_sequential(vector: &PersistentVector<usize>) -> Result<()> {
    for index in 0..vector.len() {
        let value = vector.get(index)?;
        ensure!(*value == index, "index {index} holds {value}");
    }
    ensure!(
        vector.get(vector.len()).is_err(),
        "index {} should be out of bounds",
        vector.len()
    );
    Ok(())
}

/// Pushes `0..upto` and returns every transition, verifying both sides of each.
fn walk(upto: usize) -> Result<Vec<Transition>> {
    let mut transitions = Vec::new();
    let mut vector = PersistentVector::new();

    for value in 0..upto {
        let next = vector.push_back(value);

        if next.depth() != vector.depth() {
            check_sequential(&vector)?;
            check_sequential(&next)?;

            let transition = Transition {
                length: next.len(),
                depth_before: vector.depth(),
                depth_after: next.depth(),
            };
            tracing::info!(
                length = transition.length,
                from = transition.depth_before,
                to = transition.depth_after,
                "trie depth changed"
            );
            transitions.push(transition);
        }

        vector = next;
    }

    check_sequential(&vector)?;
    Ok(transitions)
}

/// Main entry point for boundaries command
pub fn run(args: &BoundariesArgs) -> Result<()> {
    let transitions = walk(args.upto)?;

    for transition in &transitions {
        println!(
            "length {:>8}: depth {} -> {}",
            transition.length, transition.depth_before, transition.depth_after
        );
    }
    tracing::info!(
        pushed = args.upto,
        transitions = transitions.len(),
        "boundary walk verified"
    );

    Ok(())
}
