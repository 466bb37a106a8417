//! Unified CLI for planning and learning over finite MDPs
//!
//! One subcommand per algorithm. The planners load the full model and solve
//! it directly; the learners run inside the trial simulator and only ever
//! see the model's structural skeleton plus per-step rewards. Any failure
//! is terminal: a one-line diagnostic and a non-zero exit status.

use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use markov_rl_agent::{PassiveTdAgent, QLearningAgent, QLearningConfig};
use markov_rl_core::planning::{policy_iteration, value_iteration, SolverConfig};
use markov_rl_core::policy::DEFAULT_POLICY_SEED;
use markov_rl_core::{Mdp, Policy};
use markov_rl_env::Environment;

#[derive(Parser)]
#[command(name = "markovctl", version, about = "Planning and learning over finite MDPs")]
struct Cli {
    /// Seed for transition sampling and random policy construction
    #[arg(long, global = true, default_value_t = DEFAULT_POLICY_SEED)]
    seed: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compute optimal state utilities by value iteration
    ValueIteration {
        /// Discount factor, in (0, 1)
        gamma: f64,
        /// Maximum allowable state utility error
        epsilon: f64,
        /// Path to the MDP description
        mdpfile: PathBuf,
    },
    /// Compute an optimal policy by policy iteration
    PolicyIteration {
        /// Discount factor, in (0, 1)
        gamma: f64,
        /// Convergence bound for the evaluation sweeps
        epsilon: f64,
        /// Path to the MDP description
        mdpfile: PathBuf,
    },
    /// Train a Q-learning agent in the simulated environment
    Qlearn {
        /// Discount factor, in (0, 1)
        gamma: f64,
        /// Optimistic estimate of the best attainable reward
        reward: f64,
        /// Minimum attempts per state-action pair before trusting estimates
        attempts: f64,
        /// Path to the MDP description
        mdpfile: PathBuf,
        /// Number of episodes to simulate
        trials: usize,
    },
    /// Estimate utilities of a fixed policy (read from stdin) by passive TD
    Td {
        /// Discount factor, in (0, 1)
        gamma: f64,
        /// Path to the MDP description
        mdpfile: PathBuf,
        /// Number of episodes to simulate
        trials: usize,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::ValueIteration {
            gamma,
            epsilon,
            mdpfile,
        } => run_value_iteration(gamma, epsilon, &mdpfile),
        Command::PolicyIteration {
            gamma,
            epsilon,
            mdpfile,
        } => run_policy_iteration(gamma, epsilon, &mdpfile, cli.seed),
        Command::Qlearn {
            gamma,
            reward,
            attempts,
            mdpfile,
            trials,
        } => run_qlearn(gamma, reward, attempts, &mdpfile, trials, cli.seed),
        Command::Td {
            gamma,
            mdpfile,
            trials,
        } => run_td(gamma, &mdpfile, trials, cli.seed),
    }
}

fn load_mdp(path: &Path) -> Result<Mdp> {
    Mdp::load(path).with_context(|| format!("failed to read MDP file {}", path.display()))
}

fn run_value_iteration(gamma: f64, epsilon: f64, mdpfile: &Path) -> Result<()> {
    let mdp = load_mdp(mdpfile)?;
    let utilities = value_iteration(&mdp, &SolverConfig::new(gamma, epsilon))?;

    for state in 0..mdp.num_states {
        if mdp.num_available_actions(state) > 0 || mdp.is_terminal(state) {
            println!("{:.3}", utilities[state]);
        } else {
            println!("X");
        }
    }
    Ok(())
}

fn run_policy_iteration(gamma: f64, epsilon: f64, mdpfile: &Path, seed: u64) -> Result<()> {
    let mdp = load_mdp(mdpfile)?;
    let mut policy = Policy::random(&mdp, seed);
    policy_iteration(&mdp, &SolverConfig::new(gamma, epsilon), &mut policy)?;

    for state in 0..mdp.num_states {
        if mdp.num_available_actions(state) > 0 {
            println!("{}", policy.action(state));
        } else {
            println!("0");
        }
    }
    Ok(())
}

fn run_qlearn(
    gamma: f64,
    reward: f64,
    attempts: f64,
    mdpfile: &Path,
    trials: usize,
    seed: u64,
) -> Result<()> {
    let mut env = Environment::with_seed(load_mdp(mdpfile)?, seed);
    let config = QLearningConfig {
        gamma,
        optimistic_reward: reward,
        min_visits: attempts,
    };
    let mut agent = QLearningAgent::new(env.structural_mdp(), config)?;

    env.run(&mut agent, trials)?;

    println!("Q[s,a]");
    for state in 0..env.num_states() {
        for action in 0..env.num_actions() {
            print!("{:.3}\t", agent.q_values()[[state, action]]);
        }
        println!();
    }

    println!("\nU[s]");
    for state in 0..env.num_states() {
        match agent.utility(state) {
            Some(utility) => println!("{utility:.6}"),
            None => println!("X"),
        }
    }

    println!("\npolicy[s]");
    for state in 0..env.num_states() {
        match agent.greedy_action(state) {
            Some(action) => println!("{action}"),
            None => println!("X"),
        }
    }
    Ok(())
}

fn run_td(gamma: f64, mdpfile: &Path, trials: usize, seed: u64) -> Result<()> {
    let mut env = Environment::with_seed(load_mdp(mdpfile)?, seed);
    let skeleton = env.structural_mdp();
    let policy = Policy::from_reader(io::stdin().lock(), &skeleton)
        .context("failed to read policy from stdin")?;
    let mut agent = PassiveTdAgent::new(skeleton.clone(), policy, gamma)?;

    env.run(&mut agent, trials)?;

    for state in 0..skeleton.num_states {
        if skeleton.num_available_actions(state) > 0 || skeleton.is_terminal(state) {
            println!("{:.3}", agent.utilities()[state]);
        } else {
            println!("X");
        }
    }
    Ok(())
}
