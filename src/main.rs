use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use rand::prelude::*;
use rl_dp::envs::{frozen_lake::FrozenLake, gym_adapter::GymAdapter};
use rl_dp::logging::init_logging;
use rl_dp::mdps::mdp_simulator::play_episode;
use rl_dp::mdps::solvers::{max_abs_diff, policy_iteration_bounded, value_iteration_bounded};
use rl_dp::{Mdp, Solution, SolverConfig, TransitionModel};
use serde_json::to_value;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Algorithm {
    Pi,
    Vi,
    Both,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LakeMap {
    #[value(name = "4x4")]
    Map4x4,
    #[value(name = "8x8")]
    Map8x8,
}

/// Solve a discrete MDP with policy iteration and value iteration, then play the policy.
///
/// The discount always comes from the solver settings (flag, then --config, then 0.9);
/// models loaded from a file or a gym server are re-stamped with it.
#[derive(Debug, Parser)]
#[command(version)]
struct Args {
    /// JSON file with solver settings: gamma, tol, max_iterations, seed.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    gamma: Option<f64>,

    #[arg(long)]
    tol: Option<f64>,

    #[arg(long)]
    max_iterations: Option<usize>,

    /// Pins tie-breaking and episode sampling.
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, value_enum, default_value_t = Algorithm::Both)]
    algorithm: Algorithm,

    #[arg(long, value_enum, default_value_t = LakeMap::Map8x8)]
    map: LakeMap,

    #[arg(long)]
    slippery: bool,

    /// JSON transition model to solve instead of a built-in lake.
    #[arg(long, conflicts_with = "gym_server")]
    model: Option<PathBuf>,

    /// gymnasium-http-api server to read the transition model from.
    #[arg(long)]
    gym_server: Option<String>,

    #[arg(long, default_value = "FrozenLake-v1")]
    gym_env: String,

    /// Write the solved model as JSON.
    #[arg(long)]
    save_model: Option<PathBuf>,

    #[arg(long, default_value_t = 100)]
    max_steps: usize,

    /// Pause between rendered frames.
    #[arg(long, default_value_t = 0)]
    delay_ms: u64,
}

impl Args {
    fn solver_config(&self) -> Result<SolverConfig> {
        let mut config = match &self.config {
            Some(path) => SolverConfig::load(path)
                .with_context(|| format!("failed to load config from {}", path.display()))?,
            None => SolverConfig::default(),
        };
        config.gamma = self.gamma.unwrap_or(config.gamma);
        config.tol = self.tol.unwrap_or(config.tol);
        config.max_iterations = self.max_iterations.unwrap_or(config.max_iterations);
        config.seed = self.seed.or(config.seed);
        config.validate()?;

        Ok(config)
    }

    fn load_mdp(&self, gamma: f64) -> Result<(Option<FrozenLake>, TransitionModel)> {
        if let Some(path) = &self.model {
            let model = TransitionModel::load(path)
                .with_context(|| format!("failed to load model from {}", path.display()))?;
            return Ok((None, model.with_gamma(gamma)?));
        }

        if let Some(server) = &self.gym_server {
            let env = GymAdapter::new(
                server,
                &self.gym_env,
                &[("is_slippery", to_value(self.slippery)?)],
            )
            .with_context(|| format!("failed to create {} on {server}", self.gym_env))?;
            return Ok((None, env.transition_model(gamma)?));
        }

        let lake = match self.map {
            LakeMap::Map4x4 => FrozenLake::map_4x4(self.slippery, gamma)?,
            LakeMap::Map8x8 => FrozenLake::map_8x8(self.slippery, gamma)?,
        };
        let model = lake.model().clone();
        Ok((Some(lake), model))
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging("info");

    let config = args.solver_config()?;
    let (lake, mdp) = args.load_mdp(config.gamma)?;
    info!(n_s = mdp.n_s(), n_a = mdp.n_a(), ?config, "loaded model");
    if let Some(path) = &args.save_model {
        mdp.save(path)?;
    }

    let rng = &mut match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut solved = vec![];
    if args.algorithm != Algorithm::Vi {
        banner("Beginning Policy Iteration");
        let sol = policy_iteration_bounded(&mdp, config.gamma, config.tol, config.max_iterations, rng)
            .context("policy iteration failed")?;
        report(&args, &mdp, lake.as_ref(), &sol, rng)?;
        solved.push(sol);
    }
    if args.algorithm != Algorithm::Pi {
        banner("Beginning Value Iteration");
        let sol = value_iteration_bounded(&mdp, config.gamma, config.tol, config.max_iterations, rng)
            .context("value iteration failed")?;
        report(&args, &mdp, lake.as_ref(), &sol, rng)?;
        solved.push(sol);
    }

    if let [pi, vi] = &solved[..] {
        let diff = max_abs_diff(&pi.v, &vi.v);
        println!("\nmax |V_pi - V_vi| = {diff:.3e}");
    }

    Ok(())
}

fn banner(title: &str) {
    let rule = "-".repeat(25);
    println!("\n{rule}\n{title}\n{rule}");
}

fn report(
    args: &Args,
    mdp: &TransitionModel,
    lake: Option<&FrozenLake>,
    sol: &Solution,
    rng: &mut StdRng,
) -> Result<()> {
    println!("Number of iterations: {}", sol.iterations);
    match lake {
        Some(lake) => {
            println!("{}\n", lake.render_values(&sol.v));
            println!("{}", lake.render_policy(&sol.policy));
        }
        None => {
            println!("{:?}", sol.v);
            println!("{:?}", sol.policy);
        }
    }

    let start = lake.map_or(0, FrozenLake::start);
    if let Some(lake) = lake {
        print!("{}", lake.render(start, None));
    }
    let episode = play_episode(mdp, &sol.policy, start, args.max_steps, rng, |step| {
        match lake {
            Some(lake) => print!("{}", lake.render(step.next.next_state, Some(step.a))),
            None => println!(
                "{}: s={} a={} -> s'={} r={}",
                step.t, step.s, step.a, step.next.next_state, step.next.reward
            ),
        }
        if args.delay_ms > 0 {
            thread::sleep(Duration::from_millis(args.delay_ms));
        }
    })?;

    if episode.done {
        println!("Episode reward: {:.6}", episode.total_reward);
    } else {
        println!(
            "The agent didn't reach a terminal state in {} steps.",
            args.max_steps
        );
    }

    Ok(())
}
