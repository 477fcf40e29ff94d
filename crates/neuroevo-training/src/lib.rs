//! Genetic algorithm engine for evolving neural network policies.
//!
//! This crate evolves populations of [`agent::Agent`]s, each pairing a fixed-topology
//! [`neuroevo_network::Network`] with a fitness score assigned by an external
//! environment. It implements the generation transition only: scoring agents, running
//! the generation loop and persisting champions are left to the caller.
//!
//! # How Evolution Works
//!
//! 1. **Evaluation** - The environment plays each agent and records its fitness
//! 2. **Survivor Selection** - The μ+λ pool is reduced to the survivors ([`selection`])
//! 3. **Parent Selection** - All survivors, or a strategy sample of them, become parents
//! 4. **Crossover** - Parent pairs exchange parameter tensors ([`crossover`])
//! 5. **Mutation** - Every child is perturbed exactly once ([`mutation`])
//! 6. **Repeat** - The children become the next generation
//!
//! # Architecture
//!
//! ```text
//! Environment (external)
//!     ↓ assigns fitness to
//! Agents (network + fitness)
//!     ↓ ranked and sampled by
//! Selection (top-k / roulette / SUS / tournament)
//!     ↓ feeds parent pairs to
//! Crossover (uniform / multi-point) → Mutation
//!     ↓ produce
//! Next generation
//! ```
//!
//! [`evolution::Evolution`] wires the pieces together from an
//! [`config::EvolutionConfig`].
//!
//! # Reproducibility
//!
//! Every operator takes the random generator as `&mut R where R: Rng + ?Sized` and
//! documents the order in which it draws. Seeding the generator (for example with
//! `rand_pcg::Pcg64::seed_from_u64`) makes whole runs reproducible.
//!
//! # Errors
//!
//! Operators return [`error::EvolutionError`]. Invalid modes and parameters are caught
//! by [`config::EvolutionConfig::validate`] before the first generation runs.

pub mod agent;
pub mod config;
pub mod crossover;
pub mod error;
pub mod evolution;
pub mod mutation;
pub mod selection;
pub mod stats;
