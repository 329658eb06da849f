//! "Relief": a climate-disaster game for exercising the engine.
//!
//! - Each faction (one per role) governs a handful of regions
//! - On its turn a faction decides, region by region, to exploit, heal,
//!   pass or send aid to everyone else's regions
//! - When every faction has acted, time advances and forecast disasters
//!   strike; exploiting makes them more likely
//! - A faction that has lost every region becomes a climate ghost and may
//!   only pass or reshuffle the forecast
//! - The game ends when time runs out or every region is lost
//!
//! Randomness comes from a seeded [`GameRng`](crate::core::GameRng) inside
//! the state, so a game replays identically from its seed.

mod game;

pub use game::{
    Devastation, Disaster, Faction, Region, ReliefBuilder, ReliefState, Terrain, AID_COST,
    DEFAULT_DISASTER_DAMAGE, DISASTERS_PER_ROUND, DISASTER_CHANCE_FACTOR, EXPLOIT, EXPLOIT_GAIN,
    HEAL, HEAL_COST, INITIAL_REGION_HEALTH, MAX_AID, MAX_REGION_HEALTH, PASS, RESHUFFLE, SEND_AID,
    STARTING_BADNESS,
};
