//! Relief game implementation.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::core::{json_snapshot, GameRng, OperatorIndex, ProblemState, RoleIndex};
use crate::problem::{Operator, ParamSpec, ParamValue, Problem, Role, TransitionRule};

pub const MAX_REGION_HEALTH: i32 = 10;
pub const INITIAL_REGION_HEALTH: i32 = 5;
pub const STARTING_BADNESS: u32 = 5;
pub const DISASTERS_PER_ROUND: usize = 5;
/// Chance that a forecast disaster misses is `DISASTER_CHANCE_FACTOR ^ badness`.
pub const DISASTER_CHANCE_FACTOR: f64 = 0.95;
pub const DEFAULT_DISASTER_DAMAGE: i32 = 4;
pub const EXPLOIT_GAIN: i64 = 10;
pub const HEAL_COST: i64 = 20;
/// Cost per health point per aided region.
pub const AID_COST: i64 = 15;
pub const MAX_AID: i32 = 3;

/// Operator indices.
pub const EXPLOIT: OperatorIndex = OperatorIndex::new(0);
pub const HEAL: OperatorIndex = OperatorIndex::new(1);
pub const PASS: OperatorIndex = OperatorIndex::new(2);
pub const SEND_AID: OperatorIndex = OperatorIndex::new(3);
pub const RESHUFFLE: OperatorIndex = OperatorIndex::new(4);

const REGION_NAMES: [&str; 20] = [
    "Ashford", "Brightwater", "Cinderfall", "Dunmore", "Eastmarch", "Fernhollow", "Glenrock",
    "Highcliff", "Ironvale", "Juniper", "Kestrel Bay", "Lowmoor", "Millbrook", "Northreach",
    "Oakheart", "Pinecrest", "Quarry Hill", "Redwater", "Stonegate", "Thornfield",
];

fn region_name(index: usize) -> String {
    let base = REGION_NAMES[index % REGION_NAMES.len()];
    match index / REGION_NAMES.len() {
        0 => base.to_string(),
        n => format!("{} {}", base, n + 1),
    }
}

/// Region terrain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Terrain {
    Mountain,
    Plains,
    Woods,
    Mesa,
}

impl Terrain {
    pub const ALL: [Terrain; 4] = [Self::Mountain, Self::Plains, Self::Woods, Self::Mesa];
}

impl fmt::Display for Terrain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Disaster kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Disaster {
    Earthquake,
    Fire,
    Flood,
    Windstorm,
}

impl Disaster {
    pub const ALL: [Disaster; 4] = [Self::Earthquake, Self::Fire, Self::Flood, Self::Windstorm];

    /// Extra damage against a terrain. Higher is worse.
    #[must_use]
    pub fn severity(self, terrain: Terrain) -> i32 {
        use Terrain::*;
        match (self, terrain) {
            (Self::Earthquake, Mesa) => 2,
            (Self::Earthquake, Plains) => -2,
            (Self::Earthquake, Woods) => -1,
            (Self::Earthquake, Mountain) => 1,
            (Self::Fire, Mesa) => -2,
            (Self::Fire, Plains) => 1,
            (Self::Fire, Woods) => 2,
            (Self::Fire, Mountain) => -1,
            (Self::Flood, Mesa) => -1,
            (Self::Flood, Plains) => 2,
            (Self::Flood, Woods) => 1,
            (Self::Flood, Mountain) => -2,
            (Self::Windstorm, Mesa) => 1,
            (Self::Windstorm, Plains) => -1,
            (Self::Windstorm, Woods) => -2,
            (Self::Windstorm, Mountain) => 2,
        }
    }
}

impl fmt::Display for Disaster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// One region of the map.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Region {
    pub name: String,
    pub terrain: Terrain,
    pub health: i32,
    /// Owning faction; `None` once the region is ruined.
    pub owner: Option<usize>,
    /// Time step in which the region was last tended.
    pub last_tended: i32,
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, {} health)", self.name, self.terrain, self.health)
    }
}

/// A faction: one per role.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Faction {
    pub money: i64,
    pub regions_owned: u32,
}

/// A disaster aimed at a region.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Devastation {
    pub region: usize,
    pub disaster: Disaster,
    pub damage: i32,
}

/// Relief game state.
///
/// Each time step, every faction in turn tends each of its regions once.
/// When the last faction is done, time advances and forecast disasters
/// strike with a probability that grows with the climate badness.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ReliefState {
    regions: Vec<Region>,
    factions: Vec<Faction>,
    time: i32,
    end_of_time: i32,
    current: usize,
    focus: Option<usize>,
    badness: u32,
    forecast: Vec<Devastation>,
    struck: Vec<Devastation>,
    rng: GameRng,
}

impl ReliefState {
    fn new(settings: &ReliefBuilder, seed: u64) -> Self {
        let mut rng = GameRng::new(seed);
        let count = settings.factions * settings.regions_per_faction;

        let mut regions: Vec<Region> = (0..count)
            .map(|i| Region {
                name: region_name(i),
                terrain: Terrain::ALL[rng.gen_index(Terrain::ALL.len())],
                health: INITIAL_REGION_HEALTH,
                owner: None,
                last_tended: -1,
            })
            .collect();

        let mut order: Vec<usize> = (0..count).collect();
        rng.shuffle(&mut order);
        for (k, &i) in order.iter().enumerate() {
            regions[i].owner = Some(k / settings.regions_per_faction);
        }

        let factions = (0..settings.factions)
            .map(|_| Faction {
                money: settings.starting_money,
                regions_owned: settings.regions_per_faction as u32,
            })
            .collect();

        let mut state = Self {
            regions,
            factions,
            time: 0,
            end_of_time: settings.end_of_time,
            current: 0,
            focus: None,
            badness: STARTING_BADNESS,
            forecast: Vec::new(),
            struck: Vec::new(),
            rng,
        };
        state.forecast_disasters();
        state.focus = state.next_focus();
        state
    }

    #[must_use]
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    #[must_use]
    pub fn factions(&self) -> &[Faction] {
        &self.factions
    }

    #[must_use]
    pub fn time(&self) -> i32 {
        self.time
    }

    /// Index of the faction whose turn it is.
    #[must_use]
    pub fn current_faction(&self) -> usize {
        self.current
    }

    /// The region the current faction is deciding for. `None` for a
    /// faction that has lost every region.
    #[must_use]
    pub fn focus(&self) -> Option<&Region> {
        self.focus.map(|i| &self.regions[i])
    }

    #[must_use]
    pub fn badness(&self) -> u32 {
        self.badness
    }

    /// Disasters that may strike when time next advances.
    #[must_use]
    pub fn forecast(&self) -> &[Devastation] {
        &self.forecast
    }

    /// Disasters that struck when time last advanced.
    #[must_use]
    pub fn struck(&self) -> &[Devastation] {
        &self.struck
    }

    #[must_use]
    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }

    /// Regions still owned across all factions.
    #[must_use]
    pub fn regions_owned_total(&self) -> u32 {
        self.factions.iter().map(|f| f.regions_owned).sum()
    }

    /// Narration for a time step, relative to the state before it.
    #[must_use]
    pub fn time_report(&self, previous: &ReliefState) -> String {
        let mut msg = format!("Time has progressed from {} to {}.", previous.time, self.time);
        if self.struck.is_empty() {
            msg.push_str("\nNo disasters occurred.");
            return msg;
        }

        msg.push_str("\nThe following disasters have occurred:");
        for devastation in &self.struck {
            let region = &self.regions[devastation.region];
            msg.push_str(&format!(
                "\n {} in {} ({} damage)",
                devastation.disaster, region.name, devastation.damage
            ));
            if region.health <= 0 {
                msg.push_str(&format!("\n{} has been destroyed!", region.name));
            }
        }
        msg
    }

    fn next_focus(&self) -> Option<usize> {
        self.regions
            .iter()
            .position(|r| r.owner == Some(self.current) && r.last_tended < self.time)
    }

    fn damage_region(&mut self, index: usize, amount: i32) {
        let region = &mut self.regions[index];
        region.health -= amount;
        if region.health <= 0 {
            if let Some(owner) = region.owner.take() {
                let faction = &mut self.factions[owner];
                faction.regions_owned = faction.regions_owned.saturating_sub(1);
            }
        }
    }

    fn heal_region(&mut self, index: usize, amount: i32) {
        let region = &mut self.regions[index];
        region.health = (region.health + amount).min(MAX_REGION_HEALTH);
    }

    fn forecast_disasters(&mut self) {
        self.forecast.clear();
        let owned: Vec<usize> = self
            .regions
            .iter()
            .enumerate()
            .filter(|(_, r)| r.owner.is_some())
            .map(|(i, _)| i)
            .collect();
        if owned.is_empty() {
            return;
        }

        for _ in 0..DISASTERS_PER_ROUND {
            let disaster = Disaster::ALL[self.rng.gen_index(Disaster::ALL.len())];
            let region = owned[self.rng.gen_index(owned.len())];
            let damage = DEFAULT_DISASTER_DAMAGE + disaster.severity(self.regions[region].terrain);
            self.forecast.push(Devastation { region, disaster, damage });
        }
    }

    fn reassign_regions(&mut self) {
        let mut live: Vec<usize> = self
            .regions
            .iter()
            .enumerate()
            .filter(|(_, r)| r.owner.is_some())
            .map(|(i, _)| i)
            .collect();
        self.rng.shuffle(&mut live);

        let mut slots = live.into_iter();
        for (faction, f) in self.factions.iter().enumerate() {
            for _ in 0..f.regions_owned {
                if let Some(i) = slots.next() {
                    self.regions[i].owner = Some(faction);
                }
            }
        }
    }

    fn advance_time(&mut self) {
        self.time += 1;
        self.struck.clear();

        let threshold = DISASTER_CHANCE_FACTOR.powi(self.badness as i32);
        for devastation in std::mem::take(&mut self.forecast) {
            if self.rng.gen_unit() > threshold {
                self.damage_region(devastation.region, devastation.damage);
                self.struck.push(devastation);
            }
        }

        if self.time % 2 == 0 {
            self.reassign_regions();
        }
        self.forecast_disasters();
    }

    /// Mark the focus tended and move to the next region, faction or
    /// time step.
    fn finish_turn(&mut self) {
        if let Some(i) = self.focus {
            self.regions[i].last_tended = self.time;
        }
        if self.next_focus().is_none() {
            self.current += 1;
            if self.current >= self.factions.len() {
                self.advance_time();
                self.current = 0;
            }
        }
        self.focus = self.next_focus();
    }
}

impl fmt::Display for ReliefState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Time {} of {}, climate badness {}",
            self.time, self.end_of_time, self.badness
        )?;
        for (i, faction) in self.factions.iter().enumerate() {
            writeln!(
                f,
                "Faction {}: ${}M, {} regions",
                i + 1,
                faction.money,
                faction.regions_owned
            )?;
            for region in self.regions.iter().filter(|r| r.owner == Some(i)) {
                writeln!(f, "  {}", region)?;
            }
        }
        match self.focus() {
            Some(region) => write!(f, "Faction {} is deciding for {}", self.current + 1, region),
            None => {
                write!(f, "Faction {} is a climate ghost. Upcoming disasters:", self.current + 1)?;
                for d in &self.forecast {
                    write!(f, "\n  {} in {}", d.disaster, self.regions[d.region].name)?;
                }
                Ok(())
            }
        }
    }
}

impl ProblemState for ReliefState {
    fn is_goal(&self) -> bool {
        self.time >= self.end_of_time || self.factions.iter().all(|f| f.regions_owned == 0)
    }

    fn goal_message(&self) -> String {
        let survivors: Vec<String> = self
            .factions
            .iter()
            .enumerate()
            .filter(|(_, f)| f.regions_owned > 0)
            .map(|(i, f)| format!("Faction {} (${}M, {} regions)", i + 1, f.money, f.regions_owned))
            .collect();

        if survivors.is_empty() {
            "The game has concluded!\nEvery region was lost.".to_string()
        } else {
            format!("The game has concluded!\nSurviving factions:\n{}", survivors.join("\n"))
        }
    }

    fn snapshot(&self) -> Option<String> {
        json_snapshot(self)
    }
}

// ---- operators ----

fn acting(state: &ReliefState, role: Option<RoleIndex>) -> bool {
    role.map_or(true, |r| r.index() == state.current)
}

fn exploit(state: &ReliefState) -> ReliefState {
    let mut next = state.clone();
    if let Some(i) = next.focus {
        let current = next.current;
        next.factions[current].money += EXPLOIT_GAIN;
        next.badness += 1;
        next.damage_region(i, 1);
    }
    next.finish_turn();
    next
}

fn heal(state: &ReliefState) -> ReliefState {
    let mut next = state.clone();
    if let Some(i) = next.focus {
        let current = next.current;
        next.factions[current].money -= HEAL_COST;
        next.heal_region(i, 1);
    }
    next.finish_turn();
    next
}

fn pass(state: &ReliefState) -> ReliefState {
    let mut next = state.clone();
    next.finish_turn();
    next
}

fn send_aid(state: &ReliefState, amount: i32) -> ReliefState {
    let mut next = state.clone();
    let current = next.current;
    let aided: Vec<usize> = next
        .regions
        .iter()
        .enumerate()
        .filter(|(_, r)| r.owner.map_or(false, |o| o != current))
        .map(|(i, _)| i)
        .collect();

    for &i in &aided {
        next.heal_region(i, amount);
    }
    next.factions[current].money -= AID_COST * i64::from(amount) * aided.len() as i64;
    next.finish_turn();
    next
}

fn reshuffle(state: &ReliefState) -> ReliefState {
    let mut next = state.clone();
    next.forecast_disasters();
    next.finish_turn();
    next
}

/// Builder for the Relief problem.
///
/// ## Example
///
/// ```
/// use rust_roomplay::games::relief::ReliefBuilder;
///
/// let problem = ReliefBuilder::new().factions(2).regions_per_faction(3).build();
/// assert_eq!(problem.roles().len(), 2);
///
/// let state = problem.initial_state(None);
/// assert_eq!(state.regions().len(), 6);
/// ```
#[derive(Clone, Debug)]
pub struct ReliefBuilder {
    factions: usize,
    regions_per_faction: usize,
    end_of_time: i32,
    starting_money: i64,
    seed: u64,
}

impl Default for ReliefBuilder {
    fn default() -> Self {
        Self {
            factions: 4,
            regions_per_faction: 5,
            end_of_time: 5,
            starting_money: 100,
            seed: 1701,
        }
    }
}

impl ReliefBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn factions(mut self, count: usize) -> Self {
        assert!((1..=8).contains(&count), "Faction count must be 1-8");
        self.factions = count;
        self
    }

    pub fn regions_per_faction(mut self, count: usize) -> Self {
        assert!(count >= 1, "Each faction needs at least one region");
        self.regions_per_faction = count;
        self
    }

    pub fn end_of_time(mut self, time: i32) -> Self {
        self.end_of_time = time;
        self
    }

    pub fn starting_money(mut self, money: i64) -> Self {
        self.starting_money = money;
        self
    }

    /// Default seed; a `{"seed": n}` start argument overrides it.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Build the problem.
    pub fn build(self) -> Problem<ReliefState> {
        let factions = self.factions;
        let settings = self.clone();

        let mut builder = Problem::builder("Relief")
            .version("1.0")
            .author("Roomplay developers")
            .description(
                "Factions tend their regions while cumulative climate disasters \
                 close in. Exploiting a region pays, but every exploit makes the \
                 next disaster more likely.",
            )
            .state_factory(move |args: Option<&Value>| {
                let seed = args
                    .and_then(|a| a.get("seed"))
                    .and_then(Value::as_u64)
                    .unwrap_or(settings.seed);
                ReliefState::new(&settings, seed)
            })
            .operator(
                Operator::new("Exploit", exploit)
                    .with_precondition(|s, role| acting(s, role) && s.focus.is_some())
                    .with_dynamic_name(|s| match s.focus() {
                        Some(region) => format!("Exploit {} for wealth", region.name),
                        None => "Exploit".to_string(),
                    }),
            )
            .operator(
                Operator::new("Heal", heal)
                    .with_precondition(|s, role| {
                        acting(s, role) && s.focus.is_some() && s.factions[s.current].money >= HEAL_COST
                    })
                    .with_dynamic_name(|s| match s.focus() {
                        Some(region) => format!("Heal {}", region.name),
                        None => "Heal".to_string(),
                    }),
            )
            .operator(Operator::new("Pass", pass).with_precondition(acting))
            .operator(
                Operator::new("Send Aid", |s: &ReliefState| send_aid(s, 1))
                    .with_precondition(|s, role| {
                        acting(s, role)
                            && s.focus.is_some()
                            && s.factions[s.current].money >= AID_COST
                            && s.regions.iter().any(|r| r.owner.map_or(false, |o| o != s.current))
                    })
                    .with_params(
                        vec![ParamSpec::int("amount").with_bounds(1.0, f64::from(MAX_AID))],
                        |s, args| {
                            let amount = args.first().and_then(ParamValue::as_int).unwrap_or(1);
                            send_aid(s, amount.clamp(1, i64::from(MAX_AID)) as i32)
                        },
                    ),
            )
            .operator(
                Operator::new("Reshuffle", reshuffle).with_precondition(|s, role| {
                    acting(s, role) && s.factions[s.current].regions_owned == 0
                }),
            )
            .transition(TransitionRule::computed(
                |old: &ReliefState, new: &ReliefState, _: &Operator<ReliefState>| old.time != new.time,
                |old: &ReliefState, new: &ReliefState, _: &Operator<ReliefState>| new.time_report(old),
            ))
            .transition(TransitionRule::fixed(
                |old: &ReliefState, new: &ReliefState, _: &Operator<ReliefState>| {
                    new.regions_owned_total() < old.regions_owned_total()
                },
                "A region has been lost to ruin.",
            ));

        for i in 0..factions {
            builder = builder.role(Role::exactly_one(format!("Faction {}", i + 1)));
        }
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transitions;
    use serde_json::json;

    fn small() -> Problem<ReliefState> {
        ReliefBuilder::new().factions(2).regions_per_faction(1).build()
    }

    fn op(problem: &Problem<ReliefState>, index: OperatorIndex) -> &Operator<ReliefState> {
        problem.operator(index).unwrap()
    }

    #[test]
    fn test_initial_state() {
        let problem = ReliefBuilder::new().factions(3).regions_per_faction(4).build();
        let state = problem.initial_state(None);

        assert_eq!(state.regions().len(), 12);
        for (i, faction) in state.factions().iter().enumerate() {
            assert_eq!(faction.regions_owned, 4);
            assert_eq!(state.regions().iter().filter(|r| r.owner == Some(i)).count(), 4);
            assert_eq!(faction.money, 100);
        }
        assert_eq!(state.time(), 0);
        assert_eq!(state.current_faction(), 0);
        assert_eq!(state.focus().and_then(|r| r.owner), Some(0));
        assert_eq!(state.forecast().len(), DISASTERS_PER_ROUND);
        assert!(!state.is_goal());
    }

    #[test]
    fn test_roles() {
        let problem = ReliefBuilder::new().factions(3).build();
        let names: Vec<_> = problem.roles().iter().map(|r| r.name.as_str()).collect();

        assert_eq!(names, vec!["Faction 1", "Faction 2", "Faction 3"]);
        assert!(problem.roles().iter().all(|r| r.min == Some(1) && r.max == Some(1)));
    }

    #[test]
    fn test_seed_from_args() {
        let problem = small();
        let a = problem.initial_state(Some(&json!({ "seed": 9 })));
        let b = problem.initial_state(Some(&json!({ "seed": 9 })));

        assert_eq!(a.seed(), 9);
        assert_eq!(a, b);
        assert_eq!(problem.initial_state(None).seed(), 1701);
    }

    #[test]
    fn test_exploit() {
        let problem = ReliefBuilder::new().factions(2).regions_per_faction(2).build();
        let state = problem.initial_state(None);
        let focus = state.focus.unwrap();

        let next = op(&problem, EXPLOIT).transform(&state, None);

        assert_eq!(next.factions()[0].money, 110);
        assert_eq!(next.badness(), STARTING_BADNESS + 1);
        assert_eq!(next.regions()[focus].health, INITIAL_REGION_HEALTH - 1);
        assert_eq!(next.regions()[focus].last_tended, 0);
        // Faction 0 still has a second region to tend.
        assert_eq!(next.current_faction(), 0);
        assert_ne!(next.focus, Some(focus));
    }

    #[test]
    fn test_heal_name_and_cost() {
        let problem = small();
        let state = problem.initial_state(None);
        let heal = op(&problem, HEAL);
        let focus = state.focus().unwrap().name.clone();

        assert_eq!(heal.display_name(&state), format!("Heal {}", focus));

        let next = heal.transform(&state, None);
        assert_eq!(next.factions()[0].money, 100 - HEAL_COST);
        assert_eq!(next.current_faction(), 1);
    }

    #[test]
    fn test_heal_requires_money() {
        let problem = ReliefBuilder::new().factions(1).starting_money(10).build();
        let state = problem.initial_state(None);

        assert!(!op(&problem, HEAL).is_applicable(&state, None));
        assert!(op(&problem, EXPLOIT).is_applicable(&state, None));
    }

    #[test]
    fn test_role_gating() {
        let problem = small();
        let state = problem.initial_state(None);

        assert!(op(&problem, PASS).is_applicable(&state, Some(RoleIndex::new(0))));
        assert!(!op(&problem, PASS).is_applicable(&state, Some(RoleIndex::new(1))));
        assert!(!op(&problem, RESHUFFLE).is_applicable(&state, Some(RoleIndex::new(0))));
    }

    #[test]
    fn test_round_advances_time() {
        let problem = small();
        let pass = op(&problem, PASS);
        let start = problem.initial_state(None);

        let mid = pass.transform(&start, None);
        assert_eq!(mid.time(), 0);
        assert!(transitions::evaluate(&start, &mid, pass, problem.transitions()).is_empty());

        let end = pass.transform(&mid, None);
        assert_eq!(end.time(), 1);
        assert_eq!(end.current_faction(), 0);

        let messages = transitions::evaluate(&mid, &end, pass, problem.transitions());
        assert!(messages[0].starts_with("Time has progressed from 0 to 1."));
    }

    #[test]
    fn test_send_aid() {
        let problem = small();
        let state = problem.initial_state(None);
        let other = state.regions().iter().position(|r| r.owner == Some(1)).unwrap();

        let next = op(&problem, SEND_AID).transform(&state, Some(&[ParamValue::Int(2)][..]));
        assert_eq!(next.regions()[other].health, INITIAL_REGION_HEALTH + 2);
        assert_eq!(next.factions()[0].money, 100 - AID_COST * 2);

        let plain = op(&problem, SEND_AID).transform(&state, None);
        assert_eq!(plain.regions()[other].health, INITIAL_REGION_HEALTH + 1);
    }

    #[test]
    fn test_ghost_can_only_pass_or_reshuffle() {
        let problem = small();
        let mut state = problem.initial_state(None);
        let mine = state.focus.unwrap();
        state.damage_region(mine, MAX_REGION_HEALTH);
        state.focus = state.next_focus();

        assert_eq!(state.factions()[0].regions_owned, 0);
        assert!(state.focus().is_none());
        assert!(!op(&problem, EXPLOIT).is_applicable(&state, None));
        assert!(!op(&problem, SEND_AID).is_applicable(&state, None));
        assert!(op(&problem, PASS).is_applicable(&state, None));
        assert!(op(&problem, RESHUFFLE).is_applicable(&state, None));
        assert!(state.to_string().contains("climate ghost"));

        let next = op(&problem, RESHUFFLE).transform(&state, None);
        assert_eq!(next.current_faction(), 1);
    }

    #[test]
    fn test_goal_when_time_runs_out() {
        let problem = ReliefBuilder::new().factions(1).regions_per_faction(1).end_of_time(1).build();
        let state = problem.initial_state(None);
        let next = op(&problem, PASS).transform(&state, None);

        assert!(next.is_goal());
        assert!(next.goal_message().starts_with("The game has concluded!"));
    }

    #[test]
    fn test_goal_when_everything_is_lost() {
        let problem = small();
        let mut state = problem.initial_state(None);
        for i in 0..state.regions.len() {
            state.damage_region(i, MAX_REGION_HEALTH);
        }

        assert!(state.is_goal());
        assert!(state.goal_message().ends_with("Every region was lost."));
    }

    #[test]
    fn test_determinism() {
        let problem = ReliefBuilder::new().factions(2).regions_per_faction(2).build();
        let play = |mut state: ReliefState| {
            for turn in 0..12 {
                let index = if turn % 3 == 0 { EXPLOIT } else { PASS };
                let operator = op(&problem, index);
                if !operator.is_applicable(&state, None) || state.is_goal() {
                    break;
                }
                state = operator.transform(&state, None);
            }
            state
        };

        let a = play(problem.initial_state(None));
        let b = play(problem.initial_state(None));
        assert_eq!(a, b);
        assert!(a.time() > 0);
    }

    #[test]
    fn test_snapshot_is_json() {
        let state = small().initial_state(None);
        let snapshot = state.snapshot().unwrap();
        let value: Value = serde_json::from_str(&snapshot).unwrap();

        assert_eq!(value["time"], 0);
        assert_eq!(value["regions"].as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn test_severity_matrix_keeps_damage_positive() {
        for disaster in Disaster::ALL {
            for terrain in Terrain::ALL {
                assert!(DEFAULT_DISASTER_DAMAGE + disaster.severity(terrain) > 0);
            }
        }
    }
}
