//! Sector Strike headless runner
//!
//! Flies the autopilot through the combat core at a fixed 60 Hz and reports
//! round progression. Rendering and input live in the host application.

#[cfg(not(target_arch = "wasm32"))]
mod cli {
    use std::path::PathBuf;

    use anyhow::{Context, Result};
    use clap::Parser;

    use sector_strike::sim::{GameEvent, GamePhase, GameState, TickInput};
    use sector_strike::{Difficulty, Faction, Settings};

    const FRAME_DT: f32 = 1.0 / 60.0;

    #[derive(Parser)]
    #[command(name = "sector-strike")]
    #[command(about = "Run the combat simulation headless with the autopilot flying")]
    pub struct Cli {
        /// easy, normal, hard or god
        #[arg(long)]
        difficulty: Option<String>,

        /// low or mid
        #[arg(long)]
        faction: Option<String>,

        /// Number of 60 Hz frames to simulate
        #[arg(long, default_value_t = 3600)]
        frames: u32,

        /// RNG seed
        #[arg(long)]
        seed: Option<u64>,

        /// Keep the ship alive at 1 hull
        #[arg(long)]
        no_death: bool,

        /// Settings JSON file to start from
        #[arg(long)]
        settings: Option<PathBuf>,

        /// Print the final debug snapshot as JSON
        #[arg(long)]
        json: bool,
    }

    fn resolve_settings(cli: &Cli) -> Result<Settings> {
        let mut settings = match &cli.settings {
            Some(path) => Settings::load_from_path(path)
                .with_context(|| format!("loading settings from {}", path.display()))?,
            None => Settings::default(),
        };
        if let Some(name) = &cli.difficulty {
            settings.difficulty = Difficulty::from_name_or_default(name);
        }
        if let Some(name) = &cli.faction {
            settings.faction = Faction::from_name_or_default(name);
        }
        if let Some(seed) = cli.seed {
            settings.seed = seed;
        }
        if cli.no_death {
            settings.allow_death = false;
        }
        Ok(settings)
    }

    pub fn run() -> Result<()> {
        let cli = Cli::parse();
        let settings = resolve_settings(&cli)?;
        let mut state = GameState::new(&settings);
        state.auto_mode = true;

        let input = TickInput::default();
        let mut kills = 0u32;
        for frame in 0..cli.frames {
            state.update(&input, FRAME_DT);
            for event in state.drain_events() {
                match event {
                    GameEvent::EnemyKilled { .. } => kills += 1,
                    GameEvent::WeaponDisabled { system, duration } => {
                        log::info!("{:?} offline for {:.1}s", system, duration);
                    }
                    _ => {}
                }
            }
            if state.phase == GamePhase::Destroyed {
                log::info!("Ship destroyed after {} frames", frame + 1);
                break;
            }
        }

        let hud = state.hud_status();
        log::info!(
            "Finished: round {}, {} kills, hull {:.0}%, shield {:.0}%",
            hud.round,
            kills,
            hud.hull * 100.0,
            hud.shield * 100.0
        );
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&state.debug_snapshot())?);
        }
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    cli::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is driven by the host page on the web
}
