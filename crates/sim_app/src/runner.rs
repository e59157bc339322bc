//! Fixed-timestep simulation loop.
//!
//! Drives [`World::execute_tick`] at a target tick rate, sleeping off the
//! remainder of each tick's time budget and warning when a tick overruns
//! it.

use std::time::{Duration, Instant};

use tracing::{info, warn};

use sim_world::{Tick, World, WorldError};

/// Configuration for the simulation loop.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Target ticks per second.
    pub tick_rate: f64,
    /// Maximum number of ticks to run (0 = unlimited).
    pub max_ticks: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_rate: 20.0,
            max_ticks: 0,
        }
    }
}

/// Owns a locked [`World`] and steps it at a fixed rate.
pub struct SimulationLoop {
    config: SimConfig,
    world: World,
}

impl SimulationLoop {
    /// Create a loop around an already locked world.
    #[must_use]
    pub fn new(world: World, config: SimConfig) -> Self {
        Self { config, world }
    }

    /// Returns a reference to the world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Returns a mutable reference to the world.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Run the loop, invoking `logic` once per tick, until `max_ticks` is
    /// reached (forever when 0) or the logic fails.
    pub fn run<F>(&mut self, mut logic: F) -> Result<(), WorldError>
    where
        F: FnMut(&mut World, Tick) -> Result<(), WorldError>,
    {
        let tick_duration = Duration::from_secs_f64(1.0 / self.config.tick_rate);
        let mut ticks = 0u64;

        info!(
            tick_rate = self.config.tick_rate,
            max_ticks = self.config.max_ticks,
            "starting simulation loop"
        );

        loop {
            let start = Instant::now();

            self.world.execute_tick(&mut logic)?;

            ticks += 1;
            if self.config.max_ticks > 0 && ticks >= self.config.max_ticks {
                info!(ticks, "simulation loop complete");
                break;
            }

            let elapsed = start.elapsed();
            if elapsed < tick_duration {
                std::thread::sleep(tick_duration - elapsed);
            } else {
                warn!(
                    tick_id = self.world.current_tick(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    budget_ms = tick_duration.as_millis() as u64,
                    "tick exceeded time budget"
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locked_world() -> World {
        let mut world = World::new();
        world.lock_types().unwrap();
        world
    }

    #[test]
    fn test_run_limited_ticks() {
        let config = SimConfig {
            tick_rate: 1000.0, // fast for testing
            max_ticks: 5,
        };
        let mut sim = SimulationLoop::new(locked_world(), config);
        sim.run(|_, _| Ok(())).unwrap();
        assert_eq!(sim.world().current_tick(), 5);
    }

    #[test]
    fn test_logic_sees_consecutive_ticks() {
        let config = SimConfig {
            tick_rate: 1000.0,
            max_ticks: 3,
        };
        let mut sim = SimulationLoop::new(locked_world(), config);

        let mut seen = Vec::new();
        sim.run(|_, tick| {
            seen.push(tick);
            Ok(())
        })
        .unwrap();
        assert_eq!(seen, vec![0, 1, 2]);
    }

    #[test]
    fn test_failing_logic_stops_the_loop() {
        let config = SimConfig {
            tick_rate: 1000.0,
            max_ticks: 10,
        };
        let mut sim = SimulationLoop::new(locked_world(), config);

        let result = sim.run(|_, tick| {
            if tick == 2 {
                Err(WorldError::NotExecutingTick)
            } else {
                Ok(())
            }
        });
        assert!(result.is_err());
        // Ticks 0 and 1 committed; the failing tick did not.
        assert_eq!(sim.world().current_tick(), 2);
    }
}
